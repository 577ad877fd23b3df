//! Currency commands: convert and withdrawal quote

use colored::Colorize;
use rust_decimal::Decimal;

use crate::config::get_config;
use crate::currency::{
    CurrencyAmount, CurrencyCode, CurrencyConverter, RateTable, WithdrawalCalculator,
    WithdrawalPolicy,
};
use crate::errors::PanelError;
use crate::interfaces::cli::CliError;

fn parse_amount(raw: &str) -> Result<Decimal, PanelError> {
    raw.trim()
        .parse::<Decimal>()
        .map_err(|e| PanelError::invalid_amount(format!("'{}' is not a number: {}", raw, e)))
}

fn calculator() -> Result<WithdrawalCalculator, PanelError> {
    let config = get_config();
    let table = RateTable::from_config(&config.currency)?;
    Ok(WithdrawalCalculator::new(
        CurrencyConverter::new(table),
        WithdrawalPolicy::from_config(&config.currency),
    ))
}

pub fn convert(amount: &str, currency: &str, to_usd: bool) -> Result<(), CliError> {
    let amount = parse_amount(amount)?;
    let currency = CurrencyCode::parse(currency)?;
    let calc = calculator()?;
    let c = calc.converter();

    if to_usd {
        let usd = c.to_usd(amount, currency)?;
        println!(
            "{} {} = {} {}",
            amount.to_string().cyan(),
            currency.to_string().blue(),
            c.round_for_display(usd, CurrencyCode::Usd)?.to_string().green(),
            "USD".blue()
        );
        println!("  {} {}", "exact:".dimmed(), usd.normalize().to_string().dimmed());
    } else {
        let local = c.to_local(amount, currency)?;
        println!(
            "{} {} = {} {}",
            amount.to_string().cyan(),
            "USD".blue(),
            c.round_for_display(local, currency)?.to_string().green(),
            currency.to_string().blue()
        );
        println!(
            "  {} {} {}",
            "rate:".dimmed(),
            c.rates().rate(currency)?.to_string().dimmed(),
            format!("{} per USD", currency).dimmed()
        );
    }
    Ok(())
}

pub fn quote(balance_usd: &str, currency: &str, amount: Option<&str>) -> Result<(), CliError> {
    let balance = CurrencyAmount::from_usd(parse_amount(balance_usd)?)?;
    let currency = CurrencyCode::parse(currency)?;
    let calc = calculator()?;
    let quote = calc.quote(balance, currency)?;

    println!("{}", "Withdrawal quote:".bold().green());
    println!(
        "  {} {} {}",
        "Balance:".bold(),
        quote.balance_local.to_string().cyan(),
        currency.to_string().blue()
    );
    println!(
        "  {} {} {}",
        "Minimum:".bold(),
        quote.minimum_local.to_string().cyan(),
        currency.to_string().blue()
    );
    if quote.can_withdraw {
        println!("  {} {}", "✓".bold().green(), "Withdrawal available".green());
    } else {
        println!(
            "  {} {}",
            "✗".bold().red(),
            "Balance is below the minimum".yellow()
        );
    }

    if let Some(raw) = amount {
        let entered = parse_amount(raw)?;
        let accepted = calc.validate(&quote, entered)?;
        println!(
            "  {} {} {} ({} USD)",
            "Accepted:".bold().green(),
            calc.converter()
                .round_for_display(entered, currency)?
                .to_string()
                .cyan(),
            currency.to_string().blue(),
            accepted.value_usd().round_dp(6).normalize()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount(" 2.50 ").unwrap(), Decimal::new(250, 2));
        assert!(matches!(
            parse_amount("two"),
            Err(PanelError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_convert_rejects_unknown_currency() {
        let err = convert("1", "XYZ", false).unwrap_err();
        assert!(matches!(err, CliError::Panel(PanelError::UnsupportedCurrency(_))));
    }

    #[test]
    fn test_quote_rejects_below_minimum() {
        let err = quote("100", "IDR", Some("5000")).unwrap_err();
        assert!(matches!(err, CliError::Panel(PanelError::BelowMinimum(_))));
        assert!(quote("100", "IDR", Some("32000")).is_ok());
    }
}
