//! Withdrawal amount entry
//!
//! Converts a USD balance into the user's display currency, derives the
//! currency-specific minimum and validates what the user typed.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::code::CurrencyCode;
use super::converter::CurrencyConverter;
use crate::config::CurrencyConfig;
use crate::errors::{PanelError, Result};

/// Non-negative amount in the canonical unit (USD)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyAmount {
    value_usd: Decimal,
}

impl CurrencyAmount {
    pub fn from_usd(value_usd: Decimal) -> Result<Self> {
        if value_usd.is_sign_negative() && !value_usd.is_zero() {
            return Err(PanelError::invalid_amount(format!(
                "Amount must not be negative, got {}",
                value_usd
            )));
        }
        Ok(Self { value_usd })
    }

    pub fn value_usd(&self) -> Decimal {
        self.value_usd
    }

    /// Derived on demand, never stored
    pub fn value_local(&self, converter: &CurrencyConverter, currency: CurrencyCode) -> Result<Decimal> {
        converter.to_local(self.value_usd, currency)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WithdrawalPolicy {
    pub minimum_usd: Decimal,
}

impl Default for WithdrawalPolicy {
    fn default() -> Self {
        Self {
            minimum_usd: Decimal::TWO,
        }
    }
}

impl WithdrawalPolicy {
    pub fn from_config(config: &CurrencyConfig) -> Self {
        Self {
            minimum_usd: config.minimum_withdrawal_usd,
        }
    }
}

/// What the withdrawal form shows for one currency
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalQuote {
    pub currency: CurrencyCode,
    pub balance_usd: Decimal,
    /// Balance floored at display precision
    pub balance_local: Decimal,
    /// Minimum rounded up to the currency's step
    pub minimum_local: Decimal,
    pub can_withdraw: bool,
}

#[derive(Debug, Clone, Default)]
pub struct WithdrawalCalculator {
    converter: CurrencyConverter,
    policy: WithdrawalPolicy,
}

impl WithdrawalCalculator {
    pub fn new(converter: CurrencyConverter, policy: WithdrawalPolicy) -> Self {
        Self { converter, policy }
    }

    pub fn converter(&self) -> &CurrencyConverter {
        &self.converter
    }

    pub fn quote(&self, balance: CurrencyAmount, currency: CurrencyCode) -> Result<WithdrawalQuote> {
        let c = &self.converter;
        let minimum_local =
            c.round_minimum_up(c.to_local(self.policy.minimum_usd, currency)?, currency)?;
        let balance_local = c.round_balance_down(balance.value_local(c, currency)?, currency)?;

        debug!(
            "Withdrawal quote: balance {} USD = {} {}, minimum {} {}",
            balance.value_usd(),
            balance_local,
            currency,
            minimum_local,
            currency
        );

        Ok(WithdrawalQuote {
            currency,
            balance_usd: balance.value_usd(),
            balance_local,
            minimum_local,
            can_withdraw: balance_local >= minimum_local,
        })
    }

    /// Validate an entered local amount against a quote.
    ///
    /// Returns the amount in canonical USD; the entered value is first
    /// rounded the same way the form displays it.
    pub fn validate(&self, quote: &WithdrawalQuote, entered_local: Decimal) -> Result<CurrencyAmount> {
        let c = &self.converter;
        let currency = quote.currency;
        let entered = c.round_for_display(entered_local, currency)?;

        if entered < quote.minimum_local {
            return Err(PanelError::below_minimum(format!(
                "Minimum withdrawal is {} {}",
                quote.minimum_local, currency
            )));
        }
        if entered > quote.balance_local {
            return Err(PanelError::exceeds_balance(format!(
                "Available balance is {} {}",
                quote.balance_local, currency
            )));
        }

        // 换算回 USD 时不超过原始余额（除法的最后一位可能进位）
        let value_usd = c.to_usd(entered, currency)?.min(quote.balance_usd);
        CurrencyAmount::from_usd(value_usd)
    }
}
