//! USD ↔ display currency conversion
//!
//! Conversion is exact decimal arithmetic; rounding is always a separate,
//! explicit step so that fee + amount = total stays precise internally.

use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::trace;

use super::code::CurrencyCode;
use crate::config::CurrencyConfig;
use crate::errors::{PanelError, Result};

/// Exchange rates relative to USD (units of currency per 1 USD)
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    rates: BTreeMap<CurrencyCode, Decimal>,
}

impl RateTable {
    /// Build a table, rejecting non-positive rates.
    pub fn new(rates: BTreeMap<CurrencyCode, Decimal>) -> Result<Self> {
        if let Some((code, rate)) = rates.iter().find(|(_, rate)| **rate <= Decimal::ZERO) {
            return Err(PanelError::config(format!(
                "Exchange rate for {} must be positive, got {}",
                code, rate
            )));
        }
        let mut rates = rates;
        // USD 永远是 1
        rates.insert(CurrencyCode::Usd, Decimal::ONE);
        Ok(Self { rates })
    }

    pub fn from_config(config: &CurrencyConfig) -> Result<Self> {
        Self::new(config.rates.clone())
    }

    pub fn rate(&self, currency: CurrencyCode) -> Result<Decimal> {
        self.rates.get(&currency).copied().ok_or_else(|| {
            PanelError::unsupported_currency(format!("No exchange rate configured for {}", currency))
        })
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self {
            rates: crate::config::default_rates(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CurrencyConverter {
    table: RateTable,
}

impl CurrencyConverter {
    pub fn new(table: RateTable) -> Self {
        Self { table }
    }

    pub fn rates(&self) -> &RateTable {
        &self.table
    }

    /// USD → local currency, no rounding
    pub fn to_local(&self, amount_usd: Decimal, currency: CurrencyCode) -> Result<Decimal> {
        ensure_non_negative(amount_usd)?;
        let rate = self.table.rate(currency)?;
        let local = amount_usd.checked_mul(rate).ok_or_else(|| {
            PanelError::invalid_amount(format!("Amount {} overflows in {}", amount_usd, currency))
        })?;
        trace!("to_local: {} USD -> {} {}", amount_usd, local, currency);
        Ok(local)
    }

    /// Local currency → USD; the algebraic inverse of `to_local`
    pub fn to_usd(&self, amount_local: Decimal, currency: CurrencyCode) -> Result<Decimal> {
        ensure_non_negative(amount_local)?;
        let rate = self.table.rate(currency)?;
        let usd = amount_local.checked_div(rate).ok_or_else(|| {
            PanelError::invalid_amount(format!(
                "Amount {} {} cannot be converted to USD",
                amount_local, currency
            ))
        })?;
        Ok(usd)
    }

    /// Round a computed minimum up to the currency's granularity.
    ///
    /// Ceiling only: a displayed minimum must never be lower than the one the
    /// backend enforces.
    pub fn round_minimum_up(&self, amount_local: Decimal, currency: CurrencyCode) -> Result<Decimal> {
        ensure_non_negative(amount_local)?;
        self.table.rate(currency)?;
        let Some(step) = currency.minimum_step() else {
            return Ok(amount_local);
        };
        amount_local
            .checked_div(step)
            .map(|units| units.ceil())
            .and_then(|units| units.checked_mul(step))
            .ok_or_else(|| {
                PanelError::invalid_amount(format!(
                    "Amount {} {} is too large to round",
                    amount_local, currency
                ))
            })
    }

    /// Round for display at the currency's precision, midpoint away from zero
    pub fn round_for_display(&self, amount_local: Decimal, currency: CurrencyCode) -> Result<Decimal> {
        ensure_non_negative(amount_local)?;
        self.table.rate(currency)?;
        Ok(amount_local.round_dp_with_strategy(
            currency.display_scale(),
            RoundingStrategy::MidpointAwayFromZero,
        ))
    }

    /// Floor at display precision, used for maximums such as an available balance
    pub fn round_balance_down(&self, amount_local: Decimal, currency: CurrencyCode) -> Result<Decimal> {
        ensure_non_negative(amount_local)?;
        self.table.rate(currency)?;
        Ok(amount_local.round_dp_with_strategy(currency.display_scale(), RoundingStrategy::ToZero))
    }
}

fn ensure_non_negative(amount: Decimal) -> Result<()> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(PanelError::invalid_amount(format!(
            "Amount must not be negative, got {}",
            amount
        )));
    }
    Ok(())
}
