//! Supported display currencies

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::errors::PanelError;

/// 显示币种
///
/// USD is the canonical unit every amount is stored and transmitted in;
/// the rest are display currencies for the withdrawal flow.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    AsRefStr,
    Display,
)]
#[serde(try_from = "String", into = "String")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum CurrencyCode {
    Usd,
    Idr,
    Myr,
    Sgd,
    Eur,
    Gbp,
    Inr,
    Php,
}

impl CurrencyCode {
    /// Parse a user or config supplied code, case-insensitively.
    pub fn parse(code: &str) -> Result<Self, PanelError> {
        Self::from_str(code.trim()).map_err(|_| {
            PanelError::unsupported_currency(format!("Unsupported currency: '{}'", code))
        })
    }

    /// Granularity a displayed minimum is rounded up to, `None` for no rounding.
    pub fn minimum_step(self) -> Option<Decimal> {
        match self {
            Self::Idr => Some(Decimal::from(1000)),
            Self::Myr | Self::Sgd => Some(Decimal::ONE),
            Self::Eur | Self::Gbp => Some(Decimal::new(5, 1)),
            _ => None,
        }
    }

    /// Decimal places shown for amounts in this currency
    pub fn display_scale(self) -> u32 {
        match self {
            Self::Idr => 0,
            _ => 2,
        }
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = PanelError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.as_ref().to_string()
    }
}
