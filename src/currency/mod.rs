//! Multi-currency amount conversion
//!
//! - `code`: supported currencies and their rounding granularity
//! - `converter`: static rate table and pure USD ↔ local conversion
//! - `withdrawal`: balance/minimum quote and entered-amount validation

mod code;
mod converter;
mod withdrawal;

pub use code::CurrencyCode;
pub use converter::{CurrencyConverter, RateTable};
pub use withdrawal::{CurrencyAmount, WithdrawalCalculator, WithdrawalPolicy, WithdrawalQuote};
