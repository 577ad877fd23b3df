//! linkpanel - Admin panel core for the link service
//!
//! This library provides the state and logic behind the admin panel's list
//! views: filtering, bulk selection, bulk actions and multi-currency amounts.
//! Rendering is left to the embedding UI.
//!
//! # Features
//! - **cli**: Command-line interface (default)
//!
//! # Architecture
//! - `filter`: Immutable list query (search, facets, sort, page)
//! - `selection`: Explicit and all-matching bulk selection
//! - `bulk`: Bulk action requests, results and the submission coordinator
//! - `view`: Per-list controller wiring the above to a page fetcher
//! - `client`: Backend contracts and the REST implementation
//! - `currency`: Exchange-rate conversion, rounding and withdrawal checks
//! - `config`: Configuration management
//! - `system`: Logging setup
//! - `interfaces`: User interfaces (CLI)

pub mod bulk;
#[cfg(feature = "cli")]
pub mod cli;
pub mod client;
pub mod config;
pub mod currency;
pub mod errors;
pub mod filter;
#[cfg(feature = "cli")]
pub mod interfaces;
pub mod selection;
pub mod system;
pub mod view;
