//! # Euro5 Common Library
//!
//! Shared code for the Euro5 digest crates:
//! - Error and result types
//! - Configuration resolution (CLI → ENV → TOML → defaults)
//! - Timestamp parsing and formatting
//! - Localized string lookup

pub mod config;
pub mod error;
pub mod i18n;
pub mod time;

pub use error::{Error, Result};
pub use i18n::Locale;
