//! Configuration management
//!
//! Wallet settings load from TOML and can be overridden from the
//! environment. Settings are plain values handed to the accounts that
//! need them.

pub mod settings;

pub use settings::Settings;
