//! Utils

use std::path::PathBuf;

use clap::{Args, Parser};

use crate::checkout::PaymentMethod;

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingArgs {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Arguments for the cart example
#[derive(Debug, Parser)]
pub struct ExampleCartArgs {
    /// Fixture set to fill the cart from
    #[arg(short, long, default_value = "storefront")]
    pub fixture: String,

    /// Directory to persist the cart in; kept in memory when omitted
    #[arg(short, long)]
    pub store_dir: Option<PathBuf>,

    /// Key the cart is stored under
    #[arg(short, long, default_value = "cart")]
    pub key: String,

    /// Payment method used at checkout
    #[arg(short, long, value_enum, default_value_t = PaymentMethod::Cash)]
    pub payment: PaymentMethod,

    /// Logging settings
    #[command(flatten)]
    pub logging: LoggingArgs,
}
