// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration of the `tracing` subscriber used by Realty binaries.

use std::env;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// The environment variable selecting the log output format.
pub const LOG_FORMAT_VARIABLE: &str = "REALTY_LOG_FORMAT";

/// The format of log lines.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LogFormat {
    /// Human readable lines, colored when writing to a terminal.
    #[default]
    Plain,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    /// Reads the format from [`LOG_FORMAT_VARIABLE`], defaulting to [`LogFormat::Plain`].
    pub fn from_env() -> Self {
        match env::var(LOG_FORMAT_VARIABLE).as_deref() {
            Ok("json") => LogFormat::Json,
            _ => LogFormat::Plain,
        }
    }
}

/// Initializes tracing for the process named `log_name`.
///
/// The filter is read from `RUST_LOG`, defaulting to `info`. Calling this more than once is
/// harmless: later calls leave the first subscriber in place.
pub fn init(log_name: &str) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
        .from_env_lossy();

    let result = match LogFormat::from_env() {
        LogFormat::Plain => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(true))
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_current_span(true))
            .try_init(),
    };

    if result.is_ok() {
        ::tracing::debug!(%log_name, "Tracing initialized");
    }
}
