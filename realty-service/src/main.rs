// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use realty_base::identifiers::{AccountAddress, ObjectId};
use realty_service::{
    config::RealtyConfig,
    demo,
    listings::{listing_details, packages_table, render_catalog},
};
use tracing::debug;

/// Client of the Realty dApp.
#[derive(Debug, Parser)]
#[command(name = "realty", version, about)]
struct RealtyOptions {
    /// Path to the TOML configuration. Built-in values are used when omitted.
    #[arg(long, env = "REALTY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the properties of the catalogue.
    Listings {
        /// Only show properties still for sale.
        #[arg(long)]
        available: bool,
    },

    /// Show the details of one property.
    Show { id: ObjectId },

    /// Run every submission flow against an in-memory ledger.
    Demo {
        /// The account connected to the in-memory wallet.
        #[arg(long, default_value = "0xabc")]
        account: AccountAddress,
    },

    /// Print the deployed packages.
    Packages,

    /// Print the effective configuration, or write it to a file.
    Config {
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    realty_base::tracing::init("realty");
    let options = RealtyOptions::parse();
    let config = RealtyConfig::read_or_default(options.config.as_deref())?;
    debug!(network = %config.network, "Configuration loaded");

    match options.command {
        Command::Listings { available } => {
            println!("{}", render_catalog(&config.catalog(), available));
        }

        Command::Show { id } => {
            let catalog = config.catalog();
            let listing = catalog
                .get(&id)
                .with_context(|| format!("No property with id {id}"))?;
            println!("{}", listing_details(listing));
        }

        Command::Demo { account } => {
            let report = demo::run(&config, account).await?;
            for (kind, value) in &report.counter_values {
                println!("{kind:>16}: counter {} = {value}", report.counter);
            }
            println!();
            println!("{}", listing_details(&report.listing));
            println!();
            println!("{}", render_catalog(&report.catalog, false));
        }

        Command::Packages => println!("{}", packages_table(&config)),

        Command::Config { output } => match output {
            Some(path) => {
                config.write(&path)?;
                println!("Configuration written to {}", path.display());
            }
            None => print!("{}", config.to_toml()?),
        },
    }

    Ok(())
}
