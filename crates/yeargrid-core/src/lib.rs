pub mod cache;
pub mod calendar;
pub mod cli;
pub mod commands;
pub mod config;
pub mod grid;
pub mod label;
pub mod layout;
pub mod render;
pub mod share;
pub mod svg;

use std::ffi::OsString;

use anyhow::anyhow;
use clap::Parser;
use tracing::{debug, info};

#[tracing::instrument(skip_all)]
pub fn run(raw_args: Vec<OsString>) -> anyhow::Result<()> {
    let cli = cli::GlobalCli::parse_from(raw_args);

    cli::init_tracing(cli.verbose, cli.quiet)?;

    info!(
        verbose = cli.verbose,
        quiet = cli.quiet,
        "starting yeargrid CLI"
    );

    let mut cfg = match &cli.from {
        Some(token) => share::decode(token)
            .ok_or_else(|| anyhow!("could not decode share token"))?,
        None => config::GridConfig::load(cli.config.as_deref())?,
    };
    cli.apply_to(&mut cfg)?;
    debug!(date = %cfg.date, granularity = ?cfg.granularity, "effective configuration");

    let mut renderer = render::Renderer::new(cli.color.as_deref())?;
    let command = cli.command.clone().unwrap_or(cli::Command::Show);

    commands::dispatch(&cfg, &mut renderer, &command, cli.config.as_deref())?;

    info!("done");
    Ok(())
}
