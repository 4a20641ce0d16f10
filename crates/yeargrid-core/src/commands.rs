use std::fs;
use std::path::Path;

use anyhow::Context;
use tracing::{info, instrument};

use crate::cli::Command;
use crate::config::GridConfig;
use crate::grid;
use crate::render::Renderer;
use crate::share;
use crate::svg;

#[instrument(skip(cfg, renderer, command, config_override))]
pub fn dispatch(
    cfg: &GridConfig,
    renderer: &mut Renderer,
    command: &Command,
    config_override: Option<&Path>,
) -> anyhow::Result<()> {
    match command {
        Command::Show => cmd_show(cfg, renderer),
        Command::Share { base, image } => cmd_share(cfg, base, *image),
        Command::Export { out } => cmd_export(cfg, out.as_deref()),
        Command::Save => cmd_save(cfg, config_override),
        Command::Config => cmd_config(cfg),
    }
}

#[instrument(skip(cfg, renderer))]
fn cmd_show(cfg: &GridConfig, renderer: &mut Renderer) -> anyhow::Result<()> {
    let grid = grid::build(cfg);
    renderer.print_grid(&grid, cfg)
}

#[instrument(skip(cfg, base))]
fn cmd_share(cfg: &GridConfig, base: &str, image: bool) -> anyhow::Result<()> {
    let url = if image {
        share::image_url(base, cfg)?
    } else {
        share::share_url(base, cfg)?
    };
    println!("{url}");
    Ok(())
}

#[instrument(skip(cfg, out))]
fn cmd_export(cfg: &GridConfig, out: Option<&Path>) -> anyhow::Result<()> {
    let grid = grid::build(cfg);
    let document = svg::render_svg(&grid, cfg);

    let default_name = format!("year-grid-{}.svg", cfg.date);
    let path = out.unwrap_or_else(|| Path::new(&default_name));

    fs::write(path, document)
        .with_context(|| format!("failed to write {}", path.display()))?;

    info!(file = %path.display(), cells = grid.cells.len(), "exported grid");
    println!("wrote {}", path.display());
    Ok(())
}

#[instrument(skip(cfg, config_override))]
fn cmd_save(cfg: &GridConfig, config_override: Option<&Path>) -> anyhow::Result<()> {
    let path = cfg.save(config_override)?;
    println!("saved {}", path.display());
    Ok(())
}

#[instrument(skip(cfg))]
fn cmd_config(cfg: &GridConfig) -> anyhow::Result<()> {
    print!("{}", cfg.to_toml()?);
    Ok(())
}
