// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `xkt-lite` command-line tool.

mod config;
mod scene;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use xkt_lite_format::{read_header, read_xkt, validate, write_xkt, Element};

use config::Config;
use scene::Scene;

#[derive(Parser)]
#[command(name = "xkt-lite", version, about = "Convert JSON scenes to XKT v6 files")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build an XKT file from a JSON scene
    Convert {
        /// Input scene (.json)
        input: PathBuf,
        /// Output .xkt file path
        #[arg(long, short)]
        output: PathBuf,
        /// Read the output back and compare it with the model
        #[arg(long)]
        validate: bool,
        /// Crease angle in degrees for edge extraction [env: XKT_EDGE_THRESHOLD]
        #[arg(long)]
        edge_threshold: Option<f64>,
        /// Minimum KD-tree node diagonal [env: XKT_MIN_TILE_DIAG]
        #[arg(long)]
        min_tile_diag: Option<f64>,
        /// zlib level 0-9 [env: XKT_COMPRESSION_LEVEL]
        #[arg(long)]
        compression: Option<u32>,
    },
    /// Print the header and array sizes of an XKT file
    Inspect {
        /// Input .xkt file
        input: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Convert {
            input,
            output,
            validate,
            edge_threshold,
            min_tile_diag,
            compression,
        } => {
            let config = Config::from_env().with_overrides(edge_threshold, min_tile_diag, compression);
            convert(&input, &output, validate, &config)
        }
        Command::Inspect { input } => inspect(&input),
    }
}

fn convert(input: &Path, output: &Path, check: bool, config: &Config) -> anyhow::Result<()> {
    config.validate()?;
    tracing::info!(
        input = %input.display(),
        edge_threshold = config.model.edge_threshold_degrees,
        min_tile_diag = config.model.min_tile_diagonal,
        compression = config.writer.compression_level,
        "Converting scene"
    );

    let model = Scene::load(input)?.build_model(config.model)?;
    if !model.diagnostics().is_empty() {
        tracing::warn!(count = model.diagnostics().len(), "Scene produced diagnostics");
    }

    let bytes = write_xkt(&model, &config.writer)?;
    std::fs::write(output, &bytes).with_context(|| format!("writing {}", output.display()))?;
    tracing::info!(output = %output.display(), bytes = bytes.len(), "Wrote XKT");

    if check {
        let report = validate(&bytes, &model);
        if !report.is_valid() {
            bail!("validation failed with {} mismatches", report.failures.len());
        }
        tracing::info!("Validation passed");
    }
    Ok(())
}

fn inspect(input: &Path) -> anyhow::Result<()> {
    let bytes = std::fs::read(input).with_context(|| format!("reading {}", input.display()))?;
    let header = read_header(&bytes)?;
    let data = read_xkt(&bytes)?;

    println!("version:    {}", header.version);
    println!("size:       {} bytes", bytes.len());
    println!("primitives: {}", data.primitive_count());
    println!("instances:  {}", data.primitive_instances.len());
    println!("entities:   {}", data.entity_count());
    println!("tiles:      {}", data.tile_count());
    println!();
    println!("{:<42} {:>12}", "element", "compressed");
    for (element, size) in Element::ALL.iter().zip(&header.element_sizes) {
        println!("{:<42} {:>12}", element.name(), size);
    }
    Ok(())
}
