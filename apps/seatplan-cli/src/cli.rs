use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use seatplan_editor::EditorSettings;

use crate::commands;

#[derive(Debug, Parser)]
#[command(name = "seatplan", about = "Inspect, check and repair venue seat-plan documents", version)]
pub struct Cli {
    /// JSON settings file; missing fields use defaults.
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List areas, grids, seat totals and icons.
    Inspect { document: PathBuf },

    /// Run the scene audit. Exits non-zero when errors are found.
    Check { document: PathBuf },

    /// Renumber every area and write the document back atomically.
    Renumber {
        document: PathBuf,
        /// Write here instead of overwriting the input.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the zoom and pan that fit the venue on a canvas.
    Fit {
        document: PathBuf,
        #[arg(long, default_value_t = 1280.0)]
        width: f64,
        #[arg(long, default_value_t = 800.0)]
        height: f64,
    },
}

pub fn run(cli: Cli) -> Result<ExitCode> {
    let settings = match &cli.settings {
        Some(path) => load_settings(path)?,
        None => EditorSettings::default(),
    };

    match cli.command {
        Commands::Inspect { document } => {
            let scene = commands::load_document(&document)?;
            print!("{}", commands::inspect(&scene));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check { document } => {
            let scene = commands::load_document(&document)?;
            let report = commands::check(&scene);
            print!("{}", report.text);
            log::debug!("Audit found {} errors and {} warnings", report.errors, report.warnings);
            Ok(if report.errors > 0 {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
        Commands::Renumber { document, output } => {
            let target = output.unwrap_or_else(|| document.clone());
            let seats = commands::renumber(&document, &target)?;
            println!("Renumbered {} seats into {}", seats, target.display());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Fit {
            document,
            width,
            height,
        } => {
            let scene = commands::load_document(&document)?;
            let viewport = commands::fit(&scene, width, height, &settings);
            println!(
                "zoom {:.4} pan ({:.2}, {:.2})",
                viewport.zoom, viewport.pan.x, viewport.pan.y
            );
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_settings(path: &Path) -> Result<EditorSettings> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading settings {}", path.display()))?;
    let settings = EditorSettings::from_json(&json)
        .with_context(|| format!("parsing settings {}", path.display()))?;
    log::debug!("Loaded settings from {}", path.display());
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_renumber_with_output() {
        let cli = Cli::try_parse_from(["seatplan", "-v", "renumber", "venue.json", "-o", "out.json"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Renumber { document, output } => {
                assert_eq!(document, PathBuf::from("venue.json"));
                assert_eq!(output, Some(PathBuf::from("out.json")));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_fit_defaults() {
        let cli = Cli::try_parse_from(["seatplan", "fit", "venue.json", "--width", "640"]).unwrap();
        match cli.command {
            Commands::Fit { width, height, .. } => {
                assert_eq!(width, 640.0);
                assert_eq!(height, 800.0);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
