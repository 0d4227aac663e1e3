use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use hexbin_heatmap::config::HeatmapConfig;
use hexbin_heatmap::export::write_render_model;
use hexbin_heatmap::legend::print_legend;
use hexbin_heatmap::loader::load_observations;
use hexbin_heatmap::observation::{Observation, synthetic_observations};
use hexbin_heatmap::render::{HeatmapSession, ViewportEvent};
use hexbin_heatmap::{H3Grid, HeatmapError, Result};

/// Hexagonal density heatmap of geo-tagged observations
#[derive(Parser, Debug)]
#[command(name = "hexbin-heatmap", version, about)]
struct Cli {
    /// JSON config file (palette, resolution band, data layout)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Observation file; overrides the path in the config
    #[arg(long, value_name = "FILE")]
    data: Option<PathBuf>,

    /// Map zoom to render; repeat to replay a sequence of viewport changes
    #[arg(long, allow_negative_numbers = true)]
    zoom: Vec<f64>,

    /// Use N generated observations instead of a data file
    #[arg(long, value_name = "N")]
    synthetic: Option<usize>,

    /// Seed for --synthetic
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Write GeoJSON and legend files here
    #[arg(long, value_name = "DIR")]
    out: Option<PathBuf>,
}

fn load_input(cli: &Cli, config: &HeatmapConfig) -> Result<Vec<Observation>> {
    if let Some(count) = cli.synthetic {
        info!("Generating {} synthetic observations (seed {})", count, cli.seed);
        return Ok(synthetic_observations(count, cli.seed, 12));
    }

    let path = cli
        .data
        .clone()
        .or_else(|| config.data.path.clone())
        .ok_or_else(|| HeatmapError::InvalidConfig("no data file given (use --data or --synthetic)".to_string()))?;
    load_observations(path, &config.data)
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => HeatmapConfig::load(path)?,
        None => HeatmapConfig::default(),
    };
    config.resolve_access_token();

    let observations = load_input(&cli, &config)?;
    let mut session = HeatmapSession::new(H3Grid, config, observations)?;

    let events: Vec<ViewportEvent> = if cli.zoom.is_empty() {
        vec![ViewportEvent::default()]
    } else {
        cli.zoom.iter().map(|zoom| ViewportEvent::at_zoom(*zoom)).collect()
    };

    for event in events {
        let model = session.build(event)?;
        print_legend(&model, session.config());
        if let Some(dir) = &cli.out {
            write_render_model(dir, &model)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
