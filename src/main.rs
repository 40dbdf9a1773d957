use case_atlas::{config, data, server, view};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the dashboard
    Serve {
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
    /// Load both input files and print what was found, without serving
    Check {
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Serve { config } => {
            let app_config = config::AppConfig::resolve(config.as_deref())?;

            // Inputs are read once, before the listener exists.
            let dataset = data::load_data(&app_config)?;

            server::start_server(app_config, dataset).await?;
        }
        Commands::Check { config } => {
            let app_config = config::AppConfig::resolve(config.as_deref())?;
            let dataset = data::load_data(&app_config)?;
            let map = view::compose(&dataset, &app_config.map);

            println!("Regions ({}):", dataset.regions.len());
            for region in &dataset.regions {
                println!(
                    "  {:<12} label at ({:.4}, {:.4})",
                    region.name,
                    region.centroid.y(),
                    region.centroid.x()
                );
            }

            let mut firms: BTreeMap<&str, usize> = BTreeMap::new();
            for case in &dataset.cases {
                *firms.entry(case.firm.as_str()).or_default() += 1;
            }
            println!("Cases: {} across {} firms", dataset.cases.len(), firms.len());
            for (firm, count) in &firms {
                println!("  {:<24} {}", firm, count);
            }
            println!(
                "View: {} layers, zoom {}, center ({}, {})",
                map.layers.len(),
                map.zoom,
                map.center.lat,
                map.center.lon
            );
        }
    }

    Ok(())
}
