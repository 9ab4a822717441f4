//! YatraNav - Scan-tour planner CLI
//!
//! Reads a planning request from a JSON scenario file, runs the
//! planner, and prints the response JSON to stdout.
//!
//! # Usage
//!
//! ```bash
//! yatra-nav scenario.json
//! yatra-nav --config yatra.toml scenario.json
//! ```

use std::path::Path;
use std::time::Instant;

use tracing::info;

use yatra_nav::api::{plan, AlgoInput, PlanResponse};
use yatra_nav::config::PlannerConfig;
use yatra_nav::error::{PlanError, Result};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("yatra_nav=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();

    let mut config_path: Option<String> = None;
    let mut scenario_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                config_path = args.get(i + 1).cloned();
                i += 1;
            }
            "--help" | "-h" => {
                print_usage(&args[0]);
                return Ok(());
            }
            arg if !arg.starts_with('-') => {
                if scenario_path.is_some() {
                    return Err(PlanError::Config(
                        "multiple scenario files specified".into(),
                    ));
                }
                scenario_path = Some(arg.to_string());
            }
            arg => {
                return Err(PlanError::Config(format!("unknown argument: {}", arg)));
            }
        }
        i += 1;
    }

    let Some(scenario_path) = scenario_path else {
        print_usage(&args[0]);
        return Err(PlanError::Config("no scenario file specified".into()));
    };

    let config = match config_path {
        Some(path) => {
            info!("Loading configuration from {}", path);
            PlannerConfig::load(Path::new(&path))?
        }
        None if Path::new("yatra.toml").exists() => {
            info!("Loading configuration from yatra.toml");
            PlannerConfig::load(Path::new("yatra.toml"))?
        }
        None => {
            info!("Using default configuration");
            PlannerConfig::default()
        }
    };

    info!("YatraNav v{}", env!("CARGO_PKG_VERSION"));

    let input_json = std::fs::read_to_string(&scenario_path)?;
    let input: AlgoInput = serde_json::from_str(&input_json)?;

    let started = Instant::now();
    let result = plan(&input, &config);
    let response = PlanResponse::from_result(result, started.elapsed());

    println!(
        "{}",
        serde_json::to_string_pretty(&response)
            .map_err(|e| PlanError::Config(e.to_string()))?
    );

    if response.status == "failed" {
        std::process::exit(1);
    }
    Ok(())
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} [--config <file.toml>] <scenario.json>", program);
    eprintln!();
    eprintln!("The scenario file holds one planning request, e.g.:");
    eprintln!(
        "{}",
        r#"  {
    "mode": "live",
    "obstacles": [ { "id": 1, "x": 15, "y": 10, "d": "W" } ],
    "initial_position": { "x": 1, "y": 1, "theta": 0.0 },
    "algo_type": "Exhaustive Astar"
  }"#
    );
}
