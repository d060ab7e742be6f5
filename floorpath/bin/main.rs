use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use floorpath::{
    build_graph, config::Config, logging, solve, util::load_inputs, Algorithm, SearchOutcome,
    WeightPolicy,
};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "floorpath",
    version,
    about = "Shortest paths across color-coded floor plans"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Log level (trace|debug|info|warn|error)
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Find the cheapest path from the red start pixels to the nearest green goal
    Solve {
        /// Image files or folders of .bmp floors, stacked in the given order
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// bfs|dijkstra (default: dijkstra). bfs only searches from the first start marker
        #[arg(long)]
        algorithm: Option<Algorithm>,
        /// multiplicative|fixed (default: multiplicative)
        #[arg(long)]
        weights: Option<WeightPolicy>,
        /// Weight of the links between floors (default: 5)
        #[arg(long, value_parser = parse_floor_weight)]
        floor_weight: Option<f64>,
        /// Print arrows instead of coordinates
        #[arg(long, conflicts_with = "json")]
        directions: bool,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print every node with its weighted edges and the terrain of each floor
    Dump {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[arg(long)]
        weights: Option<WeightPolicy>,
        #[arg(long, value_parser = parse_floor_weight)]
        floor_weight: Option<f64>,
    },
}

fn parse_floor_weight(s: &str) -> Result<f64, String> {
    floorpath::config::parse_weight(s).ok_or_else(|| format!("not a positive weight: {s}"))
}

#[derive(Serialize)]
struct Report<'a> {
    algorithm: Algorithm,
    weights: WeightPolicy,
    floors: usize,
    outcome: &'a SearchOutcome<f64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (paths, cli_cfg) = match &cli.command {
        Commands::Solve {
            paths,
            algorithm,
            weights,
            floor_weight,
            ..
        } => (
            paths,
            Config {
                weights: *weights,
                floor_weight: *floor_weight,
                algorithm: *algorithm,
                log_level: cli.log_level.clone(),
            },
        ),
        Commands::Dump {
            paths,
            weights,
            floor_weight,
        } => (
            paths,
            Config {
                weights: *weights,
                floor_weight: *floor_weight,
                algorithm: None,
                log_level: cli.log_level.clone(),
            },
        ),
    };

    // env > CLI
    let cfg = cli_cfg.overlay(Config::from_env_defaults());
    logging::init(cfg.log_level.as_deref());

    let rasters = load_inputs(paths).context("loading rasters")?;
    let graph = build_graph(&rasters, cfg.weights(), cfg.floor_weight()).context("building graph")?;

    match cli.command {
        Commands::Solve {
            directions, json, ..
        } => {
            let outcome = solve(&graph, cfg.algorithm())?;

            if json {
                let report = Report {
                    algorithm: cfg.algorithm(),
                    weights: cfg.weights(),
                    floors: graph.floor_count(),
                    outcome: &outcome,
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }

            match outcome {
                SearchOutcome::NoPathFound => println!("no path found"),
                SearchOutcome::PathFound(result) => {
                    if directions {
                        let arrows = result.directions()?;
                        println!(
                            "{}",
                            arrows
                                .iter()
                                .map(|d| d.to_string())
                                .collect::<Vec<_>>()
                                .join(" ")
                        );
                    } else {
                        for coordinate in &result.path {
                            println!("{}", coordinate);
                        }
                    }
                    println!(
                        "start {} | goal {} | steps {} | cost {}",
                        result.start,
                        result.goal,
                        result.steps(),
                        result.total_cost
                    );
                }
            }
        }
        Commands::Dump { .. } => {
            for (floor, map) in graph.floors().iter().enumerate() {
                println!("floor {}:", floor);
                print!("{}", map);
            }
            print!("{}", graph);
        }
    }

    Ok(())
}
