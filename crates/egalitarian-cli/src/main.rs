use clap::{Parser, Subcommand};
use egalitarian_alloc::{EgalitarianAllocator, ValuationMatrix};
use egalitarian_solver::Solver;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "egalitarian")]
#[command(about = "Max-min fair division of divisible resources", long_about = None)]
struct Cli {
    /// Log solver progress (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the egalitarian allocation for a valuation matrix
    Solve {
        /// JSON file holding the matrix, one row per player
        file: Option<PathBuf>,
        /// The matrix inline, e.g. '[[1,19,80],[20,1,79]]'
        #[arg(long, conflicts_with = "file")]
        valuations: Option<String>,
        /// Output format (json, pretty)
        #[arg(short, long, default_value = "pretty")]
        format: String,
        /// Maximum simplex pivots per phase
        #[arg(long, default_value_t = 10000)]
        max_iterations: usize,
        /// Pivot and optimality tolerance
        #[arg(long, default_value_t = 1e-9)]
        tolerance: f64,
    },
    /// Check a valuation matrix file for errors
    Check {
        /// The file to check
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    match cli.command {
        Commands::Solve {
            file,
            valuations,
            format,
            max_iterations,
            tolerance,
        } => {
            let source = match (file, valuations) {
                (_, Some(inline)) => inline,
                (Some(path), None) => read_file(&path),
                (None, None) => {
                    eprintln!("Error: provide a valuations file or --valuations");
                    std::process::exit(1);
                }
            };
            let matrix = parse_matrix(&source);

            let solver = Solver::new()
                .with_max_iterations(max_iterations)
                .with_tolerance(tolerance);
            let allocation = match EgalitarianAllocator::new().with_solver(solver).allocate(&matrix) {
                Ok(a) => a,
                Err(e) => {
                    eprintln!("Allocation error: {}", e);
                    std::process::exit(1);
                }
            };

            if format == "json" {
                match serde_json::to_string_pretty(&allocation) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Error serializing allocation: {}", e);
                        std::process::exit(1);
                    }
                }
            } else {
                println!("Players: {}", matrix.num_players());
                println!("Resources: {}", matrix.num_resources());
                println!();
                println!("Status: OPTIMAL");
                println!("Minimum utility: {:.4}", allocation.floor());
                println!();
                println!("Utilities:");
                for (player, utility) in allocation.utilities().iter().enumerate() {
                    println!("  player {:<4} {:12.4}", player, utility);
                }
                println!();
                println!("{}", allocation.report());
            }
        }
        Commands::Check { file } => {
            let source = read_file(&file);
            let matrix = parse_matrix(&source);

            println!("✓ {} is valid", file.display());
            println!("  {} players", matrix.num_players());
            println!("  {} resources", matrix.num_resources());
        }
    }
}

fn read_file(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            std::process::exit(1);
        }
    }
}

/// Parse and validate a JSON matrix; deserialization runs the same checks as `ValuationMatrix::new`
fn parse_matrix(source: &str) -> ValuationMatrix {
    match serde_json::from_str(source) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Invalid valuations: {}", e);
            std::process::exit(1);
        }
    }
}
