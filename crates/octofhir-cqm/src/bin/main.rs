//! cqm command-line interface

use clap::{Parser, Subcommand};
use log::LevelFilter;
use octofhir_cqm::cli::{
    calculate,
    index,
    output::{self, ColorMode, OutputFormat},
};
use std::path::PathBuf;

/// cqm command-line tool
#[derive(Parser)]
#[command(name = "cqm")]
#[command(author, version, about = "CQL measure calculation and clause coverage", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Pretty, global = true)]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Color output
    #[arg(long, value_enum, default_value_t = ColorMode::Auto, global = true)]
    color: ColorMode,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate populations, relevance and coverage from raw engine results
    Calculate {
        /// Measure definition (JSON)
        #[arg(short, long)]
        measure: PathBuf,

        /// Raw engine results: one patient, or patient id to results
        #[arg(short, long)]
        results: PathBuf,

        /// Population set key, e.g. PopulationSet_1_Stratification_2
        #[arg(short, long = "population-set")]
        population_set: Option<String>,

        /// Include per-clause verdicts
        #[arg(short, long)]
        clauses: bool,

        /// Override the measure's supplemental data element setting
        #[arg(long = "calculate-sdes")]
        calculate_sdes: Option<bool>,
    },

    /// Print clause maps or statement dependencies of an ELM library
    Index {
        /// ELM library (JSON)
        #[arg(short, long)]
        elm: PathBuf,

        /// Only index this statement
        #[arg(short, long)]
        statement: Option<String>,

        /// Print the statement dependency graph instead of clauses
        #[arg(short, long, conflicts_with = "statement")]
        dependencies: bool,
    },
}

fn main() {
    human_panic::setup_panic!();

    let cli = Cli::parse();

    output::setup_colors(cli.color);

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let result = match cli.command {
        Commands::Calculate {
            measure,
            results,
            population_set,
            clauses,
            calculate_sdes,
        } => {
            let config = calculate::CalculateConfig {
                measure,
                results,
                population_set,
                clauses,
                calculate_sdes,
                verbose: cli.verbose,
                output_format: cli.format,
                output_file: cli.output.clone(),
            };
            calculate::calculate(config)
        }

        Commands::Index {
            elm,
            statement,
            dependencies,
        } => {
            let config = index::IndexConfig {
                elm,
                statement,
                dependencies,
                output_format: cli.format,
                output_file: cli.output.clone(),
            };
            index::index(config)
        }
    };

    if let Err(e) = result {
        eprintln!("{}", output::format_error(&e));
        std::process::exit(1);
    }
}
