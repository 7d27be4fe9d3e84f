#![forbid(unsafe_code)]

mod cmd;
mod output;

use std::env;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use output::OutputMode;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use transit_core::config::{TransitConfig, load_config};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "transit: network resilience and balanced-flow analysis",
    long_about = None
)]
struct Cli {
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (pretty, text, json).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Configuration file (default: ./transit.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        output::resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Summarize a station network",
        long_about = "Load a station network and report its size, degree, connectivity and efficiency.",
        after_help = "EXAMPLES:\n    # Summarize the physical network\n    transit summary --edges pn_edges.csv --nodes nodes.csv\n\n    # Emit machine-readable output\n    transit summary --edges pn_edges.csv --json"
    )]
    Summary(cmd::summary::SummaryArgs),

    #[command(
        about = "Rank stations by centrality",
        long_about = "Rank stations by ridership degree on the origin-destination network and by betweenness and closeness on the physical network.",
        after_help = "EXAMPLES:\n    # Top ten stations for every centrality\n    transit rank --od-edges od_edges.csv --pn-edges pn_edges.csv\n\n    # Top five only\n    transit rank --od-edges od_edges.csv --pn-edges pn_edges.csv --top 5"
    )]
    Rank(cmd::rank::RankArgs),

    #[command(
        about = "Simulate station-removal attacks",
        long_about = "Remove stations in random or centrality order and sample connectivity after each removal.",
        after_help = "EXAMPLES:\n    # Betweenness attack on 30% of stations\n    transit attack --edges pn_edges.csv --strategy betweenness --fraction 0.3\n\n    # Every strategy, reproducible random order\n    transit attack --edges pn_edges.csv --strategy all --seed 42 --json"
    )]
    Attack(cmd::attack::AttackArgs),

    #[command(
        about = "Assess the impact of closing stations",
        long_about = "Remove the given stations in order and report how efficiency, path length and the largest component change.",
        after_help = "EXAMPLES:\n    # Close two stations\n    transit impact --edges pn_edges.csv --station \"('Times Sq', '1')\" --station \"('Penn', '1')\""
    )]
    Impact(cmd::impact::ImpactArgs),

    #[command(
        about = "Solve a balanced flow between stations",
        long_about = "Find a symmetric flow between every station pair whose totals match the ridership targets, and write it as CSV.",
        after_help = "EXAMPLES:\n    # Solve and write the flow table\n    transit flow --targets ridership.csv --out flows.csv\n\n    # Give the solver a minute at most\n    transit flow --targets ridership.csv --out flows.csv --timeout-secs 60"
    )]
    Flow(cmd::flow::FlowArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("TRANSIT_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "transit=debug,info"
        } else {
            "transit=info,warn"
        })
    });

    let format = env::var("TRANSIT_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = cli.output_mode();
    let cwd = env::current_dir()?;
    let config: TransitConfig = match load_config(cli.config.as_deref(), &cwd) {
        Ok(config) => config,
        Err(err) => {
            output::render_failure(output, &err)?;
            return Err(err);
        }
    };
    debug!(?output, "resolved output mode");

    let command_result = match &cli.command {
        Commands::Summary(args) => cmd::summary::run_summary(args, &config, output),
        Commands::Rank(args) => cmd::rank::run_rank(args, &config, output),
        Commands::Attack(args) => cmd::attack::run_attack(args, &config, output),
        Commands::Impact(args) => cmd::impact::run_impact(args, &config, output),
        Commands::Flow(args) => cmd::flow::run_flow(args, &config, output),
    };

    if let Err(err) = &command_result {
        output::render_failure(output, err)?;
    }
    command_result
}
