//! `transit flow`: solve the balanced station-to-station flow.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Args;
use serde::Serialize;
use tracing::info;
use transit_analysis::flow::{FlowOptions, FlowTarget, solve};
use transit_core::SolverStatus;
use transit_core::config::TransitConfig;
use transit_core::table::{load_targets, write_flows};

use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `transit flow`.
#[derive(Args, Debug)]
pub struct FlowArgs {
    /// Ridership-target table (`Nearest_Stop`, `Connections`, `ridership`).
    #[arg(long)]
    pub targets: PathBuf,

    /// Where to write the `from,to,ridership` flow table.
    #[arg(long)]
    pub out: PathBuf,

    /// Wall-clock limit for the solve (default from config, 300).
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

/// Report payload for `transit flow`.
#[derive(Debug, Serialize)]
pub struct FlowReport {
    status: SolverStatus,
    stations: usize,
    rows: usize,
    iterations: usize,
    max_residual: f64,
    imbalance: f64,
    regularizer: f64,
    out: PathBuf,
}

/// Execute `transit flow`.
pub fn run_flow(args: &FlowArgs, config: &TransitConfig, output: OutputMode) -> anyhow::Result<()> {
    let rows = load_targets(&args.targets)?;
    let targets: Vec<FlowTarget> = rows.iter().map(FlowTarget::from).collect();

    let mut options = FlowOptions::from(&config.flow);
    if let Some(secs) = args.timeout_secs {
        options.timeout = Duration::from_secs(secs);
    }

    let solution = solve(&targets, &options)
        .with_context(|| format!("solving flow for {}", args.targets.display()))?;

    let file = File::create(&args.out)
        .with_context(|| format!("creating {}", args.out.display()))?;
    write_flows(BufWriter::new(file), solution.rows())
        .with_context(|| format!("writing {}", args.out.display()))?;

    let n = solution.len();
    let report = FlowReport {
        status: solution.status,
        stations: n,
        rows: n * n.saturating_sub(1),
        iterations: solution.iterations,
        max_residual: solution.max_residual,
        imbalance: solution.imbalance,
        regularizer: solution.regularizer,
        out: args.out.clone(),
    };
    info!(rows = report.rows, out = %args.out.display(), "wrote flow table");

    render_mode(output, &report, render_flow_text, render_flow_pretty)
}

fn render_flow_text(report: &FlowReport, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "status\t{}", report.status)?;
    writeln!(w, "stations\t{}", report.stations)?;
    writeln!(w, "rows\t{}", report.rows)?;
    writeln!(w, "iterations\t{}", report.iterations)?;
    writeln!(w, "max_residual\t{:e}", report.max_residual)?;
    writeln!(w, "imbalance\t{}", report.imbalance)?;
    writeln!(w, "regularizer\t{:.6}", report.regularizer)?;
    writeln!(w, "out\t{}", report.out.display())
}

fn render_flow_pretty(report: &FlowReport, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Balanced flow")?;
    pretty_kv(w, "Status", report.status.to_string())?;
    pretty_kv(w, "Stations", report.stations.to_string())?;
    pretty_kv(w, "Flow rows", report.rows.to_string())?;
    pretty_kv(w, "Iterations", report.iterations.to_string())?;
    pretty_kv(w, "Max residual", format!("{:.3e}", report.max_residual))?;
    pretty_kv(w, "Imbalance", format!("{}", report.imbalance))?;
    pretty_kv(w, "Flow variance term", format!("{:.4}", report.regularizer))?;
    pretty_kv(w, "Written to", report.out.display().to_string())
}
