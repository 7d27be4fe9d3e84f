//! `transit summary`: headline statistics of a station network.

use std::io::{self, Write};

use clap::Args;
use transit_analysis::GraphSummary;
use transit_core::config::TransitConfig;

use super::GraphArgs;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `transit summary`.
#[derive(Args, Debug)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub graph: GraphArgs,

    /// Report degree as track count instead of ridership.
    #[arg(long)]
    pub unweighted: bool,
}

/// Execute `transit summary`.
pub fn run_summary(
    args: &SummaryArgs,
    config: &TransitConfig,
    output: OutputMode,
) -> anyhow::Result<()> {
    let graph = args
        .graph
        .load(config, config.graph.pn_weight_column.as_deref())?;
    let weighted = config.ranking.weighted_degree && !args.unweighted;
    let summary = GraphSummary::from_graph(&graph, weighted);
    render_mode(output, &summary, render_summary_text, render_summary_pretty)
}

fn render_summary_text(summary: &GraphSummary, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "stations\t{}", summary.station_count)?;
    writeln!(w, "tracks\t{}", summary.track_count)?;
    writeln!(w, "mean_degree\t{:.4}", summary.mean_degree)?;
    writeln!(w, "max_degree\t{:.4}", summary.max_degree)?;
    writeln!(w, "components\t{}", summary.component_count)?;
    writeln!(w, "largest_component\t{}", summary.largest_component_size)?;
    writeln!(w, "efficiency\t{:.4}", summary.global_efficiency)?;
    writeln!(w, "content_hash\t{}", summary.content_hash)
}

fn render_summary_pretty(summary: &GraphSummary, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Network summary")?;
    pretty_kv(w, "Stations", summary.station_count.to_string())?;
    pretty_kv(w, "Tracks", summary.track_count.to_string())?;
    let degree = if summary.weighted {
        "ridership"
    } else {
        "tracks"
    };
    pretty_kv(
        w,
        "Mean degree",
        format!("{:.2} ({degree})", summary.mean_degree),
    )?;
    pretty_kv(w, "Max degree", format!("{:.2}", summary.max_degree))?;
    pretty_kv(w, "Components", summary.component_count.to_string())?;
    pretty_kv(
        w,
        "Largest component",
        summary.largest_component_size.to_string(),
    )?;
    pretty_kv(w, "Global efficiency", format!("{:.4}", summary.global_efficiency))?;
    pretty_kv(w, "Content hash", &summary.content_hash)
}
