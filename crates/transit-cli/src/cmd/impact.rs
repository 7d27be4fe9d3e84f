//! `transit impact`: what closing specific stations does to the network.

use std::io::{self, Write};

use clap::Args;
use transit_analysis::robustness::impact::MetricChange;
use transit_analysis::robustness::{ImpactReport, assess_impact};
use transit_core::StationKey;
use transit_core::config::TransitConfig;

use super::GraphArgs;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `transit impact`.
#[derive(Args, Debug)]
pub struct ImpactArgs {
    #[command(flatten)]
    pub graph: GraphArgs,

    /// Station to close, as a literal key such as "('Times Sq', '1')".
    /// Repeat to close several stations, in order.
    #[arg(long = "station", required = true)]
    pub stations: Vec<StationKey>,
}

/// Execute `transit impact`.
pub fn run_impact(
    args: &ImpactArgs,
    config: &TransitConfig,
    output: OutputMode,
) -> anyhow::Result<()> {
    let graph = args
        .graph
        .load(config, config.graph.pn_weight_column.as_deref())?;
    let report = assess_impact(&graph, &args.stations)?;
    render_mode(output, &report, render_impact_text, render_impact_pretty)
}

fn delta(change: &MetricChange) -> String {
    change
        .percent_change
        .map_or_else(|| "n/a".to_string(), |p| format!("{p:+.2}%"))
}

fn render_impact_text(report: &ImpactReport, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "metric\tinitial\tvalue\tdelta")?;
    for (name, change) in [
        ("largest_component", &report.largest_component_fraction),
        ("average_path_length", &report.average_path_length),
        ("efficiency", &report.efficiency),
    ] {
        writeln!(
            w,
            "{name}\t{:.3}\t{:.3}\t{}",
            change.initial,
            change.value,
            delta(change)
        )?;
    }
    Ok(())
}

fn render_impact_pretty(report: &ImpactReport, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Impact of closing stations")?;
    for key in &report.removed {
        writeln!(w, "  - {key}")?;
    }
    writeln!(w)?;
    for (name, change) in [
        ("Largest component", &report.largest_component_fraction),
        ("Average path length", &report.average_path_length),
        ("Network efficiency", &report.efficiency),
    ] {
        pretty_kv(w, name, format!("{:.3} ({})", change.value, delta(change)))?;
    }
    Ok(())
}
