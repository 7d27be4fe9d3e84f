//! `transit rank`: top stations by degree, betweenness and closeness.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{ArgGroup, Args};
use serde::Serialize;
use transit_analysis::metrics::ranking::{
    RankedStation, RankingOptions, rank_by_betweenness, rank_by_closeness, rank_by_degree,
};
use transit_core::config::TransitConfig;

use super::load_graph;
use crate::output::{OutputMode, pretty_rule, pretty_section, render_mode};

/// Arguments for `transit rank`.
///
/// When only one edge table is given it serves both networks.
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("networks").required(true).multiple(true).args(["od_edges", "pn_edges"])))]
pub struct RankArgs {
    /// Origin-destination edge table; ranked by ridership degree.
    #[arg(long)]
    pub od_edges: Option<PathBuf>,

    /// Physical-network edge table; ranked by betweenness and closeness.
    #[arg(long)]
    pub pn_edges: Option<PathBuf>,

    /// Node table with station attributes.
    #[arg(long)]
    pub nodes: Option<PathBuf>,

    /// Number of stations per table (default from config, 10).
    #[arg(long)]
    pub top: Option<usize>,
}

#[derive(Debug, Serialize)]
struct RankTable {
    centrality: String,
    network: &'static str,
    entries: Vec<RankedStation>,
}

/// Report payload for `transit rank`.
#[derive(Debug, Serialize)]
pub struct RankReport {
    top: usize,
    tables: Vec<RankTable>,
}

/// Execute `transit rank`.
pub fn run_rank(args: &RankArgs, config: &TransitConfig, output: OutputMode) -> anyhow::Result<()> {
    let top = args.top.unwrap_or(config.ranking.top_k);
    let options = RankingOptions::from(&config.ranking);

    let (od_edges, pn_edges) = match (&args.od_edges, &args.pn_edges) {
        (Some(od), Some(pn)) => (od, pn),
        (Some(only), None) | (None, Some(only)) => (only, only),
        (None, None) => anyhow::bail!("rank needs --od-edges or --pn-edges"),
    };

    let od = load_graph(
        od_edges,
        args.nodes.as_deref(),
        config.graph.od_weight_column.as_deref(),
        config,
    )?;
    let pn = load_graph(
        pn_edges,
        args.nodes.as_deref(),
        config.graph.pn_weight_column.as_deref(),
        config,
    )?;

    let tables = [
        ("od", rank_by_degree(&od, options.weighted_degree)),
        ("pn", rank_by_betweenness(&pn, options.weighted_betweenness)),
        ("pn", rank_by_closeness(&pn)),
    ]
    .into_iter()
    .map(|(network, ranking)| RankTable {
        centrality: ranking.centrality.to_string(),
        network,
        entries: ranking.top(top).to_vec(),
    })
    .collect();

    let report = RankReport { top, tables };
    render_mode(output, &report, render_rank_text, render_rank_pretty)
}

fn render_rank_text(report: &RankReport, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "centrality\trank\tstation\tscore")?;
    for table in &report.tables {
        for entry in &table.entries {
            writeln!(
                w,
                "{}\t{}\t{}\t{}",
                table.centrality,
                entry.rank,
                entry.key.to_literal(),
                entry.score
            )?;
        }
    }
    Ok(())
}

fn render_rank_pretty(report: &RankReport, w: &mut dyn Write) -> io::Result<()> {
    for (i, table) in report.tables.iter().enumerate() {
        if i > 0 {
            writeln!(w)?;
        }
        pretty_section(
            w,
            &format!(
                "Top {} by {} ({} network)",
                report.top,
                table.centrality,
                table.network.to_uppercase()
            ),
        )?;
        writeln!(w, "{:>4}  {:<48} {:>14}", "RANK", "STATION", "SCORE")?;
        for entry in &table.entries {
            writeln!(
                w,
                "{:>4}  {:<48} {:>14.4}",
                entry.rank,
                entry.key.to_string(),
                entry.score
            )?;
        }
        if table.entries.is_empty() {
            writeln!(w, "(no stations)")?;
        }
    }
    pretty_rule(w)
}
