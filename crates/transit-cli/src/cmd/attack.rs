//! `transit attack`: robustness curves under station removal.

use std::io::{self, Write};

use clap::{Args, ValueEnum};
use serde::Serialize;
use transit_analysis::robustness::{
    AttackOptions, AttackRun, AttackStrategy, simulate, simulate_all,
};
use transit_core::config::TransitConfig;

use super::GraphArgs;
use crate::output::{OutputMode, opt_metric, pretty_kv, pretty_section, render_mode};

/// Strategy selector; `all` runs every strategy in parallel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    Random,
    Degree,
    Betweenness,
    Closeness,
    All,
}

impl StrategyArg {
    const fn strategy(self) -> Option<AttackStrategy> {
        match self {
            Self::Random => Some(AttackStrategy::Random),
            Self::Degree => Some(AttackStrategy::Degree),
            Self::Betweenness => Some(AttackStrategy::Betweenness),
            Self::Closeness => Some(AttackStrategy::Closeness),
            Self::All => None,
        }
    }
}

/// Arguments for `transit attack`.
#[derive(Args, Debug)]
pub struct AttackArgs {
    #[command(flatten)]
    pub graph: GraphArgs,

    /// Removal order.
    #[arg(long, value_enum, default_value = "all")]
    pub strategy: StrategyArg,

    /// Fraction of stations to remove (default from config, 0.99).
    #[arg(long)]
    pub fraction: Option<f64>,

    /// Seed for the random strategy.
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Report payload for `transit attack`.
#[derive(Debug, Serialize)]
pub struct AttackReport {
    runs: Vec<AttackRun>,
}

/// Execute `transit attack`.
pub fn run_attack(
    args: &AttackArgs,
    config: &TransitConfig,
    output: OutputMode,
) -> anyhow::Result<()> {
    let graph = args
        .graph
        .load(config, config.graph.pn_weight_column.as_deref())?;

    let mut options = AttackOptions::from(config);
    if let Some(fraction) = args.fraction {
        options.fraction = fraction;
    }
    if args.seed.is_some() {
        options.seed = args.seed;
    }

    let runs = match args.strategy.strategy() {
        Some(strategy) => vec![simulate(&graph, strategy, &options)?],
        None => simulate_all(&graph, &options)?,
    };

    let report = AttackReport { runs };
    render_mode(output, &report, render_attack_text, render_attack_pretty)
}

fn render_attack_text(report: &AttackReport, w: &mut dyn Write) -> io::Result<()> {
    writeln!(
        w,
        "strategy\tstep\tfraction_removed\tlargest_component\taverage_path_length\tefficiency"
    )?;
    for run in &report.runs {
        for s in &run.samples {
            writeln!(
                w,
                "{}\t{}\t{:.6}\t{:.6}\t{}\t{}",
                run.strategy,
                s.step,
                s.fraction_removed,
                s.largest_component_fraction,
                s.average_path_length
                    .map_or_else(|| "-".to_string(), |v| format!("{v:.6}")),
                s.efficiency
                    .map_or_else(|| "-".to_string(), |v| format!("{v:.6}")),
            )?;
        }
    }
    Ok(())
}

fn render_attack_pretty(report: &AttackReport, w: &mut dyn Write) -> io::Result<()> {
    for (i, run) in report.runs.iter().enumerate() {
        if i > 0 {
            writeln!(w)?;
        }
        pretty_section(w, &format!("{} attack", capitalize(&run.strategy.to_string())))?;
        pretty_kv(w, "Stations", run.node_count.to_string())?;
        pretty_kv(w, "Removed", run.removed().to_string())?;
        if let Some(seed) = run.seed {
            pretty_kv(w, "Seed", seed.to_string())?;
        }
        if let Some(step) = run.degenerate_from {
            pretty_kv(w, "Fragmented at step", step.to_string())?;
        }
        writeln!(w)?;
        writeln!(
            w,
            "{:>6} {:>9} {:>10} {:>10} {:>10}",
            "STEP", "REMOVED", "LARGEST", "AVG PATH", "EFFIC."
        )?;
        for s in &run.samples {
            writeln!(
                w,
                "{:>6} {:>9.4} {:>10.4} {:>10} {:>10}",
                s.step,
                s.fraction_removed,
                s.largest_component_fraction,
                opt_metric(s.average_path_length),
                opt_metric(s.efficiency),
            )?;
        }
    }
    Ok(())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_maps_to_every_strategy() {
        assert_eq!(StrategyArg::All.strategy(), None);
        assert_eq!(
            StrategyArg::Closeness.strategy(),
            Some(AttackStrategy::Closeness)
        );
    }

    #[test]
    fn capitalize_first_letter() {
        assert_eq!(capitalize("betweenness"), "Betweenness");
        assert_eq!(capitalize(""), "");
    }
}
