//! Plain-text reports for simulation results

use std::fmt::Write;

use wh_engine::EndReason;

use crate::results::SimulationResults;
use crate::stats::{StrategyComparison, SummaryStats};

/// Unix milliseconds as a UTC date and time
pub fn format_timestamp(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| millis.to_string())
}

/// Render results as a text report.
pub fn to_text(results: &SimulationResults) -> String {
    let stats = SummaryStats::from_results(results);
    let mut out = String::new();

    let title = format!("{} ({} trials)", results.strategy_name, results.num_trials);
    let _ = writeln!(out, "{}", title);
    let _ = writeln!(out, "{}\n", "=".repeat(title.len()));
    let _ = writeln!(out, "Timestamp: {}", format_timestamp(results.timestamp));
    let _ = writeln!(out, "Seed: {}\n", results.seed);

    out.push_str("Outcomes:\n");
    let _ = writeln!(out, "  Success rate:        {:>8.2}%", results.success_rate);
    let _ = writeln!(out, "  Profitable trials:   {:>8.2}%", results.profit_rate());
    let _ = writeln!(out, "  Risk of ruin:        {:>8.2}%", stats.risk_of_ruin);
    let _ = writeln!(out, "  Avg spins to goal:   {:>8.1}", results.avg_iterations_to_success);
    let _ = writeln!(out, "  Avg cycles:          {:>8.2}", results.avg_completed_cycles);
    let _ = writeln!(out, "  EV per spin:         {:>8.4}", results.expected_value_per_spin);
    out.push('\n');

    out.push_str("End reasons:\n");
    for reason in EndReason::ALL {
        let _ = writeln!(out, "  {:<20} {:>8}", reason.as_str(), results.end_reasons.get(reason));
    }
    out.push('\n');

    out.push_str("Final bankroll:\n");
    let _ = writeln!(out, "  Initial / target:    {:.2} / {:.2}", results.initial_bankroll, results.target_bankroll);
    let _ = writeln!(out, "  Mean:                {:>10.2}", stats.mean);
    let _ = writeln!(out, "  Std dev:             {:>10.2}", stats.std_dev);
    let _ = writeln!(out, "  Risk-adjusted:       {:>10.4}", stats.risk_adjusted_return);
    let _ = writeln!(out, "  Min / max:           {:.2} / {:.2}", stats.min, stats.max);
    let _ = writeln!(
        out,
        "  P5 / P25 / P50 / P75 / P95: {:.2} / {:.2} / {:.2} / {:.2} / {:.2}",
        stats.percentile5, stats.percentile25, stats.median, stats.percentile75, stats.percentile95
    );
    let _ = writeln!(out, "  Avg max drawdown:    {:>10.2}", results.avg_max_drawdown);
    out.push('\n');

    let histogram = &results.final_bankroll_histogram;
    let peak = histogram.counts.iter().copied().max().unwrap_or(0).max(1);
    out.push_str("Distribution:\n");
    for (i, &count) in histogram.counts.iter().enumerate() {
        let bar = (count * 40).div_ceil(peak) as usize;
        let _ = writeln!(out, "  {:>10.2} | {:<40} {}", histogram.bucket_start(i), "#".repeat(bar), count);
    }
    out.push('\n');

    out.push_str("Steps:\n");
    out.push_str(&"-".repeat(72));
    out.push('\n');
    for step in &results.per_step_statistics {
        let _ = writeln!(
            out,
            "  #{:<3} {:<24} reached {:>8}  won {:>8}  lost {:>8}  ({:.1}%)",
            step.step_index + 1,
            step.step_id,
            step.times_reached,
            step.times_won,
            step.times_lost,
            step.win_rate()
        );
        for tier in &step.tier_outcomes {
            let _ = writeln!(out, "        tier {:<18} x{:<8} paid {:.2}", tier.tier_name, tier.count, tier.total_payout);
        }
    }

    out
}

/// Side-by-side text for two runs.
pub fn comparison_text(first: &SimulationResults, second: &SimulationResults, cmp: &StrategyComparison) -> String {
    let mark = |better: bool| if better { "<" } else { " " };
    let mut out = String::new();

    let _ = writeln!(out, "{:<22} {:>16} {:>16}", "", first.strategy_name, second.strategy_name);
    let _ = writeln!(
        out,
        "{:<22} {:>15.2}% {:>15.2}%  {} diff {:+.2}",
        "Success rate",
        first.success_rate,
        second.success_rate,
        mark(cmp.first_better.success_rate),
        cmp.success_rate_diff
    );
    let _ = writeln!(
        out,
        "{:<22} {:>16.2} {:>16.2}  {} diff {:+.2}",
        "Avg final bankroll",
        first.avg_final_bankroll,
        second.avg_final_bankroll,
        mark(cmp.first_better.avg_bankroll),
        cmp.avg_bankroll_diff
    );
    let _ = writeln!(
        out,
        "{:<22} {:>16} {:>16}  {} diff {:+.2}%",
        "Ruined trials",
        first.bankruptcy_count,
        second.bankruptcy_count,
        mark(cmp.first_better.risk_of_ruin),
        cmp.risk_of_ruin_diff
    );
    let _ = writeln!(
        out,
        "{:<22} {:>16.4} {:>16.4}  {} diff {:+.4}",
        "EV per spin",
        first.expected_value_per_spin,
        second.expected_value_per_spin,
        mark(cmp.first_better.ev),
        cmp.ev_diff
    );
    out
}
