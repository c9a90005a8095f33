//! Table and JSON rendering for CLI commands.

use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Table};
use serde_json::json;

use bitsieve_core::{BackendKind, CoverageReport, CpuCapabilities};

use crate::selfcheck::Summary;

fn is_json(format: &str) -> bool {
    format.eq_ignore_ascii_case("json")
}

fn table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    let header: Vec<Cell> = headers.iter().map(|c| Cell::new(c).fg(Color::Cyan)).collect();
    table.set_header(header);
    table
}

fn yes_no(flag: bool) -> Cell {
    if flag {
        Cell::new("yes").fg(Color::Green)
    } else {
        Cell::new("no").fg(Color::DarkGrey)
    }
}

/// Print detected CPU features and backend selection
pub fn print_info(
    caps: &CpuCapabilities,
    active: BackendKind,
    available: &[BackendKind],
    format: &str,
) -> anyhow::Result<()> {
    if is_json(format) {
        let value = json!({
            "capabilities": caps,
            "features": caps.feature_names(),
            "active": active,
            "available": available,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", "CPU capabilities".green().bold());
    let mut features = table(&["Feature", "Detected"]);
    for (name, flag) in [
        ("sse2", caps.sse2),
        ("avx2", caps.avx2),
        ("neon", caps.neon),
        ("simd128", caps.simd128),
    ] {
        features.add_row(vec![Cell::new(name), yes_no(flag)]);
    }
    println!("{features}");

    println!("\n{}", "Backends".green().bold());
    let mut backends = table(&["Backend", "Runnable", "Active"]);
    for kind in BackendKind::ALL {
        backends.add_row(vec![
            Cell::new(kind.as_str()),
            yes_no(available.contains(&kind)),
            yes_no(kind == active),
        ]);
    }
    println!("{backends}");
    Ok(())
}

/// Print one coverage table per backend, followed by any violations
pub fn print_coverage(reports: &[CoverageReport], format: &str) -> anyhow::Result<()> {
    if is_json(format) {
        println!("{}", serde_json::to_string_pretty(reports)?);
        return Ok(());
    }

    for report in reports {
        println!(
            "{} {} ({}/{} combinations)",
            "Coverage:".green().bold(),
            report.backend.as_str().bold(),
            report.covered(),
            report.total()
        );

        let mut t = table(&["Family", "Type", "Covered", "Probed"]);
        for entry in &report.entries {
            let covered = if entry.is_full() {
                Cell::new(entry.covered).fg(Color::Green)
            } else if entry.covered == 0 {
                Cell::new(entry.covered).fg(Color::DarkGrey)
            } else {
                Cell::new(entry.covered).fg(Color::Yellow)
            };
            t.add_row(vec![
                Cell::new(entry.family.name()),
                Cell::new(entry.subject),
                covered,
                Cell::new(entry.total),
            ]);
        }
        println!("{t}");

        for violation in &report.violations {
            println!("{} {violation}", "violation:".red().bold());
        }
        println!();
    }
    Ok(())
}

/// Print per-operation self-check results
pub fn print_selfcheck(summary: &Summary, format: &str) -> anyhow::Result<()> {
    if is_json(format) {
        let results: Vec<_> = summary
            .results
            .iter()
            .map(|r| {
                json!({
                    "operation": r.operation,
                    "covered": r.covered,
                    "mismatches": r.mismatches,
                })
            })
            .collect();
        let value = json!({
            "backend": summary.backend,
            "rows": summary.rows,
            "seed": summary.seed,
            "covered": summary.covered(),
            "mismatches": summary.mismatches(),
            "results": results,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    // Only rows worth reading: native kernels, plus anything that disagreed.
    let mut t = table(&["Operation", "Kernel", "Mismatched bits"]);
    for r in summary.results.iter().filter(|r| r.covered || r.mismatches > 0) {
        let mismatches = if r.mismatches == 0 {
            Cell::new(0).fg(Color::Green)
        } else {
            Cell::new(r.mismatches).fg(Color::Red)
        };
        t.add_row(vec![
            Cell::new(&r.operation),
            Cell::new(summary.backend.as_str()),
            mismatches,
        ]);
    }
    println!("{t}");

    let headline = format!(
        "{} rows, seed {}: {} of {} operations native on {}, {} mismatched bits",
        summary.rows,
        summary.seed,
        summary.covered(),
        summary.results.len(),
        summary.backend,
        summary.mismatches()
    );
    if summary.mismatches() == 0 {
        println!("{}", headline.green().bold());
    } else {
        println!("{}", headline.red().bold());
    }
    Ok(())
}
