use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};

use crate::screening::sensitivity::FeatureImportance;
use crate::screening::visible::VisibleMetric;
use crate::screening::ScreeningReport;

// ---------------------------------------------------------------------------
// Console report
// ---------------------------------------------------------------------------

/// Print every section of the report to stdout.
pub fn print_report(report: &ScreeningReport) {
    println!("Final dataset shape: ({}, 4)", report.n_rows);
    match report.transmission_range {
        Some((lo, hi)) => println!("Transmission range: {lo:.4} to {hi:.4}"),
        None => println!("Transmission range: n/a (no rows)"),
    }

    match report.fit.and_then(|f| f.r2) {
        Some(r2) => println!("\nModel R²: {r2:.4}"),
        None => println!("\nModel R²: n/a"),
    }

    let all: Vec<&VisibleMetric> = report.metrics.iter().collect();
    println!("\nVisible-band metrics:");
    print!("{}", metrics_table(&all));

    println!("\nRanked configurations:");
    print!("{}", metrics_table(&report.ranked()));

    println!(
        "\nConfigurations with avg_visible_T ≥ {}:",
        report.threshold
    );
    print!("{}", metrics_table(&report.feasible()));

    println!("\nFeature Importance:");
    print!("{}", importance_listing(&report.importances));
}

/// Aligned text table of metric rows; a placeholder line when empty.
pub fn metrics_table(rows: &[&VisibleMetric]) -> String {
    let mut out = String::new();
    if rows.is_empty() {
        out.push_str("  (none)\n");
        return out;
    }
    let _ = writeln!(
        out,
        "{:<8} {:>10} {:>14} {:>14}",
        "material", "radius_nm", "avg_visible_T", "min_visible_T"
    );
    for m in rows {
        let _ = writeln!(
            out,
            "{:<8} {:>10} {:>14.4} {:>14.4}",
            m.material.to_string(),
            m.radius_nm,
            m.avg_visible_t,
            m.min_visible_t
        );
    }
    out
}

/// `name: importance` lines in encoding order.
pub fn importance_listing(importances: &[FeatureImportance]) -> String {
    if importances.is_empty() {
        return "  (no model)\n".to_string();
    }
    importances
        .iter()
        .map(|f| format!("{}: {:.4}\n", f.name, f.importance))
        .collect()
}

// ---------------------------------------------------------------------------
// CSV export
// ---------------------------------------------------------------------------

/// Write the visible-band metric table as CSV.
pub fn write_metrics_csv(path: &Path, metrics: &[VisibleMetric]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for m in metrics {
        writer.serialize(m).context("writing metric row")?;
    }
    writer.flush().context("flushing metrics CSV")?;
    log::info!("Wrote {} metric rows to {}", metrics.len(), path.display());
    Ok(())
}
