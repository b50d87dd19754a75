//! `memora seed`: populate the demo patient's dashboard data.

use anyhow::Result;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, Table};
use console::style;

use memora_core::seed::{SeedOptions, SeedReport};
use memora_types::patient::UserId;

use crate::state::AppState;

/// Seed (or refresh) `days` of demo data and print a summary.
pub async fn seed(
    state: &AppState,
    link_caregiver: Option<String>,
    days: u32,
    json: bool,
) -> Result<()> {
    let patient_id = state.demo_patient_id();
    let mut options = SeedOptions::new(patient_id, days);
    options.link_caregiver = link_caregiver.map(UserId::new);

    let report = state.seeder().seed(&options).await?;

    if json {
        let out = serde_json::json!({
            "patient_id": patient_id.to_string(),
            "days": days,
            "medications": report.medications,
            "doses": report.doses,
            "activities": report.activities,
            "sleep_logs": report.sleep_logs,
            "metrics": report.metrics,
            "caregiver_linked": report.caregiver_linked,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Demo data ready for patient {}",
        style("✓").green().bold(),
        style(patient_id).cyan()
    );
    println!();
    println!("{}", summary_table(&report));
    if let Some(user) = &options.link_caregiver {
        println!();
        println!(
            "  Caregiver {} linked to the demo patient",
            style(user).bold()
        );
    }
    println!();
    println!(
        "  {}",
        style("Re-running is safe: existing records are updated in place.").dim()
    );
    println!();

    Ok(())
}

fn summary_table(report: &SeedReport) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Records", "Count"]);
    for (label, count) in [
        ("Medications", report.medications),
        ("Doses", report.doses),
        ("Activities", report.activities),
        ("Sleep logs", report.sleep_logs),
        ("Behavioral metrics", report.metrics),
    ] {
        table.add_row(vec![Cell::new(label), Cell::new(count)]);
    }
    table
}
