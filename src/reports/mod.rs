use std::error::Error;
use crate::logger::Logger;
use crate::simulation::Simulation;

/// Function type for report entry functions
pub type ReportFn = fn(simulation: &Simulation, logger: &mut Logger) -> Result<(), Box<dyn Error>>;

/// Entry in the report catalog
#[derive(Clone)]
pub struct ReportEntry {
    pub short_name: &'static str,
    pub description: &'static str,
    pub run: ReportFn,
}

// Create an inventory collection for report entries
inventory::collect!(ReportEntry);

/// Get all registered reports from the catalog, ordered by name
pub fn get_report_catalog() -> Vec<ReportEntry> {
    let mut entries: Vec<ReportEntry> = inventory::iter::<ReportEntry>
        .into_iter()
        .cloned()
        .collect();
    entries.sort_by_key(|entry| entry.short_name);
    entries
}

/// Fail early on an empty simulation, every report averages over iterations
fn require_records(simulation: &Simulation) -> Result<(), Box<dyn Error>> {
    if simulation.records.is_empty() {
        return Err("simulation has no iterations to report on".into());
    }
    Ok(())
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

// Report modules
pub mod payouts;
pub mod valuations;
pub mod probabilities;
