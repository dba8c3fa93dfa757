use crate::app::session::SessionReport;
use crate::core::ParkingLot;
use crate::utils::error::{ParkError, Result};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

#[derive(Serialize)]
struct LotRow<'a> {
    id: &'a str,
    name: &'a str,
    available_spaces: u32,
    total_spaces: u32,
    distance_miles: f64,
    category: &'a str,
    latitude: f64,
    longitude: f64,
    recently_viewed: bool,
    synthesized: bool,
}

impl<'a> From<&'a ParkingLot> for LotRow<'a> {
    fn from(lot: &'a ParkingLot) -> Self {
        Self {
            id: lot.id().as_str(),
            name: lot.name(),
            available_spaces: lot.available_spaces(),
            total_spaces: lot.total_spaces(),
            distance_miles: lot.distance_miles(),
            category: lot.category().as_str(),
            latitude: lot.coordinates().latitude,
            longitude: lot.coordinates().longitude,
            recently_viewed: lot.recently_viewed(),
            synthesized: lot.synthesized(),
        }
    }
}

pub fn render(report: &SessionReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(render_table(report)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Csv => render_csv(&report.lots),
    }
}

fn render_csv(lots: &[ParkingLot]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for lot in lots {
        writer.serialize(LotRow::from(lot))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ParkError::IoError(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn render_table(report: &SessionReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Parking near {} ({} lots, {:?})\n",
        report.center,
        report.lots.len(),
        report.source
    ));

    if report.lots.is_empty() {
        out.push_str("  no lots match\n");
    }
    for lot in &report.lots {
        let marker = if report.selection.as_ref().map(|s| s.id()) == Some(lot.id()) {
            '>'
        } else if lot.recently_viewed() {
            '*'
        } else {
            ' '
        };
        out.push_str(&format!(
            "{} {:<6} {:<20} {:>3}/{:<3} {:>7}  {}{}\n",
            marker,
            lot.id(),
            lot.name(),
            lot.available_spaces(),
            lot.total_spaces(),
            lot.distance_label(),
            lot.category(),
            if lot.is_available() { "" } else { "  FULL" }
        ));
    }

    if let Some(lot) = &report.selection {
        out.push_str(&format!(
            "\nSelected: {} - {}\n",
            lot.name(),
            lot.availability_label()
        ));
    }
    for notice in &report.notices {
        out.push_str(&format!("! {}\n", notice.message));
    }

    out
}
