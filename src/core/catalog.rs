use crate::core::{Coordinates, LotCategory, LotId, ParkingLot};
use crate::utils::error::{ParkError, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// The known set of lots. Used directly in offline mode and as the fallback
/// whenever a map provider fails.
#[derive(Debug, Clone)]
pub struct LotCatalog {
    lots: Vec<ParkingLot>,
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    lots: Vec<ParkingLot>,
}

impl LotCatalog {
    pub fn new(lots: Vec<ParkingLot>) -> Result<Self> {
        let mut seen = HashSet::new();
        for lot in &lots {
            if !seen.insert(lot.id().clone()) {
                return Err(ParkError::ValidationError {
                    message: format!("duplicate lot id in catalog: {}", lot.id()),
                });
            }
        }
        Ok(Self { lots })
    }

    /// Campus sample set shipped with the app.
    pub fn sample() -> Self {
        let rows: [(u32, &str, f64, f64, u32, u32, f64, LotCategory, bool); 5] = [
            (1, "Lot 13N", 41.6563, -83.6127, 23, 45, 0.3, LotCategory::Student, true),
            (2, "Lot 16", 41.6584, -83.6105, 8, 30, 0.5, LotCategory::Faculty, false),
            (3, "Lot 17", 41.6612, -83.6089, 0, 25, 0.7, LotCategory::Visitor, false),
            (4, "Area 2", 41.6598, -83.6076, 15, 40, 0.4, LotCategory::Student, false),
            (5, "Area 3", 41.6574, -83.6053, 12, 35, 0.6, LotCategory::Mixed, false),
        ];

        let lots = rows
            .into_iter()
            .filter_map(|(id, name, lat, lng, available, total, miles, category, viewed)| {
                ParkingLot::new(
                    id,
                    name,
                    Coordinates::new(lat, lng),
                    available,
                    total,
                    miles,
                    category,
                )
                .map(|lot| lot.with_recently_viewed(viewed))
                .map_err(|e| tracing::error!("Skipping built-in lot {}: {}", name, e))
                .ok()
            })
            .collect();

        Self { lots }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// Parses `[[lots]]` tables; every lot goes through the capacity check.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content)?;
        Self::new(file.lots)
    }

    pub fn list(&self) -> &[ParkingLot] {
        &self.lots
    }

    pub fn by_id(&self, id: &LotId) -> Result<&ParkingLot> {
        self.lots
            .iter()
            .find(|lot| lot.id() == id)
            .ok_or_else(|| ParkError::NotFound { id: id.clone() })
    }

    pub fn within_radius(&self, center: Coordinates, radius_meters: u32) -> Vec<ParkingLot> {
        self.lots
            .iter()
            .filter(|lot| center.distance_meters(&lot.coordinates()) <= radius_meters as f64)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lots.is_empty()
    }
}

impl Default for LotCatalog {
    fn default() -> Self {
        Self::sample()
    }
}
