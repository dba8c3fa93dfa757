use crate::utils::error::{ParkError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

const EARTH_RADIUS_METERS: f64 = 6_371_008.8;
const METERS_PER_MILE: f64 = 1_609.344;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Great-circle distance (haversine).
    pub fn distance_meters(&self, other: &Coordinates) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lng = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_METERS * a.sqrt().asin()
    }

    pub fn distance_miles(&self, other: &Coordinates) -> f64 {
        self.distance_meters(other) / METERS_PER_MILE
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4},{:.4}", self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LotId(String);

impl LotId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LotId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for LotId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u32> for LotId {
    fn from(value: u32) -> Self {
        Self(value.to_string())
    }
}

/// Who a lot is reserved for. Open set: unknown tags are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LotCategory {
    Student,
    Faculty,
    Visitor,
    Mixed,
    Other(String),
}

impl LotCategory {
    pub const KNOWN: [LotCategory; 4] = [
        LotCategory::Student,
        LotCategory::Faculty,
        LotCategory::Visitor,
        LotCategory::Mixed,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            LotCategory::Student => "Student",
            LotCategory::Faculty => "Faculty",
            LotCategory::Visitor => "Visitor",
            LotCategory::Mixed => "Mixed",
            LotCategory::Other(tag) => tag,
        }
    }
}

impl From<&str> for LotCategory {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "student" => LotCategory::Student,
            "faculty" => LotCategory::Faculty,
            "visitor" => LotCategory::Visitor,
            "mixed" => LotCategory::Mixed,
            _ => LotCategory::Other(value.trim().to_string()),
        }
    }
}

impl From<String> for LotCategory {
    fn from(value: String) -> Self {
        LotCategory::from(value.as_str())
    }
}

impl From<LotCategory> for String {
    fn from(value: LotCategory) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for LotCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serialized shape of a lot; goes through [`ParkingLot::try_from`] so the
/// capacity invariant holds for anything loaded from disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkingLotRecord {
    pub id: LotId,
    pub name: String,
    pub coordinates: Coordinates,
    pub available_spaces: u32,
    pub total_spaces: u32,
    pub distance_miles: f64,
    pub category: LotCategory,
    #[serde(default)]
    pub recently_viewed: bool,
    #[serde(default)]
    pub synthesized: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ParkingLotRecord", into = "ParkingLotRecord")]
pub struct ParkingLot {
    id: LotId,
    name: String,
    coordinates: Coordinates,
    available_spaces: u32,
    total_spaces: u32,
    distance_miles: f64,
    category: LotCategory,
    recently_viewed: bool,
    synthesized: bool,
}

impl ParkingLot {
    pub fn new(
        id: impl Into<LotId>,
        name: impl Into<String>,
        coordinates: Coordinates,
        available_spaces: u32,
        total_spaces: u32,
        distance_miles: f64,
        category: LotCategory,
    ) -> Result<Self> {
        let id = id.into();
        if available_spaces > total_spaces {
            return Err(ParkError::ValidationError {
                message: format!(
                    "lot {}: available spaces ({}) exceed total spaces ({})",
                    id, available_spaces, total_spaces
                ),
            });
        }
        if !distance_miles.is_finite() || distance_miles < 0.0 {
            return Err(ParkError::ValidationError {
                message: format!("lot {}: invalid distance {}", id, distance_miles),
            });
        }

        Ok(Self {
            id,
            name: name.into(),
            coordinates,
            available_spaces,
            total_spaces,
            distance_miles,
            category,
            recently_viewed: false,
            synthesized: false,
        })
    }

    pub fn with_recently_viewed(mut self, recently_viewed: bool) -> Self {
        self.recently_viewed = recently_viewed;
        self
    }

    pub fn with_synthesized(mut self, synthesized: bool) -> Self {
        self.synthesized = synthesized;
        self
    }

    pub fn id(&self) -> &LotId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    pub fn available_spaces(&self) -> u32 {
        self.available_spaces
    }

    pub fn total_spaces(&self) -> u32 {
        self.total_spaces
    }

    pub fn distance_miles(&self) -> f64 {
        self.distance_miles
    }

    pub fn category(&self) -> &LotCategory {
        &self.category
    }

    pub fn recently_viewed(&self) -> bool {
        self.recently_viewed
    }

    /// True when availability, capacity, distance or category were made up
    /// during normalization rather than supplied by the source.
    pub fn synthesized(&self) -> bool {
        self.synthesized
    }

    pub fn is_available(&self) -> bool {
        self.available_spaces > 0
    }

    pub fn occupancy_ratio(&self) -> f64 {
        if self.total_spaces == 0 {
            0.0
        } else {
            self.available_spaces as f64 / self.total_spaces as f64
        }
    }

    pub fn availability_label(&self) -> String {
        format!(
            "{} of {} spaces available",
            self.available_spaces, self.total_spaces
        )
    }

    pub fn distance_label(&self) -> String {
        format!("{:.1} mi", self.distance_miles)
    }
}

impl TryFrom<ParkingLotRecord> for ParkingLot {
    type Error = ParkError;

    fn try_from(record: ParkingLotRecord) -> Result<Self> {
        Ok(ParkingLot::new(
            record.id,
            record.name,
            record.coordinates,
            record.available_spaces,
            record.total_spaces,
            record.distance_miles,
            record.category,
        )?
        .with_recently_viewed(record.recently_viewed)
        .with_synthesized(record.synthesized))
    }
}

impl From<ParkingLot> for ParkingLotRecord {
    fn from(lot: ParkingLot) -> Self {
        Self {
            id: lot.id,
            name: lot.name,
            coordinates: lot.coordinates,
            available_spaces: lot.available_spaces,
            total_spaces: lot.total_spaces,
            distance_miles: lot.distance_miles,
            category: lot.category,
            recently_viewed: lot.recently_viewed,
            synthesized: lot.synthesized,
        }
    }
}

/// A place as returned by a map/places capability, before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceRecord {
    pub place_id: Option<String>,
    pub name: String,
    pub location: Coordinates,
    #[serde(default)]
    pub raw_metadata: serde_json::Value,
}

impl PlaceRecord {
    pub fn new(name: impl Into<String>, location: Coordinates) -> Self {
        Self {
            place_id: None,
            name: name.into(),
            location,
            raw_metadata: serde_json::Value::Null,
        }
    }

    pub fn with_place_id(mut self, place_id: impl Into<String>) -> Self {
        self.place_id = Some(place_id.into());
        self
    }

    pub fn with_metadata(mut self, raw_metadata: serde_json::Value) -> Self {
        self.raw_metadata = raw_metadata;
        self
    }
}

/// Where the currently visible lots came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LotSource {
    Catalog,
    Provider,
    Fallback,
}
