use crate::core::{Coordinates, LotCategory, LotId, ParkingLot, PlaceRecord};
use crate::utils::error::Result;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde_json::Value;
use xxhash_rust::xxh32::xxh32;

const SYNTH_SEED: u32 = 0x5041_524b;
const MIN_SYNTH_CAPACITY: u32 = 20;
const MAX_SYNTH_CAPACITY: u32 = 60;

/// Turns provider place records into canonical lots.
///
/// Availability, capacity, distance and category are read from the record's
/// metadata when present (`availableSpaces`, `totalSpaces`, `distanceMiles`,
/// `category` or `type`) and synthesized otherwise. Synthesis is seeded from
/// the lot id so the same place yields the same numbers on every refresh.
pub fn normalize_places(places: Vec<PlaceRecord>, center: Coordinates) -> Vec<ParkingLot> {
    places
        .into_iter()
        .filter_map(|place| {
            let name = place.name.clone();
            match normalize_place(place, center) {
                Ok(lot) => Some(lot),
                Err(e) => {
                    tracing::warn!("Dropping place '{}': {}", name, e);
                    None
                }
            }
        })
        .collect()
}

pub fn normalize_place(place: PlaceRecord, center: Coordinates) -> Result<ParkingLot> {
    let id = match &place.place_id {
        Some(place_id) if !place_id.trim().is_empty() => LotId::from(place_id.as_str()),
        _ => derived_id(&place),
    };

    let mut rng = ChaCha8Rng::seed_from_u64(xxh32(id.as_str().as_bytes(), SYNTH_SEED) as u64);
    let mut synthesized = false;

    let meta = &place.raw_metadata;
    let supplied_available = meta_u32(meta, "availableSpaces");
    let total = match meta_u32(meta, "totalSpaces") {
        Some(total) => total,
        None => {
            synthesized = true;
            // A made-up capacity never undercuts supplied availability.
            let floor = supplied_available.unwrap_or(0);
            rng.gen_range(floor.max(MIN_SYNTH_CAPACITY)..=floor.max(MAX_SYNTH_CAPACITY))
        }
    };
    let available = match supplied_available {
        Some(available) => available,
        None => {
            synthesized = true;
            rng.gen_range(0..=total)
        }
    };
    let distance = match meta.get("distanceMiles").and_then(Value::as_f64) {
        Some(miles) => miles,
        None => {
            synthesized = true;
            center.distance_miles(&place.location)
        }
    };
    let category = match meta
        .get("category")
        .or_else(|| meta.get("type"))
        .and_then(Value::as_str)
    {
        Some(tag) => LotCategory::from(tag),
        None => {
            synthesized = true;
            let index = rng.gen_range(0..LotCategory::KNOWN.len());
            LotCategory::KNOWN[index].clone()
        }
    };
    let recently_viewed = meta
        .get("recentlyViewed")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    Ok(ParkingLot::new(
        id,
        place.name,
        place.location,
        available,
        total,
        distance,
        category,
    )?
    .with_recently_viewed(recently_viewed)
    .with_synthesized(synthesized))
}

fn meta_u32(meta: &Value, key: &str) -> Option<u32> {
    meta.get(key)
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
}

fn derived_id(place: &PlaceRecord) -> LotId {
    let key = format!("{}@{}", place.name, place.location);
    LotId::from(format!("place-{:08x}", xxh32(key.as_bytes(), SYNTH_SEED)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn center() -> Coordinates {
        Coordinates::new(41.6563, -83.6127)
    }

    #[test]
    fn test_supplied_metadata_is_kept() {
        let place = PlaceRecord::new("Lot 16", Coordinates::new(41.6584, -83.6105))
            .with_place_id("2")
            .with_metadata(serde_json::json!({
                "availableSpaces": 8,
                "totalSpaces": 30,
                "distanceMiles": 0.5,
                "type": "Faculty"
            }));

        let lot = normalize_place(place, center()).unwrap();
        assert_eq!(lot.id().as_str(), "2");
        assert_eq!(lot.available_spaces(), 8);
        assert_eq!(lot.total_spaces(), 30);
        assert_eq!(lot.distance_miles(), 0.5);
        assert_eq!(lot.category(), &LotCategory::Faculty);
        assert!(!lot.synthesized());
    }

    #[test]
    fn test_missing_fields_are_synthesized_within_bounds() {
        let place = PlaceRecord::new("Student Union Garage", Coordinates::new(41.6612, -83.6089))
            .with_place_id("ChIJ-union");

        let lot = normalize_place(place, center()).unwrap();
        assert!(lot.synthesized());
        assert!(lot.total_spaces() >= MIN_SYNTH_CAPACITY);
        assert!(lot.total_spaces() <= MAX_SYNTH_CAPACITY);
        assert!(lot.available_spaces() <= lot.total_spaces());
        assert!(LotCategory::KNOWN.contains(lot.category()));

        let expected = center().distance_miles(&Coordinates::new(41.6612, -83.6089));
        assert!((lot.distance_miles() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_synthesized_capacity_covers_supplied_availability() {
        for id in ["a", "b", "c", "d", "e", "f", "g", "h"] {
            let place = PlaceRecord::new("Busy Garage", Coordinates::new(41.66, -83.61))
                .with_place_id(id)
                .with_metadata(serde_json::json!({"availableSpaces": 50}));

            let lots = normalize_places(vec![place], center());
            assert_eq!(lots.len(), 1, "id {}", id);
            assert_eq!(lots[0].available_spaces(), 50);
            assert!(lots[0].total_spaces() >= 50);
            assert!(lots[0].synthesized());
        }

        let place = PlaceRecord::new("Huge Deck", Coordinates::new(41.66, -83.61))
            .with_place_id("huge")
            .with_metadata(serde_json::json!({"availableSpaces": 400}));
        let lot = normalize_place(place, center()).unwrap();
        assert_eq!(lot.total_spaces(), 400);
    }

    #[test]
    fn test_synthesis_is_deterministic_per_id() {
        let make = || {
            PlaceRecord::new("Engineering Lot", Coordinates::new(41.66, -83.60))
                .with_place_id("ChIJ-eng")
        };
        let a = normalize_place(make(), center()).unwrap();
        let b = normalize_place(make(), center()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_place_id_gets_stable_derived_id() {
        let place = PlaceRecord::new("Rocket Hall", Coordinates::new(41.659, -83.611));
        let a = normalize_place(place.clone(), center()).unwrap();
        let b = normalize_place(place, center()).unwrap();
        assert!(a.id().as_str().starts_with("place-"));
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn test_inconsistent_capacity_is_dropped() {
        let good = PlaceRecord::new("Good", Coordinates::new(41.66, -83.61)).with_place_id("g");
        let bad = PlaceRecord::new("Bad", Coordinates::new(41.66, -83.61))
            .with_place_id("b")
            .with_metadata(serde_json::json!({"availableSpaces": 50, "totalSpaces": 10}));

        let lots = normalize_places(vec![good, bad], center());
        assert_eq!(lots.len(), 1);
        assert_eq!(lots[0].name(), "Good");
    }
}
