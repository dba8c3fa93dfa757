use crate::core::catalog::LotCatalog;
use crate::core::search::filter_lots;
use crate::core::{Coordinates, MapProvider, PlaceRecord};
use crate::utils::error::ProviderError;
use async_trait::async_trait;

/// Offline map provider answering from a static catalog.
///
/// Lots keep their catalog values by travelling as place metadata, so the
/// normalizer does not synthesize anything for them.
#[derive(Debug, Clone)]
pub struct CatalogMapProvider {
    catalog: LotCatalog,
}

impl CatalogMapProvider {
    pub fn new(catalog: LotCatalog) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl MapProvider for CatalogMapProvider {
    async fn search_nearby(
        &self,
        center: Coordinates,
        radius_meters: u32,
        query: &str,
    ) -> Result<Vec<PlaceRecord>, ProviderError> {
        let nearby = self.catalog.within_radius(center, radius_meters);
        let places = filter_lots(&nearby, query)
            .into_iter()
            .map(|lot| {
                PlaceRecord::new(lot.name(), lot.coordinates())
                    .with_place_id(lot.id().as_str())
                    .with_metadata(serde_json::json!({
                        "availableSpaces": lot.available_spaces(),
                        "totalSpaces": lot.total_spaces(),
                        "distanceMiles": lot.distance_miles(),
                        "category": lot.category().as_str(),
                        "recentlyViewed": lot.recently_viewed(),
                    }))
            })
            .collect();

        Ok(places)
    }
}
