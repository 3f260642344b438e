//! Reverse geocoding of resolved coordinates into a display address.

use async_trait::async_trait;
use geo_boundary::Coordinate;
use nominatim_client::NominatimClient;
use tracing::warn;

/// Best-effort address lookup. Failures yield `None`, never an error.
#[async_trait]
pub trait AddressLookup: Send + Sync {
    async fn lookup(&self, coord: Coordinate) -> Option<String>;
}

#[async_trait]
impl AddressLookup for NominatimClient {
    async fn lookup(&self, coord: Coordinate) -> Option<String> {
        match self.reverse_geocode(coord).await {
            Ok(address) => address.label(),
            Err(e) => {
                warn!(lat = coord.lat(), lng = coord.lng(), error = %e, "Reverse geocoding failed");
                None
            }
        }
    }
}
