use std::time::Duration;

use geo_boundary::Coordinate;
use moka::future::Cache;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::error::NominatimError;
use crate::types::{GeocodedAddress, NominatimResponse};

const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";
const DEFAULT_USER_AGENT: &str = "civic-intake/0.1";
const CACHE_TTL_SECS: u64 = 86400; // 24 hours
const RATE_LIMIT_DELAY: Duration = Duration::from_millis(1100);

/// Nominatim reverse geocoding client with rate limiting and caching
pub struct NominatimClient {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<String, GeocodedAddress>,
    /// Semaphore to enforce 1 request/second rate limit
    rate_limiter: Semaphore,
}

impl NominatimClient {
    /// Create a new client with default settings
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a new client with a custom Nominatim URL
    pub fn with_base_url(base_url: &str) -> Self {
        Self::with_base_url_and_user_agent(base_url, DEFAULT_USER_AGENT)
    }

    /// Create a new client with a custom Nominatim URL and user agent
    pub fn with_base_url_and_user_agent(base_url: &str, user_agent: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()
            .expect("Failed to create HTTP client");

        let cache = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(Duration::from_secs(CACHE_TTL_SECS))
            .build();

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            cache,
            rate_limiter: Semaphore::new(1),
        }
    }

    /// Reverse geocode a coordinate to address fields
    pub async fn reverse_geocode(&self, coord: Coordinate) -> crate::Result<GeocodedAddress> {
        // Round to 6 decimal places for cache key (~0.1m precision)
        let cache_key = format!("{:.6},{:.6}", coord.lat(), coord.lng());

        if let Some(cached) = self.cache.get(&cache_key).await {
            return Ok(cached);
        }

        // Rate limit: acquire permit, then wait after the request
        let _permit = self
            .rate_limiter
            .acquire()
            .await
            .map_err(|_| NominatimError::RateLimiter)?;

        let url = format!(
            "{}/reverse?lat={}&lon={}&format=json&addressdetails=1&zoom=18",
            self.base_url,
            coord.lat(),
            coord.lng()
        );

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(NominatimError::ApiError(format!(
                "Nominatim returned status {}",
                response.status()
            )));
        }

        let data: NominatimResponse = response.json().await?;

        let result = match data.error {
            Some(ref err) => {
                warn!(lat = coord.lat(), lon = coord.lng(), error = %err, "Nominatim returned error");
                GeocodedAddress::default()
            }
            None => parse_nominatim_response(data),
        };

        debug!(
            lat = coord.lat(),
            lon = coord.lng(),
            address = result.label().as_deref().unwrap_or("unknown"),
            "Geocoded coordinates"
        );

        self.cache.insert(cache_key, result.clone()).await;

        tokio::time::sleep(RATE_LIMIT_DELAY).await;

        Ok(result)
    }
}

impl Default for NominatimClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse Nominatim response into address fields
fn parse_nominatim_response(data: NominatimResponse) -> GeocodedAddress {
    let addr = data.address;

    GeocodedAddress {
        road: addr.road,
        neighbourhood: addr.neighbourhood,
        suburb: addr.suburb.or(addr.quarter),
        // Municipality - try city, then town, then village, then municipality
        municipality: addr
            .city
            .or(addr.town)
            .or(addr.village)
            .or(addr.municipality),
        state: addr.state,
        postcode: addr.postcode,
        country: addr.country,
        display_name: data.display_name,
    }
}
