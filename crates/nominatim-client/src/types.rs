use serde::Deserialize;

/// Address fields populated by reverse geocoding
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeocodedAddress {
    pub road: Option<String>,
    pub neighbourhood: Option<String>,
    pub suburb: Option<String>,
    pub municipality: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
    /// Nominatim's full comma-separated name for the place
    pub display_name: Option<String>,
}

impl GeocodedAddress {
    /// Short human-readable address: road, neighbourhood/suburb, municipality.
    /// Falls back to Nominatim's display name when none of those are known.
    pub fn label(&self) -> Option<String> {
        let parts: Vec<&str> = [
            &self.road,
            &self.neighbourhood,
            &self.suburb,
            &self.municipality,
        ]
        .into_iter()
        .filter_map(|opt| opt.as_deref())
        .filter(|s| !s.trim().is_empty())
        .collect();

        if parts.is_empty() {
            return self.display_name.clone().filter(|s| !s.trim().is_empty());
        }
        Some(parts.join(", "))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct NominatimResponse {
    #[serde(default)]
    pub(crate) address: NominatimAddress,
    pub(crate) display_name: Option<String>,
    pub(crate) error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct NominatimAddress {
    pub(crate) road: Option<String>,
    pub(crate) neighbourhood: Option<String>,
    pub(crate) suburb: Option<String>,
    pub(crate) quarter: Option<String>,
    pub(crate) city: Option<String>,
    pub(crate) town: Option<String>,
    pub(crate) village: Option<String>,
    pub(crate) municipality: Option<String>,
    pub(crate) state: Option<String>,
    pub(crate) postcode: Option<String>,
    pub(crate) country: Option<String>,
}
