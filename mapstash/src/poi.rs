//! Point-of-interest domain types.
//!
//! A [`Poi`] is created the first time it appears in a fetch result and is
//! treated as immutable from then on. Identity is the integer [`PoiId`],
//! which is stable across fetches and is the dedup key everywhere.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::coord::LatLon;

/// Stable integer identity of a point of interest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct PoiId(pub i64);

impl fmt::Display for PoiId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a POI record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PoiOrigin {
    /// Returned by the remote search service.
    #[default]
    Remote,
    /// Seeded locally (bundled or injected records).
    Local,
}

impl fmt::Display for PoiOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote => write!(f, "remote"),
            Self::Local => write!(f, "local"),
        }
    }
}

/// A point of interest as held in the working set.
///
/// `has_extended_data` is derived: it is computed by the external
/// extended-data lookup for a bounded prefix of each fetch batch and
/// cached on the record. Everything else arrives from the search service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poi {
    /// Stable identity, the primary dedup key.
    pub id: PoiId,
    /// Display name.
    pub name: String,
    /// Geographic position.
    pub location: LatLon,
    /// Street address as reported by the source.
    pub address: String,
    /// Category tag (e.g. "restaurant", "cafe").
    pub category: String,
    /// Opening hours, free-form.
    pub hours: String,
    /// Contact phone, when the source has one.
    pub phone: Option<String>,
    /// Website URL, when the source has one.
    pub website: Option<String>,
    /// Source-type tag.
    #[serde(default)]
    pub origin: PoiOrigin,
    /// Whether extended data (e.g. nutritional metadata) is available.
    #[serde(default)]
    pub has_extended_data: bool,
}

impl Poi {
    /// Create a POI with the given identity, name, and position.
    ///
    /// Remaining attributes start empty; providers fill them from the
    /// payload they decode.
    pub fn new(id: PoiId, name: impl Into<String>, location: LatLon) -> Self {
        Self {
            id,
            name: name.into(),
            location,
            address: String::new(),
            category: String::new(),
            hours: String::new(),
            phone: None,
            website: None,
            origin: PoiOrigin::Remote,
            has_extended_data: false,
        }
    }

    /// Set the category tag.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the extended-data flag.
    pub fn with_extended_data(mut self, has_extended_data: bool) -> Self {
        self.has_extended_data = has_extended_data;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poi_id_display() {
        assert_eq!(PoiId(42).to_string(), "42");
    }

    #[test]
    fn test_poi_origin_display() {
        assert_eq!(PoiOrigin::Remote.to_string(), "remote");
        assert_eq!(PoiOrigin::Local.to_string(), "local");
    }

    #[test]
    fn test_new_poi_defaults() {
        let poi = Poi::new(PoiId(1), "Green Fork", LatLon::new(37.7749, -122.4194));

        assert_eq!(poi.id, PoiId(1));
        assert_eq!(poi.name, "Green Fork");
        assert_eq!(poi.origin, PoiOrigin::Remote);
        assert!(!poi.has_extended_data);
        assert!(poi.phone.is_none());
    }

    #[test]
    fn test_builder_helpers() {
        let poi = Poi::new(PoiId(2), "Noodle Bar", LatLon::new(0.0, 0.0))
            .with_category("restaurant")
            .with_extended_data(true);

        assert_eq!(poi.category, "restaurant");
        assert!(poi.has_extended_data);
    }
}
