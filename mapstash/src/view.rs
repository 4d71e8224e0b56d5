//! Presentation-side helpers: display ordering, search, and filtering.
//!
//! These operate on resolved POI lists and never touch the cache or the
//! entity store. The coordinator runs them just before publishing to
//! [`SharedEngineStatus`](crate::status::SharedEngineStatus).

use std::cmp::Ordering;
use std::sync::Arc;

use crate::coord::{great_circle_distance_m, LatLon};
use crate::poi::Poi;

/// Maximum number of results a search returns.
pub const SEARCH_RESULT_LIMIT: usize = 50;

/// Predicate applied to the displayed list when a filter is active.
pub type FilterPredicate = Arc<dyn Fn(&Poi) -> bool + Send + Sync>;

/// Sort POIs for display.
///
/// Entries with extended data come first. Within each partition, order is
/// by distance from `user_location` when one is known, otherwise by name
/// with a case-sensitive comparison.
pub fn order_for_display(pois: &mut [Poi], user_location: Option<LatLon>) {
    pois.sort_by(|a, b| {
        match (a.has_extended_data, b.has_extended_data) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => {}
        }
        match user_location {
            Some(here) => {
                let da = great_circle_distance_m(here, a.location);
                let db = great_circle_distance_m(here, b.location);
                da.partial_cmp(&db).unwrap_or(Ordering::Equal)
            }
            None => a.name.cmp(&b.name),
        }
    });
}

/// Search the known POIs by name or category.
///
/// Matching is a case-insensitive substring test; an empty or
/// whitespace-only query matches nothing. Matches come back in display
/// order and are capped at [`SEARCH_RESULT_LIMIT`].
pub fn search(pois: &[Poi], query: &str, user_location: Option<LatLon>) -> Vec<Poi> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }

    let mut matches: Vec<Poi> = pois
        .iter()
        .filter(|poi| {
            poi.name.to_lowercase().contains(&query)
                || poi.category.to_lowercase().contains(&query)
        })
        .cloned()
        .collect();
    order_for_display(&mut matches, user_location);
    matches.truncate(SEARCH_RESULT_LIMIT);
    matches
}

/// Apply a filter predicate, keeping matching POIs in order.
pub fn apply_filter(pois: &[Poi], predicate: &FilterPredicate) -> Vec<Poi> {
    pois.iter().filter(|poi| predicate(poi)).cloned().collect()
}
