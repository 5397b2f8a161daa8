//! Zoom level for direct navigation
//!
//! Base level comes from the geocoder's place rank (more local → closer),
//! then a ceiling per place type keeps e.g. a whole country from being shown
//! at street level.

/// (minimum place rank, zoom), checked top to bottom
const RANK_ZOOM_TABLE: &[(u32, u8)] = &[(30, 18), (26, 16), (21, 14), (16, 12), (11, 10), (5, 8)];
const FALLBACK_ZOOM: u8 = 6;

/// Zoom derived from place rank alone
pub fn base_zoom_for_rank(place_rank: u32) -> u8 {
    RANK_ZOOM_TABLE
        .iter()
        .find(|(min_rank, _)| place_rank >= *min_rank)
        .map(|(_, zoom)| *zoom)
        .unwrap_or(FALLBACK_ZOOM)
}

/// Highest zoom allowed for a place type, if the type is known
pub fn zoom_ceiling_for_type(place_type: &str) -> Option<u8> {
    match place_type {
        "country" => Some(6),
        "state" => Some(8),
        "county" | "municipality" => Some(10),
        "city" | "town" => Some(12),
        "village" | "hamlet" => Some(14),
        "suburb" | "quarter" => Some(15),
        "neighbourhood" => Some(16),
        "street" => Some(17),
        "house" | "building" => Some(18),
        _ => None,
    }
}

/// Final navigation zoom: `min(base(rank), ceiling(type))`
pub fn zoom_level(place_rank: u32, place_type: &str) -> u8 {
    let base = base_zoom_for_rank(place_rank);
    match zoom_ceiling_for_type(place_type) {
        Some(ceiling) => base.min(ceiling),
        None => base,
    }
}
