// Travel map markers. These live only in memory, per user session, and are
// gone when the bot restarts. Nothing here touches the spreadsheet.

use dashmap::DashMap;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapPoint {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapError {
    #[error("Latitude must be between -90 and 90 (got {0})")]
    InvalidLatitude(f64),
    #[error("Longitude must be between -180 and 180 (got {0})")]
    InvalidLongitude(f64),
}

impl MapPoint {
    pub fn new(lat: f64, lon: f64) -> Result<Self, MapError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(MapError::InvalidLatitude(lat));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(MapError::InvalidLongitude(lon));
        }
        Ok(Self { lat, lon })
    }

    pub fn osm_link(&self) -> String {
        format!(
            "https://www.openstreetmap.org/?mlat={:.4}&mlon={:.4}#map=15/{:.4}/{:.4}",
            self.lat, self.lon, self.lat, self.lon
        )
    }
}

impl fmt::Display for MapPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}

/// Every new session starts with these two markers.
pub const DEFAULT_POINTS: [MapPoint; 2] = [
    // Taipei 101
    MapPoint {
        lat: 25.0339,
        lon: 121.5644,
    },
    // Tamsui Old Street
    MapPoint {
        lat: 25.1697,
        lon: 121.4406,
    },
];

/// Per-session marker lists keyed by session id (the Discord user id).
///
/// Each session is only ever touched by its own user, so DashMap's per-shard
/// locking is all the coordination needed.
pub struct MapSessions {
    sessions: DashMap<u64, Vec<MapPoint>>,
}

impl MapSessions {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    pub fn points(&self, session_id: u64) -> Vec<MapPoint> {
        self.sessions
            .get(&session_id)
            .map(|points| points.clone())
            .unwrap_or_else(|| DEFAULT_POINTS.to_vec())
    }

    /// Appends a marker and returns how many the session now holds.
    pub fn add(&self, session_id: u64, point: MapPoint) -> usize {
        let mut points = self
            .sessions
            .entry(session_id)
            .or_insert_with(|| DEFAULT_POINTS.to_vec());
        points.push(point);
        points.len()
    }

    pub fn reset(&self, session_id: u64) {
        self.sessions.remove(&session_id);
    }
}

impl Default for MapSessions {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_sessions_start_with_the_defaults() {
        let sessions = MapSessions::new();
        assert_eq!(sessions.points(1), DEFAULT_POINTS.to_vec());
    }

    #[test]
    fn points_are_appended_in_order() {
        let sessions = MapSessions::new();
        let kyoto = MapPoint::new(35.0116, 135.7681).unwrap();

        assert_eq!(sessions.add(1, kyoto), 3);
        let points = sessions.points(1);
        assert_eq!(points.last(), Some(&kyoto));
    }

    #[test]
    fn sessions_do_not_share_points() {
        let sessions = MapSessions::new();
        sessions.add(1, MapPoint::new(1.0, 1.0).unwrap());
        assert_eq!(sessions.points(2).len(), DEFAULT_POINTS.len());
    }

    #[test]
    fn reset_restores_defaults() {
        let sessions = MapSessions::new();
        sessions.add(1, MapPoint::new(1.0, 1.0).unwrap());
        sessions.reset(1);
        assert_eq!(sessions.points(1), DEFAULT_POINTS.to_vec());
    }

    #[test]
    fn out_of_range_coordinates_are_rejected() {
        assert_eq!(MapPoint::new(91.0, 0.0), Err(MapError::InvalidLatitude(91.0)));
        assert_eq!(
            MapPoint::new(0.0, -181.0),
            Err(MapError::InvalidLongitude(-181.0))
        );
        assert!(MapPoint::new(f64::NAN, 0.0).is_err());
    }
}
