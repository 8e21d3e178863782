//! Query parameter derivation for the catalog service.
//!
//! The time window is sent at day granularity only, matching the upstream
//! service's `starttime`/`endtime` date form. Events from the current day
//! may therefore be included or excluded at the service's discretion; this
//! is a known imprecision of the query shape.

use chrono::{Duration, NaiveDate, Utc};
use tracing::warn;

/// Whole-globe bounding box, not configurable.
pub const MIN_LATITUDE: f64 = -90.0;
pub const MAX_LATITUDE: f64 = 90.0;
pub const MIN_LONGITUDE: f64 = -180.0;
pub const MAX_LONGITUDE: f64 = 180.0;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Outbound query parameters for one catalog request.
///
/// Immutable once built; a fresh value is derived per request.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParams {
    pub start_time: NaiveDate,
    pub end_time: NaiveDate,
    /// Passed through verbatim when the caller supplied a non-empty value;
    /// the remote service performs its own numeric validation.
    pub min_magnitude: Option<String>,
}

impl QueryParams {
    /// Derive query parameters from optional caller inputs.
    ///
    /// A missing or unparseable start date defaults to now minus
    /// `window_days`; the end of the window is always today (UTC).
    /// Pure derivation, no I/O, never fails.
    pub fn build(start: Option<&str>, min_magnitude: Option<&str>, window_days: i64) -> Self {
        let today = Utc::now().date_naive();
        let default_start = today - Duration::days(window_days);

        let start_time = match start {
            Some(s) if !s.is_empty() => match NaiveDate::parse_from_str(s, DATE_FORMAT) {
                Ok(date) => date,
                Err(_) => {
                    warn!(start = %s, "unparseable start date, using default window");
                    default_start
                }
            },
            _ => default_start,
        };

        let min_magnitude = min_magnitude
            .filter(|m| !m.is_empty())
            .map(|m| m.to_string());

        Self {
            start_time,
            end_time: today,
            min_magnitude,
        }
    }

    /// Render the outbound query string pairs in the order the catalog
    /// service documents them.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("format".to_string(), "geojson".to_string()),
            (
                "starttime".to_string(),
                self.start_time.format(DATE_FORMAT).to_string(),
            ),
            (
                "endtime".to_string(),
                self.end_time.format(DATE_FORMAT).to_string(),
            ),
            ("minlatitude".to_string(), MIN_LATITUDE.to_string()),
            ("maxlatitude".to_string(), MAX_LATITUDE.to_string()),
            ("minlongitude".to_string(), MIN_LONGITUDE.to_string()),
            ("maxlongitude".to_string(), MAX_LONGITUDE.to_string()),
        ];
        if let Some(ref mag) = self.min_magnitude {
            pairs.push(("minmagnitude".to_string(), mag.clone()));
        }
        pairs
    }
}
