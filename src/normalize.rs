//! Normalization of raw catalog GeoJSON into flat quake records.
//!
//! The catalog service returns a feature collection where each feature
//! carries `geometry.coordinates` as a positional `[lon, lat, depth]`
//! triple and `properties` with `mag`, `place` and `time` (epoch
//! milliseconds). Normalization flattens each feature into a
//! [`QuakeRecord`], preserving feature order.
//!
//! Malformed features are skipped with a warning rather than aborting the
//! whole batch; a single bad entry must not blank the feed.

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{PipelineError, Result};

/// Opaque payload as fetched from the catalog service and persisted by the
/// fallback store. No schema is imposed at that layer; the structure is
/// only interpreted here.
pub type RawCatalogPayload = serde_json::Value;

/// Raw catalog payload as returned by the remote service.
///
/// Stored and restored verbatim by the fallback store; only the fields the
/// normalizer reads are modeled, everything else is ignored on decode. All
/// leaves are optional so malformed entries are representable rather than
/// rejected at decode time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawCatalog {
    #[serde(default)]
    pub features: Vec<RawFeature>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawFeature {
    pub geometry: Option<RawGeometry>,
    pub properties: Option<RawProperties>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawGeometry {
    /// Positional `[longitude, latitude, depth_km]`
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawProperties {
    pub mag: Option<f64>,
    pub place: Option<String>,
    /// Event time in epoch milliseconds
    pub time: Option<i64>,
}

/// One normalized seismic event, the only shape exposed past the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuakeRecord {
    pub longitude: f64,
    pub latitude: f64,
    pub depth_km: f64,
    pub magnitude: f64,
    pub place: String,
    /// UTC, whole seconds, `%Y-%m-%dT%H:%M:%S`, no timezone suffix
    pub time_utc: String,
}

/// Normalize an opaque catalog payload into quake records.
///
/// The payload is interpreted against the feature-collection shape here
/// and nowhere earlier; a payload whose top-level structure does not fit
/// (e.g. `features` is not an array) fails the whole batch, while
/// individually malformed features are skipped per [`normalize`].
pub fn normalize_payload(payload: &RawCatalogPayload) -> Result<Vec<QuakeRecord>> {
    let catalog = RawCatalog::deserialize(payload)
        .map_err(|e| PipelineError::normalization(format!("payload is not a feature collection: {}", e)))?;
    Ok(normalize(&catalog))
}

/// Flatten a raw catalog into quake records, preserving feature order.
///
/// Features missing any required field are skipped and logged; the
/// remainder is returned.
pub fn normalize(catalog: &RawCatalog) -> Vec<QuakeRecord> {
    let mut records = Vec::with_capacity(catalog.features.len());
    for (index, feature) in catalog.features.iter().enumerate() {
        match normalize_feature(feature) {
            Ok(record) => records.push(record),
            Err(reason) => {
                warn!(index, reason, "skipping malformed catalog feature");
            }
        }
    }
    records
}

fn normalize_feature(feature: &RawFeature) -> std::result::Result<QuakeRecord, &'static str> {
    let geometry = feature.geometry.as_ref().ok_or("missing geometry")?;
    let properties = feature.properties.as_ref().ok_or("missing properties")?;

    if geometry.coordinates.len() < 3 {
        return Err("geometry coordinates shorter than [lon, lat, depth]");
    }
    let longitude = geometry.coordinates[0];
    let latitude = geometry.coordinates[1];
    let depth_km = geometry.coordinates[2];

    let magnitude = properties.mag.ok_or("missing magnitude")?;
    let place = properties.place.clone().ok_or("missing place")?;
    let time_ms = properties.time.ok_or("missing event time")?;

    let time_utc = format_event_time(time_ms).ok_or("event time out of range")?;

    Ok(QuakeRecord {
        longitude,
        latitude,
        depth_km,
        magnitude,
        place,
        time_utc,
    })
}

/// Epoch milliseconds to UTC, truncated to whole seconds.
fn format_event_time(time_ms: i64) -> Option<String> {
    let datetime = DateTime::from_timestamp_millis(time_ms)?;
    Some(datetime.format("%Y-%m-%dT%H:%M:%S").to_string())
}
