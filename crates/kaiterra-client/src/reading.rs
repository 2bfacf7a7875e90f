//! Parsed sensor readings and the vendor's batch wire envelope.
//!
//! The batch endpoint answers with a JSON array of `{code, body}` items,
//! one per sub-request, where `body` is itself a JSON document encoded as
//! a string. The inner document carries per-parameter series under
//! `latest` (or `info.aqi` for AQI-only resources).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::KaiterraError;
use crate::sensor::Units;

/// One sub-request inside a `POST /v1/batch` body.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct BatchRequest {
    pub method: &'static str,
    pub relative_url: String,
}

/// One envelope in the batch response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct BatchResponse {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub body: String,
}

/// Inner document carried by a successful envelope.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SensorDocument {
    #[serde(default)]
    pub latest: Option<Vec<ParamSeries>>,
    #[serde(rename = "info.aqi", default)]
    pub info_aqi: Option<Vec<ParamSeries>>,
}

/// Series of points for one measurement parameter.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ParamSeries {
    pub param: String,
    pub units: Units,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub points: Vec<DataPoint>,
}

/// A single timestamped measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    /// Time at which the quantity was measured (RFC3339, UTC).
    pub ts: DateTime<Utc>,
    pub value: f64,
    /// Air quality index of the reading, where applicable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aqi: Option<f64>,
}

/// Latest data for one measurement parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamReading {
    pub units: Units,
    /// Model of the sensor module that captured the reading; reported by
    /// Sensedges (e.g. `km100`, `km102`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub points: Vec<DataPoint>,
}

/// Latest readings for one device, keyed by measurement parameter name
/// (`rpm25c`, `rpm10c`, `rhumid`, `rtemp`, `rco2`, `rtvoc`, ...).
pub type SensorReading = HashMap<String, ParamReading>;

/// Converts one batch envelope into a reading.
///
/// A sub-request that failed (status outside 200..400) or a device that
/// exposes neither `latest` nor `info.aqi` data yields `None`. Only the
/// first point of each series is kept; parameters with no points at all
/// are dropped.
pub(crate) fn parse_batch_item(
    item: &BatchResponse,
) -> Result<Option<SensorReading>, KaiterraError> {
    if !(200..400).contains(&item.code) {
        tracing::debug!(code = item.code, "sub-request failed, no reading");
        return Ok(None);
    }

    let doc: SensorDocument = serde_json::from_str(&item.body)
        .map_err(|e| KaiterraError::Parse(format!("bad sensor document: {e}")))?;

    let series = match (doc.latest, doc.info_aqi) {
        (Some(s), _) if !s.is_empty() => s,
        (_, Some(s)) if !s.is_empty() => s,
        _ => return Ok(None),
    };

    let mut reading = SensorReading::new();
    for p in series {
        let point = match p.points.into_iter().next() {
            Some(pt) => pt,
            None => continue,
        };
        reading.insert(
            p.param,
            ParamReading {
                units: p.units,
                source: p.source,
                points: vec![point],
            },
        );
    }

    Ok(Some(reading))
}
