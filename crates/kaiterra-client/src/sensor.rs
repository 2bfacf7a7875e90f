//! Device references and measurement vocabulary.
//!
//! A sensor is addressed by a path-like ID such as
//! `/lasereggs/00000000-0001-0001-0000-00007e57c0de`. The API accepts the
//! device kind in singular or plural form and the UUID with or without
//! dashes; [`SensorId`] normalizes all of that into one canonical shape.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::error::KaiterraError;

/// Hardware families the API exposes as named resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    LaserEgg,
    Sensedge,
}

impl DeviceKind {
    /// Resource segment used in request paths.
    pub fn path_segment(self) -> &'static str {
        match self {
            DeviceKind::LaserEgg => "lasereggs",
            DeviceKind::Sensedge => "sensedges",
        }
    }
}

fn sensor_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // UUID is either 32 bare hex digits or 8-4-4-4-12 groups where each
        // separating dash is independently optional. Dashes anywhere else
        // are rejected.
        Regex::new(
            r"^/?(lasereggs?|sensedges?)/([0-9a-f]{32}|[0-9a-f]{8}-?[0-9a-f]{4}-?[0-9a-f]{4}-?[0-9a-f]{4}-?[0-9a-f]{12})$",
        )
        .unwrap()
    })
}

/// A validated device reference: kind plus UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SensorId {
    kind: DeviceKind,
    uuid: Uuid,
}

impl SensorId {
    pub fn new(kind: DeviceKind, uuid: Uuid) -> Self {
        Self { kind, uuid }
    }

    /// Parses a device path. Matching is case-insensitive; the leading
    /// slash is optional.
    pub fn parse(input: &str) -> Result<Self, KaiterraError> {
        let lower = input.to_ascii_lowercase();
        let caps = sensor_id_re()
            .captures(&lower)
            .ok_or_else(|| KaiterraError::InvalidSensorId(input.to_string()))?;

        let kind = if caps[1].starts_with("laseregg") {
            DeviceKind::LaserEgg
        } else {
            DeviceKind::Sensedge
        };
        let hex: String = caps[2].chars().filter(|c| *c != '-').collect();
        let uuid = Uuid::parse_str(&hex)
            .map_err(|_| KaiterraError::InvalidSensorId(input.to_string()))?;

        Ok(Self { kind, uuid })
    }

    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }
}

impl fmt::Display for SensorId {
    /// Canonical form: plural kind, hyphenated lowercase UUID.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.kind.path_segment(), self.uuid.hyphenated())
    }
}

impl FromStr for SensorId {
    type Err = KaiterraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Units in which sensor-reported values are expressed on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Units {
    Unknown,
    Count,
    Percent,
    DegreesCelsius,
    DegreesFahrenheit,
    MilligramsPerCubicMeter,
    MicrogramsPerCubicMeter,
    PartsPerMillion,
    PartsPerBillion,
}

impl Units {
    pub const ALL: [Units; 9] = [
        Units::Unknown,
        Units::Count,
        Units::Percent,
        Units::DegreesCelsius,
        Units::DegreesFahrenheit,
        Units::MilligramsPerCubicMeter,
        Units::MicrogramsPerCubicMeter,
        Units::PartsPerMillion,
        Units::PartsPerBillion,
    ];

    /// Short wire representation, as reported by the API.
    pub fn as_str(self) -> &'static str {
        match self {
            Units::Unknown => "?",
            Units::Count => "x",
            Units::Percent => "%",
            Units::DegreesCelsius => "C",
            Units::DegreesFahrenheit => "F",
            Units::MilligramsPerCubicMeter => "mg/m³",
            Units::MicrogramsPerCubicMeter => "µg/m³",
            Units::PartsPerMillion => "ppm",
            Units::PartsPerBillion => "ppb",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Units {
    type Err = KaiterraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Units::ALL
            .iter()
            .find(|u| u.as_str() == s)
            .copied()
            .ok_or_else(|| KaiterraError::Parse(format!("'{s}' is not a known unit")))
    }
}

impl Serialize for Units {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Units {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Governing body whose scale is used when the API computes an air quality
/// index for reported pollutants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AqiStandard {
    #[serde(rename = "us")]
    Usa,
    #[serde(rename = "cn")]
    China,
    #[serde(rename = "in")]
    India,
}

impl AqiStandard {
    pub fn as_str(self) -> &'static str {
        match self {
            AqiStandard::Usa => "us",
            AqiStandard::China => "cn",
            AqiStandard::India => "in",
        }
    }
}
