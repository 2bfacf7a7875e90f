//! Kaiterra API client - latest readings for Laser Egg and Sensedge devices.
//!
//! Connects to the Kaiterra REST API over HTTPS, authenticated with an API
//! key from the Kaiterra dashboard. One call fetches the latest reported
//! measurements for a batch of devices, in input order.

pub mod client;
pub mod error;
pub mod reading;
pub mod sensor;

pub use client::{KaiterraClient, KaiterraConfig, DEFAULT_BASE_URL, MAX_BATCH_IDS};
pub use error::KaiterraError;
pub use reading::{DataPoint, ParamReading, SensorReading};
pub use sensor::{AqiStandard, DeviceKind, SensorId, Units};
