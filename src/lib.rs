//! Client model for the WeatherLink telemetry APIs.
//!
//! Two variants are supported: the HMAC-signed cloud API (v2) and the
//! unauthenticated on-device local API (v1). Raw readings are classified
//! into quantity kinds, tagged with the station's units and converted to
//! the caller's preferred unit system on access.
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;

pub use application::client::Client;
pub use application::local_client::LocalClient;
pub use domain::conversion::{Reading, UnitConverter};
pub use domain::quantity::{ConversionError, Quantity, QuantityKind, type_for};
pub use domain::record_type::{Classification, RecordType};
pub use domain::sensor_data::{SensorDataCollection, SensorDataset, SensorRecord};
pub use domain::units::{IMPERIAL, METRIC, UnitSystem};
pub use error::{Error, Result};
