// Attaching units to raw readings and converting them between unit systems
use crate::domain::quantity::{ConversionError, Quantity, QuantityKind, type_for};
use crate::domain::units::{IMPERIAL, METRIC, UnitSystem};
use serde_json::{Map, Value};
use std::fmt;

/// A field value: a quantity when the field is classified, the raw JSON value otherwise
#[derive(Debug, Clone, PartialEq)]
pub enum Reading {
    Quantity(Quantity),
    Raw(Value),
}

impl Reading {
    pub fn as_quantity(&self) -> Option<&Quantity> {
        match self {
            Reading::Quantity(q) => Some(q),
            Reading::Raw(_) => None,
        }
    }

    pub fn as_raw(&self) -> Option<&Value> {
        match self {
            Reading::Raw(v) => Some(v),
            Reading::Quantity(_) => None,
        }
    }

    /// Numeric value regardless of whether a unit is attached
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Reading::Quantity(q) => Some(q.magnitude),
            Reading::Raw(v) => v.as_f64(),
        }
    }
}

impl From<Quantity> for Reading {
    fn from(q: Quantity) -> Self {
        Reading::Quantity(q)
    }
}

impl From<Value> for Reading {
    fn from(v: Value) -> Self {
        Reading::Raw(v)
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::Quantity(q) => fmt::Display::fmt(q, f),
            Reading::Raw(v) => fmt::Display::fmt(v, f),
        }
    }
}

/// Pairs the units a station reports in with the units the caller wants
#[derive(Debug, Clone, PartialEq)]
pub struct UnitConverter {
    station_units: UnitSystem,
    desired_units: UnitSystem,
}

impl Default for UnitConverter {
    fn default() -> Self {
        Self::new(IMPERIAL, METRIC)
    }
}

impl UnitConverter {
    pub fn new(station_units: UnitSystem, desired_units: UnitSystem) -> Self {
        Self {
            station_units,
            desired_units,
        }
    }

    pub fn station_units(&self) -> &UnitSystem {
        &self.station_units
    }

    pub fn desired_units(&self) -> &UnitSystem {
        &self.desired_units
    }

    pub fn type_for(&self, field: &str) -> Option<QuantityKind> {
        type_for(field)
    }

    pub fn unit_for(&self, field: &str) -> Option<&str> {
        type_for(field).and_then(|kind| self.station_units.fetch(kind))
    }

    pub fn desired_unit_for(&self, field: &str) -> Option<&str> {
        type_for(field).and_then(|kind| self.desired_units.fetch(kind))
    }

    /// Tag a raw value with the station unit for its field, or pass it through
    pub fn attach(&self, field: &str, value: Value) -> Reading {
        let unit = type_for(field).and_then(|kind| self.station_units.symbol(kind));
        match (unit, value.as_f64()) {
            (Some(unit), Some(magnitude)) => Reading::Quantity(Quantity::new(magnitude, unit)),
            _ => Reading::Raw(value),
        }
    }

    /// Attach units to every field of a decoded record, keeping field order
    pub fn attach_all(&self, data: Map<String, Value>) -> Vec<(String, Reading)> {
        data.into_iter()
            .map(|(field, value)| {
                let reading = self.attach(&field, value);
                (field, reading)
            })
            .collect()
    }

    /// Express a reading in the desired unit for its field.
    /// Unclassified fields, raw values and kinds without a desired unit pass through.
    pub fn convert(&self, field: &str, reading: Reading) -> Result<Reading, ConversionError> {
        let Some(desired) = type_for(field).and_then(|kind| self.desired_units.symbol(kind)) else {
            return Ok(reading);
        };

        match reading {
            Reading::Quantity(q) => Ok(Reading::Quantity(q.convert_to(desired)?)),
            raw @ Reading::Raw(_) => Ok(raw),
        }
    }
}
