// Quantity kinds, the field-name classifier and unit physics
use once_cell::sync::Lazy;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Physical category a telemetry field is measured in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuantityKind {
    Temperature,
    Humidity,
    WindSpeed,
    Pressure,
    WindDirection,
    RainQuantity,
    RainRate,
    SolarRadiation,
}

impl QuantityKind {
    pub const ALL: [QuantityKind; 8] = [
        QuantityKind::Temperature,
        QuantityKind::Humidity,
        QuantityKind::WindSpeed,
        QuantityKind::Pressure,
        QuantityKind::WindDirection,
        QuantityKind::RainQuantity,
        QuantityKind::RainRate,
        QuantityKind::SolarRadiation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuantityKind::Temperature => "temperature",
            QuantityKind::Humidity => "humidity",
            QuantityKind::WindSpeed => "wind_speed",
            QuantityKind::Pressure => "pressure",
            QuantityKind::WindDirection => "wind_direction",
            QuantityKind::RainQuantity => "rain_quantity",
            QuantityKind::RainRate => "rain_rate",
            QuantityKind::SolarRadiation => "solar_radiation",
        }
    }
}

impl fmt::Display for QuantityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Upstream reports some quantities under several names (rain_rate_last, rain_rate_hi, ...).
// Every alias is kept and maps to the same kind.
const FIELD_KINDS: &[(&str, QuantityKind)] = &[
    ("temp", QuantityKind::Temperature),
    ("temp_in", QuantityKind::Temperature),
    ("dew_point", QuantityKind::Temperature),
    ("dew_point_in", QuantityKind::Temperature),
    ("wet_bulb", QuantityKind::Temperature),
    ("heat_index", QuantityKind::Temperature),
    ("heat_index_in", QuantityKind::Temperature),
    ("wind_chill", QuantityKind::Temperature),
    ("thw_index", QuantityKind::Temperature),
    ("thsw_index", QuantityKind::Temperature),
    ("hum", QuantityKind::Humidity),
    ("hum_in", QuantityKind::Humidity),
    ("bar_sea_level", QuantityKind::Pressure),
    ("bar_absolute", QuantityKind::Pressure),
    ("bar_trend", QuantityKind::Pressure),
    ("wind_speed_last", QuantityKind::WindSpeed),
    ("wind_speed_avg_last_1_min", QuantityKind::WindSpeed),
    ("wind_speed_avg_last_2_min", QuantityKind::WindSpeed),
    ("wind_speed_avg_last_10_min", QuantityKind::WindSpeed),
    ("wind_speed_hi_last_2_min", QuantityKind::WindSpeed),
    ("wind_speed_hi_last_10_min", QuantityKind::WindSpeed),
    ("wind_dir_last", QuantityKind::WindDirection),
    ("wind_dir_scalar_avg_last_1_min", QuantityKind::WindDirection),
    ("wind_dir_scalar_avg_last_2_min", QuantityKind::WindDirection),
    ("wind_dir_scalar_avg_last_10_min", QuantityKind::WindDirection),
    ("wind_dir_at_hi_speed_last_2_min", QuantityKind::WindDirection),
    ("wind_dir_at_hi_speed_last_10_min", QuantityKind::WindDirection),
    ("rain_rate_last", QuantityKind::RainRate),
    ("rain_rate_hi", QuantityKind::RainRate),
    ("rain_rate_hi_last_15_min", QuantityKind::RainRate),
    ("rainfall_last_15_min", QuantityKind::RainQuantity),
    ("rainfall_last_60_min", QuantityKind::RainQuantity),
    ("rainfall_last_24_hr", QuantityKind::RainQuantity),
    ("rainfall_daily", QuantityKind::RainQuantity),
    ("rainfall_monthly", QuantityKind::RainQuantity),
    ("rainfall_year", QuantityKind::RainQuantity),
    ("rain_storm", QuantityKind::RainQuantity),
    ("rain_storm_last", QuantityKind::RainQuantity),
    ("solar_rad", QuantityKind::SolarRadiation),
];

static FIELD_INDEX: Lazy<HashMap<&'static str, QuantityKind>> =
    Lazy::new(|| FIELD_KINDS.iter().copied().collect());

/// Classify a telemetry field name. Unknown names are not an error.
pub fn type_for(field: &str) -> Option<QuantityKind> {
    FIELD_INDEX.get(field).copied()
}

/// All field names the classifier knows about
pub fn known_fields() -> impl Iterator<Item = (&'static str, QuantityKind)> {
    FIELD_KINDS.iter().copied()
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error("cannot convert {from} ({from_kind}) to {to} ({to_kind})")]
    KindMismatch {
        from: String,
        to: String,
        from_kind: QuantityKind,
        to_kind: QuantityKind,
    },

    #[error("unknown unit: {0}")]
    UnknownUnit(String),
}

/// A unit expressed against its kind's base unit: base = value * scale + offset
struct UnitDef {
    symbol: &'static str,
    kind: QuantityKind,
    scale: f64,
    offset: f64,
}

const fn linear(symbol: &'static str, kind: QuantityKind, scale: f64) -> UnitDef {
    UnitDef {
        symbol,
        kind,
        scale,
        offset: 0.0,
    }
}

// Base units: °C, %, m/s, hPa, deg, cm, cm/h, W/m²
const UNIT_DEFS: &[UnitDef] = &[
    linear("°C", QuantityKind::Temperature, 1.0),
    UnitDef {
        symbol: "°F",
        kind: QuantityKind::Temperature,
        scale: 5.0 / 9.0,
        offset: -32.0 * 5.0 / 9.0,
    },
    UnitDef {
        symbol: "K",
        kind: QuantityKind::Temperature,
        scale: 1.0,
        offset: -273.15,
    },
    linear("%", QuantityKind::Humidity, 1.0),
    linear("m/s", QuantityKind::WindSpeed, 1.0),
    linear("mph", QuantityKind::WindSpeed, 0.44704),
    linear("km/h", QuantityKind::WindSpeed, 1.0 / 3.6),
    linear("kn", QuantityKind::WindSpeed, 1852.0 / 3600.0),
    linear("hPa", QuantityKind::Pressure, 1.0),
    linear("inHg", QuantityKind::Pressure, 33.8639),
    linear("mbar", QuantityKind::Pressure, 1.0),
    linear("Pa", QuantityKind::Pressure, 0.01),
    linear("kPa", QuantityKind::Pressure, 10.0),
    linear("deg", QuantityKind::WindDirection, 1.0),
    linear("cm", QuantityKind::RainQuantity, 1.0),
    linear("in", QuantityKind::RainQuantity, 2.54),
    linear("mm", QuantityKind::RainQuantity, 0.1),
    linear("cm/h", QuantityKind::RainRate, 1.0),
    linear("in/h", QuantityKind::RainRate, 2.54),
    linear("mm/h", QuantityKind::RainRate, 0.1),
    linear("W/m²", QuantityKind::SolarRadiation, 1.0),
];

fn unit_def(symbol: &str) -> Option<&'static UnitDef> {
    UNIT_DEFS.iter().find(|u| u.symbol == symbol)
}

/// Kind a unit symbol measures, if the symbol is known
pub fn kind_of_unit(symbol: &str) -> Option<QuantityKind> {
    unit_def(symbol).map(|u| u.kind)
}

/// A magnitude tagged with its unit symbol
#[derive(Debug, Clone, PartialEq)]
pub struct Quantity {
    pub magnitude: f64,
    pub unit: Cow<'static, str>,
}

impl Quantity {
    pub fn new(magnitude: f64, unit: impl Into<Cow<'static, str>>) -> Self {
        Self {
            magnitude,
            unit: unit.into(),
        }
    }

    pub fn kind(&self) -> Option<QuantityKind> {
        kind_of_unit(&self.unit)
    }

    pub fn convert_to(&self, target: impl Into<Cow<'static, str>>) -> Result<Quantity, ConversionError> {
        let target = target.into();
        if self.unit == target {
            return Ok(self.clone());
        }

        let from = unit_def(&self.unit).ok_or_else(|| ConversionError::UnknownUnit(self.unit.to_string()))?;
        let to = unit_def(&target).ok_or_else(|| ConversionError::UnknownUnit(target.to_string()))?;

        if from.kind != to.kind {
            return Err(ConversionError::KindMismatch {
                from: self.unit.to_string(),
                to: target.to_string(),
                from_kind: from.kind,
                to_kind: to.kind,
            });
        }

        let base = self.magnitude * from.scale + from.offset;
        Ok(Quantity::new((base - to.offset) / to.scale, target))
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.magnitude, self.unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        let tolerance = 1e-6 * expected.abs().max(1.0);
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_type_for_known_fields() {
        assert_eq!(type_for("wind_speed_last"), Some(QuantityKind::WindSpeed));
        assert_eq!(type_for("temp"), Some(QuantityKind::Temperature));
        assert_eq!(type_for("bar_trend"), Some(QuantityKind::Pressure));
        assert_eq!(type_for("solar_rad"), Some(QuantityKind::SolarRadiation));
    }

    #[test]
    fn test_type_for_unknown_field() {
        assert_eq!(type_for("lsid"), None);
        assert_eq!(type_for(""), None);
        assert_eq!(type_for("TEMP"), None);
    }

    #[test]
    fn test_rain_rate_aliases_share_kind() {
        for field in ["rain_rate_last", "rain_rate_hi", "rain_rate_hi_last_15_min"] {
            assert_eq!(type_for(field), Some(QuantityKind::RainRate));
        }
    }

    #[test]
    fn test_every_kind_is_classified() {
        for kind in QuantityKind::ALL {
            assert!(known_fields().any(|(_, k)| k == kind), "no field for {kind}");
        }
    }

    #[test]
    fn test_temperature_conversion() {
        let boiling = Quantity::new(212.0, "°F").convert_to("°C").unwrap();
        assert_close(boiling.magnitude, 100.0);
        assert_eq!(boiling.unit, "°C");

        let freezing = Quantity::new(0.0, "°C").convert_to("°F").unwrap();
        assert_close(freezing.magnitude, 32.0);

        let kelvin = Quantity::new(0.0, "°C").convert_to("K").unwrap();
        assert_close(kelvin.magnitude, 273.15);
    }

    #[test]
    fn test_linear_conversions() {
        assert_close(Quantity::new(10.0, "mph").convert_to("m/s").unwrap().magnitude, 4.4704);
        assert_close(Quantity::new(1.0, "in").convert_to("cm").unwrap().magnitude, 2.54);
        assert_close(Quantity::new(1.0, "in/h").convert_to("cm/h").unwrap().magnitude, 2.54);
        assert_close(Quantity::new(30.0, "inHg").convert_to("hPa").unwrap().magnitude, 1015.917);
        assert_close(Quantity::new(12.7, "mm").convert_to("in").unwrap().magnitude, 0.5);
    }

    #[test]
    fn test_same_unit_is_identity() {
        let q = Quantity::new(42.0, "W/m²");
        assert_eq!(q.convert_to("W/m²").unwrap(), q);
    }

    #[test]
    fn test_kind_mismatch_is_an_error() {
        let err = Quantity::new(10.0, "mph").convert_to("°C").unwrap_err();
        assert!(matches!(
            err,
            ConversionError::KindMismatch {
                from_kind: QuantityKind::WindSpeed,
                to_kind: QuantityKind::Temperature,
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_unit_is_an_error() {
        let err = Quantity::new(1.0, "furlong/fortnight").convert_to("m/s").unwrap_err();
        assert_eq!(err, ConversionError::UnknownUnit("furlong/fortnight".to_string()));
    }

    #[test]
    fn test_quantity_kind_follows_unit() {
        assert_eq!(Quantity::new(3.0, "kn").kind(), Some(QuantityKind::WindSpeed));
        assert_eq!(Quantity::new(0.5, "mm/h").kind(), Some(QuantityKind::RainRate));
        assert_eq!(Quantity::new(1.0, "furlong").kind(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Quantity::new(4.5, "m/s").to_string(), "4.5 m/s");
    }
}
