// Unit systems: which symbol each quantity kind is expressed in
use crate::domain::quantity::QuantityKind;
use serde::Deserialize;
use std::borrow::Cow;

type Symbol = Option<Cow<'static, str>>;

/// Maps quantity kinds to unit symbols. Kinds left unset have no unit.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "UnitSystemRepr")]
pub struct UnitSystem {
    pub temperature: Symbol,
    pub humidity: Symbol,
    pub wind_speed: Symbol,
    pub pressure: Symbol,
    pub wind_direction: Symbol,
    pub rain_quantity: Symbol,
    pub rain_rate: Symbol,
    pub solar_radiation: Symbol,
}

pub const METRIC: UnitSystem = UnitSystem {
    temperature: Some(Cow::Borrowed("°C")),
    humidity: Some(Cow::Borrowed("%")),
    wind_speed: Some(Cow::Borrowed("m/s")),
    pressure: Some(Cow::Borrowed("hPa")),
    wind_direction: Some(Cow::Borrowed("deg")),
    rain_quantity: Some(Cow::Borrowed("cm")),
    rain_rate: Some(Cow::Borrowed("cm/h")),
    solar_radiation: Some(Cow::Borrowed("W/m²")),
};

pub const IMPERIAL: UnitSystem = UnitSystem {
    temperature: Some(Cow::Borrowed("°F")),
    humidity: Some(Cow::Borrowed("%")),
    wind_speed: Some(Cow::Borrowed("mph")),
    pressure: Some(Cow::Borrowed("inHg")),
    wind_direction: Some(Cow::Borrowed("deg")),
    rain_quantity: Some(Cow::Borrowed("in")),
    rain_rate: Some(Cow::Borrowed("in/h")),
    solar_radiation: Some(Cow::Borrowed("W/m²")),
};

impl UnitSystem {
    pub fn metric() -> Self {
        METRIC
    }

    pub fn imperial() -> Self {
        IMPERIAL
    }

    /// A system with no units; build it up with [`UnitSystem::with`]
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: QuantityKind, symbol: impl Into<Cow<'static, str>>) -> Self {
        *self.slot_mut(kind) = Some(symbol.into());
        self
    }

    pub fn fetch(&self, kind: QuantityKind) -> Option<&str> {
        self.slot(kind).as_deref()
    }

    /// Owned copy of the symbol, for attaching to a quantity
    pub(crate) fn symbol(&self, kind: QuantityKind) -> Option<Cow<'static, str>> {
        self.slot(kind).clone()
    }

    fn slot(&self, kind: QuantityKind) -> &Symbol {
        match kind {
            QuantityKind::Temperature => &self.temperature,
            QuantityKind::Humidity => &self.humidity,
            QuantityKind::WindSpeed => &self.wind_speed,
            QuantityKind::Pressure => &self.pressure,
            QuantityKind::WindDirection => &self.wind_direction,
            QuantityKind::RainQuantity => &self.rain_quantity,
            QuantityKind::RainRate => &self.rain_rate,
            QuantityKind::SolarRadiation => &self.solar_radiation,
        }
    }

    fn slot_mut(&mut self, kind: QuantityKind) -> &mut Symbol {
        match kind {
            QuantityKind::Temperature => &mut self.temperature,
            QuantityKind::Humidity => &mut self.humidity,
            QuantityKind::WindSpeed => &mut self.wind_speed,
            QuantityKind::Pressure => &mut self.pressure,
            QuantityKind::WindDirection => &mut self.wind_direction,
            QuantityKind::RainQuantity => &mut self.rain_quantity,
            QuantityKind::RainRate => &mut self.rain_rate,
            QuantityKind::SolarRadiation => &mut self.solar_radiation,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum UnitPreset {
    Metric,
    Imperial,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct UnitTable {
    temperature: Symbol,
    humidity: Symbol,
    wind_speed: Symbol,
    pressure: Symbol,
    wind_direction: Symbol,
    rain_quantity: Symbol,
    rain_rate: Symbol,
    solar_radiation: Symbol,
}

/// Config form: either a preset name or a table of overrides
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UnitSystemRepr {
    Preset(UnitPreset),
    Table(UnitTable),
}

impl From<UnitSystemRepr> for UnitSystem {
    fn from(repr: UnitSystemRepr) -> Self {
        match repr {
            UnitSystemRepr::Preset(UnitPreset::Metric) => METRIC,
            UnitSystemRepr::Preset(UnitPreset::Imperial) => IMPERIAL,
            UnitSystemRepr::Table(t) => UnitSystem {
                temperature: t.temperature,
                humidity: t.humidity,
                wind_speed: t.wind_speed,
                pressure: t.pressure,
                wind_direction: t.wind_direction,
                rain_quantity: t.rain_quantity,
                rain_rate: t.rain_rate,
                solar_radiation: t.solar_radiation,
            },
        }
    }
}
