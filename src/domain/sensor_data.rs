// Sensor data: records grouped per sensor, classified against a record catalog
use crate::domain::conversion::{Reading, UnitConverter};
use crate::domain::quantity::ConversionError;
use crate::domain::record_type::{RecordCatalog, RecordType};
use crate::error::Error;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::fmt;
use std::ops::Deref;

/// One timestamped set of readings
#[derive(Debug, Clone, PartialEq)]
pub struct SensorRecord {
    timestamp: Option<DateTime<Utc>>,
    fields: Vec<(String, Reading)>,
}

impl SensorRecord {
    pub fn new(converter: &UnitConverter, data: Map<String, Value>) -> Self {
        let timestamp = data.get("ts").and_then(Value::as_i64).and_then(unix_time);
        Self {
            timestamp,
            fields: converter.attach_all(data),
        }
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    /// Reading in station units
    pub fn get(&self, name: &str) -> Option<&Reading> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, reading)| reading)
    }

    /// Value of a field that carries no unit
    pub fn raw(&self, name: &str) -> Option<&Value> {
        self.get(name)?.as_raw()
    }

    /// Reading in the converter's desired units
    pub fn converted(
        &self,
        name: &str,
        converter: &UnitConverter,
    ) -> Result<Option<Reading>, ConversionError> {
        self.get(name)
            .map(|reading| converter.convert(name, reading.clone()))
            .transpose()
    }

    /// `ts` and `*_at` fields hold unix seconds
    pub fn time(&self, name: &str) -> Option<DateTime<Utc>> {
        if name != "ts" && !name.ends_with("_at") {
            return None;
        }
        self.get(name)?.as_raw()?.as_i64().and_then(unix_time)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Reading)> {
        self.fields.iter().map(|(name, reading)| (name.as_str(), reading))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for SensorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.timestamp {
            Some(ts) => write!(f, "SensorRecord time='{}' ({} values)", ts, self.fields.len()),
            None => write!(f, "SensorRecord ({} values)", self.fields.len()),
        }
    }
}

fn unix_time(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}

/// All records one sensor reported under a single record type
#[derive(Debug, Clone, PartialEq)]
pub struct SensorDataset {
    record_type: Option<&'static RecordType>,
    meta: Map<String, Value>,
    records: Vec<SensorRecord>,
}

impl SensorDataset {
    /// Build from a decoded group: `{lsid, sensor_type, data_structure_type, data: [...]}`
    pub fn from_group(
        mut group: Map<String, Value>,
        catalog: &RecordCatalog,
        converter: &UnitConverter,
    ) -> Result<Self, Error> {
        let records = match group.remove("data") {
            Some(Value::Array(items)) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(data) => Ok(SensorRecord::new(converter, data)),
                    other => Err(Error::UnexpectedResponse(format!(
                        "sensor record is not an object: {other}"
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(Value::Null) | None => Vec::new(),
            Some(other) => {
                return Err(Error::UnexpectedResponse(format!(
                    "sensor data is not an array: {other}"
                )));
            }
        };

        let structure_type = group.get("data_structure_type").and_then(Value::as_u64);
        let record_type = structure_type
            .and_then(|id| u32::try_from(id).ok())
            .and_then(|id| catalog.record_type(id));

        if record_type.is_none() {
            tracing::warn!(
                "Unrecognized data_structure_type {:?} for {} catalog",
                structure_type,
                catalog.name()
            );
        }

        Ok(Self {
            record_type,
            meta: group,
            records,
        })
    }

    pub fn record_type(&self) -> Option<&'static RecordType> {
        self.record_type
    }

    pub fn lsid(&self) -> Option<i64> {
        self.meta.get("lsid").and_then(Value::as_i64)
    }

    pub fn sensor_type(&self) -> Option<i64> {
        self.meta.get("sensor_type").and_then(Value::as_i64)
    }

    /// Group-level value other than the records themselves
    pub fn raw(&self, name: &str) -> Option<&Value> {
        self.meta.get(name)
    }

    pub fn records(&self) -> &[SensorRecord] {
        &self.records
    }

    pub fn first_record(&self) -> Option<&SensorRecord> {
        self.records.first()
    }

    /// Looks a field up in the first record, then at group level
    pub fn contains(&self, name: &str) -> bool {
        self.first_record().is_some_and(|r| r.get(name).is_some()) || self.meta.contains_key(name)
    }

    pub fn is_current_conditions(&self) -> bool {
        self.record_type.is_some_and(RecordType::is_current_conditions)
    }

    pub fn is_archive(&self) -> bool {
        self.record_type.is_some_and(RecordType::is_archive)
    }

    pub fn is_health(&self) -> bool {
        self.record_type.is_some_and(RecordType::is_health)
    }

    pub fn is_weather(&self) -> bool {
        self.is_current_conditions() || self.is_archive()
    }

    pub fn description(&self) -> String {
        self.record_type
            .map(RecordType::description)
            .unwrap_or_else(|| "Unknown record type".to_string())
    }
}

impl fmt::Display for SensorDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SensorDataset lsid={} ({}, {} records)",
            self.lsid().map(|id| id.to_string()).unwrap_or_else(|| "?".to_string()),
            self.description(),
            self.records.len()
        )
    }
}

/// Ordered datasets; filters return new collections and keep relative order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SensorDataCollection {
    datasets: Vec<SensorDataset>,
}

impl SensorDataCollection {
    pub fn new(datasets: Vec<SensorDataset>) -> Self {
        Self { datasets }
    }

    pub fn current_conditions(&self) -> Self {
        self.select(SensorDataset::is_current_conditions)
    }

    pub fn archive(&self) -> Self {
        self.select(SensorDataset::is_archive)
    }

    pub fn health(&self) -> Self {
        self.select(SensorDataset::is_health)
    }

    pub fn weather(&self) -> Self {
        self.select(SensorDataset::is_weather)
    }

    pub fn select(&self, predicate: impl Fn(&SensorDataset) -> bool) -> Self {
        self.datasets.iter().filter(|&d| predicate(d)).cloned().collect()
    }
}

impl Deref for SensorDataCollection {
    type Target = [SensorDataset];

    fn deref(&self) -> &Self::Target {
        &self.datasets
    }
}

impl FromIterator<SensorDataset> for SensorDataCollection {
    fn from_iter<I: IntoIterator<Item = SensorDataset>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for SensorDataCollection {
    type Item = SensorDataset;
    type IntoIter = std::vec::IntoIter<SensorDataset>;

    fn into_iter(self) -> Self::IntoIter {
        self.datasets.into_iter()
    }
}

impl<'a> IntoIterator for &'a SensorDataCollection {
    type Item = &'a SensorDataset;
    type IntoIter = std::slice::Iter<'a, SensorDataset>;

    fn into_iter(self) -> Self::IntoIter {
        self.datasets.iter()
    }
}

impl fmt::Display for SensorDataCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SensorDataCollection ({} sensors)", self.datasets.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::quantity::Quantity;
    use crate::infrastructure::api_v2::CLOUD_RECORD_TYPES;
    use serde_json::json;

    fn group(lsid: i64, structure_type: u32, data: Value) -> Map<String, Value> {
        let Value::Object(map) = json!({
            "lsid": lsid,
            "sensor_type": 45,
            "data_structure_type": structure_type,
            "data": data,
        }) else {
            unreachable!()
        };
        map
    }

    fn dataset(lsid: i64, structure_type: u32) -> SensorDataset {
        SensorDataset::from_group(
            group(lsid, structure_type, json!([{"ts": 1700000000, "temp": 70.0}])),
            &CLOUD_RECORD_TYPES,
            &UnitConverter::default(),
        )
        .unwrap()
    }

    fn mixed_collection() -> SensorDataCollection {
        // record types 10/12 current, 15 health, 11 archive, 5 high/low, 99 not in catalog
        [dataset(1, 10), dataset(2, 15), dataset(3, 11), dataset(4, 5), dataset(5, 99), dataset(6, 12)]
            .into_iter()
            .collect()
    }

    fn lsids(collection: &SensorDataCollection) -> Vec<i64> {
        collection.iter().filter_map(SensorDataset::lsid).collect()
    }

    #[test]
    fn test_from_group_classifies_and_attaches_units() {
        let d = dataset(42, 10);
        assert_eq!(d.lsid(), Some(42));
        assert_eq!(d.sensor_type(), Some(45));
        assert!(d.is_current_conditions());
        assert_eq!(d.description(), "WeatherLink Live - ISS Current Conditions Record");

        let record = d.first_record().unwrap();
        assert_eq!(record.get("temp"), Some(&Reading::Quantity(Quantity::new(70.0, "°F"))));
        assert_eq!(record.timestamp(), DateTime::from_timestamp(1700000000, 0));
    }

    #[test]
    fn test_from_group_rejects_non_array_data() {
        let result = SensorDataset::from_group(
            group(1, 10, json!("nope")),
            &CLOUD_RECORD_TYPES,
            &UnitConverter::default(),
        );
        assert!(matches!(result, Err(Error::UnexpectedResponse(_))));
    }

    #[test]
    fn test_unknown_structure_type_matches_nothing() {
        let d = dataset(1, 99);
        assert_eq!(d.record_type(), None);
        assert!(!d.is_current_conditions() && !d.is_archive() && !d.is_health() && !d.is_weather());
    }

    #[test]
    fn test_filters_preserve_order() {
        let collection = mixed_collection();
        assert_eq!(lsids(&collection.current_conditions()), [1, 6]);
        assert_eq!(lsids(&collection.archive()), [3]);
        assert_eq!(lsids(&collection.health()), [2]);
        assert_eq!(lsids(&collection.weather()), [1, 3, 6]);
    }

    #[test]
    fn test_filters_do_not_mutate_source() {
        let collection = mixed_collection();
        let _ = collection.health();
        assert_eq!(collection.len(), 6);
        assert_eq!(collection, mixed_collection());
    }

    #[test]
    fn test_filters_are_idempotent() {
        let collection = mixed_collection();
        assert_eq!(
            collection.current_conditions().current_conditions(),
            collection.current_conditions()
        );
        assert_eq!(collection.weather().weather(), collection.weather());
        assert_eq!(collection.health().health(), collection.health());
        assert_eq!(collection.archive().archive(), collection.archive());
    }

    #[test]
    fn test_converted_and_time_accessors() {
        let converter = UnitConverter::default();
        let Value::Object(data) = json!({"ts": 1700000000, "temp": 212.0, "last_report_at": 1700000060, "lsid": 1})
        else {
            unreachable!()
        };
        let record = SensorRecord::new(&converter, data);

        let celsius = record.converted("temp", &converter).unwrap().unwrap();
        assert!((celsius.as_f64().unwrap() - 100.0).abs() < 1e-9);
        assert_eq!(record.converted("missing", &converter).unwrap(), None);

        assert_eq!(record.time("last_report_at"), DateTime::from_timestamp(1700000060, 0));
        assert_eq!(record.time("lsid"), None);
        assert_eq!(record.raw("lsid"), Some(&json!(1)));
        assert_eq!(record.raw("temp"), None);
        assert_eq!(record.len(), 4);
    }
}
