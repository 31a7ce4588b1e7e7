// Record taxonomy: what each numbered data structure from a vendor represents
use std::collections::HashMap;
use std::fmt;

/// Vendor system a record type belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SystemType {
    pub name: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    CurrentConditions,
    Archive,
    Health,
    HighLow,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordType {
    pub id: u32,
    pub system: &'static SystemType,
    pub name: &'static str,
    pub classification: Classification,
}

impl RecordType {
    pub fn description(&self) -> String {
        format!("{} - {}", self.system.name, self.name)
    }

    pub fn is_current_conditions(&self) -> bool {
        self.classification == Classification::CurrentConditions
    }

    pub fn is_archive(&self) -> bool {
        self.classification == Classification::Archive
    }

    pub fn is_health(&self) -> bool {
        self.classification == Classification::Health
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.system.name, self.name)
    }
}

/// One vendor's record types, indexed by id.
/// Ids only mean something inside the catalog that owns them.
#[derive(Debug)]
pub struct RecordCatalog {
    name: &'static str,
    types: &'static [RecordType],
    by_id: HashMap<u32, &'static RecordType>,
}

impl RecordCatalog {
    pub fn new(name: &'static str, types: &'static [RecordType]) -> Self {
        let by_id = types.iter().map(|r| (r.id, r)).collect();
        Self { name, types, by_id }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn record_type(&self, id: u32) -> Option<&'static RecordType> {
        self.by_id.get(&id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static RecordType> {
        self.types.iter()
    }
}
