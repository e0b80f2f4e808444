//! Directory user records.
//!
//! Depending on how the tenant is set up, group membership lives either at the
//! top level (`groups`) or under `app_metadata.groups`. Both are read here,
//! once, and merged into one canonical list. The upstream record itself is
//! kept verbatim and is what gets serialized back to clients.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

const GROUPS_FIELD: &str = "groups";
const APP_METADATA_FIELD: &str = "app_metadata";

#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryUser {
    record: Map<String, Value>,
    groups: Vec<String>,
}

impl DirectoryUser {
    pub fn new(record: Map<String, Value>) -> Self {
        let groups = membership(&record);
        Self { record, groups }
    }

    /// Canonical group membership, deduplicated, in first-seen order.
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn is_member_of(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }

    /// The record exactly as the directory returned it.
    pub fn record(&self) -> &Map<String, Value> {
        &self.record
    }
}

fn membership(record: &Map<String, Value>) -> Vec<String> {
    let top_level = record.get(GROUPS_FIELD);
    let nested = record
        .get(APP_METADATA_FIELD)
        .and_then(Value::as_object)
        .and_then(|meta| meta.get(GROUPS_FIELD));

    let mut groups: Vec<String> = Vec::new();
    for name in [top_level, nested]
        .into_iter()
        .flatten()
        .filter_map(Value::as_array)
        .flatten()
        .filter_map(Value::as_str)
    {
        if !groups.iter().any(|g| g == name) {
            groups.push(name.to_string());
        }
    }
    groups
}

impl<'de> Deserialize<'de> for DirectoryUser {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Map::<String, Value>::deserialize(deserializer).map(Self::new)
    }
}

impl Serialize for DirectoryUser {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.record.serialize(serializer)
    }
}
