use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Read-only snapshot of what already exists in the target system, keyed by remote ID.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RemoteState {
    #[serde(default)]
    pub variables: BTreeMap<String, RemoteVariable>,

    #[serde(default)]
    pub variable_collections: BTreeMap<String, RemoteCollection>,

    #[serde(default)]
    pub variable_modes: BTreeMap<String, RemoteMode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RemoteVariable {
    pub name: String,
    pub variable_collection_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RemoteCollection {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RemoteMode {
    pub name: String,
    pub variable_collection_id: String,
}

impl RemoteState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
            && self.variable_collections.is_empty()
            && self.variable_modes.is_empty()
    }

    /// True when any remote entity (of any kind) carries this ID.
    pub fn contains(&self, remote_id: &str) -> bool {
        self.variables.contains_key(remote_id)
            || self.variable_collections.contains_key(remote_id)
            || self.variable_modes.contains_key(remote_id)
    }

    pub fn find_collection_by_name(&self, name: &str) -> Option<&str> {
        self.variable_collections
            .iter()
            .find(|(_, c)| c.name == name)
            .map(|(id, _)| id.as_str())
    }

    pub fn find_mode_by_name(&self, collection_id: &str, name: &str) -> Option<&str> {
        self.variable_modes
            .iter()
            .find(|(_, m)| m.variable_collection_id == collection_id && m.name == name)
            .map(|(id, _)| id.as_str())
    }

    pub fn find_variable_by_name(&self, collection_id: &str, name: &str) -> Option<&str> {
        self.variables
            .iter()
            .find(|(_, v)| v.variable_collection_id == collection_id && v.name == name)
            .map(|(id, _)| id.as_str())
    }

    pub fn insert_collection(&mut self, id: impl Into<String>, name: impl Into<String>) {
        self.variable_collections
            .insert(id.into(), RemoteCollection { name: name.into() });
    }

    pub fn insert_mode(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        collection_id: impl Into<String>,
    ) {
        self.variable_modes.insert(
            id.into(),
            RemoteMode {
                name: name.into(),
                variable_collection_id: collection_id.into(),
            },
        );
    }

    pub fn insert_variable(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        collection_id: impl Into<String>,
    ) {
        self.variables.insert(
            id.into(),
            RemoteVariable {
                name: name.into(),
                variable_collection_id: collection_id.into(),
            },
        );
    }
}
