use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Persisted local-ID -> remote-ID pairs.
///
/// Serializes as a flat JSON object; keys are kept sorted so the persisted form is stable
/// across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ReconciliationMap(BTreeMap<String, String>);

impl ReconciliationMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, local_id: &str) -> Option<&str> {
        self.0.get(local_id).map(String::as_str)
    }

    pub fn contains(&self, local_id: &str) -> bool {
        self.0.contains_key(local_id)
    }

    /// Returns the previous remote ID, if any.
    pub fn insert(&mut self, local_id: impl Into<String>, remote_id: impl Into<String>) -> Option<String> {
        self.0.insert(local_id.into(), remote_id.into())
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&str, &str) -> bool) {
        self.0.retain(|local, remote| keep(local.as_str(), remote.as_str()));
    }

    /// Rewrites remote IDs the target reassigned on publish (`sent ID -> assigned ID`).
    pub fn remap_remote_ids<'a>(&mut self, assigned: impl Fn(&str) -> Option<&'a str>) {
        for remote in self.0.values_mut() {
            if let Some(real) = assigned(remote.as_str()) {
                *remote = real.to_string();
            }
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(l, r)| (l.as_str(), r.as_str()))
    }
}

impl<L: Into<String>, R: Into<String>> FromIterator<(L, R)> for ReconciliationMap {
    fn from_iter<I: IntoIterator<Item = (L, R)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(l, r)| (l.into(), r.into())).collect())
    }
}
