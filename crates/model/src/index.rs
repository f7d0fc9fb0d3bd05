use crate::system::{Dimension, Platform, ResolvedValueType, Token, TokenSystem};
use std::collections::HashMap;

/// Borrowed lookup tables over a [`TokenSystem`], built once per transform.
pub struct SystemIndex<'a> {
    system: &'a TokenSystem,

    /// Token ID -> token
    tokens: HashMap<&'a str, &'a Token>,

    /// Mode ID -> position of its dimension in `system.dimensions`
    mode_dimension: HashMap<&'a str, usize>,

    value_types: HashMap<&'a str, &'a ResolvedValueType>,
    platforms: HashMap<&'a str, &'a Platform>,
}

impl<'a> SystemIndex<'a> {
    pub fn new(system: &'a TokenSystem) -> Self {
        let tokens = system.tokens.iter().map(|t| (t.id.as_str(), t)).collect();

        let mut mode_dimension = HashMap::new();
        for (pos, dimension) in system.dimensions.iter().enumerate() {
            for mode in &dimension.modes {
                mode_dimension.entry(mode.id.as_str()).or_insert(pos);
            }
        }

        Self {
            system,
            tokens,
            mode_dimension,
            value_types: system
                .resolved_value_types
                .iter()
                .map(|v| (v.id.as_str(), v))
                .collect(),
            platforms: system.platforms.iter().map(|p| (p.id.as_str(), p)).collect(),
        }
    }

    pub fn system(&self) -> &'a TokenSystem {
        self.system
    }

    pub fn token(&self, id: &str) -> Option<&'a Token> {
        self.tokens.get(id).copied()
    }

    pub fn value_type(&self, id: &str) -> Option<&'a ResolvedValueType> {
        self.value_types.get(id).copied()
    }

    pub fn platform(&self, id: &str) -> Option<&'a Platform> {
        self.platforms.get(id).copied()
    }

    /// First dimension (in system order) owning any mode the token's values reference.
    pub fn owning_dimension(&self, token: &Token) -> Option<&'a Dimension> {
        token
            .referenced_mode_ids()
            .filter_map(|mode_id| self.mode_dimension.get(mode_id).copied())
            .min()
            .map(|pos| &self.system.dimensions[pos])
    }

    /// Default mode of every dimension.
    pub fn default_modes(&self) -> Vec<&'a str> {
        self.system
            .dimensions
            .iter()
            .map(|d| d.default_mode.as_str())
            .collect()
    }

    /// Default mode of every dimension except `skip`, used to pin the other axes while
    /// walking one dimension's modes.
    pub fn default_modes_except(&self, skip: &str) -> Vec<&'a str> {
        self.system
            .dimensions
            .iter()
            .filter(|d| d.id != skip)
            .map(|d| d.default_mode.as_str())
            .collect()
    }
}
