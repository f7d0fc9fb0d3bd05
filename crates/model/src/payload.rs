use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What the target should do with an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Create,
    Update,
}

/// Target-side value type of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolvedType {
    Color,
    Float,
    String,
    Boolean,
}

/// Platforms the target accepts code-syntax names for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
pub enum CodeSyntaxPlatform {
    #[serde(rename = "WEB")]
    Web,
    #[serde(rename = "ANDROID")]
    Android,
    #[serde(rename = "iOS")]
    Ios,
}

impl CodeSyntaxPlatform {
    /// Matches a platform ID or display name (`web`, `Android`, `iOS`, ...).
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "web" => Some(Self::Web),
            "android" => Some(Self::Android),
            "ios" => Some(Self::Ios),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VariableCollectionChange {
    pub action: Action,
    pub id: String,
    pub name: String,
    pub initial_mode_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VariableModeChange {
    pub action: Action,
    pub id: String,
    pub name: String,
    pub variable_collection_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VariableChange {
    pub action: Action,
    pub id: String,
    pub name: String,
    pub variable_collection_id: String,
    pub resolved_type: ResolvedType,
    pub scopes: Vec<String>,
    pub hidden_from_publishing: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub code_syntax: BTreeMap<CodeSyntaxPlatform, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VariableModeValue {
    pub variable_id: String,
    pub mode_id: String,
    pub value: VariableValue,
}

/// Typed literal or alias, in the target's JSON shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum VariableValue {
    Alias(VariableAlias),
    Color(Rgba),
    Float(f64),
    Boolean(bool),
    String(String),
}

impl VariableValue {
    pub fn alias(id: impl Into<String>) -> Self {
        Self::Alias(VariableAlias {
            kind: AliasKind::Alias,
            id: id.into(),
        })
    }

    pub fn alias_id(&self) -> Option<&str> {
        match self {
            Self::Alias(a) => Some(&a.id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VariableAlias {
    #[serde(rename = "type")]
    pub kind: AliasKind,
    pub id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum AliasKind {
    #[serde(rename = "ALIAS")]
    Alias,
}

/// Color channels in the target's convention. `a` is omitted when fully opaque.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub a: Option<f64>,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: None,
    };
}

/// Aggregate counts derived from the action tags of a result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransformStats {
    /// Variables created
    pub created: usize,

    /// Variables updated
    pub updated: usize,

    /// Variables deleted (the transform never deletes; kept for payload shape)
    pub deleted: usize,

    pub collections_created: usize,
    pub collections_updated: usize,
}

impl TransformStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_variable(&mut self, action: Action) {
        match action {
            Action::Create => self.created += 1,
            Action::Update => self.updated += 1,
        }
    }

    pub fn record_collection(&mut self, action: Action) {
        match action {
            Action::Create => self.collections_created += 1,
            Action::Update => self.collections_updated += 1,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct ErrorEnvelope {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Complete output of one transform run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransformResult {
    pub success: bool,
    pub variables: Vec<VariableChange>,
    pub collections: Vec<VariableCollectionChange>,
    pub variable_modes: Vec<VariableModeChange>,
    pub variable_mode_values: Vec<VariableModeValue>,
    pub stats: TransformStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorEnvelope>,
}

impl TransformResult {
    /// Well-formed result with no entities, carrying `error`.
    pub fn failed(error: ErrorEnvelope) -> Self {
        Self {
            success: false,
            variables: Vec::new(),
            collections: Vec::new(),
            variable_modes: Vec::new(),
            variable_mode_values: Vec::new(),
            stats: TransformStats::new(),
            error: Some(error),
        }
    }

    pub fn variable(&self, id: &str) -> Option<&VariableChange> {
        self.variables.iter().find(|v| v.id == id)
    }

    pub fn variable_named(&self, name: &str) -> Option<&VariableChange> {
        self.variables.iter().find(|v| v.name == name)
    }

    pub fn values_for<'s>(
        &'s self,
        variable_id: &'s str,
    ) -> impl Iterator<Item = &'s VariableModeValue> + 's {
        self.variable_mode_values
            .iter()
            .filter(move |v| v.variable_id == variable_id)
    }

    /// Iterates the action of every collection, mode and variable in the result.
    pub fn actions(&self) -> impl Iterator<Item = Action> + '_ {
        self.collections
            .iter()
            .map(|c| c.action)
            .chain(self.variable_modes.iter().map(|m| m.action))
            .chain(self.variables.iter().map(|v| v.action))
    }
}
