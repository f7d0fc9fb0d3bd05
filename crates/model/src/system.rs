use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Complete token system handed to a transform.
///
/// Referential integrity (every collection, value type, mode and alias target a token
/// points at exists) is checked by the upstream validator and assumed here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenSystem {
    #[serde(default)]
    pub dimensions: Vec<Dimension>,

    #[serde(default)]
    pub token_collections: Vec<TokenCollection>,

    #[serde(default)]
    pub tokens: Vec<Token>,

    #[serde(default)]
    pub resolved_value_types: Vec<ResolvedValueType>,

    #[serde(default)]
    pub platforms: Vec<Platform>,
}

/// Mutually exclusive axis of variation (e.g. color scheme).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Dimension {
    pub id: String,

    pub display_name: String,

    /// Options on this axis. A mode ID never appears in two dimensions.
    #[serde(default)]
    pub modes: Vec<Mode>,

    /// ID of the mode used when nothing else is selected
    pub default_mode: String,
}

impl Dimension {
    pub fn has_mode(&self, mode_id: &str) -> bool {
        self.modes.iter().any(|m| m.id == mode_id)
    }

    pub fn mode(&self, mode_id: &str) -> Option<&Mode> {
        self.modes.iter().find(|m| m.id == mode_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Mode {
    pub id: String,
    pub name: String,
}

/// Consumer-facing grouping of tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TokenCollection {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedValueType {
    pub id: String,

    pub display_name: String,

    /// Free-form type tag (`COLOR`, `DIMENSION`, `FONT_FAMILY`, ...)
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Platform {
    pub id: String,
    pub display_name: String,
}

impl Platform {
    /// Case-insensitive match against either the platform ID or its display name.
    pub fn matches(&self, key: &str) -> bool {
        self.id.eq_ignore_ascii_case(key) || self.display_name.trim().eq_ignore_ascii_case(key)
    }
}

/// Named, typed design value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub token_collection_id: String,

    pub resolved_value_type_id: String,

    /// Where the value may be applied (fills, radii, ...)
    #[serde(default)]
    pub property_types: Vec<String>,

    /// Per-platform formatted names
    #[serde(default)]
    pub code_syntax: Vec<CodeSyntax>,

    #[serde(default)]
    pub private: bool,

    #[serde(default)]
    pub values_by_mode: Vec<ValueByMode>,
}

impl Token {
    /// True when at least one value is scoped to a mode.
    pub fn is_mode_specific(&self) -> bool {
        self.values_by_mode.iter().any(|v| !v.is_global())
    }

    /// Every mode ID referenced by any of the token's values, in declaration order.
    pub fn referenced_mode_ids(&self) -> impl Iterator<Item = &str> {
        self.values_by_mode
            .iter()
            .flat_map(|v| v.mode_ids.iter().map(String::as_str))
    }

    /// Formatted name for the first platform accepted by `is_target`, ignoring blank names.
    pub fn formatted_name_for<'a>(&'a self, mut is_target: impl FnMut(&str) -> bool) -> Option<&'a str> {
        self.code_syntax
            .iter()
            .filter(|cs| is_target(&cs.platform_id))
            .map(|cs| cs.formatted_name.trim())
            .find(|name| !name.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CodeSyntax {
    pub platform_id: String,
    pub formatted_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValueByMode {
    /// Empty means the value applies regardless of mode
    #[serde(default)]
    pub mode_ids: Vec<String>,

    pub value: TokenValue,
}

impl ValueByMode {
    pub fn is_global(&self) -> bool {
        self.mode_ids.is_empty()
    }
}

/// A token value: either a reference to another token or a literal payload.
///
/// On the wire an object carrying only `tokenId` is an alias; everything else is a literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum TokenValue {
    Alias(TokenRef),
    Literal(serde_json::Value),
}

impl TokenValue {
    pub fn literal(value: impl Into<serde_json::Value>) -> Self {
        Self::Literal(value.into())
    }

    pub fn alias(token_id: impl Into<String>) -> Self {
        Self::Alias(TokenRef {
            token_id: token_id.into(),
        })
    }

    pub fn alias_target(&self) -> Option<&str> {
        match self {
            Self::Alias(r) => Some(&r.token_id),
            Self::Literal(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TokenRef {
    pub token_id: String,
}
