use std::collections::BTreeMap;
use token_model::{CodeSyntaxPlatform, ResolvedType, SystemIndex, Token};

/// Scopes the target understands; anything else in `propertyTypes` is dropped.
const TARGET_SCOPES: &[&str] = &[
    "ALL_SCOPES",
    "TEXT_CONTENT",
    "CORNER_RADIUS",
    "WIDTH_HEIGHT",
    "GAP",
    "ALL_FILLS",
    "FRAME_FILL",
    "SHAPE_FILL",
    "TEXT_FILL",
    "STROKE_COLOR",
    "STROKE_FLOAT",
    "EFFECT_FLOAT",
    "EFFECT_COLOR",
    "OPACITY",
    "FONT_FAMILY",
    "FONT_STYLE",
    "FONT_WEIGHT",
    "FONT_SIZE",
    "LINE_HEIGHT",
    "LETTER_SPACING",
    "PARAGRAPH_SPACING",
    "PARAGRAPH_INDENT",
];

fn normalize_tag(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            '-' | ' ' => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect()
}

/// Target type for a resolved-value-type tag. Unknown tags become `STRING`.
pub fn target_type(kind: &str) -> ResolvedType {
    match normalize_tag(kind).as_str() {
        "COLOR" => ResolvedType::Color,
        "FLOAT" | "NUMBER" | "DIMENSION" | "SPACING" | "SIZE" | "RADIUS" | "OPACITY"
        | "FONT_WEIGHT" | "FONT_SIZE" | "LINE_HEIGHT" | "LETTER_SPACING" | "DURATION" => {
            ResolvedType::Float
        }
        "STRING" | "FONT_FAMILY" | "FONT_STYLE" | "TEXT" => ResolvedType::String,
        "BOOLEAN" => ResolvedType::Boolean,
        other => {
            log::warn!("Unknown resolved value type '{other}', exporting as STRING");
            ResolvedType::String
        }
    }
}

/// Target type of a token, through its declared resolved value type.
pub fn token_target_type(index: &SystemIndex<'_>, token: &Token) -> ResolvedType {
    match index.value_type(&token.resolved_value_type_id) {
        Some(value_type) => target_type(&value_type.kind),
        None => {
            log::warn!(
                "Token '{}' references unknown value type '{}', exporting as STRING",
                token.id,
                token.resolved_value_type_id
            );
            ResolvedType::String
        }
    }
}

/// Target scopes for a token's property types, defaulting to `ALL_SCOPES`.
pub fn scopes_for(property_types: &[String]) -> Vec<String> {
    let mut scopes: Vec<String> = Vec::new();
    for raw in property_types {
        let tag = normalize_tag(raw);
        if !TARGET_SCOPES.contains(&tag.as_str()) {
            log::debug!("Dropping property type '{raw}': no matching target scope");
            continue;
        }
        if !scopes.contains(&tag) {
            scopes.push(tag);
        }
    }

    if scopes.is_empty() {
        scopes.push("ALL_SCOPES".to_string());
    }
    scopes
}

/// Per-platform names the target accepts (`WEB`, `ANDROID`, `iOS`).
pub fn code_syntax_for(index: &SystemIndex<'_>, token: &Token) -> BTreeMap<CodeSyntaxPlatform, String> {
    let mut out = BTreeMap::new();
    for entry in &token.code_syntax {
        let name = entry.formatted_name.trim();
        if name.is_empty() {
            continue;
        }
        let platform = index
            .platform(&entry.platform_id)
            .and_then(|p| CodeSyntaxPlatform::from_label(&p.display_name))
            .or_else(|| CodeSyntaxPlatform::from_label(&entry.platform_id));
        if let Some(platform) = platform {
            out.entry(platform).or_insert_with(|| name.to_string());
        }
    }
    out
}

/// Name of the token in the target: its code-syntax name for the naming platform.
///
/// `None` means the token is unaddressable and must be skipped.
pub fn variable_name<'t>(index: &SystemIndex<'_>, token: &'t Token, name_platform: &str) -> Option<&'t str> {
    token.formatted_name_for(|platform_id| match index.platform(platform_id) {
        Some(platform) => platform.matches(name_platform),
        None => platform_id.eq_ignore_ascii_case(name_platform),
    })
}
