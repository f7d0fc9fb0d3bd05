#![allow(dead_code)]

use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use token_model::{
    Action, ReconciliationMap, RemoteState, TokenSystem, TransformResult, VariableChange,
};

pub fn system_from(value: Value) -> Result<TokenSystem> {
    serde_json::from_value(value).context("deserialize token system fixture")
}

fn token(id: &str, collection: &str, value_type: &str, name: Option<&str>, values: Value) -> Value {
    let mut code_syntax = vec![json!({ "platformId": "p-web", "formattedName": format!("--{id}") })];
    if let Some(name) = name {
        code_syntax.push(json!({ "platformId": "p-figma", "formattedName": name }));
    }
    json!({
        "id": id,
        "tokenCollectionId": collection,
        "resolvedValueTypeId": value_type,
        "codeSyntax": code_syntax,
        "valuesByMode": values
    })
}

/// Two dimensions (scheme, density), two token collections, a mix of global,
/// mode-specific, aliasing and unaddressable tokens.
pub fn fixture_json() -> Value {
    json!({
        "dimensions": [
            {
                "id": "scheme", "displayName": "Color Scheme", "defaultMode": "light",
                "modes": [{ "id": "light", "name": "Light" }, { "id": "dark", "name": "Dark" }]
            },
            {
                "id": "density", "displayName": "Density", "defaultMode": "compact",
                "modes": [{ "id": "compact", "name": "Compact" }, { "id": "comfortable", "name": "Comfortable" }]
            }
        ],
        "tokenCollections": [
            { "id": "tc-primitives", "name": "Primitives" },
            { "id": "tc-semantic", "name": "Semantic" }
        ],
        "platforms": [
            { "id": "p-figma", "displayName": "Figma" },
            { "id": "p-web", "displayName": "Web" }
        ],
        "resolvedValueTypes": [
            { "id": "vt-color", "displayName": "Color", "type": "COLOR" },
            { "id": "vt-dim", "displayName": "Dimension", "type": "DIMENSION" }
        ],
        "tokens": [
            token("red", "tc-primitives", "vt-color", Some("red/500"),
                json!([{ "modeIds": [], "value": "#FF0000" }])),
            token("white", "tc-primitives", "vt-color", Some("white"),
                json!([{ "modeIds": [], "value": "#FFFFFF" }])),
            token("internal", "tc-primitives", "vt-color", None,
                json!([{ "modeIds": [], "value": "#000000" }])),
            token("accent", "tc-semantic", "vt-color", Some("color/accent"),
                json!([{ "modeIds": [], "value": { "tokenId": "red" } }])),
            token("shadow", "tc-semantic", "vt-color", Some("color/shadow"),
                json!([{ "modeIds": [], "value": { "tokenId": "internal" } }])),
            token("bg", "tc-semantic", "vt-color", Some("color/bg"),
                json!([
                    { "modeIds": ["light"], "value": { "tokenId": "white" } },
                    { "modeIds": ["dark"], "value": "#111111" }
                ])),
            token("space", "tc-semantic", "vt-dim", Some("space/sm"),
                json!([
                    { "modeIds": ["compact"], "value": "4px" },
                    { "modeIds": ["comfortable"], "value": "8px" }
                ]))
        ]
    })
}

pub fn fixture_system() -> Result<TokenSystem> {
    system_from(fixture_json())
}

/// Push one extra token into the fixture's token list.
pub fn fixture_with(extra: Value) -> Result<TokenSystem> {
    let mut raw = fixture_json();
    raw["tokens"]
        .as_array_mut()
        .context("fixture tokens array")?
        .push(extra);
    system_from(raw)
}

pub fn color_token(id: &str, name: &str, values: Value) -> Value {
    token(id, "tc-semantic", "vt-color", Some(name), values)
}

pub fn variable<'r>(result: &'r TransformResult, name: &str) -> Result<&'r VariableChange> {
    result
        .variable_named(name)
        .with_context(|| format!("variable '{name}' missing from result"))
}

/// Apply `result` the way the target would: every entity the remote does not know yet is
/// assigned a fresh remote ID, and `mapping` is rewritten to point at the assigned IDs.
pub fn simulate_publish(
    result: &TransformResult,
    remote: &RemoteState,
    mapping: &mut ReconciliationMap,
) -> RemoteState {
    let mut assigned: BTreeMap<String, String> = BTreeMap::new();
    let mut next = 100;
    let mut assign = |id: &str, prefix: &str| -> String {
        if remote.contains(id) {
            return id.to_string();
        }
        assigned
            .entry(id.to_string())
            .or_insert_with(|| {
                next += 1;
                format!("{prefix}:{next}")
            })
            .clone()
    };

    let mut published = remote.clone();
    for collection in &result.collections {
        let id = assign(&collection.id, "VariableCollectionId");
        published.insert_collection(id, collection.name.clone());
    }
    for mode in &result.variable_modes {
        let id = assign(&mode.id, "ModeId");
        let collection = assign(&mode.variable_collection_id, "VariableCollectionId");
        published.insert_mode(id, mode.name.clone(), collection);
    }
    for variable in &result.variables {
        let id = assign(&variable.id, "VariableID");
        let collection = assign(&variable.variable_collection_id, "VariableCollectionId");
        published.insert_variable(id, variable.name.clone(), collection);
    }

    mapping.remap_remote_ids(|sent| assigned.get(sent).map(String::as_str));
    published
}

pub fn count_actions(result: &TransformResult, action: Action) -> usize {
    result.actions().filter(|a| *a == action).count()
}
