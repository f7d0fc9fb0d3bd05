mod support;

use anyhow::{Context, Result};
use pretty_assertions::assert_eq;
use serde_json::json;
use support::{
    color_token, count_actions, fixture_system, fixture_with, simulate_publish, variable,
};
use token_model::{
    Action, ReconciliationMap, RemoteState, Rgba, TokenSystem, ValidationIssue, ValidationReport,
    VariableValue,
};
use token_variables::{
    EntityKind, IdReconciler, Strictness, TransformConfig, TransformOutput, VariableTransformer,
};

fn run(system: &TokenSystem) -> TransformOutput {
    VariableTransformer::default().transform(system, &RemoteState::new(), ReconciliationMap::new())
}

#[test]
fn first_run_creates_collections_modes_and_variables() -> Result<()> {
    let system = fixture_system()?;
    let output = run(&system);
    let result = &output.result;

    assert!(result.success, "unexpected failure: {:?}", result.error);
    assert_eq!(
        result.collections.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
        vec!["Color Scheme", "Density", "Primitives", "Semantic"]
    );
    assert!(result.collections.iter().all(|c| c.action == Action::Create));

    // 2 + 2 dimension modes and one "Value" mode per token collection
    assert_eq!(result.variable_modes.len(), 6);
    let created_modes: Vec<&str> = result
        .variable_modes
        .iter()
        .filter(|m| m.action == Action::Create)
        .map(|m| m.name.as_str())
        .collect();
    assert_eq!(created_modes, vec!["Dark", "Comfortable"]);

    // 6 addressable tokens, 2 of them mode-specific
    assert_eq!(result.variables.len(), 8);
    assert_eq!(result.stats.created, 8);
    assert_eq!(result.stats.updated, 0);
    assert_eq!(result.stats.deleted, 0);
    assert_eq!(result.stats.collections_created, 4);
    assert!(result.variable_named("--internal").is_none());

    // every emitted ID is in the returned mapping
    for variable in &result.variables {
        assert!(
            output.mapping.iter().any(|(_, remote)| remote == variable.id),
            "{} not recorded",
            variable.name
        );
    }
    Ok(())
}

#[test]
fn mode_specific_token_gets_hidden_variable_per_dimension_mode() -> Result<()> {
    let system = fixture_system()?;
    let result = run(&system).result;

    let scheme = &result.collections[0];
    let public = variable(&result, "color/bg")?;
    let hidden = variable(&result, "_color/bg")?;

    assert!(hidden.hidden_from_publishing);
    assert!(!public.hidden_from_publishing);
    assert_eq!(hidden.variable_collection_id, scheme.id);
    assert!(hidden.code_syntax.is_empty());
    assert_eq!(public.variable_collection_id, result.collections[3].id);

    let hidden_values: Vec<_> = result.values_for(&hidden.id).collect();
    assert_eq!(hidden_values.len(), 2);

    let white = variable(&result, "white")?;
    assert_eq!(hidden_values[0].value, VariableValue::alias(white.id.clone()));
    assert!(matches!(hidden_values[1].value, VariableValue::Color(_)));

    let scheme_modes: Vec<&str> = result
        .variable_modes
        .iter()
        .filter(|m| m.variable_collection_id == scheme.id)
        .map(|m| m.id.as_str())
        .collect();
    assert_eq!(
        hidden_values.iter().map(|v| v.mode_id.as_str()).collect::<Vec<_>>(),
        scheme_modes
    );

    let public_values: Vec<_> = result.values_for(&public.id).collect();
    assert_eq!(public_values.len(), 1);
    assert_eq!(public_values[0].value, VariableValue::alias(hidden.id.clone()));
    Ok(())
}

#[test]
fn dimension_values_follow_their_own_collection() -> Result<()> {
    let system = fixture_system()?;
    let result = run(&system).result;

    let density = &result.collections[1];
    let hidden = variable(&result, "_space/sm")?;
    assert_eq!(hidden.variable_collection_id, density.id);

    let values: Vec<_> = result
        .values_for(&hidden.id)
        .map(|v| v.value.clone())
        .collect();
    assert_eq!(values, vec![VariableValue::Float(4.0), VariableValue::Float(8.0)]);
    Ok(())
}

#[test]
fn global_token_gets_single_public_variable() -> Result<()> {
    let system = fixture_system()?;
    let result = run(&system).result;

    let red = variable(&result, "red/500")?;
    assert!(result.variable_named("_red/500").is_none());

    let values: Vec<_> = result.values_for(&red.id).collect();
    assert_eq!(values.len(), 1);
    assert_eq!(values[0].mode_id, result.collections[2].initial_mode_id);
    assert_eq!(
        values[0].value,
        VariableValue::Color(Rgba {
            r: 1.0,
            g: 0.0,
            b: 0.0,
            a: None
        })
    );
    assert_eq!(red.scopes, vec!["ALL_SCOPES"]);
    Ok(())
}

#[test]
fn alias_targets_public_variable_of_referenced_token() -> Result<()> {
    let system = fixture_system()?;
    let result = run(&system).result;

    let red = variable(&result, "red/500")?;
    let accent = variable(&result, "color/accent")?;
    let values: Vec<_> = result.values_for(&accent.id).collect();
    assert_eq!(values[0].value, VariableValue::alias(red.id.clone()));
    assert_eq!(values[0].value.alias_id(), Some(red.id.as_str()));
    Ok(())
}

#[test]
fn alias_to_unaddressable_token_inlines_its_value() -> Result<()> {
    let system = fixture_system()?;
    let result = run(&system).result;

    let shadow = variable(&result, "color/shadow")?;
    let values: Vec<_> = result.values_for(&shadow.id).collect();
    assert_eq!(values[0].value, VariableValue::Color(Rgba::BLACK));
    Ok(())
}

#[test]
fn second_run_after_publish_only_updates() -> Result<()> {
    let system = fixture_system()?;
    let transformer = VariableTransformer::default();
    let empty = RemoteState::new();

    let first = transformer.transform(&system, &empty, ReconciliationMap::new());
    assert!(first.result.success);

    let mut mapping = first.mapping.clone();
    let remote = simulate_publish(&first.result, &empty, &mut mapping);

    let second = transformer.transform(&system, &remote, mapping.clone());
    assert!(second.result.success);
    assert_eq!(count_actions(&second.result, Action::Create), 0);
    assert_eq!(second.result.stats.created, 0);
    assert_eq!(second.result.stats.collections_created, 0);
    assert_eq!(second.result.stats.updated, 8);
    assert_eq!(second.result.stats.collections_updated, 4);

    for variable in &second.result.variables {
        assert!(remote.variables.contains_key(&variable.id), "{} not remote", variable.name);
    }
    assert_eq!(second.mapping, mapping);

    let bg = variable(&second.result, "color/bg")?;
    let hidden = variable(&second.result, "_color/bg")?;
    let values: Vec<_> = second.result.values_for(&bg.id).collect();
    assert_eq!(values[0].value, VariableValue::alias(hidden.id.clone()));

    // aliases point at the IDs the target assigned, not at local IDs
    let red = variable(&second.result, "red/500")?;
    let red_local = IdReconciler::generate_deterministic_id("red", EntityKind::Variable);
    assert_eq!(mapping.get(&red_local), Some(red.id.as_str()));
    assert_ne!(red.id, red_local);
    let accent = variable(&second.result, "color/accent")?;
    let accent_values: Vec<_> = second.result.values_for(&accent.id).collect();
    assert_eq!(accent_values[0].value, VariableValue::alias(red.id.clone()));

    let white = variable(&second.result, "white")?;
    assert!(remote.variables.contains_key(&white.id));
    let hidden_values: Vec<_> = second.result.values_for(&hidden.id).collect();
    assert_eq!(hidden_values[0].value, VariableValue::alias(white.id.clone()));
    assert!(remote.variable_modes.contains_key(&hidden_values[0].mode_id));
    Ok(())
}

#[test]
fn output_is_deterministic() -> Result<()> {
    let system = fixture_system()?;
    let a = run(&system);
    let b = run(&system);
    assert_eq!(a.result, b.result);
    assert_eq!(a.mapping, b.mapping);
    Ok(())
}

#[test]
fn remote_entities_are_adopted_by_name() -> Result<()> {
    let system = fixture_system()?;
    let mut remote = RemoteState::new();
    remote.insert_collection("VariableCollectionId:77", "Semantic");
    remote.insert_variable("VariableID:77:1", "color/accent", "VariableCollectionId:77");

    let output = VariableTransformer::default().transform(&system, &remote, ReconciliationMap::new());
    let result = &output.result;

    let semantic = result
        .collections
        .iter()
        .find(|c| c.name == "Semantic")
        .context("semantic collection")?;
    assert_eq!(semantic.id, "VariableCollectionId:77");
    assert_eq!(semantic.action, Action::Update);

    let accent = variable(result, "color/accent")?;
    assert_eq!(accent.id, "VariableID:77:1");
    assert_eq!(accent.action, Action::Update);
    assert_eq!(accent.variable_collection_id, "VariableCollectionId:77");

    let local = IdReconciler::generate_deterministic_id("accent", EntityKind::Variable);
    assert_eq!(output.mapping.get(&local), Some("VariableID:77:1"));
    assert_eq!(result.stats.updated, 1);
    assert_eq!(result.stats.collections_updated, 1);
    Ok(())
}

#[test]
fn stale_mappings_are_pruned() -> Result<()> {
    let system = fixture_system()?;
    let red_local = IdReconciler::generate_deterministic_id("red", EntityKind::Variable);
    let previous: ReconciliationMap = [
        (red_local.as_str(), "VariableID:gone"),
        ("variable-00000000000000aa", "VariableID:also-gone"),
    ]
    .into_iter()
    .collect();

    let output =
        VariableTransformer::default().transform(&system, &RemoteState::new(), previous);

    assert!(output.mapping.get("variable-00000000000000aa").is_none());
    let red = variable(&output.result, "red/500")?;
    assert_eq!(red.action, Action::Create);
    assert_eq!(red.id, red_local);
    assert_eq!(output.mapping.get(&red_local), Some(red_local.as_str()));
    Ok(())
}

#[test]
fn failed_validation_short_circuits() -> Result<()> {
    let system = fixture_system()?;
    let previous: ReconciliationMap = [("collection-00000000000000ff", "VariableCollectionId:1")]
        .into_iter()
        .collect();
    let validator = |_: &TokenSystem| {
        ValidationReport::valid()
            .with_error(ValidationIssue::new("MISSING_COLLECTION", "token 'x' has no collection").at("tokens[0]"))
            .with_warning(ValidationIssue::new("NO_CREDENTIALS", "publish credentials missing"))
    };

    let output = VariableTransformer::default().transform_validated(
        &system,
        &validator,
        &RemoteState::new(),
        previous.clone(),
    );

    assert!(!output.result.success);
    assert!(output.result.variables.is_empty());
    assert!(output.result.collections.is_empty());
    let error = output.result.error.context("error envelope")?;
    assert_eq!(error.code, "VALIDATION_FAILED");
    let details = error.details.context("details")?;
    assert_eq!(details["validationErrors"][0]["code"], json!("MISSING_COLLECTION"));
    assert_eq!(details["validationErrors"][0]["path"], json!("tokens[0]"));
    assert_eq!(output.mapping, previous);
    Ok(())
}

#[test]
fn validation_warnings_do_not_block() -> Result<()> {
    let system = fixture_system()?;
    let validator = |_: &TokenSystem| {
        ValidationReport::valid().with_warning(ValidationIssue::new("NO_CREDENTIALS", "missing"))
    };

    let output = VariableTransformer::default().transform_validated(
        &system,
        &validator,
        &RemoteState::new(),
        ReconciliationMap::new(),
    );
    assert!(output.result.success);
    assert_eq!(output.result.variables.len(), 8);
    Ok(())
}

#[test]
fn cyclic_alias_fails_the_transform() -> Result<()> {
    let mut raw = support::fixture_json();
    let tokens = raw["tokens"].as_array_mut().context("tokens")?;
    tokens.push(color_token("loop-a", "loop/a", json!([{ "modeIds": [], "value": { "tokenId": "loop-b" } }])));
    tokens.push(color_token("loop-b", "loop/b", json!([{ "modeIds": [], "value": { "tokenId": "loop-a" } }])));
    let system = support::system_from(raw)?;

    let previous: ReconciliationMap = [("variable-0000000000000001", "VariableID:1")]
        .into_iter()
        .collect();
    let output =
        VariableTransformer::default().transform(&system, &RemoteState::new(), previous.clone());

    assert!(!output.result.success);
    assert!(output.result.variables.is_empty());
    assert!(output.result.variable_mode_values.is_empty());
    let error = output.result.error.context("error envelope")?;
    assert_eq!(error.code, "CYCLIC_ALIAS");
    assert_eq!(output.mapping, previous);
    Ok(())
}

#[test]
fn alias_depth_is_bounded() -> Result<()> {
    let mut raw = support::fixture_json();
    let tokens = raw["tokens"].as_array_mut().context("tokens")?;
    tokens.push(color_token("hop-1", "hop/1", json!([{ "modeIds": [], "value": { "tokenId": "hop-2" } }])));
    tokens.push(color_token("hop-2", "hop/2", json!([{ "modeIds": [], "value": { "tokenId": "hop-3" } }])));
    tokens.push(color_token("hop-3", "hop/3", json!([{ "modeIds": [], "value": { "tokenId": "red" } }])));
    let system = support::system_from(raw)?;

    let config = TransformConfig {
        max_alias_depth: 1,
        ..TransformConfig::default()
    };
    let output = VariableTransformer::new(config).transform(
        &system,
        &RemoteState::new(),
        ReconciliationMap::new(),
    );
    let error = output.result.error.context("error envelope")?;
    assert_eq!(error.code, "ALIAS_DEPTH_EXCEEDED");

    // the default bound accepts the same chain
    assert!(run(&system).result.success);
    Ok(())
}

#[test]
fn missing_value_for_active_modes_fails() -> Result<()> {
    let system = fixture_with(color_token(
        "dark-only",
        "color/dark-only",
        json!([{ "modeIds": ["dark"], "value": "#222222" }]),
    ))?;

    let result = run(&system).result;
    assert!(!result.success);
    let error = result.error.context("error envelope")?;
    assert_eq!(error.code, "NO_APPLICABLE_VALUE");
    let details = error.details.context("details")?;
    assert_eq!(details["tokenId"], json!("dark-only"));
    assert_eq!(details["activeModes"], json!(["light", "compact"]));
    Ok(())
}

#[test]
fn most_specific_value_wins_under_pinned_defaults() -> Result<()> {
    let system = fixture_with(color_token(
        "border",
        "color/border",
        json!([
            { "modeIds": [], "value": "#000000" },
            { "modeIds": ["dark"], "value": "#FFFFFF" },
            { "modeIds": ["dark", "comfortable"], "value": "#FF0000" }
        ]),
    ))?;

    let result = run(&system).result;
    let hidden = variable(&result, "_color/border")?;
    let values: Vec<_> = result
        .values_for(&hidden.id)
        .map(|v| v.value.clone())
        .collect();

    // density is pinned to its default (compact), so the dark+comfortable entry never applies
    let white = Rgba {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: None,
    };
    assert_eq!(
        values,
        vec![VariableValue::Color(Rgba::BLACK), VariableValue::Color(white)]
    );
    Ok(())
}

#[test]
fn walked_dimension_value_beats_pinned_default_entry() -> Result<()> {
    let system = fixture_with(color_token(
        "fg",
        "color/fg",
        json!([
            { "modeIds": ["compact"], "value": "#0000FF" },
            { "modeIds": ["light"], "value": "#FFFFFF" },
            { "modeIds": ["dark"], "value": "#000000" }
        ]),
    ))?;

    let result = run(&system).result;
    assert!(result.success, "unexpected failure: {:?}", result.error);

    let hidden = variable(&result, "_color/fg")?;
    assert_eq!(hidden.variable_collection_id, result.collections[0].id);
    let values: Vec<_> = result
        .values_for(&hidden.id)
        .map(|v| v.value.clone())
        .collect();
    let white = Rgba {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: None,
    };
    assert_eq!(
        values,
        vec![VariableValue::Color(white), VariableValue::Color(Rgba::BLACK)]
    );
    Ok(())
}

#[test]
fn non_finite_color_falls_back_to_black() -> Result<()> {
    let system = fixture_with(color_token(
        "nan",
        "color/nan",
        json!([{ "modeIds": [], "value": "rgb(NaN, 0, 0)" }]),
    ))?;

    let result = run(&system).result;
    let nan = variable(&result, "color/nan")?;
    let values: Vec<_> = result.values_for(&nan.id).collect();
    assert_eq!(values[0].value, VariableValue::Color(Rgba::BLACK));

    let raw = serde_json::to_value(&values[0].value)?;
    assert_eq!(raw, json!({ "r": 0.0, "g": 0.0, "b": 0.0 }));
    Ok(())
}

#[test]
fn unreadable_literals_fall_back_unless_strict() -> Result<()> {
    let system = fixture_with(color_token(
        "bogus",
        "color/bogus",
        json!([{ "modeIds": [], "value": "definitely-not-a-color" }]),
    ))?;

    let lenient = run(&system).result;
    let bogus = variable(&lenient, "color/bogus")?;
    let values: Vec<_> = lenient.values_for(&bogus.id).collect();
    assert_eq!(values[0].value, VariableValue::Color(Rgba::BLACK));

    let config = TransformConfig {
        strictness: Strictness::Strict,
        ..TransformConfig::default()
    };
    let strict = VariableTransformer::new(config).transform(
        &system,
        &RemoteState::new(),
        ReconciliationMap::new(),
    );
    let error = strict.result.error.context("error envelope")?;
    assert_eq!(error.code, "INVALID_VALUE");
    assert!(strict.mapping.is_empty());
    Ok(())
}

#[test]
fn invalid_config_is_reported_not_raised() -> Result<()> {
    let system = fixture_system()?;
    let config = TransformConfig {
        hidden_name_prefix: String::new(),
        ..TransformConfig::default()
    };
    let output = VariableTransformer::new(config).transform(
        &system,
        &RemoteState::new(),
        ReconciliationMap::new(),
    );
    assert!(!output.result.success);
    assert_eq!(output.result.error.context("error envelope")?.code, "INVALID_CONFIG");
    Ok(())
}

#[test]
fn payload_serializes_in_target_shape() -> Result<()> {
    let system = fixture_system()?;
    let result = run(&system).result;
    let raw = serde_json::to_value(&result)?;

    assert_eq!(raw["success"], json!(true));
    assert!(raw.get("error").is_none());
    let accent = raw["variables"]
        .as_array()
        .context("variables")?
        .iter()
        .find(|v| v["name"] == json!("color/accent"))
        .context("accent")?;
    assert_eq!(accent["resolvedType"], json!("COLOR"));
    assert_eq!(accent["action"], json!("CREATE"));
    assert_eq!(accent["codeSyntax"]["WEB"], json!("--accent"));
    assert_eq!(raw["stats"]["collectionsCreated"], json!(4));
    Ok(())
}
