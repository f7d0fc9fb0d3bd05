use crate::alias::{AliasResolver, ResolvedValue};
use crate::codec::ValueCodec;
use crate::config::TransformConfig;
use crate::error::{Result, TransformError};
use crate::reconcile::{EntityKind, IdReconciler};
use crate::types::{code_syntax_for, scopes_for, token_target_type, variable_name};
use crate::validator::Validator;
use std::collections::{BTreeMap, HashMap};
use token_model::{
    Action, Dimension, ErrorEnvelope, ReconciliationMap, RemoteState, ResolvedType, SystemIndex,
    Token, TokenSystem, TransformResult, TransformStats, VariableChange, VariableCollectionChange,
    VariableModeChange, VariableModeValue, VariableValue,
};

/// Result of one transform plus the mapping to persist for the next run.
#[derive(Debug, Clone)]
pub struct TransformOutput {
    pub result: TransformResult,

    /// Local ID -> remote ID for every entity in `result` (unchanged input on failure)
    pub mapping: ReconciliationMap,
}

/// Turns a token system into target collections, modes, variables and mode values.
///
/// ```text
/// Dimension ───────> collection (+ one mode per dimension mode)
///     └─ hidden variable per mode-specific token (one value per mode)
///                 ▲
///                 │ alias
/// TokenCollection ─> collection (+ synthetic "Value" mode)
///     └─ public variable per addressable token
/// ```
pub struct VariableTransformer {
    config: TransformConfig,
    codec: ValueCodec,
}

impl VariableTransformer {
    pub fn new(config: TransformConfig) -> Self {
        let codec = ValueCodec::from_config(&config);
        Self { config, codec }
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    /// Transform `system` against a remote snapshot and the caller's persisted mapping.
    ///
    /// Always returns a well-formed result; failures come back as `success == false`.
    pub fn transform(
        &self,
        system: &TokenSystem,
        remote: &RemoteState,
        previous: ReconciliationMap,
    ) -> TransformOutput {
        if let Err(msg) = self.config.validate() {
            return failed(TransformError::invalid_config(msg).to_envelope(), previous);
        }

        let index = SystemIndex::new(system);
        let fallback_mapping = previous.clone();
        let run = Run {
            config: &self.config,
            codec: self.codec,
            index: &index,
            resolver: AliasResolver::new(&index, self.config.max_alias_depth),
            reconciler: IdReconciler::initialize(remote, previous),
            out: Emitted::default(),
            dimensions: HashMap::new(),
            collections: HashMap::new(),
            public_ids: HashMap::new(),
        };

        match run.execute() {
            Ok(output) => output,
            Err(err) => {
                log::warn!("Variables transform aborted: {err}");
                failed(err.to_envelope(), fallback_mapping)
            }
        }
    }

    /// Run `validator` first; an invalid system yields a `VALIDATION_FAILED` result.
    ///
    /// Warnings are logged and do not block the transform.
    pub fn transform_validated(
        &self,
        system: &TokenSystem,
        validator: &impl Validator,
        remote: &RemoteState,
        previous: ReconciliationMap,
    ) -> TransformOutput {
        let report = validator.validate(system);
        for warning in &report.warnings {
            log::warn!("Validation warning [{}]: {}", warning.code, warning.message);
        }

        if !report.is_valid {
            log::warn!(
                "Token system failed validation with {} error(s)",
                report.errors.len()
            );
            let envelope = ErrorEnvelope {
                code: "VALIDATION_FAILED".to_string(),
                message: format!(
                    "Token system failed validation with {} error(s)",
                    report.errors.len()
                ),
                details: Some(serde_json::json!({
                    "validationErrors": report.errors,
                    "validationWarnings": report.warnings,
                })),
            };
            return failed(envelope, previous);
        }

        self.transform(system, remote, previous)
    }
}

impl Default for VariableTransformer {
    fn default() -> Self {
        Self::new(TransformConfig::default())
    }
}

fn failed(envelope: ErrorEnvelope, mapping: ReconciliationMap) -> TransformOutput {
    TransformOutput {
        result: TransformResult::failed(envelope),
        mapping,
    }
}

/// Target-side identity of a dimension collection
struct DimensionTarget {
    collection_id: String,
    /// (dimension mode ID, resolved target mode ID), in dimension order
    modes: Vec<(String, String)>,
}

/// Target-side identity of a token collection
struct CollectionTarget {
    collection_id: String,
    value_mode_id: String,
}

struct PlannedVariable {
    id: String,
    name: String,
    action: Action,
}

struct PlannedToken<'a> {
    token: &'a Token,
    resolved_type: ResolvedType,
    public: PlannedVariable,
    /// Hidden variable carrying per-mode values, with its owning dimension
    hidden: Option<(PlannedVariable, &'a Dimension)>,
}

#[derive(Default)]
struct Emitted {
    collections: Vec<VariableCollectionChange>,
    variable_modes: Vec<VariableModeChange>,
    variables: Vec<VariableChange>,
    variable_mode_values: Vec<VariableModeValue>,
    stats: TransformStats,
}

/// State of a single transform run
struct Run<'a> {
    config: &'a TransformConfig,
    codec: ValueCodec,
    index: &'a SystemIndex<'a>,
    resolver: AliasResolver<'a>,
    reconciler: IdReconciler<'a>,
    out: Emitted,

    /// Dimension ID -> target identity
    dimensions: HashMap<&'a str, DimensionTarget>,

    /// Token collection ID -> target identity
    collections: HashMap<&'a str, CollectionTarget>,

    /// Token ID -> resolved ID of its public variable
    public_ids: HashMap<&'a str, String>,
}

impl<'a> Run<'a> {
    fn execute(mut self) -> Result<TransformOutput> {
        let system = self.index.system();

        for dimension in &system.dimensions {
            self.emit_dimension(dimension);
        }
        for collection in &system.token_collections {
            self.emit_token_collection(&collection.id, &collection.name);
        }

        // Identities first, so aliases resolve to final IDs regardless of token order.
        let planned: Vec<PlannedToken<'a>> = system
            .tokens
            .iter()
            .filter_map(|token| self.plan_token(token))
            .collect();

        for plan in &planned {
            self.emit_token(plan)?;
        }

        let Emitted {
            collections,
            variable_modes,
            variables,
            variable_mode_values,
            stats,
        } = self.out;

        log::info!(
            "Variables transform: {} collections ({} new), {} variables ({} new, {} updated), {} tokens skipped",
            collections.len(),
            stats.collections_created,
            variables.len(),
            stats.created,
            stats.updated,
            system.tokens.len() - planned.len()
        );

        Ok(TransformOutput {
            result: TransformResult {
                success: true,
                variables,
                collections,
                variable_modes,
                variable_mode_values,
                stats,
                error: None,
            },
            mapping: self.reconciler.into_mapping(),
        })
    }

    /// Adopt by name, then resolve and record; returns (resolved ID, action).
    fn identify(
        &mut self,
        local_id: &str,
        kind: EntityKind,
        name: &str,
        scope: Option<&str>,
    ) -> (String, Action) {
        self.reconciler.adopt_by_name(local_id, kind, name, scope);
        let action = self.reconciler.determine_action(local_id);
        let resolved = self.reconciler.resolve_id(local_id).to_string();
        self.reconciler.record(local_id, &resolved);
        log::debug!("{kind:?} '{name}': {local_id} -> {resolved} ({action:?})");
        (resolved, action)
    }

    fn emit_dimension(&mut self, dimension: &'a Dimension) {
        let local_id = IdReconciler::generate_deterministic_id(&dimension.id, EntityKind::Collection);
        let (collection_id, action) = self.identify(
            &local_id,
            EntityKind::Collection,
            &dimension.display_name,
            None,
        );

        if !dimension.has_mode(&dimension.default_mode) {
            log::warn!(
                "Dimension '{}' default mode '{}' is not among its modes",
                dimension.id,
                dimension.default_mode
            );
        }

        let mut modes = Vec::with_capacity(dimension.modes.len());
        let mut initial_mode_id = None;
        for mode in &dimension.modes {
            let local_mode = IdReconciler::generate_deterministic_id(&mode.id, EntityKind::Mode);
            let (mode_id, mode_action) =
                self.identify(&local_mode, EntityKind::Mode, &mode.name, Some(collection_id.as_str()));

            // The first mode of a new collection exists implicitly and can only be updated.
            let mode_action = if mode.id == dimension.default_mode {
                initial_mode_id = Some(mode_id.clone());
                Action::Update
            } else {
                mode_action
            };

            self.out.variable_modes.push(VariableModeChange {
                action: mode_action,
                id: mode_id.clone(),
                name: mode.name.clone(),
                variable_collection_id: collection_id.clone(),
            });
            modes.push((mode.id.clone(), mode_id));
        }

        let initial_mode_id = initial_mode_id.unwrap_or_else(|| {
            let local = IdReconciler::generate_deterministic_id(&dimension.default_mode, EntityKind::Mode);
            self.reconciler.resolve_id(&local).to_string()
        });

        self.out.stats.record_collection(action);
        self.out.collections.push(VariableCollectionChange {
            action,
            id: collection_id.clone(),
            name: dimension.display_name.clone(),
            initial_mode_id,
        });
        self.dimensions.insert(
            &dimension.id,
            DimensionTarget {
                collection_id,
                modes,
            },
        );
    }

    fn emit_token_collection(&mut self, id: &'a str, name: &str) {
        let local_id = IdReconciler::generate_deterministic_id(id, EntityKind::Collection);
        let (collection_id, action) = self.identify(&local_id, EntityKind::Collection, name, None);

        let local_mode =
            IdReconciler::generate_deterministic_id(&format!("{id}:value"), EntityKind::Mode);
        let mode_name = self.config.value_mode_name.clone();
        let (value_mode_id, _) =
            self.identify(&local_mode, EntityKind::Mode, &mode_name, Some(collection_id.as_str()));

        self.out.stats.record_collection(action);
        self.out.collections.push(VariableCollectionChange {
            action,
            id: collection_id.clone(),
            name: name.to_string(),
            initial_mode_id: value_mode_id.clone(),
        });
        // Every collection has at least one mode, so this one is never created.
        self.out.variable_modes.push(VariableModeChange {
            action: Action::Update,
            id: value_mode_id.clone(),
            name: mode_name,
            variable_collection_id: collection_id.clone(),
        });
        self.collections.insert(
            id,
            CollectionTarget {
                collection_id,
                value_mode_id,
            },
        );
    }

    fn plan_token(&mut self, token: &'a Token) -> Option<PlannedToken<'a>> {
        let index = self.index;
        let Some(name) = variable_name(index, token, &self.config.name_platform) else {
            log::debug!(
                "Skipping token '{}': no code-syntax name for platform '{}'",
                token.id,
                self.config.name_platform
            );
            return None;
        };

        let Some(collection_id) = self
            .collections
            .get(token.token_collection_id.as_str())
            .map(|c| c.collection_id.clone())
        else {
            log::warn!(
                "Skipping token '{}': unknown token collection '{}'",
                token.id,
                token.token_collection_id
            );
            return None;
        };

        let hidden_dimension = if token.is_mode_specific() {
            match index.owning_dimension(token) {
                Some(dimension) => Some(dimension),
                None => {
                    log::warn!(
                        "Skipping token '{}': its modes belong to no known dimension",
                        token.id
                    );
                    return None;
                }
            }
        } else {
            None
        };

        let hidden = match hidden_dimension {
            Some(dimension) => {
                let scope = self.dimensions.get(dimension.id.as_str())?.collection_id.clone();
                let local_id = IdReconciler::generate_deterministic_id(
                    &format!("{}:dimension:{}", token.id, dimension.id),
                    EntityKind::Variable,
                );
                let hidden_name = format!("{}{}", self.config.hidden_name_prefix, name);
                let (id, action) =
                    self.identify(&local_id, EntityKind::Variable, &hidden_name, Some(scope.as_str()));
                Some((
                    PlannedVariable {
                        id,
                        name: hidden_name,
                        action,
                    },
                    dimension,
                ))
            }
            None => None,
        };

        let local_id = IdReconciler::generate_deterministic_id(&token.id, EntityKind::Variable);
        let (id, action) = self.identify(&local_id, EntityKind::Variable, name, Some(collection_id.as_str()));
        self.public_ids.insert(&token.id, id.clone());

        Some(PlannedToken {
            token,
            resolved_type: token_target_type(index, token),
            public: PlannedVariable {
                id,
                name: name.to_string(),
                action,
            },
            hidden,
        })
    }

    fn emit_token(&mut self, plan: &PlannedToken<'a>) -> Result<()> {
        let token = plan.token;
        let scopes = scopes_for(&token.property_types);

        let public_value = match &plan.hidden {
            Some((hidden, dimension)) => {
                self.emit_hidden(plan, hidden, dimension, &scopes)?;
                // daisy chain: public -> hidden -> literal / other token
                VariableValue::alias(hidden.id.clone())
            }
            None => {
                let active = self.index.default_modes();
                let resolved = self.resolver.resolve_value_for_modes(token, &active)?;
                self.encode(token, resolved, plan.resolved_type, &active)?
            }
        };

        let collection = &self.collections[token.token_collection_id.as_str()];
        let (collection_id, value_mode_id) =
            (collection.collection_id.clone(), collection.value_mode_id.clone());

        self.out.stats.record_variable(plan.public.action);
        self.out.variables.push(VariableChange {
            action: plan.public.action,
            id: plan.public.id.clone(),
            name: plan.public.name.clone(),
            variable_collection_id: collection_id,
            resolved_type: plan.resolved_type,
            scopes,
            hidden_from_publishing: token.private,
            code_syntax: code_syntax_for(self.index, token),
        });
        self.out.variable_mode_values.push(VariableModeValue {
            variable_id: plan.public.id.clone(),
            mode_id: value_mode_id,
            value: public_value,
        });
        Ok(())
    }

    fn emit_hidden(
        &mut self,
        plan: &PlannedToken<'a>,
        hidden: &PlannedVariable,
        dimension: &Dimension,
        scopes: &[String],
    ) -> Result<()> {
        let token = plan.token;
        let target = &self.dimensions[dimension.id.as_str()];
        let collection_id = target.collection_id.clone();
        let modes = target.modes.clone();

        self.out.stats.record_variable(hidden.action);
        self.out.variables.push(VariableChange {
            action: hidden.action,
            id: hidden.id.clone(),
            name: hidden.name.clone(),
            variable_collection_id: collection_id,
            resolved_type: plan.resolved_type,
            scopes: scopes.to_vec(),
            hidden_from_publishing: true,
            code_syntax: BTreeMap::new(),
        });

        let pinned = self.index.default_modes_except(&dimension.id);
        for (mode_id, target_mode_id) in modes {
            let mut active: Vec<&str> = Vec::with_capacity(pinned.len() + 1);
            active.push(&mode_id);
            active.extend(pinned.iter().copied());

            let resolved = self.resolver.resolve_value_for_mode(token, &mode_id, &active)?;
            let value = self.encode(token, resolved, plan.resolved_type, &active)?;
            self.out.variable_mode_values.push(VariableModeValue {
                variable_id: hidden.id.clone(),
                mode_id: target_mode_id,
                value,
            });
        }
        Ok(())
    }

    /// Encode one resolved value; aliases point at the reconciled public variable of the
    /// first emitted token along the chain.
    fn encode(
        &self,
        token: &Token,
        resolved: ResolvedValue<'a>,
        resolved_type: ResolvedType,
        active: &[&str],
    ) -> Result<VariableValue> {
        let value = match resolved {
            ResolvedValue::Literal(_) => resolved,
            ResolvedValue::Alias(target) => {
                let chain = self.resolver.follow_chain(target, active)?;
                if chain.iter().any(|id| id == &token.id) {
                    let mut cycle = vec![token.id.clone()];
                    cycle.extend(chain.iter().take_while(|id| *id != &token.id).cloned());
                    cycle.push(token.id.clone());
                    return Err(TransformError::CyclicAlias { chain: cycle });
                }

                match chain.iter().find_map(|id| self.public_ids.get(id.as_str())) {
                    Some(variable_id) => {
                        return self
                            .codec
                            .encode(ResolvedValue::Alias(variable_id.as_str()), resolved_type)
                            .map_err(|e| TransformError::invalid_value(&token.id, e.to_string()));
                    }
                    None => {
                        // No target along the chain is addressable; inline the literal.
                        let holder = chain.last().and_then(|id| self.index.token(id));
                        let holder =
                            holder.ok_or_else(|| TransformError::UnknownToken(target.to_string()))?;
                        log::debug!(
                            "Token '{}' aliases unaddressable '{}'; inlining its value",
                            token.id,
                            holder.id
                        );
                        self.resolver.resolve_value_for_modes(holder, active)?
                    }
                }
            }
        };

        self.codec
            .encode(value, resolved_type)
            .map_err(|e| TransformError::invalid_value(&token.id, e.to_string()))
    }
}
