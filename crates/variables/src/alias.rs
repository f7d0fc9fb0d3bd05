use crate::error::{Result, TransformError};
use std::collections::HashSet;
use token_model::{SystemIndex, Token, TokenValue};

/// One step of resolution: a literal payload or the ID of the token it aliases.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolvedValue<'a> {
    Literal(&'a serde_json::Value),
    Alias(&'a str),
}

/// Picks the value of a token that applies under a set of active modes.
///
/// Resolution is a single hop; following alias chains is the caller's business, with
/// [`AliasResolver::follow_chain`] available to check that a chain terminates.
pub struct AliasResolver<'a> {
    index: &'a SystemIndex<'a>,
    max_depth: usize,
}

impl<'a> AliasResolver<'a> {
    pub fn new(index: &'a SystemIndex<'a>, max_depth: usize) -> Self {
        Self { index, max_depth }
    }

    /// Value whose `modeIds` is empty or a subset of `active_mode_ids`.
    ///
    /// The most specific applicable entry wins; among equally specific entries the first
    /// declared does.
    pub fn resolve_value_for_modes(
        &self,
        token: &'a Token,
        active_mode_ids: &[&str],
    ) -> Result<ResolvedValue<'a>> {
        self.select(token, active_mode_ids, None)
    }

    /// Like [`AliasResolver::resolve_value_for_modes`], but entries that name
    /// `mode_id` outrank entries that only match through the other active modes.
    ///
    /// Used when walking one dimension's modes while the other dimensions are pinned: an
    /// entry keyed on a pinned default must not shadow the value declared for `mode_id`.
    pub fn resolve_value_for_mode(
        &self,
        token: &'a Token,
        mode_id: &str,
        active_mode_ids: &[&str],
    ) -> Result<ResolvedValue<'a>> {
        self.select(token, active_mode_ids, Some(mode_id))
    }

    fn select(
        &self,
        token: &'a Token,
        active_mode_ids: &[&str],
        preferred: Option<&str>,
    ) -> Result<ResolvedValue<'a>> {
        // (names the preferred mode, specificity)
        let mut best: Option<((bool, usize), &TokenValue)> = None;
        for entry in &token.values_by_mode {
            let applies = entry
                .mode_ids
                .iter()
                .all(|m| active_mode_ids.contains(&m.as_str()));
            if !applies {
                continue;
            }
            let names_preferred =
                preferred.is_some_and(|p| entry.mode_ids.iter().any(|m| m == p));
            let rank = (names_preferred, entry.mode_ids.len());
            match best {
                Some((current, _)) if current >= rank => {}
                _ => best = Some((rank, &entry.value)),
            }
        }

        match best {
            Some((_, TokenValue::Alias(target))) => Ok(ResolvedValue::Alias(&target.token_id)),
            Some((_, TokenValue::Literal(value))) => Ok(ResolvedValue::Literal(value)),
            None => Err(TransformError::NoApplicableValue {
                token_id: token.id.clone(),
                active_modes: active_mode_ids.iter().map(|m| m.to_string()).collect(),
            }),
        }
    }

    /// Walk the alias chain starting at `token_id` until a literal is reached.
    ///
    /// Returns the visited token IDs, ending with the token that holds the literal.
    pub fn follow_chain(&self, token_id: &str, active_mode_ids: &[&str]) -> Result<Vec<String>> {
        let mut chain: Vec<String> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut current = token_id;

        loop {
            let token = self
                .index
                .token(current)
                .ok_or_else(|| TransformError::UnknownToken(current.to_string()))?;

            if !seen.insert(token.id.as_str()) {
                chain.push(token.id.clone());
                return Err(TransformError::CyclicAlias { chain });
            }
            chain.push(token.id.clone());

            match self.resolve_value_for_modes(token, active_mode_ids)? {
                ResolvedValue::Literal(_) => return Ok(chain),
                ResolvedValue::Alias(next) => {
                    if chain.len() > self.max_depth {
                        return Err(TransformError::AliasDepthExceeded {
                            token_id: token_id.to_string(),
                            max_depth: self.max_depth,
                        });
                    }
                    current = next;
                }
            }
        }
    }
}
