use sha2::{Digest, Sha256};
use std::collections::HashSet;
use token_model::{Action, ReconciliationMap, RemoteState};

/// Kind of target entity an ID belongs to; also the prefix of generated local IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Collection,
    Mode,
    Variable,
}

impl EntityKind {
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Collection => "collection",
            Self::Mode => "mode",
            Self::Variable => "variable",
        }
    }
}

const FINGERPRINT_HEX_LEN: usize = 16;

/// Maps local IDs onto previously published remote IDs and decides CREATE vs UPDATE.
///
/// One reconciler serves exactly one transform: it is built from a remote snapshot and the
/// caller's persisted mapping, accumulates the pairs decided during the run, and hands the
/// resulting mapping back through [`IdReconciler::into_mapping`]. It never fails; missing
/// data degrades to CREATE.
pub struct IdReconciler<'r> {
    remote: &'r RemoteState,
    mapping: ReconciliationMap,

    /// Remote IDs already claimed by some local ID
    claimed: HashSet<String>,
}

impl<'r> IdReconciler<'r> {
    /// Start from `previous`, dropping every pair whose remote side no longer exists.
    ///
    /// Pairs whose local side disappeared from the token system are kept; they are inert.
    pub fn initialize(remote: &'r RemoteState, previous: ReconciliationMap) -> Self {
        let mut mapping = previous;
        let before = mapping.len();
        mapping.retain(|local, remote_id| {
            let keep = remote.contains(remote_id);
            if !keep {
                log::debug!("Pruning mapping {local} -> {remote_id}: remote entity is gone");
            }
            keep
        });

        if mapping.len() != before {
            log::info!(
                "Pruned {} stale reconciliation entries ({} kept)",
                before - mapping.len(),
                mapping.len()
            );
        }

        let claimed = mapping.iter().map(|(_, r)| r.to_string()).collect();

        Self {
            remote,
            mapping,
            claimed,
        }
    }

    /// Mapped remote ID, or `local_id` itself (first publish uses the local ID as-is).
    pub fn resolve_id<'a>(&'a self, local_id: &'a str) -> &'a str {
        self.mapping.get(local_id).unwrap_or(local_id)
    }

    pub fn determine_action(&self, local_id: &str) -> Action {
        if self.mapping.contains(local_id) || self.remote.contains(local_id) {
            Action::Update
        } else {
            Action::Create
        }
    }

    /// Stable local ID for a source entity.
    ///
    /// Identifiers already in the `<kind>-<fingerprint>` shape come back unchanged, so the
    /// function is idempotent.
    pub fn generate_deterministic_id(source: &str, kind: EntityKind) -> String {
        if is_canonical(source, kind) {
            return source.to_string();
        }

        let mut hasher = Sha256::new();
        hasher.update(source.as_bytes());
        let digest = hasher.finalize();
        let fingerprint = u64::from_be_bytes([
            digest[0], digest[1], digest[2], digest[3], digest[4], digest[5], digest[6], digest[7],
        ]);

        format!("{}-{fingerprint:016x}", kind.prefix())
    }

    /// Adopt an unmapped remote entity with the same name.
    ///
    /// `scope` is the resolved collection ID for modes and variables and is ignored for
    /// collections. Returns true when a new pair was recorded.
    pub fn adopt_by_name(
        &mut self,
        local_id: &str,
        kind: EntityKind,
        name: &str,
        scope: Option<&str>,
    ) -> bool {
        if self.mapping.contains(local_id) || self.remote.contains(local_id) {
            return false;
        }

        let remote = self.remote;
        let found = match (kind, scope) {
            (EntityKind::Collection, _) => remote.find_collection_by_name(name),
            (EntityKind::Mode, Some(collection)) => remote.find_mode_by_name(collection, name),
            (EntityKind::Variable, Some(collection)) => {
                remote.find_variable_by_name(collection, name)
            }
            (_, None) => None,
        };

        match found {
            Some(remote_id) if !self.claimed.contains(remote_id) => {
                log::debug!("Matched {local_id} to remote {remote_id} by name '{name}'");
                self.claimed.insert(remote_id.to_string());
                self.mapping.insert(local_id, remote_id);
                true
            }
            _ => false,
        }
    }

    /// Record the ID an entity was emitted under so the next run can find it.
    pub fn record(&mut self, local_id: &str, resolved_id: &str) {
        if self.mapping.get(local_id) != Some(resolved_id) {
            self.claimed.insert(resolved_id.to_string());
            self.mapping.insert(local_id, resolved_id);
        }
    }

    pub fn mapping(&self) -> &ReconciliationMap {
        &self.mapping
    }

    pub fn into_mapping(self) -> ReconciliationMap {
        self.mapping
    }
}

fn is_canonical(source: &str, kind: EntityKind) -> bool {
    source
        .strip_prefix(kind.prefix())
        .and_then(|rest| rest.strip_prefix('-'))
        .is_some_and(|hex| {
            hex.len() == FINGERPRINT_HEX_LEN
                && hex.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        })
}
