//! # Token Model
//!
//! Normalized design-token data model and the target "variables" payload it is exported to.
//!
//! ## Layout
//!
//! ```text
//! TokenSystem (input, immutable per run)
//!     │
//!     ├──> dimensions[]        axis of variation + its modes
//!     ├──> tokenCollections[]  consumer-facing groupings
//!     ├──> tokens[]            typed values, by mode, literal or alias
//!     ├──> resolvedValueTypes[]
//!     └──> platforms[]         code-syntax naming targets
//!
//! RemoteState (snapshot of what was published before)
//! ReconciliationMap (local ID -> remote ID, persisted by the caller)
//!
//! TransformResult (output payload)
//!     ├──> collections / variableModes / variables / variableModeValues
//!     └──> stats
//! ```
//!
//! This crate holds data only. The transformation engine lives in `token-variables`.

mod index;
mod mapping;
mod payload;
mod remote;
mod system;
mod validation;

pub use index::SystemIndex;
pub use mapping::ReconciliationMap;
pub use payload::{
    Action, AliasKind, CodeSyntaxPlatform, ErrorEnvelope, ResolvedType, Rgba, TransformResult,
    TransformStats, VariableAlias, VariableChange, VariableCollectionChange, VariableModeChange,
    VariableModeValue, VariableValue,
};
pub use remote::{RemoteCollection, RemoteMode, RemoteState, RemoteVariable};
pub use system::{
    CodeSyntax, Dimension, Mode, Platform, ResolvedValueType, Token, TokenCollection, TokenRef,
    TokenSystem, TokenValue, ValueByMode,
};
pub use validation::{ValidationIssue, ValidationReport};
