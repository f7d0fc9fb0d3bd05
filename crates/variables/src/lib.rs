//! # Token Variables
//!
//! Exports a multi-dimensional design-token system as design-tool variables.
//!
//! ## Pipeline
//!
//! ```text
//! TokenSystem + RemoteState + ReconciliationMap
//!     │
//!     ├──> Validator (optional gate, VALIDATION_FAILED on error)
//!     │
//!     ├──> IdReconciler
//!     │    ├─> prune mappings whose remote target is gone
//!     │    ├─> adopt remote entities by name
//!     │    └─> decide CREATE / UPDATE per entity
//!     │
//!     ├──> Collections and modes
//!     │    ├─> one collection per dimension (its modes)
//!     │    └─> one collection per token collection (single "Value" mode)
//!     │
//!     └──> Variables
//!          ├─> hidden variable per mode-specific token, value per dimension mode
//!          ├─> public variable per addressable token, aliasing the hidden one
//!          └─> ValueCodec: colors, floats, strings, booleans, alias markers
//! ```
//!
//! ## Example
//!
//! ```rust
//! use token_model::{ReconciliationMap, RemoteState, TokenSystem};
//! use token_variables::{TransformConfig, VariableTransformer};
//!
//! let system = TokenSystem::default();
//! let transformer = VariableTransformer::new(TransformConfig::default());
//! let output = transformer.transform(&system, &RemoteState::default(), ReconciliationMap::new());
//!
//! assert!(output.result.success);
//! assert!(output.mapping.is_empty());
//! ```

mod alias;
mod codec;
mod config;
mod error;
mod reconcile;
mod transformer;
mod types;
mod validator;

pub use alias::{AliasResolver, ResolvedValue};
pub use codec::{parse_color, parse_float, Color, ColorSpace, ValueCodec, ValueError};
pub use config::{ChannelScale, ColorProfile, Strictness, TransformConfig};
pub use error::{Result, TransformError};
pub use reconcile::{EntityKind, IdReconciler};
pub use transformer::{TransformOutput, VariableTransformer};
pub use types::{code_syntax_for, scopes_for, target_type, token_target_type, variable_name};
pub use validator::Validator;
