//! Encoding of resolved token values into the target's typed payloads.

mod color;
mod number;

pub use color::{parse_color, Color, ColorSpace};
pub use number::parse_float;

use crate::alias::ResolvedValue;
use crate::config::{ChannelScale, ColorProfile, Strictness, TransformConfig};
use serde_json::Value;
use thiserror::Error;
use token_model::{ResolvedType, Rgba, VariableValue};

/// A literal the codec could not read, reported only in strict mode.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    #[error("unparseable color literal: {0}")]
    Color(String),

    #[error("unparseable numeric literal: {0}")]
    Number(String),
}

/// Converts one resolved value into the typed representation of a target type.
#[derive(Debug, Clone, Copy)]
pub struct ValueCodec {
    profile: ColorProfile,
    scale: ChannelScale,
    strictness: Strictness,
}

impl ValueCodec {
    pub fn new(profile: ColorProfile, scale: ChannelScale, strictness: Strictness) -> Self {
        Self {
            profile,
            scale,
            strictness,
        }
    }

    pub fn from_config(config: &TransformConfig) -> Self {
        Self::new(config.color_profile, config.channel_scale, config.strictness)
    }

    /// Encode `value` as `target`.
    ///
    /// Alias markers pass through untouched. In lenient mode unreadable colors become
    /// opaque black and unreadable numbers become `0`; strict mode reports them instead.
    pub fn encode(
        &self,
        value: ResolvedValue<'_>,
        target: ResolvedType,
    ) -> Result<VariableValue, ValueError> {
        let literal = match value {
            ResolvedValue::Alias(id) => return Ok(VariableValue::alias(id)),
            ResolvedValue::Literal(literal) => literal,
        };

        match target {
            ResolvedType::Color => self.encode_color(literal).map(VariableValue::Color),
            ResolvedType::Float => self.encode_float(literal).map(VariableValue::Float),
            ResolvedType::String => Ok(VariableValue::String(encode_string(literal))),
            ResolvedType::Boolean => Ok(VariableValue::Boolean(encode_boolean(literal))),
        }
    }

    fn encode_color(&self, literal: &Value) -> Result<Rgba, ValueError> {
        let Some(color) = parse_color(literal) else {
            return self.fallback(ValueError::Color(literal.to_string()), Rgba::BLACK);
        };

        let [r, g, b] = color.to_profile(self.profile).map(|c| self.scale_channel(c));
        if ![r, g, b].iter().all(|c| c.is_finite()) {
            return self.fallback(ValueError::Color(literal.to_string()), Rgba::BLACK);
        }
        let alpha = color.alpha.clamp(0.0, 1.0);
        Ok(Rgba {
            r,
            g,
            b,
            a: (alpha < 1.0).then_some(alpha),
        })
    }

    fn encode_float(&self, literal: &Value) -> Result<f64, ValueError> {
        match parse_float(literal) {
            Some(n) if n.is_finite() => Ok(n),
            _ => self.fallback(ValueError::Number(literal.to_string()), 0.0),
        }
    }

    fn scale_channel(&self, c: f64) -> f64 {
        match self.scale {
            ChannelScale::Unit => c,
            ChannelScale::Byte => (c * 255.0).round(),
        }
    }

    fn fallback<T>(&self, err: ValueError, neutral: T) -> Result<T, ValueError> {
        match self.strictness {
            Strictness::Strict => Err(err),
            Strictness::Lenient => {
                log::warn!("{err}; using neutral fallback");
                Ok(neutral)
            }
        }
    }
}

impl Default for ValueCodec {
    fn default() -> Self {
        Self::from_config(&TransformConfig::default())
    }
}

fn encode_string(literal: &Value) -> String {
    match literal {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Object(map) => match (map.get("value"), map.get("unit").and_then(Value::as_str)) {
            (Some(v), Some(unit)) => format!("{}{unit}", encode_string(v)),
            _ => literal.to_string(),
        },
        other => other.to_string(),
    }
}

fn encode_boolean(literal: &Value) -> bool {
    match literal {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "yes" | "on"
        ),
        Value::Object(map) => map.get("value").is_some_and(encode_boolean),
        Value::Array(_) | Value::Null => false,
    }
}
