use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for a variables transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransformConfig {
    /// Platform whose code-syntax name becomes the variable name (ID or display name)
    pub name_platform: String,

    /// Color profile of the target document
    pub color_profile: ColorProfile,

    /// Channel range the target expects for colors
    pub channel_scale: ChannelScale,

    /// What to do with values that cannot be encoded
    pub strictness: Strictness,

    /// Upper bound on alias hops followed while checking chains
    pub max_alias_depth: usize,

    /// Prefix that keeps hidden dimension variables apart from public names
    pub hidden_name_prefix: String,

    /// Name of the single mode synthesized for every token collection
    pub value_mode_name: String,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            name_platform: "figma".to_string(),
            color_profile: ColorProfile::Srgb,
            channel_scale: ChannelScale::Unit,
            strictness: Strictness::Lenient,
            max_alias_depth: 64,
            hidden_name_prefix: "_".to_string(),
            value_mode_name: "Value".to_string(),
        }
    }
}

impl TransformConfig {
    /// Fail the transform on unparseable values instead of degrading to zero
    pub fn strict() -> Self {
        Self {
            strictness: Strictness::Strict,
            ..Default::default()
        }
    }

    /// Target documents working in Display P3
    pub fn display_p3() -> Self {
        Self {
            color_profile: ColorProfile::DisplayP3,
            ..Default::default()
        }
    }

    pub fn is_strict(&self) -> bool {
        self.strictness == Strictness::Strict
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.name_platform.trim().is_empty() {
            return Err("name_platform must not be empty".to_string());
        }

        if self.max_alias_depth == 0 {
            return Err("max_alias_depth must be > 0".to_string());
        }

        if self.hidden_name_prefix.is_empty() {
            return Err("hidden_name_prefix must not be empty".to_string());
        }

        if self.value_mode_name.trim().is_empty() {
            return Err("value_mode_name must not be empty".to_string());
        }

        Ok(())
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw).context("parse transform config")?;
        config
            .validate()
            .map_err(|e| anyhow!("invalid transform config: {e}"))?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read transform config {}", path.display()))?;
        Self::from_toml_str(&raw).with_context(|| format!("load {}", path.display()))
    }
}

/// Working color space of the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorProfile {
    #[default]
    Srgb,
    DisplayP3,
}

/// How color channels are expressed in the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelScale {
    /// 0.0 ..= 1.0
    #[default]
    Unit,
    /// 0 ..= 255
    Byte,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Log and fall back to a neutral zero value
    #[default]
    Lenient,
    /// Abort the transform
    Strict,
}
