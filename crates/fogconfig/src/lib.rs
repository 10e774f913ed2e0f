//! Fog palette configuration.
//!
//! A [`RenderConfig`] is the immutable set of tuning parameters a fog surface
//! is mounted with. It is assembled from a named [`Preset`], optionally
//! overridden by a TOML file and then by command-line flags, and validated
//! once before anything touches the GPU.

mod color;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use color::Rgb;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid {field} color '{value}'; expected #RRGGBB or #RGB")]
    InvalidColor { field: &'static str, value: String },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

pub const CONFIG_VERSION: u32 = 1;

/// Tuning parameters for one mounted fog surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenderConfig {
    /// Exponent of the opacity curve (`pow(fog, 1 / density)`).
    pub density: f32,
    /// Time-scale multiplier for every animated term.
    pub speed: f32,
    /// Domain-warp displacement strength.
    pub warp: f32,
    /// Highlight glow color.
    pub tint: Rgb,
    /// Peak displacement applied around the pointer.
    pub pointer_strength: f32,
    /// Distance (in UV units) over which pointer influence decays by `1/e`.
    pub pointer_radius: f32,
    /// Page background the fog is blended against.
    pub background: Rgb,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Preset::Default.config()
    }
}

/// Built-in palettes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    #[default]
    Default,
    /// The palette the marketing hero section mounts with.
    Hero,
}

impl Preset {
    pub fn config(self) -> RenderConfig {
        match self {
            Preset::Default => RenderConfig {
                density: 1.35,
                speed: 1.15,
                warp: 1.60,
                tint: Rgb::from_u8(0x9B, 0xE9, 0xFF),
                pointer_strength: 0.55,
                pointer_radius: 0.42,
                background: Rgb::from_u8(0x0A, 0x0B, 0x14),
            },
            Preset::Hero => RenderConfig {
                density: 0.9,
                speed: 1.0,
                warp: 1.2,
                tint: Rgb::from_u8(0x9A, 0xE7, 0xFF),
                pointer_strength: 0.4,
                ..Preset::Default.config()
            },
        }
    }
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(Preset::Default),
            "hero" => Ok(Preset::Hero),
            other => Err(ConfigError::Invalid(format!(
                "unknown preset '{other}'; expected default or hero"
            ))),
        }
    }
}

/// Partial set of parameters layered on top of a preset.
///
/// Colors stay as raw strings until [`ConfigOverrides::apply`] so malformed
/// values surface as [`ConfigError::InvalidColor`] naming the offending key.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ConfigOverrides {
    #[serde(default)]
    pub density: Option<f32>,
    #[serde(default)]
    pub speed: Option<f32>,
    #[serde(default)]
    pub warp: Option<f32>,
    #[serde(default)]
    pub tint: Option<String>,
    #[serde(default)]
    pub pointer_strength: Option<f32>,
    #[serde(default)]
    pub pointer_radius: Option<f32>,
    #[serde(default)]
    pub background: Option<String>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut RenderConfig) -> Result<(), ConfigError> {
        if let Some(value) = self.density {
            config.density = value;
        }
        if let Some(value) = self.speed {
            config.speed = value;
        }
        if let Some(value) = self.warp {
            config.warp = value;
        }
        if let Some(raw) = &self.tint {
            config.tint = Rgb::parse("tint", raw)?;
        }
        if let Some(value) = self.pointer_strength {
            config.pointer_strength = value;
        }
        if let Some(value) = self.pointer_radius {
            config.pointer_radius = value;
        }
        if let Some(raw) = &self.background {
            config.background = Rgb::parse("background", raw)?;
        }
        Ok(())
    }
}

/// On-disk layout of `fog.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub version: Option<u32>,
    #[serde(default)]
    pub preset: Option<Preset>,
    #[serde(flatten)]
    pub overrides: ConfigOverrides,
}

impl ConfigFile {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(input)?;
        if let Some(version) = file.version {
            if version != CONFIG_VERSION {
                return Err(ConfigError::Invalid(format!(
                    "unsupported config version {version}; expected {CONFIG_VERSION}"
                )));
            }
        }
        Ok(file)
    }

    /// Preset base with the file's overrides applied, validated.
    pub fn resolve(&self) -> Result<RenderConfig, ConfigError> {
        self.resolve_with(None, &ConfigOverrides::default())
    }

    /// Layers preset, file values and `overrides` in that order, then validates once.
    ///
    /// `preset` replaces the file's own `preset` key when given. Intermediate
    /// values are not checked, so a later layer may repair an earlier one.
    pub fn resolve_with(
        &self,
        preset: Option<Preset>,
        overrides: &ConfigOverrides,
    ) -> Result<RenderConfig, ConfigError> {
        let mut config = preset.or(self.preset).unwrap_or_default().config();
        self.overrides.apply(&mut config)?;
        overrides.apply(&mut config)?;
        config.validate()?;
        Ok(config)
    }
}

impl RenderConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        ConfigFile::from_toml_str(input)?.resolve()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let scalars = [
            ("density", self.density),
            ("speed", self.speed),
            ("warp", self.warp),
            ("pointer_strength", self.pointer_strength),
            ("pointer_radius", self.pointer_radius),
        ];
        for (name, value) in scalars {
            if !value.is_finite() {
                return Err(ConfigError::Invalid(format!("{name} must be finite")));
            }
        }

        if self.density <= 0.0 {
            return Err(ConfigError::Invalid("density must be > 0".into()));
        }
        if self.pointer_radius <= 0.0 {
            return Err(ConfigError::Invalid("pointer_radius must be > 0".into()));
        }
        for (name, value) in [
            ("speed", self.speed),
            ("warp", self.warp),
            ("pointer_strength", self.pointer_strength),
        ] {
            if value < 0.0 {
                return Err(ConfigError::Invalid(format!("{name} must be >= 0")));
            }
        }

        for (name, color) in [("tint", self.tint), ("background", self.background)] {
            let channels = color.to_array();
            if channels
                .iter()
                .any(|channel| !channel.is_finite() || !(0.0..=1.0).contains(channel))
            {
                return Err(ConfigError::Invalid(format!(
                    "{name} channels must lie in 0..=1"
                )));
            }
        }

        Ok(())
    }
}
