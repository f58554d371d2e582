use crate::editable::AutoColliderResetMode;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct PresetConfig {
    #[serde(default = "PresetConfig::default_directory")]
    pub directory: PathBuf,
    #[serde(default = "PresetConfig::default_extension")]
    pub extension: String,
}

/// Raw slider values in `[0, 1]`; opacities go through exponential scaling before use.
#[derive(Debug, Clone, Deserialize)]
pub struct PreviewConfig {
    #[serde(default)]
    pub show: bool,
    #[serde(default = "PreviewConfig::default_xray")]
    pub xray: bool,
    #[serde(default = "PreviewConfig::default_opacity")]
    pub opacity: f32,
    #[serde(default = "PreviewConfig::default_selected_opacity")]
    pub selected_opacity: f32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AutoColliderConfig {
    #[serde(default)]
    pub reset_mode: AutoColliderResetMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GroupConfig {
    pub name: String,
    pub pattern: String,
}

impl GroupConfig {
    pub fn new(name: &str, pattern: &str) -> Self {
        Self { name: name.to_string(), pattern: pattern.to_string() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EditorConfig {
    #[serde(default)]
    pub presets: PresetConfig,
    #[serde(default)]
    pub preview: PreviewConfig,
    #[serde(default)]
    pub auto_collider: AutoColliderConfig,
    #[serde(default = "default_groups")]
    pub groups: Vec<GroupConfig>,
}

#[derive(Debug, Clone, Default)]
pub struct EditorConfigOverrides {
    pub preset_dir: Option<PathBuf>,
    pub xray: Option<bool>,
    pub show_previews: Option<bool>,
}

/// Body-part table applied top to bottom against structural names.
pub fn default_groups() -> Vec<GroupConfig> {
    vec![
        GroupConfig::new("Head", r"(?i)(^|/)(head|neck|face|lowerjaw|jaw|tongue|lip|[lr]?ear)"),
        GroupConfig::new(
            "Left arm",
            r"(?i)(^|/)(l|left)[_ ]?(collar|shldr|shoulder|arm|forearm|elbow|hand|carpal|thumb|index|mid|ring|pinky)",
        ),
        GroupConfig::new(
            "Right arm",
            r"(?i)(^|/)(r|right)[_ ]?(collar|shldr|shoulder|arm|forearm|elbow|hand|carpal|thumb|index|mid|ring|pinky)",
        ),
        GroupConfig::new("Left leg", r"(?i)(^|/)(l|left)[_ ]?(thigh|knee|shin|calf|leg|foot|toe)"),
        GroupConfig::new("Right leg", r"(?i)(^|/)(r|right)[_ ]?(thigh|knee|shin|calf|leg|foot|toe)"),
        GroupConfig::new("Chest", r"(?i)(^|/)(chest|[lr]?pectoral|breast|torso)"),
        GroupConfig::new("Abdomen / Hip", r"(?i)(^|/)(abdomen|hip|pelvis|waist)"),
        GroupConfig::new("Glutes", r"(?i)(^|/)[lr]?glute"),
    ]
}

impl PresetConfig {
    fn default_directory() -> PathBuf {
        PathBuf::from("presets")
    }

    fn default_extension() -> String {
        "colliders".to_string()
    }
}

impl Default for PresetConfig {
    fn default() -> Self {
        Self { directory: Self::default_directory(), extension: Self::default_extension() }
    }
}

impl PreviewConfig {
    const fn default_xray() -> bool {
        true
    }

    const fn default_opacity() -> f32 {
        0.001
    }

    const fn default_selected_opacity() -> f32 {
        0.3
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            show: false,
            xray: Self::default_xray(),
            opacity: Self::default_opacity(),
            selected_opacity: Self::default_selected_opacity(),
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            presets: PresetConfig::default(),
            preview: PreviewConfig::default(),
            auto_collider: AutoColliderConfig::default(),
            groups: default_groups(),
        }
    }
}

impl EditorConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                log::warn!("[config] load error: {err:?}. Falling back to defaults.");
                Self::default()
            }
        }
    }

    pub fn apply_overrides(&mut self, overrides: &EditorConfigOverrides) {
        if let Some(dir) = &overrides.preset_dir {
            self.presets.directory = dir.clone();
        }
        if let Some(xray) = overrides.xray {
            self.preview.xray = xray;
        }
        if let Some(show) = overrides.show_previews {
            self.preview.show = show;
        }
    }
}

impl EditorConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self.preset_dir.is_none() && self.xray.is_none() && self.show_previews.is_none()
    }

    pub fn applied_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.preset_dir.is_some() {
            fields.push("preset_dir");
        }
        if self.xray.is_some() {
            fields.push("xray");
        }
        if self.show_previews.is_some() {
            fields.push("show_previews");
        }
        fields
    }
}
