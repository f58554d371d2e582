use crate::config::EditorConfigOverrides;
use anyhow::{anyhow, bail, Result};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CliOverrides {
    config_path: Option<PathBuf>,
    preset_dir: Option<PathBuf>,
    xray: Option<bool>,
    show_previews: Option<bool>,
}

impl CliOverrides {
    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut overrides = CliOverrides::default();
        let mut iter = args.into_iter();
        while let Some(raw_flag) = iter.next() {
            let flag = raw_flag.as_ref();
            let Some(key) = flag.strip_prefix("--") else {
                bail!("Unexpected argument '{flag}'. Use --config/--preset-dir/--xray/--show-previews with values.");
            };
            let value =
                iter.next().ok_or_else(|| anyhow!("Expected a value after '{flag}'"))?.as_ref().to_string();
            match key {
                "config" => overrides.config_path = Some(PathBuf::from(value)),
                "preset-dir" => overrides.preset_dir = Some(PathBuf::from(value)),
                "xray" => overrides.xray = Some(parse_bool_flag("xray", &value)?),
                "show-previews" => overrides.show_previews = Some(parse_bool_flag("show-previews", &value)?),
                _ => bail!("Unknown flag '{flag}'. Supported flags: --config, --preset-dir, --xray, --show-previews."),
            }
        }
        Ok(overrides)
    }

    pub fn config_path(&self) -> Option<&PathBuf> {
        self.config_path.as_ref()
    }

    pub fn into_config_overrides(self) -> EditorConfigOverrides {
        EditorConfigOverrides { preset_dir: self.preset_dir, xray: self.xray, show_previews: self.show_previews }
    }
}

pub fn parse_bool_flag(flag: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        other => bail!("Invalid {flag} value '{other}'. Use on/off or true/false."),
    }
}
