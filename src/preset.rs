use crate::error::PresetError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Key the per-editable objects live under, in files and in embedded session state.
pub const DOCUMENT_KEY: &str = "editables";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresetDocument {
    #[serde(default)]
    pub editables: Map<String, Value>,
}

impl PresetDocument {
    pub fn new(editables: Map<String, Value>) -> Self {
        Self { editables }
    }

    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn to_value(&self) -> Value {
        let mut root = Map::new();
        root.insert(DOCUMENT_KEY.to_string(), Value::Object(self.editables.clone()));
        Value::Object(root)
    }

    /// Parses the whole file before returning, so a malformed preset applies nothing.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, PresetError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| PresetError::Read { path: path.to_path_buf(), source })?;
        serde_json::from_slice(&bytes).map_err(|source| PresetError::Parse { path: path.to_path_buf(), source })
    }

    /// Writes to a temporary file next to `path` and renames it into place.
    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<(), PresetError> {
        let path = path.as_ref();
        let bytes = serde_json::to_vec_pretty(self).map_err(PresetError::Encode)?;
        let write_err = |source| PresetError::Write { path: path.to_path_buf(), source };
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(write_err)?;
        let mut staged = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
        staged.write_all(&bytes).map_err(write_err)?;
        staged.as_file().sync_all().map_err(write_err)?;
        staged.persist(path).map_err(|err| write_err(err.error))?;
        Ok(())
    }
}

/// Appends `.{extension}` unless the name already ends with it (any case).
pub fn ensure_extension(path: impl AsRef<Path>, extension: &str) -> PathBuf {
    let path = path.as_ref();
    let has_extension =
        path.extension().and_then(|ext| ext.to_str()).is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
    if has_extension {
        return path.to_path_buf();
    }
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

/// `<unix-seconds>.<extension>`. Clocks before the epoch yield zero.
pub fn suggested_file_name(now: SystemTime, extension: &str) -> String {
    let seconds = now.duration_since(UNIX_EPOCH).map(|elapsed| elapsed.as_secs()).unwrap_or(0);
    format!("{seconds}.{extension}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetDescriptor {
    pub name: String,
    pub path: PathBuf,
}

/// Preset files in one directory.
pub struct PresetLibrary {
    root: PathBuf,
    extension: String,
    entries: Vec<PresetDescriptor>,
}

impl PresetLibrary {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self { root: root.into(), extension: extension.into(), entries: Vec::new() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn entries(&self) -> &[PresetDescriptor] {
        &self.entries
    }

    pub fn ensure_root(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root)
                .with_context(|| format!("Creating preset directory {}", self.root.display()))?;
        }
        Ok(())
    }

    pub fn refresh(&mut self) -> Result<()> {
        self.ensure_root()?;
        let mut entries = Vec::new();
        for entry in
            fs::read_dir(&self.root).with_context(|| format!("Scanning presets under {}", self.root.display()))?
        {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            let matches = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.extension));
            if !matches {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            entries.push(PresetDescriptor { name: name.to_string(), path: path.clone() });
        }
        entries.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()).then_with(|| a.name.cmp(&b.name)));
        self.entries = entries;
        Ok(())
    }

    /// Path for a preset name inside the library. Unsafe characters become `_`.
    pub fn path_for(&self, name: &str) -> PathBuf {
        let mut file_name = name.trim().to_string();
        let suffix = format!(".{}", self.extension);
        let stem_len = file_name.len().saturating_sub(suffix.len());
        if file_name.get(stem_len..).is_some_and(|tail| tail.eq_ignore_ascii_case(&suffix)) {
            file_name.truncate(stem_len);
        }
        if file_name.is_empty() {
            file_name.push_str("preset");
        }
        let sanitized = file_name
            .chars()
            .map(|ch| if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' { ch } else { '_' })
            .collect::<String>();
        self.root.join(format!("{sanitized}.{}", self.extension))
    }
}
