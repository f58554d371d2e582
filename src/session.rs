//! Operator-facing facade over the registry, filter and presets.
//!
//! Every entry point here is called from the host's tick or UI callbacks, so
//! none of them return errors. Failures are logged and kept as the latest
//! [`SessionStatus`] for the UI to show.

use crate::config::EditorConfig;
use crate::controls::{ControlAction, ControlSurface};
use crate::editable::preview::{OPACITY_MAX, OPACITY_MIN};
use crate::editable::{exponential_scale, EditableId, FieldValue};
use crate::filter::{Choice, FilterQuery, FilterRow, FilterState};
use crate::group::GroupClassifier;
use crate::host::SceneHost;
use crate::preset::{ensure_extension, suggested_file_name, PresetDocument, PresetLibrary, DOCUMENT_KEY};
use crate::registry::{LoadReport, Registry};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatusKind {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionStatus {
    pub kind: SessionStatusKind,
    pub message: String,
}

/// Raw slider values as the operator last set them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewSettings {
    pub show: bool,
    pub xray: bool,
    pub opacity: f32,
    pub selected_opacity: f32,
}

pub struct EditorSession {
    config: EditorConfig,
    registry: Option<Registry>,
    filter: FilterState,
    presets: PresetLibrary,
    last_directory: PathBuf,
    preview: PreviewSettings,
    status: Option<SessionStatus>,
}

fn scaled_opacity(raw: f32) -> f32 {
    exponential_scale(raw.clamp(0.0, 1.0), OPACITY_MIN, OPACITY_MAX)
}

impl EditorSession {
    /// Builds the registry from the host. A failed build leaves an empty session with an error status.
    pub fn init(config: EditorConfig, host: &mut dyn SceneHost, ui: &mut dyn ControlSurface) -> Self {
        let preview = PreviewSettings {
            show: config.preview.show,
            xray: config.preview.xray,
            opacity: config.preview.opacity,
            selected_opacity: config.preview.selected_opacity,
        };
        let presets = PresetLibrary::new(config.presets.directory.clone(), config.presets.extension.clone());
        let mut session = Self {
            last_directory: config.presets.directory.clone(),
            registry: None,
            filter: FilterState::default(),
            presets,
            preview,
            status: None,
            config,
        };

        let built = GroupClassifier::from_config(&session.config.groups)
            .and_then(|classifier| Registry::build(&*host, classifier, session.config.auto_collider.reset_mode));
        match built {
            Ok(registry) => {
                let message = format!("Loaded {} editables", registry.len());
                session.registry = Some(registry);
                session.apply_preview_settings(host);
                session.set_status(SessionStatusKind::Info, message);
            }
            Err(err) => session.set_status(SessionStatusKind::Error, format!("Failed to build editables: {err}")),
        }
        session.update_filter(host, ui);
        session
    }

    fn set_status(&mut self, kind: SessionStatusKind, message: impl Into<String>) {
        let message = message.into();
        match kind {
            SessionStatusKind::Info | SessionStatusKind::Success => log::info!("[session] {message}"),
            SessionStatusKind::Warning => log::warn!("[session] {message}"),
            SessionStatusKind::Error => log::error!("[session] {message}"),
        }
        self.status = Some(SessionStatus { kind, message });
    }

    pub fn status(&self) -> Option<&SessionStatus> {
        self.status.as_ref()
    }

    pub fn take_status(&mut self) -> Option<SessionStatus> {
        self.status.take()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn registry(&self) -> Option<&Registry> {
        self.registry.as_ref()
    }

    pub fn query(&self) -> &FilterQuery {
        self.filter.query()
    }

    /// Rows the list should show, in registry order.
    pub fn rows(&self) -> &[FilterRow] {
        self.filter.rows()
    }

    pub fn group_choices(&self) -> Vec<&str> {
        self.registry.as_ref().map(Registry::group_names).unwrap_or_default()
    }

    pub fn type_choices(&self) -> Vec<&'static str> {
        self.registry.as_ref().map(Registry::type_names).unwrap_or_default()
    }

    pub fn selected(&self) -> Option<&EditableId> {
        self.registry.as_ref().and_then(Registry::selected)
    }

    pub fn set_group_filter(&mut self, choice: Choice, host: &mut dyn SceneHost, ui: &mut dyn ControlSurface) {
        self.filter.query_mut().group = choice;
        self.update_filter(host, ui);
    }

    pub fn set_type_filter(&mut self, choice: Choice, host: &mut dyn SceneHost, ui: &mut dyn ControlSurface) {
        self.filter.query_mut().type_name = choice;
        self.update_filter(host, ui);
    }

    pub fn set_modified_only(&mut self, modified_only: bool, host: &mut dyn SceneHost, ui: &mut dyn ControlSurface) {
        self.filter.query_mut().modified_only = modified_only;
        self.update_filter(host, ui);
    }

    pub fn set_search(&mut self, search: &str, host: &mut dyn SceneHost, ui: &mut dyn ControlSurface) {
        self.filter.query_mut().search = search.to_string();
        self.update_filter(host, ui);
    }

    pub fn set_query(&mut self, query: FilterQuery, host: &mut dyn SceneHost, ui: &mut dyn ControlSurface) {
        *self.filter.query_mut() = query;
        self.update_filter(host, ui);
    }

    /// Recomputes the visible rows and moves the selection if it fell out of them.
    pub fn update_filter(&mut self, host: &mut dyn SceneHost, ui: &mut dyn ControlSurface) {
        let Some(registry) = self.registry.as_mut() else {
            return;
        };
        let target = self.filter.recompute(registry);
        if target.as_ref() != registry.selected() {
            registry.select(target.as_ref().map(EditableId::as_str), host, ui);
        }
    }

    pub fn select(&mut self, id: Option<&str>, host: &mut dyn SceneHost, ui: &mut dyn ControlSurface) -> bool {
        match self.registry.as_mut() {
            Some(registry) => registry.select(id, host, ui),
            None => false,
        }
    }

    pub fn preview_settings(&self) -> PreviewSettings {
        self.preview
    }

    fn apply_preview_settings(&mut self, host: &mut dyn SceneHost) {
        let preview = self.preview;
        let Some(registry) = self.registry.as_mut() else {
            return;
        };
        registry.set_preview_xray(preview.xray, host);
        registry.set_preview_opacity(scaled_opacity(preview.opacity), host);
        registry.set_selected_preview_opacity(scaled_opacity(preview.selected_opacity), host);
        if preview.show {
            registry.set_preview_enabled(true, host);
        }
    }

    pub fn set_show_previews(&mut self, show: bool, host: &mut dyn SceneHost) {
        self.preview.show = show;
        if let Some(registry) = self.registry.as_mut() {
            registry.set_preview_enabled(show, host);
        }
    }

    pub fn set_xray(&mut self, xray: bool, host: &mut dyn SceneHost) {
        self.preview.xray = xray;
        if let Some(registry) = self.registry.as_mut() {
            registry.set_preview_xray(xray, host);
        }
    }

    /// `raw` is the slider value in `[0, 1]`.
    pub fn set_preview_opacity(&mut self, raw: f32, host: &mut dyn SceneHost) {
        self.preview.opacity = raw;
        if let Some(registry) = self.registry.as_mut() {
            registry.set_preview_opacity(scaled_opacity(raw), host);
        }
    }

    pub fn set_selected_preview_opacity(&mut self, raw: f32, host: &mut dyn SceneHost) {
        self.preview.selected_opacity = raw;
        if let Some(registry) = self.registry.as_mut() {
            registry.set_selected_preview_opacity(scaled_opacity(raw), host);
        }
    }

    pub fn apply_control_change(
        &mut self,
        id: &str,
        key: &str,
        value: FieldValue,
        host: &mut dyn SceneHost,
        ui: &mut dyn ControlSurface,
    ) -> bool {
        let applied = match self.registry.as_mut() {
            Some(registry) => registry.apply_control_change(id, key, value, host),
            None => false,
        };
        if applied && self.filter.query().modified_only {
            self.update_filter(host, ui);
        }
        applied
    }

    pub fn trigger_action(
        &mut self,
        id: &str,
        action: ControlAction,
        host: &mut dyn SceneHost,
        ui: &mut dyn ControlSurface,
    ) -> bool {
        let Some(registry) = self.registry.as_mut() else {
            return false;
        };
        let handled = registry.trigger_action(id, action, host, ui);
        self.update_filter(host, ui);
        handled
    }

    pub fn reset_one(&mut self, id: &str, host: &mut dyn SceneHost, ui: &mut dyn ControlSurface) -> bool {
        self.trigger_action(id, ControlAction::ResetToInitial, host, ui)
    }

    pub fn reset_all(&mut self, host: &mut dyn SceneHost, ui: &mut dyn ControlSurface) {
        let Some(registry) = self.registry.as_mut() else {
            return;
        };
        registry.reset_all(host, ui);
        self.set_status(SessionStatusKind::Info, "Reset all editables");
        self.update_filter(host, ui);
    }

    pub fn presets(&self) -> &PresetLibrary {
        &self.presets
    }

    pub fn refresh_presets(&mut self) {
        if let Err(err) = self.presets.refresh() {
            self.set_status(SessionStatusKind::Error, format!("Failed to list presets: {err:#}"));
        }
    }

    /// Directory the next load or save dialog should open in.
    pub fn last_directory(&self) -> &Path {
        &self.last_directory
    }

    fn remember_directory(&mut self, path: &Path) {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            self.last_directory = parent.to_path_buf();
        }
    }

    /// Default save path: `<last directory>/<epoch seconds>.<extension>`.
    pub fn suggested_preset_path(&self, now: SystemTime) -> PathBuf {
        self.last_directory.join(suggested_file_name(now, &self.config.presets.extension))
    }

    /// Loads a preset file. Nothing is applied when the file cannot be read or parsed.
    pub fn load_preset(
        &mut self,
        path: impl AsRef<Path>,
        host: &mut dyn SceneHost,
        ui: &mut dyn ControlSurface,
    ) -> Option<LoadReport> {
        let path = path.as_ref();
        if self.registry.is_none() {
            self.set_status(SessionStatusKind::Warning, "No editables to load a preset into");
            return None;
        }
        let document = match PresetDocument::load_from_path(path) {
            Ok(document) => document,
            Err(err) => {
                self.set_status(SessionStatusKind::Error, format!("Failed to load preset: {}", error_chain(&err)));
                return None;
            }
        };
        self.remember_directory(path);
        let report = self.apply(&document.editables, host, ui)?;
        self.report_load(&path.display().to_string(), &report);
        Some(report)
    }

    fn apply(
        &mut self,
        editables: &Map<String, Value>,
        host: &mut dyn SceneHost,
        ui: &mut dyn ControlSurface,
    ) -> Option<LoadReport> {
        let report = self.registry.as_mut()?.apply_document(editables, host);
        self.update_filter(host, ui);
        Some(report)
    }

    fn report_load(&mut self, source: &str, report: &LoadReport) {
        if report.is_clean() {
            self.set_status(
                SessionStatusKind::Success,
                format!("Loaded {} editables from {source}", report.applied.len()),
            );
        } else {
            self.set_status(
                SessionStatusKind::Warning,
                format!(
                    "Loaded {} editables from {source}; skipped {} unknown ids, {} bad fields, {} bad entries",
                    report.applied.len(),
                    report.unknown_ids.len(),
                    report.mismatched.len(),
                    report.malformed.len()
                ),
            );
        }
    }

    /// Saves every editable. The preset extension is appended when missing.
    pub fn save_preset(&mut self, path: impl AsRef<Path>) -> Option<PathBuf> {
        let path = ensure_extension(path, &self.config.presets.extension);
        let Some(registry) = self.registry.as_ref() else {
            self.set_status(SessionStatusKind::Warning, "No editables to save");
            return None;
        };
        let document = PresetDocument::new(registry.to_document());
        match document.save_to_path(&path) {
            Ok(()) => {
                self.remember_directory(&path);
                let message = format!("Saved {} editables to {}", document.editables.len(), path.display());
                self.set_status(SessionStatusKind::Success, message);
                Some(path)
            }
            Err(err) => {
                self.set_status(SessionStatusKind::Error, format!("Failed to save preset: {}", error_chain(&err)));
                None
            }
        }
    }

    /// Saves into the preset library under `name`, then relists the library.
    pub fn save_preset_named(&mut self, name: &str) -> Option<PathBuf> {
        let path = self.presets.path_for(name);
        let saved = self.save_preset(&path)?;
        self.refresh_presets();
        Some(saved)
    }

    /// Writes the current document into host-provided session state.
    pub fn append_document(&self, state: &mut Map<String, Value>) {
        if let Some(registry) = self.registry.as_ref() {
            state.insert(DOCUMENT_KEY.to_string(), Value::Object(registry.to_document()));
        }
    }

    /// Restores from host-provided session state. State without a document is ignored.
    pub fn restore_document(
        &mut self,
        state: &Map<String, Value>,
        host: &mut dyn SceneHost,
        ui: &mut dyn ControlSurface,
    ) -> Option<LoadReport> {
        let document = state.get(DOCUMENT_KEY)?;
        let Some(editables) = document.as_object() else {
            self.set_status(SessionStatusKind::Error, "Session state has a malformed editables document");
            return None;
        };
        let report = self.apply(editables, host, ui)?;
        self.report_load("session state", &report);
        Some(report)
    }

    pub fn tick(&mut self, host: &mut dyn SceneHost, ui: &mut dyn ControlSurface) {
        if let Some(registry) = self.registry.as_mut() {
            registry.tick(host, ui);
        }
    }

    /// Releases controls and preview proxies.
    pub fn shutdown(&mut self, host: &mut dyn SceneHost, ui: &mut dyn ControlSurface) {
        if let Some(registry) = self.registry.as_mut() {
            registry.teardown(host, ui);
        }
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
