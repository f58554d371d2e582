//! Editable models of the scene's physical objects.
//!
//! Every variant keeps an immutable snapshot captured at construction and a
//! live copy that edits go through. The [`Editable`] trait supplies the shared
//! behaviour (diffing, reset, JSON, controls, previews) on top of a handful of
//! per-variant accessors.

pub mod auto_collider;
pub mod collider;
pub mod fields;
pub mod label;
pub mod preview;
pub mod rigidbody;

pub use auto_collider::{AutoColliderEditable, AutoColliderResetMode};
pub use collider::ColliderEditable;
pub use fields::{FieldRange, FieldSet, FieldSpec, FieldType, FieldValue};
pub use preview::{exponential_scale, PreviewState, PreviewStyle};
pub use rigidbody::{RigidbodyEditable, RigidbodyState};

use crate::controls::{ControlAction, ControlKind, ControlSet, ControlSpec, ControlSurface};
use crate::group::GroupId;
use crate::host::{ObjectHandle, ProxyShape, ProxyTransform, SceneHost};
use serde_json::{Map, Value};
use std::borrow::Borrow;
use std::fmt;

/// Stable identifier of an editable, used as the preset key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EditableId(String);

impl EditableId {
    pub fn new(kind: EditableKind, path: &str) -> Self {
        Self(format!("{}:{}", kind.tag(), path.trim()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for EditableId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EditableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for EditableId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditableKind {
    Sphere,
    Box,
    Capsule,
    AutoCollider,
    Rigidbody,
}

impl EditableKind {
    /// Value shown in the type filter.
    pub fn type_name(self) -> &'static str {
        match self {
            EditableKind::Sphere => "Sphere",
            EditableKind::Box => "Box",
            EditableKind::Capsule => "Capsule",
            EditableKind::AutoCollider => "AutoCollider",
            EditableKind::Rigidbody => "Rigidbody",
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            EditableKind::Sphere | EditableKind::Box | EditableKind::Capsule => "co",
            EditableKind::AutoCollider => "au",
            EditableKind::Rigidbody => "rb",
        }
    }

    pub fn is_collider(self) -> bool {
        matches!(self, EditableKind::Sphere | EditableKind::Box | EditableKind::Capsule)
    }
}

/// Identity shared by all variants. The group never changes after construction.
#[derive(Debug, Clone)]
pub struct EditableMeta {
    id: EditableId,
    label: String,
    kind: EditableKind,
    group: Option<GroupId>,
    handle: ObjectHandle,
    selected: bool,
}

impl EditableMeta {
    pub fn new(kind: EditableKind, path: &str, handle: ObjectHandle, group: Option<GroupId>) -> Self {
        Self {
            id: EditableId::new(kind, path),
            label: label::prefixed(kind.tag(), path),
            kind,
            group,
            handle,
            selected: false,
        }
    }

    pub fn id(&self) -> &EditableId {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> EditableKind {
        self.kind
    }

    pub fn group(&self) -> Option<GroupId> {
        self.group
    }

    pub fn handle(&self) -> ObjectHandle {
        self.handle
    }

    pub(crate) fn set_label(&mut self, label: String) {
        self.label = label;
    }
}

/// Children of a container: owned nested colliders or ids of colliders owned elsewhere.
#[derive(Debug, Clone, Copy)]
pub enum ColliderRefs<'a> {
    None,
    Owned(&'a [ColliderEditable]),
    Referenced(&'a [EditableId]),
}

impl<'a> ColliderRefs<'a> {
    pub fn ids(&self) -> Vec<&'a EditableId> {
        match *self {
            ColliderRefs::None => Vec::new(),
            ColliderRefs::Owned(colliders) => colliders.iter().map(|collider| collider.meta().id()).collect(),
            ColliderRefs::Referenced(ids) => ids.iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        match *self {
            ColliderRefs::None => 0,
            ColliderRefs::Owned(colliders) => colliders.len(),
            ColliderRefs::Referenced(ids) => ids.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_owned(&self) -> bool {
        matches!(self, ColliderRefs::Owned(_))
    }
}

pub trait Editable {
    fn meta(&self) -> &EditableMeta;

    fn meta_mut(&mut self) -> &mut EditableMeta;

    fn live_fields(&self) -> &dyn FieldSet;

    fn live_fields_mut(&mut self) -> &mut dyn FieldSet;

    fn initial_fields(&self) -> &dyn FieldSet;

    /// Control descriptions. Ranges may depend on the initial snapshot.
    fn field_specs(&self) -> Vec<FieldSpec>;

    /// Writes the live state to the host object.
    fn push_to_host(&self, host: &mut dyn SceneHost);

    /// Copies the snapshot back into the live state.
    fn restore_initial(&mut self);

    fn controls(&self) -> &ControlSet;

    fn controls_mut(&mut self) -> &mut ControlSet;

    fn preview(&self) -> Option<&PreviewState> {
        None
    }

    fn preview_mut(&mut self) -> Option<&mut PreviewState> {
        None
    }

    /// Proxy primitive and local transform matching the live state.
    fn preview_geometry(&self) -> Option<(ProxyShape, ProxyTransform)> {
        None
    }

    fn colliders(&self) -> ColliderRefs<'_> {
        ColliderRefs::None
    }

    fn owned_colliders(&self) -> &[ColliderEditable] {
        &[]
    }

    fn owned_colliders_mut(&mut self) -> &mut [ColliderEditable] {
        &mut []
    }

    fn as_rigidbody_mut(&mut self) -> Option<&mut RigidbodyEditable> {
        None
    }

    /// Picks up values the host re-derived on its own.
    fn pull_from_host(&mut self, _host: &dyn SceneHost) {}

    fn id(&self) -> &EditableId {
        self.meta().id()
    }

    fn label(&self) -> &str {
        self.meta().label()
    }

    fn kind(&self) -> EditableKind {
        self.meta().kind()
    }

    fn type_name(&self) -> &'static str {
        self.meta().kind().type_name()
    }

    fn group(&self) -> Option<GroupId> {
        self.meta().group()
    }

    fn is_selected(&self) -> bool {
        self.meta().selected
    }

    fn field(&self, key: &str) -> Option<FieldValue> {
        self.live_fields().get(key)
    }

    fn initial_field(&self, key: &str) -> Option<FieldValue> {
        self.initial_fields().get(key)
    }

    /// Applies one edit and writes it through to the host.
    fn set_field(&mut self, key: &str, value: FieldValue, host: &mut dyn SceneHost) -> bool {
        if !self.live_fields_mut().set(key, value) {
            return false;
        }
        self.push_to_host(host);
        self.refresh_owned_colliders(host);
        self.update_preview(host);
        true
    }

    fn deviates_from_initial(&self) -> bool {
        fields::deviates(self.initial_fields(), self.live_fields())
    }

    fn reset_to_initial(&mut self, host: &mut dyn SceneHost, ui: &mut dyn ControlSurface) {
        self.restore_initial();
        self.push_to_host(host);
        self.refresh_owned_colliders(host);
        self.update_preview(host);
        if self.controls().is_shown() {
            self.destroy_controls(ui);
            self.create_controls(ui);
        }
    }

    /// Applies the fields present in `object`; `None` leaves everything untouched.
    /// Returns the keys whose values had the wrong type.
    fn load_json(&mut self, object: Option<&Map<String, Value>>, host: &mut dyn SceneHost) -> Vec<&'static str> {
        let Some(object) = object else {
            return Vec::new();
        };
        let mismatched = fields::read_fields(self.live_fields_mut(), object);
        self.push_to_host(host);
        self.refresh_owned_colliders(host);
        self.update_preview(host);
        mismatched
    }

    /// Re-reads owned colliders after a push, since the host derives their geometry
    /// from this entity's state. Must run before anything reads or pushes them.
    fn refresh_owned_colliders(&mut self, host: &mut dyn SceneHost) {
        for child in self.owned_colliders_mut() {
            child.pull_from_host(&*host);
            child.update_preview(host);
        }
    }

    fn append_json(&self, document: &mut Map<String, Value>) {
        let object = fields::write_fields(self.live_fields());
        document.insert(self.id().as_str().to_string(), Value::Object(object));
    }

    /// Destroys any existing controls first, so repeated calls never stack widgets.
    fn create_controls(&mut self, ui: &mut dyn ControlSurface) {
        self.destroy_controls(ui);
        let owner = self.id().clone();
        let reset = ui.create_control(ControlSpec {
            owner: owner.clone(),
            key: "",
            label: format!("Reset {}", self.type_name()),
            kind: ControlKind::Button(ControlAction::ResetToInitial),
            value: None,
        });
        self.controls_mut().push(reset, "");
        for spec in self.field_specs() {
            let kind = match (spec.range, spec.default) {
                (FieldRange::Float { min, max }, FieldValue::Float(default)) => {
                    ControlKind::Slider { min, max, default }
                }
                (_, FieldValue::Bool(default)) => ControlKind::Toggle { default },
                (FieldRange::Toggle, FieldValue::Float(_)) => continue,
            };
            let value = self.field(spec.key);
            let handle = ui.create_control(ControlSpec {
                owner: owner.clone(),
                key: spec.key,
                label: spec.label.to_string(),
                kind,
                value,
            });
            self.controls_mut().push(handle, spec.key);
        }
        for child in self.owned_colliders_mut() {
            child.create_controls(ui);
        }
    }

    fn destroy_controls(&mut self, ui: &mut dyn ControlSurface) {
        self.controls_mut().clear(ui);
        for child in self.owned_colliders_mut() {
            child.destroy_controls(ui);
        }
    }

    /// Pushes live values into shown controls without firing their change path.
    fn update_controls(&self, ui: &mut dyn ControlSurface) {
        for (handle, key) in self.controls().bindings() {
            if let Some(value) = self.field(key) {
                ui.set_value_silently(handle, value);
            }
        }
    }

    fn update_preview(&mut self, host: &mut dyn SceneHost) {
        let Some((_, transform)) = self.preview_geometry() else {
            return;
        };
        if let Some(preview) = self.preview() {
            preview.update_transform(&transform, host);
        }
    }

    fn set_preview_enabled(&mut self, enabled: bool, host: &mut dyn SceneHost) {
        let parent = self.meta().handle();
        if let Some((shape, transform)) = self.preview_geometry() {
            if let Some(preview) = self.preview_mut() {
                preview.set_enabled(enabled, shape, parent, &transform, host);
            }
        }
        for child in self.owned_colliders_mut() {
            child.set_preview_enabled(enabled, host);
        }
    }

    fn set_preview_xray(&mut self, xray: bool, host: &mut dyn SceneHost) {
        if let Some(preview) = self.preview_mut() {
            preview.set_xray(xray, host);
        }
        for child in self.owned_colliders_mut() {
            child.set_preview_xray(xray, host);
        }
    }

    fn set_preview_opacity(&mut self, alpha: f32, host: &mut dyn SceneHost) {
        if let Some(preview) = self.preview_mut() {
            preview.set_opacity(alpha, host);
        }
        for child in self.owned_colliders_mut() {
            child.set_preview_opacity(alpha, host);
        }
    }

    fn set_selected_preview_opacity(&mut self, alpha: f32, host: &mut dyn SceneHost) {
        if let Some(preview) = self.preview_mut() {
            preview.set_selected_opacity(alpha, host);
        }
        for child in self.owned_colliders_mut() {
            child.set_selected_preview_opacity(alpha, host);
        }
    }

    fn set_highlighted(&mut self, highlighted: bool, host: &mut dyn SceneHost) {
        if let Some(preview) = self.preview_mut() {
            preview.set_highlighted(highlighted, host);
        }
        for child in self.owned_colliders_mut() {
            child.set_highlighted(highlighted, host);
        }
    }

    /// Selection shows the controls and highlights the preview.
    fn set_selected(&mut self, selected: bool, host: &mut dyn SceneHost, ui: &mut dyn ControlSurface) {
        self.meta_mut().selected = selected;
        self.set_highlighted(selected, host);
        if selected {
            self.create_controls(ui);
        } else {
            self.destroy_controls(ui);
        }
    }

    fn destroy_preview(&mut self, host: &mut dyn SceneHost) {
        if let Some(preview) = self.preview_mut() {
            preview.destroy(host);
        }
        for child in self.owned_colliders_mut() {
            child.destroy_preview(host);
        }
    }
}
