//! The catalog of editables built from one scene enumeration.

use crate::controls::{ControlAction, ControlSurface};
use crate::editable::{
    AutoColliderEditable, AutoColliderResetMode, ColliderEditable, ColliderRefs, Editable, EditableId, FieldValue,
    RigidbodyEditable,
};
use crate::error::BuildError;
use crate::group::GroupClassifier;
use crate::host::{ObjectHandle, PhysicalKind, PhysicalObject, SceneHost};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Where an id lives: a top-level entry, or a nested collider owned by one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Top(usize),
    Nested(usize, usize),
}

/// What a document load did and skipped. Skips are not errors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub applied: Vec<EditableId>,
    /// Ids present in the document but not in the registry.
    pub unknown_ids: Vec<String>,
    /// Fields whose values could not be parsed as the expected type.
    pub mismatched: Vec<(EditableId, &'static str)>,
    /// Entries that were not JSON objects.
    pub malformed: Vec<EditableId>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.unknown_ids.is_empty() && self.mismatched.is_empty() && self.malformed.is_empty()
    }
}

pub struct Registry {
    entries: Vec<Box<dyn Editable>>,
    index: HashMap<EditableId, Slot>,
    classifier: GroupClassifier,
    selected: Option<EditableId>,
}

impl Registry {
    /// Builds every editable from the host's enumeration, in host order.
    ///
    /// A duplicate id aborts the build since presets could no longer address
    /// both objects.
    pub fn build(
        host: &dyn SceneHost,
        classifier: GroupClassifier,
        reset_mode: AutoColliderResetMode,
    ) -> Result<Self, BuildError> {
        let mut registry = Self { entries: Vec::new(), index: HashMap::new(), classifier, selected: None };
        let mut labels: HashMap<String, usize> = HashMap::new();
        let mut by_handle: HashMap<ObjectHandle, EditableId> = HashMap::new();

        for object in host.physical_objects() {
            let mut entry = registry.construct(object, reset_mode);
            let position = registry.entries.len();
            registry.register(entry.as_mut(), Slot::Top(position), &mut labels, &mut by_handle)?;
            for (nested, child) in entry.owned_colliders_mut().iter_mut().enumerate() {
                registry.register(child, Slot::Nested(position, nested), &mut labels, &mut by_handle)?;
            }
            registry.entries.push(entry);
        }

        registry.link_rigidbodies(&by_handle);
        log::info!(
            "[registry] built {} editables ({} top-level) across {} groups",
            registry.index.len(),
            registry.entries.len(),
            registry.classifier.names().len()
        );
        Ok(registry)
    }

    fn construct(&self, object: PhysicalObject, reset_mode: AutoColliderResetMode) -> Box<dyn Editable> {
        let group = self.classifier.classify(&object.path);
        match object.kind {
            PhysicalKind::Collider(geometry) => {
                Box::new(ColliderEditable::new(&object.path, object.handle, geometry, group))
            }
            PhysicalKind::AutoCollider { params, colliders } => {
                let nested = colliders.into_iter().filter_map(|nested| match nested.kind {
                    PhysicalKind::Collider(geometry) => {
                        let nested_group = self.classifier.classify(&nested.path).or(group);
                        Some(ColliderEditable::new(&nested.path, nested.handle, geometry, nested_group))
                    }
                    _ => {
                        log::warn!("[registry] '{}' nests a non-collider '{}'; skipped", object.path, nested.path);
                        None
                    }
                });
                Box::new(AutoColliderEditable::new(&object.path, object.handle, params, nested, group, reset_mode))
            }
            PhysicalKind::Rigidbody { detect_collisions, colliders } => {
                Box::new(RigidbodyEditable::new(&object.path, object.handle, detect_collisions, colliders, group))
            }
        }
    }

    fn register(
        &mut self,
        entry: &mut dyn Editable,
        slot: Slot,
        labels: &mut HashMap<String, usize>,
        by_handle: &mut HashMap<ObjectHandle, EditableId>,
    ) -> Result<(), BuildError> {
        let id = entry.id().clone();
        if self.index.contains_key(&id) {
            log::error!("[registry] duplicate id '{id}'; aborting build");
            return Err(BuildError::DuplicateId { id: id.to_string() });
        }
        let seen = labels.entry(entry.label().to_string()).or_insert(0);
        *seen += 1;
        if *seen > 1 {
            let label = format!("{} ({})", entry.label(), seen);
            entry.meta_mut().set_label(label);
        }
        if entry.kind().is_collider() {
            by_handle.insert(entry.meta().handle(), id.clone());
        }
        self.index.insert(id, slot);
        Ok(())
    }

    fn link_rigidbodies(&mut self, by_handle: &HashMap<ObjectHandle, EditableId>) {
        for entry in &mut self.entries {
            let Some(body) = entry.as_rigidbody_mut() else {
                continue;
            };
            let mut ids = Vec::with_capacity(body.collider_handles().len());
            for handle in body.collider_handles() {
                match by_handle.get(handle) {
                    Some(id) => ids.push(id.clone()),
                    None => {
                        log::warn!("[registry] rigidbody '{}' references an unknown collider {handle:?}", body.id())
                    }
                }
            }
            body.link_colliders(ids);
        }
    }

    pub fn classifier(&self) -> &GroupClassifier {
        &self.classifier
    }

    /// Top-level editables in enumeration order.
    pub fn entries(&self) -> impl Iterator<Item = &dyn Editable> + '_ {
        self.entries.iter().map(|entry| entry.as_ref())
    }

    /// Every editable, each container followed by its nested colliders.
    pub fn every_entity(&self) -> Vec<&dyn Editable> {
        let mut all = Vec::with_capacity(self.index.len());
        for entry in &self.entries {
            all.push(entry.as_ref());
            all.extend(entry.owned_colliders().iter().map(|child| child as &dyn Editable));
        }
        all
    }

    /// Every collider, nested ones included.
    pub fn all_colliders(&self) -> Vec<&dyn Editable> {
        self.every_entity().into_iter().filter(|entity| entity.kind().is_collider()).collect()
    }

    fn for_each_mut(&mut self, mut apply: impl FnMut(&mut dyn Editable)) {
        for entry in &mut self.entries {
            apply(entry.as_mut());
            for child in entry.owned_colliders_mut() {
                apply(child);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&dyn Editable> {
        match *self.index.get(id)? {
            Slot::Top(position) => self.entries.get(position).map(|entry| entry.as_ref()),
            Slot::Nested(position, nested) => self
                .entries
                .get(position)?
                .owned_colliders()
                .get(nested)
                .map(|child| child as &dyn Editable),
        }
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut dyn Editable> {
        match *self.index.get(id)? {
            Slot::Top(position) => self.entries.get_mut(position).map(|entry| entry.as_mut() as &mut dyn Editable),
            Slot::Nested(position, nested) => self
                .entries
                .get_mut(position)?
                .owned_colliders_mut()
                .get_mut(nested)
                .map(|child| child as &mut dyn Editable),
        }
    }

    pub fn group_name(&self, entity: &dyn Editable) -> Option<&str> {
        entity.group().and_then(|group| self.classifier.name(group))
    }

    /// Group names for the group filter, in table order.
    pub fn group_names(&self) -> Vec<&str> {
        self.classifier.names()
    }

    /// Distinct type names of the top-level editables, in first-seen order.
    pub fn type_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        for entry in &self.entries {
            let name = entry.type_name();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    pub fn selected(&self) -> Option<&EditableId> {
        self.selected.as_ref()
    }

    /// Moves the selection. Unknown ids clear it. Returns whether an editable is now selected.
    pub fn select(&mut self, id: Option<&str>, host: &mut dyn SceneHost, ui: &mut dyn ControlSurface) -> bool {
        if self.selected.as_ref().map(EditableId::as_str) == id {
            return self.selected.is_some();
        }
        if let Some(previous) = self.selected.take() {
            self.mark_selected(previous.as_str(), false, host, ui);
        }
        let Some(id) = id.filter(|id| self.index.contains_key(*id)) else {
            return false;
        };
        self.mark_selected(id, true, host, ui);
        self.selected = Some(EditableId::from(id));
        true
    }

    fn mark_selected(&mut self, id: &str, selected: bool, host: &mut dyn SceneHost, ui: &mut dyn ControlSurface) {
        let referenced: Vec<EditableId> = match self.get_mut(id) {
            Some(entity) => {
                entity.set_selected(selected, host, ui);
                match entity.colliders() {
                    ColliderRefs::Referenced(ids) => ids.to_vec(),
                    _ => Vec::new(),
                }
            }
            None => return,
        };
        for collider in referenced {
            if let Some(entity) = self.get_mut(collider.as_str()) {
                entity.set_highlighted(selected, host);
            }
        }
    }

    pub fn reset_one(&mut self, id: &str, host: &mut dyn SceneHost, ui: &mut dyn ControlSurface) -> bool {
        match self.get_mut(id) {
            Some(entity) => {
                entity.reset_to_initial(host, ui);
                log::debug!("[registry] reset '{id}'");
                true
            }
            None => false,
        }
    }

    /// Resets every editable, nested colliders included.
    pub fn reset_all(&mut self, host: &mut dyn SceneHost, ui: &mut dyn ControlSurface) {
        self.for_each_mut(|entity| entity.reset_to_initial(host, ui));
        log::info!("[registry] reset {} editables", self.index.len());
    }

    /// Operator edit reported by the control surface.
    pub fn apply_control_change(
        &mut self,
        id: &str,
        key: &str,
        value: FieldValue,
        host: &mut dyn SceneHost,
    ) -> bool {
        let Some(entity) = self.get_mut(id) else {
            log::debug!("[registry] control change for unknown id '{id}'");
            return false;
        };
        let applied = entity.set_field(key, value, host);
        if !applied {
            log::warn!("[registry] '{id}' rejected {key} = {value:?}");
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
        match action {
            ControlAction::ResetToInitial => self.reset_one(id, host, ui),
        }
    }

    /// Live state of every editable keyed by id. A full snapshot, not a diff.
    pub fn to_document(&self) -> Map<String, Value> {
        let mut document = Map::new();
        for entity in self.every_entity() {
            entity.append_json(&mut document);
        }
        document
    }

    /// Applies a document keyed by id. Editables the document does not name keep their state.
    pub fn apply_document(&mut self, document: &Map<String, Value>, host: &mut dyn SceneHost) -> LoadReport {
        let mut report = LoadReport::default();
        for (id, _) in document.iter().filter(|(id, _)| !self.index.contains_key(id.as_str())) {
            log::debug!("[registry] skipping unknown id '{id}'");
            report.unknown_ids.push(id.clone());
        }
        self.for_each_mut(|entity| {
            let Some(entry) = document.get(entity.id().as_str()) else {
                return;
            };
            let Some(object) = entry.as_object() else {
                log::warn!("[registry] entry for '{}' is not an object; skipped", entity.id());
                report.malformed.push(entity.id().clone());
                return;
            };
            for key in entity.load_json(Some(object), host) {
                log::warn!("[registry] '{}': field '{key}' has the wrong type; kept previous value", entity.id());
                report.mismatched.push((entity.id().clone(), key));
            }
            report.applied.push(entity.id().clone());
        });
        report
    }

    /// One scene tick: adopt host-derived values, then refresh controls and previews.
    pub fn tick(&mut self, host: &mut dyn SceneHost, ui: &mut dyn ControlSurface) {
        self.for_each_mut(|entity| {
            entity.pull_from_host(&*host);
            entity.update_controls(ui);
            entity.update_preview(host);
        });
    }

    pub fn set_preview_enabled(&mut self, enabled: bool, host: &mut dyn SceneHost) {
        for entry in &mut self.entries {
            entry.set_preview_enabled(enabled, host);
        }
    }

    pub fn set_preview_xray(&mut self, xray: bool, host: &mut dyn SceneHost) {
        for entry in &mut self.entries {
            entry.set_preview_xray(xray, host);
        }
    }

    pub fn set_preview_opacity(&mut self, alpha: f32, host: &mut dyn SceneHost) {
        for entry in &mut self.entries {
            entry.set_preview_opacity(alpha, host);
        }
    }

    pub fn set_selected_preview_opacity(&mut self, alpha: f32, host: &mut dyn SceneHost) {
        for entry in &mut self.entries {
            entry.set_selected_preview_opacity(alpha, host);
        }
    }

    /// Releases every control and preview proxy. The registry stays usable.
    pub fn teardown(&mut self, host: &mut dyn SceneHost, ui: &mut dyn ControlSurface) {
        self.select(None, host, ui);
        for entry in &mut self.entries {
            entry.destroy_controls(ui);
            entry.destroy_preview(host);
        }
    }
}
