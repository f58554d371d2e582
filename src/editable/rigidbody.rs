use super::fields::{FieldSet, FieldSpec, FieldType, FieldValue};
use super::{ColliderRefs, Editable, EditableId, EditableKind, EditableMeta};
use crate::controls::ControlSet;
use crate::group::GroupId;
use crate::host::{ObjectHandle, SceneHost};

const KEYS: &[&str] = &["detectCollisions"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RigidbodyState {
    pub detect_collisions: bool,
}

impl FieldSet for RigidbodyState {
    fn keys(&self) -> &'static [&'static str] {
        KEYS
    }

    fn field_type(&self, key: &str) -> Option<FieldType> {
        KEYS.contains(&key).then_some(FieldType::Bool)
    }

    fn get(&self, key: &str) -> Option<FieldValue> {
        (key == "detectCollisions").then_some(FieldValue::Bool(self.detect_collisions))
    }

    fn set(&mut self, key: &str, value: FieldValue) -> bool {
        match (key, value) {
            ("detectCollisions", FieldValue::Bool(enabled)) => {
                self.detect_collisions = enabled;
                true
            }
            _ => false,
        }
    }
}

/// Rigidbody. References the colliders attached to it without owning them;
/// the references are filled in by the registry's linking pass.
#[derive(Debug)]
pub struct RigidbodyEditable {
    meta: EditableMeta,
    initial: RigidbodyState,
    live: RigidbodyState,
    collider_handles: Vec<ObjectHandle>,
    colliders: Vec<EditableId>,
    controls: ControlSet,
}

impl RigidbodyEditable {
    pub fn new(
        path: &str,
        handle: ObjectHandle,
        detect_collisions: bool,
        collider_handles: Vec<ObjectHandle>,
        group: Option<GroupId>,
    ) -> Self {
        let state = RigidbodyState { detect_collisions };
        Self {
            meta: EditableMeta::new(EditableKind::Rigidbody, path, handle, group),
            initial: state,
            live: state,
            collider_handles,
            colliders: Vec::new(),
            controls: ControlSet::default(),
        }
    }

    pub fn state(&self) -> RigidbodyState {
        self.live
    }

    /// Host handles of the attached colliders, as enumerated.
    pub fn collider_handles(&self) -> &[ObjectHandle] {
        &self.collider_handles
    }

    pub fn link_colliders(&mut self, ids: Vec<EditableId>) {
        self.colliders = ids;
    }
}

impl Editable for RigidbodyEditable {
    fn meta(&self) -> &EditableMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EditableMeta {
        &mut self.meta
    }

    fn live_fields(&self) -> &dyn FieldSet {
        &self.live
    }

    fn live_fields_mut(&mut self) -> &mut dyn FieldSet {
        &mut self.live
    }

    fn initial_fields(&self) -> &dyn FieldSet {
        &self.initial
    }

    fn field_specs(&self) -> Vec<FieldSpec> {
        vec![FieldSpec::toggle("detectCollisions", "Detect Collisions", self.initial.detect_collisions)]
    }

    fn push_to_host(&self, host: &mut dyn SceneHost) {
        host.set_detect_collisions(self.meta.handle(), self.live.detect_collisions);
    }

    fn restore_initial(&mut self) {
        self.live = self.initial;
    }

    fn controls(&self) -> &ControlSet {
        &self.controls
    }

    fn controls_mut(&mut self) -> &mut ControlSet {
        &mut self.controls
    }

    fn colliders(&self) -> ColliderRefs<'_> {
        ColliderRefs::Referenced(&self.colliders)
    }

    fn as_rigidbody_mut(&mut self) -> Option<&mut RigidbodyEditable> {
        Some(self)
    }
}
