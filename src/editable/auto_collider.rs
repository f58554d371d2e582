use super::collider::ColliderEditable;
use super::fields::{FieldSet, FieldSpec, FieldType, FieldValue};
use super::{ColliderRefs, Editable, EditableKind, EditableMeta};
use crate::controls::ControlSet;
use crate::group::GroupId;
use crate::host::{AutoColliderParams, ObjectHandle, SceneHost};
use serde::Deserialize;
use smallvec::SmallVec;

const KEYS: &[&str] = &["autoLengthBuffer", "autoRadiusBuffer", "autoRadiusMultiplier"];

/// Which tuning parameters a reset restores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoColliderResetMode {
    #[default]
    AllFields,
    /// Only the radius buffer goes back; length buffer and radius multiplier keep their edits.
    RadiusBufferOnly,
}

impl FieldSet for AutoColliderParams {
    fn keys(&self) -> &'static [&'static str] {
        KEYS
    }

    fn field_type(&self, key: &str) -> Option<FieldType> {
        KEYS.contains(&key).then_some(FieldType::Float)
    }

    fn get(&self, key: &str) -> Option<FieldValue> {
        let value = match key {
            "autoLengthBuffer" => self.length_buffer,
            "autoRadiusBuffer" => self.radius_buffer,
            "autoRadiusMultiplier" => self.radius_multiplier,
            _ => return None,
        };
        Some(FieldValue::Float(value))
    }

    fn set(&mut self, key: &str, value: FieldValue) -> bool {
        let Some(value) = value.as_float() else {
            return false;
        };
        match key {
            "autoLengthBuffer" => self.length_buffer = value,
            "autoRadiusBuffer" => self.radius_buffer = value,
            "autoRadiusMultiplier" => self.radius_multiplier = value,
            _ => return false,
        }
        true
    }
}

/// Auto-sized collider pair. Owns its nested hard and joint colliders.
#[derive(Debug)]
pub struct AutoColliderEditable {
    meta: EditableMeta,
    initial: AutoColliderParams,
    live: AutoColliderParams,
    reset_mode: AutoColliderResetMode,
    colliders: SmallVec<[ColliderEditable; 2]>,
    controls: ControlSet,
}

impl AutoColliderEditable {
    pub fn new(
        path: &str,
        handle: ObjectHandle,
        params: AutoColliderParams,
        colliders: impl IntoIterator<Item = ColliderEditable>,
        group: Option<GroupId>,
        reset_mode: AutoColliderResetMode,
    ) -> Self {
        Self {
            meta: EditableMeta::new(EditableKind::AutoCollider, path, handle, group),
            initial: params,
            live: params,
            reset_mode,
            colliders: colliders.into_iter().collect(),
            controls: ControlSet::default(),
        }
    }

    pub fn params(&self) -> &AutoColliderParams {
        &self.live
    }

    pub fn reset_mode(&self) -> AutoColliderResetMode {
        self.reset_mode
    }
}

impl Editable for AutoColliderEditable {
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
        vec![
            FieldSpec::scaled("autoLengthBuffer", "Auto Length Buffer", self.initial.length_buffer),
            FieldSpec::scaled("autoRadiusBuffer", "Auto Radius Buffer", self.initial.radius_buffer),
            FieldSpec::scaled("autoRadiusMultiplier", "Auto Radius Multiplier", self.initial.radius_multiplier),
        ]
    }

    fn push_to_host(&self, host: &mut dyn SceneHost) {
        host.set_auto_collider_params(self.meta.handle(), &self.live);
    }

    fn restore_initial(&mut self) {
        match self.reset_mode {
            AutoColliderResetMode::AllFields => self.live = self.initial,
            AutoColliderResetMode::RadiusBufferOnly => self.live.radius_buffer = self.initial.radius_buffer,
        }
    }

    fn controls(&self) -> &ControlSet {
        &self.controls
    }

    fn controls_mut(&mut self) -> &mut ControlSet {
        &mut self.controls
    }

    fn colliders(&self) -> ColliderRefs<'_> {
        ColliderRefs::Owned(&self.colliders)
    }

    fn owned_colliders(&self) -> &[ColliderEditable] {
        &self.colliders
    }

    fn owned_colliders_mut(&mut self) -> &mut [ColliderEditable] {
        &mut self.colliders
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::NullSurface;
    use crate::ecs_host::EcsSceneHost;

    fn edited(mode: AutoColliderResetMode) -> (EcsSceneHost, AutoColliderEditable) {
        let mut host = EcsSceneHost::new();
        let params = AutoColliderParams { length_buffer: 0.02, radius_buffer: 0.01, radius_multiplier: 1.0 };
        let handle = host.spawn_auto_collider("AutoColliders/lThigh", params, &[]);
        let mut pair = AutoColliderEditable::new("AutoColliders/lThigh", handle, params, [], None, mode);
        assert!(pair.set_field("autoLengthBuffer", FieldValue::Float(0.05), &mut host));
        assert!(pair.set_field("autoRadiusBuffer", FieldValue::Float(0.03), &mut host));
        assert!(pair.set_field("autoRadiusMultiplier", FieldValue::Float(1.5), &mut host));
        (host, pair)
    }

    #[test]
    fn reset_restores_every_parameter_by_default() {
        let (mut host, mut pair) = edited(AutoColliderResetMode::AllFields);
        pair.reset_to_initial(&mut host, &mut NullSurface::default());
        assert!(!pair.deviates_from_initial());
        assert_eq!(host.auto_collider_params(pair.meta().handle()), Some(*pair.params()));
    }

    #[test]
    fn legacy_reset_only_restores_radius_buffer() {
        let (mut host, mut pair) = edited(AutoColliderResetMode::RadiusBufferOnly);
        pair.reset_to_initial(&mut host, &mut NullSurface::default());
        assert_eq!(pair.field("autoRadiusBuffer"), Some(FieldValue::Float(0.01)));
        assert_eq!(pair.field("autoLengthBuffer"), Some(FieldValue::Float(0.05)));
        assert_eq!(pair.field("autoRadiusMultiplier"), Some(FieldValue::Float(1.5)));
        assert!(pair.deviates_from_initial());
    }
}
