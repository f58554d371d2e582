use super::fields::{FieldSet, FieldSpec, FieldType, FieldValue};
use super::preview::PreviewState;
use super::{Editable, EditableKind, EditableMeta};
use crate::controls::ControlSet;
use crate::group::GroupId;
use crate::host::{CapsuleAxis, ColliderGeometry, ObjectHandle, ProxyShape, ProxyTransform, SceneHost};
use glam::{Quat, Vec3};

const SPHERE_KEYS: &[&str] = &["radius", "centerX", "centerY", "centerZ"];
const BOX_KEYS: &[&str] = &["halfExtentsX", "halfExtentsY", "halfExtentsZ", "centerX", "centerY", "centerZ"];
const CAPSULE_KEYS: &[&str] = &["radius", "height", "centerX", "centerY", "centerZ"];

fn vec_component(vector: &Vec3, key: &str, prefix: &str) -> Option<f32> {
    match key.strip_prefix(prefix)? {
        "X" => Some(vector.x),
        "Y" => Some(vector.y),
        "Z" => Some(vector.z),
        _ => None,
    }
}

fn set_vec_component(vector: &mut Vec3, key: &str, prefix: &str, value: f32) -> bool {
    match key.strip_prefix(prefix) {
        Some("X") => vector.x = value,
        Some("Y") => vector.y = value,
        Some("Z") => vector.z = value,
        _ => return false,
    }
    true
}

impl FieldSet for ColliderGeometry {
    fn keys(&self) -> &'static [&'static str] {
        match self {
            ColliderGeometry::Sphere { .. } => SPHERE_KEYS,
            ColliderGeometry::Box { .. } => BOX_KEYS,
            ColliderGeometry::Capsule { .. } => CAPSULE_KEYS,
        }
    }

    fn field_type(&self, key: &str) -> Option<FieldType> {
        self.keys().contains(&key).then_some(FieldType::Float)
    }

    fn get(&self, key: &str) -> Option<FieldValue> {
        let value = match self {
            ColliderGeometry::Sphere { radius, center } => match key {
                "radius" => Some(*radius),
                _ => vec_component(center, key, "center"),
            },
            ColliderGeometry::Box { half_extents, center } => {
                vec_component(half_extents, key, "halfExtents").or_else(|| vec_component(center, key, "center"))
            }
            ColliderGeometry::Capsule { radius, height, center, .. } => match key {
                "radius" => Some(*radius),
                "height" => Some(*height),
                _ => vec_component(center, key, "center"),
            },
        };
        value.map(FieldValue::Float)
    }

    fn set(&mut self, key: &str, value: FieldValue) -> bool {
        let Some(value) = value.as_float() else {
            return false;
        };
        match self {
            ColliderGeometry::Sphere { radius, center } => match key {
                "radius" => {
                    *radius = value;
                    true
                }
                _ => set_vec_component(center, key, "center", value),
            },
            ColliderGeometry::Box { half_extents, center } => {
                set_vec_component(half_extents, key, "halfExtents", value)
                    || set_vec_component(center, key, "center", value)
            }
            ColliderGeometry::Capsule { radius, height, center, .. } => match key {
                "radius" => {
                    *radius = value;
                    true
                }
                "height" => {
                    *height = value;
                    true
                }
                _ => set_vec_component(center, key, "center", value),
            },
        }
    }
}

/// Local transform of the proxy primitive that visualises `geometry`.
pub fn proxy_transform(geometry: &ColliderGeometry) -> ProxyTransform {
    match *geometry {
        ColliderGeometry::Sphere { radius, center } => {
            ProxyTransform { translation: center, rotation: Quat::IDENTITY, scale: Vec3::splat(radius * 2.0) }
        }
        ColliderGeometry::Box { half_extents, center } => {
            ProxyTransform { translation: center, rotation: Quat::IDENTITY, scale: half_extents * 2.0 }
        }
        ColliderGeometry::Capsule { radius, height, center, axis } => {
            let size = radius * 2.0;
            let rotation = match axis {
                CapsuleAxis::X => Quat::from_axis_angle(Vec3::Z, 90_f32.to_radians()),
                CapsuleAxis::Y => Quat::IDENTITY,
                CapsuleAxis::Z => Quat::from_axis_angle(Vec3::X, 90_f32.to_radians()),
            };
            ProxyTransform { translation: center, rotation, scale: Vec3::new(size, height / 2.0, size) }
        }
    }
}

fn kind_of(geometry: &ColliderGeometry) -> EditableKind {
    match geometry {
        ColliderGeometry::Sphere { .. } => EditableKind::Sphere,
        ColliderGeometry::Box { .. } => EditableKind::Box,
        ColliderGeometry::Capsule { .. } => EditableKind::Capsule,
    }
}

/// A sphere, box or capsule collider.
#[derive(Debug)]
pub struct ColliderEditable {
    meta: EditableMeta,
    initial: ColliderGeometry,
    live: ColliderGeometry,
    preview: PreviewState,
    controls: ControlSet,
}

impl ColliderEditable {
    pub fn new(path: &str, handle: ObjectHandle, geometry: ColliderGeometry, group: Option<GroupId>) -> Self {
        Self {
            meta: EditableMeta::new(kind_of(&geometry), path, handle, group),
            initial: geometry,
            live: geometry,
            preview: PreviewState::default(),
            controls: ControlSet::default(),
        }
    }

    pub fn geometry(&self) -> &ColliderGeometry {
        &self.live
    }

    pub fn initial_geometry(&self) -> &ColliderGeometry {
        &self.initial
    }
}

impl Editable for ColliderEditable {
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
        let mut specs = Vec::new();
        let center = match self.initial {
            ColliderGeometry::Sphere { radius, center } => {
                specs.push(FieldSpec::scaled("radius", "Radius", radius));
                center
            }
            ColliderGeometry::Box { half_extents, center } => {
                specs.push(FieldSpec::scaled("halfExtentsX", "Half Extents.X", half_extents.x));
                specs.push(FieldSpec::scaled("halfExtentsY", "Half Extents.Y", half_extents.y));
                specs.push(FieldSpec::scaled("halfExtentsZ", "Half Extents.Z", half_extents.z));
                center
            }
            ColliderGeometry::Capsule { radius, height, center, .. } => {
                specs.push(FieldSpec::scaled("radius", "Radius", radius));
                specs.push(FieldSpec::scaled("height", "Height", height));
                center
            }
        };
        specs.push(FieldSpec::offset("centerX", "Center.X", center.x));
        specs.push(FieldSpec::offset("centerY", "Center.Y", center.y));
        specs.push(FieldSpec::offset("centerZ", "Center.Z", center.z));
        specs
    }

    fn push_to_host(&self, host: &mut dyn SceneHost) {
        host.set_collider_geometry(self.meta.handle(), &self.live);
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

    fn preview(&self) -> Option<&PreviewState> {
        Some(&self.preview)
    }

    fn preview_mut(&mut self) -> Option<&mut PreviewState> {
        Some(&mut self.preview)
    }

    fn preview_geometry(&self) -> Option<(ProxyShape, ProxyTransform)> {
        Some((self.live.proxy_shape(), proxy_transform(&self.live)))
    }

    fn pull_from_host(&mut self, host: &dyn SceneHost) {
        if let Some(current) = host.collider_geometry(self.meta.handle()) {
            if current.same_shape(&self.live) {
                self.live = current;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn capsule(axis: CapsuleAxis) -> ColliderGeometry {
        ColliderGeometry::Capsule { radius: 0.05, height: 0.3, center: Vec3::new(0.0, 0.01, 0.0), axis }
    }

    #[test]
    fn capsule_proxy_scales_and_rotates_by_axis() {
        let transform = proxy_transform(&capsule(CapsuleAxis::Y));
        assert_relative_eq!(transform.scale.x, 0.1);
        assert_relative_eq!(transform.scale.y, 0.15);
        assert_eq!(transform.rotation, Quat::IDENTITY);
        assert_eq!(transform.translation, Vec3::new(0.0, 0.01, 0.0));

        let x_axis = proxy_transform(&capsule(CapsuleAxis::X));
        let up = x_axis.rotation * Vec3::Y;
        assert_relative_eq!(up.x, -1.0, epsilon = 1e-5);

        let z_axis = proxy_transform(&capsule(CapsuleAxis::Z));
        let up = z_axis.rotation * Vec3::Y;
        assert_relative_eq!(up.z, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn capsule_ranges_follow_initial_values() {
        let collider = ColliderEditable::new("Chest/chest", ObjectHandle(1), capsule(CapsuleAxis::Y), None);
        let specs = collider.field_specs();
        let keys: Vec<_> = specs.iter().map(|spec| spec.key).collect();
        assert_eq!(keys, ["radius", "height", "centerX", "centerY", "centerZ"]);
        assert_eq!(specs[0].range, super::super::FieldRange::Float { min: 0.0, max: 0.2 });
        assert_eq!(specs[4].range, super::super::FieldRange::Float { min: -0.25, max: 0.25 });
    }

    #[test]
    fn box_fields_round_trip_through_keys() {
        let mut geometry = ColliderGeometry::Box { half_extents: Vec3::splat(0.1), center: Vec3::ZERO };
        assert!(geometry.set("halfExtentsY", FieldValue::Float(0.4)));
        assert!(geometry.set("centerZ", FieldValue::Float(-0.1)));
        assert!(!geometry.set("radius", FieldValue::Float(1.0)));
        assert!(!geometry.set("centerX", FieldValue::Bool(true)));
        assert_eq!(geometry.get("halfExtentsY"), Some(FieldValue::Float(0.4)));
        assert_eq!(geometry.get("centerZ"), Some(FieldValue::Float(-0.1)));
        assert_eq!(geometry.get("height"), None);
    }
}
