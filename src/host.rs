//! Scene host boundary.
//!
//! The editor never touches physics or rendering state directly. Everything it
//! reads at build time comes from [`SceneHost::physical_objects`], and every edit
//! is written back through the setters below. Preview proxies are lightweight
//! visual primitives owned by the host and addressed through [`ProxyHandle`].

use glam::{Quat, Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// Host-side handle of a physical object (collider, auto-collider pair or rigidbody).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectHandle(pub u32);

/// Host-side handle of a preview proxy primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProxyHandle(pub u32);

/// Local axis a capsule is aligned with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapsuleAxis {
    X,
    #[default]
    Y,
    Z,
}

/// Editable geometry of a simple collider. Offsets are in the collider's local space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColliderGeometry {
    Sphere {
        radius: f32,
        #[serde(default)]
        center: Vec3,
    },
    Box {
        half_extents: Vec3,
        #[serde(default)]
        center: Vec3,
    },
    Capsule {
        radius: f32,
        height: f32,
        #[serde(default)]
        center: Vec3,
        #[serde(default)]
        axis: CapsuleAxis,
    },
}

impl ColliderGeometry {
    pub fn center(&self) -> Vec3 {
        match *self {
            ColliderGeometry::Sphere { center, .. }
            | ColliderGeometry::Box { center, .. }
            | ColliderGeometry::Capsule { center, .. } => center,
        }
    }

    pub fn proxy_shape(&self) -> ProxyShape {
        match self {
            ColliderGeometry::Sphere { .. } => ProxyShape::Sphere,
            ColliderGeometry::Box { .. } => ProxyShape::Cube,
            ColliderGeometry::Capsule { .. } => ProxyShape::Capsule,
        }
    }

    /// True when both values describe the same primitive kind.
    pub fn same_shape(&self, other: &ColliderGeometry) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// Tuning parameters of an auto-sized collider pair. The host derives the
/// nested colliders' geometry from these.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AutoColliderParams {
    pub length_buffer: f32,
    pub radius_buffer: f32,
    pub radius_multiplier: f32,
}

impl Default for AutoColliderParams {
    fn default() -> Self {
        Self { length_buffer: 0.0, radius_buffer: 0.0, radius_multiplier: 1.0 }
    }
}

/// One physical object as enumerated by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalObject {
    pub handle: ObjectHandle,
    /// Structural name, stable across sessions as long as the host does not rename objects.
    pub path: String,
    pub kind: PhysicalKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PhysicalKind {
    Collider(ColliderGeometry),
    AutoCollider {
        params: AutoColliderParams,
        /// Nested colliders owned by the pair, at most a hard and a joint collider.
        colliders: Vec<PhysicalObject>,
    },
    Rigidbody {
        detect_collisions: bool,
        /// Colliders attached to the body. They are enumerated on their own.
        colliders: Vec<ObjectHandle>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProxyShape {
    Sphere,
    Cube,
    Capsule,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProxyTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for ProxyTransform {
    fn default() -> Self {
        Self { translation: Vec3::ZERO, rotation: Quat::IDENTITY, scale: Vec3::ONE }
    }
}

/// Everything the editor needs from the live scene.
pub trait SceneHost {
    /// Physical objects in host-defined order.
    fn physical_objects(&self) -> Vec<PhysicalObject>;

    /// Current geometry of a collider, which may have been re-derived by the host.
    fn collider_geometry(&self, handle: ObjectHandle) -> Option<ColliderGeometry>;

    fn set_collider_geometry(&mut self, handle: ObjectHandle, geometry: &ColliderGeometry);

    fn set_auto_collider_params(&mut self, handle: ObjectHandle, params: &AutoColliderParams);

    fn set_detect_collisions(&mut self, handle: ObjectHandle, enabled: bool);

    /// Creates a proxy parented to `parent`. `None` when the host cannot create one.
    fn create_proxy(&mut self, shape: ProxyShape, parent: ObjectHandle) -> Option<ProxyHandle>;

    fn set_proxy_transform(&mut self, proxy: ProxyHandle, transform: &ProxyTransform);

    fn set_proxy_color(&mut self, proxy: ProxyHandle, color: Vec4);

    fn set_proxy_xray(&mut self, proxy: ProxyHandle, xray: bool);

    fn set_proxy_visible(&mut self, proxy: ProxyHandle, visible: bool);

    fn destroy_proxy(&mut self, proxy: ProxyHandle);
}
