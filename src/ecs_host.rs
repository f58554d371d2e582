//! Reference [`SceneHost`] backed by a `bevy_ecs` world.
//!
//! Used by the command-line tool and the tests. Auto-collider pairs keep the
//! base geometry of their nested colliders and re-derive it whenever their
//! tuning parameters change, the way a live scene would.

use crate::host::{
    AutoColliderParams, ColliderGeometry, ObjectHandle, PhysicalKind, PhysicalObject, ProxyHandle, ProxyShape,
    ProxyTransform, SceneHost,
};
use anyhow::{anyhow, Context, Result};
use bevy_ecs::prelude::*;
use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Component, Debug, Clone)]
struct ObjectName(String);

#[derive(Component, Debug, Clone, Copy)]
struct Handle(ObjectHandle);

#[derive(Component, Debug, Clone, Copy)]
struct ColliderBody {
    geometry: ColliderGeometry,
}

#[derive(Debug, Clone, Copy)]
struct NestedCollider {
    handle: ObjectHandle,
    base: ColliderGeometry,
}

#[derive(Component, Debug, Clone)]
struct AutoColliderBody {
    params: AutoColliderParams,
    nested: Vec<NestedCollider>,
}

#[derive(Component, Debug, Clone)]
struct RigidbodyBody {
    detect_collisions: bool,
    colliders: Vec<ObjectHandle>,
}

/// State of a preview proxy as last set by the editor.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct ProxyVisual {
    pub shape: ProxyShape,
    pub parent: ObjectHandle,
    pub transform: ProxyTransform,
    pub color: Vec4,
    pub xray: bool,
    pub visible: bool,
}

/// Geometry the host derives for a nested collider from its pair's tuning.
pub fn derive_nested(base: &ColliderGeometry, params: &AutoColliderParams) -> ColliderGeometry {
    match *base {
        ColliderGeometry::Sphere { radius, center } => {
            ColliderGeometry::Sphere { radius: radius * params.radius_multiplier + params.radius_buffer, center }
        }
        ColliderGeometry::Box { half_extents, center } => ColliderGeometry::Box {
            half_extents: half_extents * params.radius_multiplier + Vec3::splat(params.radius_buffer),
            center,
        },
        ColliderGeometry::Capsule { radius, height, center, axis } => ColliderGeometry::Capsule {
            radius: radius * params.radius_multiplier + params.radius_buffer,
            height: height + params.length_buffer * 2.0,
            center,
            axis,
        },
    }
}

#[derive(Default)]
pub struct EcsSceneHost {
    world: World,
    top_level: Vec<Entity>,
    objects: HashMap<ObjectHandle, Entity>,
    proxies: HashMap<ProxyHandle, Entity>,
    next_object: u32,
    next_proxy: u32,
}

impl EcsSceneHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_manifest(manifest: &SceneManifest) -> Result<Self> {
        let mut host = Self::new();
        let mut by_path: HashMap<String, ObjectHandle> = HashMap::new();
        let mut pending_links = Vec::new();
        for object in &manifest.objects {
            match object {
                ManifestObject::Collider { path, geometry } => {
                    let handle = host.spawn_collider(path, *geometry);
                    by_path.insert(path.clone(), handle);
                }
                ManifestObject::AutoCollider { path, params, colliders } => {
                    let nested: Vec<(&str, ColliderGeometry)> =
                        colliders.iter().map(|nested| (nested.path.as_str(), nested.geometry)).collect();
                    let handle = host.spawn_auto_collider(path, *params, &nested);
                    by_path.insert(path.clone(), handle);
                    for (nested, nested_handle) in colliders.iter().zip(host.nested_colliders(handle)) {
                        by_path.insert(nested.path.clone(), nested_handle);
                    }
                }
                ManifestObject::Rigidbody { path, detect_collisions, colliders } => {
                    let handle = host.spawn_rigidbody(path, *detect_collisions, &[]);
                    by_path.insert(path.clone(), handle);
                    pending_links.push((path, handle, colliders));
                }
            }
        }
        for (path, rigidbody, colliders) in pending_links {
            let handles = colliders
                .iter()
                .map(|collider| {
                    by_path
                        .get(collider)
                        .copied()
                        .ok_or_else(|| anyhow!("rigidbody '{path}' references unknown collider '{collider}'"))
                })
                .collect::<Result<Vec<_>>>()?;
            host.attach_colliders(rigidbody, &handles);
        }
        Ok(host)
    }

    fn allocate_handle(&mut self) -> ObjectHandle {
        self.next_object = self.next_object.wrapping_add(1);
        ObjectHandle(self.next_object)
    }

    fn spawn_object(&mut self, path: &str, bundle: impl Bundle) -> (ObjectHandle, Entity) {
        let handle = self.allocate_handle();
        let entity = self.world.spawn((ObjectName(path.to_string()), Handle(handle), bundle)).id();
        self.objects.insert(handle, entity);
        (handle, entity)
    }

    pub fn spawn_collider(&mut self, path: &str, geometry: ColliderGeometry) -> ObjectHandle {
        let (handle, entity) = self.spawn_object(path, ColliderBody { geometry });
        self.top_level.push(entity);
        handle
    }

    /// Spawns a pair and its nested colliders, given by path and base geometry.
    pub fn spawn_auto_collider(
        &mut self,
        path: &str,
        params: AutoColliderParams,
        nested: &[(&str, ColliderGeometry)],
    ) -> ObjectHandle {
        let nested = nested
            .iter()
            .map(|(nested_path, base)| {
                let geometry = derive_nested(base, &params);
                let (handle, _) = self.spawn_object(nested_path, ColliderBody { geometry });
                NestedCollider { handle, base: *base }
            })
            .collect();
        let (handle, entity) = self.spawn_object(path, AutoColliderBody { params, nested });
        self.top_level.push(entity);
        handle
    }

    pub fn spawn_rigidbody(
        &mut self,
        path: &str,
        detect_collisions: bool,
        colliders: &[ObjectHandle],
    ) -> ObjectHandle {
        let body = RigidbodyBody { detect_collisions, colliders: colliders.to_vec() };
        let (handle, entity) = self.spawn_object(path, body);
        self.top_level.push(entity);
        handle
    }

    pub fn attach_colliders(&mut self, rigidbody: ObjectHandle, colliders: &[ObjectHandle]) {
        if let Some(mut body) = self.entity(rigidbody).and_then(|e| self.world.get_mut::<RigidbodyBody>(e)) {
            body.colliders.extend_from_slice(colliders);
        }
    }

    /// Renames an object. Presets saved against the old name no longer attach to it.
    pub fn rename(&mut self, handle: ObjectHandle, path: &str) {
        if let Some(mut name) = self.entity(handle).and_then(|e| self.world.get_mut::<ObjectName>(e)) {
            name.0 = path.to_string();
        }
    }

    /// First object spawned under `path`, nested colliders included.
    pub fn find(&self, path: &str) -> Option<ObjectHandle> {
        self.objects
            .iter()
            .filter(|(_, entity)| self.world.get::<ObjectName>(**entity).is_some_and(|name| name.0 == path))
            .map(|(handle, _)| *handle)
            .min()
    }

    fn entity(&self, handle: ObjectHandle) -> Option<Entity> {
        self.objects.get(&handle).copied()
    }

    pub fn nested_colliders(&self, handle: ObjectHandle) -> Vec<ObjectHandle> {
        self.entity(handle)
            .and_then(|e| self.world.get::<AutoColliderBody>(e))
            .map(|body| body.nested.iter().map(|nested| nested.handle).collect())
            .unwrap_or_default()
    }

    pub fn auto_collider_params(&self, handle: ObjectHandle) -> Option<AutoColliderParams> {
        self.entity(handle).and_then(|e| self.world.get::<AutoColliderBody>(e)).map(|body| body.params)
    }

    pub fn detect_collisions(&self, handle: ObjectHandle) -> Option<bool> {
        self.entity(handle).and_then(|e| self.world.get::<RigidbodyBody>(e)).map(|body| body.detect_collisions)
    }

    pub fn proxy(&self, proxy: ProxyHandle) -> Option<ProxyVisual> {
        self.proxies.get(&proxy).and_then(|e| self.world.get::<ProxyVisual>(*e)).copied()
    }

    pub fn proxy_count(&self) -> usize {
        self.proxies.len()
    }

    /// Proxies currently parented to `parent`.
    pub fn proxies_of(&self, parent: ObjectHandle) -> Vec<ProxyVisual> {
        let mut proxies: Vec<(ProxyHandle, ProxyVisual)> = self
            .proxies
            .iter()
            .filter_map(|(handle, entity)| self.world.get::<ProxyVisual>(*entity).map(|visual| (*handle, *visual)))
            .filter(|(_, visual)| visual.parent == parent)
            .collect();
        proxies.sort_by_key(|(handle, _)| *handle);
        proxies.into_iter().map(|(_, visual)| visual).collect()
    }

    fn with_proxy(&mut self, proxy: ProxyHandle, apply: impl FnOnce(&mut ProxyVisual)) {
        let Some(entity) = self.proxies.get(&proxy).copied() else {
            return;
        };
        if let Some(mut visual) = self.world.get_mut::<ProxyVisual>(entity) {
            apply(&mut visual);
        }
    }

    fn describe(&self, entity: Entity) -> Option<PhysicalObject> {
        let handle = self.world.get::<Handle>(entity)?.0;
        let path = self.world.get::<ObjectName>(entity)?.0.clone();
        let kind = if let Some(body) = self.world.get::<ColliderBody>(entity) {
            PhysicalKind::Collider(body.geometry)
        } else if let Some(body) = self.world.get::<AutoColliderBody>(entity) {
            let colliders = body
                .nested
                .iter()
                .filter_map(|nested| self.entity(nested.handle).and_then(|e| self.describe(e)))
                .collect();
            PhysicalKind::AutoCollider { params: body.params, colliders }
        } else if let Some(body) = self.world.get::<RigidbodyBody>(entity) {
            PhysicalKind::Rigidbody { detect_collisions: body.detect_collisions, colliders: body.colliders.clone() }
        } else {
            return None;
        };
        Some(PhysicalObject { handle, path, kind })
    }
}

impl SceneHost for EcsSceneHost {
    fn physical_objects(&self) -> Vec<PhysicalObject> {
        self.top_level.iter().filter_map(|entity| self.describe(*entity)).collect()
    }

    fn collider_geometry(&self, handle: ObjectHandle) -> Option<ColliderGeometry> {
        self.entity(handle).and_then(|e| self.world.get::<ColliderBody>(e)).map(|body| body.geometry)
    }

    fn set_collider_geometry(&mut self, handle: ObjectHandle, geometry: &ColliderGeometry) {
        if let Some(mut body) = self.entity(handle).and_then(|e| self.world.get_mut::<ColliderBody>(e)) {
            body.geometry = *geometry;
        }
    }

    fn set_auto_collider_params(&mut self, handle: ObjectHandle, params: &AutoColliderParams) {
        let Some(entity) = self.entity(handle) else {
            return;
        };
        let nested = match self.world.get_mut::<AutoColliderBody>(entity) {
            Some(mut body) => {
                body.params = *params;
                body.nested.clone()
            }
            None => return,
        };
        for collider in nested {
            let geometry = derive_nested(&collider.base, params);
            self.set_collider_geometry(collider.handle, &geometry);
        }
    }

    fn set_detect_collisions(&mut self, handle: ObjectHandle, enabled: bool) {
        if let Some(mut body) = self.entity(handle).and_then(|e| self.world.get_mut::<RigidbodyBody>(e)) {
            body.detect_collisions = enabled;
        }
    }

    fn create_proxy(&mut self, shape: ProxyShape, parent: ObjectHandle) -> Option<ProxyHandle> {
        self.entity(parent)?;
        self.next_proxy = self.next_proxy.wrapping_add(1);
        let proxy = ProxyHandle(self.next_proxy);
        let entity = self
            .world
            .spawn(ProxyVisual {
                shape,
                parent,
                transform: ProxyTransform::default(),
                color: Vec4::ONE,
                xray: false,
                visible: true,
            })
            .id();
        self.proxies.insert(proxy, entity);
        Some(proxy)
    }

    fn set_proxy_transform(&mut self, proxy: ProxyHandle, transform: &ProxyTransform) {
        self.with_proxy(proxy, |visual| visual.transform = *transform);
    }

    fn set_proxy_color(&mut self, proxy: ProxyHandle, color: Vec4) {
        self.with_proxy(proxy, |visual| visual.color = color);
    }

    fn set_proxy_xray(&mut self, proxy: ProxyHandle, xray: bool) {
        self.with_proxy(proxy, |visual| visual.xray = xray);
    }

    fn set_proxy_visible(&mut self, proxy: ProxyHandle, visible: bool) {
        self.with_proxy(proxy, |visual| visual.visible = visible);
    }

    fn destroy_proxy(&mut self, proxy: ProxyHandle) {
        if let Some(entity) = self.proxies.remove(&proxy) {
            self.world.despawn(entity);
        }
    }
}

const fn default_detect_collisions() -> bool {
    true
}

/// JSON description of a scene for [`EcsSceneHost::from_manifest`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneManifest {
    #[serde(default)]
    pub objects: Vec<ManifestObject>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ManifestObject {
    Collider {
        path: String,
        geometry: ColliderGeometry,
    },
    AutoCollider {
        path: String,
        #[serde(default)]
        params: AutoColliderParams,
        #[serde(default)]
        colliders: Vec<ManifestCollider>,
    },
    Rigidbody {
        path: String,
        #[serde(default = "default_detect_collisions")]
        detect_collisions: bool,
        /// Paths of attached colliders, standalone or nested.
        #[serde(default)]
        colliders: Vec<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestCollider {
    pub path: String,
    pub geometry: ColliderGeometry,
}

impl SceneManifest {
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).with_context(|| format!("Reading scene manifest {}", path.display()))?;
        serde_json::from_slice(&bytes).with_context(|| format!("Parsing scene manifest {}", path.display()))
    }
}
