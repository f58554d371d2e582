use collider_editor::controls::{ControlKind, NullSurface, RecordingSurface};
use collider_editor::ecs_host::EcsSceneHost;
use collider_editor::editable::preview::HIGHLIGHT_COLOR;
use collider_editor::editable::{AutoColliderResetMode, FieldSet};
use collider_editor::group::GroupClassifier;
use collider_editor::host::{AutoColliderParams, CapsuleAxis, ColliderGeometry, SceneHost};
use collider_editor::{Editable, FieldValue, Registry};
use glam::Vec3;

fn scene() -> EcsSceneHost {
    let mut host = EcsSceneHost::new();
    let head = host.spawn_collider("head/head", ColliderGeometry::Sphere { radius: 0.1, center: Vec3::ZERO });
    host.spawn_collider(
        "chest/chest1",
        ColliderGeometry::Capsule { radius: 0.1, height: 0.4, center: Vec3::ZERO, axis: CapsuleAxis::Z },
    );
    host.spawn_collider("hip/pelvis", ColliderGeometry::Box { half_extents: Vec3::splat(0.1), center: Vec3::ZERO });
    let base = ColliderGeometry::Capsule { radius: 0.05, height: 0.3, center: Vec3::ZERO, axis: CapsuleAxis::Y };
    host.spawn_auto_collider(
        "AutoColliders/rThigh",
        AutoColliderParams { length_buffer: 0.02, radius_buffer: 0.01, radius_multiplier: 1.0 },
        &[("AutoColliders/rThigh/hard", base), ("AutoColliders/rThigh/joint", base)],
    );
    host.spawn_rigidbody("head", true, &[head]);
    host
}

fn build(host: &EcsSceneHost) -> Registry {
    Registry::build(host, GroupClassifier::default(), AutoColliderResetMode::AllFields).expect("registry builds")
}

/// Nudges every field of every editable away from its initial value.
fn edit_everything(registry: &mut Registry, host: &mut EcsSceneHost) {
    let targets: Vec<(String, Vec<(&'static str, FieldValue)>)> = registry
        .every_entity()
        .into_iter()
        .map(|entity| {
            let edits = entity
                .live_fields()
                .keys()
                .iter()
                .filter_map(|key| {
                    let value = match entity.field(key)? {
                        FieldValue::Float(value) => FieldValue::Float(value + 0.05),
                        FieldValue::Bool(value) => FieldValue::Bool(!value),
                    };
                    Some((*key, value))
                })
                .collect();
            (entity.id().to_string(), edits)
        })
        .collect();
    for (id, edits) in targets {
        for (key, value) in edits {
            assert!(registry.apply_control_change(&id, key, value, host), "{id}.{key}");
        }
    }
}

#[test]
fn reset_clears_every_modification() {
    let mut host = scene();
    let mut registry = build(&host);
    edit_everything(&mut registry, &mut host);
    assert!(registry.every_entity().iter().all(|entity| entity.deviates_from_initial()));

    let ids: Vec<String> = registry.every_entity().iter().map(|entity| entity.id().to_string()).collect();
    let mut ui = NullSurface::default();
    for id in &ids {
        assert!(registry.reset_one(id, &mut host, &mut ui));
        assert!(!registry.get(id).unwrap().deviates_from_initial(), "{id} still modified");
    }
}

#[test]
fn reset_writes_initial_values_back_to_the_host() {
    let mut host = scene();
    let mut registry = build(&host);
    edit_everything(&mut registry, &mut host);
    registry.reset_all(&mut host, &mut NullSurface::default());

    let head = registry.get("co:head/head").unwrap().meta().handle();
    assert_eq!(host.collider_geometry(head), Some(ColliderGeometry::Sphere { radius: 0.1, center: Vec3::ZERO }));
    let body = registry.get("rb:head").unwrap().meta().handle();
    assert_eq!(host.detect_collisions(body), Some(true));
    let pair = registry.get("au:AutoColliders/rThigh").unwrap().meta().handle();
    assert_eq!(
        host.auto_collider_params(pair),
        Some(AutoColliderParams { length_buffer: 0.02, radius_buffer: 0.01, radius_multiplier: 1.0 })
    );
}

#[test]
fn legacy_pair_reset_keeps_two_edits() {
    let mut host = scene();
    let mut registry =
        Registry::build(&host, GroupClassifier::default(), AutoColliderResetMode::RadiusBufferOnly).unwrap();
    let id = "au:AutoColliders/rThigh";
    registry.apply_control_change(id, "autoLengthBuffer", FieldValue::Float(0.1), &mut host);
    registry.apply_control_change(id, "autoRadiusBuffer", FieldValue::Float(0.1), &mut host);
    registry.reset_one(id, &mut host, &mut NullSurface::default());
    let pair = registry.get(id).unwrap();
    assert_eq!(pair.field("autoRadiusBuffer"), Some(FieldValue::Float(0.01)));
    assert_eq!(pair.field("autoLengthBuffer"), Some(FieldValue::Float(0.1)));
}

#[test]
fn reset_rebuilds_shown_controls_with_initial_values() {
    let mut host = scene();
    let mut registry = build(&host);
    let mut ui = RecordingSurface::new();
    registry.select(Some("co:chest/chest1"), &mut host, &mut ui);
    let shown = ui.live_count();
    assert_eq!(shown, 1 + 5, "reset button plus one control per capsule field");

    registry.apply_control_change("co:chest/chest1", "radius", FieldValue::Float(0.3), &mut host);
    registry.reset_one("co:chest/chest1", &mut host, &mut ui);
    assert_eq!(ui.live_count(), shown);
    assert_eq!(ui.value_of("co:chest/chest1", "radius"), Some(FieldValue::Float(0.1)));
    let radius = ui
        .controls_for("co:chest/chest1")
        .into_iter()
        .find(|spec| spec.key == "radius")
        .map(|spec| spec.kind.clone());
    assert_eq!(radius, Some(ControlKind::Slider { min: 0.0, max: 0.4, default: 0.1 }));
}

#[test]
fn creating_controls_twice_does_not_stack() {
    let mut host = scene();
    let mut registry = build(&host);
    let mut ui = RecordingSurface::new();
    registry.select(Some("au:AutoColliders/rThigh"), &mut host, &mut ui);
    let shown = ui.live_count();
    assert_eq!(shown, (1 + 3) + 2 * (1 + 5), "pair controls plus both nested capsules");
    let pair = registry.get_mut("au:AutoColliders/rThigh").unwrap();
    pair.create_controls(&mut ui);
    pair.create_controls(&mut ui);
    assert_eq!(ui.live_count(), shown);
    pair.destroy_controls(&mut ui);
    assert_eq!(ui.live_count(), 0);
}

#[test]
fn tick_pushes_values_silently() {
    let mut host = scene();
    let mut registry = build(&host);
    let mut ui = RecordingSurface::new();
    registry.tick(&mut host, &mut ui);
    assert_eq!(ui.silent_updates, 0, "nothing shown, nothing pushed");

    registry.select(Some("rb:head"), &mut host, &mut ui);
    registry.apply_control_change("rb:head", "detectCollisions", FieldValue::Bool(false), &mut host);
    registry.tick(&mut host, &mut ui);
    assert_eq!(ui.value_of("rb:head", "detectCollisions"), Some(FieldValue::Bool(false)));
    assert_eq!(ui.silent_updates, 1);
    assert!(registry.get("rb:head").unwrap().deviates_from_initial());
}

#[test]
fn previews_follow_show_and_teardown() {
    let mut host = scene();
    let mut registry = build(&host);
    let mut ui = NullSurface::default();
    assert_eq!(host.proxy_count(), 0, "proxies are created lazily");

    registry.set_preview_enabled(true, &mut host);
    assert_eq!(host.proxy_count(), 5, "three colliders and two nested colliders");
    let body = registry.get("rb:head").unwrap().meta().handle();
    assert!(host.proxies_of(body).is_empty());

    registry.set_preview_xray(false, &mut host);
    registry.set_preview_opacity(0.5, &mut host);
    assert!(registry.every_entity().iter().all(|entity| !entity.deviates_from_initial()));

    registry.set_preview_enabled(false, &mut host);
    assert_eq!(host.proxy_count(), 5, "disabling hides without destroying");
    let chest = registry.get("co:chest/chest1").unwrap().meta().handle();
    let proxy = host.proxies_of(chest)[0];
    assert!(!proxy.visible);
    assert!(!proxy.xray);

    registry.teardown(&mut host, &mut ui);
    assert_eq!(host.proxy_count(), 0);
}

#[test]
fn capsule_preview_tracks_live_geometry() {
    let mut host = scene();
    let mut registry = build(&host);
    registry.set_preview_enabled(true, &mut host);
    let chest = registry.get("co:chest/chest1").unwrap().meta().handle();

    registry.apply_control_change("co:chest/chest1", "height", FieldValue::Float(0.6), &mut host);
    registry.apply_control_change("co:chest/chest1", "centerY", FieldValue::Float(0.1), &mut host);
    let proxy = host.proxies_of(chest)[0];
    assert!((proxy.transform.scale - Vec3::new(0.2, 0.3, 0.2)).length() < 1e-6);
    assert!((proxy.transform.translation - Vec3::new(0.0, 0.1, 0.0)).length() < 1e-6);
    let rotated = proxy.transform.rotation * Vec3::Y;
    assert!((rotated - Vec3::Z).length() < 1e-5, "z-axis capsule is turned about the right axis");
}

#[test]
fn selecting_a_container_highlights_its_colliders() {
    let mut host = scene();
    let mut registry = build(&host);
    let mut ui = NullSurface::default();
    registry.set_preview_enabled(true, &mut host);

    registry.select(Some("au:AutoColliders/rThigh"), &mut host, &mut ui);
    let hard = registry.get("co:AutoColliders/rThigh/hard").unwrap().meta().handle();
    let color = host.proxies_of(hard)[0].color;
    assert_eq!(color.truncate(), HIGHLIGHT_COLOR);

    registry.select(Some("rb:head"), &mut host, &mut ui);
    let head = registry.get("co:head/head").unwrap().meta().handle();
    assert_eq!(host.proxies_of(head)[0].color.truncate(), HIGHLIGHT_COLOR);
    assert_ne!(host.proxies_of(hard)[0].color.truncate(), HIGHLIGHT_COLOR);

    registry.select(None, &mut host, &mut ui);
    assert_ne!(host.proxies_of(head)[0].color.truncate(), HIGHLIGHT_COLOR);
}

#[test]
fn rigidbody_actions_leave_referenced_colliders_alone() {
    let mut host = scene();
    let mut registry = build(&host);
    let mut ui = RecordingSurface::new();
    registry.set_preview_enabled(true, &mut host);
    registry.apply_control_change("co:head/head", "radius", FieldValue::Float(0.2), &mut host);
    registry.select(Some("co:head/head"), &mut host, &mut ui);

    let head = registry.get("co:head/head").unwrap().meta().handle();
    let proxy = registry.get("co:head/head").unwrap().preview().and_then(|preview| preview.proxy());
    let shown = ui.controls_for("co:head/head").len();
    assert!(proxy.is_some());

    let body = registry.get_mut("rb:head").unwrap();
    body.destroy_preview(&mut host);
    body.destroy_controls(&mut ui);
    assert!(registry.reset_one("rb:head", &mut host, &mut ui));

    assert_eq!(host.proxies_of(head).len(), 1);
    assert_eq!(host.proxy_count(), 5);
    assert!(host.proxy(proxy.unwrap()).is_some(), "same proxy, not a re-created one");
    assert_eq!(registry.get("co:head/head").unwrap().preview().and_then(|preview| preview.proxy()), proxy);
    assert_eq!(ui.controls_for("co:head/head").len(), shown);
    assert_eq!(ui.destroyed, 0);
    assert_eq!(registry.get("co:head/head").unwrap().field("radius"), Some(FieldValue::Float(0.2)));
}
