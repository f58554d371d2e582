use collider_editor::config::{EditorConfig, GroupConfig};
use collider_editor::controls::{ControlAction, RecordingSurface};
use collider_editor::ecs_host::{EcsSceneHost, SceneManifest};
use collider_editor::filter::{Choice, FilterQuery};
use collider_editor::session::{EditorSession, SessionStatusKind};
use collider_editor::{Editable, EditableId, FieldValue};
use serde_json::{Map, Value};
use std::time::{Duration, UNIX_EPOCH};

const SCENE: &str = r#"{
  "objects": [
    { "kind": "collider", "path": "head/head", "geometry": { "type": "sphere", "radius": 0.1 } },
    { "kind": "collider", "path": "chest/chest1",
      "geometry": { "type": "capsule", "radius": 0.12, "height": 0.4, "axis": "x" } },
    { "kind": "auto_collider", "path": "AutoColliders/lThigh",
      "params": { "length_buffer": 0.02, "radius_buffer": 0.01, "radius_multiplier": 1.0 },
      "colliders": [
        { "path": "AutoColliders/lThigh/hard",
          "geometry": { "type": "capsule", "radius": 0.06, "height": 0.4 } }
      ] },
    { "kind": "rigidbody", "path": "chest", "colliders": ["chest/chest1"] }
  ]
}"#;

fn host() -> EcsSceneHost {
    let manifest: SceneManifest = serde_json::from_str(SCENE).expect("scene manifest parses");
    EcsSceneHost::from_manifest(&manifest).expect("scene builds")
}

fn config(preset_dir: &std::path::Path) -> EditorConfig {
    let mut config = EditorConfig::default();
    config.presets.directory = preset_dir.to_path_buf();
    config
}

fn row_ids(session: &EditorSession) -> Vec<&str> {
    session.rows().iter().map(|row| row.id.as_str()).collect()
}

#[test]
fn fresh_session_starts_with_unset_filters() {
    let dir = tempfile::tempdir().unwrap();
    let mut host = host();
    let mut ui = RecordingSurface::new();
    let session = EditorSession::init(config(dir.path()), &mut host, &mut ui);
    assert_eq!(session.status().map(|status| status.kind), Some(SessionStatusKind::Info));
    assert!(session.rows().is_empty());
    assert_eq!(session.selected(), None);
    assert_eq!(session.type_choices(), ["Sphere", "Capsule", "AutoCollider", "Rigidbody"]);
    assert!(session.group_choices().contains(&"Chest"));
    assert_eq!(host.proxy_count(), 0, "previews are off by default");
}

#[test]
fn filter_changes_move_the_selection() {
    let dir = tempfile::tempdir().unwrap();
    let mut host = host();
    let mut ui = RecordingSurface::new();
    let mut session = EditorSession::init(config(dir.path()), &mut host, &mut ui);

    session.set_query(FilterQuery::everything(), &mut host, &mut ui);
    assert_eq!(row_ids(&session), ["co:head/head", "co:chest/chest1", "au:AutoColliders/lThigh", "rb:chest"]);
    assert_eq!(session.selected().map(EditableId::as_str), Some("co:head/head"));
    assert!(!ui.controls_for("co:head/head").is_empty());

    assert!(session.select(Some("rb:chest"), &mut host, &mut ui));
    session.set_type_filter(Choice::named("Rigidbody"), &mut host, &mut ui);
    assert_eq!(session.selected().map(EditableId::as_str), Some("rb:chest"), "selection survives");

    session.set_type_filter(Choice::named("Capsule"), &mut host, &mut ui);
    assert_eq!(session.selected().map(EditableId::as_str), Some("co:chest/chest1"));
    assert!(ui.controls_for("rb:chest").is_empty());

    session.set_search("nothing-matches-this", &mut host, &mut ui);
    assert!(session.rows().is_empty());
    assert_eq!(session.selected(), None);
    assert_eq!(ui.live_count(), 0);
}

#[test]
fn search_overrides_unset_filters() {
    let dir = tempfile::tempdir().unwrap();
    let mut host = host();
    let mut ui = RecordingSurface::new();
    let mut session = EditorSession::init(config(dir.path()), &mut host, &mut ui);
    session.set_search("capsule chest", &mut host, &mut ui);
    assert_eq!(row_ids(&session), ["co:chest/chest1"]);
    session.set_search("Search...", &mut host, &mut ui);
    assert!(session.rows().is_empty());
}

#[test]
fn modified_filter_tracks_edits_and_resets() {
    let dir = tempfile::tempdir().unwrap();
    let mut host = host();
    let mut ui = RecordingSurface::new();
    let mut session = EditorSession::init(config(dir.path()), &mut host, &mut ui);
    session.set_query(FilterQuery { modified_only: true, ..FilterQuery::everything() }, &mut host, &mut ui);
    assert!(session.rows().is_empty());

    let id = "au:AutoColliders/lThigh";
    assert!(session.apply_control_change(id, "autoLengthBuffer", FieldValue::Float(0.05), &mut host, &mut ui));
    assert_eq!(row_ids(&session), [id]);
    assert_eq!(session.selected().map(EditableId::as_str), Some(id));

    assert!(session.trigger_action(id, ControlAction::ResetToInitial, &mut host, &mut ui));
    assert!(session.rows().is_empty());
    assert_eq!(session.selected(), None);

    session.apply_control_change("co:head/head", "radius", FieldValue::Float(0.2), &mut host, &mut ui);
    session.reset_all(&mut host, &mut ui);
    assert!(session.rows().is_empty());
}

#[test]
fn preset_save_and_load_through_the_session() {
    let dir = tempfile::tempdir().unwrap();
    let mut host = host();
    let mut ui = RecordingSurface::new();
    let mut session = EditorSession::init(config(dir.path()), &mut host, &mut ui);
    assert_eq!(session.last_directory(), dir.path());

    session.apply_control_change("co:head/head", "radius", FieldValue::Float(0.2), &mut host, &mut ui);
    let target = dir.path().join("sub").join("tuned");
    let saved = session.save_preset(&target).expect("preset saves");
    assert_eq!(saved, dir.path().join("sub").join("tuned.colliders"));
    assert_eq!(session.status().map(|status| status.kind), Some(SessionStatusKind::Success));
    assert_eq!(session.last_directory(), dir.path().join("sub"));
    let suggested = session.suggested_preset_path(UNIX_EPOCH + Duration::from_secs(42));
    assert_eq!(suggested, dir.path().join("sub").join("42.colliders"));

    let mut other_host = self::host();
    let mut other_ui = RecordingSurface::new();
    let mut other = EditorSession::init(config(dir.path()), &mut other_host, &mut other_ui);
    let report = other.load_preset(&saved, &mut other_host, &mut other_ui).expect("preset loads");
    assert!(report.is_clean());
    let head = other.registry().unwrap().get("co:head/head").unwrap();
    assert_eq!(head.field("radius"), Some(FieldValue::Float(0.2)));

    session.refresh_presets();
    assert!(session.presets().entries().is_empty(), "library lists the configured directory only");
}

#[test]
fn broken_preset_applies_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.colliders");
    std::fs::write(&path, r#"{ "editables": { "co:head/head": { "radius": 0.5 } "#).unwrap();
    let mut host = host();
    let mut ui = RecordingSurface::new();
    let mut session = EditorSession::init(config(dir.path()), &mut host, &mut ui);
    assert!(session.load_preset(&path, &mut host, &mut ui).is_none());
    assert_eq!(session.status().map(|status| status.kind), Some(SessionStatusKind::Error));
    let head = session.registry().unwrap().get("co:head/head").unwrap();
    assert_eq!(head.field("radius"), Some(FieldValue::Float(0.1)));
}

#[test]
fn embedded_state_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let mut host = host();
    let mut ui = RecordingSurface::new();
    let mut session = EditorSession::init(config(dir.path()), &mut host, &mut ui);
    session.apply_control_change("rb:chest", "detectCollisions", FieldValue::Bool(false), &mut host, &mut ui);
    let mut state = Map::new();
    state.insert("unrelated".to_string(), Value::from(3));
    session.append_document(&mut state);
    assert!(state["editables"].is_object());

    let mut other_host = self::host();
    let mut other = EditorSession::init(config(dir.path()), &mut other_host, &mut ui);
    assert!(other.restore_document(&Map::new(), &mut other_host, &mut ui).is_none());
    let report = other.restore_document(&state, &mut other_host, &mut ui).expect("state restores");
    assert!(report.is_clean());
    let body = other.registry().unwrap().get("rb:chest").unwrap();
    assert_eq!(body.field("detectCollisions"), Some(FieldValue::Bool(false)));
}

#[test]
fn preview_settings_reach_every_collider() {
    let dir = tempfile::tempdir().unwrap();
    let mut host = host();
    let mut ui = RecordingSurface::new();
    let mut cfg = config(dir.path());
    cfg.preview.show = true;
    let mut session = EditorSession::init(cfg, &mut host, &mut ui);
    assert_eq!(host.proxy_count(), 3, "two colliders and one nested collider");

    session.set_preview_opacity(1.0, &mut host);
    session.set_xray(false, &mut host);
    session.tick(&mut host, &mut ui);
    let chest = host.find("chest/chest1").expect("chest collider exists");
    let proxy = host.proxies_of(chest)[0];
    assert!((proxy.color.w - 1.0).abs() < 1e-6);
    assert!(!proxy.xray);

    session.set_show_previews(false, &mut host);
    assert!(!host.proxies_of(chest)[0].visible);
    session.shutdown(&mut host, &mut ui);
    assert_eq!(host.proxy_count(), 0);
}

#[test]
fn failed_build_reports_and_stays_inert() {
    let dir = tempfile::tempdir().unwrap();
    let mut host = host();
    let mut ui = RecordingSurface::new();
    let mut cfg = config(dir.path());
    cfg.groups = vec![GroupConfig::new("Broken", "(unclosed")];
    let mut session = EditorSession::init(cfg, &mut host, &mut ui);
    assert!(session.registry().is_none());
    assert_eq!(session.status().map(|status| status.kind), Some(SessionStatusKind::Error));

    session.set_query(FilterQuery::everything(), &mut host, &mut ui);
    session.tick(&mut host, &mut ui);
    session.reset_all(&mut host, &mut ui);
    assert!(session.save_preset(dir.path().join("x")).is_none());
    assert!(session.rows().is_empty());
}

#[test]
fn duplicate_objects_fail_the_build() {
    let dir = tempfile::tempdir().unwrap();
    let mut host = EcsSceneHost::new();
    let sphere = collider_editor::host::ColliderGeometry::Sphere { radius: 0.1, center: glam::Vec3::ZERO };
    host.spawn_collider("head", sphere);
    host.spawn_collider("head", sphere);
    let mut ui = RecordingSurface::new();
    let session = EditorSession::init(config(dir.path()), &mut host, &mut ui);
    assert!(session.registry().is_none());
    let status = session.status().expect("status set");
    assert!(status.message.contains("co:head"), "{}", status.message);
}

#[test]
fn named_presets_land_in_the_library() {
    let dir = tempfile::tempdir().unwrap();
    let mut host = host();
    let mut ui = RecordingSurface::new();
    let mut session = EditorSession::init(config(dir.path()), &mut host, &mut ui);
    session.apply_control_change("co:head/head", "radius", FieldValue::Float(0.15), &mut host, &mut ui);

    let saved = session.save_preset_named("tuned body").expect("named preset saves");
    assert_eq!(saved, dir.path().join("tuned_body.colliders"));
    assert_eq!(session.last_directory(), dir.path());
    let names: Vec<&str> = session.presets().entries().iter().map(|entry| entry.name.as_str()).collect();
    assert_eq!(names, ["tuned_body"]);

    let mut other_host = self::host();
    let mut other = EditorSession::init(config(dir.path()), &mut other_host, &mut ui);
    let entry = &session.presets().entries()[0];
    other.load_preset(&entry.path, &mut other_host, &mut ui).expect("library entry loads");
    let head = other.registry().unwrap().get("co:head/head").unwrap();
    assert_eq!(head.field("radius"), Some(FieldValue::Float(0.15)));
}
