//! Inspection and editing of a scene's physical-collision objects.
//!
//! [`registry::Registry`] models every collider, auto-collider pair and rigidbody
//! the [`host::SceneHost`] enumerates. [`filter`] narrows the catalog for display,
//! [`preset`] persists live state keyed by stable id and [`session::EditorSession`]
//! ties them together for a host UI.

pub mod cli;
pub mod config;
pub mod controls;
pub mod ecs_host;
pub mod editable;
pub mod error;
pub mod filter;
pub mod group;
pub mod host;
pub mod preset;
pub mod registry;
pub mod session;

pub use editable::{Editable, EditableId, EditableKind, FieldValue};
pub use registry::{LoadReport, Registry};
pub use session::EditorSession;
