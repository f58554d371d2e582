//! Control surface boundary.
//!
//! Widget construction lives in the host UI. Editables describe the controls
//! they want with [`ControlSpec`] and keep the returned handles so they can
//! push values back silently every tick and tear the widgets down again.

use crate::editable::{EditableId, FieldValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    ResetToInitial,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControlKind {
    Slider { min: f32, max: f32, default: f32 },
    Toggle { default: bool },
    Button(ControlAction),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControlSpec {
    pub owner: EditableId,
    /// Field key the control edits. Empty for buttons.
    pub key: &'static str,
    pub label: String,
    pub kind: ControlKind,
    pub value: Option<FieldValue>,
}

/// Implemented by the host UI layer.
///
/// A change made by the operator is reported back by the host through
/// [`crate::registry::Registry::apply_control_change`]; values pushed with
/// [`ControlSurface::set_value_silently`] must not trigger that path.
pub trait ControlSurface {
    fn create_control(&mut self, spec: ControlSpec) -> ControlHandle;

    fn set_value_silently(&mut self, handle: ControlHandle, value: FieldValue);

    fn destroy_control(&mut self, handle: ControlHandle);
}

/// A surface that renders nothing. Used when the editor runs headless.
#[derive(Debug, Default)]
pub struct NullSurface {
    next: u32,
}

impl ControlSurface for NullSurface {
    fn create_control(&mut self, _spec: ControlSpec) -> ControlHandle {
        self.next = self.next.wrapping_add(1);
        ControlHandle(self.next)
    }

    fn set_value_silently(&mut self, _handle: ControlHandle, _value: FieldValue) {}

    fn destroy_control(&mut self, _handle: ControlHandle) {}
}

/// Handles of the controls one editable currently shows.
#[derive(Debug, Default)]
pub struct ControlSet {
    bound: Vec<(ControlHandle, &'static str)>,
    shown: bool,
}

impl ControlSet {
    pub fn is_shown(&self) -> bool {
        self.shown
    }

    pub fn len(&self) -> usize {
        self.bound.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bound.is_empty()
    }

    pub fn mark_shown(&mut self) {
        self.shown = true;
    }

    pub fn push(&mut self, handle: ControlHandle, key: &'static str) {
        self.bound.push((handle, key));
        self.shown = true;
    }

    pub fn bindings(&self) -> impl Iterator<Item = (ControlHandle, &'static str)> + '_ {
        self.bound.iter().copied().filter(|(_, key)| !key.is_empty())
    }

    pub fn clear(&mut self, ui: &mut dyn ControlSurface) {
        for (handle, _) in self.bound.drain(..) {
            ui.destroy_control(handle);
        }
        self.shown = false;
    }
}

/// Records everything pushed to it. Handy for tests and for tooling that
/// wants to inspect what an editable would display.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    next: u32,
    pub live: Vec<(ControlHandle, ControlSpec)>,
    pub silent_updates: usize,
    pub destroyed: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn controls_for(&self, owner: &str) -> Vec<&ControlSpec> {
        self.live.iter().filter(|(_, spec)| spec.owner.as_str() == owner).map(|(_, spec)| spec).collect()
    }

    pub fn value_of(&self, owner: &str, key: &str) -> Option<FieldValue> {
        self.live
            .iter()
            .find(|(_, spec)| spec.owner.as_str() == owner && spec.key == key)
            .and_then(|(_, spec)| spec.value)
    }
}

impl ControlSurface for RecordingSurface {
    fn create_control(&mut self, spec: ControlSpec) -> ControlHandle {
        self.next = self.next.wrapping_add(1);
        let handle = ControlHandle(self.next);
        self.live.push((handle, spec));
        handle
    }

    fn set_value_silently(&mut self, handle: ControlHandle, value: FieldValue) {
        if let Some((_, spec)) = self.live.iter_mut().find(|(h, _)| *h == handle) {
            spec.value = Some(value);
            self.silent_updates += 1;
        }
    }

    fn destroy_control(&mut self, handle: ControlHandle) {
        if let Some(pos) = self.live.iter().position(|(h, _)| *h == handle) {
            self.live.remove(pos);
            self.destroyed += 1;
        }
    }
}
