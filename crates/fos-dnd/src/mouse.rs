//! Synthesized mouse events

use std::time::Instant;

use fos_dom::IntPoint;

use crate::drag_data::{DragData, Modifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    None,
    Left,
    Middle,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEventKind {
    Moved,
    Pressed,
    Released,
}

/// Mouse event handed to script dispatch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlatformMouseEvent {
    /// Root frame coordinates
    pub position: IntPoint,
    /// Screen coordinates
    pub global_position: IntPoint,
    pub button: MouseButton,
    pub kind: MouseEventKind,
    pub modifiers: Modifiers,
    pub timestamp: Instant,
}

impl PlatformMouseEvent {
    pub fn new(position: IntPoint, global_position: IntPoint, kind: MouseEventKind, modifiers: Modifiers) -> Self {
        Self {
            position,
            global_position,
            button: MouseButton::Left,
            kind,
            modifiers,
            timestamp: Instant::now(),
        }
    }

    /// Left-button move at the drag position, as drag events carry
    pub fn for_drag(drag_data: &DragData) -> Self {
        Self::new(
            drag_data.client_position(),
            drag_data.global_position(),
            MouseEventKind::Moved,
            drag_data.modifiers(),
        )
    }
}
