//! Result of one drag-over evaluation

use crate::operation::DragOperation;

/// What the page would do with the drag at its current position
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DragSession {
    pub operation: DragOperation,
    pub mouse_is_over_file_input: bool,
    pub number_of_items_to_be_accepted: usize,
}

impl DragSession {
    /// The drop would be accepted
    pub fn is_accepted(&self) -> bool {
        !self.operation.is_empty()
    }
}
