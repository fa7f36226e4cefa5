//! Page
//!
//! Everything the drag controller needs from its page, passed in explicitly:
//! the document arena, settings, the drag caret and the embedder's
//! collaborators.

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use fos_dom::{DocumentId, Documents};

use crate::caret::DragCaret;
use crate::client::{ChromeClient, DragEventHandler, DragImageRenderer, Editor, FrameLoader, HitTester};
use crate::drag_data::DragData;
use crate::settings::Settings;

/// Embedder callback delivered from inside script dispatch
#[derive(Debug, Clone)]
pub enum NestedCallback {
    /// The pointer left the page while script was running
    DragExited { drag_data: DragData, local_root: DocumentId },
    /// The outgoing drag finished while script was running
    DragEnded,
}

/// Collaborators supplied by the embedder
pub struct PageClients {
    pub chrome: Box<dyn ChromeClient>,
    pub loader: Box<dyn FrameLoader>,
    pub hit_tester: Box<dyn HitTester>,
    pub events: Box<dyn DragEventHandler>,
    pub editor: Box<dyn Editor>,
    pub renderer: Box<dyn DragImageRenderer>,
}

/// Nesting depth of user gesture scopes
#[derive(Debug, Clone, Default)]
pub struct UserGestureState(Rc<Cell<u32>>);

impl UserGestureState {
    pub fn processing_user_gesture(&self) -> bool {
        self.0.get() > 0
    }

    /// Enter a gesture scope that lasts until the indicator is dropped
    pub fn indicator(&self) -> UserGestureIndicator {
        self.0.set(self.0.get() + 1);
        UserGestureIndicator(self.0.clone())
    }
}

/// Marks the code running while it is alive as user initiated
#[must_use]
pub struct UserGestureIndicator(Rc<Cell<u32>>);

impl Drop for UserGestureIndicator {
    fn drop(&mut self) {
        self.0.set(self.0.get().saturating_sub(1));
    }
}

/// Access handed to script while an event is dispatched
pub struct ScriptScope<'a> {
    pub documents: &'a mut Documents,
    nested_callbacks: &'a mut VecDeque<NestedCallback>,
    user_gesture: &'a UserGestureState,
}

impl ScriptScope<'_> {
    /// Deliver `dragExited` from a nested event loop
    pub fn post_drag_exited(&mut self, drag_data: DragData, local_root: DocumentId) {
        self.nested_callbacks.push_back(NestedCallback::DragExited { drag_data, local_root });
    }

    /// Deliver `dragEnded` from a nested event loop
    pub fn post_drag_ended(&mut self) {
        self.nested_callbacks.push_back(NestedCallback::DragEnded);
    }

    pub fn processing_user_gesture(&self) -> bool {
        self.user_gesture.processing_user_gesture()
    }
}

/// A page hosting documents
pub struct Page {
    pub documents: Documents,
    pub settings: Settings,
    pub drag_caret: DragCaret,
    main_frame: DocumentId,
    pub(crate) clients: PageClients,
    pub(crate) nested_callbacks: VecDeque<NestedCallback>,
    pub(crate) user_gesture: UserGestureState,
}

impl Page {
    pub fn new(documents: Documents, main_frame: DocumentId, settings: Settings, clients: PageClients) -> Self {
        Self {
            documents,
            settings,
            drag_caret: DragCaret::new(),
            main_frame,
            clients,
            nested_callbacks: VecDeque::new(),
            user_gesture: UserGestureState::default(),
        }
    }

    pub fn main_frame(&self) -> DocumentId {
        self.main_frame
    }

    pub fn processing_user_gesture(&self) -> bool {
        self.user_gesture.processing_user_gesture()
    }

    /// Run script dispatch with the DOM and the nested callback queue lent out
    pub(crate) fn with_script_scope<R>(
        &mut self,
        f: impl FnOnce(&mut dyn DragEventHandler, &mut ScriptScope<'_>) -> R,
    ) -> R {
        let Page { documents, clients, nested_callbacks, user_gesture, .. } = self;
        let mut scope = ScriptScope { documents, nested_callbacks, user_gesture };
        f(clients.events.as_mut(), &mut scope)
    }

    pub(crate) fn take_nested_callback(&mut self) -> Option<NestedCallback> {
        self.nested_callbacks.pop_front()
    }
}
