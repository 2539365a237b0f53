use serde::{Deserialize, Serialize};

use crate::editing::policy;
use crate::editing::scheduler::FocusQueue;
use crate::editing::{BlockId, Document};

/// Keyboard input as reported by the rendering surface.
///
/// Only the two structurally significant keys are distinguished; everything
/// else travels as `Other` and is handed back to the host's generic hook
/// (formatting shortcuts live there, outside this engine).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    /// The confirmation key (Enter / Return).
    Enter,
    /// Backward delete (Backspace).
    Backspace,
    /// Any other key, carried by name.
    Other(String),
}

/// Modifier state accompanying a key event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Shift turns the confirmation key into a soft newline and is never
    /// structural.
    pub shift: bool,
}

/// What the confirmation key does while a block is focused.
///
/// The two policies observed in the wild for the same concept: the full
/// notes editor splits the current block, while the dashboard's single-block
/// editor forwards confirmation to the generic handler and only
/// backward-delete merges blocks. Both are supported explicitly;
/// `SplitBlock` is the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmPolicy {
    #[default]
    #[serde(rename = "split")]
    SplitBlock,
    Passthrough,
}

/// Outbound instruction to the rendering surface, returned synchronously
/// from an inbound event. Focus moves are never returned this way; they go
/// through the deferred [`FocusQueue`] because their target element only
/// exists after the next render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceRequest {
    /// Place the cursor at the start of the block's content region. Purely
    /// presentational; emitted when focus enters a visibly empty block.
    CursorToStart(BlockId),
    /// Content length changed; the surface should recompute its own layout.
    Resize(BlockId),
}

/// How a key event was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    /// The block was split; the new block's id has been focus-scheduled.
    Split { new_block: BlockId },
    /// The empty block was removed; its predecessor has been
    /// focus-scheduled.
    Merged { focus: BlockId },
    /// The event was consumed with no structural change.
    Suppressed,
    /// Not an engine concern; forward to the host's generic key hook.
    Passthrough,
}

/// The focus coordinator for one open document.
///
/// Tracks which single block (if any) is being edited and buffers its
/// in-progress content separately from the committed document. The buffer
/// does not delay persistence: content is committed on every change event.
/// It exists so the "currently displayed" value used for emptiness and
/// label computation can momentarily diverge from committed state.
///
/// One session per document instance; entering focus on a new block
/// implicitly ends any previous focus. The session never merges two pending
/// buffers, so the surface's blur handling must have committed the previous
/// block before reporting a new focus (commit-on-change makes this hold
/// even when the blur event itself is lost).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct EditSession {
    focus: Option<BlockId>,
    pending: String,
    confirm_policy: ConfirmPolicy,
    focus_queue: FocusQueue,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_confirm_policy(confirm_policy: ConfirmPolicy) -> Self {
        Self {
            confirm_policy,
            ..Self::default()
        }
    }

    /// The currently focused block, if any.
    pub fn focused(&self) -> Option<BlockId> {
        self.focus
    }

    pub fn confirm_policy(&self) -> ConfirmPolicy {
        self.confirm_policy
    }

    /// The live content of a block: the pending buffer while the block is
    /// focused, the committed content otherwise. `None` for stale ids.
    pub fn live_content<'a>(&'a self, doc: &'a Document, id: BlockId) -> Option<&'a str> {
        if self.focus == Some(id) {
            Some(&self.pending)
        } else {
            doc.get(id).map(|block| block.content.as_str())
        }
    }

    /// The surface reported that block `id` gained focus.
    ///
    /// Initializes the pending buffer from the block's committed content.
    /// If the block's visible text is empty, additionally asks the surface
    /// to place the cursor at the start of the content region.
    pub fn on_focus(&mut self, doc: &Document, id: BlockId) -> Option<SurfaceRequest> {
        let Some(block) = doc.get(id) else {
            // Stale id, likely raced with a deletion; ignore the event.
            return None;
        };
        self.focus = Some(id);
        self.pending = block.content.clone();
        if policy::text_is_empty(&self.pending) {
            Some(SurfaceRequest::CursorToStart(id))
        } else {
            None
        }
    }

    /// The surface reported new content for block `id`.
    ///
    /// The pending buffer is updated and the document is committed
    /// immediately, on every change rather than on blur. The returned
    /// resize request tells the surface the content length changed.
    pub fn on_content_change(
        &mut self,
        doc: &mut Document,
        id: BlockId,
        content: &str,
    ) -> Option<SurfaceRequest> {
        if self.focus == Some(id) {
            self.pending = content.to_string();
        }
        match doc.set_content(id, content) {
            Ok(()) => Some(SurfaceRequest::Resize(id)),
            Err(_) => None, // stale id, ignore
        }
    }

    /// The surface reported that block `id` lost focus.
    ///
    /// Commits the pending buffer once more (idempotent when
    /// commit-on-change already ran) and clears it.
    pub fn on_blur(&mut self, doc: &mut Document, id: BlockId) {
        if self.focus != Some(id) {
            return;
        }
        let _ = doc.set_content(id, self.pending.as_str());
        self.focus = None;
        self.pending.clear();
    }

    /// Resolve a key event against the document.
    ///
    /// `caret` is the cursor position (a byte offset into the block's live
    /// content) reported by the surface; it is clamped to the nearest valid
    /// boundary. Structural mutations schedule their focus target on the
    /// deferred queue rather than focusing inline.
    pub fn on_key_down(
        &mut self,
        doc: &mut Document,
        id: BlockId,
        key: Key,
        modifiers: Modifiers,
        caret: usize,
    ) -> KeyDisposition {
        if !doc.contains(id) {
            return KeyDisposition::Suppressed;
        }
        match key {
            Key::Enter => self.handle_confirm(doc, id, modifiers, caret),
            Key::Backspace => self.handle_backward_delete(doc, id),
            Key::Other(_) => KeyDisposition::Passthrough,
        }
    }

    /// Confirmation splits the focused block at the caret, unless shift
    /// requests a soft newline or the policy forwards confirmation to the
    /// generic handler.
    fn handle_confirm(
        &mut self,
        doc: &mut Document,
        id: BlockId,
        modifiers: Modifiers,
        caret: usize,
    ) -> KeyDisposition {
        if modifiers.shift || self.confirm_policy == ConfirmPolicy::Passthrough {
            return KeyDisposition::Passthrough;
        }

        let live = self
            .live_content(doc, id)
            .expect("presence checked by on_key_down")
            .to_string();
        let at = clamp_to_char_boundary(&live, caret);
        let (retained, carried) = live.split_at(at);

        let new_block = match doc.split(id, retained, carried) {
            Ok(new_block) => new_block,
            Err(_) => return KeyDisposition::Suppressed,
        };
        if self.focus == Some(id) {
            // Keep the buffer in step with what the block now holds, so
            // emptiness reads correctly until focus actually moves.
            self.pending = retained.to_string();
        }
        self.focus_queue.push(new_block);
        KeyDisposition::Split { new_block }
    }

    /// Backward delete merges an empty block into its predecessor: the
    /// block is removed and focus returns to the block before it. The first
    /// block, the sole remaining block, and non-empty blocks are left
    /// alone.
    fn handle_backward_delete(&mut self, doc: &mut Document, id: BlockId) -> KeyDisposition {
        let live = self
            .live_content(doc, id)
            .expect("presence checked by on_key_down");
        if !policy::text_is_empty(live) {
            return KeyDisposition::Passthrough;
        }

        let index = doc.index_of(id).expect("presence checked by on_key_down");
        if index == 0 || doc.len() == 1 {
            return KeyDisposition::Suppressed;
        }

        let focus = match doc.delete_at(index) {
            Ok(focus) => focus,
            Err(_) => return KeyDisposition::Suppressed,
        };
        if self.focus == Some(id) {
            self.focus = None;
            self.pending.clear();
        }
        self.focus_queue.push(focus);
        KeyDisposition::Merged { focus }
    }

    /// Take every deferred focus request whose target still exists. The
    /// host calls this strictly after its render commits, then tells the
    /// surface to focus the returned blocks in order.
    pub fn drain_deferred_focus(&mut self, doc: &Document) -> Vec<BlockId> {
        self.focus_queue.drain(doc)
    }

    /// Whether any focus request is waiting for the next render.
    pub fn has_deferred_focus(&self) -> bool {
        !self.focus_queue.is_empty()
    }
}

/// Clamp `at` to `text`'s length and back off to the nearest UTF-8 char
/// boundary, so caret positions reported by the surface can never slice
/// mid-character.
fn clamp_to_char_boundary(text: &str, at: usize) -> usize {
    let mut at = at.min(text.len());
    while at > 0 && !text.is_char_boundary(at) {
        at -= 1;
    }
    at
}
