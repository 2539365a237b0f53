use std::collections::VecDeque;

use crate::editing::{BlockId, Document};

/// Queue of deferred focus requests.
///
/// A block created by a split, or exposed by a merge-by-delete, only exists
/// in the rendering surface after the next render pass, so focus cannot be
/// moved to it inside the event handler that performed the mutation. The
/// session pushes the target id here and the host drains the queue strictly
/// after its render commits.
///
/// A request whose target has since left the document (a rapid follow-up
/// mutation won the race) is dropped silently; the user has already moved
/// on, so this is not an error. There is no cancellation beyond that: at
/// most one structural mutation happens per input event, so in interactive
/// use the queue holds at most one entry when drained.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FocusQueue {
    queue: VecDeque<BlockId>,
}

impl FocusQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a focus request for execution after the current render.
    pub fn push(&mut self, id: BlockId) {
        self.queue.push_back(id);
    }

    /// Take every scheduled request whose target still exists in `doc`,
    /// in scheduling order. Vanished targets are discarded.
    pub fn drain(&mut self, doc: &Document) -> Vec<BlockId> {
        self.queue.drain(..).filter(|id| doc.contains(*id)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
