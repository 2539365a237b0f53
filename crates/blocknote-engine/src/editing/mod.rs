/*!
 * # Block editing core
 *
 * The editing engine for one open note: an ordered sequence of typed
 * content blocks plus the focus machinery around it.
 *
 * ## Architecture
 *
 * ### 1. Single owner: the block sequence
 * - The whole note lives in one [`Document`]: a `Vec` of [`Block`]s in
 *   rendering and navigation order
 * - Blocks carry a stable random [`BlockId`]; the UI keys widgets on ids,
 *   never on positions, and looks indices up fresh on every operation
 * - Two invariants hold across every mutation: the document never drops
 *   below one block, and ids stay pairwise distinct
 *
 * ### 2. Event-driven editing
 * - The rendering surface reports focus, blur, content-change and key
 *   events to the [`EditSession`], which resolves them into document
 *   operations
 * - Content is committed on every change event, not on blur; the session's
 *   pending buffer only exists so the displayed value can diverge from
 *   committed state for emptiness and label computation
 * - The confirmation key splits the focused block in two; backward delete
 *   on an empty block merges it away and returns focus to its predecessor
 *
 * ### 3. Deferred focus
 * - A block created by a structural edit exists in the surface only after
 *   the next render, so focus moves are queued on a [`FocusQueue`] and
 *   drained by the host strictly after its render commits
 * - Requests whose target has vanished in the meantime are dropped
 *   silently
 *
 * ### 4. Read API: derived snapshots
 * - [`policy::snapshot`] projects document plus session state into an
 *   immutable [`Snapshot`] of per-block render facts (live content,
 *   emptiness, empty-state label, heading-adjacent spacing, menu
 *   affordance)
 * - The surface renders from snapshots and never mutates the model
 *   directly
 *
 * ## Usage pattern
 *
 * ```rust
 * use blocknote_engine::editing::{EditSession, Key, Modifiers};
 * use blocknote_engine::editing::{Document, policy};
 * use blocknote_engine::registry::BlockKind;
 *
 * let mut doc = Document::new(BlockKind::Paragraph);
 * let mut session = EditSession::new();
 * let first = doc.blocks()[0].id;
 *
 * // Surface events drive the model
 * session.on_focus(&doc, first);
 * session.on_content_change(&mut doc, first, "Hello world");
 * session.on_key_down(&mut doc, first, Key::Enter, Modifiers::default(), 5);
 *
 * // Render from the derived snapshot...
 * let snap = policy::snapshot(&doc, &session, None);
 * assert_eq!(snap.blocks.len(), 2);
 *
 * // ...then, after the render has committed, honor deferred focus
 * for id in session.drain_deferred_focus(&doc) {
 *     session.on_focus(&doc, id);
 * }
 * ```
 */

pub mod document;
pub mod policy;
pub mod scheduler;
pub mod session;

pub use document::{Block, BlockId, Document};
pub use policy::{RenderBlock, Snapshot};
pub use scheduler::FocusQueue;
pub use session::{ConfirmPolicy, EditSession, Key, KeyDisposition, Modifiers, SurfaceRequest};
