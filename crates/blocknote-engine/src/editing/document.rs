use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EditError;
use crate::registry::BlockKind;

/// Stable identifier for a block that survives document mutations.
///
/// Ids are random v4 UUIDs; uniqueness is the only hard requirement. The UI
/// keys its per-block widgets on these so focus can follow a block across
/// structural edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId(Uuid);

impl BlockId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One atomic editable unit of the document: a typed chunk of committed
/// rich-text markup. Content is never absent; an empty block holds the
/// empty string.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: BlockId,
    pub kind: BlockKind,
    pub content: String,
}

impl Block {
    /// Create an empty block of the given kind with a fresh id.
    pub fn new(kind: BlockKind) -> Self {
        Self::with_content(kind, "")
    }

    /// Create a block of the given kind holding `content`.
    pub fn with_content(kind: BlockKind, content: impl Into<String>) -> Self {
        Self {
            id: BlockId::new(),
            kind,
            content: content.into(),
        }
    }
}

/// The ordered sequence of blocks forming one note.
///
/// Insertion order is the rendering and navigation order. The document
/// exclusively owns its blocks and upholds two invariants across every
/// operation:
///
/// - length is at least 1 (the last block may be cleared, never removed)
/// - block ids are pairwise distinct
///
/// All mutations are synchronous and atomic: either the operation succeeds
/// and the document is valid, or it fails with [`EditError`] and the
/// document is unchanged. The version counter increments on each successful
/// mutation so hosts can cheaply detect change.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    blocks: Vec<Block>,
    version: u64,
}

impl Document {
    /// Create a document holding a single empty block of the given kind.
    pub fn new(kind: BlockKind) -> Self {
        Self {
            blocks: vec![Block::new(kind)],
            version: 0,
        }
    }

    /// Create a document from existing blocks.
    ///
    /// Fails if `blocks` is empty or contains duplicate ids, since either
    /// would break the document invariants from the start.
    pub fn from_blocks(blocks: Vec<Block>) -> Result<Self, EditError> {
        if blocks.is_empty() {
            return Err(EditError::InvariantViolation(
                "a document holds at least one block",
            ));
        }
        for (i, block) in blocks.iter().enumerate() {
            if blocks[..i].iter().any(|other| other.id == block.id) {
                return Err(EditError::InvariantViolation("block ids must be unique"));
            }
        }
        Ok(Self { blocks, version: 0 })
    }

    /// Insert `block` immediately after position `index`.
    ///
    /// `index` of `-1` means "before the first block". Valid range is
    /// `[-1, len - 1]`; anything else is a host programming error reported
    /// as [`EditError::IndexOutOfBounds`].
    pub fn insert_after(&mut self, index: isize, block: Block) -> Result<(), EditError> {
        let len = self.blocks.len();
        if index < -1 || index >= len as isize {
            return Err(EditError::IndexOutOfBounds { index, len });
        }
        if self.contains(block.id) {
            return Err(EditError::InvariantViolation("block ids must be unique"));
        }
        self.blocks.insert((index + 1) as usize, block);
        self.version += 1;
        Ok(())
    }

    /// Remove the block at `index` and return the id of the block that
    /// should receive focus afterwards: the one now at `max(index - 1, 0)`.
    ///
    /// Refuses to reduce the document below one block.
    pub fn delete_at(&mut self, index: usize) -> Result<BlockId, EditError> {
        let len = self.blocks.len();
        if index >= len {
            return Err(EditError::IndexOutOfBounds {
                index: index as isize,
                len,
            });
        }
        if len == 1 {
            return Err(EditError::InvariantViolation(
                "the last block may be cleared but never removed",
            ));
        }
        self.blocks.remove(index);
        self.version += 1;
        Ok(self.blocks[index.saturating_sub(1)].id)
    }

    /// Replace a block's committed content. Any string is accepted verbatim.
    pub fn set_content(&mut self, id: BlockId, content: impl Into<String>) -> Result<(), EditError> {
        let block = self
            .blocks
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(EditError::NotFound(id))?;
        block.content = content.into();
        self.version += 1;
        Ok(())
    }

    /// Replace a block's kind.
    pub fn set_kind(&mut self, id: BlockId, kind: BlockKind) -> Result<(), EditError> {
        let block = self
            .blocks
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(EditError::NotFound(id))?;
        block.kind = kind;
        self.version += 1;
        Ok(())
    }

    /// Replace a block's kind, parsing the kind from its stable name.
    pub fn set_kind_by_name(&mut self, id: BlockId, name: &str) -> Result<(), EditError> {
        let kind = BlockKind::from_name(name)?;
        self.set_kind(id, kind)
    }

    /// Split block `id` in two: commit `retained` to the block, then insert
    /// a new paragraph block holding `new_content` immediately after it.
    /// Returns the new block's id.
    pub fn split(
        &mut self,
        id: BlockId,
        retained: &str,
        new_content: &str,
    ) -> Result<BlockId, EditError> {
        let index = self.index_of(id).ok_or(EditError::NotFound(id))?;
        self.blocks[index].content = retained.to_string();
        let block = Block::with_content(BlockKind::Paragraph, new_content);
        let new_id = block.id;
        self.blocks.insert(index + 1, block);
        self.version += 1;
        Ok(new_id)
    }

    /// Number of blocks. Always at least 1, so there is no `is_empty`.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// The blocks in rendering order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Look up a block by id.
    pub fn get(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    /// Position of a block in the document, looked up fresh each time.
    pub fn index_of(&self, id: BlockId) -> Option<usize> {
        self.blocks.iter().position(|b| b.id == id)
    }

    /// Whether a block with this id is currently in the document.
    pub fn contains(&self, id: BlockId) -> bool {
        self.index_of(id).is_some()
    }

    /// Version counter, incremented on every successful mutation.
    pub fn version(&self) -> u64 {
        self.version
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(BlockKind::Paragraph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with(contents: &[(&str, BlockKind)]) -> Document {
        let blocks = contents
            .iter()
            .map(|(content, kind)| Block::with_content(*kind, *content))
            .collect();
        Document::from_blocks(blocks).unwrap()
    }

    // ============ Construction ============

    #[test]
    fn test_new_document_has_one_empty_block() {
        let doc = Document::new(BlockKind::Paragraph);
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.blocks()[0].content, "");
        assert_eq!(doc.blocks()[0].kind, BlockKind::Paragraph);
        assert_eq!(doc.version(), 0);
    }

    #[test]
    fn test_from_blocks_rejects_empty_input() {
        let err = Document::from_blocks(Vec::new()).unwrap_err();
        assert!(matches!(err, EditError::InvariantViolation(_)));
    }

    #[test]
    fn test_from_blocks_rejects_duplicate_ids() {
        let block = Block::new(BlockKind::Paragraph);
        let duplicate = block.clone();
        let err = Document::from_blocks(vec![block, duplicate]).unwrap_err();
        assert!(matches!(err, EditError::InvariantViolation(_)));
    }

    // ============ insert_after ============

    #[test]
    fn test_insert_after_minus_one_prepends() {
        let mut doc = doc_with(&[("first", BlockKind::Paragraph)]);
        let block = Block::with_content(BlockKind::Paragraph, "new first");
        doc.insert_after(-1, block).unwrap();
        assert_eq!(doc.blocks()[0].content, "new first");
        assert_eq!(doc.blocks()[1].content, "first");
    }

    #[test]
    fn test_insert_after_appends_at_last_index() {
        let mut doc = doc_with(&[("a", BlockKind::Paragraph), ("b", BlockKind::Paragraph)]);
        doc.insert_after(1, Block::with_content(BlockKind::Paragraph, "c"))
            .unwrap();
        assert_eq!(doc.blocks()[2].content, "c");
    }

    #[test]
    fn test_insert_after_rejects_out_of_range_index() {
        let mut doc = doc_with(&[("a", BlockKind::Paragraph)]);
        let before = doc.clone();

        let err = doc
            .insert_after(1, Block::new(BlockKind::Paragraph))
            .unwrap_err();
        assert_eq!(err, EditError::IndexOutOfBounds { index: 1, len: 1 });

        let err = doc
            .insert_after(-2, Block::new(BlockKind::Paragraph))
            .unwrap_err();
        assert_eq!(err, EditError::IndexOutOfBounds { index: -2, len: 1 });

        // Failed operations leave the document unchanged
        assert_eq!(doc, before);
    }

    // ============ delete_at ============

    #[test]
    fn test_delete_at_returns_predecessor_id() {
        let mut doc = doc_with(&[
            ("a", BlockKind::Paragraph),
            ("b", BlockKind::Paragraph),
            ("c", BlockKind::Paragraph),
        ]);
        let a_id = doc.blocks()[0].id;

        let focus = doc.delete_at(1).unwrap();

        assert_eq!(focus, a_id);
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.blocks()[0].content, "a");
        assert_eq!(doc.blocks()[1].content, "c");
    }

    #[test]
    fn test_delete_at_first_block_focuses_new_first() {
        let mut doc = doc_with(&[("a", BlockKind::Paragraph), ("b", BlockKind::Paragraph)]);
        let b_id = doc.blocks()[1].id;

        let focus = doc.delete_at(0).unwrap();

        assert_eq!(focus, b_id);
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_delete_at_refuses_last_block() {
        let mut doc = doc_with(&[("only", BlockKind::Paragraph)]);
        let before = doc.clone();

        let err = doc.delete_at(0).unwrap_err();

        assert!(matches!(err, EditError::InvariantViolation(_)));
        assert_eq!(doc, before, "failed delete must not change the document");
    }

    #[test]
    fn test_delete_at_rejects_out_of_range_index() {
        let mut doc = doc_with(&[("a", BlockKind::Paragraph), ("b", BlockKind::Paragraph)]);
        let err = doc.delete_at(2).unwrap_err();
        assert_eq!(err, EditError::IndexOutOfBounds { index: 2, len: 2 });
    }

    // ============ set_content / set_kind ============

    #[test]
    fn test_set_content_replaces_committed_content() {
        let mut doc = doc_with(&[("old", BlockKind::Paragraph)]);
        let id = doc.blocks()[0].id;

        doc.set_content(id, "new").unwrap();

        assert_eq!(doc.get(id).unwrap().content, "new");
    }

    #[test]
    fn test_set_content_accepts_any_string_verbatim() {
        let mut doc = doc_with(&[("", BlockKind::Paragraph)]);
        let id = doc.blocks()[0].id;

        let weird = "<b>unclosed <br> &nbsp; \u{1F980}";
        doc.set_content(id, weird).unwrap();

        assert_eq!(doc.get(id).unwrap().content, weird);
    }

    #[test]
    fn test_set_content_on_stale_id_is_not_found() {
        let mut doc = doc_with(&[("a", BlockKind::Paragraph), ("b", BlockKind::Paragraph)]);
        let stale = doc.blocks()[1].id;
        doc.delete_at(1).unwrap();

        let err = doc.set_content(stale, "x").unwrap_err();

        assert_eq!(err, EditError::NotFound(stale));
    }

    #[test]
    fn test_set_kind_changes_type_in_place() {
        let mut doc = doc_with(&[("title", BlockKind::Paragraph)]);
        let id = doc.blocks()[0].id;

        doc.set_kind(id, BlockKind::Heading1).unwrap();

        assert_eq!(doc.get(id).unwrap().kind, BlockKind::Heading1);
        assert_eq!(doc.get(id).unwrap().content, "title");
    }

    #[test]
    fn test_set_kind_by_name_rejects_unknown_name() {
        let mut doc = doc_with(&[("a", BlockKind::Paragraph)]);
        let id = doc.blocks()[0].id;

        let err = doc.set_kind_by_name(id, "callout").unwrap_err();

        assert_eq!(err, EditError::UnknownType("callout".to_string()));
    }

    // ============ split ============

    #[test]
    fn test_split_divides_block_in_two() {
        let mut doc = doc_with(&[("ABCD", BlockKind::Paragraph)]);
        let id = doc.blocks()[0].id;

        let new_id = doc.split(id, "AB", "CD").unwrap();

        assert_eq!(doc.len(), 2);
        assert_eq!(doc.blocks()[0].id, id);
        assert_eq!(doc.blocks()[0].content, "AB");
        assert_eq!(doc.blocks()[1].id, new_id);
        assert_eq!(doc.blocks()[1].content, "CD");
    }

    #[test]
    fn test_split_always_produces_paragraph() {
        let mut doc = doc_with(&[("Heading", BlockKind::Heading2)]);
        let id = doc.blocks()[0].id;

        let new_id = doc.split(id, "Head", "ing").unwrap();

        assert_eq!(doc.blocks()[0].kind, BlockKind::Heading2);
        assert_eq!(doc.get(new_id).unwrap().kind, BlockKind::Paragraph);
    }

    #[test]
    fn test_split_on_stale_id_is_not_found() {
        let mut doc = doc_with(&[("a", BlockKind::Paragraph), ("b", BlockKind::Paragraph)]);
        let stale = doc.blocks()[1].id;
        doc.delete_at(1).unwrap();
        let before = doc.clone();

        let err = doc.split(stale, "x", "y").unwrap_err();

        assert_eq!(err, EditError::NotFound(stale));
        assert_eq!(doc, before);
    }

    // ============ Invariants across operation sequences ============

    #[test]
    fn test_length_and_id_invariants_hold_across_mixed_operations() {
        let mut doc = Document::new(BlockKind::Paragraph);

        let assert_invariants = |doc: &Document| {
            assert!(doc.len() >= 1, "document must never be empty");
            for (i, block) in doc.blocks().iter().enumerate() {
                for other in &doc.blocks()[..i] {
                    assert_ne!(block.id, other.id, "block ids must be pairwise distinct");
                }
            }
        };

        let first = doc.blocks()[0].id;
        doc.set_content(first, "one two").unwrap();
        assert_invariants(&doc);

        let second = doc.split(first, "one", "two").unwrap();
        assert_invariants(&doc);

        doc.insert_after(1, Block::with_content(BlockKind::Heading1, "h"))
            .unwrap();
        assert_invariants(&doc);

        doc.split(second, "tw", "o").unwrap();
        assert_invariants(&doc);

        while doc.len() > 1 {
            doc.delete_at(doc.len() - 1).unwrap();
            assert_invariants(&doc);
        }

        assert!(doc.delete_at(0).is_err());
        assert_invariants(&doc);
    }

    #[test]
    fn test_version_increments_only_on_successful_mutation() {
        let mut doc = doc_with(&[("a", BlockKind::Paragraph)]);
        let version = doc.version();

        assert!(doc.delete_at(0).is_err());
        assert_eq!(doc.version(), version);

        let id = doc.blocks()[0].id;
        doc.set_content(id, "b").unwrap();
        assert_eq!(doc.version(), version + 1);
    }
}
