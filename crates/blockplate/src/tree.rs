//! The block tree.
//!
//! Blocks live in an [`indextree`] arena and are addressed by [`NodeId`].
//! Each block additionally keeps a name → id map of its direct children, so
//! address lookup is a chain of map lookups while subtree removal goes
//! through the arena's parent/child links.
//!
//! Three address resolution modes exist:
//!
//! | Mode | Used by | Missing block |
//! |------|---------|---------------|
//! | [`BlockTree::seek`] | binding, rendering, removal, inspection | `AddressNotFound` |
//! | [`BlockTree::seek_or_create`] | loading, [`create_block`](crate::Template::create_block) | created empty |
//! | [`BlockTree::detach`] | block removal | `AddressNotFound`, nothing created |

use std::collections::BTreeMap;

use blockplate_parser::ParsedBlock;
use indextree::{Arena, NodeId};

use crate::address::Address;
use crate::error::{Error, Result};
use crate::value::Record;

/// What a block's variables hold.
///
/// A block holds either one flat record (named values) or a record set
/// (positional rows), never a mix of the two.
#[derive(Debug, Clone, PartialEq)]
pub enum Variables {
    /// Named values substituted once into the block's code.
    Record(Record),
    /// Rows; the block's code is repeated once per row.
    RecordSet(Vec<Record>),
}

impl Default for Variables {
    fn default() -> Self {
        Variables::Record(Record::new())
    }
}

impl Variables {
    /// True when nothing is bound.
    pub fn is_empty(&self) -> bool {
        match self {
            Variables::Record(record) => record.is_empty(),
            Variables::RecordSet(rows) => rows.is_empty(),
        }
    }

    /// Number of named values or rows.
    pub fn len(&self) -> usize {
        match self {
            Variables::Record(record) => record.len(),
            Variables::RecordSet(rows) => rows.len(),
        }
    }

    /// True when the block repeats over rows.
    pub fn is_record_set(&self) -> bool {
        matches!(self, Variables::RecordSet(rows) if !rows.is_empty())
    }
}

/// A node of the block tree.
#[derive(Debug, Clone, Default)]
pub struct Block {
    /// Template code, quote-encoded, with child regions replaced by placeholders.
    pub(crate) code: String,
    /// Direct children by name.
    pub(crate) children: BTreeMap<String, NodeId>,
    /// Bound data.
    pub(crate) variables: Variables,
}

impl Block {
    fn with_code(code: String) -> Self {
        Self {
            code,
            ..Self::default()
        }
    }

    /// The block's (encoded) template code.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The block's bound variables.
    pub fn variables(&self) -> &Variables {
        &self.variables
    }
}

/// Arena-backed tree of blocks rooted at an unnamed block.
#[derive(Debug)]
pub(crate) struct BlockTree {
    arena: Arena<Block>,
    root: NodeId,
}

impl Default for BlockTree {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockTree {
    pub(crate) fn new() -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(Block::default());
        Self { arena, root }
    }

    pub(crate) fn root(&self) -> NodeId {
        self.root
    }

    pub(crate) fn block(&self, id: NodeId) -> &Block {
        self.arena[id].get()
    }

    pub(crate) fn block_mut(&mut self, id: NodeId) -> &mut Block {
        self.arena[id].get_mut()
    }

    /// Number of live blocks, including the root.
    pub(crate) fn len(&self) -> usize {
        self.root.descendants(&self.arena).count()
    }

    /// Resolves an address, failing if any segment is missing.
    pub(crate) fn seek(&self, address: &Address) -> Result<NodeId> {
        let mut current = self.root;
        for segment in address.segments() {
            current = *self
                .block(current)
                .children
                .get(segment)
                .ok_or_else(|| Error::AddressNotFound(address.to_string()))?;
        }
        Ok(current)
    }

    /// Resolves an address, creating empty blocks for missing segments.
    pub(crate) fn seek_or_create(&mut self, address: &Address) -> NodeId {
        let mut current = self.root;
        for segment in address.segments() {
            let existing = self.block(current).children.get(segment).copied();
            current = match existing {
                Some(child) => child,
                None => {
                    let child = self.arena.new_node(Block::default());
                    self.link(current, segment, child);
                    child
                }
            };
        }
        current
    }

    /// Replaces the code of `target` with the parsed code and attaches the
    /// parsed children, replacing same-named existing children.
    ///
    /// Variables and unrelated children of `target` are kept.
    pub(crate) fn graft(&mut self, target: NodeId, parsed: ParsedBlock) {
        self.block_mut(target).code = parsed.code;
        for (name, child) in parsed.children {
            let child_id = self.import(child);
            self.link(target, &name, child_id);
        }
    }

    /// Removes the block at `address` and its subtree.
    pub(crate) fn detach(&mut self, address: &Address) -> Result<()> {
        let (Some(parent), Some(name)) = (address.parent(), address.name()) else {
            return Err(Error::InvalidAddress {
                address: address.to_string(),
                reason: "the root block cannot be removed",
            });
        };

        let parent_id = self.seek(&parent)?;
        let child = self
            .block_mut(parent_id)
            .children
            .remove(name)
            .ok_or_else(|| Error::AddressNotFound(address.to_string()))?;
        child.remove_subtree(&mut self.arena);
        Ok(())
    }

    /// Drops every block and starts over with an empty root.
    pub(crate) fn clear(&mut self) {
        *self = Self::new();
    }

    /// Copies a parsed subtree into the arena, returning its root id.
    fn import(&mut self, parsed: ParsedBlock) -> NodeId {
        let id = self.arena.new_node(Block::with_code(parsed.code));
        for (name, child) in parsed.children {
            let child_id = self.import(child);
            self.link(id, &name, child_id);
        }
        id
    }

    /// Makes `child` the child of `parent` named `name`, dropping any
    /// previous child of that name together with its subtree.
    fn link(&mut self, parent: NodeId, name: &str, child: NodeId) {
        if let Some(previous) = self
            .block_mut(parent)
            .children
            .insert(name.to_string(), child)
        {
            previous.remove_subtree(&mut self.arena);
        }
        parent.append(child, &mut self.arena);
    }
}
