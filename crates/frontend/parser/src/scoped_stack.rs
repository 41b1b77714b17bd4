//! A stack partitioned into nested scopes.
//!
//! The AST builder pushes one fragment per completed construct and opens a
//! scope where a variable-length list starts (a compound statement body, a
//! parameter list, a declarator's pointer operators). Closing the scope pops
//! every item pushed since it was opened, in push order.

use crate::ast::NodeId;
use crate::token_map::MappedToken;

/// Entry of the AST builder stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Node(NodeId),
    Token(MappedToken),
    /// An optional construct that was absent; consumed as `None`
    PlaceHolder,
    /// A construct that is required but empty, e.g. an abstract declarator name
    Empty,
}

impl Fragment {
    pub const fn node(&self) -> Option<NodeId> {
        match self {
            Self::Node(id) => Some(*id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedStack<T> {
    items: Vec<T>,
    /// Length of `items` when each open scope started
    markers: Vec<usize>,
}

impl<T> Default for ScopedStack<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            markers: Vec::new(),
        }
    }
}

/// Saved stack shape, restored by [`ScopedStack::rollback`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    items: usize,
    markers: usize,
}

impl<T> ScopedStack<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Pops the top item unless that would cross into an enclosing scope
    pub fn pop(&mut self) -> Option<T> {
        if self.items.len() <= self.scope_start() {
            return None;
        }
        self.items.pop()
    }

    pub fn peek(&self) -> Option<&T> {
        if self.items.len() <= self.scope_start() {
            return None;
        }
        self.items.last()
    }

    pub fn open_scope(&mut self) {
        self.markers.push(self.items.len());
    }

    /// Pops every item of the innermost scope, oldest first
    pub fn close_scope(&mut self) -> Option<Vec<T>> {
        let start = self.markers.pop()?;
        Some(self.items.split_off(start))
    }

    /// Items of the innermost scope, oldest first
    pub fn top_scope(&self) -> &[T] {
        &self.items[self.scope_start()..]
    }

    pub fn scope_depth(&self) -> usize {
        self.markers.len()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            items: self.items.len(),
            markers: self.markers.len(),
        }
    }

    /// Discards everything pushed or opened since `checkpoint`.
    ///
    /// Scopes closed since the checkpoint stay closed; the driver only rolls
    /// back across constructs that leave the scope depth unchanged.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        self.markers.truncate(checkpoint.markers);
        self.items.truncate(checkpoint.items);
    }

    fn scope_start(&self) -> usize {
        self.markers.last().copied().unwrap_or(0)
    }
}
