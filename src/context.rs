//! The explicit context stack shared by the encoder and decoder.
//!
//! Both directions run as iterative automata: instead of recursing into nested
//! values they push an [`Operation`] describing the structural context they are
//! in, and pop it once the value is complete. The stack depth is the current
//! nesting depth and the top of the stack is where the automaton is.

use crate::error::JsonbError;

/// The state of the automaton at one nesting level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
    /// Expecting any value.
    Literal,
    /// Inside a string payload.
    String,
    /// Inside a number's digits (encoder only).
    Number,
    /// Inside an array, between elements.
    Array,
    /// Inside an object, between members.
    Object,
    /// Expecting an object key or the end of the object.
    Key,
    /// Between an object key and its value.
    KeyValueSeparator,
}

impl ContextKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Literal => "literal",
            Self::String => "string",
            Self::Number => "number",
            Self::Array => "array",
            Self::Object => "object",
            Self::Key => "object key",
            Self::KeyValueSeparator => "object key-value separator",
        }
    }
}

impl std::fmt::Display for ContextKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A pending operation: a context kind and the input offset where it began.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    pub kind: ContextKind,
    pub start: usize,
}

impl Operation {
    pub fn new(kind: ContextKind, start: usize) -> Self {
        Self { kind, start }
    }

    /// Switches this operation to a new context in place.
    pub fn transition(&mut self, kind: ContextKind, start: usize) {
        self.kind = kind;
        self.start = start;
    }

    pub(crate) fn unterminated(&self) -> JsonbError {
        JsonbError::Unterminated {
            kind: self.kind,
            offset: self.start,
        }
    }
}

/// Stack of pending operations with an optional depth limit.
#[derive(Debug)]
pub struct ContextStack {
    ops: Vec<Operation>,
    max_depth: Option<usize>,
}

impl ContextStack {
    /// Creates an empty stack. `max_depth` bounds how many operations may be
    /// open at once; `None` leaves nesting unbounded.
    pub fn new(max_depth: Option<usize>) -> Self {
        Self {
            ops: Vec::new(),
            max_depth,
        }
    }

    /// Creates a stack holding the single `Literal` context every document
    /// starts from.
    pub fn for_document(max_depth: Option<usize>) -> Result<Self, JsonbError> {
        let mut stack = Self::new(max_depth);
        stack.push(ContextKind::Literal, 0)?;
        Ok(stack)
    }

    pub fn push(&mut self, kind: ContextKind, start: usize) -> Result<(), JsonbError> {
        if let Some(limit) = self.max_depth {
            if self.ops.len() >= limit {
                tracing::debug!(limit, offset = start, "nesting depth limit exceeded");
                return Err(JsonbError::DepthLimitExceeded {
                    limit,
                    offset: start,
                });
            }
        }
        self.ops.push(Operation::new(kind, start));
        Ok(())
    }

    pub fn pop(&mut self) -> Option<Operation> {
        self.ops.pop()
    }

    /// Pops up to `n` operations at once, used when closing a container from
    /// inside its child context.
    pub fn pop_n(&mut self, n: usize) {
        let len = self.ops.len().saturating_sub(n);
        self.ops.truncate(len);
    }

    pub fn top(&self) -> Option<&Operation> {
        self.ops.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut Operation> {
        self.ops.last_mut()
    }

    /// Kind of the operation directly below the top, if any.
    pub fn parent_kind(&self) -> Option<ContextKind> {
        let len = self.ops.len();
        if len < 2 {
            return None;
        }
        Some(self.ops[len - 2].kind)
    }

    pub fn depth(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_stack_starts_with_literal() {
        let stack = ContextStack::for_document(None).unwrap();
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.top(), Some(&Operation::new(ContextKind::Literal, 0)));
        assert_eq!(stack.parent_kind(), None);
    }

    #[test]
    fn push_pop_and_parent() {
        let mut stack = ContextStack::for_document(None).unwrap();
        stack.top_mut().unwrap().transition(ContextKind::Array, 0);
        stack.push(ContextKind::Literal, 1).unwrap();
        assert_eq!(stack.parent_kind(), Some(ContextKind::Array));
        assert_eq!(stack.pop().map(|op| op.kind), Some(ContextKind::Literal));
        assert_eq!(stack.top().map(|op| op.kind), Some(ContextKind::Array));
    }

    #[test]
    fn pop_n_closes_container_and_child() {
        let mut stack = ContextStack::for_document(None).unwrap();
        stack.push(ContextKind::Key, 1).unwrap();
        stack.pop_n(2);
        assert!(stack.is_empty());
        stack.pop_n(2);
        assert!(stack.is_empty());
    }

    #[test]
    fn depth_limit_rejects_push() {
        let mut stack = ContextStack::for_document(Some(2)).unwrap();
        stack.push(ContextKind::Literal, 1).unwrap();
        let err = stack.push(ContextKind::Literal, 2).unwrap_err();
        assert!(matches!(
            err,
            JsonbError::DepthLimitExceeded { limit: 2, offset: 2 }
        ));
        assert_eq!(stack.depth(), 2);
    }

    #[test]
    fn kind_names() {
        assert_eq!(ContextKind::Key.to_string(), "object key");
        assert_eq!(ContextKind::Number.name(), "number");
    }
}
