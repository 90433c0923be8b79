//! Depth-first traversal of patch-operation forests
//!
//! Both branches of `FindPackage` and `Conditional` are visited: the walker
//! never evaluates a branch predicate, so it reports every operation that
//! *could* have contributed content. This may over-attribute a record to a
//! package whose branch was not taken at load time.

use crate::content::patch::{ContentNode, PatchOperation};

/// Pre-order iterator over one patch tree.
///
/// Every operation reachable from the root is yielded once, parents before
/// children, children in declaration order, match branch before no-match
/// branch. Missing branches are skipped. Uses an explicit stack, so deep
/// forests cannot overflow the call stack.
#[derive(Debug, Clone)]
pub struct PatchWalker<'a> {
    stack: Vec<&'a PatchOperation>,
}

impl<'a> PatchWalker<'a> {
    pub fn new(root: Option<&'a PatchOperation>) -> Self {
        Self {
            stack: root.into_iter().collect(),
        }
    }

    /// Walk every root of a package's forest in order
    pub fn forest(roots: &'a [PatchOperation]) -> Self {
        Self {
            stack: roots.iter().rev().collect(),
        }
    }

    /// Only the operations that carry literal content
    pub fn fragments(self) -> impl Iterator<Item = LiteralFragment<'a>> {
        self.filter_map(LiteralFragment::from_operation)
    }
}

impl<'a> Iterator for PatchWalker<'a> {
    type Item = &'a PatchOperation;

    fn next(&mut self) -> Option<Self::Item> {
        let op = self.stack.pop()?;
        match op {
            PatchOperation::FindPackage {
                on_match, no_match, ..
            }
            | PatchOperation::Conditional {
                on_match, no_match, ..
            } => {
                if let Some(no_match) = no_match {
                    self.stack.push(no_match);
                }
                if let Some(on_match) = on_match {
                    self.stack.push(on_match);
                }
            }
            PatchOperation::Sequence { operations } => {
                self.stack.extend(operations.iter().rev());
            }
            PatchOperation::Add { .. }
            | PatchOperation::Insert { .. }
            | PatchOperation::Other { .. } => {}
        }
        Some(op)
    }
}

/// The literal content of one Add or Insert operation
#[derive(Debug, Clone, Copy)]
pub struct LiteralFragment<'a> {
    pub operation: &'a PatchOperation,
    /// Top-level injected elements; `None` when the operation has no value
    pub nodes: Option<&'a [ContentNode]>,
}

impl<'a> LiteralFragment<'a> {
    fn from_operation(operation: &'a PatchOperation) -> Option<Self> {
        match operation {
            PatchOperation::Add { value, .. } | PatchOperation::Insert { value, .. } => {
                Some(Self {
                    operation,
                    nodes: value.as_deref(),
                })
            }
            PatchOperation::FindPackage { .. }
            | PatchOperation::Conditional { .. }
            | PatchOperation::Sequence { .. }
            | PatchOperation::Other { .. } => None,
        }
    }
}
