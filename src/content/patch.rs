//! Patch operations and the literal content they inject
//!
//! Patches are a closed set of operation kinds. Composite kinds hold their
//! children directly so the walker can descend without inspecting the host's
//! internals.

use serde::{Deserialize, Serialize};

/// One node of an injected XML-like content fragment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentNode {
    /// Element name, e.g. `ThingDef` or `defName`
    pub name: String,
    /// Inner text for leaf elements
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ContentNode>,
}

impl ContentNode {
    /// An element holding only text
    pub fn text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: Some(text.into()),
            children: Vec::new(),
        }
    }

    /// An element holding child elements
    pub fn element(name: impl Into<String>, children: Vec<ContentNode>) -> Self {
        Self {
            name: name.into(),
            text: None,
            children,
        }
    }

    /// Total number of nodes in this subtree
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(ContentNode::node_count).sum::<usize>()
    }
}

/// A declarative load-time patch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PatchOperation {
    /// Append literal content under the nodes matched by `xpath`.
    ///
    /// `value` holds the top-level injected elements; `None` means the patch
    /// was declared without a value and is malformed.
    Add {
        #[serde(default)]
        xpath: String,
        #[serde(default)]
        value: Option<Vec<ContentNode>>,
    },
    /// Insert literal content next to the nodes matched by `xpath`
    Insert {
        #[serde(default)]
        xpath: String,
        #[serde(default)]
        value: Option<Vec<ContentNode>>,
    },
    /// Branch on whether any of `packages` is loaded
    FindPackage {
        #[serde(default)]
        packages: Vec<String>,
        #[serde(default, rename = "match")]
        on_match: Option<Box<PatchOperation>>,
        #[serde(default, rename = "nomatch")]
        no_match: Option<Box<PatchOperation>>,
    },
    /// Branch on whether `xpath` matches anything
    Conditional {
        #[serde(default)]
        xpath: String,
        #[serde(default, rename = "match")]
        on_match: Option<Box<PatchOperation>>,
        #[serde(default, rename = "nomatch")]
        no_match: Option<Box<PatchOperation>>,
    },
    /// Run children in order
    Sequence {
        #[serde(default)]
        operations: Vec<PatchOperation>,
    },
    /// Any other operation (remove, replace, attribute edits...)
    Other {
        #[serde(default)]
        kind: String,
    },
}

impl PatchOperation {
    pub fn add(value: Vec<ContentNode>) -> Self {
        PatchOperation::Add {
            xpath: "/Defs".to_string(),
            value: Some(value),
        }
    }

    pub fn insert(xpath: impl Into<String>, value: Vec<ContentNode>) -> Self {
        PatchOperation::Insert {
            xpath: xpath.into(),
            value: Some(value),
        }
    }

    pub fn find_package(
        packages: Vec<String>,
        on_match: Option<PatchOperation>,
        no_match: Option<PatchOperation>,
    ) -> Self {
        PatchOperation::FindPackage {
            packages,
            on_match: on_match.map(Box::new),
            no_match: no_match.map(Box::new),
        }
    }

    pub fn conditional(
        xpath: impl Into<String>,
        on_match: Option<PatchOperation>,
        no_match: Option<PatchOperation>,
    ) -> Self {
        PatchOperation::Conditional {
            xpath: xpath.into(),
            on_match: on_match.map(Box::new),
            no_match: no_match.map(Box::new),
        }
    }

    pub fn sequence(operations: Vec<PatchOperation>) -> Self {
        PatchOperation::Sequence { operations }
    }

    pub fn other(kind: impl Into<String>) -> Self {
        PatchOperation::Other { kind: kind.into() }
    }

    /// Short name for logs
    pub fn kind_name(&self) -> &str {
        match self {
            PatchOperation::Add { .. } => "Add",
            PatchOperation::Insert { .. } => "Insert",
            PatchOperation::FindPackage { .. } => "FindPackage",
            PatchOperation::Conditional { .. } => "Conditional",
            PatchOperation::Sequence { .. } => "Sequence",
            PatchOperation::Other { kind } if !kind.is_empty() => kind,
            PatchOperation::Other { .. } => "Other",
        }
    }

    /// Whether this operation carries literal injected content
    pub fn carries_content(&self) -> bool {
        matches!(
            self,
            PatchOperation::Add { .. } | PatchOperation::Insert { .. }
        )
    }
}
