use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Department,
    Semester,
    Subject,
    Module,
    Note,
}

impl NodeType {
    pub const ALL: [NodeType; 5] = [
        NodeType::Department,
        NodeType::Semester,
        NodeType::Subject,
        NodeType::Module,
        NodeType::Note,
    ];

    /// Fixed adjacency table: department -> semester -> subject -> module -> note.
    pub fn child_type(self) -> Option<NodeType> {
        match self {
            Self::Department => Some(Self::Semester),
            Self::Semester => Some(Self::Subject),
            Self::Subject => Some(Self::Module),
            Self::Module => Some(Self::Note),
            Self::Note => None,
        }
    }

    pub fn parent_type(self) -> Option<NodeType> {
        match self {
            Self::Department => None,
            Self::Semester => Some(Self::Department),
            Self::Subject => Some(Self::Semester),
            Self::Module => Some(Self::Subject),
            Self::Note => Some(Self::Module),
        }
    }

    pub fn accepts_child(self, child: NodeType) -> bool {
        self.child_type() == Some(child)
    }

    /// Only containers can be browsed into.
    pub fn is_navigable(self) -> bool {
        self != Self::Note
    }

    /// Name used when a create is committed with a blank draft.
    pub fn default_name(self) -> &'static str {
        match self {
            Self::Department => "New Department",
            Self::Semester => "New Semester",
            Self::Subject => "New Subject",
            Self::Module => "New Module",
            Self::Note => "New Note",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Department => "department",
            Self::Semester => "semester",
            Self::Subject => "subject",
            Self::Module => "module",
            Self::Note => "note",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        NodeType::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == value)
            .ok_or_else(|| format!("unknown node type '{value}'"))
    }
}

/// Status assigned to a note by the downstream indexing pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    #[default]
    #[serde(rename = "none")]
    Unsubmitted,
    Pending,
    Processing,
    Ready,
    Failed,
}

impl ProcessingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unsubmitted => "none",
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Ready => "ready",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMeta {
    pub created_at: String,
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_filename: Option<String>,
    #[serde(default)]
    pub processing_status: ProcessingStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub meta: NodeMeta,
    #[serde(default, rename = "child", skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(id: impl Into<String>, label: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            node_type,
            meta: NodeMeta::default(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        debug_assert!(
            children
                .iter()
                .all(|child| self.node_type.accepts_child(child.node_type)),
            "children of a {} must all be {:?}",
            self.node_type,
            self.node_type.child_type()
        );
        self.children = children;
        self
    }

    pub fn with_status(mut self, status: ProcessingStatus) -> Self {
        self.meta.processing_status = status;
        self
    }

    pub fn with_pdf(mut self, filename: impl Into<String>) -> Self {
        self.meta.pdf_filename = Some(filename.into());
        self
    }

    pub fn is_note(&self) -> bool {
        self.node_type == NodeType::Note
    }

    pub fn has_file(&self) -> bool {
        self.meta
            .pdf_filename
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty())
    }

    pub fn status(&self) -> ProcessingStatus {
        self.meta.processing_status
    }
}
