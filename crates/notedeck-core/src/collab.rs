//! Collaborator seams. The engine never performs I/O; these traits are implemented by the
//! library store or by test fakes.

use thiserror::Error;

use crate::node::{Node, NodeType};
use crate::policy::Role;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    #[error("a sibling named '{name}' already exists")]
    DuplicateName { name: String },
    #[error("{message}")]
    Other { message: String },
}

impl MutationError {
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateName { .. })
    }
}

pub trait TreeSource: Send + Sync {
    fn get_tree(&self) -> anyhow::Result<Vec<Node>>;
}

pub trait TreeMutations: Send + Sync {
    /// Creates a child under `parent_id`, or a department when `parent_id` is `None`.
    fn create(
        &self,
        parent_id: Option<&str>,
        node_type: NodeType,
        name: &str,
    ) -> Result<Node, MutationError>;

    fn rename(&self, node_id: &str, node_type: NodeType, name: &str) -> Result<(), MutationError>;

    fn delete(&self, node_id: &str, node_type: NodeType) -> Result<(), MutationError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub accepted: Vec<String>,
    pub skipped: Vec<String>,
}

/// Downstream indexing pipeline that owns per-note processing status.
pub trait ProcessingPipeline: Send + Sync {
    fn submit(&self, note_ids: &[String]) -> Result<BatchReport, MutationError>;
    fn retract(&self, note_ids: &[String]) -> Result<BatchReport, MutationError>;
}

pub trait SessionProvider {
    fn current_role(&self) -> Role;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticSession {
    role: Role,
}

impl StaticSession {
    pub fn new(role: Role) -> Self {
        Self { role }
    }
}

impl SessionProvider for StaticSession {
    fn current_role(&self) -> Role {
        self.role
    }
}
