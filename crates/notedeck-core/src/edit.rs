use crate::collab::MutationError;
use crate::node::{Node, NodeType};

/// The single in-progress inline edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransientEdit {
    Renaming {
        node_id: String,
        node_type: NodeType,
        original: String,
        draft: String,
    },
    Creating {
        parent_id: Option<String>,
        child_type: NodeType,
        draft: String,
    },
}

impl TransientEdit {
    pub fn draft(&self) -> &str {
        match self {
            Self::Renaming { draft, .. } | Self::Creating { draft, .. } => draft,
        }
    }

    /// Text shown in an empty input.
    pub fn placeholder(&self) -> &str {
        match self {
            Self::Renaming { original, .. } => original,
            Self::Creating { child_type, .. } => child_type.default_name(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameCommit {
    pub token: u64,
    pub node_id: String,
    pub node_type: NodeType,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCommit {
    pub token: u64,
    pub parent_id: Option<String>,
    pub child_type: NodeType,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<T> {
    /// The edit this result belonged to is gone; nothing changed.
    Stale,
    Committed(T),
    Duplicate { name: String },
    Failed { message: String },
}

/// Owns the rename/create slot and its single in-flight commit.
#[derive(Debug, Clone, Default)]
pub struct EditController {
    edit: Option<TransientEdit>,
    pending: Option<u64>,
    next_token: u64,
}

impl EditController {
    pub fn current(&self) -> Option<&TransientEdit> {
        self.edit.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn renaming_id(&self) -> Option<&str> {
        match &self.edit {
            Some(TransientEdit::Renaming { node_id, .. }) => Some(node_id),
            _ => None,
        }
    }

    pub fn is_creating(&self) -> bool {
        matches!(self.edit, Some(TransientEdit::Creating { .. }))
    }

    pub fn start_renaming(&mut self, node: &Node) {
        self.replace(Some(TransientEdit::Renaming {
            node_id: node.id.clone(),
            node_type: node.node_type,
            original: node.label.clone(),
            draft: node.label.clone(),
        }));
    }

    pub fn start_creating(&mut self, child_type: NodeType, parent_id: Option<&str>) {
        self.replace(Some(TransientEdit::Creating {
            parent_id: parent_id.map(str::to_string),
            child_type,
            draft: String::new(),
        }));
    }

    /// Updates the draft text. Ignored while a commit is in flight.
    pub fn set_draft(&mut self, value: &str) {
        if self.is_busy() {
            return;
        }
        if let Some(TransientEdit::Renaming { draft, .. } | TransientEdit::Creating { draft, .. }) =
            self.edit.as_mut()
        {
            *draft = value.to_string();
        }
    }

    /// Discards the edit unconditionally. Returns whether one existed.
    pub fn cancel(&mut self) -> bool {
        let had_edit = self.edit.is_some();
        self.replace(None);
        had_edit
    }

    /// Starts a rename commit. `None` when not renaming, when a commit is already in flight,
    /// or when the label is blank or unchanged.
    pub fn begin_rename_commit(&mut self, label: &str) -> Option<RenameCommit> {
        if self.is_busy() {
            return None;
        }
        let Some(TransientEdit::Renaming {
            node_id,
            node_type,
            original,
            draft,
        }) = self.edit.as_mut()
        else {
            return None;
        };

        let label = label.trim();
        if label.is_empty() || label == original.trim() {
            return None;
        }

        *draft = label.to_string();
        let commit = RenameCommit {
            token: self.next_token,
            node_id: node_id.clone(),
            node_type: *node_type,
            label: label.to_string(),
        };
        self.pending = Some(commit.token);
        self.next_token += 1;
        Some(commit)
    }

    /// Resolves a rename. A duplicate keeps the input open for correction; any other failure
    /// closes it.
    pub fn complete_rename(
        &mut self,
        commit: &RenameCommit,
        result: Result<(), MutationError>,
    ) -> Resolution<String> {
        if self.pending != Some(commit.token) {
            return Resolution::Stale;
        }
        self.pending = None;

        match result {
            Ok(()) => {
                self.edit = None;
                Resolution::Committed(commit.node_id.clone())
            }
            Err(MutationError::DuplicateName { name }) => Resolution::Duplicate { name },
            Err(MutationError::Other { message }) => {
                self.edit = None;
                Resolution::Failed { message }
            }
        }
    }

    /// Starts a create commit. A blank label falls back to the child type's default name.
    pub fn begin_create_commit(&mut self, label: &str) -> Option<CreateCommit> {
        if self.is_busy() {
            return None;
        }
        let Some(TransientEdit::Creating {
            parent_id,
            child_type,
            draft,
        }) = self.edit.as_mut()
        else {
            return None;
        };

        let trimmed = label.trim();
        let label = if trimmed.is_empty() {
            child_type.default_name()
        } else {
            trimmed
        };

        *draft = label.to_string();
        let commit = CreateCommit {
            token: self.next_token,
            parent_id: parent_id.clone(),
            child_type: *child_type,
            label: label.to_string(),
        };
        self.pending = Some(commit.token);
        self.next_token += 1;
        Some(commit)
    }

    /// Resolves a create. Unlike rename, every failure closes the create slot.
    pub fn complete_create(
        &mut self,
        commit: &CreateCommit,
        result: Result<Node, MutationError>,
    ) -> Resolution<Node> {
        if self.pending != Some(commit.token) {
            return Resolution::Stale;
        }
        self.pending = None;
        self.edit = None;

        match result {
            Ok(node) => Resolution::Committed(node),
            Err(MutationError::DuplicateName { name }) => Resolution::Duplicate { name },
            Err(MutationError::Other { message }) => Resolution::Failed { message },
        }
    }

    fn replace(&mut self, edit: Option<TransientEdit>) {
        self.edit = edit;
        self.pending = None;
    }
}
