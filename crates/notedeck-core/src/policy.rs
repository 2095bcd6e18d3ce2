use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::node::NodeType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
    #[default]
    Student,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Staff => "staff",
            Self::Student => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "staff" => Ok(Self::Staff),
            "student" => Ok(Self::Student),
            other => Err(format!(
                "unknown role '{other}' (expected admin, staff or student)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateChild,
    Rename,
    Delete,
}

/// Role/node-type permission table. For `CreateChild` the type is the one
/// being created; for `Rename` and `Delete` it is the target's own type.
pub fn allowed(role: Role, node_type: NodeType, action: Action) -> bool {
    use NodeType::{Department, Module, Note, Semester, Subject};

    match (role, action) {
        (Role::Admin, _) => matches!(node_type, Department | Semester | Subject),
        (Role::Staff, Action::CreateChild) => node_type == Module,
        (Role::Staff, Action::Rename | Action::Delete) => matches!(node_type, Module | Note),
        (Role::Student, _) => false,
    }
}

/// The child type the role may create under `parent`, where `None` is the
/// root listing of departments. Notes have no child type, so never offer one.
pub fn creatable_child(role: Role, parent: Option<NodeType>) -> Option<NodeType> {
    let child = match parent {
        None => NodeType::Department,
        Some(parent) => parent.child_type()?,
    };
    allowed(role, child, Action::CreateChild).then_some(child)
}
