//! File-backed library: the whole forest in one versioned TOML file.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::collab::{BatchReport, MutationError, ProcessingPipeline, TreeMutations, TreeSource};
use crate::mode_gate::SubMode;
use crate::names::{NameError, sibling_key, validate_label};
use crate::node::{Node, NodeType, ProcessingStatus};
use crate::time::now_utc_rfc3339;
use crate::tree::TreeIndex;

const LIBRARY_VERSION: i64 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct LibraryFile {
    version: i64,
    next_id: u64,
    #[serde(default, rename = "node")]
    nodes: Vec<Node>,
}

impl Default for LibraryFile {
    fn default() -> Self {
        Self {
            version: LIBRARY_VERSION,
            next_id: 1,
            nodes: Vec::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("failed to read library at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse library at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to write library at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize library: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("failed to stamp time: {0}")]
    Timestamp(#[from] time::error::Format),
    #[error("{message}")]
    InvalidSchema { message: String },
    #[error("invalid name: {0}")]
    InvalidName(#[from] NameError),
    #[error("a sibling named '{name}' already exists")]
    DuplicateName { name: String },
    #[error("no {node_type} with id '{id}'")]
    NotFound { id: String, node_type: NodeType },
    #[error("a {child} cannot be created {location}")]
    InvalidParent { child: NodeType, location: String },
    #[error("library at {path} already exists")]
    AlreadyExists { path: PathBuf },
}

impl From<LibraryError> for MutationError {
    fn from(error: LibraryError) -> Self {
        match error {
            LibraryError::DuplicateName { name } => MutationError::DuplicateName { name },
            other => MutationError::other(other.to_string()),
        }
    }
}

/// Library store over one TOML file. Every operation re-reads the file, so external edits are
/// picked up on the next refresh.
#[derive(Debug)]
pub struct LibraryStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl LibraryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes an empty library. Refuses to overwrite unless `force`.
    pub fn initialize(&self, force: bool) -> Result<(), LibraryError> {
        self.initialize_with(Vec::new(), force)
    }

    /// Writes a library holding `nodes`. Ids of the form `{type}-{n}` stay unique because the
    /// counter starts after the highest `n` present.
    pub fn initialize_with(&self, nodes: Vec<Node>, force: bool) -> Result<(), LibraryError> {
        if self.path.exists() && !force {
            return Err(LibraryError::AlreadyExists {
                path: self.path.clone(),
            });
        }

        let highest = TreeIndex::new(nodes.clone())
            .walk()
            .into_iter()
            .filter_map(|(_, node)| node.id.rsplit_once('-'))
            .filter_map(|(_, suffix)| suffix.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        let file = LibraryFile {
            next_id: highest + 1,
            nodes,
            ..LibraryFile::default()
        };
        self.write(&file)?;
        info!(path = %self.path.display(), "initialized library");
        Ok(())
    }

    pub fn load_nodes(&self) -> Result<Vec<Node>, LibraryError> {
        Ok(self.load()?.nodes)
    }

    pub fn create_node(
        &self,
        parent_id: Option<&str>,
        node_type: NodeType,
        name: &str,
    ) -> Result<Node, LibraryError> {
        validate_label(name)?;
        let name = name.trim();

        self.update(|file| {
            let index = TreeIndex::new(file.nodes.clone());
            match parent_id {
                None if node_type != NodeType::Department => {
                    return Err(LibraryError::InvalidParent {
                        child: node_type,
                        location: "at the top level".to_string(),
                    });
                }
                None => {}
                Some(parent_id) => {
                    let parent_type = index.node_type_of(parent_id).ok_or_else(|| {
                        LibraryError::NotFound {
                            id: parent_id.to_string(),
                            node_type: node_type.parent_type().unwrap_or(NodeType::Department),
                        }
                    })?;
                    if !parent_type.accepts_child(node_type) {
                        return Err(LibraryError::InvalidParent {
                            child: node_type,
                            location: format!("inside a {parent_type}"),
                        });
                    }
                }
            }
            ensure_unique_sibling(&index, parent_id, name, None)?;

            let stamp = now_utc_rfc3339()?;
            let mut node = Node::new(
                format!("{}-{}", node_type.as_str(), file.next_id),
                name,
                node_type,
            );
            node.meta.created_at = stamp.clone();
            node.meta.updated_at = stamp;
            if node_type == NodeType::Module {
                node.meta.note_count = Some(0);
            }
            file.next_id += 1;

            let siblings = children_mut(&mut file.nodes, parent_id).ok_or_else(|| {
                LibraryError::NotFound {
                    id: parent_id.unwrap_or_default().to_string(),
                    node_type: NodeType::Department,
                }
            })?;
            siblings.push(node.clone());

            if node_type == NodeType::Note
                && let Some(parent) = parent_id.and_then(|id| find_node_mut(&mut file.nodes, id))
            {
                parent.meta.note_count = Some(parent.children.len() as u32);
            }

            info!(id = %node.id, node_type = %node_type, "created node");
            Ok(node)
        })
    }

    pub fn rename_node(
        &self,
        node_id: &str,
        node_type: NodeType,
        name: &str,
    ) -> Result<(), LibraryError> {
        validate_label(name)?;
        let name = name.trim();

        self.update(|file| {
            let index = TreeIndex::new(file.nodes.clone());
            ensure_type(&index, node_id, node_type)?;
            let parent_id = index.parent_of(node_id).map(|parent| parent.id.clone());
            ensure_unique_sibling(&index, parent_id.as_deref(), name, Some(node_id))?;

            let stamp = now_utc_rfc3339()?;
            if let Some(node) = find_node_mut(&mut file.nodes, node_id) {
                node.label = name.to_string();
                node.meta.updated_at = stamp;
            }
            info!(id = %node_id, "renamed node");
            Ok(())
        })
    }

    pub fn delete_node(&self, node_id: &str, node_type: NodeType) -> Result<(), LibraryError> {
        self.update(|file| {
            let index = TreeIndex::new(file.nodes.clone());
            ensure_type(&index, node_id, node_type)?;
            let parent_id = index.parent_of(node_id).map(|parent| parent.id.clone());

            remove_node(&mut file.nodes, node_id);
            if node_type == NodeType::Note
                && let Some(parent) = parent_id
                    .as_deref()
                    .and_then(|id| find_node_mut(&mut file.nodes, id))
            {
                parent.meta.note_count = Some(parent.children.len() as u32);
            }

            info!(id = %node_id, node_type = %node_type, "deleted node");
            Ok(())
        })
    }

    /// Moves eligible notes to `target`; everything else is reported as skipped.
    fn transition(
        &self,
        note_ids: &[String],
        gate: SubMode,
        target: ProcessingStatus,
    ) -> Result<BatchReport, LibraryError> {
        self.update(|file| {
            let mut report = BatchReport::default();
            for id in note_ids {
                match find_node_mut(&mut file.nodes, id) {
                    Some(node) if node.is_note() && gate.admits(node.status()) => {
                        node.meta.processing_status = target;
                        report.accepted.push(id.clone());
                    }
                    _ => report.skipped.push(id.clone()),
                }
            }
            debug!(
                accepted = report.accepted.len(),
                skipped = report.skipped.len(),
                status = %target,
                "processing transition"
            );
            Ok(report)
        })
    }

    fn update<T, F>(&self, apply: F) -> Result<T, LibraryError>
    where
        F: FnOnce(&mut LibraryFile) -> Result<T, LibraryError>,
    {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut file = self.load()?;
        let value = apply(&mut file)?;
        self.write(&file)?;
        Ok(value)
    }

    fn load(&self) -> Result<LibraryFile, LibraryError> {
        if !self.path.exists() {
            return Ok(LibraryFile::default());
        }

        let raw = fs::read_to_string(&self.path).map_err(|source| LibraryError::Read {
            path: self.path.clone(),
            source,
        })?;

        let value: toml::Value = toml::from_str(&raw).map_err(|source| LibraryError::Parse {
            path: self.path.clone(),
            source,
        })?;
        validate_library_schema(&value)?;

        value.try_into().map_err(|source| LibraryError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn write(&self, file: &LibraryFile) -> Result<(), LibraryError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| LibraryError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let serialized = toml::to_string(file)?;
        let temp_path = self.path.with_extension("toml.tmp");
        fs::write(&temp_path, serialized).map_err(|source| LibraryError::Write {
            path: temp_path.clone(),
            source,
        })?;
        fs::rename(&temp_path, &self.path).map_err(|source| LibraryError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

impl TreeSource for LibraryStore {
    fn get_tree(&self) -> anyhow::Result<Vec<Node>> {
        self.load_nodes()
            .with_context(|| format!("failed to load library {}", self.path.display()))
    }
}

impl TreeMutations for LibraryStore {
    fn create(
        &self,
        parent_id: Option<&str>,
        node_type: NodeType,
        name: &str,
    ) -> Result<Node, MutationError> {
        Ok(self.create_node(parent_id, node_type, name)?)
    }

    fn rename(&self, node_id: &str, node_type: NodeType, name: &str) -> Result<(), MutationError> {
        Ok(self.rename_node(node_id, node_type, name)?)
    }

    fn delete(&self, node_id: &str, node_type: NodeType) -> Result<(), MutationError> {
        Ok(self.delete_node(node_id, node_type)?)
    }
}

impl ProcessingPipeline for LibraryStore {
    fn submit(&self, note_ids: &[String]) -> Result<BatchReport, MutationError> {
        Ok(self.transition(note_ids, SubMode::Process, ProcessingStatus::Pending)?)
    }

    fn retract(&self, note_ids: &[String]) -> Result<BatchReport, MutationError> {
        Ok(self.transition(note_ids, SubMode::Retract, ProcessingStatus::Unsubmitted)?)
    }
}

fn validate_library_schema(value: &toml::Value) -> Result<(), LibraryError> {
    let version = value
        .as_table()
        .and_then(|root| root.get("version"))
        .ok_or_else(|| {
            schema_error("invalid library schema: missing required top-level field 'version'")
        })?;

    match version.as_integer() {
        Some(LIBRARY_VERSION) => Ok(()),
        Some(found) => Err(schema_error(&format!(
            "invalid library schema: unsupported version (expected {LIBRARY_VERSION}, found {found})"
        ))),
        None => Err(schema_error(
            "invalid library schema: unsupported version (expected integer)",
        )),
    }
}

fn schema_error(message: &str) -> LibraryError {
    LibraryError::InvalidSchema {
        message: message.to_string(),
    }
}

fn ensure_type(index: &TreeIndex, node_id: &str, node_type: NodeType) -> Result<(), LibraryError> {
    if index.node_type_of(node_id) == Some(node_type) {
        Ok(())
    } else {
        Err(LibraryError::NotFound {
            id: node_id.to_string(),
            node_type,
        })
    }
}

fn ensure_unique_sibling(
    index: &TreeIndex,
    parent_id: Option<&str>,
    name: &str,
    exclude: Option<&str>,
) -> Result<(), LibraryError> {
    let key = sibling_key(name);
    let clash = index
        .children_of(parent_id)
        .iter()
        .filter(|sibling| Some(sibling.id.as_str()) != exclude)
        .any(|sibling| sibling_key(&sibling.label) == key);

    if clash {
        return Err(LibraryError::DuplicateName {
            name: name.to_string(),
        });
    }
    Ok(())
}

fn children_mut<'a>(nodes: &'a mut Vec<Node>, parent_id: Option<&str>) -> Option<&'a mut Vec<Node>> {
    match parent_id {
        None => Some(nodes),
        Some(id) => find_node_mut(nodes, id).map(|parent| &mut parent.children),
    }
}

fn find_node_mut<'a>(nodes: &'a mut [Node], id: &str) -> Option<&'a mut Node> {
    for node in nodes {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_node_mut(&mut node.children, id) {
            return Some(found);
        }
    }
    None
}

fn remove_node(nodes: &mut Vec<Node>, id: &str) -> Option<Node> {
    if let Some(position) = nodes.iter().position(|node| node.id == id) {
        return Some(nodes.remove(position));
    }
    nodes
        .iter_mut()
        .find_map(|node| remove_node(&mut node.children, id))
}
