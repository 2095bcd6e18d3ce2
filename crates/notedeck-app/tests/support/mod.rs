#![allow(dead_code)]

use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

use anyhow::anyhow;
use notedeck_core::collab::{
    BatchReport, MutationError, ProcessingPipeline, StaticSession, TreeMutations, TreeSource,
};
use notedeck_core::node::{Node, NodeType, ProcessingStatus};
use notedeck_core::policy::Role;

use notedeck_app::App;

pub static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Collaborator fake: serves a tree, pops scripted results and records every call.
///
/// `get_tree` returns the next queued tree if one is waiting (it then becomes current), else
/// the current tree.
#[derive(Default)]
pub struct ScriptedLibrary {
    current: Mutex<Vec<Node>>,
    next_trees: Mutex<VecDeque<Vec<Node>>>,
    fail_reads: Mutex<bool>,
    renames: Mutex<VecDeque<Result<(), MutationError>>>,
    creates: Mutex<VecDeque<Result<Node, MutationError>>>,
    deletes: Mutex<VecDeque<Result<(), MutationError>>>,
    batches: Mutex<VecDeque<Result<BatchReport, MutationError>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedLibrary {
    pub fn new(tree: Vec<Node>) -> Self {
        Self {
            current: Mutex::new(tree),
            ..Self::default()
        }
    }

    pub fn then_tree(&self, tree: Vec<Node>) {
        self.next_trees.lock().expect("trees lock").push_back(tree);
    }

    pub fn fail_reads(&self) {
        *self.fail_reads.lock().expect("fail lock") = true;
    }

    pub fn script_rename(&self, result: Result<(), MutationError>) {
        self.renames.lock().expect("renames lock").push_back(result);
    }

    pub fn script_create(&self, result: Result<Node, MutationError>) {
        self.creates.lock().expect("creates lock").push_back(result);
    }

    pub fn script_delete(&self, result: Result<(), MutationError>) {
        self.deletes.lock().expect("deletes lock").push_back(result);
    }

    pub fn script_batch(&self, result: Result<BatchReport, MutationError>) {
        self.batches.lock().expect("batches lock").push_back(result);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("calls lock").push(call);
    }
}

fn missing<T>() -> Result<T, MutationError> {
    Err(MutationError::other("missing scripted result"))
}

impl TreeSource for ScriptedLibrary {
    fn get_tree(&self) -> anyhow::Result<Vec<Node>> {
        self.record("get_tree".to_string());
        if *self.fail_reads.lock().expect("fail lock") {
            return Err(anyhow!("library unavailable"));
        }

        let mut current = self.current.lock().expect("current lock");
        if let Some(next) = self.next_trees.lock().expect("trees lock").pop_front() {
            *current = next;
        }
        Ok(current.clone())
    }
}

impl TreeMutations for ScriptedLibrary {
    fn create(
        &self,
        parent_id: Option<&str>,
        node_type: NodeType,
        name: &str,
    ) -> Result<Node, MutationError> {
        self.record(format!(
            "create {} {node_type} {name}",
            parent_id.unwrap_or("<root>")
        ));
        self.creates
            .lock()
            .expect("creates lock")
            .pop_front()
            .unwrap_or_else(missing)
    }

    fn rename(&self, node_id: &str, node_type: NodeType, name: &str) -> Result<(), MutationError> {
        self.record(format!("rename {node_id} {node_type} {name}"));
        self.renames
            .lock()
            .expect("renames lock")
            .pop_front()
            .unwrap_or_else(missing)
    }

    fn delete(&self, node_id: &str, node_type: NodeType) -> Result<(), MutationError> {
        self.record(format!("delete {node_id} {node_type}"));
        self.deletes
            .lock()
            .expect("deletes lock")
            .pop_front()
            .unwrap_or_else(missing)
    }
}

impl ProcessingPipeline for ScriptedLibrary {
    fn submit(&self, note_ids: &[String]) -> Result<BatchReport, MutationError> {
        self.record(format!("submit {}", note_ids.join(",")));
        self.batches
            .lock()
            .expect("batches lock")
            .pop_front()
            .unwrap_or_else(missing)
    }

    fn retract(&self, note_ids: &[String]) -> Result<BatchReport, MutationError> {
        self.record(format!("retract {}", note_ids.join(",")));
        self.batches
            .lock()
            .expect("batches lock")
            .pop_front()
            .unwrap_or_else(missing)
    }
}

pub fn app<'a>(library: &'a ScriptedLibrary, session: &'a StaticSession) -> App<'a> {
    App::new(library, library, library, session)
}

pub fn session(role: Role) -> StaticSession {
    StaticSession::new(role)
}

/// Computer Science > Semester 1 > Algorithms > Week 1 with four notes, plus Physics.
pub fn forest() -> Vec<Node> {
    forest_with_module_label("Week 1")
}

pub fn forest_with_module_label(module_label: &str) -> Vec<Node> {
    let notes = vec![
        Node::new("note-1", "Intro", NodeType::Note).with_pdf("intro.pdf"),
        Node::new("note-2", "Lists", NodeType::Note).with_status(ProcessingStatus::Pending),
        Node::new("note-3", "Trees", NodeType::Note).with_status(ProcessingStatus::Ready),
        Node::new("note-4", "Graphs", NodeType::Note).with_status(ProcessingStatus::Failed),
    ];
    let module = Node::new("mod-1", module_label, NodeType::Module).with_children(notes);
    let subject = Node::new("sub-1", "Algorithms", NodeType::Subject).with_children(vec![module]);
    let semester = Node::new("sem-1", "Semester 1", NodeType::Semester).with_children(vec![subject]);

    vec![
        Node::new("dept-1", "Computer Science", NodeType::Department)
            .with_children(vec![semester]),
        Node::new("dept-2", "Physics", NodeType::Department),
    ]
}

pub fn write_config(home: &Path, role: &str) {
    let config_dir = home.join(".config").join("notedeck");
    fs::create_dir_all(&config_dir).expect("create config dir");
    fs::write(
        config_dir.join("config.toml"),
        format!("version = 1\n\n[session]\nrole = \"{role}\"\n"),
    )
    .expect("write config");
}
