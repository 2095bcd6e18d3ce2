use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use notedeck_core::config::{NotedeckConfig, write_config};
use notedeck_core::library::LibraryStore;
use notedeck_core::node::{Node, NodeType, ProcessingStatus};
use notedeck_core::policy::Role;
use notedeck_core::time::now_utc_rfc3339;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitRequest {
    pub config_path: PathBuf,
    pub force: bool,
    pub sample: bool,
    pub role: Option<Role>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitResult {
    pub config_path: PathBuf,
    pub library_path: PathBuf,
    pub seeded_nodes: usize,
}

/// Writes a default config and a library beside it, optionally seeded with demo content.
pub fn initialize(request: &InitRequest) -> Result<InitResult> {
    if request.config_path.exists() && !request.force {
        bail!(
            "config already exists at {}; pass --force to overwrite it",
            request.config_path.display()
        );
    }

    let mut config = NotedeckConfig::default();
    if let Some(role) = request.role {
        config.session.role = role;
    }
    write_config(&request.config_path, &config).with_context(|| {
        format!(
            "failed to write config at {}",
            request.config_path.display()
        )
    })?;

    let library_path = config.library_path(&request.config_path);
    let nodes = if request.sample {
        let stamp = now_utc_rfc3339().context("failed to format timestamp")?;
        sample_library(&stamp)
    } else {
        Vec::new()
    };
    let seeded_nodes = count_nodes(&nodes);

    LibraryStore::new(&library_path)
        .initialize_with(nodes, request.force)
        .with_context(|| format!("failed to write library at {}", library_path.display()))?;

    info!(
        config = %request.config_path.display(),
        library = %library_path.display(),
        seeded_nodes,
        "initialized notedeck"
    );

    Ok(InitResult {
        config_path: request.config_path.clone(),
        library_path,
        seeded_nodes,
    })
}

/// A small demo library: one department down to a module whose notes cover every status.
pub fn sample_library(stamp: &str) -> Vec<Node> {
    let note = |id: &str, label: &str, status: ProcessingStatus| {
        stamped(
            Node::new(id, label, NodeType::Note)
                .with_pdf(format!("{}.pdf", label.to_lowercase().replace(' ', "-")))
                .with_status(status),
            stamp,
        )
    };
    let notes = vec![
        note("note-1", "Course Overview", ProcessingStatus::Unsubmitted),
        note("note-2", "Sorting", ProcessingStatus::Pending),
        note("note-3", "Hash Tables", ProcessingStatus::Processing),
        note("note-4", "Binary Trees", ProcessingStatus::Ready),
        note("note-5", "Graph Search", ProcessingStatus::Failed),
    ];

    let mut week_one = stamped(Node::new("module-1", "Week 1", NodeType::Module), stamp);
    week_one.meta.note_count = u32::try_from(notes.len()).ok();
    let week_one = week_one.with_children(notes);
    let mut week_two = stamped(Node::new("module-2", "Week 2", NodeType::Module), stamp);
    week_two.meta.note_count = Some(0);

    let subject = stamped(
        Node::new("subject-1", "Algorithms", NodeType::Subject),
        stamp,
    )
    .with_children(vec![week_one, week_two]);
    let semester = stamped(
        Node::new("semester-1", "Semester 1", NodeType::Semester),
        stamp,
    )
    .with_children(vec![subject]);

    vec![
        stamped(
            Node::new("department-1", "Computer Science", NodeType::Department),
            stamp,
        )
        .with_children(vec![semester]),
        stamped(
            Node::new("department-2", "Mathematics", NodeType::Department),
            stamp,
        ),
    ]
}

fn stamped(mut node: Node, stamp: &str) -> Node {
    node.meta.created_at = stamp.to_string();
    node.meta.updated_at = stamp.to_string();
    node
}

fn count_nodes(nodes: &[Node]) -> usize {
    nodes
        .iter()
        .map(|node| 1 + count_nodes(&node.children))
        .sum()
}

#[cfg(test)]
mod tests {
    use notedeck_core::tree::TreeIndex;

    use super::*;

    #[test]
    fn sample_library_covers_every_status() {
        let tree = TreeIndex::new(sample_library("2026-01-05T08:00:00Z"));
        assert_eq!(tree.len(), 11);

        let statuses: Vec<ProcessingStatus> = tree
            .children_of(Some("module-1"))
            .iter()
            .map(Node::status)
            .collect();
        assert_eq!(
            statuses,
            vec![
                ProcessingStatus::Unsubmitted,
                ProcessingStatus::Pending,
                ProcessingStatus::Processing,
                ProcessingStatus::Ready,
                ProcessingStatus::Failed,
            ]
        );
        assert_eq!(
            tree.get("note-4")
                .and_then(|node| node.meta.pdf_filename.as_deref()),
            Some("binary-trees.pdf")
        );
    }

    #[test]
    fn initialize_refuses_existing_config_without_force() {
        let temp = tempfile::tempdir().expect("temp dir");
        let request = InitRequest {
            config_path: temp.path().join("config.toml"),
            force: false,
            sample: false,
            role: None,
        };

        initialize(&request).expect("first init");
        let error = initialize(&request).expect_err("second init should fail");
        assert!(error.to_string().contains("--force"));

        let forced = InitRequest {
            force: true,
            sample: true,
            ..request
        };
        let result = initialize(&forced).expect("forced init");
        assert_eq!(result.seeded_nodes, 11);
    }
}
