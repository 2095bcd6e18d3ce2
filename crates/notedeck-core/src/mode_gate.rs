use std::fmt;

use crate::node::{NodeType, ProcessingStatus};
use crate::tree::TreeIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubMode {
    #[default]
    Process,
    Retract,
}

impl SubMode {
    pub fn admits(self, status: ProcessingStatus) -> bool {
        match self {
            Self::Process => matches!(
                status,
                ProcessingStatus::Unsubmitted | ProcessingStatus::Pending | ProcessingStatus::Failed
            ),
            Self::Retract => status == ProcessingStatus::Ready,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Process => "process",
            Self::Retract => "retract",
        }
    }
}

impl fmt::Display for SubMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Bulk-processing selection mode. Only meaningful over a module's notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionMode {
    active: bool,
    sub_mode: SubMode,
}

impl SelectionMode {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn sub_mode(&self) -> SubMode {
        self.sub_mode
    }

    pub(crate) fn enter(&mut self, sub_mode: SubMode) {
        self.active = true;
        self.sub_mode = sub_mode;
    }

    pub(crate) fn set_sub_mode(&mut self, sub_mode: SubMode) {
        self.sub_mode = sub_mode;
    }

    pub(crate) fn exit(&mut self) {
        self.active = false;
        self.sub_mode = SubMode::default();
    }

    /// Whether `id` may be selected right now. Everything passes while the mode is off;
    /// while on, only notes whose status the sub-mode admits.
    pub fn admits(&self, tree: &TreeIndex, id: &str) -> bool {
        if !self.active {
            return true;
        }

        tree.get(id).is_some_and(|node| {
            node.node_type == NodeType::Note && self.sub_mode.admits(node.status())
        })
    }

    /// Keeps only the admissible ids, preserving order.
    pub fn filter_eligible(&self, tree: &TreeIndex, ids: &[String]) -> Vec<String> {
        ids.iter()
            .filter(|id| self.admits(tree, id))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::fixtures::sample_forest;

    #[test]
    fn process_admits_unsubmitted_pending_and_failed() {
        assert!(SubMode::Process.admits(ProcessingStatus::Unsubmitted));
        assert!(SubMode::Process.admits(ProcessingStatus::Pending));
        assert!(SubMode::Process.admits(ProcessingStatus::Failed));
        assert!(!SubMode::Process.admits(ProcessingStatus::Processing));
        assert!(!SubMode::Process.admits(ProcessingStatus::Ready));
    }

    #[test]
    fn retract_admits_only_ready() {
        for status in [
            ProcessingStatus::Unsubmitted,
            ProcessingStatus::Pending,
            ProcessingStatus::Processing,
            ProcessingStatus::Failed,
        ] {
            assert!(!SubMode::Retract.admits(status));
        }
        assert!(SubMode::Retract.admits(ProcessingStatus::Ready));
    }

    #[test]
    fn inactive_mode_admits_everything() {
        let tree = TreeIndex::new(sample_forest());
        let mode = SelectionMode::default();
        assert!(mode.admits(&tree, "note-3"));
        assert!(mode.admits(&tree, "dept-1"));
    }

    #[test]
    fn active_mode_rejects_unknown_and_non_notes() {
        let tree = TreeIndex::new(sample_forest());
        let mut mode = SelectionMode::default();
        mode.enter(SubMode::Process);
        assert!(!mode.admits(&tree, "mod-1"));
        assert!(!mode.admits(&tree, "missing"));
    }

    #[test]
    fn filter_eligible_follows_sub_mode() {
        let tree = TreeIndex::new(sample_forest());
        let ids: Vec<String> = ["note-1", "note-2", "note-3", "note-4"]
            .iter()
            .map(|value| (*value).to_string())
            .collect();

        let mut mode = SelectionMode::default();
        mode.enter(SubMode::Process);
        assert_eq!(mode.filter_eligible(&tree, &ids), vec!["note-1", "note-2", "note-4"]);

        mode.set_sub_mode(SubMode::Retract);
        assert_eq!(mode.filter_eligible(&tree, &ids), vec!["note-3"]);

        mode.exit();
        assert!(!mode.is_active());
        assert_eq!(mode.sub_mode(), SubMode::Process);
    }
}
