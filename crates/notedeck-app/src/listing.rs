use anyhow::{Context, Result};
use notedeck_core::node::{NodeType, ProcessingStatus};
use notedeck_core::time::display_date;
use notedeck_core::tree::TreeIndex;

use crate::App;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub depth: usize,
    pub id: String,
    pub label: String,
    pub node_type: NodeType,
    /// Only notes carry a processing status.
    pub status: Option<ProcessingStatus>,
    pub updated: String,
}

impl TreeRow {
    pub fn indented_label(&self) -> String {
        format!("{}{}", "  ".repeat(self.depth), self.label)
    }
}

impl<'a> App<'a> {
    /// Every node of the library, depth first.
    pub fn tree_rows(&self) -> Result<Vec<TreeRow>> {
        let nodes = self
            .source
            .get_tree()
            .context("failed to load the library tree")?;
        let tree = TreeIndex::new(nodes);

        Ok(tree
            .walk()
            .into_iter()
            .map(|(depth, node)| TreeRow {
                depth,
                id: node.id.clone(),
                label: node.label.clone(),
                node_type: node.node_type,
                status: node.is_note().then(|| node.status()),
                updated: display_date(&node.meta.updated_at),
            })
            .collect())
    }
}
