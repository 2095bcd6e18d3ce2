use std::collections::HashMap;

use crate::node::{Node, NodeType, ProcessingStatus};

/// Read-only id index over a fetched forest. Rebuilt whenever the tree is re-fetched.
#[derive(Debug, Clone, Default)]
pub struct TreeIndex {
    roots: Vec<Node>,
    locations: HashMap<String, Vec<usize>>,
}

impl TreeIndex {
    pub fn new(roots: Vec<Node>) -> Self {
        let mut locations = HashMap::new();
        let mut trail = Vec::new();
        for (index, root) in roots.iter().enumerate() {
            trail.push(index);
            index_subtree(root, &mut trail, &mut locations);
            trail.pop();
        }

        Self { roots, locations }
    }

    pub fn roots(&self) -> &[Node] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.locations.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        let trail = self.locations.get(id)?;
        self.resolve(trail)
    }

    /// Children listed under `parent`, or the top-level departments for `None`.
    pub fn children_of(&self, parent: Option<&str>) -> &[Node] {
        match parent {
            None => &self.roots,
            Some(id) => self
                .get(id)
                .map(|node| node.children.as_slice())
                .unwrap_or(&[]),
        }
    }

    pub fn parent_of(&self, id: &str) -> Option<&Node> {
        let trail = self.locations.get(id)?;
        let (_, parent_trail) = trail.split_last()?;
        if parent_trail.is_empty() {
            return None;
        }
        self.resolve(parent_trail)
    }

    /// Ancestors of `id`, root first, excluding the node itself.
    pub fn ancestors_of(&self, id: &str) -> Vec<&Node> {
        let Some(trail) = self.locations.get(id) else {
            return Vec::new();
        };

        (1..trail.len())
            .filter_map(|depth| self.resolve(&trail[..depth]))
            .collect()
    }

    pub fn node_type_of(&self, id: &str) -> Option<NodeType> {
        self.get(id).map(|node| node.node_type)
    }

    pub fn status_of(&self, id: &str) -> Option<ProcessingStatus> {
        self.get(id).map(Node::status)
    }

    /// Depth-first walk in display order, paired with nesting depth.
    pub fn walk(&self) -> Vec<(usize, &Node)> {
        let mut output = Vec::with_capacity(self.len());
        for root in &self.roots {
            walk_subtree(root, 0, &mut output);
        }
        output
    }

    fn resolve(&self, trail: &[usize]) -> Option<&Node> {
        let (first, rest) = trail.split_first()?;
        let mut current = self.roots.get(*first)?;
        for index in rest {
            current = current.children.get(*index)?;
        }
        Some(current)
    }
}

fn index_subtree(node: &Node, trail: &mut Vec<usize>, locations: &mut HashMap<String, Vec<usize>>) {
    locations.insert(node.id.clone(), trail.clone());
    for (index, child) in node.children.iter().enumerate() {
        trail.push(index);
        index_subtree(child, trail, locations);
        trail.pop();
    }
}

fn walk_subtree<'a>(node: &'a Node, depth: usize, output: &mut Vec<(usize, &'a Node)>) {
    output.push((depth, node));
    for child in &node.children {
        walk_subtree(child, depth + 1, output);
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::node::{Node, NodeType, ProcessingStatus};

    /// Two departments; the first semester of the first leads down to a module of four notes.
    pub(crate) fn sample_forest() -> Vec<Node> {
        let notes = vec![
            Node::new("note-1", "Intro", NodeType::Note).with_pdf("intro.pdf"),
            Node::new("note-2", "Lists", NodeType::Note).with_status(ProcessingStatus::Pending),
            Node::new("note-3", "Trees", NodeType::Note).with_status(ProcessingStatus::Ready),
            Node::new("note-4", "Graphs", NodeType::Note).with_status(ProcessingStatus::Failed),
        ];
        let module = Node::new("mod-1", "Week 1", NodeType::Module).with_children(notes);
        let subject = Node::new("sub-1", "Algorithms", NodeType::Subject).with_children(vec![module]);
        let semesters = vec![
            Node::new("sem-1", "Semester 1", NodeType::Semester).with_children(vec![subject]),
            Node::new("sem-2", "Semester 2", NodeType::Semester),
            Node::new("sem-3", "Semester 3", NodeType::Semester),
        ];

        vec![
            Node::new("dept-1", "Computer Science", NodeType::Department).with_children(semesters),
            Node::new("dept-2", "Physics", NodeType::Department),
        ]
    }
}
