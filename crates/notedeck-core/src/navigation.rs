use crate::node::{Node, NodeType};
use crate::tree::TreeIndex;

/// One breadcrumb: the identity of a browsed ancestor. Nodes themselves live in the tree index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crumb {
    pub id: String,
    pub label: String,
    pub node_type: NodeType,
}

impl From<&Node> for Crumb {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            label: node.label.clone(),
            node_type: node.node_type,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rebind {
    Unchanged,
    Relabelled,
    Truncated,
}

/// Breadcrumb trail from home to the node being browsed. An empty path lists the departments.
///
/// The navigator trusts its callers: ancestor chains are checked with debug assertions only,
/// because the navigator never sees the whole tree.
#[derive(Debug, Clone, Default)]
pub struct Navigator {
    path: Vec<Crumb>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(&self) -> &[Crumb] {
        &self.path
    }

    pub fn tail(&self) -> Option<&Crumb> {
        self.path.last()
    }

    pub fn current_id(&self) -> Option<&str> {
        self.tail().map(|crumb| crumb.id.as_str())
    }

    pub fn tail_type(&self) -> Option<NodeType> {
        self.tail().map(|crumb| crumb.node_type)
    }

    pub fn is_home(&self) -> bool {
        self.path.is_empty()
    }

    /// True while the listing is a module's flat list of notes.
    pub fn is_module_view(&self) -> bool {
        self.tail_type() == Some(NodeType::Module)
    }

    /// Type of the entries currently listed.
    pub fn listed_type(&self) -> Option<NodeType> {
        match self.tail_type() {
            None => Some(NodeType::Department),
            Some(node_type) => node_type.child_type(),
        }
    }

    pub fn navigate_to(&mut self, node: &Node, ancestors: &[&Node]) {
        debug_assert!(
            node.node_type.is_navigable(),
            "cannot browse into note '{}'",
            node.id
        );
        debug_assert!(
            is_valid_chain(ancestors.iter().copied().chain(std::iter::once(node))),
            "ancestor chain for '{}' breaks the department > semester > subject > module order",
            node.id
        );

        self.path = ancestors
            .iter()
            .map(|ancestor| Crumb::from(*ancestor))
            .chain(std::iter::once(Crumb::from(node)))
            .collect();
    }

    /// Pops the tail. Returns false when already home.
    pub fn navigate_up(&mut self) -> bool {
        self.path.pop().is_some()
    }

    pub fn navigate_home(&mut self) {
        self.path.clear();
    }

    pub fn set_current_path(&mut self, path: Vec<Crumb>) {
        debug_assert!(
            is_valid_crumb_chain(&path),
            "breadcrumb path breaks the adjacency order"
        );
        self.path = path;
    }

    /// Truncates the path to its first `len` crumbs (breadcrumb click).
    pub fn truncate(&mut self, len: usize) -> bool {
        if len >= self.path.len() {
            return false;
        }
        self.path.truncate(len);
        true
    }

    /// Re-reads crumb labels from a refreshed tree, cutting the path at the first crumb that
    /// vanished or moved.
    pub fn rebind(&mut self, tree: &TreeIndex) -> Rebind {
        let mut fresh_labels = Vec::with_capacity(self.path.len());
        let mut expected_parent: Option<&str> = None;

        for crumb in &self.path {
            let parent = tree.parent_of(&crumb.id).map(|node| node.id.as_str());
            let Some(node) = tree.get(&crumb.id).filter(|_| parent == expected_parent) else {
                break;
            };
            fresh_labels.push(node.label.clone());
            expected_parent = Some(crumb.id.as_str());
        }

        if fresh_labels.len() < self.path.len() {
            self.path.truncate(fresh_labels.len());
            return Rebind::Truncated;
        }

        let mut outcome = Rebind::Unchanged;
        for (crumb, label) in self.path.iter_mut().zip(fresh_labels) {
            if crumb.label != label {
                crumb.label = label;
                outcome = Rebind::Relabelled;
            }
        }
        outcome
    }

    pub fn breadcrumb_labels(&self) -> Vec<&str> {
        self.path.iter().map(|crumb| crumb.label.as_str()).collect()
    }
}

fn is_valid_chain<'a>(nodes: impl Iterator<Item = &'a Node>) -> bool {
    let types: Vec<NodeType> = nodes.map(|node| node.node_type).collect();
    is_valid_type_chain(&types)
}

fn is_valid_crumb_chain(path: &[Crumb]) -> bool {
    let types: Vec<NodeType> = path.iter().map(|crumb| crumb.node_type).collect();
    is_valid_type_chain(&types)
}

fn is_valid_type_chain(types: &[NodeType]) -> bool {
    if let Some(first) = types.first()
        && *first != NodeType::Department
    {
        return false;
    }

    types.windows(2).all(|pair| pair[0].accepts_child(pair[1]))
}
