use crate::navigation::Navigator;
use crate::node::NodeType;
use crate::policy::{Action, Role, allowed, creatable_child};
use crate::rubber_band::Point;
use crate::tree::TreeIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Open,
    Download,
    CreateChild(NodeType),
    Rename,
    Delete,
}

impl MenuAction {
    pub fn label(self) -> String {
        match self {
            Self::Open => "Open".to_string(),
            Self::Download => "Download".to_string(),
            Self::CreateChild(child_type) => format!("New {child_type}"),
            Self::Rename => "Rename".to_string(),
            Self::Delete => "Delete".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEntry {
    Action(MenuAction),
    Separator,
}

impl MenuEntry {
    pub fn action(self) -> Option<MenuAction> {
        match self {
            Self::Action(action) => Some(action),
            Self::Separator => None,
        }
    }
}

/// An open right-click menu. At most one exists at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextMenu {
    pub position: Point,
    pub node_id: String,
    pub entries: Vec<MenuEntry>,
}

impl ContextMenu {
    pub fn actions(&self) -> impl Iterator<Item = MenuAction> + '_ {
        self.entries.iter().filter_map(|entry| entry.action())
    }
}

/// Builds the entries offered for `node_id`. `None` means no menu: inside a module view, where
/// note actions belong to the selection bar, or when the node is unknown.
pub fn resolve_menu(
    tree: &TreeIndex,
    navigator: &Navigator,
    node_id: &str,
    role: Role,
) -> Option<Vec<MenuEntry>> {
    if navigator.is_module_view() {
        return None;
    }
    let node = tree.get(node_id)?;
    let node_type = node.node_type;

    let mut entries = vec![MenuEntry::Action(MenuAction::Open)];
    if node.is_note() && node.has_file() {
        entries.push(MenuEntry::Action(MenuAction::Download));
    }

    entries.push(MenuEntry::Separator);
    if let Some(child_type) = creatable_child(role, Some(node_type)) {
        entries.push(MenuEntry::Action(MenuAction::CreateChild(child_type)));
    }
    if allowed(role, node_type, Action::Rename) {
        entries.push(MenuEntry::Action(MenuAction::Rename));
    }

    entries.push(MenuEntry::Separator);
    if allowed(role, node_type, Action::Delete) {
        entries.push(MenuEntry::Action(MenuAction::Delete));
    }

    Some(collapse_separators(entries))
}

fn collapse_separators(entries: Vec<MenuEntry>) -> Vec<MenuEntry> {
    let mut collapsed: Vec<MenuEntry> = Vec::with_capacity(entries.len());
    for entry in entries {
        let is_separator = entry == MenuEntry::Separator;
        let after_separator_or_start = collapsed
            .last()
            .is_none_or(|last| *last == MenuEntry::Separator);
        if is_separator && after_separator_or_start {
            continue;
        }
        collapsed.push(entry);
    }

    if collapsed.last() == Some(&MenuEntry::Separator) {
        collapsed.pop();
    }
    collapsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::fixtures::sample_forest;

    fn navigator_at(tree: &TreeIndex, id: Option<&str>) -> Navigator {
        let mut navigator = Navigator::new();
        if let Some(id) = id {
            let node = tree.get(id).expect("node");
            navigator.navigate_to(node, &tree.ancestors_of(id));
        }
        navigator
    }

    fn actions(entries: &[MenuEntry]) -> Vec<MenuAction> {
        entries.iter().filter_map(|entry| entry.action()).collect()
    }

    #[test]
    fn admin_on_department_gets_full_menu() {
        let tree = TreeIndex::new(sample_forest());
        let entries =
            resolve_menu(&tree, &navigator_at(&tree, None), "dept-1", Role::Admin).expect("menu");

        assert_eq!(
            entries,
            vec![
                MenuEntry::Action(MenuAction::Open),
                MenuEntry::Separator,
                MenuEntry::Action(MenuAction::CreateChild(NodeType::Semester)),
                MenuEntry::Action(MenuAction::Rename),
                MenuEntry::Separator,
                MenuEntry::Action(MenuAction::Delete),
            ]
        );
    }

    #[test]
    fn student_menu_is_open_only() {
        let tree = TreeIndex::new(sample_forest());
        let entries = resolve_menu(&tree, &navigator_at(&tree, None), "dept-1", Role::Student)
            .expect("menu");
        assert_eq!(entries, vec![MenuEntry::Action(MenuAction::Open)]);
    }

    #[test]
    fn staff_on_subject_creates_modules_without_rename() {
        let tree = TreeIndex::new(sample_forest());
        let entries = resolve_menu(&tree, &navigator_at(&tree, Some("sem-1")), "sub-1", Role::Staff)
            .expect("menu");
        assert_eq!(
            actions(&entries),
            vec![MenuAction::Open, MenuAction::CreateChild(NodeType::Module)]
        );
        assert_eq!(entries.last(), Some(&MenuEntry::Action(MenuAction::CreateChild(NodeType::Module))));
    }

    #[test]
    fn staff_on_module_can_rename_and_delete() {
        let tree = TreeIndex::new(sample_forest());
        let entries = resolve_menu(&tree, &navigator_at(&tree, Some("sub-1")), "mod-1", Role::Staff)
            .expect("menu");
        assert_eq!(
            entries,
            vec![
                MenuEntry::Action(MenuAction::Open),
                MenuEntry::Separator,
                MenuEntry::Action(MenuAction::Rename),
                MenuEntry::Separator,
                MenuEntry::Action(MenuAction::Delete),
            ]
        );
    }

    #[test]
    fn module_view_shows_no_menu() {
        let tree = TreeIndex::new(sample_forest());
        let navigator = navigator_at(&tree, Some("mod-1"));
        assert_eq!(resolve_menu(&tree, &navigator, "note-1", Role::Admin), None);
    }

    #[test]
    fn unknown_node_shows_no_menu() {
        let tree = TreeIndex::new(sample_forest());
        assert_eq!(
            resolve_menu(&tree, &navigator_at(&tree, None), "missing", Role::Admin),
            None
        );
    }

    #[test]
    fn notes_with_files_offer_download() {
        let tree = TreeIndex::new(sample_forest());
        let entries = resolve_menu(&tree, &navigator_at(&tree, Some("sub-1")), "note-1", Role::Staff)
            .expect("menu");
        assert_eq!(
            actions(&entries),
            vec![
                MenuAction::Open,
                MenuAction::Download,
                MenuAction::Rename,
                MenuAction::Delete
            ]
        );
    }

    #[test]
    fn collapse_drops_leading_trailing_and_doubled_separators() {
        let entries = collapse_separators(vec![
            MenuEntry::Separator,
            MenuEntry::Action(MenuAction::Open),
            MenuEntry::Separator,
            MenuEntry::Separator,
            MenuEntry::Action(MenuAction::Rename),
            MenuEntry::Separator,
        ]);
        assert_eq!(
            entries,
            vec![
                MenuEntry::Action(MenuAction::Open),
                MenuEntry::Separator,
                MenuEntry::Action(MenuAction::Rename),
            ]
        );
    }
}
