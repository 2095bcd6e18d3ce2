//! The composed explorer store.
//!
//! Each component owns its own state; this type is the only place where they meet, so the
//! cross-component rules live here:
//!
//! * every navigation clears the selection, the transient edit, the open menu and any drag, and
//!   leaves selection mode;
//! * while selection mode is on, every selection call is filtered through the mode gate;
//! * commit results are routed into the warning dialog.

use std::time::{Duration, Instant};

use crate::clipboard::Clipboard;
use crate::collab::MutationError;
use crate::edit::{CreateCommit, EditController, RenameCommit, Resolution};
use crate::menu::{ContextMenu, resolve_menu};
use crate::mode_gate::{SelectionMode, SubMode};
use crate::navigation::{Crumb, Navigator, Rebind};
use crate::node::{Node, NodeType};
use crate::policy::Role;
use crate::rubber_band::{
    Bounds, DEFAULT_DRAG_THRESHOLD, DragOutcome, Point, PointerTarget, RubberBand,
};
use crate::selection::Selection;
use crate::tree::TreeIndex;
use crate::warning::{DEFAULT_DISMISS_AFTER, WarningDialog};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExplorerSettings {
    pub drag_threshold: f64,
    pub dismiss_after: Duration,
}

impl Default for ExplorerSettings {
    fn default() -> Self {
        Self {
            drag_threshold: DEFAULT_DRAG_THRESHOLD,
            dismiss_after: DEFAULT_DISMISS_AFTER,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExplorerState {
    navigator: Navigator,
    selection: Selection,
    mode: SelectionMode,
    edits: EditController,
    warning: WarningDialog,
    clipboard: Clipboard,
    menu: Option<ContextMenu>,
    drag: RubberBand,
}

impl Default for ExplorerState {
    fn default() -> Self {
        Self::new(ExplorerSettings::default())
    }
}

impl ExplorerState {
    pub fn new(settings: ExplorerSettings) -> Self {
        Self {
            navigator: Navigator::new(),
            selection: Selection::new(),
            mode: SelectionMode::default(),
            edits: EditController::default(),
            warning: WarningDialog::new(settings.dismiss_after),
            clipboard: Clipboard::default(),
            menu: None,
            drag: RubberBand::new(settings.drag_threshold),
        }
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn mode(&self) -> &SelectionMode {
        &self.mode
    }

    pub fn edits(&self) -> &EditController {
        &self.edits
    }

    pub fn warning(&self) -> &WarningDialog {
        &self.warning
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn menu(&self) -> Option<&ContextMenu> {
        self.menu.as_ref()
    }

    pub fn drag(&self) -> &RubberBand {
        &self.drag
    }

    // Navigation

    pub fn navigate_to(&mut self, node: &Node, ancestors: &[&Node]) {
        self.navigator.navigate_to(node, ancestors);
        self.leave_view();
    }

    /// Browses into `id` using the tree for its ancestors. Notes and unknown ids are ignored.
    pub fn open(&mut self, tree: &TreeIndex, id: &str) -> bool {
        let Some(node) = tree.get(id).filter(|node| node.node_type.is_navigable()) else {
            return false;
        };
        let ancestors = tree.ancestors_of(id);
        self.navigate_to(node, &ancestors);
        true
    }

    pub fn navigate_up(&mut self) -> bool {
        let moved = self.navigator.navigate_up();
        if moved {
            self.leave_view();
        }
        moved
    }

    pub fn navigate_home(&mut self) {
        self.navigator.navigate_home();
        self.leave_view();
    }

    pub fn set_current_path(&mut self, path: Vec<Crumb>) {
        self.navigator.set_current_path(path);
        self.leave_view();
    }

    /// Breadcrumb click: keep the first `len` crumbs.
    pub fn truncate_path(&mut self, len: usize) -> bool {
        let moved = self.navigator.truncate(len);
        if moved {
            self.leave_view();
        }
        moved
    }

    /// Ids listed in the current view, in display order.
    pub fn visible_ids(&self, tree: &TreeIndex) -> Vec<String> {
        tree.children_of(self.navigator.current_id())
            .iter()
            .map(|node| node.id.clone())
            .collect()
    }

    /// Re-aligns the store with a refreshed tree.
    pub fn rebind(&mut self, tree: &TreeIndex) -> Rebind {
        let outcome = self.navigator.rebind(tree);
        if outcome == Rebind::Truncated {
            self.leave_view();
        } else {
            let visible = self.visible_ids(tree);
            self.selection
                .retain(|id| visible.iter().any(|value| value == id));
        }

        if self
            .edits
            .renaming_id()
            .is_some_and(|id| !tree.contains(id))
        {
            self.edits.cancel();
        }
        if self
            .menu
            .as_ref()
            .is_some_and(|menu| !tree.contains(&menu.node_id))
        {
            self.menu = None;
        }
        self.clipboard.prune(|id| tree.contains(id));
        outcome
    }

    // Selection

    pub fn select(&mut self, tree: &TreeIndex, id: &str) -> bool {
        if !self.mode.admits(tree, id) {
            return false;
        }
        self.selection.select(id);
        true
    }

    pub fn toggle_select(&mut self, tree: &TreeIndex, id: &str) -> bool {
        if !self.mode.admits(tree, id) {
            return false;
        }
        self.selection.toggle_select(id);
        true
    }

    pub fn range_select(&mut self, tree: &TreeIndex, id: &str) -> bool {
        if !self.mode.admits(tree, id) {
            return false;
        }
        let visible = self.visible_ids(tree);
        let mode = self.mode;
        self.selection
            .range_select_where(id, &visible, |candidate| mode.admits(tree, candidate));
        true
    }

    /// Selects every visible id the gate admits.
    pub fn select_all(&mut self, tree: &TreeIndex) {
        let eligible = self.mode.filter_eligible(tree, &self.visible_ids(tree));
        self.selection.select_all(&eligible);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Selected ids in display order.
    pub fn selected_in_order(&self, tree: &TreeIndex) -> Vec<String> {
        let visible = self.visible_ids(tree);
        self.selection
            .ordered(&visible)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    // Rubber band

    pub fn band_armed(&self) -> bool {
        self.navigator.is_module_view()
    }

    pub fn pointer_down(&mut self, target: PointerTarget, at: Point) -> bool {
        self.menu = None;
        let armed = self.band_armed();
        self.drag.pointer_down(target, at, armed)
    }

    pub fn pointer_move(&mut self, at: Point) -> Option<Bounds> {
        self.drag.pointer_move(at)
    }

    /// Ends a drag. A click clears the selection; a band replaces it with the admitted hits,
    /// which may be none.
    pub fn pointer_up(
        &mut self,
        tree: &TreeIndex,
        at: Point,
        items: &[(String, Bounds)],
    ) -> Option<DragOutcome> {
        let outcome = self.drag.pointer_up(at, items)?;
        match &outcome {
            DragOutcome::Click => self.selection.clear(),
            DragOutcome::Band(hits) => {
                let admitted = self.mode.filter_eligible(tree, hits);
                self.selection.select_all(&admitted);
            }
        }
        Some(outcome)
    }

    pub fn cancel_drag(&mut self) {
        self.drag.teardown();
    }

    // Selection mode

    /// Refused unless a module's notes are listed. Switching sub-mode clears the selection.
    pub fn enter_selection_mode(&mut self, sub_mode: SubMode) -> bool {
        if !self.navigator.is_module_view() {
            return false;
        }
        if !self.mode.is_active() || self.mode.sub_mode() != sub_mode {
            self.selection.clear();
        }
        self.mode.enter(sub_mode);
        self.menu = None;
        true
    }

    pub fn set_sub_mode(&mut self, sub_mode: SubMode) -> bool {
        if !self.mode.is_active() {
            return false;
        }
        if self.mode.sub_mode() != sub_mode {
            self.mode.set_sub_mode(sub_mode);
            self.selection.clear();
        }
        true
    }

    pub fn exit_selection_mode(&mut self) {
        if self.mode.is_active() {
            self.mode.exit();
            self.selection.clear();
        }
    }

    // Transient edits

    pub fn start_renaming(&mut self, tree: &TreeIndex, id: &str) -> bool {
        let Some(node) = tree.get(id) else {
            return false;
        };
        self.menu = None;
        self.edits.start_renaming(node);
        true
    }

    pub fn start_creating(&mut self, child_type: NodeType, parent_id: Option<&str>) {
        self.menu = None;
        self.edits.start_creating(child_type, parent_id);
    }

    pub fn set_draft(&mut self, value: &str) {
        self.edits.set_draft(value);
    }

    pub fn cancel_edit(&mut self) -> bool {
        self.edits.cancel()
    }

    pub fn begin_rename_commit(&mut self, label: &str) -> Option<RenameCommit> {
        self.edits.begin_rename_commit(label)
    }

    pub fn complete_rename(
        &mut self,
        commit: &RenameCommit,
        result: Result<(), MutationError>,
        now: Instant,
    ) -> Resolution<String> {
        let resolution = self.edits.complete_rename(commit, result);
        self.route_warning(&resolution, now);
        resolution
    }

    pub fn begin_create_commit(&mut self, label: &str) -> Option<CreateCommit> {
        self.edits.begin_create_commit(label)
    }

    pub fn complete_create(
        &mut self,
        commit: &CreateCommit,
        result: Result<Node, MutationError>,
        now: Instant,
    ) -> Resolution<Node> {
        let resolution = self.edits.complete_create(commit, result);
        self.route_warning(&resolution, now);
        resolution
    }

    // Warning dialog

    pub fn report_error(&mut self, message: &str, now: Instant) {
        self.warning.open_error(message, now);
    }

    pub fn dismiss_warning(&mut self) -> bool {
        self.warning.dismiss()
    }

    /// Advances the warning timer. Returns true when the dialog just closed.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.warning.tick(now)
    }

    // Context menu

    pub fn open_menu(
        &mut self,
        tree: &TreeIndex,
        node_id: &str,
        role: Role,
        position: Point,
    ) -> bool {
        self.menu =
            resolve_menu(tree, &self.navigator, node_id, role).map(|entries| ContextMenu {
                position,
                node_id: node_id.to_string(),
                entries,
            });
        self.menu.is_some()
    }

    pub fn close_menu(&mut self) -> Option<ContextMenu> {
        self.menu.take()
    }

    // Clipboard

    pub fn cut_selection(&mut self, tree: &TreeIndex) -> usize {
        let ids = self.selected_in_order(tree);
        let count = ids.len();
        self.clipboard.cut(ids);
        count
    }

    pub fn copy_selection(&mut self, tree: &TreeIndex) -> usize {
        let ids = self.selected_in_order(tree);
        let count = ids.len();
        self.clipboard.copy(ids);
        count
    }

    fn leave_view(&mut self) {
        self.selection.clear();
        self.edits.cancel();
        self.menu = None;
        self.drag.teardown();
        self.mode.exit();
    }

    fn route_warning<T>(&mut self, resolution: &Resolution<T>, now: Instant) {
        match resolution {
            Resolution::Stale => {}
            Resolution::Committed(_) => {
                self.warning.dismiss();
            }
            Resolution::Duplicate { name } => self.warning.open_duplicate(name, now),
            Resolution::Failed { message } => self.warning.open_error(message, now),
        }
    }
}
