use std::collections::BTreeSet;

/// Selected ids plus the anchor used for shift-range selection.
///
/// The anchor is always a member of the selection or absent. `base` is the selection as it
/// stood when the anchor was last placed, so repeated range selections from one anchor grow
/// and shrink instead of accumulating.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    selected: BTreeSet<String>,
    anchor: Option<String>,
    base: BTreeSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_ids(&self) -> &BTreeSet<String> {
        &self.selected
    }

    pub fn anchor(&self) -> Option<&str> {
        self.anchor.as_deref()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Selected ids in the order they appear in `visible_ids`.
    pub fn ordered<'a>(&self, visible_ids: &'a [String]) -> Vec<&'a str> {
        visible_ids
            .iter()
            .filter(|id| self.selected.contains(id.as_str()))
            .map(String::as_str)
            .collect()
    }

    pub fn select(&mut self, id: &str) {
        self.selected.clear();
        self.selected.insert(id.to_string());
        self.place_anchor(Some(id));
    }

    pub fn toggle_select(&mut self, id: &str) {
        if self.selected.remove(id) {
            self.place_anchor(None);
        } else {
            self.selected.insert(id.to_string());
            self.place_anchor(Some(id));
        }
    }

    pub fn range_select(&mut self, id: &str, visible_ids: &[String]) {
        self.range_select_where(id, visible_ids, |_| true);
    }

    /// Range selection that only admits ids passing `admit`. The anchor does not move.
    pub fn range_select_where<F>(&mut self, id: &str, visible_ids: &[String], admit: F)
    where
        F: Fn(&str) -> bool,
    {
        let Some(anchor) = self.anchor.clone() else {
            self.select(id);
            return;
        };

        let anchor_index = visible_ids.iter().position(|value| *value == anchor);
        let target_index = visible_ids.iter().position(|value| value == id);
        let (Some(anchor_index), Some(target_index)) = (anchor_index, target_index) else {
            self.select(id);
            return;
        };

        let (start, end) = if anchor_index <= target_index {
            (anchor_index, target_index)
        } else {
            (target_index, anchor_index)
        };

        let mut next = self.base.clone();
        next.extend(
            visible_ids[start..=end]
                .iter()
                .filter(|value| admit(value.as_str()))
                .cloned(),
        );
        next.insert(anchor);
        self.selected = next;
    }

    pub fn clear(&mut self) {
        self.selected.clear();
        self.place_anchor(None);
    }

    /// Replaces the selection with `ids`; the anchor becomes the last id.
    pub fn select_all(&mut self, ids: &[String]) {
        self.selected = ids.iter().cloned().collect();
        self.place_anchor(ids.last().map(String::as_str));
    }

    /// Drops ids that are no longer listed, keeping the anchor invariant.
    pub fn retain<F>(&mut self, keep: F)
    where
        F: Fn(&str) -> bool,
    {
        self.selected.retain(|id| keep(id));
        self.base.retain(|id| keep(id));
        if self
            .anchor
            .as_deref()
            .is_some_and(|anchor| !self.selected.contains(anchor))
        {
            self.anchor = None;
        }
    }

    fn place_anchor(&mut self, anchor: Option<&str>) {
        self.anchor = anchor.map(str::to_string);
        self.base = self.selected.clone();
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_string()).collect()
    }

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|value| (*value).to_string()).collect()
    }

    #[test]
    fn select_replaces_and_anchors() {
        let mut selection = Selection::new();
        selection.select("a");
        selection.select("b");
        assert_eq!(selection.selected_ids(), &set(&["b"]));
        assert_eq!(selection.anchor(), Some("b"));
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut selection = Selection::new();
        selection.select("a");
        selection.toggle_select("b");
        assert_eq!(selection.selected_ids(), &set(&["a", "b"]));
        assert_eq!(selection.anchor(), Some("b"));

        selection.toggle_select("b");
        assert_eq!(selection.selected_ids(), &set(&["a"]));
        assert_eq!(selection.anchor(), None);
    }

    #[test]
    fn range_without_anchor_behaves_like_select() {
        let visible = ids(&["sem-1", "sem-2", "sem-3"]);
        let mut selection = Selection::new();
        selection.range_select("sem-2", &visible);
        assert_eq!(selection.selected_ids(), &set(&["sem-2"]));
        assert_eq!(selection.anchor(), Some("sem-2"));
    }

    #[test]
    fn range_from_anchor_selects_inclusive_span() {
        let visible = ids(&["sem-1", "sem-2", "sem-3"]);
        let mut selection = Selection::new();
        selection.select("sem-1");
        selection.range_select("sem-3", &visible);
        assert_eq!(selection.selected_ids(), &set(&["sem-1", "sem-2", "sem-3"]));
        assert_eq!(selection.anchor(), Some("sem-1"));
    }

    #[test]
    fn range_shrinks_relative_to_original_anchor() {
        let visible = ids(&["a", "b", "c", "d"]);
        let mut selection = Selection::new();
        selection.select("a");
        selection.range_select("d", &visible);
        selection.range_select("b", &visible);
        assert_eq!(selection.selected_ids(), &set(&["a", "b"]));
    }

    #[test]
    fn range_works_upwards_and_keeps_toggled_items() {
        let visible = ids(&["a", "b", "c", "d", "e"]);
        let mut selection = Selection::new();
        selection.select("a");
        selection.toggle_select("d");
        selection.range_select("b", &visible);
        assert_eq!(selection.selected_ids(), &set(&["a", "b", "c", "d"]));
    }

    #[test]
    fn range_with_unlisted_target_falls_back_to_select() {
        let visible = ids(&["a", "b"]);
        let mut selection = Selection::new();
        selection.select("a");
        selection.range_select("z", &visible);
        assert_eq!(selection.selected_ids(), &set(&["z"]));
        assert_eq!(selection.anchor(), Some("z"));
    }

    #[test]
    fn range_where_skips_rejected_ids_but_keeps_anchor() {
        let visible = ids(&["a", "b", "c"]);
        let mut selection = Selection::new();
        selection.select("a");
        selection.range_select_where("c", &visible, |id| id != "b");
        assert_eq!(selection.selected_ids(), &set(&["a", "c"]));
    }

    #[test]
    fn select_all_anchors_last_id_or_clears() {
        let mut selection = Selection::new();
        selection.select_all(&ids(&["a", "b", "c"]));
        assert_eq!(selection.len(), 3);
        assert_eq!(selection.anchor(), Some("c"));

        selection.select_all(&[]);
        assert!(selection.is_empty());
        assert_eq!(selection.anchor(), None);
    }

    #[test]
    fn retain_drops_anchor_when_it_leaves() {
        let mut selection = Selection::new();
        selection.select_all(&ids(&["a", "b"]));
        selection.retain(|id| id != "b");
        assert_eq!(selection.selected_ids(), &set(&["a"]));
        assert_eq!(selection.anchor(), None);
    }

    #[test]
    fn ordered_follows_visible_order() {
        let visible = ids(&["c", "a", "b"]);
        let mut selection = Selection::new();
        selection.select_all(&ids(&["a", "c"]));
        assert_eq!(selection.ordered(&visible), vec!["c", "a"]);
    }

    proptest! {
        #[test]
        fn repeated_range_is_idempotent(len in 1usize..20, anchor in 0usize..20, target in 0usize..20) {
            let visible: Vec<String> = (0..len).map(|index| format!("n{index}")).collect();
            let anchor = anchor % len;
            let target = target % len;

            let mut selection = Selection::new();
            selection.select(&visible[anchor]);
            selection.range_select(&visible[target], &visible);
            let once = selection.clone();
            selection.range_select(&visible[target], &visible);

            prop_assert_eq!(selection, once);
        }

        #[test]
        fn range_result_is_exactly_the_span(len in 1usize..20, anchor in 0usize..20, far in 0usize..20, near in 0usize..20) {
            let visible: Vec<String> = (0..len).map(|index| format!("n{index}")).collect();
            let anchor = anchor % len;

            let mut selection = Selection::new();
            selection.select(&visible[anchor]);
            selection.range_select(&visible[far % len], &visible);
            selection.range_select(&visible[near % len], &visible);

            let near = near % len;
            let (start, end) = if anchor <= near { (anchor, near) } else { (near, anchor) };
            let expected: BTreeSet<String> = visible[start..=end].iter().cloned().collect();
            prop_assert_eq!(selection.selected_ids(), &expected);
        }

        #[test]
        fn anchor_is_always_selected_or_absent(ops in proptest::collection::vec((0u8..4, 0usize..8), 0..40)) {
            let visible: Vec<String> = (0..8).map(|index| format!("n{index}")).collect();
            let mut selection = Selection::new();

            for (op, index) in ops {
                let id = &visible[index];
                match op {
                    0 => selection.select(id),
                    1 => selection.toggle_select(id),
                    2 => selection.range_select(id, &visible),
                    _ => selection.select_all(&visible[..index]),
                }
                if let Some(anchor) = selection.anchor() {
                    prop_assert!(selection.contains(anchor));
                }
            }
        }
    }
}
