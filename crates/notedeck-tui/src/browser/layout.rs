use notedeck_core::menu::{ContextMenu, MenuAction, MenuEntry};
use notedeck_core::rubber_band::{Bounds, Point};
use ratatui::layout::{Constraint, Direction, Layout, Margin, Rect};

use super::BrowserScreen;
use crate::ui::text::key_hint_height;

/// Terminal cells are roughly twice as tall as they are wide. Pointer geometry is measured in
/// column widths so the drag threshold means the same distance on both axes.
const CELL_ASPECT: f64 = 2.0;

/// Width of the "[x] " marker in front of every label.
pub(super) const MARKER_WIDTH: u16 = 4;

pub(super) const CRUMB_SEPARATOR: &str = " › ";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(super) struct ScreenAreas {
    pub(super) crumbs: Rect,
    pub(super) list: Rect,
    pub(super) status: Rect,
    pub(super) keys: Rect,
}

pub(super) fn screen_areas(area: Rect, key_height: u16) -> ScreenAreas {
    let [crumbs, list, status, keys] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(key_height),
        ])
        .areas(area);
    ScreenAreas {
        crumbs,
        list,
        status,
        keys,
    }
}

/// One listed node as laid out on screen. `item` covers the marker and label; the rest of `row`
/// is background for the rubber band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct RowHit {
    pub(super) index: usize,
    pub(super) id: String,
    pub(super) row: Rect,
    pub(super) item: Rect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct MenuHit {
    pub(super) area: Rect,
    pub(super) rows: Vec<(Rect, Option<MenuAction>)>,
}

/// Geometry of the last layout, used both to draw and to route mouse events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct HitMap {
    pub(super) screen: Rect,
    pub(super) areas: ScreenAreas,
    /// Breadcrumb segments as (path length after the click, area).
    pub(super) crumbs: Vec<(usize, Rect)>,
    /// Inner list area, inside the border.
    pub(super) list: Rect,
    pub(super) offset: usize,
    pub(super) rows: Vec<RowHit>,
    pub(super) create_row: Option<Rect>,
    pub(super) menu: Option<MenuHit>,
}

impl HitMap {
    pub(super) fn row_at(&self, column: u16, row: u16) -> Option<&RowHit> {
        self.rows.iter().find(|hit| contains(hit.row, column, row))
    }

    pub(super) fn crumb_at(&self, column: u16, row: u16) -> Option<usize> {
        self.crumbs
            .iter()
            .find(|(_, area)| contains(*area, column, row))
            .map(|(len, _)| *len)
    }

    pub(super) fn in_list(&self, column: u16, row: u16) -> bool {
        contains(self.list, column, row)
    }

    /// Pointer bounds for every laid-out item, in listing order.
    pub(super) fn item_bounds(&self) -> Vec<(String, Bounds)> {
        self.rows
            .iter()
            .map(|hit| (hit.id.clone(), rect_bounds(hit.item)))
            .collect()
    }
}

impl BrowserScreen {
    /// Recomputes the hit map for `area`. Rendering calls this first; tests call it directly.
    pub(crate) fn relayout(&mut self, area: Rect) {
        let key_height = key_hint_height(area.width, self.key_hint(area.width));
        let areas = screen_areas(area, key_height);
        let list = areas.list.inner(Margin::new(1, 1));

        let listing = self.listing();
        let creating = self.workspace.state.edits().is_creating();
        let focus = if creating { listing.len() } else { self.cursor };
        let offset = scroll_offset(focus, usize::from(list.height));

        let mut rows = Vec::new();
        let mut create_row = None;
        let slots = listing.len() + usize::from(creating);
        for slot in offset..slots {
            let Some(y) = slot_y(list, slot - offset) else {
                break;
            };
            let row = Rect::new(list.x, y, list.width, 1);
            match listing.get(slot) {
                Some(node) => {
                    let label_width = u16::try_from(node.label.chars().count()).unwrap_or(u16::MAX);
                    let item_width = MARKER_WIDTH.saturating_add(label_width).min(list.width);
                    rows.push(RowHit {
                        index: slot,
                        id: node.id.clone(),
                        row,
                        item: Rect::new(list.x, y, item_width, 1),
                    });
                }
                None => create_row = Some(row),
            }
        }

        let crumbs = crumb_segments(
            areas.crumbs.inner(Margin::new(1, 1)),
            &self.workspace.state.navigator().breadcrumb_labels(),
        );
        let menu = self
            .workspace
            .state
            .menu()
            .map(|menu| menu_hit(menu, area));

        self.hits = HitMap {
            screen: area,
            areas,
            crumbs,
            list,
            offset,
            rows,
            create_row,
            menu,
        };
    }
}

pub(super) fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x
        && column < area.x.saturating_add(area.width)
        && row >= area.y
        && row < area.y.saturating_add(area.height)
}

/// Pointer position at the centre of a cell.
pub(super) fn cell_point(column: u16, row: u16) -> Point {
    Point::new(
        f64::from(column) + 0.5,
        (f64::from(row) + 0.5) * CELL_ASPECT,
    )
}

/// The cell a pointer position falls in.
pub(super) fn point_cell(point: Point) -> (u16, u16) {
    let column = point.x.max(0.0).floor();
    let row = (point.y / CELL_ASPECT).max(0.0).floor();
    (
        column.min(f64::from(u16::MAX)) as u16,
        row.min(f64::from(u16::MAX)) as u16,
    )
}

pub(super) fn rect_bounds(area: Rect) -> Bounds {
    Bounds::new(
        f64::from(area.x),
        f64::from(area.y) * CELL_ASPECT,
        f64::from(area.x.saturating_add(area.width)),
        f64::from(area.y.saturating_add(area.height)) * CELL_ASPECT,
    )
}

/// Smallest cell rectangle covering `bounds`, clipped to `within`.
pub(super) fn bounds_rect(bounds: Bounds, within: Rect) -> Rect {
    let left = bounds.left.floor().max(f64::from(within.x));
    let right = bounds
        .right
        .ceil()
        .min(f64::from(within.x.saturating_add(within.width)));
    let top = (bounds.top / CELL_ASPECT).floor().max(f64::from(within.y));
    let bottom = (bounds.bottom / CELL_ASPECT)
        .ceil()
        .min(f64::from(within.y.saturating_add(within.height)));
    if right <= left || bottom <= top {
        return Rect::new(within.x, within.y, 0, 0);
    }
    Rect::new(
        left as u16,
        top as u16,
        (right - left) as u16,
        (bottom - top) as u16,
    )
}

pub(super) fn scroll_offset(focus: usize, visible: usize) -> usize {
    if visible == 0 || focus < visible {
        0
    } else {
        focus + 1 - visible
    }
}

fn slot_y(list: Rect, visible_index: usize) -> Option<u16> {
    let index = u16::try_from(visible_index).ok()?;
    (index < list.height).then(|| list.y + index)
}

/// Lays out "Home › a › b" left to right. Segment `i` truncates the path to `i` crumbs; the
/// current crumb is laid out but maps to no move.
pub(super) fn crumb_segments(inner: Rect, labels: &[&str]) -> Vec<(usize, Rect)> {
    let right = inner.x.saturating_add(inner.width);
    let separator = u16::try_from(CRUMB_SEPARATOR.chars().count()).unwrap_or(3);
    let mut x = inner.x;
    let mut segments = Vec::new();

    for (len, label) in std::iter::once("Home").chain(labels.iter().copied()).enumerate() {
        if len > 0 {
            x = x.saturating_add(separator);
        }
        if x >= right {
            break;
        }
        let width = u16::try_from(label.chars().count())
            .unwrap_or(u16::MAX)
            .min(right - x);
        if len < labels.len() {
            segments.push((len, Rect::new(x, inner.y, width, 1)));
        }
        x = x.saturating_add(width);
    }
    segments
}

fn menu_hit(menu: &ContextMenu, screen: Rect) -> MenuHit {
    let labels: Vec<Option<(MenuAction, String)>> = menu
        .entries
        .iter()
        .map(|entry| match entry {
            MenuEntry::Action(action) => Some((*action, action.label())),
            MenuEntry::Separator => None,
        })
        .collect();
    let widest = labels
        .iter()
        .flatten()
        .map(|(_, label)| label.chars().count())
        .max()
        .unwrap_or(0);

    let width = u16::try_from(widest + 4).unwrap_or(u16::MAX).min(screen.width);
    let height = u16::try_from(labels.len() + 2)
        .unwrap_or(u16::MAX)
        .min(screen.height);
    let (column, row) = point_cell(menu.position);
    let x = column.min(screen.x.saturating_add(screen.width).saturating_sub(width));
    let y = row.min(screen.y.saturating_add(screen.height).saturating_sub(height));
    let area = Rect::new(x, y, width, height);

    let inner = area.inner(Margin::new(1, 1));
    let rows = labels
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let y = slot_y(inner, index)?;
            Some((
                Rect::new(inner.x, y, inner.width, 1),
                entry.as_ref().map(|(action, _)| *action),
            ))
        })
        .collect();
    MenuHit { area, rows }
}

#[cfg(test)]
mod tests {
    use notedeck_core::rubber_band::Bounds;
    use ratatui::layout::Rect;

    use super::{bounds_rect, cell_point, crumb_segments, point_cell, rect_bounds, scroll_offset};

    #[test]
    fn crumb_segments_skip_the_current_crumb() {
        let inner = Rect::new(1, 1, 60, 1);
        let segments = crumb_segments(inner, &["Computer Science", "Semester 1"]);
        assert_eq!(
            segments,
            vec![(0, Rect::new(1, 1, 4, 1)), (1, Rect::new(8, 1, 16, 1))]
        );
    }

    #[test]
    fn crumb_segments_at_home_are_empty() {
        assert!(crumb_segments(Rect::new(1, 1, 60, 1), &[]).is_empty());
    }

    #[test]
    fn crumb_segments_clip_to_the_available_width() {
        let segments = crumb_segments(Rect::new(0, 0, 10, 1), &["Computer Science", "Semester 1"]);
        assert_eq!(
            segments,
            vec![(0, Rect::new(0, 0, 4, 1)), (1, Rect::new(7, 0, 3, 1))]
        );
    }

    #[test]
    fn scroll_offset_keeps_focus_visible() {
        assert_eq!(scroll_offset(2, 5), 0);
        assert_eq!(scroll_offset(7, 5), 3);
        assert_eq!(scroll_offset(3, 0), 0);
    }

    #[test]
    fn cells_map_to_points_and_back() {
        let point = cell_point(10, 4);
        assert_eq!(point_cell(point), (10, 4));
        assert_eq!(rect_bounds(Rect::new(2, 3, 5, 1)), Bounds::new(2.0, 6.0, 7.0, 8.0));
    }

    #[test]
    fn bounds_rect_covers_touched_cells_and_clips() {
        let within = Rect::new(1, 1, 20, 10);
        let band = Bounds::from_corners(cell_point(3, 2), cell_point(8, 4));
        assert_eq!(bounds_rect(band, within), Rect::new(3, 2, 6, 3));

        let outside = Bounds::new(40.0, 40.0, 50.0, 50.0);
        assert_eq!(bounds_rect(outside, within).area(), 0);
    }
}
