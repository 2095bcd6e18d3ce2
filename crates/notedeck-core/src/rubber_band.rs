pub const DEFAULT_DRAG_THRESHOLD: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Bounds {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Normalizes two arbitrary corners into a rectangle.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            left: a.x.min(b.x),
            top: a.y.min(b.y),
            right: a.x.max(b.x),
            bottom: a.y.max(b.y),
        }
    }

    /// Open-interval overlap: rectangles that merely touch do not intersect.
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.left < other.right
            && self.right > other.left
            && self.top < other.bottom
            && self.bottom > other.top
    }
}

/// What the pointer went down on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    Background,
    Item,
    Interactive,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    /// Movement stayed under the threshold: a plain background click.
    Click,
    /// Ids of every item the band overlapped, in item order. Empty means clear.
    Band(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragSession {
    start: Point,
    current: Point,
}

/// Drag-to-select tracker. A session exists only between pointer-down and pointer-up; move
/// and up events outside a session are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct RubberBand {
    threshold: f64,
    session: Option<DragSession>,
}

impl Default for RubberBand {
    fn default() -> Self {
        Self::new(DEFAULT_DRAG_THRESHOLD)
    }
}

impl RubberBand {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            session: None,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Starts a drag when `armed` and the pointer landed on plain background.
    pub fn pointer_down(&mut self, target: PointerTarget, at: Point, armed: bool) -> bool {
        if !armed || target != PointerTarget::Background {
            return false;
        }

        self.session = Some(DragSession {
            start: at,
            current: at,
        });
        true
    }

    /// Tracks the live rectangle; `None` when no drag is running.
    pub fn pointer_move(&mut self, at: Point) -> Option<Bounds> {
        let session = self.session.as_mut()?;
        session.current = at;
        Some(Bounds::from_corners(session.start, session.current))
    }

    pub fn live_bounds(&self) -> Option<Bounds> {
        self.session
            .map(|session| Bounds::from_corners(session.start, session.current))
    }

    /// Ends the drag and resolves it against the rendered item rectangles.
    pub fn pointer_up(&mut self, at: Point, items: &[(String, Bounds)]) -> Option<DragOutcome> {
        let mut session = self.session.take()?;
        session.current = at;

        let dx = (session.current.x - session.start.x).abs();
        let dy = (session.current.y - session.start.y).abs();
        if dx < self.threshold && dy < self.threshold {
            return Some(DragOutcome::Click);
        }

        let band = Bounds::from_corners(session.start, session.current);
        let hits = items
            .iter()
            .filter(|(_, bounds)| bounds.intersects(&band))
            .map(|(id, _)| id.clone())
            .collect();
        Some(DragOutcome::Band(hits))
    }

    /// Drops any running drag without resolving it.
    pub fn teardown(&mut self) {
        self.session = None;
    }
}
