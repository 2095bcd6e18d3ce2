#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipMode {
    Cut,
    Copy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipPayload {
    pub node_ids: Vec<String>,
    pub mode: ClipMode,
}

/// Single-payload clipboard of node ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clipboard {
    payload: Option<ClipPayload>,
}

impl Clipboard {
    pub fn payload(&self) -> Option<&ClipPayload> {
        self.payload.as_ref()
    }

    pub fn cut(&mut self, node_ids: Vec<String>) {
        self.put(node_ids, ClipMode::Cut);
    }

    pub fn copy(&mut self, node_ids: Vec<String>) {
        self.put(node_ids, ClipMode::Copy);
    }

    pub fn clear(&mut self) {
        self.payload = None;
    }

    /// Drops ids that no longer exist; an emptied payload is discarded.
    pub fn prune<F>(&mut self, exists: F)
    where
        F: Fn(&str) -> bool,
    {
        if let Some(payload) = self.payload.as_mut() {
            payload.node_ids.retain(|id| exists(id));
            if payload.node_ids.is_empty() {
                self.payload = None;
            }
        }
    }

    fn put(&mut self, node_ids: Vec<String>, mode: ClipMode) {
        self.payload = if node_ids.is_empty() {
            None
        } else {
            Some(ClipPayload { node_ids, mode })
        };
    }
}
