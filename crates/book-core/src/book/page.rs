/// Base z-index; the current page sits highest and each step away drops one
pub const Z_INDEX_BASE: i32 = 200;

/// Visual role of a page relative to the current index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRole {
    /// Already turned, lying on the left
    Left,
    /// The page being read; also a right-hand page
    Current,
    /// Not yet reached
    Right,
}

impl PageRole {
    pub fn is_right(self) -> bool {
        matches!(self, PageRole::Current | PageRole::Right)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurlDirection {
    Forward,
    Back,
}

/// A page mid-turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Curl {
    pub direction: CurlDirection,

    /// Scheduler time the curl was applied, ms
    pub started_ms: u64,
}

/// Projection of one page for the painter
#[derive(Debug, Clone, PartialEq)]
pub struct PageView {
    pub position: usize,
    pub role: PageRole,

    /// How many turned pages lie above this one on the left stack
    pub stack_depth: usize,

    pub z_index: i32,
    pub curl: Option<Curl>,
}

impl PageView {
    pub(crate) fn new(position: usize) -> Self {
        Self {
            position,
            role: PageRole::Right,
            stack_depth: 0,
            z_index: Z_INDEX_BASE,
            curl: None,
        }
    }

    /// Recompute role, depth and z-index for the given current index.
    /// Clears any curl.
    pub(crate) fn project(&mut self, index: usize) {
        let i = self.position;
        self.role = if i < index {
            PageRole::Left
        } else if i == index {
            PageRole::Current
        } else {
            PageRole::Right
        };
        self.stack_depth = index.saturating_sub(i);
        self.z_index = Z_INDEX_BASE - i.abs_diff(index) as i32;
        self.curl = None;
    }

    /// Curl progress in `[0, 1]` at `now_ms`, `None` when not curling
    pub fn curl_progress(&self, now_ms: u64, curl_ms: u64) -> Option<f32> {
        let curl = self.curl?;
        let elapsed = now_ms.saturating_sub(curl.started_ms) as f32;
        Some((elapsed / curl_ms.max(1) as f32).min(1.0))
    }
}
