//! # History Sessions
//!
//! A session is one undo step: a serialized snapshot plus a coalescing
//! window. While the window is open, further snapshots replace the stored one
//! instead of creating a new step. Every `log` re-arms the window; `end`
//! closes it for good.
//!
//! The window is evaluated against the history's [`Clock`](crate::Clock)
//! when the next snapshot arrives.

#[derive(Debug, Clone)]
pub struct Session {
    cursor: usize,
    data: Option<String>,
    /// Time of the last write while open; `None` once sealed
    last_log: Option<u64>,
    time_gap: u64,
}

impl Session {
    /// Open a session at `cursor`, starting its window at `now`
    pub fn new(cursor: usize, data: Option<String>, now: u64, time_gap: u64) -> Self {
        Self {
            cursor,
            data,
            last_log: Some(now),
            time_gap,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }

    pub fn is_active(&self, now: u64) -> bool {
        self.last_log
            .is_some_and(|at| now.saturating_sub(at) < self.time_gap)
    }

    pub fn is_sealed(&self) -> bool {
        self.last_log.is_none()
    }

    /// Absorb `data` and re-arm the window. Ignored once the window lapsed.
    pub fn log(&mut self, data: String, now: u64) -> bool {
        if !self.is_active(now) {
            return false;
        }
        self.data = Some(data);
        self.last_log = Some(now);
        true
    }

    /// Seal the session
    pub fn end(&mut self) {
        self.last_log = None;
    }
}
