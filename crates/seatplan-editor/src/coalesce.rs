use std::time::{Duration, Instant};

use seatplan_core::{AreaId, GridId};

/// A requested grid size change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeIntent {
    pub area: AreaId,
    pub grid: GridId,
    pub rows: u32,
    pub cols: u32,
}

/// Collects keyboard resize intents and releases them in batches.
///
/// A batch opens with the first intent after a flush and becomes due one
/// interval later, so renumbering runs at most once per interval however
/// fast keys repeat. A later intent for the same grid replaces the earlier one.
#[derive(Debug, Clone)]
pub struct ResizeQueue {
    interval: Duration,
    pending: Vec<ResizeIntent>,
    opened_at: Option<Instant>,
}

impl ResizeQueue {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            pending: Vec::new(),
            opened_at: None,
        }
    }

    pub fn push(&mut self, intent: ResizeIntent, now: Instant) {
        match self
            .pending
            .iter_mut()
            .find(|p| p.area == intent.area && p.grid == intent.grid)
        {
            Some(existing) => *existing = intent,
            None => self.pending.push(intent),
        }
        self.opened_at.get_or_insert(now);
    }

    /// The size a grid will have once pending intents are applied.
    pub fn pending_size(&self, area: &AreaId, grid: GridId) -> Option<(u32, u32)> {
        self.pending
            .iter()
            .find(|p| &p.area == area && p.grid == grid)
            .map(|p| (p.rows, p.cols))
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.opened_at
            .is_some_and(|opened| now.saturating_duration_since(opened) >= self.interval)
    }

    /// Take the batch if its interval has elapsed.
    pub fn take_due(&mut self, now: Instant) -> Vec<ResizeIntent> {
        if self.is_due(now) {
            self.drain()
        } else {
            Vec::new()
        }
    }

    /// Take everything regardless of timing.
    pub fn drain(&mut self) -> Vec<ResizeIntent> {
        self.opened_at = None;
        std::mem::take(&mut self.pending)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
