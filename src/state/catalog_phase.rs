//! Phase definitions for the catalog crawl state machine
//!
//! The crawler moves `Idle -> Paging(1) -> Paging(2) -> ... -> Done`; it may
//! leave for `Done` from any paging step once the link limit is reached.

use crate::HarvestError;
use std::fmt;

/// Represents the current phase of the catalog crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogPhase {
    /// Crawl has not started yet
    Idle,

    /// Crawler is processing the given 1-based catalog page
    Paging { page: u32 },

    /// Page limit exhausted or link limit reached
    Done,
}

impl CatalogPhase {
    /// Returns true if moving from `self` to `next` is a legal step
    pub fn can_transition_to(&self, next: &CatalogPhase) -> bool {
        match (self, next) {
            (Self::Idle, Self::Paging { page }) => *page == 1,
            (Self::Paging { page: current }, Self::Paging { page }) => *page == current + 1,
            (Self::Paging { .. }, Self::Done) => true,
            _ => false,
        }
    }

    /// Moves to `next`, rejecting illegal steps
    pub fn transition(&mut self, next: CatalogPhase) -> Result<(), HarvestError> {
        if !self.can_transition_to(&next) {
            return Err(HarvestError::InvalidTransition {
                from: *self,
                to: next,
            });
        }
        *self = next;
        Ok(())
    }
}

impl fmt::Display for CatalogPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Paging { page } => write!(f, "paging(page={})", page),
            Self::Done => write!(f, "done"),
        }
    }
}
