use tracing::debug;

use super::building::Building;
use crate::error::{EstimateError, EstimateResult};

/// The single "currently highlighted building" slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    current: Option<usize>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// Reverts the previously highlighted building, then highlights `idx`.
    ///
    /// Both steps happen under one `&mut` borrow, so no observer can see two
    /// highlighted buildings. Returns the previously selected index.
    pub fn highlight(
        &mut self,
        buildings: &mut [Building],
        idx: usize,
    ) -> EstimateResult<Option<usize>> {
        if idx >= buildings.len() {
            return Err(EstimateError::InvalidInput(format!(
                "no building with index {idx}"
            )));
        }
        let previous = self.current;
        if let Some(prev) = previous.and_then(|p| buildings.get_mut(p)) {
            debug!("Reverting highlight of '{}'", prev.name);
            prev.revert();
        }
        buildings[idx].highlight();
        self.current = Some(idx);
        Ok(previous)
    }

    /// Reverts the current building, if any, and empties the slot.
    pub fn clear(&mut self, buildings: &mut [Building]) {
        if let Some(prev) = self.current.take().and_then(|p| buildings.get_mut(p)) {
            prev.revert();
        }
    }
}
