//! Dashboard filter slice.

use serde::{Deserialize, Serialize};

/// Active filters on the users table and charts.
///
/// Updates merge into the existing filters; only [`DashboardFilters::clear`]
/// removes values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardFilters {
    pub segment: Option<String>,
    pub location: Option<String>,
    pub time_range: Option<String>,
}

impl DashboardFilters {
    /// Overlay the values present in `patch`. Absent values leave the
    /// current filter untouched.
    pub fn merge(&mut self, patch: &DashboardFilters) -> bool {
        let before = self.clone();
        if let Some(segment) = &patch.segment {
            self.segment = Some(segment.clone());
        }
        if let Some(location) = &patch.location {
            self.location = Some(location.clone());
        }
        if let Some(time_range) = &patch.time_range {
            self.time_range = Some(time_range.clone());
        }
        *self != before
    }

    pub fn clear(&mut self) -> bool {
        let changed = !self.is_empty();
        *self = Self::default();
        changed
    }

    pub fn is_empty(&self) -> bool {
        self.segment.is_none() && self.location.is_none() && self.time_range.is_none()
    }
}
