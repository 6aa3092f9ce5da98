//! Progress trackers for incremental effects.
//!
//! Each tracker exists only while its effect runs, and at most one per
//! effect at a time. `begin_*` refuses to start over an occupied slot.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggingProgress {
    pub total: u32,
    pub current: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeProgress {
    pub found: u32,
    pub merged: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressState {
    pub tagging: Option<TaggingProgress>,
    pub merge: Option<MergeProgress>,
    /// Field currently being rewritten by a transformation.
    pub transforming_field: Option<String>,
}

impl ProgressState {
    pub fn begin_tagging(&mut self, total: u32) -> bool {
        if self.tagging.is_some() {
            return false;
        }
        self.tagging = Some(TaggingProgress { total, current: 0 });
        true
    }

    /// Advance by one, never past `total`.
    pub fn advance_tagging(&mut self) -> Option<TaggingProgress> {
        let progress = self.tagging.as_mut()?;
        if progress.current < progress.total {
            progress.current += 1;
        }
        Some(*progress)
    }

    pub fn end_tagging(&mut self) -> bool {
        self.tagging.take().is_some()
    }

    pub fn begin_merge(&mut self, found: u32) -> bool {
        if self.merge.is_some() {
            return false;
        }
        self.merge = Some(MergeProgress { found, merged: 0 });
        true
    }

    /// Advance by one, never past `found`.
    pub fn advance_merge(&mut self) -> Option<MergeProgress> {
        let progress = self.merge.as_mut()?;
        if progress.merged < progress.found {
            progress.merged += 1;
        }
        Some(*progress)
    }

    pub fn end_merge(&mut self) -> bool {
        self.merge.take().is_some()
    }

    pub fn begin_transform(&mut self, field: &str) -> bool {
        if self.transforming_field.is_some() {
            return false;
        }
        self.transforming_field = Some(field.to_string());
        true
    }

    pub fn end_transform(&mut self) -> bool {
        self.transforming_field.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagging_lifecycle() {
        let mut p = ProgressState::default();
        assert!(p.begin_tagging(2));
        assert!(!p.begin_tagging(5));
        assert_eq!(p.advance_tagging(), Some(TaggingProgress { total: 2, current: 1 }));
        assert_eq!(p.advance_tagging(), Some(TaggingProgress { total: 2, current: 2 }));
        assert_eq!(p.advance_tagging(), Some(TaggingProgress { total: 2, current: 2 }));
        assert!(p.end_tagging());
        assert!(!p.end_tagging());
        assert_eq!(p.advance_tagging(), None);
    }

    #[test]
    fn test_merge_never_exceeds_found() {
        let mut p = ProgressState::default();
        assert!(p.begin_merge(12));
        let mut last = 0;
        for _ in 0..20 {
            let step = p.advance_merge().unwrap();
            assert!(step.merged <= 12);
            assert!(step.merged == last + 1 || step.merged == 12);
            last = step.merged;
        }
        assert_eq!(last, 12);
    }

    #[test]
    fn test_transform_slot() {
        let mut p = ProgressState::default();
        assert!(p.begin_transform("phone_number"));
        assert!(!p.begin_transform("email"));
        assert_eq!(p.transforming_field.as_deref(), Some("phone_number"));
        assert!(p.end_transform());
        assert!(p.begin_transform("email"));
    }

    #[test]
    fn test_slots_are_independent() {
        let mut p = ProgressState::default();
        assert!(p.begin_tagging(1));
        assert!(p.begin_merge(1));
        assert!(p.begin_transform("f"));
        assert!(p.end_merge());
        assert!(p.tagging.is_some());
    }
}
