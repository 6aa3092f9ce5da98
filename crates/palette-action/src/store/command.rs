//! Command surface slice: palette visibility, the in-flight request and
//! the resolved action waiting for the dispatcher.

use palette_core::types::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{IntentKind, RawParams, ResolvedAction};

/// The most recently dispatched actionable command, shown in the
/// feedback strip with an undo button.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastActionRecord {
    pub kind: IntentKind,
    pub parameters: Option<RawParams>,
    pub timestamp: Timestamp,
    /// Id of the effect invocation, usable with `Dispatcher::cancel`.
    pub invocation_id: Uuid,
    pub summary: String,
}

impl LastActionRecord {
    pub fn age_label(&self) -> String {
        self.timestamp.age_label()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandState {
    pub palette_open: bool,
    /// A classification call is outstanding.
    pub processing: bool,
    pub current: Option<ResolvedAction>,
    pub last_action: Option<LastActionRecord>,
}

impl CommandState {
    /// New input is accepted only when nothing is in flight and the last
    /// resolved action has been cleared.
    pub fn can_accept(&self) -> bool {
        !self.processing && self.current.is_none()
    }

    pub fn begin(&mut self) -> bool {
        if !self.can_accept() {
            return false;
        }
        self.processing = true;
        self.palette_open = false;
        true
    }

    pub fn finish(&mut self) -> bool {
        std::mem::replace(&mut self.processing, false)
    }

    pub fn publish(&mut self, action: ResolvedAction) {
        self.current = Some(action);
    }

    /// Clear the current action if it is still `id`.
    pub fn clear(&mut self, id: Uuid) -> bool {
        match &self.current {
            Some(action) if action.id == id => {
                self.current = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_rejects_while_processing() {
        let mut cmd = CommandState::default();
        assert!(cmd.begin());
        assert!(!cmd.begin());
        assert!(cmd.finish());
        assert!(!cmd.finish());
        assert!(cmd.begin());
    }

    #[test]
    fn test_begin_rejects_until_action_cleared() {
        let mut cmd = CommandState::default();
        cmd.begin();
        let action = ResolvedAction::new(IntentKind::ScanAnomalies, None);
        let id = action.id;
        cmd.publish(action);
        cmd.finish();

        assert!(!cmd.can_accept());
        assert!(!cmd.clear(Uuid::new_v4()));
        assert!(cmd.clear(id));
        assert!(cmd.can_accept());
    }

    #[test]
    fn test_begin_closes_palette() {
        let mut cmd = CommandState {
            palette_open: true,
            ..CommandState::default()
        };
        cmd.begin();
        assert!(!cmd.palette_open);
    }

    #[test]
    fn test_last_action_age_label_fresh() {
        let record = LastActionRecord {
            kind: IntentKind::BulkTag,
            parameters: None,
            timestamp: Timestamp::now(),
            invocation_id: Uuid::new_v4(),
            summary: "Tagged records as \"VIP\"".to_string(),
        };
        assert_eq!(record.age_label(), "Just now");
    }
}
