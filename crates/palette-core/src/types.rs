use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Enums
// =============================================================================

/// Whether a scheduled job will run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Active,
    Paused,
}

/// Customer segment of a sample user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    Enterprise,
    Startup,
    Smb,
    Free,
}

impl Segment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::Enterprise => "enterprise",
            Segment::Startup => "startup",
            Segment::Smb => "smb",
            Segment::Free => "free",
        }
    }
}

// =============================================================================
// Timestamp
// =============================================================================

/// Unix timestamp in whole seconds (UTC).
///
/// Compared by value. Two Timestamps with the same inner value are equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now().timestamp())
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt.timestamp())
    }

    pub fn to_datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.0, 0).unwrap_or_default()
    }

    /// Whole minutes elapsed between `self` and `now`, floored at zero.
    pub fn minutes_until(&self, now: Timestamp) -> i64 {
        ((now.0 - self.0) / 60).max(0)
    }

    /// Short relative age: "Just now", "1m ago", "12m ago".
    pub fn age_label_at(&self, now: Timestamp) -> String {
        match self.minutes_until(now) {
            0 => "Just now".to_string(),
            1 => "1m ago".to_string(),
            mins => format!("{mins}m ago"),
        }
    }

    pub fn age_label(&self) -> String {
        self.age_label_at(Timestamp::now())
    }
}

// =============================================================================
// Scheduled jobs
// =============================================================================

/// A recurring job shown in the automation panel.
///
/// Records are append-only; the list starts from the seed set in
/// [`crate::fixtures::Dataset`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledJobRecord {
    pub id: String,
    pub name: String,
    /// Job type on the wire, e.g. `export_pdf`.
    #[serde(rename = "type")]
    pub job_type: String,
    /// Human schedule, e.g. "Weekly (Monday) at 09:00".
    pub schedule: String,
    /// Human next-run description; "Pending..." until the job runs once.
    pub next_run: String,
    pub status: JobStatus,
}

impl ScheduledJobRecord {
    pub fn is_active(&self) -> bool {
        self.status == JobStatus::Active
    }
}
