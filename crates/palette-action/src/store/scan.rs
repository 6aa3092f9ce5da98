//! Security scan slice.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingSeverity {
    Low,
    Medium,
    High,
}

impl fmt::Display for FindingSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FindingSeverity::Low => write!(f, "low"),
            FindingSeverity::Medium => write!(f, "medium"),
            FindingSeverity::High => write!(f, "high"),
        }
    }
}

/// One category of suspicious events found by a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanFinding {
    pub category: String,
    pub count: u32,
    pub severity: FindingSeverity,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanState {
    pub scanning: bool,
    /// Results of the last completed scan; cleared when a new scan starts.
    pub results: Option<Vec<ScanFinding>>,
}

impl ScanState {
    pub fn begin(&mut self) -> bool {
        if self.scanning {
            return false;
        }
        self.scanning = true;
        self.results = None;
        true
    }

    pub fn complete(&mut self, results: Vec<ScanFinding>) {
        self.scanning = false;
        self.results = Some(results);
    }

    /// Stop without results.
    pub fn abort(&mut self) -> bool {
        std::mem::replace(&mut self.scanning, false)
    }

    pub fn total_events(&self) -> u32 {
        self.results
            .as_deref()
            .map(|r| r.iter().map(|f| f.count).sum())
            .unwrap_or(0)
    }
}
