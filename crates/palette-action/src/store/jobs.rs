//! Scheduled job slice. Append-only.

use palette_core::types::ScheduledJobRecord;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobList {
    items: Vec<ScheduledJobRecord>,
}

impl JobList {
    pub fn seeded(seed: &[ScheduledJobRecord]) -> Self {
        Self {
            items: seed.to_vec(),
        }
    }

    pub fn append(&mut self, job: ScheduledJobRecord) {
        self.items.push(job);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScheduledJobRecord> {
        self.items.iter()
    }

    pub fn last(&self) -> Option<&ScheduledJobRecord> {
        self.items.last()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palette_core::Dataset;

    #[test]
    fn test_seeded_then_appended() {
        let data = Dataset::sample();
        let mut jobs = JobList::seeded(&data.seed_jobs);
        assert_eq!(jobs.len(), 2);

        let mut job = data.seed_jobs[0].clone();
        job.id = "job-3".to_string();
        jobs.append(job);
        assert_eq!(jobs.len(), 3);
        assert_eq!(jobs.last().unwrap().id, "job-3");
        assert_eq!(jobs.iter().next().unwrap().id, "1");
    }
}
