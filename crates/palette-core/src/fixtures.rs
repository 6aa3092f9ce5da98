//! Fixed sample dataset the dashboard operates over.
//!
//! Users, monthly metrics and the seed scheduled jobs. Nothing here is
//! persisted; every store starts from [`Dataset::sample`].

use serde::{Deserialize, Serialize};

use crate::types::{JobStatus, ScheduledJobRecord, Segment};

/// A customer account shown in the users table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u32,
    pub name: String,
    pub email: String,
    pub company: String,
    pub segment: Segment,
    pub location: String,
    /// Lifetime spend in whole dollars.
    pub spend: u64,
    pub joined_at: String,
    pub last_login: String,
    /// Tags the account ships with. Tags added by commands live in the store.
    pub tags: Vec<String>,
    pub phone: String,
}

/// One month of headline metrics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    /// `YYYY-MM`.
    pub date: String,
    pub revenue: f64,
    pub churn: f64,
    pub users: u32,
    pub mrr: f64,
}

/// The complete sample dataset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub users: Vec<User>,
    pub metrics: Vec<Metric>,
    pub seed_jobs: Vec<ScheduledJobRecord>,
}

impl Default for Dataset {
    fn default() -> Self {
        Self::sample()
    }
}

impl Dataset {
    pub fn sample() -> Self {
        Self {
            users: sample_users(),
            metrics: sample_metrics(),
            seed_jobs: seed_jobs(),
        }
    }

    /// Users whose spend is strictly greater than `threshold`, in table order.
    pub fn users_with_spend_above(&self, threshold: u64) -> impl Iterator<Item = &User> {
        self.users.iter().filter(move |u| u.spend > threshold)
    }

    /// `(date, revenue)` pairs used as the baseline for chart overlays.
    pub fn revenue_baseline(&self) -> Vec<(String, f64)> {
        self.metrics
            .iter()
            .map(|m| (m.date.clone(), m.revenue))
            .collect()
    }
}

#[allow(clippy::too_many_arguments)]
fn user(
    id: u32,
    name: &str,
    email: &str,
    company: &str,
    segment: Segment,
    location: &str,
    spend: u64,
    joined_at: &str,
    last_login: &str,
    tags: &[&str],
    phone: &str,
) -> User {
    User {
        id,
        name: name.to_string(),
        email: email.to_string(),
        company: company.to_string(),
        segment,
        location: location.to_string(),
        spend,
        joined_at: joined_at.to_string(),
        last_login: last_login.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        phone: phone.to_string(),
    }
}

#[rustfmt::skip]
fn sample_users() -> Vec<User> {
    use Segment::*;
    vec![
        user(1, "Yuki Tanaka", "yuki@acme.jp", "Acme Corp", Enterprise, "Japan", 12_500, "2024-01-15", "2024-01-28", &["VIP"], "+81-3-1234-5678"),
        user(2, "Hans Mueller", "hans@tech.de", "TechGmbH", Enterprise, "Germany", 8_900, "2024-01-20", "2024-01-25", &[], "+49 30 12345678"),
        user(3, "Sarah Chen", "sarah@startup.io", "StartupIO", Startup, "USA", 2_400, "2024-01-22", "2024-01-30", &[], "(415) 555-0123"),
        user(4, "Pierre Dubois", "pierre@corp.fr", "CorpFR", Enterprise, "France", 15_200, "2023-11-10", "2024-01-29", &["VIP", "Priority"], "+33 1 23 45 67 89"),
        user(5, "Maria Garcia", "maria@smb.es", "SMB España", Smb, "Spain", 1_100, "2024-01-25", "2024-01-30", &[], "612 345 678"),
        user(6, "Kenji Yamamoto", "kenji@bigco.jp", "BigCo Japan", Enterprise, "Japan", 22_000, "2023-12-05", "2024-01-28", &["VIP", "Strategic"], "03-9876-5432"),
        user(7, "Emily Watson", "emily@venture.uk", "Venture UK", Startup, "UK", 3_200, "2024-01-18", "2024-01-27", &[], "020 7123 4567"),
        user(8, "Alex Kim", "alex@free.com", "Freelancer", Free, "USA", 0, "2024-01-28", "2024-01-30", &[], "555-0199"),
        user(9, "Sofia Rossi", "sofia@enterprise.it", "Enterprise IT", Enterprise, "Italy", 7_800, "2023-10-20", "2023-12-15", &[], "+39 02 1234567"),
        user(10, "James Wilson", "james@admin.com", "AdminCo", Smb, "USA", 950, "2024-01-10", "2023-12-01", &["admin"], "(212) 555-0145"),
    ]
}

fn sample_metrics() -> Vec<Metric> {
    [
        ("2023-07", 125_000.0, 2.1, 1250),
        ("2023-08", 132_000.0, 1.9, 1320),
        ("2023-09", 141_000.0, 2.3, 1410),
        ("2023-10", 148_000.0, 1.8, 1480),
        ("2023-11", 152_000.0, 2.5, 1520),
        ("2023-12", 165_000.0, 2.0, 1650),
        ("2024-01", 178_000.0, 1.7, 1780),
    ]
    .into_iter()
    .map(|(date, revenue, churn, users)| Metric {
        date: date.to_string(),
        revenue,
        churn,
        users,
        mrr: revenue,
    })
    .collect()
}

fn seed_jobs() -> Vec<ScheduledJobRecord> {
    vec![
        ScheduledJobRecord {
            id: "1".to_string(),
            name: "Weekly Revenue Report".to_string(),
            job_type: "export_pdf".to_string(),
            schedule: "Every Monday 9:00 AM".to_string(),
            next_run: "2024-02-05 09:00".to_string(),
            status: JobStatus::Active,
        },
        ScheduledJobRecord {
            id: "2".to_string(),
            name: "Daily Backup".to_string(),
            job_type: "backup".to_string(),
            schedule: "Daily 2:00 AM".to_string(),
            next_run: "2024-02-01 02:00".to_string(),
            status: JobStatus::Active,
        },
    ]
}
