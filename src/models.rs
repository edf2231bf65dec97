use chrono::{DateTime, Duration, Utc};
use sqlx::FromRow;

/// How long a paste stays readable after it is created.
pub const RETENTION_HOURS: i64 = 24;

#[derive(Debug, Clone, FromRow)]
pub struct Paste {
    pub id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Paste {
    /// Build a paste created at `now`, expiring one retention window later.
    pub fn new(id: String, content: String, now: DateTime<Utc>) -> Self {
        Paste {
            id,
            content,
            created_at: now,
            expires_at: now + Duration::hours(RETENTION_HOURS),
        }
    }

    /// A paste is still readable at exactly its expiry instant.
    pub fn is_expired(&self, now: &DateTime<Utc>) -> bool {
        *now > self.expires_at
    }
}
