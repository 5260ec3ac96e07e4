use chrono::{DateTime, Utc};

use crate::domain::value_objects::BucketName;

/// A bucket as reported by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketRef {
    pub name: BucketName,
    pub created_at: Option<DateTime<Utc>>,
}

impl BucketRef {
    pub fn new(name: BucketName) -> Self {
        Self {
            name,
            created_at: None,
        }
    }
}
