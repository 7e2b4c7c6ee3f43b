use chrono::{DateTime, Utc};

/// Pure user model shared between layers (no serde)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub age: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for creating a new user; already validated and normalized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub age: u32,
}

/// Partial update data for a user
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<u32>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.age.is_none()
    }
}

/// Histogram over the fixed age buckets. Ages below 18 fall in no bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AgeRanges {
    pub from_18_to_25: usize,
    pub from_26_to_35: usize,
    pub from_36_to_50: usize,
    pub over_50: usize,
}

/// Aggregate figures over the whole collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserStats {
    pub total_users: usize,
    pub average_age: u32,
    pub age_ranges: AgeRanges,
    pub recent_users: Vec<User>,
}
