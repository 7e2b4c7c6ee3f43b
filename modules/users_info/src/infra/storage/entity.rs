use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One user as persisted in the document
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub age: u32,
    #[serde(with = "crate::time_format")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::time_format")]
    pub updated_at: DateTime<Utc>,
}

/// The persisted unit: every user plus the id counter, read and written whole.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub users: Vec<UserRecord>,
    #[serde(default = "first_id")]
    pub next_id: u64,
}

fn first_id() -> u64 {
    1
}

impl Default for Document {
    fn default() -> Self {
        Self {
            users: Vec::new(),
            next_id: first_id(),
        }
    }
}

impl Document {
    /// Hand out the next id and advance the counter.
    ///
    /// Keeps `next_id > max(id)` even when the file was edited by hand.
    /// Returns `None` once the id space is used up.
    pub fn allocate_id(&mut self) -> Option<u64> {
        let floor = match self.users.iter().map(|u| u.id).max() {
            Some(max) => max.checked_add(1)?,
            None => 1,
        };
        if self.next_id < floor {
            warn!(
                next_id = self.next_id,
                floor, "nextId is not above the highest stored id; skipping ahead"
            );
            self.next_id = floor;
        }
        let id = self.next_id;
        self.next_id = id.checked_add(1)?;
        Some(id)
    }

    pub fn position(&self, id: u64) -> Option<usize> {
        self.users.iter().position(|u| u.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64) -> UserRecord {
        let at = Utc::now();
        UserRecord {
            id,
            name: "Test".into(),
            email: format!("u{id}@example.com"),
            age: 30,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn allocate_id_uses_counter() {
        let mut doc = Document {
            users: vec![record(1), record(2)],
            next_id: 7,
        };
        assert_eq!(doc.allocate_id(), Some(7));
        assert_eq!(doc.next_id, 8);
    }

    #[test]
    fn allocate_id_skips_past_existing_ids() {
        let mut doc = Document {
            users: vec![record(4), record(9)],
            next_id: 3,
        };
        assert_eq!(doc.allocate_id(), Some(10));
        assert_eq!(doc.next_id, 11);
    }

    #[test]
    fn empty_document_starts_at_one() {
        let mut doc = Document::default();
        assert_eq!(doc.allocate_id(), Some(1));
    }

    #[test]
    fn allocate_id_refuses_to_wrap() {
        let mut doc = Document {
            users: vec![record(u64::MAX)],
            next_id: 1,
        };
        assert_eq!(doc.allocate_id(), None);

        let mut doc = Document {
            users: Vec::new(),
            next_id: u64::MAX,
        };
        assert_eq!(doc.allocate_id(), None);
        assert_eq!(doc.next_id, u64::MAX);
    }

    #[test]
    fn document_uses_camel_case_keys() {
        let doc: Document = serde_json::from_str(
            r#"{"users":[{"id":1,"name":"Ana","email":"ana@x.com","age":28,
                "createdAt":"2024-01-01T00:00:00.000Z","updatedAt":"2024-01-01T00:00:00.000Z"}],
                "nextId":2}"#,
        )
        .unwrap();
        assert_eq!(doc.next_id, 2);
        assert_eq!(doc.users[0].name, "Ana");
        assert_eq!(doc.position(1), Some(0));
        assert_eq!(doc.position(5), None);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let doc: Document = serde_json::from_str("{}").unwrap();
        assert_eq!(doc, Document::default());
    }
}
