use crate::contract::model::User;
use crate::infra::storage::entity::UserRecord;

impl From<UserRecord> for User {
    fn from(r: UserRecord) -> Self {
        Self {
            id: r.id,
            name: r.name,
            email: r.email,
            age: r.age,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

impl From<User> for UserRecord {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            age: u.age,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}
