use async_trait::async_trait;

use crate::contract::model::{NewUser, User, UserPatch};
use crate::infra::storage::StorageError;

/// Persistence operations the domain needs.
///
/// Implementations own id assignment and timestamps. None of the operations
/// is atomic with respect to concurrent callers.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// All users in insertion order.
    async fn list_all(&self) -> Result<Vec<User>, StorageError>;
    async fn find_by_id(&self, id: u64) -> Result<Option<User>, StorageError>;
    /// Store a new user under the next id. Both timestamps are set to now.
    async fn create(&self, new_user: NewUser) -> Result<User, StorageError>;
    /// Merge the supplied fields into an existing user. `None` if the id is unknown.
    async fn update(&self, id: u64, patch: UserPatch) -> Result<Option<User>, StorageError>;
    /// Returns true if a user was removed.
    async fn delete(&self, id: u64) -> Result<bool, StorageError>;
    /// Case-insensitive email lookup, optionally ignoring one user.
    async fn email_exists(&self, email: &str, exclude_id: Option<u64>)
        -> Result<bool, StorageError>;
}
