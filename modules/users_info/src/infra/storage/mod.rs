pub mod entity;
pub mod json_file;
pub mod json_repo;
pub mod mapper;

pub use entity::{Document, UserRecord};
pub use json_file::{JsonFileStore, StorageError};
pub use json_repo::JsonFileUsersRepository;
