use serde::{Deserialize, Serialize};

/// The `users_info` module section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct UsersInfoConfig {
    /// Data file, relative paths resolved against `server.home_dir`.
    pub data_file: String,
    /// Write an empty document at startup when the file is absent.
    pub create_if_missing: bool,
    /// Copy the existing document aside at startup.
    pub backup_on_start: bool,
}

impl Default for UsersInfoConfig {
    fn default() -> Self {
        Self {
            data_file: "data/users.json".to_string(),
            create_if_missing: true,
            backup_on_start: false,
        }
    }
}
