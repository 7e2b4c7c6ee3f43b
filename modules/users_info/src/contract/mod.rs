pub mod model;

pub use model::{AgeRanges, NewUser, User, UserPatch, UserStats};
