//! Events exchanged between slices over the event bus.

/// Published after an administrator removed a user and all of their rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDeleted {
    pub user_id: String,
    /// Object-store keys of the user's attachments, collected before the rows were dropped.
    pub object_keys: Vec<String>,
}
