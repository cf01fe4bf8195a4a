//! Durable storage layer (on-device key-value store).

pub mod local;

pub use local::LocalStorage;

/// Storage keys as constants.
pub mod keys {
    /// Serialized character record
    pub const CHARACTER: &str = "character";
    /// Serialized workout list, newest first
    pub const WORKOUTS: &str = "workouts";
}
