//! Client state domain module.

pub mod model;

pub use model::{
    ChatState, DEFAULT_THRESHOLD, PreferencesUpdate, Theme, UserPreferences, View, clamp_threshold,
};
