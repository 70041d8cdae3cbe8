pub mod conversation;
pub mod sessions;
pub mod settings;
