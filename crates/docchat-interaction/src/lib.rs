pub mod http_chat_api;

pub use http_chat_api::{HttpChatApi, guess_content_type};
