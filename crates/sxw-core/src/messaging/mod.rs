//! Messenger abstraction. Telegram is the only adapter.

pub mod port;
pub mod present;
pub mod types;
