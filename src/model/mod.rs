pub mod error;
pub mod message;
pub mod player;
pub mod session;
