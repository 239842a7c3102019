//! Concrete implementations of the ports plus the HTTP gateway

mod file_session;
pub mod gateway;
mod memory_session;

pub use file_session::FileSessionStore;
pub use gateway::{ApiClient, Auth};
pub use memory_session::MemorySessionStore;
