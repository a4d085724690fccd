//! REST backend implementations

pub mod http;
pub mod in_memory;

pub use http::HttpBackend;
pub use in_memory::InMemoryBackend;
