//! Process-local backend used by tests and the `memory` storage mode

mod in_memory_backend;
mod signed_url;

pub use in_memory_backend::InMemoryBackend;
