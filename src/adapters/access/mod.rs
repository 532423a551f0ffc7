//! Access code registry adapters.

mod in_memory;

pub use in_memory::InMemoryAccessCodeRegistry;
