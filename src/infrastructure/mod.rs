//! Infrastructure implementations of the domain ports: in-memory storage,
//! identifier generation, and publisher variants.

pub mod in_memory;
pub mod publisher;
pub mod snowflake;
