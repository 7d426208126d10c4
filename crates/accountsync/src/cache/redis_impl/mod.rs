//! Redis cache backend implementation.
//!
//! Provides a replicated cache for multi-instance deployments: writes go to
//! the primary, reads are spread over read replicas.

mod cache;
mod error;

pub use cache::RedisReplicatedCache;
