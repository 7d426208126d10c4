//! Core types and capability traits for accountsync.
//!
//! Everything in this crate is free of I/O: the account model, cache key
//! derivation and value codec, and the traits that the cache and storage
//! backends in the `accountsync` crate implement.

pub mod account;
pub mod cache;
pub mod storage;
