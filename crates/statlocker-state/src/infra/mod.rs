//! Infrastructure: persistence adapters behind the [`kv::KeyValueStore`] trait

pub mod kv;

pub use kv::{FileKvStore, KeyValueStore, MemoryKvStore};
