//! In-memory backend for the StudySwap store traits.
//!
//! The reference backend for tests and single-process deployments. Rows
//! are immutable values replaced wholesale under one `tokio::sync::RwLock`,
//! so the compare-and-swap contract of
//! [`studyswap_core::store::MatchStore::update_match_where_status`] holds
//! without further coordination.

mod store;

pub use store::MemoryStore;

#[cfg(test)]
mod tests;
