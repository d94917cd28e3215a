//! Integration test crate; see `bills_store.rs`.
