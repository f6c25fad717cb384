#![warn(clippy::unwrap_used)]

//! Shared hit-counter storage: the [`CounterStore`] contract plus a Redis
//! adapter for clustered deployments and an in-process adapter.

pub mod client;
pub mod local;
pub mod store;

pub use client::RedisCounterStore;
pub use local::LocalCounterStore;
pub use store::CounterStore;
