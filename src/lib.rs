//! Postgres data access layer: typed repositories over a predicate and query compiler, ranked
//! free text search and nested units of work built on savepoints.
//!
//! The core types live in `postgrape-core` and are re-exported here together with the
//! `#[derive(Entity)]` macro. The Postgres driver is `postgrape-postgres`.
pub use postgrape_core::*;
pub use postgrape_macros::Entity;
