mod as_value;
mod client;
mod connection;
mod coordinator;
mod driver;
mod entity;
mod error;
mod executor;
mod filter;
mod interval;
mod multiple;
mod options;
mod query;
mod repository;
mod searchable;
mod table_ref;
mod time_tz;
mod util;
mod value;
pub mod writer;

pub use ::anyhow::Context;
pub use as_value::*;
pub use client::*;
pub use connection::*;
pub use coordinator::*;
pub use driver::*;
pub use entity::*;
pub use error::*;
pub use executor::*;
pub use filter::*;
pub use interval::*;
pub use multiple::*;
pub use options::*;
pub use query::*;
pub use repository::Repository;
pub use searchable::*;
pub use table_ref::*;
pub use time_tz::*;
pub use util::*;
pub use value::*;
pub use writer::{Fragment, GenericSqlWriter, SqlWriter};
pub mod stream {
    pub use ::futures::stream::*;
}
pub use ::futures::future;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
