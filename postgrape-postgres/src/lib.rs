mod codec;
mod connection;
mod driver;
mod pool;
mod sql_writer;
mod util;

pub use codec::*;
pub use connection::*;
pub use driver::*;
pub use pool::*;
pub use sql_writer::*;
