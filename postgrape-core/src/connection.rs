use crate::{Executor, Result};
use std::future::Future;

/// One physical connection, exclusively owned while acquired.
pub trait Connection: Executor {
    /// Hand the connection back to its pool. A connection released with `had_error` must not
    /// be reused.
    fn release(self, had_error: bool);
}

/// Source of connections.
pub trait Pool: Send + Sync {
    type Connection: Connection;

    /// Wait for a free connection. Fails with [`crate::DataError::ConnectionUnavailable`].
    fn acquire(&self) -> impl Future<Output = Result<Self::Connection>> + Send;

    /// Close the pool, connections still acquired are dropped once released.
    fn drain(&self) -> impl Future<Output = Result<()>> + Send;
}
