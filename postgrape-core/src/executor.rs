use crate::{
    Driver, Query, QueryResult, Result, RowLabeled, RowsAffected,
    stream::{Stream, StreamExt, TryStreamExt},
};
use std::future::Future;

/// Anything able to run statements: a connection, or a client wrapping one.
pub trait Executor: Send + Sized {
    type Driver: Driver;

    fn driver(&self) -> &Self::Driver;

    /// Run one statement, streaming its rows followed by the row count.
    fn run(&mut self, query: Query) -> impl Stream<Item = Result<QueryResult>> + Send;

    fn fetch(&mut self, query: Query) -> impl Stream<Item = Result<RowLabeled>> + Send {
        self.run(query).filter_map(|item| async move {
            match item {
                Ok(QueryResult::Row(row)) => Some(Ok(row)),
                Ok(QueryResult::Affected(..)) => None,
                Err(e) => Some(Err(e)),
            }
        })
    }

    /// Run the statement discarding its rows.
    fn execute(&mut self, query: Query) -> impl Future<Output = Result<RowsAffected>> + Send {
        self.run(query)
            .try_filter_map(|item| async move {
                Ok(match item {
                    QueryResult::Affected(affected) => Some(affected),
                    QueryResult::Row(..) => None,
                })
            })
            .try_collect()
    }
}
