#![allow(dead_code)]
use postgrape::{
    Connection, DataError, Driver, Error, Executor, GenericSqlWriter, Pool, Query, QueryResult,
    Result, RowLabeled, RowsAffected, Value,
    stream::{self, Stream},
};
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard},
};

#[derive(Default, Debug, Clone, Copy)]
pub struct MockDriver;

impl Driver for MockDriver {
    type SqlWriter = GenericSqlWriter;

    const NAME: &'static str = "mock";

    fn sql_writer(&self) -> GenericSqlWriter {
        GenericSqlWriter::new()
    }
}

/// Everything observed by the mock connections of one pool.
#[derive(Default, Debug)]
pub struct MockState {
    /// Every statement received, transaction commands included.
    pub statements: Vec<Query>,
    /// Rows returned by the next data statements, one entry per statement.
    pub responses: VecDeque<Vec<RowLabeled>>,
    /// Statements containing one of these fragments fail.
    pub failures: Vec<String>,
    /// `had_error` of every connection release.
    pub releases: Vec<bool>,
    pub acquired: usize,
    pub unavailable: bool,
    pub drained: bool,
}

impl MockState {
    pub fn sql(&self) -> Vec<&str> {
        self.statements.iter().map(|v| v.sql.as_str()).collect()
    }

    /// Statements other than the transaction commands.
    pub fn data_statements(&self) -> Vec<&Query> {
        self.statements
            .iter()
            .filter(|v| !is_transaction_command(&v.sql))
            .collect()
    }

    pub fn count(&self, sql: &str) -> usize {
        self.statements.iter().filter(|v| v.sql == sql).count()
    }
}

fn is_transaction_command(sql: &str) -> bool {
    matches!(sql, "BEGIN" | "COMMIT" | "ROLLBACK")
        || sql.starts_with("SAVEPOINT ")
        || sql.starts_with("ROLLBACK TO SAVEPOINT ")
}

#[derive(Default, Debug, Clone)]
pub struct Shared(Arc<Mutex<MockState>>);

impl Shared {
    pub fn lock(&self) -> MutexGuard<'_, MockState> {
        self.0.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn respond(&self, rows: impl IntoIterator<Item = RowLabeled>) {
        self.lock().responses.push_back(rows.into_iter().collect());
    }

    pub fn fail_on(&self, fragment: &str) {
        self.lock().failures.push(fragment.into());
    }

    pub fn sql(&self) -> Vec<String> {
        self.lock().sql().into_iter().map(Into::into).collect()
    }
}

pub struct MockConnection {
    shared: Shared,
}

impl MockConnection {
    pub fn new(shared: Shared) -> Self {
        Self { shared }
    }
}

impl Executor for MockConnection {
    type Driver = MockDriver;

    fn driver(&self) -> &Self::Driver {
        &MockDriver
    }

    fn run(&mut self, query: Query) -> impl Stream<Item = Result<QueryResult>> + Send {
        let mut state = self.shared.lock();
        let failure = state
            .failures
            .iter()
            .find(|v| query.sql.contains(v.as_str()))
            .cloned();
        let results: Vec<Result<QueryResult>> = if let Some(failure) = failure {
            vec![Err(Error::msg(format!("Mock failure on `{}`", failure)))]
        } else if is_transaction_command(&query.sql) {
            vec![Ok(QueryResult::Affected(RowsAffected::default()))]
        } else {
            let rows = state.responses.pop_front().unwrap_or_default();
            let affected = RowsAffected {
                rows_affected: rows.len() as u64,
            };
            rows.into_iter()
                .map(|v| Ok(QueryResult::Row(v)))
                .chain([Ok(QueryResult::Affected(affected))])
                .collect()
        };
        state.statements.push(query);
        stream::iter(results)
    }
}

impl Connection for MockConnection {
    fn release(self, had_error: bool) {
        self.shared.lock().releases.push(had_error);
    }
}

#[derive(Default, Debug, Clone)]
pub struct MockPool {
    pub shared: Shared,
}

impl MockPool {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Pool for MockPool {
    type Connection = MockConnection;

    async fn acquire(&self) -> Result<MockConnection> {
        let mut state = self.shared.lock();
        if state.unavailable {
            return Err(DataError::ConnectionUnavailable("The mock pool is exhausted".into()).into());
        }
        state.acquired += 1;
        Ok(MockConnection::new(self.shared.clone()))
    }

    async fn drain(&self) -> Result<()> {
        self.shared.lock().drained = true;
        Ok(())
    }
}

/// Row from `(label, value)` pairs.
pub fn row<V: Into<Value>>(values: impl IntoIterator<Item = (&'static str, V)>) -> RowLabeled {
    values.into_iter().collect()
}
