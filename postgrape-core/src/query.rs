use crate::{Value, truncate_long};
use std::{
    fmt::{self, Display},
    sync::Arc,
};

/// Statement text with its positional parameters (`$1`, `$2`, ...).
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Query {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Query {
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

impl From<&str> for Query {
    fn from(value: &str) -> Self {
        Query::new(value, Vec::new())
    }
}

impl From<String> for Query {
    fn from(value: String) -> Self {
        Query::new(value, Vec::new())
    }
}

impl Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", truncate_long!(self.sql))
    }
}

/// Row count reported by the database once a statement completes.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowsAffected {
    pub rows_affected: u64,
}

/// Column labels, shared by every row of one result.
pub type RowNames = Arc<[String]>;

/// One row as returned by the database, values in the order of `labels`.
#[derive(Debug, Clone, PartialEq)]
pub struct RowLabeled {
    pub labels: RowNames,
    pub values: Box<[Value]>,
}

impl RowLabeled {
    pub fn new(labels: RowNames, values: Box<[Value]>) -> Self {
        Self { labels, values }
    }

    pub fn names(&self) -> &[String] {
        &self.labels
    }

    fn index_of(&self, column: &str) -> Option<usize> {
        self.labels.iter().position(|v| v == column)
    }

    pub fn get_column(&self, column: &str) -> Option<&Value> {
        self.index_of(column).map(|i| &self.values[i])
    }

    /// Move the value out of `column`, `Value::Null` stays in its place.
    pub fn take_column(&mut self, column: &str) -> Option<Value> {
        self.index_of(column)
            .map(|i| std::mem::take(&mut self.values[i]))
    }
}

impl<N: Into<String>, V: Into<Value>> FromIterator<(N, V)> for RowLabeled {
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        let (labels, values): (Vec<String>, Vec<Value>) = iter
            .into_iter()
            .map(|(n, v)| (n.into(), v.into()))
            .unzip();
        Self::new(labels.into(), values.into())
    }
}

/// Item streamed by [`crate::Executor::run`]: every row first, the count last.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    Row(RowLabeled),
    Affected(RowsAffected),
}

impl Extend<RowsAffected> for RowsAffected {
    fn extend<T: IntoIterator<Item = RowsAffected>>(&mut self, iter: T) {
        self.rows_affected += iter.into_iter().map(|v| v.rows_affected).sum::<u64>();
    }
}
