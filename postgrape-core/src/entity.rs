use crate::{Result, RowLabeled, Value};
use std::borrow::Cow;

/// A flat record read from a table, identified by its integer `id`.
///
/// Usually implemented through `#[derive(Entity)]`.
pub trait Entity: Sized + Send {
    fn from_row(row: RowLabeled) -> Result<Self>;

    fn id(&self) -> Option<i64>;
}

impl Entity for RowLabeled {
    fn from_row(row: RowLabeled) -> Result<Self> {
        Ok(row)
    }

    fn id(&self) -> Option<i64> {
        self.get_column("id").and_then(Value::as_i64)
    }
}

/// Ordered column values written by `INSERT` and `UPDATE ... SET`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Fields(pub Vec<(Cow<'static, str>, Value)>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column, replacing its value when already present.
    pub fn set(mut self, column: impl Into<Cow<'static, str>>, value: impl Into<Value>) -> Self {
        let column = column.into();
        let value = value.into();
        match self.0.iter_mut().find(|(c, _)| *c == column) {
            Some(entry) => entry.1 = value,
            None => self.0.push((column, value)),
        }
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Cow<'static, str>, Value)> {
        self.0.iter()
    }
}

impl<C: Into<Cow<'static, str>>, V: Into<Value>> FromIterator<(C, V)> for Fields {
    fn from_iter<T: IntoIterator<Item = (C, V)>>(iter: T) -> Self {
        Fields(
            iter.into_iter()
                .map(|(c, v)| (c.into(), v.into()))
                .collect(),
        )
    }
}

/// Source of the column values to write.
///
/// `None` means the argument itself is missing, which is rejected as invalid arguments. An empty
/// `Fields` is accepted and still produces a statement.
pub trait AsFields {
    fn as_fields(&self) -> Option<Fields>;
}

impl AsFields for Fields {
    fn as_fields(&self) -> Option<Fields> {
        Some(self.clone())
    }
}

impl<T: AsFields> AsFields for Option<T> {
    fn as_fields(&self) -> Option<Fields> {
        self.as_ref().and_then(AsFields::as_fields)
    }
}

impl<T: AsFields> AsFields for &T {
    fn as_fields(&self) -> Option<Fields> {
        (*self).as_fields()
    }
}

impl AsFields for RowLabeled {
    fn as_fields(&self) -> Option<Fields> {
        Some(
            self.labels
                .iter()
                .zip(self.values.iter())
                .map(|(l, v)| (l.clone(), v.clone()))
                .collect(),
        )
    }
}
