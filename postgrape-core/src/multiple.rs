use crate::{
    AsFields, Column, CreateMultipleOptions, Entity, Error, Executor, RepositoryConfig,
    RepositoryOptions, Repository, Result, SqlWriter, Value,
    repository::{build_query, missing_argument},
    stream::TryStreamExt,
};
use std::{ops::Deref, pin::pin};

/// Repository bulk inserting rows through the `insert_multiple_<table>` stored procedure.
///
/// The procedure takes the columns of `arguments_sequence` followed by the number of copies
/// and returns the ids it created.
#[derive(Debug, Clone)]
pub struct MultipleRepository<E> {
    repository: Repository<E>,
    pub arguments_sequence: Vec<Column>,
}

impl<E: Entity> MultipleRepository<E> {
    pub fn new<C: Into<Column>>(
        options: impl Into<RepositoryOptions>,
        config: &RepositoryConfig,
        arguments_sequence: impl IntoIterator<Item = C>,
    ) -> Self {
        Self {
            repository: Repository::new(options, config),
            arguments_sequence: arguments_sequence.into_iter().map(Into::into).collect(),
        }
    }

    /// Insert `count` copies of `item`, returns the new ids.
    pub async fn create_multiple(
        &self,
        executor: &mut impl Executor,
        item: &impl AsFields,
        count: u64,
        options: CreateMultipleOptions,
    ) -> Result<Vec<i64>> {
        let fields = item
            .as_fields()
            .ok_or_else(|| missing_argument("the item to create is missing"))?;
        let arguments = self
            .arguments_sequence
            .iter()
            .map(|column| {
                fields
                    .iter()
                    .find(|(c, _)| c == column)
                    .map(|(_, v)| v.clone())
                    .unwrap_or_default()
            })
            .collect::<Vec<_>>();
        let mut function = String::new();
        let query = build_query(&*executor, |writer, context, out| {
            function = writer.create_multiple_function(self.table());
            writer.write_create_multiple(
                context,
                out,
                self.table(),
                &arguments,
                count,
                options.select.as_deref(),
            )
        });
        let context = format!("While running the query:\n{}", query);
        let stream = executor.fetch(query);
        let ids = match pin!(stream).try_next().await {
            Ok(row) => row
                .and_then(|mut row| {
                    let value = row.take_column(&function);
                    value.or_else(|| row.values.first().cloned())
                })
                .map(ids_from_value)
                .transpose(),
            Err(e) => Err(e),
        };
        ids.map(Option::unwrap_or_default).map_err(|e| {
            let e = e.context(context);
            log::error!("{:#}", e);
            e
        })
    }
}

fn ids_from_value(value: Value) -> Result<Vec<i64>> {
    match value {
        Value::List(Some(values), ..) => values
            .into_iter()
            .filter(|v| !v.is_null())
            .map(|v| {
                v.as_i64()
                    .ok_or_else(|| Error::msg(format!("Unexpected id {:?}", v)))
            })
            .collect(),
        v if v.is_null() => Ok(Vec::new()),
        v => v
            .as_i64()
            .map(|v| vec![v])
            .ok_or_else(|| Error::msg(format!("Unexpected ids {:?}", v))),
    }
}

impl<E> Deref for MultipleRepository<E> {
    type Target = Repository<E>;

    fn deref(&self) -> &Self::Target {
        &self.repository
    }
}
