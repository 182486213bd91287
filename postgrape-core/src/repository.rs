use crate::{
    AsFields, CreateOptions, DataError, Driver, Entity, Error, Executor, FindByIdOptions,
    FindOneOptions, FindOptions, Query, QueryOptions, Result, RepositoryConfig, RepositoryOptions,
    SqlWriter, TableRef, UpdateByIdOptions, UpdateOptions,
    stream::{StreamExt, TryStreamExt},
    writer::Context,
};
use std::marker::PhantomData;

/// Typed access to one table.
///
/// A repository owns no connection, every operation runs exactly one statement on the executor
/// it receives, normally a [`crate::TransactionalClient`].
#[derive(Debug, Clone)]
pub struct Repository<E> {
    table: TableRef,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Repository<E> {
    pub fn new(options: impl Into<RepositoryOptions>, config: &RepositoryConfig) -> Self {
        Self {
            table: TableRef::resolve(options.into(), config),
            _entity: PhantomData,
        }
    }

    pub fn table(&self) -> &TableRef {
        &self.table
    }

    pub async fn find(&self, executor: &mut impl Executor, options: FindOptions) -> Result<Vec<E>> {
        let options: QueryOptions = options.into();
        let query = build_query(&*executor, |writer, context, out| {
            writer.write_select(context, out, &self.table, &options)
        });
        fetch_entities(executor, query).await
    }

    pub async fn find_one(
        &self,
        executor: &mut impl Executor,
        options: FindOneOptions,
    ) -> Result<Option<E>> {
        let options: QueryOptions = options.into();
        let query = build_query(&*executor, |writer, context, out| {
            writer.write_select(context, out, &self.table, &options)
        });
        Ok(fetch_entities(executor, query).await?.into_iter().next())
    }

    pub async fn find_by_id(
        &self,
        executor: &mut impl Executor,
        id: i64,
        options: FindByIdOptions,
    ) -> Result<Option<E>> {
        let options = options.into_query_options(id);
        let query = build_query(&*executor, |writer, context, out| {
            writer.write_select(context, out, &self.table, &options)
        });
        Ok(fetch_entities(executor, query).await?.into_iter().next())
    }

    /// Insert one row and return it as stored.
    pub async fn create(
        &self,
        executor: &mut impl Executor,
        entity: &impl AsFields,
        options: CreateOptions,
    ) -> Result<E> {
        let fields = entity
            .as_fields()
            .ok_or_else(|| missing_argument("the entity to create is missing"))?;
        let options: QueryOptions = options.into();
        let query = build_query(&*executor, |writer, context, out| {
            writer.write_insert(context, out, &self.table, &fields, &options)
        });
        let context = format!("While running the query:\n{}", query);
        fetch_entities(executor, query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                let e = Error::msg("The insert did not return any row").context(context);
                log::error!("{:#}", e);
                e
            })
    }

    /// Update every row matching the filter, returns the updated rows.
    pub async fn update(
        &self,
        executor: &mut impl Executor,
        options: UpdateOptions,
        entity: &impl AsFields,
    ) -> Result<Vec<E>> {
        let fields = entity
            .as_fields()
            .ok_or_else(|| missing_argument("the partial entity to update is missing"))?;
        let options: QueryOptions = options.into();
        let query = build_query(&*executor, |writer, context, out| {
            writer.write_update(context, out, &self.table, &fields, &options)
        });
        fetch_entities(executor, query).await
    }

    pub async fn update_by_id(
        &self,
        executor: &mut impl Executor,
        id: i64,
        entity: &impl AsFields,
        options: UpdateByIdOptions,
    ) -> Result<Option<E>> {
        let fields = entity
            .as_fields()
            .ok_or_else(|| missing_argument("the partial entity to update is missing"))?;
        let options = options.into_query_options(id);
        let query = build_query(&*executor, |writer, context, out| {
            writer.write_update(context, out, &self.table, &fields, &options)
        });
        Ok(fetch_entities(executor, query).await?.into_iter().next())
    }
}

/// Write one statement with the executor's dialect. Filters are inlined, everything pushed to
/// the context becomes a positional parameter.
pub(crate) fn build_query<X: Executor>(
    executor: &X,
    write: impl FnOnce(&<X::Driver as Driver>::SqlWriter, &mut Context, &mut String),
) -> Query {
    let writer = executor.driver().sql_writer();
    let mut context = Context::inline();
    let mut sql = String::with_capacity(128);
    write(&writer, &mut context, &mut sql);
    Query::new(sql, context.parameters)
}

pub(crate) async fn fetch_entities<E: Entity>(
    executor: &mut impl Executor,
    query: Query,
) -> Result<Vec<E>> {
    let context = format!("While running the query:\n{}", query);
    executor
        .fetch(query)
        .map(|row| row.and_then(E::from_row))
        .try_collect()
        .await
        .map_err(|e| {
            let e = e.context(context);
            log::error!("{:#}", e);
            e
        })
}

pub(crate) fn missing_argument(reason: &'static str) -> Error {
    let e = Error::new(DataError::invalid_arguments(reason));
    log::error!("{:#}", e);
    e
}
