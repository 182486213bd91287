use crate::{Encode, PostgresDriver, ValueCodec, util::decode_row};
use async_stream::try_stream;
use deadpool_postgres::Object;
use postgrape_core::{
    Connection, Error, Executor, Query, QueryResult, Result, RowLabeled, RowNames, RowsAffected,
    stream::{Stream, StreamExt, TryStreamExt},
};
use std::{pin::pin, sync::Arc};

/// Pooled Postgres connection, acquired through [`crate::PostgresPool`].
pub struct PostgresConnection {
    pub(crate) client: Object,
    pub(crate) codec: Arc<dyn ValueCodec>,
}

impl Executor for PostgresConnection {
    type Driver = PostgresDriver;

    fn driver(&self) -> &Self::Driver {
        &PostgresDriver {}
    }

    fn run(&mut self, query: Query) -> impl Stream<Item = Result<QueryResult>> + Send {
        let context = Arc::new(format!("While running the query:\n{}", query));
        try_stream! {
            let statement = self.client.prepare_cached(&query.sql).await?;
            let params = query
                .params
                .iter()
                .map(|value| Encode {
                    value,
                    codec: &*self.codec,
                })
                .collect::<Vec<_>>();
            let stream = self.client.query_raw(&statement, params).await?;
            let mut stream = pin!(stream);
            let mut labels: Option<RowNames> = None;
            while let Some(row) = stream.next().await.transpose()? {
                let labels = labels.get_or_insert_with(|| {
                    row.columns().iter().map(|c| c.name().to_string()).collect()
                });
                yield QueryResult::Row(RowLabeled::new(
                    labels.clone(),
                    decode_row(&*self.codec, &row)?,
                ));
            }
            if let Some(rows_affected) = stream.rows_affected() {
                yield QueryResult::Affected(RowsAffected { rows_affected });
            }
        }
        .map_err(move |e: Error| {
            let e = e.context(context.clone());
            log::error!("{:#}", e);
            e
        })
    }
}

impl Connection for PostgresConnection {
    fn release(self, had_error: bool) {
        if had_error {
            // Detached from the pool and closed on drop
            drop(Object::take(self.client));
        }
    }
}
