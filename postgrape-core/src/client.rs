use crate::{
    Connection, DataError, Driver, Executor, Query, QueryResult, Result, SqlWriter,
    future::{self, Either},
    stream::{self, Stream},
    truncate_long,
};

/// Owner of one physical connection and of its transaction state.
///
/// Nested units of work are expressed through a stack of savepoints: the first `begin` opens
/// the transaction, the following ones push `savepoint_<depth>`.
pub struct TransactionalClient<C: Connection> {
    connection: Option<C>,
    driver: C::Driver,
    started: bool,
    savepoints: Vec<String>,
}

impl<C: Connection> TransactionalClient<C> {
    pub fn new(connection: C) -> Self {
        Self {
            connection: Some(connection),
            driver: Default::default(),
            started: false,
            savepoints: Vec::new(),
        }
    }

    /// A physical transaction is open.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Number of savepoints currently open.
    pub fn depth(&self) -> usize {
        self.savepoints.len()
    }

    pub fn savepoints(&self) -> &[String] {
        &self.savepoints
    }

    /// The connection went back to the pool.
    pub fn is_released(&self) -> bool {
        self.connection.is_none()
    }

    /// Open the transaction, or a savepoint when one is already open.
    pub async fn begin(&mut self) -> Result<()> {
        let mut sql = String::new();
        let writer = self.driver.sql_writer();
        if !self.started {
            writer.write_transaction_begin(&mut sql);
            self.statement(sql).await?;
            self.started = true;
        } else {
            let name = format!("savepoint_{}", self.savepoints.len());
            writer.write_savepoint(&mut sql, &name);
            self.statement(sql).await?;
            self.savepoints.push(name);
        }
        Ok(())
    }

    /// Same as [`Self::begin`], nesting through savepoints on a started client.
    pub async fn begin_or_save(&mut self) -> Result<()> {
        self.begin().await
    }

    /// Commit the physical transaction. With savepoints open this does nothing, the nesting
    /// level is closed by [`Self::release`].
    pub async fn commit(&mut self) -> Result<()> {
        if !self.started || !self.savepoints.is_empty() {
            return Ok(());
        }
        let mut sql = String::new();
        self.driver.sql_writer().write_transaction_commit(&mut sql);
        self.statement(sql).await?;
        self.started = false;
        Ok(())
    }

    /// Undo the innermost level: back to the latest savepoint, or the whole transaction.
    pub async fn rollback_to_latest(&mut self) -> Result<()> {
        if !self.started {
            return Ok(());
        }
        let mut sql = String::new();
        let writer = self.driver.sql_writer();
        let full = match self.savepoints.last() {
            Some(name) => {
                writer.write_rollback_to_savepoint(&mut sql, name);
                false
            }
            None => {
                writer.write_transaction_rollback(&mut sql);
                true
            }
        };
        self.statement(sql).await?;
        if full {
            self.started = false;
        }
        Ok(())
    }

    /// Close the innermost level: pop the latest savepoint or give the connection back.
    pub fn release(&mut self, had_error: bool) {
        if self.savepoints.pop().is_some() {
            return;
        }
        match self.connection.take() {
            Some(connection) => {
                self.started = false;
                connection.release(had_error);
            }
            None => log::warn!("The client was already released"),
        }
    }

    async fn statement(&mut self, sql: String) -> Result<()> {
        match self.execute(Query::from(sql.as_str())).await {
            Ok(..) => Ok(()),
            Err(e) => {
                let e = e.context(format!("While running the query:\n{}", truncate_long!(sql)));
                log::error!("{:#}", e);
                Err(e)
            }
        }
    }
}

/// A client dropped while still holding its connection (panicking or cancelled unit of work)
/// gives it back. With a transaction still open the connection is discarded, it must never
/// reach the next acquirer.
impl<C: Connection> Drop for TransactionalClient<C> {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.take() {
            if self.started {
                log::warn!("Dropped a client with an open transaction, discarding its connection");
            }
            connection.release(self.started);
        }
    }
}

impl<C: Connection> Executor for TransactionalClient<C> {
    type Driver = C::Driver;

    fn driver(&self) -> &Self::Driver {
        &self.driver
    }

    fn run(&mut self, query: Query) -> impl Stream<Item = Result<QueryResult>> + Send {
        match self.connection.as_mut() {
            Some(connection) => {
                log::debug!("{}", query);
                Either::Left(connection.run(query))
            }
            None => Either::Right(stream::once(future::ready(Err(
                DataError::ClientReleased.into(),
            )))),
        }
    }
}
