use crate::{Pool, RepositoryConfig, Result, TransactionalClient};
use std::borrow::Cow;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Schema given to repositories built through [`Coordinator::repository_config`].
    pub default_schema: Option<Cow<'static, str>>,
    /// Nest units of work through savepoints. When false, a unit of work running on a started
    /// client joins the outer transaction.
    pub use_savepoints: bool,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            default_schema: None,
            use_savepoints: true,
        }
    }
}

/// Runs units of work inside transactions, acquiring clients from the pool when needed.
///
/// ```ignore
/// let coordinator = Coordinator::new(pool, CoordinatorConfig::default());
/// let user = coordinator
///     .transaction(None, async |client| users.create(client, &fields, Default::default()).await)
///     .await?;
/// ```
pub struct Coordinator<P: Pool> {
    pool: P,
    config: CoordinatorConfig,
}

impl<P: Pool> Coordinator<P> {
    pub fn new(pool: P, config: CoordinatorConfig) -> Self {
        Self { pool, config }
    }

    pub fn pool(&self) -> &P {
        &self.pool
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn repository_config(&self) -> RepositoryConfig {
        RepositoryConfig {
            default_schema: self.config.default_schema.clone(),
        }
    }

    /// Acquire a connection and wrap it in a fresh client.
    pub async fn acquire(&self) -> Result<TransactionalClient<P::Connection>> {
        Ok(TransactionalClient::new(self.pool.acquire().await?))
    }

    pub async fn drain(&self) -> Result<()> {
        self.pool.drain().await
    }

    /// Run `work` as one unit: begin, then commit on success or roll back to the latest level
    /// on failure. The client is released exactly once whatever the outcome.
    ///
    /// Without `client` one is acquired from the pool.
    pub async fn transaction<T, F>(
        &self,
        client: Option<&mut TransactionalClient<P::Connection>>,
        work: F,
    ) -> Result<T>
    where
        F: AsyncFnOnce(&mut TransactionalClient<P::Connection>) -> Result<T>,
    {
        let mut acquired;
        let (client, owned) = match client {
            Some(client) => (client, false),
            None => {
                acquired = self.acquire().await?;
                (&mut acquired, true)
            }
        };
        if client.is_started() && !self.config.use_savepoints {
            return work(client).await;
        }
        if let Err(e) = client.begin().await {
            if owned {
                client.release(true);
            }
            return Err(e);
        }
        let result = match work(&mut *client).await {
            Ok(value) => client.commit().await.map(|_| value),
            Err(e) => Err(e),
        };
        if result.is_err() {
            if let Err(e) = client.rollback_to_latest().await {
                log::warn!("Could not roll back the failed unit of work: {:#}", e);
            }
        }
        client.release(result.is_err());
        result
    }
}
