use postgrape::{Coordinator, Entity, Error, Fields, FindOptions, Pool, Repository, Value};
use std::sync::LazyLock;
use tokio::sync::Mutex;

#[derive(Entity, Debug, Clone, PartialEq)]
struct Account {
    id: Option<i64>,
    owner: String,
    balance: i64,
}

static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

async fn owners<P: Pool>(coordinator: &Coordinator<P>, accounts: &Repository<Account>) -> Vec<String> {
    let mut client = coordinator
        .acquire()
        .await
        .expect("Could not acquire a client");
    let result = accounts
        .find(&mut client, FindOptions::default())
        .await
        .expect("Failed to find the accounts");
    client.release(false);
    result.into_iter().map(|v| v.owner).collect()
}

async fn reset<P: Pool>(coordinator: &Coordinator<P>) -> Repository<Account> {
    crate::setup(
        coordinator,
        &[
            "DROP TABLE IF EXISTS public.accounts",
            "CREATE TABLE public.accounts (
                id BIGSERIAL PRIMARY KEY,
                owner TEXT NOT NULL,
                balance BIGINT NOT NULL
            )",
        ],
    )
    .await;
    Repository::new("accounts", &coordinator.repository_config())
}

fn account(owner: &str, balance: i64) -> Account {
    Account {
        id: None,
        owner: owner.into(),
        balance,
    }
}

/// A failing unit of work leaves nothing behind, a successful one is committed.
pub async fn unit_of_work_rollback<P: Pool>(coordinator: &Coordinator<P>) {
    let _lock = MUTEX.lock().await;
    let accounts = reset(coordinator).await;

    let result = coordinator
        .transaction(None, async |client| -> postgrape::Result<()> {
            accounts
                .create(client, &account("alice", 100), Default::default())
                .await?;
            Err(Error::msg("Something went wrong"))
        })
        .await;
    assert!(result.is_err());
    assert!(owners(coordinator, &accounts).await.is_empty());

    coordinator
        .transaction(None, async |client| {
            accounts
                .create(client, &account("bob", 50), Default::default())
                .await
        })
        .await
        .expect("Failed to create bob");
    assert_eq!(owners(coordinator, &accounts).await, ["bob"]);

    // A statement error aborts the whole unit
    let result = coordinator
        .transaction(None, async |client| {
            accounts
                .create(client, &account("carol", 10), Default::default())
                .await?;
            accounts
                .create(
                    client,
                    &Fields::new().set("owner", Value::Varchar(None)),
                    Default::default(),
                )
                .await
        })
        .await;
    assert!(result.is_err());
    assert_eq!(owners(coordinator, &accounts).await, ["bob"]);
}

/// Nested units of work roll back to their own savepoint.
#[cfg(not(feature = "disable-savepoints"))]
pub async fn transactions<P: Pool>(coordinator: &Coordinator<P>) {
    let _lock = MUTEX.lock().await;
    let accounts = reset(coordinator).await;

    let mut client = coordinator
        .acquire()
        .await
        .expect("Could not acquire a client");
    coordinator
        .transaction(Some(&mut client), async |client| -> postgrape::Result<()> {
            accounts
                .create(client, &account("dave", 10), Default::default())
                .await?;
            assert!(client.is_started());

            let inner = coordinator
                .transaction(Some(&mut *client), async |client| -> postgrape::Result<()> {
                    assert_eq!(client.depth(), 1);
                    accounts
                        .create(client, &account("erin", 20), Default::default())
                        .await?;
                    // NOT NULL violation, the transaction is aborted until the rollback
                    accounts
                        .create(
                            client,
                            &Fields::new().set("owner", Value::Varchar(None)),
                            Default::default(),
                        )
                        .await?;
                    Ok(())
                })
                .await;
            assert!(inner.is_err());
            assert_eq!(client.depth(), 0);

            coordinator
                .transaction(Some(&mut *client), async |client| {
                    accounts
                        .create(client, &account("frank", 30), Default::default())
                        .await
                        .map(|_| ())
                })
                .await?;
            assert!(!client.is_released());
            Ok(())
        })
        .await
        .expect("The outer unit of work failed");
    assert!(client.is_released());
    assert_eq!(owners(coordinator, &accounts).await, ["dave", "frank"]);
}
