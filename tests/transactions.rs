mod mock;

#[cfg(test)]
mod tests {
    use super::mock::MockPool;
    use postgrape::{DataError, Executor, Pool, Query, TransactionalClient};
    use postgrape_tests::{init_logs, silent_logs};

    async fn client(pool: &MockPool) -> TransactionalClient<<MockPool as Pool>::Connection> {
        TransactionalClient::new(pool.acquire().await.expect("Could not acquire"))
    }

    #[tokio::test]
    async fn nesting() {
        let pool = MockPool::new();
        let mut client = client(&pool).await;
        assert!(!client.is_started());
        client.begin().await.expect("Could not begin");
        assert!(client.is_started());
        assert_eq!(client.depth(), 0);
        client.begin_or_save().await.expect("Could not save");
        client.begin().await.expect("Could not save");
        assert_eq!(client.savepoints(), ["savepoint_0", "savepoint_1"]);

        client
            .rollback_to_latest()
            .await
            .expect("Could not roll back");
        assert_eq!(client.depth(), 2);
        client.release(true);
        assert_eq!(client.depth(), 1);

        // Commit inside a savepoint only closes it on release
        client.commit().await.expect("Could not commit");
        assert!(client.is_started());
        client.release(false);
        assert_eq!(client.depth(), 0);
        assert!(!client.is_released());

        client.commit().await.expect("Could not commit");
        assert!(!client.is_started());
        client.release(false);
        assert!(client.is_released());

        let state = pool.shared.lock();
        assert_eq!(
            state.sql(),
            [
                "BEGIN",
                "SAVEPOINT savepoint_0",
                "SAVEPOINT savepoint_1",
                "ROLLBACK TO SAVEPOINT savepoint_1",
                "COMMIT",
            ]
        );
        assert_eq!(state.releases, [false]);
    }

    #[tokio::test]
    async fn nested_levels_commit_once() {
        for levels in 1..6 {
            let pool = MockPool::new();
            let mut client = client(&pool).await;
            for _ in 0..levels {
                client.begin().await.expect("Could not begin");
            }
            assert_eq!(client.depth(), levels - 1);
            for _ in 0..levels {
                client.commit().await.expect("Could not commit");
                client.release(false);
            }
            assert!(client.is_released());
            let state = pool.shared.lock();
            assert_eq!(state.count("BEGIN"), 1);
            assert_eq!(state.count("COMMIT"), 1);
            assert_eq!(state.statements.len(), levels + 1);
            assert_eq!(state.sql().last(), Some(&"COMMIT"));
            assert_eq!(state.releases, [false]);
        }
    }

    #[tokio::test]
    async fn rollback() {
        let pool = MockPool::new();
        let mut client = client(&pool).await;
        // Nothing to undo
        client
            .rollback_to_latest()
            .await
            .expect("Could not roll back");
        client.commit().await.expect("Could not commit");
        assert!(pool.shared.lock().statements.is_empty());

        client.begin().await.expect("Could not begin");
        client
            .rollback_to_latest()
            .await
            .expect("Could not roll back");
        assert!(!client.is_started());
        client
            .rollback_to_latest()
            .await
            .expect("Could not roll back");

        client.begin().await.expect("Could not begin");
        assert!(client.is_started());
        assert_eq!(client.depth(), 0);
        client.release(true);
        assert!(client.is_released());
        assert!(!client.is_started());

        let state = pool.shared.lock();
        assert_eq!(state.sql(), ["BEGIN", "ROLLBACK", "BEGIN"]);
        assert_eq!(state.releases, [true]);
    }

    #[tokio::test]
    async fn failed_commands_keep_the_state() {
        init_logs();
        let pool = MockPool::new();
        let mut client = client(&pool).await;
        silent_logs! {
            pool.shared.fail_on("BEGIN");
            assert!(client.begin().await.is_err());
            assert!(!client.is_started());
            pool.shared.lock().failures.clear();

            client.begin().await.expect("Could not begin");
            pool.shared.fail_on("SAVEPOINT");
            let error = client.begin().await.expect_err("The savepoint must fail");
            assert!(format!("{:#}", error).contains("While running the query:\nSAVEPOINT savepoint_0"));
            assert_eq!(client.depth(), 0);

            pool.shared.fail_on("COMMIT");
            assert!(client.commit().await.is_err());
            assert!(client.is_started());
        }
    }

    #[tokio::test]
    async fn released_client() {
        init_logs();
        let pool = MockPool::new();
        let mut client = client(&pool).await;
        client.release(false);
        silent_logs! {
            client.release(true);
            let error = client
                .execute(Query::from("SELECT 1"))
                .await
                .expect_err("A released client cannot run statements");
            assert!(matches!(
                error.downcast_ref::<DataError>(),
                Some(DataError::ClientReleased)
            ));
            let error = client.begin().await.expect_err("A released client cannot begin");
            assert!(matches!(
                error.downcast_ref::<DataError>(),
                Some(DataError::ClientReleased)
            ));
        }
        let state = pool.shared.lock();
        assert_eq!(state.releases, [false]);
        assert!(state.statements.is_empty());
    }

    #[tokio::test]
    async fn dropped_client() {
        init_logs();
        let pool = MockPool::new();
        silent_logs! {
            let mut client = client(&pool).await;
            client.begin().await.expect("Could not begin");
            client.begin().await.expect("Could not save");
            drop(client);
        }
        drop(client(&pool).await);
        let mut client = client(&pool).await;
        client.release(false);
        drop(client);
        let state = pool.shared.lock();
        assert_eq!(state.sql(), ["BEGIN", "SAVEPOINT savepoint_0"]);
        // Open transaction discarded, idle connection and released client returned once
        assert_eq!(state.releases, [true, false, false]);
    }
}
