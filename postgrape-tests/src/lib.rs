mod books;
mod cities;
mod tickets;
mod transactions;

#[cfg(not(feature = "disable-savepoints"))]
use crate::transactions::transactions;
use crate::{books::books, cities::cities, tickets::tickets, transactions::unit_of_work_rollback};
use log::LevelFilter;
use postgrape::{Coordinator, CoordinatorConfig, Executor, Pool};
use std::env;

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Run every suite against a live database reachable through `pool`. The pool is drained at the
/// end.
pub async fn execute_tests<P: Pool>(pool: P) {
    let coordinator = Coordinator::new(pool, CoordinatorConfig::default());
    books(&coordinator).await;
    cities(&coordinator).await;
    tickets(&coordinator).await;
    unit_of_work_rollback(&coordinator).await;
    #[cfg(not(feature = "disable-savepoints"))]
    transactions(&coordinator).await;
    coordinator
        .drain()
        .await
        .expect("Could not drain the pool");
}

/// Run the statements on a fresh client outside of any transaction.
pub(crate) async fn setup<P: Pool>(coordinator: &Coordinator<P>, statements: &[&str]) {
    let mut client = coordinator
        .acquire()
        .await
        .expect("Could not acquire a client");
    for statement in statements {
        client
            .execute((*statement).into())
            .await
            .unwrap_or_else(|e| panic!("Failed to run the setup statement:\n{statement}\n{e:#}"));
    }
    client.release(false);
}

#[macro_export]
macro_rules! silent_logs {
    ($($code:tt)+) => {{
        let level = log::max_level();
        log::set_max_level(log::LevelFilter::Off);
        $($code)+
        log::set_max_level(level);
    }};
}
