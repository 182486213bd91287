use postgrape::{
    Coordinator, CreateMultipleOptions, DataError, Entity, FindOptions, MultipleRepository, Pool,
    Where,
};
use std::sync::LazyLock;
use tokio::sync::Mutex;

#[derive(Entity, Debug, Clone, PartialEq)]
struct Ticket {
    id: Option<i64>,
    event: String,
    price: i64,
    #[postgrape(ignore)]
    printed: bool,
}

static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub async fn tickets<P: Pool>(coordinator: &Coordinator<P>) {
    let _lock = MUTEX.lock().await;

    // Setup
    crate::setup(
        coordinator,
        &[
            "DROP TABLE IF EXISTS public.tickets",
            "CREATE TABLE public.tickets (
                id BIGSERIAL PRIMARY KEY,
                event TEXT NOT NULL,
                price BIGINT NOT NULL
            )",
            "CREATE OR REPLACE FUNCTION public.insert_multiple_tickets(
                p_event TEXT,
                p_price BIGINT,
                p_count BIGINT
            ) RETURNS BIGINT[] AS $$
                WITH inserted AS (
                    INSERT INTO public.tickets (event, price)
                    SELECT p_event, p_price FROM generate_series(1, p_count)
                    RETURNING id
                )
                SELECT array_agg(id ORDER BY id) FROM inserted
            $$ LANGUAGE sql",
        ],
    )
    .await;
    let tickets = MultipleRepository::<Ticket>::new(
        "tickets",
        &coordinator.repository_config(),
        ["event", "price"],
    );
    let template = Ticket {
        id: None,
        event: "Concert".into(),
        price: 40,
        printed: true,
    };

    let ids = coordinator
        .transaction(None, async |client| {
            tickets
                .create_multiple(client, &template, 3, CreateMultipleOptions::default())
                .await
        })
        .await
        .expect("Failed to create many tickets");
    assert_eq!(ids.len(), 3);
    assert!(ids.windows(2).all(|w| w[0] < w[1]));

    let mut client = coordinator
        .acquire()
        .await
        .expect("Could not acquire a client");
    let stored = tickets
        .find(
            &mut client,
            FindOptions {
                filter: Some(Where::new().any_of("id", ids.iter().copied())),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to find the created tickets");
    assert_eq!(stored.len(), 3);
    assert!(stored.iter().all(|v| v.event == "Concert" && v.price == 40));
    assert!(stored.iter().all(|v| !v.printed));

    let error = tickets
        .create_multiple(
            &mut client,
            &None::<Ticket>,
            2,
            CreateMultipleOptions::default(),
        )
        .await
        .expect_err("A missing item must be rejected");
    assert!(matches!(
        error.downcast_ref::<DataError>(),
        Some(DataError::InvalidArguments(..))
    ));

    client.release(false);
}
