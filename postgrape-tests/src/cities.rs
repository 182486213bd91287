use postgrape::{
    Coordinator, DataError, Entity, Pool, SearchOptions, SearchStrategy,
    SearchableRepository, Where, columns,
};
use std::sync::LazyLock;
use tokio::sync::Mutex;

#[derive(Entity, Debug, Clone, PartialEq)]
struct City {
    id: Option<i64>,
    name: String,
    country: String,
}

static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

fn names(cities: &[City]) -> Vec<&str> {
    cities.iter().map(|v| v.name.as_str()).collect()
}

pub async fn cities<P: Pool>(coordinator: &Coordinator<P>) {
    let _lock = MUTEX.lock().await;

    // Setup
    crate::setup(
        coordinator,
        &[
            "DROP TABLE IF EXISTS public.cities",
            "CREATE TABLE public.cities (
                id BIGSERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                country TEXT NOT NULL
            )",
        ],
    )
    .await;
    let config = coordinator.repository_config();
    let cities = SearchableRepository::<City>::new("cities", &config, ["name", "country"]);
    let mut client = coordinator
        .acquire()
        .await
        .expect("Could not acquire a client");
    for (name, country) in [
        ("Berlin", "Germany"),
        ("Bern", "Switzerland"),
        ("Oberbergen", "Germany"),
        ("Paris", "France"),
        ("Bergamo", "Italy"),
    ] {
        cities
            .create(
                &mut client,
                &City {
                    id: None,
                    name: name.into(),
                    country: country.into(),
                },
                Default::default(),
            )
            .await
            .expect("Failed to create a city");
    }

    // Ranked
    let found = cities
        .search(&mut client, "ber", Default::default())
        .await
        .expect("Failed to search the cities");
    assert_eq!(names(&found), ["Berlin", "Bern", "Bergamo", "Oberbergen"]);

    let found = cities
        .search(&mut client, "  PARIS,bern ", Default::default())
        .await
        .expect("Failed to search many words");
    assert_eq!(names(&found), ["Paris", "Bern"]);

    let found = cities
        .search(
            &mut client,
            "ber",
            SearchOptions {
                filter: Some(Where::new().eq("country", "Germany")),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to search with a filter");
    assert_eq!(names(&found), ["Berlin", "Oberbergen"]);

    let found = cities
        .search(
            &mut client,
            "ber",
            SearchOptions {
                offset: Some(1),
                limit: Some(2),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to search a page");
    assert_eq!(names(&found), ["Bern", "Bergamo"]);

    let found = cities
        .search(
            &mut client,
            "many",
            SearchOptions {
                columns_for_search: Some(columns(["name"])),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to search the overridden columns");
    assert!(found.is_empty());

    // Empty query
    let listed = cities
        .search(&mut client, " , ", Default::default())
        .await
        .expect("Failed to list the cities");
    assert_eq!(listed.len(), 5);
    let strict = cities.clone().with_strict(true);
    let error = strict
        .search(&mut client, "", Default::default())
        .await
        .expect_err("A strict repository must reject an empty query");
    assert!(matches!(
        error.downcast_ref::<DataError>(),
        Some(DataError::InvalidArguments(..))
    ));

    // Multi pass
    let passes = cities
        .clone()
        .with_strategy(SearchStrategy::MultiPass { fuzzy: None });
    let found = passes
        .search(&mut client, "ber", Default::default())
        .await
        .expect("Failed the multi pass search");
    assert_eq!(names(&found), ["Berlin", "Bern", "Bergamo", "Oberbergen"]);
    let found = passes
        .search(
            &mut client,
            "ber",
            SearchOptions {
                offset: Some(2),
                limit: Some(2),
                ..Default::default()
            },
        )
        .await
        .expect("Failed the multi pass search of a page");
    assert_eq!(names(&found), ["Bergamo", "Oberbergen"]);

    #[cfg(not(feature = "disable-fuzzy"))]
    {
        crate::setup(coordinator, &["CREATE EXTENSION IF NOT EXISTS fuzzystrmatch"]).await;
        let fuzzy = cities.clone().with_strategy(SearchStrategy::MultiPass {
            fuzzy: Some(postgrape::FuzzyRanking::default()),
        });
        let found = fuzzy
            .search(
                &mut client,
                "Pariss",
                SearchOptions {
                    limit: Some(1),
                    ..Default::default()
                },
            )
            .await
            .expect("Failed the fuzzy search");
        assert_eq!(names(&found), ["Paris"]);
    }

    client.release(false);
}
