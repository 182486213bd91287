mod mock;

#[cfg(test)]
mod tests {
    use super::mock::{MockPool, row};
    use indoc::indoc;
    use postgrape::{
        DataError, Entity, FuzzyRanking, Pool, RepositoryConfig, RowLabeled, SearchOptions,
        SearchStrategy, SearchableRepository, TransactionalClient, Value, Where, columns,
    };
    use postgrape_tests::{init_logs, silent_logs};

    #[derive(Entity, Debug, Clone, PartialEq)]
    struct City {
        id: Option<i64>,
        name: String,
    }

    fn city(id: i64, name: &str) -> RowLabeled {
        row([
            ("id", Value::Int64(Some(id))),
            ("name", Value::Varchar(Some(name.into()))),
        ])
    }

    fn names(cities: &[City]) -> Vec<&str> {
        cities.iter().map(|v| v.name.as_str()).collect()
    }

    fn cities() -> SearchableRepository<City> {
        SearchableRepository::new("cities", &RepositoryConfig::default(), ["name", "country"])
    }

    async fn client(pool: &MockPool) -> TransactionalClient<<MockPool as Pool>::Connection> {
        TransactionalClient::new(pool.acquire().await.expect("Could not acquire"))
    }

    #[tokio::test]
    async fn ranked() {
        let pool = MockPool::new();
        let mut client = client(&pool).await;
        pool.shared.respond([city(1, "Berlin"), city(3, "Oberbergen")]);
        let found = cities()
            .search(
                &mut client,
                " ber,, lin ",
                SearchOptions {
                    filter: Some(Where::new().eq("country", "Germany")),
                    limit: Some(5),
                    ..Default::default()
                },
            )
            .await
            .expect("Failed to search");
        assert_eq!(names(&found), ["Berlin", "Oberbergen"]);
        let state = pool.shared.lock();
        assert_eq!(
            state.statements[0].sql,
            indoc! {r#"
                SELECT * FROM public.cities WHERE country = 'Germany' AND (name ILIKE '%' || $1 || '%' OR name ILIKE '%' || $2 || '%' OR country ILIKE '%' || $1 || '%' OR country ILIKE '%' || $2 || '%') ORDER BY name ILIKE $1 || '%' DESC NULLS LAST, name ILIKE $2 || '%' DESC NULLS LAST, country ILIKE $1 || '%' DESC NULLS LAST, country ILIKE $2 || '%' DESC NULLS LAST, "id" ASC LIMIT 5
            "#}
            .trim()
        );
        assert_eq!(
            state.statements[0].params,
            [
                Value::Varchar(Some("ber".into())),
                Value::Varchar(Some("lin".into())),
            ]
        );
    }

    #[tokio::test]
    async fn default_limit() {
        let pool = MockPool::new();
        let mut client = client(&pool).await;
        for limit in [None, Some(0), Some(3)] {
            cities()
                .search(
                    &mut client,
                    "x",
                    SearchOptions {
                        columns_for_search: Some(columns(["name"])),
                        limit,
                        ..Default::default()
                    },
                )
                .await
                .expect("Failed to search");
        }
        assert_eq!(
            pool.shared.sql(),
            [
                r#"SELECT * FROM public.cities WHERE (name ILIKE '%' || $1 || '%') ORDER BY name ILIKE $1 || '%' DESC NULLS LAST, "id" ASC LIMIT 10"#,
                r#"SELECT * FROM public.cities WHERE (name ILIKE '%' || $1 || '%') ORDER BY name ILIKE $1 || '%' DESC NULLS LAST, "id" ASC LIMIT 10"#,
                r#"SELECT * FROM public.cities WHERE (name ILIKE '%' || $1 || '%') ORDER BY name ILIKE $1 || '%' DESC NULLS LAST, "id" ASC LIMIT 3"#,
            ]
        );
    }

    #[tokio::test]
    async fn empty_query() {
        init_logs();
        let pool = MockPool::new();
        let mut client = client(&pool).await;
        pool.shared.respond([city(1, "Berlin"), city(2, "Bern")]);
        let found = cities()
            .search(&mut client, " ,  ", SearchOptions::default())
            .await
            .expect("An empty query lists the table");
        assert_eq!(found.len(), 2);
        let found = SearchableRepository::<City>::new(
            "cities",
            &RepositoryConfig::default(),
            Vec::<&str>::new(),
        )
        .search(
            &mut client,
            "",
            SearchOptions {
                filter: Some(Where::new().eq("country", "France")),
                offset: Some(4),
                ..Default::default()
            },
        )
        .await
        .expect("Listing does not need search columns");
        assert!(found.is_empty());
        silent_logs! {
            let error = cities()
                .with_strict(true)
                .search(&mut client, "   ", SearchOptions::default())
                .await
                .expect_err("A strict repository rejects empty queries");
            assert!(matches!(
                error.downcast_ref::<DataError>(),
                Some(DataError::InvalidArguments(..))
            ));
        }
        let state = pool.shared.lock();
        assert_eq!(
            state.sql(),
            [
                r#"SELECT * FROM public.cities ORDER BY "id" ASC LIMIT 10"#,
                r#"SELECT * FROM public.cities WHERE country = 'France' ORDER BY "id" ASC OFFSET 4 LIMIT 10"#,
            ]
        );
        assert!(state.statements.iter().all(|v| v.params.is_empty()));
    }

    #[tokio::test]
    async fn without_columns() {
        init_logs();
        let pool = MockPool::new();
        let mut client = client(&pool).await;
        silent_logs! {
            let error = cities()
                .search(
                    &mut client,
                    "ber",
                    SearchOptions {
                        columns_for_search: Some(Vec::new()),
                        ..Default::default()
                    },
                )
                .await
                .expect_err("Searching words without columns is rejected");
            assert!(matches!(
                error.downcast_ref::<DataError>(),
                Some(DataError::InvalidArguments(..))
            ));
        }
        assert!(pool.shared.lock().statements.is_empty());
    }

    #[tokio::test]
    async fn multi_pass() {
        let pool = MockPool::new();
        let mut client = client(&pool).await;
        pool.shared.respond([city(1, "Berlin"), city(2, "Bern")]);
        pool.shared
            .respond([city(1, "Berlin"), city(2, "Bern"), city(3, "Oberbergen")]);
        let found = cities()
            .with_strategy(SearchStrategy::MultiPass { fuzzy: None })
            .search(
                &mut client,
                "ber",
                SearchOptions {
                    columns_for_search: Some(columns(["name"])),
                    ..Default::default()
                },
            )
            .await
            .expect("Failed to search");
        assert_eq!(names(&found), ["Berlin", "Bern", "Oberbergen"]);
        assert_eq!(
            pool.shared.sql(),
            [
                r#"SELECT * FROM public.cities WHERE (name ILIKE $1 || '%') ORDER BY "id" ASC LIMIT 10"#,
                r#"SELECT * FROM public.cities WHERE (name ILIKE '%' || $1 || '%') ORDER BY "id" ASC LIMIT 10"#,
            ]
        );
    }

    #[tokio::test]
    async fn multi_pass_paging() {
        let pool = MockPool::new();
        let mut client = client(&pool).await;
        pool.shared.respond([city(1, "Berlin"), city(2, "Bern")]);
        let found = cities()
            .with_strategy(SearchStrategy::MultiPass {
                fuzzy: Some(FuzzyRanking::default()),
            })
            .search(
                &mut client,
                "ber",
                SearchOptions {
                    columns_for_search: Some(columns(["name"])),
                    offset: Some(1),
                    limit: Some(1),
                    ..Default::default()
                },
            )
            .await
            .expect("Failed to search");
        assert_eq!(names(&found), ["Bern"]);
        // The first pass already filled offset + limit rows
        assert_eq!(
            pool.shared.sql(),
            [r#"SELECT * FROM public.cities WHERE (name ILIKE $1 || '%') ORDER BY "id" ASC LIMIT 2"#]
        );
    }

    #[tokio::test]
    async fn multi_pass_large_window() {
        let pool = MockPool::new();
        let mut client = client(&pool).await;
        let repository = cities().with_strategy(SearchStrategy::MultiPass { fuzzy: None });
        pool.shared.respond([city(1, "Berlin"), city(2, "Bern")]);
        pool.shared.respond([city(3, "Oberbergen")]);
        let found = repository
            .search(
                &mut client,
                "ber",
                SearchOptions {
                    columns_for_search: Some(columns(["name"])),
                    limit: Some(1 << 40),
                    ..Default::default()
                },
            )
            .await
            .expect("Failed to search");
        assert_eq!(names(&found), ["Berlin", "Bern", "Oberbergen"]);

        pool.shared.respond([city(1, "Berlin"), city(2, "Bern")]);
        pool.shared.respond([]);
        let found = repository
            .search(
                &mut client,
                "ber",
                SearchOptions {
                    columns_for_search: Some(columns(["name"])),
                    offset: Some(1),
                    limit: Some(u64::MAX),
                    ..Default::default()
                },
            )
            .await
            .expect("Failed to search");
        assert_eq!(names(&found), ["Bern"]);
        let sql = pool.shared.sql();
        assert_eq!(sql.len(), 4);
        assert!(sql[0].ends_with(" LIMIT 1099511627776"));
        assert!(sql[2].ends_with(&format!(" LIMIT {}", u64::MAX)));
    }

    #[tokio::test]
    async fn multi_pass_fuzzy() {
        let pool = MockPool::new();
        let mut client = client(&pool).await;
        pool.shared.respond([]);
        pool.shared.respond([city(5, "Bergamo")]);
        pool.shared
            .respond([city(5, "Bergamo"), city(4, "Paris"), city(1, "Berlin")]);
        let found = cities()
            .with_strategy(SearchStrategy::MultiPass {
                fuzzy: Some(FuzzyRanking {
                    function: "similarity_distance".into(),
                }),
            })
            .search(
                &mut client,
                "pariss",
                SearchOptions {
                    filter: Some(Where::new().ne("country", "Italy")),
                    limit: Some(2),
                    ..Default::default()
                },
            )
            .await
            .expect("Failed to search");
        assert_eq!(names(&found), ["Bergamo", "Paris"]);
        let state = pool.shared.lock();
        assert_eq!(state.statements.len(), 3);
        assert_eq!(
            state.statements[2].sql,
            indoc! {r#"
                SELECT * FROM public.cities WHERE country != 'Italy' ORDER BY similarity_distance(LOWER(name::text), LOWER($1)) ASC, similarity_distance(LOWER(country::text), LOWER($1)) ASC, "id" ASC LIMIT 2
            "#}
            .trim()
        );
        assert!(
            state
                .statements
                .iter()
                .all(|v| v.params == [Value::Varchar(Some("pariss".into()))])
        );
    }
}
