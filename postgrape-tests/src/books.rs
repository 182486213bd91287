use postgrape::{
    Coordinator, CreateOptions, Entity, Fields, FindByIdOptions, FindOneOptions, FindOptions,
    Order, Pool, Repository, RowLabeled, UpdateByIdOptions, UpdateOptions, Value, Where, columns,
};
use std::sync::LazyLock;
use time::{Date, Month};
use tokio::sync::Mutex;

#[derive(Entity, Debug, Clone, PartialEq)]
struct Book {
    id: Option<i64>,
    title: String,
    author: Option<String>,
    #[postgrape(name = "year")]
    published: i32,
    price: Option<f64>,
    released: Option<Date>,
}

static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub async fn books<P: Pool>(coordinator: &Coordinator<P>) {
    let _lock = MUTEX.lock().await;

    // Setup
    crate::setup(
        coordinator,
        &[
            "DROP TABLE IF EXISTS public.books",
            "CREATE TABLE public.books (
                id BIGSERIAL PRIMARY KEY,
                title TEXT NOT NULL,
                author TEXT,
                year INTEGER NOT NULL,
                price DOUBLE PRECISION,
                released DATE
            )",
        ],
    )
    .await;
    let books = Repository::<Book>::new("books", &coordinator.repository_config());

    // Create
    let hobbit = Book {
        id: None,
        title: "The Hobbit".into(),
        author: Some("Tolkien".into()),
        published: 1937,
        price: Some(9.5),
        released: Some(Date::from_calendar_date(1937, Month::September, 21).unwrap()),
    };
    let hobbit = coordinator
        .transaction(None, async |client| {
            books.create(client, &hobbit, Default::default()).await
        })
        .await
        .expect("Failed to create the first book");
    let hobbit_id = hobbit.id.expect("The created book has no id");
    assert_eq!(hobbit.title, "The Hobbit");
    assert_eq!(hobbit.author.as_deref(), Some("Tolkien"));
    assert_eq!(hobbit.published, 1937);
    assert_eq!(hobbit.price, Some(9.5));
    assert_eq!(
        hobbit.released,
        Some(Date::from_calendar_date(1937, Month::September, 21).unwrap())
    );

    let mut client = coordinator
        .acquire()
        .await
        .expect("Could not acquire a client");
    for (title, author, published) in [
        ("Dune", Some("Herbert"), 1965),
        ("Neuromancer", Some("Gibson"), 1984),
        ("Beowulf", None, 1000),
        ("Silmarillion", Some("Tolkien"), 1977),
    ] {
        books
            .create(
                &mut client,
                &Book {
                    id: None,
                    title: title.into(),
                    author: author.map(Into::into),
                    published,
                    price: None,
                    released: None,
                },
                Default::default(),
            )
            .await
            .expect("Failed to create a book");
    }

    // Returning a subset
    let summary = Repository::<RowLabeled>::new("books", &coordinator.repository_config());
    let created = summary
        .create(
            &mut client,
            &Fields::new().set("title", "Ulysses").set("year", 1922),
            CreateOptions {
                returning: Some(columns(["id", "title"])),
            },
        )
        .await
        .expect("Failed to create the book returning a subset");
    assert_eq!(created.names(), ["id", "title"]);
    assert_eq!(
        created.get_column("title"),
        Some(&Value::Varchar(Some("Ulysses".into())))
    );

    // Find
    let all = books
        .find(&mut client, FindOptions::default())
        .await
        .expect("Failed to find every book");
    assert_eq!(all.len(), 6);
    assert_eq!(all[0].id, Some(hobbit_id));
    assert!(all.windows(2).all(|w| w[0].id < w[1].id));

    let recent = books
        .find(
            &mut client,
            FindOptions {
                filter: Some(Where::new().gt("year", 1950)),
                order: Some(vec![("year".into(), Order::Desc)]),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to find the recent books");
    assert_eq!(
        recent.iter().map(|v| v.title.as_str()).collect::<Vec<_>>(),
        ["Neuromancer", "Silmarillion", "Dune"]
    );

    let paged = books
        .find(
            &mut client,
            FindOptions {
                order: Some(vec![("year".into(), Order::Asc)]),
                offset: Some(1),
                limit: Some(2),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to find a page of books");
    assert_eq!(
        paged.iter().map(|v| v.published).collect::<Vec<_>>(),
        [1922, 1937]
    );

    let anonymous_or_herbert = books
        .find(
            &mut client,
            FindOptions {
                filter: Some(
                    Where::new().any_of("author", [Value::Null, Value::from("Herbert")]),
                ),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to find the books by author");
    assert_eq!(
        anonymous_or_herbert
            .iter()
            .map(|v| v.title.as_str())
            .collect::<Vec<_>>(),
        ["Dune", "Beowulf", "Ulysses"]
    );

    let grouped = books
        .find(
            &mut client,
            FindOptions {
                filter: Some(Where::new().eq("author", "Tolkien").or([
                    Where::new().lt("year", 1940),
                    Where::new().gt("year", 1970),
                ])),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to find the books with a grouped filter");
    assert_eq!(
        grouped.iter().map(|v| v.title.as_str()).collect::<Vec<_>>(),
        ["The Hobbit", "Silmarillion"]
    );

    // Find one
    let oldest = books
        .find_one(
            &mut client,
            FindOneOptions {
                order: Some(vec![("year".into(), Order::Asc)]),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to find the oldest book")
        .expect("There is no oldest book");
    assert_eq!(oldest.title, "Beowulf");
    assert_eq!(oldest.author, None);

    let missing = books
        .find_one(
            &mut client,
            FindOneOptions {
                filter: Some(Where::new().eq("title", "Missing")),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to look for a missing book");
    assert!(missing.is_none());

    // Find by id
    let found = books
        .find_by_id(&mut client, hobbit_id, FindByIdOptions::default())
        .await
        .expect("Failed to find the book by id")
        .expect("The book is missing");
    assert_eq!(found, hobbit);
    let partial = summary
        .find_by_id(
            &mut client,
            hobbit_id,
            FindByIdOptions {
                select: Some(columns(["title"])),
            },
        )
        .await
        .expect("Failed to find the partial book by id")
        .expect("The partial book is missing");
    assert_eq!(partial.names(), ["title"]);
    assert!(
        books
            .find_by_id(&mut client, -1, Default::default())
            .await
            .expect("Failed to look for a missing id")
            .is_none()
    );

    // Update
    let updated = books
        .update(
            &mut client,
            UpdateOptions {
                filter: Some(Where::new().eq("author", "Tolkien")),
                ..Default::default()
            },
            &Fields::new().set("price", 20.0),
        )
        .await
        .expect("Failed to update the books by author");
    assert_eq!(updated.len(), 2);
    assert!(updated.iter().all(|v| v.price == Some(20.0)));

    let unchanged = books
        .update(
            &mut client,
            UpdateOptions {
                filter: Some(Where::new().eq("author", "Nobody")),
                ..Default::default()
            },
            &Fields::new().set("price", 1.0),
        )
        .await
        .expect("Failed to run an update matching nothing");
    assert!(unchanged.is_empty());

    // Update by id
    let dune = all
        .iter()
        .find(|v| v.title == "Dune")
        .and_then(|v| v.id)
        .expect("Dune is missing");
    let dune = books
        .update_by_id(
            &mut client,
            dune,
            &Fields::new()
                .set("price", 12.5)
                .set("released", Date::from_calendar_date(1965, Month::August, 1).unwrap()),
            UpdateByIdOptions::default(),
        )
        .await
        .expect("Failed to update the book by id")
        .expect("The updated book is missing");
    assert_eq!(dune.title, "Dune");
    assert_eq!(dune.price, Some(12.5));
    assert_eq!(
        dune.released,
        Some(Date::from_calendar_date(1965, Month::August, 1).unwrap())
    );
    let returned = summary
        .update_by_id(
            &mut client,
            hobbit_id,
            &Fields::new().set("author", Value::Varchar(None)),
            UpdateByIdOptions {
                returning: Some(columns(["author"])),
            },
        )
        .await
        .expect("Failed to update the book returning a subset")
        .expect("The updated book is missing");
    assert_eq!(returned.names(), ["author"]);
    assert_eq!(returned.get_column("author"), Some(&Value::Varchar(None)));
    assert!(
        books
            .update_by_id(&mut client, -1, &Fields::new().set("price", 1.0), Default::default())
            .await
            .expect("Failed to update a missing id")
            .is_none()
    );

    client.release(false);
}
