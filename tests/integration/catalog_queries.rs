//! Catalog queries against a real database
//!
//! Need `DATABASE_URL` pointing at a scratch PostgreSQL database.

use sqlx::postgres::PgPoolOptions;

use locallibrary_server::{
    models::{
        book::{display_genre, CreateBook},
        genre::CreateGenre,
    },
    repository::Repository,
};

async fn repository() -> Repository {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("Failed to connect to database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    Repository::new(pool)
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_display_genre_takes_first_three_created() {
    let repository = repository().await;
    let suffix = uuid::Uuid::new_v4().simple().to_string();

    // created out of alphabetical order
    let mut genre_ids = Vec::new();
    for name in ["Zombie", "Western", "Poetry", "Fantasy"] {
        let genre = repository
            .genres
            .create(&CreateGenre {
                name: format!("{} {}", name, suffix),
            })
            .await
            .expect("Failed to create genre");
        genre_ids.push(genre.id);
    }

    let book = repository
        .books
        .create(&CreateBook {
            title: "Book Title".to_string(),
            summary: "My book summary".to_string(),
            isbn: "ABCDEFG".to_string(),
            author_id: None,
            language_id: None,
            genre_ids: genre_ids.iter().rev().copied().collect(),
        })
        .await
        .expect("Failed to create book");

    let genres = repository
        .books
        .genres(book.id)
        .await
        .expect("Failed to list genres");
    assert_eq!(genres.iter().map(|g| g.id).collect::<Vec<_>>(), genre_ids);
    assert_eq!(
        display_genre(&genres),
        format!("Zombie {0}, Western {0}, Poetry {0}", suffix)
    );
}
