//! Loan listing queries against a real database
//!
//! Need `DATABASE_URL` pointing at a scratch PostgreSQL database.

use std::sync::Arc;

use chrono::{Duration, Local};
use sqlx::postgres::PgPoolOptions;

use locallibrary_server::{
    models::{
        book::CreateBook, book_instance::CreateBookInstance, BookInstance, LoanStatus, User,
    },
    repository::Repository,
    services::loans::LoansService,
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

async fn create_user(repository: &Repository, prefix: &str) -> User {
    let username = format!("{}{}", prefix, uuid::Uuid::new_v4().simple());
    repository
        .users
        .create(&username, "not-a-real-hash", "", "", false)
        .await
        .expect("Failed to create user")
}

/// 28 copies on loan, alternating between two borrowers, plus copies of
/// other statuses held by the first borrower
async fn seed(repository: &Repository) -> (User, User) {
    let first = create_user(repository, "testuser1_").await;
    let second = create_user(repository, "testuser2_").await;

    let book = repository
        .books
        .create(&CreateBook {
            title: "Book Title".to_string(),
            summary: "My book summary".to_string(),
            isbn: "ABCDEFG".to_string(),
            author_id: None,
            language_id: None,
            genre_ids: Vec::new(),
        })
        .await
        .expect("Failed to create book");

    let today = Local::now().date_naive();
    for i in 0..28i64 {
        let borrower = if i % 2 == 0 { &first } else { &second };
        repository
            .instances
            .create(
                book.id,
                &CreateBookInstance {
                    // descending so that insertion order differs from due order
                    due_back: Some(today + Duration::days(40 - i)),
                    status: LoanStatus::OnLoan,
                    borrower_id: Some(borrower.id),
                },
            )
            .await
            .expect("Failed to create book instance");
    }

    for status in [LoanStatus::Maintenance, LoanStatus::Available, LoanStatus::Reserved] {
        repository
            .instances
            .create(
                book.id,
                &CreateBookInstance {
                    due_back: Some(today),
                    status,
                    borrower_id: Some(first.id),
                },
            )
            .await
            .expect("Failed to create book instance");
    }

    (first, second)
}

fn assert_due_order(items: &[BookInstance]) {
    for pair in items.windows(2) {
        match (pair[0].due_back, pair[1].due_back) {
            (Some(a), Some(b)) => assert!(a <= b, "{} listed before {}", a, b),
            (None, Some(_)) => panic!("copy without due date listed first"),
            _ => {}
        }
    }
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_my_borrowed_pages_of_five_five_four() {
    let repository = repository().await;
    let (first, _) = seed(&repository).await;
    let loans = LoansService::new(Arc::new(repository.instances.clone()));

    let mut sizes = Vec::new();
    let mut all = Vec::new();
    for page in 1..=3 {
        let result = loans
            .borrowed_by(first.id, Some(page))
            .await
            .expect("Failed to list loans");
        assert_eq!(result.total, 14);
        assert_eq!(result.num_pages(), 3);
        sizes.push(result.items.len());
        all.extend(result.items);
    }
    assert_eq!(sizes, vec![5, 5, 4]);

    assert!(all.iter().all(|i| i.borrower_id == Some(first.id)));
    assert!(all.iter().all(|i| i.status == LoanStatus::OnLoan));
    assert_due_order(&all);

    assert!(loans.borrowed_by(first.id, Some(4)).await.is_err());
}

#[tokio::test]
#[ignore]
async fn test_all_borrowed_carries_borrower_and_due_order() {
    let repository = repository().await;
    let (first, second) = seed(&repository).await;
    let loans = LoansService::new(Arc::new(repository.instances.clone()));

    let page = loans.all_borrowed(None).await.expect("Failed to list loans");
    assert!(page.total >= 28);
    assert_eq!(page.items.len(), 5);
    assert!(page.items.iter().all(|i| i.status == LoanStatus::OnLoan));
    assert!(page.items.iter().all(|i| i.borrower_username.is_some()));
    assert_due_order(&page.items);

    // the second borrower only ever held loans
    let second_loans = loans
        .borrowed_by(second.id, None)
        .await
        .expect("Failed to list loans");
    assert_eq!(second_loans.total, 14);
    assert!(second_loans
        .items
        .iter()
        .all(|i| i.borrower_username.as_deref() == Some(second.username.as_str())));
    assert_ne!(first.id, second.id);
}
