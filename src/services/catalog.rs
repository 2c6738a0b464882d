//! Catalog management service

use chrono::NaiveDate;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        author::{AuthorDetails, CreateAuthor, UpdateAuthor},
        book::{display_genre, display_title, BookAuthor, BookDetails, BookQuery, CreateBook, UpdateBook},
        book_instance::{CreateBookInstance, UpdateBookInstance},
        genre::CreateGenre,
        language::CreateLanguage,
        Author, Book, BookInstance, BookInstanceDetails, BookShort, Genre, Language, Page,
        Pagination,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    // =========================================================================
    // GENRES & LANGUAGES
    // =========================================================================

    pub async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        self.repository.genres.list().await
    }

    pub async fn create_genre(&self, data: CreateGenre) -> AppResult<Genre> {
        data.validate()?;
        let genre = self.repository.genres.create(&data).await?;
        tracing::info!("Genre {} created: {}", genre.id, genre.name);
        Ok(genre)
    }

    pub async fn list_languages(&self) -> AppResult<Vec<Language>> {
        self.repository.languages.list().await
    }

    pub async fn create_language(&self, data: CreateLanguage) -> AppResult<Language> {
        data.validate()?;
        let language = self.repository.languages.create(&data).await?;
        tracing::info!("Language {} created: {}", language.iso_code, language.language);
        Ok(language)
    }

    // =========================================================================
    // AUTHORS
    // =========================================================================

    pub async fn list_authors(&self, page: Option<i64>) -> AppResult<Page<Author>> {
        let pagination = Pagination::requested(page)?;

        let (items, total) = self
            .repository
            .authors
            .list(pagination.per_page, pagination.offset())
            .await?;
        pagination.check(total)?;

        Ok(Page {
            items,
            total,
            pagination,
        })
    }

    /// Author with their books
    pub async fn get_author(&self, id: i32) -> AppResult<AuthorDetails> {
        let author = self.repository.authors.get_by_id(id).await?;
        let books = self.repository.authors.books(id).await?;

        Ok(AuthorDetails {
            display_name: author.display_name(),
            author,
            books,
        })
    }

    pub async fn create_author(&self, data: CreateAuthor) -> AppResult<Author> {
        data.validate()?;
        let author = self.repository.authors.create(&data).await?;
        tracing::info!("Author {} created: {}", author.id, author.display_name());
        Ok(author)
    }

    pub async fn update_author(&self, id: i32, data: UpdateAuthor) -> AppResult<Author> {
        data.validate()?;
        let author = self.repository.authors.update(id, &data).await?;
        tracing::info!("Author {} updated", id);
        Ok(author)
    }

    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        self.repository.authors.delete(id).await?;
        tracing::info!("Author {} deleted", id);
        Ok(())
    }

    // =========================================================================
    // BOOKS
    // =========================================================================

    pub async fn list_books(&self, query: &BookQuery) -> AppResult<Page<BookShort>> {
        let pagination = Pagination::requested(query.page)?;

        let (items, total) = self
            .repository
            .books
            .list(query.title.as_deref(), pagination.per_page, pagination.offset())
            .await?;
        pagination.check(total)?;

        Ok(Page {
            items,
            total,
            pagination,
        })
    }

    /// Book with author, language, genres and copies resolved
    pub async fn get_book(&self, id: i32, today: NaiveDate) -> AppResult<BookDetails> {
        let book = self.repository.books.get_by_id(id).await?;

        let author = match book.author_id {
            Some(author_id) => {
                let author = self.repository.authors.get_by_id(author_id).await?;
                Some(BookAuthor {
                    id: author.id,
                    name: author.display_name(),
                })
            }
            None => None,
        };

        let language = match book.language_id {
            Some(language_id) => self.repository.languages.find_by_id(language_id).await?,
            None => None,
        };

        let genres = self.repository.books.genres(id).await?;
        let instances = self
            .repository
            .instances
            .list_for_book(id)
            .await?
            .into_iter()
            .map(|i| BookInstanceDetails::new(i, today))
            .collect();

        Ok(BookDetails {
            display: display_title(&book.title, language.as_ref().map(|l| l.iso_code.as_str())),
            display_genre: display_genre(&genres),
            book,
            author,
            language,
            genres,
            instances,
        })
    }

    pub async fn create_book(&self, data: CreateBook) -> AppResult<Book> {
        data.validate()?;
        let book = self.repository.books.create(&data).await?;
        tracing::info!("Book {} created: {}", book.id, book.title);
        Ok(book)
    }

    pub async fn update_book(&self, id: i32, data: UpdateBook) -> AppResult<Book> {
        data.validate()?;
        let book = self.repository.books.update(id, &data).await?;
        tracing::info!("Book {} updated", id);
        Ok(book)
    }

    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await?;
        tracing::info!("Book {} deleted", id);
        Ok(())
    }

    // =========================================================================
    // BOOK INSTANCES
    // =========================================================================

    pub async fn get_instance(&self, id: Uuid) -> AppResult<BookInstance> {
        self.repository.instances.get_by_id(id).await
    }

    pub async fn create_instance(&self, book_id: i32, data: CreateBookInstance) -> AppResult<BookInstance> {
        // 404 rather than a foreign key error for an unknown book
        self.repository.books.get_by_id(book_id).await?;
        let instance = self.repository.instances.create(book_id, &data).await?;
        tracing::info!("Book instance {} created for book {}", instance.id, book_id);
        Ok(instance)
    }

    pub async fn update_instance(&self, id: Uuid, data: UpdateBookInstance) -> AppResult<BookInstance> {
        let instance = self.repository.instances.update(id, &data).await?;
        tracing::info!("Book instance {} updated (status: {})", id, instance.status);
        Ok(instance)
    }

    pub async fn delete_instance(&self, id: Uuid) -> AppResult<()> {
        self.repository.instances.delete(id).await?;
        tracing::info!("Book instance {} deleted", id);
        Ok(())
    }
}
