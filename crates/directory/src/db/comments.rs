//! Comment repository for database operations.

use sqlx::SqlitePool;

use cafe_and_wifi_core::{CafeId, CommentId, UserId};

use super::RepositoryError;
use crate::models::avatar::gravatar_url;
use crate::models::comment::Comment;

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: i64,
    cafe_id: i64,
    author_id: i64,
    author_name: String,
    author_email: String,
    text: String,
    date: String,
    likes: i64,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Self {
            id: CommentId::new(row.id),
            cafe_id: CafeId::new(row.cafe_id),
            author_id: UserId::new(row.author_id),
            author_name: row.author_name,
            author_avatar: gravatar_url(&row.author_email),
            text: row.text,
            date: row.date,
            likes: row.likes,
        }
    }
}

/// Repository for comment database operations.
pub struct CommentRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CommentRepository<'a> {
    /// Create a new comment repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Add a comment to a café.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails, including when
    /// the café or author does not exist.
    pub async fn create(
        &self,
        cafe_id: CafeId,
        author_id: UserId,
        text: &str,
        date: &str,
    ) -> Result<CommentId, RepositoryError> {
        let id: i64 = sqlx::query_scalar(
            r"
            INSERT INTO comments (text, author_id, cafe_id, date)
            VALUES (?, ?, ?, ?)
            RETURNING id
            ",
        )
        .bind(text)
        .bind(author_id.as_i64())
        .bind(cafe_id.as_i64())
        .bind(date)
        .fetch_one(self.pool)
        .await?;

        Ok(CommentId::new(id))
    }

    /// Get a comment by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: CommentId) -> Result<Option<Comment>, RepositoryError> {
        let row: Option<CommentRow> = sqlx::query_as(
            r"
            SELECT c.id, c.cafe_id, c.author_id, u.name AS author_name,
                   u.email AS author_email, c.text, c.date, c.likes
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.id = ?
            ",
        )
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Comment::from))
    }

    /// List a café's comments in posting order, with author names.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_cafe(&self, cafe_id: CafeId) -> Result<Vec<Comment>, RepositoryError> {
        let rows: Vec<CommentRow> = sqlx::query_as(
            r"
            SELECT c.id, c.cafe_id, c.author_id, u.name AS author_name,
                   u.email AS author_email, c.text, c.date, c.likes
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.cafe_id = ?
            ORDER BY c.id
            ",
        )
        .bind(cafe_id.as_i64())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Comment::from).collect())
    }

    /// Add one like to a comment.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the comment does not exist.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn increment_likes(&self, id: CommentId) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE comments SET likes = likes + 1 WHERE id = ?")
            .bind(id.as_i64())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
