//! Reply repository for database operations.

use sqlx::SqlitePool;

use cafe_and_wifi_core::{CafeId, CommentId, ReplyId, UserId};

use super::RepositoryError;
use crate::models::avatar::gravatar_url;
use crate::models::comment::Reply;

#[derive(sqlx::FromRow)]
struct ReplyRow {
    id: i64,
    comment_id: i64,
    author_id: i64,
    author_name: String,
    author_email: String,
    text: String,
    date: String,
}

impl From<ReplyRow> for Reply {
    fn from(row: ReplyRow) -> Self {
        Self {
            id: ReplyId::new(row.id),
            comment_id: CommentId::new(row.comment_id),
            author_id: UserId::new(row.author_id),
            author_name: row.author_name,
            author_avatar: gravatar_url(&row.author_email),
            text: row.text,
            date: row.date,
        }
    }
}

/// Repository for reply database operations.
pub struct ReplyRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ReplyRepository<'a> {
    /// Create a new reply repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Add a reply to a comment.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails, including when
    /// the comment or author does not exist.
    pub async fn create(
        &self,
        comment_id: CommentId,
        author_id: UserId,
        text: &str,
        date: &str,
    ) -> Result<ReplyId, RepositoryError> {
        let id: i64 = sqlx::query_scalar(
            r"
            INSERT INTO replies (text, author_id, comment_id, date)
            VALUES (?, ?, ?, ?)
            RETURNING id
            ",
        )
        .bind(text)
        .bind(author_id.as_i64())
        .bind(comment_id.as_i64())
        .bind(date)
        .fetch_one(self.pool)
        .await?;

        Ok(ReplyId::new(id))
    }

    /// List every reply under a café's comments, in posting order.
    ///
    /// Callers group the result by `comment_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_cafe(&self, cafe_id: CafeId) -> Result<Vec<Reply>, RepositoryError> {
        let rows: Vec<ReplyRow> = sqlx::query_as(
            r"
            SELECT r.id, r.comment_id, r.author_id, u.name AS author_name,
                   u.email AS author_email, r.text, r.date
            FROM replies r
            JOIN comments c ON c.id = r.comment_id
            JOIN users u ON u.id = r.author_id
            WHERE c.cafe_id = ?
            ORDER BY r.id
            ",
        )
        .bind(cafe_id.as_i64())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Reply::from).collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::cafes::tests::{new_cafe, seed_user};
    use crate::db::{CafeRepository, CommentRepository, create_memory_pool};
    use cafe_and_wifi_core::Location;

    #[tokio::test]
    async fn test_list_for_cafe_only_returns_that_cafes_replies() {
        let pool = create_memory_pool().await.unwrap();
        let owner = seed_user(&pool).await;
        let cafes = CafeRepository::new(&pool);
        let here = cafes
            .create(&new_cafe("Here", Location::Kowloon, owner))
            .await
            .unwrap();
        let there = cafes
            .create(&new_cafe("There", Location::Kowloon, owner))
            .await
            .unwrap();

        let comments = CommentRepository::new(&pool);
        let on_here = comments
            .create(here.id, owner, "c1", "01-02-2024")
            .await
            .unwrap();
        let on_there = comments
            .create(there.id, owner, "c2", "01-02-2024")
            .await
            .unwrap();

        let repo = ReplyRepository::new(&pool);
        repo.create(on_here, owner, "r1", "02-02-2024")
            .await
            .unwrap();
        repo.create(on_there, owner, "r2", "02-02-2024")
            .await
            .unwrap();
        repo.create(on_here, owner, "r3", "03-02-2024")
            .await
            .unwrap();

        let replies = repo.list_for_cafe(here.id).await.unwrap();
        let texts: Vec<&str> = replies.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["r1", "r3"]);
        assert!(replies.iter().all(|r| r.comment_id == on_here));
        assert_eq!(replies[0].author_name, "Owner");
        assert_eq!(replies[0].author_avatar, gravatar_url("owner@x.com"));
    }

    #[tokio::test]
    async fn test_reply_requires_existing_comment() {
        let pool = create_memory_pool().await.unwrap();
        let owner = seed_user(&pool).await;

        let err = ReplyRepository::new(&pool)
            .create(CommentId::new(404), owner, "lost", "01-02-2024")
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Database(_)));
    }
}
