use async_trait::async_trait;
use rf_core::error::{AppError, Result};
use rf_core::models::{Id, Post, PostAuthor};
use rf_core::traits::PostRepo;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::{storage, SqliteStore};

/// Only the author's username is pulled in; the rest of the profile stays
/// in the users table.
const SELECT_POST: &str = "
    SELECT p.id, p.text, p.published, p.topic_id, p.user_id,
           u.username
      FROM posts p
      JOIN users u ON u.id = p.user_id";

fn post_from_row(row: &SqliteRow) -> std::result::Result<Post, sqlx::Error> {
    let user_id: Id = row.try_get("user_id")?;
    Ok(Post {
        id: row.try_get("id")?,
        text: row.try_get("text")?,
        published: row.try_get("published")?,
        topic_id: row.try_get("topic_id")?,
        user_id,
        author: Some(PostAuthor {
            id: user_id,
            username: row.try_get("username")?,
        }),
    })
}

#[async_trait]
impl PostRepo for SqliteStore {
    async fn save(&self, post: &Post) -> Result<Id> {
        let result =
            sqlx::query("INSERT INTO posts (text, published, topic_id, user_id) VALUES (?, ?, ?, ?)")
                .bind(&post.text)
                .bind(post.published)
                .bind(post.topic_id)
                .bind(post.user_id)
                .execute(&self.pool)
                .await
                .map_err(storage)?;

        Ok(result.last_insert_rowid())
    }

    async fn find_one(&self, id: Id) -> Result<Post> {
        let sql = format!("{SELECT_POST} WHERE p.id = ?");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?
            .ok_or_else(|| AppError::not_found("post", format!("id {id}")))?;

        post_from_row(&row).map_err(storage)
    }

    async fn find_page(&self, topic_id: Id, limit: i64, offset: i64) -> Result<Vec<Post>> {
        let sql = format!(
            "{SELECT_POST} WHERE p.topic_id = ? ORDER BY p.published ASC, p.id ASC LIMIT ? OFFSET ?"
        );
        let rows = sqlx::query(&sql)
            .bind(topic_id)
            .bind(limit)
            .bind(offset.max(0))
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?;

        rows.iter()
            .map(post_from_row)
            .collect::<std::result::Result<_, _>>()
            .map_err(storage)
    }

    async fn delete(&self, id: Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage)?;

        Ok(result.rows_affected() > 0)
    }
}
