use async_trait::async_trait;
use rf_core::error::{AppError, Result};
use rf_core::models::{Id, Topic, TopicDetail, TopicSummary};
use rf_core::traits::{ForumRepo, TopicRepo};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::{storage, SqliteStore};

const SELECT_TOPIC: &str = "
    SELECT t.id, t.title, t.description, t.forum_id,
           COUNT(p.id) AS post_count
      FROM topics t
 LEFT JOIN posts p ON p.topic_id = t.id";

fn topic_from_row(row: &SqliteRow) -> std::result::Result<TopicSummary, sqlx::Error> {
    Ok(TopicSummary {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        forum_id: row.try_get("forum_id")?,
        post_count: row.try_get("post_count")?,
    })
}

#[async_trait]
impl TopicRepo for SqliteStore {
    async fn save(&self, topic: &Topic) -> Result<Id> {
        let result = sqlx::query("INSERT INTO topics (title, description, forum_id) VALUES (?, ?, ?)")
            .bind(topic.title.trim())
            .bind(topic.description.trim())
            .bind(topic.forum_id)
            .execute(&self.pool)
            .await
            .map_err(storage)?;

        Ok(result.last_insert_rowid())
    }

    /// Resolves the owning forum with a second lookup; a dangling forum id
    /// surfaces as the forum's `NotFound`.
    async fn find_one(&self, id: Id) -> Result<TopicDetail> {
        let sql = format!("{SELECT_TOPIC} WHERE t.id = ? GROUP BY t.id");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?
            .ok_or_else(|| AppError::not_found("topic", format!("id {id}")))?;

        let topic = topic_from_row(&row).map_err(storage)?;
        let forum = ForumRepo::find_one(self, topic.forum_id).await?;

        Ok(TopicDetail { topic, forum })
    }

    async fn find_page(&self, forum_id: Id, limit: i64, offset: i64) -> Result<Vec<TopicSummary>> {
        let sql = format!(
            "{SELECT_TOPIC} WHERE t.forum_id = ? GROUP BY t.id ORDER BY t.id ASC LIMIT ? OFFSET ?"
        );
        let rows = sqlx::query(&sql)
            .bind(forum_id)
            .bind(limit)
            .bind(offset.max(0))
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?;

        rows.iter()
            .map(topic_from_row)
            .collect::<std::result::Result<_, _>>()
            .map_err(storage)
    }
}
