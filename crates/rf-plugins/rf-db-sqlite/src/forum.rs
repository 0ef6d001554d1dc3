use async_trait::async_trait;
use rf_core::error::{AppError, Result};
use rf_core::models::{Forum, Id};
use rf_core::traits::ForumRepo;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::{storage, SqliteStore};

/// Counts come from LEFT JOINs so a forum without topics still yields a row
/// with zeros. Topics are counted distinct because the post join repeats them.
const SELECT_FORUM: &str = "
    SELECT f.id, f.title, f.description,
           COUNT(DISTINCT t.id) AS topic_count,
           COUNT(p.id)          AS post_count
      FROM forums f
 LEFT JOIN topics t ON t.forum_id = f.id
 LEFT JOIN posts  p ON p.topic_id = t.id";

fn forum_from_row(row: &SqliteRow) -> std::result::Result<Forum, sqlx::Error> {
    Ok(Forum {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        topic_count: row.try_get("topic_count")?,
        post_count: row.try_get("post_count")?,
    })
}

#[async_trait]
impl ForumRepo for SqliteStore {
    async fn find_all(&self) -> Result<Vec<Forum>> {
        let sql = format!("{SELECT_FORUM} GROUP BY f.id ORDER BY f.id ASC");
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?;

        rows.iter()
            .map(forum_from_row)
            .collect::<std::result::Result<_, _>>()
            .map_err(storage)
    }

    async fn find_one(&self, id: Id) -> Result<Forum> {
        let sql = format!("{SELECT_FORUM} WHERE f.id = ? GROUP BY f.id");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?
            .ok_or_else(|| AppError::not_found("forum", format!("id {id}")))?;

        forum_from_row(&row).map_err(storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::seeded_store;

    #[tokio::test]
    async fn find_one_counts_topics_and_posts() {
        let store = seeded_store().await;

        let forum = ForumRepo::find_one(&store, 1).await.unwrap();
        assert_eq!(
            forum,
            Forum {
                id: 1,
                title: "test".into(),
                description: "tester forum".into(),
                topic_count: 3,
                post_count: 12,
            }
        );

        let forum = ForumRepo::find_one(&store, 2).await.unwrap();
        assert_eq!(forum.description, "eine Prüfung");
        assert_eq!((forum.topic_count, forum.post_count), (2, 3));
    }

    #[tokio::test]
    async fn empty_forum_reports_zero_counts() {
        let store = seeded_store().await;
        let forum = ForumRepo::find_one(&store, 3).await.unwrap();
        assert_eq!((forum.topic_count, forum.post_count), (0, 0));
    }

    #[tokio::test]
    async fn missing_forum_is_not_found() {
        let store = seeded_store().await;
        let err = ForumRepo::find_one(&store, 99).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn find_all_is_ordered_with_counts() {
        let store = seeded_store().await;
        let forums = store.find_all().await.unwrap();

        let summary: Vec<(Id, i64, i64)> = forums
            .iter()
            .map(|f| (f.id, f.topic_count, f.post_count))
            .collect();
        assert_eq!(summary, vec![(1, 3, 12), (2, 2, 3), (3, 0, 0)]);
    }

    #[tokio::test]
    async fn storage_failure_is_not_a_not_found() {
        let store = seeded_store().await;
        store.close().await;
        let err = ForumRepo::find_one(&store, 1).await.unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
    }
}
