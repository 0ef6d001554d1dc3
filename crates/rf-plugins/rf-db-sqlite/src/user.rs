use async_trait::async_trait;
use rf_core::error::{AppError, Result};
use rf_core::models::{Id, User};
use rf_core::traits::UserRepo;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::{storage, SqliteStore};

const SELECT_USER: &str = "SELECT id, username, email, password_hash FROM users";

/// The plaintext column does not exist; loaded users always carry an empty
/// password buffer.
fn user_from_row(row: &SqliteRow) -> std::result::Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password: Vec::new(),
        password_hash: Some(row.try_get("password_hash")?),
    })
}

#[async_trait]
impl UserRepo for SqliteStore {
    async fn save(&self, user: &User) -> Result<Id> {
        let hash = match user.password_hash.as_deref() {
            Some(h) if !h.is_empty() => h,
            _ => return Err(AppError::PreconditionFailed("Password must be hashed.".into())),
        };

        let result = sqlx::query("INSERT INTO users (username, email, password_hash) VALUES (?, ?, ?)")
            .bind(&user.username)
            .bind(&user.email)
            .bind(hash)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                let duplicate = e
                    .as_database_error()
                    .is_some_and(|db| db.is_unique_violation());
                if duplicate {
                    AppError::ValidationFailed(vec!["Username is already taken.".into()])
                } else {
                    storage(e)
                }
            })?;

        Ok(result.last_insert_rowid())
    }

    async fn find_one_by_username(&self, username: &str) -> Result<User> {
        let sql = format!("{SELECT_USER} WHERE username = ?");
        let row = sqlx::query(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?
            .ok_or_else(|| AppError::not_found("user", format!("username {username}")))?;

        user_from_row(&row).map_err(storage)
    }

    async fn find_one_by_id(&self, id: Id) -> Result<User> {
        let sql = format!("{SELECT_USER} WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?
            .ok_or_else(|| AppError::not_found("user", format!("id {id}")))?;

        user_from_row(&row).map_err(storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::seeded_store;

    async fn user_count(store: &SqliteStore) -> i64 {
        let (n,): (i64,) = sqlx::query_as("SELECT count(*) FROM users")
            .fetch_one(store.pool())
            .await
            .unwrap();
        n
    }

    #[tokio::test]
    async fn find_by_username_and_id_agree() {
        let store = seeded_store().await;

        let by_name = store.find_one_by_username("tester").await.unwrap();
        let by_id = store.find_one_by_id(2).await.unwrap();

        assert_eq!(by_name, by_id);
        assert_eq!(by_name.email, "test@test.com");
        assert_eq!(by_name.password_hash.as_deref(), Some("$stub$tester"));
        assert!(by_name.password.is_empty());
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let store = seeded_store().await;
        assert!(store.find_one_by_username("nobody").await.unwrap_err().is_not_found());
        assert!(store.find_one_by_id(42).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn save_without_hash_fails_before_writing() {
        let store = seeded_store().await;
        let user = User {
            username: "plain".into(),
            password: b"not hashed".to_vec(),
            ..User::new()
        };

        let err = UserRepo::save(&store, &user).await.unwrap_err();
        assert!(matches!(err, AppError::PreconditionFailed(_)));
        assert_eq!(user_count(&store).await, 2);
    }

    #[tokio::test]
    async fn save_never_writes_plaintext() {
        let store = seeded_store().await;
        let user = User {
            username: "newbie".into(),
            email: "new@test.com".into(),
            password: b"leftover".to_vec(),
            password_hash: Some("$stub$newbie".into()),
            ..User::new()
        };

        let id = UserRepo::save(&store, &user).await.unwrap();
        assert_eq!(id, 3);

        let stored = store.find_one_by_id(3).await.unwrap();
        assert_eq!(stored.username, "newbie");
        assert_eq!(stored.password_hash.as_deref(), Some("$stub$newbie"));
        assert!(stored.password.is_empty());

        let (hash,): (String,) = sqlx::query_as("SELECT password_hash FROM users WHERE id = 3")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert!(!hash.contains("leftover"));
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected_by_the_table() {
        let store = seeded_store().await;
        let user = User {
            username: "test".into(),
            password_hash: Some("$stub$again".into()),
            ..User::new()
        };

        let err = UserRepo::save(&store, &user).await.unwrap_err();
        assert_eq!(
            err,
            AppError::ValidationFailed(vec!["Username is already taken.".into()])
        );
        assert_eq!(user_count(&store).await, 2);
    }
}
