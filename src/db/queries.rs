/// SQL query functions for database operations
///
/// Every write runs in its own transaction and commits immediately.
/// A failed write is rolled back before the error is returned.

use crate::db::models::*;
use crate::db::Database;
use crate::error::Result;
use sqlx::{Row, Sqlite, SqliteConnection, Transaction};
use tracing::{debug, warn};

impl Database {
    /// Insert a user and its posts in one transaction
    ///
    /// # Returns
    /// * `Ok((user_id, post_ids))` - Generated ids, post ids in input order
    /// * `Err(NotesError::ConstraintViolation)` - A unique field clashed; nothing was written
    pub async fn insert_user(
        &self,
        fields: &UserFields,
        posts: &[PostInput],
    ) -> Result<(i64, Vec<i64>)> {
        let mut tx = self.pool().begin().await?;

        match insert_user_rows(&mut *tx, fields, posts).await {
            Ok(ids) => {
                tx.commit().await?;
                debug!(user_id = ids.0, posts = ids.1.len(), "inserted user");
                Ok(ids)
            }
            Err(e) => {
                rollback(tx).await;
                Err(e)
            }
        }
    }

    /// Insert a single post for an existing user
    pub async fn insert_post(&self, user_id: i64, post: &PostInput) -> Result<i64> {
        let mut tx = self.pool().begin().await?;

        match insert_post_row(&mut *tx, user_id, post).await {
            Ok(id) => {
                tx.commit().await?;
                debug!(post_id = id, user_id, "inserted post");
                Ok(id)
            }
            Err(e) => {
                rollback(tx).await;
                Err(e)
            }
        }
    }

    /// Get user by ID
    pub async fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        let user = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        Ok(user)
    }

    /// Get all users, oldest first
    pub async fn get_all_users(&self) -> Result<Vec<UserRow>> {
        let users = sqlx::query_as::<_, UserRow>("SELECT * FROM users ORDER BY id")
            .fetch_all(self.pool())
            .await?;

        Ok(users)
    }

    /// Overwrite every column of a user
    ///
    /// # Returns
    /// * `Ok(true)` - Row updated
    /// * `Ok(false)` - No user with this id
    pub async fn update_user(&self, id: i64, fields: &UserFields) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET nameOfStudent = ?, nameOfClass = ?, nameOfHomework = ?, dateDue = ?
            WHERE id = ?
            "#,
        )
        .bind(&fields.name_of_student)
        .bind(&fields.name_of_class)
        .bind(&fields.name_of_homework)
        .bind(&fields.date_due)
        .bind(id)
        .execute(self.pool())
        .await?;

        debug!(user_id = id, "updated user");
        Ok(result.rows_affected() > 0)
    }

    /// Delete a user; its posts go with it through the foreign key cascade
    pub async fn delete_user(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;

        debug!(user_id = id, "deleted user");
        Ok(result.rows_affected() > 0)
    }

    /// Get post by ID
    pub async fn get_post_by_id(&self, id: i64) -> Result<Option<PostRow>> {
        let post = sqlx::query_as::<_, PostRow>("SELECT * FROM posts WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        Ok(post)
    }

    /// Get the posts owned by a user, in insertion order
    pub async fn get_posts_for_user(&self, user_id: i64) -> Result<Vec<PostRow>> {
        let posts =
            sqlx::query_as::<_, PostRow>("SELECT * FROM posts WHERE userID = ? ORDER BY id")
                .bind(user_id)
                .fetch_all(self.pool())
                .await?;

        Ok(posts)
    }

    /// Count users
    pub async fn count_users(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool())
            .await?;

        Ok(count.0)
    }
}

// The write error is what the caller needs; a failed rollback is only logged
async fn rollback(tx: Transaction<'_, Sqlite>) {
    if let Err(err) = tx.rollback().await {
        warn!(error = %err, "rollback failed");
    }
}

async fn insert_user_rows(
    conn: &mut SqliteConnection,
    fields: &UserFields,
    posts: &[PostInput],
) -> Result<(i64, Vec<i64>)> {
    let row = sqlx::query(
        r#"
        INSERT INTO users (nameOfStudent, nameOfClass, nameOfHomework, dateDue)
        VALUES (?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(&fields.name_of_student)
    .bind(&fields.name_of_class)
    .bind(&fields.name_of_homework)
    .bind(&fields.date_due)
    .fetch_one(&mut *conn)
    .await?;

    let user_id: i64 = row.get(0);

    let mut post_ids = Vec::with_capacity(posts.len());
    for post in posts {
        post_ids.push(insert_post_row(conn, user_id, post).await?);
    }

    Ok((user_id, post_ids))
}

async fn insert_post_row(conn: &mut SqliteConnection, user_id: i64, post: &PostInput) -> Result<i64> {
    let row = sqlx::query("INSERT INTO posts (note, image, userID) VALUES (?, ?, ?) RETURNING id")
        .bind(&post.note)
        .bind(&post.image)
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?;

    Ok(row.get(0))
}
