// src/store/user_repository.rs

use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::{
    models::{
        friendship::{Friendship, FriendshipState},
        user::{User, UserSummary},
    },
    store::{StoreError, is_unique_violation},
    utils::hash::hash_password,
};

/// Columns selected for a full `User` row.
const USER_COLUMNS: &str =
    "id, email, name, surname, age, sex, interests, city, encrypted_password";

/// Data access for users and their friendships.
///
/// Built once at startup and shared through the application state.
/// Cloning is cheap; all clones use the same pool.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Starts a transaction that takes the write lock up front (`BEGIN IMMEDIATE`).
    ///
    /// Concurrent writers queue on the busy timeout and see each other's rows.
    async fn write_transaction(&self) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
        self.pool.begin_with("BEGIN IMMEDIATE").await
    }

    /// Inserts a new user and stores the generated id in `user.id`.
    ///
    /// The password is hashed when present and then cleared from `user`.
    pub async fn create_user(&self, user: &mut User) -> Result<i64, StoreError> {
        if user.email.trim().is_empty() {
            return Err(StoreError::Validation("email is required".to_string()));
        }

        if !user.password.is_empty() {
            user.encrypted_password = hash_password(&user.password)?;
        }
        user.sanitize();

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (email, name, surname, age, sex, interests, city, encrypted_password)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.surname)
        .bind(user.age)
        .bind(&user.sex)
        .bind(&user.interests)
        .bind(&user.city)
        .bind(&user.encrypted_password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::DuplicateEmail(user.email.clone())
            } else {
                tracing::error!("Failed to create user: {:?}", e);
                StoreError::from(e)
            }
        })?;

        user.id = id;
        tracing::debug!(user_id = id, "user created");

        Ok(id)
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<User, StoreError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");

        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    pub async fn find_user_by_id(&self, id: i64) -> Result<User, StoreError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    /// Overwrites the profile fields of an existing user.
    ///
    /// Email is never changed here. The stored hash is replaced only when
    /// `user.password` is non-empty.
    pub async fn update_user(&self, user: &mut User) -> Result<(), StoreError> {
        let new_hash = if user.password.is_empty() {
            None
        } else {
            Some(hash_password(&user.password)?)
        };
        user.sanitize();

        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = $1,
                surname = $2,
                age = $3,
                sex = $4,
                interests = $5,
                city = $6,
                encrypted_password = COALESCE($7, encrypted_password)
            WHERE id = $8
            "#,
        )
        .bind(&user.name)
        .bind(&user.surname)
        .bind(user.age)
        .bind(&user.sex)
        .bind(&user.interests)
        .bind(&user.city)
        .bind(&new_hash)
        .bind(user.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        if let Some(hash) = new_hash {
            user.encrypted_password = hash;
        }

        Ok(())
    }

    /// Users ordered by name. Rows sharing a name come back in storage order.
    pub async fn list_top_users(&self, limit: i64) -> Result<Vec<UserSummary>, StoreError> {
        let users = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT id, name, surname, age, sex, interests, city
            FROM users
            ORDER BY name
            LIMIT $1
            "#,
        )
        .bind(limit.max(0))
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Accepted friends of `user_id`.
    pub async fn list_friends(&self, user_id: i64) -> Result<Vec<UserSummary>, StoreError> {
        let users = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.name, u.surname, u.age, u.sex, u.interests, u.city
            FROM users u
            JOIN friends f ON f.friend_id = u.id
            WHERE f.user_id = $1 AND f.is_accepted = TRUE
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Counterparts of `user_id` in unconfirmed pairs.
    ///
    /// Rows are symmetric, so this covers requests sent by `user_id` too.
    pub async fn list_pending_requests(
        &self,
        user_id: i64,
    ) -> Result<Vec<UserSummary>, StoreError> {
        let users = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.name, u.surname, u.age, u.sex, u.interests, u.city
            FROM users u
            JOIN friends f ON f.user_id = u.id
            WHERE f.friend_id = $1 AND f.is_accepted = FALSE
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Creates a pending friendship between `from_id` and `to_id`.
    ///
    /// Both directed rows are written in one transaction: either the pair
    /// exists afterwards or nothing was written.
    pub async fn send_friend_request(&self, from_id: i64, to_id: i64) -> Result<(), StoreError> {
        if from_id == to_id {
            return Err(StoreError::Validation(
                "cannot send a friend request to yourself".to_string(),
            ));
        }

        let mut tx = self.write_transaction().await?;

        let target = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE id = $1")
            .bind(to_id)
            .fetch_optional(&mut *tx)
            .await?;
        if target.is_none() {
            return Err(StoreError::NotFound);
        }

        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT 1 FROM friends WHERE user_id = $1 AND friend_id = $2",
        )
        .bind(from_id)
        .bind(to_id)
        .fetch_optional(&mut *tx)
        .await?;
        if existing.is_some() {
            return Err(StoreError::AlreadyRequested);
        }

        for (user_id, friend_id) in [(from_id, to_id), (to_id, from_id)] {
            sqlx::query(
                "INSERT INTO friends (user_id, friend_id, is_accepted) VALUES ($1, $2, FALSE)",
            )
            .bind(user_id)
            .bind(friend_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    // The pair was written outside this transaction; it is rolled back on drop.
                    StoreError::AlreadyRequested
                } else {
                    tracing::error!("Failed to insert friend request: {:?}", e);
                    StoreError::from(e)
                }
            })?;
        }

        tx.commit().await?;
        tracing::info!(from_id, to_id, "friend request sent");

        Ok(())
    }

    /// Marks both rows of the pair as accepted.
    ///
    /// Accepting an already accepted pair succeeds without changes.
    /// Fails with `NotFound` when the two users have no edge at all.
    pub async fn accept_friend_request(&self, from_id: i64, to_id: i64) -> Result<(), StoreError> {
        let mut tx = self.write_transaction().await?;

        let rows = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM friends
            WHERE (user_id = $1 AND friend_id = $2)
               OR (user_id = $2 AND friend_id = $1)
            "#,
        )
        .bind(from_id)
        .bind(to_id)
        .fetch_one(&mut *tx)
        .await?;

        if rows == 0 {
            return Err(StoreError::NotFound);
        }

        sqlx::query(
            r#"
            UPDATE friends
            SET is_accepted = TRUE
            WHERE (user_id = $1 AND friend_id = $2)
               OR (user_id = $2 AND friend_id = $1)
            "#,
        )
        .bind(from_id)
        .bind(to_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!(from_id, to_id, "friend request accepted");

        Ok(())
    }

    /// Current state of the pair `{a, b}`.
    pub async fn friendship_state(&self, a: i64, b: i64) -> Result<FriendshipState, StoreError> {
        let rows = sqlx::query_as::<_, Friendship>(
            r#"
            SELECT user_id, friend_id, is_accepted
            FROM friends
            WHERE (user_id = $1 AND friend_id = $2)
               OR (user_id = $2 AND friend_id = $1)
            "#,
        )
        .bind(a)
        .bind(b)
        .fetch_all(&self.pool)
        .await?;

        Ok(FriendshipState::from_rows(&rows))
    }
}
