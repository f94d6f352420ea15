//! # User Repository
//!
//! SQLite implementation of [`UserStore`].
//!
//! The owned role-assignment id list is stored as a JSON array in a text
//! column; the address is flattened into `address_*` columns.
//!
//! ## Example
//!
//! ```rust,no_run
//! # use lib_core::model::store::{create_memory_pool, models::User, UserRepository, UserStore};
//! # async fn example() -> anyhow::Result<()> {
//! let repo = UserRepository::new(create_memory_pool().await?);
//!
//! let user = User::new("alice@example.com", "hash".into(), "hash".into(), vec![]);
//! repo.create_user(&user).await?;
//!
//! let found = repo.get_user_by_email("alice@example.com").await?;
//! assert!(found.is_some());
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

use super::models::{Address, Gender, Profile, User};
use super::{DbPool, StoreError, StoreResult, UserStore};

const SELECT_USER: &str = "SELECT id, email, password_hash, password_confirm_hash, verified, verify_code, \
     role_assignment_ids, finished_registration, iin, name, surname, birthday, gender, \
     address_country, address_city, address_street, address_house_number, created_at, updated_at \
     FROM users";

/// User repository backed by a SQLite pool.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: DbPool,
}

impl UserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} WHERE email = ?"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.map(User::try_from).transpose()
    }

    async fn get_user_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(User::try_from).transpose()
    }

    async fn create_user(&self, user: &User) -> StoreResult<()> {
        let ids = serde_json::to_string(&user.role_assignment_ids)?;
        let address = user.profile.address.as_ref();

        sqlx::query(
            r#"
            INSERT INTO users (
                id, email, password_hash, password_confirm_hash, verified, verify_code,
                role_assignment_ids, finished_registration, iin, name, surname, birthday, gender,
                address_country, address_city, address_street, address_house_number,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.password_confirm_hash)
        .bind(user.verified)
        .bind(&user.verify_code)
        .bind(ids)
        .bind(user.finished_registration)
        .bind(&user.profile.iin)
        .bind(&user.profile.name)
        .bind(&user.profile.surname)
        .bind(user.profile.birthday)
        .bind(user.profile.gender.map(|g| u8::from(g) as i64))
        .bind(address.map(|a| a.country.clone()))
        .bind(address.map(|a| a.city.clone()))
        .bind(address.and_then(|a| a.street.clone()))
        .bind(address.and_then(|a| a.house_number.clone()))
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_user(&self, user: &User) -> StoreResult<()> {
        let ids = serde_json::to_string(&user.role_assignment_ids)?;
        let address = user.profile.address.as_ref();

        let result = sqlx::query(
            r#"
            UPDATE users SET
                email = ?, password_hash = ?, password_confirm_hash = ?, verified = ?,
                verify_code = ?, role_assignment_ids = ?, finished_registration = ?,
                iin = ?, name = ?, surname = ?, birthday = ?, gender = ?,
                address_country = ?, address_city = ?, address_street = ?, address_house_number = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.password_confirm_hash)
        .bind(user.verified)
        .bind(&user.verify_code)
        .bind(ids)
        .bind(user.finished_registration)
        .bind(&user.profile.iin)
        .bind(&user.profile.name)
        .bind(&user.profile.surname)
        .bind(user.profile.birthday)
        .bind(user.profile.gender.map(|g| u8::from(g) as i64))
        .bind(address.map(|a| a.country.clone()))
        .bind(address.map(|a| a.city.clone()))
        .bind(address.and_then(|a| a.street.clone()))
        .bind(address.and_then(|a| a.house_number.clone()))
        .bind(user.updated_at)
        .bind(&user.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("user {}", user.id)));
        }

        Ok(())
    }

    async fn delete_user(&self, id: &str) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("user {id}")));
        }

        Ok(())
    }
}

// region: --- Row mapping

#[derive(FromRow)]
struct UserRow {
    id: String,
    email: String,
    password_hash: String,
    password_confirm_hash: String,
    verified: bool,
    verify_code: Option<String>,
    role_assignment_ids: String,
    finished_registration: bool,
    iin: Option<String>,
    name: Option<String>,
    surname: Option<String>,
    birthday: Option<NaiveDate>,
    gender: Option<i64>,
    address_country: Option<String>,
    address_city: Option<String>,
    address_street: Option<String>,
    address_house_number: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role_assignment_ids: Vec<String> = serde_json::from_str(&row.role_assignment_ids)?;

        let gender = row
            .gender
            .map(|g| {
                u8::try_from(g)
                    .map_err(|e| e.to_string())
                    .and_then(Gender::try_from)
                    .map_err(StoreError::Database)
            })
            .transpose()?;

        let address = match (row.address_country, row.address_city) {
            (Some(country), Some(city)) => Some(Address {
                country,
                city,
                street: row.address_street,
                house_number: row.address_house_number,
            }),
            _ => None,
        };

        Ok(User {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            password_confirm_hash: row.password_confirm_hash,
            verified: row.verified,
            verify_code: row.verify_code,
            role_assignment_ids,
            finished_registration: row.finished_registration,
            profile: Profile {
                iin: row.iin,
                name: row.name,
                surname: row.surname,
                birthday: row.birthday,
                gender,
                address,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// endregion: --- Row mapping
