use sqlx::PgPool;
use tracing::{debug, warn};

use crate::auth::password::{hash_password, verify_password};
use crate::clause::{build_update_clause, translations, FieldMap, FieldTranslations};
use crate::database::manager::DatabaseError;
use crate::database::models::user::UserCredentials;
use crate::database::models::{NewUser, User, UserDetail};
use crate::database::params::{bind_param_query_as, SqlParam};

const USER_COLUMNS: &str = "username, first_name, last_name, email, is_admin";

pub struct UserRepository<'a> {
    pool: &'a PgPool,
    bcrypt_cost: u32,
}

impl<'a> UserRepository<'a> {
    pub fn new(pool: &'a PgPool, bcrypt_cost: u32) -> Self {
        Self { pool, bcrypt_cost }
    }

    pub fn update_translations() -> FieldTranslations {
        translations([("firstName", "first_name"), ("lastName", "last_name"), ("isAdmin", "is_admin")])
    }

    /// Check a username/password pair.
    ///
    /// An unknown user and a wrong password fail the same way.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, DatabaseError> {
        let sql = format!("SELECT password, {} FROM users WHERE username = $1", USER_COLUMNS);
        let row = sqlx::query_as::<_, UserCredentials>(&sql)
            .bind(username)
            .fetch_optional(self.pool)
            .await?;

        if let Some(row) = row {
            if verify_password(password, &row.password).await? {
                return Ok(row.into());
            }
        }

        warn!("Failed login for {}", username);
        Err(DatabaseError::Unauthorized("Invalid username/password".to_string()))
    }

    pub async fn register(&self, data: &NewUser) -> Result<User, DatabaseError> {
        let duplicate: Option<(String,)> = sqlx::query_as("SELECT username FROM users WHERE username = $1")
            .bind(&data.username)
            .fetch_optional(self.pool)
            .await?;

        if duplicate.is_some() {
            return Err(DatabaseError::Conflict(format!("Duplicate username: {}", data.username)));
        }

        let hashed = hash_password(&data.password, self.bcrypt_cost).await?;

        let sql = format!(
            "INSERT INTO users (username, password, first_name, last_name, email, is_admin)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(&data.username)
            .bind(&hashed)
            .bind(&data.first_name)
            .bind(&data.last_name)
            .bind(&data.email)
            .bind(data.is_admin)
            .fetch_one(self.pool)
            .await?;

        debug!("Registered user {}", user.username);
        Ok(user)
    }

    pub async fn find_all(&self) -> Result<Vec<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users ORDER BY username", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql).fetch_all(self.pool).await?)
    }

    /// A user with the ids of the jobs they applied to.
    pub async fn get(&self, username: &str) -> Result<UserDetail, DatabaseError> {
        let user = self.find(username).await?;

        let applications: Vec<i32> =
            sqlx::query_scalar("SELECT job_id FROM applications WHERE username = $1 ORDER BY job_id")
                .bind(username)
                .fetch_all(self.pool)
                .await?;

        Ok(UserDetail { user, applications })
    }

    pub async fn find(&self, username: &str) -> Result<User, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("No user: {}", username)))
    }

    /// Partial update. A new password is hashed before it is stored.
    pub async fn update(&self, username: &str, data: &FieldMap<SqlParam>) -> Result<User, DatabaseError> {
        let data = self.with_hashed_password(data).await?;
        let clause = build_update_clause(Some(&data), Some(&Self::update_translations()))?;

        let sql = format!(
            "UPDATE users SET {} WHERE username = ${} RETURNING {}",
            clause.to_sql(),
            clause.next_param_index(),
            USER_COLUMNS
        );
        let mut q = sqlx::query_as::<_, User>(&sql);
        for p in clause.values.iter() {
            q = bind_param_query_as(q, p);
        }

        q.bind(username)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("No user: {}", username)))
    }

    pub async fn remove(&self, username: &str) -> Result<(), DatabaseError> {
        let deleted: Option<(String,)> = sqlx::query_as("DELETE FROM users WHERE username = $1 RETURNING username")
            .bind(username)
            .fetch_optional(self.pool)
            .await?;

        deleted
            .map(|_| ())
            .ok_or_else(|| DatabaseError::NotFound(format!("No user: {}", username)))
    }

    /// Record that `username` applied to `job_id`. Applying twice is a conflict.
    pub async fn apply_to_job(&self, username: &str, job_id: i32) -> Result<(), DatabaseError> {
        let job: Option<(i32,)> = sqlx::query_as("SELECT id FROM jobs WHERE id = $1")
            .bind(job_id)
            .fetch_optional(self.pool)
            .await?;
        if job.is_none() {
            return Err(DatabaseError::NotFound(format!("No job: {}", job_id)));
        }

        self.find(username).await?;

        sqlx::query("INSERT INTO applications (job_id, username) VALUES ($1, $2)")
            .bind(job_id)
            .bind(username)
            .execute(self.pool)
            .await?;

        debug!("{} applied to job {}", username, job_id);
        Ok(())
    }

    async fn with_hashed_password(&self, data: &FieldMap<SqlParam>) -> Result<FieldMap<SqlParam>, DatabaseError> {
        let mut data = data.clone();
        if let Some(SqlParam::Text(Some(plain))) = data.get("password") {
            let hashed = hash_password(plain, self.bcrypt_cost).await?;
            data.insert("password".to_string(), SqlParam::text(hashed));
        }
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::DatabaseManager;
    use crate::config::AppConfig;

    #[test]
    fn update_translations_cover_camel_case_fields() {
        let mut data = FieldMap::new();
        data.insert("firstName".to_string(), SqlParam::text("Bilbo"));
        data.insert("email".to_string(), SqlParam::text("b@shire.me"));
        data.insert("isAdmin".to_string(), SqlParam::Bool(Some(true)));

        let clause = build_update_clause(Some(&data), Some(&UserRepository::update_translations())).unwrap();

        assert_eq!(clause.to_sql(), r#""first_name"=$1, "email"=$2, "is_admin"=$3"#);
    }

    #[tokio::test]
    async fn password_is_hashed_in_a_copy() {
        let pool = DatabaseManager::connect_lazy(&AppConfig::from_env()).unwrap();
        let repo = UserRepository::new(&pool, 4);

        let mut data = FieldMap::new();
        data.insert("password".to_string(), SqlParam::text("new-password"));
        data.insert("lastName".to_string(), SqlParam::text("Baggins"));

        let hashed = repo.with_hashed_password(&data).await.unwrap();

        assert_eq!(data["password"], SqlParam::text("new-password"));
        assert_ne!(hashed["password"], data["password"]);
        assert_eq!(hashed.get_index(1), data.get_index(1));
        let SqlParam::Text(Some(stored)) = &hashed["password"] else {
            panic!("password should stay text");
        };
        assert!(crate::auth::password::verify_password("new-password", stored).await.unwrap());
    }
}
