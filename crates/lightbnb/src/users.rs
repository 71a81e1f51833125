//! User lookups and registration.

use crate::client::GenericClient;
use crate::error::DbResult;
use crate::models::{NewUser, User};
use crate::sql::query;

const SELECT_BY_EMAIL: &str = "SELECT * FROM users WHERE email = $1";
const SELECT_BY_ID: &str = "SELECT * FROM users WHERE id = $1";
const INSERT: &str = "INSERT INTO users (name, email, password) VALUES ($1, $2, $3) RETURNING *";

/// Find a user by email. `Ok(None)` when no user has that address.
pub async fn get_user_with_email(
    conn: &impl GenericClient,
    email: &str,
) -> DbResult<Option<User>> {
    query(SELECT_BY_EMAIL).bind(email).fetch_opt_as(conn).await
}

/// Find a user by id. `Ok(None)` when the id is unknown.
pub async fn get_user_with_id(conn: &impl GenericClient, id: i32) -> DbResult<Option<User>> {
    query(SELECT_BY_ID).bind(id).fetch_opt_as(conn).await
}

/// Insert a user and return the stored row.
///
/// A duplicate email surfaces as [`DbError::UniqueViolation`](crate::DbError::UniqueViolation).
pub async fn add_user(conn: &impl GenericClient, user: &NewUser) -> DbResult<User> {
    query(INSERT)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .fetch_one_as(conn)
        .await
}
