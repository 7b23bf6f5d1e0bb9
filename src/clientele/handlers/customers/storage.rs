//! SQL storage for customer records.
//!
//! Every operation is a single statement. Uniqueness and not-found outcomes
//! are decided by the database itself (unique constraint, affected rows)
//! rather than by a separate read, so concurrent requests cannot interleave
//! between check and act.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use sqlx::{postgres::PgRow, PgPool, Row};
use tracing::error;

use super::types::{Customer, CustomerDraft};

/// Customers returned per page when the client does not pick a limit.
pub const DEFAULT_LIMIT: i64 = 10;

#[derive(Debug)]
pub enum CustomerError {
    DuplicateEmail,
    NotFound,
    Database(sqlx::Error),
}

impl IntoResponse for CustomerError {
    /// Maps storage-layer failures into stable HTTP responses for handlers.
    /// Database errors are logged server-side and surfaced as `500` without
    /// leaking details.
    fn into_response(self) -> axum::response::Response {
        match self {
            Self::DuplicateEmail => (
                StatusCode::BAD_REQUEST,
                Json(json!({"detail": "Email already registered"})),
            )
                .into_response(),
            Self::NotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({"detail": "Customer not found"})),
            )
                .into_response(),
            Self::Database(err) => {
                error!("Database error: {err}");

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"message": "Internal Server Error"})),
                )
                    .into_response()
            }
        }
    }
}

/// Creates the customers table when it does not exist yet.
///
/// # Errors
///
/// Returns the database error when the statement fails.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS customers (
            id           BIGSERIAL PRIMARY KEY,
            first_name   TEXT NOT NULL,
            middle_name  TEXT,
            last_name    TEXT NOT NULL,
            prefix       TEXT,
            suffix       TEXT,
            email        TEXT NOT NULL UNIQUE,
            phone_number TEXT NOT NULL
        )
        ",
    )
    .execute(pool)
    .await?;

    Ok(())
}

fn customer_from_row(row: &PgRow) -> Customer {
    Customer {
        id: row.get("id"),
        first_name: row.get("first_name"),
        middle_name: row.get("middle_name"),
        last_name: row.get("last_name"),
        prefix: row.get("prefix"),
        suffix: row.get("suffix"),
        email: row.get("email"),
        phone_number: row.get("phone_number"),
    }
}

/// Inserts a new customer and returns the persisted record with its
/// system-assigned id.
///
/// The email unique constraint is the real duplicate check; a violation maps
/// to `DuplicateEmail` with no write taking effect.
pub async fn insert_customer(
    pool: &PgPool,
    draft: &CustomerDraft,
) -> Result<Customer, CustomerError> {
    let insert = sqlx::query(
        r"
        INSERT INTO customers (first_name, middle_name, last_name, prefix, suffix, email, phone_number)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, first_name, middle_name, last_name, prefix, suffix, email, phone_number
        ",
    )
    .bind(&draft.first_name)
    .bind(&draft.middle_name)
    .bind(&draft.last_name)
    .bind(&draft.prefix)
    .bind(&draft.suffix)
    .bind(&draft.email)
    .bind(&draft.phone_number)
    .fetch_one(pool)
    .await;

    match insert {
        Ok(row) => Ok(customer_from_row(&row)),
        Err(err) if is_unique_violation(&err) => Err(CustomerError::DuplicateEmail),
        Err(err) => Err(CustomerError::Database(err)),
    }
}

/// Fetches a customer by id, `None` when absent.
///
/// # Errors
///
/// Returns the database error when the query fails.
pub async fn fetch_customer(pool: &PgPool, id: i64) -> Result<Option<Customer>, sqlx::Error> {
    let row = sqlx::query(
        r"
        SELECT id, first_name, middle_name, last_name, prefix, suffix, email, phone_number
        FROM customers
        WHERE id = $1
        ",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(customer_from_row))
}

/// Exact-match lookup on the unique email index, `None` when absent.
///
/// # Errors
///
/// Returns the database error when the query fails.
pub async fn fetch_customer_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<Customer>, sqlx::Error> {
    let row = sqlx::query(
        r"
        SELECT id, first_name, middle_name, last_name, prefix, suffix, email, phone_number
        FROM customers
        WHERE email = $1
        ",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(customer_from_row))
}

/// Returns one page of customers in stable id order. Each call recomputes the
/// page.
///
/// Unspecified input gets a defined policy instead of a database error: a
/// negative `skip` reads as 0 and a non-positive `limit` falls back to
/// [`DEFAULT_LIMIT`].
///
/// # Errors
///
/// Returns the database error when the query fails.
pub async fn fetch_customers(
    pool: &PgPool,
    skip: i64,
    limit: i64,
) -> Result<Vec<Customer>, sqlx::Error> {
    let skip = skip.max(0);
    let limit = if limit <= 0 { DEFAULT_LIMIT } else { limit };

    let rows = sqlx::query(
        r"
        SELECT id, first_name, middle_name, last_name, prefix, suffix, email, phone_number
        FROM customers
        ORDER BY id
        LIMIT $1 OFFSET $2
        ",
    )
    .bind(limit)
    .bind(skip)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(customer_from_row).collect())
}

/// Replaces every mutable field of the customer in one atomic statement and
/// returns the refreshed record.
///
/// Zero affected rows means the id does not exist. The row being updated
/// never conflicts with its own email, so re-submitting the current address
/// succeeds; taking another record's email maps to `DuplicateEmail`.
pub async fn update_customer(
    pool: &PgPool,
    id: i64,
    draft: &CustomerDraft,
) -> Result<Customer, CustomerError> {
    let update = sqlx::query(
        r"
        UPDATE customers
        SET first_name = $2,
            middle_name = $3,
            last_name = $4,
            prefix = $5,
            suffix = $6,
            email = $7,
            phone_number = $8
        WHERE id = $1
        RETURNING id, first_name, middle_name, last_name, prefix, suffix, email, phone_number
        ",
    )
    .bind(id)
    .bind(&draft.first_name)
    .bind(&draft.middle_name)
    .bind(&draft.last_name)
    .bind(&draft.prefix)
    .bind(&draft.suffix)
    .bind(&draft.email)
    .bind(&draft.phone_number)
    .fetch_optional(pool)
    .await;

    match update {
        Ok(Some(row)) => Ok(customer_from_row(&row)),
        Ok(None) => Err(CustomerError::NotFound),
        Err(err) if is_unique_violation(&err) => Err(CustomerError::DuplicateEmail),
        Err(err) => Err(CustomerError::Database(err)),
    }
}

/// Physically removes the customer and returns the snapshot as it existed
/// immediately before deletion. Zero affected rows means the id does not
/// exist, so a repeated delete reports not-found rather than failing.
pub async fn delete_customer(pool: &PgPool, id: i64) -> Result<Customer, CustomerError> {
    let delete = sqlx::query(
        r"
        DELETE FROM customers
        WHERE id = $1
        RETURNING id, first_name, middle_name, last_name, prefix, suffix, email, phone_number
        ",
    )
    .bind(id)
    .fetch_optional(pool)
    .await;

    match delete {
        Ok(Some(row)) => Ok(customer_from_row(&row)),
        Ok(None) => Err(CustomerError::NotFound),
        Err(err) => Err(CustomerError::Database(err)),
    }
}

/// Returns `true` when `err` is a database unique-violation (SQLSTATE `23505`).
/// This is what turns concurrent duplicate-email writes into a stable `400`.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23505"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_are_not_unique_violations() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
        assert!(!is_unique_violation(&sqlx::Error::PoolClosed));
    }

    #[test]
    fn error_statuses() {
        assert_eq!(
            CustomerError::DuplicateEmail.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            CustomerError::NotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            CustomerError::Database(sqlx::Error::PoolClosed)
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
