//! Customer CRUD handlers.
//!
//! Handlers validate the request shape, delegate to [`storage`], and map the
//! outcome onto HTTP statuses. Uniqueness and existence are settled by the
//! storage statements themselves.

pub mod storage;
pub mod types;

#[cfg(test)]
mod tests;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use sqlx::PgPool;
use tracing::{info, warn};

use self::storage::CustomerError;
use self::types::{Customer, CustomerDraft, Page};

fn validation_failure(fields: &[&'static str]) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({"detail": fields})),
    )
        .into_response()
}

#[utoipa::path(
    post,
    path = "/v1/customers/",
    request_body = CustomerDraft,
    responses(
        (status = 200, description = "Customer created.", body = Customer),
        (status = 400, description = "Email already registered."),
        (status = 401, description = "Missing or invalid credentials."),
        (status = 422, description = "Invalid input."),
    ),
    tag = "customers"
)]
/// Creates a new customer and returns the persisted record with its assigned
/// identifier. A duplicate email is rejected with no write taking effect.
pub async fn create_customer(
    pool: Extension<PgPool>,
    Json(draft): Json<CustomerDraft>,
) -> impl IntoResponse {
    info!("Creating customer with email: {}", draft.email);

    let invalid = draft.invalid_fields();
    if !invalid.is_empty() {
        warn!("Rejected customer payload, invalid fields: {invalid:?}");
        return validation_failure(&invalid);
    }

    match storage::insert_customer(&pool, &draft).await {
        Ok(customer) => {
            info!("Customer created: {}", customer.email);
            (StatusCode::OK, Json(customer)).into_response()
        }
        Err(CustomerError::DuplicateEmail) => {
            warn!("Email already registered: {}", draft.email);
            CustomerError::DuplicateEmail.into_response()
        }
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/v1/customers/",
    params(Page),
    responses(
        (status = 200, description = "One page of customers.", body = [Customer]),
        (status = 401, description = "Missing or invalid credentials."),
    ),
    tag = "customers"
)]
/// Lists one page of customers in stable id order.
pub async fn list_customers(pool: Extension<PgPool>, Query(page): Query<Page>) -> impl IntoResponse {
    let skip = page.skip.unwrap_or(0);
    let limit = page.limit.unwrap_or(storage::DEFAULT_LIMIT);

    info!("Retrieving customers with skip={skip} and limit={limit}");

    match storage::fetch_customers(&pool, skip, limit).await {
        Ok(customers) => {
            info!("Retrieved {} customers", customers.len());
            (StatusCode::OK, Json(customers)).into_response()
        }
        Err(err) => CustomerError::Database(err).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/v1/customers/{id}",
    params(("id" = i64, Path, description = "Customer identifier")),
    responses(
        (status = 200, description = "Customer detail.", body = Customer),
        (status = 401, description = "Missing or invalid credentials."),
        (status = 404, description = "Customer not found."),
    ),
    tag = "customers"
)]
/// Fetches a customer by identifier.
pub async fn get_customer(pool: Extension<PgPool>, Path(id): Path<i64>) -> impl IntoResponse {
    info!("Retrieving customer with ID: {id}");

    match storage::fetch_customer(&pool, id).await {
        Ok(Some(customer)) => {
            info!("Customer found: {}", customer.email);
            (StatusCode::OK, Json(customer)).into_response()
        }
        Ok(None) => {
            warn!("Customer with ID {id} not found");
            CustomerError::NotFound.into_response()
        }
        Err(err) => CustomerError::Database(err).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/v1/customers/email/{email}",
    params(("email" = String, Path, description = "Customer email address")),
    responses(
        (status = 200, description = "Customer detail.", body = Customer),
        (status = 401, description = "Missing or invalid credentials."),
        (status = 404, description = "Customer not found."),
    ),
    tag = "customers"
)]
/// Fetches a customer by its unique email address.
pub async fn get_customer_by_email(
    pool: Extension<PgPool>,
    Path(email): Path<String>,
) -> impl IntoResponse {
    info!("Retrieving customer with email: {email}");

    match storage::fetch_customer_by_email(&pool, &email).await {
        Ok(Some(customer)) => {
            info!("Customer found: {}", customer.email);
            (StatusCode::OK, Json(customer)).into_response()
        }
        Ok(None) => {
            warn!("Customer with email {email} not found");
            CustomerError::NotFound.into_response()
        }
        Err(err) => CustomerError::Database(err).into_response(),
    }
}

#[utoipa::path(
    put,
    path = "/v1/customers/{id}",
    request_body = CustomerDraft,
    params(("id" = i64, Path, description = "Customer identifier")),
    responses(
        (status = 200, description = "Customer updated.", body = Customer),
        (status = 400, description = "Email already registered."),
        (status = 401, description = "Missing or invalid credentials."),
        (status = 404, description = "Customer not found."),
        (status = 422, description = "Invalid input."),
    ),
    tag = "customers"
)]
/// Replaces all mutable fields of the customer and returns the refreshed
/// record. Re-submitting the record's own email is not a conflict.
pub async fn update_customer(
    pool: Extension<PgPool>,
    Path(id): Path<i64>,
    Json(draft): Json<CustomerDraft>,
) -> impl IntoResponse {
    info!("Updating customer with ID: {id}");

    let invalid = draft.invalid_fields();
    if !invalid.is_empty() {
        warn!("Rejected customer payload, invalid fields: {invalid:?}");
        return validation_failure(&invalid);
    }

    match storage::update_customer(&pool, id, &draft).await {
        Ok(customer) => {
            info!("Customer updated: {}", customer.email);
            (StatusCode::OK, Json(customer)).into_response()
        }
        Err(CustomerError::NotFound) => {
            warn!("Customer with ID {id} not found");
            CustomerError::NotFound.into_response()
        }
        Err(CustomerError::DuplicateEmail) => {
            warn!("Email already registered: {}", draft.email);
            CustomerError::DuplicateEmail.into_response()
        }
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/v1/customers/{id}",
    params(("id" = i64, Path, description = "Customer identifier")),
    responses(
        (status = 200, description = "Customer deleted, final snapshot returned.", body = Customer),
        (status = 401, description = "Missing or invalid credentials."),
        (status = 404, description = "Customer not found."),
    ),
    tag = "customers"
)]
/// Physically deletes the customer and returns the snapshot as it existed
/// immediately before deletion.
pub async fn delete_customer(pool: Extension<PgPool>, Path(id): Path<i64>) -> impl IntoResponse {
    info!("Deleting customer with ID: {id}");

    match storage::delete_customer(&pool, id).await {
        Ok(customer) => {
            info!("Customer with ID {id} deleted");
            (StatusCode::OK, Json(customer)).into_response()
        }
        Err(CustomerError::NotFound) => {
            warn!("Customer with ID {id} not found");
            CustomerError::NotFound.into_response()
        }
        Err(err) => err.into_response(),
    }
}
