//! OpenAPI document assembly.
//!
//! Every documented route is listed here; the document is served raw at
//! `/openapi.json` and interactively through Swagger UI at `/docs`.

use utoipa::OpenApi;

use super::handlers::{customers, health};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        customers::create_customer,
        customers::list_customers,
        customers::get_customer,
        customers::get_customer_by_email,
        customers::update_customer,
        customers::delete_customer,
    ),
    components(schemas(
        customers::types::Customer,
        customers::types::CustomerDraft,
        health::Health,
    )),
    tags(
        (name = "customers", description = "Customer management operations"),
        (name = "health", description = "Service health"),
    )
)]
pub struct ApiDoc;
