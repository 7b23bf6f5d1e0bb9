//! # Clientele (Customer Records Service)
//!
//! `clientele` manages customer records behind a JSON HTTP API. Every
//! customer endpoint sits behind HTTP Basic authentication; storage is a
//! single PostgreSQL table with a unique index on the contact email.
//!
//! ## API Surface
//!
//! | Verb & Path | Operation |
//! |---|---|
//! | `POST /v1/customers/` | Create a customer |
//! | `GET /v1/customers/` | List customers (`skip`/`limit` pagination) |
//! | `GET /v1/customers/{id}` | Fetch by identifier |
//! | `GET /v1/customers/email/{email}` | Fetch by email |
//! | `PUT /v1/customers/{id}` | Replace all mutable fields |
//! | `DELETE /v1/customers/{id}` | Delete, returning the final snapshot |
//!
//! `GET /metrics` (Prometheus text), `GET /health`, and the generated API
//! documentation at `/docs` + `/openapi.json` are served without
//! credentials.

pub mod cli;
pub mod clientele;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
