//! Admin-only pages.
//!
//! ```text
//! GET  /admin/categories               - Category tree with inline forms
//! POST /admin/categories               - Create
//! POST /admin/categories/{id}          - Update
//! POST /admin/categories/{id}/delete   - Delete
//! GET  /admin/users                    - User list
//! POST /admin/users/{id}/status        - Block or unblock
//! ```

pub mod categories;
pub mod users;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the admin routes router, nested under `/admin`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/admin/categories") }))
        .route(
            "/categories",
            get(categories::index).post(categories::create),
        )
        .route("/categories/{id}", post(categories::update))
        .route("/categories/{id}/delete", post(categories::delete))
        .route("/users", get(users::index))
        .route("/users/{id}/status", post(users::set_status))
}
