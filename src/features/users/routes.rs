use axum::{routing::get, Router};
use std::sync::Arc;

use crate::features::users::handlers::{
    create_user, delete_user, get_my_profile, get_user, list_users, update_user,
};
use crate::features::users::services::UserService;

pub fn routes(service: Arc<UserService>) -> Router {
    Router::new()
        .route("/api/users/me", get(get_my_profile))
        .route("/api/admin/users", get(list_users).post(create_user))
        .route(
            "/api/admin/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .with_state(service)
}
