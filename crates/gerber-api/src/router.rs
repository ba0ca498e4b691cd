//! Route table

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::handlers::{auth, gerber, health, logger, session_files};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let max_body_bytes = state.config.upload.max_body_bytes;

    Router::new()
        .route("/health", get(health::health_check))
        // Auth
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/me", post(auth::me))
        .route("/api/auth/update-role", post(auth::update_role))
        .route("/api/auth/users", get(auth::users))
        .route("/api/auth/user/{user_name}", get(auth::user))
        .route("/api/auth/usernames", get(auth::usernames))
        // Orders
        .route("/api/gerber/post-gerber", post(gerber::post_gerber))
        .route("/api/gerber/get-gerber", get(gerber::get_gerber))
        .route("/api/gerber/get-full-gerber/{id}", get(gerber::get_full_gerber))
        .route("/api/gerber/get-gerber-file/{id}", get(gerber::get_gerber_file))
        // Session files
        .route("/api/session-files/stage", post(session_files::stage))
        .route("/api/session-files/get-session-file", get(session_files::get_session_file))
        .route("/api/session-files/delete", delete(session_files::delete))
        // Client logs
        .route("/api/logger/set-log/{user_id}", post(logger::set_log))
        .route("/api/logger/get-log/{user_id}", get(logger::get_log))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}
