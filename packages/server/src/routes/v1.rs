use axum::{
    Router,
    routing::{get, post},
};

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/posts", post_routes())
        .nest("/entries", entry_routes())
        .nest("/subjects", subject_routes())
        .nest("/careers", career_routes())
        .nest("/users", user_routes())
        .nest("/files", file_routes())
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/me", get(handlers::auth::me))
}

fn post_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::entry::list_entries).post(handlers::entry::create_entry),
        )
        .route(
            "/search",
            get(handlers::entry::search_entries).post(handlers::entry::search_entries_post),
        )
        .route(
            "/{id}",
            get(handlers::entry::get_thread)
                .put(handlers::entry::update_entry)
                .delete(handlers::entry::delete_entry),
        )
}

fn entry_routes() -> Router<AppState> {
    Router::new()
        .route("/{id}/vote", post(handlers::vote::cast_vote))
        .route("/{id}/score", get(handlers::vote::get_score))
}

fn subject_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::subject::list_subjects).post(handlers::subject::create_subject),
        )
        .route(
            "/{id}",
            get(handlers::subject::get_subject)
                .put(handlers::subject::update_subject)
                .delete(handlers::subject::delete_subject),
        )
}

fn career_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::career::list_careers).post(handlers::career::create_career),
        )
        .route(
            "/{id}",
            get(handlers::career::get_career).delete(handlers::career::delete_career),
        )
}

fn user_routes() -> Router<AppState> {
    Router::new().route("/{id}", get(handlers::user::get_user))
}

fn file_routes() -> Router<AppState> {
    Router::new().route("/{*key}", get(handlers::file::download_file))
}
