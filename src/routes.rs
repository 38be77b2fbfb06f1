use crate::{
    routes::{
        items::{delete_item, get_item, get_items, post_item, put_item},
        students::{get_student, get_students, post_student},
    },
    state::SatchelState,
};
use axum::{Router, extract::DefaultBodyLimit, routing::get};
use tower_http::trace::TraceLayer;

pub mod items;
pub mod students;

const MAX_BODY_BYTES: usize = 64 * 1024;

pub fn router(state: SatchelState) -> Router {
    Router::new()
        .route("/students", get(get_students).post(post_student))
        .route("/students/{id}", get(get_student))
        .route("/items", get(get_items).post(post_item))
        .route(
            "/items/{id}",
            get(get_item).put(put_item).delete(delete_item),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
