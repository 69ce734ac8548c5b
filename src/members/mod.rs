use crate::state::AppState;
use axum::Router;

pub mod handlers;
pub mod store;
pub mod types;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::member_routes())
}
