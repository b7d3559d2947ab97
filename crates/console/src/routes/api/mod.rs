//! JSON API routes.

pub mod navigation;
pub mod proxy;
pub mod session;
pub mod ui;

use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(proxy::router())
        .merge(navigation::router())
        .merge(session::router())
        .merge(ui::router())
}
