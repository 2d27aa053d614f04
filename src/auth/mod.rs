use crate::state::AppState;
use axum::Router;

pub mod directory;
mod dto;
pub mod error;
pub(crate) mod extractors;
pub mod handlers;
pub mod identity;
pub mod password;
pub mod seal;
pub mod store;

pub use identity::{Identity, Role};
pub use store::{SessionState, SessionStore};

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::session_routes())
        .merge(handlers::profile_routes())
}
