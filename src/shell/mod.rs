use crate::state::AppState;
use axum::Router;

pub mod handlers;
pub mod navigation;
pub mod pages;
pub mod view;

pub use navigation::NavigationMap;
pub use view::{ShellView, ViewShell};

pub fn router() -> Router<AppState> {
    handlers::shell_routes()
}
