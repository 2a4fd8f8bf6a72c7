pub mod coach;
pub mod status;

use crate::state::AppState;
use axum::Router;

pub fn configure(state: AppState) -> Router {
    Router::new()
        .merge(coach::routes(state))
        .merge(status::routes())
}
