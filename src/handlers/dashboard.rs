use crate::{errors::ServiceError, AppState};
use axum::{
    extract::State,
    response::{Html, Redirect},
    routing::get,
    Router,
};
use tera::Context;

async fn root() -> Redirect {
    Redirect::to("/index")
}

async fn dashboard(State(state): State<AppState>) -> Result<Html<String>, ServiceError> {
    let summary = state.services.dashboard.summary().await?;
    let mut ctx = Context::new();
    ctx.insert("summary", &summary);
    state.views.render("index.html", &ctx)
}

pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/index", get(dashboard))
}
