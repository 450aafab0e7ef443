use super::common::validate_form;
use crate::{errors::ServiceError, services::categories::CategoryInput, AppState};
use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use tera::Context;
use validator::Validate;

const INVALID: &str = "Invalid category data";

#[derive(Debug, Deserialize, Validate)]
pub struct CategoryForm {
    #[validate(required, length(min = 1))]
    pub name: Option<String>,
}

impl CategoryForm {
    fn into_input(self) -> Result<CategoryInput, ServiceError> {
        validate_form(&self, INVALID)?;
        Ok(CategoryInput {
            name: self.name.unwrap_or_default(),
        })
    }
}

async fn list_categories(State(state): State<AppState>) -> Result<Html<String>, ServiceError> {
    let categories = state.services.categories.list().await?;
    let mut ctx = Context::new();
    ctx.insert("categories", &categories);
    state.views.render("categories.html", &ctx)
}

fn form_context(title: &str, action: String) -> Context {
    let mut ctx = Context::new();
    ctx.insert("title", title);
    ctx.insert("action", &action);
    ctx.insert("back", "/categories");
    ctx
}

async fn add_category_form(State(state): State<AppState>) -> Result<Html<String>, ServiceError> {
    let mut ctx = form_context("Add category", "/add_category".to_string());
    ctx.insert("item", &None::<()>);
    state.views.render("name_form.html", &ctx)
}

async fn add_category(
    State(state): State<AppState>,
    Form(form): Form<CategoryForm>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.categories.create(form.into_input()?).await?;
    Ok(Redirect::to("/categories"))
}

async fn edit_category_form(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Html<String>, ServiceError> {
    let category = state.services.categories.get(id).await?;
    let mut ctx = form_context("Edit category", format!("/edit_category/{}", id));
    ctx.insert("item", &category);
    state.views.render("name_form.html", &ctx)
}

async fn edit_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Form(form): Form<CategoryForm>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.categories.update(id, form.into_input()?).await?;
    Ok(Redirect::to("/categories"))
}

async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.categories.delete(id).await?;
    Ok(Redirect::to("/categories"))
}

pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories))
        .route("/add_category", get(add_category_form).post(add_category))
        .route(
            "/edit_category/:id",
            get(edit_category_form).post(edit_category),
        )
        .route("/delete_category/:id", post(delete_category))
}
