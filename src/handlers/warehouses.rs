use super::common::validate_form;
use crate::{errors::ServiceError, services::warehouses::WarehouseInput, AppState};
use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use tera::Context;
use validator::Validate;

const INVALID: &str = "Invalid warehouse data";

#[derive(Debug, Deserialize, Validate)]
pub struct WarehouseForm {
    #[validate(required, length(min = 1))]
    pub name: Option<String>,
}

impl WarehouseForm {
    fn into_input(self) -> Result<WarehouseInput, ServiceError> {
        validate_form(&self, INVALID)?;
        Ok(WarehouseInput {
            name: self.name.unwrap_or_default(),
        })
    }
}

async fn list_warehouses(State(state): State<AppState>) -> Result<Html<String>, ServiceError> {
    let warehouses = state.services.warehouses.list().await?;
    let mut ctx = Context::new();
    ctx.insert("warehouses", &warehouses);
    state.views.render("warehouses.html", &ctx)
}

fn form_context(title: &str, action: String) -> Context {
    let mut ctx = Context::new();
    ctx.insert("title", title);
    ctx.insert("action", &action);
    ctx.insert("back", "/warehouses");
    ctx
}

async fn add_warehouse_form(State(state): State<AppState>) -> Result<Html<String>, ServiceError> {
    let mut ctx = form_context("Add warehouse", "/add_warehouse".to_string());
    ctx.insert("item", &None::<()>);
    state.views.render("name_form.html", &ctx)
}

async fn add_warehouse(
    State(state): State<AppState>,
    Form(form): Form<WarehouseForm>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.warehouses.create(form.into_input()?).await?;
    Ok(Redirect::to("/warehouses"))
}

async fn edit_warehouse_form(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Html<String>, ServiceError> {
    let warehouse = state.services.warehouses.get(id).await?;
    let mut ctx = form_context("Edit warehouse", format!("/edit_warehouse/{}", id));
    ctx.insert("item", &warehouse);
    state.views.render("name_form.html", &ctx)
}

async fn edit_warehouse(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Form(form): Form<WarehouseForm>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.warehouses.update(id, form.into_input()?).await?;
    Ok(Redirect::to("/warehouses"))
}

async fn delete_warehouse(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.warehouses.delete(id).await?;
    Ok(Redirect::to("/warehouses"))
}

pub fn warehouse_routes() -> Router<AppState> {
    Router::new()
        .route("/warehouses", get(list_warehouses))
        .route("/add_warehouse", get(add_warehouse_form).post(add_warehouse))
        .route(
            "/edit_warehouse/:id",
            get(edit_warehouse_form).post(edit_warehouse),
        )
        .route("/delete_warehouse/:id", post(delete_warehouse))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_required() {
        let err = WarehouseForm { name: None }.into_input().unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(msg) if msg == INVALID));
        assert!(WarehouseForm {
            name: Some("Fasteners".into())
        }
        .into_input()
        .is_ok());
    }
}
