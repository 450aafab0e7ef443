use super::common::validate_form;
use crate::{errors::ServiceError, services::suppliers::SupplierInput, AppState};
use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use tera::Context;
use validator::Validate;

const INVALID: &str = "Invalid supplier data";

#[derive(Debug, Deserialize, Validate)]
pub struct SupplierForm {
    #[validate(required, length(min = 1))]
    pub name: Option<String>,
    #[validate(required, length(min = 1))]
    pub contact_info: Option<String>,
}

impl SupplierForm {
    fn into_input(self) -> Result<SupplierInput, ServiceError> {
        validate_form(&self, INVALID)?;
        Ok(SupplierInput {
            name: self.name.unwrap_or_default(),
            contact_info: self.contact_info.unwrap_or_default(),
        })
    }
}

async fn list_suppliers(State(state): State<AppState>) -> Result<Html<String>, ServiceError> {
    let suppliers = state.services.suppliers.list().await?;
    let mut ctx = Context::new();
    ctx.insert("suppliers", &suppliers);
    state.views.render("suppliers.html", &ctx)
}

fn form_context(title: &str, action: String) -> Context {
    let mut ctx = Context::new();
    ctx.insert("title", title);
    ctx.insert("action", &action);
    ctx.insert("back", "/suppliers");
    ctx
}

async fn add_supplier_form(State(state): State<AppState>) -> Result<Html<String>, ServiceError> {
    let mut ctx = form_context("Add supplier", "/add_supplier".to_string());
    ctx.insert("item", &None::<()>);
    state.views.render("contact_form.html", &ctx)
}

async fn add_supplier(
    State(state): State<AppState>,
    Form(form): Form<SupplierForm>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.suppliers.create(form.into_input()?).await?;
    Ok(Redirect::to("/suppliers"))
}

async fn edit_supplier_form(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Html<String>, ServiceError> {
    let supplier = state.services.suppliers.get(id).await?;
    let mut ctx = form_context("Edit supplier", format!("/edit_supplier/{}", id));
    ctx.insert("item", &supplier);
    state.views.render("contact_form.html", &ctx)
}

async fn edit_supplier(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Form(form): Form<SupplierForm>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.suppliers.update(id, form.into_input()?).await?;
    Ok(Redirect::to("/suppliers"))
}

async fn delete_supplier(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.suppliers.delete(id).await?;
    Ok(Redirect::to("/suppliers"))
}

pub fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route("/suppliers", get(list_suppliers))
        .route("/add_supplier", get(add_supplier_form).post(add_supplier))
        .route(
            "/edit_supplier/:id",
            get(edit_supplier_form).post(edit_supplier),
        )
        .route("/delete_supplier/:id", post(delete_supplier))
}
