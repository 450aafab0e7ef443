use super::common::validate_form;
use crate::{errors::ServiceError, services::customers::CustomerInput, AppState};
use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use tera::Context;
use validator::Validate;

const INVALID: &str = "Invalid customer data";

#[derive(Debug, Deserialize, Validate)]
pub struct CustomerForm {
    #[validate(required, length(min = 1))]
    pub name: Option<String>,
    #[validate(required, length(min = 1))]
    pub contact_info: Option<String>,
}

impl CustomerForm {
    fn into_input(self) -> Result<CustomerInput, ServiceError> {
        validate_form(&self, INVALID)?;
        Ok(CustomerInput {
            name: self.name.unwrap_or_default(),
            contact_info: self.contact_info.unwrap_or_default(),
        })
    }
}

async fn list_customers(State(state): State<AppState>) -> Result<Html<String>, ServiceError> {
    let customers = state.services.customers.list().await?;
    let mut ctx = Context::new();
    ctx.insert("customers", &customers);
    state.views.render("customers.html", &ctx)
}

fn form_context(title: &str, action: String) -> Context {
    let mut ctx = Context::new();
    ctx.insert("title", title);
    ctx.insert("action", &action);
    ctx.insert("back", "/customers");
    ctx
}

async fn add_customer_form(State(state): State<AppState>) -> Result<Html<String>, ServiceError> {
    let mut ctx = form_context("Add customer", "/add_customer".to_string());
    ctx.insert("item", &None::<()>);
    state.views.render("contact_form.html", &ctx)
}

async fn add_customer(
    State(state): State<AppState>,
    Form(form): Form<CustomerForm>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.customers.create(form.into_input()?).await?;
    Ok(Redirect::to("/customers"))
}

async fn edit_customer_form(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Html<String>, ServiceError> {
    let customer = state.services.customers.get(id).await?;
    let mut ctx = form_context("Edit customer", format!("/edit_customer/{}", id));
    ctx.insert("item", &customer);
    state.views.render("contact_form.html", &ctx)
}

async fn edit_customer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Form(form): Form<CustomerForm>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.customers.update(id, form.into_input()?).await?;
    Ok(Redirect::to("/customers"))
}

async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.customers.delete(id).await?;
    Ok(Redirect::to("/customers"))
}

pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/customers", get(list_customers))
        .route("/add_customer", get(add_customer_form).post(add_customer))
        .route(
            "/edit_customer/:id",
            get(edit_customer_form).post(edit_customer),
        )
        .route("/delete_customer/:id", post(delete_customer))
}
