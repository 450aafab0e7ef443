use super::common::{invalid, parse_field, validate_form};
use crate::{errors::ServiceError, services::products::ProductInput, AppState};
use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect},
    routing::{get, post},
    Form, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tera::Context;
use validator::Validate;

const INVALID: &str = "Invalid product data";

#[derive(Debug, Deserialize, Validate)]
pub struct ProductForm {
    #[validate(required, length(min = 1))]
    pub name: Option<String>,
    #[validate(required, length(min = 1))]
    pub category_id: Option<String>,
    #[validate(required, length(min = 1))]
    pub quantity: Option<String>,
    #[validate(required, length(min = 1))]
    pub unit_price: Option<String>,
    #[validate(required, length(min = 1))]
    pub supplier_id: Option<String>,
}

impl ProductForm {
    fn into_input(self) -> Result<ProductInput, ServiceError> {
        validate_form(&self, INVALID)?;
        Ok(ProductInput {
            name: self.name.unwrap_or_default(),
            category_id: parse_field(self.category_id.as_deref()).ok_or_else(|| invalid(INVALID))?,
            quantity: parse_field(self.quantity.as_deref()).ok_or_else(|| invalid(INVALID))?,
            unit_price: parse_field::<Decimal>(self.unit_price.as_deref())
                .ok_or_else(|| invalid(INVALID))?,
            supplier_id: parse_field(self.supplier_id.as_deref()).ok_or_else(|| invalid(INVALID))?,
        })
    }
}

async fn list_products(State(state): State<AppState>) -> Result<Html<String>, ServiceError> {
    let products = state.services.products.list_with_names().await?;
    let mut ctx = Context::new();
    ctx.insert("products", &products);
    state.views.render("products.html", &ctx)
}

async fn form_context<T: Serialize>(
    state: &AppState,
    title: &str,
    action: String,
    item: Option<T>,
) -> Result<Context, ServiceError> {
    let categories = state.services.categories.list().await?;
    let suppliers = state.services.suppliers.list().await?;
    let mut ctx = Context::new();
    ctx.insert("title", title);
    ctx.insert("action", &action);
    ctx.insert("item", &item);
    ctx.insert("categories", &categories);
    ctx.insert("suppliers", &suppliers);
    Ok(ctx)
}

async fn add_product_form(State(state): State<AppState>) -> Result<Html<String>, ServiceError> {
    let ctx = form_context(&state, "Add product", "/add_product".into(), None::<()>).await?;
    state.views.render("product_form.html", &ctx)
}

async fn add_product(
    State(state): State<AppState>,
    Form(form): Form<ProductForm>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.products.create(form.into_input()?).await?;
    Ok(Redirect::to("/products"))
}

async fn edit_product_form(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Html<String>, ServiceError> {
    let product = state.services.products.get(id).await?;
    let ctx = form_context(
        &state,
        "Edit product",
        format!("/edit_product/{}", id),
        Some(product),
    )
    .await?;
    state.views.render("product_form.html", &ctx)
}

async fn edit_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Form(form): Form<ProductForm>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.products.update(id, form.into_input()?).await?;
    Ok(Redirect::to("/products"))
}

async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.products.delete(id).await?;
    Ok(Redirect::to("/products"))
}

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/add_product", get(add_product_form).post(add_product))
        .route("/edit_product/:id", get(edit_product_form).post(edit_product))
        .route("/delete_product/:id", post(delete_product))
}
