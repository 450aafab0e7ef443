use super::common::{invalid, parse_all, parse_field, validate_form, FormFields};
use crate::{
    errors::ServiceError,
    services::order_lines::{zip_lines, OrderLine},
    views::OrderView,
    AppState,
};
use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use tera::Context;
use validator::Validate;

const INVALID: &str = "Invalid purchase order data";
const KIND: &str = "purchase_order";
const PARTY_LABEL: &str = "Supplier";

#[derive(Debug, Deserialize, Validate)]
pub struct StatusForm {
    #[validate(required, length(min = 1))]
    pub status: Option<String>,
}

/// Supplier id plus the zipped line items of an order form
fn parse_order_form(fields: &FormFields) -> Result<(i32, Vec<OrderLine>), ServiceError> {
    let supplier_id = parse_field(fields.required("supplier_id")).ok_or_else(|| invalid(INVALID))?;
    let product_ids: Vec<i32> =
        parse_all(&fields.get_all("product_id")).ok_or_else(|| invalid(INVALID))?;
    let quantities: Vec<i32> =
        parse_all(&fields.get_all("quantity")).ok_or_else(|| invalid(INVALID))?;
    if product_ids.is_empty() || quantities.is_empty() {
        return Err(invalid(INVALID));
    }
    Ok((supplier_id, zip_lines(&product_ids, &quantities)))
}

async fn list_purchase_orders(State(state): State<AppState>) -> Result<Html<String>, ServiceError> {
    let orders: Vec<OrderView> = state
        .services
        .purchase_orders
        .list_with_suppliers()
        .await?
        .into_iter()
        .map(OrderView::from)
        .collect();
    let mut ctx = Context::new();
    ctx.insert("title", "Purchase Orders");
    ctx.insert("kind", KIND);
    ctx.insert("party_label", PARTY_LABEL);
    ctx.insert("orders", &orders);
    state.views.render("orders.html", &ctx)
}

async fn add_purchase_order_form(
    State(state): State<AppState>,
) -> Result<Html<String>, ServiceError> {
    let suppliers = state.services.suppliers.list().await?;
    let products = state.services.products.list().await?;
    let mut ctx = Context::new();
    ctx.insert("title", "New purchase order");
    ctx.insert("kind", KIND);
    ctx.insert("party_label", PARTY_LABEL);
    ctx.insert("party_field", "supplier_id");
    ctx.insert("parties", &suppliers);
    ctx.insert("products", &products);
    state.views.render("order_form.html", &ctx)
}

async fn add_purchase_order(
    State(state): State<AppState>,
    fields: FormFields,
) -> Result<impl IntoResponse, ServiceError> {
    let (supplier_id, lines) = parse_order_form(&fields)?;
    state
        .services
        .purchase_orders
        .create(supplier_id, lines)
        .await?;
    Ok(Redirect::to("/purchase_orders"))
}

async fn render_detail(
    state: &AppState,
    id: i32,
    editable: bool,
) -> Result<Html<String>, ServiceError> {
    let detail = state.services.purchase_orders.get_detail(id).await?;
    let mut ctx = Context::new();
    ctx.insert("title", &format!("Purchase order #{}", id));
    ctx.insert("kind", KIND);
    ctx.insert("party_label", PARTY_LABEL);
    ctx.insert("order", &OrderView::from(detail.order));
    ctx.insert("items", &detail.items);
    ctx.insert("editable", &editable);
    state.views.render("order_detail.html", &ctx)
}

async fn view_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Html<String>, ServiceError> {
    render_detail(&state, id, false).await
}

async fn edit_purchase_order_form(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Html<String>, ServiceError> {
    render_detail(&state, id, true).await
}

async fn edit_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Form(form): Form<StatusForm>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_form(&form, INVALID)?;
    let status = form.status.unwrap_or_default();
    state
        .services
        .purchase_orders
        .update_status(id, status)
        .await?;
    Ok(Redirect::to("/purchase_orders"))
}

async fn delete_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.purchase_orders.delete(id).await?;
    Ok(Redirect::to("/purchase_orders"))
}

pub fn purchase_order_routes() -> Router<AppState> {
    Router::new()
        .route("/purchase_orders", get(list_purchase_orders))
        .route("/purchase_order/:id", get(view_purchase_order))
        .route(
            "/add_purchase_order",
            get(add_purchase_order_form).post(add_purchase_order),
        )
        .route(
            "/edit_purchase_order/:id",
            get(edit_purchase_order_form).post(edit_purchase_order),
        )
        .route("/delete_purchase_order/:id", post(delete_purchase_order))
}
