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

const INVALID: &str = "Invalid sales order data";
const KIND: &str = "sales_order";
const PARTY_LABEL: &str = "Customer";

#[derive(Debug, Deserialize, Validate)]
pub struct StatusForm {
    #[validate(required, length(min = 1))]
    pub status: Option<String>,
}

/// Customer id plus the zipped line items of an order form
fn parse_order_form(fields: &FormFields) -> Result<(i32, Vec<OrderLine>), ServiceError> {
    let customer_id = parse_field(fields.required("customer_id")).ok_or_else(|| invalid(INVALID))?;
    let product_ids: Vec<i32> =
        parse_all(&fields.get_all("product_id")).ok_or_else(|| invalid(INVALID))?;
    let quantities: Vec<i32> =
        parse_all(&fields.get_all("quantity")).ok_or_else(|| invalid(INVALID))?;
    if product_ids.is_empty() || quantities.is_empty() {
        return Err(invalid(INVALID));
    }
    Ok((customer_id, zip_lines(&product_ids, &quantities)))
}

async fn list_sales_orders(State(state): State<AppState>) -> Result<Html<String>, ServiceError> {
    let orders: Vec<OrderView> = state
        .services
        .sales_orders
        .list_with_customers()
        .await?
        .into_iter()
        .map(OrderView::from)
        .collect();
    let mut ctx = Context::new();
    ctx.insert("title", "Sales Orders");
    ctx.insert("kind", KIND);
    ctx.insert("party_label", PARTY_LABEL);
    ctx.insert("orders", &orders);
    state.views.render("orders.html", &ctx)
}

async fn add_sales_order_form(
    State(state): State<AppState>,
) -> Result<Html<String>, ServiceError> {
    let customers = state.services.customers.list().await?;
    let products = state.services.products.list().await?;
    let mut ctx = Context::new();
    ctx.insert("title", "New sales order");
    ctx.insert("kind", KIND);
    ctx.insert("party_label", PARTY_LABEL);
    ctx.insert("party_field", "customer_id");
    ctx.insert("parties", &customers);
    ctx.insert("products", &products);
    state.views.render("order_form.html", &ctx)
}

async fn add_sales_order(
    State(state): State<AppState>,
    fields: FormFields,
) -> Result<impl IntoResponse, ServiceError> {
    let (customer_id, lines) = parse_order_form(&fields)?;
    state
        .services
        .sales_orders
        .create(customer_id, lines)
        .await?;
    Ok(Redirect::to("/sales_orders"))
}

async fn render_detail(
    state: &AppState,
    id: i32,
    editable: bool,
) -> Result<Html<String>, ServiceError> {
    let detail = state.services.sales_orders.get_detail(id).await?;
    let mut ctx = Context::new();
    ctx.insert("title", &format!("Sales order #{}", id));
    ctx.insert("kind", KIND);
    ctx.insert("party_label", PARTY_LABEL);
    ctx.insert("order", &OrderView::from(detail.order));
    ctx.insert("items", &detail.items);
    ctx.insert("editable", &editable);
    state.views.render("order_detail.html", &ctx)
}

async fn view_sales_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Html<String>, ServiceError> {
    render_detail(&state, id, false).await
}

async fn edit_sales_order_form(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Html<String>, ServiceError> {
    render_detail(&state, id, true).await
}

async fn edit_sales_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Form(form): Form<StatusForm>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_form(&form, INVALID)?;
    let status = form.status.unwrap_or_default();
    state
        .services
        .sales_orders
        .update_status(id, status)
        .await?;
    Ok(Redirect::to("/sales_orders"))
}

async fn delete_sales_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.sales_orders.delete(id).await?;
    Ok(Redirect::to("/sales_orders"))
}

pub fn sales_order_routes() -> Router<AppState> {
    Router::new()
        .route("/sales_orders", get(list_sales_orders))
        .route("/sales_order/:id", get(view_sales_order))
        .route(
            "/add_sales_order",
            get(add_sales_order_form).post(add_sales_order),
        )
        .route(
            "/edit_sales_order/:id",
            get(edit_sales_order_form).post(edit_sales_order),
        )
        .route("/delete_sales_order/:id", post(delete_sales_order))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_form_zips_lines() {
        let fields = FormFields::parse(
            b"customer_id=1&product_id[]=4&quantity[]=2&product_id[]=5&quantity[]=1&product_id[]=6",
        );
        let (customer_id, lines) = parse_order_form(&fields).unwrap();
        assert_eq!(customer_id, 1);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].product_id, 5);
    }

    #[test]
    fn order_form_requires_lines_and_customer() {
        assert!(parse_order_form(&FormFields::parse(b"customer_id=1")).is_err());
        assert!(parse_order_form(&FormFields::parse(b"product_id[]=1&quantity[]=1")).is_err());
        assert!(parse_order_form(&FormFields::parse(
            b"customer_id=1&product_id[]=x&quantity[]=1"
        ))
        .is_err());
    }
}
