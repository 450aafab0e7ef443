use super::common::{invalid, parse_field, validate_form};
use crate::{
    entities::transaction::TransactionType, errors::ServiceError,
    services::transactions::TransactionInput, AppState,
};
use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect},
    routing::{get, post},
    Form, Router,
};
use serde::{Deserialize, Serialize};
use tera::Context;
use validator::Validate;

const INVALID: &str = "Invalid transaction data";

#[derive(Debug, Deserialize, Validate)]
pub struct TransactionForm {
    #[validate(required, length(min = 1))]
    pub product_id: Option<String>,
    #[validate(required, length(min = 1))]
    pub transaction_type: Option<String>,
    #[validate(required, length(min = 1))]
    pub quantity: Option<String>,
}

impl TransactionForm {
    /// A zero quantity counts as missing; negative quantities are accepted.
    fn into_input(self) -> Result<TransactionInput, ServiceError> {
        validate_form(&self, INVALID)?;
        let product_id = parse_field(self.product_id.as_deref()).ok_or_else(|| invalid(INVALID))?;
        let transaction_type = parse_field::<TransactionType>(self.transaction_type.as_deref())
            .ok_or_else(|| invalid(INVALID))?;
        let quantity = parse_field::<i32>(self.quantity.as_deref())
            .filter(|q| *q != 0)
            .ok_or_else(|| invalid(INVALID))?;
        Ok(TransactionInput {
            product_id,
            transaction_type,
            quantity,
        })
    }
}

async fn list_transactions(State(state): State<AppState>) -> Result<Html<String>, ServiceError> {
    let transactions = state.services.transactions.list_with_products().await?;
    let mut ctx = Context::new();
    ctx.insert("transactions", &transactions);
    state.views.render("transactions.html", &ctx)
}

async fn form_context<T: Serialize>(
    state: &AppState,
    title: &str,
    action: String,
    item: Option<T>,
) -> Result<Context, ServiceError> {
    let products = state.services.products.list().await?;
    let mut ctx = Context::new();
    ctx.insert("title", title);
    ctx.insert("action", &action);
    ctx.insert("item", &item);
    ctx.insert("products", &products);
    Ok(ctx)
}

async fn add_transaction_form(
    State(state): State<AppState>,
) -> Result<Html<String>, ServiceError> {
    let ctx = form_context(
        &state,
        "Record transaction",
        "/add_transaction".into(),
        None::<()>,
    )
    .await?;
    state.views.render("transaction_form.html", &ctx)
}

async fn add_transaction(
    State(state): State<AppState>,
    Form(form): Form<TransactionForm>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.transactions.create(form.into_input()?).await?;
    Ok(Redirect::to("/transactions"))
}

async fn edit_transaction_form(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Html<String>, ServiceError> {
    let transaction = state.services.transactions.get(id).await?;
    let ctx = form_context(
        &state,
        "Edit transaction",
        format!("/edit_transaction/{}", id),
        Some(transaction),
    )
    .await?;
    state.views.render("transaction_form.html", &ctx)
}

async fn edit_transaction(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Form(form): Form<TransactionForm>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .transactions
        .update(id, form.into_input()?)
        .await?;
    Ok(Redirect::to("/transactions"))
}

async fn delete_transaction(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.transactions.delete(id).await?;
    Ok(Redirect::to("/transactions"))
}

pub fn transaction_routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(list_transactions))
        .route(
            "/add_transaction",
            get(add_transaction_form).post(add_transaction),
        )
        .route(
            "/edit_transaction/:id",
            get(edit_transaction_form).post(edit_transaction),
        )
        .route("/delete_transaction/:id", post(delete_transaction))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(transaction_type: &str, quantity: &str) -> TransactionForm {
        TransactionForm {
            product_id: Some("4".into()),
            transaction_type: Some(transaction_type.into()),
            quantity: Some(quantity.into()),
        }
    }

    #[test]
    fn zero_quantity_is_rejected() {
        assert!(form("in", "0").into_input().is_err());
    }

    #[test]
    fn negative_quantity_is_accepted() {
        let input = form("out", "-3").into_input().unwrap();
        assert_eq!(input.delta(), 3);
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!(form("transfer", "3").into_input().is_err());
    }
}
