use crate::{entities::product::Entity as ProductEntity, errors::ServiceError};
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, EntityTrait, FromQueryResult};
use serde::Serialize;

/// One requested product/quantity pair of a new order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLine {
    pub product_id: i32,
    pub quantity: i32,
}

/// A line priced from the product's current unit price
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub product_id: i32,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

/// Line item joined with its product name, for order detail pages
#[derive(Debug, Clone, Serialize, FromQueryResult)]
pub struct LineItemRow {
    pub id: i32,
    pub product_id: i32,
    pub product_name: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

pub fn line_total(unit_price: Decimal, quantity: i32) -> Decimal {
    unit_price * Decimal::from(quantity)
}

/// Reads the product's current price and computes the line total.
pub async fn price_line<C>(conn: &C, line: OrderLine) -> Result<PricedLine, ServiceError>
where
    C: ConnectionTrait,
{
    let product = ProductEntity::find_by_id(line.product_id)
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))?;

    Ok(PricedLine {
        product_id: line.product_id,
        quantity: line.quantity,
        unit_price: product.unit_price,
        total_price: line_total(product.unit_price, line.quantity),
    })
}

/// Pairs parallel product/quantity arrays; surplus entries are ignored.
pub fn zip_lines(product_ids: &[i32], quantities: &[i32]) -> Vec<OrderLine> {
    product_ids
        .iter()
        .zip(quantities)
        .map(|(&product_id, &quantity)| OrderLine {
            product_id,
            quantity,
        })
        .collect()
}
