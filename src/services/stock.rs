//! Relative stock bookkeeping shared by transactions and orders.
//!
//! Every helper takes a generic connection so callers can run it inside the
//! database transaction that also writes the transaction or order rows.

use crate::{
    entities::product::{self, Entity as ProductEntity},
    errors::ServiceError,
};
use sea_orm::{
    sea_query::Expr, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect,
};
use tracing::{debug, warn};

pub const STOCK_OUT_OF_RANGE: &str = "Stock level out of range";

/// Adds `delta` to the product's on-hand quantity with a single relative
/// `UPDATE`. Fails with `NotFound` when the product does not exist and with
/// `ValidationError` when the new level would not fit the quantity column;
/// either way nothing is written.
pub async fn adjust_quantity<C>(conn: &C, product_id: i32, delta: i64) -> Result<(), ServiceError>
where
    C: ConnectionTrait,
{
    if delta == 0 {
        // MySQL reports zero affected rows for a no-op update
        return ensure_product_exists(conn, product_id).await;
    }

    let result = ProductEntity::update_many()
        .col_expr(
            product::Column::Quantity,
            Expr::col(product::Column::Quantity).add(delta),
        )
        .filter(product::Column::Id.eq(product_id))
        .filter(
            Expr::expr(Expr::col(product::Column::Quantity).add(delta))
                .between(i64::from(i32::MIN), i64::from(i32::MAX)),
        )
        .exec(conn)
        .await
        .map_err(ServiceError::db_error)?;

    if result.rows_affected == 0 {
        ensure_product_exists(conn, product_id).await?;
        warn!(product_id, delta, "stock adjustment out of range");
        return Err(ServiceError::ValidationError(STOCK_OUT_OF_RANGE.to_string()));
    }

    debug!(product_id, delta, "adjusted product quantity");
    Ok(())
}

pub async fn ensure_product_exists<C>(conn: &C, product_id: i32) -> Result<(), ServiceError>
where
    C: ConnectionTrait,
{
    let found = ProductEntity::find_by_id(product_id)
        .select_only()
        .column(product::Column::Id)
        .into_tuple::<i32>()
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?;

    match found {
        Some(_) => Ok(()),
        None => Err(ServiceError::NotFound("Product not found".to_string())),
    }
}

/// Current on-hand quantity of a product.
pub async fn quantity_of<C>(conn: &C, product_id: i32) -> Result<i32, ServiceError>
where
    C: ConnectionTrait,
{
    ProductEntity::find_by_id(product_id)
        .select_only()
        .column(product::Column::Quantity)
        .into_tuple::<i32>()
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{establish_connection_with_config, run_migrations, DbConfig, DbPool},
        entities::{category, supplier},
    };
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;
    use sea_orm::{ActiveModelTrait, Set};

    async fn pool_with_product(quantity: i32) -> (DbPool, i32) {
        let pool = establish_connection_with_config(&DbConfig {
            url: "sqlite::memory:".into(),
            max_connections: 1,
            ..Default::default()
        })
        .await
        .unwrap();
        run_migrations(&pool).await.unwrap();

        let category = category::ActiveModel {
            name: Set("Bulk".into()),
            ..Default::default()
        }
        .insert(&pool)
        .await
        .unwrap();
        let supplier = supplier::ActiveModel {
            name: Set("Acme".into()),
            contact_info: Set("555-0100".into()),
            ..Default::default()
        }
        .insert(&pool)
        .await
        .unwrap();
        let product = product::ActiveModel {
            name: Set("Bolt".into()),
            category_id: Set(category.id),
            quantity: Set(quantity),
            unit_price: Set(dec!(0.25)),
            supplier_id: Set(supplier.id),
            ..Default::default()
        }
        .insert(&pool)
        .await
        .unwrap();
        (pool, product.id)
    }

    #[tokio::test]
    async fn relative_update_moves_quantity() {
        let (pool, id) = pool_with_product(10).await;
        adjust_quantity(&pool, id, -4).await.unwrap();
        adjust_quantity(&pool, id, 0).await.unwrap();
        assert_eq!(quantity_of(&pool, id).await.unwrap(), 6);
    }

    #[tokio::test]
    async fn overflowing_adjustment_is_rejected_and_not_written() {
        let (pool, id) = pool_with_product(i32::MAX - 5).await;

        let err = adjust_quantity(&pool, id, 1000).await.unwrap_err();
        assert_matches!(err, ServiceError::ValidationError(msg) if msg == STOCK_OUT_OF_RANGE);
        assert_eq!(quantity_of(&pool, id).await.unwrap(), i32::MAX - 5);

        adjust_quantity(&pool, id, 5).await.unwrap();
        assert_eq!(quantity_of(&pool, id).await.unwrap(), i32::MAX);
    }

    #[tokio::test]
    async fn underflowing_adjustment_is_rejected() {
        let (pool, id) = pool_with_product(i32::MIN + 1).await;
        let err = adjust_quantity(&pool, id, -2).await.unwrap_err();
        assert_matches!(err, ServiceError::ValidationError(_));
        assert_eq!(quantity_of(&pool, id).await.unwrap(), i32::MIN + 1);
    }

    #[tokio::test]
    async fn missing_product_is_not_found() {
        let (pool, _) = pool_with_product(1).await;
        assert_matches!(
            adjust_quantity(&pool, 999, 3).await,
            Err(ServiceError::NotFound(_))
        );
    }
}
