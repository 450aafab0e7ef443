mod common;

use axum::http::StatusCode;
use common::TestApp;
use rust_decimal_macros::dec;
use warehouse_inventory::entities::transaction::TransactionType;

#[tokio::test]
async fn product_form_creates_and_lists_with_names() {
    let app = TestApp::new().await;
    let category = app.seed_category("Hardware").await;
    let supplier = app.seed_supplier("Acme").await;

    let category_id = category.id.to_string();
    let supplier_id = supplier.id.to_string();
    let response = app
        .post_form(
            "/add_product",
            &[
                ("name", "Bolt"),
                ("category_id", category_id.as_str()),
                ("quantity", "40"),
                ("unit_price", "0.25"),
                ("supplier_id", supplier_id.as_str()),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/products"));

    let rows = app.state.services.products.list_with_names().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Bolt");
    assert_eq!(rows[0].quantity, 40);
    assert_eq!(rows[0].unit_price, dec!(0.25));
    assert_eq!(rows[0].category_name.as_deref(), Some("Hardware"));
    assert_eq!(rows[0].supplier_name.as_deref(), Some("Acme"));

    let listing = app.get("/products").await;
    assert_eq!(listing.status, StatusCode::OK);
    assert!(listing.body.contains("Bolt"));
    assert!(listing.body.contains("Acme"));
}

#[tokio::test]
async fn product_with_bad_price_is_rejected() {
    let app = TestApp::new().await;
    let category = app.seed_category("Hardware").await;
    let supplier = app.seed_supplier("Acme").await;

    let category_id = category.id.to_string();
    let supplier_id = supplier.id.to_string();
    let response = app
        .post_form(
            "/add_product",
            &[
                ("name", "Bolt"),
                ("category_id", category_id.as_str()),
                ("quantity", "40"),
                ("unit_price", "cheap"),
                ("supplier_id", supplier_id.as_str()),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["message"], "Invalid product data");
    assert!(app.state.services.products.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn editing_missing_product_is_not_found() {
    let app = TestApp::new().await;
    let category = app.seed_category("Hardware").await;
    let supplier = app.seed_supplier("Acme").await;

    let category_id = category.id.to_string();
    let supplier_id = supplier.id.to_string();
    let response = app
        .post_form(
            "/edit_product/77",
            &[
                ("name", "Bolt"),
                ("category_id", category_id.as_str()),
                ("quantity", "1"),
                ("unit_price", "1.00"),
                ("supplier_id", supplier_id.as_str()),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json()["message"], "Product not found");
}

#[tokio::test]
async fn transactions_move_stock() {
    let app = TestApp::new().await;
    let product = app.seed_product("Widget", 10, dec!(2.50)).await;
    let product_id = product.id.to_string();

    let inbound = app
        .post_form(
            "/add_transaction",
            &[
                ("product_id", product_id.as_str()),
                ("transaction_type", "in"),
                ("quantity", "5"),
            ],
        )
        .await;
    assert_eq!(inbound.status, StatusCode::SEE_OTHER);
    assert_eq!(inbound.location(), Some("/transactions"));
    assert_eq!(app.quantity(product.id).await, 15);

    let outbound = app
        .post_form(
            "/add_transaction",
            &[
                ("product_id", product_id.as_str()),
                ("transaction_type", "out"),
                ("quantity", "4"),
            ],
        )
        .await;
    assert_eq!(outbound.status, StatusCode::SEE_OTHER);
    assert_eq!(app.quantity(product.id).await, 11);

    let listing = app.get("/transactions").await;
    assert_eq!(listing.status, StatusCode::OK);
    assert!(listing.body.contains("Widget"));
}

#[tokio::test]
async fn editing_transaction_type_swings_stock_twice() {
    let app = TestApp::new().await;
    let product = app.seed_product("Widget", 10, dec!(2.50)).await;
    let product_id = product.id.to_string();

    app.post_form(
        "/add_transaction",
        &[
            ("product_id", product_id.as_str()),
            ("transaction_type", "in"),
            ("quantity", "3"),
        ],
    )
    .await;
    assert_eq!(app.quantity(product.id).await, 13);

    let recorded = app
        .state
        .services
        .transactions
        .list_with_products()
        .await
        .unwrap();
    let id = recorded[0].id;
    let original = app.state.services.transactions.get(id).await.unwrap();

    let edited = app
        .post_form(
            &format!("/edit_transaction/{}", id),
            &[
                ("product_id", product_id.as_str()),
                ("transaction_type", "out"),
                ("quantity", "3"),
            ],
        )
        .await;
    assert_eq!(edited.status, StatusCode::SEE_OTHER);
    assert_eq!(app.quantity(product.id).await, 7);

    let updated = app.state.services.transactions.get(id).await.unwrap();
    assert_eq!(updated.transaction_type, TransactionType::Out);
    assert_eq!(updated.date, original.date);
}

#[tokio::test]
async fn editing_transaction_product_moves_its_effect() {
    let app = TestApp::new().await;
    let first = app.seed_product("First", 10, dec!(1.00)).await;
    let second = app.seed_product("Second", 20, dec!(1.00)).await;

    let first_id = first.id.to_string();
    let second_id = second.id.to_string();
    app.post_form(
        "/add_transaction",
        &[
            ("product_id", first_id.as_str()),
            ("transaction_type", "out"),
            ("quantity", "4"),
        ],
    )
    .await;
    assert_eq!(app.quantity(first.id).await, 6);

    let id = app
        .state
        .services
        .transactions
        .list_with_products()
        .await
        .unwrap()[0]
        .id;
    let edited = app
        .post_form(
            &format!("/edit_transaction/{}", id),
            &[
                ("product_id", second_id.as_str()),
                ("transaction_type", "out"),
                ("quantity", "4"),
            ],
        )
        .await;
    assert_eq!(edited.status, StatusCode::SEE_OTHER);
    assert_eq!(app.quantity(first.id).await, 10);
    assert_eq!(app.quantity(second.id).await, 16);
}

#[tokio::test]
async fn deleting_transaction_reverts_stock() {
    let app = TestApp::new().await;
    let product = app.seed_product("Widget", 10, dec!(2.50)).await;
    let product_id = product.id.to_string();

    app.post_form(
        "/add_transaction",
        &[
            ("product_id", product_id.as_str()),
            ("transaction_type", "out"),
            ("quantity", "6"),
        ],
    )
    .await;
    assert_eq!(app.quantity(product.id).await, 4);

    let id = app
        .state
        .services
        .transactions
        .list_with_products()
        .await
        .unwrap()[0]
        .id;
    let deleted = app
        .post_form(&format!("/delete_transaction/{}", id), &[])
        .await;
    assert_eq!(deleted.status, StatusCode::SEE_OTHER);
    assert_eq!(app.quantity(product.id).await, 10);
    assert!(app
        .state
        .services
        .transactions
        .list_with_products()
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn transaction_for_unknown_product_leaves_nothing_behind() {
    let app = TestApp::new().await;

    let response = app
        .post_form(
            "/add_transaction",
            &[
                ("product_id", "404"),
                ("transaction_type", "in"),
                ("quantity", "1"),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(app
        .state
        .services
        .transactions
        .list_with_products()
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn zero_quantity_transaction_is_rejected() {
    let app = TestApp::new().await;
    let product = app.seed_product("Widget", 10, dec!(2.50)).await;
    let product_id = product.id.to_string();

    let response = app
        .post_form(
            "/add_transaction",
            &[
                ("product_id", product_id.as_str()),
                ("transaction_type", "in"),
                ("quantity", "0"),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.quantity(product.id).await, 10);
}

#[tokio::test]
async fn most_negative_out_quantity_is_applied_without_overflow() {
    let app = TestApp::new().await;
    let product = app.seed_product("Widget", i32::MIN, dec!(1.00)).await;
    let product_id = product.id.to_string();

    let response = app
        .post_form(
            "/add_transaction",
            &[
                ("product_id", product_id.as_str()),
                ("transaction_type", "out"),
                ("quantity", "-2147483648"),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(app.quantity(product.id).await, 0);

    let id = app
        .state
        .services
        .transactions
        .list_with_products()
        .await
        .unwrap()[0]
        .id;
    let deleted = app
        .post_form(&format!("/delete_transaction/{}", id), &[])
        .await;
    assert_eq!(deleted.status, StatusCode::SEE_OTHER);
    assert_eq!(app.quantity(product.id).await, i32::MIN);
}

#[tokio::test]
async fn out_of_range_stock_is_rejected_and_rolled_back() {
    let app = TestApp::new().await;
    let product = app.seed_product("Widget", 2_147_483_000, dec!(1.00)).await;
    let product_id = product.id.to_string();

    let response = app
        .post_form(
            "/add_transaction",
            &[
                ("product_id", product_id.as_str()),
                ("transaction_type", "in"),
                ("quantity", "1000"),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["message"], "Stock level out of range");
    assert_eq!(app.quantity(product.id).await, 2_147_483_000);
    assert!(app
        .state
        .services
        .transactions
        .list_with_products()
        .await
        .unwrap()
        .is_empty());

    let listing = app.get("/products").await;
    assert_eq!(listing.status, StatusCode::OK);
    assert!(listing.body.contains("Widget"));

    let negated = app
        .post_form(
            "/add_transaction",
            &[
                ("product_id", product_id.as_str()),
                ("transaction_type", "out"),
                ("quantity", "-2147483648"),
            ],
        )
        .await;
    assert_eq!(negated.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.quantity(product.id).await, 2_147_483_000);
}
