//! Property-based tests for stock bookkeeping.
//!
//! Random interleavings of transaction and order operations are replayed
//! against a fresh database and compared with a plain per-product sum.

mod common;

use common::TestApp;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use warehouse_inventory::{
    entities::transaction::TransactionType,
    services::{
        order_lines::{line_total, zip_lines, OrderLine},
        transactions::TransactionInput,
    },
};

const PRODUCTS: usize = 3;

#[derive(Debug, Clone)]
enum Op {
    Record {
        product: usize,
        transaction_type: TransactionType,
        quantity: i32,
    },
    Edit {
        slot: usize,
        product: usize,
        transaction_type: TransactionType,
        quantity: i32,
    },
    DeleteTransaction {
        slot: usize,
    },
    Sell {
        lines: Vec<(usize, i32)>,
    },
    Buy {
        lines: Vec<(usize, i32)>,
    },
    DeleteSale {
        slot: usize,
    },
    DeletePurchase {
        slot: usize,
    },
}

/// What the database should hold after the operations applied so far
#[derive(Debug)]
struct Model {
    stock: Vec<i64>,
    transactions: Vec<(i32, usize, i64)>,
    sales: Vec<(i32, Vec<(usize, i32)>)>,
    purchases: Vec<(i32, Vec<(usize, i32)>)>,
}

fn transaction_type_strategy() -> impl Strategy<Value = TransactionType> {
    prop_oneof![Just(TransactionType::In), Just(TransactionType::Out)]
}

fn lines_strategy() -> impl Strategy<Value = Vec<(usize, i32)>> {
    prop::collection::vec((0..PRODUCTS, 1i32..20), 1..4)
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..PRODUCTS, transaction_type_strategy(), 1i32..50).prop_map(
            |(product, transaction_type, quantity)| Op::Record {
                product,
                transaction_type,
                quantity,
            }
        ),
        (any::<usize>(), 0..PRODUCTS, transaction_type_strategy(), 1i32..50).prop_map(
            |(slot, product, transaction_type, quantity)| Op::Edit {
                slot,
                product,
                transaction_type,
                quantity,
            }
        ),
        any::<usize>().prop_map(|slot| Op::DeleteTransaction { slot }),
        lines_strategy().prop_map(|lines| Op::Sell { lines }),
        lines_strategy().prop_map(|lines| Op::Buy { lines }),
        any::<usize>().prop_map(|slot| Op::DeleteSale { slot }),
        any::<usize>().prop_map(|slot| Op::DeletePurchase { slot }),
    ]
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime")
}

fn order_lines(product_ids: &[i32], lines: &[(usize, i32)]) -> Vec<OrderLine> {
    lines
        .iter()
        .map(|&(product, quantity)| OrderLine {
            product_id: product_ids[product],
            quantity,
        })
        .collect()
}

async fn apply(
    app: &TestApp,
    product_ids: &[i32],
    customer_id: i32,
    supplier_id: i32,
    model: &mut Model,
    op: Op,
) {
    let services = &app.state.services;
    match op {
        Op::Record {
            product,
            transaction_type,
            quantity,
        } => {
            let recorded = services
                .transactions
                .create(TransactionInput {
                    product_id: product_ids[product],
                    transaction_type,
                    quantity,
                })
                .await
                .expect("record transaction");
            let delta = transaction_type.delta(quantity);
            model.stock[product] += delta;
            model.transactions.push((recorded.id, product, delta));
        }
        Op::Edit {
            slot,
            product,
            transaction_type,
            quantity,
        } => {
            if model.transactions.is_empty() {
                return;
            }
            let index = slot % model.transactions.len();
            let (id, old_product, old_delta) = model.transactions[index];
            services
                .transactions
                .update(
                    id,
                    TransactionInput {
                        product_id: product_ids[product],
                        transaction_type,
                        quantity,
                    },
                )
                .await
                .expect("edit transaction");
            let delta = transaction_type.delta(quantity);
            model.stock[old_product] -= old_delta;
            model.stock[product] += delta;
            model.transactions[index] = (id, product, delta);
        }
        Op::DeleteTransaction { slot } => {
            if model.transactions.is_empty() {
                return;
            }
            let (id, product, delta) = model.transactions.remove(slot % model.transactions.len());
            assert!(services.transactions.delete(id).await.expect("delete transaction"));
            model.stock[product] -= delta;
        }
        Op::Sell { lines } => {
            let order = services
                .sales_orders
                .create(customer_id, order_lines(product_ids, &lines))
                .await
                .expect("create sales order");
            for &(product, quantity) in &lines {
                model.stock[product] -= i64::from(quantity);
            }
            model.sales.push((order.id, lines));
        }
        Op::Buy { lines } => {
            let order = services
                .purchase_orders
                .create(supplier_id, order_lines(product_ids, &lines))
                .await
                .expect("create purchase order");
            for &(product, quantity) in &lines {
                model.stock[product] += i64::from(quantity);
            }
            model.purchases.push((order.id, lines));
        }
        Op::DeleteSale { slot } => {
            if model.sales.is_empty() {
                return;
            }
            let (id, lines) = model.sales.remove(slot % model.sales.len());
            assert!(services.sales_orders.delete(id).await.expect("delete sales order"));
            for (product, quantity) in lines {
                model.stock[product] += i64::from(quantity);
            }
        }
        Op::DeletePurchase { slot } => {
            if model.purchases.is_empty() {
                return;
            }
            let (id, lines) = model.purchases.remove(slot % model.purchases.len());
            assert!(services
                .purchase_orders
                .delete(id)
                .await
                .expect("delete purchase order"));
            for (product, quantity) in lines {
                model.stock[product] -= i64::from(quantity);
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn in_and_out_are_opposites(quantity in any::<i32>()) {
        prop_assert_eq!(
            TransactionType::In.delta(quantity),
            -TransactionType::Out.delta(quantity)
        );
    }

    #[test]
    fn split_lines_cost_the_same_as_one(
        cents in 0i64..1_000_000,
        first in 0i32..1_000,
        second in 0i32..1_000,
    ) {
        let unit_price = Decimal::new(cents, 2);
        prop_assert_eq!(
            line_total(unit_price, first) + line_total(unit_price, second),
            line_total(unit_price, first + second)
        );
    }

    #[test]
    fn zipped_lines_never_outnumber_either_side(
        product_ids in prop::collection::vec(1i32..100, 0..10),
        quantities in prop::collection::vec(1i32..100, 0..10),
    ) {
        let lines = zip_lines(&product_ids, &quantities);
        prop_assert_eq!(lines.len(), product_ids.len().min(quantities.len()));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn stock_matches_history_after_every_operation(
        initial in prop::collection::vec(0i32..100, PRODUCTS),
        ops in prop::collection::vec(op_strategy(), 1..16),
    ) {
        runtime().block_on(async {
            let app = TestApp::new().await;
            let customer = app.seed_customer("Ada").await;
            let supplier = app.seed_supplier("Acme").await;

            let mut product_ids = Vec::with_capacity(PRODUCTS);
            for (index, quantity) in initial.iter().enumerate() {
                let product = app
                    .seed_product(&format!("Product {}", index), *quantity, dec!(1.50))
                    .await;
                product_ids.push(product.id);
            }

            let mut model = Model {
                stock: initial.iter().map(|&q| i64::from(q)).collect(),
                transactions: Vec::new(),
                sales: Vec::new(),
                purchases: Vec::new(),
            };

            for op in ops {
                let step = format!("{:?}", op);
                apply(&app, &product_ids, customer.id, supplier.id, &mut model, op).await;
                for (index, &product_id) in product_ids.iter().enumerate() {
                    assert_eq!(
                        i64::from(app.quantity(product_id).await),
                        model.stock[index],
                        "product {} diverged after {}",
                        index,
                        step
                    );
                }
            }
        });
    }
}
