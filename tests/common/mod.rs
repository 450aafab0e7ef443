#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use rust_decimal::Decimal;
use tokio::sync::mpsc;
use tower::ServiceExt;
use warehouse_inventory::{
    config::AppConfig,
    db,
    entities::{category, customer, product, supplier},
    events::{self, EventSender},
    services::{
        categories::CategoryInput, customers::CustomerInput, products::ProductInput, stock,
        suppliers::SupplierInput,
    },
    AppState,
};

/// Status, headers and body text of a completed request
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("response body is not JSON")
    }
}

/// Helper harness for spinning up the application backed by an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with a fresh, migrated database.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        // A single connection keeps every query on the same in-memory database.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let (event_tx, event_rx) = mpsc::channel(256);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let state = AppState::new(pool, cfg, EventSender::new(event_tx))
            .expect("failed to build application state");
        let router = warehouse_inventory::build_app(state.clone());

        Self {
            router,
            state,
            _event_task: event_task,
        }
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router failed to respond");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");
        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .expect("failed to build request");
        self.send(request).await
    }

    /// POST an urlencoded body built from `fields`; repeated keys are kept.
    pub async fn post_form(&self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields.iter())
            .finish();
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .expect("failed to build request");
        self.send(request).await
    }

    pub async fn seed_customer(&self, name: &str) -> customer::Model {
        self.state
            .services
            .customers
            .create(CustomerInput {
                name: name.to_string(),
                contact_info: format!("{}@example.com", name.to_lowercase()),
            })
            .await
            .expect("seed customer")
    }

    pub async fn seed_supplier(&self, name: &str) -> supplier::Model {
        self.state
            .services
            .suppliers
            .create(SupplierInput {
                name: name.to_string(),
                contact_info: "555-0100".to_string(),
            })
            .await
            .expect("seed supplier")
    }

    pub async fn seed_category(&self, name: &str) -> category::Model {
        self.state
            .services
            .categories
            .create(CategoryInput {
                name: name.to_string(),
            })
            .await
            .expect("seed category")
    }

    /// Seeds a product together with a fresh category and supplier.
    pub async fn seed_product(&self, name: &str, quantity: i32, unit_price: Decimal) -> product::Model {
        let category = self.seed_category(&format!("{} category", name)).await;
        let supplier = self.seed_supplier(&format!("{} supplier", name)).await;
        self.state
            .services
            .products
            .create(ProductInput {
                name: name.to_string(),
                category_id: category.id,
                quantity,
                unit_price,
                supplier_id: supplier.id,
            })
            .await
            .expect("seed product")
    }

    /// Current on-hand quantity of a product.
    pub async fn quantity(&self, product_id: i32) -> i32 {
        stock::quantity_of(self.state.db.as_ref(), product_id)
            .await
            .expect("product quantity")
    }
}
