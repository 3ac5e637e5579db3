//! # Ventesca Server
//!
//! HTTP API for the web client: the current order, bulk repricing and the
//! catalog behind them.
//!
//! ## Routes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          /api                                           │
//! │                                                                         │
//! │  ┌──────────────────────────┐  ┌──────────────────────────────────────┐│
//! │  │  Orders                  │  │  Bulk price modifications            ││
//! │  │                          │  │                                      ││
//! │  │ GET  /orders/current     │  │ GET  /bulk-price-modifications       ││
//! │  │ POST /orders/current     │  │ GET  /bulk-price-modifications/{id}  ││
//! │  │      (line intents)      │  │ POST /bulk-price-modifications       ││
//! │  └──────────────────────────┘  │      (setup/execute/cancel/revert)   ││
//! │                                └──────────────────────────────────────┘│
//! │  ┌──────────────────────────┐  ┌──────────────────────────────────────┐│
//! │  │  Catalog                 │  │  Reports / health                    ││
//! │  │                          │  │                                      ││
//! │  │ /categories  /suppliers  │  │ GET /reports/inventory               ││
//! │  │ /products    /discounts  │  │ GET /health                          ││
//! │  └──────────────────────────┘  └──────────────────────────────────────┘│
//! │                                                                         │
//! │  Every route except /health needs x-tenant-id and x-user-id.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables (a `.env` file is honoured):
//! - `VENTESCA_HOST` - Interface to bind (default: 0.0.0.0)
//! - `VENTESCA_PORT` - HTTP port (default: 3000)
//! - `VENTESCA_DATABASE_PATH` - SQLite file (default: ./ventesca.db)
//! - `VENTESCA_DB_MAX_CONNECTIONS` - Pool size (default: 5)
//! - `VENTESCA_CURRENCY_SYMBOL` - Shown in reports (default: $)
//! - `RUST_LOG` - Log filter (default: ventesca=info)

pub mod commands;
pub mod config;
pub mod error;
pub mod session;
pub mod state;

use axum::extract::State;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::commands::{bulk, catalog, order, report};

pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ErrorCode};
pub use session::Session;
pub use state::AppState;

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route(
            "/orders/current",
            get(order::get_current_order).post(order::post_order_intent),
        )
        .route(
            "/bulk-price-modifications",
            get(bulk::list_bulk_modifications).post(bulk::post_bulk_intent),
        )
        .route(
            "/bulk-price-modifications/{id}",
            get(bulk::get_bulk_modification),
        )
        .route(
            "/categories",
            get(catalog::list_categories).post(catalog::create_category),
        )
        .route(
            "/suppliers",
            get(catalog::list_suppliers).post(catalog::create_supplier),
        )
        .route(
            "/products",
            get(catalog::list_products).post(catalog::create_product),
        )
        .route("/products/{id}", delete(catalog::delete_product))
        .route(
            "/discounts",
            get(catalog::list_discounts).post(catalog::create_discount),
        )
        .route("/discounts/{id}", delete(catalog::delete_discount))
        .route("/discounts/{id}/toggle", post(catalog::toggle_discount))
        .route("/reports/inventory", get(report::inventory_report));

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    database: bool,
}

async fn health(State(state): State<AppState>) -> Json<Health> {
    let database = state.db.health_check().await;
    Json(Health {
        status: if database { "ok" } else { "degraded" },
        database,
    })
}

// =============================================================================
// Router Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{insert_product, test_state, SELLER, TENANT};
    use crate::session::{TENANT_ID_HEADER, USER_ID_HEADER};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(TENANT_ID_HEADER, TENANT)
            .header(USER_ID_HEADER, SELLER);

        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[tokio::test]
    async fn test_health_needs_no_session() {
        let app = router(test_state().await);
        let req = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_missing_session_is_unauthorized() {
        let app = router(test_state().await);
        let req = Request::builder()
            .uri("/api/orders/current")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_order_flow_over_http() {
        let state = test_state().await;
        insert_product(&state.db, "BEB-001", 1500, 4).await;
        let app = router(state);

        let (status, body) = send(&app, request(Method::GET, "/api/orders/current", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["lines"].as_array().unwrap().len(), 0);

        let (status, body) = send(
            &app,
            request(
                Method::POST,
                "/api/orders/current",
                Some(json!({ "intent": "add-product", "code": "BEB-001" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        let line_id = body["line"]["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            request(
                Method::POST,
                "/api/orders/current",
                Some(json!({ "intent": "change-po-quantity", "lineId": line_id, "quantity": 9 })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "over");
        assert_eq!(body["line"]["quantity"], 1);
    }

    #[tokio::test]
    async fn test_unknown_intent_is_a_validation_error() {
        let app = router(test_state().await);

        let (status, body) = send(
            &app,
            request(
                Method::POST,
                "/api/orders/current",
                Some(json!({ "intent": "teleport-po" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_bulk_flow_over_http() {
        let state = test_state().await;
        insert_product(&state.db, "A", 199, 10).await;
        let app = router(state);

        let (status, body) = send(
            &app,
            request(
                Method::POST,
                "/api/bulk-price-modifications",
                Some(json!({
                    "intent": "setup-bulk-price-modification",
                    "scope": "INVENTORY",
                    "strategy": "PERCENTAGE",
                    "direction": "INCREASE",
                    "adjustmentValue": 10
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let id = body["modification"]["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            request(Method::GET, &format!("/api/bulk-price-modifications/{}", id), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["preview"]["delta"], 210);

        let execute = json!({ "intent": "execute-bulk-price-modification", "id": id });
        let (status, _) = send(
            &app,
            request(Method::POST, "/api/bulk-price-modifications", Some(execute.clone())),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            &app,
            request(Method::POST, "/api/bulk-price-modifications", Some(execute)),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "CONFLICT");

        let (_, body) = send(&app, request(Method::GET, "/api/products", None)).await;
        assert_eq!(body[0]["sellingPrice"], 220);
    }

    #[tokio::test]
    async fn test_catalog_routes() {
        let app = router(test_state().await);

        let (status, category) = send(
            &app,
            request(
                Method::POST,
                "/api/categories",
                Some(json!({ "name": "Bebidas" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, product) = send(
            &app,
            request(
                Method::POST,
                "/api/products",
                Some(json!({
                    "code": "BEB-001",
                    "name": "Agua 500ml",
                    "cost": 400,
                    "sellingPrice": 650,
                    "stock": 12,
                    "categoryId": category["id"]
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, discount) = send(
            &app,
            request(
                Method::POST,
                "/api/discounts",
                Some(json!({
                    "name": "Bebidas 10%",
                    "scope": "CATEGORY",
                    "discountType": "PERCENTAGE",
                    "applicationMethod": "BY_PRODUCT",
                    "value": 10,
                    "categoryIds": [category["id"]]
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let discount_id = discount["id"].as_str().unwrap();

        let (status, toggled) = send(
            &app,
            request(
                Method::POST,
                &format!("/api/discounts/{}/toggle", discount_id),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(toggled["isActive"], false);

        let (_, report) = send(&app, request(Method::GET, "/api/reports/inventory", None)).await;
        assert_eq!(report["totalSellingValue"], 650 * 12);

        let product_id = product["id"].as_str().unwrap();
        let (status, _) = send(
            &app,
            request(Method::DELETE, &format!("/api/products/{}", product_id), None),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(
            &app,
            request(Method::DELETE, &format!("/api/products/{}", product_id), None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }
}
