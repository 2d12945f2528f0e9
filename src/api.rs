use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};

use crate::error::Error;
use crate::items;
use crate::models::{Item, MovementRow};
use crate::movements::{self, NewMovement};
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
}

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub name: String,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct CreateLogRequest {
    pub item_id: i32,
    #[serde(rename = "type")]
    pub kind: String,
    pub qty: i32,
    pub date: String,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/items", post(create_item).get(list_items))
        .route("/items/:id", put(update_item).delete(delete_item))
        .route("/logs", post(create_log).get(list_logs))
        .route("/logs/:id", delete(delete_log))
        .route("/health", get(health_check))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

/// Malformed or field-missing bodies map to 400, not axum's default 422.
fn bad_request(rejection: JsonRejection) -> Error {
    Error::Validation(rejection.body_text())
}

async fn create_item(
    State(state): State<AppState>,
    body: Result<Json<CreateItemRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), Error> {
    let Json(body) = body.map_err(bad_request)?;
    items::create_item(&state.store, body.name, body.quantity).await?;
    Ok((StatusCode::CREATED, Json(json!({ "message": "Item added" }))))
}

async fn list_items(State(state): State<AppState>) -> Result<Json<Vec<Item>>, Error> {
    Ok(Json(items::list_items(&state.store).await?))
}

async fn update_item(
    State(state): State<AppState>,
    Path(item_id): Path<i32>,
    body: Result<Json<UpdateItemRequest>, JsonRejection>,
) -> Result<Json<Value>, Error> {
    let Json(body) = body.map_err(bad_request)?;
    if body.quantity < 0 {
        return Err(Error::Validation("quantity must not be negative".into()));
    }
    items::update_item_quantity(&state.store, item_id, body.quantity).await?;
    Ok(Json(json!({ "message": "Item updated" })))
}

async fn delete_item(
    State(state): State<AppState>,
    Path(item_id): Path<i32>,
) -> Result<Json<Value>, Error> {
    items::delete_item(&state.store, item_id).await?;
    Ok(Json(json!({ "message": "Item deleted" })))
}

async fn create_log(
    State(state): State<AppState>,
    body: Result<Json<CreateLogRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), Error> {
    let Json(body) = body.map_err(bad_request)?;
    movements::record_movement(
        &state.store,
        NewMovement {
            item_id: body.item_id,
            kind: body.kind,
            qty: body.qty,
            date: body.date,
        },
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Log recorded and inventory updated" })),
    ))
}

async fn list_logs(State(state): State<AppState>) -> Result<Json<Vec<MovementRow>>, Error> {
    Ok(Json(movements::list_movements(&state.store).await?))
}

async fn delete_log(
    State(state): State<AppState>,
    Path(log_id): Path<i32>,
) -> Result<Json<Value>, Error> {
    movements::delete_movement(&state.store, log_id).await?;
    Ok(Json(json!({ "message": "Log deleted" })))
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::store::testing::open_temp;

    fn test_app() -> (Router, tempfile::TempDir) {
        let (store, dir) = open_temp();
        (create_router(AppState { store }), dir)
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(v) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(v.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn item_crud_over_http() {
        let (app, _dir) = test_app();

        let (status, body) = send(
            &app,
            Method::POST,
            "/items",
            Some(json!({ "name": "Bolt", "quantity": 10 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Item added");

        let (status, body) = send(&app, Method::GET, "/items", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["name"], "Bolt");
        assert_eq!(body[0]["quantity"], 10);
        let id = body[0]["item_id"].as_i64().unwrap();

        let (status, body) = send(
            &app,
            Method::PUT,
            &format!("/items/{id}"),
            Some(json!({ "quantity": 4 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Item updated");

        let (status, _) = send(&app, Method::DELETE, &format!("/items/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(&app, Method::GET, "/items", None).await;
        assert_eq!(body.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn missing_fields_are_bad_requests() {
        let (app, _dir) = test_app();

        let (status, body) = send(&app, Method::POST, "/items", Some(json!({ "name": "Bolt" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, _) = send(
            &app,
            Method::POST,
            "/logs",
            Some(json!({ "item_id": 1, "qty": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn updating_an_unknown_item_is_a_silent_ok() {
        let (app, _dir) = test_app();

        let (status, _) = send(
            &app,
            Method::PUT,
            "/items/999",
            Some(json!({ "quantity": 5 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn movement_statuses_follow_the_contract() {
        let (app, _dir) = test_app();

        send(
            &app,
            Method::POST,
            "/items",
            Some(json!({ "name": "Bolt", "quantity": 10 })),
        )
        .await;
        let (_, body) = send(&app, Method::GET, "/items", None).await;
        let id = body[0]["item_id"].as_i64().unwrap();

        let (status, _) = send(
            &app,
            Method::POST,
            "/logs",
            Some(json!({ "item_id": id, "type": "OUT", "qty": 3, "date": "2024-01-01" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(
            &app,
            Method::POST,
            "/logs",
            Some(json!({ "item_id": id, "type": "OUT", "qty": 100, "date": "2024-01-02" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Not enough stock");

        let (status, body) = send(
            &app,
            Method::POST,
            "/logs",
            Some(json!({ "item_id": id, "type": "SIDEWAYS", "qty": 1, "date": "2024-01-03" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid type");

        let (status, body) = send(
            &app,
            Method::POST,
            "/logs",
            Some(json!({ "item_id": 999, "type": "IN", "qty": 1, "date": "2024-01-03" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Item not found");

        let (status, body) = send(&app, Method::GET, "/logs", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["name"], "Bolt");
        assert_eq!(body[0]["type"], "OUT");
        assert_eq!(body[0]["qty"], 3);

        let log_id = body[0]["log_id"].as_i64().unwrap();
        let (status, body) = send(&app, Method::DELETE, &format!("/logs/{log_id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Log deleted");

        // Deleting the log does not roll the quantity back.
        let (_, body) = send(&app, Method::GET, "/items", None).await;
        assert_eq!(body[0]["quantity"], 7);
    }

    #[tokio::test]
    async fn health_endpoint_responds() {
        let (app, _dir) = test_app();

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
