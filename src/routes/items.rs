use crate::{
    data::{
        DataType, MutableDataType,
        item::{Item, ItemPayload, ItemUpdate, NewItem},
    },
    error::{MissingItemSnafu, SatchelResult},
    extract::{IdPath, JsonBody},
    state::SatchelState,
};
use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};
use snafu::{OptionExt, ensure};

pub async fn post_item(
    State(state): State<SatchelState>,
    JsonBody(payload): JsonBody<ItemPayload>,
) -> SatchelResult<(StatusCode, Json<Item>)> {
    let new_item = NewItem::try_from(payload)?;
    let (name, description) = (new_item.name.clone(), new_item.description.clone());

    let id = Item::insert_into_database(new_item, &mut *state.get_connection().await?).await?;
    info!(id, "Added item");

    Ok((
        StatusCode::CREATED,
        Json(Item {
            id,
            name: Some(name),
            description,
        }),
    ))
}

pub async fn get_items(State(state): State<SatchelState>) -> SatchelResult<Json<Vec<Item>>> {
    Ok(Json(Item::get_all(&state).await?))
}

pub async fn get_item(
    State(state): State<SatchelState>,
    IdPath(id): IdPath<i32>,
) -> SatchelResult<Json<Item>> {
    let item = Item::get_from_db_by_id(id, &mut *state.get_connection().await?)
        .await?
        .context(MissingItemSnafu { id })?;
    Ok(Json(item))
}

pub async fn put_item(
    State(state): State<SatchelState>,
    IdPath(id): IdPath<i32>,
    JsonBody(payload): JsonBody<ItemPayload>,
) -> SatchelResult<Json<Item>> {
    let update = ItemUpdate::try_from(payload)?;

    let item = Item::update_in_database(id, update, &mut *state.get_connection().await?)
        .await?
        .context(MissingItemSnafu { id })?;
    info!(id, "Updated item");

    Ok(Json(item))
}

pub async fn delete_item(
    State(state): State<SatchelState>,
    IdPath(id): IdPath<i32>,
) -> SatchelResult<Json<Value>> {
    let removed = Item::remove_from_database(id, &mut *state.get_connection().await?).await?;
    ensure!(removed, MissingItemSnafu { id });
    info!(id, "Deleted item");

    Ok(Json(json!({ "message": format!("item {id} deleted successfully") })))
}

#[cfg(test)]
mod tests {
    use crate::routes::test_utils::{app_with_pool, app_without_database, send};
    use axum::{
        Router,
        http::{Method, StatusCode},
    };
    use serde_json::{Value, json};
    use sqlx::PgPool;

    async fn create(app: &Router, body: Value) -> i64 {
        let (status, body) = send(app, Method::POST, "/items", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn create_without_name_is_400() {
        let app = app_without_database();

        for body in [json!({}), json!({"name": ""}), json!({"name": null, "description": "d"})] {
            let (status, body) = send(&app, Method::POST, "/items", Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, json!({"error": "Name is required"}));
        }
    }

    #[tokio::test]
    async fn empty_update_is_400() {
        let app = app_without_database();
        let (status, body) = send(&app, Method::PUT, "/items/1", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({"error": "At least one of name or description is required"})
        );
    }

    #[tokio::test]
    async fn broken_json_is_reported_as_json() {
        let app = app_without_database();
        let request = axum::http::Request::builder()
            .method(Method::POST)
            .uri("/items")
            .header("content-type", "application/json")
            .body(axum::body::Body::from("{\"name\": "))
            .unwrap();

        let response = tower::ServiceExt::oneshot(app, request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn missing_content_type_is_415() {
        let app = app_without_database();
        let (status, body) = send(&app, Method::POST, "/items", None).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn non_numeric_id_is_400() {
        let app = app_without_database();
        for method in [Method::GET, Method::DELETE] {
            let (status, body) = send(&app, method, "/items/twelve", None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(body["error"].is_string());
        }

        let (status, body) = send(
            &app,
            Method::PUT,
            "/items/twelve",
            Some(json!({"name": "spanner"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn oversized_body_is_413_with_json_error() {
        let app = app_without_database();
        let body = json!({"name": "big", "description": "x".repeat(70 * 1024)}).to_string();
        let request = axum::http::Request::builder()
            .method(Method::POST)
            .uri("/items")
            .header("content-type", "application/json")
            .header("content-length", body.len())
            .body(axum::body::Body::from(body))
            .unwrap();

        let response = tower::ServiceExt::oneshot(app, request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn name_longer_than_column_is_400() {
        let app = app_without_database();
        let expected = json!({"error": "`name` must be at most 100 characters"});

        let (status, body) = send(
            &app,
            Method::POST,
            "/items",
            Some(json!({"name": "n".repeat(101)})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, expected);

        let (status, body) = send(
            &app,
            Method::PUT,
            "/items/1",
            Some(json!({"name": "n".repeat(101)})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, expected);
    }

    #[sqlx::test]
    #[ignore = "requires database"]
    async fn create_then_fetch_round_trips(pool: PgPool) {
        let app = app_with_pool(pool);

        let (status, created) = send(
            &app,
            Method::POST,
            "/items",
            Some(json!({"name": "hammer", "description": "for nails"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_i64().unwrap();
        assert_eq!(
            created,
            json!({"id": id, "name": "hammer", "description": "for nails"})
        );

        let (status, fetched) = send(&app, Method::GET, &format!("/items/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);
    }

    #[sqlx::test]
    #[ignore = "requires database"]
    async fn description_is_optional(pool: PgPool) {
        let app = app_with_pool(pool);
        let id = create(&app, json!({"name": "saw"})).await;

        let (_, fetched) = send(&app, Method::GET, &format!("/items/{id}"), None).await;
        assert_eq!(fetched, json!({"id": id, "name": "saw", "description": null}));
    }

    #[sqlx::test]
    #[ignore = "requires database"]
    async fn unknown_id_is_404_everywhere(pool: PgPool) {
        let app = app_with_pool(pool);
        let expected = json!({"error": "Item not found"});

        let (status, body) = send(&app, Method::GET, "/items/424242", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, expected);

        let (status, body) = send(
            &app,
            Method::PUT,
            "/items/424242",
            Some(json!({"name": "ghost"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, expected);

        let (status, body) = send(&app, Method::DELETE, "/items/424242", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, expected);
    }

    #[sqlx::test]
    #[ignore = "requires database"]
    async fn update_with_only_description_keeps_name(pool: PgPool) {
        let app = app_with_pool(pool);
        let id = create(&app, json!({"name": "drill", "description": "cordless"})).await;

        let (status, body) = send(
            &app,
            Method::PUT,
            &format!("/items/{id}"),
            Some(json!({"description": "x"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"id": id, "name": "drill", "description": "x"}));

        let (_, fetched) = send(&app, Method::GET, &format!("/items/{id}"), None).await;
        assert_eq!(fetched, body);
    }

    #[sqlx::test]
    #[ignore = "requires database"]
    async fn null_description_clears_it(pool: PgPool) {
        let app = app_with_pool(pool);
        let id = create(&app, json!({"name": "drill", "description": "cordless"})).await;

        let (status, body) = send(
            &app,
            Method::PUT,
            &format!("/items/{id}"),
            Some(json!({"name": "drill", "description": null})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"id": id, "name": "drill", "description": null}));

        let (_, fetched) = send(&app, Method::GET, &format!("/items/{id}"), None).await;
        assert_eq!(fetched, body);

        //left out entirely, the cleared description stays cleared and the name changes
        let (status, body) = send(
            &app,
            Method::PUT,
            &format!("/items/{id}"),
            Some(json!({"name": "driver"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"id": id, "name": "driver", "description": null}));
    }

    #[sqlx::test]
    #[ignore = "requires database"]
    async fn update_with_both_fields_replaces_both(pool: PgPool) {
        let app = app_with_pool(pool);
        let id = create(&app, json!({"name": "drill", "description": "cordless"})).await;

        let (status, body) = send(
            &app,
            Method::PUT,
            &format!("/items/{id}"),
            Some(json!({"name": "driver", "description": "impact"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"id": id, "name": "driver", "description": "impact"})
        );
    }

    #[sqlx::test]
    #[ignore = "requires database"]
    async fn listing_contains_everything_created(pool: PgPool) {
        let app = app_with_pool(pool);

        let mut ids = Vec::new();
        for n in 0..5 {
            ids.push(create(&app, json!({"name": format!("item {n}")})).await);
        }

        let (status, body) = send(&app, Method::GET, "/items", None).await;
        assert_eq!(status, StatusCode::OK);
        let listed: Vec<i64> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["id"].as_i64().unwrap())
            .collect();
        assert!(listed.len() >= ids.len());
        assert!(ids.iter().all(|id| listed.contains(id)));
    }

    #[sqlx::test]
    #[ignore = "requires database"]
    async fn deleting_twice_is_200_then_404(pool: PgPool) {
        let app = app_with_pool(pool);
        let id = create(&app, json!({"name": "glue"})).await;

        let (status, body) = send(&app, Method::DELETE, &format!("/items/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"message": format!("item {id} deleted successfully")})
        );

        let (status, body) = send(&app, Method::DELETE, &format!("/items/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Item not found"}));
    }
}
