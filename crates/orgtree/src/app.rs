use std::time::Duration;

use axum::{
    http::{header, Method, StatusCode},
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    handlers::{
        groups::{
            create_group, delete_group, get_ancestors, get_group, get_subtree, list_groups,
            update_group,
        },
        health::{healthz, livez},
        persons::{create_person, delete_person, get_person, list_persons, update_person},
    },
    state::AppState,
};

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    // CORS configuration for API endpoints
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    let api_routes = Router::new()
        // Group routes
        .route("/groups", get(list_groups).post(create_group))
        .route(
            "/groups/{id}",
            get(get_group).put(update_group).delete(delete_group),
        )
        .route("/groups/{id}/ancestors", get(get_ancestors))
        .route("/groups/{id}/subtree", get(get_subtree))
        // Person routes
        .route("/persons", get(list_persons).post(create_person))
        .route(
            "/persons/{id}",
            get(get_person).put(update_person).delete(delete_person),
        )
        .layer(cors);

    Router::new()
        .route("/livez", get(livez))
        .route("/healthz", get(healthz))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(10),
        ))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::hierarchy::testing::{MockCache, MockStore};

    async fn scenario_app() -> Router {
        let state = AppState::for_tests(MockStore::scenario().await, Arc::new(MockCache::default()));
        create_app(state)
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_livez() {
        let app = scenario_app().await;

        let response = app.oneshot(get_request("/livez")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_healthz_probes_cache() {
        let app = scenario_app().await;

        let response = app.oneshot(get_request("/healthz")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["cache"], "ok");
    }

    #[tokio::test]
    async fn test_ancestors_endpoint() {
        let app = scenario_app().await;

        let response = app
            .oneshot(get_request("/api/groups/2/ancestors"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({
                "id": 2,
                "groupName": "Child",
                "parentGroup": [{"id": 1, "groupName": "Root", "parentGroup": []}]
            })
        );
    }

    #[tokio::test]
    async fn test_subtree_endpoint_applies_filters() {
        let app = scenario_app().await;

        let response = app
            .oneshot(get_request("/api/groups/1/subtree?jobTitle=eng"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["id"], 1);
        assert_eq!(json["persons"], serde_json::json!([]));
        assert_eq!(json["groups"][0]["id"], 2);
        assert_eq!(json["groups"][0]["persons"][0]["firstName"], "Alice");
        assert_eq!(json["groups"][0]["persons"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_subtree_unknown_filter_is_bad_request() {
        let app = scenario_app().await;

        let response = app
            .oneshot(get_request("/api/groups/1/subtree?salary=100"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_group_is_not_found() {
        let app = scenario_app().await;

        let response = app
            .clone()
            .oneshot(get_request("/api/groups/999/ancestors"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(get_request("/api/groups/999/subtree"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cyclic_move_is_bad_request() {
        let app = scenario_app().await;

        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                "/api/groups/1",
                serde_json::json!({"parentGroupId": 2}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(get_request("/api/groups/1/ancestors"))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["parentGroup"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_create_group_and_read_chain() {
        let app = scenario_app().await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/groups",
                serde_json::json!({"groupName": "Team", "parentGroupId": 2}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let group = body_json(response).await;
        assert_eq!(group["groupName"], "Team");
        let id = group["id"].as_i64().unwrap();

        let response = app
            .oneshot(get_request(&format!("/api/groups/{id}/ancestors")))
            .await
            .unwrap();
        let chain = body_json(response).await;
        assert_eq!(chain["parentGroup"][0]["id"], 2);
        assert_eq!(chain["parentGroup"][0]["parentGroup"][0]["id"], 1);
    }

    #[tokio::test]
    async fn test_create_group_with_unknown_parent() {
        let app = scenario_app().await;

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/groups",
                serde_json::json!({"groupName": "Team", "parentGroupId": 42}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_body_field_is_bad_request() {
        let app = scenario_app().await;

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/persons",
                serde_json::json!({"firstName": "A", "lastName": "B", "jobTitle": "eng", "salary": 1}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_person_lifecycle_refreshes_subtree() {
        let app = scenario_app().await;

        // Warm the cache
        let response = app
            .clone()
            .oneshot(get_request("/api/groups/1/subtree?jobTitle=eng"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/persons",
                serde_json::json!({
                    "firstName": "Carol",
                    "lastName": "White",
                    "jobTitle": "eng",
                    "groupId": 1
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let person_id = body_json(response).await["id"].as_i64().unwrap();

        let response = app
            .clone()
            .oneshot(get_request("/api/groups/1/subtree?jobTitle=eng"))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["persons"][0]["firstName"], "Carol");

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/persons/{person_id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .oneshot(get_request(&format!("/api/persons/{person_id}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_group_detaches_members() {
        let app = scenario_app().await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/groups/2")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .clone()
            .oneshot(get_request("/api/groups/1/subtree"))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["groups"], serde_json::json!([]));

        let response = app.oneshot(get_request("/api/persons/1")).await.unwrap();
        assert_eq!(body_json(response).await["groupId"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_list_endpoints() {
        let app = scenario_app().await;

        let response = app.clone().oneshot(get_request("/api/groups")).await.unwrap();
        assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);

        let response = app.oneshot(get_request("/api/persons")).await.unwrap();
        assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);
    }
}
