// ============================================================================
// Platform API - Router
// File: crates/platform-api/src/routes.rs
// ============================================================================

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing::warn;

use platform_shared::config::AppSettings;

use crate::auth::require_principal;
use crate::handlers::{clusters, costs, health, tenants};
use crate::state::AppState;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub fn build_router(state: AppState, settings: &AppSettings) -> Router {
    // Public routes (no principal)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Protected routes
    let protected_routes = Router::new()
        .route("/tenants", get(tenants::list_tenants).post(tenants::create_tenant))
        .route("/tenants/{id}", get(tenants::get_tenant).delete(tenants::delete_tenant))
        .route("/tenants/{id}/costs", get(costs::get_tenant_costs))
        .route("/costs/overview", get(costs::get_cost_overview))
        .route("/clusters/{name}/status", get(clusters::get_cluster_status))
        .route("/clusters/{name}/nodes", get(clusters::get_cluster_nodes))
        .route("/clusters/{name}/namespaces", get(clusters::get_cluster_namespaces))
        .route("/clusters/{name}/overview", get(clusters::get_cluster_overview))
        .route_layer(from_fn_with_state(state.clone(), require_principal));

    let api = Router::new().merge(public_routes).merge(protected_routes);

    Router::new()
        .nest("/api/v1", api)
        .with_state(state)
        .layer(cors_layer(settings))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::GATEWAY_TIMEOUT,
            REQUEST_TIMEOUT,
        ))
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Any origin in development, otherwise only the configured one.
fn cors_layer(settings: &AppSettings) -> CorsLayer {
    let origin = if settings.is_development() {
        AllowOrigin::from(Any)
    } else {
        match HeaderValue::from_str(&settings.cors_origin) {
            Ok(value) => AllowOrigin::exact(value),
            Err(e) => {
                warn!(origin = %settings.cors_origin, "Ignoring invalid CORS origin: {}", e);
                AllowOrigin::list(Vec::<HeaderValue>::new())
            }
        }
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use platform_core::clients::{BillingClient, ClusterControlPlane};
    use platform_core::domain::{BillingQuery, ClusterNamespace, ClusterNode, CostGroup};
    use platform_core::repositories::{CatalogStore, InMemoryCatalogStore};
    use platform_core::services::{ClusterService, CostService, CostTags, TenantService};
    use platform_core::DomainError;

    use crate::auth::TokenVerifier;

    const SECRET: &str = "router-test-secret";

    #[derive(Default)]
    struct FakeCluster {
        fail_create: bool,
        created: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ClusterControlPlane for FakeCluster {
        async fn create_namespace(
            &self,
            name: &str,
            _labels: &BTreeMap<String, String>,
        ) -> Result<(), DomainError> {
            if self.fail_create {
                return Err(DomainError::backend("create_namespace", name, "connection refused"));
            }
            self.created.lock().unwrap().push(name.to_string());
            Ok(())
        }
        async fn delete_namespace(&self, _name: &str) -> Result<(), DomainError> {
            Ok(())
        }
        async fn namespace_exists(&self, _name: &str) -> Result<bool, DomainError> {
            Ok(true)
        }
        async fn pod_count(&self, _namespace: &str) -> Result<usize, DomainError> {
            Ok(1)
        }
        async fn service_count(&self, _namespace: &str) -> Result<usize, DomainError> {
            Ok(1)
        }
        async fn deployment_count(&self, _namespace: &str) -> Result<usize, DomainError> {
            Ok(1)
        }
        async fn list_nodes(&self) -> Result<Vec<ClusterNode>, DomainError> {
            Ok(Vec::new())
        }
        async fn list_namespaces(&self) -> Result<Vec<ClusterNamespace>, DomainError> {
            Ok(Vec::new())
        }
        async fn server_version(&self) -> Result<String, DomainError> {
            Ok("v1.29.1".to_string())
        }
        fn endpoint(&self) -> String {
            "https://cluster.test".to_string()
        }
    }

    struct EmptyBilling;

    #[async_trait]
    impl BillingClient for EmptyBilling {
        async fn query_costs(&self, _query: &BillingQuery) -> Result<Vec<CostGroup>, DomainError> {
            Ok(Vec::new())
        }
    }

    fn settings() -> AppSettings {
        AppSettings {
            env: "test".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
            name: "platform-server".to_string(),
            cors_origin: "https://iasolutions.co.uk".to_string(),
        }
    }

    fn router(cluster: Arc<FakeCluster>, auth: bool) -> Router {
        let catalog: Arc<dyn CatalogStore> = Arc::new(InMemoryCatalogStore::new());
        let state = AppState {
            tenants: Arc::new(TenantService::new(catalog.clone(), cluster.clone())),
            costs: Arc::new(CostService::new(
                Arc::new(EmptyBilling),
                catalog.clone(),
                CostTags::default(),
            )),
            clusters: Arc::new(ClusterService::new(cluster)),
            catalog,
            verifier: auth.then(|| Arc::new(TokenVerifier::new(SECRET))),
        };
        build_router(state, &settings())
    }

    fn bearer() -> String {
        let claims = json!({
            "user_id": "u-1",
            "username": "ops",
            "exp": chrono::Utc::now().timestamp() + 600,
        });
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes()))
            .unwrap();
        format!("Bearer {}", token)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header("authorization", bearer())
            .body(Body::empty())
            .unwrap()
    }

    fn create_acme() -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/tenants")
            .header("authorization", bearer())
            .header("content-type", "application/json")
            .body(Body::from(
                json!({ "name": "Acme Co", "owner": "bob", "email": "bob@acme.com" }).to_string(),
            ))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let app = router(Arc::new(FakeCluster::default()), true);
        let request = Request::builder()
            .uri("/api/v1/health")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "healthy");

        let (status, body) = send(&app, get("/api/v1/health/ready")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "ready");
    }

    #[tokio::test]
    async fn test_protected_routes_require_principal() {
        let app = router(Arc::new(FakeCluster::default()), true);
        let request = Request::builder()
            .uri("/api/v1/tenants")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");

        let request = Request::builder()
            .uri("/api/v1/tenants")
            .header("authorization", "Basic Ym9iOnNlY3JldA==")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_auth_disabled_lets_requests_through() {
        let app = router(Arc::new(FakeCluster::default()), false);
        let request = Request::builder()
            .uri("/api/v1/tenants")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["count"], 0);
    }

    #[tokio::test]
    async fn test_create_then_query_costs() {
        let cluster = Arc::new(FakeCluster::default());
        let app = router(cluster.clone(), true);

        let (status, body) = send(&app, create_acme()).await;
        assert_eq!(status, StatusCode::CREATED);
        let tenant = &body["data"]["tenant"];
        assert_eq!(tenant["namespace"], "tenant-acme-co");
        assert_eq!(tenant["status"], "active");
        assert_eq!(*cluster.created.lock().unwrap(), vec!["tenant-acme-co".to_string()]);

        let id = tenant["id"].as_str().unwrap().to_string();
        let (status, body) = send(
            &app,
            get(&format!(
                "/api/v1/tenants/{}/costs?start_date=2024-01-01&end_date=2024-01-31",
                id
            )),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let costs = &body["data"]["costs"];
        assert_eq!(costs["total_cost"], 0.0);
        assert_eq!(costs["services"], json!([]));
        assert_eq!(costs["tenant_name"], "Acme Co");
        assert_eq!(body["data"]["period"], "2024-01-01 to 2024-01-31");

        let (status, body) = send(&app, get(&format!("/api/v1/tenants/{}", id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["tenant"]["resources"]["pods"], 1);
    }

    #[tokio::test]
    async fn test_duplicate_create_is_conflict() {
        let app = router(Arc::new(FakeCluster::default()), true);
        let (status, _) = send(&app, create_acme()).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(&app, create_acme()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn test_cluster_failure_is_503_and_leaves_failed_tenant() {
        let cluster = Arc::new(FakeCluster {
            fail_create: true,
            ..FakeCluster::default()
        });
        let app = router(cluster, true);

        let (status, body) = send(&app, create_acme()).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "BACKEND_UNAVAILABLE");

        let (status, body) = send(&app, get("/api/v1/tenants")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["count"], 1);
        assert_eq!(body["data"]["tenants"][0]["status"], "failed");
    }

    #[tokio::test]
    async fn test_bad_input_is_400_and_unknown_tenant_404() {
        let app = router(Arc::new(FakeCluster::default()), true);

        let (status, body) = send(&app, get("/api/v1/tenants/not-a-uuid")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Invalid tenant ID");

        let (status, body) = send(
            &app,
            get("/api/v1/costs/overview?granularity=WEEKLY"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/tenants")
            .header("authorization", bearer())
            .header("content-type", "application/json")
            .body(Body::from(json!({ "name": "Acme", "owner": "", "email": "x@y.z" }).to_string()))
            .unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &app,
            get("/api/v1/tenants/00000000-0000-0000-0000-000000000000"),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_malformed_cost_query_gets_envelope() {
        let app = router(Arc::new(FakeCluster::default()), true);
        let (status, body) = send(
            &app,
            get("/api/v1/costs/overview?start_date=2024-01-01&start_date=2024-02-01"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, body) = send(
            &app,
            get("/api/v1/tenants/00000000-0000-0000-0000-000000000000/costs?granularity=a&granularity=b"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_cluster_status_echoes_name() {
        let app = router(Arc::new(FakeCluster::default()), true);
        let (status, body) = send(&app, get("/api/v1/clusters/devplatform-dev/status")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "devplatform-dev");
        assert_eq!(body["data"]["status"], "Ready");
        assert_eq!(body["data"]["node_count"], 0);
    }
}
