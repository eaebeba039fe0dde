#[cfg(test)]
mod routes {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
        Router,
    };
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
    use rentals::{
        config::create_test_config,
        db::{MemoryRepository, Repository},
        geocoder::Geocoder,
        models::location::{Address, Coordinates},
        web::{router, AppState},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    struct FixedGeocoder;

    #[async_trait]
    impl Geocoder for FixedGeocoder {
        async fn geocode(&self, _address: &Address) -> anyhow::Result<Coordinates> {
            Ok(Coordinates::new(-118.2437, 34.0522))
        }
    }

    fn app() -> (Router, Arc<MemoryRepository>) {
        let repo = Arc::new(MemoryRepository::new());
        let state = AppState {
            config: Arc::new(create_test_config()),
            repo: repo.clone(),
            geocoder: Arc::new(FixedGeocoder),
        };
        (router(state), repo)
    }

    fn token(sub: &str, role: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(json!({ "alg": "none" }).to_string());
        let claims = URL_SAFE_NO_PAD.encode(json!({ "sub": sub, "custom:role": role }).to_string());
        format!("Bearer {header}.{claims}.")
    }

    fn request(method: Method, uri: &str, auth: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
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
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn property_body() -> Value {
        json!({
            "name": "Sunset Villa",
            "description": "Ocean view",
            "pricePerMonth": "1500",
            "securityDeposit": "500",
            "applicationFee": "50",
            "amenities": "Pool,Gym",
            "isPetsAllowed": "true",
            "beds": "2",
            "baths": "1.5",
            "squareFeet": "900",
            "propertyType": "Villa",
            "managerCognitoId": "manager-1",
            "address": "1 Ocean Ave",
            "city": "Los Angeles",
            "state": "CA",
            "country": "United States",
            "postalCode": "90012"
        })
    }

    fn profile_body(cognito_id: &str) -> Value {
        json!({
            "cognitoId": cognito_id,
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "phoneNumber": "555-0100"
        })
    }

    #[tokio::test]
    async fn root_says_hello() {
        let (app, _) = app();
        let response = app
            .oneshot(request(Method::GET, "/", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"Hello World");
    }

    #[tokio::test]
    async fn preflight_gets_cors_headers() {
        let (app, _) = app();
        let response = app
            .oneshot(request(Method::OPTIONS, "/properties", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }

    #[tokio::test]
    async fn property_search_is_public() {
        let (app, _) = app();
        let (status, body) = send(&app, request(Method::GET, "/properties", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn malformed_search_is_a_server_error() {
        let (app, _) = app();
        let (status, body) = send(
            &app,
            request(Method::GET, "/properties?priceMin=abc", None, None),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "message": "Error getting properties" }));
    }

    #[tokio::test]
    async fn auth_errors_have_messages() {
        let (app, _) = app();

        let (status, _) = send(
            &app,
            request(Method::POST, "/properties", None, Some(property_body())),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(
            &app,
            request(
                Method::POST,
                "/tenants",
                Some(&token("manager-1", "manager")),
                Some(profile_body("manager-1")),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, json!({ "message": "Access denied" }));

        let (status, body) = send(
            &app,
            request(Method::GET, "/tenants/t-1", Some("Bearer nonsense"), None),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "message": "Invalid token" }));
    }

    #[tokio::test]
    async fn manager_creates_geocoded_property() {
        let (app, _) = app();
        let manager = token("manager-1", "manager");

        let (status, body) = send(
            &app,
            request(Method::POST, "/properties", Some(&manager), Some(property_body())),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["pricePerMonth"], json!(1500.0));
        assert_eq!(body["amenities"], json!(["Pool", "Gym"]));
        assert_eq!(body["location"]["coordinates"]["longitude"], json!(-118.2437));
        assert_eq!(body["location"]["postalCode"], json!("90012"));

        let id = body["id"].as_i64().unwrap();
        let (status, fetched) =
            send(&app, request(Method::GET, &format!("/properties/{id}"), None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, body);

        let (status, _) = send(&app, request(Method::GET, "/properties/999", None, None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn out_of_range_counts_are_rejected() {
        let (app, repo) = app();
        let manager = token("manager-1", "manager");

        for (field, value) in [("beds", "4294967299"), ("squareFeet", "-3000000000")] {
            let mut body = property_body();
            body[field] = json!(value);
            let (status, _) = send(
                &app,
                request(Method::POST, "/properties", Some(&manager), Some(body)),
            )
            .await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        }
        assert!(repo.get_property(1).unwrap().is_none());

        let mut body = property_body();
        body["beds"] = json!(2147483647);
        let (status, created) = send(
            &app,
            request(Method::POST, "/properties", Some(&manager), Some(body)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["beds"], json!(2147483647));
    }

    #[tokio::test]
    async fn tenant_favorites_over_http() {
        let (app, _) = app();
        let manager = token("manager-1", "manager");
        let tenant = token("tenant-1", "tenant");

        send(&app, request(Method::POST, "/properties", Some(&manager), Some(property_body()))).await;
        let (status, _) = send(
            &app,
            request(Method::POST, "/tenants", Some(&tenant), Some(profile_body("tenant-1"))),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(
            &app,
            request(Method::POST, "/tenants/tenant-1/favorites/1", Some(&tenant), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["favorites"].as_array().map(Vec::len), Some(1));

        let (status, body) = send(
            &app,
            request(Method::POST, "/tenants/tenant-1/favorites/1", Some(&tenant), None),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body, json!({ "message": "Property already added as favorite" }));

        let (status, body) = send(
            &app,
            request(Method::DELETE, "/tenants/tenant-1/favorites/1", Some(&tenant), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["favorites"], json!([]));
    }

    #[tokio::test]
    async fn application_approval_flow() {
        let (app, repo) = app();
        let manager = token("manager-1", "manager");
        let tenant = token("tenant-1", "tenant");

        send(&app, request(Method::POST, "/managers", Some(&manager), Some(profile_body("manager-1")))).await;
        send(&app, request(Method::POST, "/tenants", Some(&tenant), Some(profile_body("tenant-1")))).await;
        send(&app, request(Method::POST, "/properties", Some(&manager), Some(property_body()))).await;

        let (status, created) = send(
            &app,
            request(
                Method::POST,
                "/applications",
                Some(&tenant),
                Some(json!({
                    "applicationDate": "2024-01-15T12:00:00Z",
                    "propertyId": 1,
                    "tenantCognitoId": "tenant-1",
                    "name": "Ada Lovelace",
                    "email": "ada@example.com",
                    "phoneNumber": "555-0100",
                    "message": "Can I bring my cat?"
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["status"], json!("Pending"));
        assert_eq!(created["property"]["name"], json!("Sunset Villa"));
        let id = created["id"].as_i64().unwrap();
        let leases_before = repo.list_leases().unwrap().len();

        let status_uri = format!("/applications/{id}/status");
        let (status, _) = send(
            &app,
            request(Method::PUT, &status_uri, Some(&tenant), Some(json!({ "status": "Approved" }))),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, approved) = send(
            &app,
            request(Method::PUT, &status_uri, Some(&manager), Some(json!({ "status": "Approved" }))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(approved["status"], json!("Approved"));
        assert_eq!(approved["lease"]["rent"], json!(1500.0));
        assert_eq!(repo.list_leases().unwrap().len(), leases_before + 1);

        let (status, _) = send(
            &app,
            request(Method::PUT, &status_uri, Some(&manager), Some(json!({ "status": "Denied" }))),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(repo.list_leases().unwrap().len(), leases_before + 1);

        let (status, listed) = send(
            &app,
            request(
                Method::GET,
                "/applications?userId=tenant-1&userType=tenant",
                Some(&tenant),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed[0]["property"]["address"], json!("1 Ocean Ave"));
        assert!(listed[0]["lease"]["nextPaymentDate"].is_string());

        let (status, residences) = send(
            &app,
            request(Method::GET, "/tenants/tenant-1/current-residences", Some(&tenant), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(residences.as_array().map(Vec::len), Some(1));

        let (status, managed) = send(
            &app,
            request(Method::GET, "/managers/manager-1/properties", Some(&manager), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(managed.as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn leases_are_visible_to_both_roles() {
        let (app, _) = app();
        for role in ["tenant", "manager"] {
            let (status, body) = send(
                &app,
                request(Method::GET, "/leases", Some(&token("u-1", role)), None),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, json!([]));
        }

        let (status, body) = send(
            &app,
            request(Method::GET, "/leases/1/payments", Some(&token("u-1", "tenant")), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn profile_updates_return_not_found_for_strangers() {
        let (app, _) = app();
        let manager = token("manager-1", "manager");

        let (status, body) = send(
            &app,
            request(Method::PUT, "/managers/ghost", Some(&manager), Some(json!({ "name": "Nobody" }))),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "message": "Manager not found" }));
    }
}
