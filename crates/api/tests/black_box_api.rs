use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;

use stocktally_api::app::{build_app, services::AppServices};
use stocktally_auth::{JwtClaims, Role};
use stocktally_core::AccountId;

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, in-memory storage, ephemeral port.
        let app = build_app(Arc::new(AppServices::in_memory()), JWT_SECRET.to_string());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post(&self, token: &str, path: &str, body: serde_json::Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    async fn get(&self, token: &str, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .unwrap()
    }

    /// Run first-time setup and return the admin's id and a token for it.
    async fn setup_admin(&self) -> (AccountId, String) {
        let res = self
            .client
            .post(self.url("/setup"))
            .json(&json!({ "email": "owner@example.com", "display_name": "Owner" }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: serde_json::Value = res.json().await.unwrap();
        let id: AccountId = body["id"].as_str().unwrap().parse().unwrap();
        (id, mint_jwt(id, Role::Admin))
    }

    /// Register an account through the admin API and return its id and a token.
    async fn register(&self, admin_token: &str, role: Role) -> (AccountId, String) {
        let email = format!("{}@example.com", AccountId::new());
        let res = self
            .post(
                admin_token,
                "/admin/users",
                json!({ "email": email, "display_name": "Bar", "role": role }),
            )
            .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: serde_json::Value = res.json().await.unwrap();
        let id: AccountId = body["id"].as_str().unwrap().parse().unwrap();
        (id, mint_jwt(id, role))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(sub: AccountId, role: Role) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub,
        role,
        issued_at: now - ChronoDuration::seconds(1),
        expires_at: now + ChronoDuration::minutes(10),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

async fn create_liquor(srv: &TestServer, token: &str, name: &str, bottles: i64) -> String {
    let res = srv
        .post(
            token,
            "/liquor",
            json!({ "name": name, "category": "spirits", "bottles": bottles, "milliliters": 0, "threshold": 2 }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn().await;

    let res = srv.client.get(srv.url("/whoami")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = srv.get("not-a-jwt", "/liquor").await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = srv.client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // A well-signed token for an account that does not exist.
    let stranger = mint_jwt(AccountId::new(), Role::Admin);
    let res = srv.get(&stranger, "/admin/users").await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn whoami_reflects_token_role() {
    let srv = TestServer::spawn().await;
    let (_, admin) = srv.setup_admin().await;
    let (sub, staff) = srv.register(&admin, Role::Staff).await;

    let res = srv.get(&staff, "/whoami").await;
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["account_id"], sub.to_string());
    assert_eq!(body["role"], "staff");
    assert_eq!(body["permissions"], json!(["view_inventory", "add_inventory"]));
}

#[tokio::test]
async fn staff_cannot_view_sales_or_edit_items() {
    let srv = TestServer::spawn().await;
    let (_, admin) = srv.setup_admin().await;
    let (_, staff) = srv.register(&admin, Role::Staff).await;

    let id = create_liquor(&srv, &admin, "Gin", 5).await;

    let res = srv.get(&staff, "/stock-movement?date=2024-01-02").await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "forbidden");

    let res = srv
        .client
        .delete(srv.url(&format!("/liquor/{id}")))
        .bearer_auth(&staff)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = srv.get(&staff, "/admin/users").await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Staff may still record stock.
    let res = srv
        .post(
            &staff,
            "/daily-stock",
            json!({ "date": "2024-01-01", "item_id": id, "item_type": "liquor", "bottles": 5 }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn daily_stock_produces_movement() {
    let srv = TestServer::spawn().await;
    let (_, admin) = srv.setup_admin().await;
    let (_, manager) = srv.register(&admin, Role::Manager).await;

    let id = create_liquor(&srv, &manager, "Rum", 5).await;

    for (date, bottles, ml) in [("2024-01-01", 5, 0), ("2024-01-02", 4, 500)] {
        let res = srv
            .post(
                &manager,
                "/daily-stock",
                json!({ "date": date, "item_id": id, "item_type": "liquor", "bottles": bottles, "milliliters": ml }),
            )
            .await;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = srv.get(&manager, "/stock-movement?date=2024-01-02").await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    let movements = body.as_array().unwrap();
    assert_eq!(movements.len(), 1);

    let m = &movements[0];
    assert_eq!(m["item_id"], id);
    assert_eq!(m["previous_stock"]["total_ml"], 3750);
    assert_eq!(m["current_stock"]["total_ml"], 3500);
    assert_eq!(m["difference"]["bottles"], 1);
    assert_eq!(m["difference"]["milliliters"], -500);
    assert_eq!(m["difference"]["total_ml"], 250);
    assert_eq!(m["difference"]["display"], "250ML");
    assert_eq!(m["consumed"], true);

    // Nothing leaks onto the first day.
    let res = srv.get(&manager, "/stock-movement?date=2024-01-01").await;
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body.as_array().unwrap().is_empty());

    let res = srv.get(&manager, "/daily-stock?date=2024-01-02").await;
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["stock"]["display"], "4 bottles and 500ML");
}

#[tokio::test]
async fn daily_stock_rejects_unknown_item_and_bad_shape() {
    let srv = TestServer::spawn().await;
    let (_, admin) = srv.setup_admin().await;

    let res = srv
        .post(
            &admin,
            "/daily-stock",
            json!({ "date": "2024-01-01", "item_id": AccountId::new().to_string(), "item_type": "other", "quantity": 3 }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let id = create_liquor(&srv, &admin, "Vodka", 1).await;
    let res = srv
        .post(
            &admin,
            "/daily-stock",
            json!({ "date": "2024-01-01", "item_id": id, "item_type": "liquor", "bottles": 1, "milliliters": 750 }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn low_stock_alert_lists_item_below_threshold() {
    let srv = TestServer::spawn().await;
    let (_, admin) = srv.setup_admin().await;

    create_liquor(&srv, &admin, "Tequila", 1).await;
    create_liquor(&srv, &admin, "Whisky", 9).await;

    let res = srv.get(&admin, "/alerts/low-stock").await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    let alerts = body.as_array().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["name"], "Tequila");
    assert_eq!(alerts[0]["current_stock"], "1 bottle");
}

#[tokio::test]
async fn setup_creates_first_admin_once() {
    let srv = TestServer::spawn().await;

    let res = srv
        .client
        .post(srv.url("/setup"))
        .json(&json!({ "email": "owner@example.com", "display_name": "Owner" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let admin: serde_json::Value = res.json().await.unwrap();
    assert_eq!(admin["role"], "admin");

    let res = srv
        .client
        .post(srv.url("/setup"))
        .json(&json!({ "email": "intruder@example.com", "display_name": "Nope" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // The admin can now manage users.
    let admin_id: AccountId = admin["id"].as_str().unwrap().parse().unwrap();
    let token = mint_jwt(admin_id, Role::Admin);

    let res = srv
        .post(
            &token,
            "/admin/users",
            json!({ "email": "bar@example.com", "display_name": "Bar", "role": "staff" }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let staff: serde_json::Value = res.json().await.unwrap();
    let staff_id = staff["id"].as_str().unwrap();

    let res = srv
        .client
        .put(srv.url(&format!("/admin/users/{staff_id}/role")))
        .bearer_auth(&token)
        .json(&json!({ "role": "manager" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: serde_json::Value = res.json().await.unwrap();
    assert_eq!(updated["role"], "manager");

    let res = srv
        .client
        .put(srv.url(&format!("/admin/users/{admin_id}/role")))
        .bearer_auth(&token)
        .json(&json!({ "role": "staff" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn role_change_applies_to_existing_tokens() {
    let srv = TestServer::spawn().await;
    let (_, admin) = srv.setup_admin().await;
    let (manager_id, manager) = srv.register(&admin, Role::Manager).await;

    let res = srv.get(&manager, "/stock-movement?date=2024-01-02").await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = srv
        .client
        .put(srv.url(&format!("/admin/users/{manager_id}/role")))
        .bearer_auth(&admin)
        .json(&json!({ "role": "staff" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Same token, still claiming "manager".
    let res = srv.get(&manager, "/stock-movement?date=2024-01-02").await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = srv.get(&manager, "/whoami").await;
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["role"], "staff");
}

#[tokio::test]
async fn token_role_claim_cannot_escalate() {
    let srv = TestServer::spawn().await;
    let (_, admin) = srv.setup_admin().await;
    let (staff_id, _) = srv.register(&admin, Role::Staff).await;

    let forged = mint_jwt(staff_id, Role::Admin);
    let res = srv.get(&forged, "/admin/users").await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}
