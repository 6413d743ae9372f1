//! services/api/tests/api.rs
//!
//! End-to-end tests over the full router, backed by the in-memory store and
//! stubbed providers.

use api_lib::{
    config::Config,
    web::{app, state::AppState},
};
use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::{
    multipart::{MultipartForm, Part},
    TestServer,
};
use chrono::{Duration, Utc};
use sales_deck_core::{
    ports::{
        DatabaseService, PortError, PortResult, SessionExchangeService, TextGenerationService,
    },
    AuthSession, ExternalIdentity, InMemoryDatabase, User,
};
use serde_json::{json, Value};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

//=========================================================================================
// Stub providers
//=========================================================================================

/// Accepts any session id except `bogus`; the id doubles as the user's handle.
#[derive(Default)]
struct StubExchange {
    issued: AtomicUsize,
}

#[async_trait]
impl SessionExchangeService for StubExchange {
    async fn exchange_session(&self, session_id: &str) -> PortResult<ExternalIdentity> {
        if session_id == "bogus" {
            return Err(PortError::Rejected("status 404".to_string()));
        }
        let n = self.issued.fetch_add(1, Ordering::SeqCst);
        Ok(ExternalIdentity {
            id: format!("ext-{}", session_id),
            email: format!("{}@example.com", session_id),
            name: session_id.to_string(),
            picture: String::new(),
            session_token: format!("tok-{}-{}", session_id, n),
        })
    }
}

enum Script {
    Answer(String),
    Fail,
}

struct StubGenerator {
    script: Script,
    calls: AtomicUsize,
}

#[async_trait]
impl TextGenerationService for StubGenerator {
    async fn generate_text(&self, _system: &str, _prompt: &str) -> PortResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            Script::Answer(text) => Ok(text.clone()),
            Script::Fail => Err(PortError::Unexpected("connection reset".to_string())),
        }
    }
}

const VALID_DECK: &str = r#"```json
{"title": "Acme Pitch", "slides": [
  {"type": "title", "title": "Acme x Us", "subtitle": "Better shelves"},
  {"type": "roi", "title": "Returns", "metrics": [{"label": "Cost", "value": "-30%"}]}
]}
```"#;

//=========================================================================================
// Harness
//=========================================================================================

struct Harness {
    server: TestServer,
    db: Arc<InMemoryDatabase>,
    generator: Arc<StubGenerator>,
}

fn harness_with(script: Script) -> Harness {
    let config = Arc::new(Config::from_lookup(|_| None).expect("default config"));
    let db = Arc::new(InMemoryDatabase::new());
    let generator = Arc::new(StubGenerator {
        script,
        calls: AtomicUsize::new(0),
    });
    let state = Arc::new(AppState::new(
        config,
        db.clone(),
        Arc::new(StubExchange::default()),
        generator.clone(),
    ));
    let router = app(state).expect("router");
    Harness {
        server: TestServer::new(router).expect("test server"),
        db,
        generator,
    }
}

fn harness() -> Harness {
    harness_with(Script::Answer(VALID_DECK.to_string()))
}

fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

impl Harness {
    async fn login(&self, session_id: &str) -> String {
        let response = self
            .server
            .post("/api/auth/session")
            .multipart(MultipartForm::new().add_text("session_id", session_id))
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        body["session_token"]
            .as_str()
            .expect("session token")
            .to_string()
    }

    async fn create_client(&self, token: &str, name: &str) -> Value {
        let response = self
            .server
            .post("/api/clients")
            .add_header("authorization", bearer(token))
            .json(&json!({
                "name": name,
                "industry": "Retail",
                "description": "Regional grocery chain"
            }))
            .await;
        response.assert_status(StatusCode::OK);
        response.json()
    }

    async fn create_lead(&self, token: &str, client_id: &str) -> Value {
        let response = self
            .server
            .post("/api/leads")
            .add_header("authorization", bearer(token))
            .json(&json!({
                "client_id": client_id,
                "project_scope": "Inventory forecasting",
                "notes": "Budget approved for Q3"
            }))
            .await;
        response.assert_status(StatusCode::OK);
        response.json()
    }
}

fn detail(response: &axum_test::TestResponse) -> String {
    let body: Value = response.json();
    body["detail"].as_str().unwrap_or_default().to_string()
}

//=========================================================================================
// Operational surface
//=========================================================================================

#[tokio::test]
async fn health_is_public() {
    let h = harness();
    let response = h.server.get("/health").await;
    response.assert_status(StatusCode::OK);
    response.assert_json(&json!({ "status": "ok" }));
}

#[tokio::test]
async fn openapi_document_is_served() {
    let h = harness();
    let response = h.server.get("/api-docs/openapi.json").await;
    response.assert_status(StatusCode::OK);
    let doc: Value = response.json();
    assert!(doc["paths"]["/api/decks/generate"].is_object());
}

//=========================================================================================
// Authentication
//=========================================================================================

#[tokio::test]
async fn protected_routes_require_a_credential() {
    let h = harness();
    for path in ["/api/auth/me", "/api/clients", "/api/assets", "/api/leads", "/api/decks"] {
        let response = h.server.get(path).await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(detail(&response), "Not authenticated", "{}", path);
    }

    let id = "6f1c2a52-8d0e-4b6e-9a57-0c3a1f9e7b21";
    let writes = [
        h.server.post("/api/clients").json(&json!({"name": "Acme"})).await,
        h.server.post("/api/assets").json(&json!({"type": "general"})).await,
        h.server
            .post("/api/assets/upload")
            .multipart(
                MultipartForm::new()
                    .add_text("type", "general")
                    .add_text("name", "Notes")
                    .add_part("file", Part::bytes("hi".as_bytes()).file_name("notes.txt")),
            )
            .await,
        h.server.post("/api/leads").json(&json!({"client_id": id})).await,
        h.server.post("/api/decks/generate").json(&json!({"lead_id": id})).await,
        h.server
            .patch(&format!("/api/leads/{}", id))
            .json(&json!({"status": "won"}))
            .await,
        h.server
            .patch(&format!("/api/clients/{}", id))
            .json(&json!({"name": "Other"}))
            .await,
        h.server.delete(&format!("/api/clients/{}", id)).await,
        h.server.delete(&format!("/api/assets/{}", id)).await,
        h.server.delete(&format!("/api/leads/{}", id)).await,
    ];
    for (i, response) in writes.iter().enumerate() {
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(detail(response), "Not authenticated", "write #{}", i);
    }
}

#[tokio::test]
async fn login_sets_cookie_and_token_works_both_ways() {
    let h = harness();
    let response = h
        .server
        .post("/api/auth/session")
        .multipart(MultipartForm::new().add_text("session_id", "ada"))
        .await;
    response.assert_status(StatusCode::OK);

    let set_cookie = response.header("set-cookie");
    let set_cookie = set_cookie.to_str().expect("ascii cookie");
    assert!(set_cookie.starts_with("session_token=tok-ada-0;"));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=None"));
    assert!(set_cookie.contains("Max-Age=604800"));

    let body: Value = response.json();
    assert_eq!(body["success"], json!(true));
    let token = body["session_token"].as_str().expect("token");

    let via_bearer = h
        .server
        .get("/api/auth/me")
        .add_header("authorization", bearer(token))
        .await;
    via_bearer.assert_status(StatusCode::OK);
    let me: Value = via_bearer.json();
    assert_eq!(me["email"], json!("ada@example.com"));
    assert_eq!(me["id"], json!("ext-ada"));

    let via_cookie = h
        .server
        .get("/api/auth/me")
        .add_header("cookie", format!("session_token={}", token))
        .await;
    via_cookie.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn urlencoded_login_is_accepted() {
    let h = harness();
    let response = h
        .server
        .post("/api/auth/session")
        .form(&[("session_id", "grace")])
        .await;
    response.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn repeated_login_reuses_the_user() {
    let h = harness();
    let first = h.login("ada").await;
    let second = h.login("ada").await;
    assert_ne!(first, second);

    for token in [&first, &second] {
        let me: Value = h
            .server
            .get("/api/auth/me")
            .add_header("authorization", bearer(token))
            .await
            .json();
        assert_eq!(me["id"], json!("ext-ada"));
    }
}

#[tokio::test]
async fn rejected_session_id_is_a_bad_request() {
    let h = harness();
    let response = h
        .server
        .post("/api/auth/session")
        .multipart(MultipartForm::new().add_text("session_id", "bogus"))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(detail(&response), "Invalid session ID");
}

#[tokio::test]
async fn cookie_wins_over_bearer() {
    let h = harness();
    let ada = h.login("ada").await;
    let bob = h.login("bob").await;

    let me: Value = h
        .server
        .get("/api/auth/me")
        .add_header("cookie", format!("session_token={}", ada))
        .add_header("authorization", bearer(&bob))
        .await
        .json();
    assert_eq!(me["id"], json!("ext-ada"));

    // An unknown cookie is not rescued by a valid bearer token.
    let response = h
        .server
        .get("/api/auth/me")
        .add_header("cookie", "session_token=stale")
        .add_header("authorization", bearer(&bob))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(detail(&response), "Invalid session");
}

#[tokio::test]
async fn expired_session_is_refused() {
    let h = harness();
    let now = Utc::now();
    h.db.insert_user(&User {
        id: "old-user".to_string(),
        email: "old@example.com".to_string(),
        name: "Old".to_string(),
        picture: String::new(),
        created_at: now - Duration::days(30),
    })
    .await
    .expect("insert user");
    h.db.insert_auth_session(&AuthSession {
        session_token: "expired-tok".to_string(),
        user_id: "old-user".to_string(),
        expires_at: now - Duration::minutes(1),
        created_at: now - Duration::days(8),
    })
    .await
    .expect("insert session");

    let response = h
        .server
        .get("/api/auth/me")
        .add_header("authorization", bearer("expired-tok"))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(detail(&response), "Session expired");
}

#[tokio::test]
async fn logout_invalidates_the_session_and_clears_the_cookie() {
    let h = harness();
    let token = h.login("ada").await;

    let response = h
        .server
        .post("/api/auth/logout")
        .add_header("cookie", format!("session_token={}", token))
        .await;
    response.assert_status(StatusCode::OK);
    response.assert_json(&json!({ "success": true }));
    let cleared = response.header("set-cookie");
    assert!(cleared.to_str().expect("ascii").contains("Max-Age=0"));

    let after = h
        .server
        .get("/api/auth/me")
        .add_header("authorization", bearer(&token))
        .await;
    after.assert_status(StatusCode::UNAUTHORIZED);

    // Logging out again, or without any cookie, still succeeds.
    h.server
        .post("/api/auth/logout")
        .add_header("cookie", format!("session_token={}", token))
        .await
        .assert_status(StatusCode::OK);
    h.server
        .post("/api/auth/logout")
        .await
        .assert_status(StatusCode::OK);
}

//=========================================================================================
// Clients and leads
//=========================================================================================

#[tokio::test]
async fn won_lead_keeps_its_other_fields() {
    let h = harness();
    let token = h.login("ada").await;
    let client = h.create_client(&token, "Acme").await;
    let client_id = client["id"].as_str().expect("client id");

    let lead = h.create_lead(&token, client_id).await;
    assert_eq!(lead["client_name"], json!("Acme"));
    assert_eq!(lead["status"], json!("active"));
    let lead_id = lead["id"].as_str().expect("lead id");

    let response = h
        .server
        .patch(&format!("/api/leads/{}", lead_id))
        .add_header("authorization", bearer(&token))
        .json(&json!({ "status": "won" }))
        .await;
    response.assert_status(StatusCode::OK);
    let updated: Value = response.json();
    assert_eq!(updated["status"], json!("won"));
    assert_eq!(updated["project_scope"], lead["project_scope"]);
    assert_eq!(updated["notes"], lead["notes"]);
    assert_eq!(updated["client_id"], lead["client_id"]);
    assert_eq!(updated["client_name"], json!("Acme"));
    assert_eq!(updated["created_at"], lead["created_at"]);
}

#[tokio::test]
async fn invalid_lead_status_is_a_bad_request() {
    let h = harness();
    let token = h.login("ada").await;
    let client = h.create_client(&token, "Acme").await;
    let lead = h.create_lead(&token, client["id"].as_str().expect("id")).await;

    let response = h
        .server
        .patch(&format!("/api/leads/{}", lead["id"].as_str().expect("id")))
        .add_header("authorization", bearer(&token))
        .json(&json!({ "status": "pending" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_patches_are_rejected() {
    let h = harness();
    let token = h.login("ada").await;
    let client = h.create_client(&token, "Acme").await;
    let client_id = client["id"].as_str().expect("id");
    let lead = h.create_lead(&token, client_id).await;

    for path in [
        format!("/api/clients/{}", client_id),
        format!("/api/leads/{}", lead["id"].as_str().expect("id")),
    ] {
        let response = h
            .server
            .patch(&path)
            .add_header("authorization", bearer(&token))
            .json(&json!({}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(detail(&response), "No data to update");
    }
}

#[tokio::test]
async fn other_users_records_are_invisible() {
    let h = harness();
    let ada = h.login("ada").await;
    let bob = h.login("bob").await;
    let client = h.create_client(&ada, "Acme").await;
    let client_id = client["id"].as_str().expect("id");

    let listed: Value = h
        .server
        .get("/api/clients")
        .add_header("authorization", bearer(&bob))
        .await
        .json();
    assert_eq!(listed, json!([]));

    let patch = h
        .server
        .patch(&format!("/api/clients/{}", client_id))
        .add_header("authorization", bearer(&bob))
        .json(&json!({ "name": "Hijacked" }))
        .await;
    patch.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(detail(&patch), "Client not found");

    h.server
        .delete(&format!("/api/clients/{}", client_id))
        .add_header("authorization", bearer(&bob))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    // Bob cannot attach a lead to Ada's client either.
    let lead = h
        .server
        .post("/api/leads")
        .add_header("authorization", bearer(&bob))
        .json(&json!({ "client_id": client_id, "project_scope": "x", "notes": "y" }))
        .await;
    lead.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(detail(&lead), "Client not found");

    // Ada's client is untouched.
    let mine: Value = h
        .server
        .get("/api/clients")
        .add_header("authorization", bearer(&ada))
        .await
        .json();
    assert_eq!(mine[0]["name"], json!("Acme"));
}

#[tokio::test]
async fn malformed_ids_are_not_found() {
    let h = harness();
    let token = h.login("ada").await;
    for (method, path) in [
        ("patch", "/api/clients/not-a-uuid"),
        ("delete", "/api/clients/not-a-uuid"),
        ("delete", "/api/assets/42"),
        ("delete", "/api/leads/xyz"),
        ("get", "/api/decks/xyz"),
    ] {
        let request = match method {
            "patch" => h.server.patch(path).json(&json!({ "name": "x" })),
            "delete" => h.server.delete(path),
            _ => h.server.get(path),
        };
        let response = request.add_header("authorization", bearer(&token)).await;
        response.assert_status(StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn renaming_a_client_updates_its_leads() {
    let h = harness();
    let token = h.login("ada").await;
    let client = h.create_client(&token, "Acme").await;
    let client_id = client["id"].as_str().expect("id");
    h.create_lead(&token, client_id).await;

    let renamed = h
        .server
        .patch(&format!("/api/clients/{}", client_id))
        .add_header("authorization", bearer(&token))
        .json(&json!({ "name": "Acme Corp" }))
        .await;
    renamed.assert_status(StatusCode::OK);
    let renamed: Value = renamed.json();
    assert_eq!(renamed["industry"], json!("Retail"));

    let leads: Value = h
        .server
        .get("/api/leads")
        .add_header("authorization", bearer(&token))
        .await
        .json();
    assert_eq!(leads[0]["client_name"], json!("Acme Corp"));
}

#[tokio::test]
async fn referenced_client_cannot_be_deleted() {
    let h = harness();
    let token = h.login("ada").await;
    let client = h.create_client(&token, "Acme").await;
    let client_id = client["id"].as_str().expect("id");
    let lead = h.create_lead(&token, client_id).await;

    let blocked = h
        .server
        .delete(&format!("/api/clients/{}", client_id))
        .add_header("authorization", bearer(&token))
        .await;
    blocked.assert_status(StatusCode::CONFLICT);

    h.server
        .delete(&format!("/api/leads/{}", lead["id"].as_str().expect("id")))
        .add_header("authorization", bearer(&token))
        .await
        .assert_status(StatusCode::OK);

    let deleted = h
        .server
        .delete(&format!("/api/clients/{}", client_id))
        .add_header("authorization", bearer(&token))
        .await;
    deleted.assert_status(StatusCode::OK);
    deleted.assert_json(&json!({ "success": true }));

    h.server
        .delete(&format!("/api/clients/{}", client_id))
        .add_header("authorization", bearer(&token))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

//=========================================================================================
// Assets
//=========================================================================================

#[tokio::test]
async fn uploads_keep_text_and_mark_binaries() {
    let h = harness();
    let token = h.login("ada").await;

    let text = h
        .server
        .post("/api/assets/upload")
        .add_header("authorization", bearer(&token))
        .multipart(
            MultipartForm::new()
                .add_text("type", "product_description")
                .add_text("name", "Shelf sensors")
                .add_part(
                    "file",
                    Part::bytes("Sensors that count stock.".as_bytes()).file_name("sensors.txt"),
                ),
        )
        .await;
    text.assert_status(StatusCode::OK);
    let text: Value = text.json();
    assert_eq!(text["type"], json!("product_description"));
    assert_eq!(text["content"], json!("Sensors that count stock."));
    assert_eq!(text["file_name"], json!("sensors.txt"));

    let binary = h
        .server
        .post("/api/assets/upload")
        .add_header("authorization", bearer(&token))
        .multipart(
            MultipartForm::new()
                .add_text("type", "general")
                .add_text("name", "Brochure")
                .add_part(
                    "file",
                    Part::bytes(vec![0xff, 0xfe, 0x00, 0x9f]).file_name("brochure.pdf"),
                ),
        )
        .await;
    binary.assert_status(StatusCode::OK);
    let binary: Value = binary.json();
    assert_eq!(binary["content"], json!("[Binary file: brochure.pdf]"));
    assert_eq!(binary["file_data"], json!("//4Anw=="));
}

#[tokio::test]
async fn upload_without_a_file_is_rejected() {
    let h = harness();
    let token = h.login("ada").await;
    let response = h
        .server
        .post("/api/assets/upload")
        .add_header("authorization", bearer(&token))
        .multipart(
            MultipartForm::new()
                .add_text("type", "general")
                .add_text("name", "Nothing"),
        )
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_json_bodies_are_bad_requests() {
    let h = harness();
    let token = h.login("ada").await;

    let unknown_type = h
        .server
        .post("/api/assets")
        .add_header("authorization", bearer(&token))
        .json(&json!({"type": "brochure", "name": "x", "content": "y"}))
        .await;
    unknown_type.assert_status(StatusCode::BAD_REQUEST);
    assert!(!detail(&unknown_type).is_empty());

    let missing_field = h
        .server
        .post("/api/clients")
        .add_header("authorization", bearer(&token))
        .json(&json!({"name": "Acme"}))
        .await;
    missing_field.assert_status(StatusCode::BAD_REQUEST);
    assert!(!detail(&missing_field).is_empty());

    let not_json = h
        .server
        .post("/api/leads")
        .add_header("authorization", bearer(&token))
        .text("client_id=abc")
        .await;
    not_json.assert_status(StatusCode::BAD_REQUEST);
    assert!(!detail(&not_json).is_empty());

    let listed = h
        .server
        .get("/api/clients")
        .add_header("authorization", bearer(&token))
        .await;
    assert_eq!(listed.json::<Value>(), json!([]));
}

#[tokio::test]
async fn assets_filter_by_type() {
    let h = harness();
    let token = h.login("ada").await;
    for (kind, name) in [("product_description", "Sensors"), ("use_case", "Grocer")] {
        h.server
            .post("/api/assets")
            .add_header("authorization", bearer(&token))
            .json(&json!({ "type": kind, "name": name, "content": "text" }))
            .await
            .assert_status(StatusCode::OK);
    }

    let all: Value = h
        .server
        .get("/api/assets")
        .add_header("authorization", bearer(&token))
        .await
        .json();
    assert_eq!(all.as_array().map(Vec::len), Some(2));

    let use_cases: Value = h
        .server
        .get("/api/assets")
        .add_query_param("asset_type", "use_case")
        .add_header("authorization", bearer(&token))
        .await
        .json();
    assert_eq!(use_cases.as_array().map(Vec::len), Some(1));
    assert_eq!(use_cases[0]["name"], json!("Grocer"));

    h.server
        .get("/api/assets")
        .add_query_param("asset_type", "video")
        .add_header("authorization", bearer(&token))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

//=========================================================================================
// Decks
//=========================================================================================

async fn lead_for(h: &Harness, token: &str) -> String {
    let client = h.create_client(token, "Acme").await;
    let lead = h.create_lead(token, client["id"].as_str().expect("id")).await;
    lead["id"].as_str().expect("id").to_string()
}

#[tokio::test]
async fn generated_deck_is_stored_and_listed() {
    let h = harness();
    let token = h.login("ada").await;
    let lead_id = lead_for(&h, &token).await;

    let response = h
        .server
        .post("/api/decks/generate")
        .add_header("authorization", bearer(&token))
        .json(&json!({ "lead_id": lead_id }))
        .await;
    response.assert_status(StatusCode::OK);
    let deck: Value = response.json();
    assert_eq!(deck["lead_name"], json!("Acme"));
    assert_eq!(deck["content"]["title"], json!("Acme Pitch"));
    assert_eq!(deck["content"]["slides"][1]["type"], json!("roi"));

    let fetched: Value = h
        .server
        .get(&format!("/api/decks/{}", deck["id"].as_str().expect("id")))
        .add_header("authorization", bearer(&token))
        .await
        .json();
    assert_eq!(fetched, deck);

    // Regenerating appends a second deck for the same lead.
    h.server
        .post("/api/decks/generate")
        .add_header("authorization", bearer(&token))
        .json(&json!({ "lead_id": lead_id }))
        .await
        .assert_status(StatusCode::OK);
    let decks: Value = h
        .server
        .get("/api/decks")
        .add_header("authorization", bearer(&token))
        .await
        .json();
    assert_eq!(decks.as_array().map(Vec::len), Some(2));
    assert_eq!(h.generator.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn unparseable_output_stores_the_fallback_deck() {
    let h = harness_with(Script::Answer("Sure! Here is your deck: ...".to_string()));
    let token = h.login("ada").await;
    let lead_id = lead_for(&h, &token).await;

    let response = h
        .server
        .post("/api/decks/generate")
        .add_header("authorization", bearer(&token))
        .json(&json!({ "lead_id": lead_id }))
        .await;
    response.assert_status(StatusCode::OK);
    let deck: Value = response.json();
    assert_eq!(deck["content"]["title"], json!("Sales Presentation for Acme"));
    assert_eq!(deck["content"]["slides"][0]["type"], json!("title"));
    assert_eq!(
        deck["content"]["slides"][0]["subtitle"],
        json!("Transform Your Business")
    );
}

#[tokio::test]
async fn provider_failure_is_a_server_error_and_stores_nothing() {
    let h = harness_with(Script::Fail);
    let token = h.login("ada").await;
    let lead_id = lead_for(&h, &token).await;

    let response = h
        .server
        .post("/api/decks/generate")
        .add_header("authorization", bearer(&token))
        .json(&json!({ "lead_id": lead_id }))
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    let decks: Value = h
        .server
        .get("/api/decks")
        .add_header("authorization", bearer(&token))
        .await
        .json();
    assert_eq!(decks, json!([]));
}

#[tokio::test]
async fn decks_are_scoped_to_their_owner() {
    let h = harness();
    let ada = h.login("ada").await;
    let bob = h.login("bob").await;
    let lead_id = lead_for(&h, &ada).await;

    // Bob cannot generate from Ada's lead.
    let response = h
        .server
        .post("/api/decks/generate")
        .add_header("authorization", bearer(&bob))
        .json(&json!({ "lead_id": lead_id }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(detail(&response), "Lead not found");
    assert_eq!(h.generator.calls.load(Ordering::SeqCst), 0);

    let deck: Value = h
        .server
        .post("/api/decks/generate")
        .add_header("authorization", bearer(&ada))
        .json(&json!({ "lead_id": lead_id }))
        .await
        .json();

    let stolen = h
        .server
        .get(&format!("/api/decks/{}", deck["id"].as_str().expect("id")))
        .add_header("authorization", bearer(&bob))
        .await;
    stolen.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(detail(&stolen), "Deck not found");
}
