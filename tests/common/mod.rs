use actix_web::web;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use taskvault::auth::gateway::ProviderGateway;
use taskvault::auth::{IdentityReconciler, TokenCodec};
use taskvault::config::{Config, OAuthClient, OAuthConfig};
use taskvault::error::AppError;
use taskvault::models::Provider;
use taskvault::store::{AccountStore, MemoryStore, TodoStore};

pub const TEST_SECRET: &str = "integration-test-secret";
pub const FRONTEND_URL: &str = "http://frontend.test";

/// Gateway stub: maps authorization codes to canned user-info payloads, so
/// the federated flow runs end to end without a provider.
pub struct StubGateway {
    payloads: Mutex<HashMap<String, Value>>,
}

#[allow(dead_code)]
impl StubGateway {
    pub fn new() -> Self {
        Self {
            payloads: Mutex::new(HashMap::new()),
        }
    }

    pub fn register(&self, code: &str, payload: Value) {
        self.payloads
            .lock()
            .unwrap()
            .insert(code.to_string(), payload);
    }
}

#[async_trait]
impl ProviderGateway for StubGateway {
    async fn fetch_user_info(&self, _provider: Provider, code: &str) -> Result<Value, AppError> {
        self.payloads
            .lock()
            .unwrap()
            .get(code)
            .cloned()
            .ok_or_else(|| AppError::Internal(format!("no stubbed payload for code {}", code)))
    }
}

fn stub_oauth_client() -> OAuthClient {
    OAuthClient {
        client_id: "test-client".into(),
        client_secret: "test-secret".into(),
        auth_url: "https://provider.test/authorize".into(),
        token_url: "https://provider.test/token".into(),
        userinfo_url: "https://provider.test/userinfo".into(),
    }
}

pub struct TestState {
    pub store: Arc<MemoryStore>,
    pub codec: Arc<TokenCodec>,
    pub gateway: Arc<StubGateway>,
    pub config: Config,
}

#[allow(dead_code)]
impl TestState {
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            codec: Arc::new(TokenCodec::new(TEST_SECRET, 3600)),
            gateway: Arc::new(StubGateway::new()),
            config: Config {
                database_url: "postgres://unused".into(),
                server_port: 0,
                server_host: "127.0.0.1".into(),
                jwt_secret: TEST_SECRET.into(),
                jwt_expire_seconds: 3600,
                frontend_url: FRONTEND_URL.into(),
                public_base_url: "http://api.test".into(),
                oauth: OAuthConfig {
                    google: stub_oauth_client(),
                    kakao: stub_oauth_client(),
                    naver: stub_oauth_client(),
                },
            },
        }
    }

    pub fn accounts(&self) -> web::Data<dyn AccountStore> {
        web::Data::from(self.store.clone() as Arc<dyn AccountStore>)
    }

    pub fn todos(&self) -> web::Data<dyn TodoStore> {
        web::Data::from(self.store.clone() as Arc<dyn TodoStore>)
    }

    pub fn codec_data(&self) -> web::Data<TokenCodec> {
        web::Data::from(self.codec.clone())
    }

    pub fn reconciler(&self) -> web::Data<IdentityReconciler> {
        web::Data::from(Arc::new(IdentityReconciler::new(
            self.store.clone() as Arc<dyn AccountStore>
        )))
    }

    pub fn gateway_data(&self) -> web::Data<dyn ProviderGateway> {
        web::Data::from(self.gateway.clone() as Arc<dyn ProviderGateway>)
    }

    pub fn config_data(&self) -> web::Data<Config> {
        web::Data::new(self.config.clone())
    }
}

#[allow(dead_code)]
pub struct TestUser {
    pub id: Uuid,
    pub token: String,
}

/// Registers an account and logs it in through the HTTP surface, returning
/// the new account id and a session token.
#[allow(dead_code)]
pub async fn register_and_login(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
    >,
    username: &str,
    email: &str,
    password: &str,
) -> TestUser {
    let req = actix_web::test::TestRequest::post()
        .uri("/users/signup")
        .set_json(json!({
            "username": username,
            "email": email,
            "password": password
        }))
        .to_request();
    let resp = actix_web::test::call_service(app, req).await;
    assert_eq!(
        resp.status(),
        actix_web::http::StatusCode::CREATED,
        "signup failed for {}",
        email
    );
    let body: Value =
        serde_json::from_slice(&actix_web::test::read_body(resp).await).expect("signup body");
    let id = Uuid::parse_str(body["id"].as_str().expect("account id")).expect("uuid");

    let req = actix_web::test::TestRequest::post()
        .uri("/users/login")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    let resp = actix_web::test::call_service(app, req).await;
    assert_eq!(
        resp.status(),
        actix_web::http::StatusCode::OK,
        "login failed for {}",
        email
    );
    let body: Value =
        serde_json::from_slice(&actix_web::test::read_body(resp).await).expect("login body");
    let token = body["token"].as_str().expect("token").to_string();

    TestUser { id, token }
}
