//! Shared harness for router tests: in-memory database, canned gateway
//! backend, and signed test tokens.
#![allow(dead_code)]

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use db::{DBService, models::profile::Profile};
use http_body_util::BodyExt;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::Value;
use server::{AppState, app};
use services::services::ai_gateway::{AiGatewayError, Completion, CompletionBackend};
use tower::ServiceExt;
use utils::auth::{Claims, TokenVerifier};
use uuid::Uuid;

pub const JWT_SECRET: &str = "test-secret";

pub enum MockReply {
    Completion {
        text: String,
        total_tokens: Option<i64>,
    },
    Error(AiGatewayError),
}

pub struct MockGateway {
    reply: MockReply,
    called: Arc<AtomicBool>,
}

#[async_trait]
impl CompletionBackend for MockGateway {
    async fn complete(&self, _system: &str, _prompt: &str) -> Result<Completion, AiGatewayError> {
        self.called.store(true, Ordering::SeqCst);
        match &self.reply {
            MockReply::Completion { text, total_tokens } => Ok(Completion {
                text: text.clone(),
                total_tokens: *total_tokens,
            }),
            MockReply::Error(e) => Err(e.clone()),
        }
    }
}

pub struct TestApp {
    pub db: DBService,
    pub router: Router,
    pub gateway_called: Arc<AtomicBool>,
}

/// Build an app over an in-memory database. `reply` of `None` simulates a
/// deployment without a configured gateway credential.
pub async fn test_app(reply: Option<MockReply>) -> TestApp {
    let db = DBService::new_in_memory().await.unwrap();
    let gateway_called = Arc::new(AtomicBool::new(false));

    let backend: Option<Arc<dyn CompletionBackend>> = reply.map(|reply| {
        Arc::new(MockGateway {
            reply,
            called: gateway_called.clone(),
        }) as Arc<dyn CompletionBackend>
    });

    let state = AppState {
        db: db.clone(),
        verifier: TokenVerifier::new(JWT_SECRET),
        backend,
    };

    TestApp {
        db,
        router: app(state),
        gateway_called,
    }
}

pub fn token_for(user_id: Uuid) -> String {
    let exp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs()
        + 3600;
    let claims = Claims {
        sub: user_id.to_string(),
        email: Some("user@example.com".to_string()),
        exp,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

pub async fn seed_user(db: &DBService, email: &str, balance: i64) -> Uuid {
    let id = Uuid::new_v4();
    Profile::create(&db.pool, id, email, None).await.unwrap();
    sqlx::query("UPDATE profiles SET token_balance = $1 WHERE id = $2")
        .bind(balance)
        .bind(id)
        .execute(&db.pool)
        .await
        .unwrap();
    id
}

pub async fn post_json(
    router: Router,
    uri: &str,
    token: Option<&str>,
    body: Value,
) -> (StatusCode, Value) {
    let mut request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = request.body(Body::from(body.to_string())).unwrap();

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}
