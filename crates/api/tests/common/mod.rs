#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use microwins_api::auth::jwt::{generate_access_token, JwtConfig};
use microwins_api::config::ServerConfig;
use microwins_api::router::build_app_router;
use microwins_api::state::AppState;
use microwins_core::generation::{CompletionOptions, GenerationOptions, LanguageModel, ProviderError};
use microwins_core::store::MemoryStore;
use serde_json::{json, Value};
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Scripted language model
// ---------------------------------------------------------------------------

/// Language model that replays queued answers in order and records prompts.
/// Once the queue is empty it keeps failing.
#[derive(Default)]
pub struct ScriptedLlm {
    answers: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    pub fn answering<I, S>(answers: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::new(Self {
            answers: Mutex::new(answers.into_iter().map(|a| Ok(a.into())).collect()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            answers: Mutex::new(VecDeque::from([Err(message.to_string())])),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedLlm {
    async fn complete(&self, prompt: &str, _options: &CompletionOptions) -> Result<String, ProviderError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.answers.lock().unwrap().pop_front() {
            Some(Ok(answer)) => Ok(answer),
            Some(Err(message)) => Err(ProviderError(message)),
            None => Err(ProviderError("no scripted answer left".to_string())),
        }
    }
}

/// A valid model answer with `count` steps of 2 minutes each.
pub fn breakdown_json(count: usize, difficulty: i32) -> String {
    let steps: Vec<Value> = (1..=count)
        .map(|n| {
            json!({
                "step_number": n,
                "text": format!("Do small thing number {n}"),
                "estimated_time_minutes": 2,
            })
        })
        .collect();
    json!({
        "task_name": "Tidy the desk",
        "difficulty_level": difficulty,
        "steps": steps,
    })
    .to_string()
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

pub const TEST_JWT_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// Build the full application router (same middleware stack as `main.rs`)
/// over a fresh in-memory store and the given language model.
pub fn build_test_app(llm: Arc<dyn LanguageModel>) -> Router {
    build_test_app_with_store(llm, MemoryStore::new())
}

pub fn build_test_app_with_store(llm: Arc<dyn LanguageModel>, store: MemoryStore) -> Router {
    let config = test_config();
    let state = AppState {
        store: Arc::new(store),
        llm,
        config: Arc::new(config.clone()),
        generation: GenerationOptions::default(),
    };
    build_app_router(state, &config)
}

/// Issue a valid access token for `user_id`.
pub fn token_for(user_id: &str) -> String {
    generate_access_token(user_id, &test_config().jwt).unwrap()
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send_json_auth(app, "POST", uri, body, token).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send_json_auth(app, "PUT", uri, body, token).await
}

async fn send_json_auth(app: Router, method: &str, uri: &str, body: Value, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// POST without a body (mark-done).
pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}
