#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use drinks_service::auth::{KeyCache, SigningKeys, TokenValidator};
use drinks_service::models::{Drink, NewDrink, Recipe};
use drinks_service::services::{DrinkStore, MemoryStore, StoreError};
use drinks_service::{build_router, AppState};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;

pub const SECRET: &[u8] = b"integration-test-secret";
pub const KID: &str = "test-key";
pub const AUDIENCE: &str = "coffee";
pub const ISSUER: &str = "https://coffee-shop.test/";

pub const BARISTA: &[&str] = &["get:drinks-detail"];
pub const MANAGER: &[&str] = &[
    "get:drinks-detail",
    "post:drinks",
    "patch:drinks",
    "delete:drinks",
];

pub fn validator() -> Arc<TokenValidator> {
    Arc::new(TokenValidator::new(
        KeyCache::fixed(SigningKeys::from_secret(KID, SECRET)),
        AUDIENCE,
        ISSUER,
        vec![Algorithm::HS256],
    ))
}

pub fn app_with_store(store: Arc<dyn DrinkStore>) -> Router {
    build_router(AppState::new(store, validator()))
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            router: app_with_store(store.clone()),
            store,
        }
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Body>,
    ) -> (StatusCode, Value) {
        send(&self.router, method, uri, token, body).await
    }

    pub async fn drink_count(&self) -> usize {
        self.store.list().await.unwrap().len()
    }

    pub async fn create(&self, payload: Value) -> (StatusCode, Value) {
        let token = token_with(MANAGER);
        self.send(Method::POST, "/drinks", Some(&token), Some(json_body(&payload)))
            .await
    }
}

pub fn json_body(value: &Value) -> Body {
    Body::from(serde_json::to_vec(value).unwrap())
}

pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Body>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    if body.is_some() {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }

    let response = router
        .clone()
        .oneshot(builder.body(body.unwrap_or_else(Body::empty)).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

pub fn sign(claims: &Value) -> String {
    let mut header = Header::new(Algorithm::HS256);
    header.kid = Some(KID.to_string());
    encode(&header, claims, &EncodingKey::from_secret(SECRET)).unwrap()
}

pub fn base_claims() -> Value {
    json!({
        "sub": "auth0|tester",
        "iss": ISSUER,
        "aud": AUDIENCE,
        "iat": now(),
        "exp": now() + 3600,
    })
}

pub fn token_with(permissions: &[&str]) -> String {
    let mut claims = base_claims();
    claims["permissions"] = json!(permissions);
    sign(&claims)
}

pub fn water() -> Value {
    json!({
        "title": "Water",
        "recipe": {"name": "water", "color": "blue", "parts": 1}
    })
}

pub fn matcha_latte() -> Value {
    json!({
        "title": "Matcha Latte",
        "recipe": [
            {"name": "milk", "color": "grey", "parts": 1},
            {"name": "matcha", "color": "green", "parts": 3}
        ]
    })
}

/// Store whose writes always fail, for exercising the 500 path.
#[derive(Default)]
pub struct BrokenStore {
    pub inner: MemoryStore,
}

impl BrokenStore {
    /// Readable store already holding one drink, so lookups succeed and
    /// only the write fails.
    pub async fn with_drink(title: &str) -> (Self, i64) {
        let store = Self::default();
        let drink = store
            .inner
            .insert(NewDrink {
                title: title.to_string(),
                recipe: serde_json::from_value::<Recipe>(
                    json!([{"name": "tea", "color": "amber", "parts": 1}]),
                )
                .unwrap(),
            })
            .await
            .unwrap();
        (store, drink.id)
    }
}

#[async_trait]
impl DrinkStore for BrokenStore {
    async fn list(&self) -> Result<Vec<Drink>, StoreError> {
        self.inner.list().await
    }

    async fn get(&self, id: i64) -> Result<Option<Drink>, StoreError> {
        self.inner.get(id).await
    }

    async fn insert(&self, _drink: NewDrink) -> Result<Drink, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn update(&self, _drink: &Drink) -> Result<(), StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn delete(&self, _drink: &Drink) -> Result<(), StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }
}
