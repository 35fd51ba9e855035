//! Integration tests for Farm Fresh.
//!
//! Tests drive the full axum router with `tower::ServiceExt::oneshot`
//! against the in-memory document and blob stores, so they need neither a
//! database nor network access.
//!
//! ```bash
//! cargo test -p farm-fresh-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::Value;
use tower::ServiceExt;

use farm_fresh_api::config::ApiConfig;
use farm_fresh_api::db::{
    CollectionPath, FarmRepository, MemoryDocumentStore, ProductRepository, UserRepository,
};
use farm_fresh_api::models::{FarmRecord, ProductRecord, UserRecord};
use farm_fresh_api::services::auth::Claims;
use farm_fresh_api::storage::MemoryBlobStore;
use farm_fresh_api::{AppState, app};
use farm_fresh_core::{CartId, FarmId, ProductId, UserId};

/// Signing key shared by the test server and [`TestApp::token`].
pub const JWT_SECRET: &str = "kR8#vL2qZ9!mW4tN7xB1@pF6hJ3cY0sD";

/// Receipt size cap used by [`TestApp::new`].
pub const MAX_UPLOAD_BYTES: usize = 1024;

const MULTIPART_BOUNDARY: &str = "farm-fresh-test-boundary";

/// A router over fresh in-memory backends.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryDocumentStore>,
    pub blobs: Arc<MemoryBlobStore>,
}

/// Status and decoded JSON body of a response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub request_id: Option<String>,
}

impl TestApp {
    /// Build an app with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_vars(&[])
    }

    /// Build an app with extra configuration variables.
    ///
    /// # Panics
    ///
    /// Panics if the resulting configuration is invalid.
    #[must_use]
    pub fn with_vars(extra: &[(&str, &str)]) -> Self {
        let mut vars: HashMap<String, String> = [
            ("FARMFRESH_DATABASE_URL", "memory://"),
            ("FARMFRESH_JWT_SECRET", JWT_SECRET),
            ("STORAGE_BUCKET", "farm-fresh-test"),
            ("STORAGE_BASE_URL", "https://storage.test"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        vars.insert("MAX_UPLOAD_BYTES".to_string(), MAX_UPLOAD_BYTES.to_string());
        for (k, v) in extra {
            vars.insert((*k).to_string(), (*v).to_string());
        }

        let config = ApiConfig::from_vars(&vars).expect("test configuration is valid");
        let store = Arc::new(MemoryDocumentStore::new());
        let blobs = Arc::new(MemoryBlobStore::new(
            config.storage.base_url.clone(),
            config.storage.bucket.clone(),
        ));

        let state = AppState::new(config, store.clone(), blobs.clone());

        Self {
            router: app(state),
            store,
            blobs,
        }
    }

    /// Create a user profile whose cart id equals the user id.
    ///
    /// # Panics
    ///
    /// Panics if the write fails.
    pub async fn seed_user(&self, id: &str) {
        let record = UserRecord {
            cart_id: Some(CartId::new(id)),
            username: Some(format!("user-{id}")),
            ..UserRecord::default()
        };
        UserRepository::new(self.store.as_ref())
            .upsert(&UserId::new(id), &record)
            .await
            .expect("seed user");
    }

    /// Create a catalog product.
    ///
    /// # Panics
    ///
    /// Panics if the write fails.
    pub async fn seed_product(&self, id: &str, price: &str, kind: &str) {
        let record = ProductRecord {
            name: format!("Produk {id}"),
            image: format!("https://img.test/{id}.jpg"),
            price: price.to_string(),
            description: String::new(),
            rate: Value::Null,
            category: "sayur".to_string(),
            kind: kind.to_string(),
        };
        ProductRepository::new(self.store.as_ref())
            .upsert(&ProductId::new(id), &record)
            .await
            .expect("seed product");
    }

    /// Create a farm profile.
    ///
    /// # Panics
    ///
    /// Panics if the write fails.
    pub async fn seed_farm(&self, id: &str, store_name: &str) {
        let record = FarmRecord {
            store_name: Some(store_name.to_string()),
            owner: Some(format!("Pemilik {id}")),
            address: Some("Jl. Raya Lembang 12".to_string()),
            ..FarmRecord::default()
        };
        FarmRepository::new(self.store.as_ref())
            .upsert(&FarmId::new(id), &record)
            .await
            .expect("seed farm");
    }

    /// Number of documents in a collection.
    pub async fn count(&self, collection: &CollectionPath) -> usize {
        self.store.len(collection).await
    }

    /// Issue a valid token for `user_id`.
    ///
    /// # Panics
    ///
    /// Panics if encoding fails.
    #[must_use]
    pub fn token(user_id: &str) -> String {
        Self::token_expiring(user_id, now_secs() + 3600)
    }

    /// Issue a token with an explicit `exp`.
    ///
    /// # Panics
    ///
    /// Panics if encoding fails.
    #[must_use]
    pub fn token_expiring(user_id: &str, exp: u64) -> String {
        let claims = Claims {
            user_id: UserId::new(user_id),
            username: None,
            exp,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
        )
        .expect("encode token")
    }

    /// Send a request with an optional bearer token and JSON body.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        json: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match json {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.send(builder.body(body).expect("build request")).await
    }

    /// Send a multipart request.
    pub async fn multipart(
        &self,
        method: Method,
        uri: &str,
        token: &str,
        form: MultipartForm,
    ) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
            )
            .body(Body::from(form.finish()))
            .expect("build request");

        self.send(request).await
    }

    /// Send a prepared request.
    ///
    /// # Panics
    ///
    /// Panics if the router fails or the body cannot be read.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let request_id = response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse {
            status,
            body,
            request_id,
        }
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for a `multipart/form-data` body.
#[derive(Debug, Default)]
pub struct MultipartForm {
    body: Vec<u8>,
}

impl MultipartForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text field.
    #[must_use]
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    /// Add a file field.
    #[must_use]
    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
        self.body
    }
}

/// Current unix time in seconds.
#[must_use]
pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}
