//! Shared harness for HTTP-level tests
//!
//! Spins up the full router (auth gate, CORS, GraphQL and REST) over in-memory
//! stores with a throwaway image directory, plus helpers for the common
//! register / login / post flows.
//!
//! # Usage
//!
//! ```rust,ignore
//! mod app_harness;
//! use app_harness::*;
//! ```

#![allow(dead_code)]

use axum::http::{HeaderValue, StatusCode, header};
use axum_test::{TestResponse, TestServer};
use feed::prelude::*;
use serde_json::{Value, json};
use std::path::PathBuf;
use tempfile::TempDir;

pub const PASSWORD: &str = "secret-password";

/// A running app and the directory its images land in
pub struct TestApp {
    pub server: TestServer,
    pub images_dir: PathBuf,
    _images: TempDir,
}

/// Defaults, with a cheap bcrypt cost and images under `dir`
pub fn test_config(dir: PathBuf) -> FeedConfig {
    let mut config = FeedConfig::default();
    config.auth.bcrypt_cost = 4;
    config.images.dir = dir;
    config
}

pub fn spawn_app() -> TestApp {
    let images = TempDir::new().unwrap();
    let images_dir = images.path().join("images");

    let router = ServerBuilder::new(test_config(images_dir.clone()))
        .with_user_store(InMemoryUserStore::new())
        .with_post_store(InMemoryPostStore::new())
        .build()
        .unwrap();

    TestApp {
        server: TestServer::new(router),
        images_dir,
        _images: images,
    }
}

pub fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
}

impl TestApp {
    /// POST a document to `/graphql`, optionally with a token
    pub async fn graphql(&self, query: &str, variables: Value, token: Option<&str>) -> TestResponse {
        let mut request = self
            .server
            .post("/graphql")
            .json(&json!({ "query": query, "variables": variables }));
        if let Some(token) = token {
            request = request.add_header(header::AUTHORIZATION, bearer(token));
        }
        request.await
    }

    /// Like [`TestApp::graphql`], asserting a 200 and returning the body
    pub async fn graphql_ok(&self, query: &str, variables: Value, token: Option<&str>) -> Value {
        let response = self.graphql(query, variables, token).await;
        response.assert_status(StatusCode::OK);
        response.json::<Value>()
    }

    pub async fn register(&self, name: &str, email: &str) -> Value {
        self.graphql_ok(
            r#"mutation Register($input: UserInputData) {
                createUser(userInput: $input) { _id name email password posts { _id } }
            }"#,
            json!({ "input": { "name": name, "email": email, "password": PASSWORD } }),
            None,
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> Value {
        self.graphql_ok(
            r#"query Login($email: String!, $password: String!) {
                login(email: $email, password: $password) { userId token }
            }"#,
            json!({ "email": email, "password": password }),
            None,
        )
        .await
    }

    /// Register `email` and return `(user id, token)`
    pub async fn signed_in(&self, email: &str) -> (String, String) {
        self.register("Test User", email).await;
        let body = self.login(email, PASSWORD).await;
        let auth = &body["data"]["login"];
        (
            auth["userId"].as_str().unwrap().to_string(),
            auth["token"].as_str().unwrap().to_string(),
        )
    }

    pub async fn create_post(&self, token: &str, title: &str, image_url: Option<&str>) -> Value {
        self.graphql_ok(
            r#"mutation NewPost($input: PostInputData) {
                createPost(postInput: $input) {
                    _id title content imageUrl createdAt updatedAt
                    creator { _id name }
                }
            }"#,
            json!({
                "input": { "title": title, "content": "Some content here", "imageUrl": image_url }
            }),
            Some(token),
        )
        .await
    }

    /// Create a post and return its id
    pub async fn post_id(&self, token: &str, title: &str) -> String {
        let body = self.create_post(token, title, Some("images/cover.png")).await;
        body["data"]["createPost"]["_id"]
            .as_str()
            .unwrap()
            .to_string()
    }
}

/// The single entry of `errors`
pub fn only_error(body: &Value) -> &Value {
    let errors = body["errors"].as_array().expect("errors array");
    assert_eq!(errors.len(), 1, "unexpected errors: {body}");
    &errors[0]
}
