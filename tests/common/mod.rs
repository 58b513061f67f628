#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use deltasocial::{
    app, auth,
    config::Config,
    db,
    identity::mock::{PlainCredentials, StaticTokens},
    AppState,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::ServiceExt;

pub const PASSWORD: &str = "Pw123456";
pub const MODERATOR: &str = "mod@x.com";

pub struct TestApp {
    pub router: Router,
    pub db_pool: SqlitePool,
}

pub struct Reply {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: Value,
}

/// A registered user: bearer token plus ids read back from the profile search.
pub struct Account {
    pub token: String,
    pub user_id: String,
    pub profile_id: String,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_pool = db::in_memory().await.unwrap();
        auth::bootstrap_moderator(&db_pool, &PlainCredentials, MODERATOR, PASSWORD)
            .await
            .unwrap();

        let state = AppState {
            db_pool: db_pool.clone(),
            credentials: Arc::new(PlainCredentials),
            tokens: Arc::new(StaticTokens),
            config: Arc::new(Config::default()),
        };
        Self { router: app(state), db_pool }
    }

    pub async fn call(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Reply {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    /// Posts `body` as `application/x-www-form-urlencoded`.
    pub async fn post_form(&self, uri: &str, token: Option<&str>, body: &str) -> Reply {
        let mut request = Request::builder().method(Method::POST).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = request
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_owned()))
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> Reply {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|value| value.to_str().unwrap().to_owned());
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        Reply { status, location, body }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Reply {
        self.call(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> Reply {
        self.call(Method::POST, uri, token, Some(body)).await
    }

    pub async fn login(&self, email: &str) -> String {
        let reply = self
            .post("/api/auth/login", None, json!({ "email": email, "password": PASSWORD }))
            .await;
        assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
        reply.body["token"].as_str().unwrap().to_owned()
    }

    /// Registers `name@x.com` and logs in.
    pub async fn signup(&self, name: &str) -> Account {
        let email = format!("{name}@x.com");
        let reply = self
            .post("/api/auth/register", None, json!({ "email": email, "password": PASSWORD }))
            .await;
        assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);

        let token = self.login(&email).await;
        let found = self.get(&format!("/Profile/Index?query={name}"), Some(&token)).await;
        let profile = found.body.as_array().unwrap().iter().find(|p| p["name"] == name).unwrap().clone();

        Account {
            token,
            user_id: profile["userId"].as_str().unwrap().to_owned(),
            profile_id: profile["id"].as_str().unwrap().to_owned(),
        }
    }

    pub async fn befriend(&self, sender: &Account, receiver: &Account) {
        let sent = self
            .post("/Profile/SendFriendRequest", Some(&sender.token), json!({ "receiverId": receiver.user_id }))
            .await;
        assert_eq!(sent.status, StatusCode::OK, "{}", sent.body);
        let accepted = self
            .post("/Profile/AcceptFriendRequest", Some(&receiver.token), json!({ "friendshipId": sent.body["id"] }))
            .await;
        assert_eq!(accepted.status, StatusCode::OK, "{}", accepted.body);
    }

    pub async fn moderator_token(&self) -> String {
        self.login(MODERATOR).await
    }
}
