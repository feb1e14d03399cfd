use std::future::Future;
use std::pin::Pin;

use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use taskdesk_shared::schemas::{
    CreateUserRequest, LoginRequest, LoginResponse, Task, TaskRequest, UpdateUserRequest, User,
};

use crate::config::Configuration;
use crate::error::ApiError;

pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send + 'a>>;

/// The REST operations the client consumes.
///
/// Every method except `authenticate` takes the bearer token of the current
/// session. Implementations do not retry; failures go straight back to the
/// caller.
pub trait Backend: Send + Sync {
    fn authenticate<'a>(&'a self, request: &'a LoginRequest) -> ApiFuture<'a, LoginResponse>;

    fn list_users<'a>(&'a self, token: &'a str) -> ApiFuture<'a, Vec<User>>;
    fn get_user<'a>(&'a self, token: &'a str, id: i64) -> ApiFuture<'a, User>;
    fn create_user<'a>(
        &'a self,
        token: &'a str,
        body: &'a CreateUserRequest,
    ) -> ApiFuture<'a, User>;
    fn update_user<'a>(
        &'a self,
        token: &'a str,
        id: i64,
        body: &'a UpdateUserRequest,
    ) -> ApiFuture<'a, User>;
    fn delete_user<'a>(&'a self, token: &'a str, id: i64) -> ApiFuture<'a, ()>;

    fn list_tasks<'a>(&'a self, token: &'a str) -> ApiFuture<'a, Vec<Task>>;
    fn get_task<'a>(&'a self, token: &'a str, id: i64) -> ApiFuture<'a, Task>;
    fn create_task<'a>(&'a self, token: &'a str, body: &'a TaskRequest) -> ApiFuture<'a, Task>;
    fn update_task<'a>(
        &'a self,
        token: &'a str,
        id: i64,
        body: &'a TaskRequest,
    ) -> ApiFuture<'a, Task>;
    fn delete_task<'a>(&'a self, token: &'a str, id: i64) -> ApiFuture<'a, ()>;
}

/// HTTP client for the task-management backend.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &Configuration) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.http_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            base_url: config.api_url.clone(),
        })
    }

    pub fn with_base_url(base_url: impl Into<String>) -> anyhow::Result<Self> {
        Ok(Self {
            http: reqwest::Client::builder().build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorized(
        &self,
        method: Method,
        path: &str,
        token: &str,
    ) -> Result<RequestBuilder, ApiError> {
        if token.trim().is_empty() {
            return Err(ApiError::MissingToken);
        }
        debug!(method = method.as_str(), path, "authorized request");
        Ok(self
            .http
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(token))
    }

    async fn send(req: RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        method: Method,
        path: String,
        token: &str,
    ) -> Result<T, ApiError> {
        let req = self.authorized(method, &path, token)?;
        let resp = Self::send(req).await?;
        Ok(resp.json().await?)
    }

    async fn submit<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: String,
        token: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let req = self.authorized(method, &path, token)?.json(body);
        let resp = Self::send(req).await?;
        Ok(resp.json().await?)
    }

    async fn remove(&self, path: String, token: &str) -> Result<(), ApiError> {
        let req = self.authorized(Method::DELETE, &path, token)?;
        Self::send(req).await?;
        Ok(())
    }
}

impl Backend for ApiClient {
    fn authenticate<'a>(&'a self, request: &'a LoginRequest) -> ApiFuture<'a, LoginResponse> {
        Box::pin(async move {
            debug!("POST /auth/login");
            let req = self
                .http
                .post(format!("{}/auth/login", self.base_url))
                .json(request);
            let resp = Self::send(req).await?;
            Ok(resp.json().await?)
        })
    }

    fn list_users<'a>(&'a self, token: &'a str) -> ApiFuture<'a, Vec<User>> {
        Box::pin(self.fetch(Method::GET, "/users/get-user".into(), token))
    }

    fn get_user<'a>(&'a self, token: &'a str, id: i64) -> ApiFuture<'a, User> {
        Box::pin(self.fetch(Method::GET, format!("/users/get-user/{id}"), token))
    }

    fn create_user<'a>(
        &'a self,
        token: &'a str,
        body: &'a CreateUserRequest,
    ) -> ApiFuture<'a, User> {
        Box::pin(self.submit(Method::POST, "/users/create-user".into(), token, body))
    }

    fn update_user<'a>(
        &'a self,
        token: &'a str,
        id: i64,
        body: &'a UpdateUserRequest,
    ) -> ApiFuture<'a, User> {
        Box::pin(self.submit(Method::PUT, format!("/users/update-user/{id}"), token, body))
    }

    fn delete_user<'a>(&'a self, token: &'a str, id: i64) -> ApiFuture<'a, ()> {
        Box::pin(self.remove(format!("/users/delete-user/{id}"), token))
    }

    fn list_tasks<'a>(&'a self, token: &'a str) -> ApiFuture<'a, Vec<Task>> {
        Box::pin(self.fetch(Method::GET, "/tasks/get-tasks".into(), token))
    }

    fn get_task<'a>(&'a self, token: &'a str, id: i64) -> ApiFuture<'a, Task> {
        Box::pin(self.fetch(Method::GET, format!("/tasks/get-task/{id}"), token))
    }

    fn create_task<'a>(&'a self, token: &'a str, body: &'a TaskRequest) -> ApiFuture<'a, Task> {
        Box::pin(self.submit(Method::POST, "/tasks/create-task".into(), token, body))
    }

    fn update_task<'a>(
        &'a self,
        token: &'a str,
        id: i64,
        body: &'a TaskRequest,
    ) -> ApiFuture<'a, Task> {
        Box::pin(self.submit(Method::PUT, format!("/tasks/update-task/{id}"), token, body))
    }

    fn delete_task<'a>(&'a self, token: &'a str, id: i64) -> ApiFuture<'a, ()> {
        Box::pin(self.remove(format!("/tasks/delete-task/{id}"), token))
    }
}
