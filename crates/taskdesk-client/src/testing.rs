//! In-memory backend and fixtures shared by unit tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};

use taskdesk_shared::roles::{Role, TaskStatus};
use taskdesk_shared::schemas::{
    CreateUserRequest, LoginRequest, LoginResponse, Task, TaskRequest, TokenClaims,
    UpdateUserRequest, User,
};

use crate::api::{ApiFuture, Backend};
use crate::error::ApiError;
use crate::persistence::Storage;

pub fn mint_token(role: Role, subject: &str) -> String {
    let claims = TokenClaims {
        sub: subject.to_string(),
        role,
        exp: Some(4_102_444_800),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(b"secret"),
    )
    .unwrap()
}

pub fn temp_storage() -> (tempfile::TempDir, Storage) {
    let dir = tempfile::tempdir().unwrap();
    let storage = Storage::open(dir.path().join("storage.json"));
    (dir, storage)
}

pub fn user(id: i64, name: &str) -> User {
    User {
        id,
        name: name.to_string(),
        email: format!("{name}@gmail.com"),
        role: Role::Employee,
    }
}

pub fn task(id: i64, status: TaskStatus, assigned_to: Option<i64>) -> Task {
    Task {
        id,
        title: format!("task {id}"),
        description: String::new(),
        status,
        assigned_to,
        comment: None,
        locked: false,
    }
}

pub enum LoginBehavior {
    Token(String),
    NoToken,
    Reject(u16, String),
}

/// Backend double holding users and tasks in memory and recording every call.
pub struct FakeBackend {
    pub users: Mutex<Vec<User>>,
    pub tasks: Mutex<Vec<Task>>,
    login: Mutex<LoginBehavior>,
    calls: Mutex<Vec<String>>,
    offline: AtomicBool,
    reject_mutations: AtomicBool,
    next_id: AtomicI64,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(Vec::new()),
            tasks: Mutex::new(Vec::new()),
            login: Mutex::new(LoginBehavior::NoToken),
            calls: Mutex::new(Vec::new()),
            offline: AtomicBool::new(false),
            reject_mutations: AtomicBool::new(false),
            next_id: AtomicI64::new(100),
        }
    }

    pub fn with_users(self, users: Vec<User>) -> Self {
        *self.users.lock().unwrap() = users;
        self
    }

    pub fn with_tasks(self, tasks: Vec<Task>) -> Self {
        *self.tasks.lock().unwrap() = tasks;
        self
    }

    pub fn set_login(&self, behavior: LoginBehavior) {
        *self.login.lock().unwrap() = behavior;
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn set_reject_mutations(&self, reject: bool) {
        self.reject_mutations.store(reject, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn mutation_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| !c.starts_with("GET"))
            .collect()
    }

    fn record(&self, call: String, token: Option<&str>) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call.clone());
        if let Some(token) = token {
            if token.is_empty() {
                return Err(ApiError::MissingToken);
            }
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(ApiError::Network("connection refused".into()));
        }
        if !call.starts_with("GET") && self.reject_mutations.load(Ordering::SeqCst) {
            return Err(ApiError::Http {
                status: 400,
                body: r#"{"detail": "User with this email already exists"}"#.into(),
            });
        }
        Ok(())
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn not_found() -> ApiError {
        ApiError::Http {
            status: 404,
            body: r#"{"detail": "Not found"}"#.into(),
        }
    }

    fn task_from(id: i64, body: &TaskRequest) -> Task {
        Task {
            id,
            title: body.title.clone(),
            description: body.description.clone(),
            status: body.status.clone(),
            assigned_to: Some(body.assigned_to),
            comment: body.comment.clone(),
            locked: false,
        }
    }
}

impl Backend for FakeBackend {
    fn authenticate<'a>(&'a self, request: &'a LoginRequest) -> ApiFuture<'a, LoginResponse> {
        Box::pin(async move {
            self.record(format!("POST /auth/login {}", request.email), None)?;
            match &*self.login.lock().unwrap() {
                LoginBehavior::Token(token) => Ok(LoginResponse {
                    access_token: Some(token.clone()),
                    token_type: Some("bearer".into()),
                    role: None,
                }),
                LoginBehavior::NoToken => Ok(LoginResponse::default()),
                LoginBehavior::Reject(status, body) => Err(ApiError::Http {
                    status: *status,
                    body: body.clone(),
                }),
            }
        })
    }

    fn list_users<'a>(&'a self, token: &'a str) -> ApiFuture<'a, Vec<User>> {
        Box::pin(async move {
            self.record("GET /users/get-user".into(), Some(token))?;
            Ok(self.users.lock().unwrap().clone())
        })
    }

    fn get_user<'a>(&'a self, token: &'a str, id: i64) -> ApiFuture<'a, User> {
        Box::pin(async move {
            self.record(format!("GET /users/get-user/{id}"), Some(token))?;
            self.users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.id == id)
                .cloned()
                .ok_or_else(Self::not_found)
        })
    }

    fn create_user<'a>(
        &'a self,
        token: &'a str,
        body: &'a CreateUserRequest,
    ) -> ApiFuture<'a, User> {
        Box::pin(async move {
            self.record("POST /users/create-user".into(), Some(token))?;
            let created = User {
                id: self.next_id(),
                name: body.name.clone(),
                email: body.email.clone(),
                role: body.role,
            };
            self.users.lock().unwrap().push(created.clone());
            Ok(created)
        })
    }

    fn update_user<'a>(
        &'a self,
        token: &'a str,
        id: i64,
        body: &'a UpdateUserRequest,
    ) -> ApiFuture<'a, User> {
        Box::pin(async move {
            self.record(format!("PUT /users/update-user/{id}"), Some(token))?;
            let mut users = self.users.lock().unwrap();
            let user = users
                .iter_mut()
                .find(|u| u.id == id)
                .ok_or_else(Self::not_found)?;
            user.name = body.name.clone();
            user.email = body.email.clone();
            user.role = body.role;
            Ok(user.clone())
        })
    }

    fn delete_user<'a>(&'a self, token: &'a str, id: i64) -> ApiFuture<'a, ()> {
        Box::pin(async move {
            self.record(format!("DELETE /users/delete-user/{id}"), Some(token))?;
            self.users.lock().unwrap().retain(|u| u.id != id);
            Ok(())
        })
    }

    fn list_tasks<'a>(&'a self, token: &'a str) -> ApiFuture<'a, Vec<Task>> {
        Box::pin(async move {
            self.record("GET /tasks/get-tasks".into(), Some(token))?;
            Ok(self.tasks.lock().unwrap().clone())
        })
    }

    fn get_task<'a>(&'a self, token: &'a str, id: i64) -> ApiFuture<'a, Task> {
        Box::pin(async move {
            self.record(format!("GET /tasks/get-task/{id}"), Some(token))?;
            self.tasks
                .lock()
                .unwrap()
                .iter()
                .find(|t| t.id == id)
                .cloned()
                .ok_or_else(Self::not_found)
        })
    }

    fn create_task<'a>(&'a self, token: &'a str, body: &'a TaskRequest) -> ApiFuture<'a, Task> {
        Box::pin(async move {
            self.record("POST /tasks/create-task".into(), Some(token))?;
            let created = Self::task_from(self.next_id(), body);
            self.tasks.lock().unwrap().push(created.clone());
            Ok(created)
        })
    }

    fn update_task<'a>(
        &'a self,
        token: &'a str,
        id: i64,
        body: &'a TaskRequest,
    ) -> ApiFuture<'a, Task> {
        Box::pin(async move {
            self.record(format!("PUT /tasks/update-task/{id}"), Some(token))?;
            let mut tasks = self.tasks.lock().unwrap();
            let task = tasks
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(Self::not_found)?;
            *task = Self::task_from(id, body);
            Ok(task.clone())
        })
    }

    fn delete_task<'a>(&'a self, token: &'a str, id: i64) -> ApiFuture<'a, ()> {
        Box::pin(async move {
            self.record(format!("DELETE /tasks/delete-task/{id}"), Some(token))?;
            self.tasks.lock().unwrap().retain(|t| t.id != id);
            Ok(())
        })
    }
}
