use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
    time::Duration,
};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub username: String,
    pub email: String,
    pub website: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ToDo {
    pub user_id: u64,
    pub id: u64,
    pub title: String,
    pub completed: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub user_id: u64,
    pub id: u64,
    pub title: String,
    pub body: String,
}

#[derive(Deserialize)]
pub struct UserQuery {
    pub username: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedQuery {
    pub user_id: Option<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Resource {
    Users,
    Todos,
    Posts,
}

/// Data served by the mock plus knobs for failure tests.
#[derive(Clone, Debug, Default)]
pub struct MockApi {
    pub users: Vec<User>,
    pub todos: Vec<ToDo>,
    pub posts: Vec<Post>,
    /// Resources that answer 500 instead of data.
    pub failing: HashSet<Resource>,
    /// Extra latency on `/users?username=<key>` lookups.
    pub lookup_delays: HashMap<String, Duration>,
}

impl MockApi {
    /// A small slice of the jsonplaceholder fixtures.
    pub fn seeded() -> Self {
        let users = vec![
            user(1, "Leanne Graham", "Bret", "Sincere@april.biz", "hildegard.org"),
            user(2, "Ervin Howell", "Antonette", "Shanna@melissa.tv", "anastasia.net"),
            user(5, "Chelsey Dietrich", "Kamren", "Lucio_Hettinger@annie.ca", "demarco.info"),
        ];
        let todos = vec![
            todo(1, 1, "delectus aut autem", false),
            todo(1, 2, "quis ut nam facilis et officia qui", false),
            todo(2, 21, "suscipit repellat esse quibusdam voluptatem incidunt", false),
            todo(5, 81, "suscipit qui totam", true),
            todo(5, 82, "voluptates eum voluptas et dicta", false),
        ];
        let posts = vec![
            post(1, 1, "sunt aut facere repellat", "quia et suscipit"),
            post(2, 11, "et ea vero quia laudantium autem", "delectus reiciendis molestiae"),
            post(5, 41, "non est facere", "molestias id nostrum"),
        ];
        Self {
            users,
            todos,
            posts,
            ..Self::default()
        }
    }

    pub fn failing(mut self, resource: Resource) -> Self {
        self.failing.insert(resource);
        self
    }

    pub fn delay_lookup(mut self, username: &str, delay: Duration) -> Self {
        self.lookup_delays.insert(username.to_string(), delay);
        self
    }

    fn check(&self, resource: Resource) -> Result<(), StatusCode> {
        if self.failing.contains(&resource) {
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
        Ok(())
    }
}

pub fn user(id: u64, name: &str, username: &str, email: &str, website: &str) -> User {
    User {
        id,
        name: name.to_string(),
        username: username.to_string(),
        email: email.to_string(),
        website: website.to_string(),
    }
}

pub fn todo(user_id: u64, id: u64, title: &str, completed: bool) -> ToDo {
    ToDo {
        user_id,
        id,
        title: title.to_string(),
        completed,
    }
}

pub fn post(user_id: u64, id: u64, title: &str, body: &str) -> Post {
    Post {
        user_id,
        id,
        title: title.to_string(),
        body: body.to_string(),
    }
}

pub type Api = Arc<MockApi>;

pub fn app() -> Router {
    app_with(MockApi::seeded())
}

pub fn app_with(api: MockApi) -> Router {
    Router::new()
        .route("/users", get(list_users))
        .route("/todos", get(list_todos))
        .route("/posts", get(list_posts))
        .with_state(Arc::new(api))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, api: MockApi) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(api)).await
}

async fn list_users(
    State(api): State<Api>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<User>>, StatusCode> {
    api.check(Resource::Users)?;
    let Some(username) = query.username else {
        return Ok(Json(api.users.clone()));
    };
    if let Some(delay) = api.lookup_delays.get(&username) {
        tokio::time::sleep(*delay).await;
    }
    let matched = api
        .users
        .iter()
        .filter(|u| u.username == username)
        .cloned()
        .collect();
    Ok(Json(matched))
}

async fn list_todos(
    State(api): State<Api>,
    Query(query): Query<RelatedQuery>,
) -> Result<Json<Vec<ToDo>>, StatusCode> {
    api.check(Resource::Todos)?;
    let todos = api
        .todos
        .iter()
        .filter(|t| query.user_id.is_none_or(|id| t.user_id == id))
        .cloned()
        .collect();
    Ok(Json(todos))
}

async fn list_posts(
    State(api): State<Api>,
    Query(query): Query<RelatedQuery>,
) -> Result<Json<Vec<Post>>, StatusCode> {
    api.check(Resource::Posts)?;
    let posts = api
        .posts
        .iter()
        .filter(|p| query.user_id.is_none_or(|id| p.user_id == id))
        .cloned()
        .collect();
    Ok(Json(posts))
}
