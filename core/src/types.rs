//! Domain DTOs for the users / todos / posts resources.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Integration tests catch any schema drift between the two crates. Field
//! names follow the remote API's camelCase spelling on the wire.

use serde::{Deserialize, Serialize};

/// A user record as returned by `GET /users`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub website: String,
}

/// A single todo item returned by `GET /todos`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ToDo {
    pub user_id: u64,
    pub id: u64,
    pub title: String,
    pub completed: bool,
}

/// A single post returned by `GET /posts`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub user_id: u64,
    pub id: u64,
    pub title: String,
    pub body: String,
}

/// Merged view of one user and their related resources.
///
/// Built per query and never mutated afterwards; a newer query produces a
/// fresh value instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserData {
    pub name: String,
    pub todos: Vec<ToDo>,
    pub posts: Vec<Post>,
}

impl UserData {
    pub fn new(user: &User, todos: Vec<ToDo>, posts: Vec<Post>) -> Self {
        Self {
            name: user.name.clone(),
            todos,
            posts,
        }
    }
}

/// Optional single query-string filter accepted by the list endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// `?username=<value>`, used against `/users`.
    Username(String),
    /// `?userId=<value>`, used against `/todos` and `/posts`.
    UserId(u64),
}

impl Filter {
    pub fn username(username: &str) -> Self {
        Filter::Username(username.to_string())
    }

    /// The `(key, value)` pair appended to the request's query string.
    pub fn query_pair(&self) -> (String, String) {
        match self {
            Filter::Username(name) => ("username".to_string(), name.clone()),
            Filter::UserId(id) => ("userId".to_string(), id.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_uses_camel_case_user_id() {
        let todo = ToDo {
            user_id: 7,
            id: 1,
            title: "t".to_string(),
            completed: false,
        };
        let json = serde_json::to_value(&todo).unwrap();
        assert_eq!(json["userId"], 7);
        assert!(json.get("user_id").is_none());
    }

    #[test]
    fn user_tolerates_missing_contact_fields() {
        let user: User =
            serde_json::from_str(r#"{"id":7,"name":"Kamren X","username":"Kamren"}"#).unwrap();
        assert_eq!(user.id, 7);
        assert!(user.email.is_empty());
        assert!(user.website.is_empty());
    }

    #[test]
    fn user_ignores_unknown_fields() {
        let raw = r#"{"id":1,"name":"Leanne Graham","username":"Bret","email":"a@b.c",
            "website":"hildegard.org","address":{"city":"Gwenborough"}}"#;
        let user: User = serde_json::from_str(raw).unwrap();
        assert_eq!(user.username, "Bret");
    }

    #[test]
    fn user_data_takes_name_from_user() {
        let user = User {
            id: 7,
            name: "Kamren X".to_string(),
            username: "Kamren".to_string(),
            email: String::new(),
            website: String::new(),
        };
        let data = UserData::new(&user, Vec::new(), Vec::new());
        assert_eq!(data.name, "Kamren X");
    }

    #[test]
    fn filter_query_pairs() {
        assert_eq!(
            Filter::username("Kamren").query_pair(),
            ("username".to_string(), "Kamren".to_string())
        );
        assert_eq!(
            Filter::UserId(7).query_pair(),
            ("userId".to_string(), "7".to_string())
        );
    }
}
