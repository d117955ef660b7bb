mod repository;
#[cfg(test)]
mod memory;

pub use repository::*;
#[cfg(test)]
pub use memory::*;

use serde::{Deserialize, Serialize};

/// User as saved on database.
///
/// The password is stored and returned as provided.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub password: String,
}

/// User about to be inserted, before the database assigns its `id`.
#[derive(Clone, Debug, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}
