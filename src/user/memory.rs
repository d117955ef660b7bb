//! In-memory repositories used by handler tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Result, ServerError};
use crate::user::{NewUser, User, UserRepository};

/// Stores users in a vector, `id` starts at 1 like a `SERIAL` column.
#[derive(Default)]
pub struct MemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users with this email.
    pub fn count(&self, email: &str) -> usize {
        self.users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.email == email)
            .count()
    }

    pub fn len(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn email_exists(&self, email: &str) -> Result<bool> {
        Ok(self.count(email) > 0)
    }

    async fn insert(&self, user: &NewUser) -> Result<Option<i32>> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Ok(None);
        }

        let id = users.len() as i32 + 1;
        users.push(User {
            id,
            name: user.name.clone(),
            email: user.email.clone(),
            password: user.password.clone(),
        });
        Ok(Some(id))
    }

    async fn find_by_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email && u.password == password)
            .cloned())
    }
}

/// Every call fails as if the database were unreachable.
pub struct UnavailableUserRepository;

#[async_trait]
impl UserRepository for UnavailableUserRepository {
    async fn email_exists(&self, _email: &str) -> Result<bool> {
        Err(ServerError::Sql(sqlx::Error::PoolTimedOut))
    }

    async fn insert(&self, _user: &NewUser) -> Result<Option<i32>> {
        Err(ServerError::Sql(sqlx::Error::PoolTimedOut))
    }

    async fn find_by_credentials(
        &self,
        _email: &str,
        _password: &str,
    ) -> Result<Option<User>> {
        Err(ServerError::Sql(sqlx::Error::PoolTimedOut))
    }
}
