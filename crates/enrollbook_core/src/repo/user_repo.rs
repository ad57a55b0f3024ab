//! In-memory user repository with a unique login index.
//!
//! # Responsibility
//! - Store users and resolve them by id or by login.
//! - Hold password hashes; nothing above this layer keeps credentials.
//!
//! # Invariants
//! - `users` and `by_login` describe the same set of live users at every
//!   point another thread can observe, because both sit behind one lock.
//! - The duplicate-login check and the insert run under one held lock, so two
//!   concurrent registrations of one login cannot both succeed.
//! - Deleting a user drops its login index entry in the same critical section.

use crate::error::ErrorKind;
use crate::model::user::{PasswordHash, User, UserId, UserProfile};
use crate::repo::collection::{CollectionNotFound, IndexedCollection};
use log::{debug, info};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

pub type UserRepoResult<T> = Result<T, UserRepoError>;

/// How a missing user was looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserLookup {
    Id(UserId),
    Login(String),
}

impl std::fmt::Display for UserLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id {id}"),
            Self::Login(login) => write!(f, "login `{login}`"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserRepoError {
    #[error("user not found by {0}")]
    NotFound(UserLookup),
    #[error("user already exists: `{0}`")]
    AlreadyExists(String),
}

impl UserRepoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::AlreadyExists(_) => ErrorKind::AlreadyExists,
        }
    }
}

impl From<CollectionNotFound> for UserRepoError {
    fn from(value: CollectionNotFound) -> Self {
        Self::NotFound(UserLookup::Id(value.0))
    }
}

#[derive(Debug, Default)]
struct UserTable {
    users: IndexedCollection<User>,
    by_login: HashMap<String, UserId>,
}

impl UserTable {
    fn find_by_login(&self, login: &str) -> Option<&User> {
        let id = self.by_login.get(login)?;
        self.users.get(*id).ok()
    }
}

/// Concurrency-safe store of users.
#[derive(Debug, Default)]
pub struct UserRepository {
    table: Mutex<UserTable>,
}

impl UserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a user whose password has already been hashed.
    ///
    /// # Errors
    /// - `AlreadyExists` when another live user holds `login`.
    pub fn create_user(
        &self,
        login: &str,
        password_hash: PasswordHash,
        profile: UserProfile,
        is_admin: bool,
    ) -> UserRepoResult<User> {
        let mut table = self.lock();
        if table.by_login.contains_key(login) {
            debug!("event=user_create module=repo status=conflict");
            return Err(UserRepoError::AlreadyExists(login.to_string()));
        }

        let (id, stored) = table
            .users
            .add_with(|id| User::new(id, login, password_hash, profile, is_admin));
        let created = stored.clone();
        table.by_login.insert(created.login.clone(), id);

        info!("event=user_create module=repo status=ok user_id={id} is_admin={is_admin}");
        Ok(created)
    }

    pub fn get_user(&self, id: UserId) -> UserRepoResult<User> {
        Ok(self.lock().users.get(id)?.clone())
    }

    pub fn get_user_by_login(&self, login: &str) -> UserRepoResult<User> {
        self.lock()
            .find_by_login(login)
            .cloned()
            .ok_or_else(|| UserRepoError::NotFound(UserLookup::Login(login.to_string())))
    }

    /// Removes a user and its login index entry.
    pub fn delete_user(&self, id: UserId) -> UserRepoResult<()> {
        let mut table = self.lock();
        let removed = table.users.delete(id)?;
        table.by_login.remove(&removed.login);
        info!("event=user_delete module=repo status=ok user_id={id}");
        Ok(())
    }

    /// Returns every user in creation order.
    pub fn list_users(&self) -> Vec<User> {
        self.lock().users.list()
    }

    pub fn len(&self) -> usize {
        self.lock().users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().users.is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, UserTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
