//! User and API token operations

use rusqlite::{params, OptionalExtension};
use tracing::info;

use super::{parse_datetime, Database};
use crate::auth::{generate_token, hash_password, token_digest, verify_password};
use crate::error::{Error, Result};
use crate::models::User;
use crate::validate::required;

impl Database {
    /// Register a new user
    ///
    /// Username and email must both be unused.
    pub fn create_user(&self, username: &str, email: &str, password: &str) -> Result<User> {
        let username = required("Username", username)?;
        let email = required("Email", email)?;
        if password.is_empty() {
            return Err(Error::Validation("Password is required.".to_string()));
        }

        let conn = self.conn()?;

        let taken: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?)",
            params![username],
            |row| row.get(0),
        )?;
        if taken {
            return Err(Error::Conflict("Username already exists".to_string()));
        }

        let taken: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = ? COLLATE NOCASE)",
            params![email],
            |row| row.get(0),
        )?;
        if taken {
            return Err(Error::Conflict("Email already registered".to_string()));
        }

        let password_hash = hash_password(password)?;
        conn.execute(
            "INSERT INTO users (username, email, password_hash) VALUES (?, ?, ?)",
            params![username, email, password_hash],
        )?;
        let id = conn.last_insert_rowid();
        drop(conn);

        info!(user_id = id, username = %username, "Registered user");
        self.get_user(id)?
            .ok_or_else(|| Error::NotFound(format!("user {}", id)))
    }

    /// Get a user by ID
    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                "SELECT id, username, email, created_at FROM users WHERE id = ?",
                params![id],
                Self::row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Get a user by username
    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                "SELECT id, username, email, created_at FROM users WHERE username = ?",
                params![username.trim()],
                Self::row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Check credentials
    ///
    /// Unknown usernames and wrong passwords fail with the same message.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<User> {
        let invalid = || Error::Unauthorized("Invalid username or password".to_string());

        let conn = self.conn()?;
        let row: Option<(i64, String)> = conn
            .query_row(
                "SELECT id, password_hash FROM users WHERE username = ?",
                params![username.trim()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        drop(conn);

        let (id, stored_hash) = row.ok_or_else(invalid)?;
        if !verify_password(password, &stored_hash) {
            return Err(invalid());
        }

        self.get_user(id)?.ok_or_else(invalid)
    }

    /// Issue a new bearer token for a user; the plaintext is returned once
    pub fn issue_token(&self, user_id: i64) -> Result<String> {
        let token = generate_token();
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO api_tokens (user_id, token_hash) VALUES (?, ?)",
            params![user_id, token_digest(&token)],
        )?;
        Ok(token)
    }

    /// Resolve a bearer token to its user
    pub fn user_for_token(&self, token: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                r#"
                SELECT u.id, u.username, u.email, u.created_at
                FROM api_tokens t
                JOIN users u ON u.id = t.user_id
                WHERE t.token_hash = ?
                "#,
                params![token_digest(token)],
                Self::row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Revoke a bearer token. Returns whether a token was removed.
    pub fn revoke_token(&self, token: &str) -> Result<bool> {
        let conn = self.conn()?;
        let removed = conn.execute(
            "DELETE FROM api_tokens WHERE token_hash = ?",
            params![token_digest(token)],
        )?;
        Ok(removed > 0)
    }

    fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
        let created_at: String = row.get(3)?;
        Ok(User {
            id: row.get(0)?,
            username: row.get(1)?,
            email: row.get(2)?,
            created_at: parse_datetime(&created_at),
        })
    }
}
