//! Admin session store.
//!
//! Tokens are opaque 32-byte random values handed to the client once; only
//! their SHA-256 digest is persisted, so a leaked table cannot mint sessions.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::{Pool, Postgres};
use tracing::{debug, info};

use shelf_core::{Error, Result};

#[derive(Clone)]
pub struct PgSessionRepository {
    pool: Pool<Postgres>,
}

impl PgSessionRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Issue a new session valid for `ttl_seconds`. Returns the bearer token.
    pub async fn issue(&self, ttl_seconds: i64) -> Result<String> {
        let mut raw = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut raw);
        let token = URL_SAFE_NO_PAD.encode(raw);

        let expires_at = Utc::now() + Duration::seconds(ttl_seconds);
        sqlx::query(
            "INSERT INTO admin_session (token_sha256, expires_at_utc) VALUES ($1, $2)",
        )
        .bind(digest(&token))
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "sessions",
            op = "issue",
            "Admin session issued"
        );
        Ok(token)
    }

    /// Check a bearer token against the stored digests. Expired rows are
    /// treated as absent.
    pub async fn verify(&self, token: &str) -> Result<bool> {
        let valid: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM admin_session
                WHERE token_sha256 = $1 AND expires_at_utc > NOW()
            )
            "#,
        )
        .bind(digest(token))
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(valid)
    }

    pub async fn revoke(&self, token: &str) -> Result<()> {
        sqlx::query("DELETE FROM admin_session WHERE token_sha256 = $1")
            .bind(digest(token))
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }

    /// Drop expired rows. Safe to run on any schedule.
    pub async fn purge_expired(&self) -> Result<u64> {
        let purged = sqlx::query("DELETE FROM admin_session WHERE expires_at_utc <= NOW()")
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?
            .rows_affected();

        if purged > 0 {
            debug!(
                subsystem = "db",
                component = "sessions",
                op = "purge_expired",
                result_count = purged,
                "Expired sessions purged"
            );
        }
        Ok(purged)
    }
}

fn digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_stable_and_hex() {
        let d = digest("abc");
        assert_eq!(d.len(), 64);
        assert_eq!(d, digest("abc"));
        assert_ne!(d, digest("abd"));
        assert!(d.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
