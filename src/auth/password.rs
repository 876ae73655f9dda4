//! Password hashing (bcrypt)

use anyhow::{bail, Context, Result};
use bcrypt::{hash, verify, DEFAULT_COST};

/// Hash a plaintext password for storage
pub fn hash_password(password: &str) -> Result<String> {
    hash(password, DEFAULT_COST).context("Failed to hash password")
}

/// Succeeds only when `password` matches `hashed`
pub fn check_password(password: &str, hashed: &str) -> Result<()> {
    let valid = verify(password, hashed).context("Failed to verify password")?;
    if !valid {
        bail!("password does not match");
    }
    Ok(())
}
