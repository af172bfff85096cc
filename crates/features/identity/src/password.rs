use crate::error::IdentityError;

/// bcrypt (`$2b$`) on the blocking pool.
pub async fn hash_password(password: String, cost: u32) -> Result<String, IdentityError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| IdentityError::Internal {
            message: e.to_string().into(),
            context: Some("Password hashing task".into()),
        })?
        .map_err(IdentityError::from)
}

/// `false` for a mismatch and for anything that is not a bcrypt hash, including `""`.
pub async fn verify_password(password: String, hash: String) -> bool {
    if hash.is_empty() {
        return false;
    }
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash).unwrap_or(false))
        .await
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_then_verify() {
        let hash = hash_password("s3cret!".into(), 4).await.unwrap();
        assert!(hash.starts_with("$2b$04$"));
        assert!(verify_password("s3cret!".into(), hash.clone()).await);
        assert!(!verify_password("wrong".into(), hash).await);
    }

    #[tokio::test]
    async fn empty_or_garbage_hash_never_matches() {
        assert!(!verify_password("x".into(), String::new()).await);
        assert!(!verify_password("x".into(), "plaintext".into()).await);
    }
}
