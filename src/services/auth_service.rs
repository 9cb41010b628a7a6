use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use password_hash::rand_core::OsRng;

use crate::{
    audit::log_audit,
    dto::auth::{LoginRequest, RegisterRequest},
    entity::User,
    error::{AppError, AppResult},
    middleware::auth::CurrentUser,
    state::AppState,
};

pub async fn register_user(state: &AppState, payload: RegisterRequest) -> AppResult<User> {
    let RegisterRequest { email, password } = payload;

    if !email.contains('@') {
        return Err(AppError::InvalidArgument(
            "A valid email address is required".to_string(),
        ));
    }
    if password.len() < 6 {
        return Err(AppError::InvalidArgument(
            "Password must be at least 6 characters long".to_string(),
        ));
    }

    let store = state.store.as_ref();
    if User::find_by_email(store, &email).await?.is_some() {
        return Err(AppError::InvalidArgument(
            "Email is already taken".to_string(),
        ));
    }

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();

    // Every self-service signup is a plain customer.
    let mut user = User::new(email, password_hash, false);
    user.save(store).await?;

    if let Err(err) = log_audit(
        store,
        user.id,
        "user_register",
        Some("users"),
        None,
    )
    .await
    {
        tracing::warn!(error = ?err, "audit log failed");
    }

    Ok(user)
}

pub async fn login_user(state: &AppState, payload: LoginRequest) -> AppResult<CurrentUser> {
    let LoginRequest { email, password } = payload;
    let store = state.store.as_ref();

    let user = User::find_by_email(store, &email)
        .await?
        .ok_or_else(|| AppError::InvalidArgument("Invalid email or password".to_string()))?;

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    let argon2 = Argon2::default();
    if argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::InvalidArgument(
            "Invalid email or password".to_string(),
        ));
    }

    let user_id = user
        .id
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("stored user without identity")))?;

    if let Err(err) = log_audit(store, Some(user_id), "user_login", Some("users"), None).await {
        tracing::warn!(error = ?err, "audit log failed");
    }

    Ok(CurrentUser {
        user_id,
        email: user.email,
        is_admin: user.is_admin,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    fn state() -> AppState {
        AppState::new(Arc::new(MemoryStore::new()))
    }

    fn request(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn register_then_login() {
        let state = state();
        let user = register_user(&state, request("a@shop.test", "secret123"))
            .await
            .unwrap();
        assert!(!user.is_admin);

        let current = login_user(
            &state,
            LoginRequest {
                email: "a@shop.test".to_string(),
                password: "secret123".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(Some(current.user_id), user.id);
        assert!(!current.is_admin);
    }

    #[tokio::test]
    async fn register_validates_input_and_duplicates() {
        let state = state();

        assert!(matches!(
            register_user(&state, request("no-at-sign", "secret123")).await,
            Err(AppError::InvalidArgument(_))
        ));
        assert!(matches!(
            register_user(&state, request("a@shop.test", "short")).await,
            Err(AppError::InvalidArgument(_))
        ));

        register_user(&state, request("a@shop.test", "secret123"))
            .await
            .unwrap();
        assert!(matches!(
            register_user(&state, request("a@shop.test", "secret456")).await,
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn login_rejects_wrong_password_and_unknown_email() {
        let state = state();
        register_user(&state, request("a@shop.test", "secret123"))
            .await
            .unwrap();

        let wrong = login_user(
            &state,
            LoginRequest {
                email: "a@shop.test".to_string(),
                password: "wrong-password".to_string(),
            },
        )
        .await;
        assert!(matches!(wrong, Err(AppError::InvalidArgument(_))));

        let unknown = login_user(
            &state,
            LoginRequest {
                email: "b@shop.test".to_string(),
                password: "secret123".to_string(),
            },
        )
        .await;
        assert!(matches!(unknown, Err(AppError::InvalidArgument(_))));
    }
}
