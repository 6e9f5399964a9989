use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use super::{
    dto::{AuthResponse, RegisterRequest},
    jwt::JwtKeys,
    password::{hash_password, verify_password},
    repo::UserDirectory,
    repo_types::{NewUser, Role, User},
};
use crate::error::AppError;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Creates a patient account.
pub async fn register_patient(
    users: &dyn UserDirectory,
    req: RegisterRequest,
) -> Result<User, AppError> {
    let email = normalize_email(&req.email);
    let name = req.name.trim().to_string();

    if name.is_empty() {
        return Err(AppError::BadRequest("Name is required".into()));
    }
    if !is_valid_email(&email) {
        return Err(AppError::BadRequest("Invalid email".into()));
    }
    if req.password.len() < 8 {
        return Err(AppError::BadRequest("Password too short".into()));
    }

    let password_hash = hash_password(&req.password)?;
    let phone = req
        .phone
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty());

    let created = users
        .create(NewUser {
            name,
            email: email.clone(),
            password_hash,
            role: Role::Patient,
            phone,
        })
        .await?;

    match created {
        Some(user) => {
            info!(user_id = %user.id, email = %user.email, "user registered");
            Ok(user)
        }
        None => {
            warn!(%email, "email already registered");
            Err(AppError::DuplicateEmail)
        }
    }
}

/// Checks an e-mail/password pair. Unknown e-mail and wrong password are
/// indistinguishable to the caller.
pub async fn authenticate(
    users: &dyn UserDirectory,
    email: &str,
    password: &str,
) -> Result<User, AppError> {
    let email = normalize_email(email);
    let Some(user) = users.find_by_email(&email).await? else {
        warn!(%email, "login unknown email");
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(%email, user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    info!(user_id = %user.id, role = %user.role, "user logged in");
    Ok(user)
}

pub fn issue_tokens(keys: &JwtKeys, user: User) -> Result<AuthResponse, AppError> {
    let access_token = keys.sign_access(user.id, user.role)?;
    let refresh_token = keys.sign_refresh(user.id, user.role)?;
    Ok(AuthResponse {
        access_token,
        refresh_token,
        user: user.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo::MemoryUserDirectory;

    fn registration(email: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Jane Patient".into(),
            email: email.into(),
            password: "long-enough".into(),
            phone: Some(" 555-0100 ".into()),
        }
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a b@c.com"));
    }

    #[tokio::test]
    async fn registers_patient_with_normalized_email() {
        let users = MemoryUserDirectory::default();
        let user = register_patient(&users, registration("  Jane@Example.COM "))
            .await
            .unwrap();
        assert_eq!(user.email, "jane@example.com");
        assert_eq!(user.role, Role::Patient);
        assert_eq!(user.phone.as_deref(), Some("555-0100"));
        assert_ne!(user.password_hash, "long-enough");
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let users = MemoryUserDirectory::default();
        register_patient(&users, registration("jane@example.com")).await.unwrap();
        let err = register_patient(&users, registration("JANE@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateEmail));
    }

    #[tokio::test]
    async fn short_password_is_rejected() {
        let users = MemoryUserDirectory::default();
        let mut req = registration("jane@example.com");
        req.password = "short".into();
        let err = register_patient(&users, req).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn authenticate_checks_hash() {
        let users = MemoryUserDirectory::default();
        register_patient(&users, registration("jane@example.com")).await.unwrap();

        let ok = authenticate(&users, "Jane@Example.com", "long-enough").await.unwrap();
        assert_eq!(ok.email, "jane@example.com");

        let wrong = authenticate(&users, "jane@example.com", "nope-nope").await.unwrap_err();
        assert!(matches!(wrong, AppError::InvalidCredentials));

        let unknown = authenticate(&users, "who@example.com", "long-enough").await.unwrap_err();
        assert!(matches!(unknown, AppError::InvalidCredentials));
    }
}
