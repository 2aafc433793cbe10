use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::{
    auth::{
        dto::{LoginRequest, RegisterRequest},
        jwt::{IssuedToken, SessionKeys},
        password::{hash_password, verify_dummy, verify_password},
        repo::UserRepo,
        repo_types::{NewUser, User},
    },
    db::StoreError,
    error::AppError,
};

pub const INVALID_CREDENTIALS: &str = "invalid email or password";
pub const DUPLICATE_ACCOUNT: &str = "username or email already in use";

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 50;
const EMAIL_MAX: usize = 100;
const PASSWORD_MIN: usize = 8;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    email.chars().count() <= EMAIL_MAX && EMAIL_RE.is_match(email)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_registration(req: &RegisterRequest) -> Result<(), AppError> {
    let username_len = req.username.chars().count();
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&username_len) {
        return Err(AppError::Validation(format!(
            "username must be between {USERNAME_MIN} and {USERNAME_MAX} characters"
        )));
    }
    if !is_valid_email(&req.email) {
        return Err(AppError::Validation("email must be a valid email address".into()));
    }
    if req.password.chars().count() < PASSWORD_MIN {
        return Err(AppError::Validation(format!(
            "password must be at least {PASSWORD_MIN} characters"
        )));
    }
    Ok(())
}

/// Creates an account after validation and a uniqueness check.
pub async fn register(users: &dyn UserRepo, mut req: RegisterRequest) -> Result<User, AppError> {
    req.username = req.username.trim().to_owned();
    req.email = normalize_email(&req.email);
    req.full_name = req.full_name.trim().to_owned();
    validate_registration(&req)?;

    if users
        .count_with_username_or_email(&req.username, &req.email)
        .await?
        > 0
    {
        warn!(username = %req.username, email = %req.email, "username or email already registered");
        return Err(AppError::Conflict(DUPLICATE_ACCOUNT.into()));
    }

    let password_hash = hash_password(&req.password)?;
    let user = users
        .create(NewUser {
            username: req.username,
            email: req.email,
            password_hash,
            full_name: req.full_name,
        })
        .await
        .map_err(|e| match e {
            StoreError::UniqueViolation(constraint) => {
                warn!(?constraint, "registration lost a uniqueness race");
                AppError::Conflict(DUPLICATE_ACCOUNT.into())
            }
            other => AppError::Storage(other),
        })?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok(user)
}

/// Verifies credentials and issues a session token.
///
/// Unknown email and wrong password both yield [`INVALID_CREDENTIALS`].
pub async fn login(
    users: &dyn UserRepo,
    keys: &SessionKeys,
    mut req: LoginRequest,
) -> Result<(User, IssuedToken), AppError> {
    req.email = normalize_email(&req.email);
    if !is_valid_email(&req.email) {
        return Err(AppError::Validation("email must be a valid email address".into()));
    }
    if req.password.is_empty() {
        return Err(AppError::Validation("password is required".into()));
    }

    let Some(user) = users.find_by_email(&req.email).await? else {
        verify_dummy(&req.password);
        warn!(email = %req.email, "login unknown email");
        return Err(AppError::Auth(INVALID_CREDENTIALS.into()));
    };

    if !verify_password(&req.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::Auth(INVALID_CREDENTIALS.into()));
    }

    let issued = keys.sign(user.id, &user.username)?;
    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok((user, issued))
}
