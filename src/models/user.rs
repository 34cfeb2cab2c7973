use serde::{Deserialize, Serialize};

/// Signed-in user as cached under the `auth_user` local storage key
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
}

/// Body of a successful signup or login
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of `GET /api/auth/verify`
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyResponse {
    #[serde(default)]
    pub valid: bool,
    pub user: VerifiedUser,
}

/// The verify endpoint only echoes the token claims, so there is no email
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct VerifiedUser {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Raw signup form input, including the confirmation field that never leaves the client
#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl From<&SignupForm> for SignupRequest {
    fn from(form: &SignupForm) -> Self {
        Self {
            username: form.username.trim().to_string(),
            email: form.email.trim().to_string(),
            password: form.password.clone(),
        }
    }
}
