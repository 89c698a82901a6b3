use serde::{Deserialize, Serialize};

/// Claims embedded in the JWT access token. Decoded client-side for UI gating
/// only — the server re-verifies the signature on every call that matters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub email: String,
    pub role: String,
    /// Opaque role identifier, shape owned by the server.
    #[serde(rename = "roleId", default)]
    pub role_id: Option<serde_json::Value>,
    #[serde(default)]
    pub permissions: Vec<String>,
    pub exp: Option<i64>,
}

/// Identity derived from the decoded token, as exposed to the UI layer.
#[derive(Debug, Clone)]
pub struct TokenUser {
    pub user_id: String,
    pub email: String,
    pub role: String,
    pub role_id: Option<serde_json::Value>,
    pub permissions: Vec<String>,
}

impl From<Claims> for TokenUser {
    fn from(c: Claims) -> Self {
        Self {
            user_id: c.user_id,
            email: c.email,
            role: c.role,
            role_id: c.role_id,
            permissions: c.permissions,
        }
    }
}

/// User object cached alongside the token at login. Display-only: it is never
/// re-validated against the claims after login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub surname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    pub surname: String,
    pub lastname: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// The `otp` field is only echoed back by development builds of the server;
/// production responds with the same message whether or not the email exists.
#[derive(Debug, Clone, Deserialize)]
pub struct ForgotPasswordResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub otp: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResetPasswordRequest {
    pub otp: String,
    #[serde(rename = "newPassword")]
    pub new_password: String,
}
