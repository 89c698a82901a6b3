use serde_json::Value;

use super::api::{ApiClient, ApiResult};
use crate::models::auth::{
    ForgotPasswordRequest, ForgotPasswordResponse, LoginRequest, LoginResponse, RegisterRequest,
    ResetPasswordRequest,
};

/// Typed wrappers over the authentication endpoints.
pub struct AccountService;

impl AccountService {
    pub async fn login(api: &ApiClient, email: &str, password: &str) -> ApiResult<LoginResponse> {
        api.post(
            "/api/auth/login",
            &LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            },
        )
        .await
    }

    pub async fn register(api: &ApiClient, request: &RegisterRequest) -> ApiResult<Value> {
        api.post("/api/auth/register", request).await
    }

    /// Current user as the server sees it.
    pub async fn me(api: &ApiClient) -> ApiResult<Value> {
        api.get("/api/auth/me").await
    }

    /// Enumeration-safe: the server answers the same whether or not the email
    /// exists. Development builds may echo the OTP back for display.
    pub async fn forgot_password(api: &ApiClient, email: &str) -> ApiResult<ForgotPasswordResponse> {
        api.post(
            "/api/auth/forgot-password",
            &ForgotPasswordRequest {
                email: email.to_string(),
            },
        )
        .await
    }

    pub async fn reset_password(api: &ApiClient, otp: &str, new_password: &str) -> ApiResult<Value> {
        api.post(
            "/api/auth/reset-password",
            &ResetPasswordRequest {
                otp: otp.to_string(),
                new_password: new_password.to_string(),
            },
        )
        .await
    }
}
