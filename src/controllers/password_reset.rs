use crate::services::account::AccountService;
use crate::services::api::{ApiClient, ApiError, ApiResult};

/// Four single-digit OTP slots with the focus behaviour of the entry widget:
/// typing advances, backspace on an empty slot retreats, and paste fills all
/// four slots only when the pasted text is exactly 4 digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpInput {
    digits: [Option<char>; 4],
    focus: usize,
}

impl Default for OtpInput {
    fn default() -> Self {
        Self::new()
    }
}

impl OtpInput {
    pub fn new() -> Self {
        Self {
            digits: [None; 4],
            focus: 0,
        }
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    /// Enter a digit at the focused slot and advance. Non-digits are ignored.
    pub fn enter(&mut self, c: char) {
        if !c.is_ascii_digit() {
            return;
        }
        self.digits[self.focus] = Some(c);
        if self.focus < 3 {
            self.focus += 1;
        }
    }

    /// Backspace clears the focused slot, or moves to the previous slot when
    /// the focused one is already empty.
    pub fn backspace(&mut self) {
        if self.digits[self.focus].is_some() {
            self.digits[self.focus] = None;
        } else if self.focus > 0 {
            self.focus -= 1;
        }
    }

    /// Delete clears the focused slot in place.
    pub fn delete(&mut self) {
        self.digits[self.focus] = None;
    }

    /// Paste distributes across all four slots and focuses the last one, but
    /// only when the text is exactly 4 digits; anything else changes nothing.
    pub fn paste(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.len() != 4 || !text.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }
        for (slot, c) in self.digits.iter_mut().zip(text.chars()) {
            *slot = Some(c);
        }
        self.focus = 3;
        true
    }

    pub fn is_complete(&self) -> bool {
        self.digits.iter().all(Option::is_some)
    }

    /// The full code once all four slots are filled.
    pub fn value(&self) -> Option<String> {
        self.digits.iter().copied().collect()
    }
}

/// The two steps of the recovery flow, plus the terminal state that hands
/// control back to the login entry point.
#[derive(Debug)]
pub enum ResetFlow {
    Request {
        email: String,
    },
    Reset {
        otp: OtpInput,
        new_password: String,
        confirm_password: String,
        /// OTP echoed back by development servers, kept for display only.
        dev_otp: Option<String>,
    },
    Done,
}

pub struct PasswordResetController {
    pub flow: ResetFlow,
    pub error: Option<String>,
    pub notice: Option<String>,
}

impl Default for PasswordResetController {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordResetController {
    pub fn new() -> Self {
        Self {
            flow: ResetFlow::Request {
                email: String::new(),
            },
            error: None,
            notice: None,
        }
    }

    fn fail(&mut self, err: ApiError) -> ApiError {
        self.error = Some(err.to_string());
        err
    }

    pub fn set_email(&mut self, value: impl Into<String>) {
        if let ResetFlow::Request { email } = &mut self.flow {
            *email = value.into();
            self.error = None;
        }
    }

    pub fn set_new_password(&mut self, value: impl Into<String>) {
        if let ResetFlow::Reset { new_password, .. } = &mut self.flow {
            *new_password = value.into();
            self.error = None;
        }
    }

    pub fn set_confirm_password(&mut self, value: impl Into<String>) {
        if let ResetFlow::Reset {
            confirm_password, ..
        } = &mut self.flow
        {
            *confirm_password = value.into();
            self.error = None;
        }
    }

    pub fn otp_mut(&mut self) -> Option<&mut OtpInput> {
        match &mut self.flow {
            ResetFlow::Reset { otp, .. } => Some(otp),
            _ => None,
        }
    }

    /// Submit the email. Success always moves to the reset step: the server
    /// does not reveal whether the email exists.
    pub async fn submit_request(&mut self, api: &ApiClient) -> ApiResult<()> {
        let ResetFlow::Request { email } = &self.flow else {
            return Ok(());
        };
        if email.trim().is_empty() {
            let err = ApiError::Validation("Por favor ingresa tu email".into());
            return Err(self.fail(err));
        }

        match AccountService::forgot_password(api, email).await {
            Ok(response) => {
                self.notice = Some(match &response.otp {
                    Some(otp) => format!("Código OTP generado: {otp}"),
                    None => {
                        "Si el email existe, se ha enviado un código OTP para restablecer tu contraseña"
                            .into()
                    }
                });
                self.error = None;
                self.flow = ResetFlow::Reset {
                    otp: OtpInput::new(),
                    new_password: String::new(),
                    confirm_password: String::new(),
                    dev_otp: response.otp,
                };
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Submit the new password. Validation order: OTP completeness, password
    /// presence, password length, password match.
    pub async fn submit_reset(&mut self, api: &ApiClient) -> ApiResult<()> {
        let ResetFlow::Reset {
            otp,
            new_password,
            confirm_password,
            ..
        } = &self.flow
        else {
            return Ok(());
        };

        let Some(code) = otp.value() else {
            let err =
                ApiError::Validation("Por favor ingresa el código OTP completo de 4 dígitos".into());
            return Err(self.fail(err));
        };
        if new_password.trim().is_empty() {
            let err = ApiError::Validation("Por favor ingresa tu nueva contraseña".into());
            return Err(self.fail(err));
        }
        if new_password.len() < 6 {
            let err = ApiError::Validation("La contraseña debe tener al menos 6 caracteres".into());
            return Err(self.fail(err));
        }
        if new_password != confirm_password {
            let err = ApiError::Validation("Las contraseñas no coinciden".into());
            return Err(self.fail(err));
        }

        match AccountService::reset_password(api, &code, new_password).await {
            Ok(_) => {
                self.notice = Some(
                    "Contraseña restablecida exitosamente. Puedes iniciar sesión ahora.".into(),
                );
                self.error = None;
                self.flow = ResetFlow::Done;
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::session::SessionStore;
    use std::sync::Arc;

    fn offline_api() -> ApiClient {
        ApiClient::new("http://127.0.0.1:1", Arc::new(SessionStore::in_memory()))
    }

    fn reset_controller() -> PasswordResetController {
        let mut c = PasswordResetController::new();
        c.flow = ResetFlow::Reset {
            otp: OtpInput::new(),
            new_password: String::new(),
            confirm_password: String::new(),
            dev_otp: None,
        };
        c
    }

    #[test]
    fn typing_advances_focus() {
        let mut otp = OtpInput::new();
        otp.enter('1');
        otp.enter('2');
        assert_eq!(otp.focus(), 2);
        otp.enter('x');
        assert_eq!(otp.focus(), 2);
        otp.enter('3');
        otp.enter('4');
        assert_eq!(otp.focus(), 3);
        assert_eq!(otp.value().as_deref(), Some("1234"));
    }

    #[test]
    fn backspace_clears_then_retreats() {
        let mut otp = OtpInput::new();
        otp.enter('1');
        otp.enter('2');
        // Focus sits on the empty third slot.
        otp.backspace();
        assert_eq!(otp.focus(), 1);
        otp.backspace();
        assert_eq!(otp.focus(), 1);
        assert!(otp.value().is_none());
    }

    #[test]
    fn paste_requires_exactly_four_digits() {
        let mut otp = OtpInput::new();
        assert!(otp.paste("1234"));
        assert_eq!(otp.focus(), 3);
        assert_eq!(otp.value().as_deref(), Some("1234"));

        let mut otp = OtpInput::new();
        assert!(!otp.paste("12a4"));
        assert!(!otp.paste("123"));
        assert!(!otp.paste("12345"));
        assert!(otp.value().is_none());
        assert_eq!(otp.focus(), 0);
    }

    #[tokio::test]
    async fn empty_email_is_rejected_before_the_network() {
        let api = offline_api();
        let mut c = PasswordResetController::new();
        let err = c.submit_request(&api).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(c.error.as_deref(), Some("Por favor ingresa tu email"));
    }

    #[tokio::test]
    async fn reset_validation_order() {
        let api = offline_api();
        let mut c = reset_controller();

        // 1. OTP completeness.
        let err = c.submit_reset(&api).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Por favor ingresa el código OTP completo de 4 dígitos"
        );

        // 2. Password presence.
        c.otp_mut().unwrap().paste("1234");
        let err = c.submit_reset(&api).await.unwrap_err();
        assert_eq!(err.to_string(), "Por favor ingresa tu nueva contraseña");

        // 3. Password length.
        c.set_new_password("abc");
        let err = c.submit_reset(&api).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "La contraseña debe tener al menos 6 caracteres"
        );

        // 4. Password match.
        c.set_new_password("secreta123");
        c.set_confirm_password("secreta124");
        let err = c.submit_reset(&api).await.unwrap_err();
        assert_eq!(err.to_string(), "Las contraseñas no coinciden");
    }
}
