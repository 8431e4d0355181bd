use serde::{Deserialize, Serialize};

/// Request body for signup. `email_ID` is the wire spelling existing
/// clients send; it stays that way.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(rename = "email_ID")]
    pub email: String,
    pub password: String,
}

/// Request body for login, same shape as signup.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(rename = "email_ID")]
    pub email: String,
    pub password: String,
}

/// Response returned after a successful signup or login.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub success: bool,
}

impl TokenResponse {
    pub fn new(token: String) -> Self {
        Self {
            token,
            success: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signup_request_uses_wire_field_names() {
        let req: SignupRequest =
            serde_json::from_str(r#"{"email_ID":"a@b.cc","password":"hunter2"}"#).unwrap();
        assert_eq!(req.email, "a@b.cc");
        assert_eq!(req.password, "hunter2");
    }

    #[test]
    fn login_request_rejects_missing_email_field() {
        let res =
            serde_json::from_str::<LoginRequest>(r#"{"email":"a@b.cc","password":"x"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn token_response_reports_success() {
        let json = serde_json::to_string(&TokenResponse::new("jwt".into())).unwrap();
        assert_eq!(json, r#"{"token":"jwt","success":true}"#);
    }
}
