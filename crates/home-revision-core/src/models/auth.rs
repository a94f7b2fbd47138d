//! Wire types for the token-issuance and registration endpoints.

use serde::{Deserialize, Serialize};

/// Login/registration request body.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub phone_number: String,
    pub password: String,
}

impl Credentials {
    pub fn new(identifier: &str, secret: &str) -> Self {
        Self {
            phone_number: identifier.to_string(),
            password: secret.to_string(),
        }
    }
}

// Never print the password
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("phone_number", &self.phone_number)
            .finish_non_exhaustive()
    }
}

/// Access/refresh token pair issued on login or registration.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TokenPair { .. }")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_body_shape() {
        let body = serde_json::to_value(Credentials::new("+79990001122", "hunter2"))
            .expect("serialize credentials");
        assert_eq!(
            body,
            serde_json::json!({"phone_number": "+79990001122", "password": "hunter2"})
        );
    }

    #[test]
    fn test_debug_hides_secrets() {
        let creds = Credentials::new("+79990001122", "hunter2");
        assert!(!format!("{:?}", creds).contains("hunter2"));

        let tokens = TokenPair {
            access: "aaa".to_string(),
            refresh: "rrr".to_string(),
        };
        assert_eq!(format!("{:?}", tokens), "TokenPair { .. }");
    }
}
