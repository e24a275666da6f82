use bookstore_http::SecretString;
use serde::{Deserialize, Deserializer, Serialize};

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub email: String,
    pub token: SecretString,
}

/// Body of `POST Account/Login`.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::new(password),
        }
    }
}

/// Body of `POST Account/Register`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterForm {
    pub user_name: String,
    pub email: String,
    pub password: SecretString,
    pub confirm_password: SecretString,
}

/// Result of a login or registration attempt.
///
/// Neither call ever fails with an error value; every outcome collapses into
/// one of these with a message ready to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Success {
        message: String,
        /// `None` after a registration that did not sign the user in.
        session: Option<Session>,
    },
    Failure {
        message: String,
    },
}

impl AuthOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Success { message, .. } | Self::Failure { message } => message,
        }
    }
}

/// `data` of a login or registration response.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct AuthData {
    #[serde(alias = "accessToken")]
    pub token: Option<SecretString>,
    #[serde(alias = "userId", deserialize_with = "string_or_number")]
    pub id: Option<String>,
    pub email: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(Option::<Id>::deserialize(deserializer)?.map(|id| match id {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    }))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn register_form_uses_backend_field_names() {
        let form = RegisterForm {
            user_name: "sara".to_owned(),
            email: "sara@example.com".to_owned(),
            password: SecretString::new("pw"),
            confirm_password: SecretString::new("pw"),
        };
        assert_eq!(
            serde_json::to_value(&form).unwrap(),
            json!({
                "userName": "sara",
                "email": "sara@example.com",
                "password": "pw",
                "confirmPassword": "pw"
            })
        );
    }

    #[test]
    fn credentials_debug_hides_password() {
        let creds = Credentials::new("a@b.c", "hunter2");
        assert!(!format!("{creds:?}").contains("hunter2"));
    }

    #[test]
    fn auth_data_accepts_numeric_and_aliased_ids() {
        let numeric: AuthData = serde_json::from_value(json!({"token": "t", "id": 42})).unwrap();
        assert_eq!(numeric.id.as_deref(), Some("42"));

        let aliased: AuthData =
            serde_json::from_value(json!({"accessToken": "t", "userId": "u-7"})).unwrap();
        assert_eq!(aliased.id.as_deref(), Some("u-7"));
        assert_eq!(aliased.token.unwrap().expose(), "t");
    }

    #[test]
    fn auth_data_tolerates_missing_fields() {
        let empty: AuthData = serde_json::from_value(json!({})).unwrap();
        assert!(empty.token.is_none());
        assert!(empty.id.is_none());
    }
}
