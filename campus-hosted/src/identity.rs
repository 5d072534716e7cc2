// GoTrue-backed IdentityProvider.

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use campus_auth::{Identity, IdentityProvider, PendingSignUp};
use campus_core::{CampusError, CampusResult};

use crate::options::HostedOptions;

pub struct HostedIdentity {
    client: Client,
    options: HostedOptions,
    password_min_length: usize,
}

#[derive(Debug, Deserialize)]
struct GoTrueUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: Value,
}

impl GoTrueUser {
    fn full_name(&self) -> Option<String> {
        self.user_metadata
            .get("full_name")
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: GoTrueUser,
}

/// Sign-up answers with either a bare user or a session wrapping one.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session { user: GoTrueUser },
    User(GoTrueUser),
}

/// Message from any of the GoTrue error shapes.
fn error_text(body: &Value) -> String {
    ["msg", "error_description", "message", "error"]
        .iter()
        .find_map(|k| body.get(*k).and_then(Value::as_str))
        .unwrap_or("unknown error")
        .to_string()
}

/// Normalize a failed identity call into a Campus error.
pub(crate) fn classify(status: StatusCode, body: &Value, min_length: usize) -> CampusError {
    let code = body.get("error_code").and_then(Value::as_str).unwrap_or("");
    let text = error_text(body);
    let lower = text.to_lowercase();

    if code == "email_not_confirmed" || lower.contains("email not confirmed") {
        return CampusError::EmailNotConfirmed;
    }
    if code == "user_already_exists" || lower.contains("already registered") {
        return CampusError::DuplicateEmail;
    }
    if code == "weak_password" || lower.starts_with("password should") {
        return CampusError::WeakPassword { min_length };
    }
    if code == "invalid_credentials" || lower.contains("invalid login credentials") {
        return CampusError::InvalidCredentials;
    }
    if status.is_server_error() {
        return CampusError::Backend(text);
    }
    CampusError::Unprocessable {
        message: text.clone(),
        errors: json!({ "_identity": [text] }),
    }
}

impl HostedIdentity {
    pub fn new(options: HostedOptions, password_min_length: usize) -> CampusResult<Self> {
        options.validate()?;
        let client = Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|e| CampusError::Config(format!("http client: {e}")))?;
        Ok(Self {
            client,
            options,
            password_min_length,
        })
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        bearer: Option<&str>,
        body: Option<Value>,
    ) -> CampusResult<(StatusCode, Value)> {
        let mut req = self
            .client
            .request(method, self.options.auth_url(path))
            .header("apikey", &self.options.anon_key);
        if let Some(body) = body {
            req = req.json(&body);
        }
        if let Some(token) = bearer {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await.map_err(|e| {
            debug!(path, error = %e, "gotrue: transport failure");
            CampusError::Network(e.to_string())
        })?;
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| CampusError::Network(e.to_string()))?;
        let value = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };
        Ok((status, value))
    }
}

#[async_trait]
impl IdentityProvider for HostedIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> CampusResult<Identity> {
        let (status, body) = self
            .send(
                Method::POST,
                "token?grant_type=password",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await?;

        if status == StatusCode::BAD_REQUEST {
            // 400 is either bad credentials or an unconfirmed address
            return Err(match classify(status, &body, self.password_min_length) {
                CampusError::EmailNotConfirmed => CampusError::EmailNotConfirmed,
                _ => CampusError::InvalidCredentials,
            });
        }
        if !status.is_success() {
            return Err(classify(status, &body, self.password_min_length));
        }

        let token: TokenResponse = serde_json::from_value(body)?;
        Ok(Identity {
            full_name: token.user.full_name(),
            email: token.user.email.unwrap_or_else(|| email.to_string()),
            user_id: token.user.id,
            provider_token: Some(token.access_token),
        })
    }

    async fn sign_up(&self, email: &str, password: &str, full_name: &str) -> CampusResult<PendingSignUp> {
        let (status, body) = self
            .send(
                Method::POST,
                "signup",
                None,
                Some(json!({
                    "email": email,
                    "password": password,
                    "data": { "full_name": full_name },
                })),
            )
            .await?;
        if !status.is_success() {
            return Err(classify(status, &body, self.password_min_length));
        }

        let user = match serde_json::from_value::<SignUpResponse>(body)? {
            SignUpResponse::Session { user } | SignUpResponse::User(user) => user,
        };
        // GoTrue mails its own confirmation link.
        Ok(PendingSignUp {
            email: user.email.unwrap_or_else(|| email.to_string()),
            user_id: user.id,
            confirmation_token: None,
        })
    }

    async fn sign_out(&self, identity: &Identity) -> CampusResult<()> {
        let Some(token) = identity.provider_token.as_deref() else {
            return Ok(());
        };
        let (status, body) = self.send(Method::POST, "logout", Some(token), None).await?;
        if status.is_success() || status == StatusCode::UNAUTHORIZED {
            return Ok(());
        }
        Err(classify(status, &body, self.password_min_length))
    }

    async fn confirm(&self, token: &str) -> CampusResult<()> {
        let (status, body) = self
            .send(
                Method::POST,
                "verify",
                None,
                Some(json!({ "type": "signup", "token_hash": token })),
            )
            .await?;
        confirm_outcome(status, &body, self.password_min_length)
    }

    async fn delete_user(&self, user_id: &str) -> CampusResult<()> {
        let path = format!("admin/users/{user_id}");
        let (status, body) = self
            .send(Method::DELETE, &path, Some(&self.options.service_key), None)
            .await?;
        if status.is_success() || status == StatusCode::NOT_FOUND {
            return Ok(());
        }
        Err(classify(status, &body, self.password_min_length))
    }
}

/// Verification failures on the client side all mean a bad link.
fn confirm_outcome(status: StatusCode, body: &Value, min_length: usize) -> CampusResult<()> {
    if status.is_success() {
        return Ok(());
    }
    if status.is_client_error() {
        debug!(%status, reason = %error_text(body), "gotrue.verify rejected");
        return Err(CampusError::not_found("Confirmation link is invalid or has expired"));
    }
    Err(classify(status, body, min_length))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_legacy_and_current_error_shapes() {
        let legacy = json!({"error": "invalid_grant", "error_description": "Invalid login credentials"});
        assert!(matches!(
            classify(StatusCode::BAD_REQUEST, &legacy, 6),
            CampusError::InvalidCredentials
        ));

        let current = json!({"code": 400, "error_code": "email_not_confirmed", "msg": "Email not confirmed"});
        assert!(matches!(
            classify(StatusCode::BAD_REQUEST, &current, 6),
            CampusError::EmailNotConfirmed
        ));
    }

    #[test]
    fn sign_up_failures_are_normalized() {
        let dup = json!({"code": 422, "msg": "User already registered"});
        assert!(matches!(
            classify(StatusCode::UNPROCESSABLE_ENTITY, &dup, 6),
            CampusError::DuplicateEmail
        ));

        let weak = json!({"code": 422, "msg": "Password should be at least 6 characters."});
        assert!(matches!(
            classify(StatusCode::UNPROCESSABLE_ENTITY, &weak, 8),
            CampusError::WeakPassword { min_length: 8 }
        ));
    }

    #[test]
    fn unknown_client_errors_keep_their_message() {
        let body = json!({"msg": "Signups not allowed for this instance"});
        let err = classify(StatusCode::FORBIDDEN, &body, 6);
        assert_eq!(err.code(), 422);
        assert_eq!(err.to_string(), "Signups not allowed for this instance");
    }

    #[test]
    fn sign_up_response_accepts_both_shapes() {
        let bare: SignUpResponse =
            serde_json::from_value(json!({"id": "u1", "email": "a@b.co"})).unwrap();
        assert!(matches!(bare, SignUpResponse::User(ref u) if u.id == "u1"));

        let wrapped: SignUpResponse = serde_json::from_value(
            json!({"access_token": "t", "user": {"id": "u2", "email": "a@b.co"}}),
        )
        .unwrap();
        assert!(matches!(wrapped, SignUpResponse::Session { ref user } if user.id == "u2"));
    }

    #[test]
    fn rejected_confirmation_links_are_not_found() {
        let expired = json!({"code": 403, "error_code": "otp_expired", "msg": "Token has expired or is invalid"});
        let err = confirm_outcome(StatusCode::FORBIDDEN, &expired, 6).unwrap_err();
        assert_eq!(err.code(), 404);

        assert!(confirm_outcome(StatusCode::OK, &Value::Null, 6).is_ok());

        let down = json!({"msg": "upstream timeout"});
        let err = confirm_outcome(StatusCode::BAD_GATEWAY, &down, 6).unwrap_err();
        assert!(matches!(err, CampusError::Backend(_)));
    }
}
