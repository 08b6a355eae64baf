//! Identity Toolkit v1 REST client.
//!
//! Credential checks, token verification and account administration are all
//! delegated to the hosted service; nothing here hashes a password or signs a
//! token.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::IdentityConfig;
use crate::domain::errors::DomainError;
use crate::domain::ports::{Identity, IdentityProvider, NewAccount, SignedIn};

#[derive(Debug, Error)]
pub enum IdentityError {
    /// The service answered with an error code such as `EMAIL_NOT_FOUND`.
    #[error("identity service rejected the request: {0}")]
    Api(String),

    #[error("identity service unreachable: {0}")]
    Transport(String),

    #[error("unexpected identity service response: {0}")]
    Decode(String),
}

impl IdentityError {
    fn is_invalid_token(&self) -> bool {
        matches!(self, IdentityError::Api(code) if matches!(
            code.as_str(),
            "INVALID_ID_TOKEN" | "TOKEN_EXPIRED" | "USER_NOT_FOUND" | "USER_DISABLED"
        ))
    }
}

impl From<IdentityError> for DomainError {
    fn from(e: IdentityError) -> Self {
        let IdentityError::Api(code) = &e else {
            return DomainError::Internal(e.to_string());
        };
        match code.as_str() {
            "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
                DomainError::Unauthorized("Invalid email or password".into())
            }
            "USER_DISABLED" => DomainError::Unauthorized("This account has been disabled".into()),
            "TOO_MANY_ATTEMPTS_TRY_LATER" => {
                DomainError::Unauthorized("Too many attempts, try again later".into())
            }
            "EMAIL_EXISTS" => DomainError::InvalidInput("Email address is already in use".into()),
            "INVALID_EMAIL" | "MISSING_EMAIL" => {
                DomainError::InvalidInput("Invalid email address".into())
            }
            "WEAK_PASSWORD" => {
                DomainError::InvalidInput("Password must be at least 6 characters".into())
            }
            "USER_NOT_FOUND" => DomainError::NotFound,
            _ => DomainError::Internal(e.to_string()),
        }
    }
}

/// Error code of an error body, e.g. `WEAK_PASSWORD` out of
/// `{"error":{"message":"WEAK_PASSWORD : Password should be at least 6 characters"}}`.
fn error_code(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .map(|message| message.split(':').next().unwrap_or_default().trim().to_string())
        .filter(|code| !code.is_empty())
        .unwrap_or_else(|| "UNKNOWN".to_string())
}

/// `iat` claim of an ID token. The signature is the service's concern.
fn issued_at(id_token: &str) -> Option<i64> {
    let payload = id_token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice::<Value>(&bytes).ok()?["iat"].as_i64()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    #[serde(default)]
    email: String,
    id_token: String,
    #[serde(default)]
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    disabled: bool,
    valid_since: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignUpResponse {
    local_id: String,
}

pub struct IdentityToolkitClient {
    base_url: String,
    api_key: String,
    service_token: Option<String>,
    agent: ureq::Agent,
}

impl IdentityToolkitClient {
    pub fn new(config: &IdentityConfig) -> Self {
        Self {
            base_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            service_token: config.service_token.clone(),
            agent: ureq::AgentBuilder::new().timeout(config.timeout).build(),
        }
    }

    /// POST `accounts:<operation>`; `privileged` calls carry the service token.
    fn call<T: DeserializeOwned>(
        &self,
        operation: &str,
        body: Value,
        privileged: bool,
    ) -> Result<T, IdentityError> {
        let url = format!("{}/accounts:{}", self.base_url, operation);
        let mut request = self
            .agent
            .post(&url)
            .query("key", &self.api_key)
            .set("Content-Type", "application/json");
        if let (true, Some(token)) = (privileged, &self.service_token) {
            request = request.set("Authorization", &format!("Bearer {}", token));
        }

        match request.send_json(body) {
            Ok(r) => r
                .into_json::<T>()
                .map_err(|e| IdentityError::Decode(e.to_string())),
            Err(ureq::Error::Status(code, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                let error = error_code(&body);
                log::debug!("accounts:{} failed with {}: {}", operation, code, error);
                Err(IdentityError::Api(error))
            }
            Err(e) => Err(IdentityError::Transport(e.to_string())),
        }
    }
}

impl IdentityProvider for IdentityToolkitClient {
    fn sign_in(&self, email: &str, password: &str) -> Result<SignedIn, DomainError> {
        let resp: SignInResponse = self.call(
            "signInWithPassword",
            json!({ "email": email, "password": password, "returnSecureToken": true }),
            false,
        )?;
        Ok(SignedIn {
            uid: resp.local_id,
            email: resp.email,
            id_token: resp.id_token,
            refresh_token: resp.refresh_token,
        })
    }

    fn verify(&self, id_token: &str) -> Result<Option<Identity>, DomainError> {
        let body = json!({ "idToken": id_token });
        let resp: LookupResponse = match self.call("lookup", body, false) {
            Ok(resp) => resp,
            Err(e) if e.is_invalid_token() => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let Some(user) = resp.users.into_iter().next() else {
            return Ok(None);
        };
        if user.disabled {
            return Ok(None);
        }
        // Sessions are revoked by moving `validSince` past the token's issue time.
        let valid_since = user.valid_since.as_deref().and_then(|s| s.parse::<i64>().ok());
        if let (Some(valid_since), Some(iat)) = (valid_since, issued_at(id_token)) {
            if iat < valid_since {
                return Ok(None);
            }
        }
        Ok(Some(Identity {
            uid: user.local_id,
            email: user.email,
        }))
    }

    fn revoke_sessions(&self, uid: &str) -> Result<(), DomainError> {
        let _: Value = self.call(
            "update",
            json!({ "localId": uid, "validSince": Utc::now().timestamp().to_string() }),
            true,
        )?;
        Ok(())
    }

    fn send_password_reset(&self, email: &str) -> Result<(), DomainError> {
        let _: Value = self.call(
            "sendOobCode",
            json!({ "requestType": "PASSWORD_RESET", "email": email }),
            false,
        )?;
        Ok(())
    }

    fn create_account(&self, account: &NewAccount) -> Result<String, DomainError> {
        let resp: SignUpResponse = self.call(
            "signUp",
            json!({
                "email": account.email,
                "password": account.password,
                "displayName": account.display_name,
            }),
            true,
        )?;
        Ok(resp.local_id)
    }

    fn grant_admin(&self, uid: &str) -> Result<(), DomainError> {
        let claims = json!({ "isAdmin": true }).to_string();
        let _: Value = self.call(
            "update",
            json!({ "localId": uid, "customAttributes": claims }),
            true,
        )?;
        Ok(())
    }

    fn delete_account(&self, uid: &str) -> Result<(), DomainError> {
        let _: Value = self.call("delete", json!({ "localId": uid }), true)?;
        Ok(())
    }
}
