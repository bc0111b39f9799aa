//! OAuth2 installed-app flow against Google's authorization server.
//!
//! Implements the loopback consent flow:
//! 1. **Authorize** by sending the user to `auth_uri` with a `127.0.0.1` redirect
//! 2. **Exchange** the returned code at `token_uri` (`authorization_code` grant)
//! 3. **Refresh** expired access tokens (`refresh_token` grant)

use std::path::Path;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use reqwest::Client;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use url::Url;

use crate::domain::{AppError, Credential, Result};

const CALLBACK_PAGE: &str = "<html><body><h3>Authorization complete.</h3>\
<p>You can close this window and return to the terminal.</p></body></html>";

const CALLBACK_ERROR_PAGE: &str = "<html><body><h3>Authorization failed.</h3>\
<p>Check the terminal for details.</p></body></html>";

/// OAuth client identity from the API console download.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_auth_uri() -> String {
    "https://accounts.google.com/o/oauth2/auth".to_string()
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

/// Outer shape of `client_secret.json`.
#[derive(Debug, Deserialize)]
struct ClientSecretFile {
    #[serde(default)]
    installed: Option<ClientSecret>,
    #[serde(default)]
    web: Option<ClientSecret>,
}

impl ClientSecret {
    /// Loads the client secret descriptor.
    ///
    /// # Errors
    /// `AuthConfigMissing` if the file does not exist, `AuthFlowFailed` if it
    /// cannot be read or holds no client section.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AppError::AuthConfigMissing {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::auth(format!("cannot read '{}': {e}", path.display()))
        })?;

        Self::parse(&content)
            .map_err(|message| AppError::auth(format!("invalid '{}': {message}", path.display())))
    }

    fn parse(content: &str) -> std::result::Result<Self, String> {
        let file: ClientSecretFile = serde_json::from_str(content).map_err(|e| e.to_string())?;
        file.installed
            .or(file.web)
            .ok_or_else(|| "missing 'installed' or 'web' section".to_string())
    }
}

/// Token endpoint answer.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Token endpoint error body.
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Query parameters of the loopback redirect.
#[derive(Debug, Default, Deserialize)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// What the loopback listener received.
#[derive(Debug, PartialEq, Eq)]
enum CallbackOutcome {
    Code { code: String, state: Option<String> },
    Denied(String),
}

impl CallbackParams {
    /// `None` for requests that carry neither a code nor an error.
    fn into_outcome(self) -> Option<CallbackOutcome> {
        match (self.code, self.error) {
            (_, Some(error)) => Some(CallbackOutcome::Denied(error)),
            (Some(code), None) => Some(CallbackOutcome::Code {
                code,
                state: self.state,
            }),
            (None, None) => None,
        }
    }
}

/// Hands the first callback outcome to the waiting consent flow.
type CallbackSlot = Arc<Mutex<Option<oneshot::Sender<CallbackOutcome>>>>;

/// OAuth client bound to one client secret and scope set.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    http: Client,
    secret: ClientSecret,
    scopes: Vec<String>,
}

impl OAuthClient {
    #[must_use]
    pub const fn new(http: Client, secret: ClientSecret, scopes: Vec<String>) -> Self {
        Self {
            http,
            secret,
            scopes,
        }
    }

    /// Builds the URL the user must visit to grant access.
    ///
    /// # Errors
    /// Returns error if the configured `auth_uri` is not a URL.
    pub fn authorization_url(&self, redirect_uri: &str, state: &str) -> Result<Url> {
        let mut url = Url::parse(&self.secret.auth_uri).map_err(|e| {
            AppError::auth(format!("invalid auth_uri '{}': {e}", self.secret.auth_uri))
        })?;

        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.secret.client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("scope", &self.scopes.join(" "))
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent")
            .append_pair("state", state);

        Ok(url)
    }

    /// Runs the interactive consent flow and returns a fresh credential.
    ///
    /// `present` receives the authorization URL and is responsible for showing
    /// it to the user. Blocks until the browser hits the loopback redirect.
    ///
    /// # Errors
    /// Returns `AuthFlowFailed` if the listener cannot be bound, the user
    /// denies access, the state does not match, or the code exchange fails.
    pub async fn run_consent<F>(&self, present: F) -> Result<Credential>
    where
        F: FnOnce(&Url),
    {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| AppError::auth(format!("cannot open local callback listener: {e}")))?;
        let port = listener
            .local_addr()
            .map_err(|e| AppError::auth(format!("cannot read callback address: {e}")))?
            .port();

        let redirect_uri = format!("http://127.0.0.1:{port}/");
        let state = new_state();
        let url = self.authorization_url(&redirect_uri, &state)?;

        let (outcome_tx, outcome_rx) = oneshot::channel();
        let slot: CallbackSlot = Arc::new(Mutex::new(Some(outcome_tx)));
        let router = Router::new()
            .route("/", get(callback_handler))
            .with_state(slot);

        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            let shutdown = async move {
                let _ = stop_rx.await;
            };
            if let Err(e) = axum::serve(listener, router)
                .with_graceful_shutdown(shutdown)
                .await
            {
                tracing::warn!("OAuth callback listener failed: {}", e);
            }
        });

        tracing::debug!(%redirect_uri, "Waiting for OAuth callback");
        present(&url);

        let outcome = outcome_rx
            .await
            .map_err(|_| AppError::auth("callback listener stopped before authorization completed"));
        let _ = stop_tx.send(());

        let code = match outcome? {
            CallbackOutcome::Code {
                code,
                state: returned,
            } => {
                if returned.as_deref() != Some(state.as_str()) {
                    return Err(AppError::auth("state mismatch in OAuth callback"));
                }
                code
            }
            CallbackOutcome::Denied(reason) => {
                return Err(AppError::auth(format!("consent was not granted: {reason}")));
            }
        };

        self.exchange_code(&code, &redirect_uri).await
    }

    /// Exchanges an authorization code for a credential.
    ///
    /// # Errors
    /// Returns `AuthFlowFailed` if the token endpoint rejects the code.
    pub async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<Credential> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.secret.client_id.as_str()),
            ("client_secret", self.secret.client_secret.as_str()),
            ("redirect_uri", redirect_uri),
        ];

        let token = self.request_token(&params).await?;
        tracing::debug!(
            has_refresh_token = token.refresh_token.is_some(),
            expires_in = ?token.expires_in,
            "Authorization code exchanged"
        );

        Ok(Credential::issued(
            token.access_token,
            token.refresh_token,
            token.expires_in,
        ))
    }

    /// Mints a new access token from the credential's refresh token.
    ///
    /// The previous refresh token is kept when the server does not rotate it.
    ///
    /// # Errors
    /// Returns `AuthFlowFailed` if there is no refresh token or the token
    /// endpoint rejects it.
    pub async fn refresh(&self, credential: &Credential) -> Result<Credential> {
        let refresh_token = credential
            .refresh_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::auth("credential has no refresh token"))?;

        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.secret.client_id.as_str()),
            ("client_secret", self.secret.client_secret.as_str()),
        ];

        let token = self.request_token(&params).await?;
        tracing::debug!(expires_in = ?token.expires_in, "Access token refreshed");

        Ok(Credential::issued(
            token.access_token,
            token.refresh_token.or_else(|| Some(refresh_token.to_string())),
            token.expires_in,
        ))
    }

    async fn request_token(&self, params: &[(&str, &str)]) -> Result<TokenResponse> {
        let response = self
            .http
            .post(&self.secret.token_uri)
            .form(params)
            .send()
            .await
            .map_err(|e| AppError::auth(format!("token request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::auth(format!("token response unreadable: {e}")))?;

        if !status.is_success() {
            let reason = serde_json::from_str::<TokenErrorResponse>(&body).map_or_else(
                |_| format!("HTTP {}", status.as_u16()),
                |err| match err.error_description {
                    Some(description) => format!("{}: {description}", err.error),
                    None => err.error,
                },
            );
            return Err(AppError::auth(format!("token endpoint rejected request ({reason})")));
        }

        serde_json::from_str(&body)
            .map_err(|e| AppError::auth(format!("unexpected token response: {e}")))
    }
}

/// Answers the loopback redirect and forwards the first code or error.
async fn callback_handler(
    State(slot): State<CallbackSlot>,
    Query(params): Query<CallbackParams>,
) -> (StatusCode, Html<&'static str>) {
    let Some(outcome) = params.into_outcome() else {
        return (StatusCode::NOT_FOUND, Html(""));
    };

    let page = match outcome {
        CallbackOutcome::Code { .. } => CALLBACK_PAGE,
        CallbackOutcome::Denied(_) => CALLBACK_ERROR_PAGE,
    };

    let sender = slot.lock().ok().and_then(|mut pending| pending.take());
    match sender {
        Some(tx) => {
            let _ = tx.send(outcome);
        }
        None => tracing::debug!("Ignoring repeated OAuth callback"),
    }

    (StatusCode::OK, Html(page))
}

/// Anti-forgery token for the consent round trip: 32 random bytes, hex-encoded.
fn new_state() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}
