//! Google service-account authentication
//!
//! Signs a JWT with the service account key and exchanges it for an OAuth2
//! access token scoped to Sheets and Drive.

use base64::Engine;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;

use crate::error::{Error, Result};

/// Scopes needed to list folders, read grids and write ranges
pub const SCOPES: &str =
    "https://www.googleapis.com/auth/spreadsheets https://www.googleapis.com/auth/drive.readonly";

#[derive(Clone, Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
    token_uri: String,
}

#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// Service-account authentication with a cached access token
pub struct ServiceAccountAuth {
    key: ServiceAccountKey,
    token: Arc<RwLock<Option<CachedToken>>>,
}

impl ServiceAccountAuth {
    /// Load a service account JSON key file
    pub fn from_key_file(key_path: impl AsRef<Path>) -> Result<Self> {
        let key_path = key_path.as_ref();
        if !key_path.exists() {
            return Err(Error::authentication(format!(
                "Credentials file not found: {}",
                key_path.display()
            )));
        }

        let content = std::fs::read_to_string(key_path).map_err(|e| {
            Error::authentication(format!(
                "Failed to read credentials {}: {}",
                key_path.display(),
                e
            ))
        })?;

        Self::from_json(&content)
    }

    /// Parse a service account key from its JSON text
    pub fn from_json(content: &str) -> Result<Self> {
        let key: ServiceAccountKey = serde_json::from_str(content).map_err(|e| {
            Error::authentication(format!("Invalid service account key format: {}", e))
        })?;

        Ok(Self {
            key,
            token: Arc::new(RwLock::new(None)),
        })
    }

    /// Send the token exchange somewhere other than the key's `token_uri`
    pub fn with_token_uri(mut self, token_uri: impl Into<String>) -> Self {
        self.key.token_uri = token_uri.into();
        self
    }

    /// Service account email
    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    /// Get a valid access token (refreshing if needed)
    pub async fn access_token(&self) -> Result<String> {
        {
            let token = self.token.read().await;
            if let Some(ref cached) = *token {
                // Token valid for at least 60 more seconds
                if cached.expires_at > Instant::now() + Duration::from_secs(60) {
                    return Ok(cached.access_token.clone());
                }
            }
        }

        let new_token = self.refresh_token().await?;

        {
            let mut token = self.token.write().await;
            *token = Some(CachedToken {
                access_token: new_token.clone(),
                // Tokens are issued for one hour
                expires_at: Instant::now() + Duration::from_secs(55 * 60),
            });
        }

        Ok(new_token)
    }

    /// Build the signed JWT assertion
    fn signed_assertion(&self) -> Result<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| Error::internal(format!("System clock before UNIX epoch: {}", e)))?
            .as_secs() as i64;

        let claims = serde_json::json!({
            "iss": self.key.client_email,
            "scope": SCOPES,
            "aud": self.key.token_uri,
            "iat": now,
            "exp": now + 3600,
        });

        let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
        let header = engine.encode(r#"{"alg":"RS256","typ":"JWT"}"#.as_bytes());
        let payload = engine.encode(claims.to_string().as_bytes());
        let signing_input = format!("{}.{}", header, payload);

        let private_key = self.key.private_key.replace("\\n", "\n");
        let pem = pem::parse(&private_key)
            .map_err(|e| Error::authentication(format!("Failed to parse private key PEM: {}", e)))?;
        let key_pair = ring::signature::RsaKeyPair::from_pkcs8(pem.contents())
            .map_err(|e| Error::authentication(format!("Failed to parse private key: {}", e)))?;

        let mut signature = vec![0u8; key_pair.public().modulus_len()];
        key_pair
            .sign(
                &ring::signature::RSA_PKCS1_SHA256,
                &ring::rand::SystemRandom::new(),
                signing_input.as_bytes(),
                &mut signature,
            )
            .map_err(|e| Error::authentication(format!("Failed to sign JWT: {}", e)))?;

        Ok(format!("{}.{}", signing_input, engine.encode(&signature)))
    }

    /// Exchange a fresh JWT for an access token
    async fn refresh_token(&self) -> Result<String> {
        let jwt = self.signed_assertion()?;

        let response = reqwest::Client::new()
            .post(&self.key.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", jwt.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::provider(format!("Token exchange request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::authentication(format!(
                "Token exchange failed ({}): {}",
                status, body
            )));
        }

        #[derive(Deserialize)]
        struct TokenResponse {
            access_token: String,
        }

        let token_response: TokenResponse = response.json().await.map_err(|e| {
            Error::authentication(format!("Failed to parse token response: {}", e))
        })?;

        tracing::debug!("Refreshed access token for {}", self.key.client_email);
        Ok(token_response.access_token)
    }

    /// Create HTTP client with auth headers
    pub async fn authorized_client(&self) -> Result<reqwest::Client> {
        let token = self.access_token().await?;
        let mut headers = reqwest::header::HeaderMap::new();
        let value = format!("Bearer {}", token)
            .parse::<reqwest::header::HeaderValue>()
            .map_err(|e| Error::authentication(format!("Invalid access token: {}", e)))?;
        headers.insert(reqwest::header::AUTHORIZATION, value);

        reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| Error::internal(format!("Failed to build HTTP client: {}", e)))
    }
}
