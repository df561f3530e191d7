//! GCP authentication
//!
//! Produces OAuth2 access tokens for the Document AI and BigQuery REST APIs,
//! either from a service account key (signed JWT exchange) or from the
//! metadata server of the runtime the function is deployed on.

use ring::rand::SystemRandom;
use ring::signature::{RsaKeyPair, RSA_PKCS1_SHA256};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;

use crate::config::GcpConfig;
use crate::error::{Error, Result};

const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";
const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Where access tokens come from
#[derive(Debug, Clone)]
enum TokenSource {
    /// Service account JSON key file
    ServiceAccount(PathBuf),
    /// Runtime metadata server
    MetadataServer,
}

/// GCP authentication manager
pub struct GcpAuth {
    source: TokenSource,
    http: reqwest::Client,
    /// Cached access token
    token: Arc<RwLock<Option<CachedToken>>>,
}

#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

#[derive(serde::Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

impl GcpAuth {
    /// Create from service account JSON key file
    pub fn from_service_account(key_path: impl AsRef<Path>) -> Result<Self> {
        let key_path = key_path.as_ref().to_path_buf();
        if !key_path.exists() {
            return Err(Error::Config(format!(
                "Service account key not found: {}",
                key_path.display()
            )));
        }

        Ok(Self::with_source(TokenSource::ServiceAccount(key_path)))
    }

    /// Use the metadata server of the current runtime
    pub fn metadata_server() -> Self {
        Self::with_source(TokenSource::MetadataServer)
    }

    /// Pick the token source from configuration
    pub fn from_config(config: &GcpConfig) -> Result<Self> {
        match &config.credentials_path {
            Some(path) => Self::from_service_account(path),
            None => Ok(Self::metadata_server()),
        }
    }

    fn with_source(source: TokenSource) -> Self {
        Self {
            source,
            http: reqwest::Client::new(),
            token: Arc::new(RwLock::new(None)),
        }
    }

    /// Get a valid access token (refreshing if needed)
    pub async fn get_token(&self) -> Result<String> {
        {
            let token = self.token.read().await;
            if let Some(ref cached) = *token {
                // Token valid for at least 60 more seconds
                if cached.expires_at > Instant::now() + Duration::from_secs(60) {
                    return Ok(cached.access_token.clone());
                }
            }
        }

        let response = match &self.source {
            TokenSource::ServiceAccount(path) => self.exchange_service_account_jwt(path).await?,
            TokenSource::MetadataServer => self.fetch_metadata_token().await?,
        };

        // Tokens are usually valid for an hour; assume 55 minutes when unstated
        let lifetime = Duration::from_secs(response.expires_in.unwrap_or(55 * 60));

        let mut token = self.token.write().await;
        *token = Some(CachedToken {
            access_token: response.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });

        Ok(response.access_token)
    }

    /// Bearer header value for the current token
    pub async fn bearer(&self) -> Result<String> {
        Ok(format!("Bearer {}", self.get_token().await?))
    }

    async fn fetch_metadata_token(&self) -> Result<TokenResponse> {
        let response = self
            .http
            .get(METADATA_TOKEN_URL)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| Error::Auth(format!("Metadata server request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Auth(format!(
                "Metadata server token request failed ({}): {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Auth(format!("Failed to parse metadata token: {}", e)))
    }

    /// Exchange a signed service account assertion for an access token
    async fn exchange_service_account_jwt(&self, key_path: &Path) -> Result<TokenResponse> {
        let key = ServiceAccountKey::load(key_path).await?;
        let assertion = key.signed_assertion(unix_now()?)?;

        let response = self
            .http
            .post(&key.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::Auth(format!("Token exchange request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Auth(format!("Token exchange failed ({}): {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Auth(format!("Failed to parse token response: {}", e)))
    }
}

/// Fields of a service account key file used for the JWT bearer grant
#[derive(serde::Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
    token_uri: String,
}

impl ServiceAccountKey {
    async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read(path).await.map_err(|e| {
            Error::Config(format!("Cannot read service account key {}: {}", path.display(), e))
        })?;
        serde_json::from_slice(&raw)
            .map_err(|e| Error::Config(format!("Malformed service account key: {}", e)))
    }

    /// RS256-signed JWT asserting the cloud-platform scope for one hour
    fn signed_assertion(&self, issued_at: u64) -> Result<String> {
        use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64;
        use base64::Engine;

        let claims = serde_json::json!({
            "iss": self.client_email,
            "scope": CLOUD_PLATFORM_SCOPE,
            "aud": self.token_uri,
            "iat": issued_at,
            "exp": issued_at + 3600,
        });
        let unsigned = format!(
            "{}.{}",
            B64.encode(br#"{"alg":"RS256","typ":"JWT"}"#),
            B64.encode(claims.to_string())
        );

        // Keys copied through env files sometimes carry literal "\n"
        let pem_text = self.private_key.replace("\\n", "\n");
        let der = pem::parse(pem_text)
            .map_err(|e| Error::Auth(format!("Private key is not valid PEM: {}", e)))?;
        let signer = RsaKeyPair::from_pkcs8(der.contents())
            .map_err(|e| Error::Auth(format!("Private key rejected: {}", e)))?;

        let mut signature = vec![0u8; signer.public().modulus_len()];
        signer
            .sign(
                &RSA_PKCS1_SHA256,
                &SystemRandom::new(),
                unsigned.as_bytes(),
                &mut signature,
            )
            .map_err(|e| Error::Auth(format!("JWT signing failed: {}", e)))?;

        Ok(format!("{}.{}", unsigned, B64.encode(signature)))
    }
}

fn unix_now() -> Result<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| Error::Auth(format!("System clock before epoch: {}", e)))
}
