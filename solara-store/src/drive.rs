use chrono::Utc;
use futures_util::future::join_all;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::app_config::DriveConfig;

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3/files";
const FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";
const JWT_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Uploads run concurrently within a batch; batches run sequentially
/// so the storage provider is never hit with more than this many
/// simultaneous uploads.
pub const UPLOAD_BATCH_SIZE: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum DriveError {
    #[error("credential error: {0}")]
    Key(#[from] jsonwebtoken::errors::Error),
    #[error("drive transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("drive API returned status {status}: {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Serialize)]
struct DriveJwtClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct FileResponse {
    id: String,
}

struct CachedToken {
    token: String,
    expires_at: i64,
}

/// A named buffer to push into the drive folder.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Gateway to the cloud drive: service-account auth, folder uploads,
/// sharing permissions, stable view links.
pub struct DriveClient {
    http: reqwest::Client,
    config: DriveConfig,
    token: Mutex<Option<CachedToken>>,
}

impl DriveClient {
    pub fn new(config: DriveConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            token: Mutex::new(None),
        }
    }

    /// Exchange a signed RS256 assertion for a bearer token. Cached
    /// until a minute before expiry.
    async fn access_token(&self) -> Result<String, DriveError> {
        let now = Utc::now().timestamp();

        let mut guard = self.token.lock().await;
        if let Some(cached) = guard.as_ref() {
            if cached.expires_at - 60 > now {
                return Ok(cached.token.clone());
            }
        }

        let claims = DriveJwtClaims {
            iss: &self.config.client_email,
            scope: DRIVE_SCOPE,
            aud: TOKEN_URL,
            iat: now,
            exp: now + 3600,
        };
        let key = EncodingKey::from_rsa_pem(self.config.private_key.as_bytes())?;
        let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)?;

        let response = self
            .http
            .post(TOKEN_URL)
            .form(&[("grant_type", JWT_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(DriveError::Api { status, message });
        }

        let body: TokenResponse = response.json().await?;
        let token = body.access_token.clone();
        *guard = Some(CachedToken {
            token: body.access_token,
            expires_at: now + body.expires_in,
        });

        Ok(token)
    }

    /// Upload one file into the configured folder, make it readable by
    /// anyone with the link, and return the view link. The optional
    /// writer grant for the configured share address is best-effort.
    pub async fn upload(&self, file: &UploadFile) -> Result<String, DriveError> {
        let token = self.access_token().await?;

        let boundary = format!("solara-{}", Utc::now().timestamp_millis());
        let metadata = json!({
            "name": file.name,
            "parents": [self.config.folder_id],
        });

        // Drive's multipart upload wants multipart/related, which
        // reqwest's form support does not produce; build it by hand.
        let mut body = Vec::with_capacity(file.bytes.len() + 512);
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{}\r\n",
                boundary, metadata
            )
            .as_bytes(),
        );
        body.extend_from_slice(
            format!("--{}\r\nContent-Type: {}\r\n\r\n", boundary, file.mime_type).as_bytes(),
        );
        body.extend_from_slice(&file.bytes);
        body.extend_from_slice(format!("\r\n--{}--", boundary).as_bytes());

        let response = self
            .http
            .post(format!("{}?uploadType=multipart", UPLOAD_URL))
            .bearer_auth(&token)
            .header(CONTENT_TYPE, format!("multipart/related; boundary={}", boundary))
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(DriveError::Api { status, message });
        }

        let created: FileResponse = response.json().await?;
        info!(file_id = %created.id, name = %file.name, "file uploaded to drive");

        self.set_permission(&token, &created.id, &json!({ "role": "reader", "type": "anyone" }))
            .await?;

        if let Some(email) = &self.config.share_with {
            let grant = json!({ "role": "writer", "type": "user", "emailAddress": email });
            if let Err(err) = self.set_permission(&token, &created.id, &grant).await {
                warn!(file_id = %created.id, error = %err, "failed to grant writer permission");
            }
        }

        Ok(view_link(&created.id))
    }

    /// Upload files in batches of [`UPLOAD_BATCH_SIZE`]; a failed file
    /// does not cancel the rest of its batch.
    pub async fn upload_batch(
        &self,
        files: &[UploadFile],
    ) -> Vec<(String, Result<String, DriveError>)> {
        let mut results = Vec::with_capacity(files.len());
        for batch in files.chunks(UPLOAD_BATCH_SIZE) {
            let uploads = join_all(batch.iter().map(|file| self.upload(file))).await;
            for (file, outcome) in batch.iter().zip(uploads) {
                results.push((file.name.clone(), outcome));
            }
        }
        results
    }

    async fn set_permission(
        &self,
        token: &str,
        file_id: &str,
        permission: &Value,
    ) -> Result<(), DriveError> {
        let response = self
            .http
            .post(format!("{}/{}/permissions", FILES_URL, file_id))
            .bearer_auth(token)
            .json(permission)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            Err(DriveError::Api { status, message })
        }
    }
}

pub fn view_link(file_id: &str) -> String {
    format!("https://drive.google.com/file/d/{}/view", file_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_link_format() {
        assert_eq!(
            view_link("1AbC_dEf"),
            "https://drive.google.com/file/d/1AbC_dEf/view"
        );
    }

    #[test]
    fn test_jwt_claims_serialize_for_token_exchange() {
        let claims = DriveJwtClaims {
            iss: "svc@project.iam.gserviceaccount.com",
            scope: DRIVE_SCOPE,
            aud: TOKEN_URL,
            iat: 1_700_000_000,
            exp: 1_700_003_600,
        };

        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["iss"], "svc@project.iam.gserviceaccount.com");
        assert_eq!(json["aud"], TOKEN_URL);
        assert_eq!(json["exp"].as_i64().unwrap() - json["iat"].as_i64().unwrap(), 3600);
    }
}
