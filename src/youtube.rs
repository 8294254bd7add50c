use std::path::{Path, PathBuf};

use google_youtube3 as youtube3;
use youtube3::{
    api::{Video, VideoSnippet, VideoStatus},
    hyper, hyper_rustls, oauth2, YouTube,
};
use hyper::client::HttpConnector;
use hyper_rustls::HttpsConnector;
use itertools::Itertools;
use mime::{Mime, SubLevel, TopLevel};
use oauth2::authorized_user::AuthorizedUserSecret;
use serenity::async_trait;
use tracing::{debug, info};

use crate::config::{Config, Credentials};
use crate::error::{ChunkError, UploadError};
use crate::retry::{self, ChunkedUpload, RetryPolicy, TokioSleeper};

pub const UPLOAD_SCOPE: &str = "https://www.googleapis.com/auth/youtube.upload";

/// "People & Blogs"
pub const DEFAULT_CATEGORY_ID: &str = "22";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Privacy {
    #[default]
    Private,
    Public,
    Unlisted,
}

impl Privacy {
    pub fn as_str(self) -> &'static str {
        match self {
            Privacy::Private => "private",
            Privacy::Public => "public",
            Privacy::Unlisted => "unlisted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoMetadata {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub category_id: String,
    pub privacy: Privacy,
    pub made_for_kids: bool,
}

impl VideoMetadata {
    pub fn to_video(&self) -> Video {
        Video {
            snippet: Some(VideoSnippet {
                title: Some(self.title.clone()),
                description: Some(self.description.clone()),
                tags: Some(self.tags.clone()),
                category_id: Some(self.category_id.clone()),
                ..Default::default()
            }),
            status: Some(VideoStatus {
                privacy_status: Some(self.privacy.as_str().to_string()),
                self_declared_made_for_kids: Some(self.made_for_kids),
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

/// Splits a comma-separated tag list, dropping blanks.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(String::from)
        .collect()
}

#[derive(Debug, Clone)]
pub struct VideoFile {
    path: PathBuf,
    mime: Mime,
}

impl VideoFile {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, UploadError> {
        let path = path.into();
        if !path.is_file() {
            return Err(UploadError::FileNotFound { path });
        }
        let mime = guess_mime(&path);
        Ok(Self { path, mime })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mime(&self) -> &Mime {
        &self.mime
    }
}

fn guess_mime(path: &Path) -> Mime {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let essence = match extension.as_deref() {
        Some("mp4" | "m4v") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("webm") => "video/webm",
        Some("mkv") => "video/x-matroska",
        Some("avi") => "video/x-msvideo",
        Some("wmv") => "video/x-ms-wmv",
        Some("flv") => "video/x-flv",
        Some("3gp") => "video/3gpp",
        Some("mpeg" | "mpg") => "video/mpeg",
        _ => return octet_stream(),
    };
    essence.parse().unwrap_or_else(|_| octet_stream())
}

fn octet_stream() -> Mime {
    Mime(TopLevel::Application, SubLevel::OctetStream, vec![])
}

pub struct Hub {
    hub: YouTube<HttpsConnector<HttpConnector>>,
}

impl Hub {
    /// Builds a hub from a refresh token and fetches a first access token, so
    /// bad credentials fail here rather than mid-upload.
    pub async fn connect(credentials: &Credentials) -> Result<Self, UploadError> {
        let secret = AuthorizedUserSecret {
            client_id: credentials.client_id.clone(),
            client_secret: credentials.client_secret.clone(),
            refresh_token: credentials.refresh_token.clone(),
            key_type: "authorized_user".to_string(),
        };
        let auth = oauth2::AuthorizedUserAuthenticator::builder(secret)
            .build()
            .await
            .map_err(|e| UploadError::Auth(e.to_string()))?;
        auth.token(&[UPLOAD_SCOPE])
            .await
            .map_err(|e| UploadError::Auth(e.to_string()))?;
        debug!("Refreshed YouTube access token");

        let connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_native_roots()
            .https_or_http()
            .enable_http1()
            .enable_http2()
            .build();
        let client = hyper::Client::builder().build(connector);

        Ok(Self {
            hub: YouTube::new(client, auth),
        })
    }

    pub fn insert(self, metadata: &VideoMetadata, file: VideoFile) -> VideoInsert {
        VideoInsert {
            hub: self,
            video: metadata.to_video(),
            file,
            session: ResumableSession::default(),
        }
    }
}

/// Remembers the resumable session URL so a retried attempt continues the
/// same upload instead of starting over.
#[derive(Debug, Default)]
struct ResumableSession {
    upload_url: Option<String>,
}

impl youtube3::Delegate for ResumableSession {
    fn upload_url(&mut self) -> Option<String> {
        self.upload_url.clone()
    }

    fn store_upload_url(&mut self, url: Option<&str>) {
        if let Some(url) = url {
            debug!("Resumable upload session: {url}");
        }
        self.upload_url = url.map(str::to_owned);
    }
}

/// One `videos.insert` call with a resumable media body.
pub struct VideoInsert {
    hub: Hub,
    video: Video,
    file: VideoFile,
    session: ResumableSession,
}

#[async_trait]
impl ChunkedUpload for VideoInsert {
    async fn next_chunk(&mut self) -> Result<Video, ChunkError> {
        let reader = std::fs::File::open(&self.file.path)?;
        let result = self
            .hub
            .hub
            .videos()
            .insert(self.video.clone())
            .add_scope(UPLOAD_SCOPE)
            .delegate(&mut self.session)
            .upload_resumable(reader, self.file.mime.clone())
            .await;
        match result {
            Ok((_, video)) => Ok(video),
            Err(err) => Err(classify(err).await),
        }
    }
}

async fn classify(err: youtube3::Error) -> ChunkError {
    match err {
        youtube3::Error::Failure(response) => {
            let status = response.status();
            let body = match hyper::body::to_bytes(response.into_body()).await {
                Ok(bytes) if !bytes.is_empty() => String::from_utf8_lossy(&bytes).into_owned(),
                _ => status.canonical_reason().unwrap_or_default().to_string(),
            };
            ChunkError::Status {
                code: status.as_u16(),
                body,
            }
        }
        youtube3::Error::BadRequest(value) => ChunkError::Status {
            code: error_code(&value).unwrap_or(400),
            body: value.to_string(),
        },
        youtube3::Error::HttpError(err) => ChunkError::Transport(err.to_string()),
        youtube3::Error::Io(err) => ChunkError::Transport(err.to_string()),
        other => ChunkError::Rejected(other.to_string()),
    }
}

/// Status code carried in a Google API error body: `{"error": {"code": 503, ...}}`.
fn error_code(value: &serde_json::Value) -> Option<u16> {
    value["error"]["code"]
        .as_u64()
        .and_then(|code| u16::try_from(code).ok())
}

#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file: PathBuf,
    pub metadata: VideoMetadata,
}

/// Uploads one video and returns its id.
///
/// The file is checked before credentials are looked at, so a bad path never
/// reaches the network.
pub async fn upload(request: UploadRequest, config: &Config) -> Result<String, UploadError> {
    let file = VideoFile::open(&request.file)?;
    let credentials = config.credentials()?;

    info!(
        "Uploading {} ({}) as {:?} [{}] with tags: {}",
        file.path().display(),
        file.mime(),
        request.metadata.title,
        request.metadata.privacy.as_str(),
        request.metadata.tags.iter().join(", ")
    );

    let hub = Hub::connect(&credentials).await?;
    let mut insert = hub.insert(&request.metadata, file);
    retry::resumable_upload(&mut insert, &RetryPolicy::default(), &TokioSleeper).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn metadata() -> VideoMetadata {
        VideoMetadata {
            title: "Match highlights".into(),
            description: "Extended highlights".into(),
            tags: vec!["sports".into(), "news".into()],
            category_id: DEFAULT_CATEGORY_ID.into(),
            privacy: Privacy::default(),
            made_for_kids: false,
        }
    }

    fn request(file: impl Into<PathBuf>) -> UploadRequest {
        UploadRequest {
            file: file.into(),
            metadata: metadata(),
        }
    }

    fn full_config() -> Config {
        Config {
            discord_webhook_url: None,
            youtube_client_id: Some("id".into()),
            youtube_client_secret: Some("secret".into()),
            youtube_refresh_token: Some("token".into()),
        }
    }

    #[test]
    fn tags_are_trimmed_and_blanks_dropped() {
        assert_eq!(
            parse_tags(" sports, news ,,automated, "),
            vec!["sports", "news", "automated"]
        );
        assert!(parse_tags("").is_empty());
    }

    #[test]
    fn metadata_maps_onto_snippet_and_status() {
        let video = metadata().to_video();
        let snippet = video.snippet.unwrap();
        assert_eq!(snippet.title.as_deref(), Some("Match highlights"));
        assert_eq!(snippet.description.as_deref(), Some("Extended highlights"));
        assert_eq!(snippet.tags, Some(vec!["sports".to_string(), "news".to_string()]));
        assert_eq!(snippet.category_id.as_deref(), Some("22"));

        let status = video.status.unwrap();
        assert_eq!(status.privacy_status.as_deref(), Some("private"));
        assert_eq!(status.self_declared_made_for_kids, Some(false));
    }

    #[test]
    fn privacy_names_match_the_api() {
        assert_eq!(Privacy::Private.as_str(), "private");
        assert_eq!(Privacy::Public.as_str(), "public");
        assert_eq!(Privacy::Unlisted.as_str(), "unlisted");
    }

    #[test]
    fn mime_is_guessed_from_extension() {
        assert_eq!(guess_mime(Path::new("clip.MP4")).to_string(), "video/mp4");
        assert_eq!(guess_mime(Path::new("clip.mov")).to_string(), "video/quicktime");
        assert_eq!(guess_mime(Path::new("clip.webm")).to_string(), "video/webm");
        assert_eq!(guess_mime(Path::new("clip.mkv")).to_string(), "video/x-matroska");
        assert_eq!(guess_mime(Path::new("clip")).to_string(), "application/octet-stream");
        assert_eq!(
            guess_mime(Path::new("notes.txt")).to_string(),
            "application/octet-stream"
        );
    }

    #[test]
    fn google_error_bodies_carry_their_status() {
        let body = json!({ "error": { "code": 503, "message": "Backend Error" } });
        assert_eq!(error_code(&body), Some(503));
        assert_eq!(error_code(&json!({ "error": "invalid_grant" })), None);
    }

    #[tokio::test]
    async fn api_errors_are_classified_for_retry() {
        let body = json!({ "error": { "code": 502, "message": "Bad Gateway" } });
        assert_eq!(
            classify(youtube3::Error::BadRequest(body.clone())).await,
            ChunkError::Status {
                code: 502,
                body: body.to_string()
            }
        );

        let quota = json!({ "error": { "code": 403, "message": "quotaExceeded" } });
        assert!(matches!(
            classify(youtube3::Error::BadRequest(quota)).await,
            ChunkError::Status { code: 403, .. }
        ));

        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        assert!(matches!(
            classify(youtube3::Error::Io(io)).await,
            ChunkError::Transport(_)
        ));

        assert!(matches!(
            classify(youtube3::Error::Cancelled).await,
            ChunkError::Rejected(_)
        ));
    }

    #[tokio::test]
    async fn failure_keeps_the_server_error_text() {
        let response = hyper::Response::builder()
            .status(503u16)
            .body(hyper::Body::from("upstream connect error"))
            .unwrap();
        assert_eq!(
            classify(youtube3::Error::Failure(response)).await,
            ChunkError::Status {
                code: 503,
                body: "upstream connect error".into()
            }
        );
    }

    #[tokio::test]
    async fn failure_without_body_falls_back_to_reason() {
        let response = hyper::Response::builder()
            .status(502u16)
            .body(hyper::Body::empty())
            .unwrap();
        assert_eq!(
            classify(youtube3::Error::Failure(response)).await,
            ChunkError::Status {
                code: 502,
                body: "Bad Gateway".into()
            }
        );
    }

    #[test]
    fn uploads_ask_for_the_upload_scope_only() {
        assert_eq!(UPLOAD_SCOPE, "https://www.googleapis.com/auth/youtube.upload");
        assert!(!UPLOAD_SCOPE.ends_with("force-ssl"));
    }

    #[test]
    fn directories_are_not_video_files() {
        let err = VideoFile::open(env!("CARGO_MANIFEST_DIR")).unwrap_err();
        assert!(matches!(err, UploadError::FileNotFound { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn missing_file_fails_before_credentials_are_checked() {
        let err = upload(request("/nonexistent/highlights.mp4"), &Config::default())
            .await
            .unwrap_err();
        match err {
            UploadError::FileNotFound { path } => {
                assert_eq!(path, PathBuf::from("/nonexistent/highlights.mp4"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_file_fails_without_authenticating() {
        let err = upload(request("/nonexistent/highlights.mp4"), &full_config())
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::FileNotFound { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn missing_credentials_fail_before_authenticating() {
        let existing = concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml");
        let err = upload(request(existing), &Config::default())
            .await
            .unwrap_err();
        assert!(
            matches!(err, UploadError::Config(ConfigError::MissingCredentials { .. })),
            "{err:?}"
        );
    }
}
