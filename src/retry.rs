//! Driving a resumable upload to completion.
//!
//! Every attempt either finishes the upload, fails fatally, or fails in a way
//! worth retrying. Retriable failures back off for a random duration below
//! `2^retry` seconds, and the loop gives up once the retry counter passes
//! [`MAX_RETRIES`].

use std::time::Duration;

use google_youtube3::api::Video;
use rand::Rng;
use serenity::async_trait;
use tracing::{info, warn};

use crate::error::{ChunkError, UploadError};

pub const MAX_RETRIES: u32 = 3;

pub const RETRIABLE_STATUS_CODES: [u16; 4] = [500, 502, 503, 504];

/// One attempt at a resumable transfer. An attempt sends every remaining
/// chunk and resolves to the final resource, or fails part way.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChunkedUpload: Send {
    async fn next_chunk(&mut self) -> Result<Video, ChunkError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub retriable_status_codes: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            retriable_status_codes: RETRIABLE_STATUS_CODES.to_vec(),
        }
    }
}

impl RetryPolicy {
    pub fn is_retriable(&self, err: &ChunkError) -> bool {
        match err {
            ChunkError::Status { code, .. } => self.retriable_status_codes.contains(code),
            ChunkError::Transport(_) => true,
            ChunkError::Rejected(_) => false,
        }
    }

    /// Random delay in `[0, 2^retry)` seconds.
    pub fn backoff<R: Rng>(&self, retry: u32, rng: &mut R) -> Duration {
        let max_sleep = 2f64.powi(retry.min(16) as i32);
        Duration::from_secs_f64(rng.gen::<f64>() * max_sleep)
    }
}

pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

/// Requests chunks until the upload completes and returns the new video id.
pub async fn resumable_upload<U, S>(
    upload: &mut U,
    policy: &RetryPolicy,
    sleeper: &S,
) -> Result<String, UploadError>
where
    U: ChunkedUpload + ?Sized,
    S: Sleeper + ?Sized,
{
    let mut retry = 0;

    loop {
        info!("Uploading file...");
        let err = match upload.next_chunk().await {
            Ok(video) => {
                return match video.id {
                    Some(id) => {
                        info!("Video uploaded successfully! Video ID: {id}");
                        info!("Video URL: {}", watch_url(&id));
                        Ok(id)
                    }
                    None => Err(UploadError::UnexpectedResponse(format!("{video:?}"))),
                };
            }
            Err(err) if policy.is_retriable(&err) => err,
            Err(ChunkError::Status { code, body }) => {
                return Err(UploadError::Http { status: code, body });
            }
            Err(err) => return Err(UploadError::Rejected(err.to_string())),
        };

        let error = match &err {
            ChunkError::Status { code, body } => {
                format!("A retriable HTTP error {code} occurred:\n{body}")
            }
            _ => format!("A retriable error occurred: {err}"),
        };
        warn!("{error}");

        retry += 1;
        if retry > policy.max_retries {
            return Err(UploadError::RetriesExhausted {
                retries: policy.max_retries,
                last_error: error,
            });
        }

        let delay = policy.backoff(retry, &mut rand::thread_rng());
        info!(
            "Sleeping {:.3} seconds and then retrying...",
            delay.as_secs_f64()
        );
        sleeper.sleep(delay).await;
    }
}
