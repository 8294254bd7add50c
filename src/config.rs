use itertools::Itertools;
use thiserror::Error;

pub const DISCORD_WEBHOOK_URL: &str = "DISCORD_WEBHOOK_URL";
pub const YOUTUBE_CLIENT_ID: &str = "YOUTUBE_CLIENT_ID";
pub const YOUTUBE_CLIENT_SECRET: &str = "YOUTUBE_CLIENT_SECRET";
pub const YOUTUBE_REFRESH_TOKEN: &str = "YOUTUBE_REFRESH_TOKEN";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required YouTube API credentials in environment variables: {}", .missing.iter().join(", "))]
    MissingCredentials { missing: Vec<&'static str> },
}

/// Everything the bot reads from the process environment, captured once at startup.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub discord_webhook_url: Option<String>,
    pub youtube_client_id: Option<String>,
    pub youtube_client_secret: Option<String>,
    pub youtube_refresh_token: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup. Empty values are treated as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());
        Self {
            discord_webhook_url: get(DISCORD_WEBHOOK_URL),
            youtube_client_id: get(YOUTUBE_CLIENT_ID),
            youtube_client_secret: get(YOUTUBE_CLIENT_SECRET),
            youtube_refresh_token: get(YOUTUBE_REFRESH_TOKEN),
        }
    }

    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        match (
            &self.youtube_client_id,
            &self.youtube_client_secret,
            &self.youtube_refresh_token,
        ) {
            (Some(client_id), Some(client_secret), Some(refresh_token)) => Ok(Credentials {
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
                refresh_token: refresh_token.clone(),
            }),
            _ => {
                let missing = [
                    (YOUTUBE_CLIENT_ID, &self.youtube_client_id),
                    (YOUTUBE_CLIENT_SECRET, &self.youtube_client_secret),
                    (YOUTUBE_REFRESH_TOKEN, &self.youtube_refresh_token),
                ]
                .into_iter()
                .filter(|(_, value)| value.is_none())
                .map(|(key, _)| key)
                .collect();
                Err(ConfigError::MissingCredentials { missing })
            }
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}
