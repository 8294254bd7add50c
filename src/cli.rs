use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::youtube::{parse_tags, Privacy, UploadRequest, VideoMetadata, DEFAULT_CATEGORY_ID};

/// Posts sports news to Discord and uploads videos to YouTube.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch a news update and send it to every notification channel
    News,

    /// Send a message to the Discord webhook
    Notify {
        /// Message text to send
        message: String,
    },

    /// Upload a video to YouTube
    Upload(UploadArgs),
}

#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Path to video file to upload
    #[arg(long)]
    pub file: PathBuf,

    /// Video title
    #[arg(long)]
    pub title: String,

    /// Video description
    #[arg(long)]
    pub description: String,

    /// Comma-separated list of video tags
    #[arg(long)]
    pub tags: Option<String>,

    /// YouTube category ID
    #[arg(long, default_value = DEFAULT_CATEGORY_ID)]
    pub category: String,

    /// Privacy status
    #[arg(long, value_enum, default_value_t = Privacy::Private)]
    pub privacy: Privacy,

    /// Declare the video as made for kids
    #[arg(long)]
    pub made_for_kids: bool,
}

impl From<UploadArgs> for UploadRequest {
    fn from(args: UploadArgs) -> Self {
        UploadRequest {
            file: args.file,
            metadata: VideoMetadata {
                title: args.title,
                description: args.description,
                tags: args.tags.as_deref().map(parse_tags).unwrap_or_default(),
                category_id: args.category,
                privacy: args.privacy,
                made_for_kids: args.made_for_kids,
            },
        }
    }
}
