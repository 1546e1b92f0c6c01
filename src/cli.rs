use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::api::Owner;
use crate::downloader::DEFAULT_THREADS;
use crate::fetch::DEFAULT_ATTEMPTS;
use crate::models::AlbumId;

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Download photos from albums of a user or group
    Albums {
        /// Whose albums to download (defaults to the token owner)
        #[clap(long, conflicts_with = "group")]
        user: Option<i64>,

        /// Download albums of this group instead
        #[clap(long)]
        group: Option<i64>,

        /// Albums to download: "profile", "wall", "saved" or a numeric album id.
        ///
        /// If none are given, the system albums and every listed album are downloaded.
        #[clap(value_name = "ALBUM")]
        albums: Vec<AlbumId>,
    },
    /// Download every photo a user is tagged in
    UserPhotos {
        #[clap(long)]
        user: Option<i64>,
    },
    /// Download the audio tracks of a user or group
    Audios {
        #[clap(long, conflicts_with = "group")]
        user: Option<i64>,

        #[clap(long)]
        group: Option<i64>,
    },
    /// Download the album photos of every friend of a user, one folder per friend
    FriendsPhotos {
        #[clap(long)]
        user: Option<i64>,
    },
}

#[derive(Parser, Debug)]
#[clap(name = "VK Media Downloader", author, version, about, long_about = None)]
pub struct Cli {
    #[clap(subcommand)]
    pub mode: Commands,

    /// Where to save files (If the path doesn't exist, it will be created.)
    #[clap(short = 'o', long, value_name = "PATH", help_heading = "SAVE", global = true)]
    pub output: Option<PathBuf>,

    /// Number of simultaneous downloads
    ///
    /// [max: 32]
    #[clap(
        short = 't',
        long,
        value_name = "NUMBER",
        value_parser(clap::value_parser!(u8).range(1..=32)),
        default_value_t = DEFAULT_THREADS as u8,
        help_heading = "DOWNLOAD",
        global = true,
    )]
    pub threads: u8,

    /// How many times a single file is requested before giving up on it
    #[clap(
        long,
        value_name = "NUMBER",
        value_parser(clap::value_parser!(u32).range(1..=100)),
        default_value_t = DEFAULT_ATTEMPTS,
        help_heading = "DOWNLOAD",
        global = true,
    )]
    pub attempts: u32,

    /// API access token
    #[clap(
        long,
        env = "VKDL_ACCESS_TOKEN",
        hide_env_values = true,
        help_heading = "GENERAL",
        global = true
    )]
    pub token: Option<String>,

    /// API version sent with every request
    #[clap(long, env = "VKDL_API_VERSION", help_heading = "GENERAL", global = true)]
    pub api_version: Option<String>,
}

impl Cli {
    /// Output directory, falling back to the current dir.
    pub fn output_dir(&self) -> Result<PathBuf, std::io::Error> {
        match &self.output {
            Some(path) => Ok(path.clone()),
            None => std::env::current_dir(),
        }
    }
}

/// Group wins over user when both are somehow set; clap already rejects that.
pub const fn owner(user: Option<i64>, group: Option<i64>) -> Owner {
    match (group, user) {
        (Some(gid), _) => Owner::Group(gid),
        (None, Some(uid)) => Owner::User(uid),
        (None, None) => Owner::Current,
    }
}
