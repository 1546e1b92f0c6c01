//! Typed records for the API entities the producers walk, plus the rules that turn
//! a record into a [`DownloadTask`].
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DownloaderError;
use crate::task::DownloadTask;

/// Photo album as returned by `photos.getAlbums`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Album {
    pub aid: i64,
    pub owner_id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub updated: Option<i64>,
}

impl Display for Album {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Album({}_{}, {})", self.owner_id, self.aid, self.title)
    }
}

/// Photo as returned by `photos.get` and `photos.getUserPhotos`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Photo {
    pub pid: i64,
    pub aid: i64,
    pub owner_id: i64,
    #[serde(default)]
    pub src: Option<String>,
    #[serde(default)]
    pub src_small: Option<String>,
    #[serde(default)]
    pub src_big: Option<String>,
    #[serde(default)]
    pub src_xbig: Option<String>,
    #[serde(default)]
    pub src_xxbig: Option<String>,
    #[serde(default)]
    pub src_xxxbig: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

impl Photo {
    /// Largest available size, with the API's escaping backslashes removed.
    pub fn url(&self) -> Option<String> {
        [
            &self.src_xxxbig,
            &self.src_xxbig,
            &self.src_xbig,
            &self.src_big,
            &self.src_small,
            &self.src,
        ]
        .into_iter()
        .find_map(Option::as_deref)
        .map(unescape)
    }

    /// `<dest>/<album id>/<photo id><url extension>`
    pub fn to_task(&self, dest: &Path) -> Result<DownloadTask, DownloaderError> {
        let url = self.url().ok_or_else(|| DownloaderError::MissingField {
            entity: self.to_string(),
            field: "src",
        })?;

        let file = format!("{}{}", self.pid, url_extension(&url));
        let path = dest.join(self.aid.to_string()).join(file);
        Ok(DownloadTask::new(url, path))
    }
}

impl Display for Photo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Photo({}_{})", self.aid, self.pid)
    }
}

/// Track as returned by `audio.get`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Audio {
    pub aid: i64,
    pub owner_id: i64,
    pub artist: String,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub duration: Option<u32>,
}

impl Audio {
    pub fn name(&self) -> String {
        format!("{} - {}", self.artist, self.title)
    }

    pub fn url(&self) -> String {
        unescape(&self.url)
    }

    /// `<dest>/<sanitized "artist - title"><url extension>`
    pub fn to_task(&self, dest: &Path) -> DownloadTask {
        let url = self.url();
        let file = format!("{}{}", sanitize(&self.name()), url_extension(&url));
        DownloadTask::new(url, dest.join(file))
    }
}

impl Display for Audio {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Audio({}_{})", self.owner_id, self.aid)
    }
}

/// Album selector accepted by `photos.get`: one of the system albums or a numeric id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlbumId {
    Profile,
    Wall,
    Saved,
    Id(i64),
}

impl AlbumId {
    /// System albums every account has, walked before the user-created ones.
    pub const SYSTEM: [Self; 3] = [Self::Profile, Self::Wall, Self::Saved];
}

impl FromStr for AlbumId {
    type Err = DownloaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "profile" => Ok(Self::Profile),
            "wall" => Ok(Self::Wall),
            "saved" => Ok(Self::Saved),
            other => other
                .parse::<i64>()
                .map(Self::Id)
                .map_err(|_| DownloaderError::InvalidAlbumId {
                    value: s.to_string(),
                }),
        }
    }
}

impl Display for AlbumId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Profile => write!(f, "profile"),
            Self::Wall => write!(f, "wall"),
            Self::Saved => write!(f, "saved"),
            Self::Id(id) => write!(f, "{id}"),
        }
    }
}

/// Paginated list shape: `[total, item, item, ...]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountedList<T> {
    pub total: u64,
    pub items: Vec<T>,
}

impl<T: DeserializeOwned> CountedList<T> {
    pub fn from_value(value: Value, entity: &'static str) -> Result<Self, DownloaderError> {
        let Value::Array(mut raw) = value else {
            return Err(DownloaderError::InvalidServerResponse {
                method: entity.to_string(),
            });
        };

        if raw.is_empty() {
            return Err(DownloaderError::InvalidServerResponse {
                method: entity.to_string(),
            });
        }

        let total = raw.remove(0).as_u64().ok_or_else(|| {
            DownloaderError::InvalidServerResponse {
                method: entity.to_string(),
            }
        })?;

        Ok(Self {
            total,
            items: decode_list(Value::Array(raw), entity)?,
        })
    }
}

/// Maps a JSON array into typed records.
pub fn decode_list<T: DeserializeOwned>(
    value: Value,
    entity: &'static str,
) -> Result<Vec<T>, DownloaderError> {
    serde_json::from_value(value)
        .map_err(|source| DownloaderError::MalformedResponse { entity, source })
}

#[inline]
fn unescape(url: &str) -> String {
    url.replace('\\', "")
}

/// Replaces everything outside letters, digits, `_`, `-`, `.` and space with `_`.
pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Extension of the URL's path (query and fragment ignored), dot included, or an
/// empty string when there is none.
pub fn url_extension(url: &str) -> String {
    let path = match url::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split(['?', '#']).next().unwrap_or_default().to_string(),
    };

    Path::new(&path)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}
