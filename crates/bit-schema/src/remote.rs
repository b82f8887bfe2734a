//! Remote scopes declared in a manifest's `remotes` map.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

const FILE_SCHEME: &str = "file://";
const HTTP_SCHEMES: [&str; 2] = ["http://", "https://"];

/// Where a remote scope lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "location", rename_all = "lowercase")]
pub enum RemoteLocation {
    /// A scope directory on a local or mounted filesystem.
    Filesystem(PathBuf),
    /// Base URL of an HTTP scope server, without trailing slash.
    Http(String),
}

impl RemoteLocation {
    /// Normalize a location string. Parsing the display form of the result
    /// yields the same location again.
    pub fn parse(location: &str) -> Self {
        let mut location = location.trim();
        while let Some(rest) = location.strip_prefix(FILE_SCHEME) {
            location = rest.trim_start();
        }
        for scheme in HTTP_SCHEMES {
            if let Some(rest) = location.strip_prefix(scheme) {
                let rest = rest.trim_end_matches(|c: char| c == '/' || c.is_whitespace());
                return Self::Http(format!("{scheme}{rest}"));
            }
        }
        Self::Filesystem(PathBuf::from(location))
    }
}

impl fmt::Display for RemoteLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filesystem(path) => write!(f, "{}", path.display()),
            Self::Http(url) => f.write_str(url),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Remote {
    pub name: String,
    #[serde(flatten)]
    pub location: RemoteLocation,
}

impl Remote {
    pub fn new(name: &str, location: &str) -> Self {
        Self {
            name: name.to_owned(),
            location: RemoteLocation::parse(location),
        }
    }
}

/// The remote scopes known to a manifest, keyed by scope name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Remotes {
    entries: BTreeMap<String, Remote>,
}

impl Remotes {
    pub fn load(plain: &BTreeMap<String, String>) -> Self {
        let entries = plain
            .iter()
            .map(|(name, location)| (name.clone(), Remote::new(name, location)))
            .collect();
        Self { entries }
    }

    /// Project back to `name -> location` for serialization.
    pub fn to_plain_object(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|(name, remote)| (name.clone(), remote.location.to_string()))
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&Remote> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Remote> {
        self.entries.values()
    }
}
