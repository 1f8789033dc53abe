#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Profile store implementations backing player progression.

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use night_shift_core::{Profile, ProfileStore};
use thiserror::Error;

/// Failures raised while reading or writing the profile file.
#[derive(Debug, Error)]
pub enum ProfileStoreError {
    /// The profile file exists but could not be read.
    #[error("failed to read profiles from {path}")]
    Read {
        /// File that was read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The profile file is not a JSON object of profiles.
    #[error("profiles in {path} are not valid JSON")]
    Parse {
        /// File that was parsed.
        path: PathBuf,
        /// Underlying decoding failure.
        #[source]
        source: serde_json::Error,
    },
    /// The profiles could not be encoded.
    #[error("failed to encode profiles")]
    Encode {
        /// Underlying encoding failure.
        #[source]
        source: serde_json::Error,
    },
    /// The directory holding the profile file could not be created.
    #[error("failed to create profile directory {path}")]
    CreateDir {
        /// Directory that was created.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The profile file could not be written.
    #[error("failed to write profiles to {path}")]
    Write {
        /// File that was written.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
}

/// Profiles held in memory only. Flushing is a no-op.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryProfileStore {
    profiles: BTreeMap<String, Profile>,
}

impl MemoryProfileStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with `profiles`.
    #[must_use]
    pub fn with_profiles(profiles: BTreeMap<String, Profile>) -> Self {
        Self { profiles }
    }

    /// Stored profile for `username` without creating one.
    #[must_use]
    pub fn get(&self, username: &str) -> Option<Profile> {
        self.profiles.get(username).copied()
    }

    /// Number of stored profiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Reports whether no profile is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    fn entry(&mut self, username: &str) -> &mut Profile {
        self.profiles.entry(username.to_owned()).or_default()
    }
}

impl ProfileStore for MemoryProfileStore {
    type Error = Infallible;

    fn profile(&mut self, username: &str) -> Profile {
        *self.entry(username)
    }

    fn add_xp(&mut self, username: &str, amount: u32) -> Profile {
        let profile = self.entry(username);
        *profile = Profile::with_xp(profile.xp.saturating_add(amount));
        *profile
    }

    fn save_profile(&mut self, username: &str, profile: Profile) {
        *self.entry(username) = profile;
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Profiles cached in memory and persisted as a JSON object keyed by username.
#[derive(Debug)]
pub struct JsonProfileStore {
    path: PathBuf,
    cache: MemoryProfileStore,
    dirty: bool,
}

impl JsonProfileStore {
    /// Opens the store at `path`.
    ///
    /// A missing file starts an empty store. An unreadable or corrupt file is
    /// logged and also starts an empty store; it is overwritten on the next
    /// flush.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let profiles = match read_profiles(&path) {
            Ok(Some(profiles)) => {
                tracing::info!(path = %path.display(), count = profiles.len(), "profiles loaded");
                profiles
            }
            Ok(None) => {
                tracing::info!(path = %path.display(), "no profile file yet, starting empty");
                BTreeMap::new()
            }
            Err(error) => {
                tracing::warn!(%error, "profile file ignored, starting empty");
                BTreeMap::new()
            }
        };
        Self {
            path,
            cache: MemoryProfileStore::with_profiles(profiles),
            dirty: false,
        }
    }

    /// Location of the profile file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// In-memory view of the stored profiles.
    #[must_use]
    pub fn cache(&self) -> &MemoryProfileStore {
        &self.cache
    }
}

impl ProfileStore for JsonProfileStore {
    type Error = ProfileStoreError;

    fn profile(&mut self, username: &str) -> Profile {
        if self.cache.get(username).is_none() {
            self.dirty = true;
        }
        self.cache.profile(username)
    }

    fn add_xp(&mut self, username: &str, amount: u32) -> Profile {
        self.dirty = true;
        self.cache.add_xp(username, amount)
    }

    fn save_profile(&mut self, username: &str, profile: Profile) {
        self.dirty = true;
        self.cache.save_profile(username, profile);
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        if !self.dirty {
            return Ok(());
        }
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ProfileStoreError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let encoded = serde_json::to_string_pretty(&self.cache.profiles)
            .map_err(|source| ProfileStoreError::Encode { source })?;
        fs::write(&self.path, encoded).map_err(|source| ProfileStoreError::Write {
            path: self.path.clone(),
            source,
        })?;
        self.dirty = false;
        tracing::debug!(path = %self.path.display(), count = self.cache.len(), "profiles flushed");
        Ok(())
    }
}

fn read_profiles(path: &Path) -> Result<Option<BTreeMap<String, Profile>>, ProfileStoreError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ProfileStoreError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    if raw.trim().is_empty() {
        return Ok(Some(BTreeMap::new()));
    }
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| ProfileStoreError::Parse {
            path: path.to_path_buf(),
            source,
        })
}
