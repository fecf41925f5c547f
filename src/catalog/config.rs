//! Catalog and service configuration.
//!
//! The catalog is a JSON file read once at startup:
//!
//! ```json
//! {
//!   "base": 1024,
//!   "hash": "sha256",
//!   "odd_node": "pair_with_zero",
//!   "pair_ordering": "sorted",
//!   "records": [{ "x": 9, "y": 5, "z": 0, "nonce": 2748127, "prize": 25 }]
//! }
//! ```
//!
//! Record coordinates are already shifted. Every field except `records` has a
//! default. Environment variables override the tree settings.

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::core::grid::{CodecError, Coordinate, CoordinateCodec, REFERENCE_BASE};
use crate::core::hash::HashAlgorithm;
use crate::proof::merkle::{OddNodePolicy, PairOrdering, TreeSettings};

use super::{reference_catalog, CatalogError, TreasureCatalog, TreasureRecord};

/// Path of the catalog JSON file. Unset means the reference catalog.
pub const ENV_CATALOG_PATH: &str = "TREASURE_CATALOG_PATH";
/// Hash algorithm override.
pub const ENV_HASH: &str = "TREASURE_HASH";
/// Odd-node policy override.
pub const ENV_ODD_NODE: &str = "TREASURE_ODD_NODE";
/// Pair ordering override.
pub const ENV_PAIR_ORDERING: &str = "TREASURE_PAIR_ORDERING";

/// Configuration errors. All are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Catalog file unreadable.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Catalog file is not valid JSON for [`CatalogFile`].
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    /// Grid base out of range.
    #[error("invalid grid: {0}")]
    Grid(#[from] CodecError),

    /// Records failed validation.
    #[error("invalid catalog: {0}")]
    Catalog(#[from] CatalogError),

    /// Environment variable with an unusable value.
    #[error("invalid {var}: {reason}")]
    InvalidEnv {
        /// Variable name.
        var: &'static str,
        /// Parse failure.
        reason: String,
    },
}

/// One record as written in the catalog file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordEntry {
    /// Shifted x.
    pub x: u32,
    /// Shifted y.
    pub y: u32,
    /// Layer.
    pub z: u32,
    /// Record nonce.
    pub nonce: u64,
    /// Record prize.
    pub prize: u64,
}

impl From<RecordEntry> for TreasureRecord {
    fn from(entry: RecordEntry) -> Self {
        TreasureRecord::new(Coordinate::new(entry.x, entry.y, entry.z), entry.nonce, entry.prize)
    }
}

fn default_base() -> u32 {
    REFERENCE_BASE
}

/// On-disk catalog.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CatalogFile {
    /// Grid radix.
    #[serde(default = "default_base")]
    pub base: u32,
    /// Tree settings (flattened into the top-level object).
    #[serde(flatten)]
    pub tree: TreeSettings,
    /// Records in leaf order.
    pub records: Vec<RecordEntry>,
}

impl CatalogFile {
    /// Parse from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a catalog file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Reading treasure catalog from {}", path.display());
        Self::from_json(&json)
    }

    /// Validate into a catalog and its tree settings.
    pub fn into_catalog(self) -> Result<(TreasureCatalog, TreeSettings), ConfigError> {
        let codec = CoordinateCodec::new(self.base)?;
        let records = self.records.into_iter().map(TreasureRecord::from).collect();
        let catalog = TreasureCatalog::new(codec, records)?;
        Ok((catalog, self.tree))
    }
}

/// Process-level settings, usually from the environment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServiceSettings {
    /// Catalog file; `None` selects the built-in reference catalog.
    pub catalog_path: Option<PathBuf>,
    /// Hash override.
    pub hash: Option<HashAlgorithm>,
    /// Odd-node override.
    pub odd_node: Option<OddNodePolicy>,
    /// Pair ordering override.
    pub pair_ordering: Option<PairOrdering>,
}

impl ServiceSettings {
    /// Read settings from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read settings through an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());

        Ok(Self {
            catalog_path: get(ENV_CATALOG_PATH).map(PathBuf::from),
            hash: parse_var(ENV_HASH, get(ENV_HASH))?,
            odd_node: parse_var(ENV_ODD_NODE, get(ENV_ODD_NODE))?,
            pair_ordering: parse_var(ENV_PAIR_ORDERING, get(ENV_PAIR_ORDERING))?,
        })
    }

    /// Apply overrides on top of file-level settings.
    pub fn apply(&self, base: TreeSettings) -> TreeSettings {
        TreeSettings {
            hash: self.hash.unwrap_or(base.hash),
            odd_node: self.odd_node.unwrap_or(base.odd_node),
            pair_ordering: self.pair_ordering.unwrap_or(base.pair_ordering),
        }
    }

    /// Load the configured catalog and the effective tree settings.
    pub fn load(&self) -> Result<(TreasureCatalog, TreeSettings), ConfigError> {
        let (catalog, file_settings) = match &self.catalog_path {
            Some(path) => CatalogFile::load(path)?.into_catalog()?,
            None => {
                info!("No {} set, using reference catalog", ENV_CATALOG_PATH);
                (reference_catalog()?, TreeSettings::default())
            }
        };
        Ok((catalog, self.apply(file_settings)))
    }
}

fn parse_var<T>(var: &'static str, value: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|err| ConfigError::InvalidEnv { var, reason: err.to_string() })
        })
        .transpose()
}
