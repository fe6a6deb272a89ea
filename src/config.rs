//! Batch-level configuration.
//!
//! This module provides the [`BatchConfig`] struct, which holds every choice
//! made once per batch and applied to every record: rights scheme, media type,
//! collection, duration representation, row arrangement and the structural-map
//! order offset.
//!
//! Each enum accepts the single-letter operator codes (`P`, `R`, `C`, `M` for
//! rights, and so on) as well as full names.
//!
//! # Examples
//!
//! ```
//! use foxmlgen::config::{BatchConfig, MediaType, RightsScheme};
//!
//! let config = BatchConfig::from_json_str(r#"{"rights": "R", "media_type": "audio"}"#)?;
//! assert_eq!(config.rights, RightsScheme::Restricted);
//! assert_eq!(config.media_type, MediaType::Audio);
//! assert_eq!(config.order_base, 1);
//! # Ok::<(), foxmlgen::FoxmlError>(())
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::duration::DurationMode;
use crate::error::{FoxmlError, Result};

/// Access preset applied to every record of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum RightsScheme {
    /// Accessible from anywhere, discoverable via search
    #[default]
    Public,
    /// Accessible on campus only, not discoverable
    Restricted,
    /// Accessible on campus only, discoverable via search
    CampusOnly,
    /// Accessible from anywhere, not discoverable
    Mediated,
}

/// The three concrete values a [`RightsScheme`] stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RightsFlags {
    /// Status written into child (administrative) records
    pub admin_status: &'static str,
    /// Status written into parent (descriptive) records
    pub descriptive_status: &'static str,
    /// Access policy identifier written into child records
    pub access_policy: &'static str,
}

impl RightsScheme {
    /// Expand the preset into its flags.
    #[must_use]
    pub const fn flags(&self) -> RightsFlags {
        match self {
            Self::Public => RightsFlags {
                admin_status: "Complete",
                descriptive_status: "Complete",
                access_policy: "UMDpublic",
            },
            Self::Restricted | Self::Mediated => RightsFlags {
                admin_status: "Complete",
                descriptive_status: "Private",
                access_policy: "UMDfilms00001",
            },
            Self::CampusOnly => RightsFlags {
                admin_status: "Complete",
                descriptive_status: "Complete",
                access_policy: "UMDfilms00001",
            },
        }
    }
}

impl fmt::Display for RightsScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => write!(f, "Public"),
            Self::Restricted => write!(f, "Restricted"),
            Self::CampusOnly => write!(f, "Campus Only"),
            Self::Mediated => write!(f, "Mediated"),
        }
    }
}

impl FromStr for RightsScheme {
    type Err = FoxmlError;

    fn from_str(s: &str) -> Result<Self> {
        match normalize(s).as_str() {
            "p" | "public" => Ok(Self::Public),
            "r" | "restricted" => Ok(Self::Restricted),
            "c" | "campus" | "campusonly" => Ok(Self::CampusOnly),
            "m" | "mediated" => Ok(Self::Mediated),
            _ => Err(FoxmlError::InvalidConfig(format!(
                "unknown rights scheme {s:?} (expected P, R, C, or M)"
            ))),
        }
    }
}

impl TryFrom<String> for RightsScheme {
    type Error = FoxmlError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Kind of media digitized in the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum MediaType {
    /// Sound recordings
    Audio,
    /// Moving images
    #[default]
    Video,
}

impl MediaType {
    /// Element name of the media block in technical metadata.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Video => "video",
        }
    }

    /// MIME type of the derivative files.
    #[must_use]
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Audio => "audio/mpeg",
            Self::Video => "video/x-m4v",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = FoxmlError;

    fn from_str(s: &str) -> Result<Self> {
        match normalize(s).as_str() {
            "a" | "audio" => Ok(Self::Audio),
            "v" | "video" => Ok(Self::Video),
            _ => Err(FoxmlError::InvalidConfig(format!(
                "unknown media type {s:?} (expected A or V)"
            ))),
        }
    }
}

impl TryFrom<String> for MediaType {
    type Error = FoxmlError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Identifier of the collection every parent record belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Collection(String);

impl Collection {
    /// Identifier of the Digital Collections collection.
    pub const DIGITAL_COLLECTIONS: &'static str = "umd:3392";
    /// Identifier of the Films@UM collection.
    pub const FILMS_AT_UM: &'static str = "umd:1158";

    /// The collection identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Collection {
    fn default() -> Self {
        Collection(Self::DIGITAL_COLLECTIONS.to_string())
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Collection {
    type Err = FoxmlError;

    /// Accepts `D`, `F`, the preset names, or a literal `namespace:id`.
    fn from_str(s: &str) -> Result<Self> {
        match normalize(s).as_str() {
            "d" | "digitalcollections" => Ok(Collection(Self::DIGITAL_COLLECTIONS.to_string())),
            "f" | "films@um" | "filmsatum" => Ok(Collection(Self::FILMS_AT_UM.to_string())),
            _ if is_namespaced(s.trim()) => Ok(Collection(s.trim().to_string())),
            _ => Err(FoxmlError::InvalidConfig(format!(
                "unknown collection {s:?} (expected D, F, or a namespace:id identifier)"
            ))),
        }
    }
}

impl TryFrom<String> for Collection {
    type Error = FoxmlError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

fn is_namespaced(s: &str) -> bool {
    match s.split_once(':') {
        Some((ns, id)) => !ns.is_empty() && !id.is_empty() && !s.contains(char::is_whitespace),
        None => false,
    }
}

/// How catalog rows map onto records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum Arrangement {
    /// One row per record; an `XMLType` column marks parents and children
    #[default]
    Multi,
    /// One row per object, producing one parent and one child record
    Single,
}

impl Arrangement {
    /// Identifiers a batch of `rows` rows consumes.
    #[must_use]
    pub const fn identifiers_needed(&self, rows: usize) -> usize {
        match self {
            Self::Multi => rows,
            Self::Single => rows * 2,
        }
    }
}

impl fmt::Display for Arrangement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Multi => write!(f, "multi-row"),
            Self::Single => write!(f, "single-row"),
        }
    }
}

impl FromStr for Arrangement {
    type Err = FoxmlError;

    fn from_str(s: &str) -> Result<Self> {
        match normalize(s).as_str() {
            "m" | "multi" | "multiple" | "multirow" => Ok(Self::Multi),
            "s" | "single" | "singlerow" => Ok(Self::Single),
            _ => Err(FoxmlError::InvalidConfig(format!(
                "unknown row arrangement {s:?} (expected S or M)"
            ))),
        }
    }
}

impl TryFrom<String> for Arrangement {
    type Error = FoxmlError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

fn normalize(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .collect::<String>()
        .to_lowercase()
}

/// Configuration for one batch run.
///
/// # Examples
///
/// ```
/// use foxmlgen::config::{Arrangement, BatchConfig};
/// use foxmlgen::duration::DurationMode;
///
/// let config = BatchConfig {
///     arrangement: Arrangement::Single,
///     duration_mode: DurationMode::Structured,
///     ..Default::default()
/// };
/// assert_eq!(config.content_model, "UMD_VIDEO");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Access preset for every record
    pub rights: RightsScheme,
    /// Media branch of the technical metadata
    pub media_type: MediaType,
    /// Collection parents are members of
    pub collection: Collection,
    /// Representation of durations and run-time totals
    pub duration_mode: DurationMode,
    /// Row-to-record mapping
    pub arrangement: Arrangement,
    /// Structural-map identifier offset for leading collection entries.
    ///
    /// Child `n` (1-based) of a group gets structural-map ID `order_base + n`.
    pub order_base: u32,
    /// Content model label written into every record
    pub content_model: String,
    /// Description of the external streaming reference in child records
    pub ext_ref_description: String,
    /// Prefix of the public access URL in parent summary lines
    pub access_url_prefix: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfig {
            rights: RightsScheme::default(),
            media_type: MediaType::default(),
            collection: Collection::default(),
            duration_mode: DurationMode::default(),
            arrangement: Arrangement::default(),
            order_base: 1,
            content_model: "UMD_VIDEO".to_string(),
            ext_ref_description: "Sharestream".to_string(),
            access_url_prefix: "http://digital.lib.umd.edu/video?pid=".to_string(),
        }
    }
}

impl BatchConfig {
    /// Parse a JSON configuration. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`FoxmlError::JsonError`] for malformed JSON or invalid
    /// selections, and [`FoxmlError::InvalidConfig`] if validation fails.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: BatchConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its contents are invalid.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check values that serde cannot.
    ///
    /// # Errors
    ///
    /// Returns [`FoxmlError::InvalidConfig`] for an empty content model.
    pub fn validate(&self) -> Result<()> {
        if self.content_model.trim().is_empty() {
            return Err(FoxmlError::InvalidConfig(
                "content model must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
