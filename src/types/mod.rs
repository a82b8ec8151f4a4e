use std::collections::BTreeMap;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

use zeroize_derive::{Zeroize, ZeroizeOnDrop};

pub mod error;
pub mod run_context;
pub mod token;

pub const CONTENT_TYPE_JPEG: &str = "image/jpeg";
pub const CONTENT_TYPE_PNG: &str = "image/png";
pub const CONTENT_TYPE_PDF: &str = "application/pdf";

/// Content type written when the source object has none.
pub const FALLBACK_CONTENT_TYPE: &str = CONTENT_TYPE_PNG;

/// Content types that `--exclude-regex` applies to.
pub const PICTURE_CONTENT_TYPES: [&str; 2] = [CONTENT_TYPE_JPEG, CONTENT_TYPE_PNG];

pub const FIXUP_SUMMARY_NAME: &str = "FIXUP_SUMMARY";

/// Outcome of one fix-up attempt.
///
/// Exactly one status is produced for every key that was fixed up without error.
/// The last five variants mean that a metadata-replacing copy has been issued
/// (or simulated, with `--dry-run`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FixupStatus {
    Excluded,
    Skipped,
    CapReached,
    TypeWasUnset,
    Jpeg,
    Png,
    Pdf,
    Other,
}

impl FixupStatus {
    pub fn as_char(&self) -> char {
        match self {
            FixupStatus::Excluded => '-',
            FixupStatus::Skipped => '.',
            FixupStatus::CapReached => '#',
            FixupStatus::TypeWasUnset => 'X',
            FixupStatus::Jpeg => 'j',
            FixupStatus::Png => 'g',
            FixupStatus::Pdf => 'P',
            FixupStatus::Other => 'Y',
        }
    }

    pub fn is_written(&self) -> bool {
        matches!(
            self,
            FixupStatus::TypeWasUnset
                | FixupStatus::Jpeg
                | FixupStatus::Png
                | FixupStatus::Pdf
                | FixupStatus::Other
        )
    }
}

impl Display for FixupStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// The part of a HeadObject response the fix-up decision depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectMetadata {
    pub content_type: Option<String>,
    pub cache_control: Option<String>,
}

impl ObjectMetadata {
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn cache_control(&self) -> Option<&str> {
        self.cache_control.as_deref()
    }

    pub fn is_picture(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|content_type| PICTURE_CONTENT_TYPES.contains(&content_type))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectKeyPage {
    pub keys: Vec<String>,
    pub next_continuation_token: Option<String>,
}

/// Where the keys to fix up come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    Listing { start_after: Option<String> },
    Stdin,
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressReport {
    pub key: String,
    pub processed: u64,
    pub copied: u64,
    pub failed: u64,
    pub expected_total: Option<u64>,
    pub objects_per_sec: f64,
    pub eta: String,
    pub elapsed: Duration,
    pub status_histogram: BTreeMap<FixupStatus, u64>,
    pub content_type_histogram: BTreeMap<String, u64>,
}

#[derive(Debug, PartialEq)]
pub enum FixupStatistics {
    FixupComplete { key: String, status: FixupStatus },
    FixupError { key: String, error: String },
    Progress(Box<ProgressReport>),
}

#[derive(Debug, Clone)]
pub struct ClientConfigLocation {
    pub aws_config_file: Option<PathBuf>,
    pub aws_shared_credentials_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub enum S3Credentials {
    Profile(String),
    Credentials { access_keys: AccessKeys },
    FromEnvironment,
}

#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct AccessKeys {
    pub access_key: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl Debug for AccessKeys {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut keys = f.debug_struct("AccessKeys");
        let session_token = self
            .session_token
            .as_ref()
            .map_or("None", |_| "** redacted **");
        keys.field("access_key", &self.access_key)
            .field("secret_access_key", &"** redacted **")
            .field("session_token", &session_token);
        keys.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_chars_are_distinct() {
        init_dummy_tracing_subscriber();

        let all = [
            FixupStatus::Excluded,
            FixupStatus::Skipped,
            FixupStatus::CapReached,
            FixupStatus::TypeWasUnset,
            FixupStatus::Jpeg,
            FixupStatus::Png,
            FixupStatus::Pdf,
            FixupStatus::Other,
        ];

        let mut chars: Vec<char> = all.iter().map(FixupStatus::as_char).collect();
        chars.sort_unstable();
        chars.dedup();
        assert_eq!(chars.len(), all.len());

        assert_eq!(FixupStatus::Skipped.to_string(), ".");
        assert_eq!(FixupStatus::TypeWasUnset.to_string(), "X");
        assert_eq!(FixupStatus::Jpeg.to_string(), "j");
        assert_eq!(FixupStatus::Png.to_string(), "g");
        assert_eq!(FixupStatus::Pdf.to_string(), "P");
        assert_eq!(FixupStatus::Other.to_string(), "Y");
    }

    #[test]
    fn is_written() {
        init_dummy_tracing_subscriber();

        assert!(!FixupStatus::Excluded.is_written());
        assert!(!FixupStatus::Skipped.is_written());
        assert!(!FixupStatus::CapReached.is_written());
        assert!(FixupStatus::TypeWasUnset.is_written());
        assert!(FixupStatus::Jpeg.is_written());
        assert!(FixupStatus::Png.is_written());
        assert!(FixupStatus::Pdf.is_written());
        assert!(FixupStatus::Other.is_written());
    }

    #[test]
    fn is_picture() {
        init_dummy_tracing_subscriber();

        let jpeg = ObjectMetadata {
            content_type: Some("image/jpeg".to_string()),
            cache_control: None,
        };
        let png = ObjectMetadata {
            content_type: Some("image/png".to_string()),
            cache_control: None,
        };
        let gif = ObjectMetadata {
            content_type: Some("image/gif".to_string()),
            cache_control: None,
        };

        assert!(jpeg.is_picture());
        assert!(png.is_picture());
        assert!(!gif.is_picture());
        assert!(!ObjectMetadata::default().is_picture());
    }

    #[test]
    fn debug_print_access_keys() {
        init_dummy_tracing_subscriber();

        let access_keys = AccessKeys {
            access_key: "access_key".to_string(),
            secret_access_key: "secret_access_key".to_string(),
            session_token: Some("session_token".to_string()),
        };
        let debug_string = format!("{access_keys:?}");

        assert!(debug_string.contains("access_key"));
        assert!(!debug_string.contains("secret_access_key\""));
        assert!(!debug_string.contains("session_token\""));
    }

    fn init_dummy_tracing_subscriber() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("dummy=trace")
            .try_init();
    }
}
