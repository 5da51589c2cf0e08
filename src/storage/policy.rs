use mime::Mime;

/// Declared shape of an inbound file, before any bytes are trusted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    pub media_type: String,
    pub size_bytes: u64,
}

/// Type/size rule set a file must satisfy to be accepted.
///
/// The same policy object serves both trust levels: the form boundary uses
/// it for fast advisory feedback, the server uses it as the enforcement
/// point of record. Parameters live here and nowhere else so the two checks
/// cannot diverge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileConstraintPolicy {
    allowed_media_types: &'static [&'static str],
    max_bytes: u64,
}

const RESUME_MEDIA_TYPES: &[&str] = &["application/pdf"];
const LOGO_MEDIA_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/webp"];

impl FileConstraintPolicy {
    pub const fn new(allowed_media_types: &'static [&'static str], max_bytes: u64) -> Self {
        Self {
            allowed_media_types,
            max_bytes,
        }
    }

    /// Resumes: PDF only, up to 5 MiB.
    pub const fn resume() -> Self {
        Self::new(RESUME_MEDIA_TYPES, 5 * 1024 * 1024)
    }

    /// Company logos: common raster formats, up to 500 KiB.
    pub const fn logo() -> Self {
        Self::new(LOGO_MEDIA_TYPES, 500 * 1024)
    }

    pub const fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    pub fn allowed_media_types(&self) -> &'static [&'static str] {
        self.allowed_media_types
    }

    /// Evaluate the full rule set against everything received under the
    /// file field. Checks run in order: presence, declared type, size.
    pub fn accepts(&self, files: &[FileDescriptor]) -> Result<(), PolicyViolation> {
        let file = match files {
            [] => return Err(PolicyViolation::MissingFile),
            [one] => one,
            many => {
                return Err(PolicyViolation::MultipleFilesSupplied { count: many.len() });
            }
        };

        if !self.allows_media_type(&file.media_type) {
            return Err(PolicyViolation::UnsupportedType {
                media_type: file.media_type.clone(),
                allowed: self.allowed_media_types.join(", "),
            });
        }

        if file.size_bytes > self.max_bytes {
            return Err(PolicyViolation::TooLarge {
                size_bytes: file.size_bytes,
                max_bytes: self.max_bytes,
            });
        }

        Ok(())
    }

    /// Membership check on the declared media type. Parameters such as
    /// `application/pdf; charset=binary` are tolerated by comparing the
    /// type/subtype essence only.
    pub fn allows_media_type(&self, declared: &str) -> bool {
        let Ok(parsed) = declared.trim().parse::<Mime>() else {
            return false;
        };
        let essence = parsed.essence_str();
        self.allowed_media_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(essence))
    }
}

/// A constraint the submitted file failed. Client-correctable; never
/// retried automatically and surfaced verbatim to the submitter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyViolation {
    #[error("no file was supplied")]
    MissingFile,
    #[error("expected exactly one file, received {count}")]
    MultipleFilesSupplied { count: usize },
    #[error("unsupported file type '{media_type}' (allowed: {allowed})")]
    UnsupportedType { media_type: String, allowed: String },
    #[error("file is {size_bytes} bytes, limit is {max_bytes} bytes")]
    TooLarge { size_bytes: u64, max_bytes: u64 },
}

impl PolicyViolation {
    /// Stable machine-readable code for structured error payloads.
    pub const fn code(&self) -> &'static str {
        match self {
            PolicyViolation::MissingFile => "missing_file",
            PolicyViolation::MultipleFilesSupplied { .. } => "multiple_files",
            PolicyViolation::UnsupportedType { .. } => "unsupported_type",
            PolicyViolation::TooLarge { .. } => "too_large",
        }
    }
}
