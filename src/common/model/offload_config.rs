use super::pointer::PointerFormat;
use crate::errors::{Error, Result};

/// Largest message the transport accepts, and the default offload threshold.
pub const DEFAULT_MESSAGE_SIZE_THRESHOLD: usize = 262_144;

/// Per-client offload settings.
///
/// Every setter validates its input, so an `OffloadConfig` is always in a
/// state the policy engine can act on. The resetters restore the documented
/// defaults; `clear_bucket` turns offloading off entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffloadConfig {
    bucket: Option<String>,
    size_threshold: usize,
    always_offload: bool,
    use_legacy_pointer_format: bool,
}

impl Default for OffloadConfig {
    fn default() -> Self {
        Self {
            bucket: None,
            size_threshold: DEFAULT_MESSAGE_SIZE_THRESHOLD,
            always_offload: false,
            use_legacy_pointer_format: false,
        }
    }
}

impl OffloadConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a default config with `bucket` set.
    pub fn with_bucket(bucket: impl Into<String>) -> Result<Self> {
        let mut config = Self::default();
        config.set_bucket(bucket)?;
        Ok(config)
    }

    pub fn bucket(&self) -> Option<&str> {
        self.bucket.as_deref()
    }

    pub fn set_bucket(&mut self, bucket: impl Into<String>) -> Result<()> {
        let bucket = bucket.into();
        if bucket.is_empty() {
            return Err(Error::offload_misconfigured(
                "bucket name for payload offloading must not be empty",
            ));
        }
        self.bucket = Some(bucket);
        Ok(())
    }

    pub fn clear_bucket(&mut self) {
        self.bucket = None;
    }

    pub fn size_threshold(&self) -> usize {
        self.size_threshold
    }

    pub fn set_size_threshold(&mut self, threshold: usize) -> Result<()> {
        if threshold > DEFAULT_MESSAGE_SIZE_THRESHOLD {
            return Err(Error::invalid_configuration(format!(
                "size_threshold must be within [0, {DEFAULT_MESSAGE_SIZE_THRESHOLD}], got {threshold}"
            )));
        }
        self.size_threshold = threshold;
        Ok(())
    }

    pub fn reset_size_threshold(&mut self) {
        self.size_threshold = DEFAULT_MESSAGE_SIZE_THRESHOLD;
    }

    pub fn always_offload(&self) -> bool {
        self.always_offload
    }

    pub fn set_always_offload(&mut self, always_offload: bool) -> Result<()> {
        if always_offload && self.bucket.is_none() {
            return Err(Error::offload_misconfigured(
                "always_offload requires a bucket to be configured first",
            ));
        }
        self.always_offload = always_offload;
        Ok(())
    }

    pub fn reset_always_offload(&mut self) {
        self.always_offload = false;
    }

    pub fn use_legacy_pointer_format(&self) -> bool {
        self.use_legacy_pointer_format
    }

    pub fn set_use_legacy_pointer_format(&mut self, use_legacy: bool) {
        self.use_legacy_pointer_format = use_legacy;
    }

    pub fn reset_use_legacy_pointer_format(&mut self) {
        self.use_legacy_pointer_format = false;
    }

    pub fn pointer_format(&self) -> PointerFormat {
        PointerFormat::from_legacy_flag(self.use_legacy_pointer_format)
    }
}
