//! The pointer record that replaces an offloaded message body.
//!
//! On the wire a pointer is a two-element JSON array:
//!
//! ```text
//! ["<type tag>", {"s3BucketName": "<bucket>", "s3Key": "<key>"}]
//! ```
//!
//! The type tag names the pointer schema. Receivers built against the older
//! queue extended client only understand the legacy tag and the legacy size
//! attribute, so both are selected together through [`PointerFormat`].

use crate::errors::{DataStoreError, Result};
use serde::{Deserialize, Serialize};

pub const MESSAGE_POINTER_CLASS: &str = "software.amazon.payloadoffloading.PayloadS3Pointer";
pub const LEGACY_MESSAGE_POINTER_CLASS: &str = "com.amazon.sqs.javamessaging.MessageS3Pointer";
pub const RESERVED_ATTRIBUTE_NAME: &str = "ExtendedPayloadSize";
pub const LEGACY_RESERVED_ATTRIBUTE_NAME: &str = "SQSLargePayloadSize";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerFormat {
    #[default]
    Current,
    Legacy,
}

impl PointerFormat {
    pub fn from_legacy_flag(use_legacy: bool) -> Self {
        if use_legacy {
            PointerFormat::Legacy
        } else {
            PointerFormat::Current
        }
    }

    pub fn type_tag(self) -> &'static str {
        match self {
            PointerFormat::Current => MESSAGE_POINTER_CLASS,
            PointerFormat::Legacy => LEGACY_MESSAGE_POINTER_CLASS,
        }
    }

    /// Name of the attribute carrying the original body size.
    pub fn reserved_attribute(self) -> &'static str {
        match self {
            PointerFormat::Current => RESERVED_ATTRIBUTE_NAME,
            PointerFormat::Legacy => LEGACY_RESERVED_ATTRIBUTE_NAME,
        }
    }

    fn from_type_tag(tag: &str) -> Option<Self> {
        match tag {
            MESSAGE_POINTER_CLASS => Some(PointerFormat::Current),
            LEGACY_MESSAGE_POINTER_CLASS => Some(PointerFormat::Legacy),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct ObjectLocation {
    #[serde(rename = "s3BucketName")]
    bucket: String,
    #[serde(rename = "s3Key")]
    key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadPointer {
    pub format: PointerFormat,
    pub bucket: String,
    pub key: String,
}

impl PayloadPointer {
    pub fn new(format: PointerFormat, bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            format,
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        let location = ObjectLocation {
            bucket: self.bucket.clone(),
            key: self.key.clone(),
        };
        Ok(serde_json::to_string(&(self.format.type_tag(), location))?)
    }

    /// Reads a pointer back from a message body. Accepts both schema tags.
    pub fn parse(body: &str) -> Result<Self> {
        let (tag, location): (String, ObjectLocation) = serde_json::from_str(body)?;
        let format = PointerFormat::from_type_tag(&tag).ok_or_else(|| {
            DataStoreError::InvalidData(format!("unknown pointer type tag: {tag}").into())
        })?;
        Ok(Self {
            format,
            bucket: location.bucket,
            key: location.key,
        })
    }
}
