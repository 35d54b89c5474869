//! Offload decision and payload rewrite.
//!
//! [`OffloadPolicy`] decides whether a message has to go through the blob
//! store and, if so, rewrites the attributes and body into the pointer form.
//! It performs no I/O: the upload it asks for is returned as a
//! [`PendingUpload`] and carried out by the caller before publishing.

use crate::common::model::{
    AttributeValue, LEGACY_RESERVED_ATTRIBUTE_NAME, MessageAttributes, MessageStructure,
    OffloadConfig, PayloadPointer, RESERVED_ATTRIBUTE_NAME,
};
use crate::errors::{OffloadError, Result};
use log::debug;
use uuid::Uuid;

/// Transport limit of 10 attributes, minus the slot taken by the size attribute.
pub const MAX_ALLOWED_ATTRIBUTES: usize = 10 - 1;
/// Caller-supplied attribute naming the object key to store the payload under.
pub const S3_KEY_ATTRIBUTE_NAME: &str = "S3Key";

/// A blob-store write the policy decided on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpload {
    pub bucket: String,
    pub key: String,
    /// The original message body, UTF-8 encoded.
    pub payload: Vec<u8>,
}

/// Attributes and body to publish, plus the upload that must precede it.
#[derive(Debug, Clone, PartialEq)]
pub struct PayloadPlan {
    pub attributes: MessageAttributes,
    pub message: String,
    /// `Some` exactly when the message was offloaded.
    pub upload: Option<PendingUpload>,
}

impl PayloadPlan {
    fn unchanged(attributes: MessageAttributes, message: &str) -> Self {
        Self {
            attributes,
            message: message.to_string(),
            upload: None,
        }
    }

    pub fn is_offloaded(&self) -> bool {
        self.upload.is_some()
    }
}

/// Sum of attribute name, data type and value byte lengths.
pub fn attributes_size(attributes: &MessageAttributes) -> usize {
    attributes
        .iter()
        .map(|(name, value)| name.len() + value.encoded_len())
        .sum()
}

/// Size the transport accounts for: attributes plus the encoded body.
pub fn message_size(attributes: &MessageAttributes, body_len: usize) -> usize {
    attributes_size(attributes) + body_len
}

pub struct OffloadPolicy<'a> {
    config: &'a OffloadConfig,
}

impl<'a> OffloadPolicy<'a> {
    pub fn new(config: &'a OffloadConfig) -> Self {
        Self { config }
    }

    /// Strictly larger than the threshold; a message exactly at it stays inline.
    pub fn is_large_message(&self, attributes: &MessageAttributes, body_len: usize) -> bool {
        message_size(attributes, body_len) > self.config.size_threshold()
    }

    pub fn decide_and_transform(
        &self,
        attributes: &MessageAttributes,
        body: &str,
        structure: Option<&MessageStructure>,
    ) -> Result<PayloadPlan> {
        let mut attributes = attributes.clone();
        let encoded_size = body.len();

        let Some(bucket) = self.config.bucket() else {
            return Ok(PayloadPlan::unchanged(attributes, body));
        };

        if !self.config.always_offload() && !self.is_large_message(&attributes, encoded_size) {
            return Ok(PayloadPlan::unchanged(attributes, body));
        }

        if matches!(structure, Some(MessageStructure::Json)) {
            return Err(OffloadError::UnsupportedStructure.into());
        }

        if attributes.len() > MAX_ALLOWED_ATTRIBUTES {
            return Err(OffloadError::TooManyAttributes {
                count: attributes.len(),
                max: MAX_ALLOWED_ATTRIBUTES,
            }
            .into());
        }

        for reserved in [RESERVED_ATTRIBUTE_NAME, LEGACY_RESERVED_ATTRIBUTE_NAME] {
            if attributes.contains_key(reserved) {
                return Err(OffloadError::ReservedAttributeCollision(reserved.to_string()).into());
            }
        }

        let format = self.config.pointer_format();
        attributes.insert(
            format.reserved_attribute().to_string(),
            AttributeValue::number(encoded_size),
        );

        let size = attributes_size(&attributes);
        if size > self.config.size_threshold() {
            return Err(OffloadError::AttributesTooLarge {
                size,
                threshold: self.config.size_threshold(),
            }
            .into());
        }

        let key = object_key(&attributes);
        let message = PayloadPointer::new(format, bucket, key.as_str()).to_json()?;
        debug!(
            "Offloading {} byte payload to {}/{}",
            encoded_size, bucket, key
        );

        Ok(PayloadPlan {
            attributes,
            message,
            upload: Some(PendingUpload {
                bucket: bucket.to_string(),
                key,
                payload: body.as_bytes().to_vec(),
            }),
        })
    }
}

/// The caller's `S3Key` value when given and non-empty, otherwise a fresh UUID v4.
fn object_key(attributes: &MessageAttributes) -> String {
    attributes
        .get(S3_KEY_ATTRIBUTE_NAME)
        .and_then(|value| value.string_value.as_deref())
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::model::{
        DEFAULT_MESSAGE_SIZE_THRESHOLD, LEGACY_MESSAGE_POINTER_CLASS, MESSAGE_POINTER_CLASS,
        PointerFormat,
    };

    const SMALL_MSG_BODY: &str = "small message body";

    fn small_attributes() -> MessageAttributes {
        MessageAttributes::from([("test attr".to_string(), AttributeValue::string("str value"))])
    }

    fn large_body() -> String {
        "x".repeat(DEFAULT_MESSAGE_SIZE_THRESHOLD + 1)
    }

    fn config() -> OffloadConfig {
        OffloadConfig::with_bucket("test-bucket").unwrap()
    }

    fn expected_attributes(
        base: &MessageAttributes,
        body: &str,
        reserved: &str,
    ) -> MessageAttributes {
        let mut expected = base.clone();
        expected.insert(reserved.to_string(), AttributeValue::number(body.len()));
        expected
    }

    fn pointer_json(plan: &PayloadPlan) -> serde_json::Value {
        serde_json::from_str(&plan.message).expect("offloaded body must be JSON")
    }

    #[test]
    fn test_no_bucket_is_identity() {
        let config = OffloadConfig::new();
        let policy = OffloadPolicy::new(&config);
        let body = large_body();

        for structure in [None, Some(MessageStructure::Json)] {
            let plan = policy
                .decide_and_transform(&small_attributes(), &body, structure.as_ref())
                .unwrap();
            assert_eq!(plan.attributes, small_attributes());
            assert_eq!(plan.message, body);
            assert!(!plan.is_offloaded());
        }
    }

    #[test]
    fn test_small_message_stays_inline() {
        let config = config();
        let plan = OffloadPolicy::new(&config)
            .decide_and_transform(&small_attributes(), SMALL_MSG_BODY, None)
            .unwrap();

        assert_eq!(plan.attributes, small_attributes());
        assert_eq!(plan.message, SMALL_MSG_BODY);
        assert!(plan.upload.is_none());
    }

    #[test]
    fn test_threshold_boundary() {
        let config = config();
        let policy = OffloadPolicy::new(&config);
        let empty = MessageAttributes::new();

        let at_threshold = "x".repeat(DEFAULT_MESSAGE_SIZE_THRESHOLD);
        let plan = policy.decide_and_transform(&empty, &at_threshold, None).unwrap();
        assert!(!plan.is_offloaded());

        let over = large_body();
        let plan = policy.decide_and_transform(&empty, &over, None).unwrap();
        assert!(plan.is_offloaded());
    }

    #[test]
    fn test_large_message_is_offloaded() {
        let config = config();
        let body = large_body();
        let plan = OffloadPolicy::new(&config)
            .decide_and_transform(&small_attributes(), &body, None)
            .unwrap();

        assert_eq!(
            plan.attributes,
            expected_attributes(&small_attributes(), &body, RESERVED_ATTRIBUTE_NAME)
        );
        assert_eq!(
            plan.attributes[RESERVED_ATTRIBUTE_NAME],
            AttributeValue::number(262_145)
        );

        let json = pointer_json(&plan);
        assert_eq!(json.as_array().map(Vec::len), Some(2));
        assert_eq!(json[0], MESSAGE_POINTER_CLASS);
        assert_eq!(json[1]["s3BucketName"], "test-bucket");

        let key = json[1]["s3Key"].as_str().unwrap();
        let uuid = Uuid::parse_str(key).expect("generated key must be a UUID");
        assert_eq!(uuid.get_version_num(), 4);

        let upload = plan.upload.unwrap();
        assert_eq!(upload.bucket, "test-bucket");
        assert_eq!(upload.key, key);
        assert_eq!(upload.payload, body.as_bytes());
    }

    #[test]
    fn test_caller_attributes_are_untouched() {
        let config = config();
        let attributes = small_attributes();
        let plan = OffloadPolicy::new(&config)
            .decide_and_transform(&attributes, &large_body(), None)
            .unwrap();

        assert!(plan.attributes.contains_key(RESERVED_ATTRIBUTE_NAME));
        assert!(!attributes.contains_key(RESERVED_ATTRIBUTE_NAME));
    }

    #[test]
    fn test_always_offload_small_and_empty_messages() {
        let mut config = config();
        config.set_always_offload(true).unwrap();
        let policy = OffloadPolicy::new(&config);

        let plan = policy
            .decide_and_transform(&small_attributes(), SMALL_MSG_BODY, None)
            .unwrap();
        assert_eq!(
            plan.attributes,
            expected_attributes(&small_attributes(), SMALL_MSG_BODY, RESERVED_ATTRIBUTE_NAME)
        );
        assert_eq!(pointer_json(&plan)[0], MESSAGE_POINTER_CLASS);
        assert_eq!(plan.upload.unwrap().payload, SMALL_MSG_BODY.as_bytes());

        let plan = policy
            .decide_and_transform(&MessageAttributes::new(), "", None)
            .unwrap();
        assert_eq!(
            plan.attributes[RESERVED_ATTRIBUTE_NAME],
            AttributeValue::number(0)
        );
        assert!(plan.upload.unwrap().payload.is_empty());
    }

    #[test]
    fn test_reduced_threshold() {
        let mut config = config();
        config.set_size_threshold(128).unwrap();
        let body = "x".repeat(129);

        let plan = OffloadPolicy::new(&config)
            .decide_and_transform(&MessageAttributes::new(), &body, None)
            .unwrap();
        assert_eq!(
            plan.attributes,
            expected_attributes(&MessageAttributes::new(), &body, RESERVED_ATTRIBUTE_NAME)
        );
        assert_eq!(plan.upload.unwrap().payload, body.as_bytes());
    }

    #[test]
    fn test_legacy_pointer_format() {
        let mut config = config();
        config.set_use_legacy_pointer_format(true);
        let body = large_body();

        let plan = OffloadPolicy::new(&config)
            .decide_and_transform(&small_attributes(), &body, None)
            .unwrap();
        assert_eq!(pointer_json(&plan)[0], LEGACY_MESSAGE_POINTER_CLASS);
        assert_eq!(
            plan.attributes,
            expected_attributes(&small_attributes(), &body, LEGACY_RESERVED_ATTRIBUTE_NAME)
        );
        assert!(!plan.attributes.contains_key(RESERVED_ATTRIBUTE_NAME));
    }

    #[test]
    fn test_custom_object_key() {
        let config = config();
        let attributes = MessageAttributes::from([(
            S3_KEY_ATTRIBUTE_NAME.to_string(),
            AttributeValue::string("test_key"),
        )]);
        let body = large_body();

        let plan = OffloadPolicy::new(&config)
            .decide_and_transform(&attributes, &body, None)
            .unwrap();

        assert_eq!(
            plan.message,
            PayloadPointer::new(PointerFormat::Current, "test-bucket", "test_key")
                .to_json()
                .unwrap()
        );
        // the key attribute is kept alongside the size attribute
        assert_eq!(
            plan.attributes,
            expected_attributes(&attributes, &body, RESERVED_ATTRIBUTE_NAME)
        );
        assert_eq!(plan.upload.unwrap().key, "test_key");
    }

    #[test]
    fn test_empty_object_key_falls_back_to_uuid() {
        let config = config();
        let attributes = MessageAttributes::from([(
            S3_KEY_ATTRIBUTE_NAME.to_string(),
            AttributeValue::string(""),
        )]);

        let plan = OffloadPolicy::new(&config)
            .decide_and_transform(&attributes, &large_body(), None)
            .unwrap();

        let key = plan.upload.unwrap().key;
        let uuid = Uuid::parse_str(&key).expect("empty S3Key must yield a generated key");
        assert_eq!(uuid.get_version_num(), 4);
        assert_eq!(PayloadPointer::parse(&plan.message).unwrap().key, key);
        assert_eq!(plan.attributes[S3_KEY_ATTRIBUTE_NAME], AttributeValue::string(""));
    }

    #[test]
    fn test_json_structure_is_rejected_when_offloading() {
        let mut config = config();
        let policy = OffloadPolicy::new(&config);
        let body = r#"{"default": "value"}"#;

        // inline messages may still use the multi-protocol structure
        let plan = policy
            .decide_and_transform(&MessageAttributes::new(), body, Some(&MessageStructure::Json))
            .unwrap();
        assert_eq!(plan.message, body);

        config.set_always_offload(true).unwrap();
        let err = OffloadPolicy::new(&config)
            .decide_and_transform(&MessageAttributes::new(), body, Some(&MessageStructure::Json))
            .unwrap_err();
        assert!(matches!(
            err.offload_error(),
            Some(OffloadError::UnsupportedStructure)
        ));
    }

    #[test]
    fn test_too_many_attributes() {
        let config = config();
        let attributes: MessageAttributes = (0..=MAX_ALLOWED_ATTRIBUTES)
            .map(|i| (i.to_string(), AttributeValue::number(100)))
            .collect();

        let err = OffloadPolicy::new(&config)
            .decide_and_transform(&attributes, &large_body(), None)
            .unwrap_err();
        assert!(matches!(
            err.offload_error(),
            Some(OffloadError::TooManyAttributes { count: 10, max: 9 })
        ));
    }

    #[test]
    fn test_nine_attributes_leave_room_for_size_attribute() {
        let config = config();
        let attributes: MessageAttributes = (0..MAX_ALLOWED_ATTRIBUTES)
            .map(|i| (i.to_string(), AttributeValue::number(100)))
            .collect();

        let plan = OffloadPolicy::new(&config)
            .decide_and_transform(&attributes, &large_body(), None)
            .unwrap();
        assert_eq!(plan.attributes.len(), 10);
    }

    #[test]
    fn test_reserved_attribute_collision() {
        let config = config();
        for reserved in [RESERVED_ATTRIBUTE_NAME, LEGACY_RESERVED_ATTRIBUTE_NAME] {
            let mut attributes: MessageAttributes = (0..MAX_ALLOWED_ATTRIBUTES - 1)
                .map(|i| (i.to_string(), AttributeValue::number(100)))
                .collect();
            attributes.insert(reserved.to_string(), AttributeValue::number(1));

            let err = OffloadPolicy::new(&config)
                .decide_and_transform(&attributes, &large_body(), None)
                .unwrap_err();
            match err.offload_error() {
                Some(OffloadError::ReservedAttributeCollision(name)) => assert_eq!(name, reserved),
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn test_count_is_checked_before_reserved_names() {
        let config = config();
        for reserved in [RESERVED_ATTRIBUTE_NAME, LEGACY_RESERVED_ATTRIBUTE_NAME] {
            let mut attributes: MessageAttributes = (0..MAX_ALLOWED_ATTRIBUTES)
                .map(|i| (i.to_string(), AttributeValue::number(100)))
                .collect();
            attributes.insert(reserved.to_string(), AttributeValue::number(1));

            let err = OffloadPolicy::new(&config)
                .decide_and_transform(&attributes, &large_body(), None)
                .unwrap_err();
            assert!(matches!(
                err.offload_error(),
                Some(OffloadError::TooManyAttributes { count: 10, max: 9 })
            ));
        }
    }

    #[test]
    fn test_reserved_names_allowed_inline() {
        let config = config();
        let attributes = MessageAttributes::from([(
            RESERVED_ATTRIBUTE_NAME.to_string(),
            AttributeValue::number(1),
        )]);
        let plan = OffloadPolicy::new(&config)
            .decide_and_transform(&attributes, SMALL_MSG_BODY, None)
            .unwrap();
        assert!(!plan.is_offloaded());
    }

    #[test]
    fn test_attributes_too_large() {
        let config = config();
        let attributes = MessageAttributes::from([(
            "large_attribute".to_string(),
            AttributeValue::string(large_body()),
        )]);

        let err = OffloadPolicy::new(&config)
            .decide_and_transform(&attributes, SMALL_MSG_BODY, None)
            .unwrap_err();
        match err.offload_error() {
            Some(OffloadError::AttributesTooLarge { size, threshold }) => {
                assert_eq!(*threshold, DEFAULT_MESSAGE_SIZE_THRESHOLD);
                assert!(size > threshold);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_size_attribute_can_push_attributes_over() {
        // attributes alone fit, the size attribute tips them over
        let mut config = config();
        config.set_size_threshold(40).unwrap();
        let attributes =
            MessageAttributes::from([("k".to_string(), AttributeValue::string("v".repeat(20)))]);
        assert!(attributes_size(&attributes) <= 40);

        let err = OffloadPolicy::new(&config)
            .decide_and_transform(&attributes, &"x".repeat(100), None)
            .unwrap_err();
        assert!(matches!(
            err.offload_error(),
            Some(OffloadError::AttributesTooLarge { .. })
        ));
    }

    #[test]
    fn test_is_large_message() {
        let config = config();
        let policy = OffloadPolicy::new(&config);

        assert!(policy.is_large_message(&MessageAttributes::new(), large_body().len()));
        assert!(!policy.is_large_message(&MessageAttributes::new(), SMALL_MSG_BODY.len()));

        let large_attribute = MessageAttributes::from([(
            "large_attribute".to_string(),
            AttributeValue::string(large_body()),
        )]);
        assert!(policy.is_large_message(&large_attribute, SMALL_MSG_BODY.len()));
    }

    #[test]
    fn test_size_accounting() {
        let attributes = MessageAttributes::from([
            ("a".to_string(), AttributeValue::string("bc")),
            ("bin".to_string(), AttributeValue::binary(vec![1u8, 2, 3])),
        ]);
        // "a" + "String" + "bc" + "bin" + "Binary" + 3 bytes
        assert_eq!(attributes_size(&attributes), 1 + 6 + 2 + 3 + 6 + 3);
        assert_eq!(message_size(&attributes, 10), 31);
    }
}
