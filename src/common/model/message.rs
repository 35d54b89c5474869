use super::attribute::{AttributeValue, MessageAttributes};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Where a message is published to.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Destination {
    /// A topic, addressed by ARN.
    Topic(String),
    /// A single endpoint (e.g. a mobile platform endpoint), addressed by ARN.
    Target(String),
    /// An SMS recipient.
    PhoneNumber(String),
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Topic(arn) => write!(f, "topic {arn}"),
            Destination::Target(arn) => write!(f, "target {arn}"),
            Destination::PhoneNumber(number) => write!(f, "phone number {number}"),
        }
    }
}

/// The `MessageStructure` publish parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageStructure {
    /// Multi-protocol form: the body is a JSON object with one message per protocol.
    Json,
    Other(String),
}

impl MessageStructure {
    pub fn parse(raw: &str) -> Self {
        if raw == "json" {
            MessageStructure::Json
        } else {
            MessageStructure::Other(raw.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            MessageStructure::Json => "json",
            MessageStructure::Other(raw) => raw,
        }
    }
}

impl From<&str> for MessageStructure {
    fn from(raw: &str) -> Self {
        MessageStructure::parse(raw)
    }
}

impl Serialize for MessageStructure {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MessageStructure {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(MessageStructure::parse(&raw))
    }
}

/// A single publish call.
///
/// Only `message` and `attributes` are ever rewritten by the offloading layer;
/// everything else reaches the underlying publisher as the caller built it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct PublishRequest {
    pub destination: Option<Destination>,
    pub message: String,
    #[serde(default)]
    pub attributes: MessageAttributes,
    pub structure: Option<MessageStructure>,
    pub subject: Option<String>,
    pub message_group_id: Option<String>,
    pub message_deduplication_id: Option<String>,
    /// Transport parameters this crate does not interpret.
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

impl PublishRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn to_topic(mut self, arn: impl Into<String>) -> Self {
        self.destination = Some(Destination::Topic(arn.into()));
        self
    }

    pub fn to_target(mut self, arn: impl Into<String>) -> Self {
        self.destination = Some(Destination::Target(arn.into()));
        self
    }

    pub fn to_phone_number(mut self, number: impl Into<String>) -> Self {
        self.destination = Some(Destination::PhoneNumber(number.into()));
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    pub fn with_attributes(mut self, attributes: MessageAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_structure(mut self, structure: impl Into<MessageStructure>) -> Self {
        self.structure = Some(structure.into());
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_message_group_id(mut self, group_id: impl Into<String>) -> Self {
        self.message_group_id = Some(group_id.into());
        self
    }

    pub fn with_message_deduplication_id(mut self, dedup_id: impl Into<String>) -> Self {
        self.message_deduplication_id = Some(dedup_id.into());
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PublishResult {
    pub message_id: String,
    pub sequence_number: Option<String>,
}
