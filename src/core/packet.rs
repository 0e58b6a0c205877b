//! Logical packet model handed to and returned by a [`Codec`](super::Codec).
//!
//! Attributes are an ordered bag keyed by dictionary name. The client never
//! interprets values beyond the status code and the Reply-Message text.

use std::fmt;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use super::constants::*;

/// RADIUS packet type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Code(pub u8);

impl Code {
    /// Access-Request.
    pub const ACCESS_REQUEST: Code = Code(CODE_ACCESS_REQUEST);
    /// Access-Accept.
    pub const ACCESS_ACCEPT: Code = Code(CODE_ACCESS_ACCEPT);
    /// Access-Reject.
    pub const ACCESS_REJECT: Code = Code(CODE_ACCESS_REJECT);
    /// Password-Reject.
    pub const PASSWORD_REJECT: Code = Code(CODE_PASSWORD_REJECT);
    /// Access-Challenge.
    pub const ACCESS_CHALLENGE: Code = Code(CODE_ACCESS_CHALLENGE);
    /// Password-Expired.
    pub const PASSWORD_EXPIRED: Code = Code(CODE_PASSWORD_EXPIRED);

    /// Registry name for well-known codes.
    pub fn name(self) -> Option<&'static str> {
        let name = match self.0 {
            CODE_ACCESS_REQUEST => "Access-Request",
            CODE_ACCESS_ACCEPT => "Access-Accept",
            CODE_ACCESS_REJECT => "Access-Reject",
            CODE_PASSWORD_REJECT => "Password-Reject",
            CODE_ACCESS_CHALLENGE => "Access-Challenge",
            CODE_PASSWORD_EXPIRED => "Password-Expired",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name} ({})", self.0),
            None => write!(f, "code {}", self.0),
        }
    }
}

impl From<u8> for Code {
    fn from(code: u8) -> Self {
        Code(code)
    }
}

/// A single attribute value. The codec maps it onto the dictionary type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// `string` / `text` attributes.
    Text(String),
    /// `integer` attributes and enumerated values.
    Integer(u32),
    /// `ipaddr` / `ipv6addr` attributes.
    Address(IpAddr),
    /// Raw `octets`.
    Octets(Vec<u8>),
}

impl AttributeValue {
    /// Borrow the text if this is a `Text` value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

impl From<u32> for AttributeValue {
    fn from(value: u32) -> Self {
        AttributeValue::Integer(value)
    }
}

impl From<IpAddr> for AttributeValue {
    fn from(value: IpAddr) -> Self {
        AttributeValue::Address(value)
    }
}

impl From<Vec<u8>> for AttributeValue {
    fn from(value: Vec<u8>) -> Self {
        AttributeValue::Octets(value)
    }
}

/// Ordered attribute-value pairs. Repeated names are allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(Vec<(String, AttributeValue)>);

impl Attributes {
    /// Empty attribute bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an attribute, builder style.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.push(name, value);
        self
    }

    /// Append an attribute.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<AttributeValue>) {
        self.0.push((name.into(), value.into()));
    }

    /// First value stored under `name`.
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Every value stored under `name`, in order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a AttributeValue> + 'a {
        self.0.iter().filter(move |(n, _)| n == name).map(|(_, v)| v)
    }

    /// Iterate over all pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the bag is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<N, V> FromIterator<(N, V)> for Attributes
where
    N: Into<String>,
    V: Into<AttributeValue>,
{
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Attributes(
            iter.into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        )
    }
}

/// A logical request, before encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Packet type.
    pub code: Code,
    /// Attributes to encode.
    pub attributes: Attributes,
    /// Ask the codec to add a Message-Authenticator attribute.
    pub message_authenticator: bool,
}

impl Request {
    /// New request with a Message-Authenticator.
    pub fn new(code: Code, attributes: Attributes) -> Self {
        Self {
            code,
            attributes,
            message_authenticator: true,
        }
    }
}

/// A decoded response that passed authenticity verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Packet type.
    pub code: Code,
    /// Identifier echoed from the request.
    pub identifier: u8,
    /// Decoded attributes.
    pub attributes: Attributes,
}

impl Response {
    /// Text of the first Reply-Message attribute, if any.
    pub fn reply_message(&self) -> Option<&str> {
        self.attributes.get(REPLY_MESSAGE).and_then(AttributeValue::as_text)
    }
}
