//! Domain DTOs for the keys API.
//!
//! # Design
//! Every field is an `Option` so "not sent" stays distinct from "sent as
//! empty". Absent fields are skipped on serialization rather than written as
//! `null`. Validation is left to the service.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A public key attached to a user account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRecord {
    /// Server-assigned identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Encoded key content, e.g. `ssh-ed25519 AAAA...`.
    #[serde(rename = "key", default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    /// Canonical resource URL, server-assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl KeyRecord {
    /// Payload for creating a key.
    pub fn new(material: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            material: Some(material.into()),
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Payload that only renames a key.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}

/// Renders present fields only: `KeyRecord { id: 1, title: "laptop" }`.
impl fmt::Display for KeyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut fields = Vec::new();
        if let Some(id) = self.id {
            fields.push(format!("id: {id}"));
        }
        if let Some(material) = &self.material {
            fields.push(format!("key: {material:?}"));
        }
        if let Some(url) = &self.url {
            fields.push(format!("url: {url:?}"));
        }
        if let Some(title) = &self.title {
            fields.push(format!("title: {title:?}"));
        }
        if fields.is_empty() {
            f.write_str("KeyRecord {}")
        } else {
            write!(f, "KeyRecord {{ {} }}", fields.join(", "))
        }
    }
}
