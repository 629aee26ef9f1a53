//! `AutoDNS` JSON API request/response types

use serde::{Deserialize, Serialize};

/// Response envelope shared by every endpoint.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    pub status: Option<Status>,
    #[serde(default)]
    pub messages: Vec<Message>,
    /// `null` or missing on responses without payload (deletes)
    #[serde(default)]
    pub data: Option<Vec<T>>,
}

#[derive(Debug, Deserialize)]
pub struct Status {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(rename = "type", default)]
    pub status_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub text: String,
}

impl<T> Envelope<T> {
    pub fn is_error(&self) -> bool {
        self.status
            .as_ref()
            .and_then(|s| s.status_type.as_deref())
            .is_some_and(|t| t.eq_ignore_ascii_case("ERROR"))
    }

    /// First message code, falling back to the status code.
    pub fn error_code(&self) -> Option<String> {
        self.messages
            .iter()
            .find_map(|m| m.code.clone())
            .or_else(|| self.status.as_ref().and_then(|s| s.code.clone()))
    }

    pub fn error_text(&self) -> String {
        let texts: Vec<&str> = self
            .messages
            .iter()
            .map(|m| m.text.as_str())
            .filter(|t| !t.is_empty())
            .collect();
        if texts.is_empty() {
            self.status
                .as_ref()
                .and_then(|s| s.text.clone())
                .unwrap_or_default()
        } else {
            texts.join("; ")
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Soa {
    pub refresh: u32,
    pub retry: u32,
    pub expire: u32,
    pub ttl: u32,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NameServer {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    #[serde(rename = "type")]
    pub record_type: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pref: Option<u16>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoZone {
    pub origin: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virtual_name_server: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soa: Option<Soa>,
    #[serde(default)]
    pub name_servers: Vec<NameServer>,
    #[serde(default)]
    pub resource_records: Vec<ResourceRecord>,
}

#[derive(Debug, Serialize)]
pub struct SearchFilter<'a> {
    pub key: &'a str,
    pub value: &'a str,
    pub operator: &'a str,
}

#[derive(Debug, Serialize)]
pub struct SearchView {
    pub offset: u32,
    pub limit: u32,
    pub children: bool,
}

#[derive(Debug, Serialize)]
pub struct SearchQuery<'a> {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<SearchFilter<'a>>,
    pub view: SearchView,
}

/// Body of `POST /zone/{origin}/_stream`.
#[derive(Debug, Default, Serialize)]
pub struct ZoneStream {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub adds: Vec<ResourceRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rems: Vec<ResourceRecord>,
}
