//! Hetzner DNS API request/response types

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct HetznerZone {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub ttl: Option<u32>,
    #[serde(default)]
    pub ns: Vec<String>,
    #[serde(default)]
    pub records_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    pub last_page: u32,
}

#[derive(Debug, Deserialize)]
pub struct Meta {
    pub pagination: Pagination,
}

#[derive(Debug, Deserialize)]
pub struct ZonesResponse {
    #[serde(default)]
    pub zones: Vec<HetznerZone>,
    pub meta: Option<Meta>,
}

#[derive(Debug, Deserialize)]
pub struct ZoneResponse {
    pub zone: HetznerZone,
}

#[derive(Debug, Serialize)]
pub struct CreateZoneBody<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct HetznerRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub ttl: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct RecordsResponse {
    #[serde(default)]
    pub records: Vec<HetznerRecord>,
    pub meta: Option<Meta>,
}

#[derive(Debug, Deserialize)]
pub struct RecordResponse {
    pub record: HetznerRecord,
}

/// Body of `POST /records` and `PUT /records/{id}`.
///
/// MX/SRV priority is part of `value` on this API.
#[derive(Debug, Serialize)]
pub struct RecordBody<'a> {
    pub zone_id: &'a str,
    #[serde(rename = "type")]
    pub record_type: &'a str,
    pub name: &'a str,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
}

/// Error body; the API uses both shapes.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: Option<ErrorDetail>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub message: String,
}
