//! Hetzner Cloud DNS API request/response types

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CloudZone {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub ttl: Option<u32>,
    #[serde(default)]
    pub authoritative_nameservers: Option<AuthoritativeNameservers>,
    #[serde(default)]
    pub record_count: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AuthoritativeNameservers {
    #[serde(default)]
    pub assigned: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    pub next_page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct Meta {
    pub pagination: Pagination,
}

#[derive(Debug, Deserialize)]
pub struct ZonesResponse {
    #[serde(default)]
    pub zones: Vec<CloudZone>,
    pub meta: Option<Meta>,
}

#[derive(Debug, Deserialize)]
pub struct ZoneResponse {
    pub zone: CloudZone,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RRSetRecord {
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct RRSet {
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    #[serde(default)]
    pub ttl: Option<u32>,
    #[serde(default)]
    pub records: Vec<RRSetRecord>,
}

#[derive(Debug, Deserialize)]
pub struct RRSetsResponse {
    #[serde(default)]
    pub rrsets: Vec<RRSet>,
    pub meta: Option<Meta>,
}

#[derive(Debug, Deserialize)]
pub struct RRSetResponse {
    pub rrset: RRSet,
}

#[derive(Debug, Deserialize)]
pub struct ZonefileResponse {
    pub zonefile: String,
}

#[derive(Debug, Serialize)]
pub struct PrimaryNameserver {
    pub address: String,
    pub port: u16,
}

#[derive(Debug, Serialize)]
pub struct CreateZoneBody<'a> {
    pub name: &'a str,
    pub mode: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub primary_nameservers: Vec<PrimaryNameserver>,
}

/// Body of the `add_records`, `remove_records` and `set_records` actions.
#[derive(Debug, Serialize)]
pub struct RecordsAction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    pub records: Vec<RRSetRecord>,
}

#[derive(Debug, Serialize)]
pub struct ChangeTtlAction {
    pub ttl: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    #[serde(default)]
    pub message: String,
}
