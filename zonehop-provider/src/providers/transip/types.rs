//! `TransIP` API request/response types

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct Domain {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct DomainsResponse {
    #[serde(default)]
    pub domains: Vec<Domain>,
}

#[derive(Debug, Deserialize)]
pub struct DomainResponse {
    pub domain: Domain,
}

#[derive(Debug, Deserialize)]
pub struct Nameserver {
    pub hostname: String,
}

#[derive(Debug, Deserialize)]
pub struct NameserversResponse {
    #[serde(default)]
    pub nameservers: Vec<Nameserver>,
}

/// One DNS entry; `expire` is the TTL and MX/SRV priority is part of `content`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DnsEntry {
    pub name: String,
    pub expire: u32,
    #[serde(rename = "type")]
    pub entry_type: String,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsEntries {
    #[serde(default)]
    pub dns_entries: Vec<DnsEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: String,
}
