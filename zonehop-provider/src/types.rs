use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ============ Providers ============

/// Which provider client to build; one variant per enabled cargo feature.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    /// INWX (XML-RPC domrobot API). Requires feature `inwx`.
    #[cfg(feature = "inwx")]
    Inwx,
    /// Hetzner DNS Console (legacy `dns.hetzner.com` API). Requires feature `hetzner`.
    #[cfg(feature = "hetzner")]
    Hetzner,
    /// Hetzner Cloud DNS (RRSet API). Requires feature `hetznercloud`.
    #[cfg(feature = "hetznercloud")]
    Hetznercloud,
    /// `InternetX` `AutoDNS`. Requires feature `internetx`.
    #[cfg(feature = "internetx")]
    Internetx,
    /// `TransIP`. Requires feature `transip`.
    #[cfg(feature = "transip")]
    Transip,
    /// In-memory provider used in tests.
    #[cfg(any(test, feature = "test-utils"))]
    Memory,
}

impl std::fmt::Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(feature = "inwx")]
            Self::Inwx => write!(f, "inwx"),
            #[cfg(feature = "hetzner")]
            Self::Hetzner => write!(f, "hetzner"),
            #[cfg(feature = "hetznercloud")]
            Self::Hetznercloud => write!(f, "hetznercloud"),
            #[cfg(feature = "internetx")]
            Self::Internetx => write!(f, "internetx"),
            #[cfg(feature = "transip")]
            Self::Transip => write!(f, "transip"),
            #[cfg(any(test, feature = "test-utils"))]
            Self::Memory => write!(f, "memory"),
        }
    }
}

// ============ Zone Types ============

/// Whether a zone is authoritative on the provider or transferred from elsewhere.
///
/// Only Hetzner Cloud reports and accepts a mode.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ZoneMode {
    /// Records are managed on the provider.
    Primary,
    /// Records are pulled from external primary nameservers.
    Secondary,
}

/// A zone managed by a DNS provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    /// Provider-specific zone identifier (equals `name` where the API has no ids).
    pub id: String,
    /// Zone name without trailing dot (e.g., `"example.com"`).
    pub name: String,
    /// Default TTL in seconds, if the provider reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    /// Primary/secondary mode, if the provider reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<ZoneMode>,
    /// Authoritative nameservers assigned to the zone.
    #[serde(default)]
    pub nameservers: Vec<String>,
    /// Number of records in this zone, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_count: Option<u32>,
}

impl Zone {
    /// A zone known only by name.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            ttl: None,
            mode: None,
            nameservers: Vec::new(),
            record_count: None,
        }
    }
}

/// Request to create a new zone.
///
/// Fields a provider cannot express are ignored; fields a provider requires but
/// cannot derive on its own produce [`ProviderError::InvalidParameter`](crate::ProviderError::InvalidParameter).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateZoneRequest {
    /// Zone name (e.g., `"example.com"`).
    pub name: String,
    /// Default TTL in seconds.
    pub ttl: Option<u32>,
    /// Zone mode (Hetzner Cloud only).
    pub mode: Option<ZoneMode>,
    /// Nameservers to delegate to. Empty lets the provider pick its own.
    #[serde(default)]
    pub nameservers: Vec<String>,
    /// Primary nameservers for secondary zones (`host` or `host:port`).
    #[serde(default)]
    pub primary_nameservers: Vec<String>,
    /// Responsible mailbox for the SOA record.
    pub soa_email: Option<String>,
}

impl CreateZoneRequest {
    /// A primary zone with provider defaults.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

// ============ DNS Record Types ============

/// Record type, serialized as its mnemonic.
///
/// The named variants are the types the providers agree on. Anything else a
/// provider returns is kept as [`DnsRecordType::Other`] so that it survives a
/// listing, a whole-set rewrite and a zone copy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DnsRecordType {
    A,
    Aaaa,
    /// Provider-side CNAME flattening at the apex.
    Alias,
    Caa,
    Cname,
    Ds,
    Mx,
    Naptr,
    Ns,
    Ptr,
    Soa,
    Srv,
    Sshfp,
    Tlsa,
    Txt,
    /// Uppercase mnemonic of a type without its own variant (`HINFO`, `URI`, `TYPE65280`).
    Other(String),
}

impl DnsRecordType {
    /// Every record type with its own variant.
    pub const ALL: [Self; 15] = [
        Self::A,
        Self::Aaaa,
        Self::Alias,
        Self::Caa,
        Self::Cname,
        Self::Ds,
        Self::Mx,
        Self::Naptr,
        Self::Ns,
        Self::Ptr,
        Self::Soa,
        Self::Srv,
        Self::Sshfp,
        Self::Tlsa,
        Self::Txt,
    ];

    /// Uppercase mnemonic as used on the wire and in zone files.
    pub fn as_str(&self) -> &str {
        match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
            Self::Alias => "ALIAS",
            Self::Caa => "CAA",
            Self::Cname => "CNAME",
            Self::Ds => "DS",
            Self::Mx => "MX",
            Self::Naptr => "NAPTR",
            Self::Ns => "NS",
            Self::Ptr => "PTR",
            Self::Soa => "SOA",
            Self::Srv => "SRV",
            Self::Sshfp => "SSHFP",
            Self::Tlsa => "TLSA",
            Self::Txt => "TXT",
            Self::Other(mnemonic) => mnemonic,
        }
    }

    /// Whether the leading integer of the content is the record's priority.
    pub fn has_priority(&self) -> bool {
        matches!(self, Self::Mx | Self::Srv)
    }
}

impl std::fmt::Display for DnsRecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DnsRecordType {
    type Err = String;

    /// Known mnemonics map to their variant, any other well-formed mnemonic to
    /// [`DnsRecordType::Other`]. The error carries the rejected input.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(known) = Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(trimmed))
        {
            return Ok(known);
        }
        let well_formed = trimmed.len() <= 16
            && trimmed.starts_with(|c: char| c.is_ascii_alphabetic())
            && trimmed.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
        if well_formed {
            Ok(Self::Other(trimmed.to_ascii_uppercase()))
        } else {
            Err(s.to_string())
        }
    }
}

impl TryFrom<String> for DnsRecordType {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse().map_err(|raw| format!("invalid record type {raw:?}"))
    }
}

impl From<DnsRecordType> for String {
    fn from(value: DnsRecordType) -> Self {
        match value {
            DnsRecordType::Other(mnemonic) => mnemonic,
            known => known.as_str().to_string(),
        }
    }
}

/// A DNS record as returned by a provider.
///
/// The shape is flat: `value` holds the record content without the priority, which
/// lives in `priority` for MX and SRV records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsRecord {
    /// Provider-specific record identifier. `None` where the provider has no
    /// per-record identity (`TransIP`, `AutoDNS`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Record name relative to the zone (`"www"`, or `"@"` for the apex).
    pub name: String,
    /// Record type.
    #[serde(rename = "type")]
    pub record_type: DnsRecordType,
    /// Record content (e.g. `"192.0.2.1"`, `"mail.example.com."`).
    pub value: String,
    /// Time to live in seconds.
    pub ttl: u32,
    /// Priority (MX preference, SRV priority).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
}

impl DnsRecord {
    /// Whether this record sits at the zone apex.
    pub fn is_apex(&self, zone: &str) -> bool {
        crate::providers::common::is_apex(&self.name, zone)
    }

    /// Whether two records describe the same name/type/content, ignoring id and TTL.
    pub fn same_content(&self, other: &Self) -> bool {
        self.record_type == other.record_type
            && self.name.eq_ignore_ascii_case(&other.name)
            && self.value == other.value
            && self.priority == other.priority
    }

    /// Content with the priority re-attached, as written in zone files.
    pub fn content_with_priority(&self) -> String {
        match self.priority {
            Some(prio) if self.record_type.has_priority() => format!("{prio} {}", self.value),
            _ => self.value.clone(),
        }
    }
}

/// Request to create a new DNS record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecordRequest {
    /// Record name relative to the zone (`"@"` for the apex).
    pub name: String,
    /// Record type.
    #[serde(rename = "type")]
    pub record_type: DnsRecordType,
    /// Record content without the priority.
    pub value: String,
    /// TTL in seconds; provider default when `None`.
    pub ttl: Option<u32>,
    /// Priority for MX/SRV.
    pub priority: Option<u16>,
}

impl CreateRecordRequest {
    /// Shorthand for a record without TTL or priority.
    pub fn new(
        name: impl Into<String>,
        record_type: DnsRecordType,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            record_type,
            value: value.into(),
            ttl: None,
            priority: None,
        }
    }

    /// Sets the TTL.
    #[must_use]
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Sets the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: u16) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Materializes the request as a record, filling in the TTL default.
    pub fn to_record(&self, id: Option<String>, default_ttl: u32) -> DnsRecord {
        DnsRecord {
            id,
            name: self.name.clone(),
            record_type: self.record_type.clone(),
            value: self.value.clone(),
            ttl: self.ttl.unwrap_or(default_ttl),
            priority: self.priority,
        }
    }
}

impl From<&DnsRecord> for CreateRecordRequest {
    fn from(record: &DnsRecord) -> Self {
        Self {
            name: record.name.clone(),
            record_type: record.record_type.clone(),
            value: record.value.clone(),
            ttl: Some(record.ttl),
            priority: record.priority,
        }
    }
}

// ============ Batch creation ============

/// Outcome of [`DnsProvider::batch_create_records`](crate::DnsProvider::batch_create_records).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchCreateResult {
    pub success_count: usize,
    pub failed_count: usize,
    pub created_records: Vec<DnsRecord>,
    pub failures: Vec<BatchCreateFailure>,
}

/// A request of a batch that could not be created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchCreateFailure {
    /// Position in the request slice
    pub request_index: usize,
    pub record_name: String,
    pub reason: String,
}

// ============ Provider metadata ============

/// Whether a credential is echoed when typed in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Password,
}

/// One key of the flat credential map a provider accepts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderCredentialField {
    /// Key in the accounts file, e.g. `apiToken`
    pub key: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
}

/// What a provider's API can and cannot do.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProviderFeatures {
    /// `create_zone`/`delete_zone` work.
    pub zone_management: bool,
    /// `zone_transfer` reads an exported zone file.
    pub zone_file_export: bool,
    /// Records carry a stable provider-assigned id.
    pub record_ids: bool,
    /// Every record change rewrites the whole record set.
    pub replaces_record_set: bool,
    /// Login accepts a one-time code.
    pub second_factor: bool,
}

/// Page sizes used when listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderLimits {
    pub max_page_size_zones: u32,
    pub max_page_size_records: u32,
}

/// Static description of a provider, from
/// [`DnsProvider::metadata`](crate::DnsProvider::metadata) or
/// [`get_all_provider_metadata`](crate::get_all_provider_metadata).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderMetadata {
    pub id: ProviderType,
    pub name: String,
    pub description: String,
    pub required_fields: Vec<ProviderCredentialField>,
    #[serde(default)]
    pub optional_fields: Vec<ProviderCredentialField>,
    pub features: ProviderFeatures,
    pub limits: ProviderLimits,
}

// ============ Credentials ============

/// A flat credential map that does not fit the provider.
///
/// `field` is the map key, `label` its human-readable name.
#[derive(Debug, Clone, Serialize, thiserror::Error)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CredentialValidationError {
    #[error("{provider}: {label} ({field}) is required")]
    MissingField {
        provider: ProviderType,
        field: String,
        label: String,
    },
    #[error("{provider}: {label} ({field}) is empty")]
    EmptyField {
        provider: ProviderType,
        field: String,
        label: String,
    },
    #[error("{provider}: invalid {label}: {reason}")]
    InvalidFormat {
        provider: ProviderType,
        field: String,
        label: String,
        reason: String,
    },
}

/// Credentials of one account, the input of [`create_provider`](crate::create_provider).
///
/// ```json
/// { "provider": "hetznercloud", "credentials": { "api_token": "..." } }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "provider", content = "credentials")]
pub enum ProviderCredentials {
    /// INWX credentials. Requires feature `inwx`.
    #[cfg(feature = "inwx")]
    #[serde(rename = "inwx")]
    Inwx {
        /// Account user name.
        username: String,
        /// Account password.
        password: String,
        /// Current TOTP code for accounts with two-factor login.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mfa_code: Option<String>,
        /// Use the OTE test environment.
        #[serde(default)]
        sandbox: bool,
    },

    /// Hetzner DNS Console credentials. Requires feature `hetzner`.
    #[cfg(feature = "hetzner")]
    #[serde(rename = "hetzner")]
    Hetzner {
        /// DNS Console API token.
        api_token: String,
    },

    /// Hetzner Cloud credentials. Requires feature `hetznercloud`.
    #[cfg(feature = "hetznercloud")]
    #[serde(rename = "hetznercloud")]
    Hetznercloud {
        /// Cloud project API token.
        api_token: String,
    },

    /// `AutoDNS` credentials. Requires feature `internetx`.
    #[cfg(feature = "internetx")]
    #[serde(rename = "internetx")]
    Internetx {
        /// Account user name.
        username: String,
        /// Account password.
        password: String,
        /// Reseller context (`X-Domainrobot-Context`).
        context: String,
        /// Account id used to derive system nameservers.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        account_id: Option<String>,
        /// Current TOTP code for accounts with two-factor login.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mfa_code: Option<String>,
        /// Use the demo system.
        #[serde(default)]
        sandbox: bool,
        /// Nameserver (`host` or `host:port`) to pull zone transfers from; the
        /// zone's first nameserver when unset.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        axfr_server: Option<String>,
    },

    /// `TransIP` credentials. Requires feature `transip`.
    #[cfg(feature = "transip")]
    #[serde(rename = "transip")]
    Transip {
        /// Bearer access token from the control panel or `/auth`.
        access_token: String,
    },
}

impl ProviderCredentials {
    /// Typed credentials from the flat map of an accounts file.
    ///
    /// Keys are the camelCase `key`s of the provider's credential fields.
    /// `sandbox` takes `true`/`false`/`1`/`0`/`yes`/`no`.
    pub fn from_map(
        provider: &ProviderType,
        map: &HashMap<String, String>,
    ) -> Result<Self, CredentialValidationError> {
        match provider {
            #[cfg(feature = "inwx")]
            ProviderType::Inwx => Ok(Self::Inwx {
                username: Self::get_required_field(provider, map, "username", "Username")?,
                password: Self::get_required_field(provider, map, "password", "Password")?,
                mfa_code: Self::get_optional_field(map, "mfaCode"),
                sandbox: Self::get_flag(provider, map, "sandbox", "Sandbox")?,
            }),
            #[cfg(feature = "hetzner")]
            ProviderType::Hetzner => Ok(Self::Hetzner {
                api_token: Self::get_required_field(provider, map, "apiToken", "API Token")?,
            }),
            #[cfg(feature = "hetznercloud")]
            ProviderType::Hetznercloud => Ok(Self::Hetznercloud {
                api_token: Self::get_required_field(provider, map, "apiToken", "API Token")?,
            }),
            #[cfg(feature = "internetx")]
            ProviderType::Internetx => Ok(Self::Internetx {
                username: Self::get_required_field(provider, map, "username", "Username")?,
                password: Self::get_required_field(provider, map, "password", "Password")?,
                context: Self::get_optional_field(map, "context")
                    .unwrap_or_else(|| "4".to_string()),
                account_id: Self::get_optional_field(map, "accountId"),
                mfa_code: Self::get_optional_field(map, "mfaCode"),
                sandbox: Self::get_flag(provider, map, "sandbox", "Sandbox")?,
                axfr_server: Self::get_optional_field(map, "axfrServer"),
            }),
            #[cfg(feature = "transip")]
            ProviderType::Transip => Ok(Self::Transip {
                access_token: Self::get_required_field(
                    provider,
                    map,
                    "accessToken",
                    "Access Token",
                )?,
            }),
            #[allow(unreachable_patterns)]
            _ => Err(CredentialValidationError::InvalidFormat {
                provider: provider.clone(),
                field: "provider".to_string(),
                label: "Provider".to_string(),
                reason: "provider not enabled in this build".to_string(),
            }),
        }
    }

    fn get_required_field(
        provider: &ProviderType,
        map: &HashMap<String, String>,
        key: &str,
        label: &str,
    ) -> Result<String, CredentialValidationError> {
        match map.get(key) {
            None => Err(CredentialValidationError::MissingField {
                provider: provider.clone(),
                field: key.to_string(),
                label: label.to_string(),
            }),
            Some(v) if v.trim().is_empty() => Err(CredentialValidationError::EmptyField {
                provider: provider.clone(),
                field: key.to_string(),
                label: label.to_string(),
            }),
            Some(v) => Ok(v.clone()),
        }
    }

    #[allow(dead_code)]
    fn get_optional_field(map: &HashMap<String, String>, key: &str) -> Option<String> {
        map.get(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    #[allow(dead_code)]
    fn get_flag(
        provider: &ProviderType,
        map: &HashMap<String, String>,
        key: &str,
        label: &str,
    ) -> Result<bool, CredentialValidationError> {
        match map.get(key).map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            None | Some("" | "false" | "0" | "no") => Ok(false),
            Some("true" | "1" | "yes") => Ok(true),
            Some(other) => Err(CredentialValidationError::InvalidFormat {
                provider: provider.clone(),
                field: key.to_string(),
                label: label.to_string(),
                reason: format!("expected true or false, got '{other}'"),
            }),
        }
    }

    /// The flat map [`from_map`](Self::from_map) reads back.
    pub fn to_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        match self {
            #[cfg(feature = "inwx")]
            Self::Inwx {
                username,
                password,
                mfa_code,
                sandbox,
            } => {
                map.insert("username".to_string(), username.clone());
                map.insert("password".to_string(), password.clone());
                if let Some(code) = mfa_code {
                    map.insert("mfaCode".to_string(), code.clone());
                }
                map.insert("sandbox".to_string(), sandbox.to_string());
            }
            #[cfg(feature = "hetzner")]
            Self::Hetzner { api_token } => {
                map.insert("apiToken".to_string(), api_token.clone());
            }
            #[cfg(feature = "hetznercloud")]
            Self::Hetznercloud { api_token } => {
                map.insert("apiToken".to_string(), api_token.clone());
            }
            #[cfg(feature = "internetx")]
            Self::Internetx {
                username,
                password,
                context,
                account_id,
                mfa_code,
                sandbox,
                axfr_server,
            } => {
                map.insert("username".to_string(), username.clone());
                map.insert("password".to_string(), password.clone());
                map.insert("context".to_string(), context.clone());
                if let Some(id) = account_id {
                    map.insert("accountId".to_string(), id.clone());
                }
                if let Some(code) = mfa_code {
                    map.insert("mfaCode".to_string(), code.clone());
                }
                map.insert("sandbox".to_string(), sandbox.to_string());
                if let Some(server) = axfr_server {
                    map.insert("axfrServer".to_string(), server.clone());
                }
            }
            #[cfg(feature = "transip")]
            Self::Transip { access_token } => {
                map.insert("accessToken".to_string(), access_token.clone());
            }
        }
        map
    }

    pub fn provider_type(&self) -> ProviderType {
        match self {
            #[cfg(feature = "inwx")]
            Self::Inwx { .. } => ProviderType::Inwx,
            #[cfg(feature = "hetzner")]
            Self::Hetzner { .. } => ProviderType::Hetzner,
            #[cfg(feature = "hetznercloud")]
            Self::Hetznercloud { .. } => ProviderType::Hetznercloud,
            #[cfg(feature = "internetx")]
            Self::Internetx { .. } => ProviderType::Internetx,
            #[cfg(feature = "transip")]
            Self::Transip { .. } => ProviderType::Transip,
        }
    }

    /// Whether the provider's login accepts a one-time second-factor code.
    pub fn supports_mfa(&self) -> bool {
        match self {
            #[cfg(feature = "inwx")]
            Self::Inwx { .. } => true,
            #[cfg(feature = "internetx")]
            Self::Internetx { .. } => true,
            #[allow(unreachable_patterns)]
            _ => false,
        }
    }

    /// Sets the one-time second-factor code on providers that accept one.
    ///
    /// Returns `false` when the provider has no second factor.
    pub fn set_mfa_code(&mut self, code: String) -> bool {
        match self {
            #[cfg(feature = "inwx")]
            Self::Inwx { mfa_code, .. } => {
                *mfa_code = Some(code);
                true
            }
            #[cfg(feature = "internetx")]
            Self::Internetx { mfa_code, .. } => {
                *mfa_code = Some(code);
                true
            }
            #[allow(unreachable_patterns)]
            _ => {
                let _ = code;
                false
            }
        }
    }
}
