//! Typed views of domrobot `resData` structures

use super::xmlrpc::Value;

/// One page of `nameserver.list`
pub(crate) struct DomainPage {
    pub count: u32,
    pub domains: Vec<String>,
}

impl DomainPage {
    pub fn from_value(res: &Value) -> Option<Self> {
        let count = u32::try_from(res.get("count")?.as_i64()?).ok()?;
        let domains = match res.get("domains") {
            Some(list) => list
                .as_array()?
                .iter()
                .filter_map(|d| d.get("domain").and_then(Value::as_str))
                .map(ToString::to_string)
                .collect(),
            None => Vec::new(),
        };
        Some(Self { count, domains })
    }
}

/// A record from `nameserver.info`; `name` is the FQDN.
#[derive(Debug)]
pub(crate) struct InwxRecord {
    pub id: String,
    pub name: String,
    pub record_type: String,
    pub content: String,
    pub ttl: u32,
    pub prio: u16,
}

impl InwxRecord {
    pub fn from_value(v: &Value) -> Option<Self> {
        Some(Self {
            id: v.get("id")?.to_text()?,
            name: v.get("name")?.to_text()?,
            record_type: v.get("type")?.to_text()?,
            content: v.get("content").and_then(Value::to_text).unwrap_or_default(),
            ttl: v
                .get("ttl")
                .and_then(Value::as_i64)
                .and_then(|t| u32::try_from(t).ok())
                .unwrap_or(super::DEFAULT_TTL),
            prio: v
                .get("prio")
                .and_then(Value::as_i64)
                .and_then(|p| u16::try_from(p).ok())
                .unwrap_or(0),
        })
    }
}

/// Records of a `nameserver.info` response; entries without id/name/type are dropped.
pub(crate) fn records_from_info(res: &Value) -> Vec<InwxRecord> {
    res.get("record")
        .and_then(Value::as_array)
        .unwrap_or_default()
        .iter()
        .filter_map(|r| {
            let rec = InwxRecord::from_value(r);
            if rec.is_none() {
                log::warn!("[inwx] Ignoring incomplete record entry: {r:?}");
            }
            rec
        })
        .collect()
}
