//! Zone transfer (AXFR over TCP) from an `AutoDNS` nameserver

use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::{Name, RData, Record, RecordType};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::error::{ProviderError, Result};
use crate::providers::common::{full_name_to_relative, normalize_domain_name, split_priority};
use crate::types::{DnsRecord, DnsRecordType};

const DNS_PORT: u16 = 53;

/// `host`, `host:port`, an IP or a socket address, as something `TcpStream::connect` takes.
pub(super) fn server_address(server: &str) -> String {
    if server.parse::<SocketAddr>().is_ok() {
        return server.to_string();
    }
    if let Ok(ip) = server.parse::<IpAddr>() {
        return SocketAddr::new(ip, DNS_PORT).to_string();
    }
    match server.rsplit_once(':') {
        Some((_, port)) if port.parse::<u16>().is_ok() => server.to_string(),
        _ => format!("{}:{DNS_PORT}", normalize_domain_name(server)),
    }
}

fn query_id() -> u16 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.subsec_nanos());
    u16::try_from(nanos % 65_536).unwrap_or_default()
}

fn network_error(provider: &str, detail: impl ToString) -> ProviderError {
    ProviderError::NetworkError {
        provider: provider.to_string(),
        detail: detail.to_string(),
    }
}

fn parse_error(provider: &str, detail: impl ToString) -> ProviderError {
    ProviderError::ParseError {
        provider: provider.to_string(),
        detail: detail.to_string(),
    }
}

async fn with_timeout<T>(
    provider: &str,
    limit: Duration,
    what: &str,
    fut: impl Future<Output = std::io::Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(limit, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(network_error(provider, format!("{what}: {e}"))),
        Err(_) => Err(ProviderError::Timeout {
            provider: provider.to_string(),
            detail: format!("{what} timed out after {}s", limit.as_secs()),
        }),
    }
}

fn check_response_code(provider: &str, zone: &str, code: ResponseCode) -> Result<()> {
    match code {
        ResponseCode::NoError => Ok(()),
        ResponseCode::Refused | ResponseCode::NotAuth => Err(ProviderError::PermissionDenied {
            provider: provider.to_string(),
            raw_message: Some(format!("zone transfer of {zone} refused ({code})")),
        }),
        ResponseCode::NXDomain => Err(ProviderError::ZoneNotFound {
            provider: provider.to_string(),
            zone: zone.to_string(),
            raw_message: Some(code.to_string()),
        }),
        other => Err(ProviderError::Unknown {
            provider: provider.to_string(),
            raw_code: Some(u16::from(other).to_string()),
            raw_message: format!("zone transfer of {zone} failed: {other}"),
        }),
    }
}

/// Convert a transferred resource record into the zone-relative record shape.
pub(super) fn to_dns_record(record: &Record, zone: &str) -> Result<DnsRecord> {
    let record_type = match record.record_type() {
        RecordType::Unknown(code) => DnsRecordType::Other(format!("TYPE{code}")),
        known => known.to_string().parse().map_err(|raw: String| {
            ProviderError::UnsupportedRecordType {
                provider: "internetx".to_string(),
                record_type: raw,
            }
        })?,
    };
    let rdata = match record.data() {
        RData::TXT(txt) => txt
            .txt_data()
            .iter()
            .map(|chunk| String::from_utf8_lossy(chunk))
            .collect::<String>(),
        other => other.to_string(),
    };
    let (priority, value) = split_priority(&record_type, &rdata);
    Ok(DnsRecord {
        id: None,
        name: full_name_to_relative(&record.name().to_string(), zone),
        record_type,
        value,
        ttl: record.ttl(),
        priority,
    })
}

/// Pull every record of `zone` from `server` with an AXFR query.
///
/// The transfer ends at the second SOA record; the closing SOA is not returned.
/// `limit` applies to the connect and to each read separately.
pub(super) async fn transfer(
    provider: &str,
    server: &str,
    zone: &str,
    limit: Duration,
) -> Result<Vec<DnsRecord>> {
    let origin = normalize_domain_name(zone);
    let name = Name::from_ascii(format!("{origin}."))
        .map_err(|e| ProviderError::InvalidParameter {
            provider: provider.to_string(),
            param: "zone".to_string(),
            detail: format!("{origin}: {e}"),
        })?;

    let id = query_id();
    let mut query = Message::new();
    query
        .set_id(id)
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(false)
        .add_query(Query::query(name, RecordType::AXFR));
    let payload = query.to_vec().map_err(|e| parse_error(provider, e))?;
    let length = u16::try_from(payload.len())
        .map_err(|_| parse_error(provider, "AXFR query exceeds 65535 bytes"))?;

    let address = server_address(server);
    log::debug!("[{provider}] AXFR {origin} from {address}");
    let mut stream = with_timeout(provider, limit, "connect", TcpStream::connect(&address)).await?;

    let mut frame = Vec::with_capacity(payload.len() + 2);
    frame.extend_from_slice(&length.to_be_bytes());
    frame.extend_from_slice(&payload);
    with_timeout(provider, limit, "send AXFR query", stream.write_all(&frame)).await?;

    let mut records = Vec::new();
    let mut soa_seen = 0usize;
    loop {
        let mut len_bytes = [0u8; 2];
        with_timeout(provider, limit, "read AXFR response", stream.read_exact(&mut len_bytes))
            .await
            .map_err(|e| match e {
                ProviderError::NetworkError { .. } => parse_error(
                    provider,
                    format!("transfer of {origin} ended before the closing SOA"),
                ),
                other => other,
            })?;
        let mut buffer = vec![0u8; usize::from(u16::from_be_bytes(len_bytes))];
        with_timeout(provider, limit, "read AXFR response", stream.read_exact(&mut buffer)).await?;

        let response = Message::from_vec(&buffer).map_err(|e| parse_error(provider, e))?;
        if response.id() != id {
            return Err(parse_error(
                provider,
                format!("AXFR response id {} does not match query {id}", response.id()),
            ));
        }
        check_response_code(provider, &origin, response.response_code())?;

        for record in response.answers() {
            if record.record_type() == RecordType::SOA {
                soa_seen += 1;
                if soa_seen == 2 {
                    log::info!(
                        "[{provider}] AXFR of {origin} from {address}: {} records",
                        records.len()
                    );
                    return Ok(records);
                }
            } else if soa_seen == 0 {
                return Err(parse_error(
                    provider,
                    format!("AXFR of {origin} did not start with SOA"),
                ));
            }
            records.push(to_dns_record(record, &origin)?);
        }
    }
}
