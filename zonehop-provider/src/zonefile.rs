//! Master-file (RFC 1035 §5) parser for zone exports and zone transfers.
//!
//! Handles `$ORIGIN` and `$TTL`, comments, quoted strings, parenthesized
//! multi-line records and owner inheritance from the previous line. Types without
//! their own [`DnsRecordType`] variant come back as [`DnsRecordType::Other`] with
//! their rdata as written; anything that does not parse is reported with its
//! line number.

use thiserror::Error;

use crate::providers::common::{
    full_name_to_relative, normalize_domain_name, split_priority, unquote_txt,
};
use crate::types::{DnsRecord, DnsRecordType};

/// A malformed zone file line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("zone file line {line}: {reason}")]
pub struct ZoneFileError {
    /// 1-based line number where the offending entry starts.
    pub line: usize,
    /// What is wrong with it.
    pub reason: String,
}

impl ZoneFileError {
    fn new(line: usize, reason: impl Into<String>) -> Self {
        Self {
            line,
            reason: reason.into(),
        }
    }
}

const CLASSES: [&str; 4] = ["IN", "CH", "HS", "CS"];

/// Parse zone file text into records named relative to `origin`.
pub fn parse_zone_text(origin: &str, text: &str) -> Result<Vec<DnsRecord>, ZoneFileError> {
    let mut parser = Parser::new(origin);
    let mut pending: Option<Entry> = None;

    for (index, raw_line) in text.lines().enumerate() {
        let line_no = index + 1;
        let (content, depth_delta) = strip_comment(raw_line);

        if let Some(mut entry) = pending.take() {
            entry.text.push(' ');
            entry.text.push_str(&content);
            entry.depth += depth_delta;
            if entry.depth < 0 {
                return Err(ZoneFileError::new(entry.line, "unbalanced ')'"));
            }
            if entry.depth == 0 {
                parser.entry(&entry)?;
            } else {
                pending = Some(entry);
            }
            continue;
        }

        if content.trim().is_empty() {
            continue;
        }

        let entry = Entry {
            line: line_no,
            inherits_owner: raw_line.starts_with([' ', '\t']),
            text: content,
            depth: depth_delta,
        };
        match entry.depth {
            0 => parser.entry(&entry)?,
            d if d > 0 => pending = Some(entry),
            _ => return Err(ZoneFileError::new(line_no, "unbalanced ')'")),
        }
    }

    if let Some(entry) = pending {
        return Err(ZoneFileError::new(entry.line, "unterminated '('"));
    }

    Ok(parser.records)
}

/// One logical entry, possibly joined from several physical lines
struct Entry {
    line: usize,
    inherits_owner: bool,
    text: String,
    depth: i32,
}

struct Parser {
    zone: String,
    origin: String,
    default_ttl: Option<u32>,
    last_ttl: Option<u32>,
    last_owner: Option<String>,
    records: Vec<DnsRecord>,
}

impl Parser {
    fn new(origin: &str) -> Self {
        let zone = normalize_domain_name(origin);
        Self {
            origin: zone.clone(),
            zone,
            default_ttl: None,
            last_ttl: None,
            last_owner: None,
            records: Vec::new(),
        }
    }

    fn entry(&mut self, entry: &Entry) -> Result<(), ZoneFileError> {
        let tokens = tokenize(&entry.text).map_err(|r| ZoneFileError::new(entry.line, r))?;
        let Some(first) = tokens.first() else {
            return Ok(());
        };

        if first.starts_with('$') {
            return self.directive(entry.line, &tokens);
        }

        let mut idx = 0;
        let owner = if entry.inherits_owner {
            self.last_owner
                .clone()
                .ok_or_else(|| ZoneFileError::new(entry.line, "record without owner name"))?
        } else {
            idx = 1;
            absolutize(first, &self.origin)
        };

        let mut ttl = None;
        for _ in 0..2 {
            let Some(token) = tokens.get(idx) else { break };
            if token.starts_with(|c: char| c.is_ascii_digit()) {
                ttl = Some(
                    parse_ttl(token).ok_or_else(|| {
                        ZoneFileError::new(entry.line, format!("invalid TTL '{token}'"))
                    })?,
                );
                idx += 1;
            } else if CLASSES.iter().any(|c| c.eq_ignore_ascii_case(token)) {
                idx += 1;
            } else {
                break;
            }
        }

        let type_token = tokens
            .get(idx)
            .ok_or_else(|| ZoneFileError::new(entry.line, "missing record type"))?;
        let rdata = &tokens[idx + 1..];
        if rdata.is_empty() {
            return Err(ZoneFileError::new(
                entry.line,
                format!("missing data for {type_token} record"),
            ));
        }

        self.last_owner = Some(owner.clone());
        if ttl.is_some() {
            self.last_ttl = ttl;
        }

        let record_type = type_token.parse::<DnsRecordType>().map_err(|_| {
            ZoneFileError::new(entry.line, format!("invalid record type '{type_token}'"))
        })?;

        let ttl = ttl
            .or(self.default_ttl)
            .or(self.last_ttl)
            .ok_or_else(|| ZoneFileError::new(entry.line, "no TTL and no $TTL directive"))?;

        let joined = rdata.join(" ");
        let content = if record_type == DnsRecordType::Txt {
            unquote_txt(&joined)
        } else {
            joined
        };
        let (priority, value) = split_priority(&record_type, &content);

        self.records.push(DnsRecord {
            id: None,
            name: full_name_to_relative(&owner, &self.zone),
            record_type,
            value,
            ttl,
            priority,
        });
        Ok(())
    }

    fn directive(&mut self, line: usize, tokens: &[String]) -> Result<(), ZoneFileError> {
        let arg = tokens
            .get(1)
            .ok_or_else(|| ZoneFileError::new(line, format!("{} without argument", tokens[0])))?;
        match tokens[0].to_ascii_uppercase().as_str() {
            "$ORIGIN" => {
                self.origin = absolutize(arg, &self.origin);
                Ok(())
            }
            "$TTL" => {
                self.default_ttl = Some(
                    parse_ttl(arg)
                        .ok_or_else(|| ZoneFileError::new(line, format!("invalid TTL '{arg}'")))?,
                );
                Ok(())
            }
            other => Err(ZoneFileError::new(
                line,
                format!("unsupported directive {other}"),
            )),
        }
    }
}

/// Resolve `@` and relative names against the current origin
fn absolutize(name: &str, origin: &str) -> String {
    if name == "@" {
        origin.to_string()
    } else if let Some(absolute) = name.strip_suffix('.') {
        absolute.to_string()
    } else if origin.is_empty() {
        name.to_string()
    } else {
        format!("{name}.{origin}")
    }
}

/// TTL in seconds, plain (`3600`) or with BIND units (`1h30m`, `2d`)
fn parse_ttl(token: &str) -> Option<u32> {
    if let Ok(secs) = token.parse::<u32>() {
        return Some(secs);
    }

    let mut total: u32 = 0;
    let mut digits = String::new();
    for c in token.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let unit = match c.to_ascii_lowercase() {
            's' => 1,
            'm' => 60,
            'h' => 3_600,
            'd' => 86_400,
            'w' => 604_800,
            _ => return None,
        };
        let n: u32 = digits.parse().ok()?;
        total = total.checked_add(n.checked_mul(unit)?)?;
        digits.clear();
    }
    if digits.is_empty() { Some(total) } else { None }
}

/// Drop the comment, blank out parentheses and report the paren depth change
fn strip_comment(line: &str) -> (String, i32) {
    let mut out = String::with_capacity(line.len());
    let mut depth = 0;
    let mut in_quotes = false;
    let mut escaped = false;

    for c in line.trim_end_matches('\r').chars() {
        if escaped {
            out.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' => {
                out.push(c);
                escaped = true;
            }
            '"' => {
                out.push(c);
                in_quotes = !in_quotes;
            }
            ';' if !in_quotes => break,
            '(' if !in_quotes => {
                depth += 1;
                out.push(' ');
            }
            ')' if !in_quotes => {
                depth -= 1;
                out.push(' ');
            }
            _ => out.push(c),
        }
    }
    (out, depth)
}

/// Whitespace-separated tokens; quoted strings stay one token, quotes included
fn tokenize(text: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escaped = false;

    for c in text.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' => {
                current.push(c);
                escaped = true;
            }
            '"' => {
                current.push(c);
                in_quotes = !in_quotes;
            }
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(c),
        }
    }
    if in_quotes {
        return Err("unterminated quoted string".to_string());
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    Ok(tokens)
}
