//! Minimal XML-RPC codec for the domrobot API.
//!
//! Requests are written by hand; responses are read with the `quick-xml` pull
//! parser by recursive descent over `<value>` elements.

use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

/// An XML-RPC value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Bool(bool),
    String(String),
    Double(f64),
    /// `dateTime.iso8601`, kept as sent.
    DateTime(String),
    Base64(Vec<u8>),
    Array(Vec<Value>),
    Struct(BTreeMap<String, Value>),
    Nil,
}

impl Value {
    /// Struct from `(name, value)` pairs.
    pub fn structure<'a>(members: impl IntoIterator<Item = (&'a str, Value)>) -> Self {
        Self::Struct(
            members
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Struct(members) => members.get(key),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::DateTime(s) => Some(s),
            _ => None,
        }
    }

    /// Integer value; numeric strings are accepted since INWX is not consistent about ids.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// String form of scalars, for ids and messages.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::Int(i) => Some(i.to_string()),
            Self::String(s) | Self::DateTime(s) => Some(s.clone()),
            Self::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
            Self::Double(d) => Some(d.to_string()),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<u16> for Value {
    fn from(i: u16) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::Array(items.into_iter().map(Into::into).collect())
    }
}

// ============ Encoding ============

/// Encode a `methodCall` document.
pub fn encode_call(method: &str, params: &[Value]) -> String {
    let mut out = String::from(r#"<?xml version="1.0" encoding="UTF-8"?><methodCall><methodName>"#);
    out.push_str(&escape(method));
    out.push_str("</methodName><params>");
    for param in params {
        out.push_str("<param>");
        write_value(&mut out, param);
        out.push_str("</param>");
    }
    out.push_str("</params></methodCall>");
    out
}

/// Encode a successful `methodResponse`, as the server would send it.
#[cfg(test)]
pub(crate) fn encode_response(value: &Value) -> String {
    let mut out = String::from(r#"<?xml version="1.0" encoding="UTF-8"?><methodResponse><params><param>"#);
    write_value(&mut out, value);
    out.push_str("</param></params></methodResponse>");
    out
}

fn write_value(out: &mut String, value: &Value) {
    out.push_str("<value>");
    match value {
        Value::Int(i) => out.push_str(&format!("<int>{i}</int>")),
        Value::Bool(b) => out.push_str(if *b {
            "<boolean>1</boolean>"
        } else {
            "<boolean>0</boolean>"
        }),
        Value::String(s) => {
            out.push_str("<string>");
            out.push_str(&escape(s.as_str()));
            out.push_str("</string>");
        }
        Value::Double(d) => out.push_str(&format!("<double>{d}</double>")),
        Value::DateTime(s) => {
            out.push_str("<dateTime.iso8601>");
            out.push_str(&escape(s.as_str()));
            out.push_str("</dateTime.iso8601>");
        }
        Value::Base64(bytes) => {
            out.push_str("<base64>");
            out.push_str(&BASE64.encode(bytes));
            out.push_str("</base64>");
        }
        Value::Array(items) => {
            out.push_str("<array><data>");
            for item in items {
                write_value(out, item);
            }
            out.push_str("</data></array>");
        }
        Value::Struct(members) => {
            out.push_str("<struct>");
            for (name, member) in members {
                out.push_str("<member><name>");
                out.push_str(&escape(name.as_str()));
                out.push_str("</name>");
                write_value(out, member);
                out.push_str("</member>");
            }
            out.push_str("</struct>");
        }
        Value::Nil => out.push_str("<nil/>"),
    }
    out.push_str("</value>");
}

// ============ Decoding ============

/// Malformed or unexpected XML-RPC response.
#[derive(Debug, thiserror::Error)]
#[error("invalid XML-RPC response: {0}")]
pub struct DecodeError(String);

/// A decoded `methodResponse`.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Success(Value),
    Fault { code: i64, message: String },
}

/// Decode a `methodResponse` document.
pub fn decode_response(xml: &str) -> Result<Response, DecodeError> {
    let mut parser = Parser::new(xml);
    parser.expect_start(b"methodResponse")?;

    let response = match parser.next_significant()? {
        Event::Start(e) if e.name().as_ref() == b"params" => {
            let value = match parser.next_significant()? {
                Event::Start(e) if e.name().as_ref() == b"param" => {
                    parser.expect_start(b"value")?;
                    let value = parser.value()?;
                    parser.expect_end(b"param")?;
                    parser.expect_end(b"params")?;
                    value
                }
                Event::End(e) if e.name().as_ref() == b"params" => Value::Nil,
                other => return Err(unexpected("<param>", &other)),
            };
            Response::Success(value)
        }
        Event::Empty(e) if e.name().as_ref() == b"params" => Response::Success(Value::Nil),
        Event::Start(e) if e.name().as_ref() == b"fault" => {
            parser.expect_start(b"value")?;
            let fault = parser.value()?;
            parser.expect_end(b"fault")?;
            Response::Fault {
                code: fault
                    .get("faultCode")
                    .and_then(Value::as_i64)
                    .unwrap_or_default(),
                message: fault
                    .get("faultString")
                    .and_then(Value::to_text)
                    .unwrap_or_default(),
            }
        }
        other => return Err(unexpected("<params> or <fault>", &other)),
    };

    parser.expect_end(b"methodResponse")?;
    Ok(response)
}

fn unexpected(wanted: &str, got: &Event<'_>) -> DecodeError {
    let got = match got {
        Event::Start(e) | Event::Empty(e) => {
            format!("<{}>", String::from_utf8_lossy(e.name().as_ref()))
        }
        Event::End(e) => format!("</{}>", String::from_utf8_lossy(e.name().as_ref())),
        Event::Text(_) | Event::CData(_) => "text".to_string(),
        Event::Eof => "end of document".to_string(),
        _ => "markup".to_string(),
    };
    DecodeError(format!("expected {wanted}, found {got}"))
}

struct Parser<'a> {
    reader: Reader<&'a [u8]>,
}

impl<'a> Parser<'a> {
    fn new(xml: &'a str) -> Self {
        Self {
            reader: Reader::from_str(xml),
        }
    }

    fn raw_next(&mut self) -> Result<Event<'a>, DecodeError> {
        self.reader
            .read_event()
            .map_err(|e| DecodeError(e.to_string()))
    }

    /// Next event, skipping declarations, comments and whitespace between elements.
    fn next_significant(&mut self) -> Result<Event<'a>, DecodeError> {
        loop {
            match self.raw_next()? {
                Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
                Event::Text(t) if t.iter().all(u8::is_ascii_whitespace) => {}
                other => return Ok(other),
            }
        }
    }

    fn expect_start(&mut self, name: &[u8]) -> Result<(), DecodeError> {
        match self.next_significant()? {
            Event::Start(e) if e.name().as_ref() == name => Ok(()),
            other => Err(unexpected(&format!("<{}>", String::from_utf8_lossy(name)), &other)),
        }
    }

    fn expect_end(&mut self, name: &[u8]) -> Result<(), DecodeError> {
        match self.next_significant()? {
            Event::End(e) if e.name().as_ref() == name => Ok(()),
            other => Err(unexpected(&format!("</{}>", String::from_utf8_lossy(name)), &other)),
        }
    }

    /// Text content up to the closing tag `name`.
    fn text_until(&mut self, name: &[u8]) -> Result<String, DecodeError> {
        let mut text = String::new();
        loop {
            match self.raw_next()? {
                Event::Text(t) => {
                    let unescaped = t.unescape().map_err(|e| DecodeError(e.to_string()))?;
                    text.push_str(&unescaped);
                }
                Event::CData(c) => text.push_str(&String::from_utf8_lossy(&c.into_inner())),
                Event::End(e) if e.name().as_ref() == name => return Ok(text),
                Event::Comment(_) => {}
                other => {
                    return Err(unexpected(
                        &format!("</{}>", String::from_utf8_lossy(name)),
                        &other,
                    ));
                }
            }
        }
    }

    /// Parse the content of a `<value>` whose start tag was already consumed.
    fn value(&mut self) -> Result<Value, DecodeError> {
        let mut untyped = String::new();
        loop {
            match self.raw_next()? {
                Event::Text(t) => {
                    let unescaped = t.unescape().map_err(|e| DecodeError(e.to_string()))?;
                    untyped.push_str(&unescaped);
                }
                // untyped text is a string
                Event::End(e) if e.name().as_ref() == b"value" => {
                    return Ok(Value::String(untyped));
                }
                Event::Empty(e) => {
                    let value = empty_typed(&e)?;
                    self.expect_end(b"value")?;
                    return Ok(value);
                }
                Event::Start(e) => {
                    let value = self.typed(&e)?;
                    self.expect_end(b"value")?;
                    return Ok(value);
                }
                Event::Comment(_) => {}
                other => return Err(unexpected("a value", &other)),
            }
        }
    }

    fn typed(&mut self, start: &BytesStart<'_>) -> Result<Value, DecodeError> {
        let name = start.name();
        let tag = name.as_ref();
        match tag {
            b"int" | b"i4" | b"i8" => {
                let text = self.text_until(tag)?;
                text.trim()
                    .parse()
                    .map(Value::Int)
                    .map_err(|_| DecodeError(format!("bad integer '{text}'")))
            }
            b"boolean" => match self.text_until(tag)?.trim() {
                "1" | "true" => Ok(Value::Bool(true)),
                "0" | "false" => Ok(Value::Bool(false)),
                other => Err(DecodeError(format!("bad boolean '{other}'"))),
            },
            b"string" => self.text_until(tag).map(Value::String),
            b"double" => {
                let text = self.text_until(tag)?;
                text.trim()
                    .parse()
                    .map(Value::Double)
                    .map_err(|_| DecodeError(format!("bad double '{text}'")))
            }
            b"dateTime.iso8601" => self.text_until(tag).map(Value::DateTime),
            b"base64" => {
                let text = self.text_until(tag)?;
                let compact: String = text.split_whitespace().collect();
                BASE64
                    .decode(compact)
                    .map(Value::Base64)
                    .map_err(|e| DecodeError(format!("bad base64: {e}")))
            }
            b"nil" => {
                self.expect_end(tag)?;
                Ok(Value::Nil)
            }
            b"array" => self.array(),
            b"struct" => self.structure(),
            other => Err(DecodeError(format!(
                "unknown value type <{}>",
                String::from_utf8_lossy(other)
            ))),
        }
    }

    fn array(&mut self) -> Result<Value, DecodeError> {
        let mut items = Vec::new();
        match self.next_significant()? {
            Event::Empty(e) if e.name().as_ref() == b"data" => {}
            Event::Start(e) if e.name().as_ref() == b"data" => loop {
                match self.next_significant()? {
                    Event::Start(e) if e.name().as_ref() == b"value" => items.push(self.value()?),
                    Event::End(e) if e.name().as_ref() == b"data" => break,
                    other => return Err(unexpected("<value> or </data>", &other)),
                }
            },
            other => return Err(unexpected("<data>", &other)),
        }
        self.expect_end(b"array")?;
        Ok(Value::Array(items))
    }

    fn structure(&mut self) -> Result<Value, DecodeError> {
        let mut members = BTreeMap::new();
        loop {
            match self.next_significant()? {
                Event::Start(e) if e.name().as_ref() == b"member" => {
                    self.expect_start(b"name")?;
                    let name = self.text_until(b"name")?;
                    self.expect_start(b"value")?;
                    let value = self.value()?;
                    self.expect_end(b"member")?;
                    members.insert(name, value);
                }
                Event::End(e) if e.name().as_ref() == b"struct" => break,
                other => return Err(unexpected("<member> or </struct>", &other)),
            }
        }
        Ok(Value::Struct(members))
    }
}

fn empty_typed(start: &BytesStart<'_>) -> Result<Value, DecodeError> {
    match start.name().as_ref() {
        b"nil" => Ok(Value::Nil),
        b"string" => Ok(Value::String(String::new())),
        b"array" => Ok(Value::Array(Vec::new())),
        b"struct" => Ok(Value::Struct(BTreeMap::new())),
        other => Err(DecodeError(format!(
            "empty <{}/> has no value",
            String::from_utf8_lossy(other)
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_struct_param_with_escaping() {
        let xml = encode_call(
            "account.login",
            &[Value::structure([
                ("user", "alice".into()),
                ("pass", "a<b&c".into()),
                ("lang", "en".into()),
            ])],
        );
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?><methodCall>"#));
        assert!(xml.contains("<methodName>account.login</methodName>"));
        assert!(xml.contains(
            "<member><name>pass</name><value><string>a&lt;b&amp;c</string></value></member>"
        ));
    }

    #[test]
    fn encodes_arrays_and_scalars() {
        let xml = encode_call(
            "nameserver.create",
            &[Value::structure([
                ("ns", vec!["ns.inwx.de", "ns2.inwx.de"].into()),
                ("ttl", 3600u32.into()),
                ("testing", true.into()),
            ])],
        );
        assert!(xml.contains(
            "<array><data><value><string>ns.inwx.de</string></value><value><string>ns2.inwx.de</string></value></data></array>"
        ));
        assert!(xml.contains("<value><int>3600</int></value>"));
        assert!(xml.contains("<value><boolean>1</boolean></value>"));
    }

    #[test]
    fn decodes_nested_response() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<methodResponse>
  <params>
    <param>
      <value>
        <struct>
          <member><name>code</name><value><int>1000</int></value></member>
          <member><name>msg</name><value><string>Command completed successfully</string></value></member>
          <member>
            <name>resData</name>
            <value><struct>
              <member><name>count</name><value><i4>1</i4></value></member>
              <member><name>domains</name><value><array><data>
                <value><struct>
                  <member><name>roId</name><value><int>42</int></value></member>
                  <member><name>domain</name><value>example.com</value></member>
                </struct></value>
              </data></array></value></member>
            </struct></value>
          </member>
        </struct>
      </value>
    </param>
  </params>
</methodResponse>"#;

        let Response::Success(value) = decode_response(xml).unwrap() else {
            panic!("expected success");
        };
        assert_eq!(value.get("code").and_then(Value::as_i64), Some(1000));
        let domains = value
            .get("resData")
            .and_then(|r| r.get("domains"))
            .and_then(Value::as_array)
            .unwrap();
        assert_eq!(domains.len(), 1);
        assert_eq!(domains[0].get("roId").and_then(Value::as_i64), Some(42));
        assert_eq!(
            domains[0].get("domain").and_then(Value::as_str),
            Some("example.com")
        );
    }

    #[test]
    fn decodes_fault() {
        let xml = "<methodResponse><fault><value><struct>\
            <member><name>faultCode</name><value><int>2400</int></value></member>\
            <member><name>faultString</name><value><string>Command failed</string></value></member>\
            </struct></value></fault></methodResponse>";
        assert_eq!(
            decode_response(xml).unwrap(),
            Response::Fault {
                code: 2400,
                message: "Command failed".to_string()
            }
        );
    }

    #[test]
    fn decodes_scalars_and_empties() {
        let xml = "<methodResponse><params><param><value><struct>\
            <member><name>t</name><value><boolean>0</boolean></value></member>\
            <member><name>d</name><value><double>1.5</double></value></member>\
            <member><name>b</name><value><base64>aGk=</base64></value></member>\
            <member><name>s</name><value><string/></value></member>\
            <member><name>e</name><value><string>&lt;tag&gt;</string></value></member>\
            <member><name>n</name><value><nil/></value></member>\
            <member><name>a</name><value><array><data/></array></value></member>\
            </struct></value></param></params></methodResponse>";
        let Response::Success(v) = decode_response(xml).unwrap() else {
            panic!("expected success");
        };
        assert_eq!(v.get("t"), Some(&Value::Bool(false)));
        assert_eq!(v.get("d"), Some(&Value::Double(1.5)));
        assert_eq!(v.get("b"), Some(&Value::Base64(b"hi".to_vec())));
        assert_eq!(v.get("s"), Some(&Value::String(String::new())));
        assert_eq!(v.get("e").and_then(Value::as_str), Some("<tag>"));
        assert_eq!(v.get("n"), Some(&Value::Nil));
        assert_eq!(v.get("a"), Some(&Value::Array(Vec::new())));
    }

    #[test]
    fn rejects_malformed_documents() {
        assert!(decode_response("<methodResponse><params><param>").is_err());
        assert!(decode_response("<html>502 Bad Gateway</html>").is_err());
        assert!(
            decode_response(
                "<methodResponse><params><param><value><int>x</int></value></param></params></methodResponse>"
            )
            .is_err()
        );
    }
}
