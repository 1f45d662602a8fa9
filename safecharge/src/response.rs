//! Gateway response parsing.
//!
//! A response body is either XML or a plain-text error. Bodies that contain
//! no `<` at all are returned untouched as [`ResponseDocument::Text`].
//! Everything else goes through two phases:
//!
//! 1. a strict well-formedness scan that collects every problem it finds
//! 2. a walk that turns the document into an [`XmlDocument`]
//!
//! Only a body that passes the scan is walked.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde::{Deserialize, Serialize};

use crate::error::ResponseError;

/// Name of the element carrying the transaction outcome.
pub const STATUS_FIELD: &str = "Status";

/// Value of one element in a parsed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum XmlValue {
    /// Element without text or children.
    Null,
    /// Text-only element.
    Text(String),
    /// Sibling elements sharing one name, in document order.
    List(Vec<XmlValue>),
    /// Element with child elements.
    Map(BTreeMap<String, XmlValue>),
}

impl XmlValue {
    /// Returns the text of a text-only element.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the children of an element that has any.
    #[must_use]
    pub const fn as_map(&self) -> Option<&BTreeMap<String, XmlValue>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Returns whether the element was empty.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// A parsed XML response.
///
/// `fields` holds the children of the root element keyed by tag name. A root
/// with text and no children keeps that text in `text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlDocument {
    root: String,
    fields: BTreeMap<String, XmlValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

impl XmlDocument {
    /// Tag name of the root element.
    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Children of the root element.
    #[must_use]
    pub const fn fields(&self) -> &BTreeMap<String, XmlValue> {
        &self.fields
    }

    /// Text of a root element without children.
    #[must_use]
    pub fn root_text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Returns the top-level field `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&XmlValue> {
        self.fields.get(name)
    }

    /// Returns the text of the top-level field `name`.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(XmlValue::as_text)
    }

    /// Follows nested element names from the root.
    ///
    /// ```
    /// use safecharge::response::parse;
    ///
    /// let doc = parse("<Response><Card><Type>Visa</Type></Card></Response>")?;
    /// let xml = doc.as_xml().unwrap();
    /// assert_eq!(xml.path(&["Card", "Type"]).and_then(|v| v.as_text()), Some("Visa"));
    /// # Ok::<(), safecharge::ResponseError>(())
    /// ```
    #[must_use]
    pub fn path(&self, names: &[&str]) -> Option<&XmlValue> {
        let (first, rest) = names.split_first()?;
        rest.iter()
            .try_fold(self.get(first)?, |value, name| value.as_map()?.get(*name))
    }

    /// Recognised value of the `Status` field.
    #[must_use]
    pub fn status(&self) -> Option<ResponseStatus> {
        self.text(STATUS_FIELD)?.parse().ok()
    }
}

/// What the gateway returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseDocument {
    /// A well-formed XML body.
    Xml(XmlDocument),
    /// A body that is not XML, verbatim.
    Text(String),
}

impl ResponseDocument {
    /// Returns the parsed document for an XML body.
    #[must_use]
    pub const fn as_xml(&self) -> Option<&XmlDocument> {
        match self {
            Self::Xml(doc) => Some(doc),
            Self::Text(_) => None,
        }
    }

    /// Returns the raw body of a plain-text response.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Xml(_) => None,
            Self::Text(text) => Some(text),
        }
    }

    /// Transaction outcome, if the response carries a recognised one.
    #[must_use]
    pub fn status(&self) -> Option<ResponseStatus> {
        self.as_xml().and_then(XmlDocument::status)
    }
}

/// Transaction outcome reported in the `Status` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResponseStatus {
    /// Authorised by the issuer.
    Approved,
    /// Non-financial request completed.
    Success,
    /// Refused by the issuer or the gateway.
    Declined,
    /// Rejected because of a gateway or input error.
    Error,
    /// Awaiting a final decision.
    Pending,
}

impl ResponseStatus {
    /// Wire spelling of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "APPROVED",
            Self::Success => "SUCCESS",
            Self::Declined => "DECLINED",
            Self::Error => "ERROR",
            Self::Pending => "PENDING",
        }
    }
}

impl Display for ResponseStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `Status` value outside the known set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown response status [{0}]")]
pub struct UnknownStatus(pub String);

impl FromStr for ResponseStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "APPROVED" => Ok(Self::Approved),
            "SUCCESS" => Ok(Self::Success),
            "DECLINED" => Ok(Self::Declined),
            "ERROR" => Ok(Self::Error),
            "PENDING" => Ok(Self::Pending),
            _ => Err(UnknownStatus(s.to_owned())),
        }
    }
}

/// Parses a raw response body.
///
/// # Errors
///
/// Returns [`ResponseError::MalformedXml`] with every problem found when a
/// body that looks like XML is not well-formed.
pub fn parse(raw: &str) -> Result<ResponseDocument, ResponseError> {
    if !looks_like_xml(raw) {
        return Ok(ResponseDocument::Text(raw.to_owned()));
    }

    let problems = well_formedness_errors(raw);
    if !problems.is_empty() {
        return Err(ResponseError::MalformedXml(problems));
    }

    build_document(raw).map(ResponseDocument::Xml)
}

fn looks_like_xml(raw: &str) -> bool {
    raw.contains('<')
}

fn is_blank(bytes: &[u8]) -> bool {
    bytes.iter().all(u8::is_ascii_whitespace)
}

/// Checks every attribute of a tag. Attribute errors already name their
/// offset within the tag, so only the tag's own offset is added.
fn check_attributes(start: &BytesStart<'_>, position: impl Display) -> Result<(), String> {
    let in_tag = |err: &dyn Display| format!("{err} in the tag starting at byte {position}");
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|err| in_tag(&err))?;
        attribute.unescape_value().map_err(|err| in_tag(&err))?;
    }
    Ok(())
}

fn well_formedness_errors(raw: &str) -> Vec<String> {
    let mut reader = Reader::from_str(raw);
    let mut problems = Vec::new();
    let mut depth = 0usize;
    let mut roots = 0usize;

    loop {
        let position = reader.buffer_position();
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                if depth == 0 {
                    roots += 1;
                }
                depth += 1;
                if let Err(problem) = check_attributes(&start, position) {
                    problems.push(problem);
                    return problems;
                }
            }
            Ok(Event::Empty(start)) => {
                if depth == 0 {
                    roots += 1;
                }
                if let Err(problem) = check_attributes(&start, position) {
                    problems.push(problem);
                    return problems;
                }
            }
            Ok(Event::End(_)) => {
                if depth == 0 {
                    problems.push(format!("closing tag without opening tag at position {position}"));
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Text(text)) => {
                if let Err(err) = text.unescape() {
                    problems.push(format!("{err} at position {position}"));
                }
                if depth == 0 && !is_blank(&text) {
                    problems.push(format!("text outside the root element at position {position}"));
                }
            }
            Ok(Event::CData(_)) if depth == 0 => {
                problems.push(format!("CDATA outside the root element at position {position}"));
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                problems.push(format!("{err} at position {}", reader.error_position()));
                return problems;
            }
        }
    }

    if depth > 0 {
        problems.push(format!(
            "unexpected end of document with {depth} unclosed element(s)"
        ));
    }
    match roots {
        0 => problems.push("no root element".to_owned()),
        1 => {}
        n => problems.push(format!("{n} root elements, expected one")),
    }
    problems
}

#[derive(Default)]
struct Frame {
    name: String,
    text: String,
    children: Vec<(String, XmlValue)>,
}

impl Frame {
    fn open(start: &BytesStart<'_>) -> Self {
        Self {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            ..Self::default()
        }
    }

    fn into_value(self) -> (String, XmlValue) {
        let value = if !self.children.is_empty() {
            XmlValue::Map(group(self.children))
        } else if self.text.trim().is_empty() {
            XmlValue::Null
        } else {
            XmlValue::Text(self.text)
        };
        (self.name, value)
    }

    fn into_document(self) -> XmlDocument {
        let text = (self.children.is_empty() && !self.text.trim().is_empty()).then_some(self.text);
        XmlDocument {
            root: self.name,
            fields: group(self.children),
            text,
        }
    }
}

/// Collects children by name; repeated names become a list.
fn group(children: Vec<(String, XmlValue)>) -> BTreeMap<String, XmlValue> {
    let mut fields = BTreeMap::new();
    for (name, value) in children {
        match fields.entry(name) {
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
            Entry::Occupied(mut slot) => match slot.get_mut() {
                XmlValue::List(items) => items.push(value),
                existing => {
                    let first = std::mem::replace(existing, XmlValue::Null);
                    *existing = XmlValue::List(vec![first, value]);
                }
            },
        }
    }
    fields
}

fn malformed(err: impl Display) -> ResponseError {
    ResponseError::MalformedXml(vec![err.to_string()])
}

fn build_document(raw: &str) -> Result<XmlDocument, ResponseError> {
    let mut reader = Reader::from_str(raw);
    let mut stack: Vec<Frame> = Vec::new();

    loop {
        match reader.read_event().map_err(malformed)? {
            Event::Start(start) => stack.push(Frame::open(&start)),
            Event::Empty(start) => {
                let frame = Frame::open(&start);
                match stack.last_mut() {
                    Some(parent) => parent.children.push(frame.into_value()),
                    None => return Ok(frame.into_document()),
                }
            }
            Event::Text(text) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&text.unescape().map_err(malformed)?);
                }
            }
            Event::CData(data) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::End(_) => {
                let frame = stack.pop().ok_or_else(|| malformed("closing tag without opening tag"))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(frame.into_value()),
                    None => return Ok(frame.into_document()),
                }
            }
            Event::Eof => return Err(malformed("no root element")),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xml(raw: &str) -> XmlDocument {
        match parse(raw).unwrap() {
            ResponseDocument::Xml(doc) => doc,
            ResponseDocument::Text(text) => panic!("expected XML, got text {text:?}"),
        }
    }

    fn problems(raw: &str) -> Vec<String> {
        match parse(raw) {
            Err(ResponseError::MalformedXml(problems)) => problems,
            other => panic!("expected malformed XML, got {other:?}"),
        }
    }

    #[test]
    fn test_simple_status() {
        let doc = xml("<Result><Status>APPROVED</Status></Result>");
        assert_eq!(doc.root(), "Result");
        assert_eq!(doc.text("Status"), Some("APPROVED"));
        assert_eq!(doc.status(), Some(ResponseStatus::Approved));
    }

    #[test]
    fn test_unterminated_is_malformed() {
        assert!(!problems("<unterminated").is_empty());
    }

    #[test]
    fn test_plain_text_passes_through() {
        assert_eq!(
            parse("plain text error"),
            Ok(ResponseDocument::Text("plain text error".into()))
        );
        assert_eq!(parse(""), Ok(ResponseDocument::Text(String::new())));
    }

    #[test]
    fn test_gateway_response() {
        let doc = xml(concat!(
            r#"<?xml version="1.0" encoding="utf-8"?>"#,
            "<Response>",
            "<Version>4.0.0</Version>",
            "<ClientLoginID>merchant</ClientLoginID>",
            "<TransactionID>1234567</TransactionID>",
            "<Status>DECLINED</Status>",
            "<AuthCode></AuthCode>",
            "<AVSCode/>",
            "<ReasonCodes><Reason code=\"1\">Insufficient funds</Reason></ReasonCodes>",
            "<ExErrCode>-1</ExErrCode>",
            "</Response>",
        ));
        assert_eq!(doc.root(), "Response");
        assert_eq!(doc.text("TransactionID"), Some("1234567"));
        assert_eq!(doc.status(), Some(ResponseStatus::Declined));
        assert_eq!(doc.get("AuthCode"), Some(&XmlValue::Null));
        assert_eq!(doc.get("AVSCode"), Some(&XmlValue::Null));
        assert_eq!(
            doc.path(&["ReasonCodes", "Reason"]).and_then(XmlValue::as_text),
            Some("Insufficient funds")
        );
        assert_eq!(doc.path(&["ReasonCodes", "Missing"]), None);
    }

    #[test]
    fn test_repeated_siblings_become_list() {
        let doc = xml("<R><Item>a</Item><Item>b</Item><Item/><Other>c</Other></R>");
        assert_eq!(
            doc.get("Item"),
            Some(&XmlValue::List(vec![
                XmlValue::Text("a".into()),
                XmlValue::Text("b".into()),
                XmlValue::Null,
            ]))
        );
        assert_eq!(doc.text("Other"), Some("c"));
    }

    #[test]
    fn test_entities_and_cdata() {
        let doc = xml("<R><Reason>A &amp; B</Reason><Note><![CDATA[<raw>]]></Note></R>");
        assert_eq!(doc.text("Reason"), Some("A & B"));
        assert_eq!(doc.text("Note"), Some("<raw>"));
    }

    #[test]
    fn test_root_text() {
        let doc = xml("<string>Invalid login</string>");
        assert!(doc.fields().is_empty());
        assert_eq!(doc.root_text(), Some("Invalid login"));

        let doc = xml("<Empty/>");
        assert_eq!(doc.root(), "Empty");
        assert_eq!(doc.root_text(), None);
    }

    #[test]
    fn test_malformed_documents() {
        for raw in [
            "<a><b></a>",
            "<a></a><b></b>",
            "<a>&bogus;</a>",
            "<a>",
            "</a>",
            "<a x=1></a>",
            "text <a></a>",
            "<a></a> trailing",
        ] {
            assert!(!problems(raw).is_empty(), "{raw}");
        }
    }

    #[test]
    fn test_broken_tag_reported_once() {
        let found = problems("<a>1 < 2</a>");
        assert_eq!(found.len(), 1, "{found:?}");
        assert!(!found[0].contains("unclosed"), "{found:?}");
        assert!(!found[0].contains("at position"), "{found:?}");
        assert!(found[0].contains("in the tag starting at byte"), "{found:?}");
    }

    #[test]
    fn test_malformed_error_message() {
        let err = parse("<a></a><b></b>").unwrap_err();
        assert!(err.to_string().starts_with("Failed to validate XML response: "));
        assert!(err.to_string().contains("2 root elements"));
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("approved".parse(), Ok(ResponseStatus::Approved));
        assert_eq!(" PENDING ".parse(), Ok(ResponseStatus::Pending));
        assert!("MAYBE".parse::<ResponseStatus>().is_err());

        let doc = xml("<R><Status>UNKNOWN</Status></R>");
        assert_eq!(doc.status(), None);
        assert_eq!(parse("nope").unwrap().status(), None);
    }

    #[test]
    fn test_document_serializes() {
        let doc = parse("<R><Status>APPROVED</Status><Empty/></R>").unwrap();
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "xml": {
                    "root": "R",
                    "fields": { "Status": "APPROVED", "Empty": null }
                }
            })
        );
    }
}
