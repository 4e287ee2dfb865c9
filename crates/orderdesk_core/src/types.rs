use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown {kind} '{value}'")]
    Unknown { kind: &'static str, value: String },
}

impl ParseError {
    fn unknown(kind: &'static str, value: &str) -> Self {
        Self::Unknown {
            kind,
            value: value.to_string(),
        }
    }
}

/// Coarse partition that scopes which orders are queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Tab {
    #[default]
    SiteA,
    SiteB,
    Admin,
}

impl Tab {
    pub fn as_str(self) -> &'static str {
        match self {
            Tab::SiteA => "SITE_A",
            Tab::SiteB => "SITE_B",
            Tab::Admin => "ADMIN",
        }
    }

    /// The site a site tab is scoped to; `None` for the admin view.
    pub fn site(self) -> Option<Site> {
        match self {
            Tab::SiteA => Some(Site::SiteA),
            Tab::SiteB => Some(Site::SiteB),
            Tab::Admin => None,
        }
    }

    /// Whether a record handled by `site` belongs under this tab.
    pub fn admits(self, site: Option<&Site>) -> bool {
        match self.site() {
            None => true,
            Some(own) => site == Some(&own),
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tab {
    type Err = ParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let upper = raw.trim().to_ascii_uppercase();
        match upper.as_str() {
            "SITE_A" | "TST" => Ok(Tab::SiteA),
            "SITE_B" | "CENTRAL" => Ok(Tab::SiteB),
            "ADMIN" => Ok(Tab::Admin),
            _ => Err(ParseError::unknown("tab", raw)),
        }
    }
}

impl TryFrom<String> for Tab {
    type Error = ParseError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<Tab> for String {
    fn from(tab: Tab) -> Self {
        tab.as_str().to_string()
    }
}

/// Handling site of an order. Labels that are not a known site are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Site {
    SiteA,
    SiteB,
    Other(String),
}

impl Site {
    pub fn from_label(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_ascii_uppercase().as_str() {
            "SITE_A" | "TST" => Site::SiteA,
            "SITE_B" | "CENTRAL" => Site::SiteB,
            _ => Site::Other(trimmed.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Site::SiteA => "SITE_A",
            Site::SiteB => "SITE_B",
            Site::Other(label) => label,
        }
    }

    pub fn opposite(&self) -> Option<Site> {
        match self {
            Site::SiteA => Some(Site::SiteB),
            Site::SiteB => Some(Site::SiteA),
            Site::Other(_) => None,
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Site {
    fn from(raw: String) -> Self {
        Site::from_label(&raw)
    }
}

impl From<Site> for String {
    fn from(site: Site) -> Self {
        site.as_str().to_string()
    }
}

/// Urgency override for an order. `Auto` clears the override (`""` on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Urgency {
    Auto,
    Low,
    Normal,
    High,
    Urgent,
}

impl Urgency {
    pub fn as_str(self) -> &'static str {
        match self {
            Urgency::Auto => "",
            Urgency::Low => "LOW",
            Urgency::Normal => "NORMAL",
            Urgency::High => "HIGH",
            Urgency::Urgent => "URGENT",
        }
    }
}

impl FromStr for Urgency {
    type Err = ParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "" | "AUTO" => Ok(Urgency::Auto),
            "LOW" => Ok(Urgency::Low),
            "NORMAL" => Ok(Urgency::Normal),
            "HIGH" => Ok(Urgency::High),
            "URGENT" => Ok(Urgency::Urgent),
            _ => Err(ParseError::unknown("urgency", raw)),
        }
    }
}

impl TryFrom<String> for Urgency {
    type Error = ParseError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<Urgency> for String {
    fn from(value: Urgency) -> Self {
        value.as_str().to_string()
    }
}

/// Pagination position: a numeric offset or a host-issued token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cursor {
    Offset(u64),
    Token(String),
}

impl Cursor {
    pub const INITIAL: Cursor = Cursor::Offset(0);

    /// Successor used when the host omits `nextCursor`.
    pub(crate) fn advanced_by(&self, received: usize) -> Option<Cursor> {
        match self {
            Cursor::Offset(offset) => {
                Some(Cursor::Offset(offset.saturating_add(received as u64)))
            }
            Cursor::Token(_) => None,
        }
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Cursor::INITIAL
    }
}

/// Correlation token echoed back by the host.
///
/// `generation` identifies the filter snapshot (tab + search) and advances on
/// every reset; `seq` advances on every request minted by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticket {
    pub generation: u64,
    pub seq: u64,
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.generation, self.seq)
    }
}

impl FromStr for Ticket {
    type Err = ParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (generation, seq) = raw
            .split_once('.')
            .ok_or_else(|| ParseError::unknown("ticket", raw))?;
        let generation = generation
            .parse()
            .map_err(|_| ParseError::unknown("ticket", raw))?;
        let seq = seq.parse().map_err(|_| ParseError::unknown("ticket", raw))?;
        Ok(Ticket { generation, seq })
    }
}

impl TryFrom<String> for Ticket {
    type Error = ParseError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<Ticket> for String {
    fn from(ticket: Ticket) -> Self {
        ticket.to_string()
    }
}

/// One order as delivered by the host.
///
/// Only `id` and `handlingSite` carry meaning for the coordinator; every other
/// field is display data kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(
        rename = "handlingSite",
        default,
        deserialize_with = "blank_site_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub handling_site: Option<Site>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Urgency keys used by the different widget builds, most specific first.
const URGENCY_KEYS: [&str; 4] = ["urgency", "urgencyFinal", "urgencyOverride", "urgencyAuto"];

impl OrderRecord {
    pub fn new(id: impl Into<String>, handling_site: Option<Site>) -> Self {
        Self {
            id: id.into(),
            handling_site,
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// Display text for a field; numbers and booleans are rendered, null and missing are empty.
    pub fn text(&self, key: &str) -> String {
        match self.fields.get(key) {
            Some(Value::String(text)) => text.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => String::new(),
        }
    }

    pub fn order_number(&self) -> String {
        self.text("orderNumber")
    }

    pub fn customer_name(&self) -> String {
        self.text("customerName")
    }

    pub fn urgency(&self) -> String {
        URGENCY_KEYS
            .iter()
            .map(|key| self.text(key))
            .find(|value| !value.is_empty())
            .unwrap_or_default()
    }
}

fn blank_site_as_none<'de, D>(deserializer: D) -> Result<Option<Site>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .filter(|label| !label.trim().is_empty())
        .map(|label| Site::from_label(&label)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_site_names_map_to_canonical_tabs() {
        assert_eq!("TST".parse::<Tab>(), Ok(Tab::SiteA));
        assert_eq!("Central".parse::<Tab>(), Ok(Tab::SiteB));
        assert_eq!(Site::from_label("central"), Site::SiteB);
        assert!("WAREHOUSE".parse::<Tab>().is_err());
    }

    #[test]
    fn admin_admits_everything_sites_only_their_own() {
        let other = Site::Other("WAREHOUSE".into());
        assert!(Tab::Admin.admits(None));
        assert!(Tab::Admin.admits(Some(&other)));
        assert!(Tab::SiteA.admits(Some(&Site::SiteA)));
        assert!(!Tab::SiteA.admits(Some(&Site::SiteB)));
        assert!(!Tab::SiteA.admits(None));
    }

    #[test]
    fn legacy_urgency_values_are_not_mapped() {
        assert_eq!("".parse::<Urgency>(), Ok(Urgency::Auto));
        assert_eq!("high".parse::<Urgency>(), Ok(Urgency::High));
        assert!("ASAP".parse::<Urgency>().is_err());
        assert!("TODAY".parse::<Urgency>().is_err());
    }

    #[test]
    fn ticket_text_form() {
        let ticket = Ticket {
            generation: 3,
            seq: 7,
        };
        assert_eq!(ticket.to_string(), "3.7");
        assert_eq!("3.7".parse::<Ticket>(), Ok(ticket));
        assert!("37".parse::<Ticket>().is_err());
        assert!("a.b".parse::<Ticket>().is_err());
    }

    #[test]
    fn record_reads_any_urgency_alias() {
        let record: OrderRecord = serde_json::from_str(
            r#"{"_id":"42","handlingSite":"","urgencyOverride":"HIGH","total":12.5}"#,
        )
        .unwrap();
        assert_eq!(record.id, "42");
        assert_eq!(record.handling_site, None);
        assert_eq!(record.urgency(), "HIGH");
        assert_eq!(record.text("total"), "12.5");
        assert_eq!(record.text("missing"), "");
    }

    #[test]
    fn offset_cursor_advances_token_cursor_ends() {
        assert_eq!(Cursor::INITIAL.advanced_by(3), Some(Cursor::Offset(3)));
        assert_eq!(Cursor::Token("abc".into()).advanced_by(3), None);
        assert_eq!(
            Cursor::Offset(u64::MAX - 1).advanced_by(5),
            Some(Cursor::Offset(u64::MAX))
        );
    }
}
