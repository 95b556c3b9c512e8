//! Identifiers and the tagged content a tab can show
//!
//! - `TabId` / `PanelId`: opaque string identities
//! - `ContentId`: what a panel displays (day log, block, or plugin view)
//! - `TabIdGenerator` / `Clock`: process-unique ids and strictly increasing stamps

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Host content identifier for a generic block view
pub type BlockId = u64;

/// Unique identifier for a tab (stable for the process lifetime and across persistence)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(String);

impl TabId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TabId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Identifier of a host panel. The host owns panels; tabs only reference them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct PanelId(String);

impl PanelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Detached records (recently closed, pinned) carry an empty panel id.
    pub fn is_detached(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PanelId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// The content a panel shows.
///
/// Serialized in the host's `{view, viewArgs}` shape:
/// `{"view":"journal","viewArgs":"2024-05-01"}`, `{"view":"block","viewArgs":42}`,
/// `{"view":"plugin","viewArgs":"graph-view"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "view", content = "viewArgs", rename_all = "lowercase")]
pub enum ContentId {
    /// Day-log view for a calendar date
    Journal(#[serde(deserialize_with = "wake_day")] NaiveDate),
    /// Generic block view
    Block(BlockId),
    /// Plugin-defined view, identified by its tag
    Plugin(String),
}

impl ContentId {
    /// Today's day log
    pub fn today() -> Self {
        ContentId::Journal(today())
    }

    pub fn block_id(&self) -> Option<BlockId> {
        match self {
            ContentId::Block(id) => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentId::Journal(date) => write!(f, "journal:{}", date),
            ContentId::Block(id) => write!(f, "block:{}", id),
            ContentId::Plugin(tag) => write!(f, "plugin:{}", tag),
        }
    }
}

/// Local calendar date of "now"
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Re-hydrate a persisted day value.
///
/// Accepts a plain date (`2024-05-01`) or a full timestamp
/// (`2024-05-01T00:00:00.000Z`, as written by older records); the
/// timestamp form is converted to the local calendar date.
fn wake_day<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_day(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid day value '{raw}'")))
}

pub(crate) fn parse_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|stamp| stamp.with_timezone(&Local).date_naive())
}

/// Generates `tab_YYMMDD_HHMMSS<n>` ids, disambiguated by a process-wide counter.
#[derive(Debug, Default)]
pub struct TabIdGenerator {
    counter: u64,
}

impl TabIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce the next id; `taken` lets the caller reject ids that collide
    /// with tabs restored from persistence.
    pub fn next_id(&mut self, taken: impl Fn(&TabId) -> bool) -> TabId {
        let stamp = Local::now().format("%y%m%d_%H%M%S");
        loop {
            self.counter += 1;
            let id = TabId::new(format!("tab_{}{}", stamp, self.counter));
            if !taken(&id) {
                return id;
            }
        }
    }

    pub fn reset(&mut self) {
        self.counter = 0;
    }
}

/// Millisecond clock that never returns the same instant twice.
///
/// Creation times and pin orders are compared for presentation order, so two
/// tabs created (or pinned) within the same millisecond must still differ.
#[derive(Debug, Default)]
pub struct Clock {
    last_ms: i64,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stamp(&mut self) -> DateTime<Utc> {
        let ms = self.stamp_millis();
        DateTime::from_timestamp_millis(ms).unwrap_or_else(Utc::now)
    }

    pub fn stamp_millis(&mut self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let ms = now.max(self.last_ms + 1);
        self.last_ms = ms;
        ms
    }
}
