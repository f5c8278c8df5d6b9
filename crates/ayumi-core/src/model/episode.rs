use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One journaled childcare moment: what the child attempted, where, when,
/// and how much assistance was needed.
///
/// `id` is assigned by the store at creation time and never changes. The
/// store treats `category` and `support` as opaque strings; the fixed
/// assistance vocabulary lives in [`SupportLevel`] for callers that want to
/// validate or render it.
///
/// Every field is `#[serde(default)]` so that permissively imported records
/// with missing fields still deserialize (see `EpisodeStore::import`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    #[serde(default)]
    pub id: String,
    /// ISO-like local datetime as the UI writes it, e.g. `2024-01-01T10:00`.
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub support: String,
    #[serde(default)]
    pub content: String,
}

impl Episode {
    /// Parse the episode's `date` field as a local point in time.
    ///
    /// Accepts the minute-precision format the entry form writes, a
    /// seconds-precision variant, and RFC 3339. Returns `None` for anything
    /// else; such episodes are excluded from the week-window count but still
    /// count toward the total.
    pub fn parsed_date(&self) -> Option<NaiveDateTime> {
        const FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];
        for format in FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(&self.date, format) {
                return Some(dt);
            }
        }
        chrono::DateTime::parse_from_rfc3339(&self.date)
            .ok()
            .map(|dt| dt.with_timezone(&chrono::Local).naive_local())
    }
}

/// Input for recording a new episode: an [`Episode`] without an id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeInput {
    pub date: String,
    pub location: String,
    pub category: String,
    pub support: String,
    pub content: String,
}

impl EpisodeInput {
    pub(crate) fn into_episode(self, id: String) -> Episode {
        Episode {
            id,
            date: self.date,
            location: self.location,
            category: self.category,
            support: self.support,
            content: self.content,
        }
    }
}

/// Query filter with one optional restriction per field.
///
/// `None` means unrestricted. The literal value `"all"` is also treated as
/// unrestricted, preserving the sentinel that filter UIs send.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EpisodeFilter {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub support: Option<String>,
}

impl EpisodeFilter {
    pub fn by_category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            ..Default::default()
        }
    }

    pub fn by_support(support: impl Into<String>) -> Self {
        Self {
            support: Some(support.into()),
            ..Default::default()
        }
    }

    pub fn matches(&self, episode: &Episode) -> bool {
        field_matches(self.category.as_deref(), &episode.category)
            && field_matches(self.support.as_deref(), &episode.support)
    }
}

fn field_matches(wanted: Option<&str>, actual: &str) -> bool {
    match wanted {
        None | Some("all") => true,
        Some(value) => value == actual,
    }
}

/// Aggregate counts over the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total: usize,
    /// Episodes whose date falls within the last 7×24h, boundary inclusive.
    pub this_week: usize,
}

/// The fixed assistance vocabulary of the journal.
///
/// The store itself never interprets `Episode.support`; this type exists so
/// the CLI can validate input and render the canonical labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportLevel {
    /// 一人でできた
    Independent,
    /// 声かけでできた
    VerbalPrompt,
    /// 手助けが必要だった
    PhysicalHelp,
    /// 全面的に介助した
    FullAssist,
}

impl SupportLevel {
    pub const ALL: [SupportLevel; 4] = [
        Self::Independent,
        Self::VerbalPrompt,
        Self::PhysicalHelp,
        Self::FullAssist,
    ];

    /// The canonical label stored in `Episode.support`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Independent => "一人でできた",
            Self::VerbalPrompt => "声かけでできた",
            Self::PhysicalHelp => "手助けが必要だった",
            Self::FullAssist => "全面的に介助した",
        }
    }
}

impl std::fmt::Display for SupportLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SupportLevel {
    type Err = String;

    /// Accepts the canonical Japanese label or a short ASCII alias
    /// (`independent`, `verbal`, `physical`, `full`).
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "一人でできた" => return Ok(Self::Independent),
            "声かけでできた" => return Ok(Self::VerbalPrompt),
            "手助けが必要だった" => return Ok(Self::PhysicalHelp),
            "全面的に介助した" => return Ok(Self::FullAssist),
            _ => {}
        }
        match s.to_lowercase().as_str() {
            "independent" => Ok(Self::Independent),
            "verbal" => Ok(Self::VerbalPrompt),
            "physical" => Ok(Self::PhysicalHelp),
            "full" => Ok(Self::FullAssist),
            _ => Err(format!("unknown support level: {s}")),
        }
    }
}
