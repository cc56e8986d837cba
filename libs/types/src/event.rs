//! Sporting event types
//!
//! An `Event` is the decoded form of one upstream event line. Names are
//! already resolved through the mapping table; scores stay as strings so
//! feed formats such as "AET" or fractional sets pass through untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ids::EventId;

/// Terminal status marker for events that disappeared from the feed.
///
/// Only ever set by reconciliation, never produced by decoding.
pub const REMOVED_STATUS: &str = "REMOVED";

/// Which side of the fixture a competitor plays on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CompetitorSide {
    /// Home team
    Home,
    /// Away team
    Away,
}

/// A named competitor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competitor {
    #[serde(rename = "type")]
    pub side: CompetitorSide,
    pub name: String,
}

impl Competitor {
    pub fn home(name: impl Into<String>) -> Self {
        Self {
            side: CompetitorSide::Home,
            name: name.into(),
        }
    }

    pub fn away(name: impl Into<String>) -> Self {
        Self {
            side: CompetitorSide::Away,
            name: name.into(),
        }
    }
}

/// Both competitors of an event, keyed `HOME` / `AWAY` on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competitors {
    #[serde(rename = "HOME")]
    pub home: Competitor,
    #[serde(rename = "AWAY")]
    pub away: Competitor,
}

/// Score for a single period
///
/// The period label is repeated inside the score (`type`) to match the
/// JSON consumers already read.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Score {
    #[serde(rename = "type")]
    pub period: String,
    pub home: String,
    pub away: String,
}

impl Score {
    pub fn new(period: impl Into<String>, home: impl Into<String>, away: impl Into<String>) -> Self {
        Self {
            period: period.into(),
            home: home.into(),
            away: away.into(),
        }
    }
}

/// Period label → score. Keys are unique per event.
pub type Scores = BTreeMap<String, Score>;

/// A sporting event as held in the snapshot store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Reconciliation key, stable across polls
    pub id: EventId,
    pub sport: String,
    pub competition: String,
    /// ISO-8601 UTC timestamp with millisecond precision
    pub start_time: String,
    pub competitors: Competitors,
    pub status: String,
    pub scores: Scores,
}

impl Event {
    /// Whether the event is tombstoned.
    pub fn is_removed(&self) -> bool {
        self.status == REMOVED_STATUS
    }

    /// Whether status or scores differ from `other`.
    ///
    /// These are the only fields reconciliation tracks; a change elsewhere
    /// without one of these changing is not treated as an update.
    pub fn differs_from(&self, other: &Event) -> bool {
        self.status != other.status || self.scores != other.scores
    }
}
