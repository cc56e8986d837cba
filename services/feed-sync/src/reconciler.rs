//! Reconciliation of a decoded batch against stored events
//!
//! Compares each freshly decoded event with the stored version and
//! reports what changed. Events missing from the batch are tombstoned in
//! place with `REMOVED` rather than deleted, so a later reappearance is a
//! plain status transition out of `REMOVED`.
//!
//! Reconcile flow:
//! 1. Record every batch identifier as seen
//! 2. Insert unknown identifiers (added)
//! 3. Replace known ones whose status or scores differ (changed)
//! 4. Tombstone every stored, unseen, not-yet-removed identifier (removed)

use std::collections::{HashMap, HashSet};

use feed_types::event::{Event, Scores, REMOVED_STATUS};
use feed_types::ids::EventId;

/// Before/after pair for a field that changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange<T> {
    pub before: T,
    pub after: T,
}

/// A single observable change to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventChange {
    /// First sighting of an identifier.
    Added { id: EventId },
    /// Status and/or scores differ from the stored version.
    Changed {
        id: EventId,
        status: Option<FieldChange<String>>,
        scores: Option<FieldChange<Scores>>,
    },
    /// Identifier absent from the batch; status set to `REMOVED`.
    Removed { id: EventId, previous_status: String },
}

impl EventChange {
    pub fn id(&self) -> &EventId {
        match self {
            EventChange::Added { id } => id,
            EventChange::Changed { id, .. } => id,
            EventChange::Removed { id, .. } => id,
        }
    }

    /// Label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            EventChange::Added { .. } => "added",
            EventChange::Changed { .. } => "changed",
            EventChange::Removed { .. } => "removed",
        }
    }
}

/// Everything one reconcile pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Changes in processing order: batch order first, then removals
    /// sorted by identifier.
    pub changes: Vec<EventChange>,
    /// Batch events identical to their stored version.
    pub unchanged: usize,
}

impl ReconcileReport {
    /// Whether the store was mutated.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn added(&self) -> usize {
        self.count(|c| matches!(c, EventChange::Added { .. }))
    }

    pub fn changed(&self) -> usize {
        self.count(|c| matches!(c, EventChange::Changed { .. }))
    }

    pub fn removed(&self) -> usize {
        self.count(|c| matches!(c, EventChange::Removed { .. }))
    }

    fn count(&self, pred: impl Fn(&EventChange) -> bool) -> usize {
        self.changes.iter().filter(|c| pred(c)).count()
    }
}

/// Reconcile `batch` into `events`.
///
/// Total over any batch: never fails. A repeated identifier within one
/// batch is compared against the occurrence stored just before it.
pub fn reconcile(events: &mut HashMap<EventId, Event>, batch: Vec<Event>) -> ReconcileReport {
    let mut report = ReconcileReport::default();
    let mut seen: HashSet<EventId> = HashSet::with_capacity(batch.len());

    for incoming in batch {
        seen.insert(incoming.id.clone());

        match events.get_mut(&incoming.id) {
            None => {
                report.changes.push(EventChange::Added {
                    id: incoming.id.clone(),
                });
                events.insert(incoming.id.clone(), incoming);
            }
            Some(stored) if incoming.differs_from(stored) => {
                report.changes.push(diff(stored, &incoming));
                *stored = incoming;
            }
            Some(_) => report.unchanged += 1,
        }
    }

    let mut vanished: Vec<EventId> = events
        .iter()
        .filter(|(id, event)| !seen.contains(*id) && !event.is_removed())
        .map(|(id, _)| id.clone())
        .collect();
    vanished.sort();

    for id in vanished {
        if let Some(stored) = events.get_mut(&id) {
            let previous_status = std::mem::replace(&mut stored.status, REMOVED_STATUS.to_string());
            report.changes.push(EventChange::Removed { id, previous_status });
        }
    }

    report
}

fn diff(stored: &Event, incoming: &Event) -> EventChange {
    let status = (stored.status != incoming.status).then(|| FieldChange {
        before: stored.status.clone(),
        after: incoming.status.clone(),
    });
    let scores = (stored.scores != incoming.scores).then(|| FieldChange {
        before: stored.scores.clone(),
        after: incoming.scores.clone(),
    });

    EventChange::Changed {
        id: incoming.id.clone(),
        status,
        scores,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feed_types::event::{Competitor, Competitors, Score};

    fn make_event(id: &str, status: &str, home: &str, away: &str) -> Event {
        let mut scores = Scores::new();
        scores.insert("CURRENT".to_string(), Score::new("CURRENT", home, away));

        Event {
            id: EventId::from(id),
            sport: "FOOTBALL".to_string(),
            competition: "UEFA".to_string(),
            start_time: "2024-03-08T12:20:32.183Z".to_string(),
            competitors: Competitors {
                home: Competitor::home("TeamA"),
                away: Competitor::away("TeamB"),
            },
            status: status.to_string(),
            scores,
        }
    }

    #[test]
    fn test_first_sighting_is_added() {
        let mut events = HashMap::new();

        let report = reconcile(&mut events, vec![make_event("e1", "LIVE", "1", "0")]);

        assert_eq!(report.changes, vec![EventChange::Added { id: EventId::from("e1") }]);
        assert_eq!(events["e1"].status, "LIVE");
    }

    #[test]
    fn test_identical_event_is_not_reported() {
        let mut events = HashMap::new();
        reconcile(&mut events, vec![make_event("e1", "LIVE", "1", "0")]);

        let report = reconcile(&mut events, vec![make_event("e1", "LIVE", "1", "0")]);

        assert!(report.is_empty());
        assert_eq!(report.unchanged, 1);
    }

    #[test]
    fn test_scores_change_reports_before_and_after() {
        let mut events = HashMap::new();
        reconcile(&mut events, vec![make_event("e1", "LIVE", "1", "0")]);

        let report = reconcile(&mut events, vec![make_event("e1", "LIVE", "2", "1")]);

        let before = make_event("e1", "LIVE", "1", "0").scores;
        let after = make_event("e1", "LIVE", "2", "1").scores;
        assert_eq!(
            report.changes,
            vec![EventChange::Changed {
                id: EventId::from("e1"),
                status: None,
                scores: Some(FieldChange { before, after }),
            }]
        );
        assert_eq!(events["e1"].scores["CURRENT"], Score::new("CURRENT", "2", "1"));
    }

    #[test]
    fn test_status_change_reports_before_and_after() {
        let mut events = HashMap::new();
        reconcile(&mut events, vec![make_event("e1", "PRE", "0", "0")]);

        let report = reconcile(&mut events, vec![make_event("e1", "LIVE", "0", "0")]);

        assert_eq!(
            report.changes,
            vec![EventChange::Changed {
                id: EventId::from("e1"),
                status: Some(FieldChange {
                    before: "PRE".to_string(),
                    after: "LIVE".to_string(),
                }),
                scores: None,
            }]
        );
    }

    #[test]
    fn test_scores_overwritten_not_merged() {
        let mut events = HashMap::new();
        let mut first = make_event("e1", "LIVE", "1", "0");
        first
            .scores
            .insert("PERIOD_1".to_string(), Score::new("PERIOD_1", "1", "0"));
        reconcile(&mut events, vec![first]);

        reconcile(&mut events, vec![make_event("e1", "LIVE", "2", "0")]);

        assert_eq!(events["e1"].scores.len(), 1);
        assert!(!events["e1"].scores.contains_key("PERIOD_1"));
    }

    #[test]
    fn test_other_field_changes_do_not_replace_stored_event() {
        let mut events = HashMap::new();
        reconcile(&mut events, vec![make_event("e1", "LIVE", "1", "0")]);

        let mut renamed = make_event("e1", "LIVE", "1", "0");
        renamed.competition = "UEFA Europa League".to_string();
        let report = reconcile(&mut events, vec![renamed]);

        assert!(report.is_empty());
        assert_eq!(events["e1"].competition, "UEFA");
    }

    #[test]
    fn test_missing_event_is_tombstoned() {
        let mut events = HashMap::new();
        reconcile(
            &mut events,
            vec![make_event("e1", "LIVE", "1", "0"), make_event("e2", "PRE", "0", "0")],
        );

        let report = reconcile(&mut events, vec![make_event("e2", "PRE", "0", "0")]);

        assert_eq!(
            report.changes,
            vec![EventChange::Removed {
                id: EventId::from("e1"),
                previous_status: "LIVE".to_string(),
            }]
        );
        assert_eq!(events.len(), 2);
        assert!(events["e1"].is_removed());
        // Everything but status is kept on the tombstone.
        assert_eq!(events["e1"].scores["CURRENT"], Score::new("CURRENT", "1", "0"));
    }

    #[test]
    fn test_tombstoning_is_idempotent() {
        let mut events = HashMap::new();
        reconcile(&mut events, vec![make_event("e1", "LIVE", "1", "0")]);
        reconcile(&mut events, vec![]);

        let report = reconcile(&mut events, vec![]);

        assert!(report.is_empty());
        assert!(events["e1"].is_removed());
    }

    #[test]
    fn test_removals_sorted_by_id() {
        let mut events = HashMap::new();
        let batch = ["c", "a", "b"]
            .iter()
            .map(|id| make_event(id, "LIVE", "0", "0"))
            .collect();
        reconcile(&mut events, batch);

        let report = reconcile(&mut events, vec![]);

        let ids: Vec<&str> = report.changes.iter().map(|c| c.id().as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(report.removed(), 3);
    }

    #[test]
    fn test_tombstoned_event_revives() {
        let mut events = HashMap::new();
        reconcile(&mut events, vec![make_event("e1", "LIVE", "1", "0")]);
        reconcile(&mut events, vec![]);

        let report = reconcile(&mut events, vec![make_event("e1", "LIVE", "1", "0")]);

        assert_eq!(
            report.changes,
            vec![EventChange::Changed {
                id: EventId::from("e1"),
                status: Some(FieldChange {
                    before: REMOVED_STATUS.to_string(),
                    after: "LIVE".to_string(),
                }),
                scores: None,
            }]
        );
        assert_eq!(events["e1"].status, "LIVE");
    }

    #[test]
    fn test_duplicate_id_in_batch_compares_against_previous_occurrence() {
        let mut events = HashMap::new();

        let report = reconcile(
            &mut events,
            vec![make_event("e1", "LIVE", "1", "0"), make_event("e1", "LIVE", "2", "0")],
        );

        assert_eq!(report.added(), 1);
        assert_eq!(report.changed(), 1);
        assert_eq!(events["e1"].scores["CURRENT"].home, "2");
    }
}
