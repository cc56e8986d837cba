//! Event line decoder
//!
//! Decodes one upstream event line of the form
//!
//! ```text
//! id,sportId,competitionId,startTimeMillis,homeTeamId,awayTeamId,statusId,scoresRaw
//! ```
//!
//! where `scoresRaw` is one or more `periodId@home:away` entries joined by
//! `|`. Every identifier is resolved through the cycle's `MappingTable`.
//! Decoding is fail-fast: the first problem drops the whole line.

use chrono::{DateTime, SecondsFormat, Utc};
use feed_types::errors::LineError;
use feed_types::event::{Competitor, Competitors, Event, Score, Scores, REMOVED_STATUS};
use feed_types::ids::EventId;
use feed_types::mapping::MappingTable;

/// Number of fields a line must carry. Extra trailing fields are ignored.
pub const EVENT_LINE_FIELDS: usize = 8;

const FIELD_SEPARATOR: char = ',';
const PERIOD_SEPARATOR: char = '|';
const PERIOD_MARKER: char = '@';
const SCORE_SEPARATOR: char = ':';

/// A line that failed to decode, with enough context to diagnose it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineFailure {
    /// 1-based position of the line in the raw payload.
    pub line_number: usize,
    pub line: String,
    pub error: LineError,
}

/// Outcome of decoding a whole event payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedBatch {
    /// Successfully decoded events, in payload order.
    pub events: Vec<Event>,
    pub failures: Vec<LineFailure>,
}

impl DecodedBatch {
    /// Total number of non-blank lines seen.
    pub fn lines_seen(&self) -> usize {
        self.events.len() + self.failures.len()
    }
}

/// Decode a newline-delimited event payload.
///
/// Lines are trimmed; blank lines are skipped. A failing line never stops
/// the remaining lines from decoding.
pub fn decode_event_payload(raw: &str, mappings: &MappingTable) -> DecodedBatch {
    let mut batch = DecodedBatch::default();

    for (idx, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match decode_event_line(line, mappings) {
            Ok(event) => batch.events.push(event),
            Err(error) => batch.failures.push(LineFailure {
                line_number: idx + 1,
                line: line.to_string(),
                error,
            }),
        }
    }

    batch
}

/// Decode a single trimmed, non-empty event line.
pub fn decode_event_line(line: &str, mappings: &MappingTable) -> Result<Event, LineError> {
    let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    if fields.len() < EVENT_LINE_FIELDS {
        return Err(LineError::TooFewFields {
            line: line.to_string(),
            found: fields.len(),
        });
    }

    let [id, sport_id, competition_id, start_time, home_id, away_id, status_id, scores_raw] =
        [fields[0], fields[1], fields[2], fields[3], fields[4], fields[5], fields[6], fields[7]];

    let sport = resolve(mappings, "sportId", sport_id)?;
    let competition = resolve(mappings, "competitionId", competition_id)?;
    let home = resolve(mappings, "homeTeamId", home_id)?;
    let away = resolve(mappings, "awayTeamId", away_id)?;
    let status = resolve(mappings, "statusId", status_id)?;
    if status == REMOVED_STATUS {
        return Err(LineError::ReservedStatus {
            id: status_id.to_string(),
        });
    }

    let start_time = render_start_time(start_time)?;
    let scores = decode_scores(scores_raw, mappings)?;

    Ok(Event {
        id: EventId::new(id),
        sport: sport.to_string(),
        competition: competition.to_string(),
        start_time,
        competitors: Competitors {
            home: Competitor::home(home),
            away: Competitor::away(away),
        },
        status: status.to_string(),
        scores,
    })
}

fn resolve<'a>(
    mappings: &'a MappingTable,
    field: &'static str,
    id: &str,
) -> Result<&'a str, LineError> {
    mappings.resolve(id).ok_or_else(|| LineError::MissingMapping {
        field,
        id: id.to_string(),
    })
}

/// Render epoch milliseconds as `YYYY-MM-DDTHH:MM:SS.sssZ`.
fn render_start_time(raw: &str) -> Result<String, LineError> {
    let invalid = || LineError::InvalidStartTime {
        value: raw.to_string(),
    };

    let millis: i64 = raw.trim().parse().map_err(|_| invalid())?;
    let ts = DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(invalid)?;
    Ok(ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Decode the `|`-joined score entries. A period label seen twice keeps
/// the later entry.
fn decode_scores(raw: &str, mappings: &MappingTable) -> Result<Scores, LineError> {
    let mut scores = Scores::new();

    for entry in raw.split(PERIOD_SEPARATOR) {
        let (period_id, home, away) = split_score_entry(entry).ok_or_else(|| {
            LineError::MalformedScores {
                entry: entry.to_string(),
            }
        })?;

        let period = resolve(mappings, "periodId", period_id)?;
        scores.insert(period.to_string(), Score::new(period, home, away));
    }

    Ok(scores)
}

/// Split `periodId@home:away`. The score part must hold exactly one `:`
/// with non-empty sides.
fn split_score_entry(entry: &str) -> Option<(&str, &str, &str)> {
    let (period_id, score) = entry.split_once(PERIOD_MARKER)?;
    let (home, away) = score.split_once(SCORE_SEPARATOR)?;

    if period_id.is_empty() || home.is_empty() || away.is_empty() || away.contains(SCORE_SEPARATOR) {
        return None;
    }
    Some((period_id, home, away))
}
