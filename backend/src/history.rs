// Selection-history reconstruction: session clustering, repeated-pattern
// detection and per-candidate aggregation. Everything in this module is a
// pure function over already-fetched rows; the routes do the store calls.

use chrono::NaiveDateTime;

use crate::error::ApiError;
use crate::models::{Candidate, CandidateStats, Selection, SelectionEntry};

/// Maximum number of candidates in one save.
pub const MAX_SELECTIONS: usize = 9;

/// Rows whose timestamps differ by less than this belong to the same save.
pub const CLUSTER_WINDOW_MS: i64 = 1000;

/// One reconstructed save event. `group_id` is stable only within a single
/// reconstruction run; callers that resolve a group id back to rows must
/// re-run the reconstruction first.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionSession {
    pub group_id: String,
    pub timestamp: NaiveDateTime,
    /// Members ordered ascending by `selection_order`, ties by id.
    pub selections: Vec<Selection>,
}

impl SelectionSession {
    fn first_id(&self) -> i32 {
        self.selections.first().map(|s| s.id).unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatternGroup {
    pub pattern_id: String,
    pub count: usize,
    pub selections: Vec<Selection>,
}

/// Groups a user's flat selection rows into save-event sessions.
///
/// The store has no session identifier, so sessions are recovered from
/// timestamp proximity: rows are scanned newest-first (ties by id,
/// newer inserts first) and each row joins the first open cluster whose
/// anchor timestamp is within [`CLUSTER_WINDOW_MS`], where a cluster's
/// anchor is the timestamp of the row that opened it. The union is a
/// single greedy pass, not a transitive closure: a row within the window
/// of a non-anchor member but not of the anchor opens a new cluster.
///
/// Output is ordered newest-first by each session's earliest member
/// timestamp; members are ordered by `selection_order`.
pub fn cluster_sessions(mut records: Vec<Selection>) -> Vec<SelectionSession> {
    records.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });

    let mut clusters: Vec<(NaiveDateTime, Vec<Selection>)> = Vec::new();

    for record in records {
        let found = clusters.iter().position(|(anchor, _)| {
            (record.created_at - *anchor).num_milliseconds().abs() < CLUSTER_WINDOW_MS
        });

        match found {
            Some(index) => clusters[index].1.push(record),
            None => clusters.push((record.created_at, vec![record])),
        }
    }

    let mut sessions: Vec<SelectionSession> = clusters
        .into_iter()
        .enumerate()
        .map(|(index, (anchor, mut members))| {
            // The scan is newest-first, so the last push is the earliest
            // member and gives the session its representative timestamp.
            let timestamp = members.last().map(|m| m.created_at).unwrap_or(anchor);

            members.sort_by(|a, b| {
                a.selection_order
                    .cmp(&b.selection_order)
                    .then_with(|| a.id.cmp(&b.id))
            });

            SelectionSession {
                group_id: format!("group_{}", index),
                timestamp,
                selections: members,
            }
        })
        .collect();

    sessions.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| b.first_id().cmp(&a.first_id()))
    });

    sessions
}

/// Content signature of a session: `order:candidate:list` triples joined
/// with `|`. Two sessions are identical saves iff their keys are equal.
pub fn pattern_key(session: &SelectionSession) -> String {
    session
        .selections
        .iter()
        .map(|s| format!("{}:{}:{}", s.selection_order, s.candidate_name, s.list_name))
        .collect::<Vec<_>>()
        .join("|")
}

/// Finds sessions the user has saved more than once with identical
/// content (same candidates, same lists, same rank order). Groups are
/// ordered by occurrence count descending; ties keep the order in which
/// the pattern first appears in the newest-first session list.
pub fn find_identical_patterns(sessions: &[SelectionSession]) -> Vec<PatternGroup> {
    // Patterns need at least two saves to compare.
    if sessions.len() <= 1 {
        return Vec::new();
    }

    let mut groups: Vec<PatternGroup> = Vec::new();

    for session in sessions {
        let key = pattern_key(session);
        if key.is_empty() {
            continue;
        }

        match groups.iter().position(|g| g.pattern_id == key) {
            Some(index) => groups[index].count += 1,
            None => groups.push(PatternGroup {
                pattern_id: key,
                count: 1,
                selections: session.selections.clone(),
            }),
        }
    }

    groups.retain(|g| g.count > 1);
    groups.sort_by(|a, b| b.count.cmp(&a.count));
    groups
}

/// Per-candidate selection counts over raw rows, zero-filled across the
/// whole roster and emitted in roster order. Every historical row counts
/// equally regardless of rank; rows naming a candidate not on either
/// roster are ignored.
pub fn candidate_stats(roster: &[Candidate], rows: &[(String, String)]) -> Vec<CandidateStats> {
    let mut stats: Vec<CandidateStats> = roster
        .iter()
        .map(|c| CandidateStats {
            name: c.name.clone(),
            list_name: c.list_name.clone(),
            selection_count: 0,
        })
        .collect();

    for (name, list_name) in rows {
        if let Some(entry) = stats
            .iter_mut()
            .find(|s| &s.name == name && &s.list_name == list_name)
        {
            entry.selection_count += 1;
        }
    }

    stats
}

/// Rejects a save before it reaches the store: empty batches, batches
/// larger than [`MAX_SELECTIONS`] and names missing from the roster.
pub fn validate_selections(
    entries: &[SelectionEntry],
    roster: &[Candidate],
) -> Result<(), ApiError> {
    if entries.is_empty() {
        return Err(ApiError::Validation(
            "at least one candidate must be selected".to_string(),
        ));
    }

    if entries.len() > MAX_SELECTIONS {
        return Err(ApiError::Validation(format!(
            "a maximum of {} candidates can be selected",
            MAX_SELECTIONS
        )));
    }

    for entry in entries {
        let on_roster = roster
            .iter()
            .any(|c| c.name == entry.name && c.list_name == entry.list_name.as_str());
        if !on_roster {
            return Err(ApiError::Validation(format!(
                "{} is not a candidate on {}",
                entry.name,
                entry.list_name.as_str()
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ListName;
    use chrono::DateTime;

    fn ts(millis: i64) -> NaiveDateTime {
        DateTime::from_timestamp_millis(millis).unwrap().naive_utc()
    }

    fn sel(id: i32, order: i32, name: &str, list: &str, millis: i64) -> Selection {
        Selection {
            id,
            user_id: "admin@example.com".to_string(),
            candidate_name: name.to_string(),
            list_name: list.to_string(),
            selection_order: order,
            created_at: ts(millis),
        }
    }

    fn roster() -> Vec<Candidate> {
        let mut out = Vec::new();
        for (list, prefix) in [("List A", "A"), ("List B", "B")] {
            for i in 1..=9 {
                out.push(Candidate {
                    id: out.len() as i32 + 1,
                    name: format!("{}{}", prefix, i),
                    list_name: list.to_string(),
                    position: i,
                });
            }
        }
        out
    }

    fn entry(name: &str, list: ListName) -> SelectionEntry {
        SelectionEntry {
            name: name.to_string(),
            list_name: list,
        }
    }

    #[test]
    fn no_records_yield_no_sessions() {
        assert!(cluster_sessions(Vec::new()).is_empty());
    }

    #[test]
    fn one_tight_batch_is_one_session() {
        let records = vec![
            sel(3, 3, "A3", "List A", 400),
            sel(1, 1, "A1", "List A", 0),
            sel(2, 2, "B2", "List B", 900),
        ];

        let sessions = cluster_sessions(records);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].timestamp, ts(0));
        let orders: Vec<i32> = sessions[0].selections.iter().map(|s| s.selection_order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
    }

    #[test]
    fn separated_batches_become_separate_sessions_newest_first() {
        // Three saves of sizes 2, 3, 1, each batch tight, gaps > 1s.
        let mut records = vec![
            sel(1, 1, "A1", "List A", 0),
            sel(2, 2, "A2", "List A", 10),
            sel(3, 1, "B1", "List B", 5_000),
            sel(4, 2, "B2", "List B", 5_020),
            sel(5, 3, "B3", "List B", 5_040),
            sel(6, 1, "A4", "List A", 12_000),
        ];
        records.reverse();

        let sessions = cluster_sessions(records);
        assert_eq!(sessions.len(), 3);
        assert_eq!(sessions[0].timestamp, ts(12_000));
        assert_eq!(sessions[0].selections.len(), 1);
        assert_eq!(sessions[1].timestamp, ts(5_000));
        assert_eq!(sessions[1].selections.len(), 3);
        assert_eq!(sessions[2].timestamp, ts(0));
        assert_eq!(sessions[2].selections.len(), 2);
    }

    #[test]
    fn clustering_is_input_order_independent() {
        let base = vec![
            sel(1, 1, "A1", "List A", 0),
            sel(2, 2, "A2", "List A", 150),
            sel(3, 1, "B1", "List B", 3_000),
            sel(4, 2, "B2", "List B", 3_100),
            sel(5, 1, "A5", "List A", 7_000),
        ];

        let reference = cluster_sessions(base.clone());

        let mut shuffled = base.clone();
        shuffled.reverse();
        assert_eq!(cluster_sessions(shuffled), reference);

        let interleaved = vec![
            base[2].clone(),
            base[4].clone(),
            base[0].clone(),
            base[3].clone(),
            base[1].clone(),
        ];
        assert_eq!(cluster_sessions(interleaved), reference);

        // Deterministic on repeated runs as well.
        assert_eq!(cluster_sessions(base.clone()), reference);
    }

    #[test]
    fn save_scenario_splits_at_window_boundary() {
        // [T, T+200ms, T+900ms, T+2500ms] with orders [1,2,3,1]: the
        // fourth row starts a new logical save.
        let records = vec![
            sel(1, 1, "A1", "List A", 0),
            sel(2, 2, "A2", "List A", 200),
            sel(3, 3, "A3", "List A", 900),
            sel(4, 1, "B1", "List B", 2_500),
        ];

        let sessions = cluster_sessions(records);
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].timestamp, ts(2_500));
        assert_eq!(sessions[0].selections.len(), 1);
        assert_eq!(sessions[1].timestamp, ts(0));
        assert_eq!(sessions[1].selections.len(), 3);
    }

    #[test]
    fn greedy_union_splits_chains_at_the_anchor() {
        // 0ms, 900ms, 1800ms: each neighbor pair is within the window but
        // the scan is anchored newest-first, so 1800 anchors a cluster,
        // 900 joins it, and 0 (1.8s from the anchor, 900ms from a member)
        // opens a second cluster. Pins the greedy anchor policy against a
        // transitive-closure "fix".
        let records = vec![
            sel(1, 1, "A1", "List A", 0),
            sel(2, 1, "A2", "List A", 900),
            sel(3, 2, "A3", "List A", 1_800),
        ];

        let sessions = cluster_sessions(records);
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].timestamp, ts(900));
        assert_eq!(
            sessions[0].selections.iter().map(|s| s.id).collect::<Vec<_>>(),
            vec![2, 3]
        );
        assert_eq!(sessions[1].timestamp, ts(0));
        assert_eq!(sessions[1].selections[0].id, 1);
    }

    #[test]
    fn equal_timestamps_share_a_session() {
        let records = vec![
            sel(2, 2, "A2", "List A", 1_000),
            sel(1, 1, "A1", "List A", 1_000),
        ];

        let sessions = cluster_sessions(records);
        assert_eq!(sessions.len(), 1);
        assert_eq!(
            sessions[0].selections.iter().map(|s| s.id).collect::<Vec<_>>(),
            vec![1, 2]
        );
    }

    #[test]
    fn pattern_requires_at_least_two_sessions() {
        assert!(find_identical_patterns(&[]).is_empty());

        let one = cluster_sessions(vec![sel(1, 1, "A1", "List A", 0)]);
        assert!(find_identical_patterns(&one).is_empty());
    }

    #[test]
    fn identical_saves_are_reported_once_with_count() {
        let records = vec![
            sel(1, 1, "A1", "List A", 0),
            sel(2, 2, "B3", "List B", 10),
            sel(3, 1, "A1", "List A", 5_000),
            sel(4, 2, "B3", "List B", 5_010),
        ];

        let sessions = cluster_sessions(records);
        let patterns = find_identical_patterns(&sessions);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].count, 2);
        assert_eq!(patterns[0].pattern_id, "1:A1:List A|2:B3:List B");
        assert_eq!(patterns[0].selections.len(), 2);
    }

    #[test]
    fn reordered_candidates_are_a_different_pattern() {
        let records = vec![
            sel(1, 1, "A1", "List A", 0),
            sel(2, 2, "B3", "List B", 10),
            sel(3, 2, "A1", "List A", 5_000),
            sel(4, 1, "B3", "List B", 5_010),
        ];

        let sessions = cluster_sessions(records);
        assert_eq!(sessions.len(), 2);
        assert!(find_identical_patterns(&sessions).is_empty());
    }

    #[test]
    fn patterns_are_ordered_by_count_descending() {
        let mut records = Vec::new();
        let mut id = 0;
        // Pattern X saved three times, pattern Y twice.
        for (i, name) in [(0i64, "A1"), (1, "A1"), (2, "A1"), (3, "A2"), (4, "A2")] {
            id += 1;
            records.push(sel(id, 1, name, "List A", i * 10_000));
        }

        let patterns = find_identical_patterns(&cluster_sessions(records));
        assert_eq!(patterns.len(), 2);
        assert_eq!(patterns[0].pattern_id, "1:A1:List A");
        assert_eq!(patterns[0].count, 3);
        assert_eq!(patterns[1].pattern_id, "1:A2:List A");
        assert_eq!(patterns[1].count, 2);
    }

    #[test]
    fn stats_zero_fill_both_rosters() {
        let stats = candidate_stats(&roster(), &[]);
        assert_eq!(stats.len(), 18);
        assert!(stats.iter().all(|s| s.selection_count == 0));
        // Roster order is preserved: List A first, in position order.
        assert_eq!(stats[0].name, "A1");
        assert_eq!(stats[9].name, "B1");
    }

    #[test]
    fn stats_accumulate_across_sessions() {
        let row = |name: &str, list: &str| (name.to_string(), list.to_string());

        let stats = candidate_stats(&roster(), &[row("A1", "List A"), row("B3", "List B")]);
        let count = |name: &str| {
            stats
                .iter()
                .find(|s| s.name == name)
                .map(|s| s.selection_count)
                .unwrap()
        };
        assert_eq!(count("A1"), 1);
        assert_eq!(count("B3"), 1);
        assert_eq!(stats.iter().map(|s| s.selection_count).sum::<i64>(), 2);

        // A later save picking A1 again bumps it to 2.
        let stats = candidate_stats(
            &roster(),
            &[row("A1", "List A"), row("B3", "List B"), row("A1", "List A")],
        );
        let a1 = stats.iter().find(|s| s.name == "A1").unwrap();
        assert_eq!(a1.selection_count, 2);
    }

    #[test]
    fn stats_ignore_rows_off_the_roster() {
        let rows = vec![
            ("Nobody".to_string(), "List A".to_string()),
            // Right name, wrong list.
            ("A1".to_string(), "List B".to_string()),
        ];
        let stats = candidate_stats(&roster(), &rows);
        assert!(stats.iter().all(|s| s.selection_count == 0));
    }

    #[test]
    fn save_larger_than_maximum_is_rejected() {
        let entries: Vec<SelectionEntry> = (1..=9)
            .map(|i| entry(&format!("A{}", i), ListName::ListA))
            .chain(std::iter::once(entry("B1", ListName::ListB)))
            .collect();
        assert_eq!(entries.len(), 10);

        let err = validate_selections(&entries, &roster()).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn empty_save_is_rejected() {
        let err = validate_selections(&[], &roster()).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn unknown_candidate_is_rejected() {
        let entries = vec![entry("A1", ListName::ListA), entry("A1", ListName::ListB)];
        let err = validate_selections(&entries, &roster()).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn full_valid_save_passes_validation() {
        let entries: Vec<SelectionEntry> = (1..=9)
            .map(|i| entry(&format!("B{}", i), ListName::ListB))
            .collect();
        assert!(validate_selections(&entries, &roster()).is_ok());
    }
}
