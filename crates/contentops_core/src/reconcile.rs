//! Merge of optimistic and confirmed job collections into the displayed list.
//!
//! Matching runs in three passes, one per rule, so that a strong match
//! (equal ids) is never pre-empted by a weaker one claiming the same
//! confirmed record. Each confirmed record pairs with at most one optimistic
//! record.
//!
//! The payload rule bridges the window between the user triggering a job and
//! the enqueue response carrying its id. It only applies to records still
//! under a temporary id, and only against non-terminal server jobs created
//! no earlier than the optimistic record, so a retried headline is not
//! absorbed by an old job. Two jobs with the same title that are both still
//! `processing` cannot be told apart and may be paired the wrong way round;
//! the server offers no correlation token to do better.

use crate::{is_temporary_id, JobId, JobRecord, JobStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    /// Confirmed id equals the optimistic id.
    ExactId,
    /// Optimistic id equals the id the server sent under its secondary key.
    AlternateId,
    /// Same display title while the optimistic record is still `processing`
    /// under a temporary id.
    SamePayload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobMatch {
    pub optimistic_id: JobId,
    pub confirmed_id: JobId,
    pub rule: MatchRule,
}

/// Pairs optimistic records with the confirmed records that supersede them.
pub fn find_matches(optimistic: &[JobRecord], confirmed: &[JobRecord]) -> Vec<JobMatch> {
    let order = newest_first(optimistic);
    let mut optimistic_done = vec![false; optimistic.len()];
    let mut claimed = vec![false; confirmed.len()];
    let mut matches = Vec::new();

    for rule in [MatchRule::ExactId, MatchRule::AlternateId, MatchRule::SamePayload] {
        for &o in &order {
            if optimistic_done[o] {
                continue;
            }
            let candidate = &optimistic[o];
            let found = confirmed
                .iter()
                .enumerate()
                .find(|(c, record)| !claimed[*c] && rule_matches(rule, candidate, record));
            if let Some((c, record)) = found {
                optimistic_done[o] = true;
                claimed[c] = true;
                matches.push(JobMatch {
                    optimistic_id: candidate.id.clone(),
                    confirmed_id: record.id.clone(),
                    rule,
                });
            }
        }
    }

    matches
}

/// Displayed list: unmatched optimistic records, newest first, followed by
/// confirmed records in server order.
pub fn reconcile(optimistic: &[JobRecord], confirmed: &[JobRecord]) -> Vec<JobRecord> {
    let matches = find_matches(optimistic, confirmed);
    let mut displayed: Vec<JobRecord> = newest_first(optimistic)
        .into_iter()
        .map(|index| &optimistic[index])
        .filter(|record| !matches.iter().any(|m| m.optimistic_id == record.id))
        .cloned()
        .collect();
    displayed.extend(confirmed.iter().cloned());
    displayed
}

fn rule_matches(rule: MatchRule, optimistic: &JobRecord, confirmed: &JobRecord) -> bool {
    match rule {
        MatchRule::ExactId => confirmed.id == optimistic.id,
        MatchRule::AlternateId => confirmed.alt_id.as_deref() == Some(optimistic.id.as_str()),
        MatchRule::SamePayload => {
            is_temporary_id(&optimistic.id)
                && optimistic.status == JobStatus::Processing
                && !confirmed.status.is_terminal()
                && confirmed.created_at >= optimistic.created_at
                && confirmed.payload.same_display(&optimistic.payload)
        }
    }
}

/// Indices sorted by `created_at` descending; stable for equal timestamps.
fn newest_first(records: &[JobRecord]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..records.len()).collect();
    order.sort_by(|a, b| records[*b].created_at.cmp(&records[*a].created_at));
    order
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::JobPayload;

    fn at(offset_secs: i64) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap() + Duration::seconds(offset_secs)
    }

    fn optimistic(id: &str, title: &str, offset: i64) -> JobRecord {
        JobRecord::optimistic(id, JobPayload::new("post", title), at(offset))
    }

    fn confirmed(id: &str, title: &str, status: JobStatus) -> JobRecord {
        confirmed_at(id, title, status, 10)
    }

    fn confirmed_at(id: &str, title: &str, status: JobStatus, offset: i64) -> JobRecord {
        JobRecord::confirmed(id, status, 10, JobPayload::new("post", title), at(offset))
    }

    fn ids(records: &[JobRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn unmatched_optimistic_records_come_first_newest_first() {
        let local = vec![optimistic("tmp-1", "A", 1), optimistic("tmp-2", "B", 5)];
        let server = vec![confirmed("9", "Z", JobStatus::Queued), confirmed("8", "Y", JobStatus::Ready)];

        let view = reconcile(&local, &server);
        assert_eq!(ids(&view), vec!["tmp-2", "tmp-1", "9", "8"]);
    }

    #[test]
    fn exact_id_match_drops_optimistic_copy() {
        let local = vec![optimistic("42", "Launch day", 1)];
        let server = vec![confirmed("42", "Renamed by server", JobStatus::GeneratingCaption)];

        let matches = find_matches(&local, &server);
        assert_eq!(matches[0].rule, MatchRule::ExactId);
        let view = reconcile(&local, &server);
        assert_eq!(ids(&view), vec!["42"]);
        assert_eq!(view[0].status, JobStatus::GeneratingCaption);
    }

    #[test]
    fn alternate_key_id_matches() {
        let local = vec![optimistic("abc", "Launch day", 1)];
        let server = vec![confirmed("row-17", "Other", JobStatus::Queued).with_alt_id(Some("abc".into()))];

        let matches = find_matches(&local, &server);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].rule, MatchRule::AlternateId);
        assert_eq!(ids(&reconcile(&local, &server)), vec!["row-17"]);
    }

    #[test]
    fn payload_heuristic_requires_processing_status() {
        let mut local = vec![optimistic("tmp-1", "Launch day", 1)];
        let server = vec![confirmed("42", "Launch day", JobStatus::Queued)];
        assert_eq!(ids(&reconcile(&local, &server)), vec!["42"]);

        local[0].status = JobStatus::GeneratingCaption;
        assert_eq!(ids(&reconcile(&local, &server)), vec!["tmp-1", "42"]);
    }

    #[test]
    fn one_confirmed_record_absorbs_one_optimistic_record() {
        let local = vec![optimistic("tmp-1", "Same", 1), optimistic("tmp-2", "Same", 2)];
        let server = vec![confirmed("42", "Same", JobStatus::Queued)];

        let view = reconcile(&local, &server);
        // The newest optimistic record claims the server entry.
        assert_eq!(ids(&view), vec!["tmp-1", "42"]);
    }

    #[test]
    fn exact_match_wins_over_earlier_payload_claim() {
        let local = vec![optimistic("tmp-9", "Same", 9), optimistic("42", "Same", 1)];
        let server = vec![confirmed("42", "Same", JobStatus::Processing)];

        let matches = find_matches(&local, &server);
        assert_eq!(
            matches,
            vec![JobMatch {
                optimistic_id: "42".into(),
                confirmed_id: "42".into(),
                rule: MatchRule::ExactId,
            }]
        );
        assert_eq!(ids(&reconcile(&local, &server)), vec!["tmp-9", "42"]);
    }

    #[test]
    fn repeated_headline_is_not_absorbed_by_an_old_job() {
        let local = vec![optimistic("tmp-1", "Launch day", 60)];

        let failed = vec![confirmed_at("7", "Launch day", JobStatus::Failed, 70)];
        assert_eq!(ids(&reconcile(&local, &failed)), vec!["tmp-1", "7"]);

        let older = vec![confirmed_at("7", "Launch day", JobStatus::Processing, 0)];
        assert_eq!(ids(&reconcile(&local, &older)), vec!["tmp-1", "7"]);

        let fresh = vec![confirmed_at("43", "Launch day", JobStatus::Queued, 61)];
        assert_eq!(ids(&reconcile(&local, &fresh)), vec!["43"]);
    }

    #[test]
    fn resolved_ids_match_only_by_id() {
        let local = vec![optimistic("43", "Launch day", 60)];
        let server = vec![confirmed_at("7", "Launch day", JobStatus::Queued, 70)];

        assert!(find_matches(&local, &server).is_empty());
        assert_eq!(ids(&reconcile(&local, &server)), vec!["43", "7"]);
    }

    #[test]
    fn empty_inputs_reconcile_to_empty() {
        assert!(reconcile(&[], &[]).is_empty());
    }
}
