//! Event-log-to-interval reconciliation.
//!
//! Derives closed intervals, per-task totals and open sessions from the raw
//! Start/End log. Nothing here is cached or persisted: callers recompute from
//! the full log whenever it changes.
//!
//! # Algorithm Summary
//!
//! 1. Sort events by timestamp, ties broken by ascending id
//! 2. Walk them keeping one open Start anchor per task name
//! 3. An End closes the anchor of its task and adds the span to the total
//! 4. Whatever anchors remain at the end of the log are open sessions
//!
//! # Anomalies
//!
//! Logs that do not alternate Start/End per task are handled, not rejected:
//! - a second Start replaces the open anchor and the first span is discarded
//! - an End with no open Start is an orphan and contributes nothing
//! - a closed span with a negative length contributes zero
//!
//! Each case is reported in [`Reconciliation::anomalies`].

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::event::{Action, Event};
use crate::types::{EventId, TaskName};

/// A span of work on one task, derived from a Start and its matching End.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interval {
    pub task_name: TaskName,
    pub start: DateTime<Utc>,
    /// `None` while the session is still open.
    pub end: Option<DateTime<Utc>>,
    pub start_id: EventId,
    pub end_id: Option<EventId>,
}

impl Interval {
    pub const fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// Length of a closed interval, clamped at zero. `None` while open.
    pub fn duration(&self) -> Option<Duration> {
        self.end.map(|end| clamp(end - self.start))
    }

    /// Length up to `end`, or up to `now` for an open interval.
    pub fn elapsed_at(&self, now: DateTime<Utc>) -> Duration {
        clamp(self.end.unwrap_or(now) - self.start)
    }
}

/// Total closed time for one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSummary {
    pub task_name: String,
    pub total: Duration,
}

/// A data-quality condition found while reconciling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Anomaly {
    /// An End with no open Start for its task.
    OrphanEnd { task_name: String, event_id: EventId },
    /// A Start arrived while another Start for the same task was open.
    ReplacedStart {
        task_name: String,
        discarded_id: EventId,
        replaced_by: EventId,
    },
    /// An End earlier than its Start; counted as zero.
    ClampedDuration {
        task_name: String,
        start_id: EventId,
        end_id: EventId,
    },
}

/// Everything derived from one pass over the log.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reconciliation {
    /// Total closed time per task name.
    pub summaries: BTreeMap<String, Duration>,
    /// Start instant of every open session, by task name.
    pub open: BTreeMap<String, DateTime<Utc>>,
    /// The input events, ascending by timestamp then id.
    pub records: Vec<Event>,
    /// Closed and open intervals, ascending by start.
    pub intervals: Vec<Interval>,
    /// Anomalies in log order.
    pub anomalies: Vec<Anomaly>,
}

#[derive(Debug, Clone, Copy)]
struct OpenStart {
    at: DateTime<Utc>,
    id: EventId,
}

/// Reconciles a log of events into totals, intervals and open sessions.
///
/// Input order does not matter; events are sorted by timestamp, then id.
/// The result depends only on the input.
pub fn reconcile(events: Vec<Event>) -> Reconciliation {
    let mut records = events;
    records.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));
    let mut reconciliation = walk(&records);
    reconciliation.records = records;
    reconciliation
}

/// Walks events in the given order. `records` is left empty.
fn walk(events: &[Event]) -> Reconciliation {
    let mut open_starts: BTreeMap<&str, (OpenStart, &TaskName)> = BTreeMap::new();
    let mut summaries: BTreeMap<String, Duration> = BTreeMap::new();
    let mut intervals = Vec::new();
    let mut anomalies = Vec::new();

    for event in events {
        let name = event.task_name.as_str();
        match event.action {
            Action::Start => {
                let anchor = OpenStart {
                    at: event.timestamp,
                    id: event.id,
                };
                if let Some((previous, _)) = open_starts.insert(name, (anchor, &event.task_name)) {
                    anomalies.push(Anomaly::ReplacedStart {
                        task_name: name.to_string(),
                        discarded_id: previous.id,
                        replaced_by: event.id,
                    });
                }
            }
            Action::End => {
                let Some((start, task_name)) = open_starts.remove(name) else {
                    anomalies.push(Anomaly::OrphanEnd {
                        task_name: name.to_string(),
                        event_id: event.id,
                    });
                    continue;
                };

                let span = event.timestamp - start.at;
                if span < Duration::zero() {
                    anomalies.push(Anomaly::ClampedDuration {
                        task_name: name.to_string(),
                        start_id: start.id,
                        end_id: event.id,
                    });
                }
                *summaries
                    .entry(name.to_string())
                    .or_insert_with(Duration::zero) += clamp(span);

                intervals.push(Interval {
                    task_name: task_name.clone(),
                    start: start.at,
                    end: Some(event.timestamp),
                    start_id: start.id,
                    end_id: Some(event.id),
                });
            }
        }
    }

    let mut open = BTreeMap::new();
    for (name, (start, task_name)) in open_starts {
        open.insert(name.to_string(), start.at);
        intervals.push(Interval {
            task_name: task_name.clone(),
            start: start.at,
            end: None,
            start_id: start.id,
            end_id: None,
        });
    }
    intervals.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.start_id.cmp(&b.start_id)));

    Reconciliation {
        summaries,
        open,
        records: Vec::new(),
        intervals,
        anomalies,
    }
}

fn clamp(span: Duration) -> Duration {
    span.max(Duration::zero())
}

impl Reconciliation {
    /// The currently running session, if any.
    ///
    /// A session is running when its Start is open and is also the most
    /// recent event in the whole log. Older open Starts are stale sessions
    /// the user never stopped.
    pub fn running(&self) -> Option<&Interval> {
        let last = self.records.last()?;
        if last.action != Action::Start {
            return None;
        }
        self.intervals
            .iter()
            .find(|interval| interval.is_open() && interval.start_id == last.id)
    }

    /// Per-task totals ordered by task name.
    pub fn task_summaries(&self) -> Vec<TaskSummary> {
        self.summaries
            .iter()
            .map(|(task_name, total)| TaskSummary {
                task_name: task_name.clone(),
                total: *total,
            })
            .collect()
    }

    /// All intervals, most recent start first.
    pub fn history(&self) -> Vec<Interval> {
        self.intervals.iter().rev().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{NaiveTime, TimeZone};

    fn at(time: &str) -> DateTime<Utc> {
        let time = NaiveTime::parse_from_str(time, "%H:%M:%S").unwrap();
        Utc.from_utc_datetime(
            &chrono::NaiveDate::from_ymd_opt(2025, 1, 1)
                .unwrap()
                .and_time(time),
        )
    }

    fn event(id: i64, time: &str, name: &str, action: Action) -> Event {
        Event {
            id: EventId::new(id),
            timestamp: at(time),
            task_name: TaskName::new(name).unwrap(),
            action,
        }
    }

    fn secs(n: i64) -> Duration {
        Duration::seconds(n)
    }

    #[test]
    fn single_closed_interval() {
        let result = reconcile(vec![
            event(1, "10:00:00", "work", Action::Start),
            event(2, "10:30:00", "work", Action::End),
        ]);

        assert_eq!(result.summaries, BTreeMap::from([("work".to_string(), secs(1800))]));
        assert!(result.open.is_empty());
        assert!(result.anomalies.is_empty());
        assert_eq!(result.records.len(), 2);
    }

    #[test]
    fn double_start_keeps_second_anchor() {
        let result = reconcile(vec![
            event(1, "09:00:00", "a", Action::Start),
            event(2, "09:10:00", "a", Action::Start),
            event(3, "09:25:00", "a", Action::End),
        ]);

        assert_eq!(result.summaries, BTreeMap::from([("a".to_string(), secs(900))]));
        assert!(result.open.is_empty());
        assert_eq!(
            result.anomalies,
            vec![Anomaly::ReplacedStart {
                task_name: "a".to_string(),
                discarded_id: EventId::new(1),
                replaced_by: EventId::new(2),
            }]
        );
        assert_eq!(result.intervals.len(), 1);
        assert_eq!(result.intervals[0].start_id, EventId::new(2));
    }

    #[test]
    fn lone_start_is_open() {
        let result = reconcile(vec![event(1, "08:00:00", "b", Action::Start)]);

        assert!(result.summaries.is_empty());
        assert_eq!(result.open, BTreeMap::from([("b".to_string(), at("08:00:00"))]));
        assert_eq!(result.intervals.len(), 1);
        assert!(result.intervals[0].is_open());
        assert_eq!(result.intervals[0].duration(), None);
    }

    #[test]
    fn deleting_end_reopens_session() {
        let mut events = vec![
            event(1, "10:00:00", "work", Action::Start),
            event(2, "10:30:00", "work", Action::End),
        ];
        events.retain(|e| e.id != EventId::new(2));

        let result = reconcile(events);
        assert!(result.summaries.is_empty());
        assert_eq!(result.open, BTreeMap::from([("work".to_string(), at("10:00:00"))]));
    }

    #[test]
    fn orphan_end_contributes_nothing() {
        let result = reconcile(vec![
            event(1, "10:00:00", "work", Action::End),
            event(2, "11:00:00", "work", Action::Start),
            event(3, "11:20:00", "work", Action::End),
        ]);

        assert_eq!(result.summaries["work"], secs(1200));
        assert_eq!(
            result.anomalies,
            vec![Anomaly::OrphanEnd {
                task_name: "work".to_string(),
                event_id: EventId::new(1),
            }]
        );
        // Still visible in the raw record list.
        assert_eq!(result.records.len(), 3);
    }

    #[test]
    fn orphan_end_alone_adds_no_summary_entry() {
        let result = reconcile(vec![event(1, "10:00:00", "work", Action::End)]);
        assert!(result.summaries.is_empty());
        assert!(result.open.is_empty());
        assert_eq!(result.records.len(), 1);
    }

    #[test]
    fn alternating_events_sum_exactly() {
        let result = reconcile(vec![
            event(1, "09:00:00", "x", Action::Start),
            event(2, "09:15:00", "x", Action::End),
            event(3, "10:00:00", "x", Action::Start),
            event(4, "10:00:45", "x", Action::End),
            event(5, "13:00:00", "x", Action::Start),
            event(6, "14:30:00", "x", Action::End),
        ]);

        assert_eq!(result.summaries["x"], secs(15 * 60 + 45 + 90 * 60));
        assert_eq!(result.intervals.len(), 3);
        assert!(result.anomalies.is_empty());
    }

    #[test]
    fn tasks_are_matched_independently() {
        let result = reconcile(vec![
            event(1, "09:00:00", "a", Action::Start),
            event(2, "09:05:00", "b", Action::Start),
            event(3, "09:10:00", "a", Action::End),
            event(4, "09:30:00", "b", Action::End),
        ]);

        assert_eq!(result.summaries["a"], secs(600));
        assert_eq!(result.summaries["b"], secs(1500));
    }

    #[test]
    fn unsorted_input_is_sorted_before_walking() {
        let result = reconcile(vec![
            event(2, "10:30:00", "work", Action::End),
            event(1, "10:00:00", "work", Action::Start),
        ]);

        assert_eq!(result.summaries["work"], secs(1800));
        let ids: Vec<EventId> = result.records.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![EventId::new(1), EventId::new(2)]);
    }

    #[test]
    fn timestamp_ties_break_by_id() {
        // End (id 1) sorts before Start (id 2) at the same instant, so it is
        // an orphan and the Start stays open.
        let result = reconcile(vec![
            event(2, "10:00:00", "work", Action::Start),
            event(1, "10:00:00", "work", Action::End),
        ]);
        assert!(result.summaries.is_empty());
        assert_eq!(result.open["work"], at("10:00:00"));

        // Start (id 1) then End (id 2) at the same instant closes a zero span.
        let result = reconcile(vec![
            event(2, "10:00:00", "work", Action::End),
            event(1, "10:00:00", "work", Action::Start),
        ]);
        assert_eq!(result.summaries["work"], Duration::zero());
        assert!(result.open.is_empty());
    }

    #[test]
    fn negative_span_is_clamped_and_flagged() {
        let events = vec![
            event(1, "10:00:00", "work", Action::Start),
            event(2, "09:00:00", "work", Action::End),
        ];

        let result = walk(&events);
        assert_eq!(result.summaries["work"], Duration::zero());
        assert_eq!(
            result.anomalies,
            vec![Anomaly::ClampedDuration {
                task_name: "work".to_string(),
                start_id: EventId::new(1),
                end_id: EventId::new(2),
            }]
        );
        assert_eq!(result.intervals[0].duration(), Some(Duration::zero()));
    }

    #[test]
    fn reconcile_is_deterministic() {
        let events = vec![
            event(1, "09:00:00", "a", Action::Start),
            event(2, "09:01:00", "b", Action::Start),
            event(3, "09:02:00", "a", Action::Start),
            event(4, "09:03:00", "c", Action::End),
            event(5, "09:04:00", "a", Action::End),
        ];

        assert_eq!(reconcile(events.clone()), reconcile(events));
    }

    #[test]
    fn deleting_an_event_only_changes_its_task() {
        let events = vec![
            event(1, "09:00:00", "a", Action::Start),
            event(2, "09:05:00", "b", Action::Start),
            event(3, "09:10:00", "a", Action::End),
            event(4, "09:20:00", "b", Action::End),
            event(5, "09:30:00", "a", Action::Start),
            event(6, "09:45:00", "a", Action::End),
        ];
        let before = reconcile(events.clone());

        let after = reconcile(
            events
                .into_iter()
                .filter(|e| e.id != EventId::new(6))
                .collect(),
        );

        assert_eq!(before.summaries["b"], after.summaries["b"]);
        assert_eq!(before.summaries["a"], secs(1500));
        assert_eq!(after.summaries["a"], secs(600));
        assert_eq!(after.open.keys().collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn running_requires_most_recent_event() {
        let result = reconcile(vec![
            event(1, "09:00:00", "stale", Action::Start),
            event(2, "09:10:00", "live", Action::Start),
        ]);
        let running = result.running().unwrap();
        assert_eq!(running.task_name.as_str(), "live");
        assert_eq!(running.start_id, EventId::new(2));

        let result = reconcile(vec![
            event(1, "09:00:00", "stale", Action::Start),
            event(2, "09:10:00", "other", Action::Start),
            event(3, "09:20:00", "other", Action::End),
        ]);
        assert!(result.running().is_none());
        assert!(result.open.contains_key("stale"));
    }

    #[test]
    fn history_lists_newest_first() {
        let result = reconcile(vec![
            event(1, "09:00:00", "a", Action::Start),
            event(2, "09:10:00", "a", Action::End),
            event(3, "09:20:00", "b", Action::Start),
            event(4, "09:30:00", "b", Action::End),
            event(5, "09:40:00", "a", Action::Start),
        ]);

        let starts: Vec<EventId> = result.history().iter().map(|i| i.start_id).collect();
        assert_eq!(starts, vec![EventId::new(5), EventId::new(3), EventId::new(1)]);
        assert!(result.history()[0].is_open());
        assert_eq!(
            result.history()[0].elapsed_at(at("10:00:00")),
            secs(20 * 60)
        );
    }

    #[test]
    fn task_summaries_are_sorted_by_name() {
        let result = reconcile(vec![
            event(1, "09:00:00", "zeta", Action::Start),
            event(2, "09:01:00", "zeta", Action::End),
            event(3, "09:02:00", "alpha", Action::Start),
            event(4, "09:04:00", "alpha", Action::End),
        ]);

        assert_eq!(
            result.task_summaries(),
            vec![
                TaskSummary {
                    task_name: "alpha".to_string(),
                    total: secs(120),
                },
                TaskSummary {
                    task_name: "zeta".to_string(),
                    total: secs(60),
                },
            ]
        );
    }

    #[test]
    fn empty_log_reconciles_to_nothing() {
        let result = reconcile(Vec::new());
        assert_eq!(result, Reconciliation::default());
        assert!(result.running().is_none());
    }
}
