use chrono::{DateTime, Local, TimeDelta};
use serde::{Deserialize, Serialize};

/// Forum account credentials. Read once at startup by the configuration
/// layer and never mutated by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// One discussion thread discovered from the listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicReference {
    pub title: String,
    pub url: String,
}

/// How a single topic visit concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitStatus {
    /// The topic page loaded; the visit ran to completion.
    Visited,
    /// Navigation to the topic timed out; engagement was skipped.
    TimedOut,
    /// Something else went wrong during the visit.
    Failed,
}

impl std::fmt::Display for VisitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VisitStatus::Visited => write!(f, "visited"),
            VisitStatus::TimedOut => write!(f, "timed_out"),
            VisitStatus::Failed => write!(f, "failed"),
        }
    }
}

/// The record produced exactly once per attempted topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitOutcome {
    pub topic: TopicReference,
    pub engaged: bool,
    pub status: VisitStatus,
}

/// Aggregated result of one full run.
///
/// Owned and mutated exclusively by [`TraversalEngine`] while the run is
/// in flight; read-only once handed to the reporter.
///
/// [`TraversalEngine`]: crate::engine::TraversalEngine
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Local>,
    pub ended_at: DateTime<Local>,
    pub visited: Vec<VisitOutcome>,
    pub engaged_count: usize,
}

impl RunSummary {
    /// Starts an empty summary stamped with the current time.
    pub fn begin() -> Self {
        let now = Local::now();
        Self {
            started_at: now,
            ended_at: now,
            visited: Vec::new(),
            engaged_count: 0,
        }
    }

    /// Appends one outcome, keeping `engaged_count` consistent with the
    /// recorded visits.
    pub fn record(&mut self, outcome: VisitOutcome) {
        if outcome.engaged {
            self.engaged_count += 1;
        }
        self.visited.push(outcome);
    }

    /// Stamps the end of the run.
    pub fn finalize(&mut self) {
        self.ended_at = Local::now();
    }

    /// Visits that resulted in an engagement, in visit order.
    pub fn engaged(&self) -> impl Iterator<Item = &VisitOutcome> {
        self.visited.iter().filter(|v| v.engaged)
    }

    /// Wall-clock duration of the run.
    pub fn elapsed(&self) -> TimeDelta {
        self.ended_at - self.started_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(title: &str, engaged: bool, status: VisitStatus) -> VisitOutcome {
        VisitOutcome {
            topic: TopicReference {
                title: title.to_string(),
                url: format!("https://forum.test/t/{title}"),
            },
            engaged,
            status,
        }
    }

    #[test]
    fn record_keeps_engaged_count_in_sync() {
        let mut summary = RunSummary::begin();
        summary.record(outcome("a", true, VisitStatus::Visited));
        summary.record(outcome("b", false, VisitStatus::Visited));
        summary.record(outcome("c", true, VisitStatus::Visited));

        assert_eq!(summary.engaged_count, 2);
        assert_eq!(
            summary.engaged_count,
            summary.visited.iter().filter(|v| v.engaged).count()
        );
    }

    #[test]
    fn engaged_iterator_preserves_visit_order() {
        let mut summary = RunSummary::begin();
        summary.record(outcome("first", true, VisitStatus::Visited));
        summary.record(outcome("second", false, VisitStatus::TimedOut));
        summary.record(outcome("third", true, VisitStatus::Visited));

        let titles: Vec<&str> = summary.engaged().map(|v| v.topic.title.as_str()).collect();
        assert_eq!(titles, ["first", "third"]);
    }

    #[test]
    fn visit_status_serializes_snake_case() {
        let json = serde_json::to_string(&VisitStatus::TimedOut).unwrap();
        assert_eq!(json, "\"timed_out\"");
    }
}
