//! Human-readable run summary and the notification body.

use lurker::{RunSummary, VisitOutcome};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Renders the full visited table, the liked-only sublist, and the
/// engaged count. Always produces output, even for a zero-visit run.
pub fn render_summary(summary: &RunSummary) -> String {
    let mut out = String::new();

    out.push_str("-------------- visited topics --------------\n");
    out.push_str(&render_table(&summary.visited));
    out.push_str(&format!(
        "\nliked {} of {} topics\n",
        summary.engaged_count,
        summary.visited.len()
    ));

    let liked: Vec<VisitOutcome> = summary.engaged().cloned().collect();
    if !liked.is_empty() {
        out.push_str("-------------- liked topics ----------------\n");
        out.push_str(&render_table(&liked));
    }
    out
}

fn render_table(rows: &[VisitOutcome]) -> String {
    let title_width = column_width("title", rows.iter().map(|r| r.topic.title.as_str()));
    let status_width = column_width("status", rows.iter().map(|r| status_cell(r)));
    let url_width = column_width("url", rows.iter().map(|r| r.topic.url.as_str()));

    let divider = format!(
        "+-{}-+-{}-+-{}-+\n",
        "-".repeat(title_width),
        "-".repeat(status_width),
        "-".repeat(url_width)
    );

    let mut out = divider.clone();
    out.push_str(&format!(
        "| {:<title_width$} | {:<status_width$} | {:<url_width$} |\n",
        "title", "status", "url"
    ));
    out.push_str(&divider);
    for row in rows {
        out.push_str(&format!(
            "| {:<title_width$} | {:<status_width$} | {:<url_width$} |\n",
            row.topic.title,
            status_cell(row),
            row.topic.url
        ));
    }
    out.push_str(&divider);
    out
}

fn status_cell(outcome: &VisitOutcome) -> String {
    if outcome.engaged {
        format!("{} +like", outcome.status)
    } else {
        outcome.status.to_string()
    }
}

fn column_width<S: AsRef<str>>(header: &str, cells: impl Iterator<Item = S>) -> usize {
    cells
        .map(|c| c.as_ref().chars().count())
        .chain(std::iter::once(header.chars().count()))
        .max()
        .unwrap_or(0)
}

/// Builds the HTML notification body: timestamps, elapsed duration, and
/// the captured run log.
pub fn notification_body(summary: &RunSummary, log: &str) -> String {
    let started = summary.started_at.format(TIME_FORMAT);
    let ended = summary.ended_at.format(TIME_FORMAT);
    let elapsed = summary.elapsed();
    let elapsed = format!(
        "{}m {}s",
        elapsed.num_minutes(),
        elapsed.num_seconds() % 60
    );

    format!(
        "<h1>lurker run {ended}</h1>\
         <p>started: {started}<br/>\
         ended: {ended}<br/>\
         elapsed: {elapsed}<br/>\
         visited {visited} topics, liked {liked}</p>\
         <h2>log</h2>\
         <pre>{log}</pre>",
        visited = summary.visited.len(),
        liked = summary.engaged_count,
        log = escape_html(log),
    )
}

/// One-line summary for the notification envelope.
pub fn notification_summary(summary: &RunSummary) -> String {
    format!(
        "lurker {} ({} visited, {} liked)",
        summary.ended_at.format(TIME_FORMAT),
        summary.visited.len(),
        summary.engaged_count
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use lurker::{TopicReference, VisitStatus};

    fn summary_with(outcomes: Vec<(&str, bool, VisitStatus)>) -> RunSummary {
        let mut summary = RunSummary::begin();
        for (title, engaged, status) in outcomes {
            summary.record(VisitOutcome {
                topic: TopicReference {
                    title: title.to_string(),
                    url: format!("https://forum.test/t/{title}"),
                },
                engaged,
                status,
            });
        }
        summary.finalize();
        summary
    }

    #[test]
    fn summary_lists_every_visit_and_the_count() {
        let summary = summary_with(vec![
            ("alpha", true, VisitStatus::Visited),
            ("beta", false, VisitStatus::TimedOut),
        ]);
        let rendered = render_summary(&summary);

        assert!(rendered.contains("alpha"));
        assert!(rendered.contains("beta"));
        assert!(rendered.contains("timed_out"));
        assert!(rendered.contains("liked 1 of 2 topics"));
        assert!(rendered.contains("liked topics"));
    }

    #[test]
    fn liked_sublist_is_omitted_when_nothing_was_liked() {
        let summary = summary_with(vec![("alpha", false, VisitStatus::Visited)]);
        let rendered = render_summary(&summary);

        assert!(rendered.contains("liked 0 of 1 topics"));
        assert!(!rendered.contains("liked topics"));
    }

    #[test]
    fn zero_visit_summary_still_renders() {
        let rendered = render_summary(&summary_with(vec![]));
        assert!(rendered.contains("liked 0 of 0 topics"));
    }

    #[test]
    fn body_embeds_the_escaped_log() {
        let summary = summary_with(vec![]);
        let body = notification_body(&summary, "<error> at step 2 & retry");

        assert!(body.contains("<pre>&lt;error&gt; at step 2 &amp; retry</pre>"));
        assert!(body.contains("visited 0 topics, liked 0"));
    }

    #[test]
    fn envelope_summary_carries_the_counts() {
        let summary = summary_with(vec![("alpha", true, VisitStatus::Visited)]);
        let line = notification_summary(&summary);
        assert!(line.contains("1 visited"));
        assert!(line.contains("1 liked"));
    }
}
