//! Read-only views of a document's history
//!
//! Rendering produces plain text; colour and layout beyond that belong to
//! front ends.

use super::tracker::Tracker;

/// One commit as seen by history queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRow {
    pub commit_id: String,
    pub parent: Option<String>,
    pub timestamp: String,
    pub comment: Option<String>,
    /// Distance from the root in the tree view, from `current` in the log
    pub depth: usize,
    pub is_current: bool,
}

impl HistoryRow {
    fn from_tracker(tracker: &Tracker, commit_id: &str, depth: usize) -> Self {
        Self {
            commit_id: commit_id.to_string(),
            parent: tracker.parent(commit_id).map(str::to_string),
            timestamp: tracker.timestamp(commit_id).unwrap_or_default().to_string(),
            comment: tracker.comment(commit_id).map(str::to_string),
            depth,
            is_current: tracker.current == commit_id,
        }
    }
}

/// The full commit tree of one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryReport {
    pub document: String,
    pub bottom: String,
    pub top: String,
    pub current: String,
    /// Pre-order from the root, children in append order
    pub rows: Vec<HistoryRow>,
}

impl HistoryReport {
    pub fn from_tracker(document: &str, tracker: &Tracker) -> Self {
        let rows = tracker
            .pre_order()
            .into_iter()
            .map(|(id, depth)| HistoryRow::from_tracker(tracker, id, depth))
            .collect();
        Self {
            document: document.to_string(),
            bottom: tracker.bottom.clone(),
            top: tracker.top.clone(),
            current: tracker.current.clone(),
            rows,
        }
    }

    pub fn row(&self, commit_id: &str) -> Option<&HistoryRow> {
        self.rows.iter().find(|r| r.commit_id == commit_id)
    }

    pub fn commit_count(&self) -> usize {
        self.rows.len()
    }

    /// Indented tree; `*` marks the current commit
    pub fn render_tree(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.document);
        out.push('\n');
        for row in &self.rows {
            out.push_str(&"  ".repeat(row.depth + 1));
            out.push(if row.is_current { '*' } else { 'o' });
            out.push(' ');
            out.push_str(&row.commit_id);
            out.push_str(&format!(" ({})", row.timestamp));
            if let Some(comment) = &row.comment {
                out.push_str(&format!(" {comment}"));
            }
            out.push('\n');
        }
        out
    }

    /// One line per commit: id, timestamp and comment
    pub fn render_table(&self) -> String {
        render_rows(&self.rows)
    }
}

/// Tabular rendering shared by history and log views
pub fn render_rows(rows: &[HistoryRow]) -> String {
    let id_width = rows
        .iter()
        .map(|r| r.commit_id.len())
        .max()
        .unwrap_or(0)
        .max("COMMIT".len());
    let ts_width = rows
        .iter()
        .map(|r| r.timestamp.len())
        .max()
        .unwrap_or(0)
        .max("TIMESTAMP".len());

    let mut out = format!("  {:<id_width$}  {:<ts_width$}  COMMENT\n", "COMMIT", "TIMESTAMP");
    for row in rows {
        let marker = if row.is_current { '*' } else { ' ' };
        let line = format!(
            "{marker} {:<id_width$}  {:<ts_width$}  {}",
            row.commit_id,
            row.timestamp,
            row.comment.as_deref().unwrap_or("")
        );
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Chain from `current` back to the root, current first
pub fn log_rows(tracker: &Tracker) -> Vec<HistoryRow> {
    std::iter::once(tracker.current.as_str())
        .chain(tracker.ancestors(&tracker.current))
        .enumerate()
        .map(|(depth, id)| HistoryRow::from_tracker(tracker, id, depth))
        .collect()
}
