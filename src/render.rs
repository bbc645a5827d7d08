//! Text rendering of a list page. Cards and table read the same page of
//! records; only the presentation differs.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::config;
use crate::listing::ListView;
use crate::model::{Collection, Record};

/// Widest a table cell may get before it is truncated
const MAX_CELL_WIDTH: usize = 36;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    Cards,
    Table,
}

impl Layout {
    pub fn for_width(width: usize, table_min_width: usize) -> Self {
        if width >= table_min_width {
            Layout::Table
        } else {
            Layout::Cards
        }
    }

    /// Pick from the terminal width in `COLUMNS`, 80 when unknown
    pub fn detect() -> Self {
        let width = std::env::var("COLUMNS")
            .ok()
            .and_then(|c| c.trim().parse().ok())
            .unwrap_or(80);
        Self::for_width(width, config::config().listing.table_min_width)
    }
}

pub fn render_view(collection: Collection, view: &ListView<'_, Record>, layout: Layout) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", collection.label());

    if view.is_empty() {
        out.push_str(&empty_state(collection, view));
        return out;
    }

    match layout {
        Layout::Table => render_table(&mut out, collection, &view.page.items),
        Layout::Cards => render_cards(&mut out, collection, &view.page.items),
    }
    out.push_str(&pager(view));
    out
}

fn empty_state(collection: Collection, view: &ListView<'_, Record>) -> String {
    if view.is_searching() {
        format!(
            "No {} match \"{}\" ({} records in total).\n",
            collection.label().to_lowercase(),
            view.search_term,
            view.working_set_len
        )
    } else {
        format!("No {} yet.\n", collection.label().to_lowercase())
    }
}

fn cell(record: &Record, field: &str) -> String {
    record
        .display_field(field)
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| "-".to_string())
}

/// Cut `value` to `width` characters, marking the cut with an ellipsis
pub fn truncate(value: &str, width: usize) -> String {
    let flat = value.replace(['\n', '\r'], " ");
    if flat.chars().count() <= width {
        return flat;
    }
    let mut cut: String = flat.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

fn pad(value: &str, width: usize) -> String {
    let len = value.chars().count();
    format!("{}{}", value, " ".repeat(width.saturating_sub(len)))
}

fn render_table(out: &mut String, collection: Collection, records: &[&Record]) {
    let columns: Vec<&str> = std::iter::once("id").chain(collection.columns().iter().copied()).collect();

    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| columns.iter().map(|c| truncate(&cell(r, c), MAX_CELL_WIDTH)).collect())
        .collect();

    let headers: Vec<&str> = columns.iter().map(|c| collection.column_label(c)).collect();
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |cells: Vec<String>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| pad(c, *w))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let _ = writeln!(out, "{}", line(headers.iter().map(|h| h.to_string()).collect()));
    let _ = writeln!(
        out,
        "{}",
        widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("-+-")
    );
    for row in rows {
        let _ = writeln!(out, "{}", line(row));
    }
}

fn render_cards(out: &mut String, collection: Collection, records: &[&Record]) {
    for record in records {
        let title_field = collection
            .title_fields()
            .iter()
            .copied()
            .find(|f| record.display_field(f).is_some_and(|v| !v.trim().is_empty()));
        let title = title_field
            .and_then(|f| record.display_field(f))
            .unwrap_or_else(|| record.id().to_string());

        let _ = writeln!(out);
        let _ = writeln!(out, "== {} ==", title);
        let _ = writeln!(out, "  ID: {}", record.id());
        for field in collection.columns() {
            if Some(*field) == title_field {
                continue;
            }
            let _ = writeln!(out, "  {}: {}", collection.column_label(field), cell(record, field));
        }
    }
    let _ = writeln!(out);
}

/// Summary line plus the windowed page links, current page bracketed
pub fn pager(view: &ListView<'_, Record>) -> String {
    let page = &view.page;
    let links = view
        .page_numbers
        .iter()
        .map(|n| if *n == page.page { format!("[{}]", n) } else { n.to_string() })
        .collect::<Vec<_>>()
        .join(" ");

    let prev = if page.has_previous() { "< " } else { "" };
    let next = if page.has_next() { " >" } else { "" };

    format!(
        "Page {} of {} (showing {}-{} of {})  {}{}{}\n",
        page.page,
        page.total_pages,
        page.start_index + 1,
        page.end_index,
        page.total_items,
        prev,
        links,
        next
    )
}
