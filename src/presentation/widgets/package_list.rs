//! Package List Widget
//!
//! Grouped, filterable package list: one header row per severity group,
//! then the packages in that group with a selection checkbox and their
//! colored status.

use crate::dexopt::{OptGroup, PackageRecord};
use crate::presentation::theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, List, ListItem, ListState, StatefulWidget},
};
use std::collections::BTreeSet;

/// One display row: a group header or a selectable package
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageRow<'a> {
    Header(OptGroup),
    Package(&'a PackageRecord),
}

impl<'a> PackageRow<'a> {
    /// The package identifier, if this row is selectable
    pub fn package(self) -> Option<&'a str> {
        match self {
            PackageRow::Header(_) => None,
            PackageRow::Package(record) => Some(record.package.as_str()),
        }
    }
}

/// Build the display rows for the current filter.
///
/// The filter is a case-insensitive substring match over the package
/// identifier and the status name. Groups keep their fixed display
/// order; packages are ordinal-ascending within a group; empty groups
/// are omitted.
pub fn visible_rows<'a>(records: &'a [PackageRecord], filter: &str) -> Vec<PackageRow<'a>> {
    let query = filter.trim().to_lowercase();
    let matches = |record: &PackageRecord| {
        query.is_empty()
            || record.package.to_lowercase().contains(&query)
            || record.state.name().contains(&query)
    };

    let mut rows = Vec::new();
    for group in OptGroup::ORDER {
        let mut members: Vec<&PackageRecord> = records
            .iter()
            .filter(|r| r.state.group() == group && matches(r))
            .collect();
        if members.is_empty() {
            continue;
        }
        members.sort_by(|a, b| a.package.cmp(&b.package));

        rows.push(PackageRow::Header(group));
        rows.extend(members.into_iter().map(PackageRow::Package));
    }
    rows
}

/// The package list widget
pub struct PackageList<'a> {
    rows: &'a [PackageRow<'a>],
    selected: &'a BTreeSet<String>,
    block: Option<Block<'a>>,
}

impl<'a> PackageList<'a> {
    #[must_use]
    pub fn new(rows: &'a [PackageRow<'a>], selected: &'a BTreeSet<String>) -> Self {
        Self {
            rows,
            selected,
            block: None,
        }
    }

    /// Set the block for borders/title
    #[must_use]
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    fn build_items(&self) -> Vec<ListItem<'a>> {
        self.rows
            .iter()
            .map(|row| match row {
                PackageRow::Header(group) => ListItem::new(Line::from(Span::styled(
                    group.label(),
                    theme::group_header_style(*group),
                ))),
                PackageRow::Package(record) => {
                    let checkbox = if self.selected.contains(&record.package) {
                        "☑"
                    } else {
                        "☐"
                    };
                    let color = theme::status_color(record.state);
                    let line = Line::from(vec![
                        Span::raw(format!("  {checkbox} ")),
                        Span::styled(
                            format!("{:<40}", record.package),
                            Style::default().fg(color),
                        ),
                        Span::styled(record.state.name(), Style::default().fg(color)),
                    ]);
                    ListItem::new(line)
                }
            })
            .collect()
    }
}

impl StatefulWidget for PackageList<'_> {
    type State = ListState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let items = self.build_items();
        let list = List::new(items).highlight_style(theme::highlight_style());

        let list = if let Some(block) = self.block {
            list.block(block)
        } else {
            list
        };

        StatefulWidget::render(list, area, buf, state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dexopt::CompileState;
    use pretty_assertions::assert_eq;

    fn sample_records() -> Vec<PackageRecord> {
        vec![
            PackageRecord::new("z.pkg", CompileState::Unknown),
            PackageRecord::new("a.pkg", CompileState::Everything),
            PackageRecord::new("m.pkg", CompileState::Unknown),
            PackageRecord::new("b.pkg", CompileState::Speed),
        ]
    }

    #[test]
    fn test_visible_rows_grouping_and_order() {
        let records = sample_records();
        let rows = visible_rows(&records, "");

        let rendered: Vec<String> = rows
            .iter()
            .map(|row| match row {
                PackageRow::Header(g) => format!("# {}", g.label()),
                PackageRow::Package(r) => r.package.clone(),
            })
            .collect();

        assert_eq!(
            rendered,
            vec![
                "# Fully Optimized",
                "a.pkg",
                "# Partially Optimized",
                "b.pkg",
                "# Unknown Status",
                "m.pkg",
                "z.pkg",
            ]
        );
    }

    #[test]
    fn test_visible_rows_filter_by_package_name() {
        let records = sample_records();
        let rows = visible_rows(&records, "a.pk");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].package(), Some("a.pkg"));
    }

    #[test]
    fn test_visible_rows_filter_by_status_name() {
        let records = sample_records();
        let rows = visible_rows(&records, "speed");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], PackageRow::Header(OptGroup::PartiallyOptimized));
        assert_eq!(rows[1].package(), Some("b.pkg"));
    }

    #[test]
    fn test_visible_rows_filter_no_matches() {
        let records = sample_records();
        assert!(visible_rows(&records, "nothing-matches-this").is_empty());
    }

    #[test]
    fn test_header_rows_are_not_selectable() {
        let records = sample_records();
        let rows = visible_rows(&records, "");
        assert_eq!(rows[0].package(), None);
        assert_eq!(rows[1].package(), Some("a.pkg"));
    }
}
