//! Dexopt status model
//!
//! The closed vocabulary of ART compilation states, the classifier that
//! extracts a package's state from a `dumpsys package dexopt` dump, and
//! the display-ordering contract the UI renders.

pub mod parser;
pub mod status;

pub use parser::classify;
pub use status::{CompileState, OptGroup};

/// A package paired with its compilation state at the time of the last
/// scan. Never mutated in place; re-scanning produces a new list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRecord {
    pub package: String,
    pub state: CompileState,
}

impl PackageRecord {
    pub fn new(package: impl Into<String>, state: CompileState) -> Self {
        Self {
            package: package.into(),
            state,
        }
    }
}

/// Sort records for display: severity groups in their fixed order, then
/// package identifier ascending (ordinal comparison) within a group.
///
/// Deterministic and idempotent.
pub fn sort_records(records: &mut [PackageRecord]) {
    records.sort_by(|a, b| {
        a.state
            .group()
            .cmp(&b.state.group())
            .then_with(|| a.package.cmp(&b.package))
    });
}

/// Partition records into the four severity groups, in display order.
/// Groups with no members are omitted.
pub fn grouped(records: &[PackageRecord]) -> Vec<(OptGroup, Vec<&PackageRecord>)> {
    OptGroup::ORDER
        .iter()
        .filter_map(|group| {
            let mut members: Vec<&PackageRecord> = records
                .iter()
                .filter(|r| r.state.group() == *group)
                .collect();
            if members.is_empty() {
                return None;
            }
            members.sort_by(|a, b| a.package.cmp(&b.package));
            Some((*group, members))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sort_records_groups_then_name() {
        let mut records = vec![
            PackageRecord::new("z.pkg", CompileState::Unknown),
            PackageRecord::new("a.pkg", CompileState::Everything),
            PackageRecord::new("m.pkg", CompileState::Unknown),
        ];
        sort_records(&mut records);

        assert_eq!(records[0].package, "a.pkg");
        assert_eq!(records[0].state, CompileState::Everything);
        assert_eq!(records[1].package, "m.pkg");
        assert_eq!(records[2].package, "z.pkg");
    }

    #[test]
    fn test_sort_records_idempotent() {
        let mut records = vec![
            PackageRecord::new("b.pkg", CompileState::Speed),
            PackageRecord::new("a.pkg", CompileState::Verify),
            PackageRecord::new("c.pkg", CompileState::Speed),
        ];
        sort_records(&mut records);
        let once = records.clone();
        sort_records(&mut records);
        assert_eq!(records, once);
    }

    #[test]
    fn test_grouped_display_order() {
        let records = vec![
            PackageRecord::new("z.pkg", CompileState::Unknown),
            PackageRecord::new("a.pkg", CompileState::Everything),
            PackageRecord::new("m.pkg", CompileState::Unknown),
        ];
        let groups = grouped(&records);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, OptGroup::FullyOptimized);
        assert_eq!(groups[0].1.len(), 1);
        assert_eq!(groups[0].1[0].package, "a.pkg");
        assert_eq!(groups[1].0, OptGroup::UnknownStatus);
        let names: Vec<&str> = groups[1].1.iter().map(|r| r.package.as_str()).collect();
        assert_eq!(names, vec!["m.pkg", "z.pkg"]);
    }

    #[test]
    fn test_grouped_ordinal_within_group() {
        let records = vec![
            PackageRecord::new("com.Zebra", CompileState::Speed),
            PackageRecord::new("com.apple", CompileState::Speed),
        ];
        let groups = grouped(&records);
        // Byte-wise ordering puts uppercase before lowercase.
        let names: Vec<&str> = groups[0].1.iter().map(|r| r.package.as_str()).collect();
        assert_eq!(names, vec!["com.Zebra", "com.apple"]);
    }
}
