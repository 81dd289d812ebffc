//! Compilation state vocabulary
//!
//! The fixed set of ART compilation filters a package can be in, and the
//! severity groups used for display grouping and sort order. Both
//! mappings are total: any name outside the vocabulary resolves to
//! `Unknown`, and every state belongs to exactly one group.

/// ART compilation state of a package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompileState {
    Everything,
    EverythingProfile,
    Speed,
    SpeedProfile,
    Space,
    SpaceProfile,
    Verify,
    Quicken,
    Extract,
    Unknown,
}

/// Severity group a compilation state belongs to, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OptGroup {
    FullyOptimized,
    PartiallyOptimized,
    MinimallyOptimized,
    UnknownStatus,
}

impl CompileState {
    /// Every state, in vocabulary order
    pub const ALL: [CompileState; 10] = [
        CompileState::Everything,
        CompileState::EverythingProfile,
        CompileState::Speed,
        CompileState::SpeedProfile,
        CompileState::Space,
        CompileState::SpaceProfile,
        CompileState::Verify,
        CompileState::Quicken,
        CompileState::Extract,
        CompileState::Unknown,
    ];

    /// The profiles an operator can compile with (`extract` and `unknown`
    /// are observed states, not selectable targets)
    pub const PROFILES: [CompileState; 8] = [
        CompileState::Everything,
        CompileState::EverythingProfile,
        CompileState::Speed,
        CompileState::SpeedProfile,
        CompileState::Space,
        CompileState::SpaceProfile,
        CompileState::Verify,
        CompileState::Quicken,
    ];

    /// Canonical lowercase name, as it appears in dexopt dumps and in
    /// `cmd package compile -m` arguments
    pub fn name(self) -> &'static str {
        match self {
            CompileState::Everything => "everything",
            CompileState::EverythingProfile => "everything-profile",
            CompileState::Speed => "speed",
            CompileState::SpeedProfile => "speed-profile",
            CompileState::Space => "space",
            CompileState::SpaceProfile => "space-profile",
            CompileState::Verify => "verify",
            CompileState::Quicken => "quicken",
            CompileState::Extract => "extract",
            CompileState::Unknown => "unknown",
        }
    }

    /// Parse a status token, case-insensitively. Anything outside the
    /// vocabulary is `Unknown`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "everything" => CompileState::Everything,
            "everything-profile" => CompileState::EverythingProfile,
            "speed" => CompileState::Speed,
            "speed-profile" => CompileState::SpeedProfile,
            "space" => CompileState::Space,
            "space-profile" => CompileState::SpaceProfile,
            "verify" => CompileState::Verify,
            "quicken" => CompileState::Quicken,
            "extract" => CompileState::Extract,
            _ => CompileState::Unknown,
        }
    }

    /// Severity group this state belongs to
    pub fn group(self) -> OptGroup {
        match self {
            CompileState::Everything | CompileState::EverythingProfile => OptGroup::FullyOptimized,
            CompileState::Speed
            | CompileState::SpeedProfile
            | CompileState::Space
            | CompileState::SpaceProfile => OptGroup::PartiallyOptimized,
            CompileState::Verify | CompileState::Quicken => OptGroup::MinimallyOptimized,
            CompileState::Extract | CompileState::Unknown => OptGroup::UnknownStatus,
        }
    }

    /// One-line description shown on the profile selection screen
    pub fn description(self) -> &'static str {
        match self {
            CompileState::Everything => "Fully AOT compiled - fastest",
            CompileState::EverythingProfile => "Profile guided - almost full AOT",
            CompileState::Speed => "Full speed optimization without profiles",
            CompileState::SpeedProfile => "Profile-guided speed AOT",
            CompileState::Space => "Space-efficient full-ish compile",
            CompileState::SpaceProfile => "Profile-guided for storage efficiency",
            CompileState::Verify => "Verified only",
            CompileState::Quicken => "DEX optimized",
            CompileState::Extract => "DEX extracted only",
            CompileState::Unknown => "Status could not be determined",
        }
    }
}

impl OptGroup {
    /// Display order of the groups
    pub const ORDER: [OptGroup; 4] = [
        OptGroup::FullyOptimized,
        OptGroup::PartiallyOptimized,
        OptGroup::MinimallyOptimized,
        OptGroup::UnknownStatus,
    ];

    pub fn label(self) -> &'static str {
        match self {
            OptGroup::FullyOptimized => "Fully Optimized",
            OptGroup::PartiallyOptimized => "Partially Optimized",
            OptGroup::MinimallyOptimized => "Minimally Optimized",
            OptGroup::UnknownStatus => "Unknown Status",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_name_group_table() {
        let cases = [
            ("everything", OptGroup::FullyOptimized),
            ("everything-profile", OptGroup::FullyOptimized),
            ("speed", OptGroup::PartiallyOptimized),
            ("speed-profile", OptGroup::PartiallyOptimized),
            ("space", OptGroup::PartiallyOptimized),
            ("space-profile", OptGroup::PartiallyOptimized),
            ("verify", OptGroup::MinimallyOptimized),
            ("quicken", OptGroup::MinimallyOptimized),
            ("extract", OptGroup::UnknownStatus),
            ("unknown", OptGroup::UnknownStatus),
        ];

        for (name, group) in cases {
            let state = CompileState::from_name(name);
            assert_eq!(state.name(), name, "round-trip for {name}");
            assert_eq!(state.group(), group, "group for {name}");
        }
    }

    #[test]
    fn test_from_name_is_case_insensitive_and_trims() {
        assert_eq!(CompileState::from_name("SPEED"), CompileState::Speed);
        assert_eq!(
            CompileState::from_name("  speed-profile  "),
            CompileState::SpeedProfile
        );
    }

    #[test]
    fn test_from_name_unrecognized_is_unknown() {
        assert_eq!(CompileState::from_name("run-from-apk"), CompileState::Unknown);
        assert_eq!(CompileState::from_name(""), CompileState::Unknown);
        assert_eq!(CompileState::from_name("everything2"), CompileState::Unknown);
    }

    #[test]
    fn test_group_order_matches_severity() {
        assert!(OptGroup::FullyOptimized < OptGroup::PartiallyOptimized);
        assert!(OptGroup::PartiallyOptimized < OptGroup::MinimallyOptimized);
        assert!(OptGroup::MinimallyOptimized < OptGroup::UnknownStatus);
    }

    #[test]
    fn test_group_labels() {
        let labels: Vec<&str> = OptGroup::ORDER.iter().map(|g| g.label()).collect();
        assert_eq!(
            labels,
            vec![
                "Fully Optimized",
                "Partially Optimized",
                "Minimally Optimized",
                "Unknown Status"
            ]
        );
    }

    #[test]
    fn test_profiles_exclude_observed_only_states() {
        assert!(!CompileState::PROFILES.contains(&CompileState::Extract));
        assert!(!CompileState::PROFILES.contains(&CompileState::Unknown));
        assert_eq!(CompileState::PROFILES.len(), 8);
    }
}
