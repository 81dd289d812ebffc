//! Dexopt dump parsing
//!
//! `dumpsys package dexopt` emits one loosely structured record per
//! package. The classifier looks for the bracketed package tag, then an
//! architecture marker, then the bracketed status field, anywhere within
//! the record (line breaks included). The dump is untrusted text and is
//! parsed best-effort: any miss classifies as `Unknown`.

use crate::dexopt::CompileState;
use regex::Regex;
use tracing::trace;

/// Extract the compilation state of `package` from a dexopt dump.
///
/// The bracket delimiters around the package tag are part of the match,
/// so `com.example.app` never matches the record for
/// `[com.example.app2]`. The first matching record in document order
/// wins. Never fails; a missing or malformed record yields
/// [`CompileState::Unknown`].
pub fn classify(package: &str, dump: &str) -> CompileState {
    let pattern = format!(
        r"(?s)\[{}\].*?(?:arm64:|arm:).*?\[status=([^\]]+)\]",
        regex::escape(package)
    );
    let Ok(re) = Regex::new(&pattern) else {
        return CompileState::Unknown;
    };

    match re.captures(dump) {
        Some(caps) => {
            let token = caps.get(1).map_or("", |m| m.as_str());
            let state = CompileState::from_name(token);
            trace!(package, token, state = state.name(), "classified");
            state
        }
        None => CompileState::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DUMP: &str = "\
Dexopt state:
  [com.example.app]
    path: /data/app/com.example.app/base.apk
      arm64: [status=speed] [reason=bg-dexopt]
  [com.example.app2]
    path: /data/app/com.example.app2/base.apk
      arm64: [status=everything] [reason=install]
  [org.legacy.tool]
    path: /data/app/org.legacy.tool/base.apk
      arm: [status=quicken] [reason=first-boot]
";

    #[test]
    fn test_classify_finds_status() {
        assert_eq!(classify("com.example.app", DUMP), CompileState::Speed);
        assert_eq!(classify("com.example.app2", DUMP), CompileState::Everything);
    }

    #[test]
    fn test_classify_arm_marker() {
        assert_eq!(classify("org.legacy.tool", DUMP), CompileState::Quicken);
    }

    #[test]
    fn test_classify_absent_package_is_unknown() {
        assert_eq!(classify("com.not.installed", DUMP), CompileState::Unknown);
        assert_eq!(classify("com.example.app", ""), CompileState::Unknown);
    }

    #[test]
    fn test_classify_requires_bracket_delimited_tag() {
        // "com.example.app" must not match inside "[com.example.app2]".
        let dump = "\
  [com.example.app2]
      arm64: [status=everything] [reason=install]
";
        assert_eq!(classify("com.example.app", dump), CompileState::Unknown);
    }

    #[test]
    fn test_classify_unrecognized_token_is_unknown() {
        let dump = "[com.example.app]\n  arm64: [status=run-from-apk]";
        assert_eq!(classify("com.example.app", dump), CompileState::Unknown);
    }

    #[test]
    fn test_classify_token_case_and_whitespace() {
        let dump = "[com.example.app]\n  arm64: [status= SPEED-PROFILE ]";
        assert_eq!(classify("com.example.app", dump), CompileState::SpeedProfile);
    }

    #[test]
    fn test_classify_first_match_wins() {
        let dump = "\
  [com.example.app]
      arm64: [status=verify]
  [com.example.app]
      arm64: [status=speed]
";
        assert_eq!(classify("com.example.app", dump), CompileState::Verify);
    }

    #[test]
    fn test_classify_spans_line_breaks_within_record() {
        let dump = "[com.example.app]\n    path: base.apk\n    arm64:\n      [status=space]";
        assert_eq!(classify("com.example.app", dump), CompileState::Space);
    }

    #[test]
    fn test_classify_package_with_regex_metacharacters() {
        // Dots in package names are escaped, so "com?example" can't match
        // "com.example".
        let dump = "[com.example.app]\n  arm64: [status=speed]";
        assert_eq!(classify("com?example?app", dump), CompileState::Unknown);
    }
}
