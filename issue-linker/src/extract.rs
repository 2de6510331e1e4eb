//! Issue references in commit messages.
//!
//! A reference looks like `fix redmine-#42` or `修复 redmine-#42`.

use crate::errors::ExtractError;

/// Trigger keywords, in the order they are tried.
pub const ISSUE_KEYWORDS: [&str; 4] = ["fix", "close", "修复", "解决"];

/// Token that must follow a keyword, right before the issue id.
pub const ISSUE_MARKER: &str = " redmine-#";

/// Returns the issue id referenced by `message`, if any.
///
/// Keywords are tried in [`ISSUE_KEYWORDS`] order and the first keyword
/// present anywhere in the message wins, even if another keyword appears
/// earlier in the text. The id is the whitespace-delimited token right
/// after the marker, taken verbatim.
///
/// Matching ignores ASCII case only, so offsets found in the folded copy
/// stay valid in the original message.
pub fn extract_issue_id(message: &str) -> Result<Option<&str>, ExtractError> {
    let folded = message.to_ascii_lowercase();

    for keyword in ISSUE_KEYWORDS {
        let needle = format!("{keyword}{ISSUE_MARKER}");
        if let Some(index) = folded.find(&needle) {
            let rest = &message[index + needle.len()..];
            return rest
                .split_whitespace()
                .next()
                .map(Some)
                .ok_or(ExtractError::MissingIssueId { keyword });
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_id_after_keyword() {
        assert_eq!(extract_issue_id("fix redmine-#42 done"), Ok(Some("42")));
    }

    #[test]
    fn no_keyword_means_no_reference() {
        assert_eq!(extract_issue_id("refactor parser, see #42"), Ok(None));
        assert_eq!(extract_issue_id(""), Ok(None));
    }

    #[test]
    fn keyword_priority_beats_text_position() {
        // "fix" is tried before "close", so the later reference wins.
        assert_eq!(
            extract_issue_id("close redmine-#7 and fix redmine-#9"),
            Ok(Some("9"))
        );
        assert_eq!(
            extract_issue_id("解决 redmine-#3, 修复 redmine-#4"),
            Ok(Some("4"))
        );
    }

    #[test]
    fn first_occurrence_of_a_keyword_is_used() {
        assert_eq!(
            extract_issue_id("fix redmine-#1\nfix redmine-#2"),
            Ok(Some("1"))
        );
    }

    #[test]
    fn matching_ignores_ascii_case() {
        assert_eq!(extract_issue_id("FIX Redmine-#12: crash"), Ok(Some("12:")));
        assert_eq!(extract_issue_id("Close REDMINE-#8"), Ok(Some("8")));
    }

    #[test]
    fn chinese_keywords() {
        assert_eq!(extract_issue_id("修复 redmine-#789 登录失败"), Ok(Some("789")));
        assert_eq!(extract_issue_id("解决 redmine-#101"), Ok(Some("101")));
    }

    #[test]
    fn marker_is_required() {
        assert_eq!(extract_issue_id("fix #123"), Ok(None));
        assert_eq!(extract_issue_id("fix redmine #123"), Ok(None));
    }

    #[test]
    fn keyword_without_id_is_an_error() {
        assert_eq!(
            extract_issue_id("close redmine-#   "),
            Err(ExtractError::MissingIssueId { keyword: "close" })
        );
        assert_eq!(
            extract_issue_id("fix redmine-#"),
            Err(ExtractError::MissingIssueId { keyword: "fix" })
        );
    }

    #[test]
    fn non_ascii_text_before_reference_keeps_offsets() {
        assert_eq!(
            extract_issue_id("Ärger beseitigt – fix redmine-#55"),
            Ok(Some("55"))
        );
    }
}
