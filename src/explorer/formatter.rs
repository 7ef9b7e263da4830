//! Commit label templates.
//!
//! Supported tokens: `${id}`, `${author}`, `${message}`, `${date}`, `${ago}`.
//! Unknown tokens are left as written.

use std::fmt::Write;

use crate::config::DEFAULT_DATE_FORMAT;
use crate::git::repository::format_relative_time;
use crate::models::Commit;

#[derive(Debug, Clone, Copy)]
pub struct CommitFormatOptions<'a> {
    pub truncate_message_at_newline: bool,
    pub date_format: &'a str,
}

pub struct CommitFormatter;

impl CommitFormatter {
    pub fn from_template(
        template: &str,
        commit: &Commit,
        options: CommitFormatOptions<'_>,
    ) -> String {
        let message = if options.truncate_message_at_newline {
            commit.subject()
        } else {
            commit.message.as_str()
        };

        let mut out = String::with_capacity(template.len() + message.len());
        let mut rest = template;
        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find('}') else {
                out.push_str(&rest[start..]);
                return out;
            };

            match &after[..end] {
                "id" => out.push_str(commit.short_sha()),
                "author" => out.push_str(&commit.author),
                "message" => out.push_str(message),
                "date" => push_date(&mut out, commit, options.date_format),
                "ago" => out.push_str(&format_relative_time(commit.date.timestamp())),
                _ => out.push_str(&rest[start..start + 3 + end]),
            }
            rest = &after[end + 1..];
        }
        out.push_str(rest);
        out
    }
}

/// Falls back to the default format when `format` has bad specifiers.
fn push_date(out: &mut String, commit: &Commit, format: &str) {
    let mut date = String::new();
    if write!(date, "{}", commit.date.format(format)).is_err() {
        date.clear();
        let _ = write!(date, "{}", commit.date.format(DEFAULT_DATE_FORMAT));
    }
    out.push_str(&date);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::resolver::tests::commit;

    const OPTIONS: CommitFormatOptions<'static> = CommitFormatOptions {
        truncate_message_at_newline: true,
        date_format: "%Y-%m-%d",
    };

    #[test]
    fn replaces_known_tokens() {
        let mut c = commit("abc1234def");
        c.message = "Fix the thing\n\nLong body".into();
        let template = "${message} • ${author} (${id}) ${date}";
        let label = CommitFormatter::from_template(template, &c, OPTIONS);
        assert_eq!(label, "Fix the thing • Author (abc1234) 2026-01-01");
    }

    #[test]
    fn keeps_unknown_and_unterminated_tokens() {
        let c = commit("abc1234def");
        assert_eq!(CommitFormatter::from_template("${nope} ${id", &c, OPTIONS), "${nope} ${id");
    }

    #[test]
    fn full_message_when_not_truncating() {
        let mut c = commit("abc1234def");
        c.message = "a\nb".into();
        let options = CommitFormatOptions {
            truncate_message_at_newline: false,
            ..OPTIONS
        };
        assert_eq!(CommitFormatter::from_template("${message}", &c, options), "a\nb");
    }

    #[test]
    fn bad_date_format_falls_back_to_default() {
        let c = commit("abc1234def");
        let options = CommitFormatOptions {
            date_format: "%Q",
            ..OPTIONS
        };
        let expected = c.date.format(DEFAULT_DATE_FORMAT).to_string();
        assert_eq!(CommitFormatter::from_template("${date}", &c, options), expected);
    }
}
