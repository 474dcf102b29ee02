const EMPHASIS_TAGS: [&str; 4] = ["<em>", "</em>", "<i>", "</i>"];
const BOLD_TAGS: [&str; 4] = ["<strong>", "</strong>", "<b>", "</b>"];

/// Normalizes a paragraph's inner markup into Markdown-ish text.
///
/// Newlines are dropped before tags are rewritten so that a tag split across
/// lines is still caught on the first pass; running this twice is a no-op.
/// Tags other than emphasis/bold are left untouched.
pub fn format(source: &str) -> String {
    let mut out = source.replace('\n', "");

    for tag in EMPHASIS_TAGS {
        out = out.replace(tag, "*");
    }
    for tag in BOLD_TAGS {
        out = out.replace(tag, "**");
    }

    while out.contains(".  ") {
        out = out.replace(".  ", ". ");
    }

    out
}
