use anyhow::Context as _;
use regex::Regex;
use scraper::Html;

use crate::extract::selector;
use crate::formats::{Arc, Chapter};

pub const ARC_MARKER: &str = "Arc";
pub const EPILOGUE_MARKER: &str = "Epilogue";
pub const EPILOGUE_IDENTIFIER: &str = "E";

const CONTENTS_SELECTOR: &str = ".entry-content";
const CHAPTER_LINK_SELECTOR: &str = ".entry-content a:not([class*=share-icon])";

/// An anchor found on the contents page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentsLink {
    pub text: String,
    pub href: String,
}

/// The chapter skeleton plus the chapters no arc claimed.
#[derive(Debug, Clone, Default)]
pub struct Classification {
    pub arcs: Vec<Arc>,
    pub dropped: Vec<Chapter>,
}

/// Parses the contents page into a chapter skeleton.
pub fn parse_contents_page(html: &str) -> anyhow::Result<Classification> {
    let document = Html::parse_document(html);

    let contents_selector = selector(CONTENTS_SELECTOR)?;
    let Some(contents) = document.select(&contents_selector).next() else {
        tracing::warn!("contents page has no {CONTENTS_SELECTOR} element; skeleton is empty");
        return Ok(Classification::default());
    };
    let contents_text = contents.text().collect::<String>();
    let arcs = parse_arcs(&contents_text).context("parse arc lines")?;

    let link_selector = selector(CHAPTER_LINK_SELECTOR)?;
    let links = document.select(&link_selector).map(|anchor| ContentsLink {
        text: anchor.text().collect::<String>(),
        href: anchor.value().attr("href").unwrap_or_default().to_owned(),
    });

    Ok(classify(arcs, links))
}

/// Builds one arc per `Arc ...` or `Epilogue ...` line, in line order.
pub fn parse_arcs(contents_text: &str) -> anyhow::Result<Vec<Arc>> {
    let number = Regex::new(r"[0-9]+").context("compile arc number regex")?;

    let mut arcs = Vec::new();
    for line in contents_text.lines().map(str::trim) {
        if line.starts_with(ARC_MARKER) {
            let identifier = number.find(line).map(|m| m.as_str()).unwrap_or_default();
            arcs.push(Arc::new(identifier, line));
        } else if line.starts_with(EPILOGUE_MARKER) {
            arcs.push(Arc::new(EPILOGUE_IDENTIFIER, line));
        }
    }
    Ok(arcs)
}

/// The arc token encoded in a chapter title: its first two characters
/// without periods (`"1.4"` -> `"1"`, `"12.3"` -> `"12"`, `"E.1"` -> `"E"`).
pub fn arc_key(chapter_title: &str) -> String {
    chapter_title
        .chars()
        .take(2)
        .filter(|ch| *ch != '.')
        .collect()
}

/// Index of the first arc whose identifier matches the chapter title.
pub fn which_arc(chapter_title: &str, arcs: &[Arc]) -> Option<usize> {
    let key = arc_key(chapter_title);
    arcs.iter().position(|arc| arc.identifier == key)
}

/// Appends a placeholder chapter for every non-empty link to its arc, in
/// link order. Links whose title matches no arc end up in `dropped`.
pub fn classify(arcs: Vec<Arc>, links: impl IntoIterator<Item = ContentsLink>) -> Classification {
    let mut classification = Classification {
        arcs,
        dropped: Vec::new(),
    };

    for link in links {
        let title = link.text.trim().replace('\n', "");
        if title.is_empty() {
            continue;
        }

        let chapter = Chapter::placeholder(title, link.href);
        match which_arc(&chapter.title, &classification.arcs) {
            Some(idx) => classification.arcs[idx].chapters.push(chapter),
            None => {
                tracing::warn!(
                    title = %chapter.title,
                    url = %chapter.url,
                    "chapter did not match any arc; dropping it"
                );
                classification.dropped.push(chapter);
            }
        }
    }

    classification
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(text: &str, href: &str) -> ContentsLink {
        ContentsLink {
            text: text.to_owned(),
            href: href.to_owned(),
        }
    }

    fn chapter_titles(arc: &Arc) -> Vec<&str> {
        arc.chapters.iter().map(|c| c.title.as_str()).collect()
    }

    #[test]
    fn parse_arcs_reads_arc_and_epilogue_lines() -> anyhow::Result<()> {
        let text = "\
Table of Contents
  Arc 1: Gestation
1.1 1.2
Arc 12 (Plague)
Epilogue: Teneral
Arc without a number
";
        let arcs = parse_arcs(text)?;
        let summary = arcs
            .iter()
            .map(|a| (a.identifier.as_str(), a.title.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(
            summary,
            vec![
                ("1", "Arc 1: Gestation"),
                ("12", "Arc 12 (Plague)"),
                ("E", "Epilogue: Teneral"),
                ("", "Arc without a number"),
            ]
        );
        Ok(())
    }

    #[test]
    fn arc_key_strips_periods_from_two_char_prefix() {
        assert_eq!(arc_key("1.4"), "1");
        assert_eq!(arc_key("12.3"), "12");
        assert_eq!(arc_key("E.1"), "E");
        assert_eq!(arc_key("7"), "7");
        assert_eq!(arc_key(""), "");
    }

    #[test]
    fn classify_keeps_discovery_order_within_each_arc() -> anyhow::Result<()> {
        let arcs = parse_arcs("Arc 1: Gestation\nArc 2: Insinuation\nEpilogue")?;
        let links = vec![
            link("2.1", "u/2.1"),
            link("1.1", "u/1.1"),
            link("  ", "u/blank"),
            link("E.1", "u/e1"),
            link("1.2\n", "u/1.2"),
            link("Interlude", "u/interlude"),
            link("2.2", "u/2.2"),
        ];

        let classification = classify(arcs, links);
        let arcs = &classification.arcs;
        assert_eq!(chapter_titles(&arcs[0]), vec!["1.1", "1.2"]);
        assert_eq!(chapter_titles(&arcs[1]), vec!["2.1", "2.2"]);
        assert_eq!(chapter_titles(&arcs[2]), vec!["E.1"]);
        assert_eq!(arcs[0].chapters[1].url, "u/1.2");

        assert_eq!(classification.dropped.len(), 1);
        assert_eq!(classification.dropped[0].title, "Interlude");
        Ok(())
    }

    #[test]
    fn two_digit_arcs_do_not_capture_single_digit_chapters() -> anyhow::Result<()> {
        let arcs = parse_arcs("Arc 1\nArc 10")?;
        let classification = classify(arcs, vec![link("10.1", "a"), link("1.10", "b")]);
        assert_eq!(chapter_titles(&classification.arcs[0]), vec!["1.10"]);
        assert_eq!(chapter_titles(&classification.arcs[1]), vec!["10.1"]);
        Ok(())
    }

    #[test]
    fn parse_contents_page_ignores_share_links() -> anyhow::Result<()> {
        let html = r#"<!doctype html>
<html><body>
  <div class="entry-content">
    <p>Arc 1: Gestation</p>
    <p><a href="https://example.com/1-1/">1.1</a> <a href="https://example.com/1-2/">1.2</a></p>
    <p>Epilogue: Teneral</p>
    <p><a href="https://example.com/e-1/">E.1</a></p>
    <a class="share-icon share-twitter" href="https://twitter.com/x">1.9</a>
  </div>
  <a href="https://example.com/outside/">1.7</a>
</body></html>"#;

        let classification = parse_contents_page(html)?;
        assert_eq!(classification.arcs.len(), 2);
        assert_eq!(chapter_titles(&classification.arcs[0]), vec!["1.1", "1.2"]);
        assert_eq!(chapter_titles(&classification.arcs[1]), vec!["E.1"]);
        assert_eq!(
            classification.arcs[0].chapters[0].url,
            "https://example.com/1-1/"
        );
        assert!(classification.dropped.is_empty());
        Ok(())
    }

    #[test]
    fn parse_contents_page_without_content_is_empty() -> anyhow::Result<()> {
        let classification = parse_contents_page("<html><body><p>nothing</p></body></html>")?;
        assert!(classification.arcs.is_empty());
        assert!(classification.dropped.is_empty());
        Ok(())
    }
}
