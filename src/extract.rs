use scraper::{ElementRef, Html, Selector};

use crate::formats::{Chapter, Paragraph};

const TITLE_SELECTOR: &str = "h1.entry-title";
const TAG_SELECTOR: &str = ".entry-meta a[rel=tag]";
const DATE_SELECTOR: &str = "time.entry-date";
const PARAGRAPH_SELECTOR: &str = ".entry-content > p";
const LINK_SELECTOR: &str = "a";

const INDENT_PADDING: &str = "30px";
const SEPARATOR_ALIGN: &str = "center";

pub(crate) fn selector(css: &str) -> anyhow::Result<Selector> {
    Selector::parse(css).map_err(|err| anyhow::anyhow!("parse css selector {css:?}: {err}"))
}

/// Everything read off one chapter page. Missing elements yield empty values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChapterPage {
    pub title: Option<String>,
    pub tags: Vec<String>,
    pub date_posted: String,
    pub paragraphs: Vec<Paragraph>,
}

impl ChapterPage {
    /// Fills a placeholder chapter. The placeholder title is kept when the
    /// page has no usable heading.
    pub fn populate(self, chapter: &mut Chapter) {
        if let Some(title) = self.title {
            chapter.title = title;
        }
        chapter.tags = self.tags;
        chapter.date_posted = self.date_posted;
        chapter.paragraphs = self.paragraphs;
    }
}

/// Compiled selectors for chapter pages, shared by every fetch task.
#[derive(Debug)]
pub struct ChapterParser {
    title: Selector,
    tags: Selector,
    date: Selector,
    paragraphs: Selector,
    links: Selector,
}

impl ChapterParser {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            title: selector(TITLE_SELECTOR)?,
            tags: selector(TAG_SELECTOR)?,
            date: selector(DATE_SELECTOR)?,
            paragraphs: selector(PARAGRAPH_SELECTOR)?,
            links: selector(LINK_SELECTOR)?,
        })
    }

    pub fn parse(&self, html: &str) -> ChapterPage {
        let document = Html::parse_document(html);

        let title = document
            .select(&self.title)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_owned())
            .filter(|title| !title.is_empty());

        let tags = document
            .select(&self.tags)
            .map(|el| el.text().collect::<String>())
            .collect();

        let date_posted = document
            .select(&self.date)
            .next()
            .map(|el| el.text().collect::<String>())
            .unwrap_or_default();

        let paragraphs = document
            .select(&self.paragraphs)
            // Paragraphs holding links are the previous/next chapter navigation.
            .filter(|p| p.select(&self.links).next().is_none())
            .map(classify_paragraph)
            .collect();

        ChapterPage {
            title,
            tags,
            date_posted,
            paragraphs,
        }
    }
}

/// Maps one content `<p>` to its paragraph kind and formats its markup.
pub fn classify_paragraph(element: ElementRef<'_>) -> Paragraph {
    if style_value(element, "padding-left").is_some_and(|v| v.eq_ignore_ascii_case(INDENT_PADDING))
    {
        return Paragraph::Indented(crate::paragraph::format(&element.inner_html()));
    }
    if style_value(element, "text-align").is_some_and(|v| v.eq_ignore_ascii_case(SEPARATOR_ALIGN)) {
        return Paragraph::Separator;
    }
    Paragraph::Text(crate::paragraph::format(&element.inner_html()))
}

/// Looks the property up as a bare attribute first, then inside `style`.
fn style_value(element: ElementRef<'_>, property: &str) -> Option<String> {
    let value = element.value();
    if let Some(bare) = value.attr(property) {
        return Some(declared_value(bare));
    }

    value.attr("style")?.split(';').find_map(|declaration| {
        let (name, val) = declaration.split_once(':')?;
        name.trim()
            .eq_ignore_ascii_case(property)
            .then(|| declared_value(val))
    })
}

/// `center !important` -> `center`.
fn declared_value(raw: &str) -> String {
    let raw = raw.trim();
    let value = match raw.len().checked_sub("!important".len()) {
        Some(at)
            if raw.is_char_boundary(at) && raw[at..].eq_ignore_ascii_case("!important") =>
        {
            &raw[..at]
        }
        _ => raw,
    };
    value.trim().to_owned()
}
