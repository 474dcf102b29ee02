/// A top-level narrative grouping parsed from the contents page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arc {
    /// Short token chapters are matched against (`"1"`, `"12"`, `"E"`).
    pub identifier: String,
    pub title: String,
    pub chapters: Vec<Chapter>,
}

impl Arc {
    pub fn new(identifier: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            title: title.into(),
            chapters: Vec::new(),
        }
    }
}

/// One chapter page. Starts as a placeholder (title + url) and is filled in
/// by exactly one fetch task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chapter {
    pub title: String,
    pub url: String,
    pub tags: Vec<String>,
    pub paragraphs: Vec<Paragraph>,
    pub date_posted: String,
    pub retries: u32,
}

impl Chapter {
    pub fn placeholder(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            ..Self::default()
        }
    }
}

pub const SEPARATOR: &str = "----------";
pub const INDENT: &str = "    ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Paragraph {
    Text(String),
    /// Quoted block, rendered with a fixed leading indent.
    Indented(String),
    /// Centered visual divider; the source content is discarded.
    Separator,
}

impl Paragraph {
    pub fn render(&self) -> String {
        match self {
            Paragraph::Text(text) => text.clone(),
            Paragraph::Indented(text) => format!("{INDENT}{text}"),
            Paragraph::Separator => SEPARATOR.to_owned(),
        }
    }
}

/// Position of a chapter inside the skeleton: `arcs[arc].chapters[chapter]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChapterSlot {
    pub arc: usize,
    pub chapter: usize,
}

/// Every chapter slot in skeleton order.
pub fn chapter_slots(arcs: &[Arc]) -> Vec<ChapterSlot> {
    arcs.iter()
        .enumerate()
        .flat_map(|(arc_idx, arc)| {
            (0..arc.chapters.len()).map(move |chapter_idx| ChapterSlot {
                arc: arc_idx,
                chapter: chapter_idx,
            })
        })
        .collect()
}

pub fn chapter_count(arcs: &[Arc]) -> usize {
    arcs.iter().map(|arc| arc.chapters.len()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chapter_slots_follow_skeleton_order() {
        let mut first = Arc::new("1", "Arc 1");
        first.chapters.push(Chapter::placeholder("1.1", "a"));
        first.chapters.push(Chapter::placeholder("1.2", "b"));
        let empty = Arc::new("2", "Arc 2");
        let mut epilogue = Arc::new("E", "Epilogue");
        epilogue.chapters.push(Chapter::placeholder("E.1", "c"));

        let arcs = vec![first, empty, epilogue];
        let slots = chapter_slots(&arcs);
        assert_eq!(
            slots,
            vec![
                ChapterSlot { arc: 0, chapter: 0 },
                ChapterSlot { arc: 0, chapter: 1 },
                ChapterSlot { arc: 2, chapter: 0 },
            ]
        );
        assert_eq!(chapter_count(&arcs), 3);
    }

    #[test]
    fn paragraphs_render_their_markers() {
        assert_eq!(Paragraph::Text("x".into()).render(), "x");
        assert_eq!(Paragraph::Indented("x".into()).render(), "    x");
        assert_eq!(Paragraph::Separator.render(), "----------");
    }
}
