use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::Path;

use anyhow::Context as _;

use crate::formats::Arc;

const PDF_PAGE_BREAK: &str = "\n\n<div style=\"page-break-after: always;\"></div>\n\n";
const EPUB_PAGE_BREAK: &str = "\n\n";

/// Which packaged format the flat document is headed for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputProfile {
    #[default]
    Epub,
    Pdf,
}

impl OutputProfile {
    pub fn page_break(self) -> &'static str {
        match self {
            OutputProfile::Epub => EPUB_PAGE_BREAK,
            OutputProfile::Pdf => PDF_PAGE_BREAK,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputProfile::Epub => "epub",
            OutputProfile::Pdf => "pdf",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookMeta {
    pub title: String,
    pub author: String,
    pub website: String,
}

/// Optional per-chapter annotations plus the target profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub with_link: bool,
    pub with_tags: bool,
    pub with_date: bool,
    pub profile: OutputProfile,
}

/// Serializes the skeleton in arc order, then chapter order.
pub fn render(meta: &BookMeta, arcs: &[Arc], options: &RenderOptions) -> String {
    let mut md = String::new();
    md.push_str(&format!("# {}\n\n", meta.title));
    md.push_str(&format!("By {}\n\n", meta.author));
    md.push_str(&format!("Website: {}", meta.website));

    for arc in arcs {
        md.push_str(options.profile.page_break());
        md.push_str(&arc.title);

        for chapter in &arc.chapters {
            md.push_str("\n\n");
            md.push_str(&format!("## {}\n\n", chapter.title));
            if options.with_tags {
                md.push_str(&format!("**Tags:** {}  ", chapter.tags.join(", ")));
            }
            if options.with_date {
                md.push_str(&format!("**Date:** {}  ", chapter.date_posted));
            }
            if options.with_link {
                md.push_str(&format!("**Link:** {}  ", chapter.url));
            }
            md.push_str("\n\n");

            for paragraph in &chapter.paragraphs {
                md.push_str(&paragraph.render());
                md.push_str("\n\n");
            }
        }
    }

    md
}

pub fn ensure_output_does_not_exist(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        anyhow::bail!("book output already exists: {}", path.display());
    }
    Ok(())
}

/// Writes the flat document, refusing to overwrite an existing file.
pub fn write_new(path: &Path, contents: &str) -> anyhow::Result<()> {
    let mut file = OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(path)
        .with_context(|| format!("create book output: {}", path.display()))?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("write book output: {}", path.display()))?;
    file.flush()
        .with_context(|| format!("flush book output: {}", path.display()))?;
    Ok(())
}
