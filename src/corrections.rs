//! Known gaps in the site's own contents page, patched into the skeleton
//! before any chapter is fetched.

use std::borrow::Cow;

use crate::formats::{Arc, Chapter};
use crate::toc::which_arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Correction {
    /// Insert a chapter the contents page never links to. The owning arc is
    /// resolved from the title; `index` is clamped to the arc's length.
    InsertChapter {
        title: Cow<'static, str>,
        url: Cow<'static, str>,
        index: usize,
    },
}

pub const CORRECTIONS: &[Correction] = &[Correction::InsertChapter {
    title: Cow::Borrowed("E.2"),
    url: Cow::Borrowed("https://parahumans.wordpress.com/2013/11/05/teneral-e-2/"),
    index: 1,
}];

/// Applies each correction in order. Returns how many were applied.
pub fn apply(arcs: &mut [Arc], corrections: &[Correction]) -> usize {
    let mut applied = 0;
    for correction in corrections {
        match correction {
            Correction::InsertChapter { title, url, index } => {
                let Some(arc_idx) = which_arc(title, arcs) else {
                    tracing::warn!(%title, %url, "correction matched no arc; skipping it");
                    continue;
                };
                let chapters = &mut arcs[arc_idx].chapters;
                let index = (*index).min(chapters.len());
                chapters.insert(index, Chapter::placeholder(title.clone(), url.clone()));
                tracing::debug!(
                    %title,
                    arc = %arcs[arc_idx].identifier,
                    index,
                    "inserted missing chapter"
                );
                applied += 1;
            }
        }
    }
    applied
}
