use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use tokio::task::JoinSet;
use url::Url;

use crate::barrier::Completion;
use crate::config::{FailurePolicy, ScrapeConfig};
use crate::crawl::{HttpPageSource, PageSource};
use crate::export::ConversionOutcome;
use crate::extract::ChapterParser;
use crate::formats::{Paragraph, chapter_count, chapter_slots};

pub const UNAVAILABLE_NOTICE: &str = "*This chapter could not be retrieved.*";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub arcs: usize,
    pub chapters: usize,
    /// Contents links that matched no arc.
    pub dropped: usize,
    /// Chapters rendered with [`UNAVAILABLE_NOTICE`].
    pub unavailable: usize,
    pub flat_path: PathBuf,
    pub conversion: ConversionOutcome,
}

pub async fn run(config: ScrapeConfig) -> anyhow::Result<RunSummary> {
    let source = HttpPageSource::new(config.request_timeout).context("build page source")?;
    run_with_source(config, Arc::new(source)).await
}

/// Contents page -> skeleton -> concurrent chapter fetches -> flat document
/// -> conversion. Nothing is written unless every chapter task has reported.
pub async fn run_with_source(
    config: ScrapeConfig,
    source: Arc<dyn PageSource>,
) -> anyhow::Result<RunSummary> {
    let flat_path = config.flat_path();
    crate::book::ensure_output_does_not_exist(&flat_path).context("check book output")?;

    tracing::info!(url = %config.contents_url, "gathering links from table of contents");
    let contents_url = Url::parse(&config.contents_url).context("parse contents url")?;
    let contents_html = crate::crawl::fetch_contents(source.as_ref(), &contents_url).await?;
    let classification =
        crate::toc::parse_contents_page(&contents_html).context("parse table of contents")?;
    let dropped = classification.dropped.len();
    let mut arcs = classification.arcs;
    crate::corrections::apply(&mut arcs, &config.corrections);

    let total = chapter_count(&arcs);
    tracing::info!(
        arcs = arcs.len(),
        chapters = total,
        dropped,
        "starting to fetch chapters"
    );

    let parser = Arc::new(ChapterParser::new().context("compile chapter selectors")?);
    let (signal, barrier) = crate::barrier::channel(total);
    let mut tasks = JoinSet::new();
    for slot in chapter_slots(&arcs) {
        let chapter = arcs[slot.arc].chapters[slot.chapter].clone();
        let source = Arc::clone(&source);
        let parser = Arc::clone(&parser);
        let signal = signal.clone();
        let retry = config.retry;
        tasks.spawn(async move {
            let outcome =
                crate::crawl::fetch_chapter(source.as_ref(), &parser, chapter, retry).await;
            signal.complete(slot, outcome);
        });
    }
    drop(signal);

    // Returning early drops `tasks`, which aborts every chapter still in flight.
    let mut unavailable = 0;
    barrier
        .wait(|Completion { slot, outcome }| {
            let entry = &mut arcs[slot.arc].chapters[slot.chapter];
            match outcome {
                Ok(chapter) => *entry = chapter,
                Err(exhausted) => match config.failure_policy {
                    FailurePolicy::Abort => {
                        return Err(anyhow::Error::new(exhausted)
                            .context(format!("fetch chapter {}", entry.title)));
                    }
                    FailurePolicy::MarkUnavailable => {
                        tracing::warn!(
                            title = %entry.title,
                            error = %exhausted,
                            "chapter unavailable; continuing without it"
                        );
                        entry.url = exhausted.url;
                        entry.retries = exhausted.retries;
                        entry.paragraphs = vec![Paragraph::Text(UNAVAILABLE_NOTICE.to_owned())];
                        unavailable += 1;
                    }
                },
            }
            Ok(())
        })
        .await
        .context("wait for chapters")?;

    while let Some(joined) = tasks.join_next().await {
        joined.context("join chapter task")?;
    }

    tracing::info!(path = %flat_path.display(), "saving results to file");
    let document = crate::book::render(&config.book, &arcs, &config.render);
    crate::book::write_new(&flat_path, &document)?;

    let ebook_path = config.ebook_path();
    let conversion = tokio::task::spawn_blocking({
        let pandoc = config.pandoc.clone();
        let profile = config.render.profile;
        let flat_path = flat_path.clone();
        move || crate::export::convert(&pandoc, profile, &flat_path, &ebook_path)
    })
    .await
    .context("join conversion task")?;

    Ok(RunSummary {
        arcs: arcs.len(),
        chapters: total,
        dropped,
        unavailable,
        flat_path,
        conversion,
    })
}
