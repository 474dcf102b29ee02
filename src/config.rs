//! Run configuration.
//!
//! There is no config file: the defaults are the production values and the
//! CLI only toggles annotations and the output profile. Library callers may
//! override any field.

use std::path::PathBuf;
use std::time::Duration;

use crate::book::{BookMeta, OutputProfile, RenderOptions};
use crate::cli::Cli;
use crate::corrections::{CORRECTIONS, Correction};
use crate::crawl::RetryPolicy;

pub const MAIN_SITE: &str = "https://parahumans.wordpress.com/";
pub const TABLE_OF_CONTENTS: &str = "https://parahumans.wordpress.com/table-of-contents/";

/// What happens to the run when a chapter exhausts its retries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Fail the whole run before anything is written.
    #[default]
    Abort,
    /// Keep going and render the chapter as unavailable.
    MarkUnavailable,
}

#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub contents_url: String,
    /// Applied to the classified skeleton before any chapter is fetched.
    pub corrections: Vec<Correction>,
    pub book: BookMeta,
    /// Directory the flat document and the ebook are written to.
    pub out_dir: PathBuf,
    /// File stem shared by `<stem>.md` and `<stem>.epub`/`<stem>.pdf`.
    pub file_stem: String,
    pub pandoc: String,
    pub retry: RetryPolicy,
    pub request_timeout: Duration,
    pub failure_policy: FailurePolicy,
    pub render: RenderOptions,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            contents_url: TABLE_OF_CONTENTS.to_owned(),
            corrections: CORRECTIONS.to_vec(),
            book: BookMeta {
                title: "Worm".to_owned(),
                author: "Wildbow".to_owned(),
                website: MAIN_SITE.to_owned(),
            },
            out_dir: PathBuf::from("."),
            file_stem: "Worm".to_owned(),
            pandoc: "pandoc".to_owned(),
            retry: RetryPolicy::default(),
            request_timeout: Duration::from_secs(30),
            failure_policy: FailurePolicy::default(),
            render: RenderOptions::default(),
        }
    }
}

impl ScrapeConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        let profile = if cli.pdf {
            OutputProfile::Pdf
        } else {
            OutputProfile::Epub
        };
        Self {
            render: RenderOptions {
                with_link: cli.with_link,
                with_tags: cli.with_tags,
                with_date: cli.with_date,
                profile,
            },
            ..Self::default()
        }
    }

    pub fn flat_path(&self) -> PathBuf {
        self.out_dir.join(format!("{}.md", self.file_stem))
    }

    pub fn ebook_path(&self) -> PathBuf {
        self.out_dir
            .join(format!("{}.{}", self.file_stem, self.render.profile.extension()))
    }
}
