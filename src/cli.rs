use clap::Parser;

/// Build an up-to-date ebook of the serial web novel Worm, by Wildbow.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Save the book as a PDF instead of an EPUB.
    #[arg(long)]
    pub pdf: bool,

    /// Include a link to each chapter online.
    #[arg(long)]
    pub with_link: bool,

    /// Include the tags each chapter was posted under.
    #[arg(long)]
    pub with_tags: bool,

    /// Include the date each chapter was posted.
    #[arg(long)]
    pub with_date: bool,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_default_to_off() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from(["worm-scraper"])?;
        assert!(!cli.pdf && !cli.with_link && !cli.with_tags && !cli.with_date);

        let cli = Cli::try_parse_from(["worm-scraper", "--pdf", "--with-tags"])?;
        assert!(cli.pdf && cli.with_tags);
        assert!(!cli.with_link && !cli.with_date);
        Ok(())
    }
}
