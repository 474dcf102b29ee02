/// Dependencies stay at `warn`; progress from this crate shows at `info`.
const DEFAULT_FILTER: &str = "warn,worm_scraper=info";

fn build_filter(directives: Option<&str>) -> tracing_subscriber::EnvFilter {
    directives
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| tracing_subscriber::EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| tracing_subscriber::EnvFilter::new(DEFAULT_FILTER))
}

pub fn init() -> anyhow::Result<()> {
    let directives = std::env::var(tracing_subscriber::EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(directives.as_deref());

    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("initialize tracing subscriber: {err}"))?;

    if let Some(directives) = directives
        && !directives.trim().is_empty()
        && tracing_subscriber::EnvFilter::try_new(&directives).is_err()
    {
        tracing::warn!(%directives, "ignoring invalid RUST_LOG; using {DEFAULT_FILTER}");
    }

    Ok(())
}

/// Plain-text log sink for asserting on events emitted by the current thread.
#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct CapturedLogs(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

#[cfg(test)]
impl CapturedLogs {
    pub(crate) fn contents(&self) -> String {
        let bytes = self.0.lock().expect("captured logs lock");
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

#[cfg(test)]
impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().expect("captured logs lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Routes this thread's events at `debug` and above into a buffer until the
/// guard is dropped.
#[cfg(test)]
pub(crate) fn capture() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_writer(move || writer.clone())
        .finish();
    (logs, tracing::subscriber::set_default(subscriber))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_directives_fall_back_to_the_default_filter() {
        let filter = build_filter(Some("worm_scraper=loud")).to_string();
        assert_eq!(filter, build_filter(None).to_string());
        assert!(filter.contains("worm_scraper=info"), "{filter}");
    }

    #[test]
    fn valid_directives_replace_the_default_filter() {
        let filter = build_filter(Some("debug")).to_string();
        assert!(filter.contains("debug"), "{filter}");
        assert!(!filter.contains("worm_scraper"), "{filter}");
        assert_eq!(build_filter(Some("  ")).to_string(), build_filter(None).to_string());
    }
}
