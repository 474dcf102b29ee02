use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::book::OutputProfile;

const INSTALL_HINT: &str = "make sure pandoc is installed (https://pandoc.org/installing.html) \
to convert the generated Markdown file into an ebook; the Markdown file has been kept";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    /// The ebook was written and the flat file removed.
    Converted { ebook: PathBuf },
    /// Conversion failed; the flat file stays as the run's output.
    KeptFlat { flat: PathBuf, reason: String },
}

pub fn build_pandoc_args(profile: OutputProfile, flat: &Path, ebook: &Path) -> Vec<OsString> {
    let mut args = vec![flat.as_os_str().to_owned()];
    if profile == OutputProfile::Epub {
        args.extend(
            ["--from", "markdown+smart", "--epub-chapter-level", "2"].map(OsString::from),
        );
    }
    args.push(OsString::from("-o"));
    args.push(ebook.as_os_str().to_owned());
    args
}

/// Runs pandoc on the flat document. Conversion failure is reported through
/// the outcome, never as an error.
pub fn convert(
    pandoc: &str,
    profile: OutputProfile,
    flat: &Path,
    ebook: &Path,
) -> ConversionOutcome {
    let args = build_pandoc_args(profile, flat, ebook);
    tracing::info!(
        format = profile.extension(),
        pandoc,
        out = %ebook.display(),
        "converting markdown"
    );

    let reason = match Command::new(pandoc).args(&args).output() {
        Ok(output) if output.status.success() => {
            if let Err(err) = std::fs::remove_file(flat) {
                tracing::warn!(
                    flat = %flat.display(),
                    error = %err,
                    "could not remove converted markdown"
                );
            }
            tracing::info!(ebook = %ebook.display(), "conversion completed");
            return ConversionOutcome::Converted {
                ebook: ebook.to_path_buf(),
            };
        }
        Ok(output) => format!(
            "{pandoc} failed ({}): {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ),
        Err(err) => format!("run {pandoc}: {err}"),
    };

    tracing::warn!(
        flat = %flat.display(),
        %reason,
        "conversion failed; {INSTALL_HINT}"
    );
    ConversionOutcome::KeptFlat {
        flat: flat.to_path_buf(),
        reason,
    }
}
