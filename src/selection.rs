use crate::error::Result;
use crate::scanner::ArchiveFile;

/// Yes/no decision for one archive.
pub trait Confirm {
    fn confirm(&mut self, archive: &ArchiveFile) -> Result<bool>;
}

impl<F> Confirm for F
where
    F: FnMut(&ArchiveFile) -> Result<bool>,
{
    fn confirm(&mut self, archive: &ArchiveFile) -> Result<bool> {
        self(archive)
    }
}

/// Picks the archives to extract, keeping scan order.
///
/// In bulk mode every candidate is taken and `confirm` is never called.
/// Otherwise each candidate is offered to `confirm` once; a prompt failure
/// stops selection and is returned to the caller.
pub fn select(
    candidates: Vec<ArchiveFile>,
    bulk: bool,
    confirm: &mut dyn Confirm,
) -> Result<Vec<ArchiveFile>> {
    if bulk {
        return Ok(candidates);
    }

    let mut selected = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if confirm.confirm(&candidate)? {
            tracing::debug!(archive = %candidate.name, "selected");
            selected.push(candidate);
        } else {
            tracing::debug!(archive = %candidate.name, "skipped");
        }
    }

    Ok(selected)
}
