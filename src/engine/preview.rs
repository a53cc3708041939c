use crate::engine::gateway::RemoteGateway;

/// Files above this size are not fetched for preview (8 MiB).
pub(crate) const PREVIEW_MAX_BYTES: u64 = 8 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PreviewOutcome {
    Content(Vec<u8>),
    Empty,
    /// Remote size in bytes; nothing was read.
    TooLarge(u64),
    Failed(String),
}

impl PreviewOutcome {
    pub(crate) fn is_binary(&self) -> bool {
        matches!(self, PreviewOutcome::Content(bytes) if bytes.contains(&0))
    }

    pub(crate) fn lines(&self) -> Vec<String> {
        match self {
            PreviewOutcome::Content(bytes) => String::from_utf8_lossy(bytes)
                .lines()
                .map(str::to_string)
                .collect(),
            PreviewOutcome::Empty | PreviewOutcome::TooLarge(_) | PreviewOutcome::Failed(_) => {
                Vec::new()
            }
        }
    }
}

pub(crate) fn fetch_preview(gateway: &dyn RemoteGateway, path: &str) -> PreviewOutcome {
    match gateway.file_size(path) {
        Ok(size) if size > PREVIEW_MAX_BYTES => return PreviewOutcome::TooLarge(size),
        Ok(_) => {}
        Err(err) => return PreviewOutcome::Failed(format!("{err:#}")),
    }
    match gateway.read_file(path) {
        Ok(bytes) if bytes.is_empty() => PreviewOutcome::Empty,
        Ok(bytes) => PreviewOutcome::Content(bytes),
        Err(err) => PreviewOutcome::Failed(format!("{err:#}")),
    }
}
