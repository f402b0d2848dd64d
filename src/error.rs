use thiserror::Error;

/// Failures that abort a whole query. A query either fully succeeds or
/// fully fails; no partial results ride along with an error.
///
/// A single directory that can't be mapped to a crate is not an error at
/// all — see [`crate::resolve::Resolution::Skipped`].
#[derive(Debug, Error)]
pub enum Error {
    /// git could not be invoked, or refused the query.
    #[error("can't {action}: {detail}")]
    Vcs { action: String, detail: String },

    /// cargo could not be invoked, or refused the query.
    #[error("can't {action}: {detail}")]
    Cargo { action: String, detail: String },

    /// `cargo metadata` ran but produced output we can't decode. Only
    /// recursive queries consult the metadata, so plain diffs are immune.
    #[error("malformed cargo metadata: {source}")]
    Metadata {
        #[from]
        source: serde_json::Error,
    },
}
