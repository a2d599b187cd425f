//! Error types for a sync run.

use thiserror::Error;

/// Why a sync step failed.
///
/// The remote clients report failures as [`eyre::Report`]s; the sync components wrap those as
/// [`SyncError::Upstream`] and add the two failure kinds that are decided locally.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The channel, or the videos in it, could not be found. Aborts the run.
    #[error("not found: {0}")]
    NotFound(String),

    /// A call to either remote platform failed (transport, authorization, quota, bad request).
    #[error("upstream error: {0:#}")]
    Upstream(#[source] eyre::Report),

    /// The destination table lacks a column that we refuse to create automatically.
    #[error("database schema error: {0}")]
    Schema(String),
}

impl SyncError {
    pub(crate) fn upstream<C>(e: eyre::Report, context: C) -> Self
    where
        C: std::fmt::Display + Send + Sync + 'static,
    {
        SyncError::Upstream(e.wrap_err(context))
    }
}
