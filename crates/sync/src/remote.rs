// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The remote-apply contract.
//!
//! The sync engine never speaks to the data service itself. The host
//! application supplies a [`RemoteApply`] implementation that performs one
//! mutation and reports how it went.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use gs_core::{Payload, QueuedMutation, ServerRecord};

/// What happened when a mutation was sent to the server.
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    /// Applied. The server may return the stored record.
    Success(Option<Payload>),
    /// The server holds a version of the record that must be reconciled.
    Conflict(ServerRecord),
    /// Temporary failure (network, 5xx). Retried with backoff.
    Failure(String),
    /// The server refused the write for good. Never retried automatically.
    Rejected(String),
}

/// Applies a queued mutation against the remote data service.
pub trait RemoteApply: Send + Sync {
    fn apply<'a>(
        &'a self,
        item: &'a QueuedMutation,
    ) -> Pin<Box<dyn Future<Output = ApplyOutcome> + Send + 'a>>;
}

impl<R: RemoteApply + ?Sized> RemoteApply for Arc<R> {
    fn apply<'a>(
        &'a self,
        item: &'a QueuedMutation,
    ) -> Pin<Box<dyn Future<Output = ApplyOutcome> + Send + 'a>> {
        (**self).apply(item)
    }
}
