// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Registry file source contract.
//!
//! The registry lives in a file managed by the platform; an external watcher
//! owns reading it and noticing changes. The record set only ever sees bytes
//! and a change feed.

use async_trait::async_trait;
use tokio::sync::mpsc;

/// External source of registry payloads.
#[async_trait]
pub trait FileSource: Send + Sync {
    /// Most recent registry file contents.
    async fn get(&self) -> anyhow::Result<Vec<u8>>;

    /// Change feed: yields a value whenever the underlying file changed.
    ///
    /// Closing the channel signals a permanent end of updates; the record
    /// set's refresh worker shuts down and closes its own subscribers in
    /// response.
    fn subscribe(&self) -> mpsc::Receiver<bool>;
}
