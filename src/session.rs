// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scoped connection sessions.
//!
//! [`with_connection`] connects to a server, reads every controller, hands
//! the client and the snapshots to an action, and disconnects afterwards
//! whatever the action did. Every device read or write in the crate goes
//! through it.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use openrgb_bridge::controller::ControllerSnapshot;
//! use openrgb_bridge::manager::ServerConfig;
//! use openrgb_bridge::protocol::MemoryConnector;
//! use openrgb_bridge::session::with_connection;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let server = ServerConfig::new("PC", "127.0.0.1", 6742);
//! let connector = MemoryConnector::new();
//! connector.add_server(&server).add_controller(ControllerSnapshot::new(0, "Strip"));
//!
//! let names = with_connection(&connector, &server, Duration::from_secs(3), |_client, snapshots| {
//!     Box::pin(async move { snapshots.into_iter().map(|s| s.name).collect::<Vec<_>>() })
//! })
//! .await
//! .unwrap();
//!
//! assert_eq!(names, vec!["Strip".to_string()]);
//! # }
//! ```

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::controller::ControllerSnapshot;
use crate::error::ProtocolError;
use crate::manager::ServerConfig;
use crate::protocol::{Connector, WireClient};

/// A boxed future borrowing from the session.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Runs `action` on a fresh connection to `server`.
///
/// The connect attempt is abandoned after `timeout`, and so is the
/// enumeration of controllers that follows, each getting the full
/// `timeout`. The snapshots are passed to `action` together with the
/// client. The connection is closed before returning, even when the action
/// reports a failure through its own return value.
///
/// # Errors
///
/// Returns `ProtocolError` if the connection cannot be established or the
/// controllers cannot be enumerated within `timeout`. The action is not run
/// in either case. Both failures are logged as warnings.
pub async fn with_connection<C, F, R>(
    connector: &C,
    server: &ServerConfig,
    timeout: Duration,
    action: F,
) -> Result<R, ProtocolError>
where
    C: Connector,
    F: for<'a> FnOnce(&'a mut C::Client, Vec<ControllerSnapshot>) -> BoxFuture<'a, R> + Send,
    R: Send,
{
    let connected = tokio::time::timeout(timeout, connector.connect(server))
        .await
        .unwrap_or_else(|_| Err(timed_out(timeout)));
    let mut client = match connected {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!(server = %server, error = %e, "Unable to connect to OpenRGB SDK server");
            return Err(e);
        }
    };

    let enumerated = tokio::time::timeout(timeout, enumerate(&mut client))
        .await
        .unwrap_or_else(|_| Err(timed_out(timeout)));
    let snapshots = match enumerated {
        Ok(snapshots) => snapshots,
        Err(e) => {
            tracing::warn!(server = %server, error = %e, "Unable to read controllers");
            close(client, server).await;
            return Err(e);
        }
    };
    tracing::debug!(server = %server, controllers = snapshots.len(), "Session opened");

    let result = action(&mut client, snapshots).await;
    close(client, server).await;
    Ok(result)
}

fn timed_out(timeout: Duration) -> ProtocolError {
    ProtocolError::Timeout(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX))
}

async fn enumerate<W: WireClient>(client: &mut W) -> Result<Vec<ControllerSnapshot>, ProtocolError> {
    let count = client.controller_count().await?;
    let mut snapshots = Vec::with_capacity(usize::try_from(count).unwrap_or_default());
    for index in 0..count {
        snapshots.push(client.controller_data(index).await?);
    }
    Ok(snapshots)
}

async fn close<W: WireClient>(client: W, server: &ServerConfig) {
    if let Err(e) = client.disconnect().await {
        tracing::debug!(server = %server, error = %e, "Disconnect failed");
    }
}
