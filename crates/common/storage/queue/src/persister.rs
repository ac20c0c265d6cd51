// Copyright 2026 Duraq Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Background auto-persist worker.
//!
//! Runs on a dedicated thread for the lifetime of a persisting in-process
//! queue. The stop channel doubles as the sleep: `recv_timeout` with the
//! configured interval wakes up either because the interval elapsed (write
//! a snapshot) or because the queue signalled shutdown (exit).

use std::{sync::Arc, time::Duration};

use crossbeam::channel::{Receiver, RecvTimeoutError, Sender};
use tracing::{error, info};

use crate::queue::Shared;

pub(crate) struct PersistWorker {
    stop_rx:  Receiver<()>,
    done_tx:  Sender<()>,
    shared:   Arc<Shared>,
    interval: Duration,
}

impl PersistWorker {
    pub(crate) const fn new(
        stop_rx: Receiver<()>,
        done_tx: Sender<()>,
        shared: Arc<Shared>,
        interval: Duration,
    ) -> Self {
        Self {
            stop_rx,
            done_tx,
            shared,
            interval,
        }
    }

    /// Main loop. A failed periodic save is logged and the next cycle still
    /// runs; only the stop signal (or a dropped sender) ends the loop.
    pub(crate) fn run(self) {
        info!(interval = ?self.interval, "auto-persist worker started");

        loop {
            match self.stop_rx.recv_timeout(self.interval) {
                Err(RecvTimeoutError::Timeout) => {
                    if let Err(e) = self.shared.write_snapshot() {
                        error!(error = ?e, "periodic snapshot failed");
                    }
                }
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        let _ = self.done_tx.send(());
        info!("auto-persist worker stopped");
    }
}
