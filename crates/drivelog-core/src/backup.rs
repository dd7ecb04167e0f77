//! Periodic silent backup: exports the store to a sink at a fixed cadence as
//! a durability aid. Failures are logged and never block store operations.

use std::{
    sync::{
        mpsc::{self, RecvTimeoutError},
        Arc, Mutex,
    },
    thread,
    time::Duration,
};

use tracing::{debug, warn};

use crate::{
    storage::{ExportSink, KeyValueStore},
    store::RecordStore,
};

/// Default cadence between silent exports.
pub const DEFAULT_BACKUP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Handle to the background backup task. Dropping it (or calling
/// [`AutoBackup::shutdown`]) stops the timer and joins the thread.
pub struct AutoBackup {
    stop: mpsc::Sender<()>,
    handle: Option<thread::JoinHandle<()>>,
}

impl AutoBackup {
    /// Starts the backup timer. Each tick takes the store lock, snapshots an
    /// export document, and hands it to the sink; the lock is released before
    /// the sink writes so a slow sink never delays store callers.
    pub fn start<S>(
        store: Arc<Mutex<RecordStore<S>>>,
        sink: Arc<dyn ExportSink>,
        interval: Duration,
    ) -> Self
    where
        S: KeyValueStore + 'static,
    {
        let (stop, ticks) = mpsc::channel();
        let handle = thread::spawn(move || loop {
            match ticks.recv_timeout(interval) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {
                    let document = match store.lock() {
                        Ok(store) => store.export(),
                        Err(_) => break,
                    };
                    match sink.write_export(&document) {
                        Ok(()) => debug!(records = document.records.len(), "silent backup written"),
                        Err(err) => warn!(%err, "silent backup failed"),
                    }
                }
            }
        });
        Self {
            stop,
            handle: Some(handle),
        }
    }

    /// Stops issuing backups and waits for the task to finish.
    pub fn shutdown(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        let _ = self.stop.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for AutoBackup {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}
