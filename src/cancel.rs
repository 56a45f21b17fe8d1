//! Cooperative cancellation and analyzer child-process tracking.
//!
//! Instead of process-wide signal handlers sprinkled across layers, a single
//! [`CancelToken`] is created by the caller (usually flipped from a
//! signal-hook thread) and passed into the scheduler, which checks it
//! between result waits. Every spawned analyzer process is registered in a
//! [`ProcessRegistry`] so the cancel path can kill all of them immediately
//! rather than waiting for them to finish.

use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::process::{Child, ExitStatus};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Shared cancellation flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
struct RegistryInner {
    next_id: u64,
    children: HashMap<u64, Child>,
}

/// Registry of live analyzer child processes.
///
/// Workers register each spawned child and poll it through the registry so
/// that the controlling thread can terminate every outstanding process on
/// cancellation. Entries stay in the map until the owning worker removes
/// them; `kill_all` reaps killed children but leaves the exit status
/// observable through `try_wait`.
#[derive(Clone, Default)]
pub struct ProcessRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl ProcessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly spawned child and return its registry id.
    pub fn register(&self, child: Child) -> Result<u64> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|e| anyhow!("process registry mutex poisoned: {}", e))?;
        let id = inner.next_id;
        inner.next_id += 1;
        inner.children.insert(id, child);
        Ok(id)
    }

    /// Non-blocking wait on a registered child.
    ///
    /// Returns `Ok(None)` while the child is still running. A child that was
    /// already reaped and removed counts as terminated by the cancel path
    /// and reports `Ok(Some(None))` (no exit status available).
    pub fn try_wait(&self, id: u64) -> Result<Option<Option<ExitStatus>>> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|e| anyhow!("process registry mutex poisoned: {}", e))?;
        match inner.children.get_mut(&id) {
            Some(child) => match child.try_wait()? {
                Some(status) => Ok(Some(Some(status))),
                None => Ok(None),
            },
            None => Ok(Some(None)),
        }
    }

    /// Remove a child from the registry once its owner is done with it.
    pub fn remove(&self, id: u64) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.children.remove(&id);
        }
    }

    /// Forcibly terminate every registered child. Best effort: kill and
    /// reap failures are ignored, the statuses stay observable for owners
    /// still polling.
    pub fn kill_all(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            for child in inner.children.values_mut() {
                let _ = child.kill();
                let _ = child.wait();
            }
        }
    }

    /// Number of children currently registered.
    pub fn len(&self) -> usize {
        self.inner.lock().map(|i| i.children.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::{Command, Stdio};

    #[test]
    fn test_cancel_token_flips_once() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());
        let clone = token.clone();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_registry_tracks_child_until_removed() {
        let registry = ProcessRegistry::new();
        let child = Command::new("true")
            .stdout(Stdio::null())
            .spawn()
            .expect("spawn true");
        let id = registry.register(child).unwrap();
        assert_eq!(registry.len(), 1);

        // Poll until the child exits.
        let status = loop {
            if let Some(status) = registry.try_wait(id).unwrap() {
                break status;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        };
        assert!(status.expect("status available").success());

        registry.remove(id);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_kill_all_terminates_long_running_child() {
        let registry = ProcessRegistry::new();
        let child = Command::new("sleep")
            .arg("30")
            .stdout(Stdio::null())
            .spawn()
            .expect("spawn sleep");
        let id = registry.register(child).unwrap();

        registry.kill_all();

        // The killed child must be observed as terminated, not running.
        let status = registry.try_wait(id).unwrap().expect("terminated");
        if let Some(status) = status {
            assert!(!status.success());
        }
        registry.remove(id);
    }
}
