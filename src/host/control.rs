use super::Host;
use crate::core::{Identity, RestoreError, Result};
use std::future::Future;
use tokio::sync::{mpsc, oneshot};

type ControlTask = Box<dyn FnOnce(&mut dyn Host) + Send + 'static>;

/// Creates a connected handle/loop pair.
pub fn control_channel() -> (ControlHandle, ControlLoop) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ControlHandle { tx }, ControlLoop { rx })
}

/// Sending side: queues work for the host control context from any thread.
#[derive(Clone)]
pub struct ControlHandle {
    tx: mpsc::UnboundedSender<ControlTask>,
}

impl ControlHandle {
    /// Queues `task` without waiting for it to run.
    pub fn submit<F>(&self, task: F) -> Result<()>
    where
        F: FnOnce(&mut dyn Host) + Send + 'static,
    {
        self.tx
            .send(Box::new(task))
            .map_err(|_| RestoreError::ControlClosed)
    }

    /// Runs `f` on the control context and waits for its result.
    pub async fn call<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut dyn Host) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.submit(move |host| {
            let _ = reply_tx.send(f(host));
        })?;
        reply_rx.await.map_err(|_| RestoreError::ControlClosed)
    }

    pub async fn is_online(&self, identity: Identity) -> Result<bool> {
        self.call(move |host| host.is_online(&identity)).await
    }

    /// Disconnects `identity` if it is online. Returns whether it was.
    pub async fn disconnect_if_online(&self, identity: Identity, message: String) -> Result<bool> {
        self.call(move |host| {
            if host.is_online(&identity) {
                host.disconnect(&identity, &message);
                true
            } else {
                false
            }
        })
        .await
    }

    pub fn send_message(&self, identity: Identity, message: String) -> Result<()> {
        self.submit(move |host| host.send_message(&identity, &message))
    }
}

/// Receiving side, owned by whoever drives the host.
pub struct ControlLoop {
    rx: mpsc::UnboundedReceiver<ControlTask>,
}

impl ControlLoop {
    /// Runs every task queued so far. Meant to be called once per host tick.
    pub fn run_pending(&mut self, host: &mut dyn Host) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.rx.try_recv() {
            task(&mut *host);
            ran += 1;
        }
        ran
    }

    /// Runs tasks as they arrive until every handle is dropped.
    pub async fn run(mut self, host: &mut dyn Host) {
        while let Some(task) = self.rx.recv().await {
            task(&mut *host);
        }
    }

    /// Runs tasks while `until` is pending, then drains what is left.
    pub async fn run_until<F: Future>(&mut self, host: &mut dyn Host, until: F) -> F::Output {
        tokio::pin!(until);
        loop {
            tokio::select! {
                biased;
                output = &mut until => {
                    self.run_pending(&mut *host);
                    return output;
                }
                Some(task) = self.rx.recv() => task(&mut *host),
            }
        }
    }
}
