//! Process-wide shutdown signal shared by listeners, sockets and the
//! broadcaster.

use tokio::sync::watch;

/// Held by `main`; firing it stops every [`Shutdown`] waiter.
pub struct ShutdownTrigger(watch::Sender<bool>);

/// Cloneable waiter handed to each long-running task.
#[derive(Clone, Debug)]
pub struct Shutdown(watch::Receiver<bool>);

pub fn channel() -> (ShutdownTrigger, Shutdown) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger(tx), Shutdown(rx))
}

impl ShutdownTrigger {
    pub fn trigger(&self) {
        // No receivers left means nothing to stop.
        let _ = self.0.send(true);
    }
}

impl Shutdown {
    pub fn is_triggered(&self) -> bool {
        *self.0.borrow()
    }

    /// Resolves once shutdown is triggered. If the trigger is dropped without
    /// firing, this never resolves.
    pub async fn wait(mut self) {
        loop {
            if *self.0.borrow_and_update() {
                return;
            }
            if self.0.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}
