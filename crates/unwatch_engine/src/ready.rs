use std::time::Duration;

use tokio::sync::oneshot;

/// Fulfilled by the navigation layer once the loaded page can be inspected.
#[derive(Debug)]
pub struct PageReadySignal(oneshot::Sender<()>);

/// Awaited by the runner before it inspects a freshly loaded page.
#[derive(Debug)]
pub struct PageReady(oneshot::Receiver<()>);

pub fn page_ready() -> (PageReadySignal, PageReady) {
    let (tx, rx) = oneshot::channel();
    (PageReadySignal(tx), PageReady(rx))
}

impl PageReadySignal {
    pub fn fulfil(self) {
        let _ = self.0.send(());
    }
}

impl PageReady {
    /// A signal that is already fulfilled.
    pub fn ready() -> Self {
        let (signal, ready) = page_ready();
        signal.fulfil();
        ready
    }

    /// True if the page became ready within `timeout`. A dropped signal
    /// counts as never ready.
    pub async fn wait(self, timeout: Duration) -> bool {
        matches!(tokio::time::timeout(timeout, self.0).await, Ok(Ok(())))
    }
}
