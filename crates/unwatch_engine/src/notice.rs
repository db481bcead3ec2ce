use std::sync::mpsc;

use engine_logging::{engine_info, engine_warn};
use unwatch_core::Notice;

/// Receives user-facing notices from the runner.
pub trait NoticeSink: Send + Sync {
    fn emit(&self, notice: Notice);
}

pub struct ChannelNoticeSink {
    tx: mpsc::Sender<Notice>,
}

impl ChannelNoticeSink {
    pub fn new(tx: mpsc::Sender<Notice>) -> Self {
        Self { tx }
    }
}

impl NoticeSink for ChannelNoticeSink {
    fn emit(&self, notice: Notice) {
        let _ = self.tx.send(notice);
    }
}

/// Default sink: writes notices to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNoticeSink;

impl NoticeSink for LogNoticeSink {
    fn emit(&self, notice: Notice) {
        match notice {
            Notice::Started => engine_info!("Unwatch task started"),
            Notice::AlreadyRunning => engine_info!("Unwatch task already running"),
            Notice::Resumed { total } => {
                engine_info!("Resumed unwatch task ({} removed so far)", total)
            }
            Notice::Abandoned { total, reason } => engine_warn!(
                "Dropped interrupted unwatch task after {} removals: {}",
                total,
                reason.to_error()
            ),
            Notice::Navigating { to, total } => {
                engine_info!("Moving to next page {} ({} removed so far)", to, total)
            }
            Notice::Completed { total } => {
                engine_info!("Finished: {} watches removed in total", total)
            }
            Notice::Aborted { total, error } => {
                engine_warn!("Stopped after {} removals: {}", total, error)
            }
        }
    }
}
