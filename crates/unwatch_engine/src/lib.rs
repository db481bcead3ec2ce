//! Unwatch engine: checkpoint storage, page access and effect execution.
mod adapter;
mod decode;
mod fetch;
mod listing;
mod notice;
mod persist;
mod ready;
mod runner;
mod status;
mod store;
mod types;

pub use adapter::{HtmlPageAdapter, HttpItemRemover, ItemRemover, PageAdapter};
pub use fetch::{FetchSettings, HttpPageLoader, PageLoader};
pub use listing::{ListingPage, ListingSelectors, DEFAULT_ITEM_SELECTOR, DEFAULT_NEXT_SELECTOR};
pub use notice::{ChannelNoticeSink, LogNoticeSink, NoticeSink};
pub use persist::{ensure_state_dir, AtomicFileWriter, PersistError};
pub use ready::{page_ready, PageReady, PageReadySignal};
pub use runner::{
    Navigator, PendingNavigation, RunEnd, RunnerHandle, RunnerSettings, StartAck, TaskRunner,
};
pub use status::{
    poll_until_idle, PollOutcome, StatusHandle, StatusSource, DEFAULT_POLL_CAP,
    DEFAULT_POLL_INTERVAL,
};
pub use store::{
    decode_checkpoint, encode_checkpoint, CheckpointStore, FileCheckpointStore,
    MemoryCheckpointStore, StoreError, CHECKPOINT_FILENAME,
};
pub use types::{
    FailureKind, FetchError, ItemHandle, LoadedPage, NavigationError, PageError, RemovalError,
};
