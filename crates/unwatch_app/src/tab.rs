//! Headless stand-in for a browser tab.
//!
//! Every page load builds a brand-new runner from the stored checkpoint,
//! exactly as a reloaded document would, and drops it once it navigates.

use std::sync::Arc;

use anyhow::Context;
use engine_logging::{engine_info, engine_warn};
use tokio::task::JoinHandle;
use unwatch_core::{ListingPolicy, ResumeOutcome, StatusSnapshot};
use unwatch_engine::{
    page_ready, CheckpointStore, HtmlPageAdapter, ItemRemover, ListingSelectors, PageLoader,
    PendingNavigation, RunEnd, RunnerSettings, StartAck, StatusHandle, StatusSource, TaskRunner,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabMode {
    /// Begin a fresh task on the first page.
    Start,
    /// Continue a stored task, as after an interrupted reload.
    Resume,
}

pub struct Tab<L, R, S> {
    loader: L,
    remover: R,
    store: S,
    policy: ListingPolicy,
    selectors: ListingSelectors,
    settings: RunnerSettings,
    status: StatusHandle,
}

impl<L, R, S> Tab<L, R, S>
where
    L: PageLoader + 'static,
    R: ItemRemover + Clone + 'static,
    S: CheckpointStore + Clone + 'static,
{
    pub fn new(
        loader: L,
        remover: R,
        store: S,
        policy: ListingPolicy,
        selectors: ListingSelectors,
        settings: RunnerSettings,
    ) -> Self {
        Self {
            loader,
            remover,
            store,
            policy,
            selectors,
            settings,
            status: StatusHandle::new(),
        }
    }

    pub fn status_handle(&self) -> StatusHandle {
        self.status.clone()
    }

    /// Run the tab in the background. Status reads as running from the moment
    /// this returns until the tab stops.
    pub fn spawn(
        self: Arc<Self>,
        location: String,
        mode: TabMode,
    ) -> JoinHandle<anyhow::Result<RunEnd>> {
        self.status.publish(StatusSnapshot {
            running: true,
            total_processed: 0,
        });
        tokio::spawn(async move { self.run(location, mode).await })
    }

    pub async fn run(&self, location: String, mode: TabMode) -> anyhow::Result<RunEnd> {
        let result = self.drive(location, mode).await;
        let last = self.status.status();
        self.status.publish(StatusSnapshot {
            running: false,
            total_processed: last.total_processed,
        });
        result
    }

    async fn drive(&self, mut location: String, mut mode: TabMode) -> anyhow::Result<RunEnd> {
        loop {
            let page = match self.loader.load(&location).await {
                Ok(page) => page,
                Err(err) => {
                    if mode == TabMode::Resume {
                        self.drop_stored_task();
                    }
                    return Err(err).with_context(|| format!("loading {location}"));
                }
            };
            engine_info!("Loaded {}", page.location);

            let (signal, ready) = page_ready();
            let navigation = PendingNavigation::new();
            let adapter = HtmlPageAdapter::new(page, self.selectors.clone(), self.remover.clone());
            let mut runner = TaskRunner::new(
                self.store.clone(),
                adapter,
                navigation.clone(),
                self.policy.clone(),
                self.settings.clone(),
            )
            .with_status_handle(self.status.clone());
            // The document is fully parsed once loaded.
            signal.fulfil();

            match mode {
                TabMode::Start => {
                    if runner.start() == StartAck::AlreadyRunning {
                        return Ok(RunEnd::Idle);
                    }
                }
                TabMode::Resume => {
                    if runner.resume_if_eligible(ready).await == ResumeOutcome::Idle {
                        return Ok(RunEnd::Idle);
                    }
                }
            }

            match runner.run_pending().await {
                RunEnd::Navigated { to } => {
                    location = navigation.take().unwrap_or(to);
                    mode = TabMode::Resume;
                }
                end => return Ok(end),
            }
        }
    }

    fn drop_stored_task(&self) {
        if let Err(err) = self.store.clear() {
            engine_warn!("Could not clear checkpoint after failed load: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use unwatch_core::{TaskCheckpoint, TaskError};
    use unwatch_engine::{FetchSettings, HttpItemRemover, HttpPageLoader, MemoryCheckpointStore};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn listing_html(ids: &[u32], next: Option<&str>) -> String {
        let mut html = String::from("<html><body><table id=\"watches\">");
        for id in ids {
            html.push_str(&format!(
                "<tr><td><a class=\"link-stop-watching\" href=\"/unwatch?id={id}\">Stop watching</a></td></tr>"
            ));
        }
        html.push_str("</table>");
        if let Some(next) = next {
            html.push_str(&format!("<a class=\"pagination-next\" href=\"{next}\">Next</a>"));
        }
        html.push_str("</body></html>");
        html
    }

    async fn mount_page(server: &MockServer, start: &str, body: String) {
        Mock::given(method("GET"))
            .and(path("/users/watches"))
            .and(query_param("start", start))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
            .mount(server)
            .await;
    }

    fn tab(
        server: &MockServer,
        store: MemoryCheckpointStore,
    ) -> Tab<HttpPageLoader, HttpItemRemover, MemoryCheckpointStore> {
        let policy = ListingPolicy::parse(&format!("{}/users/watches", server.uri())).unwrap();
        let settings = RunnerSettings {
            settle_delay: Duration::ZERO,
            ready_timeout: Duration::from_secs(1),
        };
        Tab::new(
            HttpPageLoader::new(FetchSettings::default()).unwrap(),
            HttpItemRemover::new(&FetchSettings::default()).unwrap(),
            store,
            policy,
            ListingSelectors::default(),
            settings,
        )
    }

    #[tokio::test]
    async fn tab_follows_pages_until_the_last() {
        let server = MockServer::start().await;
        mount_page(&server, "0", listing_html(&[1, 2], Some("/users/watches?start=20"))).await;
        mount_page(&server, "20", listing_html(&[3], None)).await;
        Mock::given(method("GET"))
            .and(path("/unwatch"))
            .respond_with(ResponseTemplate::new(200))
            .expect(3)
            .mount(&server)
            .await;

        let store = MemoryCheckpointStore::new();
        let tab = Arc::new(tab(&server, store.clone()));
        let status = tab.status_handle();
        let end = tab
            .spawn(format!("{}/users/watches?start=0", server.uri()), TabMode::Start)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(end, RunEnd::Completed { total: 3 });
        assert_eq!(store.load().unwrap(), TaskCheckpoint::inactive());
        assert_eq!(
            status.status(),
            StatusSnapshot {
                running: false,
                total_processed: 3
            }
        );
    }

    #[tokio::test]
    async fn resume_on_reloaded_page_is_refused() {
        let server = MockServer::start().await;
        mount_page(&server, "20", listing_html(&[3], None)).await;

        let store = MemoryCheckpointStore::new();
        store
            .save(&TaskCheckpoint {
                active: true,
                total_processed: 2,
                last_location: Some(format!("{}/users/watches?start=20", server.uri())),
            })
            .unwrap();

        let tab = tab(&server, store.clone());
        let end = tab
            .run(format!("{}/users/watches?start=20", server.uri()), TabMode::Resume)
            .await
            .unwrap();

        assert!(matches!(
            end,
            RunEnd::Abandoned {
                total: 2,
                error: TaskError::NavigationAmbiguous(_)
            }
        ));
        assert_eq!(store.raw(), None);
        assert_eq!(
            tab.status_handle().status(),
            StatusSnapshot {
                running: false,
                total_processed: 2
            }
        );
    }

    #[tokio::test]
    async fn failed_load_during_resume_drops_task() {
        let server = MockServer::start().await;
        let store = MemoryCheckpointStore::new();
        store
            .save(&TaskCheckpoint {
                active: true,
                total_processed: 2,
                last_location: Some(format!("{}/users/watches", server.uri())),
            })
            .unwrap();

        let tab = tab(&server, store.clone());
        let result = tab
            .run(format!("{}/users/watches?start=20", server.uri()), TabMode::Resume)
            .await;

        assert!(result.is_err());
        assert_eq!(store.raw(), None);
    }
}
