use engine_logging::{engine_debug, engine_warn};

use crate::fetch::{build_client, map_reqwest_error};
use crate::{
    FailureKind, FetchError, FetchSettings, ItemHandle, ListingPage, ListingSelectors,
    LoadedPage, PageError, RemovalError,
};

/// The only access the runner has to the host page's markup.
///
/// Pagination cursors are read through `unwatch_core::ListingPolicy`, which
/// the runner holds alongside the adapter.
#[async_trait::async_trait]
pub trait PageAdapter: Send + Sync {
    /// Removable items currently on the page, queried fresh on every call.
    async fn items_on_page(&self) -> Result<Vec<ItemHandle>, PageError>;

    /// Perform one removal. No retry is attempted by the caller.
    async fn remove_item(&self, item: &ItemHandle) -> bool;

    /// Location behind the next-page control, if present and enabled.
    fn next_page_location(&self) -> Option<String>;

    fn current_listing_location(&self) -> String;
}

/// Performs one removal given the item's target.
#[async_trait::async_trait]
pub trait ItemRemover: Send + Sync {
    async fn remove(&self, item: &ItemHandle) -> Result<(), RemovalError>;
}

/// Removes an item by requesting its link target, as clicking it would.
#[derive(Debug, Clone)]
pub struct HttpItemRemover {
    client: reqwest::Client,
}

impl HttpItemRemover {
    pub fn new(settings: &FetchSettings) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_client(settings)?,
        })
    }
}

#[async_trait::async_trait]
impl ItemRemover for HttpItemRemover {
    async fn remove(&self, item: &ItemHandle) -> Result<(), RemovalError> {
        let failed = |kind: FailureKind| RemovalError {
            target: item.target.clone(),
            kind,
        };
        let url = reqwest::Url::parse(&item.target).map_err(|_| failed(FailureKind::InvalidUrl))?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| failed(map_reqwest_error(err).kind))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(failed(FailureKind::HttpStatus(status.as_u16())))
        }
    }
}

/// Page adapter over a loaded HTML document.
pub struct HtmlPageAdapter<R> {
    page: LoadedPage,
    selectors: ListingSelectors,
    remover: R,
}

impl<R: ItemRemover> HtmlPageAdapter<R> {
    pub fn new(page: LoadedPage, selectors: ListingSelectors, remover: R) -> Self {
        Self {
            page,
            selectors,
            remover,
        }
    }

    fn snapshot(&self) -> Result<ListingPage, PageError> {
        ListingPage::parse(&self.page.location, &self.page.html, &self.selectors)
    }
}

#[async_trait::async_trait]
impl<R: ItemRemover> PageAdapter for HtmlPageAdapter<R> {
    async fn items_on_page(&self) -> Result<Vec<ItemHandle>, PageError> {
        Ok(self.snapshot()?.items)
    }

    async fn remove_item(&self, item: &ItemHandle) -> bool {
        match self.remover.remove(item).await {
            Ok(()) => {
                engine_debug!("Removed {}", item.target);
                true
            }
            Err(err) => {
                engine_warn!("{}", err);
                false
            }
        }
    }

    fn next_page_location(&self) -> Option<String> {
        self.snapshot().ok().and_then(|page| page.next_page)
    }

    fn current_listing_location(&self) -> String {
        self.page.location.clone()
    }
}
