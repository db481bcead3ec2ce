use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::{ItemHandle, PageError};

/// Removal links on the watches listing of the default host.
pub const DEFAULT_ITEM_SELECTOR: &str = "a.link-stop-watching";
pub const DEFAULT_NEXT_SELECTOR: &str = "a.pagination-next, a[rel=\"next\"], link[rel=\"next\"]";

/// CSS selectors contracting the host page's listing markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingSelectors {
    /// When set, a page without this element is not a listing page.
    pub container: Option<String>,
    pub item: String,
    pub next_page: String,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            container: None,
            item: DEFAULT_ITEM_SELECTOR.to_string(),
            next_page: DEFAULT_NEXT_SELECTOR.to_string(),
        }
    }
}

/// What a listing document offers: removable items and a way forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPage {
    pub location: String,
    pub items: Vec<ItemHandle>,
    pub next_page: Option<String>,
}

impl ListingPage {
    pub fn parse(
        location: &str,
        html: &str,
        selectors: &ListingSelectors,
    ) -> Result<Self, PageError> {
        let base = Url::parse(location).map_err(|_| PageError::InvalidLocation {
            location: location.to_string(),
        })?;
        let document = Html::parse_document(html);

        if let Some(container) = selectors.container.as_deref() {
            let selector = compile(container)?;
            if document.select(&selector).next().is_none() {
                return Err(PageError::UnexpectedShape {
                    selector: container.to_string(),
                });
            }
        }

        let item_selector = compile(&selectors.item)?;
        let items = document
            .select(&item_selector)
            .filter_map(|element| {
                let target = element
                    .value()
                    .attr("href")
                    .and_then(|href| resolve_url(href, &base))?;
                let label = text_of(element);
                Some((target, label))
            })
            .enumerate()
            .map(|(index, (target, label))| ItemHandle {
                index,
                target: target.into(),
                label,
            })
            .collect();

        let next_selector = compile(&selectors.next_page)?;
        let next_page = document
            .select(&next_selector)
            .filter(|element| !is_disabled(*element))
            .find_map(|element| {
                element
                    .value()
                    .attr("href")
                    .and_then(|href| resolve_url(href, &base))
            })
            .map(String::from);

        Ok(Self {
            location: location.to_string(),
            items,
            next_page,
        })
    }
}

fn compile(selector: &str) -> Result<Selector, PageError> {
    Selector::parse(selector).map_err(|err| PageError::InvalidSelector {
        selector: selector.to_string(),
        message: err.to_string(),
    })
}

fn text_of(element: ElementRef) -> Option<String> {
    let text = element
        .value()
        .attr("title")
        .map(str::to_string)
        .unwrap_or_else(|| element.text().collect::<Vec<_>>().join(" "));
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}

fn is_disabled(element: ElementRef) -> bool {
    let value = element.value();
    value.attr("disabled").is_some()
        || value
            .attr("aria-disabled")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
        || value.classes().any(|class| class == "disabled")
}

fn resolve_url(reference: &str, base: &Url) -> Option<Url> {
    let trimmed = reference.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    if trimmed.to_ascii_lowercase().starts_with("javascript:") {
        return None;
    }
    base.join(trimmed).ok()
}
