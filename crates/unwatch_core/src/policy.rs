use url::Url;

/// Query parameter carrying the page offset on the default listing.
pub const DEFAULT_CURSOR_PARAM: &str = "start";

/// Query parameter the runner appends to locations it navigates to itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutomationMarker {
    pub name: String,
    pub value: String,
}

impl AutomationMarker {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Parse a `name=value` pair. Returns `None` for an empty name.
    pub fn parse(raw: &str) -> Option<Self> {
        let (name, value) = raw.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self::new(name, value.trim()))
    }
}

/// Describes which locations belong to the listing and how page order is read
/// from them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPolicy {
    listing: Url,
    cursor_param: String,
    marker: Option<AutomationMarker>,
}

impl ListingPolicy {
    pub fn new(listing: Url) -> Self {
        Self {
            listing,
            cursor_param: DEFAULT_CURSOR_PARAM.to_string(),
            marker: None,
        }
    }

    pub fn parse(listing: &str) -> Result<Self, url::ParseError> {
        Url::parse(listing.trim()).map(Self::new)
    }

    pub fn with_cursor_param(mut self, name: impl Into<String>) -> Self {
        self.cursor_param = name.into();
        self
    }

    pub fn with_marker(mut self, marker: AutomationMarker) -> Self {
        self.marker = Some(marker);
        self
    }

    pub fn listing(&self) -> &Url {
        &self.listing
    }

    pub fn cursor_param(&self) -> &str {
        &self.cursor_param
    }

    pub fn marker(&self) -> Option<&AutomationMarker> {
        self.marker.as_ref()
    }

    /// Same scheme, host, port and path as the listing; the query is ignored.
    pub fn is_listing(&self, location: &Url) -> bool {
        location.scheme() == self.listing.scheme()
            && location.host_str() == self.listing.host_str()
            && location.port_or_known_default() == self.listing.port_or_known_default()
            && trim_path(location.path()) == trim_path(self.listing.path())
    }

    /// Page offset read from the cursor parameter. Non-numeric values count as
    /// absent.
    pub fn pagination_cursor(&self, location: &Url) -> Option<u64> {
        location
            .query_pairs()
            .find(|(name, _)| name == self.cursor_param.as_str())
            .and_then(|(_, value)| value.trim().parse().ok())
    }

    /// True when no marker is configured or the location carries it.
    pub fn has_marker(&self, location: &Url) -> bool {
        match &self.marker {
            None => true,
            Some(marker) => location.query_pairs().any(|(name, value)| {
                name == marker.name.as_str() && value == marker.value.as_str()
            }),
        }
    }

    /// Add the automation marker to a navigation target, replacing any
    /// previous value. Unparsable targets are returned unchanged.
    pub fn mark(&self, location: &str) -> String {
        let Some(marker) = &self.marker else {
            return location.to_string();
        };
        let Ok(mut url) = Url::parse(location) else {
            return location.to_string();
        };
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(name, _)| name != marker.name.as_str())
            .map(|(name, value)| (name.into_owned(), value.into_owned()))
            .collect();
        url.query_pairs_mut()
            .clear()
            .extend_pairs(kept)
            .append_pair(&marker.name, &marker.value);
        url.into()
    }
}

fn trim_path(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> ListingPolicy {
        ListingPolicy::parse("https://wiki.example.com/users/watches").unwrap()
    }

    #[test]
    fn listing_match_ignores_query_and_trailing_slash() {
        let policy = policy();
        let url = Url::parse("https://wiki.example.com/users/watches/?start=20").unwrap();
        assert!(policy.is_listing(&url));

        let other = Url::parse("https://wiki.example.com/spaces/DOC").unwrap();
        assert!(!policy.is_listing(&other));
    }

    #[test]
    fn cursor_is_read_from_configured_param() {
        let policy = policy().with_cursor_param("startIndex");
        let url = Url::parse("https://wiki.example.com/users/watches?startIndex=40").unwrap();
        assert_eq!(policy.pagination_cursor(&url), Some(40));

        let garbled = Url::parse("https://wiki.example.com/users/watches?startIndex=abc").unwrap();
        assert_eq!(policy.pagination_cursor(&garbled), None);
    }

    #[test]
    fn mark_replaces_existing_marker() {
        let policy = policy().with_marker(AutomationMarker::new("unwatch", "auto"));
        let marked = policy.mark("https://wiki.example.com/users/watches?start=20&unwatch=manual");
        assert_eq!(
            marked,
            "https://wiki.example.com/users/watches?start=20&unwatch=auto"
        );
        assert!(policy.has_marker(&Url::parse(&marked).unwrap()));
    }

    #[test]
    fn marker_parse_rejects_empty_name() {
        assert_eq!(AutomationMarker::parse("=auto"), None);
        assert_eq!(
            AutomationMarker::parse("unwatch=auto"),
            Some(AutomationMarker::new("unwatch", "auto"))
        );
    }
}
