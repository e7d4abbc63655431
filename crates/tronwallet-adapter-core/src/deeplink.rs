use crate::ports::HostPort;

/// Hand-off into a wallet's mobile app. `template` holds a `{url}`
/// placeholder for the encoded current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeepLink {
    pub template: &'static str,
    /// User-agent fragment identifying the wallet's in-app browser.
    pub app_marker: Option<&'static str>,
}

impl DeepLink {
    pub const PLACEHOLDER: &'static str = "{url}";

    pub fn url_for(&self, page: &str) -> String {
        self.template
            .replace(Self::PLACEHOLDER, &urlencoding::encode(page))
    }

    pub fn inside_app(&self, user_agent: &str) -> bool {
        self.app_marker.is_some_and(|marker| {
            user_agent
                .to_ascii_lowercase()
                .contains(&marker.to_ascii_lowercase())
        })
    }
}

/// Redirects to the wallet app when a mobile page has no way to reach the
/// wallet in-page. Returns whether navigation happened; callers treat `true`
/// as "wallet not found" for this attempt.
pub fn redirect_if_needed(link: &DeepLink, host: &dyn HostPort, provider_present: bool) -> bool {
    if provider_present || !host.is_mobile() || link.inside_app(&host.user_agent()) {
        return false;
    }
    let target = link.url_for(&host.location_href());
    tracing::info!(%target, "redirecting to wallet app");
    host.navigate(&target);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINK: DeepLink = DeepLink {
        template: "https://link.example.com?source={url}",
        app_marker: Some("Trust"),
    };

    #[test]
    fn page_url_is_component_encoded() {
        assert_eq!(
            LINK.url_for("https://dapp.io/a b?x=1&y=2"),
            "https://link.example.com?source=https%3A%2F%2Fdapp.io%2Fa%20b%3Fx%3D1%26y%3D2"
        );
    }

    #[test]
    fn app_marker_is_case_insensitive() {
        assert!(LINK.inside_app("Mozilla/5.0 (iPhone) trustwallet/1.0"));
        assert!(!LINK.inside_app("Mozilla/5.0 (iPhone) Safari"));
    }

    #[test]
    fn unmarked_link_never_counts_as_inside_app() {
        let link = DeepLink {
            app_marker: None,
            ..LINK
        };
        assert!(!link.inside_app("Mozilla/5.0 (iPhone) trustwallet/1.0"));
    }
}
