//! The DOM operations the menu walker needs, independent of how a page is
//! driven.
//!
//! [`crate::session::BrowserSession`] implements these over Chrome DevTools;
//! tests implement them over an in-memory tree.

use std::time::Duration;

use crate::error::ScraperError;
use crate::session::PageProbe;

#[allow(async_fn_in_trait)]
pub trait MenuDom {
    /// Handle to one element on the page.
    type Node;

    /// Every element matching a CSS selector, in document order.
    async fn select_all(&self, selector: &str) -> Result<Vec<Self::Node>, ScraperError>;

    /// The element at a positional XPath, or `None` when nothing is there.
    async fn probe_path(&self, path: &str) -> Result<Option<Self::Node>, ScraperError>;

    /// Descendants of `node` matching a CSS selector, in document order.
    async fn select_within(
        &self,
        node: &Self::Node,
        selector: &str,
    ) -> Result<Vec<Self::Node>, ScraperError>;

    /// Texts of the elements matching `selector` inside the ancestor
    /// `levels_up` levels above `node` (1 is the parent). Empty when the
    /// ancestor does not exist.
    async fn ancestor_texts(
        &self,
        node: &Self::Node,
        levels_up: usize,
        selector: &str,
    ) -> Result<Vec<String>, ScraperError>;

    /// Rendered text of `node`.
    async fn text(&self, node: &Self::Node) -> Result<String, ScraperError>;

    async fn scroll_into_view(&self, node: &Self::Node) -> Result<(), ScraperError>;

    /// A real pointer click at the element's position.
    async fn click(&self, node: &Self::Node) -> Result<(), ScraperError>;

    /// A script-dispatched click, for elements hidden behind overlays.
    async fn force_click(&self, node: &Self::Node) -> Result<(), ScraperError>;

    /// The first element matching `selector` to appear within `timeout`.
    async fn wait_for(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Option<Self::Node>, ScraperError>;
}

/// A navigable page: the DOM plus challenge probing.
#[allow(async_fn_in_trait)]
pub trait MenuPage: MenuDom + PageProbe {
    /// Load `url` and let client-side rendering settle.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Navigation`] when the page does not load.
    async fn navigate(&self, url: &str) -> Result<(), ScraperError>;
}
