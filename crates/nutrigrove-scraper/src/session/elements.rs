//! [`MenuDom`] over chromiumoxide elements.

use std::time::Duration;

use chromiumoxide::element::Element;
use tokio::time::Instant;

use super::BrowserSession;
use crate::dom::MenuDom;
use crate::error::ScraperError;

const WAIT_POLL: Duration = Duration::from_millis(250);
const PROBE_ATTR: &str = "data-nutrigrove-probe";

fn js_string(value: &str) -> Result<String, ScraperError> {
    serde_json::to_string(value).map_err(|e| ScraperError::Script(e.to_string()))
}

/// Run a function declaration against `node` and read back a string result.
async fn call_for_string(node: &Element, declaration: &str) -> Result<String, ScraperError> {
    let returned = node
        .call_js_fn(declaration, false)
        .await
        .map_err(|e| ScraperError::Script(e.to_string()))?;
    match returned.result.value {
        Some(serde_json::Value::String(s)) => Ok(s),
        other => Err(ScraperError::Script(format!(
            "expected a string result, got {other:?}"
        ))),
    }
}

impl MenuDom for BrowserSession {
    type Node = Element;

    async fn select_all(&self, selector: &str) -> Result<Vec<Element>, ScraperError> {
        Ok(self.page()?.find_elements(selector).await?)
    }

    async fn probe_path(&self, path: &str) -> Result<Option<Element>, ScraperError> {
        // XPath results cannot be handed back as element handles directly, so
        // the match is tagged and then located by attribute.
        let tag = format!("p{}", self.next_probe_tag());
        let js = format!(
            r"(() => {{
                const node = document.evaluate({path}, document, null,
                    XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue;
                if (!node || node.nodeType !== Node.ELEMENT_NODE) return '';
                node.setAttribute('{PROBE_ATTR}', {tag});
                return {tag};
            }})()",
            path = js_string(path)?,
            tag = js_string(&tag)?,
        );

        let found = match self.evaluate(&js).await? {
            serde_json::Value::String(found) if !found.is_empty() => found,
            _ => return Ok(None),
        };

        let selector = format!("[{PROBE_ATTR}=\"{found}\"]");
        Ok(self.page()?.find_elements(selector).await?.into_iter().next())
    }

    async fn select_within(
        &self,
        node: &Element,
        selector: &str,
    ) -> Result<Vec<Element>, ScraperError> {
        Ok(node.find_elements(selector).await?)
    }

    async fn ancestor_texts(
        &self,
        node: &Element,
        levels_up: usize,
        selector: &str,
    ) -> Result<Vec<String>, ScraperError> {
        let declaration = format!(
            r"function() {{
                let node = this;
                for (let i = 0; i < {levels_up}; i++) {{
                    if (!node.parentElement) return '[]';
                    node = node.parentElement;
                }}
                const texts = Array.from(node.querySelectorAll({selector}))
                    .map((el) => el.innerText || '');
                return JSON.stringify(texts);
            }}",
            selector = js_string(selector)?,
        );
        let encoded = call_for_string(node, &declaration).await?;
        serde_json::from_str(&encoded).map_err(|e| ScraperError::Script(e.to_string()))
    }

    async fn text(&self, node: &Element) -> Result<String, ScraperError> {
        Ok(node.inner_text().await?.unwrap_or_default())
    }

    async fn scroll_into_view(&self, node: &Element) -> Result<(), ScraperError> {
        node.call_js_fn(
            "function() { this.scrollIntoView({block: 'center'}); }",
            false,
        )
        .await
        .map_err(|e| ScraperError::Script(e.to_string()))?;
        Ok(())
    }

    async fn click(&self, node: &Element) -> Result<(), ScraperError> {
        node.click().await?;
        Ok(())
    }

    async fn force_click(&self, node: &Element) -> Result<(), ScraperError> {
        node.call_js_fn("function() { this.click(); }", false)
            .await
            .map_err(|e| ScraperError::Script(e.to_string()))?;
        Ok(())
    }

    async fn wait_for(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Option<Element>, ScraperError> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(found) = self.page()?.find_elements(selector).await?.into_iter().next() {
                return Ok(Some(found));
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(WAIT_POLL.min(deadline - now)).await;
        }
    }
}
