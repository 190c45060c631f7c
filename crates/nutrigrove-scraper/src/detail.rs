//! The click, wait, read, close protocol against an item's nutrition popup.
//!
//! Every step degrades to "no data": a missing click target, a failed click,
//! or a popup that never appears all yield [`NUTRITION_UNAVAILABLE`].

use nutrigrove_core::NUTRITION_UNAVAILABLE;

use crate::dom::MenuDom;
use crate::profile::{Pacing, SiteProfile};

/// Open the popup for the row whose primary cell is `cell` and return its
/// text. Never fails.
pub async fn retrieve_detail<D: MenuDom>(
    dom: &D,
    cell: &D::Node,
    profile: &SiteProfile,
    pacing: &Pacing,
) -> String {
    let Some(target) = find_clickable(dom, cell, profile).await else {
        tracing::debug!("no click target in row");
        return NUTRITION_UNAVAILABLE.to_string();
    };

    if let Err(e) = dom.scroll_into_view(&target).await {
        tracing::debug!(error = %e, "scroll into view failed");
    }
    tokio::time::sleep(pacing.scroll_settle).await;

    if let Err(e) = dom.click(&target).await {
        tracing::debug!(error = %e, "click failed; trying script click");
        if let Err(e) = dom.force_click(&target).await {
            tracing::warn!(error = %e, "script click failed");
            return NUTRITION_UNAVAILABLE.to_string();
        }
    }
    tokio::time::sleep(pacing.click_settle).await;

    let transcript = read_popup(dom, profile, pacing).await;

    dismiss_popup(dom, profile).await;
    tokio::time::sleep(pacing.close_settle).await;

    transcript.unwrap_or_else(|| NUTRITION_UNAVAILABLE.to_string())
}

async fn find_clickable<D: MenuDom>(
    dom: &D,
    cell: &D::Node,
    profile: &SiteProfile,
) -> Option<D::Node> {
    for selector in &profile.selectors.clickable {
        match dom.select_within(cell, selector).await {
            Ok(found) => {
                if let Some(node) = found.into_iter().next() {
                    return Some(node);
                }
            }
            Err(e) => tracing::debug!(selector = %selector, error = %e, "click target lookup failed"),
        }
    }
    None
}

/// Text of the first popup candidate to appear with non-empty text.
async fn read_popup<D: MenuDom>(
    dom: &D,
    profile: &SiteProfile,
    pacing: &Pacing,
) -> Option<String> {
    for selector in &profile.selectors.popup {
        let popup = match dom.wait_for(selector, pacing.popup_wait).await {
            Ok(Some(popup)) => popup,
            Ok(None) => continue,
            Err(e) => {
                tracing::debug!(selector = %selector, error = %e, "popup lookup failed");
                continue;
            }
        };
        match dom.text(&popup).await {
            Ok(text) if !text.trim().is_empty() => return Some(text),
            Ok(_) => tracing::debug!(selector = %selector, "popup candidate has no text"),
            Err(e) => tracing::debug!(selector = %selector, error = %e, "could not read popup text"),
        }
    }
    tracing::debug!("no popup appeared");
    None
}

/// Click the first close control that can be clicked. Failure is logged only.
async fn dismiss_popup<D: MenuDom>(dom: &D, profile: &SiteProfile) {
    for selector in &profile.selectors.close {
        let Ok(found) = dom.select_all(selector).await else {
            continue;
        };
        let Some(control) = found.into_iter().next() else {
            continue;
        };
        match dom.click(&control).await {
            Ok(()) => return,
            Err(e) => tracing::debug!(selector = %selector, error = %e, "close control not clickable"),
        }
    }
    tracing::debug!("popup could not be dismissed");
}
