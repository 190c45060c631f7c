//! Walks the rows of one section, turning each food row into a raw item.

use nutrigrove_core::RawMenuItem;

use crate::detail::retrieve_detail;
use crate::dom::MenuDom;
use crate::error::ScraperError;
use crate::profile::{Pacing, SiteProfile, NON_FOOD_NAMES};
use crate::sections::Section;

/// Row handles of a section, in document order.
///
/// # Errors
///
/// Propagates the DOM error when rows cannot be listed.
pub async fn list_items<D: MenuDom>(
    dom: &D,
    section: &D::Node,
    profile: &SiteProfile,
) -> Result<Vec<D::Node>, ScraperError> {
    dom.select_within(section, &profile.selectors.row).await
}

/// The row's first cell, which carries the item name and click target.
///
/// # Errors
///
/// Propagates the DOM error when cells cannot be listed.
pub async fn primary_cell<D: MenuDom>(
    dom: &D,
    row: &D::Node,
    profile: &SiteProfile,
) -> Result<Option<D::Node>, ScraperError> {
    Ok(dom
        .select_within(row, &profile.selectors.cell)
        .await?
        .into_iter()
        .next())
}

/// Trimmed text of a row's primary cell.
///
/// # Errors
///
/// Propagates the DOM error when the text cannot be read.
pub async fn extract_name<D: MenuDom>(dom: &D, cell: &D::Node) -> Result<String, ScraperError> {
    Ok(dom.text(cell).await?.trim().to_string())
}

/// `true` for header and blank rows: `"Portion"`, `"Calories"`, or empty,
/// ignoring case.
#[must_use]
pub fn is_non_food(name: &str) -> bool {
    let lower = name.trim().to_lowercase();
    NON_FOOD_NAMES.contains(&lower.as_str())
}

/// Every food row of `section` as a raw item.
///
/// A row that fails is logged and skipped; a section whose rows cannot be
/// listed yields nothing.
pub async fn walk_section<D: MenuDom>(
    dom: &D,
    section: &Section<D::Node>,
    profile: &SiteProfile,
    pacing: &Pacing,
) -> Vec<RawMenuItem> {
    let rows = match list_items(dom, &section.node, profile).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::warn!(
                site = %profile.key,
                station = %section.label,
                index = section.index,
                error = %e,
                "could not list rows; skipping section"
            );
            return Vec::new();
        }
    };

    let mut items = Vec::new();
    for (row_index, row) in rows.iter().enumerate() {
        match walk_row(dom, row, &section.label, profile, pacing).await {
            Ok(Some(item)) => {
                tracing::debug!(
                    station = %section.label,
                    food = %item.food_name,
                    has_transcript = item.has_transcript(),
                    "item scraped"
                );
                items.push(item);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(
                    site = %profile.key,
                    station = %section.label,
                    row = row_index,
                    error = %e,
                    "row failed; continuing"
                );
            }
        }
    }
    items
}

async fn walk_row<D: MenuDom>(
    dom: &D,
    row: &D::Node,
    station: &str,
    profile: &SiteProfile,
    pacing: &Pacing,
) -> Result<Option<RawMenuItem>, ScraperError> {
    let Some(cell) = primary_cell(dom, row, profile).await? else {
        return Ok(None);
    };

    let name = extract_name(dom, &cell).await?;
    if is_non_food(&name) {
        return Ok(None);
    }

    let nutritional_info = retrieve_detail(dom, &cell, profile, pacing).await;
    Ok(Some(RawMenuItem {
        station_name: station.to_string(),
        food_name: name,
        nutritional_info,
    }))
}
