//! Finds the menu sections ("stations") on a loaded page and labels them.

use crate::discovery::probe_sequence;
use crate::dom::MenuDom;
use crate::profile::{SectionLayout, SiteProfile, LABEL_SEARCH_LEVELS};

/// A discovered section and its resolved label.
#[derive(Debug)]
pub struct Section<N> {
    pub node: N,
    pub label: String,
    /// 1-based position in discovery order.
    pub index: usize,
}

/// Enumerate the page's sections according to the profile's layout.
///
/// Never fails: a layout that finds nothing yields an empty list, and a
/// section whose label cannot be resolved gets `"Station {index}"`.
pub async fn discover_sections<D: MenuDom>(
    dom: &D,
    profile: &SiteProfile,
) -> Vec<Section<D::Node>> {
    let nodes = match &profile.layout {
        SectionLayout::Tables => enumerate_tables(dom, profile).await,
        SectionLayout::Probed { path } => probe_sections(dom, path, profile.probe_limit).await,
        SectionLayout::Auto { path } => {
            let tables = enumerate_tables(dom, profile).await;
            match path {
                Some(path) if tables.is_empty() => {
                    tracing::debug!(site = %profile.key, "no tables found; probing sections");
                    probe_sections(dom, path, profile.probe_limit).await
                }
                _ => tables,
            }
        }
    };

    let mut sections = Vec::with_capacity(nodes.len());
    for (offset, node) in nodes.into_iter().enumerate() {
        let index = offset + 1;
        let label = resolve_label(dom, &node, &profile.selectors.heading, index).await;
        tracing::debug!(site = %profile.key, index, station = %label, "section discovered");
        sections.push(Section { node, label, index });
    }

    tracing::info!(site = %profile.key, count = sections.len(), "sections discovered");
    sections
}

async fn enumerate_tables<D: MenuDom>(dom: &D, profile: &SiteProfile) -> Vec<D::Node> {
    match dom.select_all(&profile.selectors.section).await {
        Ok(nodes) => nodes,
        Err(e) => {
            tracing::warn!(site = %profile.key, error = %e, "could not enumerate section tables");
            Vec::new()
        }
    }
}

async fn probe_sections<D: MenuDom>(dom: &D, template: &str, limit: usize) -> Vec<D::Node> {
    probe_sequence(limit, |index| {
        let path = template.replace("{index}", &index.to_string());
        async move { dom.probe_path(&path).await }
    })
    .await
}

/// Label for a section: the first heading text longer than two characters
/// found within up to [`LABEL_SEARCH_LEVELS`] ancestors, else
/// `"Station {index}"`.
pub async fn resolve_label<D: MenuDom>(
    dom: &D,
    node: &D::Node,
    heading_selector: &str,
    index: usize,
) -> String {
    for level in 1..=LABEL_SEARCH_LEVELS {
        match dom.ancestor_texts(node, level, heading_selector).await {
            Ok(texts) => {
                if let Some(label) = texts
                    .iter()
                    .map(|t| t.trim())
                    .find(|t| t.chars().count() > 2)
                {
                    return label.to_string();
                }
            }
            Err(e) => {
                tracing::debug!(index, level, error = %e, "heading search failed at this level");
            }
        }
    }
    format!("Station {index}")
}
