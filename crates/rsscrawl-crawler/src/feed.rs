//! OPML and RSS documents, parsed into owned values.
//!
//! The parsed `sxd_document` trees never leave this module, so callers can
//! hold the results across await points.

use anyhow::{anyhow, Result};
use lazy_static::lazy_static;
use sxd_document::{dom, parser};
use sxd_xpath::nodeset::Node;
use sxd_xpath::{Context, Factory, Value};

lazy_static! {
    static ref XP_FACTORY: Factory = Factory::new();
}

/// The `<rss>` element of a feed document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RssChannel {
    pub version: Option<String>,
    pub items: Vec<RssItem>,
}

/// One `<item>`, `None` when the child element is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RssItem {
    pub title: Option<String>,
    pub link: Option<String>,
}

/// Returns the `xmlUrl` of every rss outline, in document order.
pub fn opml_feeds(xml: &str) -> Result<Vec<String>> {
    let package = parse(xml)?;
    let document = package.as_document();

    let feeds = select("//outline[@type='rss']", document.root())?
        .into_iter()
        .filter_map(|node| match node {
            Node::Element(outline) => outline.attribute_value("xmlUrl").map(str::to_string),
            _ => None,
        })
        .collect();

    Ok(feeds)
}

/// Returns the feed found in `xml`, or `None` when there is no `<rss>` element.
///
/// The feed root is the document element itself when it is `<rss>`, otherwise
/// the first nested `<rss>` element.
pub fn rss_channel(xml: &str) -> Result<Option<RssChannel>> {
    let package = parse(xml)?;
    let document = package.as_document();
    let root = document.root();

    let rss = match document_element(&root) {
        Some(element) if element.name().local_part() == "rss" => Some(element),
        _ => select("//rss", root)?
            .into_iter()
            .find_map(|node| match node {
                Node::Element(element) => Some(element),
                _ => None,
            }),
    };
    let Some(rss) = rss else {
        return Ok(None);
    };

    let mut items = vec![];
    for item in select(".//item", rss)? {
        items.push(RssItem {
            title: first_text("title", item)?,
            link: first_text("link", item)?,
        });
    }

    Ok(Some(RssChannel {
        version: rss.attribute_value("version").map(str::to_string),
        items,
    }))
}

fn parse(xml: &str) -> Result<sxd_document::Package> {
    parser::parse(xml).map_err(|e| anyhow!("Malformed XML: {e}"))
}

fn document_element<'d>(root: &dom::Root<'d>) -> Option<dom::Element<'d>> {
    root.children().into_iter().find_map(|child| child.element())
}

fn select<'d, N>(expr: &str, node: N) -> Result<Vec<Node<'d>>>
where
    N: Into<Node<'d>>,
{
    let xpath = XP_FACTORY
        .build(expr)?
        .ok_or_else(|| anyhow!("Missing XPath {expr}"))?;
    let context = Context::new();

    match xpath.evaluate(&context, node)? {
        Value::Nodeset(nodes) => Ok(nodes.document_order()),
        _ => Ok(vec![]),
    }
}

fn first_text<'d>(child: &str, node: Node<'d>) -> Result<Option<String>> {
    Ok(select(child, node)?
        .first()
        .map(|n| n.string_value().trim().to_string()))
}
