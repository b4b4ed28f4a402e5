use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};
use url::Url;

lazy_static! {
    static ref PARAGRAPHS: Selector = Selector::parse("body p").unwrap();
    static ref TITLE: Selector = Selector::parse("head > title").unwrap();
    static ref ANCHORS: Selector = Selector::parse("body a[href]").unwrap();
}

/// An outbound link along with its anchor text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub url: String,
    pub text: String,
}

/// What a crawl keeps from an html page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub text: String,
    pub title: String,
    pub links: Vec<Link>,
}

/// Extracts content from a parsed html document located at `url`.
pub struct HtmlExtractor {
    url: Option<Url>,
    document: Html,
}

impl HtmlExtractor {
    pub fn parse(url: &str, html: &str) -> Self {
        Self {
            url: Url::parse(url).ok(),
            document: Html::parse_document(html),
        }
    }

    /// Text of every `<p>` in the body, in document order, one paragraph per line.
    pub fn text(&self) -> String {
        self.document
            .select(&PARAGRAPHS)
            .map(inner_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The `<title>` of the document, empty when there is none.
    pub fn title(&self) -> String {
        self.document
            .select(&TITLE)
            .next()
            .map(|title| inner_text(title).trim().to_string())
            .unwrap_or_default()
    }

    /// Links of the body whose host is the host of the page itself.
    ///
    /// Relative links are resolved against the page url. Scheme and port are
    /// not compared.
    pub fn same_origin_links(&self) -> Vec<Link> {
        let Some(base) = &self.url else {
            return vec![];
        };
        let Some(host) = base.host_str() else {
            return vec![];
        };

        self.document
            .select(&ANCHORS)
            .filter_map(|a| {
                let href = a.value().attr("href")?;
                let url = resolve_link(base, href)?;
                (url.host_str() == Some(host)).then(|| Link {
                    url: url.to_string(),
                    text: inner_text(a).trim().to_string(),
                })
            })
            .collect()
    }

    pub fn into_page(self) -> Page {
        Page {
            text: self.text(),
            title: self.title(),
            links: self.same_origin_links(),
        }
    }
}

/// Parses `html` and keeps only what the crawl needs.
pub fn extract(url: &str, html: &str) -> Page {
    HtmlExtractor::parse(url, html).into_page()
}

fn inner_text(element: ElementRef) -> String {
    element.text().collect()
}

fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("javascript:")
    {
        return None;
    }
    base.join(href).ok()
}
