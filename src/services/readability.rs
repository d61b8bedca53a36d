// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Readability pre-filter: find the subtree holding a page's main content
//! and strip page chrome before Markdown conversion.
//!
//! Every fact the heuristic needs is computed in four linear passes over the
//! nodes in document order, so the cost grows with the node count only.

use scraper::{ElementRef, Html, Node, StrTendril};
use std::collections::HashMap;
use thiserror::Error;
use url::Url;

/// Deepest nesting accepted for conversion
pub const MAX_DEPTH: usize = 256;

/// Elements that never carry readable content
const SKIPPED_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "iframe", "svg", "canvas", "object", "embed",
    "head", "nav", "aside", "form", "button", "select", "textarea", "input", "dialog",
];

/// class/id tokens marking page chrome
const BOILERPLATE_TOKENS: &[&str] = &[
    "ad", "ads", "advert", "advertisement", "banner", "breadcrumb", "breadcrumbs", "comment",
    "comments", "cookie", "cookies", "footer", "menu", "nav", "navbar", "navigation", "popup",
    "promo", "related", "share", "sidebar", "social", "sponsor", "sponsored", "subscribe",
];

/// class/id tokens that override a boilerplate match
const CONTENT_TOKENS: &[&str] = &["article", "body", "content", "entry", "main", "post", "story"];

const BOILERPLATE_ROLES: &[&str] = &[
    "navigation",
    "banner",
    "contentinfo",
    "complementary",
    "search",
    "dialog",
];

/// Attributes holding links that are made absolute
const LINK_ATTRS: &[&str] = &["href", "src"];

/// Paragraphs shorter than this do not vote for a container
const MIN_PARAGRAPH_CHARS: usize = 25;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("document nesting exceeds {limit} levels")]
    TooDeep { limit: usize },
}

/// Cleaned HTML ready for Markdown conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// The primary content, when one subtree stands out
    pub primary: Option<String>,
    /// `<body>` with page chrome removed
    pub document: String,
    /// First `<h1>` of the page when the primary content lacks one
    pub headline: Option<String>,
}

/// What the passes learn about one node.
struct NodeFacts<'a> {
    element: Option<ElementRef<'a>>,
    parent: Option<usize>,
    own_chars: usize,
    own_commas: usize,
    in_link: bool,
    has_heading: bool,
    has_h1: bool,
    boilerplate: bool,
    chars: usize,
    linked: usize,
    commas: usize,
}

impl<'a> NodeFacts<'a> {
    fn name(&self) -> &'a str {
        self.element.map_or("", |e| e.value().name())
    }

    fn link_density(&self) -> f64 {
        if self.chars == 0 {
            1.0
        } else {
            self.linked as f64 / self.chars as f64
        }
    }
}

fn tokens(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(|token| token.to_ascii_lowercase())
}

/// Whether `element` itself is scripting, navigation or other page chrome.
fn is_boilerplate(element: ElementRef<'_>, has_heading: bool) -> bool {
    let el = element.value();
    let name = el.name();

    if SKIPPED_TAGS.contains(&name) {
        return true;
    }
    match name {
        "footer" => return true,
        "header" => return !has_heading,
        _ => {}
    }
    if el.attr("hidden").is_some() || el.attr("aria-hidden") == Some("true") {
        return true;
    }
    if let Some(role) = el.attr("role") {
        if BOILERPLATE_ROLES.contains(&role.trim().to_ascii_lowercase().as_str()) {
            return true;
        }
    }

    let names: Vec<String> = el.classes().chain(el.id()).flat_map(tokens).collect();
    let chrome = names.iter().any(|t| BOILERPLATE_TOKENS.contains(&t.as_str()));
    let content = names.iter().any(|t| CONTENT_TOKENS.contains(&t.as_str()));
    chrome && !content
}

/// Collect per-node facts in document order.
fn analyse(document: &Html) -> Result<Vec<NodeFacts<'_>>, ExtractError> {
    let mut facts: Vec<NodeFacts<'_>> = Vec::new();
    let mut depths: Vec<usize> = Vec::new();
    let mut index = HashMap::new();

    for node in document.tree.root().descendants() {
        index.insert(node.id(), facts.len());
        let parent = node.parent().and_then(|p| index.get(&p.id()).copied());

        let depth = parent.map_or(0, |p| depths[p] + 1);
        if depth > MAX_DEPTH {
            return Err(ExtractError::TooDeep { limit: MAX_DEPTH });
        }

        let element = ElementRef::wrap(node);
        let (own_chars, own_commas) = match node.value() {
            Node::Text(text) => (text.trim().chars().count(), text.matches(',').count()),
            _ => (0, 0),
        };
        let in_link = parent.is_some_and(|p| facts[p].in_link)
            || element.is_some_and(|e| e.value().name() == "a");

        depths.push(depth);
        facts.push(NodeFacts {
            element,
            parent,
            own_chars,
            own_commas,
            in_link,
            has_heading: false,
            has_h1: false,
            boilerplate: false,
            chars: 0,
            linked: 0,
            commas: 0,
        });
    }

    // Children follow their parent, so a reverse sweep sees every subtree
    // before its root and a forward sweep sees every parent first.
    for i in (0..facts.len()).rev() {
        let name = facts[i].name();
        let heading =
            facts[i].has_heading || matches!(name, "h1" | "h2" | "h3" | "h4" | "h5" | "h6");
        let h1 = facts[i].has_h1 || name == "h1";
        facts[i].has_heading = heading;
        facts[i].has_h1 = h1;
        if let Some(p) = facts[i].parent {
            facts[p].has_heading |= heading;
            facts[p].has_h1 |= h1;
        }
    }

    for i in 0..facts.len() {
        let inherited = facts[i].parent.is_some_and(|p| facts[p].boilerplate);
        facts[i].boilerplate = inherited
            || facts[i]
                .element
                .is_some_and(|e| is_boilerplate(e, facts[i].has_heading));
    }

    for i in (0..facts.len()).rev() {
        if facts[i].boilerplate {
            continue;
        }
        let fact = &mut facts[i];
        fact.chars += fact.own_chars;
        fact.commas += fact.own_commas;
        if fact.in_link {
            fact.linked += fact.own_chars;
        }
        let (parent, chars, linked, commas) = (fact.parent, fact.chars, fact.linked, fact.commas);
        if let Some(p) = parent {
            facts[p].chars += chars;
            facts[p].linked += linked;
            facts[p].commas += commas;
        }
    }

    Ok(facts)
}

/// A single `<article>`, otherwise `<main>` or `[role=main]`.
fn semantic_root(facts: &[NodeFacts<'_>]) -> Option<usize> {
    let articles: Vec<usize> = (0..facts.len())
        .filter(|&i| facts[i].name() == "article" && !facts[i].boilerplate)
        .collect();
    if let [article] = articles.as_slice() {
        if facts[*article].chars > 0 {
            return Some(*article);
        }
    }

    (0..facts.len()).find(|&i| {
        let fact = &facts[i];
        let main = fact.name() == "main"
            || fact.element.and_then(|e| e.value().attr("role")) == Some("main");
        main && !fact.boilerplate && fact.chars > 0
    })
}

/// Score containers by the paragraphs they hold, discounted by link density.
fn best_scored(facts: &[NodeFacts<'_>]) -> Option<usize> {
    let mut scores: HashMap<usize, f64> = HashMap::new();
    let mut candidates = Vec::new();

    for paragraph in facts {
        if paragraph.boilerplate
            || paragraph.chars < MIN_PARAGRAPH_CHARS
            || !matches!(paragraph.name(), "p" | "pre" | "td" | "blockquote")
        {
            continue;
        }
        let score =
            1.0 + paragraph.commas as f64 + (paragraph.chars / 100).min(3) as f64;

        let parent = paragraph.parent;
        let grandparent = parent.and_then(|p| facts[p].parent);
        for (ancestor, weight) in [(parent, 1.0), (grandparent, 0.5)] {
            let Some(ancestor) = ancestor else { continue };
            if matches!(facts[ancestor].name(), "" | "html") {
                continue;
            }
            let entry = scores.entry(ancestor).or_insert_with(|| {
                candidates.push(ancestor);
                0.0
            });
            *entry += score * weight;
        }
    }

    let mut best: Option<(usize, f64)> = None;
    for candidate in candidates {
        let score = scores.get(&candidate).copied().unwrap_or_default()
            * (1.0 - facts[candidate].link_density());
        match best {
            Some((_, best_score)) if best_score >= score => {}
            _ => best = Some((candidate, score)),
        }
    }

    best.filter(|(_, score)| *score > 0.0)
        .map(|(index, _)| index)
}

/// `<body>`, or the document element when there is none.
fn fallback_root(facts: &[NodeFacts<'_>]) -> Option<usize> {
    (0..facts.len())
        .find(|&i| facts[i].name() == "body")
        .or_else(|| (0..facts.len()).find(|&i| facts[i].element.is_some()))
}

/// Collapsed text of the first non-chrome `<h1>`.
fn first_headline(facts: &[NodeFacts<'_>]) -> Option<String> {
    facts
        .iter()
        .filter(|fact| fact.name() == "h1" && !fact.boilerplate)
        .filter_map(|fact| fact.element)
        .map(|e| e.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" "))
        .find(|text| !text.is_empty())
}

/// Outermost chrome nodes; removing them removes all chrome.
fn chrome_roots(facts: &[NodeFacts<'_>]) -> Vec<usize> {
    (0..facts.len())
        .filter(|&i| {
            facts[i].boilerplate && !facts[i].parent.is_some_and(|p| facts[p].boilerplate)
        })
        .collect()
}

/// Link attributes outside chrome that change when resolved against `base`.
fn resolved_links(facts: &[NodeFacts<'_>], base: &Url) -> Vec<(usize, &'static str, String)> {
    let mut links = Vec::new();
    for (i, fact) in facts.iter().enumerate() {
        let Some(element) = fact.element.filter(|_| !fact.boilerplate) else {
            continue;
        };
        for &attr in LINK_ATTRS {
            let Some(value) = element.value().attr(attr) else {
                continue;
            };
            if let Ok(absolute) = base.join(value.trim()) {
                if absolute.as_str() != value {
                    links.push((i, attr, absolute.to_string()));
                }
            }
        }
    }
    links
}

/// Parse `html`, drop page chrome, resolve links against `base_url` and
/// serialize the primary content and the cleaned body.
///
/// Documents nested deeper than [`MAX_DEPTH`] are rejected.
pub fn extract(html: &str, base_url: Option<&Url>) -> Result<Extraction, ExtractError> {
    let mut document = Html::parse_document(html);

    let (chrome, links, primary, root, headline) = {
        let facts = analyse(&document)?;
        let primary = semantic_root(&facts).or_else(|| best_scored(&facts));
        let headline = primary
            .filter(|&p| !facts[p].has_h1)
            .and_then(|_| first_headline(&facts));
        let id = |i: usize| facts[i].element.map(|e| e.id());

        let chrome: Vec<_> = chrome_roots(&facts).into_iter().filter_map(id).collect();
        let links: Vec<_> = base_url
            .map(|base| resolved_links(&facts, base))
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(i, attr, value)| Some((id(i)?, attr, value)))
            .collect();

        (chrome, links, primary.and_then(id), fallback_root(&facts).and_then(id), headline)
    };

    for (node, attr, value) in links {
        if let Some(mut node) = document.tree.get_mut(node) {
            if let Node::Element(element) = node.value() {
                for (name, current) in element.attrs.iter_mut() {
                    if &*name.local == attr {
                        *current = StrTendril::from(value.as_str());
                    }
                }
            }
        }
    }
    for node in chrome {
        if let Some(mut node) = document.tree.get_mut(node) {
            node.detach();
        }
    }

    let render = |node| document.tree.get(node).and_then(ElementRef::wrap).map(|e| e.html());
    Ok(Extraction {
        primary: primary.and_then(render),
        document: root
            .and_then(render)
            .unwrap_or_else(|| document.root_element().html()),
        headline,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn primary_html(html: &str) -> Option<String> {
        extract(html, None).unwrap().primary
    }

    fn boilerplate_ids(html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let facts = analyse(&document).unwrap();
        facts
            .iter()
            .filter(|fact| fact.boilerplate)
            .filter_map(|fact| fact.element?.value().id().map(str::to_string))
            .collect()
    }

    #[test]
    fn test_single_article_is_primary() {
        let html = r#"<html><body>
            <nav id="nav"><a href="/">Home</a></nav>
            <article id="story"><p>Story text</p></article>
        </body></html>"#;
        assert_eq!(
            primary_html(html),
            Some(r#"<article id="story"><p>Story text</p></article>"#.to_string())
        );
    }

    #[test]
    fn test_main_used_when_no_article() {
        let html = r#"<html><body><div>menu</div><main id="content"><p>Hello</p></main></body></html>"#;
        assert!(primary_html(html).unwrap().starts_with(r#"<main id="content">"#));
    }

    #[test]
    fn test_scoring_prefers_paragraph_dense_container() {
        let html = r#"<html><body>
            <div id="links"><p><a href="/a">A link that is long enough to count as text</a></p></div>
            <div id="text">
                <p>This is the first long paragraph of the article, with commas, and detail.</p>
                <p>This is the second long paragraph of the article, also quite wordy.</p>
            </div>
        </body></html>"#;
        assert!(primary_html(html).unwrap().starts_with(r#"<div id="text">"#));
    }

    #[test]
    fn test_no_candidates_leaves_whole_body() {
        let extraction = extract("<html><body><h1>Title</h1><p>Short</p></body></html>", None).unwrap();
        assert_eq!(extraction.primary, None);
        assert_eq!(extraction.document, "<body><h1>Title</h1><p>Short</p></body>");
    }

    #[test]
    fn test_boilerplate_detection() {
        let html = r#"<div class="site-sidebar" id="a"><p id="a1">inner</p></div>
            <div class="sidebar main-content" id="b"></div>
            <header id="c"><a href="/">Logo</a></header>
            <header id="d"><h1>Headline</h1></header>
            <div role="navigation" id="e"></div>
            <div class="header" id="f"></div>
            <div hidden id="g"></div>"#;
        assert_eq!(boilerplate_ids(html), ["a", "a1", "c", "e", "g"]);
    }

    #[test]
    fn test_chrome_is_removed_from_body() {
        let extraction = extract(
            "<body><script>evil()</script><p>Kept</p><footer>Copyright</footer></body>",
            None,
        )
        .unwrap();
        assert_eq!(extraction.document, "<body><p>Kept</p></body>");
    }

    #[test]
    fn test_headline_outside_primary() {
        let html = r#"<html><body><h1>Page  title</h1>
            <article><p>Body</p></article></body></html>"#;
        let extraction = extract(html, None).unwrap();
        assert_eq!(extraction.headline, Some("Page title".to_string()));
    }

    #[test]
    fn test_links_resolved_against_base() {
        let base = Url::parse("https://example.com/blog/post").unwrap();
        let extraction = extract(
            r#"<body><p><a href="../about">About</a><img src="pic.png"><a href="https://other.org/">x</a></p></body>"#,
            Some(&base),
        )
        .unwrap();
        assert!(extraction.document.contains(r#"href="https://example.com/about""#));
        assert!(extraction.document.contains(r#"src="https://example.com/blog/pic.png""#));
        assert!(extraction.document.contains(r#"href="https://other.org/""#));
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        let depth = 4000;
        let html = format!("{}text{}", "<div>".repeat(depth), "</div>".repeat(depth));
        assert_eq!(
            extract(&html, None),
            Err(ExtractError::TooDeep { limit: MAX_DEPTH })
        );
    }

    #[test]
    fn test_nesting_within_limit_is_accepted() {
        let depth = MAX_DEPTH / 2;
        let html = format!("{}text{}", "<div>".repeat(depth), "</div>".repeat(depth));
        assert!(extract(&html, None).unwrap().document.contains("text"));
    }

    #[test]
    fn test_wide_document_scores_in_one_pass() {
        let mut html = String::from("<html><body><div id=\"long\">");
        for i in 0..20_000 {
            html.push_str(&format!("<p>Paragraph number {}, with enough words to count.</p>", i));
        }
        html.push_str("</div></body></html>");

        let primary = primary_html(&html).unwrap();
        assert!(primary.starts_with(r#"<div id="long">"#));
        assert!(primary.contains("Paragraph number 19999,"));
    }
}
