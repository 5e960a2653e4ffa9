use ego_tree::iter::Edge;
use ego_tree::NodeRef;
use scraper::node::{Element, Node};

const NEVER_RENDERED: &[&str] = &["script", "style", "template", "noscript", "head", "title"];

/// True when neither the node nor any ancestor hides it from the reader.
pub(crate) fn is_rendered(node: NodeRef<'_, Node>) -> bool {
    let mut current = Some(node);
    while let Some(node) = current {
        if node.value().as_element().is_some_and(hides_subtree) {
            return false;
        }
        current = node.parent();
    }
    true
}

fn hides_subtree(element: &Element) -> bool {
    let name = element.name();
    if NEVER_RENDERED.iter().any(|tag| tag.eq_ignore_ascii_case(name)) {
        return true;
    }
    if element.attr("hidden").is_some() {
        return true;
    }
    if name.eq_ignore_ascii_case("dialog") && element.attr("open").is_none() {
        return true;
    }
    if element
        .attr("aria-hidden")
        .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
    {
        return true;
    }
    if name.eq_ignore_ascii_case("input")
        && element
            .attr("type")
            .is_some_and(|kind| kind.trim().eq_ignore_ascii_case("hidden"))
    {
        return true;
    }
    element.attr("style").is_some_and(style_hides)
}

fn style_hides(style: &str) -> bool {
    style.split(';').any(|declaration| {
        let Some((property, value)) = declaration.split_once(':') else {
            return false;
        };
        let property = property.trim().to_ascii_lowercase();
        let value = value
            .trim()
            .trim_end_matches("!important")
            .trim()
            .to_ascii_lowercase();
        matches!(
            (property.as_str(), value.as_str()),
            ("display", "none") | ("visibility", "hidden")
        )
    })
}

/// Elements whose boundaries separate words even without surrounding whitespace.
const BREAKS_TEXT: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "details", "dialog", "div", "dl",
    "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5",
    "h6", "header", "hr", "li", "main", "nav", "ol", "p", "pre", "section", "summary", "table",
    "td", "th", "tr", "ul",
];

fn breaks_text(element: &Element) -> bool {
    let name = element.name();
    BREAKS_TEXT.iter().any(|tag| tag.eq_ignore_ascii_case(name))
}

/// Visible text beneath `node`, whitespace-collapsed.
///
/// Adjacent text nodes are joined as-is, so inline markup inside a word
/// (`<b>art</b>icle`) does not split it; block boundaries separate words.
pub(crate) fn visible_text(node: NodeRef<'_, Node>) -> String {
    let mut raw = String::new();
    for edge in node.traverse() {
        let (current, opening) = match edge {
            Edge::Open(current) => (current, true),
            Edge::Close(current) => (current, false),
        };
        match current.value() {
            Node::Text(text) if opening && is_rendered(current) => raw.push_str(text),
            Node::Element(element) if breaks_text(element) => raw.push(' '),
            _ => {}
        }
    }
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::{style_hides, visible_text};
    use scraper::Html;

    #[test]
    fn inline_styles_that_hide() {
        assert!(style_hides("display:none"));
        assert!(style_hides("color: red; DISPLAY : None !important"));
        assert!(style_hides("visibility: hidden"));
        assert!(!style_hides("display: block; visibility: visible"));
        assert!(!style_hides("content: 'display:none'x"));
    }

    #[test]
    fn inline_markup_does_not_split_words() {
        let doc = Html::parse_fragment("<p>Finish reading this <b>art</b>icle</p><p>for free</p>");
        assert_eq!(
            visible_text(*doc.root_element()),
            "Finish reading this article for free"
        );
    }
}
