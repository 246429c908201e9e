// src/core/html.rs
use ego_tree::NodeRef;
use scraper::{ElementRef, Node};

use super::sanitize::normalize_ws;

pub fn attr<'a>(el: ElementRef<'a>, name: &str) -> &'a str {
    el.value().attr(name).unwrap_or("")
}

pub fn class_of(el: ElementRef<'_>) -> &str {
    attr(el, "class")
}

pub fn is_tag(el: ElementRef<'_>, tag: &str) -> bool {
    el.value().name() == tag
}

/// Text of the first child, if that child is a text node.
pub fn leading_text<'a>(el: ElementRef<'a>) -> Option<&'a str> {
    match el.first_child()?.value() {
        Node::Text(t) => Some(&**t),
        _ => None,
    }
}

/// All descendant text, whitespace collapsed.
pub fn text_content(el: ElementRef<'_>) -> String {
    normalize_ws(&el.text().collect::<String>())
}

pub fn child_elements<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    el.children().filter_map(ElementRef::wrap)
}

/// Self first, then every descendant element in document order.
pub fn subtree<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    el.descendants().filter_map(ElementRef::wrap)
}

pub fn following_elements<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    el.next_siblings().filter_map(ElementRef::wrap)
}

pub fn has_ancestor<F>(el: ElementRef<'_>, pred: F) -> bool
where
    F: Fn(ElementRef<'_>) -> bool,
{
    el.ancestors().filter_map(ElementRef::wrap).any(|a| pred(a))
}

/// Flatten rich text: `<p>` opens a new paragraph, `<br>` breaks the line,
/// list items become `• ` lines.
pub fn flatten_text(el: ElementRef<'_>) -> String {
    let mut out = String::new();
    write_node_text(*el, &mut out);
    out.trim().to_string()
}

fn write_node_text(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Text(t) => {
            out.push_str(t);
            return;
        }
        Node::Element(e) => match e.name() {
            "p" if !out.is_empty() => out.push_str("\n\n"),
            "br" => out.push('\n'),
            "ul" | "ol" => {
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
                for li in node.children() {
                    if matches!(li.value(), Node::Element(e) if e.name() == "li") {
                        out.push_str("• ");
                        for c in li.children() {
                            write_node_text(c, out);
                        }
                        out.push('\n');
                    }
                }
                return;
            }
            _ => {}
        },
        _ => {}
    }
    for c in node.children() {
        write_node_text(c, out);
    }
}
