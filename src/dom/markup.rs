//! Markup parsing and serialization.
//!
//! The tokenizer is a [`logos`] lexer over the top-level structure of the
//! markup (tags, comments, text). Tag internals are handed to a second small
//! lexer for attributes. The tree builder is forgiving in the way browsers
//! are for the markup components produce:
//!
//! - void elements (`<br>`, `<meta>`, ...) and `<x/>` never take children
//! - a close tag pops back to the nearest open element with that name;
//!   stray close tags are ignored
//! - children of `<template>` go into its detached content fragment
//! - doctypes are skipped
//!
//! Character data is stored exactly as written, entities included, so that
//! `parse` followed by [`inner_html`] reproduces the input.

use logos::{Lexer, Logos};

use super::node::{NodeData, NodeId, NodeKind};
use super::tree::Dom;

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

/// A parsed start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag {
    /// Lower-case tag name.
    pub name: String,
    /// Attributes in source order. Names are lower-cased.
    pub attributes: Vec<(String, String)>,
    /// Whether the tag ended with `/>`.
    pub self_closing: bool,
}

/// Top-level markup token.
#[derive(Logos, Debug, Clone, PartialEq)]
pub enum MarkupToken {
    /// `<!-- ... -->`; carries the comment body.
    #[token("<!--", lex_comment)]
    Comment(String),

    /// `<!DOCTYPE ...>`
    #[regex(r"<![dD][oO][cC][tT][yY][pP][eE][^>]*>")]
    Doctype,

    /// `</name>`; carries the lower-case name.
    #[regex(r"</[a-zA-Z][a-zA-Z0-9-]*[ \t\r\n]*>", lex_close_tag)]
    CloseTag(String),

    /// `<name attr="v" ...>`
    #[regex(r"<[a-zA-Z][a-zA-Z0-9-]*", lex_start_tag)]
    StartTag(StartTag),

    /// A run of character data.
    #[regex(r"[^<]+")]
    Text,

    /// A `<` that does not begin a tag; kept as text.
    #[token("<")]
    Lt,
}

fn lex_comment(lex: &mut Lexer<MarkupToken>) -> String {
    let rest = lex.remainder();
    match rest.find("-->") {
        Some(end) => {
            let body = rest[..end].to_owned();
            lex.bump(end + 3);
            body
        }
        None => {
            let body = rest.to_owned();
            lex.bump(rest.len());
            body
        }
    }
}

fn lex_close_tag(lex: &mut Lexer<MarkupToken>) -> String {
    lex.slice()[2..]
        .trim_end_matches('>')
        .trim()
        .to_ascii_lowercase()
}

fn lex_start_tag(lex: &mut Lexer<MarkupToken>) -> StartTag {
    let name = lex.slice()[1..].to_ascii_lowercase();
    let rest = lex.remainder();

    // Find the closing `>` outside of quoted attribute values.
    let mut quote = None;
    let mut end = None;
    for (i, c) in rest.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == '>' => {
                end = Some(i);
                break;
            }
            None => {}
        }
    }

    let (body, consumed) = match end {
        Some(i) => (&rest[..i], i + 1),
        None => (rest, rest.len()),
    };
    let trimmed = body.trim_end();
    let self_closing = trimmed.ends_with('/');
    let body = if self_closing {
        &trimmed[..trimmed.len() - 1]
    } else {
        body
    };
    let attributes = parse_attributes(body);
    lex.bump(consumed);

    StartTag {
        name,
        attributes,
        self_closing,
    }
}

/// Attribute-level token, used inside a start tag.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum AttrToken {
    #[regex(r#"[^ \t\r\n\f"'=]+"#)]
    Word,

    #[token("=")]
    Equals,

    #[regex(r#""[^"]*""#)]
    DoubleQuoted,

    #[regex(r"'[^']*'")]
    SingleQuoted,
}

fn parse_attributes(body: &str) -> Vec<(String, String)> {
    let mut attributes: Vec<(String, String)> = Vec::new();
    let mut pending: Option<String> = None;
    let mut expecting_value = false;

    for (token, span) in AttrToken::lexer(body).spanned() {
        let text = &body[span];
        match token {
            Ok(AttrToken::Word) if expecting_value => {
                if let Some(name) = pending.take() {
                    push_attribute(&mut attributes, name, text.to_owned());
                }
                expecting_value = false;
            }
            Ok(AttrToken::DoubleQuoted | AttrToken::SingleQuoted) if expecting_value => {
                if let Some(name) = pending.take() {
                    push_attribute(&mut attributes, name, text[1..text.len() - 1].to_owned());
                }
                expecting_value = false;
            }
            Ok(AttrToken::Equals) if pending.is_some() => expecting_value = true,
            Ok(AttrToken::Word) => {
                if let Some(name) = pending.replace(text.to_ascii_lowercase()) {
                    push_attribute(&mut attributes, name, String::new());
                }
            }
            // Stray quotes or `=`: skip.
            Ok(_) | Err(()) => expecting_value = false,
        }
    }
    if let Some(name) = pending {
        push_attribute(&mut attributes, name, String::new());
    }
    attributes
}

/// The first occurrence of an attribute wins.
fn push_attribute(attributes: &mut Vec<(String, String)>, name: String, value: String) {
    if !attributes.iter().any(|(key, _)| *key == name) {
        attributes.push((name, value));
    }
}

// ---------------------------------------------------------------------------
// Tree building
// ---------------------------------------------------------------------------

/// Parse `markup` and append the resulting nodes as children of `parent`.
///
/// Returns the top-level nodes created, in order.
pub fn parse_into(dom: &mut Dom, parent: NodeId, markup: &str) -> Vec<NodeId> {
    // (tag name, insertion point). The base entry has no name.
    let mut open: Vec<(String, NodeId)> = vec![(String::new(), parent)];
    let mut top_level = Vec::new();

    for (token, span) in MarkupToken::lexer(markup).spanned() {
        let insertion = open.last().map_or(parent, |(_, node)| *node);
        let created = match token {
            Ok(MarkupToken::Text | MarkupToken::Lt) | Err(()) => {
                Some(dom.insert_child(insertion, NodeData::text(&markup[span])))
            }
            Ok(MarkupToken::Comment(body)) => {
                Some(dom.insert_child(insertion, NodeData::comment(body)))
            }
            Ok(MarkupToken::Doctype) => None,
            Ok(MarkupToken::CloseTag(name)) => {
                if let Some(depth) = open.iter().skip(1).rposition(|(tag, _)| *tag == name) {
                    open.truncate(depth + 1);
                }
                None
            }
            Ok(MarkupToken::StartTag(tag)) => {
                let mut data = NodeData::element(&tag.name);
                data.attributes = tag.attributes;
                let is_void = data.is_void();
                let element = dom.insert_child(insertion, data);

                if tag.name == "template" {
                    let content = dom.insert(NodeData::fragment());
                    if let Some(node) = dom.get_mut(element) {
                        node.template_content = Some(content);
                    }
                    if !tag.self_closing {
                        open.push((tag.name, content));
                    }
                } else if !is_void && !tag.self_closing {
                    open.push((tag.name, element));
                }
                Some(element)
            }
        };

        if let Some(node) = created {
            if insertion == parent {
                top_level.push(node);
            }
        }
    }

    top_level
}

/// Parse `markup` into a new detached fragment.
pub fn parse_fragment(dom: &mut Dom, markup: &str) -> NodeId {
    let fragment = dom.insert(NodeData::fragment());
    parse_into(dom, fragment, markup);
    fragment
}

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

/// Serialize the children of `node`. For a template, its content.
pub fn inner_html(dom: &Dom, node: NodeId) -> String {
    let mut out = String::new();
    write_children(dom, node, false, &mut out);
    out
}

/// Serialize `node` including its own tag.
pub fn outer_html(dom: &Dom, node: NodeId) -> String {
    let mut out = String::new();
    write_node(dom, node, false, &mut out);
    out
}

/// Like [`outer_html`], with each shadow root written as
/// `<template shadowrootmode="open">` ahead of the host's light children.
pub fn composed_html(dom: &Dom, node: NodeId) -> String {
    let mut out = String::new();
    write_node(dom, node, true, &mut out);
    out
}

/// Concatenated character data of `node`'s light subtree.
pub fn text_content(dom: &Dom, node: NodeId) -> String {
    dom.walk_depth_first(node)
        .into_iter()
        .filter_map(|id| dom.get(id))
        .filter(|data| data.kind == NodeKind::Text)
        .map(|data| data.text.as_str())
        .collect()
}

fn write_children(dom: &Dom, node: NodeId, shadows: bool, out: &mut String) {
    let content = dom.get(node).and_then(|data| data.template_content);
    for &child in dom.children(content.unwrap_or(node)) {
        write_node(dom, child, shadows, out);
    }
}

fn write_node(dom: &Dom, node: NodeId, shadows: bool, out: &mut String) {
    let Some(data) = dom.get(node) else {
        return;
    };
    match data.kind {
        NodeKind::Text => out.push_str(&data.text),
        NodeKind::Comment => {
            out.push_str("<!--");
            out.push_str(&data.text);
            out.push_str("-->");
        }
        NodeKind::Element => {
            out.push('<');
            out.push_str(&data.tag);
            for (name, value) in &data.attributes {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&value.replace('"', "&quot;"));
                out.push('"');
            }
            out.push('>');
            if data.is_void() {
                return;
            }
            if let Some(shadow) = dom.shadow_root(node).filter(|_| shadows) {
                out.push_str(r#"<template shadowrootmode="open">"#);
                write_children(dom, shadow, shadows, out);
                out.push_str("</template>");
            }
            write_children(dom, node, shadows, out);
            out.push_str("</");
            out.push_str(&data.tag);
            out.push('>');
        }
        NodeKind::Document | NodeKind::Fragment | NodeKind::ShadowRoot => {
            write_children(dom, node, shadows, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn roundtrip(markup: &str) -> String {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::document());
        parse_into(&mut dom, root, markup);
        inner_html(&dom, root)
    }

    // ── Tokenizer ────────────────────────────────────────────────────

    #[test]
    fn tokenizes_tags_text_and_comments() {
        let tokens: Vec<_> = MarkupToken::lexer("<p class='x'>hi<!-- c --></p>")
            .map(Result::unwrap)
            .collect();
        assert_eq!(
            tokens,
            vec![
                MarkupToken::StartTag(StartTag {
                    name: "p".into(),
                    attributes: vec![("class".into(), "x".into())],
                    self_closing: false,
                }),
                MarkupToken::Text,
                MarkupToken::Comment(" c ".into()),
                MarkupToken::CloseTag("p".into()),
            ]
        );
    }

    #[test]
    fn start_tag_attribute_forms() {
        let mut lex = MarkupToken::lexer(r#"<a href=/alt data-x="a > b" hidden TITLE='t'>"#);
        let Some(Ok(MarkupToken::StartTag(tag))) = lex.next() else {
            panic!("expected start tag");
        };
        assert_eq!(
            tag.attributes,
            vec![
                ("href".to_owned(), "/alt".to_owned()),
                ("data-x".to_owned(), "a > b".to_owned()),
                ("hidden".to_owned(), String::new()),
                ("title".to_owned(), "t".to_owned()),
            ]
        );
        assert!(lex.next().is_none());
    }

    #[test]
    fn self_closing_tag() {
        let mut lex = MarkupToken::lexer("<app-footer />");
        let Some(Ok(MarkupToken::StartTag(tag))) = lex.next() else {
            panic!("expected start tag");
        };
        assert_eq!(tag.name, "app-footer");
        assert!(tag.self_closing);
        assert!(tag.attributes.is_empty());
    }

    // ── Tree building ────────────────────────────────────────────────

    #[test]
    fn roundtrip_nested_markup() {
        let markup = r#"<section class="start-page container"><h1>Edit me</h1><p>Change <code>x</code>.</p></section>"#;
        assert_eq!(roundtrip(markup), markup);
    }

    #[test]
    fn whitespace_and_entities_are_preserved() {
        let markup = "\n\t<p>Use &lt;template&gt;.</p>\n";
        assert_eq!(roundtrip(markup), markup);
    }

    #[test]
    fn void_elements_take_no_children() {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::document());
        let top = parse_into(&mut dom, root, "<meta name=description><p>x</p>");
        assert_eq!(top.len(), 2);
        assert!(dom.children(top[0]).is_empty());
        assert_eq!(inner_html(&dom, root), r#"<meta name="description"><p>x</p>"#);
    }

    #[test]
    fn stray_close_tags_are_ignored() {
        assert_eq!(roundtrip("<div></span>x</div></div>"), "<div>x</div>");
    }

    #[test]
    fn close_tag_pops_unclosed_children() {
        assert_eq!(roundtrip("<ul><li>a<li>b</ul>c"), "<ul><li>a<li>b</li></li></ul>c");
    }

    #[test]
    fn unclosed_elements_are_closed_at_end() {
        assert_eq!(roundtrip("<div><p>open"), "<div><p>open</p></div>");
    }

    #[test]
    fn lone_lt_is_text() {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::document());
        let top = parse_into(&mut dom, root, "a < b");
        assert!(top.iter().all(|&n| dom.kind(n) == Some(NodeKind::Text)));
        assert_eq!(text_content(&dom, root), "a < b");
    }

    #[test]
    fn doctype_is_skipped() {
        assert_eq!(roundtrip("<!DOCTYPE html><html></html>"), "<html></html>");
    }

    #[test]
    fn template_children_go_to_content() {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::document());
        let top = parse_into(
            &mut dom,
            root,
            r#"<template id="main-layout"><main id="app-content"></main></template><div id="app"></div>"#,
        );
        assert_eq!(top.len(), 2);
        let template = top[0];
        assert!(dom.children(template).is_empty());
        let content = dom.get(template).unwrap().template_content.unwrap();
        assert_eq!(dom.children(content).len(), 1);
        assert_eq!(inner_html(&dom, template), r#"<main id="app-content"></main>"#);
        assert_eq!(
            outer_html(&dom, template),
            r#"<template id="main-layout"><main id="app-content"></main></template>"#
        );
    }

    #[test]
    fn quotes_in_attribute_values_are_escaped() {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::document());
        let p = dom.insert_child(root, NodeData::element("p").with_attribute("title", r#"say "hi""#));
        assert_eq!(outer_html(&dom, p), r#"<p title="say &quot;hi&quot;"></p>"#);
    }

    #[test]
    fn parse_fragment_is_detached() {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::document());
        let fragment = parse_fragment(&mut dom, "<b>x</b>");
        assert_eq!(dom.parent(fragment), None);
        assert!(!dom.is_connected(fragment));
        assert!(dom.children(root).is_empty());
        assert_eq!(inner_html(&dom, fragment), "<b>x</b>");
    }

    #[test]
    fn style_blocks_keep_their_text() {
        let markup = "<style>.a > .b { color: red; }\n&:hover {}</style>";
        assert_eq!(roundtrip(markup), markup);
    }

    #[test]
    fn composed_html_writes_shadow_roots() {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::document());
        let host = dom.insert_child(root, NodeData::element("app-footer"));
        let shadow = dom.insert(NodeData::shadow_root());
        dom.attach_shadow_root(host, shadow);
        parse_into(&mut dom, shadow, "<footer>f</footer>");
        parse_into(&mut dom, host, "<span>light</span>");
        assert_eq!(outer_html(&dom, host), "<app-footer><span>light</span></app-footer>");
        assert_eq!(
            composed_html(&dom, host),
            concat!(
                "<app-footer>",
                r#"<template shadowrootmode="open"><footer>f</footer></template>"#,
                "<span>light</span></app-footer>",
            )
        );
    }
}
