//! Markup grammar using chumsky
//!
//! Parsing happens in two steps. The chumsky grammar turns tokens into a
//! flat list of start tags, end tags and content. Tree construction then
//! nests them, closing elements whose end tag HTML lets authors omit
//! (`<li>`, `<p>`, table cells and friends).

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::dom::{is_void_element, Document, Element, Node};
use crate::error::MarkupError;
use crate::markup::lexer::{Span, Token};

/// Parse markup source into a document
pub fn parse(input: &str) -> Result<Document, Vec<MarkupError>> {
    let len = input.len();
    let tokens = crate::markup::lexer::lex(input).map_err(|e| vec![e])?;

    let token_iter = tokens.into_iter().map(|(tok, span)| (tok, span.into()));
    let token_stream = Stream::from_iter(token_iter)
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    let items = items_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(MarkupError::from).collect::<Vec<_>>())?;

    build_tree(items).map_err(|e| vec![e])
}

/// Markup item before nesting
#[derive(Debug, Clone, PartialEq)]
enum Item {
    Start {
        tag: String,
        attributes: Vec<(String, String)>,
        self_closing: bool,
        span: Span,
    },
    End {
        tag: String,
        span: Span,
    },
    Content(Node),
}

fn items_parser<'a, I>() -> impl Parser<'a, I, Vec<Item>, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    // Tag and attribute names are case-insensitive
    let name = select! {
        Token::Name(n) => n.to_ascii_lowercase(),
    };

    let attribute = name
        .clone()
        .then(
            just(Token::Equals)
                .ignore_then(select! { Token::Value(v) => v })
                .or_not(),
        )
        .map(|(key, value)| (key, value.unwrap_or_default()));

    let start_tag = just(Token::TagOpen)
        .ignore_then(name.clone())
        .then(attribute.repeated().collect::<Vec<_>>())
        .then(choice((
            just(Token::SelfClose).to(true),
            just(Token::TagClose).to(false),
        )))
        .map_with(|((tag, attributes), self_closing), e| Item::Start {
            tag,
            attributes,
            self_closing,
            span: SimpleSpan::into_range(e.span()),
        });

    let end_tag = just(Token::CloseTagOpen)
        .ignore_then(name)
        .then_ignore(just(Token::TagClose))
        .map_with(|tag, e| Item::End {
            tag,
            span: SimpleSpan::into_range(e.span()),
        });

    let content = select! {
        Token::Text(t) => Item::Content(Node::Text(t)),
        Token::Comment(c) => Item::Content(Node::Comment(c)),
    };

    choice((content, start_tag, end_tag))
        .repeated()
        .collect::<Vec<_>>()
}

/// Elements whose end tag may be omitted
const OPTIONAL_END_TAGS: &[&str] = &[
    "p", "li", "dt", "dd", "td", "th", "tr", "thead", "tbody", "tfoot", "option", "optgroup",
];

/// Start tags that close an open `<p>`
const CLOSES_PARAGRAPH: &[&str] = &[
    "address", "article", "aside", "blockquote", "details", "div", "dl", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hgroup", "hr", "main", "menu", "nav", "ol", "p", "pre", "section", "table", "ul",
];

fn has_optional_end_tag(tag: &str) -> bool {
    OPTIONAL_END_TAGS.contains(&tag)
}

/// Whether a start tag `incoming` implicitly ends an open `open` element
fn closed_by_start_tag(open: &str, incoming: &str) -> bool {
    match open {
        "p" => CLOSES_PARAGRAPH.contains(&incoming),
        "li" => incoming == "li",
        "dt" | "dd" => matches!(incoming, "dt" | "dd"),
        "td" | "th" => matches!(incoming, "td" | "th" | "tr" | "thead" | "tbody" | "tfoot"),
        "tr" => matches!(incoming, "tr" | "thead" | "tbody" | "tfoot"),
        "thead" | "tbody" => matches!(incoming, "tbody" | "tfoot"),
        "option" => matches!(incoming, "option" | "optgroup"),
        "optgroup" => incoming == "optgroup",
        _ => false,
    }
}

fn syntax_error(span: Span, message: String) -> MarkupError {
    MarkupError::Syntax {
        span,
        message,
        expected: Vec::new(),
    }
}

struct OpenElement {
    element: Element,
    span: Span,
}

#[derive(Default)]
struct TreeBuilder {
    root: Vec<Node>,
    open: Vec<OpenElement>,
}

impl TreeBuilder {
    fn append(&mut self, node: Node) {
        match self.open.last_mut() {
            Some(top) => top.element.children.push(node),
            None => self.root.push(node),
        }
    }

    fn close_top(&mut self) {
        if let Some(top) = self.open.pop() {
            self.append(Node::Element(top.element));
        }
    }

    fn start(&mut self, tag: String, attributes: Vec<(String, String)>, self_closing: bool, span: Span) {
        while self
            .open
            .last()
            .is_some_and(|top| closed_by_start_tag(&top.element.tag, &tag))
        {
            self.close_top();
        }

        let element = Element {
            tag,
            attributes,
            children: Vec::new(),
        };
        if self_closing || is_void_element(&element.tag) {
            self.append(Node::Element(element));
        } else {
            self.open.push(OpenElement { element, span });
        }
    }

    fn end(&mut self, tag: &str, span: Span) -> Result<(), MarkupError> {
        // `</br>` and friends carry nothing to close
        if is_void_element(tag) {
            return Ok(());
        }

        let Some(pos) = self.open.iter().rposition(|o| o.element.tag == tag) else {
            return Err(syntax_error(
                span,
                format!("closing tag </{}> has no open element", tag),
            ));
        };
        if let Some(inner) = self.open[pos + 1..]
            .iter()
            .rev()
            .find(|o| !has_optional_end_tag(&o.element.tag))
        {
            return Err(syntax_error(
                span,
                format!("closing tag </{}> does not match <{}>", tag, inner.element.tag),
            ));
        }

        while self.open.len() > pos {
            self.close_top();
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Document, MarkupError> {
        if let Some(unclosed) = self
            .open
            .iter()
            .rev()
            .find(|o| !has_optional_end_tag(&o.element.tag))
        {
            return Err(syntax_error(
                unclosed.span.clone(),
                format!("<{}> is never closed", unclosed.element.tag),
            ));
        }

        while !self.open.is_empty() {
            self.close_top();
        }
        Ok(Document { children: self.root })
    }
}

fn build_tree(items: Vec<Item>) -> Result<Document, MarkupError> {
    let mut builder = TreeBuilder::default();
    for item in items {
        match item {
            Item::Start {
                tag,
                attributes,
                self_closing,
                span,
            } => builder.start(tag, attributes, self_closing, span),
            Item::End { tag, span } => builder.end(&tag, span)?,
            Item::Content(node) => builder.append(node),
        }
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn element(node: &Node) -> &Element {
        node.as_element().expect("Expected element")
    }

    #[test]
    fn test_parse_template_block() {
        let doc = parse(r#"<template id="xui-button"><button><slot></slot></button></template>"#)
            .expect("Should parse");
        assert_eq!(doc.children.len(), 1);
        let template = element(&doc.children[0]);
        assert_eq!(template.tag, "template");
        assert_eq!(template.id(), Some("xui-button"));
        assert_eq!(element(&template.children[0]).tag, "button");
    }

    #[test]
    fn test_parse_lowercases_names() {
        let doc = parse(r#"<DIV Class="Keep">x</div>"#).expect("Should parse");
        let div = element(&doc.children[0]);
        assert_eq!(div.tag, "div");
        assert_eq!(div.attributes, vec![("class".to_string(), "Keep".to_string())]);
    }

    #[test]
    fn test_parse_void_and_self_closing() {
        let doc = parse(r#"<p>a<br>b<slot name="x"/></p>"#).expect("Should parse");
        let p = element(&doc.children[0]);
        assert_eq!(p.children.len(), 4);
        assert_eq!(element(&p.children[1]).tag, "br");
        assert_eq!(element(&p.children[3]).attribute("name"), Some("x"));
    }

    #[test]
    fn test_parse_boolean_attribute() {
        let doc = parse("<input disabled>").expect("Should parse");
        assert_eq!(element(&doc.children[0]).attribute("disabled"), Some(""));
    }

    #[test]
    fn test_parse_keeps_whitespace_and_comments() {
        let doc = parse("<ul>\n  <li>one</li><!-- two -->\n</ul>").expect("Should parse");
        let ul = element(&doc.children[0]);
        assert_eq!(ul.children.len(), 4);
        assert!(ul.children[0].is_blank_text());
        assert_eq!(ul.children[2], Node::Comment(" two ".to_string()));
    }

    #[test]
    fn test_parse_round_trip_serialization() {
        let source = r#"<template id="card"><div class="card"><h2>Title</h2><slot></slot></div></template>"#;
        let doc = parse(source).expect("Should parse");
        assert_eq!(doc.to_string(), source);
    }

    #[test]
    fn test_mismatched_closing_tag() {
        let errors = parse("<div><span></div></span>").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("closing tag </div> does not match <span>"));
    }

    #[test]
    fn test_bare_angle_bracket_in_text() {
        let doc = parse("<p>1 < 2</p>").expect("Should parse");
        let p = element(&doc.children[0]);
        assert_eq!(p.children, vec![Node::Text("1 < 2".to_string())]);
        assert_eq!(doc.to_string(), "<p>1 &lt; 2</p>");
    }

    #[test]
    fn test_unquoted_attribute_with_slash() {
        let doc = parse("<a href=/home>home</a>").expect("Should parse");
        assert_eq!(element(&doc.children[0]).attribute("href"), Some("/home"));
    }

    #[test]
    fn test_omitted_list_item_end_tags() {
        let doc = parse("<ul><li>a<li>b</ul>").expect("Should parse");
        assert_eq!(doc.to_string(), "<ul><li>a</li><li>b</li></ul>");
    }

    #[test]
    fn test_paragraph_closed_by_ancestor_end_tag() {
        let doc = parse("<template><p>hello</template>").expect("Should parse");
        assert_eq!(doc.to_string(), "<template><p>hello</p></template>");
    }

    #[test]
    fn test_paragraph_closed_by_block_start_tag() {
        let doc = parse("<p>a<div>b</div>").expect("Should parse");
        assert_eq!(doc.to_string(), "<p>a</p><div>b</div>");
    }

    #[test]
    fn test_table_cells_and_rows_close_implicitly() {
        let doc = parse("<table><tr><td>1<td>2<tr><th>3</table>").expect("Should parse");
        assert_eq!(
            doc.to_string(),
            "<table><tr><td>1</td><td>2</td></tr><tr><th>3</th></tr></table>"
        );
    }

    #[test]
    fn test_options_close_implicitly() {
        let doc = parse("<select><option>a<option selected>b</select>").expect("Should parse");
        assert_eq!(
            doc.to_string(),
            "<select><option>a</option><option selected>b</option></select>"
        );
    }

    #[test]
    fn test_trailing_optional_element_closed_at_end() {
        let doc = parse("<li>last").expect("Should parse");
        assert_eq!(doc.to_string(), "<li>last</li>");
    }

    #[test]
    fn test_unclosed_element() {
        let errors = parse("<template><p>text</p>").unwrap_err();
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_stray_closing_tag() {
        let errors = parse("text</p>").unwrap_err();
        assert!(errors[0].to_string().contains("has no open element"));
    }

    #[test]
    fn test_empty_input() {
        let doc = parse("").expect("Should parse");
        assert!(doc.children.is_empty());
    }
}
