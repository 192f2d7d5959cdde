//! Lexer for template markup using logos
//!
//! Markup needs two lexing modes: text between tags, and the inside of a tag
//! where whitespace separates names and attribute values. Each mode has its
//! own logos enum and the driver switches between them with `morph`.

use logos::{Lexer, Logos};

use crate::error::MarkupError;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Unified token stream handed to the grammar
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    /// `<`
    TagOpen,
    /// `</`
    CloseTagOpen,
    /// `>`
    TagClose,
    /// `/>`
    SelfClose,
    /// `=`
    Equals,
    /// Tag or attribute name
    Name(String),
    /// Attribute value, quoted or not, with entities decoded
    Value(String),
    /// Text content with entities decoded
    Text(String),
    Comment(String),
}

#[derive(Logos, Debug, Clone, PartialEq)]
enum ContentToken {
    #[token("<!--", lex_comment)]
    Comment(String),

    #[regex(r"<![dD][oO][cC][tT][yY][pP][eE][^>]*>")]
    Doctype,

    /// `true` when a tag name follows
    #[token("</", |lex| starts_tag_name(lex.remainder()))]
    CloseTagStart(bool),

    #[token("<", |lex| starts_tag_name(lex.remainder()))]
    TagStart(bool),

    #[regex(r"[^<]+", |lex| decode_entities(lex.slice()))]
    Text(String),
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r\f]+")]
enum TagToken {
    #[token(">")]
    TagEnd,

    #[token("/>")]
    SelfClose,

    #[token("=")]
    Equals,

    #[regex(r#"[^ \t\n\r\f"'<>/=]+"#, |lex| lex.slice().to_string())]
    Name(String),
}

/// Attribute value after `=`; unquoted values run to whitespace or `>`
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r\f]+")]
enum ValueToken {
    #[regex(r#""[^"]*""#, |lex| unquote(lex.slice()))]
    #[regex(r#"'[^']*'"#, |lex| unquote(lex.slice()))]
    Quoted(String),

    #[regex(r#"[^ \t\n\r\f"'<>=`]+"#, |lex| decode_entities(lex.slice()))]
    Unquoted(String),
}

fn lex_comment(lex: &mut Lexer<ContentToken>) -> Option<String> {
    let rest = lex.remainder();
    let end = rest.find("-->")?;
    let body = rest[..end].to_string();
    lex.bump(end + 3);
    Some(body)
}

fn starts_tag_name(rest: &str) -> bool {
    rest.starts_with(|c: char| c.is_ascii_alphabetic())
}

fn unquote(s: &str) -> String {
    decode_entities(&s[1..s.len() - 1])
}

impl From<TagToken> for Token {
    fn from(tok: TagToken) -> Self {
        match tok {
            TagToken::TagEnd => Token::TagClose,
            TagToken::SelfClose => Token::SelfClose,
            TagToken::Equals => Token::Equals,
            TagToken::Name(s) => Token::Name(s),
        }
    }
}

impl From<ValueToken> for Token {
    fn from(tok: ValueToken) -> Self {
        match tok {
            ValueToken::Quoted(s) | ValueToken::Unquoted(s) => Token::Value(s),
        }
    }
}

/// Append text, merging with a directly preceding text token
fn push_text(tokens: &mut Vec<(Token, Span)>, text: &str, span: Span) {
    if let Some((Token::Text(prev), prev_span)) = tokens.last_mut() {
        if prev_span.end == span.start {
            prev.push_str(text);
            prev_span.end = span.end;
            return;
        }
    }
    tokens.push((Token::Text(text.to_string()), span));
}

fn unterminated_tag(input: &str, tag_start: usize) -> MarkupError {
    MarkupError::Syntax {
        span: tag_start..input.len(),
        message: "Unterminated tag".to_string(),
        expected: vec!["'>'".to_string()],
    }
}

/// Lex markup into tokens with spans.
///
/// A `<` or `</` that is not followed by a tag name is plain text.
pub fn lex(input: &str) -> Result<Vec<(Token, Span)>, MarkupError> {
    let mut tokens = Vec::new();
    let mut content = ContentToken::lexer(input);

    while let Some(result) = content.next() {
        let span = content.span();
        let token = result.map_err(|()| lex_error(input, &span))?;
        let opener = match token {
            ContentToken::Text(t) => {
                push_text(&mut tokens, &t, span);
                continue;
            }
            ContentToken::Comment(c) => {
                tokens.push((Token::Comment(c), span));
                continue;
            }
            ContentToken::Doctype => continue,
            ContentToken::TagStart(true) => Token::TagOpen,
            ContentToken::CloseTagStart(true) => Token::CloseTagOpen,
            ContentToken::TagStart(false) | ContentToken::CloseTagStart(false) => {
                let text = content.slice();
                push_text(&mut tokens, text, span);
                continue;
            }
        };
        let tag_start = span.start;
        tokens.push((opener, span));

        let mut tag = content.morph::<TagToken>();
        loop {
            let Some(result) = tag.next() else {
                return Err(unterminated_tag(input, tag_start));
            };
            let span = tag.span();
            let token = result.map_err(|()| lex_error(input, &span))?;
            let done = matches!(token, TagToken::TagEnd | TagToken::SelfClose);
            let equals = token == TagToken::Equals;
            tokens.push((token.into(), span));
            if done {
                break;
            }
            if equals {
                let mut value = tag.morph::<ValueToken>();
                let Some(result) = value.next() else {
                    return Err(unterminated_tag(input, tag_start));
                };
                let span = value.span();
                let token = result.map_err(|()| lex_error(input, &span))?;
                tokens.push((token.into(), span));
                tag = value.morph();
            }
        }
        content = tag.morph();
    }

    Ok(tokens)
}

fn lex_error(input: &str, span: &Span) -> MarkupError {
    let found = input.get(span.clone()).unwrap_or_default();
    let message = if found.starts_with("<!--") {
        "Unterminated comment".to_string()
    } else {
        format!("Unexpected character sequence '{}'", found)
    };
    MarkupError::Syntax {
        span: span.clone(),
        message,
        expected: Vec::new(),
    }
}

/// Decode the named and numeric character references markup commonly uses
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let decoded = after
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| decode_reference(&after[..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &after[semi + 1..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_reference(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}
