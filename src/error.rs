//! Error types for naming, registration, markup parsing and template resolution

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::markup::lexer::Token;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// A registration name without the required hyphen
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamingError {
    #[error("defined element for class '{class}' lacks a dash in the auto-generated tag name '{derived}'")]
    DerivedNameLacksDash { class: String, derived: String },

    #[error("defined element tag name lacks a dash '{name}'")]
    ExplicitNameLacksDash { name: String },
}

/// Rejections issued by the host component registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefineError {
    #[error("'{name}' is not a valid custom element name: {reason}")]
    InvalidName { name: String, reason: String },

    #[error("the name '{name}' has already been used with this registry")]
    NameTaken { name: String },

    #[error("class '{class}' has already been defined as '{existing}'")]
    ClassAlreadyDefined { class: String, existing: String },

    #[error("'{name}' cannot extend '{extends}': only native elements can be extended")]
    ExtendsCustomElement { name: String, extends: String },
}

/// Failure to create an element instance from the registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateError {
    #[error("no custom element is defined as '{name}'")]
    Undefined { name: String },

    #[error("'{name}' is a customized built-in; create <{extends} is=\"{name}\"> instead")]
    CustomizedBuiltIn { name: String, extends: String },

    #[error("'{name}' extends <{expected}>, not <{local_name}>")]
    WrongLocalName {
        name: String,
        expected: String,
        local_name: String,
    },
}

/// Errors surfaced while applying the registrar to a class
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error(transparent)]
    Naming(#[from] NamingError),

    #[error(transparent)]
    Define(#[from] DefineError),

    /// The host accepted the definition but the class already carries a name
    #[error("class '{class}' is already registered as '{existing}'")]
    AlreadyRegistered { class: String, existing: String },
}

/// Syntax error in template markup
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkupError {
    #[error("Markup error at {span:?}: {message}")]
    Syntax {
        span: Span,
        message: String,
        expected: Vec<String>,
    },
}

impl MarkupError {
    pub fn span(&self) -> &Span {
        match self {
            MarkupError::Syntax { span, .. } => span,
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let mut buf = Vec::new();
        match self {
            MarkupError::Syntax {
                span,
                message,
                expected,
            } => {
                let expected_str = if expected.is_empty() {
                    String::new()
                } else {
                    format!("\nExpected: {}", expected.join(", "))
                };

                let written = Report::build(ReportKind::Error, filename, span.start)
                    .with_message(message)
                    .with_label(
                        Label::new((filename, span.clone()))
                            .with_message(format!("{}{}", message, expected_str))
                            .with_color(Color::Red),
                    )
                    .finish()
                    .write((filename, Source::from(source)), &mut buf);
                if written.is_err() {
                    return self.to_string();
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl<'a> From<chumsky::error::Rich<'a, Token>> for MarkupError {
    fn from(err: chumsky::error::Rich<'a, Token>) -> Self {
        use chumsky::error::RichReason;

        let message = match err.reason() {
            RichReason::ExpectedFound { found, .. } => {
                let found_str = match found {
                    Some(tok) => format_token(tok),
                    None => "end of input".to_string(),
                };
                format!("Unexpected {}", found_str)
            }
            RichReason::Custom(msg) => msg.to_string(),
        };

        let expected: Vec<String> = err
            .expected()
            .filter_map(|e| match e {
                chumsky::error::RichPattern::Token(tok) => Some(format_token(tok)),
                chumsky::error::RichPattern::Label(label) => Some(label.to_string()),
                chumsky::error::RichPattern::EndOfInput => Some("end of input".to_string()),
                chumsky::error::RichPattern::Identifier(s) => Some(format!("identifier '{}'", s)),
                chumsky::error::RichPattern::Any => Some("any token".to_string()),
                chumsky::error::RichPattern::SomethingElse => None,
            })
            .collect();

        MarkupError::Syntax {
            span: err.span().into_range(),
            message,
            expected,
        }
    }
}

/// Format a token for human-readable error messages
fn format_token(tok: &Token) -> String {
    match tok {
        Token::TagOpen => "'<'".to_string(),
        Token::CloseTagOpen => "'</'".to_string(),
        Token::TagClose => "'>'".to_string(),
        Token::SelfClose => "'/>'".to_string(),
        Token::Equals => "'='".to_string(),
        Token::Name(s) => format!("name '{}'", s),
        Token::Value(s) => format!("value \"{}\"", s),
        Token::Text(s) => format!("text \"{}\"", s.trim()),
        Token::Comment(_) => "comment".to_string(),
    }
}

/// Failure to locate a usable template block for an element
#[derive(Debug, Error)]
pub enum TemplateResolutionError {
    /// The template source did not parse
    #[error("template source for <{element_name}> failed to parse: {}", format_markup_errors(.errors))]
    Markup {
        element_name: String,
        errors: Vec<MarkupError>,
    },

    /// No element carries the requested id
    #[error("no <template> for <{element_name}>: searched for id '{element_name}', found {}", describe_blocks(.found))]
    NotFound {
        element_name: String,
        /// Ids of the template blocks in the document, in document order
        found: Vec<Option<String>>,
    },

    /// The id matched an element that is not a template block
    #[error("element with id '{element_name}' is a <{found}>, not a <template>")]
    NotATemplate { element_name: String, found: String },
}

fn format_markup_errors(errors: &[MarkupError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

fn describe_blocks(found: &[Option<String>]) -> String {
    if found.is_empty() {
        return "no template blocks".to_string();
    }
    let ids = found
        .iter()
        .map(|id| match id {
            Some(id) => format!("'{}'", id),
            None => "<anonymous>".to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ");
    let plural = if found.len() == 1 { "" } else { "s" };
    format!("{} template block{} ({})", found.len(), plural, ids)
}
