//! Selector chains
//!
//! Compiled form of selector strings such as `main > section#id a[href]`.
//! Supported syntax:
//! - type selector `tag` or universal `*`
//! - `#id`, `.class` (repeatable)
//! - `[attr]`, `[attr=value]`, `[attr="value"]`, `[attr='value']`
//! - combinators: descendant (whitespace), child `>`, subsequent-sibling `~`
//! - a leading `>` or `~` relates the first compound to the anchor
//!
//! Tag and attribute names are matched ASCII case-insensitively; attribute
//! values, ids and classes are case-sensitive.

use serde::Serialize;
use std::fmt;

/// Relationship between a compound selector and the node before it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Combinator {
    /// No anchor constraint: anywhere in the document
    Root,
    /// ` ` - any depth below the previous node
    Descendant,
    /// `>` - direct child of the previous node
    Child,
    /// `~` - later sibling of the previous node
    SubsequentSibling,
}

impl Combinator {
    /// Parse a concat-mode token
    pub fn from_concat(token: &str) -> Option<Self> {
        match token {
            "child" => Some(Self::Child),
            "descendant" => Some(Self::Descendant),
            "SubsequentSibling" | "~" => Some(Self::SubsequentSibling),
            _ => None,
        }
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Root => "root",
            Self::Descendant => "descendant",
            Self::Child => ">",
            Self::SubsequentSibling => "~",
        })
    }
}

/// Attribute selector: `[name]` or `[name=value]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeSelector {
    pub name: String,
    pub value: Option<String>,
}

impl AttributeSelector {
    /// Check an attribute value (None = attribute absent)
    pub fn matches(&self, value: Option<&str>) -> bool {
        match (&self.value, value) {
            (None, Some(_)) => true,
            (Some(expected), Some(actual)) => expected == actual,
            (_, None) => false,
        }
    }
}

/// One compound selector plus its combinator to the previous node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selector {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: Vec<AttributeSelector>,
    pub combinator: Combinator,
}

impl Selector {
    fn new(combinator: Combinator) -> Self {
        Self {
            tag: None,
            id: None,
            classes: Vec::new(),
            attributes: Vec::new(),
            combinator,
        }
    }
}

/// Selector syntax error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at offset {offset}")]
pub struct SelectorError {
    pub offset: usize,
    pub message: String,
}

/// Parsed selector string: compounds in left-to-right order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectorChain {
    source: String,
    parts: Vec<Selector>,
    #[serde(skip)]
    written_lead: Option<Combinator>,
}

impl SelectorChain {
    /// Parse a selector string
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        Parser { src: source, pos: 0 }.parse_chain()
    }

    /// Original selector text
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Compound selectors, left to right
    pub fn parts(&self) -> &[Selector] {
        &self.parts
    }

    /// Combinator written before the first compound (`> a`, `~ p`), if any
    pub fn written_lead(&self) -> Option<Combinator> {
        self.written_lead
    }

    /// Combinator between the first compound and the anchor
    pub fn lead(&self) -> Combinator {
        self.parts.first().map_or(Combinator::Descendant, |p| p.combinator)
    }

    pub(crate) fn set_lead(&mut self, combinator: Combinator) {
        if let Some(first) = self.parts.first_mut() {
            first.combinator = combinator;
        }
    }
}

impl fmt::Display for SelectorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Returns true when any whitespace was skipped
    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
        self.pos != start
    }

    fn error<T>(&self, message: impl Into<String>) -> Result<T, SelectorError> {
        Err(SelectorError { offset: self.pos, message: message.into() })
    }

    fn ident(&mut self) -> Option<&'a str> {
        let src = self.src;
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.bump();
        }
        (self.pos > start).then(|| &src[start..self.pos])
    }

    fn parse_chain(mut self) -> Result<SelectorChain, SelectorError> {
        self.skip_ws();

        let written_lead = match self.peek() {
            Some('>') => Some(Combinator::Child),
            Some('~') => Some(Combinator::SubsequentSibling),
            Some('+') => return self.error("next-sibling combinator `+` is not supported"),
            _ => None,
        };
        if written_lead.is_some() {
            self.bump();
            self.skip_ws();
        }

        let mut parts = Vec::new();
        let mut combinator = written_lead.unwrap_or(Combinator::Descendant);

        loop {
            parts.push(self.parse_compound(combinator)?);

            let had_ws = self.skip_ws();
            combinator = match self.peek() {
                None => break,
                Some('>') => Combinator::Child,
                Some('~') => Combinator::SubsequentSibling,
                Some('+') => return self.error("next-sibling combinator `+` is not supported"),
                Some(',') => return self.error("selector lists (`,`) are not supported, use or()"),
                Some(_) if had_ws => Combinator::Descendant,
                Some(c) => return self.error(format!("unexpected `{c}`")),
            };
            if combinator != Combinator::Descendant {
                self.bump();
                self.skip_ws();
            }
        }

        Ok(SelectorChain {
            source: self.src.trim().to_string(),
            parts,
            written_lead,
        })
    }

    fn parse_compound(&mut self, combinator: Combinator) -> Result<Selector, SelectorError> {
        let start = self.pos;
        let mut sel = Selector::new(combinator);

        if self.peek() == Some('*') {
            self.bump();
        } else if let Some(tag) = self.ident() {
            sel.tag = Some(tag.to_ascii_lowercase());
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.bump();
                    let Some(id) = self.ident() else {
                        return self.error("expected an id after `#`");
                    };
                    if sel.id.is_some() {
                        return self.error("a compound selector can carry only one id");
                    }
                    sel.id = Some(id.to_string());
                }
                Some('.') => {
                    self.bump();
                    let Some(class) = self.ident() else {
                        return self.error("expected a class name after `.`");
                    };
                    sel.classes.push(class.to_string());
                }
                Some('[') => {
                    self.bump();
                    let attr = self.parse_attribute()?;
                    sel.attributes.push(attr);
                }
                Some(':') => return self.error("pseudo-classes are not supported"),
                _ => break,
            }
        }

        if self.pos == start {
            return match self.peek() {
                Some(c) => self.error(format!("expected a selector, found `{c}`")),
                None => self.error("expected a selector"),
            };
        }
        Ok(sel)
    }

    fn parse_attribute(&mut self) -> Result<AttributeSelector, SelectorError> {
        self.skip_ws();
        let Some(name) = self.ident() else {
            return self.error("expected an attribute name");
        };
        let name = name.to_ascii_lowercase();
        self.skip_ws();

        let value = match self.bump() {
            Some(']') => return Ok(AttributeSelector { name, value: None }),
            Some('=') => {
                self.skip_ws();
                let value = self.parse_value()?;
                self.skip_ws();
                value
            }
            Some(op @ ('^' | '$' | '*' | '~' | '|')) => {
                return self.error(format!("attribute operator `{op}=` is not supported"));
            }
            Some(c) => return self.error(format!("unexpected `{c}` in attribute selector")),
            None => return self.error("unterminated attribute selector"),
        };

        match self.bump() {
            Some(']') => Ok(AttributeSelector { name, value: Some(value) }),
            _ => self.error("expected `]`"),
        }
    }

    fn parse_value(&mut self) -> Result<String, SelectorError> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                let mut value = String::new();
                loop {
                    match self.bump() {
                        Some('\\') => match self.bump() {
                            Some(c) => value.push(c),
                            None => return self.error("unterminated string"),
                        },
                        Some(c) if c == quote => return Ok(value),
                        Some(c) => value.push(c),
                        None => return self.error("unterminated string"),
                    }
                }
            }
            _ => match self.ident() {
                Some(v) => Ok(v.to_string()),
                None => self.error("expected an attribute value"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(s: &str) -> Vec<Selector> {
        SelectorChain::parse(s).unwrap().parts().to_vec()
    }

    #[test]
    fn test_compound_components() {
        let p = parts("element#id.class.other[href][type=\"text\"]");
        assert_eq!(p.len(), 1);
        assert_eq!(p[0].tag.as_deref(), Some("element"));
        assert_eq!(p[0].id.as_deref(), Some("id"));
        assert_eq!(p[0].classes, vec!["class", "other"]);
        assert_eq!(p[0].attributes, vec![
            AttributeSelector { name: "href".into(), value: None },
            AttributeSelector { name: "type".into(), value: Some("text".into()) },
        ]);
    }

    #[test]
    fn test_combinators() {
        let p = parts("main > section#id a ~ p");
        let combs: Vec<Combinator> = p.iter().map(|s| s.combinator).collect();
        assert_eq!(combs, vec![
            Combinator::Descendant,
            Combinator::Child,
            Combinator::Descendant,
            Combinator::SubsequentSibling,
        ]);
    }

    #[test]
    fn test_compact_combinators() {
        assert_eq!(parts("div>p").len(), 2);
        assert_eq!(parts("div>p")[1].combinator, Combinator::Child);
        assert_eq!(parts("h1~p")[1].combinator, Combinator::SubsequentSibling);
    }

    #[test]
    fn test_leading_combinator() {
        let chain = SelectorChain::parse("> a[href]").unwrap();
        assert_eq!(chain.written_lead(), Some(Combinator::Child));
        assert_eq!(chain.lead(), Combinator::Child);
        assert_eq!(chain.source(), "> a[href]");

        let chain = SelectorChain::parse("a").unwrap();
        assert_eq!(chain.written_lead(), None);
    }

    #[test]
    fn test_names_lowercased_values_kept() {
        let p = parts("DIV[DATA-X=Hello]");
        assert_eq!(p[0].tag.as_deref(), Some("div"));
        assert_eq!(p[0].attributes[0].name, "data-x");
        assert_eq!(p[0].attributes[0].value.as_deref(), Some("Hello"));
    }

    #[test]
    fn test_quoted_values() {
        let p = parts("a[href='https://www.example.com/a b']");
        assert_eq!(p[0].attributes[0].value.as_deref(), Some("https://www.example.com/a b"));
        let p = parts(r#"a[title="say \"hi\""]"#);
        assert_eq!(p[0].attributes[0].value.as_deref(), Some("say \"hi\""));
    }

    #[test]
    fn test_universal() {
        let p = parts("* > *.x");
        assert_eq!(p.len(), 2);
        assert!(p[0].tag.is_none());
        assert_eq!(p[1].classes, vec!["x"]);
    }

    #[test]
    fn test_rejections() {
        for bad in [
            "", "  ", "a + b", "a, b", "a:hover", "a[href^=x]", "a[href", "#", ".",
            "a >", "a#x#y", "a[=x]", "a[href='x]", "a!",
        ] {
            assert!(SelectorChain::parse(bad).is_err(), "`{bad}` should not parse");
        }
    }

    #[test]
    fn test_error_offset() {
        let err = SelectorChain::parse("div a:hover").unwrap_err();
        assert_eq!(err.offset, 5);
        assert!(err.message.contains("pseudo"));
    }

    #[test]
    fn test_attribute_matches() {
        let presence = AttributeSelector { name: "href".into(), value: None };
        assert!(presence.matches(Some("")));
        assert!(!presence.matches(None));

        let exact = AttributeSelector { name: "type".into(), value: Some("text".into()) };
        assert!(exact.matches(Some("text")));
        assert!(!exact.matches(Some("TEXT")));
        assert!(!exact.matches(None));
    }

    #[test]
    fn test_concat_tokens() {
        assert_eq!(Combinator::from_concat("child"), Some(Combinator::Child));
        assert_eq!(Combinator::from_concat("descendant"), Some(Combinator::Descendant));
        assert_eq!(Combinator::from_concat("SubsequentSibling"), Some(Combinator::SubsequentSibling));
        assert_eq!(Combinator::from_concat("~"), Some(Combinator::SubsequentSibling));
        assert_eq!(Combinator::from_concat(">"), None);
        assert_eq!(Combinator::from_concat("sibling"), None);
    }
}
