//! A small CSS selector subset for locating handle elements.
//!
//! Supported: type selectors and `*`, `#id`, `.class`, `[attr]`,
//! `[attr=value]` (value bare or quoted), joined by descendant (whitespace)
//! or child (`>`) combinators.

use super::{Document, NodeId};
use thiserror::Error;

/// Selector parse errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("Empty selector")]
    Empty,
    #[error("Unexpected '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    #[error("Expected a name at position {pos}")]
    ExpectedName { pos: usize },
    #[error("Unterminated attribute selector")]
    UnterminatedAttribute,
    #[error("Selector ends with a combinator")]
    DanglingCombinator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttributeMatch {
    name: String,
    value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttributeMatch>,
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none()
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attributes.is_empty()
    }

    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let Some(tag) = doc.tag(node) else {
            return false;
        };
        if self.tag.as_deref().is_some_and(|t| t != "*" && t != tag) {
            return false;
        }
        if let Some(id) = &self.id {
            if doc.attribute(node, "id") != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| doc.has_class(node, c)) {
            return false;
        }
        self.attributes.iter().all(|attr| match (&attr.value, doc.attribute(node, &attr.name)) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(expected), Some(actual)) => expected == actual,
        })
    }
}

/// A parsed selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    /// Compounds left to right; `combinators[i]` joins `compounds[i]` and `compounds[i + 1]`.
    compounds: Vec<Compound>,
    combinators: Vec<Combinator>,
}

impl Selector {
    /// Parse a selector string.
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        Parser::new(input).parse()
    }

    /// Check if an element matches. Ancestor compounds may match outside any query scope.
    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        self.matches_at(doc, node, self.compounds.len() - 1)
    }

    fn matches_at(&self, doc: &Document, node: NodeId, index: usize) -> bool {
        if !self.compounds[index].matches(doc, node) {
            return false;
        }
        if index == 0 {
            return true;
        }
        match self.combinators[index - 1] {
            Combinator::Child => doc
                .parent(node)
                .is_some_and(|parent| self.matches_at(doc, parent, index - 1)),
            Combinator::Descendant => {
                let mut ancestor = doc.parent(node);
                while let Some(candidate) = ancestor {
                    if self.matches_at(doc, candidate, index - 1) {
                        return true;
                    }
                    ancestor = doc.parent(candidate);
                }
                false
            }
        }
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos != start
    }

    fn is_name_char(c: char) -> bool {
        c.is_alphanumeric() || c == '-' || c == '_'
    }

    fn name(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        while self.peek().is_some_and(Self::is_name_char) {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(SelectorError::ExpectedName { pos: start });
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn parse(mut self) -> Result<Selector, SelectorError> {
        self.skip_whitespace();
        if self.peek().is_none() {
            return Err(SelectorError::Empty);
        }

        let mut compounds = vec![self.compound()?];
        let mut combinators = Vec::new();
        loop {
            let had_space = self.skip_whitespace();
            let combinator = match self.peek() {
                None => break,
                Some('>') => {
                    self.pos += 1;
                    self.skip_whitespace();
                    Combinator::Child
                }
                Some(_) if had_space => Combinator::Descendant,
                Some(ch) => return Err(SelectorError::UnexpectedChar { ch, pos: self.pos }),
            };
            if self.peek().is_none() {
                return Err(SelectorError::DanglingCombinator);
            }
            combinators.push(combinator);
            compounds.push(self.compound()?);
        }

        Ok(Selector {
            compounds,
            combinators,
        })
    }

    fn compound(&mut self) -> Result<Compound, SelectorError> {
        let mut compound = Compound::default();
        match self.peek() {
            Some('*') => {
                self.pos += 1;
                compound.tag = Some("*".to_string());
            }
            Some(c) if Self::is_name_char(c) => {
                compound.tag = Some(self.name()?.to_ascii_lowercase());
            }
            _ => {}
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    compound.id = Some(self.name()?);
                }
                Some('.') => {
                    self.pos += 1;
                    compound.classes.push(self.name()?);
                }
                Some('[') => {
                    self.pos += 1;
                    compound.attributes.push(self.attribute()?);
                }
                _ => break,
            }
        }

        if compound.is_empty() {
            return Err(match self.peek() {
                Some(ch) => SelectorError::UnexpectedChar { ch, pos: self.pos },
                None => SelectorError::ExpectedName { pos: self.pos },
            });
        }
        Ok(compound)
    }

    fn attribute(&mut self) -> Result<AttributeMatch, SelectorError> {
        self.skip_whitespace();
        let name = self.name()?;
        self.skip_whitespace();
        let value = match self.peek() {
            Some(']') => None,
            Some('=') => {
                self.pos += 1;
                self.skip_whitespace();
                Some(self.attribute_value()?)
            }
            Some(ch) => return Err(SelectorError::UnexpectedChar { ch, pos: self.pos }),
            None => return Err(SelectorError::UnterminatedAttribute),
        };
        self.skip_whitespace();
        match self.peek() {
            Some(']') => {
                self.pos += 1;
                Ok(AttributeMatch { name, value })
            }
            Some(ch) => Err(SelectorError::UnexpectedChar { ch, pos: self.pos }),
            None => Err(SelectorError::UnterminatedAttribute),
        }
    }

    fn attribute_value(&mut self) -> Result<String, SelectorError> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                let start = self.pos;
                while let Some(c) = self.peek() {
                    if c == quote {
                        let value = self.chars[start..self.pos].iter().collect();
                        self.pos += 1;
                        return Ok(value);
                    }
                    self.pos += 1;
                }
                Err(SelectorError::UnterminatedAttribute)
            }
            _ => self.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let panel = doc.create_element("section");
        let grip = doc.create_element("div");
        let inner = doc.create_element("span");
        doc.append_child(doc.body(), panel).unwrap();
        doc.append_child(panel, grip).unwrap();
        doc.append_child(grip, inner).unwrap();
        doc.set_id(panel, "panel");
        doc.add_class(grip, "grip");
        doc.add_class(grip, "east");
        doc.set_attribute(grip, "data-dir", "e");
        doc.set_attribute(inner, "east", "");
        (doc, panel, grip, inner)
    }

    #[test]
    fn test_compound_selectors() {
        let (doc, panel, grip, inner) = tree();
        let m = |s: &str, n| Selector::parse(s).unwrap().matches(&doc, n);

        assert!(m("section", panel));
        assert!(m("#panel", panel));
        assert!(m("div.grip.east", grip));
        assert!(!m("div.grip.west", grip));
        assert!(m("[data-dir]", grip));
        assert!(m("[data-dir=e]", grip));
        assert!(m("[data-dir='e']", grip));
        assert!(!m("[data-dir=\"w\"]", grip));
        assert!(m("*[east]", inner));
    }

    #[test]
    fn test_combinators() {
        let (doc, panel, grip, inner) = tree();
        let m = |s: &str, n| Selector::parse(s).unwrap().matches(&doc, n);

        assert!(m("#panel span", inner));
        assert!(m("#panel > .grip", grip));
        assert!(!m("#panel > span", inner));
        assert!(m("body section > div span", inner));
        assert!(!m("span #panel", panel));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Selector::parse("   "), Err(SelectorError::Empty));
        assert_eq!(Selector::parse("div >"), Err(SelectorError::DanglingCombinator));
        assert_eq!(Selector::parse("[data-dir"), Err(SelectorError::UnterminatedAttribute));
        assert_eq!(
            Selector::parse(".a,.b"),
            Err(SelectorError::UnexpectedChar { ch: ',', pos: 2 })
        );
        assert_eq!(Selector::parse("."), Err(SelectorError::ExpectedName { pos: 1 }));
        assert!(matches!(
            Selector::parse("> div"),
            Err(SelectorError::UnexpectedChar { ch: '>', .. })
        ));
    }
}
