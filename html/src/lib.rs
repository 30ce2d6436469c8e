use std::collections::HashMap;
use std::fmt::Display;

/// Name of the synthetic element every parsed document is rooted at
pub const DOCUMENT: &str = "#document";

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct DOMElement {
    pub name: String,
    pub attributes: DOMAttributes,
    pub contents: Vec<DOMContent>,
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub enum DOMContent {
    Element(DOMElement),
    Text(String),
}

#[derive(PartialEq, Eq, Clone, Debug, Default)]
pub struct DOMAttributes(pub HashMap<String, String>);

impl DOMAttributes {
    pub fn empty() -> Self {
        Self(HashMap::new())
    }
    pub fn get(&self, name: &str) -> Option<&String> {
        self.0.get(name)
    }
}

#[macro_export]
macro_rules! attributes {
    ($($k:literal => $v:literal),* $(,)?) => {
        $crate::DOMAttributes(::std::collections::HashMap::from([
            $(($k.to_string(), $v.to_string())),*
        ]))
    };
}

impl From<DOMElement> for DOMContent {
    fn from(e: DOMElement) -> Self {
        DOMContent::Element(e)
    }
}

impl From<&str> for DOMContent {
    fn from(s: &str) -> Self {
        DOMContent::Text(s.to_string())
    }
}

impl From<String> for DOMContent {
    fn from(s: String) -> Self {
        DOMContent::Text(s)
    }
}

impl DOMElement {
    pub fn new(
        name: impl Display,
        attributes: Option<DOMAttributes>,
        contents: Vec<DOMContent>,
    ) -> Self {
        Self {
            name: name.to_string(),
            attributes: attributes.unwrap_or_default(),
            contents,
        }
    }

    pub fn get_attribute(&self, name: &str) -> Option<&String> {
        self.attributes.get(name)
    }

    /// Checks that every `(name, value)` pair is present with exactly that value
    pub fn has_attributes(&self, attrs: &[(&str, &str)]) -> bool {
        attrs
            .iter()
            .all(|(k, v)| self.get_attribute(k).map(String::as_str) == Some(*v))
    }

    /// Direct child elements, skipping text
    pub fn children(&self) -> impl Iterator<Item = &DOMElement> {
        self.contents.iter().filter_map(|c| match c {
            DOMContent::Element(e) => Some(e),
            DOMContent::Text(_) => None,
        })
    }

    /// All elements below this one in document order (not including `self`)
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children().collect::<Vec<_>>().into_iter().rev().collect(),
        }
    }

    /// Returns the elements named `name`: direct children, or every descendant if `recursive`
    pub fn get_elements_by_name(&self, name: &str, recursive: bool) -> Vec<&DOMElement> {
        if recursive {
            self.descendants().filter(|e| e.name == name).collect()
        } else {
            self.children().filter(|e| e.name == name).collect()
        }
    }

    /// First descendant named `name` carrying all of `attrs`
    pub fn find_element(&self, name: &str, attrs: &[(&str, &str)]) -> Option<&DOMElement> {
        self.descendants()
            .find(|e| e.name == name && e.has_attributes(attrs))
    }

    /// Every descendant named `name` carrying all of `attrs`, in document order
    pub fn find_elements(&self, name: &str, attrs: &[(&str, &str)]) -> Vec<&DOMElement> {
        self.descendants()
            .filter(|e| e.name == name && e.has_attributes(attrs))
            .collect()
    }

    /// Nearest element named `name` enclosing `descendant`, looking no higher than `self`.
    ///
    /// `descendant` is matched by identity, so it must be a reference into this tree.
    pub fn find_ancestor<'a>(
        &'a self,
        descendant: &DOMElement,
        name: &str,
    ) -> Option<&'a DOMElement> {
        // Each entry is an open element and its unvisited contents
        let mut path = vec![(self, self.contents.iter())];
        while let Some((_, contents)) = path.last_mut() {
            match contents.next() {
                Some(DOMContent::Element(child)) if std::ptr::eq(child, descendant) => {
                    return path.iter().rev().map(|(e, _)| *e).find(|e| e.name == name);
                }
                Some(DOMContent::Element(child)) => path.push((child, child.contents.iter())),
                Some(DOMContent::Text(_)) => {}
                None => {
                    path.pop();
                }
            }
        }
        None
    }

    /// Concatenation of every text node below this element
    pub fn text(&self) -> String {
        let mut buf = String::new();
        let mut stack = vec![self.contents.iter()];
        while let Some(contents) = stack.last_mut() {
            match contents.next() {
                Some(DOMContent::Text(t)) => buf.push_str(t),
                Some(DOMContent::Element(e)) => stack.push(e.contents.iter()),
                None => {
                    stack.pop();
                }
            }
        }
        buf
    }
}

impl Drop for DOMElement {
    // Unnest before dropping so deep trees don't recurse
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.contents);
        while let Some(content) = pending.pop() {
            if let DOMContent::Element(mut e) = content {
                pending.append(&mut e.contents);
            }
        }
    }
}

/// Pre-order iterator over the elements of a tree
pub struct Descendants<'a> {
    stack: Vec<&'a DOMElement>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a DOMElement;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        let len = self.stack.len();
        self.stack.extend(next.children());
        self.stack[len..].reverse();
        Some(next)
    }
}

mod parsing;

pub use parsing::document;
