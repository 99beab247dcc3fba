//! Arena DOM for offline sessions.
//!
//! Nodes are never reused. Removing or replacing a subtree marks it detached,
//! which is what makes old handles stale. Selector support covers what page
//! objects use: type, `#id`, `.class`, `[attr]`, `[attr='v']`, `*`, compound
//! selectors and the descendant combinator.

use std::collections::BTreeMap;
use std::fmt;

/// Index of a node in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Inline style properties the visibility rules look at
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineStyle {
    /// `display`
    pub display: Option<String>,
    /// `visibility`
    pub visibility: Option<String>,
    /// `opacity`
    pub opacity: Option<String>,
}

/// Computed values of the three visibility properties
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputedStyle {
    /// `display` (not inherited)
    pub display: String,
    /// `visibility` (inherited)
    pub visibility: String,
    /// `opacity` (not inherited)
    pub opacity: String,
}

impl ComputedStyle {
    /// The three-part visibility predicate
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.display != "none" && self.visibility != "hidden" && self.opacity != "0"
    }
}

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    attrs: BTreeMap<String, String>,
    text: String,
    value: Option<String>,
    disabled: bool,
    style: InlineStyle,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attached: bool,
}

/// Mutable document tree
#[derive(Debug, Clone)]
pub struct MockDom {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for MockDom {
    fn default() -> Self {
        Self::new()
    }
}

const FORM_CONTROLS: [&str; 3] = ["input", "select", "textarea"];

impl MockDom {
    /// Empty document with a `body` root
    #[must_use]
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        let root = dom.create("body");
        dom.node_mut(root).attached = true;
        dom.root = root;
        dom
    }

    /// The `body` element
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Create a detached element
    pub fn create(&mut self, tag: &str) -> NodeId {
        let tag = tag.to_ascii_lowercase();
        let value = FORM_CONTROLS.contains(&tag.as_str()).then(String::new);
        self.nodes.push(Node {
            tag,
            attrs: BTreeMap::new(),
            text: String::new(),
            value,
            disabled: false,
            style: InlineStyle::default(),
            parent: None,
            children: Vec::new(),
            attached: false,
        });
        NodeId(self.nodes.len() - 1)
    }

    /// Append `child` to `parent`, detaching it from any previous parent
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.remove(child);
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.push(child);
        let attached = self.node(parent).attached;
        self.set_attached(child, attached);
    }

    /// Create an element with attributes under `parent`
    pub fn el(&mut self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let id = self.create(tag);
        for (name, value) in attrs {
            self.set_attr(id, name, value);
        }
        self.append(parent, id);
        id
    }

    /// Create an element with attributes and text under `parent`
    pub fn el_text(
        &mut self,
        parent: NodeId,
        tag: &str,
        attrs: &[(&str, &str)],
        text: &str,
    ) -> NodeId {
        let id = self.el(parent, tag, attrs);
        self.node_mut(id).text = text.to_string();
        id
    }

    /// Detach `id` from its parent
    pub fn remove(&mut self, id: NodeId) {
        if let Some(parent) = self.node(id).parent {
            self.node_mut(parent).children.retain(|c| *c != id);
            self.node_mut(id).parent = None;
            self.set_attached(id, false);
        }
    }

    /// Detach every child of `id` (`innerHTML = ""`)
    pub fn clear_children(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.node_mut(id).children);
        for child in children {
            self.node_mut(child).parent = None;
            self.set_attached(child, false);
        }
    }

    fn set_attached(&mut self, id: NodeId, attached: bool) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = self.node_mut(current);
            node.attached = attached;
            stack.extend(node.children.iter().copied());
        }
    }

    /// Whether the node is still part of the document
    #[must_use]
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.nodes.get(id.0).is_some_and(|n| n.attached)
    }

    /// Lowercase tag name
    #[must_use]
    pub fn tag(&self, id: NodeId) -> &str {
        &self.node(id).tag
    }

    /// Parent element
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Child elements
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Set an attribute
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        self.node_mut(id)
            .attrs
            .insert(name.to_string(), value.to_string());
    }

    /// Read an attribute
    #[must_use]
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id).attrs.get(name).map(String::as_str)
    }

    /// Whether the `class` attribute lists `class`
    #[must_use]
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attr(id, "class")
            .is_some_and(|c| c.split_whitespace().any(|x| x == class))
    }

    /// Replace own text and drop all children (`textContent = ...`)
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        self.clear_children(id);
        self.node_mut(id).text = text.to_string();
    }

    /// Concatenated text of the node and all descendants
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = self.node(id).text.clone();
        for child in &self.node(id).children {
            out.push_str(&self.text_content(*child));
        }
        out
    }

    /// Text as a user sees it: hidden subtrees contribute nothing
    #[must_use]
    pub fn rendered_text(&self, id: NodeId) -> String {
        self.rendered_text_inner(id).trim().to_string()
    }

    fn rendered_text_inner(&self, id: NodeId) -> String {
        if !self.is_displayed(id) {
            return String::new();
        }
        let mut out = self.node(id).text.clone();
        for child in &self.node(id).children {
            out.push_str(&self.rendered_text_inner(*child));
        }
        out
    }

    /// Live `value` property of form controls
    #[must_use]
    pub fn value(&self, id: NodeId) -> Option<&str> {
        self.node(id).value.as_deref()
    }

    /// Assign the `value` property
    pub fn set_value(&mut self, id: NodeId, value: &str) {
        self.node_mut(id).value = Some(value.to_string());
    }

    /// Set the `disabled` property
    pub fn set_disabled(&mut self, id: NodeId, disabled: bool) {
        self.node_mut(id).disabled = disabled;
    }

    /// Read the `disabled` property
    #[must_use]
    pub fn is_disabled(&self, id: NodeId) -> bool {
        self.node(id).disabled
    }

    /// Set inline `display`
    pub fn set_display(&mut self, id: NodeId, value: &str) {
        self.node_mut(id).style.display = Some(value.to_string());
    }

    /// Set inline `visibility`
    pub fn set_visibility(&mut self, id: NodeId, value: &str) {
        self.node_mut(id).style.visibility = Some(value.to_string());
    }

    /// Set inline `opacity`
    pub fn set_opacity(&mut self, id: NodeId, value: &str) {
        self.node_mut(id).style.opacity = Some(value.to_string());
    }

    /// `getComputedStyle` restricted to the visibility properties
    #[must_use]
    pub fn computed_style(&self, id: NodeId) -> ComputedStyle {
        let style = &self.node(id).style;
        let mut visibility = None;
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if let Some(v) = &self.node(current).style.visibility {
                visibility = Some(v.clone());
                break;
            }
            cursor = self.node(current).parent;
        }
        ComputedStyle {
            display: style.display.clone().unwrap_or_else(|| "block".to_string()),
            visibility: visibility.unwrap_or_else(|| "visible".to_string()),
            opacity: style.opacity.clone().unwrap_or_else(|| "1".to_string()),
        }
    }

    /// Rendered: attached, no ancestor with `display: none` or
    /// `opacity: 0`, and not `visibility: hidden`
    #[must_use]
    pub fn is_displayed(&self, id: NodeId) -> bool {
        if !self.is_attached(id) {
            return false;
        }
        if self.computed_style(id).visibility == "hidden" {
            return false;
        }
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let style = &self.node(current).style;
            if style.display.as_deref() == Some("none") || style.opacity.as_deref() == Some("0") {
                return false;
            }
            cursor = self.node(current).parent;
        }
        true
    }

    /// First attached element with that id
    #[must_use]
    pub fn by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|n| self.attr(*n, "id") == Some(id))
    }

    /// Every attached element matching `selector`, in document order
    pub fn query_all(&self, selector: &str) -> Result<Vec<NodeId>, SelectorError> {
        let parsed = Selector::parse(selector)?;
        Ok(self
            .descendants(self.root)
            .into_iter()
            .filter(|n| self.matches_parsed(*n, &parsed))
            .collect())
    }

    /// First attached element matching `selector`
    pub fn query(&self, selector: &str) -> Result<Option<NodeId>, SelectorError> {
        Ok(self.query_all(selector)?.into_iter().next())
    }

    /// Matching elements inside `scope` (excluding `scope` itself)
    pub fn query_within(
        &self,
        scope: NodeId,
        selector: &str,
    ) -> Result<Vec<NodeId>, SelectorError> {
        let parsed = Selector::parse(selector)?;
        let mut all = self.descendants(scope);
        all.retain(|n| *n != scope && self.matches_parsed(*n, &parsed));
        Ok(all)
    }

    /// Nearest inclusive ancestor matching `selector`
    pub fn closest(&self, id: NodeId, selector: &str) -> Result<Option<NodeId>, SelectorError> {
        let parsed = Selector::parse(selector)?;
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if self.matches_parsed(current, &parsed) {
                return Ok(Some(current));
            }
            cursor = self.node(current).parent;
        }
        Ok(None)
    }

    /// Whether `id` matches `selector`
    pub fn matches(&self, id: NodeId, selector: &str) -> Result<bool, SelectorError> {
        Ok(self.matches_parsed(id, &Selector::parse(selector)?))
    }

    fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![scope];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.node(current).children.iter().rev().copied());
        }
        out
    }

    fn matches_parsed(&self, id: NodeId, selector: &Selector) -> bool {
        let Some((last, ancestors)) = selector.parts.split_last() else {
            return false;
        };
        if !self.matches_compound(id, last) {
            return false;
        }
        let mut cursor = self.node(id).parent;
        for compound in ancestors.iter().rev() {
            loop {
                match cursor {
                    None => return false,
                    Some(current) => {
                        cursor = self.node(current).parent;
                        if self.matches_compound(current, compound) {
                            break;
                        }
                    }
                }
            }
        }
        true
    }

    fn is_first_of_type(&self, id: NodeId) -> bool {
        let Some(parent) = self.node(id).parent else {
            return true;
        };
        let tag = &self.node(id).tag;
        self.node(parent)
            .children
            .iter()
            .copied()
            .find(|c| self.node(*c).tag == *tag)
            == Some(id)
    }

    fn matches_compound(&self, id: NodeId, compound: &Compound) -> bool {
        let node = self.node(id);
        if let Some(tag) = &compound.tag {
            if *tag != node.tag {
                return false;
            }
        }
        if let Some(want) = &compound.id {
            if node.attrs.get("id") != Some(want) {
                return false;
            }
        }
        if !compound.classes.iter().all(|c| self.has_class(id, c)) {
            return false;
        }
        if compound.first_of_type && !self.is_first_of_type(id) {
            return false;
        }
        compound.attrs.iter().all(|a| match (&a.value, node.attrs.get(&a.name)) {
            (None, found) => found.is_some(),
            (Some(want), Some(found)) => want == found,
            (Some(_), None) => false,
        })
    }
}

/// Selector text the matcher does not understand
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorError {
    /// Offending selector
    pub selector: String,
    /// What went wrong
    pub reason: String,
}

impl fmt::Display for SelectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid selector {:?}: {}", self.selector, self.reason)
    }
}

impl std::error::Error for SelectorError {}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrMatch>,
    first_of_type: bool,
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none()
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attrs.is_empty()
            && !self.first_of_type
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrMatch {
    name: String,
    value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Selector {
    parts: Vec<Compound>,
}

struct Cursor<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    source: &'a str,
}

impl Cursor<'_> {
    fn fail<T>(&self, reason: &str) -> Result<T, SelectorError> {
        Err(SelectorError {
            selector: self.source.to_string(),
            reason: reason.to_string(),
        })
    }

    fn ident(&mut self) -> Result<String, SelectorError> {
        let mut out = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() {
                out.push(c);
                self.chars.next();
            } else if c == '\\' {
                self.chars.next();
                out.push(self.escape()?);
            } else {
                break;
            }
        }
        if out.is_empty() {
            return self.fail("expected identifier");
        }
        Ok(out)
    }

    fn escape(&mut self) -> Result<char, SelectorError> {
        let mut hex = String::new();
        while let Some(&c) = self.chars.peek() {
            if hex.len() < 6 && c.is_ascii_hexdigit() {
                hex.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        if hex.is_empty() {
            return match self.chars.next() {
                Some(c) => Ok(c),
                None => self.fail("dangling escape"),
            };
        }
        if self.chars.peek() == Some(&' ') {
            self.chars.next();
        }
        match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
            Some(c) => Ok(c),
            None => self.fail("bad hex escape"),
        }
    }

    fn quoted(&mut self, quote: char) -> Result<String, SelectorError> {
        let mut out = String::new();
        loop {
            match self.chars.next() {
                Some(c) if c == quote => return Ok(out),
                Some('\\') => out.push(self.escape()?),
                Some(c) => out.push(c),
                None => return self.fail("unterminated string"),
            }
        }
    }

    fn attribute(&mut self) -> Result<AttrMatch, SelectorError> {
        let name = self.ident()?;
        match self.chars.next() {
            Some(']') => Ok(AttrMatch { name, value: None }),
            Some('=') => {
                let value = match self.chars.peek() {
                    Some(&q @ ('\'' | '"')) => {
                        self.chars.next();
                        self.quoted(q)?
                    }
                    _ => self.ident()?,
                };
                match self.chars.next() {
                    Some(']') => Ok(AttrMatch {
                        name,
                        value: Some(value),
                    }),
                    _ => self.fail("expected ]"),
                }
            }
            _ => self.fail("unsupported attribute operator"),
        }
    }
}

impl Selector {
    fn parse(source: &str) -> Result<Self, SelectorError> {
        let mut cursor = Cursor {
            chars: source.chars().peekable(),
            source,
        };
        let mut parts = Vec::new();
        let mut current = Compound::default();
        let mut universal = false;

        while let Some(&c) = cursor.chars.peek() {
            match c {
                ' ' | '\t' | '\n' => {
                    cursor.chars.next();
                    if !current.is_empty() || universal {
                        parts.push(std::mem::take(&mut current));
                        universal = false;
                    }
                }
                '#' => {
                    cursor.chars.next();
                    current.id = Some(cursor.ident()?);
                }
                '.' => {
                    cursor.chars.next();
                    current.classes.push(cursor.ident()?);
                }
                '[' => {
                    cursor.chars.next();
                    current.attrs.push(cursor.attribute()?);
                }
                '*' => {
                    cursor.chars.next();
                    universal = true;
                }
                ':' => {
                    cursor.chars.next();
                    if cursor.ident()? != "first-of-type" {
                        return cursor.fail("unsupported pseudo-class");
                    }
                    current.first_of_type = true;
                }
                c if c.is_ascii_alphabetic() => {
                    if current.tag.is_some() || !current.is_empty() {
                        return cursor.fail("type selector must come first");
                    }
                    current.tag = Some(cursor.ident()?.to_ascii_lowercase());
                }
                _ => return cursor.fail("unsupported syntax"),
            }
        }
        if !current.is_empty() || universal {
            parts.push(current);
        }
        if parts.is_empty() {
            return cursor.fail("empty selector");
        }
        Ok(Self { parts })
    }
}
