use rowan::{NodeOrToken, TextRange, TextSize};
use smol_str::SmolStr;
use std::fmt;
use std::ptr;

use crate::automaton::Automaton;
use crate::language::Language;
use crate::parser::{SyntaxElement, SyntaxKind, SyntaxNode};

/// A visible node or token of a parse tree.
///
/// Cheap to clone; parents are found by walking rowan's cursor, so a `Node`
/// obtained from one root never observes another.
#[derive(Clone)]
pub struct Node {
    element: SyntaxElement,
    language: Language,
}

impl Node {
    pub(crate) fn root(root: SyntaxNode, language: Language) -> Self {
        Self {
            element: NodeOrToken::Node(root),
            language,
        }
    }

    fn wrap(&self, element: SyntaxElement) -> Self {
        Self {
            element,
            language: self.language.clone(),
        }
    }

    fn automaton(&self) -> &Automaton {
        self.language.automaton()
    }

    /// The underlying rowan element.
    pub fn syntax(&self) -> &SyntaxElement {
        &self.element
    }

    fn raw_kind(&self) -> SyntaxKind {
        SyntaxKind::from(self.element.kind())
    }

    /// Grammar symbol of this node; missing placeholders report the symbol
    /// they stand in for.
    pub fn kind(&self) -> SyntaxKind {
        self.raw_kind().symbol()
    }

    pub fn kind_name(&self) -> &str {
        self.automaton().kind_name(self.kind())
    }

    pub fn range(&self) -> TextRange {
        self.element.text_range()
    }

    pub fn start(&self) -> TextSize {
        self.range().start()
    }

    pub fn end(&self) -> TextSize {
        self.range().end()
    }

    pub fn text(&self) -> String {
        match &self.element {
            NodeOrToken::Node(node) => node.text().to_string(),
            NodeOrToken::Token(token) => token.text().to_string(),
        }
    }

    pub fn is_token(&self) -> bool {
        self.element.as_token().is_some()
    }

    /// Recovery output: an `ERROR` node or token, or an `error` node.
    pub fn is_error(&self) -> bool {
        matches!(self.raw_kind(), SyntaxKind::ERROR | SyntaxKind::ERROR_SYMBOL)
    }

    pub fn is_missing(&self) -> bool {
        self.raw_kind().is_missing()
    }

    pub fn is_named(&self) -> bool {
        self.is_error() || self.automaton().is_named(self.kind())
    }

    pub fn is_extra(&self) -> bool {
        self.automaton().is_extra(self.raw_kind())
    }

    /// Whether this node or anything below it is an error or missing.
    pub fn has_error(&self) -> bool {
        match &self.element {
            NodeOrToken::Token(_) => self.is_error() || self.is_missing(),
            NodeOrToken::Node(node) => node.descendants_with_tokens().any(|element| {
                let kind = SyntaxKind::from(element.kind());
                kind.is_missing() || matches!(kind, SyntaxKind::ERROR | SyntaxKind::ERROR_SYMBOL)
            }),
        }
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Visible children, hidden nodes flattened.
    pub fn children(&self) -> Vec<Node> {
        let mut out = Vec::new();
        if let NodeOrToken::Node(node) = &self.element {
            collect_visible(self.automaton(), node, &mut |element| out.push(self.wrap(element)));
        }
        out
    }

    /// Named children, extras excluded.
    pub fn named_children(&self) -> Vec<Node> {
        self.children()
            .into_iter()
            .filter(|child| child.is_named() && !child.is_extra())
            .collect()
    }

    pub fn child_count(&self) -> usize {
        self.children().len()
    }

    pub fn child(&self, index: usize) -> Option<Node> {
        self.children().into_iter().nth(index)
    }

    pub fn named_child(&self, index: usize) -> Option<Node> {
        self.named_children().into_iter().nth(index)
    }

    /// The nearest visible ancestor.
    pub fn parent(&self) -> Option<Node> {
        let mut current = self.element.parent()?;
        loop {
            if current.parent().is_none() || is_visible(self.automaton(), &NodeOrToken::Node(current.clone())) {
                return Some(self.wrap(NodeOrToken::Node(current)));
            }
            current = current.parent()?;
        }
    }

    pub fn next_sibling(&self) -> Option<Node> {
        let siblings = self.parent()?.children();
        let position = siblings.iter().position(|sibling| sibling == self)?;
        siblings.into_iter().nth(position + 1)
    }

    pub fn prev_sibling(&self) -> Option<Node> {
        let siblings = self.parent()?.children();
        let position = siblings.iter().position(|sibling| sibling == self)?;
        position.checked_sub(1).and_then(|index| siblings.into_iter().nth(index))
    }

    pub fn next_named_sibling(&self) -> Option<Node> {
        let mut current = self.next_sibling();
        while let Some(node) = current {
            if node.is_named() && !node.is_extra() {
                return Some(node);
            }
            current = node.next_sibling();
        }
        None
    }

    /// Visible nodes in pre-order, starting with this one.
    pub fn descendants(&self) -> Preorder {
        Preorder {
            stack: vec![self.clone()],
        }
    }

    /// The smallest visible node whose range contains `range`.
    pub fn descendant_for_range(&self, range: TextRange) -> Option<Node> {
        if !self.range().contains_range(range) {
            return None;
        }
        let mut current = self.clone();
        'descend: loop {
            for child in current.children() {
                if child.range().contains_range(range) && !(child.range().is_empty() && !range.is_empty()) {
                    current = child;
                    continue 'descend;
                }
            }
            return Some(current);
        }
    }

    // =========================================================================
    // Fields
    // =========================================================================

    /// The field this node is assigned to in its visible parent.
    pub fn field_name(&self) -> Option<SmolStr> {
        if self.is_extra() {
            return None;
        }
        let mut current = self.element.clone();
        loop {
            let parent = current.parent()?;
            if let Some(name) = field_of(self.automaton(), &parent, &current) {
                return Some(name);
            }
            if parent.parent().is_none() || is_visible(self.automaton(), &NodeOrToken::Node(parent.clone())) {
                return None;
            }
            current = NodeOrToken::Node(parent);
        }
    }

    pub fn child_by_field_name(&self, name: &str) -> Option<Node> {
        self.children()
            .into_iter()
            .find(|child| child.field_name().as_deref() == Some(name))
    }

    pub fn children_by_field_name(&self, name: &str) -> Vec<Node> {
        self.children()
            .into_iter()
            .filter(|child| child.field_name().as_deref() == Some(name))
            .collect()
    }

    // =========================================================================
    // Identity & rendering
    // =========================================================================

    /// Whether both nodes are backed by the same immutable subtree, which
    /// holds across trees when a re-parse reused it.
    pub fn same_subtree(&self, other: &Node) -> bool {
        match (&self.element, &other.element) {
            (NodeOrToken::Node(a), NodeOrToken::Node(b)) => ptr::eq(&*a.green(), &*b.green()),
            (NodeOrToken::Token(a), NodeOrToken::Token(b)) => ptr::eq(a.green(), b.green()),
            _ => false,
        }
    }

    /// S-expression of the named, non-extra nodes below and including this one.
    pub fn to_sexp(&self) -> String {
        let mut out = String::new();
        self.write_sexp(&mut out);
        out
    }

    fn write_sexp(&self, out: &mut String) {
        if self.is_missing() {
            let label = self.automaton().display_symbol(self.kind());
            out.push_str(&format!("(MISSING {label})"));
            return;
        }
        let name = if self.is_error() { "ERROR" } else { self.kind_name() };
        out.push('(');
        out.push_str(name);
        for child in self.children() {
            if child.is_extra() || (!child.is_named() && !child.is_missing()) {
                continue;
            }
            out.push(' ');
            if let Some(field) = child.field_name() {
                out.push_str(&field);
                out.push_str(": ");
            }
            child.write_sexp(out);
        }
        out.push(')');
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.element == other.element
    }
}

impl Eq for Node {}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:?}", self.kind_name(), self.range())
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sexp())
    }
}

/// Pre-order walk over visible nodes.
pub struct Preorder {
    stack: Vec<Node>,
}

impl Iterator for Preorder {
    type Item = Node;

    fn next(&mut self) -> Option<Node> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().into_iter().rev());
        Some(node)
    }
}

fn is_visible(automaton: &Automaton, element: &SyntaxElement) -> bool {
    let kind = SyntaxKind::from(element.kind());
    kind.is_missing()
        || matches!(kind, SyntaxKind::ERROR | SyntaxKind::ERROR_SYMBOL)
        || automaton.is_visible(kind)
}

fn collect_visible(automaton: &Automaton, node: &SyntaxNode, sink: &mut impl FnMut(SyntaxElement)) {
    for child in node.children_with_tokens() {
        if is_visible(automaton, &child) {
            sink(child);
        } else if let NodeOrToken::Node(hidden) = child {
            collect_visible(automaton, &hidden, sink);
        }
    }
}

/// Field assigned to `child` by the production `parent` was reduced with.
fn field_of(automaton: &Automaton, parent: &SyntaxNode, child: &SyntaxElement) -> Option<SmolStr> {
    let mut rhs = Vec::new();
    let mut position = None;
    for element in parent.children_with_tokens() {
        let kind = SyntaxKind::from(element.kind());
        if kind == SyntaxKind::ERROR || automaton.is_extra(kind) {
            continue;
        }
        if &element == child {
            position = Some(rhs.len());
        }
        rhs.push(kind.symbol());
    }
    let position = position?;
    let lhs = SyntaxKind::from(parent.kind());
    let production = automaton.production_for(lhs, &rhs)?;
    automaton.production(production).fields.get(position).cloned().flatten()
}
