//! Typed AST wrappers over the Polytope node view.
//!
//! This module provides strongly-typed accessors for Polytope syntax nodes.
//! Each struct wraps a [`Node`] and finds its parts by field name, so the
//! accessors see through hidden rules like `_expr` and `_stmt`.

use crate::syntax::Node;

/// Trait for AST nodes that wrap a [`Node`]
pub trait AstNode: Sized {
    fn can_cast(kind: &str) -> bool;
    fn cast(node: Node) -> Option<Self>;
    fn syntax(&self) -> &Node;

    fn text(&self) -> String {
        self.syntax().text()
    }
}

// ============================================================================
// Helper macros
// ============================================================================

macro_rules! ast_node {
    ($name:ident, $kind:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name(Node);

        impl AstNode for $name {
            fn can_cast(kind: &str) -> bool {
                kind == $kind
            }

            fn cast(node: Node) -> Option<Self> {
                if Self::can_cast(node.kind_name()) && !node.is_missing() {
                    Some(Self(node))
                } else {
                    None
                }
            }

            fn syntax(&self) -> &Node {
                &self.0
            }
        }
    };
}

/// First child of the field that casts, skipping the field's punctuation.
fn field<T: AstNode>(node: &Node, name: &str) -> Option<T> {
    node.children_by_field_name(name).into_iter().find_map(T::cast)
}

fn fields<T: AstNode>(node: &Node, name: &str) -> Vec<T> {
    node.children_by_field_name(name)
        .into_iter()
        .filter_map(T::cast)
        .collect()
}

fn children<T: AstNode>(node: &Node) -> Vec<T> {
    node.named_children().into_iter().filter_map(T::cast).collect()
}

/// Text of the field's token, for fields holding a single `id`.
fn field_text(node: &Node, name: &str) -> Option<String> {
    node.child_by_field_name(name)
        .filter(|child| !child.is_missing())
        .map(|child| child.text())
}

// ============================================================================
// Program
// ============================================================================

ast_node!(SourceFile, "source_file");

impl SourceFile {
    pub fn input(&self) -> Option<Input> {
        field(&self.0, "input")
    }

    pub fn output(&self) -> Option<Output> {
        field(&self.0, "output")
    }

    pub fn solution(&self) -> Option<Solution> {
        field(&self.0, "solution")
    }
}

ast_node!(Input, "input");

impl Input {
    pub fn lines(&self) -> Vec<InputLine> {
        fields(&self.0, "body")
    }

    /// The `satisfies` conditions.
    pub fn restrictions(&self) -> Vec<ExprStmt> {
        fields(&self.0, "restriction")
    }
}

ast_node!(Output, "output");

impl Output {
    pub fn lines(&self) -> Vec<OutputLine> {
        fields(&self.0, "body")
    }
}

ast_node!(Solution, "solution");

impl Solution {
    pub fn statements(&self) -> Vec<Stmt> {
        fields(&self.0, "body")
    }
}

ast_node!(InputLine, "input_line");

impl InputLine {
    pub fn targets(&self) -> Vec<IoTarget> {
        fields(&self.0, "targets")
    }
}

ast_node!(OutputLine, "output_line");

impl OutputLine {
    pub fn targets(&self) -> Vec<IoTarget> {
        fields(&self.0, "targets")
    }
}

ast_node!(IoTarget, "io_target");

impl IoTarget {
    pub fn name(&self) -> Option<String> {
        field_text(&self.0, "id")
    }

    pub fn ty(&self) -> Option<Type> {
        self.0.child_by_field_name("type").and_then(Type::from_node)
    }
}

/// Scalar types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    String,
}

impl Type {
    fn from_node(node: Node) -> Option<Self> {
        if node.is_missing() {
            return None;
        }
        match node.text().as_str() {
            "int" => Some(Self::Int),
            "string" => Some(Self::String),
            _ => None,
        }
    }
}

// ============================================================================
// Statements
// ============================================================================

/// Any statement of a solution or branch body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Assign(AssignStmt),
    If(IfStmt),
    For(ForStmt),
    Print(PrintStmt),
    Decl(DeclStmt),
    Expr(ExprStmt),
}

impl AstNode for Stmt {
    fn can_cast(kind: &str) -> bool {
        matches!(
            kind,
            "assign_stmt" | "if_stmt" | "for_stmt" | "print_stmt" | "decl_stmt" | "expr_stmt"
        )
    }

    fn cast(node: Node) -> Option<Self> {
        if node.is_missing() {
            return None;
        }
        match node.kind_name() {
            "assign_stmt" => Some(Self::Assign(AssignStmt(node))),
            "if_stmt" => Some(Self::If(IfStmt(node))),
            "for_stmt" => Some(Self::For(ForStmt(node))),
            "print_stmt" => Some(Self::Print(PrintStmt(node))),
            "decl_stmt" => Some(Self::Decl(DeclStmt(node))),
            "expr_stmt" => Some(Self::Expr(ExprStmt(node))),
            _ => None,
        }
    }

    fn syntax(&self) -> &Node {
        match self {
            Self::Assign(n) => n.syntax(),
            Self::If(n) => n.syntax(),
            Self::For(n) => n.syntax(),
            Self::Print(n) => n.syntax(),
            Self::Decl(n) => n.syntax(),
            Self::Expr(n) => n.syntax(),
        }
    }
}

ast_node!(AssignStmt, "assign_stmt");

impl AssignStmt {
    /// The assigned variable
    pub fn target(&self) -> Option<String> {
        self.0
            .children()
            .into_iter()
            .find(|child| child.kind_name() == "id" && !child.is_missing())
            .map(|child| child.text())
    }

    pub fn value(&self) -> Option<Expr> {
        children(&self.0).into_iter().next()
    }
}

ast_node!(IfStmt, "if_stmt");

impl IfStmt {
    pub fn condition(&self) -> Option<Expr> {
        field(&self.0, "cond")
    }

    pub fn then_branch(&self) -> Vec<Stmt> {
        fields(&self.0, "then")
    }

    pub fn else_branch(&self) -> Vec<Stmt> {
        fields(&self.0, "else")
    }

    pub fn has_else(&self) -> bool {
        self.0
            .children()
            .iter()
            .any(|child| !child.is_named() && child.text() == "else")
    }
}

ast_node!(ForStmt, "for_stmt");

impl ForStmt {
    pub fn lower_bound(&self) -> Option<Expr> {
        field(&self.0, "lb")
    }

    /// The loop variable
    pub fn variable(&self) -> Option<String> {
        field_text(&self.0, "id")
    }

    pub fn upper_bound(&self) -> Option<Expr> {
        field(&self.0, "ub")
    }

    pub fn body(&self) -> Vec<Stmt> {
        fields(&self.0, "body")
    }
}

ast_node!(PrintStmt, "print_stmt");

impl PrintStmt {
    pub fn expr(&self) -> Option<Expr> {
        field(&self.0, "expr")
    }
}

ast_node!(DeclStmt, "decl_stmt");

impl DeclStmt {
    pub fn var_decl(&self) -> Option<VarDecl> {
        children(&self.0).into_iter().next()
    }
}

ast_node!(VarDecl, "var_decl");

impl VarDecl {
    pub fn declarations(&self) -> Vec<SingleVarDecl> {
        children(&self.0)
    }
}

ast_node!(SingleVarDecl, "single_var_decl");

impl SingleVarDecl {
    pub fn name(&self) -> Option<String> {
        field_text(&self.0, "id")
    }

    pub fn ty(&self) -> Option<Type> {
        self.0
            .children()
            .into_iter()
            .filter(|child| !child.is_named())
            .find_map(Type::from_node)
    }

    /// The initializer, without the `=`
    pub fn value(&self) -> Option<Expr> {
        field(&self.0, "value")
    }
}

ast_node!(ExprStmt, "expr_stmt");

impl ExprStmt {
    pub fn expr(&self) -> Option<Expr> {
        children(&self.0).into_iter().next()
    }
}

// ============================================================================
// Expressions
// ============================================================================

/// Any expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Refer(ReferExpr),
    Call(CallExpr),
    Int(IntLiteral),
    String(StringLiteral),
    Unary(UnaryOp),
    Binary(BinaryOp),
}

impl AstNode for Expr {
    fn can_cast(kind: &str) -> bool {
        matches!(
            kind,
            "refer_expr" | "call_expr" | "int_literal" | "string_literal" | "unary_op" | "binary_op"
        )
    }

    fn cast(node: Node) -> Option<Self> {
        if node.is_missing() {
            return None;
        }
        match node.kind_name() {
            "refer_expr" => Some(Self::Refer(ReferExpr(node))),
            "call_expr" => Some(Self::Call(CallExpr(node))),
            "int_literal" => Some(Self::Int(IntLiteral(node))),
            "string_literal" => Some(Self::String(StringLiteral(node))),
            "unary_op" => Some(Self::Unary(UnaryOp(node))),
            "binary_op" => Some(Self::Binary(BinaryOp(node))),
            _ => None,
        }
    }

    fn syntax(&self) -> &Node {
        match self {
            Self::Refer(n) => n.syntax(),
            Self::Call(n) => n.syntax(),
            Self::Int(n) => n.syntax(),
            Self::String(n) => n.syntax(),
            Self::Unary(n) => n.syntax(),
            Self::Binary(n) => n.syntax(),
        }
    }
}

ast_node!(ReferExpr, "refer_expr");

impl ReferExpr {
    pub fn name(&self) -> String {
        self.0.text()
    }
}

ast_node!(CallExpr, "call_expr");

impl CallExpr {
    pub fn callee(&self) -> Option<String> {
        field_text(&self.0, "callee")
    }

    pub fn arguments(&self) -> Vec<Expr> {
        fields(&self.0, "argument")
    }
}

ast_node!(IntLiteral, "int_literal");

impl IntLiteral {
    /// `None` when the literal overflows `i64`
    pub fn value(&self) -> Option<i64> {
        self.0.text().parse().ok()
    }
}

ast_node!(StringLiteral, "string_literal");

impl StringLiteral {
    /// Contents between the quotes with `\"` and `\\` unescaped
    pub fn value(&self) -> String {
        let text = self.0.text();
        let inner = text
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
            .unwrap_or(text.as_str());
        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => out.extend(chars.next()),
                _ => out.push(c),
            }
        }
        out
    }
}

/// Operator of a unary or binary expression
fn operator(node: &Node) -> Option<String> {
    node.children()
        .into_iter()
        .find(|child| !child.is_named() && !child.is_extra())
        .map(|child| child.text())
}

ast_node!(UnaryOp, "unary_op");

impl UnaryOp {
    pub fn operator(&self) -> Option<String> {
        operator(&self.0)
    }

    pub fn operand(&self) -> Option<Expr> {
        children(&self.0).into_iter().next()
    }
}

/// Category of a binary expression, one per precedence level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryKind {
    Multiplication,
    Addition,
    Comparison,
    Logical,
}

ast_node!(BinaryOp, "binary_op");

impl BinaryOp {
    /// The level-specific node (`addition_op`, ...) inside this one
    fn inner(&self) -> Option<Node> {
        self.0.named_children().into_iter().next()
    }

    pub fn kind(&self) -> Option<BinaryKind> {
        match self.inner()?.kind_name() {
            "multiplication_op" => Some(BinaryKind::Multiplication),
            "addition_op" => Some(BinaryKind::Addition),
            "comparison_op" => Some(BinaryKind::Comparison),
            "logical_op" => Some(BinaryKind::Logical),
            _ => None,
        }
    }

    pub fn operator(&self) -> Option<String> {
        operator(&self.inner()?)
    }

    pub fn lhs(&self) -> Option<Expr> {
        children(&self.inner()?).into_iter().next()
    }

    pub fn rhs(&self) -> Option<Expr> {
        children(&self.inner()?).into_iter().nth(1)
    }
}
