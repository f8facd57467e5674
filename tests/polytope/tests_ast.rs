//! Typed access to Polytope programs

use polytope::polytope::ast::{
    AstNode, BinaryKind, Expr, IoTarget, SingleVarDecl, SourceFile, Stmt, Type,
};
use polytope::polytope::parse;

use crate::helpers::fixtures::fixture;

fn load(name: &str) -> SourceFile {
    let parse = parse(&fixture(name).source).unwrap();
    SourceFile::cast(parse.root()).unwrap()
}

fn names(targets: &[IoTarget]) -> Vec<String> {
    targets.iter().filter_map(IoTarget::name).collect()
}

#[test]
fn test_sum_program() {
    let file = load("sum.poly");

    let input = file.input().unwrap();
    let lines = input.lines();
    assert_eq!(lines.len(), 2);
    assert_eq!(names(&lines[0].targets()), ["n"]);
    assert_eq!(names(&lines[1].targets()), ["a", "b"]);
    assert!(lines[1].targets().iter().all(|t| t.ty() == Some(Type::Int)));

    let restrictions = input.restrictions();
    assert_eq!(restrictions.len(), 1);
    let Some(Expr::Binary(positive)) = restrictions[0].expr() else { panic!() };
    assert_eq!(positive.kind(), Some(BinaryKind::Comparison));
    assert_eq!(positive.text(), "n > 0");

    let output = file.output().unwrap();
    assert_eq!(names(&output.lines()[0].targets()), ["answer"]);

    let statements = file.solution().unwrap().statements();
    assert_eq!(statements.len(), 3);
    assert!(matches!(statements[0], Stmt::Decl(_)));
    let Stmt::For(lp) = &statements[1] else { panic!("{:?}", statements[1]) };
    assert_eq!(lp.variable().as_deref(), Some("i"));
    assert_eq!(lp.body().len(), 1);
    let Stmt::Print(print) = &statements[2] else { panic!() };
    let Some(Expr::Refer(total)) = print.expr() else { panic!() };
    assert_eq!(total.name(), "total");
}

#[test]
fn test_greeting_program() {
    let file = load("greeting.poly");

    let input = file.input().unwrap();
    let types: Vec<_> = input
        .lines()
        .iter()
        .flat_map(|line| line.targets())
        .map(|target| target.ty())
        .collect();
    assert_eq!(types, [Some(Type::String), Some(Type::Int)]);
    assert_eq!(input.restrictions().len(), 2);

    let statements = file.solution().unwrap().statements();
    assert_eq!(statements.len(), 2);

    let Stmt::Decl(decl) = &statements[0] else { panic!() };
    let vars = decl.var_decl().unwrap().declarations();
    let var_names: Vec<_> = vars.iter().filter_map(SingleVarDecl::name).collect();
    assert_eq!(var_names, ["i", "message"]);
    let Some(Expr::String(greeting)) = vars[1].value() else { panic!() };
    assert_eq!(greeting.value(), r#"hi "there""#);

    let Stmt::If(branch) = &statements[1] else { panic!() };
    assert!(branch.has_else());
    let Some(Expr::Binary(cond)) = branch.condition() else { panic!() };
    assert_eq!(cond.kind(), Some(BinaryKind::Logical));
    assert_eq!(cond.operator().as_deref(), Some("&&"));
    assert_eq!(branch.then_branch().len(), 1);

    let Stmt::For(lp) = &branch.else_branch()[0] else { panic!() };
    let Stmt::Print(print) = &lp.body()[0] else { panic!() };
    let Some(Expr::Call(call)) = print.expr() else { panic!() };
    assert_eq!(call.callee().as_deref(), Some("concat"));
    assert_eq!(call.arguments().len(), 2);
}

#[test]
fn test_operator_precedence() {
    let file = load("operators.poly");
    let restrictions = file.input().unwrap().restrictions();
    assert_eq!(restrictions.len(), 2);

    // `~x != 0 || y % 2 == 1`
    let Some(Expr::Binary(or)) = restrictions[1].expr() else { panic!() };
    assert_eq!(or.kind(), Some(BinaryKind::Logical));
    let Some(Expr::Binary(parity)) = or.rhs() else { panic!() };
    assert_eq!(parity.operator().as_deref(), Some("=="));
    let Some(Expr::Binary(modulo)) = parity.lhs() else { panic!() };
    assert_eq!(modulo.kind(), Some(BinaryKind::Multiplication));

    // `x * y / 2 - -x`
    let statements = file.solution().unwrap().statements();
    let Stmt::Decl(decl) = &statements[0] else { panic!() };
    let value = decl.var_decl().unwrap().declarations()[0].value();
    let Some(Expr::Binary(difference)) = value else { panic!() };
    assert_eq!(difference.operator().as_deref(), Some("-"));
    let Some(Expr::Binary(quotient)) = difference.lhs() else { panic!() };
    assert_eq!(quotient.operator().as_deref(), Some("/"));
    let Some(Expr::Unary(negation)) = difference.rhs() else { panic!() };
    assert!(matches!(negation.operand(), Some(Expr::Refer(_))));

    // `if (!done(r)) { r = r + 1; }`
    let Stmt::If(branch) = &statements[1] else { panic!() };
    assert!(!branch.has_else());
    let Some(Expr::Unary(not)) = branch.condition() else { panic!() };
    assert_eq!(not.operator().as_deref(), Some("!"));
    assert!(matches!(not.operand(), Some(Expr::Call(_))));
}

#[test]
fn test_partial_programs_stay_typed() {
    let file = load("missing_semicolon.poly");
    let input = file.input().unwrap();
    assert_eq!(names(&input.lines()[0].targets()), ["n"]);

    let statements = file.solution().unwrap().statements();
    let Stmt::Print(print) = &statements[0] else { panic!("{statements:?}") };
    assert!(print.syntax().has_error());
    assert!(matches!(print.expr(), Some(Expr::Refer(_))));
}
