//! Logos lexer for the grammar description language.

use logos::Logos;
use text_size::{TextRange, TextSize};

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
pub enum DslToken {
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    #[regex(r"-?[0-9]+")]
    Int,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    String,

    #[regex(r"/([^/\\\n]|\\.)+/")]
    Regex,

    #[token("=")]
    Eq,
    #[token("|")]
    Pipe,
    #[token(";")]
    Semi,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("*")]
    Star,
    #[token("+")]
    Plus,
    #[token("?")]
    Question,
    #[token("@")]
    At,
}

impl DslToken {
    pub fn describe(self) -> &'static str {
        match self {
            Self::Ident => "identifier",
            Self::Int => "integer",
            Self::String => "string literal",
            Self::Regex => "regex",
            Self::Eq => "'='",
            Self::Pipe => "'|'",
            Self::Semi => "';'",
            Self::Colon => "':'",
            Self::Comma => "','",
            Self::LParen => "'('",
            Self::RParen => "')'",
            Self::Star => "'*'",
            Self::Plus => "'+'",
            Self::Question => "'?'",
            Self::At => "'@'",
        }
    }
}

/// A lexed token; `kind` is `None` for unrecognised input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lexeme<'a> {
    pub kind: Option<DslToken>,
    pub text: &'a str,
    pub range: TextRange,
}

pub fn tokenize(input: &str) -> Vec<Lexeme<'_>> {
    let mut lexer = DslToken::lexer(input);
    let mut out = Vec::new();
    while let Some(result) = lexer.next() {
        let span = lexer.span();
        out.push(Lexeme {
            kind: result.ok(),
            text: lexer.slice(),
            range: TextRange::new(
                TextSize::new(span.start as u32),
                TextSize::new(span.end as u32),
            ),
        });
    }
    out
}
