//! Lexer (tokenizer) for Brook source code
//!
//! Converts source text into a flat [`Token`] stream consumed by the parser.
//! The lexer doubles as the pre-processor: an `import "path"` sequence is
//! replaced in place by the token stream of the imported file, resolved
//! relative to the importing file's directory. Files already imported once
//! are skipped, so cyclic imports terminate.
//!
//! `#` toggles a block comment: everything between one `#` and the next is
//! skipped, regardless of line breaks.

use rustc_hash::FxHashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::trace;

use super::ast::SourceLocation;
use crate::interpreter::errors::Fault;

/// All token kinds produced by the lexer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    // Payload-carrying kinds
    Reserved,
    Ident,
    Number,
    Bool,
    CharLit,
    Str,

    // Arithmetic
    Plus,    // +
    Minus,   // -
    Star,    // *
    Slash,   // /
    Percent, // %

    // Comparison
    EqEq,  // ==
    NotEq, // !=
    Lt,    // <
    Le,    // <=
    Gt,    // >
    Ge,    // >=

    // Logical
    AndAnd, // &&
    OrOr,   // ||
    Bang,   // !

    // Bitwise
    Amp,   // &
    Pipe,  // |
    Caret, // ^

    // Assignment
    Eq,        // =
    PlusEq,    // +=
    MinusEq,   // -=
    StarEq,    // *=
    SlashEq,   // /=
    PercentEq, // %=
    AmpEq,     // &=
    PipeEq,    // |=
    CaretEq,   // ^=

    // Increment/Decrement
    PlusPlus,   // ++
    MinusMinus, // --

    // Member access and bodies
    Dot,   // .
    Arrow, // ->

    // Pointer operator
    Dollar, // $

    // Punctuation
    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }
    LBracket,  // [
    RBracket,  // ]
    Semicolon, // ;
    Comma,     // ,

    // End of file
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::Reserved => "reserved word",
            TokenKind::Ident => "identifier",
            TokenKind::Number => "number",
            TokenKind::Bool => "bool literal",
            TokenKind::CharLit => "char literal",
            TokenKind::Str => "string literal",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::EqEq => "'=='",
            TokenKind::NotEq => "'!='",
            TokenKind::Lt => "'<'",
            TokenKind::Le => "'<='",
            TokenKind::Gt => "'>'",
            TokenKind::Ge => "'>='",
            TokenKind::AndAnd => "'&&'",
            TokenKind::OrOr => "'||'",
            TokenKind::Bang => "'!'",
            TokenKind::Amp => "'&'",
            TokenKind::Pipe => "'|'",
            TokenKind::Caret => "'^'",
            TokenKind::Eq => "'='",
            TokenKind::PlusEq => "'+='",
            TokenKind::MinusEq => "'-='",
            TokenKind::StarEq => "'*='",
            TokenKind::SlashEq => "'/='",
            TokenKind::PercentEq => "'%='",
            TokenKind::AmpEq => "'&='",
            TokenKind::PipeEq => "'|='",
            TokenKind::CaretEq => "'^='",
            TokenKind::PlusPlus => "'++'",
            TokenKind::MinusMinus => "'--'",
            TokenKind::Dot => "'.'",
            TokenKind::Arrow => "'->'",
            TokenKind::Dollar => "'$'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Semicolon => "';'",
            TokenKind::Comma => "','",
            TokenKind::Eof => "end of file",
        };
        write!(f, "{}", text)
    }
}

/// A `(kind, lexeme)` pair with its source position. The lexeme is only
/// meaningful for the payload-carrying kinds.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub location: SourceLocation,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Reserved => write!(f, "'{}'", self.text),
            TokenKind::Ident => write!(f, "identifier '{}'", self.text),
            TokenKind::Number => write!(f, "number {}", self.text),
            TokenKind::Bool => write!(f, "bool literal {}", self.text),
            TokenKind::CharLit => write!(f, "char literal '{}'", self.text),
            TokenKind::Str => write!(f, "string literal \"{}\"", self.text),
            kind => write!(f, "{}", kind),
        }
    }
}

const RESERVED_WORDS: [&str; 11] = [
    "var", "fun", "if", "else", "while", "for", "return", "break", "continue", "struct", "import",
];

/// Two-character operators, keyed by the characters that merge into them.
fn combined(first: char, second: char) -> Option<TokenKind> {
    match (first, second) {
        ('+', '=') => Some(TokenKind::PlusEq),
        ('-', '=') => Some(TokenKind::MinusEq),
        ('*', '=') => Some(TokenKind::StarEq),
        ('/', '=') => Some(TokenKind::SlashEq),
        ('%', '=') => Some(TokenKind::PercentEq),
        ('+', '+') => Some(TokenKind::PlusPlus),
        ('-', '-') => Some(TokenKind::MinusMinus),
        ('&', '&') => Some(TokenKind::AndAnd),
        ('|', '|') => Some(TokenKind::OrOr),
        ('&', '=') => Some(TokenKind::AmpEq),
        ('|', '=') => Some(TokenKind::PipeEq),
        ('^', '=') => Some(TokenKind::CaretEq),
        ('!', '=') => Some(TokenKind::NotEq),
        ('=', '=') => Some(TokenKind::EqEq),
        ('<', '=') => Some(TokenKind::Le),
        ('>', '=') => Some(TokenKind::Ge),
        ('-', '>') => Some(TokenKind::Arrow),
        _ => None,
    }
}

fn single(c: char) -> Option<TokenKind> {
    match c {
        '+' => Some(TokenKind::Plus),
        '-' => Some(TokenKind::Minus),
        '*' => Some(TokenKind::Star),
        '/' => Some(TokenKind::Slash),
        '%' => Some(TokenKind::Percent),
        '=' => Some(TokenKind::Eq),
        '<' => Some(TokenKind::Lt),
        '>' => Some(TokenKind::Gt),
        '(' => Some(TokenKind::LParen),
        ')' => Some(TokenKind::RParen),
        ';' => Some(TokenKind::Semicolon),
        ',' => Some(TokenKind::Comma),
        '.' => Some(TokenKind::Dot),
        '{' => Some(TokenKind::LBrace),
        '}' => Some(TokenKind::RBrace),
        '[' => Some(TokenKind::LBracket),
        ']' => Some(TokenKind::RBracket),
        '&' => Some(TokenKind::Amp),
        '|' => Some(TokenKind::Pipe),
        '^' => Some(TokenKind::Caret),
        '!' => Some(TokenKind::Bang),
        '$' => Some(TokenKind::Dollar),
        _ => None,
    }
}

/// Token stream over one root file and everything it imports.
pub struct Lexer {
    tokens: Vec<Token>,
    position: usize,
}

impl Lexer {
    /// Tokenize the file at `path`; imports resolve relative to its
    /// directory.
    pub fn from_file(path: &Path) -> Result<Lexer, Fault> {
        let mut tokens = Vec::new();
        let mut visited = FxHashSet::default();
        lex_file(path, &mut visited, &mut tokens)?;
        tokens.push(Token {
            kind: TokenKind::Eof,
            text: String::new(),
            location: SourceLocation::new(0, 0),
        });
        Ok(Lexer {
            tokens,
            position: 0,
        })
    }

    /// Tokenize an in-memory source string; imports resolve relative to the
    /// current directory.
    pub fn from_source(source: &str) -> Result<Lexer, Fault> {
        let mut tokens = Vec::new();
        let mut visited = FxHashSet::default();
        lex_into(source, Path::new("."), &mut visited, &mut tokens)?;
        tokens.push(Token {
            kind: TokenKind::Eof,
            text: String::new(),
            location: SourceLocation::new(0, 0),
        });
        Ok(Lexer {
            tokens,
            position: 0,
        })
    }

    /// Return the current token and advance. Saturates at end of file.
    pub fn next_token(&mut self) -> Token {
        let token = self.tokens[self.position].clone();
        if self.position + 1 < self.tokens.len() {
            self.position += 1;
        }
        token
    }

    #[cfg(test)]
    pub(crate) fn tokens(&self) -> &[Token] {
        &self.tokens
    }
}

fn lex_file(
    path: &Path,
    visited: &mut FxHashSet<PathBuf>,
    out: &mut Vec<Token>,
) -> Result<(), Fault> {
    let io_fault = |path: &Path| Fault::Io {
        path: path.to_path_buf(),
        dir: std::env::current_dir().unwrap_or_default(),
    };

    let canonical = path.canonicalize().map_err(|_| io_fault(path))?;
    if !visited.insert(canonical.clone()) {
        trace!(path = %canonical.display(), "skipping already-imported file");
        return Ok(());
    }

    let source = std::fs::read_to_string(&canonical).map_err(|_| io_fault(path))?;
    let base_dir = canonical.parent().unwrap_or(Path::new(".")).to_path_buf();
    trace!(path = %canonical.display(), "tokenizing");
    lex_into(&source, &base_dir, visited, out)
}

/// Single pass over `source`, appending tokens to `out`. Import sequences
/// recurse through [`lex_file`].
fn lex_into(
    source: &str,
    base_dir: &Path,
    visited: &mut FxHashSet<PathBuf>,
    out: &mut Vec<Token>,
) -> Result<(), Fault> {
    let chars: Vec<char> = source.chars().collect();
    let mut pos = 0;
    let mut line = 1;
    let mut column = 1;
    let mut comment = false;
    let mut import_pending = false;

    macro_rules! advance {
        () => {{
            if chars[pos] == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
            pos += 1;
        }};
    }

    while pos < chars.len() {
        let c = chars[pos];
        let location = SourceLocation::new(line, column);

        if comment {
            if c == '#' {
                comment = false;
            }
            advance!();
            continue;
        }
        if c.is_whitespace() {
            advance!();
            continue;
        }
        if c == '#' {
            comment = true;
            advance!();
            continue;
        }

        if c.is_alphabetic() || c == '_' {
            let mut text = String::new();
            while pos < chars.len() && (chars[pos].is_alphanumeric() || chars[pos] == '_') {
                text.push(chars[pos]);
                advance!();
            }
            if text == "import" {
                import_pending = true;
                continue;
            }
            let kind = if text == "true" || text == "false" {
                TokenKind::Bool
            } else if RESERVED_WORDS.contains(&text.as_str()) {
                TokenKind::Reserved
            } else {
                TokenKind::Ident
            };
            out.push(Token {
                kind,
                text,
                location,
            });
            continue;
        }

        if c.is_ascii_digit() {
            let mut text = String::new();
            while pos < chars.len() && chars[pos].is_ascii_digit() {
                text.push(chars[pos]);
                advance!();
            }
            if pos + 1 < chars.len() && chars[pos] == '.' && chars[pos + 1].is_ascii_digit() {
                text.push('.');
                advance!();
                while pos < chars.len() && chars[pos].is_ascii_digit() {
                    text.push(chars[pos]);
                    advance!();
                }
            }
            if pos < chars.len() && chars[pos] == 'f' {
                text.push('f');
                advance!();
            }
            out.push(Token {
                kind: TokenKind::Number,
                text,
                location,
            });
            continue;
        }

        if c == '"' {
            advance!();
            let mut text = String::new();
            loop {
                if pos >= chars.len() {
                    return Err(Fault::Parse {
                        message: "Unterminated string literal".to_string(),
                        location,
                    });
                }
                if chars[pos] == '"' {
                    advance!();
                    break;
                }
                let escaped = process_char(&chars, &mut pos);
                // process_char advanced pos manually; fix the column count
                column += 1;
                text.push(escaped);
            }
            if import_pending {
                import_pending = false;
                lex_file(&base_dir.join(&text), visited, out)?;
                continue;
            }
            out.push(Token {
                kind: TokenKind::Str,
                text,
                location,
            });
            continue;
        }

        if c == '\'' {
            advance!();
            if pos >= chars.len() {
                return Err(Fault::Parse {
                    message: "Unterminated char literal".to_string(),
                    location,
                });
            }
            let value = process_char(&chars, &mut pos);
            column += 1;
            if pos >= chars.len() || chars[pos] != '\'' {
                return Err(Fault::Parse {
                    message: "Unterminated char literal".to_string(),
                    location,
                });
            }
            advance!();
            out.push(Token {
                kind: TokenKind::CharLit,
                text: value.to_string(),
                location,
            });
            continue;
        }

        let Some(kind) = single(c) else {
            return Err(Fault::Parse {
                message: format!("Unexpected character '{}'", c),
                location,
            });
        };
        advance!();

        // A fresh operator may combine with the previous single-character
        // operator token into a double operator.
        if let Some(previous) = out.last() {
            if previous.kind != TokenKind::Str && previous.text.len() == 1 {
                let first = previous.text.chars().next().unwrap();
                if let Some(merged) = combined(first, c) {
                    let location = previous.location;
                    let text = format!("{}{}", first, c);
                    out.pop();
                    out.push(Token {
                        kind: merged,
                        text,
                        location,
                    });
                    continue;
                }
            }
        }

        out.push(Token {
            kind,
            text: c.to_string(),
            location,
        });
    }

    Ok(())
}

/// Read one (possibly escaped) character starting at `chars[*pos]`.
fn process_char(chars: &[char], pos: &mut usize) -> char {
    let c = chars[*pos];
    *pos += 1;
    if c != '\\' || *pos >= chars.len() {
        return c;
    }
    let escape = chars[*pos];
    *pos += 1;
    match escape {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        'b' => '\u{0008}',
        'f' => '\u{000C}',
        '0' => '\0',
        '\'' => '\'',
        '"' => '"',
        '\\' => '\\',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let lexer = Lexer::from_source(source).unwrap();
        lexer.tokens().iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_simple_tokens() {
        let lexer = Lexer::from_source("fun main() { return 0; }").unwrap();
        let tokens = lexer.tokens();

        assert_eq!(tokens[0].kind, TokenKind::Reserved);
        assert_eq!(tokens[0].text, "fun");
        assert_eq!(tokens[1].kind, TokenKind::Ident);
        assert_eq!(tokens[1].text, "main");
        assert_eq!(tokens[2].kind, TokenKind::LParen);
        assert_eq!(tokens[3].kind, TokenKind::RParen);
        assert_eq!(tokens[4].kind, TokenKind::LBrace);
        assert_eq!(tokens[5].kind, TokenKind::Reserved);
        assert_eq!(tokens[5].text, "return");
        assert_eq!(tokens[6].kind, TokenKind::Number);
        assert_eq!(tokens[7].kind, TokenKind::Semicolon);
        assert_eq!(tokens[8].kind, TokenKind::RBrace);
        assert_eq!(tokens[9].kind, TokenKind::Eof);
    }

    #[test]
    fn test_double_operators_merge() {
        assert_eq!(
            kinds("++ -- += -= == != && || <= >= -> &= |= ^="),
            vec![
                TokenKind::PlusPlus,
                TokenKind::MinusMinus,
                TokenKind::PlusEq,
                TokenKind::MinusEq,
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::AndAnd,
                TokenKind::OrOr,
                TokenKind::Le,
                TokenKind::Ge,
                TokenKind::Arrow,
                TokenKind::AmpEq,
                TokenKind::PipeEq,
                TokenKind::CaretEq,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_triple_char_does_not_merge_twice() {
        // `===` is `==` followed by `=`.
        assert_eq!(
            kinds("==="),
            vec![TokenKind::EqEq, TokenKind::Eq, TokenKind::Eof]
        );
    }

    #[test]
    fn test_hash_comments_span_lines() {
        let lexer = Lexer::from_source("var x # anything\n goes here # var y").unwrap();
        let tokens = lexer.tokens();
        assert_eq!(tokens[1].text, "x");
        assert_eq!(tokens[2].text, "y");
        assert_eq!(tokens[3].kind, TokenKind::Eof);
    }

    #[test]
    fn test_number_forms() {
        let lexer = Lexer::from_source("1 2.5 3f 4.25f").unwrap();
        let texts: Vec<_> = lexer.tokens()[..4].iter().map(|t| t.text.clone()).collect();
        assert_eq!(texts, vec!["1", "2.5", "3f", "4.25f"]);
    }

    #[test]
    fn test_dot_after_number_without_digits() {
        // `1.x` lexes the dot as the member operator, not a float.
        assert_eq!(
            kinds("1.x"),
            vec![
                TokenKind::Number,
                TokenKind::Dot,
                TokenKind::Ident,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_string_escapes() {
        let lexer = Lexer::from_source(r#""a\tb\nc\\d\"e""#).unwrap();
        assert_eq!(lexer.tokens()[0].text, "a\tb\nc\\d\"e");
    }

    #[test]
    fn test_char_literal_escapes() {
        let lexer = Lexer::from_source(r"'\n' '\0' 'x'").unwrap();
        let tokens = lexer.tokens();
        assert_eq!(tokens[0].text, "\n");
        assert_eq!(tokens[1].text, "\0");
        assert_eq!(tokens[2].text, "x");
    }

    #[test]
    fn test_bool_literals() {
        let lexer = Lexer::from_source("true false truth").unwrap();
        let tokens = lexer.tokens();
        assert_eq!(tokens[0].kind, TokenKind::Bool);
        assert_eq!(tokens[1].kind, TokenKind::Bool);
        assert_eq!(tokens[2].kind, TokenKind::Ident);
    }

    #[test]
    fn test_missing_import_is_io_fault() {
        let result = Lexer::from_source(r#"import "does/not/exist.bk""#);
        assert!(matches!(result, Err(Fault::Io { .. })));
    }

    #[test]
    fn test_unknown_character() {
        assert!(matches!(
            Lexer::from_source("var x @ 1"),
            Err(Fault::Parse { .. })
        ));
    }
}
