//! Byte-level lexer for Enforce Script source.
//!
//! Produces a flat token stream with byte offsets. Keywords are not
//! recognised here; `class`, `ref` and friends are ordinary identifiers
//! until the parser gives them meaning in context. Comments and
//! `#`-prefixed preprocessor lines are discarded. Problems such as an
//! unterminated string or a stray byte become diagnostics instead of
//! failures, so the lexer always reaches the end of its input.

use std::fmt;

use crate::error::ParseDiagnostic;

/// A token plus the byte offset where it starts in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

/// Token payloads keep the raw source spelling: numbers stay unparsed and
/// string contents keep their escape sequences verbatim. Writing a token
/// back out therefore reproduces the original text.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TokenKind {
    Ident(String),
    Int(String),
    Float(String),
    /// String literal contents without the surrounding quotes.
    Str(String),

    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,

    Dot,
    Comma,
    Semicolon,
    Colon,
    Question,
    Tilde,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    EqEq,
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,

    AmpAmp,
    PipePipe,
    Bang,

    Amp,
    Pipe,
    Caret,
    LessLess,
    GreaterGreater,

    Eq,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    AmpEq,
    PipeEq,
    CaretEq,
    LessLessEq,
    GreaterGreaterEq,

    PlusPlus,
    MinusMinus,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Ident(text) | TokenKind::Int(text) | TokenKind::Float(text) => {
                f.write_str(text)
            }
            TokenKind::Str(text) => write!(f, "\"{text}\""),
            TokenKind::LParen => f.write_str("("),
            TokenKind::RParen => f.write_str(")"),
            TokenKind::LBracket => f.write_str("["),
            TokenKind::RBracket => f.write_str("]"),
            TokenKind::LBrace => f.write_str("{"),
            TokenKind::RBrace => f.write_str("}"),
            TokenKind::Dot => f.write_str("."),
            TokenKind::Comma => f.write_str(","),
            TokenKind::Semicolon => f.write_str(";"),
            TokenKind::Colon => f.write_str(":"),
            TokenKind::Question => f.write_str("?"),
            TokenKind::Tilde => f.write_str("~"),
            TokenKind::Plus => f.write_str("+"),
            TokenKind::Minus => f.write_str("-"),
            TokenKind::Star => f.write_str("*"),
            TokenKind::Slash => f.write_str("/"),
            TokenKind::Percent => f.write_str("%"),
            TokenKind::EqEq => f.write_str("=="),
            TokenKind::NotEq => f.write_str("!="),
            TokenKind::Less => f.write_str("<"),
            TokenKind::LessEq => f.write_str("<="),
            TokenKind::Greater => f.write_str(">"),
            TokenKind::GreaterEq => f.write_str(">="),
            TokenKind::AmpAmp => f.write_str("&&"),
            TokenKind::PipePipe => f.write_str("||"),
            TokenKind::Bang => f.write_str("!"),
            TokenKind::Amp => f.write_str("&"),
            TokenKind::Pipe => f.write_str("|"),
            TokenKind::Caret => f.write_str("^"),
            TokenKind::LessLess => f.write_str("<<"),
            TokenKind::GreaterGreater => f.write_str(">>"),
            TokenKind::Eq => f.write_str("="),
            TokenKind::PlusEq => f.write_str("+="),
            TokenKind::MinusEq => f.write_str("-="),
            TokenKind::StarEq => f.write_str("*="),
            TokenKind::SlashEq => f.write_str("/="),
            TokenKind::PercentEq => f.write_str("%="),
            TokenKind::AmpEq => f.write_str("&="),
            TokenKind::PipeEq => f.write_str("|="),
            TokenKind::CaretEq => f.write_str("^="),
            TokenKind::LessLessEq => f.write_str("<<="),
            TokenKind::GreaterGreaterEq => f.write_str(">>="),
            TokenKind::PlusPlus => f.write_str("++"),
            TokenKind::MinusMinus => f.write_str("--"),
        }
    }
}

/// Tokenize `src`, collecting diagnostics instead of failing.
pub(crate) fn lex(src: &str) -> (Vec<Token>, Vec<ParseDiagnostic>) {
    let mut lexer = Lexer::new(src);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token() {
        tokens.push(token);
    }
    (tokens, lexer.diagnostics)
}

struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    diagnostics: Vec<ParseDiagnostic>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Lexer {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            diagnostics: Vec::new(),
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn ch(&self) -> u8 {
        self.bytes[self.pos]
    }

    /// Byte `n` positions ahead, or 0 past the end.
    fn ch_at(&self, n: usize) -> u8 {
        self.bytes.get(self.pos + n).copied().unwrap_or(0)
    }

    fn eat(&mut self, byte: u8) -> bool {
        if !self.at_end() && self.ch() == byte {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn next_token(&mut self) -> Option<Token> {
        loop {
            while !self.at_end() && self.ch().is_ascii_whitespace() {
                self.pos += 1;
            }
            if self.at_end() {
                return None;
            }

            let start = self.pos;
            let kind = match self.ch() {
                b'"' => return Some(self.scan_string()),
                b'0'..=b'9' => return Some(self.scan_number()),
                c if is_ident_start(c) => return Some(self.scan_ident()),
                b'#' => {
                    // Preprocessor line, dropped like a comment.
                    while !self.at_end() && self.ch() != b'\n' {
                        self.pos += 1;
                    }
                    continue;
                }
                b'/' => match self.ch_at(1) {
                    b'/' => {
                        while !self.at_end() && self.ch() != b'\n' {
                            self.pos += 1;
                        }
                        continue;
                    }
                    b'*' => {
                        self.skip_block_comment();
                        continue;
                    }
                    _ => {
                        self.pos += 1;
                        if self.eat(b'=') {
                            TokenKind::SlashEq
                        } else {
                            TokenKind::Slash
                        }
                    }
                },
                b'(' => {
                    self.pos += 1;
                    TokenKind::LParen
                }
                b')' => {
                    self.pos += 1;
                    TokenKind::RParen
                }
                b'[' => {
                    self.pos += 1;
                    TokenKind::LBracket
                }
                b']' => {
                    self.pos += 1;
                    TokenKind::RBracket
                }
                b'{' => {
                    self.pos += 1;
                    TokenKind::LBrace
                }
                b'}' => {
                    self.pos += 1;
                    TokenKind::RBrace
                }
                b'.' => {
                    self.pos += 1;
                    TokenKind::Dot
                }
                b',' => {
                    self.pos += 1;
                    TokenKind::Comma
                }
                b';' => {
                    self.pos += 1;
                    TokenKind::Semicolon
                }
                b':' => {
                    self.pos += 1;
                    TokenKind::Colon
                }
                b'?' => {
                    self.pos += 1;
                    TokenKind::Question
                }
                b'~' => {
                    self.pos += 1;
                    TokenKind::Tilde
                }
                b'+' => {
                    self.pos += 1;
                    if self.eat(b'+') {
                        TokenKind::PlusPlus
                    } else if self.eat(b'=') {
                        TokenKind::PlusEq
                    } else {
                        TokenKind::Plus
                    }
                }
                b'-' => {
                    self.pos += 1;
                    if self.eat(b'-') {
                        TokenKind::MinusMinus
                    } else if self.eat(b'=') {
                        TokenKind::MinusEq
                    } else {
                        TokenKind::Minus
                    }
                }
                b'*' => {
                    self.pos += 1;
                    if self.eat(b'=') {
                        TokenKind::StarEq
                    } else {
                        TokenKind::Star
                    }
                }
                b'%' => {
                    self.pos += 1;
                    if self.eat(b'=') {
                        TokenKind::PercentEq
                    } else {
                        TokenKind::Percent
                    }
                }
                b'=' => {
                    self.pos += 1;
                    if self.eat(b'=') {
                        TokenKind::EqEq
                    } else {
                        TokenKind::Eq
                    }
                }
                b'!' => {
                    self.pos += 1;
                    if self.eat(b'=') {
                        TokenKind::NotEq
                    } else {
                        TokenKind::Bang
                    }
                }
                b'<' => {
                    self.pos += 1;
                    if self.eat(b'<') {
                        if self.eat(b'=') {
                            TokenKind::LessLessEq
                        } else {
                            TokenKind::LessLess
                        }
                    } else if self.eat(b'=') {
                        TokenKind::LessEq
                    } else {
                        TokenKind::Less
                    }
                }
                b'>' => {
                    self.pos += 1;
                    if self.eat(b'>') {
                        if self.eat(b'=') {
                            TokenKind::GreaterGreaterEq
                        } else {
                            TokenKind::GreaterGreater
                        }
                    } else if self.eat(b'=') {
                        TokenKind::GreaterEq
                    } else {
                        TokenKind::Greater
                    }
                }
                b'&' => {
                    self.pos += 1;
                    if self.eat(b'&') {
                        TokenKind::AmpAmp
                    } else if self.eat(b'=') {
                        TokenKind::AmpEq
                    } else {
                        TokenKind::Amp
                    }
                }
                b'|' => {
                    self.pos += 1;
                    if self.eat(b'|') {
                        TokenKind::PipePipe
                    } else if self.eat(b'=') {
                        TokenKind::PipeEq
                    } else {
                        TokenKind::Pipe
                    }
                }
                b'^' => {
                    self.pos += 1;
                    if self.eat(b'=') {
                        TokenKind::CaretEq
                    } else {
                        TokenKind::Caret
                    }
                }
                c => {
                    self.diagnostics.push(ParseDiagnostic::error(
                        start,
                        format!("unexpected character `{}`", c as char),
                    ));
                    self.pos += 1;
                    continue;
                }
            };

            return Some(Token {
                kind,
                offset: start,
            });
        }
    }

    fn skip_block_comment(&mut self) {
        let start = self.pos;
        self.pos += 2;
        while !self.at_end() {
            if self.ch() == b'*' && self.ch_at(1) == b'/' {
                self.pos += 2;
                return;
            }
            self.pos += 1;
        }
        self.diagnostics
            .push(ParseDiagnostic::error(start, "unterminated block comment"));
    }

    fn scan_ident(&mut self) -> Token {
        let start = self.pos;
        while !self.at_end() && is_ident_continue(self.ch()) {
            self.pos += 1;
        }
        Token {
            kind: TokenKind::Ident(self.src[start..self.pos].to_string()),
            offset: start,
        }
    }

    fn scan_number(&mut self) -> Token {
        let start = self.pos;

        if self.ch() == b'0' && matches!(self.ch_at(1), b'x' | b'X') {
            self.pos += 2;
            while !self.at_end() && self.ch().is_ascii_hexdigit() {
                self.pos += 1;
            }
            return Token {
                kind: TokenKind::Int(self.src[start..self.pos].to_string()),
                offset: start,
            };
        }

        while !self.at_end() && self.ch().is_ascii_digit() {
            self.pos += 1;
        }

        let mut float = false;
        if !self.at_end() && self.ch() == b'.' && self.ch_at(1).is_ascii_digit() {
            float = true;
            self.pos += 1;
            while !self.at_end() && self.ch().is_ascii_digit() {
                self.pos += 1;
            }
        }
        if !self.at_end() && matches!(self.ch(), b'e' | b'E') {
            let first_digit = if matches!(self.ch_at(1), b'+' | b'-') {
                2
            } else {
                1
            };
            if self.ch_at(first_digit).is_ascii_digit() {
                float = true;
                self.pos += first_digit;
                while !self.at_end() && self.ch().is_ascii_digit() {
                    self.pos += 1;
                }
            }
        }

        let text = self.src[start..self.pos].to_string();
        Token {
            kind: if float {
                TokenKind::Float(text)
            } else {
                TokenKind::Int(text)
            },
            offset: start,
        }
    }

    /// Strings end at the closing quote or, with a diagnostic, at the end of
    /// the line. Escapes are skipped but kept verbatim in the payload.
    fn scan_string(&mut self) -> Token {
        let start = self.pos;
        self.pos += 1;
        let content_start = self.pos;
        loop {
            if self.at_end() || self.ch() == b'\n' {
                self.diagnostics
                    .push(ParseDiagnostic::error(start, "unterminated string literal"));
                break;
            }
            match self.ch() {
                b'"' => {
                    let token = Token {
                        kind: TokenKind::Str(self.src[content_start..self.pos].to_string()),
                        offset: start,
                    };
                    self.pos += 1;
                    return token;
                }
                b'\\' => self.pos = (self.pos + 2).min(self.bytes.len()),
                _ => self.pos += 1,
            }
        }
        Token {
            kind: TokenKind::Str(self.src[content_start..self.pos].to_string()),
            offset: start,
        }
    }
}

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_' || c >= 0x80
}

fn is_ident_continue(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_' || c >= 0x80
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    fn tokenize(src: &str) -> Vec<TokenKind> {
        let (tokens, diagnostics) = lex(src);
        assert_eq!(diagnostics, vec![]);
        tokens.into_iter().map(|t| t.kind).collect()
    }

    fn ident(text: &str) -> TokenKind {
        TokenKind::Ident(text.to_string())
    }

    #[test]
    fn lex_idents_and_keywords_alike() {
        assert_eq!(
            tokenize("class Foo extends _Bar2"),
            vec![ident("class"), ident("Foo"), ident("extends"), ident("_Bar2")],
        );
    }

    #[test]
    fn lex_numbers() {
        assert_eq!(
            tokenize("0 42 3.25 1e5 2.5e-3 0xFF7f"),
            vec![
                TokenKind::Int("0".to_string()),
                TokenKind::Int("42".to_string()),
                TokenKind::Float("3.25".to_string()),
                TokenKind::Float("1e5".to_string()),
                TokenKind::Float("2.5e-3".to_string()),
                TokenKind::Int("0xFF7f".to_string()),
            ],
        );
    }

    #[test]
    fn lex_member_access_is_not_a_float() {
        assert_eq!(
            tokenize("player.health"),
            vec![ident("player"), TokenKind::Dot, ident("health")],
        );
        assert_eq!(
            tokenize("1.x"),
            vec![TokenKind::Int("1".to_string()), TokenKind::Dot, ident("x")],
        );
    }

    #[test]
    fn lex_string_keeps_escapes_verbatim() {
        assert_eq!(
            tokenize(r#""a\nb" "" "q\"w""#),
            vec![
                TokenKind::Str(r"a\nb".to_string()),
                TokenKind::Str(String::new()),
                TokenKind::Str(r#"q\"w"#.to_string()),
            ],
        );
    }

    #[test]
    fn lex_operators_prefer_longest_match() {
        assert_eq!(
            tokenize(">>= >> >= > << <= ++ += + == = != !"),
            vec![
                TokenKind::GreaterGreaterEq,
                TokenKind::GreaterGreater,
                TokenKind::GreaterEq,
                TokenKind::Greater,
                TokenKind::LessLess,
                TokenKind::LessEq,
                TokenKind::PlusPlus,
                TokenKind::PlusEq,
                TokenKind::Plus,
                TokenKind::EqEq,
                TokenKind::Eq,
                TokenKind::NotEq,
                TokenKind::Bang,
            ],
        );
    }

    #[test]
    fn lex_nested_generic_closes_with_shift() {
        assert_eq!(
            tokenize("array<ref array<int>>"),
            vec![
                ident("array"),
                TokenKind::Less,
                ident("ref"),
                ident("array"),
                TokenKind::Less,
                ident("int"),
                TokenKind::GreaterGreater,
            ],
        );
    }

    #[test]
    fn lex_comments_and_preprocessor_are_dropped() {
        assert_eq!(
            tokenize("#ifdef PLATFORM\nint /* inline */ x; // trailing\n#endif"),
            vec![ident("int"), ident("x"), TokenKind::Semicolon],
        );
    }

    #[test]
    fn lex_unterminated_string_reports_and_continues() {
        let (tokens, diagnostics) = lex("string s = \"oops\nint x;");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "unterminated string literal");
        assert_eq!(diagnostics[0].offset, 11);
        assert_eq!(
            tokens.iter().map(|t| t.kind.clone()).collect::<Vec<_>>(),
            vec![
                ident("string"),
                ident("s"),
                TokenKind::Eq,
                TokenKind::Str("oops".to_string()),
                ident("int"),
                ident("x"),
                TokenKind::Semicolon,
            ],
        );
    }

    #[test]
    fn lex_stray_byte_reports_and_continues() {
        let (tokens, diagnostics) = lex("int @ x;");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "unexpected character `@`");
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn lex_offsets_point_at_token_starts() {
        let (tokens, _) = lex("int x = 5;");
        let offsets: Vec<usize> = tokens.iter().map(|t| t.offset).collect();
        assert_eq!(offsets, vec![0, 4, 6, 8, 9]);
    }

    #[test]
    fn lex_non_ascii_identifier() {
        assert_eq!(tokenize("Gewehr_groß"), vec![ident("Gewehr_groß")]);
    }
}
