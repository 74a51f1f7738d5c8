//! Rendering the script model back to source text.
//!
//! Output is canonical rather than a faithful copy of the input: modifiers
//! come out in one fixed order, braces sit on their own lines, indentation
//! is tabs and class bases always use `:`. Token sequences are spaced so
//! that re-lexing the printed text yields the tokens that were printed,
//! which is what keeps parse and print idempotent.

use std::fmt;

use crate::lexer::TokenKind;
use crate::types::{
    Modifiers, ScriptClass, ScriptFunction, ScriptParam, ScriptScope, ScriptVariable, TypeRef,
};

/// Render a whole scope to source text.
pub fn print(scope: &ScriptScope) -> String {
    scope.to_string()
}

impl fmt::Display for ScriptScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        if !self.variables.is_empty() {
            for variable in &self.variables {
                write_variable(f, variable, 0)?;
            }
            first = false;
        }
        for function in &self.functions {
            if !first {
                f.write_str("\n")?;
            }
            write_function(f, function, 0)?;
            first = false;
        }
        for class in &self.classes {
            if !first {
                f.write_str("\n")?;
            }
            write!(f, "{class}")?;
            first = false;
        }
        Ok(())
    }
}

impl fmt::Display for ScriptClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.modifiers.is_empty() {
            write!(f, "{} ", self.modifiers)?;
        }
        write!(f, "class {}", self.name)?;
        if let Some(base) = &self.base {
            write!(f, " : {base}")?;
        }
        f.write_str("\n{\n")?;

        let mut first = true;
        if !self.variables.is_empty() {
            for variable in &self.variables {
                write_variable(f, variable, 1)?;
            }
            first = false;
        }
        for function in &self.functions {
            if !first {
                f.write_str("\n")?;
            }
            write_function(f, function, 1)?;
            first = false;
        }

        f.write_str("}\n")
    }
}

impl fmt::Display for ScriptFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_function(f, self, 0)
    }
}

impl fmt::Display for ScriptVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_variable(f, self, 0)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for modifier in &self.modifiers {
            write!(f, "{modifier} ")?;
        }
        f.write_str(&self.name)?;
        if !self.args.is_empty() {
            f.write_str("<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{arg}")?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for word in self.words() {
            if !first {
                f.write_str(" ")?;
            }
            f.write_str(word)?;
            first = false;
        }
        Ok(())
    }
}

fn write_indent(f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
    for _ in 0..indent {
        f.write_str("\t")?;
    }
    Ok(())
}

fn write_variable(
    f: &mut fmt::Formatter<'_>,
    variable: &ScriptVariable,
    indent: usize,
) -> fmt::Result {
    write_indent(f, indent)?;
    if !variable.modifiers.is_empty() {
        write!(f, "{} ", variable.modifiers)?;
    }
    write!(f, "{} {}", variable.ty, variable.name)?;
    if let Some(value) = &variable.value {
        f.write_str(" = ")?;
        write_tokens(f, value)?;
    }
    f.write_str(";\n")
}

fn write_function(
    f: &mut fmt::Formatter<'_>,
    function: &ScriptFunction,
    indent: usize,
) -> fmt::Result {
    write_indent(f, indent)?;
    if !function.modifiers.is_empty() {
        write!(f, "{} ", function.modifiers)?;
    }
    write!(f, "{} {}(", function.return_type, function.name)?;
    for (i, param) in function.params.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write_param(f, param)?;
    }
    f.write_str(")")?;

    match &function.body {
        Some(body) => {
            f.write_str("\n")?;
            write_body(f, body, indent)
        }
        None => f.write_str(";\n"),
    }
}

fn write_param(f: &mut fmt::Formatter<'_>, param: &ScriptParam) -> fmt::Result {
    if !param.modifiers.is_empty() {
        write!(f, "{} ", param.modifiers)?;
    }
    write!(f, "{}", param.ty)?;
    if !param.name.is_empty() {
        write!(f, " {}", param.name)?;
    }
    if let Some(default) = &param.default {
        f.write_str(" = ")?;
        write_tokens(f, default)?;
    }
    Ok(())
}

/// Write a captured token sequence on one line.
fn write_tokens(f: &mut fmt::Formatter<'_>, tokens: &[TokenKind]) -> fmt::Result {
    let mut spacer = TokenSpacer::new();
    for token in tokens {
        if spacer.space_before(token) {
            f.write_str(" ")?;
        }
        write!(f, "{token}")?;
    }
    Ok(())
}

/// Write a function body between braces. Statements break at `;` and brace
/// tokens outside parentheses; a `;` inside parentheses belongs to a `for`
/// header and stays inline. A closing brace joins a following `else`.
fn write_body(f: &mut fmt::Formatter<'_>, body: &[TokenKind], indent: usize) -> fmt::Result {
    write_indent(f, indent)?;
    f.write_str("{\n")?;

    let mut depth = indent + 1;
    let mut group = 0usize;
    let mut at_line_start = true;
    let mut spacer = TokenSpacer::new();

    let mut tokens = body.iter().peekable();
    while let Some(token) = tokens.next() {
        match token {
            TokenKind::LBrace if group == 0 => {
                if !at_line_start {
                    f.write_str("\n")?;
                }
                write_indent(f, depth)?;
                f.write_str("{\n")?;
                depth += 1;
                at_line_start = true;
                spacer.reset();
            }
            TokenKind::RBrace if group == 0 => {
                if !at_line_start {
                    f.write_str("\n")?;
                }
                depth = depth.saturating_sub(1);
                write_indent(f, depth)?;
                if matches!(tokens.peek(), Some(TokenKind::Ident(word)) if word == "else") {
                    f.write_str("} ")?;
                    at_line_start = false;
                } else {
                    f.write_str("}\n")?;
                    at_line_start = true;
                }
                spacer.reset();
            }
            TokenKind::Semicolon if group == 0 => {
                if at_line_start {
                    write_indent(f, depth)?;
                }
                f.write_str(";\n")?;
                at_line_start = true;
                spacer.reset();
            }
            _ => {
                match token {
                    TokenKind::LParen | TokenKind::LBracket => group += 1,
                    TokenKind::RParen | TokenKind::RBracket => group = group.saturating_sub(1),
                    _ => {}
                }
                let space = spacer.space_before(token);
                if at_line_start {
                    write_indent(f, depth)?;
                    at_line_start = false;
                } else if space {
                    f.write_str(" ")?;
                }
                write!(f, "{token}")?;
            }
        }
    }

    if !at_line_start {
        f.write_str("\n")?;
    }
    write_indent(f, indent)?;
    f.write_str("}\n")
}

/// Decides token spacing so the printed text re-lexes to the same tokens.
/// Tracks one token of context plus whether the previous token was a unary
/// sign whose operand should attach without a space.
struct TokenSpacer<'a> {
    prev: Option<&'a TokenKind>,
    tight_next: bool,
}

impl<'a> TokenSpacer<'a> {
    fn new() -> Self {
        TokenSpacer {
            prev: None,
            tight_next: false,
        }
    }

    fn reset(&mut self) {
        self.prev = None;
        self.tight_next = false;
    }

    fn space_before(&mut self, token: &'a TokenKind) -> bool {
        let space = match self.prev {
            None => false,
            Some(_) if self.tight_next && is_operand_start(token) => false,
            Some(prev) => needs_space(prev, token),
        };
        self.tight_next = matches!(token, TokenKind::Minus | TokenKind::Plus)
            && is_prefix_position(self.prev);
        self.prev = Some(token);
        space
    }
}

fn is_operand_start(token: &TokenKind) -> bool {
    matches!(
        token,
        TokenKind::Ident(_)
            | TokenKind::Int(_)
            | TokenKind::Float(_)
            | TokenKind::Str(_)
            | TokenKind::LParen
    )
}

/// Whether a `+` or `-` after `prev` reads as a sign rather than as a
/// binary operator.
fn is_prefix_position(prev: Option<&TokenKind>) -> bool {
    let Some(prev) = prev else { return true };
    match prev {
        TokenKind::Ident(word) => is_control_word(word),
        TokenKind::Int(_)
        | TokenKind::Float(_)
        | TokenKind::Str(_)
        | TokenKind::RParen
        | TokenKind::RBracket
        | TokenKind::PlusPlus
        | TokenKind::MinusMinus => false,
        _ => true,
    }
}

fn is_control_word(word: &str) -> bool {
    matches!(
        word,
        "if" | "else" | "while" | "for" | "foreach" | "switch" | "return" | "case" | "delete"
    )
}

fn needs_space(prev: &TokenKind, next: &TokenKind) -> bool {
    use TokenKind::*;

    // Openers and member access bind tight to the right.
    if matches!(prev, LParen | LBracket | Dot) {
        return false;
    }
    // Prefix operators attach to an operand-like follower. An `=` after
    // `!` must stay separate or the two would re-lex as `!=`.
    if matches!(prev, Bang | Tilde) {
        return !matches!(next, Ident(_) | Int(_) | Float(_) | Str(_) | LParen | Bang | Tilde);
    }
    if matches!(prev, PlusPlus | MinusMinus) && matches!(next, Ident(_) | LParen) {
        return false;
    }
    // Closers and separators bind tight to the left.
    if matches!(next, RParen | RBracket | Comma | Semicolon) {
        return false;
    }
    if matches!(next, Dot) {
        // Keep digits away from `.` so numbers cannot fuse into floats.
        return matches!(prev, Int(_) | Float(_));
    }
    if matches!(next, LParen) {
        return match prev {
            Ident(word) => is_control_word(word),
            _ => true,
        };
    }
    if matches!(next, LBracket) {
        return !matches!(prev, Ident(_) | Str(_) | RParen | RBracket);
    }
    if matches!(next, PlusPlus | MinusMinus) {
        return !matches!(prev, Ident(_) | RParen | RBracket);
    }
    true
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_str_eq;

    use super::*;
    use crate::parser::parse;

    fn reprint(source: &str) -> String {
        let parsed = parse(source);
        assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
        print(&parsed.scope)
    }

    #[test]
    fn print_class_layout() {
        let source = "class Compass : ItemBase\n{\n\tprivate int m_Bearing;\n\n\tvoid Update(int delta)\n\t{\n\t\tif (delta > 0)\n\t\t{\n\t\t\tm_Bearing += delta;\n\t\t} else\n\t\t{\n\t\t\tReset();\n\t\t}\n\t}\n}\n";
        assert_str_eq!(reprint(source), source);
    }

    #[test]
    fn print_normalizes_modifier_order() {
        assert_str_eq!(
            reprint("static private int x = 5;"),
            "private static int x = 5;\n",
        );
    }

    #[test]
    fn print_extends_becomes_colon() {
        assert_str_eq!(
            reprint("modded class A extends B {}"),
            "modded class A : B\n{\n}\n",
        );
    }

    #[test]
    fn print_bodiless_function() {
        assert_str_eq!(
            reprint("proto native int GetTime();"),
            "proto native int GetTime();\n",
        );
    }

    #[test]
    fn print_generics_reuse_shift_spelling() {
        assert_str_eq!(
            reprint("map<string, ref array<int>> m_Lookup;"),
            "map<string, ref array<int>> m_Lookup;\n",
        );
    }

    #[test]
    fn print_for_loop_stays_inline() {
        let source = "void F()\n{\n\tfor (int i = 0; i < 3; i++)\n\t{\n\t\tStep(i);\n\t}\n}\n";
        assert_str_eq!(reprint(source), source);
    }

    #[test]
    fn print_unary_sign_binds_tight() {
        assert_str_eq!(reprint("float m_Offset = -1.5;"), "float m_Offset = -1.5;\n");
        let source = "void F()\n{\n\tx = a - -1;\n}\n";
        assert_str_eq!(reprint(source), source);
    }

    #[test]
    fn print_scope_blocks_are_separated() {
        assert_str_eq!(
            reprint("int a;\nint b;\nvoid F();\nclass C {}\n"),
            "int a;\nint b;\n\nvoid F();\n\nclass C\n{\n}\n",
        );
    }

    #[test]
    fn print_forward_declaration_gets_braces() {
        assert_str_eq!(reprint("class A;"), "class A\n{\n}\n");
    }

    #[test]
    fn print_params_with_defaults() {
        assert_str_eq!(
            reprint("void Spawn(notnull Widget parent, int count = 2 + 1);"),
            "void Spawn(notnull Widget parent, int count = 2 + 1);\n",
        );
    }

    #[test]
    fn print_string_and_call_spacing() {
        let source = "void F()\n{\n\tPrint(\"a\" + m_Items[0].GetName());\n}\n";
        assert_str_eq!(reprint(source), source);
    }
}
