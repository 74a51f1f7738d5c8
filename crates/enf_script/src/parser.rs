//! Recovery-driven parser assembling the script model.
//!
//! Parsing never fails: anything that cannot be understood becomes a
//! diagnostic and the parser skips to the next declaration boundary,
//! keeping every declaration that did parse. Keywords are contextual, so
//! `class`, `ref` and the other modifier words only take effect where a
//! declaration allows them.

use tracing::{debug, instrument};

use crate::error::ParseDiagnostic;
use crate::lexer::{self, Token, TokenKind};
use crate::types::{
    is_type_modifier, Modifiers, ScriptClass, ScriptFunction, ScriptParam, ScriptScope,
    ScriptVariable, TypeRef,
};

/// The reconstructed scope plus every diagnostic gathered on the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedScript {
    pub scope: ScriptScope,
    pub diagnostics: Vec<ParseDiagnostic>,
}

impl ParsedScript {
    /// Whether any diagnostic is a hard error rather than a warning.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(ParseDiagnostic::is_error)
    }
}

/// Parse one script source into a structured scope.
#[instrument(skip(source), fields(len = source.len()))]
pub fn parse(source: &str) -> ParsedScript {
    let (tokens, diagnostics) = lexer::lex(source);
    let mut parser = Parser {
        tokens,
        pos: 0,
        end_offset: source.len(),
        diagnostics,
    };

    let mut scope = ScriptScope::default();
    while !parser.at_end() {
        parser.parse_declaration(&mut scope);
    }

    debug!(
        variables = scope.variables.len(),
        functions = scope.functions.len(),
        classes = scope.classes.len(),
        diagnostics = parser.diagnostics.len(),
        "script parsed"
    );
    ParsedScript {
        scope,
        diagnostics: parser.diagnostics,
    }
}

enum Member {
    Function(ScriptFunction),
    Variables(Vec<ScriptVariable>),
}

/// Words that can only begin a new declaration, used to resynchronize
/// after an error.
fn is_sync_word(word: &str) -> bool {
    matches!(word, "class" | "enum" | "typedef" | "modded")
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Source length, used as the offset for end-of-input diagnostics.
    end_offset: usize,
    diagnostics: Vec<ParseDiagnostic>,
}

impl Parser {
    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn peek_at(&self, n: usize) -> Option<&TokenKind> {
        self.tokens.get(self.pos + n).map(|t| &t.kind)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.end_offset, |t| t.offset)
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek() == Some(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn check_word(&self, word: &str) -> bool {
        matches!(self.peek(), Some(TokenKind::Ident(s)) if s == word)
    }

    fn eat_word(&mut self, word: &str) -> bool {
        if self.check_word(word) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn eat_ident(&mut self) -> Option<String> {
        match self.peek() {
            Some(TokenKind::Ident(name)) => {
                let name = name.clone();
                self.bump();
                Some(name)
            }
            _ => None,
        }
    }

    fn warn(&mut self, offset: usize, message: impl Into<String>) {
        self.diagnostics
            .push(ParseDiagnostic::warning(offset, message));
    }

    fn error(&mut self, offset: usize, message: impl Into<String>) {
        self.diagnostics.push(ParseDiagnostic::error(offset, message));
    }

    fn parse_declaration(&mut self, scope: &mut ScriptScope) {
        if self.eat(&TokenKind::Semicolon) {
            return;
        }

        let offset = self.offset();
        if self.eat(&TokenKind::RBrace) {
            self.error(offset, "unmatched `}`");
            return;
        }

        // Attribute groups like `[Attribute(...)]` annotate the following
        // declaration and are not part of the model.
        if self.peek() == Some(&TokenKind::LBracket) {
            self.skip_bracket_group();
            self.warn(offset, "attribute block skipped");
            return;
        }

        let modifiers = self.parse_modifiers();

        if self.check_word("class") {
            if let Some(class) = self.parse_class(modifiers) {
                scope.classes.push(class);
            }
            return;
        }

        let skipped = match self.peek() {
            Some(TokenKind::Ident(word)) if word == "enum" || word == "typedef" => {
                Some(word.clone())
            }
            _ => None,
        };
        if let Some(word) = skipped {
            self.warn(offset, format!("`{word}` declaration skipped"));
            self.bump();
            self.skip_declaration();
            return;
        }

        match self.parse_member(modifiers) {
            Some(Member::Function(function)) => {
                if scope
                    .functions
                    .iter()
                    .any(|f| f.name == function.name && f.params.len() == function.params.len())
                {
                    self.warn(
                        offset,
                        format!("duplicate definition of `{}` dropped", function.name),
                    );
                } else {
                    scope.functions.push(function);
                }
            }
            Some(Member::Variables(variables)) => {
                for variable in variables {
                    if scope.variables.iter().any(|v| v.name == variable.name) {
                        self.warn(
                            offset,
                            format!("duplicate variable `{}` dropped", variable.name),
                        );
                    } else {
                        scope.variables.push(variable);
                    }
                }
            }
            None => {}
        }
    }

    /// Consume leading modifier keywords. A word only counts as a modifier
    /// when another identifier follows, so the final identifier of a
    /// declaration head is always left for the type.
    fn parse_modifiers(&mut self) -> Modifiers {
        let mut modifiers = Modifiers::default();
        loop {
            let word = match self.peek() {
                Some(TokenKind::Ident(word)) => word.clone(),
                _ => break,
            };
            if !matches!(self.peek_at(1), Some(TokenKind::Ident(_))) {
                break;
            }
            let offset = self.offset();
            match modifiers.try_set(&word) {
                Some(false) => self.bump(),
                Some(true) => {
                    self.bump();
                    self.warn(offset, format!("duplicate `{word}` modifier"));
                }
                None => break,
            }
        }
        modifiers
    }

    fn parse_class(&mut self, modifiers: Modifiers) -> Option<ScriptClass> {
        let class_offset = self.offset();
        self.bump();

        let Some(name) = self.eat_ident() else {
            self.error(self.offset(), "expected a class name");
            self.skip_declaration();
            return None;
        };

        if self.peek() == Some(&TokenKind::Less) {
            self.warn(class_offset, format!("template class `{name}` skipped"));
            self.skip_declaration();
            return None;
        }

        let base = if self.eat(&TokenKind::Colon) || self.eat_word("extends") {
            let base = self.eat_ident();
            if base.is_none() {
                self.error(self.offset(), format!("expected a base class for `{name}`"));
            }
            base
        } else {
            None
        };

        let mut class = ScriptClass {
            name,
            base,
            modifiers,
            variables: Vec::new(),
            functions: Vec::new(),
        };

        // Forward declaration, kept as an empty class.
        if self.eat(&TokenKind::Semicolon) {
            return Some(class);
        }

        if !self.eat(&TokenKind::LBrace) {
            self.error(self.offset(), format!("expected `{{` after class `{}`", class.name));
            self.skip_declaration();
            return Some(class);
        }

        while !self.at_end() && self.peek() != Some(&TokenKind::RBrace) {
            self.parse_class_member(&mut class);
        }

        if !self.eat(&TokenKind::RBrace) {
            self.error(self.offset(), format!("missing `}}` for class `{}`", class.name));
        }
        self.eat(&TokenKind::Semicolon);

        Some(class)
    }

    fn parse_class_member(&mut self, class: &mut ScriptClass) {
        if self.eat(&TokenKind::Semicolon) {
            return;
        }

        let offset = self.offset();
        if self.peek() == Some(&TokenKind::LBracket) {
            self.skip_bracket_group();
            self.warn(offset, "attribute block skipped");
            return;
        }

        let modifiers = self.parse_modifiers();
        match self.parse_member(modifiers) {
            Some(Member::Function(function)) => {
                if class
                    .functions
                    .iter()
                    .any(|f| f.name == function.name && f.params.len() == function.params.len())
                {
                    self.warn(
                        offset,
                        format!(
                            "duplicate definition of `{}.{}` dropped",
                            class.name, function.name
                        ),
                    );
                } else {
                    class.functions.push(function);
                }
            }
            Some(Member::Variables(variables)) => {
                for variable in variables {
                    if class.variables.iter().any(|v| v.name == variable.name) {
                        self.warn(
                            offset,
                            format!(
                                "duplicate member `{}.{}` dropped",
                                class.name, variable.name
                            ),
                        );
                    } else {
                        class.variables.push(variable);
                    }
                }
            }
            None => {}
        }
    }

    /// A function or variable declaration after its modifiers.
    fn parse_member(&mut self, modifiers: Modifiers) -> Option<Member> {
        let Some(ty) = self.parse_type() else {
            self.error(self.offset(), "expected a declaration");
            self.skip_declaration();
            return None;
        };

        let destructor = self.eat(&TokenKind::Tilde);
        let Some(mut name) = self.eat_ident() else {
            self.error(self.offset(), format!("expected a name after `{}`", ty.name));
            self.skip_declaration();
            return None;
        };
        if destructor {
            name.insert(0, '~');
        }

        if self.peek() == Some(&TokenKind::LParen) {
            return Some(Member::Function(
                self.parse_function_rest(modifiers, ty, name),
            ));
        }
        Some(Member::Variables(
            self.parse_variables_rest(modifiers, ty, name),
        ))
    }

    fn parse_type(&mut self) -> Option<TypeRef> {
        let name = self.eat_ident()?;
        let mut ty = TypeRef::named(name);

        if self.eat(&TokenKind::Less) {
            loop {
                let Some(arg) = self.parse_type_arg() else {
                    self.error(
                        self.offset(),
                        format!("expected a type argument for `{}`", ty.name),
                    );
                    break;
                };
                ty.args.push(arg);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect_close_angle(&ty.name);
        }

        Some(ty)
    }

    fn parse_type_arg(&mut self) -> Option<TypeRef> {
        let mut modifiers = Vec::new();
        loop {
            let word = match self.peek() {
                Some(TokenKind::Ident(word)) if is_type_modifier(word) => word.clone(),
                _ => break,
            };
            if !matches!(self.peek_at(1), Some(TokenKind::Ident(_))) {
                break;
            }
            modifiers.push(word);
            self.bump();
        }

        let mut ty = self.parse_type()?;
        ty.modifiers = modifiers;
        Some(ty)
    }

    /// Close a generic argument list. A `>>` token closing two lists at
    /// once is split in place, leaving a `>` for the outer list.
    fn expect_close_angle(&mut self, context: &str) {
        match self.peek() {
            Some(TokenKind::Greater) => self.bump(),
            Some(TokenKind::GreaterGreater) => {
                let token = &mut self.tokens[self.pos];
                token.kind = TokenKind::Greater;
                token.offset += 1;
            }
            _ => {
                self.error(self.offset(), format!("expected `>` to close `{context}`"));
            }
        }
    }

    fn parse_function_rest(
        &mut self,
        modifiers: Modifiers,
        return_type: TypeRef,
        name: String,
    ) -> ScriptFunction {
        let params = self.parse_params(&name);

        let body = if self.peek() == Some(&TokenKind::LBrace) {
            Some(self.capture_block())
        } else {
            if !self.eat(&TokenKind::Semicolon) {
                self.error(self.offset(), format!("expected a body or `;` for `{name}`"));
                self.skip_declaration();
            }
            None
        };

        ScriptFunction {
            name,
            return_type,
            modifiers,
            params,
            body,
        }
    }

    fn parse_params(&mut self, function: &str) -> Vec<ScriptParam> {
        self.bump();

        let mut params = Vec::new();
        if self.eat(&TokenKind::RParen) {
            return params;
        }

        loop {
            if let Some(param) = self.parse_param() {
                params.push(param);
            } else {
                self.recover_param();
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }

        if !self.eat(&TokenKind::RParen) {
            self.error(
                self.offset(),
                format!("expected `)` after parameters of `{function}`"),
            );
        }
        params
    }

    fn parse_param(&mut self) -> Option<ScriptParam> {
        let modifiers = self.parse_modifiers();

        let Some(ty) = self.parse_type() else {
            self.error(self.offset(), "expected a parameter type");
            return None;
        };

        let name = match self.eat_ident() {
            Some(name) => name,
            None => {
                self.error(
                    self.offset(),
                    format!("expected a parameter name after `{}`", ty.name),
                );
                String::new()
            }
        };

        // Array suffixes are accepted but not modeled.
        while self.peek() == Some(&TokenKind::LBracket) {
            self.skip_bracket_group();
        }

        let default = if self.eat(&TokenKind::Eq) {
            Some(self.capture_until(&[TokenKind::Comma, TokenKind::RParen]))
        } else {
            None
        };

        Some(ScriptParam {
            name,
            ty,
            modifiers,
            default,
        })
    }

    /// Skip to the `,` or `)` ending a broken parameter.
    fn recover_param(&mut self) {
        let mut depth = 0usize;
        while let Some(kind) = self.peek() {
            match kind {
                TokenKind::LParen | TokenKind::LBracket => depth += 1,
                TokenKind::RParen | TokenKind::RBracket if depth > 0 => depth -= 1,
                TokenKind::RParen | TokenKind::Comma if depth == 0 => return,
                TokenKind::Semicolon | TokenKind::LBrace | TokenKind::RBrace => return,
                _ => {}
            }
            self.bump();
        }
    }

    fn parse_variables_rest(
        &mut self,
        modifiers: Modifiers,
        ty: TypeRef,
        first_name: String,
    ) -> Vec<ScriptVariable> {
        let mut variables = Vec::new();
        let mut name = first_name;

        loop {
            // Array suffixes are accepted but not modeled.
            if self.peek() == Some(&TokenKind::LBracket) {
                let offset = self.offset();
                while self.peek() == Some(&TokenKind::LBracket) {
                    self.skip_bracket_group();
                }
                self.warn(offset, format!("array dimensions on `{name}` dropped"));
            }

            let value = if self.eat(&TokenKind::Eq) {
                Some(self.capture_until(&[TokenKind::Comma, TokenKind::Semicolon]))
            } else {
                None
            };

            variables.push(ScriptVariable {
                name: name.clone(),
                ty: ty.clone(),
                modifiers,
                value,
            });

            if !self.eat(&TokenKind::Comma) {
                break;
            }
            match self.eat_ident() {
                Some(next) => name = next,
                None => {
                    self.error(self.offset(), "expected a name after `,`");
                    self.skip_declaration();
                    return variables;
                }
            }
        }

        if !self.eat(&TokenKind::Semicolon) {
            self.error(self.offset(), format!("expected `;` after `{name}`"));
            self.skip_declaration();
        }
        variables
    }

    /// Capture expression tokens until one of `stops` appears at nesting
    /// depth zero. The stop token itself is left for the caller.
    fn capture_until(&mut self, stops: &[TokenKind]) -> Vec<TokenKind> {
        let mut tokens = Vec::new();
        let mut depth = 0usize;
        while let Some(kind) = self.peek() {
            match kind {
                _ if depth == 0 && stops.contains(kind) => break,
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace if depth > 0 => {
                    depth -= 1
                }
                // A closer we did not open ends the enclosing declaration.
                TokenKind::RParen | TokenKind::RBrace | TokenKind::Semicolon => break,
                _ => {}
            }
            tokens.push(kind.clone());
            self.bump();
        }
        tokens
    }

    /// Capture the tokens between a balanced pair of braces, excluding the
    /// braces themselves.
    fn capture_block(&mut self) -> Vec<TokenKind> {
        let offset = self.offset();
        self.bump();

        let mut tokens = Vec::new();
        let mut depth = 1usize;
        while let Some(kind) = self.peek() {
            match kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        self.bump();
                        return tokens;
                    }
                }
                _ => {}
            }
            tokens.push(kind.clone());
            self.bump();
        }

        self.error(offset, "unterminated body");
        tokens
    }

    /// Skip one balanced `[...]` group.
    fn skip_bracket_group(&mut self) {
        let mut depth = 0usize;
        while let Some(kind) = self.peek() {
            match kind {
                TokenKind::LBracket => depth += 1,
                TokenKind::RBracket => {
                    self.bump();
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return;
                    }
                    continue;
                }
                _ => {}
            }
            self.bump();
        }
    }

    /// Synchronize to the next declaration boundary: past a `;` at brace
    /// depth zero, past the `}` (plus optional `;`) closing a body, or in
    /// front of a word that can only start a fresh declaration. A `}` that
    /// closes an enclosing scope is left in place.
    fn skip_declaration(&mut self) {
        let mut depth = 0usize;
        while let Some(kind) = self.peek() {
            match kind {
                TokenKind::Ident(word) if depth == 0 && is_sync_word(word) => return,
                TokenKind::Semicolon if depth == 0 => {
                    self.bump();
                    return;
                }
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                    self.bump();
                    if depth == 0 {
                        self.eat(&TokenKind::Semicolon);
                        return;
                    }
                    continue;
                }
                _ => {}
            }
            self.bump();
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use super::*;

    fn parse_clean(source: &str) -> ScriptScope {
        let parsed = parse(source);
        assert_eq!(parsed.diagnostics, vec![]);
        parsed.scope
    }

    #[traced_test]
    #[test]
    fn parse_class_with_base() {
        let scope = parse_clean("class ItemCompass : ItemBase\n{\n}\n");
        assert_eq!(scope.classes.len(), 1);
        let class = &scope.classes[0];
        assert_eq!(class.name, "ItemCompass");
        assert_eq!(class.base.as_deref(), Some("ItemBase"));
        assert!(class.modifiers.is_empty());
    }

    #[test]
    fn parse_extends_matches_colon() {
        let with_colon = parse_clean("class A : B {}");
        let with_extends = parse_clean("class A extends B {}");
        assert_eq!(with_colon, with_extends);
    }

    #[test]
    fn parse_modded_class() {
        let scope = parse_clean("modded class PlayerBase {}");
        assert!(scope.classes[0].modifiers.modded);
    }

    #[test]
    fn parse_member_variables() {
        let scope = parse_clean(
            "class Config\n{\n\tprivate static int s_Count = 0;\n\tref array<string> m_Names;\n}\n",
        );
        let class = &scope.classes[0];
        assert_eq!(class.variables.len(), 2);

        let count = &class.variables[0];
        assert_eq!(count.name, "s_Count");
        assert_eq!(count.ty, TypeRef::named("int"));
        assert!(count.modifiers.private && count.modifiers.static_);
        assert_eq!(count.value, Some(vec![TokenKind::Int("0".to_string())]));

        let names = &class.variables[1];
        assert_eq!(names.name, "m_Names");
        assert!(names.modifiers.ref_);
        assert_eq!(names.ty.name, "array");
        assert_eq!(names.ty.args, vec![TypeRef::named("string")]);
    }

    #[test]
    fn parse_function_with_body() {
        let scope = parse_clean("void Greet()\n{\n\tPrint(\"hi\");\n}\n");
        assert_eq!(scope.functions.len(), 1);
        let function = &scope.functions[0];
        assert_eq!(function.name, "Greet");
        assert_eq!(function.return_type, TypeRef::named("void"));
        assert_eq!(
            function.body,
            Some(vec![
                TokenKind::Ident("Print".to_string()),
                TokenKind::LParen,
                TokenKind::Str("hi".to_string()),
                TokenKind::RParen,
                TokenKind::Semicolon,
            ]),
        );
    }

    #[test]
    fn parse_proto_native_is_bodiless() {
        let scope = parse_clean("proto native int GetTime();");
        let function = &scope.functions[0];
        assert!(function.modifiers.proto && function.modifiers.native);
        assert_eq!(function.body, None);
    }

    #[test]
    fn parse_destructor() {
        let scope = parse_clean("class A\n{\n\tvoid ~A()\n\t{\n\t}\n}\n");
        assert_eq!(scope.classes[0].functions[0].name, "~A");
    }

    #[test]
    fn parse_params_with_modifiers_and_defaults() {
        let scope =
            parse_clean("bool Raycast(notnull Widget w, out float dist, int mask = 0xFF);");
        let function = &scope.functions[0];
        assert_eq!(function.params.len(), 3);
        assert!(function.params[0].modifiers.notnull);
        assert_eq!(function.params[0].name, "w");
        assert!(function.params[1].modifiers.out);
        assert_eq!(
            function.params[2].default,
            Some(vec![TokenKind::Int("0xFF".to_string())]),
        );
    }

    #[test]
    fn parse_nested_generics_split_the_shift() {
        let scope = parse_clean("map<string, ref array<int>> m_Lookup;");
        let variable = &scope.variables[0];
        assert_eq!(variable.ty.name, "map");
        assert_eq!(variable.ty.args.len(), 2);
        assert_eq!(variable.ty.args[0], TypeRef::named("string"));
        let inner = &variable.ty.args[1];
        assert_eq!(inner.modifiers, vec!["ref".to_string()]);
        assert_eq!(inner.name, "array");
        assert_eq!(inner.args, vec![TypeRef::named("int")]);
    }

    #[test]
    fn parse_comma_declarators() {
        let scope = parse_clean("int a, b = 2, c;");
        let names: Vec<&str> = scope.variables.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(scope.variables[0].value, None);
        assert_eq!(
            scope.variables[1].value,
            Some(vec![TokenKind::Int("2".to_string())]),
        );
    }

    #[traced_test]
    #[test]
    fn parse_duplicate_member_first_wins() {
        let parsed = parse(
            "class A\n{\n\tint m_Value = 1;\n\tint m_Value = 2;\n\tvoid Tick() {}\n\tvoid Tick() {}\n\tvoid Tick(int dt) {}\n}\n",
        );
        let class = &parsed.scope.classes[0];
        assert_eq!(class.variables.len(), 1);
        assert_eq!(
            class.variables[0].value,
            Some(vec![TokenKind::Int("1".to_string())]),
        );
        // Same name with a different arity is an overload, not a duplicate.
        assert_eq!(class.functions.len(), 2);
        assert_eq!(parsed.diagnostics.len(), 2);
        assert!(parsed.diagnostics.iter().all(|d| !d.is_error()));
        assert_eq!(
            parsed.diagnostics[0].message,
            "duplicate member `A.m_Value` dropped",
        );
        assert_eq!(
            parsed.diagnostics[1].message,
            "duplicate definition of `A.Tick` dropped",
        );
    }

    #[test]
    fn parse_enum_skipped_with_warning() {
        let parsed = parse("enum Colors\n{\n\tRED,\n\tGREEN\n}\nclass After {}\n");
        assert_eq!(parsed.scope.classes.len(), 1);
        assert_eq!(parsed.scope.classes[0].name, "After");
        assert_eq!(parsed.diagnostics.len(), 1);
        assert_eq!(parsed.diagnostics[0].message, "`enum` declaration skipped");
        assert!(!parsed.diagnostics[0].is_error());
    }

    #[test]
    fn parse_template_class_skipped() {
        let parsed = parse("class Pair<Class K, Class V>\n{\n\tK m_Key;\n}\nclass After {}\n");
        assert_eq!(parsed.scope.classes.len(), 1);
        assert_eq!(parsed.scope.classes[0].name, "After");
        assert_eq!(
            parsed.diagnostics[0].message,
            "template class `Pair` skipped",
        );
    }

    #[test]
    fn parse_attribute_block_skipped_before_declaration() {
        let parsed = parse("[Attribute(\"1\", UIWidgets.CheckBox)]\nint m_Enabled;");
        assert_eq!(parsed.scope.variables.len(), 1);
        assert_eq!(parsed.scope.variables[0].name, "m_Enabled");
        assert_eq!(parsed.diagnostics.len(), 1);
        assert_eq!(parsed.diagnostics[0].message, "attribute block skipped");
    }

    #[test]
    fn parse_array_dimensions_dropped_with_warning() {
        let parsed = parse("int m_Slots[4];");
        assert_eq!(parsed.scope.variables.len(), 1);
        assert_eq!(parsed.scope.variables[0].name, "m_Slots");
        assert_eq!(
            parsed.diagnostics[0].message,
            "array dimensions on `m_Slots` dropped",
        );
    }

    #[traced_test]
    #[test]
    fn parse_recovers_after_garbage() {
        let parsed = parse("int = ;\nclass Survivor {}\n");
        assert!(parsed.has_errors());
        assert_eq!(parsed.scope.classes.len(), 1);
        assert_eq!(parsed.scope.classes[0].name, "Survivor");
    }

    #[test]
    fn parse_unmatched_close_brace_makes_progress() {
        let parsed = parse("}\n}\nint x;");
        assert_eq!(parsed.scope.variables.len(), 1);
        assert_eq!(
            parsed
                .diagnostics
                .iter()
                .filter(|d| d.message == "unmatched `}`")
                .count(),
            2,
        );
    }

    #[test]
    fn parse_body_keeps_nested_braces_balanced() {
        let scope = parse_clean("void F()\n{\n\tif (a)\n\t{\n\t\tb();\n\t}\n}\n");
        let body = scope.functions[0].body.as_ref().unwrap();
        let braces: Vec<&TokenKind> = body
            .iter()
            .filter(|k| matches!(k, TokenKind::LBrace | TokenKind::RBrace))
            .collect();
        assert_eq!(braces, vec![&TokenKind::LBrace, &TokenKind::RBrace]);
    }

    #[test]
    fn parse_forward_declaration() {
        let scope = parse_clean("class Widget;");
        assert_eq!(scope.classes.len(), 1);
        assert_eq!(scope.classes[0].name, "Widget");
        assert!(scope.classes[0].variables.is_empty());
    }

    #[test]
    fn parse_missing_param_name_recovers() {
        let parsed = parse("void F(int, int b);");
        assert!(parsed.has_errors());
        let function = &parsed.scope.functions[0];
        assert_eq!(function.params.len(), 2);
        assert_eq!(function.params[0].name, "");
        assert_eq!(function.params[1].name, "b");
    }
}
