//! Structured model of reconstructed script declarations.
//!
//! The model keeps declaration headers fully structured while statement
//! bodies, initializers and parameter defaults stay as captured token
//! sequences. Order within each collection is the order the declarations
//! appeared in the source.

use crate::lexer::TokenKind;

/// Everything declared at the top level of one script source.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScriptScope {
    pub variables: Vec<ScriptVariable>,
    pub functions: Vec<ScriptFunction>,
    pub classes: Vec<ScriptClass>,
}

impl ScriptScope {
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty() && self.functions.is_empty() && self.classes.is_empty()
    }
}

/// A class declaration with its members.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScriptClass {
    pub name: String,
    /// Base class name, whether it was introduced with `:` or `extends`.
    pub base: Option<String>,
    pub modifiers: Modifiers,
    pub variables: Vec<ScriptVariable>,
    pub functions: Vec<ScriptFunction>,
}

/// A function or method. Destructors keep the `~` as part of the name.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScriptFunction {
    pub name: String,
    pub return_type: TypeRef,
    pub modifiers: Modifiers,
    pub params: Vec<ScriptParam>,
    /// Tokens between the body braces, or `None` for a bodiless
    /// declaration such as `proto native`.
    pub body: Option<Vec<TokenKind>>,
}

/// One function parameter.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScriptParam {
    pub name: String,
    pub ty: TypeRef,
    pub modifiers: Modifiers,
    /// Tokens of the default value, when one was given.
    pub default: Option<Vec<TokenKind>>,
}

/// A variable declaration, at scope level or as a class member.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScriptVariable {
    pub name: String,
    pub ty: TypeRef,
    pub modifiers: Modifiers,
    /// Tokens of the initializer, when one was given.
    pub value: Option<Vec<TokenKind>>,
}

/// A type reference such as `map<string, ref array<int>>`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeRef {
    /// Modifier words attached directly to the type, as in the `ref`
    /// of `array<ref Widget>`.
    pub modifiers: Vec<String>,
    pub name: String,
    pub args: Vec<TypeRef>,
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef {
            modifiers: Vec::new(),
            name: name.into(),
            args: Vec::new(),
        }
    }
}

/// Declaration modifiers, one flag per keyword.
///
/// Printing emits them in the fixed order of the fields below no matter how
/// the source ordered them, so `static private int x;` comes back as
/// `private static int x;`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Modifiers {
    pub modded: bool,
    pub sealed: bool,
    pub private: bool,
    pub protected: bool,
    pub static_: bool,
    pub override_: bool,
    pub proto: bool,
    pub native: bool,
    pub external: bool,
    pub owned: bool,
    pub autoptr: bool,
    pub ref_: bool,
    pub const_: bool,
    pub out: bool,
    pub inout: bool,
    pub notnull: bool,
}

impl Modifiers {
    pub fn is_empty(&self) -> bool {
        *self == Modifiers::default()
    }

    /// Iterate the set modifiers in canonical order.
    pub fn words(&self) -> impl Iterator<Item = &'static str> + '_ {
        [
            (self.modded, "modded"),
            (self.sealed, "sealed"),
            (self.private, "private"),
            (self.protected, "protected"),
            (self.static_, "static"),
            (self.override_, "override"),
            (self.proto, "proto"),
            (self.native, "native"),
            (self.external, "external"),
            (self.owned, "owned"),
            (self.autoptr, "autoptr"),
            (self.ref_, "ref"),
            (self.const_, "const"),
            (self.out, "out"),
            (self.inout, "inout"),
            (self.notnull, "notnull"),
        ]
        .into_iter()
        .filter_map(|(set, word)| set.then_some(word))
    }

    /// Record `word` if it names a modifier. Returns `None` when it does
    /// not, otherwise whether the flag was already set.
    pub(crate) fn try_set(&mut self, word: &str) -> Option<bool> {
        let flag = match word {
            "modded" => &mut self.modded,
            "sealed" => &mut self.sealed,
            "private" => &mut self.private,
            "protected" => &mut self.protected,
            "static" => &mut self.static_,
            "override" => &mut self.override_,
            "proto" => &mut self.proto,
            "native" => &mut self.native,
            "external" => &mut self.external,
            "owned" => &mut self.owned,
            "autoptr" => &mut self.autoptr,
            "ref" => &mut self.ref_,
            "const" => &mut self.const_,
            "out" => &mut self.out,
            "inout" => &mut self.inout,
            "notnull" => &mut self.notnull,
            _ => return None,
        };
        let already = *flag;
        *flag = true;
        Some(already)
    }
}

/// Modifier words that may also prefix a type inside a generic argument
/// list, as in `array<ref Widget>`.
pub(crate) fn is_type_modifier(word: &str) -> bool {
    matches!(
        word,
        "ref" | "const" | "autoptr" | "owned" | "out" | "inout" | "notnull"
    )
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn modifier_words_follow_canonical_order() {
        let mut modifiers = Modifiers::default();
        assert_eq!(modifiers.try_set("static"), Some(false));
        assert_eq!(modifiers.try_set("private"), Some(false));
        assert_eq!(modifiers.try_set("static"), Some(true));
        assert_eq!(modifiers.try_set("widget"), None);
        assert_eq!(
            modifiers.words().collect::<Vec<_>>(),
            vec!["private", "static"],
        );
    }

    #[test]
    fn empty_modifiers() {
        let modifiers = Modifiers::default();
        assert!(modifiers.is_empty());
        assert_eq!(modifiers.words().count(), 0);
    }
}
