//! This library reconstructs **Enforce Script** declarations from source text
//! found in *Enfusion* engine game archives.
//!
//! Script sources extracted from an archive are mostly declarations: classes
//! with member variables and methods, plus free functions and variables. The
//! lexer and parser here rebuild that structure into a [`ScriptScope`] model,
//! and the printer renders the model back to canonical source text. Statement
//! bodies, initializers and parameter defaults are kept as raw token
//! sequences rather than expression trees.
//!
//! Parsing never fails. Anything the grammar below does not cover, such as an
//! `enum` or a template class, is skipped at a declaration boundary and
//! reported as a [`ParseDiagnostic`]:
//!
//! ```text
//! scope         := (class-decl | function-decl | variable-decl)*
//! class-decl    := modifier* "class" IDENT ((":" | "extends") IDENT)? "{" member* "}"
//! member        := function-decl | variable-decl
//! function-decl := modifier* type "~"? IDENT "(" params? ")" (block | ";")
//! params        := param ("," param)*
//! param         := modifier* type IDENT ("=" expr)?
//! variable-decl := modifier* type IDENT ("=" expr)? ";"
//! type          := IDENT ("<" type-arg ("," type-arg)* ">")?
//! ```
//!
//! Keywords are contextual: `class`, `ref` and the other modifier words are
//! plain identifiers anywhere the grammar does not expect them.
//!
//! ```
//! use enf_script::{parse, print};
//!
//! let parsed = parse("modded class SurvivorBase extends PlayerBase { int m_Stamina = 100; }");
//! assert!(parsed.diagnostics.is_empty());
//! assert_eq!(
//!     print(&parsed.scope),
//!     "modded class SurvivorBase : PlayerBase\n{\n\tint m_Stamina = 100;\n}\n"
//! );
//! ```

pub mod error;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod types;

pub use error::ParseDiagnostic;
pub use lexer::{Token, TokenKind};
pub use parser::{parse, ParsedScript};
pub use printer::print;
pub use types::{
    Modifiers, ScriptClass, ScriptFunction, ScriptParam, ScriptScope, ScriptVariable, TypeRef,
};
