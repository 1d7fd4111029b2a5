//! Syntax tree abstraction used by the function extractor.
//!
//! The extractor only needs named function declarations and the string
//! literals inside them, so any tree-shaped source representation can be
//! plugged in by implementing these two traits.

use crate::error::Span;
use crate::functions::Param;

/// A parsed source file
pub trait SourceTree {
    /// Named function declarations in source order. Bodies of functions are
    /// not searched for further declarations.
    fn declarations(&self) -> Vec<Box<dyn FunctionNode + '_>>;
}

/// One function declaration
pub trait FunctionNode {
    fn name(&self) -> String;

    /// Declared parameters; type text is `"unknown"` when unannotated
    fn params(&self) -> Vec<Param>;

    /// Raw return annotation, without the leading `:`
    fn return_type(&self) -> Option<String>;

    /// Carries an explicit `export` modifier
    fn is_exported(&self) -> bool;

    /// Raw text of a `/** ... */` block immediately preceding the declaration
    fn doc_comment(&self) -> Option<String>;

    /// 1-indexed line of the declaration
    fn line(&self) -> usize;

    /// Call `visitor` for every string or template literal in the body, at any
    /// nesting depth, in source order.
    fn visit_literals(&self, visitor: &mut dyn FnMut(StringLiteral));
}

/// A string or template literal found in a syntax tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringLiteral {
    /// Text between the delimiters. Escapes in quoted strings are decoded;
    /// template literals, placeholders included, are kept as written.
    pub body: String,
    pub span: Span,
}
