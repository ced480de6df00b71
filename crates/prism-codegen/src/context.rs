//! The per-compilation code-generation context.

use std::fmt;

use indexmap::IndexMap;
use tracing::trace;

use crate::trivial::is_trivial;

/// A WGSL expression as source text.
///
/// On the shader target a value is not data but the text of an expression
/// that computes it. Expressions are transient: created and consumed within
/// one evaluation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderExpr(String);

impl ShaderExpr {
    /// Wrap expression text.
    pub fn new(text: impl Into<String>) -> Self {
        ShaderExpr(text.into())
    }

    /// The expression text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unwrap into the owned text.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ShaderExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ShaderExpr {
    fn from(text: String) -> Self {
        ShaderExpr(text)
    }
}

impl From<&str> for ShaderExpr {
    fn from(text: &str) -> Self {
        ShaderExpr(text.to_string())
    }
}

/// Identity token for helper deduplication.
///
/// Each declaring call site owns one token (conventionally a `const` next to
/// the helper source). Dedup is keyed by token, not by helper text: the same
/// token declared from two call sites emits once, while identical text under
/// two distinct tokens emits twice. That asymmetry is deliberate — it matches
/// a declare-once-per-call-site-template policy rather than structural
/// equality of generated source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HelperId(pub &'static str);

/// One interpolation slot for [`CodegenContext::emit`].
///
/// `Lazy` fills run against the context at splice time, so a fill may itself
/// declare helpers or push statements; those side effects land in the buffer
/// before the line being assembled.
pub enum Fill<'a> {
    /// Already-rendered text.
    Text(String),
    /// Deferred text, produced with mutable access to the context.
    Lazy(Box<dyn FnOnce(&mut CodegenContext) -> String + 'a>),
}

impl Fill<'_> {
    /// A deferred fill.
    pub fn lazy<'a>(f: impl FnOnce(&mut CodegenContext) -> String + 'a) -> Fill<'a> {
        Fill::Lazy(Box::new(f))
    }
}

impl From<&ShaderExpr> for Fill<'_> {
    fn from(expr: &ShaderExpr) -> Self {
        Fill::Text(expr.as_str().to_string())
    }
}

impl From<String> for Fill<'_> {
    fn from(text: String) -> Self {
        Fill::Text(text)
    }
}

/// Mutable state for one shader compilation pass.
///
/// Owns fresh-name allocation, the helper pool, and the statement buffer.
/// Exactly one context exists per compiled expression; nothing persists
/// across compilations.
#[derive(Default)]
pub struct CodegenContext {
    next_name: u32,
    helpers: IndexMap<HelperId, String>,
    statements: String,
}

impl CodegenContext {
    /// A fresh, empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// A new identifier, unique within this context.
    pub fn fresh_name(&mut self) -> String {
        let name = format!("t{}", self.next_name);
        self.next_name += 1;
        name
    }

    /// Add `text` to the helper pool, once per distinct `id`.
    ///
    /// Re-declaring an already-seen token is a no-op, even with different
    /// text; the first declaration wins.
    pub fn declare_helper_once(&mut self, id: HelperId, text: &str) {
        if !self.helpers.contains_key(&id) {
            trace!(helper = id.0, "helper declared");
            self.helpers.insert(id, text.to_string());
        }
    }

    /// Append one raw statement line.
    pub fn push(&mut self, stmt: impl AsRef<str>) {
        self.statements.push_str(stmt.as_ref());
        self.statements.push('\n');
    }

    /// Assemble one statement from literal parts interleaved with fills,
    /// left to right, then append it.
    ///
    /// Each [`Fill::Lazy`] runs against the context before the next literal
    /// part is consumed, so helper declarations and statements produced by a
    /// fill are fully applied before the assembled line lands in the buffer.
    /// Temporaries therefore always precede their first use, which naive
    /// string concatenation would not guarantee.
    pub fn emit(&mut self, parts: &[&str], fills: Vec<Fill<'_>>) {
        debug_assert!(
            fills.len() <= parts.len(),
            "more fills than interpolation slots"
        );
        let mut line = String::new();
        let mut fills = fills.into_iter();
        for part in parts {
            line.push_str(part);
            match fills.next() {
                Some(Fill::Text(text)) => line.push_str(&text),
                Some(Fill::Lazy(f)) => {
                    let text = f(self);
                    line.push_str(&text);
                }
                None => {}
            }
        }
        self.push(line);
    }

    /// Materialize `expr` into a named temporary, unless it is already
    /// trivial to repeat.
    ///
    /// Trivial shapes (bare identifier, single array index, numeric literal)
    /// are returned unchanged. Everything else is bound to a fresh `var` of
    /// the given WGSL type — an array type when `len` is `Some` — and the
    /// temporary's name is returned. There is no value-level memoization:
    /// caching the same non-trivial text twice binds two temporaries, each
    /// evaluated once. The point is to keep expensive sub-expressions from
    /// being re-evaluated and nested dispatch from exponentially duplicating
    /// text, not to do common-subexpression elimination.
    pub fn cache(&mut self, expr: &ShaderExpr, wgsl_type: &str, len: Option<usize>) -> ShaderExpr {
        if is_trivial(expr.as_str()) {
            return expr.clone();
        }
        let name = self.fresh_name();
        let ty = match len {
            // WGSL arrays need a nonzero extent; an empty broadcast still
            // declares a one-slot array that the loop never touches.
            Some(n) => format!("array<{wgsl_type}, {}>", n.max(1)),
            None => wgsl_type.to_string(),
        };
        trace!(%name, %ty, "sub-expression cached");
        self.push(format!("var {name}: {ty} = {expr};"));
        ShaderExpr::new(name)
    }

    /// All deduplicated helper source, in first-declaration order.
    pub fn helper_source(&self) -> String {
        let mut out = String::new();
        for text in self.helpers.values() {
            out.push_str(text);
            if !text.ends_with('\n') {
                out.push('\n');
            }
        }
        out
    }

    /// The accumulated statement buffer.
    pub fn statements(&self) -> &str {
        &self.statements
    }
}
