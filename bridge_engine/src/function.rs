//! Guest functions and their signatures
//!
//! A [`Function`] is a shared, immutable closure with an identity token.
//! The token is what the callback registry keys on, so cloning a function
//! and registering the clone yields the same handle.

use crate::engine::Engine;
use crate::error::EngineError;
use crate::value::Value;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Result of running a guest function
pub type HandlerResult = Result<Value, EngineError>;

type Body = dyn Fn(&mut Engine, Vec<Value>) -> HandlerResult;

static NEXT_FUNCTION_ID: AtomicU64 = AtomicU64::new(1);

/// Identity token of a [`Function`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionId(u64);

impl FunctionId {
    fn next() -> Self {
        Self(NEXT_FUNCTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parameter kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Required,
    Optional,
    /// Takes every remaining argument
    Variadic,
}

/// A declared parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub kind: ParamKind,
}

/// Declared parameter list of a function
///
/// Arity checks follow from it: every required parameter must be supplied,
/// and extra arguments are only accepted by a variadic parameter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Signature {
    params: Vec<Param>,
}

impl Signature {
    /// Creates an empty signature
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Signature of required parameters only
    pub fn positional<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names
            .into_iter()
            .fold(Self::new(), |signature, name| signature.required(name))
    }

    /// Signature that accepts any number of arguments
    pub fn any() -> Self {
        Self::new().variadic("args")
    }

    pub fn required(self, name: impl Into<String>) -> Self {
        self.push(name, ParamKind::Required)
    }

    pub fn optional(self, name: impl Into<String>) -> Self {
        self.push(name, ParamKind::Optional)
    }

    pub fn variadic(self, name: impl Into<String>) -> Self {
        self.push(name, ParamKind::Variadic)
    }

    fn push(mut self, name: impl Into<String>, kind: ParamKind) -> Self {
        self.params.push(Param {
            name: name.into(),
            kind,
        });
        self
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Number of required parameters
    pub fn min_args(&self) -> usize {
        self.params
            .iter()
            .filter(|p| p.kind == ParamKind::Required)
            .count()
    }

    /// Maximum accepted arguments, `None` when variadic
    pub fn max_args(&self) -> Option<usize> {
        if self.is_variadic() {
            None
        } else {
            Some(self.params.len())
        }
    }

    pub fn is_variadic(&self) -> bool {
        self.params.iter().any(|p| p.kind == ParamKind::Variadic)
    }

    /// Checks whether `given` arguments satisfy this signature
    pub fn accepts(&self, given: usize) -> bool {
        given >= self.min_args() && self.max_args().map_or(true, |max| given <= max)
    }

    /// The signature without its first `count` parameters
    pub fn skip(&self, count: usize) -> Self {
        Self {
            params: self.params.iter().skip(count).cloned().collect(),
        }
    }

    /// Renders the parameters as `(a, [b], c...)`
    pub fn render(&self) -> String {
        format!("({})", self.render_params(", "))
    }

    /// Renders the parameters the way a console user types them
    ///
    /// Optional and variadic parameters are bracketed: `a [b] [c...]`.
    pub fn render_usage(&self) -> String {
        self.params
            .iter()
            .map(|param| match param.kind {
                ParamKind::Required => param.name.clone(),
                ParamKind::Optional => format!("[{}]", param.name),
                ParamKind::Variadic => format!("[{}...]", param.name),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn render_params(&self, separator: &str) -> String {
        self.params
            .iter()
            .map(|param| match param.kind {
                ParamKind::Required => param.name.clone(),
                ParamKind::Optional => format!("[{}]", param.name),
                ParamKind::Variadic => format!("{}...", param.name),
            })
            .collect::<Vec<_>>()
            .join(separator)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

struct Inner {
    id: FunctionId,
    name: String,
    signature: Signature,
    body: Box<Body>,
}

/// A guest function that can be handed to the host
///
/// Clones share the body and the identity token.
#[derive(Clone)]
pub struct Function {
    inner: Rc<Inner>,
}

impl Function {
    /// Wraps a closure as a function with a fresh identity
    pub fn new<F>(name: impl Into<String>, signature: Signature, body: F) -> Self
    where
        F: Fn(&mut Engine, Vec<Value>) -> HandlerResult + 'static,
    {
        Self {
            inner: Rc::new(Inner {
                id: FunctionId::next(),
                name: name.into(),
                signature,
                body: Box::new(body),
            }),
        }
    }

    pub fn id(&self) -> FunctionId {
        self.inner.id
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn signature(&self) -> &Signature {
        &self.inner.signature
    }

    /// Runs the body without an arity check
    pub fn invoke(&self, engine: &mut Engine, args: Vec<Value>) -> HandlerResult {
        (self.inner.body)(engine, args)
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("signature", &self.inner.signature)
            .finish()
    }
}
