//! Line handlers that run over raw feature text before it is split into
//! columns.

use std::borrow::Cow;

/// The name of the built-in lowercasing handler.
pub const LOWERCASE: &str = "lowercase";

/// The name of the built-in uppercasing handler.
pub const UPPERCASE: &str = "uppercase";

/// A named transform over a raw line.
pub struct Handler {
    /// The name.
    name: String,

    /// The transform.
    transform: Box<dyn Fn(&str) -> String>,
}

impl Handler {
    /// Creates a new [`Handler`].
    ///
    /// # Examples
    ///
    /// ```
    /// use genegroup::handler::Handler;
    ///
    /// let handler = Handler::new("strip-chr", |raw| raw.replacen("chr", "", 1));
    /// assert_eq!(handler.name(), "strip-chr");
    /// assert_eq!(handler.apply("chr1\t.\tgene"), "1\t.\tgene");
    /// ```
    pub fn new<F>(name: impl Into<String>, transform: F) -> Self
    where
        F: Fn(&str) -> String + 'static,
    {
        Self {
            name: name.into(),
            transform: Box::new(transform),
        }
    }

    /// A handler that lowercases the whole line.
    pub fn lowercase() -> Self {
        Self::new(LOWERCASE, str::to_lowercase)
    }

    /// A handler that uppercases the whole line.
    pub fn uppercase() -> Self {
        Self::new(UPPERCASE, str::to_uppercase)
    }

    /// Attempts to select a built-in handler by name.
    pub fn builtin(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            LOWERCASE => Some(Self::lowercase()),
            UPPERCASE => Some(Self::uppercase()),
            _ => None,
        }
    }

    /// Gets the name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs the handler over `raw`.
    pub fn apply(&self, raw: &str) -> String {
        (self.transform)(raw)
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handler")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// An ordered chain of [`Handler`]s.
///
/// Applying the chain runs every handler, in order, over the *original* raw
/// text and returns the output of the last handler alone. Outputs are not
/// threaded from one handler into the next: with `[A, B]`, the result is
/// `B(raw)`. An empty chain returns the raw text unchanged.
#[derive(Debug, Default)]
pub struct HandlerChain(Vec<Handler>);

impl HandlerChain {
    /// Appends a handler.
    pub fn push(&mut self, handler: Handler) -> &mut Self {
        self.0.push(handler);
        self
    }

    /// Removes the last handler.
    pub fn pop(&mut self) -> Option<Handler> {
        self.0.pop()
    }

    /// Gets the number of handlers.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the chain has no handlers.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the handlers.
    pub fn iter(&self) -> impl Iterator<Item = &Handler> {
        self.0.iter()
    }

    /// Applies the chain to `raw`.
    ///
    /// # Examples
    ///
    /// ```
    /// use genegroup::handler::Handler;
    /// use genegroup::handler::HandlerChain;
    ///
    /// let mut chain = HandlerChain::default();
    /// assert_eq!(chain.apply("Gene-A"), "Gene-A");
    ///
    /// chain.push(Handler::lowercase()).push(Handler::uppercase());
    /// assert_eq!(chain.apply("Gene-A"), "GENE-A");
    ///
    /// chain.pop();
    /// assert_eq!(chain.apply("Gene-A"), "gene-a");
    /// ```
    pub fn apply<'a>(&self, raw: &'a str) -> Cow<'a, str> {
        self.0
            .iter()
            .fold(None, |_, handler| Some(handler.apply(raw)))
            .map(Cow::Owned)
            .unwrap_or(Cow::Borrowed(raw))
    }
}

impl FromIterator<Handler> for HandlerChain {
    fn from_iter<I: IntoIterator<Item = Handler>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl std::fmt::Display for HandlerChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;

        for (i, handler) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }

            write!(f, "Handler({}, {})", handler.name, i + 1)?;
        }

        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn the_last_handler_wins() {
        let chain = [
            Handler::new("a", |raw| format!("A({raw})")),
            Handler::new("b", |raw| format!("B({raw})")),
        ]
        .into_iter()
        .collect::<HandlerChain>();

        assert_eq!(chain.apply("x"), "B(x)");
    }

    #[test]
    fn every_handler_runs_in_order() {
        let calls = Rc::new(Cell::new(0));

        let mut chain = HandlerChain::default();
        for name in ["a", "b", "c"] {
            let calls = Rc::clone(&calls);
            chain.push(Handler::new(name, move |raw| {
                calls.set(calls.get() + 1);
                raw.to_string()
            }));
        }

        chain.apply("x");
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn an_empty_chain_borrows_the_input() {
        let chain = HandlerChain::default();
        assert!(matches!(chain.apply("x"), Cow::Borrowed("x")));
    }

    #[test]
    fn display() {
        let mut chain = HandlerChain::default();
        assert_eq!(chain.to_string(), "[]");

        chain.push(Handler::lowercase()).push(Handler::uppercase());
        assert_eq!(
            chain.to_string(),
            "[Handler(lowercase, 1), Handler(uppercase, 2)]"
        );

        assert_eq!(chain.pop().map(|h| h.name().to_string()).as_deref(), Some("uppercase"));
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn builtins_are_selected_by_name() {
        assert_eq!(Handler::builtin("LOWERCASE").map(|h| h.apply("Ab")).as_deref(), Some("ab"));
        assert!(Handler::builtin("upper").is_none());
    }
}
