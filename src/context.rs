//! Request-scoped context values and logger propagation.
//!
//! # Responsibilities
//! - Carry immutable values along a call chain
//! - Attach a [`Logger`] to a context and look it up again
//! - Fall back to the process-wide default logger when none is attached
//!
//! # Design Decisions
//! - Values are keyed by the `TypeId` of a key type; a private key type
//!   cannot collide with keys defined elsewhere
//! - Adding a value returns a new context; the parent is never modified
//! - Async call chains can install a current context with [`scope`]

use std::any::{Any, TypeId};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::default::default;
use crate::logger::Logger;

struct Node {
    key: TypeId,
    value: Arc<dyn Any + Send + Sync>,
    parent: Option<Arc<Node>>,
}

/// An immutable, cheaply clonable bag of request-scoped values.
#[derive(Clone, Default)]
pub struct Context {
    head: Option<Arc<Node>>,
}

impl Context {
    /// The empty root context.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a context that carries `value` under key type `K`.
    pub fn with_value<K: 'static, V: Any + Send + Sync>(&self, value: V) -> Self {
        Self {
            head: Some(Arc::new(Node {
                key: TypeId::of::<K>(),
                value: Arc::new(value),
                parent: self.head.clone(),
            })),
        }
    }

    /// Nearest value stored under key type `K`, if it has type `V`.
    pub fn value<K: 'static, V: Any + Send + Sync>(&self) -> Option<&V> {
        let key = TypeId::of::<K>();
        let mut node = self.head.as_deref();
        while let Some(n) = node {
            if n.key == key {
                return n.value.downcast_ref::<V>();
            }
            node = n.parent.as_deref();
        }
        None
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut depth = 0;
        let mut node = self.head.as_deref();
        while let Some(n) = node {
            depth += 1;
            node = n.parent.as_deref();
        }
        f.debug_struct("Context").field("values", &depth).finish()
    }
}

/// Key under which the logger is stored. Not reachable outside this module.
struct LoggerKey;

/// Return a context that carries `logger`.
pub fn context_with_logger(ctx: &Context, logger: Logger) -> Context {
    ctx.with_value::<LoggerKey, Logger>(logger)
}

/// Logger attached to `ctx`, or the process-wide default.
pub(crate) fn logger_from_context(ctx: &Context) -> Logger {
    match ctx.value::<LoggerKey, Logger>() {
        Some(logger) => logger.clone(),
        None => default(),
    }
}

/// Logger attached to `ctx`, or the process-wide default.
pub fn l(ctx: &Context) -> Logger {
    logger_from_context(ctx)
}

tokio::task_local! {
    static CURRENT: Context;
}

/// Run `fut` with `ctx` as the current task's context.
pub async fn scope<F: Future>(ctx: Context, fut: F) -> F::Output {
    CURRENT.scope(ctx, fut).await
}

/// The current task's context, or the background context outside [`scope`].
pub fn current() -> Context {
    CURRENT.try_with(Context::clone).unwrap_or_default()
}
