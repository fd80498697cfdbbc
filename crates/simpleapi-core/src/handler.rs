//! Handler abstraction and per-route handler chains

use crate::bind::{Bind, ParamDescriptor};
use crate::{Context, Result};
use std::marker::PhantomData;
use std::sync::Arc;

/// A request handler or middleware
///
/// Handlers run in the order they were registered for a route. A
/// middleware continues the chain by calling [`Context::next`].
pub trait Handler: Send + Sync + 'static {
    /// Request values this handler binds, declared once at registration
    fn params(&self) -> Vec<ParamDescriptor> {
        Vec::new()
    }

    fn call(&self, ctx: &mut Context) -> Result<()>;
}

impl<F> Handler for F
where
    F: Fn(&mut Context) -> Result<()> + Send + Sync + 'static,
{
    fn call(&self, ctx: &mut Context) -> Result<()> {
        self(ctx)
    }
}

/// Handler taking an argument bound from the request
pub struct Typed<T, F> {
    f: F,
    _args: PhantomData<fn() -> T>,
}

impl<T, F> Handler for Typed<T, F>
where
    T: Bind + 'static,
    F: Fn(&mut Context, T) -> Result<()> + Send + Sync + 'static,
{
    fn params(&self) -> Vec<ParamDescriptor> {
        T::descriptors()
    }

    fn call(&self, ctx: &mut Context) -> Result<()> {
        let args = T::bind(&ctx.binder())?;
        (self.f)(ctx, args)
    }
}

/// Wrap a plain closure as a shared handler
pub fn handler<F>(f: F) -> Arc<dyn Handler>
where
    F: Fn(&mut Context) -> Result<()> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Wrap a closure whose second argument is bound from the request
pub fn typed<T, F>(f: F) -> Arc<dyn Handler>
where
    T: Bind + 'static,
    F: Fn(&mut Context, T) -> Result<()> + Send + Sync + 'static,
{
    Arc::new(Typed {
        f,
        _args: PhantomData,
    })
}

/// Ordered handlers registered for one route
#[derive(Clone)]
pub struct Chain {
    handlers: Arc<[Arc<dyn Handler>]>,
}

impl Chain {
    pub fn new(handlers: Vec<Arc<dyn Handler>>) -> Self {
        Self {
            handlers: handlers.into(),
        }
    }

    pub fn get(&self, index: usize) -> Option<Arc<dyn Handler>> {
        self.handlers.get(index).cloned()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Descriptors of every handler, in chain order
    pub fn params(&self) -> Vec<ParamDescriptor> {
        self.handlers.iter().flat_map(|h| h.params()).collect()
    }
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
