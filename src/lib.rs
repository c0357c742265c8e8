//! A configurable factory for awaitables and deferreds.
//!
//! Instead of hard-coding one promise implementation, an [`AsyncFactory`] is
//! handed two builder functions at runtime: one that turns a resolver
//! callback into an awaitable, and one that produces a deferred. Everything
//! else in the crate ([`AsyncFactory::succeed`], [`AsyncFactory::fail`],
//! [`AsyncFactory::all`], [`AsyncFactory::repeat_while`]) is built on top of
//! those two seams.
//!
//! Two interchangeable backends ship with the crate: [`shared::SharedBuilder`]
//! and [`channel::ChannelBuilder`].
//!
//! # Examples
//!
//! ```
//! use async_factory::{AsyncFactory, shared::SharedBuilder};
//! use futures::executor::block_on;
//!
//! let factory: AsyncFactory<u32, String> =
//!     AsyncFactory::new(Some(Box::new(SharedBuilder)), Some(Box::new(SharedBuilder)));
//!
//! let values = block_on(async {
//!     let inputs = vec![factory.succeed(1)?, factory.succeed(2)?];
//!     Ok::<_, async_factory::Error>(factory.all(inputs)?.await)
//! });
//! assert_eq!(values.unwrap(), Ok(vec![1, 2]));
//! ```

use futures::future::BoxFuture;
use thiserror::Error;

pub mod channel;
pub mod factory;
pub mod shared;

pub use factory::AsyncFactory;

/// A type-erased handle on a value or error to be known in the future.
pub type Awaitable<T, E> = BoxFuture<'static, Result<T, E>>;

/// The callback a caller hands to [`AsyncFactory::make_awaitable`]. It
/// receives the settlement controls of the awaitable being built, the same
/// way a `Promise` constructor callback receives `resolve` and `reject`.
pub type Resolver<T, E> = Box<dyn FnOnce(Settler<T, E>) + Send>;

/// Raised synchronously when a factory operation runs without the builder it
/// needs. Never delivered through an awaitable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    #[error("promise builder was not configured")]
    MissingPromiseBuilder,
    #[error("deferred builder was not configured")]
    MissingDeferredBuilder,
}

/// Builds an awaitable around a caller-supplied resolver callback.
///
/// Implemented by the bundled backends and, through a blanket impl, by any
/// `Fn(Resolver<T, E>) -> Awaitable<T, E>` closure, so a host can inject a
/// bare function.
pub trait PromiseBuilder<T, E>: Send + Sync {
    fn make_awaitable(&self, resolver: Resolver<T, E>) -> Awaitable<T, E>;
}

impl<T, E, F> PromiseBuilder<T, E> for F
where
    F: Fn(Resolver<T, E>) -> Awaitable<T, E> + Send + Sync,
{
    fn make_awaitable(&self, resolver: Resolver<T, E>) -> Awaitable<T, E> {
        self(resolver)
    }
}

/// Builds a [`Deferred`]: an awaitable whose settlement controls are kept by
/// the caller instead of a resolver callback.
pub trait DeferredBuilder<T, E>: Send + Sync {
    fn make_deferred(&self) -> Deferred<T, E>;
}

impl<T, E, F> DeferredBuilder<T, E> for F
where
    F: Fn() -> Deferred<T, E> + Send + Sync,
{
    fn make_deferred(&self) -> Deferred<T, E> {
        self()
    }
}

/// The resolve/reject half of an awaitable. Consuming: at most one of
/// [`Settler::resolve`] and [`Settler::reject`] runs. Dropping a settler
/// without settling leaves its awaitable pending forever.
pub struct Settler<T, E> {
    resolve: Box<dyn FnOnce(T) + Send>,
    reject: Box<dyn FnOnce(E) + Send>,
}

impl<T, E> Settler<T, E> {
    /// Wraps a pair of settlement callbacks. Backends use this to adapt
    /// whatever machinery actually stores the outcome.
    pub fn from_fns(
        resolve: impl FnOnce(T) + Send + 'static,
        reject: impl FnOnce(E) + Send + 'static,
    ) -> Self {
        Self {
            resolve: Box::new(resolve),
            reject: Box::new(reject),
        }
    }

    /// Settles the awaitable with `value`.
    pub fn resolve(self, value: T) {
        (self.resolve)(value)
    }

    /// Settles the awaitable with the rejection reason `reason`.
    pub fn reject(self, reason: E) {
        (self.reject)(reason)
    }
}

impl<T, E> std::fmt::Debug for Settler<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settler").finish_non_exhaustive()
    }
}

/// An awaitable paired with its own settlement controls.
pub struct Deferred<T, E> {
    pub settler: Settler<T, E>,
    pub awaitable: Awaitable<T, E>,
}
