//! The factory itself. Holds the two injected builders and derives every
//! other operation from them.

use std::future::Future;

use futures::FutureExt;

use crate::{Awaitable, Deferred, DeferredBuilder, Error, PromiseBuilder, Settler};

/// A factory for awaitables and deferreds, configured at runtime with the
/// promise implementation the host wants to use.
///
/// This is a plain value, not a global. Build it once at startup and pass it
/// by reference; reconfiguring it changes what later calls build, never an
/// awaitable that already exists.
///
/// # Examples
///
/// ```
/// use async_factory::{AsyncFactory, shared::SharedBuilder};
/// use futures::executor::block_on;
/// use std::thread;
///
/// let factory: AsyncFactory<String, String> =
///     AsyncFactory::new(Some(Box::new(SharedBuilder)), None);
///
/// let awaitable = factory
///     .make_awaitable(|settler| {
///         thread::spawn(move || settler.resolve("🍓".into()));
///     })
///     .unwrap();
/// assert_eq!(block_on(awaitable), Ok("🍓".to_string()));
/// ```
pub struct AsyncFactory<T, E> {
    promise_builder: Option<Box<dyn PromiseBuilder<T, E>>>,
    deferred_builder: Option<Box<dyn DeferredBuilder<T, E>>>,
}

impl<T, E> Default for AsyncFactory<T, E> {
    /// An unconfigured factory. Every operation fails until
    /// [`AsyncFactory::configure`] installs at least a promise builder.
    fn default() -> Self {
        Self {
            promise_builder: None,
            deferred_builder: None,
        }
    }
}

impl<T, E> AsyncFactory<T, E> {
    pub fn new(
        promise_builder: Option<Box<dyn PromiseBuilder<T, E>>>,
        deferred_builder: Option<Box<dyn DeferredBuilder<T, E>>>,
    ) -> Self {
        Self {
            promise_builder,
            deferred_builder,
        }
    }

    /// Replaces both builders unconditionally. `None` disables that
    /// capability. Awaitables created before the call keep their original
    /// backend.
    pub fn configure(
        &mut self,
        promise_builder: Option<Box<dyn PromiseBuilder<T, E>>>,
        deferred_builder: Option<Box<dyn DeferredBuilder<T, E>>>,
    ) {
        self.promise_builder = promise_builder;
        self.deferred_builder = deferred_builder;
    }

    fn promise_builder(&self) -> Result<&dyn PromiseBuilder<T, E>, Error> {
        self.promise_builder
            .as_deref()
            .ok_or(Error::MissingPromiseBuilder)
    }
}

impl<T, E> AsyncFactory<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Hands `resolver` to the configured promise builder and returns the
    /// awaitable it built. The resolver receives the new awaitable's
    /// [`Settler`] and may settle it at any point, from any thread.
    pub fn make_awaitable<R>(&self, resolver: R) -> Result<Awaitable<T, E>, Error>
    where
        R: FnOnce(Settler<T, E>) + Send + 'static,
    {
        Ok(self.promise_builder()?.make_awaitable(Box::new(resolver)))
    }

    /// An awaitable already resolved with `value`.
    pub fn succeed(&self, value: T) -> Result<Awaitable<T, E>, Error> {
        self.make_awaitable(move |settler| settler.resolve(value))
    }

    /// An awaitable already rejected with `reason`.
    pub fn fail(&self, reason: E) -> Result<Awaitable<T, E>, Error> {
        self.make_awaitable(move |settler| settler.reject(reason))
    }

    /// Asks the configured deferred builder for a [`Deferred`].
    #[deprecated(note = "pass a resolver to `make_awaitable` and keep the Settler instead")]
    pub fn make_deferred(&self) -> Result<Deferred<T, E>, Error> {
        self.deferred_builder
            .as_deref()
            .map(|builder| builder.make_deferred())
            .ok_or(Error::MissingDeferredBuilder)
    }

    /// Collects an ordered sequence of awaitables into one awaitable of
    /// their values, index-aligned with the input no matter which input
    /// settles first.
    ///
    /// The inputs are observed in order: the result chain awaits the first,
    /// records its value, then awaits the second, and so on. Since every
    /// input already exists (and may already be running) before `all` is
    /// called, this serializes only the observation of results, not the work
    /// behind them. The first rejection encountered along the chain becomes
    /// the result's rejection, unchanged, and later inputs are no longer
    /// observed. An empty sequence resolves to an empty `Vec`.
    pub fn all<I>(&self, awaitables: I) -> Result<Awaitable<Vec<T>, E>, Error>
    where
        I: IntoIterator<Item = Awaitable<T, E>>,
        I::IntoIter: Send + 'static,
    {
        self.promise_builder()?;
        let awaitables = awaitables.into_iter();
        Ok(async move {
            let mut values = Vec::new();
            for awaitable in awaitables {
                values.push(awaitable.await?);
            }
            Ok(values)
        }
        .boxed())
    }

    /// A sequential asynchronous loop: `condition` is evaluated fresh before
    /// each iteration; while it holds, `action()` is invoked and its
    /// awaitable awaited (the resolved value is discarded). When `condition`
    /// first returns false the loop resolves with `()`. If an iteration
    /// rejects, the loop rejects with the same reason and neither `condition`
    /// nor `action` runs again.
    ///
    /// The loop is a single iterative future, so stack usage stays constant
    /// however many iterations run.
    pub fn repeat_while<C, A, F, U>(
        &self,
        mut condition: C,
        mut action: A,
    ) -> Result<Awaitable<(), E>, Error>
    where
        C: FnMut() -> bool + Send + 'static,
        A: FnMut() -> F + Send + 'static,
        F: Future<Output = Result<U, E>> + Send + 'static,
    {
        self.promise_builder()?;
        Ok(async move {
            while condition() {
                action().await?;
            }
            Ok(())
        }
        .boxed())
    }
}
