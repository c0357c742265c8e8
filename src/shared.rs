//! A backend whose awaitables are shared-state futures: one `Arc<Mutex<..>>`
//! cell holding the settled outcome and the consumer's waker.

use std::{
    future::Future,
    sync::{Arc, Mutex},
    task::{Poll, Waker},
};

use futures::FutureExt;

use crate::{Awaitable, Deferred, DeferredBuilder, PromiseBuilder, Resolver, Settler};

/// Builds awaitables backed by a one-shot shared-state cell.
///
/// # Examples
///
/// ```
/// use async_factory::{shared::SharedBuilder, PromiseBuilder};
/// use futures::executor::block_on;
/// use std::thread;
///
/// let awaitable = SharedBuilder.make_awaitable(Box::new(|settler| {
///     thread::spawn(move || settler.resolve(42u32));
/// }));
/// assert_eq!(block_on(awaitable), Ok::<u32, ()>(42));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SharedBuilder;

struct Cell<T, E> {
    outcome: Option<Result<T, E>>,
    waker: Option<Waker>,
}

struct Consumer<T, E> {
    cell: Arc<Mutex<Cell<T, E>>>,
}

impl<T, E> Future for Consumer<T, E> {
    type Output = Result<T, E>;

    fn poll(
        self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> Poll<Self::Output> {
        let mut cell = self.cell.lock().unwrap();
        match cell.outcome.take() {
            Some(outcome) => Poll::Ready(outcome),
            None => {
                cell.waker = Some(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

fn settle<T, E>(cell: &Mutex<Cell<T, E>>, outcome: Result<T, E>) {
    let mut cell = cell.lock().unwrap();
    cell.outcome = Some(outcome);
    if let Some(waker) = cell.waker.take() {
        waker.wake()
    }
}

/// One unsettled cell: its [`Settler`] and the future observing it.
fn pair<T, E>() -> (Settler<T, E>, Consumer<T, E>)
where
    T: Send + 'static,
    E: Send + 'static,
{
    let cell = Arc::new(Mutex::new(Cell {
        outcome: None,
        waker: None,
    }));
    let resolve_cell = cell.clone();
    let reject_cell = cell.clone();
    let settler = Settler::from_fns(
        move |value| settle(&resolve_cell, Ok(value)),
        move |reason| settle(&reject_cell, Err(reason)),
    );
    (settler, Consumer { cell })
}

impl<T, E> PromiseBuilder<T, E> for SharedBuilder
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn make_awaitable(&self, resolver: Resolver<T, E>) -> Awaitable<T, E> {
        let (settler, consumer) = pair();
        resolver(settler);
        consumer.boxed()
    }
}

impl<T, E> DeferredBuilder<T, E> for SharedBuilder
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn make_deferred(&self) -> Deferred<T, E> {
        let (settler, consumer) = pair();
        Deferred {
            settler,
            awaitable: consumer.boxed(),
        }
    }
}
