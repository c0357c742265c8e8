//! A backend whose awaitables receive their outcome over a multi-producer,
//! single-consumer channel, with the consumer's waker kept in a side cell.

use std::{
    future::Future,
    sync::{
        mpsc::{channel, Receiver, TryRecvError},
        Arc, Mutex,
    },
    task::{Poll, Waker},
};

use futures::FutureExt;

use crate::{Awaitable, Deferred, DeferredBuilder, PromiseBuilder, Resolver, Settler};

/// Builds awaitables backed by an mpsc channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelBuilder;

struct Consumer<T, E> {
    receiver: Receiver<Result<T, E>>,
    waker: Arc<Mutex<Option<Waker>>>,
}

impl<T, E> Future for Consumer<T, E> {
    type Output = Result<T, E>;

    fn poll(
        self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> Poll<Self::Output> {
        match self.receiver.try_recv() {
            Ok(outcome) => Poll::Ready(outcome),
            // Disconnected means the settler was dropped unsettled; the
            // awaitable stays pending, same as the shared backend.
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => {
                *self.waker.lock().unwrap() = Some(cx.waker().clone());
                // The settler may have sent between the first look and the
                // waker registration; look once more before parking.
                match self.receiver.try_recv() {
                    Ok(outcome) => Poll::Ready(outcome),
                    Err(_) => Poll::Pending,
                }
            }
        }
    }
}

fn pair<T, E>() -> (Settler<T, E>, Consumer<T, E>)
where
    T: Send + 'static,
    E: Send + 'static,
{
    let (sender, receiver) = channel();
    let waker = Arc::new(Mutex::new(None::<Waker>));

    let reject_sender = sender.clone();
    let resolve_waker = waker.clone();
    let reject_waker = waker.clone();
    let settler = Settler::from_fns(
        move |value| {
            // A send can only fail when the consumer is gone, and then there
            // is nobody left to observe the outcome.
            let _ = sender.send(Ok(value));
            wake(&resolve_waker);
        },
        move |reason| {
            let _ = reject_sender.send(Err(reason));
            wake(&reject_waker);
        },
    );
    (settler, Consumer { receiver, waker })
}

fn wake(waker: &Mutex<Option<Waker>>) {
    if let Some(waker) = waker.lock().unwrap().take() {
        waker.wake()
    }
}

impl<T, E> PromiseBuilder<T, E> for ChannelBuilder
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

impl<T, E> DeferredBuilder<T, E> for ChannelBuilder
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

#[cfg(test)]
mod tests {
    use std::{thread, time::Duration};

    use futures::executor::block_on;

    use super::ChannelBuilder;
    use crate::{DeferredBuilder, PromiseBuilder};

    #[test]
    fn resolves_across_threads() {
        let awaitable = ChannelBuilder.make_awaitable(Box::new(|settler| {
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(10));
                settler.resolve(42);
            });
        }));
        assert_eq!(block_on(awaitable), Ok::<_, ()>(42));
    }

    #[test]
    fn rejects_across_threads() {
        let awaitable = ChannelBuilder.make_awaitable(Box::new(|settler| {
            thread::spawn(move || settler.reject(String::from("💥")));
        }));
        assert_eq!(block_on(awaitable), Err::<(), _>(String::from("💥")));
    }

    #[test]
    fn settling_without_a_consumer_does_not_panic() {
        let deferred =
            <ChannelBuilder as DeferredBuilder<u32, ()>>::make_deferred(&ChannelBuilder);
        drop(deferred.awaitable);
        deferred.settler.resolve(1);
    }
}
