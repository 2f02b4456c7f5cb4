//! Future types.

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use futures::{channel::oneshot, FutureExt};

/// Creates a new output future.
pub fn new_output<T>() -> (Sender<T>, MaybeDone<T>) {
    let (send, recv) = oneshot::channel();
    (Sender { send }, MaybeDone { recv })
}

/// A future output value.
///
/// This trait extends [`std::future::Future`] for values which can be received
/// outside of a task context.
pub trait Output: Future<Output = Result<Self::Ok, Canceled>> {
    /// Success type.
    type Ok;

    /// Attempts to receive the output outside of a task context, returning
    /// `None` if it is not ready.
    fn try_recv(&mut self) -> Result<Option<Self::Ok>, Canceled>;
}

/// Output canceled error.
///
/// Returned when the [`Sender`] is dropped without sending a value.
#[derive(Debug, thiserror::Error)]
#[error("output canceled")]
pub struct Canceled {
    _private: (),
}

/// Sender of an output value.
#[derive(Debug)]
pub struct Sender<T> {
    send: oneshot::Sender<T>,
}

impl<T> Sender<T> {
    /// Sends an output value.
    ///
    /// Returns the value back if the receiving end was dropped.
    pub fn send(self, value: T) -> Result<(), T> {
        self.send.send(value)
    }

    /// Returns `true` if the receiving end was dropped.
    pub fn is_canceled(&self) -> bool {
        self.send.is_canceled()
    }
}

/// An output value that may be ready.
#[derive(Debug)]
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct MaybeDone<T> {
    recv: oneshot::Receiver<T>,
}

impl<T> Output for MaybeDone<T> {
    type Ok = T;

    fn try_recv(&mut self) -> Result<Option<Self::Ok>, Canceled> {
        match self.recv.try_recv() {
            Ok(Some(value)) => Ok(Some(value)),
            Ok(None) => Ok(None),
            Err(oneshot::Canceled) => Err(Canceled { _private: () }),
        }
    }
}

impl<T> Future for MaybeDone<T> {
    type Output = Result<T, Canceled>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.recv
            .poll_unpin(cx)
            .map_err(|_| Canceled { _private: () })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_ready() {
        let (send, mut recv) = new_output::<u8>();

        assert!(matches!(recv.try_recv(), Ok(None)));
        send.send(1).unwrap();
        assert!(matches!(recv.try_recv(), Ok(Some(1))));
    }

    #[test]
    fn test_output_canceled() {
        let (send, mut recv) = new_output::<u8>();

        drop(send);
        assert!(recv.try_recv().is_err());

        let (send, recv) = new_output::<u8>();
        drop(recv);
        assert!(send.is_canceled());
        assert_eq!(send.send(2), Err(2));
    }
}
