//! Scoped ownership of a transport

use tracing::{debug, warn};

use crate::error::TransportError;
use crate::Transport;

/// Owns a transport and closes it exactly once.
///
/// The link is closed by an explicit [`Transport::close`] or, failing that,
/// when the guard is dropped (normal return, error propagation or unwinding).
/// Reads after close fail with [`TransportError::Closed`].
pub struct TransportGuard<T: Transport> {
    inner: T,
    closed: bool,
}

impl<T: Transport> TransportGuard<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            closed: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl<T: Transport> Transport for TransportGuard<T> {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        self.inner.read_exact(buf)
    }

    fn close(&mut self) -> Result<(), TransportError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.inner.close()
    }
}

impl<T: Transport> Drop for TransportGuard<T> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        match self.inner.close() {
            Ok(()) => debug!("Transport closed on drop"),
            Err(e) => warn!("Failed to close transport: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct CountingTransport {
        closes: Rc<Cell<u32>>,
    }

    impl Transport for CountingTransport {
        fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
            buf.fill(0);
            Ok(())
        }

        fn close(&mut self) -> Result<(), TransportError> {
            self.closes.set(self.closes.get() + 1);
            Ok(())
        }
    }

    fn guarded() -> (TransportGuard<CountingTransport>, Rc<Cell<u32>>) {
        let closes = Rc::new(Cell::new(0));
        let guard = TransportGuard::new(CountingTransport {
            closes: Rc::clone(&closes),
        });
        (guard, closes)
    }

    #[test]
    fn test_drop_closes_once() {
        let (guard, closes) = guarded();
        drop(guard);
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn test_explicit_close_then_drop() {
        let (mut guard, closes) = guarded();
        guard.close().unwrap();
        guard.close().unwrap();
        assert!(guard.is_closed());
        drop(guard);
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn test_read_after_close_fails() {
        let (mut guard, _closes) = guarded();
        guard.close().unwrap();
        let mut buf = [0u8; 1];
        assert!(matches!(
            guard.read_exact(&mut buf),
            Err(TransportError::Closed)
        ));
    }

    #[test]
    fn test_closes_during_unwind() {
        let (guard, closes) = guarded();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _guard = guard;
            panic!("fault inside the read loop");
        }));
        assert!(result.is_err());
        assert_eq!(closes.get(), 1);
    }
}
