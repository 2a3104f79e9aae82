//! One-shot completion handles for bridge calls.
//!
//! [`promise`] returns a settling side ([`Promise`]), handed to the module,
//! and a waiting side ([`PromiseHandle`]), kept by the caller. Settling
//! consumes the `Promise`, so each call completes at most once.

use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};

use super::bridge_error::{BridgeError, ErrorCode};
use super::response::BridgeValue;

pub type Settlement = Result<BridgeValue, BridgeError>;

const DROPPED_MESSAGE: &str = "Promise was dropped without being settled";

pub fn promise() -> (Promise, PromiseHandle) {
    let (tx, rx) = crossbeam_channel::bounded(1);
    (Promise { tx }, PromiseHandle { rx })
}

pub struct Promise {
    tx: Sender<Settlement>,
}

impl Promise {
    pub fn resolve(self, value: impl Into<BridgeValue>) {
        self.settle(Ok(value.into()));
    }

    pub fn reject(self, code: ErrorCode, message: impl Into<String>) {
        self.settle(Err(BridgeError::new(code, message)));
    }

    fn settle(self, settlement: Settlement) {
        if self.tx.send(settlement).is_err() {
            log::debug!("Promise settled after its caller went away");
        }
    }
}

pub struct PromiseHandle {
    rx: Receiver<Settlement>,
}

impl PromiseHandle {
    /// Blocks until the promise settles.
    pub fn wait(self) -> Settlement {
        self.rx.recv().unwrap_or_else(|_| Err(dropped()))
    }

    /// `None` if the promise is still pending after `timeout`.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Settlement> {
        match self.rx.recv_timeout(timeout) {
            Ok(settlement) => Some(settlement),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Err(dropped())),
        }
    }

    /// Non-blocking poll.
    pub fn try_result(&self) -> Option<Settlement> {
        match self.rx.try_recv() {
            Ok(settlement) => Some(settlement),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(dropped())),
        }
    }
}

fn dropped() -> BridgeError {
    BridgeError::new(ErrorCode::Module, DROPPED_MESSAGE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_resolve_reaches_handle() {
        let (promise, handle) = promise();
        promise.resolve(true);
        assert_eq!(handle.wait(), Ok(BridgeValue::Flag(true)));
    }

    #[test]
    fn test_reject_carries_code_and_message() {
        let (promise, handle) = promise();
        promise.reject(ErrorCode::Crop, "Failed to crop image: x");
        let err = handle.wait().unwrap_err();
        assert_eq!(err.code, ErrorCode::Crop);
        assert_eq!(err.message, "Failed to crop image: x");
    }

    #[test]
    fn test_pending_then_settled_from_other_thread() {
        let (promise, handle) = promise();
        assert_eq!(handle.try_result(), None);
        assert_eq!(handle.wait_timeout(Duration::from_millis(10)), None);

        let worker = thread::spawn(move || promise.resolve(false));
        worker.join().unwrap();
        assert_eq!(
            handle.wait_timeout(Duration::from_secs(1)),
            Some(Ok(BridgeValue::Flag(false)))
        );
    }

    #[test]
    fn test_dropped_promise_is_module_error() {
        let (promise, handle) = promise();
        drop(promise);
        let err = handle.try_result().unwrap().unwrap_err();
        assert_eq!(err.code, ErrorCode::Module);
        assert_eq!(handle.wait().unwrap_err().code, ErrorCode::Module);
    }

    #[test]
    fn test_settling_after_handle_dropped_is_harmless() {
        let (promise, handle) = promise();
        drop(handle);
        promise.resolve(true);
    }
}
