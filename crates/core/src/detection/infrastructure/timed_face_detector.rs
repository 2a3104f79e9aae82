use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use crate::detection::domain::detected_face::DetectedFace;
use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::frame::Frame;

type DetectReply = Result<Vec<DetectedFace>, String>;

struct DetectRequest {
    frame: Frame,
    reply: Sender<DetectReply>,
    /// Set by the caller once it stops waiting.
    cancelled: Arc<AtomicBool>,
}

/// Runs an inner detector on a dedicated worker thread and gives up on a
/// request once `timeout` elapses.
///
/// A request that times out while running finishes on the worker and its
/// reply is dropped. One that times out while still queued is skipped.
/// The worker exits when this wrapper is dropped and the queue drains.
pub struct TimedFaceDetector {
    requests: Sender<DetectRequest>,
    timeout: Duration,
}

impl TimedFaceDetector {
    pub fn new(inner: Box<dyn FaceDetector>, timeout: Duration) -> std::io::Result<Self> {
        let (requests, queue) = crossbeam_channel::unbounded::<DetectRequest>();
        thread::Builder::new()
            .name("face-detector".into())
            .spawn(move || run_worker(inner, queue))?;
        Ok(Self { requests, timeout })
    }
}

fn run_worker(mut detector: Box<dyn FaceDetector>, queue: Receiver<DetectRequest>) {
    for request in queue {
        if request.cancelled.load(Ordering::Acquire) {
            log::debug!("Skipping cancelled face detection request");
            continue;
        }
        let result = detector.detect(&request.frame).map_err(|e| e.to_string());
        // Receiver is gone when the caller already timed out.
        let _ = request.reply.send(result);
    }
    log::debug!("Face detector worker stopped");
}

impl FaceDetector for TimedFaceDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<DetectedFace>, Box<dyn std::error::Error>> {
        let (reply, response) = crossbeam_channel::bounded(1);
        let cancelled = Arc::new(AtomicBool::new(false));
        self.requests
            .send(DetectRequest {
                frame: frame.clone(),
                reply,
                cancelled: Arc::clone(&cancelled),
            })
            .map_err(|_| "Face detector worker is not running")?;

        match response.recv_timeout(self.timeout) {
            Ok(result) => result.map_err(Into::into),
            Err(RecvTimeoutError::Timeout) => {
                cancelled.store(true, Ordering::Release);
                Err(format!(
                    "Face detection timed out after {} ms",
                    self.timeout.as_millis()
                )
                .into())
            }
            Err(RecvTimeoutError::Disconnected) => {
                Err("Face detector worker stopped without replying".into())
            }
        }
    }
}
