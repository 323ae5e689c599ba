use crate::domain::ports::EventPublisher;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Publisher stand-in that prints events to stdout.
///
/// The real notification broker sits outside this crate; this keeps the
/// `publish` seam observable when running the batch binary.
#[derive(Default, Clone)]
pub struct StdoutPublisher;

impl StdoutPublisher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventPublisher for StdoutPublisher {
    async fn publish(
        &self,
        topic: &str,
        payload: Vec<u8>,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        println!("publish to topic: {} data: {}", topic, String::from_utf8_lossy(&payload));
        Ok(())
    }
}

/// Test double that records every published event.
#[derive(Default, Clone)]
pub struct RecordingPublisher {
    events: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(String, Vec<u8>)> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(
        &self,
        topic: &str,
        payload: Vec<u8>,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((topic.to_string(), payload));
        Ok(())
    }
}
