#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use geochat::{CompletionClient, CompletionError, GeoPoint, GeocodeError, Geocoder, IntentRouter};

/// Geocoder that returns a canned answer and records every query it sees.
pub struct FakeGeocoder {
    answer: Option<GeoPoint>,
    fail: bool,
    pub queries: Mutex<Vec<String>>,
}

impl FakeGeocoder {
    pub fn found(latitude: f64, longitude: f64) -> Arc<Self> {
        Arc::new(Self {
            answer: Some(GeoPoint::new(latitude, longitude)),
            fail: false,
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn empty() -> Arc<Self> {
        Arc::new(Self {
            answer: None,
            fail: false,
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            answer: None,
            fail: true,
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn geocode(&self, query: &str) -> Result<Option<GeoPoint>, GeocodeError> {
        self.queries.lock().unwrap().push(query.to_string());
        if self.fail {
            return Err(GeocodeError::Status(503));
        }
        Ok(self.answer)
    }
}

/// Completion client that answers every prompt the same way and records the calls.
pub struct FakeCompletion {
    answer: Result<String, (u16, String)>,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl FakeCompletion {
    pub fn answering(text: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: Ok(text.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn rejecting(status: u16, body: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: Err((status, body.to_string())),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Prompts received, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(p, _)| p.clone()).collect()
    }

    pub fn credentials(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(_, c)| c.clone()).collect()
    }
}

#[async_trait]
impl CompletionClient for FakeCompletion {
    async fn complete(&self, prompt: &str, credential: &str) -> Result<String, CompletionError> {
        self.calls
            .lock()
            .unwrap()
            .push((prompt.to_string(), credential.to_string()));
        match &self.answer {
            Ok(text) => Ok(text.clone()),
            Err((status, body)) => Err(CompletionError::Status {
                status: *status,
                body: body.clone(),
            }),
        }
    }
}

pub fn router_with(geocoder: Arc<FakeGeocoder>, completion: Arc<FakeCompletion>) -> IntentRouter {
    IntentRouter::new(geocoder, completion)
}
