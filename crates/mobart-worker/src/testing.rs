//! In-memory collaborators for exercising the pipeline

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use mobart_core::{GenerationOutcome, RawRequest};
use mobart_imagegen::{ImageGenError, ImageGenProvider};
use mobart_notifier::{NotifyError, OutcomeNotifier};
use mobart_storage::{ArtifactStore, StorageError};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

pub fn raw(request_id: &str, user_id: &str, prompt: &str) -> RawRequest {
    RawRequest {
        request_id: Some(request_id.to_owned()),
        user_id: Some(user_id.to_owned()),
        prompt: Some(prompt.to_owned()),
    }
}

pub enum ProviderBehavior {
    Image(Bytes),
    Nothing,
    Error(&'static str),
    Panic(&'static str),
    Hang,
}

pub struct FakeProvider {
    behavior: ProviderBehavior,
    prompts: Mutex<Vec<String>>,
}

impl FakeProvider {
    pub fn new(behavior: ProviderBehavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageGenProvider for FakeProvider {
    async fn generate(&self, prompt: &str, _request_id: &str) -> mobart_imagegen::Result<Option<Bytes>> {
        self.prompts.lock().unwrap().push(prompt.to_owned());

        match &self.behavior {
            ProviderBehavior::Image(bytes) => Ok(Some(bytes.clone())),
            ProviderBehavior::Nothing => Ok(None),
            ProviderBehavior::Error(message) => Err(ImageGenError::Config((*message).to_owned())),
            ProviderBehavior::Panic(message) => panic!("{message}"),
            ProviderBehavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(None)
            }
        }
    }

    async fn test_connection(&self) -> bool {
        !matches!(self.behavior, ProviderBehavior::Nothing)
    }

    fn name(&self) -> &str {
        "fake"
    }
}

pub enum StoreBehavior {
    Accept,
    Refuse,
    Error,
    Hang,
}

pub struct FakeStore {
    behavior: StoreBehavior,
    keys: Mutex<Vec<String>>,
}

impl FakeStore {
    pub fn new(behavior: StoreBehavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            keys: Mutex::new(Vec::new()),
        })
    }

    pub fn keys(&self) -> Vec<String> {
        self.keys.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArtifactStore for FakeStore {
    async fn store(&self, _image: Bytes, key: &str) -> mobart_storage::Result<Option<String>> {
        match self.behavior {
            StoreBehavior::Accept => {
                self.keys.lock().unwrap().push(key.to_owned());
                Ok(Some(key.to_owned()))
            }
            StoreBehavior::Refuse => Ok(None),
            StoreBehavior::Error => Err(StorageError::Task("processing task cancelled".to_owned())),
            StoreBehavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(None)
            }
        }
    }

    async fn test_connection(&self) -> bool {
        !matches!(self.behavior, StoreBehavior::Refuse)
    }
}

pub struct FakeNotifier {
    fail: bool,
    outcomes: Mutex<Vec<GenerationOutcome>>,
}

impl FakeNotifier {
    pub fn new(fail: bool) -> Arc<Self> {
        Arc::new(Self {
            fail,
            outcomes: Mutex::new(Vec::new()),
        })
    }

    pub fn outcomes(&self) -> Vec<GenerationOutcome> {
        self.outcomes.lock().unwrap().clone()
    }
}

#[async_trait]
impl OutcomeNotifier for FakeNotifier {
    async fn notify(&self, outcome: &GenerationOutcome) -> Result<(), NotifyError> {
        self.outcomes.lock().unwrap().push(outcome.clone());

        if self.fail {
            Err(NotifyError::Rejected {
                status: 500,
                message: "backend down".to_owned(),
            })
        } else {
            Ok(())
        }
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// Tracing layer that keeps the level and message of every event
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<(Level, String)>>>);

impl CapturedLogs {
    /// Messages recorded at exactly `level`
    pub fn at(&self, level: Level) -> Vec<String> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, message)| message.clone())
            .collect()
    }
}

impl<S: Subscriber> Layer<S> for CapturedLogs {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut message = MessageField::default();
        event.record(&mut message);
        self.0.lock().unwrap().push((*event.metadata().level(), message.0));
    }
}

#[derive(Default)]
struct MessageField(String);

impl Visit for MessageField {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}
