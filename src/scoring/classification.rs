use anyhow::{anyhow, Result};
use rust_bert::pipelines::sentiment::{SentimentModel, SentimentPolarity};
use rust_bert::pipelines::zero_shot_classification::ZeroShotClassificationModel;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use super::emotion::{Emotion, EmotionDistribution};
use super::oracle::{EmotionOracle, SentimentOracle};
use crate::settings::settings;
use crate::utils::{log_ml_error, log_ml_model_loaded, log_ml_ready, log_ml_step};

const MAX_SEQUENCE_LENGTH: usize = 128;

pub enum MLRequest {
    Emotions {
        text: String,
        deadline: Instant,
        response_tx: mpsc::Sender<Result<EmotionDistribution>>,
    },
    Polarity {
        text: String,
        deadline: Instant,
        response_tx: mpsc::Sender<Result<f64>>,
    },
}

impl MLRequest {
    /// The caller has stopped waiting once its deadline passes.
    pub fn is_expired(&self, now: Instant) -> bool {
        let deadline = match self {
            MLRequest::Emotions { deadline, .. } => deadline,
            MLRequest::Polarity { deadline, .. } => deadline,
        };
        now >= *deadline
    }
}

/// Handle to the model worker thread. Cheap to clone; every clone talks to the
/// same worker. Requests made before the models finish loading fail fast.
#[derive(Clone)]
pub struct MLHandle {
    request_tx: mpsc::Sender<MLRequest>,
    ready: Arc<AtomicBool>,
    failed: Arc<AtomicBool>,
    timeout: Duration,
}

impl MLHandle {
    pub fn spawn() -> Result<Self> {
        let (request_tx, request_rx) = mpsc::channel::<MLRequest>();
        let ready = Arc::new(AtomicBool::new(false));
        let failed = Arc::new(AtomicBool::new(false));
        let hypothesis_template = settings().ml.hypothesis_template.clone();
        let timeout = Duration::from_millis(settings().analysis.oracle_timeout_ms);

        let worker_ready = ready.clone();
        let worker_failed = failed.clone();
        thread::Builder::new()
            .name("ml-worker".to_string())
            .spawn(move || {
                if let Err(e) = run_ml_worker(request_rx, worker_ready, hypothesis_template) {
                    worker_failed.store(true, Ordering::Release);
                    log_ml_error(&format!("Worker failed: {e}"));
                }
            })?;

        Ok(Self {
            request_tx,
            ready,
            failed,
            timeout,
        })
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// True once the worker has exited with an error; it will never become ready.
    pub fn has_failed(&self) -> bool {
        self.failed.load(Ordering::Acquire)
    }

    fn request<T>(
        &self,
        build: impl FnOnce(Instant, mpsc::Sender<Result<T>>) -> MLRequest,
    ) -> Result<T> {
        if !self.is_ready() {
            return Err(anyhow!("models are still loading"));
        }

        let (response_tx, response_rx) = mpsc::channel();
        let deadline = Instant::now() + self.timeout;
        self.request_tx
            .send(build(deadline, response_tx))
            .map_err(|_| anyhow!("worker channel closed"))?;

        response_rx
            .recv_timeout(self.timeout)
            .map_err(|e| anyhow!("no response from worker: {e}"))?
    }
}

impl EmotionOracle for MLHandle {
    fn classify(&self, text: &str) -> Result<EmotionDistribution> {
        let text = text.to_string();
        self.request(|deadline, response_tx| MLRequest::Emotions {
            text,
            deadline,
            response_tx,
        })
    }
}

impl SentimentOracle for MLHandle {
    fn polarity(&self, text: &str) -> Result<f64> {
        let text = text.to_string();
        self.request(|deadline, response_tx| MLRequest::Polarity {
            text,
            deadline,
            response_tx,
        })
    }
}

fn run_ml_worker(
    request_rx: mpsc::Receiver<MLRequest>,
    ready: Arc<AtomicBool>,
    hypothesis_template: String,
) -> Result<()> {
    log_ml_step("Loading zero-shot classification model...");
    let start = Instant::now();
    let classifier = ZeroShotClassificationModel::new(Default::default())?;
    log_ml_model_loaded("Zero-shot model", start.elapsed().as_secs_f32());

    log_ml_step("Loading sentiment model...");
    let start = Instant::now();
    let sentiment = SentimentModel::new(Default::default())?;
    log_ml_model_loaded("Sentiment model", start.elapsed().as_secs_f32());

    ready.store(true, Ordering::Release);
    log_ml_ready();

    for request in request_rx {
        if request.is_expired(Instant::now()) {
            continue;
        }
        match request {
            MLRequest::Emotions {
                text, response_tx, ..
            } => {
                let _ = response_tx.send(classify_emotions(
                    &classifier,
                    &text,
                    &hypothesis_template,
                ));
            }
            MLRequest::Polarity {
                text, response_tx, ..
            } => {
                let _ = response_tx.send(Ok(sentiment_polarity(&sentiment, &text)));
            }
        }
    }

    Ok(())
}

fn classify_emotions(
    classifier: &ZeroShotClassificationModel,
    text: &str,
    hypothesis_template: &str,
) -> Result<EmotionDistribution> {
    let labels = Emotion::all_labels();
    let template = hypothesis_template.to_string();

    let predictions = classifier.predict_multilabel(
        [text],
        &labels,
        Some(Box::new(move |label| template.replace("{}", label))),
        MAX_SEQUENCE_LENGTH,
    )?;

    let scores = predictions
        .first()
        .ok_or_else(|| anyhow!("classifier returned no predictions"))?;

    let mut distribution = EmotionDistribution::default();
    for label in scores {
        if let Ok(emotion) = Emotion::from_str(&label.text) {
            distribution.set(emotion, label.score * 100.0);
        }
    }
    Ok(distribution)
}

fn sentiment_polarity(model: &SentimentModel, text: &str) -> f64 {
    model
        .predict([text])
        .first()
        .map(|s| match s.polarity {
            SentimentPolarity::Positive => s.score,
            SentimentPolarity::Negative => -s.score,
        })
        .unwrap_or(0.0)
}
