//! Producer Pipeline
//!
//! One cycle: SYNTHESIZE a record per tracked ATM, CLASSIFY the batch
//! (classifier + status classifier), PUBLISH it, then SLEEP until the next
//! tick. A failed cycle is logged and skipped; nothing is published for it
//! and the loop carries on.

use std::future::Future;
use std::sync::Arc;

use chrono::Local;
use tokio::sync::Mutex;

use crate::logic::features::{FeatureSynthesizer, TaggedFeatures};
use crate::logic::model::{InferenceEngine, ModelError};
use crate::logic::remote::{ClientError, StatusClient, SubmitOutcome};
use crate::logic::scheduler::{Recurring, RecurringHandle};
use crate::logic::status::{
    round_probability, ClassificationResult, ResultBatch, ResultStore, StatusClassifier,
};

// ============================================================================
// ERRORS
// ============================================================================

/// Producer cycle stages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStage {
    Classify,
    Publish,
}

impl std::fmt::Display for CycleStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CycleStage::Classify => "CLASSIFY",
            CycleStage::Publish => "PUBLISH",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("classification failed: {0}")]
    Classify(#[from] ModelError),

    #[error("publish failed: {0}")]
    Publish(#[from] ClientError),

    #[error("service reported no data for {0} submitted records: {1}")]
    NoData(usize, String),
}

impl CycleError {
    pub fn stage(&self) -> CycleStage {
        match self {
            CycleError::Classify(_) => CycleStage::Classify,
            CycleError::Publish(_) | CycleError::NoData(..) => CycleStage::Publish,
        }
    }
}

// ============================================================================
// SCORING
// ============================================================================

/// Classifier adapter + status classifier
#[derive(Debug, Clone)]
pub struct ScoringPipeline {
    engine: InferenceEngine,
    status: Arc<StatusClassifier>,
}

impl ScoringPipeline {
    pub fn new(engine: InferenceEngine, status: StatusClassifier) -> Self {
        Self { engine, status: Arc::new(status) }
    }

    pub fn engine(&self) -> &InferenceEngine {
        &self.engine
    }

    pub fn status_classifier(&self) -> &StatusClassifier {
        &self.status
    }

    /// One result per record, in input order
    pub fn classify(&self, records: &[TaggedFeatures]) -> Result<Vec<ClassificationResult>, ModelError> {
        let features: Vec<_> = records.iter().map(|r| r.features).collect();
        let probabilities = self.engine.score(&features)?;

        Ok(records.iter()
            .zip(probabilities)
            .map(|(record, probability)| {
                let decision = self.status.classify(&record.atm_id, probability);
                ClassificationResult {
                    atm_id: record.atm_id.clone(),
                    failure_probability: round_probability(probability),
                    health_tier: decision.tier,
                    recommended_action: decision.action,
                }
            })
            .collect())
    }
}

/// Operational status block, one line per ATM
pub fn log_operational_status(results: &[ClassificationResult]) {
    log::info!("=================================================");
    log::info!("ATM OPERATIONAL STATUS @ {}", Local::now().format("%H:%M:%S"));
    log::info!("=================================================");
    for r in results {
        log::info!(
            "{:8} | {} {:9} | Prob: {:.3} | {}",
            r.atm_id,
            r.health_tier.marker(),
            r.health_tier.as_str(),
            r.failure_probability,
            r.recommended_action
        );
    }
}

// ============================================================================
// SINKS
// ============================================================================

/// Where a synthesized batch goes to be classified and published
pub trait BatchSink: Send + Sync {
    fn submit(
        &self,
        records: Vec<TaggedFeatures>,
    ) -> impl Future<Output = Result<Vec<ClassificationResult>, CycleError>> + Send;
}

/// Classify in-process and publish to a shared store
#[derive(Debug, Clone)]
pub struct LocalSink {
    scoring: ScoringPipeline,
    store: ResultStore,
}

impl LocalSink {
    pub fn new(scoring: ScoringPipeline, store: ResultStore) -> Self {
        Self { scoring, store }
    }
}

impl BatchSink for LocalSink {
    async fn submit(&self, records: Vec<TaggedFeatures>) -> Result<Vec<ClassificationResult>, CycleError> {
        let results = self.scoring.classify(&records)?;
        self.store.publish(ResultBatch::new(results.clone()));
        Ok(results)
    }
}

/// Submit to the status service, which classifies and publishes
pub struct RemoteSink {
    client: StatusClient,
}

impl RemoteSink {
    pub fn new(client: StatusClient) -> Self {
        Self { client }
    }
}

impl BatchSink for RemoteSink {
    async fn submit(&self, records: Vec<TaggedFeatures>) -> Result<Vec<ClassificationResult>, CycleError> {
        match self.client.submit(&records).await? {
            SubmitOutcome::Classified(results) => Ok(results),
            SubmitOutcome::NoData(message) => Err(CycleError::NoData(records.len(), message)),
        }
    }
}

// ============================================================================
// PRODUCER
// ============================================================================

pub struct Producer<S> {
    atm_ids: Vec<String>,
    synthesizer: FeatureSynthesizer,
    sink: S,
    cycles: u64,
    failures: u64,
}

impl<S: BatchSink> Producer<S> {
    pub fn new(atm_ids: Vec<String>, synthesizer: FeatureSynthesizer, sink: S) -> Self {
        Self { atm_ids, synthesizer, sink, cycles: 0, failures: 0 }
    }

    /// SYNTHESIZE: one record per tracked ATM
    pub fn synthesize(&mut self) -> Vec<TaggedFeatures> {
        let now = Local::now().naive_local();
        self.atm_ids.iter()
            .map(|id| TaggedFeatures::new(id.clone(), self.synthesizer.synthesize(id, now)))
            .collect()
    }

    /// SYNTHESIZE → CLASSIFY → PUBLISH
    pub async fn run_cycle(&mut self) -> Result<Vec<ClassificationResult>, CycleError> {
        let records = self.synthesize();
        log::debug!("Synthesized {} records ({:?} mode)", records.len(), self.synthesizer.mode());
        self.sink.submit(records).await
    }

    /// Run one cycle, containing any failure to this cycle
    pub async fn tick(&mut self) {
        self.cycles += 1;
        match self.run_cycle().await {
            Ok(results) => log_operational_status(&results),
            Err(e) => {
                self.failures += 1;
                log::warn!("Cycle {} failed at {}: {} (batch not published)", self.cycles, e.stage(), e);
            }
        }
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }
}

impl<S: BatchSink + 'static> Producer<S> {
    /// Run the cycle on `schedule` (the SLEEP stage is the interval)
    pub fn spawn(self, schedule: Recurring) -> (Arc<Mutex<Self>>, RecurringHandle) {
        let producer = Arc::new(Mutex::new(self));
        let shared = producer.clone();
        let handle = schedule.spawn(move || {
            let producer = shared.clone();
            async move {
                producer.lock().await.tick().await;
            }
        });
        (producer, handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::constants::default_model_path;
    use crate::logic::config::FleetConfig;
    use crate::logic::features::{FeatureRecord, SynthesisMode};
    use crate::logic::model::{Classifier, ModelMetadata};
    use crate::logic::status::HealthTier;

    fn reference_scoring() -> ScoringPipeline {
        let fleet = FleetConfig::reference();
        let engine = InferenceEngine::load(default_model_path()).unwrap();
        ScoringPipeline::new(engine, fleet.status_classifier())
    }

    fn reference_producer(sink: LocalSink) -> Producer<LocalSink> {
        let fleet = FleetConfig::reference();
        let synth = FeatureSynthesizer::with_rng(SynthesisMode::Profile, fleet.profiles(), StdRng::seed_from_u64(1));
        Producer::new(fleet.tracked_ids(), synth, sink)
    }

    struct Failing(ModelMetadata);

    impl Classifier for Failing {
        fn predict_proba(&self, _batch: &[FeatureRecord]) -> Result<Vec<f64>, ModelError> {
            Err(ModelError::Inference("artifact went away".to_string()))
        }

        fn metadata(&self) -> &ModelMetadata {
            &self.0
        }
    }

    #[test]
    fn test_classify_preserves_order_and_rounds() {
        let scoring = reference_scoring();
        let now = Local::now().naive_local();
        let records: Vec<TaggedFeatures> = ["ATM-004", "ATM-001"]
            .iter()
            .map(|id| TaggedFeatures::new(*id, crate::logic::features::synth::profile_features(2, now)))
            .collect();

        let results = scoring.classify(&records).unwrap();
        assert_eq!(results[0].atm_id, "ATM-004");
        assert_eq!(results[1].atm_id, "ATM-001");
        let p = results[0].failure_probability;
        assert_eq!(p, round_probability(p));
        assert_eq!(results[0].health_tier, HealthTier::Warning);
        // overridden regardless of score
        assert_eq!(results[1].health_tier, HealthTier::Healthy);
    }

    #[test]
    fn test_cycle_error_stages() {
        let classify = CycleError::from(ModelError::Inference("boom".to_string()));
        assert_eq!(classify.stage(), CycleStage::Classify);
        assert_eq!(classify.stage().to_string(), "CLASSIFY");

        let unreachable = CycleError::from(ClientError::TransportUnavailable("refused".to_string()));
        assert_eq!(unreachable.stage(), CycleStage::Publish);

        let no_data = CycleError::NoData(4, "No ATM data received".to_string());
        assert_eq!(no_data.stage(), CycleStage::Publish);
        assert_eq!(no_data.stage().to_string(), "PUBLISH");
    }

    #[tokio::test]
    async fn test_end_to_end_reference_fleet() {
        let scoring = reference_scoring();
        let thresholds = *scoring.status_classifier().thresholds();
        let store = ResultStore::new();
        let mut producer = reference_producer(LocalSink::new(scoring, store.clone()));

        for _ in 0..10 {
            let results = producer.run_cycle().await.unwrap();
            let batch = store.read();
            assert_eq!(batch.results, results);

            let tiers: HashMap<&str, HealthTier> =
                batch.results.iter().map(|r| (r.atm_id.as_str(), r.health_tier)).collect();
            assert_eq!(tiers["ATM-001"], HealthTier::Healthy);
            assert_eq!(tiers["ATM-002"], HealthTier::Warning);
            assert_eq!(tiers["ATM-003"], HealthTier::Critical);

            let atm_004 = batch.get("ATM-004").unwrap();
            assert_eq!(atm_004.health_tier, thresholds.tier_for(atm_004.failure_probability));
        }
    }

    #[tokio::test]
    async fn test_failed_cycle_publishes_nothing() {
        let fleet = FleetConfig::reference();
        let meta = InferenceEngine::load(default_model_path()).unwrap().metadata().clone();
        let engine = InferenceEngine::new(Arc::new(Failing(meta)));
        let store = ResultStore::new();
        let mut producer = reference_producer(LocalSink::new(
            ScoringPipeline::new(engine, fleet.status_classifier()),
            store.clone(),
        ));

        let err = producer.run_cycle().await.unwrap_err();
        assert_eq!(err.stage(), CycleStage::Classify);

        producer.tick().await;
        producer.tick().await;
        assert_eq!(producer.cycles(), 2);
        assert_eq!(producer.failures(), 2);
        assert!(store.read().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_producer_publishes_each_interval() {
        let store = ResultStore::new();
        let producer = reference_producer(LocalSink::new(reference_scoring(), store.clone()));
        let (producer, handle) = producer.spawn(Recurring::new("producer", Duration::from_secs(5)));

        tokio::time::sleep(Duration::from_millis(10)).await;
        let first = store.read().batch_id;
        assert!(first.is_some());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_ne!(store.read().batch_id, first);

        assert_eq!(handle.stop().await, 2);
        assert_eq!(producer.lock().await.cycles(), 2);
    }

    #[tokio::test]
    async fn test_remote_sink_unreachable_is_publish_failure() {
        let port = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let client = StatusClient::new(crate::logic::remote::ClientConfig {
            server_url: format!("http://127.0.0.1:{port}"),
            timeout: Duration::from_secs(2),
        })
        .unwrap();
        let fleet = FleetConfig::reference();
        let mut producer = Producer::new(fleet.tracked_ids(), fleet.synthesizer(), RemoteSink::new(client));

        let err = producer.run_cycle().await.unwrap_err();
        assert_eq!(err.stage(), CycleStage::Publish);
        assert!(matches!(err, CycleError::Publish(ClientError::TransportUnavailable(_))));
    }
}
