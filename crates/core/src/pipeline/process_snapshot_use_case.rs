use std::thread;
use std::time::Instant;

use crate::annotation::domain::annotation_engine::AnnotationEngine;
use crate::detection::domain::detected_object::ObjectDetections;
use crate::detection::domain::detection_aggregator::DetectionAggregator;
use crate::detection::domain::face_match::FaceMatch;
use crate::identity::domain::identity::Identity;
use crate::identity::domain::identity_resolver::IdentityResolver;
use crate::ledger::domain::dedup_ledger::DedupLedger;
use crate::notification::domain::notification_dispatcher::NotificationDispatcher;
use crate::pipeline::pipeline_logger::{NullPipelineLogger, PipelineLogger};
use crate::pipeline::pipeline_state::{Outcome, PipelineError, PipelineState};
use crate::shared::fingerprint::{fingerprint, ContentFingerprint};
use crate::storage::domain::object_store::{ObjectRef, ObjectStore};

/// How the ledger gates reprocessing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DedupMode {
    /// Atomically claim the fingerprint before any detection work. Only the
    /// invocation whose claim succeeds proceeds; the claim is released if
    /// delivery fails so a redelivery retries.
    #[default]
    ClaimFirst,
    /// Check before detection and record after delivery. Concurrent
    /// redeliveries of the same image may both be processed.
    CheckThenRecord,
}

enum Admission {
    Proceed { claimed: bool },
    Skip,
}

/// Snapshot pipeline: fetch → fingerprint → gate → detect → annotate →
/// notify → record.
///
/// Detection, identity and annotation failures degrade the result instead of
/// aborting. Only fetch and delivery failures are returned as errors.
pub struct ProcessSnapshotUseCase {
    store: Box<dyn ObjectStore>,
    ledger: Box<dyn DedupLedger>,
    aggregator: DetectionAggregator,
    resolver: IdentityResolver,
    engine: AnnotationEngine,
    dispatcher: NotificationDispatcher,
    dedup_mode: DedupMode,
    concurrent_detection: bool,
    logger: Box<dyn PipelineLogger>,
}

impl ProcessSnapshotUseCase {
    pub fn new(
        store: Box<dyn ObjectStore>,
        ledger: Box<dyn DedupLedger>,
        aggregator: DetectionAggregator,
        resolver: IdentityResolver,
        engine: AnnotationEngine,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        Self {
            store,
            ledger,
            aggregator,
            resolver,
            engine,
            dispatcher,
            dedup_mode: DedupMode::default(),
            concurrent_detection: false,
            logger: Box::new(NullPipelineLogger),
        }
    }

    pub fn with_dedup_mode(mut self, mode: DedupMode) -> Self {
        self.dedup_mode = mode;
        self
    }

    /// Runs object detection and face search on two threads.
    pub fn with_concurrent_detection(mut self, enabled: bool) -> Self {
        self.concurrent_detection = enabled;
        self
    }

    pub fn with_logger(mut self, logger: Box<dyn PipelineLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Fetches the referenced snapshot and processes it.
    pub fn execute(&mut self, object: &ObjectRef) -> Result<Outcome, PipelineError> {
        let start = Instant::now();
        let image = self.store.get(object).map_err(|e| {
            log::error!("Error getting object {object}: {e}");
            e
        })?;
        self.logger.timing("fetch", elapsed_ms(start));
        self.logger.stage(PipelineState::Fetched);
        self.logger
            .info(&format!("Fetched {} bytes from {object}", image.len()));

        let outcome = self.process(&image);
        self.logger.summary();
        outcome
    }

    /// Processes snapshot bytes that have already been fetched.
    pub fn process(&mut self, image: &[u8]) -> Result<Outcome, PipelineError> {
        let fingerprint = fingerprint(image);
        let admission = self.admit(&fingerprint);
        self.logger.stage(PipelineState::HashChecked);

        let claimed = match admission {
            Admission::Skip => {
                self.logger
                    .info(&format!("Already processed image hash {fingerprint}"));
                self.logger.stage(PipelineState::Skipped);
                return Ok(Outcome::Skipped { fingerprint });
            }
            Admission::Proceed { claimed } => claimed,
        };

        self.logger.stage(PipelineState::Detecting);
        let start = Instant::now();
        let (objects, face) = self.detect(image);
        let identity = face
            .as_ref()
            .map(|f| self.resolver.resolve(&f.face_id))
            .unwrap_or(Identity::Unknown);
        self.logger.timing("detect", elapsed_ms(start));

        let start = Instant::now();
        let (annotated, summary) = self
            .engine
            .annotate(image, &objects, face.as_ref(), &identity);
        self.logger.timing("annotate", elapsed_ms(start));
        self.logger.stage(PipelineState::Annotated);

        let start = Instant::now();
        if let Err(e) = self.dispatcher.send(&summary, &annotated.bytes) {
            log::error!("Delivery failed for image hash {fingerprint}: {e}");
            if claimed {
                self.release(&fingerprint);
            }
            return Err(e.into());
        }
        self.logger.timing("notify", elapsed_ms(start));
        self.logger.stage(PipelineState::Notified);

        let recorded = match self.ledger.mark_seen(&fingerprint) {
            Ok(()) => {
                self.logger.stage(PipelineState::Recorded);
                true
            }
            Err(e) => {
                log::error!(
                    "Notification sent but image hash {fingerprint} was not recorded; \
                     a redelivery will be processed again: {e}"
                );
                false
            }
        };

        Ok(Outcome::Delivered {
            fingerprint,
            summary,
            re_encoded: annotated.re_encoded,
            recorded,
        })
    }

    // Ledger errors never block processing: a failed check counts as unseen.
    fn admit(&self, fingerprint: &ContentFingerprint) -> Admission {
        match self.dedup_mode {
            DedupMode::ClaimFirst => match self.ledger.try_claim(fingerprint) {
                Ok(true) => Admission::Proceed { claimed: true },
                Ok(false) => Admission::Skip,
                Err(e) => {
                    log::warn!("Could not claim image hash {fingerprint}, processing anyway: {e}");
                    Admission::Proceed { claimed: false }
                }
            },
            DedupMode::CheckThenRecord => match self.ledger.has_seen(fingerprint) {
                Ok(true) => Admission::Skip,
                Ok(false) => Admission::Proceed { claimed: false },
                Err(e) => {
                    log::warn!("Could not check image hash {fingerprint}, processing anyway: {e}");
                    Admission::Proceed { claimed: false }
                }
            },
        }
    }

    fn release(&self, fingerprint: &ContentFingerprint) {
        if let Err(e) = self.ledger.release(fingerprint) {
            log::error!("Could not release claim on image hash {fingerprint}: {e}");
        }
    }

    fn detect(&self, image: &[u8]) -> (ObjectDetections, Option<FaceMatch>) {
        let aggregator = &self.aggregator;
        if !self.concurrent_detection {
            return (aggregator.detect_objects(image), aggregator.detect_faces(image));
        }

        thread::scope(|s| {
            let faces = s.spawn(move || aggregator.detect_faces(image));
            let objects = s.spawn(move || aggregator.detect_objects(image));
            let objects = objects.join().unwrap_or_else(|_| {
                log::warn!("Object detection thread panicked, continuing without objects");
                ObjectDetections::degraded()
            });
            let face = faces.join().unwrap_or_else(|_| {
                log::warn!("Face search thread panicked, treating as no match");
                None
            });
            (objects, face)
        })
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::domain::annotation_plan::AnnotationPlan;
    use crate::annotation::domain::overlay_renderer::{OverlayRenderer, RenderError};
    use crate::detection::domain::detected_object::{DetectedObject, ObjectInstance};
    use crate::detection::domain::face_searcher::FaceSearcher;
    use crate::detection::domain::object_detector::ObjectDetector;
    use crate::detection::domain::provider_error::ProviderError;
    use crate::identity::domain::identity_directory::{DirectoryError, IdentityDirectory};
    use crate::ledger::domain::dedup_ledger::LedgerError;
    use crate::ledger::infrastructure::in_memory_dedup_ledger::InMemoryDedupLedger;
    use crate::notification::domain::notification_channel::{
        Attachment, DeliveryError, NotificationChannel,
    };
    use crate::shared::bounding_box::BoundingBox;
    use crate::storage::domain::object_store::FetchError;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    const SNAPSHOT: &[u8] = b"\xff\xd8\xff\xe0 porch snapshot";

    // --- Stubs ---

    struct StubStore {
        objects: HashMap<String, Vec<u8>>,
    }

    impl ObjectStore for StubStore {
        fn get(&self, object: &ObjectRef) -> Result<Vec<u8>, FetchError> {
            self.objects
                .get(&object.key)
                .cloned()
                .ok_or_else(|| FetchError::NotFound(object.clone()))
        }
    }

    struct StubObjectDetector(Option<Vec<DetectedObject>>);

    impl ObjectDetector for StubObjectDetector {
        fn detect(&self, _image: &[u8], _min: f32) -> Result<Vec<DetectedObject>, ProviderError> {
            self.0
                .clone()
                .ok_or_else(|| ProviderError::Unavailable("labels down".into()))
        }
    }

    struct StubFaceSearcher(Option<Vec<FaceMatch>>);

    impl FaceSearcher for StubFaceSearcher {
        fn search(&self, _image: &[u8], _collection: &str) -> Result<Vec<FaceMatch>, ProviderError> {
            self.0
                .clone()
                .ok_or_else(|| ProviderError::Unavailable("faces down".into()))
        }
    }

    struct StubDirectory;

    impl IdentityDirectory for StubDirectory {
        fn lookup(&self, face_id: &str) -> Result<Option<Identity>, DirectoryError> {
            Ok((face_id == "jane").then(|| Identity::known("Jane Doe")))
        }
    }

    struct RecordingRenderer {
        plans: Arc<Mutex<Vec<AnnotationPlan>>>,
    }

    impl OverlayRenderer for RecordingRenderer {
        fn render(&self, _image: &[u8], plan: &AnnotationPlan) -> Result<Vec<u8>, RenderError> {
            self.plans.lock().unwrap().push(plan.clone());
            Ok(b"annotated".to_vec())
        }
    }

    struct RecordingChannel {
        sent: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
        failing: Arc<AtomicBool>,
    }

    impl NotificationChannel for RecordingChannel {
        fn deliver(
            &self,
            _channel_id: &str,
            text: &str,
            attachment: Attachment<'_>,
        ) -> Result<(), DeliveryError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(DeliveryError::Status(503));
            }
            self.sent
                .lock()
                .unwrap()
                .push((text.to_string(), attachment.bytes.to_vec()));
            Ok(())
        }
    }

    /// Ledger whose reads and/or writes fail.
    struct BrokenLedger {
        reads_fail: bool,
        inner: InMemoryDedupLedger,
    }

    impl BrokenLedger {
        fn err() -> LedgerError {
            LedgerError::Unavailable("table unreachable".into())
        }
    }

    impl DedupLedger for BrokenLedger {
        fn has_seen(&self, fp: &ContentFingerprint) -> Result<bool, LedgerError> {
            if self.reads_fail {
                return Err(Self::err());
            }
            self.inner.has_seen(fp)
        }
        fn mark_seen(&self, _fp: &ContentFingerprint) -> Result<(), LedgerError> {
            Err(Self::err())
        }
        fn try_claim(&self, fp: &ContentFingerprint) -> Result<bool, LedgerError> {
            if self.reads_fail {
                return Err(Self::err());
            }
            self.inner.try_claim(fp)
        }
        fn release(&self, fp: &ContentFingerprint) -> Result<(), LedgerError> {
            self.inner.release(fp)
        }
    }

    struct RecordingLogger {
        stages: Arc<Mutex<Vec<PipelineState>>>,
    }

    impl PipelineLogger for RecordingLogger {
        fn stage(&mut self, state: PipelineState) {
            self.stages.lock().unwrap().push(state);
        }
        fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
        fn info(&mut self, _message: &str) {}
    }

    // --- Harness ---

    struct Harness {
        ledger: InMemoryDedupLedger,
        plans: Arc<Mutex<Vec<AnnotationPlan>>>,
        sent: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
        failing: Arc<AtomicBool>,
    }

    struct Providers {
        objects: Option<Vec<DetectedObject>>,
        faces: Option<Vec<FaceMatch>>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                ledger: InMemoryDedupLedger::new(),
                plans: Arc::new(Mutex::new(Vec::new())),
                sent: Arc::new(Mutex::new(Vec::new())),
                failing: Arc::new(AtomicBool::new(false)),
            }
        }

        fn use_case(&self, providers: Providers) -> ProcessSnapshotUseCase {
            self.use_case_with_ledger(providers, Box::new(self.ledger.clone()))
        }

        fn use_case_with_ledger(
            &self,
            providers: Providers,
            ledger: Box<dyn DedupLedger>,
        ) -> ProcessSnapshotUseCase {
            ProcessSnapshotUseCase::new(
                Box::new(StubStore {
                    objects: HashMap::from([("snap.jpg".to_string(), SNAPSHOT.to_vec())]),
                }),
                ledger,
                DetectionAggregator::new(
                    Box::new(StubObjectDetector(providers.objects)),
                    Box::new(StubFaceSearcher(providers.faces)),
                    "porch",
                ),
                IdentityResolver::new(Box::new(StubDirectory)),
                AnnotationEngine::new(Box::new(RecordingRenderer {
                    plans: self.plans.clone(),
                })),
                NotificationDispatcher::new(
                    Box::new(RecordingChannel {
                        sent: self.sent.clone(),
                        failing: self.failing.clone(),
                    }),
                    "C123",
                ),
            )
        }

        fn sent_count(&self) -> usize {
            self.sent.lock().unwrap().len()
        }
    }

    fn snap() -> ObjectRef {
        ObjectRef::new("doorbell", "snap.jpg")
    }

    fn package_and_jane() -> Providers {
        Providers {
            objects: Some(vec![DetectedObject {
                name: "Package".into(),
                confidence: 98.0,
                instances: vec![ObjectInstance {
                    bounding_box: BoundingBox::new(0.0, 0.0, 0.5, 0.5),
                    confidence: 97.0,
                }],
            }]),
            faces: Some(vec![FaceMatch {
                face_id: "jane".into(),
                confidence: 91.0,
                searched_face_box: BoundingBox::new(0.5, 0.1, 0.2, 0.3),
            }]),
        }
    }

    fn nothing() -> Providers {
        Providers {
            objects: Some(vec![]),
            faces: Some(vec![]),
        }
    }

    // --- Tests ---

    #[test]
    fn test_end_to_end_package_and_known_face() {
        let h = Harness::new();
        let mut uc = h.use_case(package_and_jane());

        let outcome = uc.execute(&snap()).unwrap();

        assert_eq!(outcome.final_state(), PipelineState::Recorded);
        assert_eq!(
            outcome.summary().unwrap().as_str(),
            "Objects: Package\nPeople: Jane Doe (91%) "
        );
        assert_eq!(h.plans.lock().unwrap()[0].len(), 2);
        let sent = h.sent.lock().unwrap();
        assert_eq!(sent[0].0, "Objects: Package\nPeople: Jane Doe (91%) ");
        assert_eq!(sent[0].1, b"annotated");
        assert!(h.ledger.has_seen(&fingerprint(SNAPSHOT)).unwrap());
    }

    #[test]
    fn test_redelivery_is_skipped_without_second_notification() {
        let h = Harness::new();
        let mut uc = h.use_case(package_and_jane());

        uc.execute(&snap()).unwrap();
        let second = uc.execute(&snap()).unwrap();

        assert_eq!(
            second,
            Outcome::Skipped {
                fingerprint: fingerprint(SNAPSHOT)
            }
        );
        assert_eq!(h.sent_count(), 1);
    }

    #[test]
    fn test_no_detections_delivers_original_bytes() {
        let h = Harness::new();
        let mut uc = h.use_case(nothing());

        let outcome = uc.execute(&snap()).unwrap();

        assert_eq!(
            outcome.summary().unwrap().as_str(),
            "Objects: None objects found.\nPeople: No faces found."
        );
        assert!(h.plans.lock().unwrap().is_empty());
        assert_eq!(h.sent.lock().unwrap()[0].1, SNAPSHOT);
        assert!(matches!(outcome, Outcome::Delivered { re_encoded: false, .. }));
    }

    #[test]
    fn test_provider_failures_degrade_but_still_deliver() {
        let h = Harness::new();
        let mut uc = h.use_case(Providers {
            objects: None,
            faces: None,
        });

        let outcome = uc.execute(&snap()).unwrap();

        assert_eq!(
            outcome.summary().unwrap().as_str(),
            "Objects: None objects found.\nPeople: No faces found."
        );
        assert_eq!(outcome.final_state(), PipelineState::Recorded);
        assert_eq!(h.sent_count(), 1);
    }

    #[test]
    fn test_unknown_face_still_annotated() {
        let h = Harness::new();
        let mut providers = package_and_jane();
        providers.faces.as_mut().unwrap()[0].face_id = "stranger".into();
        let mut uc = h.use_case(providers);

        let outcome = uc.execute(&snap()).unwrap();

        assert_eq!(
            outcome.summary().unwrap().as_str(),
            "Objects: Package\nPeople: Unknown Person"
        );
        let plans = h.plans.lock().unwrap();
        assert_eq!(plans[0].overlays()[1].label, "Unknown Person");
    }

    #[test]
    fn test_fetch_failure_is_fatal_and_touches_nothing() {
        let h = Harness::new();
        let mut uc = h.use_case(package_and_jane());

        let result = uc.execute(&ObjectRef::new("doorbell", "missing.jpg"));

        assert!(matches!(
            result,
            Err(PipelineError::Fetch(FetchError::NotFound(_)))
        ));
        assert_eq!(h.sent_count(), 0);
        assert!(h.ledger.is_empty());
    }

    #[test]
    fn test_delivery_failure_releases_claim_so_retry_runs() {
        let h = Harness::new();
        let mut uc = h.use_case(package_and_jane());

        h.failing.store(true, Ordering::SeqCst);
        let result = uc.execute(&snap());
        assert!(matches!(result, Err(PipelineError::Delivery(_))));
        assert!(!h.ledger.has_seen(&fingerprint(SNAPSHOT)).unwrap());

        h.failing.store(false, Ordering::SeqCst);
        let retry = uc.execute(&snap()).unwrap();
        assert_eq!(retry.final_state(), PipelineState::Recorded);
        assert_eq!(h.sent_count(), 1);
    }

    #[test]
    fn test_claim_first_blocks_in_flight_duplicate() {
        let h = Harness::new();
        // Another worker already claimed this fingerprint and is mid-flight.
        h.ledger.try_claim(&fingerprint(SNAPSHOT)).unwrap();
        let mut uc = h.use_case(package_and_jane());

        let outcome = uc.execute(&snap()).unwrap();

        assert_eq!(outcome.final_state(), PipelineState::Skipped);
        assert_eq!(h.sent_count(), 0);
    }

    #[test]
    fn test_check_then_record_skips_seen_and_records_after_delivery() {
        let h = Harness::new();
        let mut uc = h
            .use_case(nothing())
            .with_dedup_mode(DedupMode::CheckThenRecord);

        assert_eq!(
            uc.execute(&snap()).unwrap().final_state(),
            PipelineState::Recorded
        );
        assert_eq!(
            uc.execute(&snap()).unwrap().final_state(),
            PipelineState::Skipped
        );
        assert_eq!(h.sent_count(), 1);
    }

    #[test]
    fn test_check_then_record_delivery_failure_leaves_unseen() {
        let h = Harness::new();
        let mut uc = h
            .use_case(nothing())
            .with_dedup_mode(DedupMode::CheckThenRecord);
        h.failing.store(true, Ordering::SeqCst);

        assert!(uc.execute(&snap()).is_err());
        assert!(h.ledger.is_empty());
    }

    #[test]
    fn test_ledger_write_failure_is_reported_not_fatal() {
        let h = Harness::new();
        let ledger = BrokenLedger {
            reads_fail: false,
            inner: InMemoryDedupLedger::new(),
        };
        let mut uc = h
            .use_case_with_ledger(nothing(), Box::new(ledger))
            .with_dedup_mode(DedupMode::CheckThenRecord);

        let outcome = uc.execute(&snap()).unwrap();

        assert!(matches!(outcome, Outcome::Delivered { recorded: false, .. }));
        assert_eq!(outcome.final_state(), PipelineState::Notified);
        assert_eq!(h.sent_count(), 1);
    }

    #[test]
    fn test_ledger_read_failure_still_processes() {
        for mode in [DedupMode::ClaimFirst, DedupMode::CheckThenRecord] {
            let h = Harness::new();
            let ledger = BrokenLedger {
                reads_fail: true,
                inner: InMemoryDedupLedger::new(),
            };
            let mut uc = h
                .use_case_with_ledger(nothing(), Box::new(ledger))
                .with_dedup_mode(mode);

            assert!(uc.execute(&snap()).is_ok());
            assert_eq!(h.sent_count(), 1);
        }
    }

    #[test]
    fn test_concurrent_detection_matches_sequential() {
        let sequential = Harness::new();
        let concurrent = Harness::new();

        let a = sequential
            .use_case(package_and_jane())
            .execute(&snap())
            .unwrap();
        let b = concurrent
            .use_case(package_and_jane())
            .with_concurrent_detection(true)
            .execute(&snap())
            .unwrap();

        assert_eq!(a, b);
        assert_eq!(concurrent.plans.lock().unwrap()[0].len(), 2);
    }

    #[test]
    fn test_stage_sequence_for_full_run_and_skip() {
        let h = Harness::new();
        let stages = Arc::new(Mutex::new(Vec::new()));
        let mut uc = h
            .use_case(nothing())
            .with_logger(Box::new(RecordingLogger {
                stages: stages.clone(),
            }));

        uc.execute(&snap()).unwrap();
        uc.execute(&snap()).unwrap();

        use PipelineState::*;
        assert_eq!(
            *stages.lock().unwrap(),
            vec![
                Fetched, HashChecked, Detecting, Annotated, Notified, Recorded,
                Fetched, HashChecked, Skipped,
            ]
        );
    }

    #[test]
    fn test_process_accepts_prefetched_bytes() {
        let h = Harness::new();
        let mut uc = h.use_case(nothing());

        let outcome = uc.process(b"other image").unwrap();

        assert_eq!(outcome.fingerprint(), &fingerprint(b"other image"));
        assert_eq!(h.sent.lock().unwrap()[0].1, b"other image");
    }
}
