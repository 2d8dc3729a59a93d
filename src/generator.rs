use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::{GeneratorConfig, SplitPolicy};
use crate::dataset::{Dataset, SplitDataset, Value, materialize};
use crate::errors::SplitError;
use crate::naming::relation_name;
use crate::partition::fold_bounds;
use crate::rng::RandomSequenceSource;
use crate::stratify::stratify;
use crate::types::{FoldNumber, RowIndex, Seed};

/// One produced train/test pair plus the bookkeeping needed to map results back to source rows.
#[derive(Debug)]
pub struct TrainTestSplit<D> {
    /// Training rows, in `train_original_indices` order.
    pub train: SplitDataset<D>,
    /// Test rows, in `test_original_indices` order.
    pub test: SplitDataset<D>,
    /// Seed of the generator that produced this split.
    pub seed: Seed,
    /// 1-based fold number (always 1 for a random split).
    pub fold_number: FoldNumber,
    /// Total number of splits the generator yields.
    pub fold_count: usize,
    /// Source row of each training row, in training row order.
    pub train_original_indices: Vec<RowIndex>,
    /// Source row of each test row, in test row order.
    pub test_original_indices: Vec<RowIndex>,
}

impl<D> Clone for TrainTestSplit<D> {
    fn clone(&self) -> Self {
        Self {
            train: self.train.clone(),
            test: self.test.clone(),
            seed: self.seed,
            fold_number: self.fold_number,
            fold_count: self.fold_count,
            train_original_indices: self.train_original_indices.clone(),
            test_original_indices: self.test_original_indices.clone(),
        }
    }
}

/// Resumable position of a generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorCheckpoint {
    /// Generator seed.
    pub seed: Seed,
    /// Next fold `next_split` would produce (`fold_count + 1` once exhausted).
    pub next_fold: FoldNumber,
    /// Raw state of the random stream (`SplitMix64::state`).
    pub rng_state: u64,
    /// Draws consumed from the random stream so far.
    pub draws_consumed: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum GeneratorState {
    Uninitialized,
    Ready { next_fold: FoldNumber },
    Exhausted,
}

/// Lazy, deterministic producer of train/test splits for one dataset, seed and policy.
///
/// Draw order on the single random stream (nothing is drawn when
/// `randomize` is false):
/// 1. base ordering: one shuffle of `0..row_count`, skipped for
///    order-preserving random splits;
/// 2. k-fold only, per fold `f`: one shuffle of fold `f`'s training rows.
///
/// Test rows keep their position order in the base ordering and are never
/// reshuffled. The indices reported in `train_original_indices` are the exact
/// order in which training rows are materialized.
///
/// A generator is single-threaded: drain it (see `drain`) and fan the
/// resulting splits out when folds are evaluated in parallel.
///
/// As an `Iterator` it stops after yielding the first error. `next_split`
/// itself leaves the generator untouched on failure, so it can be retried.
pub struct SplitGenerator<D> {
    dataset: Arc<D>,
    config: GeneratorConfig,
    policy: SplitPolicy,
    fold_count: usize,
    train_count: usize,
    rng: RandomSequenceSource,
    base_ordering: Vec<RowIndex>,
    state: GeneratorState,
    iteration_failed: bool,
}

impl<D: Dataset> SplitGenerator<D> {
    /// Validate `policy` against `dataset` and build a generator.
    ///
    /// All policy errors surface here; a generator that constructs
    /// successfully only fails later with `Exhausted`.
    pub fn new(
        dataset: Arc<D>,
        config: GeneratorConfig,
        policy: SplitPolicy,
    ) -> Result<Self, SplitError> {
        let row_count = dataset.row_count();
        let fold_count = policy.validate(row_count)?;
        let mut train_count = 0;

        match policy {
            SplitPolicy::KFold { stratify: true, .. } if !policy.is_leave_one_out(row_count) => {
                if dataset.label_column_index().is_none() {
                    return Err(SplitError::LabelRequired(format!(
                        "relation '{}' has no label column to stratify on",
                        dataset.relation_name()
                    )));
                }
                if !dataset.label_is_categorical() {
                    return Err(SplitError::LabelRequired(format!(
                        "label of relation '{}' is not nominal; numeric labels are never stratified",
                        dataset.relation_name()
                    )));
                }
            }
            SplitPolicy::KFold { .. } => {}
            SplitPolicy::RandomSplit { train_fraction, .. } => {
                train_count = ((train_fraction * row_count as f64).round() as usize).min(row_count);
                if !config.allow_empty_partitions && (train_count == 0 || train_count == row_count)
                {
                    return Err(SplitError::InvalidPolicy(format!(
                        "train fraction {train_fraction} over {row_count} row(s) gives {train_count} train and {} test row(s)",
                        row_count - train_count
                    )));
                }
            }
        }

        Ok(Self {
            rng: RandomSequenceSource::new(config.seed),
            dataset,
            config,
            policy,
            fold_count,
            train_count,
            base_ordering: Vec::new(),
            state: GeneratorState::Uninitialized,
            iteration_failed: false,
        })
    }

    /// Rebuild a generator at the position recorded in `checkpoint`.
    ///
    /// The base ordering is recomputed and the random stream is restored from
    /// `checkpoint.rng_state`, so the remaining splits equal those the
    /// checkpointed generator would have produced.
    pub fn resume(
        dataset: Arc<D>,
        config: GeneratorConfig,
        policy: SplitPolicy,
        checkpoint: GeneratorCheckpoint,
    ) -> Result<Self, SplitError> {
        if checkpoint.seed != config.seed {
            return Err(SplitError::CheckpointMismatch(format!(
                "checkpoint seed {} differs from config seed {}",
                checkpoint.seed, config.seed
            )));
        }
        let mut generator = Self::new(dataset, config, policy)?;
        if checkpoint.next_fold == 0 || checkpoint.next_fold > generator.fold_count + 1 {
            return Err(SplitError::CheckpointMismatch(format!(
                "next fold {} outside 1..={}",
                checkpoint.next_fold,
                generator.fold_count + 1
            )));
        }
        let rng = RandomSequenceSource::restore(
            checkpoint.seed,
            checkpoint.rng_state,
            checkpoint.draws_consumed,
        )
        .ok_or_else(|| {
            SplitError::CheckpointMismatch(format!(
                "rng state {:#x} is not {} draw(s) into the stream for seed {}",
                checkpoint.rng_state, checkpoint.draws_consumed, checkpoint.seed
            ))
        })?;
        if checkpoint.next_fold == 1 && checkpoint.draws_consumed == 0 {
            return Ok(generator);
        }

        generator.initialize()?;
        let base_draws = generator.rng.draws_consumed();
        let consistent = if checkpoint.next_fold == 1 || !generator.reshuffles_training_rows() {
            checkpoint.draws_consumed == base_draws
        } else {
            checkpoint.draws_consumed >= base_draws
        };
        if !consistent {
            return Err(SplitError::CheckpointMismatch(format!(
                "{} draw(s) recorded before fold {}, base ordering alone consumes {}",
                checkpoint.draws_consumed, checkpoint.next_fold, base_draws
            )));
        }
        generator.rng = rng;
        generator.state = if checkpoint.next_fold > generator.fold_count {
            GeneratorState::Exhausted
        } else {
            GeneratorState::Ready {
                next_fold: checkpoint.next_fold,
            }
        };
        debug!(
            seed = generator.config.seed,
            next_fold = checkpoint.next_fold,
            draws = checkpoint.draws_consumed,
            "split generator resumed"
        );
        Ok(generator)
    }

    /// Produce the next split, or `Exhausted` once every split has been produced.
    pub fn next_split(&mut self) -> Result<TrainTestSplit<D>, SplitError> {
        if self.state == GeneratorState::Uninitialized {
            self.initialize()?;
        }
        let fold = match self.state {
            GeneratorState::Ready { next_fold } => next_fold,
            GeneratorState::Exhausted | GeneratorState::Uninitialized => {
                return Err(SplitError::Exhausted {
                    fold_count: self.fold_count,
                });
            }
        };

        // Work on a copy of the stream; it is committed only once the split is complete.
        let mut rng = self.rng.clone();
        let (train_indices, test_indices) = match self.policy {
            SplitPolicy::KFold { .. } => self.fold_indices(fold, &mut rng)?,
            SplitPolicy::RandomSplit { .. } => {
                let (train, test) = self.base_ordering.split_at(self.train_count);
                (train.to_vec(), test.to_vec())
            }
        };

        let mut train = materialize(&self.dataset, train_indices.clone(), self.config.use_view)?;
        let mut test = materialize(&self.dataset, test_indices.clone(), self.config.use_view)?;
        let original_name = self.dataset.relation_name();
        train.set_relation_name(&relation_name(
            &self.config.relation_template,
            original_name,
            true,
            fold,
        ));
        test.set_relation_name(&relation_name(
            &self.config.relation_template,
            original_name,
            false,
            fold,
        ));

        self.rng = rng;
        self.state = if fold >= self.fold_count {
            GeneratorState::Exhausted
        } else {
            GeneratorState::Ready {
                next_fold: fold + 1,
            }
        };
        trace!(
            fold,
            fold_count = self.fold_count,
            train_rows = train_indices.len(),
            test_rows = test_indices.len(),
            draws = self.rng.draws_consumed(),
            "split produced"
        );
        if self.state == GeneratorState::Exhausted {
            debug!(
                fold_count = self.fold_count,
                draws = self.rng.draws_consumed(),
                "split generator exhausted"
            );
        }

        Ok(TrainTestSplit {
            train,
            test,
            seed: self.config.seed,
            fold_number: fold,
            fold_count: self.fold_count,
            train_original_indices: train_indices,
            test_original_indices: test_indices,
        })
    }

    /// Produce every remaining split, in order.
    pub fn drain(self) -> Result<Vec<TrainTestSplit<D>>, SplitError> {
        self.collect()
    }

    /// Number of splits this generator yields in total.
    pub fn fold_count(&self) -> usize {
        self.fold_count
    }

    /// Whether every split has been produced.
    pub fn is_exhausted(&self) -> bool {
        self.state == GeneratorState::Exhausted
    }

    /// Fold the next `next_split` call produces, `None` once exhausted.
    pub fn current_fold(&self) -> Option<FoldNumber> {
        match self.state {
            GeneratorState::Uninitialized => Some(1),
            GeneratorState::Ready { next_fold } => Some(next_fold),
            GeneratorState::Exhausted => None,
        }
    }

    /// Base ordering, available after the first split has been requested.
    pub fn base_ordering(&self) -> Option<&[RowIndex]> {
        match self.state {
            GeneratorState::Uninitialized => None,
            _ => Some(&self.base_ordering),
        }
    }

    /// Draws consumed from the random stream so far.
    pub fn draws_consumed(&self) -> u64 {
        self.rng.draws_consumed()
    }

    /// Current position, for `resume`.
    pub fn checkpoint(&self) -> GeneratorCheckpoint {
        GeneratorCheckpoint {
            seed: self.config.seed,
            next_fold: self.current_fold().unwrap_or(self.fold_count + 1),
            rng_state: self.rng.state(),
            draws_consumed: self.rng.draws_consumed(),
        }
    }

    /// Source dataset.
    pub fn dataset(&self) -> &Arc<D> {
        &self.dataset
    }

    /// Generator configuration.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Split policy.
    pub fn policy(&self) -> &SplitPolicy {
        &self.policy
    }

    fn initialize(&mut self) -> Result<(), SplitError> {
        let (ordering, replay) = self.replay_base_ordering()?;
        // Dry run of the base shuffle over a scratch copy, so per-fold
        // training shuffles continue from the stream state right after it.
        if self.shuffles_base_ordering() {
            let mut scratch: Vec<RowIndex> = (0..self.dataset.row_count()).collect();
            let draws = self.rng.shuffle(&mut scratch);
            debug_assert_eq!(draws, replay.draws_consumed());
        }
        debug_assert_eq!(self.rng.state(), replay.state());
        self.base_ordering = ordering;
        self.state = GeneratorState::Ready { next_fold: 1 };
        debug!(
            seed = self.config.seed,
            rows = self.dataset.row_count(),
            fold_count = self.fold_count,
            policy = ?self.policy,
            draws = self.rng.draws_consumed(),
            "split generator initialized"
        );
        Ok(())
    }

    /// Compute the base ordering on a fresh stream for this seed, returning it
    /// with the stream as the base shuffle left it.
    fn replay_base_ordering(
        &self,
    ) -> Result<(Vec<RowIndex>, RandomSequenceSource), SplitError> {
        let row_count = self.dataset.row_count();
        let mut ordering: Vec<RowIndex> = (0..row_count).collect();
        let mut replay = RandomSequenceSource::new(self.config.seed);
        if self.shuffles_base_ordering() {
            replay.shuffle(&mut ordering);
        }

        if let SplitPolicy::KFold { stratify: true, .. } = self.policy
            && !self.policy.is_leave_one_out(row_count)
        {
            let dataset = &self.dataset;
            ordering = stratify(&ordering, self.fold_count, |idx| {
                dataset.label_value_of(idx).and_then(Value::as_category)
            })?;
        }
        Ok((ordering, replay))
    }

    fn shuffles_base_ordering(&self) -> bool {
        match self.policy {
            SplitPolicy::KFold { .. } => self.config.randomize,
            SplitPolicy::RandomSplit { preserve_order, .. } => {
                self.config.randomize && !preserve_order
            }
        }
    }

    fn reshuffles_training_rows(&self) -> bool {
        matches!(self.policy, SplitPolicy::KFold { .. }) && self.config.randomize
    }

    /// Test rows are fold `fold`'s slice of the base ordering; training rows are
    /// everything else, reshuffled from `rng` when randomizing.
    fn fold_indices(
        &self,
        fold: FoldNumber,
        rng: &mut RandomSequenceSource,
    ) -> Result<(Vec<RowIndex>, Vec<RowIndex>), SplitError> {
        let bounds = fold_bounds(self.base_ordering.len(), self.fold_count, fold - 1)?;
        let test = self.base_ordering[bounds.range()].to_vec();
        let mut train = Vec::with_capacity(self.base_ordering.len() - bounds.len);
        train.extend_from_slice(&self.base_ordering[..bounds.first]);
        train.extend_from_slice(&self.base_ordering[bounds.end()..]);
        if self.reshuffles_training_rows() {
            let before = rng.draws_consumed();
            let draws = rng.shuffle(&mut train);
            debug_assert_eq!(rng.draws_consumed(), before + draws);
            debug_assert!(train.len() < 2 || draws > 0);
            trace!(fold, draws, "training rows reshuffled");
        }
        Ok((train, test))
    }
}

impl<D: Dataset> Iterator for SplitGenerator<D> {
    type Item = Result<TrainTestSplit<D>, SplitError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.iteration_failed || self.is_exhausted() {
            return None;
        }
        let split = self.next_split();
        self.iteration_failed = split.is_err();
        Some(split)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Attribute, RowRef, Table};
    use crate::rng::SplitMix64;

    fn labeled(rows: usize, classes: u32) -> Arc<Table> {
        let attributes = vec![
            Attribute::numeric("x"),
            Attribute::nominal("class", (0..classes).map(|c| format!("c{c}"))),
        ];
        let mut table = Table::new("data", attributes, Some(1)).unwrap();
        for i in 0..rows {
            table
                .push_row(vec![
                    Value::Numeric(i as f64),
                    Value::Nominal(i as u32 % classes),
                ])
                .unwrap();
        }
        Arc::new(table)
    }

    fn config(seed: Seed) -> GeneratorConfig {
        GeneratorConfig {
            seed,
            ..GeneratorConfig::default()
        }
    }

    #[test]
    fn initialization_is_lazy() {
        let generator =
            SplitGenerator::new(labeled(10, 2), config(1), SplitPolicy::k_fold(5)).unwrap();
        assert_eq!(generator.base_ordering(), None);
        assert_eq!(generator.draws_consumed(), 0);
        assert_eq!(generator.current_fold(), Some(1));
        assert!(!generator.is_exhausted());
    }

    #[test]
    fn training_shuffles_continue_from_the_replayed_stream() {
        let rows = 23;
        let folds = 5;
        let mut generator =
            SplitGenerator::new(labeled(rows, 3), config(9), SplitPolicy::k_fold(folds)).unwrap();
        let (base, mut stream) = generator.replay_base_ordering().unwrap();
        while let Some(split) = generator.next() {
            let split = split.unwrap();
            let bounds = fold_bounds(rows, folds, split.fold_number - 1).unwrap();
            let mut train: Vec<RowIndex> = base[..bounds.first]
                .iter()
                .chain(&base[bounds.end()..])
                .copied()
                .collect();
            let draws = stream.shuffle(&mut train);
            assert!(draws > 0);
            assert_eq!(split.train_original_indices, train);
            assert_eq!(split.test_original_indices, base[bounds.range()].to_vec());
            assert_eq!(generator.draws_consumed(), stream.draws_consumed());
        }
        assert!(generator.is_exhausted());
    }

    #[test]
    fn dry_run_leaves_live_stream_at_replayed_state() {
        let mut generator =
            SplitGenerator::new(labeled(30, 3), config(77), SplitPolicy::stratified_k_fold(3))
                .unwrap();
        let (replayed, stream) = generator.replay_base_ordering().unwrap();
        generator.initialize().unwrap();
        assert_eq!(generator.base_ordering(), Some(replayed.as_slice()));
        assert_eq!(generator.rng.state(), stream.state());
        assert_eq!(generator.draws_consumed(), stream.draws_consumed());
        assert!(stream.draws_consumed() > 0);
    }

    #[test]
    fn no_draws_without_randomize() {
        let config = GeneratorConfig {
            randomize: false,
            ..GeneratorConfig::default()
        };
        let mut generator =
            SplitGenerator::new(labeled(12, 2), config, SplitPolicy::k_fold(3)).unwrap();
        let first = generator.next_split().unwrap();
        assert_eq!(first.test_original_indices, vec![0, 1, 2, 3]);
        assert_eq!(first.train_original_indices, (4..12).collect::<Vec<_>>());
        assert_eq!(generator.draws_consumed(), 0);
    }

    #[test]
    fn exhausted_generator_errors_instead_of_repeating() {
        let mut generator =
            SplitGenerator::new(labeled(4, 2), config(3), SplitPolicy::k_fold(2)).unwrap();
        generator.next_split().unwrap();
        generator.next_split().unwrap();
        assert!(generator.is_exhausted());
        assert_eq!(generator.current_fold(), None);
        assert_eq!(
            generator.next_split().map(|split| split.fold_number),
            Err(SplitError::Exhausted { fold_count: 2 })
        );
        assert!(generator.next().is_none());
    }

    #[test]
    fn split_names_follow_template() {
        let mut generator =
            SplitGenerator::new(labeled(6, 2), config(3), SplitPolicy::k_fold(3)).unwrap();
        generator.next_split().unwrap();
        let second = generator.next_split().unwrap();
        assert_eq!(second.train.relation_name(), "data-train-2");
        assert_eq!(second.test.relation_name(), "data-test-2");
        assert_eq!(generator.dataset().relation_name(), "data");
    }

    #[test]
    fn stratify_without_nominal_label_is_rejected() {
        let mut table = Table::new("plain", vec![Attribute::numeric("x")], None).unwrap();
        for i in 0..6 {
            table.push_row(vec![Value::Numeric(i as f64)]).unwrap();
        }
        let table = Arc::new(table);
        let err = SplitGenerator::new(
            Arc::clone(&table),
            config(1),
            SplitPolicy::stratified_k_fold(3),
        )
        .err();
        assert!(matches!(err, Some(SplitError::LabelRequired(_))));

        let mut numeric_label = (*table).clone();
        numeric_label.set_label_column(Some(0)).unwrap();
        let err = SplitGenerator::new(
            Arc::new(numeric_label),
            config(1),
            SplitPolicy::stratified_k_fold(3),
        )
        .err();
        assert!(matches!(err, Some(SplitError::LabelRequired(_))));

        // leave-one-out never stratifies, so no label is needed
        assert!(
            SplitGenerator::new(
                table,
                config(1),
                SplitPolicy::KFold {
                    folds: 0,
                    stratify: true
                }
            )
            .is_ok()
        );
    }

    #[test]
    fn random_split_rejects_empty_sides_unless_allowed() {
        let data = labeled(3, 2);
        let err = SplitGenerator::new(Arc::clone(&data), config(1), SplitPolicy::random_split(0.1))
            .err();
        assert!(matches!(err, Some(SplitError::InvalidPolicy(_))));

        let allow = GeneratorConfig {
            allow_empty_partitions: true,
            ..GeneratorConfig::default()
        };
        let mut generator =
            SplitGenerator::new(data, allow, SplitPolicy::random_split(0.1)).unwrap();
        let split = generator.next_split().unwrap();
        assert!(split.train_original_indices.is_empty());
        assert_eq!(split.test_original_indices.len(), 3);
    }

    #[test]
    fn checkpoint_tracks_position() {
        let mut generator =
            SplitGenerator::new(labeled(10, 2), config(5), SplitPolicy::k_fold(5)).unwrap();
        assert_eq!(
            generator.checkpoint(),
            GeneratorCheckpoint {
                seed: 5,
                next_fold: 1,
                rng_state: 5,
                draws_consumed: 0
            }
        );
        generator.next_split().unwrap();
        let checkpoint = generator.checkpoint();
        assert_eq!(checkpoint.next_fold, 2);
        assert_eq!(checkpoint.draws_consumed, generator.draws_consumed());
        assert_eq!(
            checkpoint.rng_state,
            SplitMix64::state_after(5, checkpoint.draws_consumed)
        );
    }

    struct MissingRow {
        inner: Table,
        missing: RowIndex,
    }

    impl Dataset for MissingRow {
        fn row_count(&self) -> usize {
            self.inner.row_count()
        }

        fn attributes(&self) -> &[Attribute] {
            self.inner.attributes()
        }

        fn label_column_index(&self) -> Option<usize> {
            self.inner.label_column_index()
        }

        fn row_at(&self, idx: RowIndex) -> Option<RowRef<'_>> {
            if idx == self.missing {
                return None;
            }
            self.inner.row_at(idx)
        }

        fn relation_name(&self) -> &str {
            self.inner.relation_name()
        }

        fn set_relation_name(&mut self, name: &str) {
            self.inner.set_relation_name(name);
        }
    }

    #[test]
    fn iterator_stops_after_a_failed_step() {
        let data = Arc::new(MissingRow {
            inner: (*labeled(6, 2)).clone(),
            missing: 3,
        });
        let mut generator =
            SplitGenerator::new(Arc::clone(&data), config(1), SplitPolicy::k_fold(3)).unwrap();
        let results: Vec<_> = generator.by_ref().collect();
        assert_eq!(results.len(), 1);
        assert!(matches!(
            results[0],
            Err(SplitError::RowOutOfBounds { index: 3, .. })
        ));
        assert!(generator.next().is_none());

        // the failed step committed nothing, so direct calls retry fold 1
        assert_eq!(generator.current_fold(), Some(1));
        assert!(generator.next_split().is_err());

        let skipping = SplitGenerator::new(data, config(1), SplitPolicy::k_fold(3)).unwrap();
        assert_eq!(skipping.filter_map(Result::ok).count(), 0);
    }
}
