use serde::{Deserialize, Serialize};

use crate::constants::generator::{DEFAULT_FOLDS, DEFAULT_SEED, MIN_FOLDS};
use crate::constants::naming::DEFAULT_RELATION_TEMPLATE;
use crate::errors::SplitError;
use crate::types::Seed;

/// How a dataset is cut into train/test pairs.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum SplitPolicy {
    /// K-fold cross-validation. `folds < 2` means leave-one-out.
    KFold {
        /// Requested fold count.
        folds: usize,
        /// Distribute categorical label values evenly across folds.
        stratify: bool,
    },
    /// Single percentage-based split.
    RandomSplit {
        /// Share of rows assigned to train, in `(0, 1)`.
        train_fraction: f64,
        /// Keep source row order (first rows train, remainder test).
        preserve_order: bool,
    },
}

impl Default for SplitPolicy {
    fn default() -> Self {
        Self::KFold {
            folds: DEFAULT_FOLDS,
            stratify: true,
        }
    }
}

impl SplitPolicy {
    /// Unstratified k-fold.
    pub fn k_fold(folds: usize) -> Self {
        Self::KFold {
            folds,
            stratify: false,
        }
    }

    /// Stratified k-fold.
    pub fn stratified_k_fold(folds: usize) -> Self {
        Self::KFold {
            folds,
            stratify: true,
        }
    }

    /// One fold per row.
    pub fn leave_one_out() -> Self {
        Self::KFold {
            folds: 0,
            stratify: false,
        }
    }

    /// Shuffled percentage split.
    pub fn random_split(train_fraction: f64) -> Self {
        Self::RandomSplit {
            train_fraction,
            preserve_order: false,
        }
    }

    /// Order-preserving percentage split (for time-ordered data).
    pub fn ordered_split(train_fraction: f64) -> Self {
        Self::RandomSplit {
            train_fraction,
            preserve_order: true,
        }
    }

    /// Validate the policy shape against `row_count` and return the number of splits it yields.
    ///
    /// Only the shape is checked here; label requirements for stratification
    /// and empty-partition checks for random splits depend on the dataset and
    /// config and are checked by the generator.
    pub fn validate(&self, row_count: usize) -> Result<usize, SplitError> {
        match *self {
            Self::KFold { folds, .. } => {
                let effective = if folds < MIN_FOLDS { row_count } else { folds };
                if effective < MIN_FOLDS {
                    return Err(SplitError::InvalidPolicy(format!(
                        "cross-validation needs at least {MIN_FOLDS} rows, dataset has {row_count}"
                    )));
                }
                if effective > row_count {
                    return Err(SplitError::InvalidPolicy(format!(
                        "fold count {effective} exceeds row count {row_count}"
                    )));
                }
                Ok(effective)
            }
            Self::RandomSplit { train_fraction, .. } => {
                if !(train_fraction > 0.0 && train_fraction < 1.0) {
                    return Err(SplitError::InvalidPolicy(format!(
                        "train fraction must be in (0, 1), got {train_fraction}"
                    )));
                }
                if row_count == 0 {
                    return Err(SplitError::InvalidPolicy(
                        "cannot split an empty dataset".to_string(),
                    ));
                }
                Ok(1)
            }
        }
    }

    /// Whether the policy is leave-one-out for a dataset of `row_count` rows.
    pub fn is_leave_one_out(&self, row_count: usize) -> bool {
        match *self {
            Self::KFold { folds, .. } => folds < MIN_FOLDS || folds == row_count,
            Self::RandomSplit { .. } => false,
        }
    }
}

/// Construction parameters shared by every split policy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Seed for the generator's random stream.
    pub seed: Seed,
    /// Shuffle the base ordering (and k-fold training rows). `false` keeps source order
    /// and consumes no random draws at all.
    pub randomize: bool,
    /// Produce read-only views instead of copies.
    pub use_view: bool,
    /// Relation name template (see `naming`).
    pub relation_template: String,
    /// Allow a random split to leave the train or test side empty.
    pub allow_empty_partitions: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            randomize: true,
            use_view: false,
            relation_template: DEFAULT_RELATION_TEMPLATE.to_string(),
            allow_empty_partitions: false,
        }
    }
}
