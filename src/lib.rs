#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Generator configuration and split policies.
pub mod config;
/// Centralized constants for naming templates, generator defaults, and the RNG.
pub mod constants;
/// Dataset contract, in-memory tables, views, and materialization.
pub mod dataset;
/// Split generator state machine and produced split records.
pub mod generator;
/// Relation name templates.
pub mod naming;
/// Contiguous fold boundaries.
pub mod partition;
/// Deterministic random stream with explicit draw accounting.
pub mod rng;
/// Label-aware fold reordering.
pub mod stratify;
/// Shared type aliases.
pub mod types;

mod errors;

pub use config::{GeneratorConfig, SplitPolicy};
pub use dataset::{
    Attribute, AttributeKind, Dataset, DatasetView, RowRef, SplitDataset, Table, Value,
    materialize,
};
pub use errors::SplitError;
pub use generator::{GeneratorCheckpoint, SplitGenerator, TrainTestSplit};
pub use naming::relation_name;
pub use partition::{FoldBounds, fold_bounds, fold_sizes};
pub use rng::{RandomSequenceSource, SplitMix64};
pub use stratify::stratify;
pub use types::{CategoryIndex, FoldNumber, RelationName, RowIndex, Seed};
