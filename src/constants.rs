/// Constants used by relation naming templates.
pub mod naming {
    /// Placeholder replaced by the source relation name.
    pub const PLACEHOLDER_RELATION: &str = "@";
    /// Placeholder replaced by the train/test marker.
    pub const PLACEHOLDER_KIND: &str = "$T";
    /// Placeholder replaced by the 1-based fold number.
    pub const PLACEHOLDER_FOLD: &str = "$N";
    /// Marker substituted for `$T` on training partitions.
    pub const TRAIN_MARKER: &str = "train";
    /// Marker substituted for `$T` on test partitions.
    pub const TEST_MARKER: &str = "test";
    /// Template applied when the caller does not provide one (`iris` -> `iris-train-3`).
    pub const DEFAULT_RELATION_TEMPLATE: &str = "@-$T-$N";
}

/// Constants used by split generator defaults.
pub mod generator {
    /// Seed used by `GeneratorConfig::default()`.
    pub const DEFAULT_SEED: i64 = 1;
    /// Fold count used by `SplitPolicy::default()`.
    pub const DEFAULT_FOLDS: usize = 10;
    /// Smallest fold count accepted before falling back to leave-one-out.
    pub const MIN_FOLDS: usize = 2;
}

/// Constants used by the deterministic random stream.
pub mod rng {
    /// SplitMix64 state increment (golden ratio).
    pub const SPLITMIX_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;
    /// First SplitMix64 output mixing multiplier.
    pub const SPLITMIX_MIX_1: u64 = 0xBF58_476D_1CE4_E5B9;
    /// Second SplitMix64 output mixing multiplier.
    pub const SPLITMIX_MIX_2: u64 = 0x94D0_49BB_1331_11EB;
}
