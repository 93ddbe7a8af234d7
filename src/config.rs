use std::ops::RangeInclusive;

/// Engine settings, handed by reference to the search and the evaluator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Transposition table size, in megabytes
    pub hash_mb: usize,
    /// Weight of the material term, in percent
    pub eval_material: i32,
    pub null_move_pruning: bool,
    pub max_depth: u8,
}

impl EngineConfig {
    pub const HASH_MB_RANGE: RangeInclusive<usize> = 1..=65536;
    pub const EVAL_MATERIAL_RANGE: RangeInclusive<i32> = 0..=1000;

    pub fn hash_mb(mut self, hash_mb: usize) -> Self {
        self.hash_mb = hash_mb.clamp(*Self::HASH_MB_RANGE.start(), *Self::HASH_MB_RANGE.end());
        self
    }

    pub fn eval_material(mut self, eval_material: i32) -> Self {
        self.eval_material =
            eval_material.clamp(*Self::EVAL_MATERIAL_RANGE.start(), *Self::EVAL_MATERIAL_RANGE.end());
        self
    }

    pub fn null_move_pruning(mut self, enabled: bool) -> Self {
        self.null_move_pruning = enabled;
        self
    }

    pub fn max_depth(mut self, depth: u8) -> Self {
        self.max_depth = depth.max(1);
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            hash_mb: 16,
            eval_material: 100,
            null_move_pruning: true,
            max_depth: 64,
        }
    }
}
