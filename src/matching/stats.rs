use serde::{Deserialize, Serialize};

/// Which minimum-tier gate rejected a requirement set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinimumMiss {
    Ram,
    Vram,
    Cpu,
    Gpu,
}

/// Counters collected during one evaluation, returned next to the results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchStats {
    pub games_considered: usize,
    pub filtered_by_genre: usize,
    pub requirement_sets_evaluated: usize,
    pub filtered_by_ram: usize,
    pub filtered_by_vram: usize,
    pub filtered_by_cpu: usize,
    pub filtered_by_gpu: usize,
    pub passed_minimum: usize,
    pub below_performance_floor: usize,
    pub integrity_errors: usize,
    pub games_matched: usize,
}

impl MatchStats {
    pub fn record_miss(&mut self, miss: MinimumMiss) {
        match miss {
            MinimumMiss::Ram => self.filtered_by_ram += 1,
            MinimumMiss::Vram => self.filtered_by_vram += 1,
            MinimumMiss::Cpu => self.filtered_by_cpu += 1,
            MinimumMiss::Gpu => self.filtered_by_gpu += 1,
        }
    }

    /// Requirement sets rejected by any minimum-tier gate
    pub fn filtered_by_minimum(&self) -> usize {
        self.filtered_by_ram + self.filtered_by_vram + self.filtered_by_cpu + self.filtered_by_gpu
    }

    /// Get display string for logging
    pub fn summary(&self) -> String {
        format!(
            "{}/{} games matched; sets: {} evaluated, {} passed minimum, {} below floor; {} below minimum (CPU {}, GPU {}, RAM {}, VRAM {}); filtered by genre {}; {} integrity errors",
            self.games_matched,
            self.games_considered,
            self.requirement_sets_evaluated,
            self.passed_minimum,
            self.below_performance_floor,
            self.filtered_by_minimum(),
            self.filtered_by_cpu,
            self.filtered_by_gpu,
            self.filtered_by_ram,
            self.filtered_by_vram,
            self.filtered_by_genre,
            self.integrity_errors,
        )
    }
}
