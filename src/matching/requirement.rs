use crate::catalog::CatalogSnapshot;
use crate::core::{Component, ComponentId, ComponentKind, RequirementSet};
use crate::error::{GameFitError, Result};
use crate::matching::score::{benchmark_ratio, memory_ratio, ResourceRatios};
use crate::matching::stats::MinimumMiss;

/// The user's side of the comparison, with CPU/GPU resolved to benchmark scores
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UserHardware {
    /// `None` when the caller left the CPU out; it is then a non-factor
    pub cpu_score: Option<u32>,
    pub gpu_score: Option<u32>,
    pub ram: f64,
    pub vram: f64,
}

/// A requirement set whose four component references resolved against the snapshot
#[derive(Debug, Clone, Copy)]
pub struct ResolvedRequirement<'a> {
    pub set: &'a RequirementSet,
    pub min_cpu: &'a Component,
    pub min_gpu: &'a Component,
    pub rec_cpu: &'a Component,
    pub rec_gpu: &'a Component,
}

impl<'a> ResolvedRequirement<'a> {
    /// Resolve and sanity-check a requirement set. Any failure is a `DataIntegrity` error.
    pub fn resolve(set: &'a RequirementSet, catalog: &'a CatalogSnapshot) -> Result<Self> {
        let integrity = |message: String| GameFitError::DataIntegrity {
            game_id: set.game_id,
            requirement_id: set.id,
            message,
        };

        let lookup = |label: &str, id: ComponentId, kind: ComponentKind| -> Result<&'a Component> {
            let component = catalog
                .component(id)
                .ok_or_else(|| integrity(format!("{} {} not found", label, id)))?;
            if component.kind != kind {
                return Err(integrity(format!(
                    "{} {} is a {}, expected {}",
                    label, id, component.kind, kind
                )));
            }
            if component.benchmark_score == 0 {
                return Err(integrity(format!("{} {} has a zero benchmark score", label, id)));
            }
            Ok(component)
        };

        let min_cpu = lookup("minimum CPU", set.min_cpu_id, ComponentKind::Cpu)?;
        let min_gpu = lookup("minimum GPU", set.min_gpu_id, ComponentKind::Gpu)?;
        let rec_cpu = lookup("recommended CPU", set.rec_cpu_id, ComponentKind::Cpu)?;
        let rec_gpu = lookup("recommended GPU", set.rec_gpu_id, ComponentKind::Gpu)?;

        for (label, value) in [("minRam", set.min_ram), ("minVram", set.min_vram)] {
            if !value.is_finite() || value < 0.0 {
                return Err(integrity(format!("{} is {}", label, value)));
            }
        }
        for (label, value) in [("recRam", set.rec_ram), ("recVram", set.rec_vram)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(integrity(format!("{} is {}", label, value)));
            }
        }

        Ok(Self {
            set,
            min_cpu,
            min_gpu,
            rec_cpu,
            rec_gpu,
        })
    }

    /// Minimum-tier gate. Checked in RAM, VRAM, CPU, GPU order; the first miss is reported.
    pub fn check_minimum(&self, user: &UserHardware) -> std::result::Result<(), MinimumMiss> {
        if user.ram < self.set.min_ram {
            return Err(MinimumMiss::Ram);
        }
        if user.vram < self.set.min_vram {
            return Err(MinimumMiss::Vram);
        }
        if let Some(cpu) = user.cpu_score {
            if cpu < self.min_cpu.benchmark_score {
                return Err(MinimumMiss::Cpu);
            }
        }
        if let Some(gpu) = user.gpu_score {
            if gpu < self.min_gpu.benchmark_score {
                return Err(MinimumMiss::Gpu);
            }
        }
        Ok(())
    }

    /// Ratios against the recommended tier
    pub fn ratios(&self, user: &UserHardware) -> ResourceRatios {
        ResourceRatios {
            cpu: benchmark_ratio(user.cpu_score, self.rec_cpu.benchmark_score),
            gpu: benchmark_ratio(user.gpu_score, self.rec_gpu.benchmark_score),
            ram: memory_ratio(user.ram, self.set.rec_ram),
            vram: memory_ratio(user.vram, self.set.rec_vram),
        }
    }
}
