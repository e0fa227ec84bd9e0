use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{ComponentId, UserId};

/// A user's declared hardware. At most one per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardwareProfile {
    pub user_id: UserId,
    pub cpu_id: ComponentId,
    pub gpu_id: ComponentId,
    /// System memory in GB
    pub ram: f64,
    /// Video memory in MB
    pub vram: f64,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl HardwareProfile {
    pub fn new(user_id: UserId, cpu_id: ComponentId, gpu_id: ComponentId, ram: f64, vram: f64) -> Self {
        Self {
            user_id,
            cpu_id,
            gpu_id,
            ram,
            vram,
            updated_at: Utc::now(),
        }
    }
}
