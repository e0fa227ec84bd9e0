use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::ComponentId;
use crate::error::GameFitError;

/// Hardware component kind. Benchmark scores are only comparable within a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ComponentKind {
    Cpu,
    Gpu,
}

impl ComponentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Cpu => "CPU",
            ComponentKind::Gpu => "GPU",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentKind {
    type Err = GameFitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CPU" => Ok(ComponentKind::Cpu),
            "GPU" => Ok(ComponentKind::Gpu),
            other => Err(GameFitError::invalid_input(format!(
                "Unknown component kind: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manufacturer {
    pub id: i64,
    pub name: String,
}

/// A CPU or GPU with its benchmark score (higher = faster)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub id: ComponentId,
    pub name: String,
    pub kind: ComponentKind,
    pub manufacturer_id: i64,
    #[serde(default)]
    pub manufacturer: String,
    pub benchmark_score: u32,
}

impl Component {
    pub fn new(id: ComponentId, name: impl Into<String>, kind: ComponentKind, benchmark_score: u32) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            manufacturer_id: 0,
            manufacturer: String::new(),
            benchmark_score,
        }
    }

    pub fn is_cpu(&self) -> bool {
        self.kind == ComponentKind::Cpu
    }

    pub fn is_gpu(&self) -> bool {
        self.kind == ComponentKind::Gpu
    }

    /// Get display name (for logging/UI)
    pub fn display_name(&self) -> String {
        if self.manufacturer.is_empty() {
            format!("{} ({})", self.name, self.benchmark_score)
        } else {
            format!("{} {} ({})", self.manufacturer, self.name, self.benchmark_score)
        }
    }
}
