use serde::{Deserialize, Serialize};

use crate::core::{ComponentId, GenreId, HardwareProfile};
use crate::error::{GameFitError, Result};

/// Loosely typed scalar as it arrives from forms and JSON clients
#[derive(Deserialize)]
#[serde(untagged)]
enum LooseValue {
    Int(i64),
    Float(f64),
    String(String),
    Null,
}

/// Deserialize an optional id from int, numeric string, empty string or null.
/// `0` and empty strings mean "not provided".
fn deserialize_optional_id<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    let id = match LooseValue::deserialize(deserializer)? {
        LooseValue::Int(i) => i,
        LooseValue::Float(f) if f.fract() == 0.0 && f.is_finite() => f as i64,
        LooseValue::Float(f) => return Err(Error::custom(format!("Invalid id: {}", f))),
        LooseValue::String(s) if s.trim().is_empty() => return Ok(None),
        LooseValue::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| Error::custom(format!("Invalid id string: {}", s)))?,
        LooseValue::Null => return Ok(None),
    };

    match id {
        0 => Ok(None),
        i if i < 0 => Err(Error::custom(format!("Invalid id: {}", i))),
        i => Ok(Some(i)),
    }
}

/// Deserialize an optional number from int, float, numeric string, empty string or null
fn deserialize_optional_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    match LooseValue::deserialize(deserializer)? {
        LooseValue::Int(i) => Ok(Some(i as f64)),
        LooseValue::Float(f) => Ok(Some(f)),
        LooseValue::String(s) if s.trim().is_empty() => Ok(None),
        LooseValue::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| Error::custom(format!("Invalid number string: {}", s))),
        LooseValue::Null => Ok(None),
    }
}

/// Match parameters as received at the boundary, before validation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRequest {
    #[serde(default, alias = "cpu_id", deserialize_with = "deserialize_optional_id")]
    pub cpu_id: Option<ComponentId>,

    #[serde(default, alias = "gpu_id", deserialize_with = "deserialize_optional_id")]
    pub gpu_id: Option<ComponentId>,

    /// System memory in GB
    #[serde(default, deserialize_with = "deserialize_optional_number")]
    pub ram: Option<f64>,

    /// Video memory in MB
    #[serde(default, deserialize_with = "deserialize_optional_number")]
    pub vram: Option<f64>,

    #[serde(
        default,
        alias = "min_performance_ratio",
        deserialize_with = "deserialize_optional_number"
    )]
    pub min_performance_ratio: Option<f64>,

    #[serde(default, alias = "genre_id", deserialize_with = "deserialize_optional_id")]
    pub genre_id: Option<GenreId>,
}

/// Optional filters applied on top of a stored hardware profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchFilters {
    #[serde(
        default,
        alias = "min_performance_ratio",
        deserialize_with = "deserialize_optional_number"
    )]
    pub min_performance_ratio: Option<f64>,

    #[serde(default, alias = "genre_id", deserialize_with = "deserialize_optional_id")]
    pub genre_id: Option<GenreId>,
}

/// Validated match parameters. Only obtainable through `MatchRequest::validate`.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchInput {
    cpu_id: Option<ComponentId>,
    gpu_id: Option<ComponentId>,
    ram: f64,
    vram: f64,
    min_performance_ratio: f64,
    genre_id: Option<GenreId>,
}

impl MatchRequest {
    pub fn new(ram: f64, vram: f64) -> Self {
        Self {
            ram: Some(ram),
            vram: Some(vram),
            ..Default::default()
        }
    }

    /// Build a request from a stored profile plus per-query filters
    pub fn from_profile(profile: &HardwareProfile, filters: &MatchFilters) -> Self {
        Self {
            cpu_id: Some(profile.cpu_id),
            gpu_id: Some(profile.gpu_id),
            ram: Some(profile.ram),
            vram: Some(profile.vram),
            min_performance_ratio: filters.min_performance_ratio,
            genre_id: filters.genre_id,
        }
    }

    pub fn with_cpu(mut self, cpu_id: ComponentId) -> Self {
        self.cpu_id = Some(cpu_id);
        self
    }

    pub fn with_gpu(mut self, gpu_id: ComponentId) -> Self {
        self.gpu_id = Some(gpu_id);
        self
    }

    pub fn with_min_performance_ratio(mut self, ratio: f64) -> Self {
        self.min_performance_ratio = Some(ratio);
        self
    }

    pub fn with_genre(mut self, genre_id: GenreId) -> Self {
        self.genre_id = Some(genre_id);
        self
    }

    /// Reject malformed parameters before any catalog work happens
    pub fn validate(&self) -> Result<MatchInput> {
        let ram = require_amount("ram", self.ram)?;
        let vram = require_amount("vram", self.vram)?;

        let min_performance_ratio = match self.min_performance_ratio {
            None => 0.0,
            Some(r) if r.is_finite() && r >= 0.0 => r,
            Some(r) => {
                return Err(GameFitError::invalid_input(format!(
                    "minPerformanceRatio must be a non-negative number, got {}",
                    r
                )))
            }
        };

        Ok(MatchInput {
            cpu_id: self.cpu_id,
            gpu_id: self.gpu_id,
            ram,
            vram,
            min_performance_ratio,
            genre_id: self.genre_id,
        })
    }
}

fn require_amount(field: &str, value: Option<f64>) -> Result<f64> {
    match value {
        None => Err(GameFitError::invalid_input(format!("{} is required", field))),
        Some(v) if !v.is_finite() || v < 0.0 => Err(GameFitError::invalid_input(format!(
            "{} must be a non-negative number, got {}",
            field, v
        ))),
        Some(v) => Ok(v),
    }
}

impl MatchInput {
    pub fn cpu_id(&self) -> Option<ComponentId> {
        self.cpu_id
    }

    pub fn gpu_id(&self) -> Option<ComponentId> {
        self.gpu_id
    }

    pub fn ram(&self) -> f64 {
        self.ram
    }

    pub fn vram(&self) -> f64 {
        self.vram
    }

    pub fn min_performance_ratio(&self) -> f64 {
        self.min_performance_ratio
    }

    pub fn genre_id(&self) -> Option<GenreId> {
        self.genre_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_normalized_from_loose_json() {
        let req: MatchRequest = serde_json::from_str(
            r#"{"cpuId": "12", "gpuId": 7, "ram": "16", "vram": 4096, "genreId": ""}"#,
        )
        .unwrap();

        assert_eq!(req.cpu_id, Some(12));
        assert_eq!(req.gpu_id, Some(7));
        assert_eq!(req.ram, Some(16.0));
        assert_eq!(req.vram, Some(4096.0));
        assert_eq!(req.genre_id, None);
    }

    #[test]
    fn test_zero_and_null_ids_are_absent() {
        let req: MatchRequest =
            serde_json::from_str(r#"{"cpuId": 0, "gpuId": null, "ram": 8, "vram": 2048}"#).unwrap();
        assert_eq!(req.cpu_id, None);
        assert_eq!(req.gpu_id, None);
    }

    #[test]
    fn test_snake_case_aliases() {
        let req: MatchRequest = serde_json::from_str(
            r#"{"cpu_id": 3, "ram": 8, "vram": 2048, "min_performance_ratio": 0.8}"#,
        )
        .unwrap();
        assert_eq!(req.cpu_id, Some(3));
        assert_eq!(req.min_performance_ratio, Some(0.8));
    }

    #[test]
    fn test_garbage_id_rejected() {
        assert!(serde_json::from_str::<MatchRequest>(r#"{"cpuId": "abc", "ram": 8, "vram": 1}"#).is_err());
        assert!(serde_json::from_str::<MatchRequest>(r#"{"cpuId": -4, "ram": 8, "vram": 1}"#).is_err());
        assert!(serde_json::from_str::<MatchRequest>(r#"{"cpuId": 1.5, "ram": 8, "vram": 1}"#).is_err());
    }

    #[test]
    fn test_validate_requires_memory() {
        let missing_ram = MatchRequest { vram: Some(1024.0), ..Default::default() };
        assert!(matches!(missing_ram.validate(), Err(GameFitError::InvalidInput(_))));

        let missing_vram = MatchRequest { ram: Some(8.0), ..Default::default() };
        assert!(matches!(missing_vram.validate(), Err(GameFitError::InvalidInput(_))));
    }

    #[test]
    fn test_validate_rejects_negative_values() {
        assert!(MatchRequest::new(-1.0, 1024.0).validate().is_err());
        assert!(MatchRequest::new(8.0, -1.0).validate().is_err());
        assert!(MatchRequest::new(8.0, f64::NAN).validate().is_err());
        assert!(MatchRequest::new(8.0, 1024.0)
            .with_min_performance_ratio(-0.1)
            .validate()
            .is_err());
    }

    #[test]
    fn test_validate_defaults() {
        let input = MatchRequest::new(0.0, 0.0).validate().unwrap();
        assert_eq!(input.ram(), 0.0);
        assert_eq!(input.min_performance_ratio(), 0.0);
        assert_eq!(input.cpu_id(), None);
        assert_eq!(input.genre_id(), None);
    }

    #[test]
    fn test_from_profile() {
        let profile = HardwareProfile::new(1, 10, 20, 16.0, 8192.0);
        let filters = MatchFilters { min_performance_ratio: Some(0.8), genre_id: Some(2) };
        let input = MatchRequest::from_profile(&profile, &filters).validate().unwrap();

        assert_eq!(input.cpu_id(), Some(10));
        assert_eq!(input.gpu_id(), Some(20));
        assert_eq!(input.vram(), 8192.0);
        assert_eq!(input.min_performance_ratio(), 0.8);
        assert_eq!(input.genre_id(), Some(2));
    }
}
