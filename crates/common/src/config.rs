use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::types::Domain;

/// One mesh size tier: objects up to `max_object_size` (bounding-sphere
/// diameter) are culled at `culling_distance`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierConfig {
    pub max_object_size: f32,
    pub culling_distance: f32,
}

/// Errors raised by configuration validation. All of these are fatal: the
/// subsystem refuses to initialize with a broken configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("tier {field} must strictly increase small -> medium -> large")]
    NonMonotonicTiers { field: &'static str },
    #[error("{field} must be positive and finite, got {value}")]
    NonPositive { field: &'static str, value: f32 },
    #[error("budget fraction must be in (0, 1], got {0}")]
    BadBudgetFraction(f32),
}

/// Startup configuration for the culling subsystem, supplied once by an
/// external loader. Validated fail-fast via [`CullConfig::validate`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CullConfig {
    pub small: TierConfig,
    pub medium: TierConfig,
    pub large: TierConfig,
    /// Culling distance for NPCs.
    pub npc_distance: f32,
    /// Culling distance for ambient sound emitters.
    pub sound_distance: f32,
    /// Grace period after a manipulated object is released before it becomes
    /// a settle candidate.
    pub settle_delay: Duration,
    /// Velocity magnitude at or below which a released object counts as
    /// settled. Never compared against exact zero.
    pub settle_epsilon: f32,
    /// Fraction of the frame interval the realization drain may consume.
    pub budget_fraction: f32,
    /// Frame rate assumed when the host supplies no usable hint.
    pub fallback_frame_rate: f32,
    /// Per-domain enable flags, indexed by `Domain::index()`. Disabled
    /// domains still accept registrations but are skipped by evaluation.
    pub enabled: [bool; Domain::COUNT],
}

impl Default for CullConfig {
    fn default() -> Self {
        Self {
            small: TierConfig {
                max_object_size: 0.2,
                culling_distance: 50.0,
            },
            medium: TierConfig {
                max_object_size: 5.0,
                culling_distance: 100.0,
            },
            large: TierConfig {
                max_object_size: 100.0,
                culling_distance: 200.0,
            },
            npc_distance: 120.0,
            sound_distance: 60.0,
            settle_delay: Duration::from_secs(1),
            settle_epsilon: 1e-3,
            budget_fraction: 0.5,
            fallback_frame_rate: 60.0,
            enabled: [true; Domain::COUNT],
        }
    }
}

impl CullConfig {
    /// Validate the configuration. Non-monotonic tier thresholds or
    /// non-positive distances refuse to initialize.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |field: &'static str, value: f32| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::NonPositive { field, value })
            }
        };
        positive("small.max_object_size", self.small.max_object_size)?;
        positive("small.culling_distance", self.small.culling_distance)?;
        positive("medium.max_object_size", self.medium.max_object_size)?;
        positive("medium.culling_distance", self.medium.culling_distance)?;
        positive("large.max_object_size", self.large.max_object_size)?;
        positive("large.culling_distance", self.large.culling_distance)?;
        positive("npc_distance", self.npc_distance)?;
        positive("sound_distance", self.sound_distance)?;
        positive("fallback_frame_rate", self.fallback_frame_rate)?;
        if !(self.settle_epsilon.is_finite() && self.settle_epsilon >= 0.0) {
            return Err(ConfigError::NonPositive {
                field: "settle_epsilon",
                value: self.settle_epsilon,
            });
        }
        if !(self.budget_fraction.is_finite()
            && self.budget_fraction > 0.0
            && self.budget_fraction <= 1.0)
        {
            return Err(ConfigError::BadBudgetFraction(self.budget_fraction));
        }
        if !(self.small.max_object_size < self.medium.max_object_size
            && self.medium.max_object_size < self.large.max_object_size)
        {
            return Err(ConfigError::NonMonotonicTiers {
                field: "max_object_size",
            });
        }
        if !(self.small.culling_distance < self.medium.culling_distance
            && self.medium.culling_distance < self.large.culling_distance)
        {
            return Err(ConfigError::NonMonotonicTiers {
                field: "culling_distance",
            });
        }
        Ok(())
    }

    /// Classify a static mesh by bounding-sphere diameter into a size tier.
    /// Oversized meshes fall into the large tier rather than being rejected.
    pub fn classify_mesh(&self, diameter: f32) -> Domain {
        if diameter <= self.small.max_object_size {
            Domain::SmallMesh
        } else if diameter <= self.medium.max_object_size {
            Domain::MediumMesh
        } else {
            Domain::LargeMesh
        }
    }

    /// Near/far distance threshold for a domain.
    pub fn threshold(&self, domain: Domain) -> f32 {
        match domain {
            Domain::SmallMesh => self.small.culling_distance,
            Domain::MediumMesh => self.medium.culling_distance,
            Domain::LargeMesh => self.large.culling_distance,
            Domain::Npc => self.npc_distance,
            Domain::Sound => self.sound_distance,
        }
    }

    /// Whether a domain participates in evaluation and dispatch.
    pub fn is_enabled(&self, domain: Domain) -> bool {
        self.enabled[domain.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(CullConfig::default().validate().is_ok());
    }

    #[test]
    fn non_monotonic_sizes_rejected() {
        let mut config = CullConfig::default();
        config.medium.max_object_size = 0.1; // below small tier
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonMonotonicTiers {
                field: "max_object_size"
            })
        ));
    }

    #[test]
    fn non_monotonic_distances_rejected() {
        let mut config = CullConfig::default();
        config.large.culling_distance = 90.0; // below medium tier
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonMonotonicTiers {
                field: "culling_distance"
            })
        ));
    }

    #[test]
    fn negative_distance_rejected() {
        let mut config = CullConfig::default();
        config.npc_distance = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn bad_fraction_rejected() {
        let mut config = CullConfig::default();
        config.budget_fraction = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BadBudgetFraction(_))
        ));
        config.budget_fraction = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn classify_by_diameter() {
        let config = CullConfig::default();
        assert_eq!(config.classify_mesh(0.1), Domain::SmallMesh);
        // Spec scenario: diameter 0.3 lands in the medium tier.
        assert_eq!(config.classify_mesh(0.3), Domain::MediumMesh);
        assert_eq!(config.classify_mesh(50.0), Domain::LargeMesh);
        // Oversized meshes clamp into the large tier.
        assert_eq!(config.classify_mesh(500.0), Domain::LargeMesh);
    }

    #[test]
    fn thresholds_per_domain() {
        let config = CullConfig::default();
        assert_eq!(config.threshold(Domain::SmallMesh), 50.0);
        assert_eq!(config.threshold(Domain::MediumMesh), 100.0);
        assert_eq!(config.threshold(Domain::LargeMesh), 200.0);
        assert_eq!(config.threshold(Domain::Npc), 120.0);
        assert_eq!(config.threshold(Domain::Sound), 60.0);
    }

    #[test]
    fn disabled_domain_flag() {
        let mut config = CullConfig::default();
        config.enabled[Domain::Sound.index()] = false;
        assert!(!config.is_enabled(Domain::Sound));
        assert!(config.is_enabled(Domain::Npc));
    }
}
