//! Town configuration and builder
//!
//! A town is a pure function of its configuration: the same config always
//! produces the same patches, walls, streets and wards.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, TownError};

/// Smallest town the generator can lay out
pub const MIN_PATCHES: usize = 2;
/// Largest supported number of inner patches
pub const MAX_PATCHES: usize = 100;

/// Town size presets
///
/// Each preset maps to the number of inner (city) patches.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TownSize {
    /// 6 patches
    SmallTown,
    /// 10 patches
    LargeTown,
    /// 15 patches (default)
    #[default]
    SmallCity,
    /// 24 patches
    LargeCity,
    /// 40 patches
    Metropolis,
    /// Custom number of patches
    Custom(usize),
}

impl TownSize {
    /// Number of inner patches for this size
    pub fn patch_count(self) -> usize {
        match self {
            TownSize::SmallTown => 6,
            TownSize::LargeTown => 10,
            TownSize::SmallCity => 15,
            TownSize::LargeCity => 24,
            TownSize::Metropolis => 40,
            TownSize::Custom(n) => n,
        }
    }

    /// Human-readable name
    pub fn name(self) -> &'static str {
        match self {
            TownSize::SmallTown => "Small Town",
            TownSize::LargeTown => "Large Town",
            TownSize::SmallCity => "Small City",
            TownSize::LargeCity => "Large City",
            TownSize::Metropolis => "Metropolis",
            TownSize::Custom(_) => "Custom",
        }
    }
}

/// Configuration for deterministic town generation
///
/// Flags left as `None` are decided by the seeded random stream when the town
/// is generated, so they are still reproducible.
///
/// # Example
///
/// ```rust
/// use rust_voronoi_town::*;
///
/// let config = TownConfigBuilder::new()
///     .seed(42)
///     .size(TownSize::SmallCity)
///     .walls(true)
///     .build()
///     .unwrap();
/// assert_eq!(config.patch_count, 15);
///
/// # #[cfg(feature = "serde")]
/// # {
/// let json = serde_json::to_string(&config).unwrap();
/// let restored: TownConfig = serde_json::from_str(&json).unwrap();
/// assert_eq!(config, restored);
/// # }
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TownConfig {
    /// Number of inner patches
    pub patch_count: usize,

    /// Random seed; the whole layout derives from it
    pub seed: u64,

    /// Put a market square in the central patch
    pub plaza: Option<bool>,

    /// Build a walled castle next to the town
    pub citadel: Option<bool>,

    /// Surround the town with a curtain wall
    pub walls: Option<bool>,

    /// Layouts tried before giving up
    ///
    /// Some random layouts cannot be built (a wall without a usable gate, a
    /// citadel that is too elongated). Each rejected attempt continues the
    /// same random stream.
    pub max_attempts: usize,
}

impl TownConfig {
    /// Smallest patch count that supports the explicitly enabled features
    pub fn min_patch_count(&self) -> usize {
        min_patch_count(
            self.plaza.unwrap_or(false),
            self.citadel.unwrap_or(false),
            self.walls.unwrap_or(false),
        )
    }
}

/// Patches needed for a feature combination
pub(crate) fn min_patch_count(plaza: bool, citadel: bool, walls: bool) -> usize {
    MIN_PATCHES + if walls { 2 } else { 0 } + usize::from(citadel) + usize::from(plaza)
}

impl Default for TownConfig {
    fn default() -> Self {
        Self {
            patch_count: TownSize::default().patch_count(),
            seed: 0,
            plaza: None,
            citadel: None,
            walls: None,
            max_attempts: 100,
        }
    }
}

/// Builder for [`TownConfig`] with validation
///
/// # Example
///
/// ```rust
/// use rust_voronoi_town::*;
///
/// // Use defaults (random seed, random flags)
/// let config = TownConfigBuilder::new().build().unwrap();
///
/// // Customise
/// let config = TownConfigBuilder::new()
///     .seed(12345)
///     .patch_count(8)
///     .unwrap()
///     .plaza(true)
///     .citadel(false)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct TownConfigBuilder {
    seed: Option<u64>,
    patch_count: usize,
    plaza: Option<bool>,
    citadel: Option<bool>,
    walls: Option<bool>,
    max_attempts: usize,
}

impl TownConfigBuilder {
    /// Create a new builder
    ///
    /// Defaults:
    /// - seed: random
    /// - size: SmallCity (15 patches)
    /// - plaza, citadel, walls: decided by the seed
    /// - max_attempts: 100
    pub fn new() -> Self {
        Self {
            seed: None,
            patch_count: TownSize::default().patch_count(),
            plaza: None,
            citadel: None,
            walls: None,
            max_attempts: 100,
        }
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Use a size preset
    pub fn size(mut self, size: TownSize) -> Self {
        self.patch_count = size.patch_count();
        self
    }

    /// Set the number of inner patches directly
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` outside `2..=100`
    pub fn patch_count(mut self, count: usize) -> Result<Self> {
        if !(MIN_PATCHES..=MAX_PATCHES).contains(&count) {
            return Err(TownError::InvalidConfig(format!(
                "patch count must be in {}..={} (got {})",
                MIN_PATCHES, MAX_PATCHES, count
            )));
        }
        self.patch_count = count;
        Ok(self)
    }

    pub fn plaza(mut self, plaza: bool) -> Self {
        self.plaza = Some(plaza);
        self
    }

    pub fn citadel(mut self, citadel: bool) -> Self {
        self.citadel = Some(citadel);
        self
    }

    pub fn walls(mut self, walls: bool) -> Self {
        self.walls = Some(walls);
        self
    }

    /// Set how many layouts may be rejected before generation fails
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` outside `1..=1000`
    pub fn max_attempts(mut self, attempts: usize) -> Result<Self> {
        if !(1..=1000).contains(&attempts) {
            return Err(TownError::InvalidConfig(format!(
                "max attempts must be in 1..=1000 (got {})",
                attempts
            )));
        }
        self.max_attempts = attempts;
        Ok(self)
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` when the patch count is out of range or too
    /// small for the explicitly enabled features.
    pub fn build(self) -> Result<TownConfig> {
        let config = TownConfig {
            patch_count: self.patch_count,
            seed: self.seed.unwrap_or_else(rand::random),
            plaza: self.plaza,
            citadel: self.citadel,
            walls: self.walls,
            max_attempts: self.max_attempts,
        };
        validate(&config)?;
        Ok(config)
    }
}

impl Default for TownConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Check a configuration that may not have come through the builder
pub(crate) fn validate(config: &TownConfig) -> Result<()> {
    if config.patch_count > MAX_PATCHES {
        return Err(TownError::InvalidConfig(format!(
            "patch count must be at most {} (got {})",
            MAX_PATCHES, config.patch_count
        )));
    }
    let needed = config.min_patch_count();
    if config.patch_count < needed {
        return Err(TownError::InvalidConfig(format!(
            "{} patches cannot hold the requested features (need {})",
            config.patch_count, needed
        )));
    }
    if config.max_attempts == 0 {
        return Err(TownError::InvalidConfig("max attempts must be positive".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_town_size_patch_counts() {
        assert_eq!(TownSize::SmallTown.patch_count(), 6);
        assert_eq!(TownSize::LargeTown.patch_count(), 10);
        assert_eq!(TownSize::SmallCity.patch_count(), 15);
        assert_eq!(TownSize::LargeCity.patch_count(), 24);
        assert_eq!(TownSize::Metropolis.patch_count(), 40);
        assert_eq!(TownSize::Custom(33).patch_count(), 33);
        assert_eq!(TownSize::Custom(33).name(), "Custom");
    }

    #[test]
    fn test_builder_defaults() {
        let config = TownConfigBuilder::new().build().unwrap();
        assert_eq!(config.patch_count, 15);
        assert_eq!(config.plaza, None);
        assert_eq!(config.citadel, None);
        assert_eq!(config.walls, None);
        assert_eq!(config.max_attempts, 100);
    }

    #[test]
    fn test_builder_custom() {
        let config = TownConfigBuilder::new()
            .seed(42)
            .size(TownSize::LargeTown)
            .plaza(true)
            .walls(false)
            .max_attempts(5)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(config.seed, 42);
        assert_eq!(config.patch_count, 10);
        assert_eq!(config.plaza, Some(true));
        assert_eq!(config.walls, Some(false));
        assert_eq!(config.max_attempts, 5);
    }

    #[test]
    fn test_patch_count_range() {
        assert!(TownConfigBuilder::new().patch_count(1).is_err());
        assert!(TownConfigBuilder::new().patch_count(101).is_err());
        assert!(TownConfigBuilder::new().patch_count(2).is_ok());
    }

    #[test]
    fn test_feature_minimums() {
        let result = TownConfigBuilder::new()
            .patch_count(5)
            .unwrap()
            .walls(true)
            .citadel(true)
            .plaza(true)
            .build();
        assert!(matches!(result, Err(TownError::InvalidConfig(_))));

        let config = TownConfigBuilder::new()
            .patch_count(6)
            .unwrap()
            .walls(true)
            .citadel(true)
            .plaza(true)
            .build();
        assert!(config.is_ok());

        // unresolved flags do not count
        assert!(TownConfigBuilder::new().patch_count(2).unwrap().build().is_ok());
    }

    #[test]
    fn test_max_attempts_range() {
        assert!(TownConfigBuilder::new().max_attempts(0).is_err());
        assert!(TownConfigBuilder::new().max_attempts(1001).is_err());
    }

    #[test]
    fn test_validate_hand_built_config() {
        let config = TownConfig {
            patch_count: 3,
            walls: Some(true),
            ..Default::default()
        };
        assert!(validate(&config).is_err());
        assert!(validate(&TownConfig::default()).is_ok());
    }
}
