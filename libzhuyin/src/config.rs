/// Zhuyin-specific configuration that extends the base `Config` from core.
///
/// This configuration includes:
/// - All generic options from `composer_core::Config` (flattened via serde)
/// - Interchangeable sound pairs applied to phrase lookups
/// - Whether space doubles as the first tone mark
///
/// # Example
///
/// ```rust
/// use libzhuyin::ZhuyinConfig;
///
/// let config = ZhuyinConfig::from_toml_str("interchangeable_pairs = \"ㄣㄥ\"").unwrap();
/// assert_eq!(config.pairs().unwrap().pairs().len(), 1);
/// let base_config = config.into_base();
/// assert_eq!(base_config.max_syllables, 8);
/// ```
use serde::{Deserialize, Serialize};

use crate::bopomofo::BopomofoCodec;
use crate::interchangeable::{InterchangeablePairs, PairsError};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ZhuyinConfig {
    /// Base configuration fields (syllable limit, suggestions, reordering)
    #[serde(flatten)]
    pub base: composer_core::Config,

    /// `2n` Bopomofo sounds; each consecutive two are interchangeable
    pub interchangeable_pairs: String,

    /// Read a space typed after pending symbols as the first tone
    pub space_is_first_tone: bool,
}

impl ZhuyinConfig {
    /// Convert this zhuyin config into the base config for `ImeEngine`
    pub fn into_base(self) -> composer_core::Config {
        self.base
    }

    /// Get a reference to the base config
    pub fn base(&self) -> &composer_core::Config {
        &self.base
    }

    /// Get a mutable reference to the base config
    pub fn base_mut(&mut self) -> &mut composer_core::Config {
        &mut self.base
    }

    /// The Bopomofo codec these options describe.
    pub fn codec(&self) -> BopomofoCodec {
        BopomofoCodec::new().with_space_tone(self.space_is_first_tone)
    }

    /// Parse `interchangeable_pairs`.
    pub fn pairs(&self) -> Result<InterchangeablePairs, PairsError> {
        InterchangeablePairs::parse(&self.interchangeable_pairs)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(
        path: P,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}
