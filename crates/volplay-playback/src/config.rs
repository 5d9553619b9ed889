//! Player configuration and its versioned JSON file.
//!
//! Uses JSON with a schema version field for forward-compatible persistence.

use serde::{Deserialize, Serialize};
use volplay_core::{defaults, ActiveRange, OutOfRangeMode, Result, VolplayError};
use volplay_media::{BufferingConfig, SourceDescriptor};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Everything the player needs to load and drive one sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub source: SourceDescriptor,
    /// Start playing as soon as the sequence is loaded.
    pub auto_play: bool,
    pub out_of_range: OutOfRangeMode,
    /// When false, playback stops on the last active frame.
    pub looping: bool,
    pub active_range: ActiveRange,
    pub speed_ratio: f32,
    pub geometry_buffers: usize,
    pub texture_buffers: usize,
    pub play_audio: bool,
    pub look_at_max_angle: i32,
    /// Track decoding/updating rates and delay.
    pub collect_stats: bool,
    pub buffering: BufferingConfig,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            source: SourceDescriptor::default(),
            auto_play: true,
            out_of_range: OutOfRangeMode::Loop,
            looping: true,
            active_range: ActiveRange::FULL,
            speed_ratio: 1.0,
            geometry_buffers: defaults::GEOMETRY_BUFFERS,
            texture_buffers: defaults::TEXTURE_BUFFERS,
            play_audio: true,
            look_at_max_angle: defaults::LOOK_AT_MAX_ANGLE,
            collect_stats: false,
            buffering: BufferingConfig::default(),
        }
    }
}

impl PlayerConfig {
    pub fn new(source: SourceDescriptor) -> Self {
        Self {
            source,
            ..Default::default()
        }
    }

    /// Check everything that can be checked before the sequence is opened.
    pub fn validate(&self) -> Result<()> {
        self.source.validate()?;
        ActiveRange::new(self.active_range.first, self.active_range.last)?;
        if !self.speed_ratio.is_finite() || self.speed_ratio <= 0.0 {
            return Err(VolplayError::InvalidParameter(format!(
                "speed ratio must be positive, got {}",
                self.speed_ratio
            )));
        }
        if self.geometry_buffers < 2 || self.texture_buffers < 2 {
            return Err(VolplayError::InvalidParameter(format!(
                "buffer rings need at least 2 slots, got {} geometry and {} texture",
                self.geometry_buffers, self.texture_buffers
            )));
        }
        Ok(())
    }
}

/// Versioned config file wrapper.
#[derive(Debug, Serialize, Deserialize)]
pub struct PlayerConfigFile {
    /// Schema version for migration.
    pub version: u32,
    pub config: PlayerConfig,
    /// Application version that wrote this file.
    pub app_version: String,
}

impl PlayerConfigFile {
    pub fn new(config: PlayerConfig) -> Self {
        Self {
            version: CURRENT_VERSION,
            config,
            app_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Serialize to JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
            .map_err(|e| VolplayError::Serialization(format!("Failed to serialize config: {}", e)))
    }

    /// Deserialize from JSON bytes, applying migrations if needed.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let raw: serde_json::Value = serde_json::from_slice(data)
            .map_err(|e| VolplayError::Serialization(format!("Invalid JSON: {}", e)))?;

        let version = raw.get("version").and_then(|v| v.as_u64()).unwrap_or(0) as u32;
        if version > CURRENT_VERSION {
            return Err(VolplayError::Serialization(format!(
                "Config file version {} is newer than supported version {}",
                version, CURRENT_VERSION
            )));
        }

        let migrated = migrate(raw, version)?;
        serde_json::from_value(migrated)
            .map_err(|e| VolplayError::Serialization(format!("Failed to parse config: {}", e)))
    }

    pub fn save_to_file(&self, path: &std::path::Path) -> Result<()> {
        let data = self.to_json()?;
        std::fs::write(path, data)?;
        Ok(())
    }

    pub fn load_from_file(path: &std::path::Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_json(&data)
    }
}

/// Apply sequential migrations from `from_version` to CURRENT_VERSION.
fn migrate(mut data: serde_json::Value, from_version: u32) -> Result<serde_json::Value> {
    let mut version = from_version;

    while version < CURRENT_VERSION {
        match version {
            0 => {
                // v0 files are a bare config object
                if data.get("version").is_none() {
                    data = serde_json::json!({
                        "version": 1,
                        "config": data,
                        "app_version": "0.1.0",
                    });
                }
                version = 1;
            }
            _ => {
                return Err(VolplayError::Serialization(format!(
                    "No migration path from version {}",
                    version
                )));
            }
        }
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use volplay_media::SourceKind;

    #[test]
    fn test_defaults() {
        let config = PlayerConfig::default();
        assert!(config.auto_play);
        assert!(config.looping);
        assert!(config.play_audio);
        assert_eq!(config.out_of_range, OutOfRangeMode::Loop);
        assert_eq!(config.active_range.last, None);
        assert_eq!(config.geometry_buffers, 2);
        assert_eq!(config.look_at_max_angle, 90);
        assert_eq!(config.buffering.chunk_buffer_max, 180);
        assert_eq!(config.buffering.http_cache_size, 1_000_000_000);
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = PlayerConfig::new(SourceDescriptor::network("https://cdn/clip.4ds"));
        config.active_range = ActiveRange::new(10, Some(20)).unwrap();
        config.out_of_range = OutOfRangeMode::Reverse;
        let file = PlayerConfigFile::new(config.clone());

        let json = file.to_json().unwrap();
        let loaded = PlayerConfigFile::from_json(&json).unwrap();
        assert_eq!(loaded.version, CURRENT_VERSION);
        assert_eq!(loaded.config, config);
    }

    #[test]
    fn test_migration_v0() {
        let raw = serde_json::json!({
            "source": { "location": "clip.4ds" },
            "looping": false,
        });
        let loaded = PlayerConfigFile::from_json(&serde_json::to_vec(&raw).unwrap()).unwrap();
        assert_eq!(loaded.version, CURRENT_VERSION);
        assert_eq!(loaded.config.source.kind, SourceKind::Local);
        assert!(!loaded.config.looping);
        assert!(loaded.config.auto_play);
    }

    #[test]
    fn test_future_version_rejected() {
        let json = serde_json::json!({
            "version": 999,
            "config": {},
            "app_version": "99.0.0",
        });
        let data = serde_json::to_vec(&json).unwrap();
        assert!(PlayerConfigFile::from_json(&data).is_err());
    }

    #[test]
    fn test_validate() {
        assert!(PlayerConfig::new(SourceDescriptor::local("clip")).validate().is_ok());
        assert!(PlayerConfig::new(SourceDescriptor::network("ftp://x")).validate().is_err());

        let mut config = PlayerConfig::new(SourceDescriptor::local("clip"));
        config.geometry_buffers = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load_file() {
        let path = std::env::temp_dir().join(format!("volplay-config-{}.json", std::process::id()));
        let file = PlayerConfigFile::new(PlayerConfig::new(SourceDescriptor::local("clip")));
        file.save_to_file(&path).unwrap();
        let loaded = PlayerConfigFile::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded.config.source.location, "clip");
    }
}
