use super::{AnimationStateData, MixError, SkeletonData};
use bevy::{
    app::{App, Plugin},
    asset::{
        io::Reader,
        {Asset, AssetApp, AssetLoader, LoadContext},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One authored crossfade: changing from `from` to `to` mixes for `duration`
/// seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixEntry {
    pub from: String,
    pub to: String,
    pub duration: f32,
}

/// Authored mix durations for one skeleton, as stored in a `*.mix.json` file.
///
/// ```json
/// {
///   "default_mix": 0.2,
///   "mixes": [{ "from": "idle", "to": "walk", "duration": 0.15 }]
/// }
/// ```
#[derive(TypePath, Asset, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MixConfig {
    #[serde(default)]
    pub default_mix: f32,
    #[serde(default)]
    pub mixes: Vec<MixEntry>,
}

impl MixConfig {
    #[inline]
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Applies the default mix and every entry to `state_data`.
    ///
    /// Rows with an empty `from` or `to` are unfinished and skipped. The first
    /// name missing from `skeleton_data` stops the fill with
    /// [`MixError::NotFound`]; rows before it stay applied.
    pub fn fill_state_data(
        &self,
        state_data: &mut AnimationStateData,
        skeleton_data: &SkeletonData,
    ) -> Result<(), MixError> {
        state_data.set_default_mix(self.default_mix);
        for entry in &self.mixes {
            if entry.from.is_empty() || entry.to.is_empty() {
                continue;
            }
            state_data.set_mix_by_name(skeleton_data, &entry.from, &entry.to, entry.duration)?;
        }
        Ok(())
    }

    /// Creates a fresh table for `skeleton_data` filled from this config.
    pub fn build_state_data(
        &self,
        skeleton_data: &SkeletonData,
    ) -> Result<AnimationStateData, MixError> {
        let mut state_data = AnimationStateData::new(skeleton_data);
        self.fill_state_data(&mut state_data, skeleton_data)?;
        Ok(state_data)
    }
}

/// Registers [`MixConfig`] and its JSON loader
pub struct MixConfigPlugin {
    extensions: Vec<&'static str>,
}

impl Plugin for MixConfigPlugin {
    fn build(&self, app: &mut App) {
        app.init_asset::<MixConfig>()
            .register_asset_loader(MixConfigLoader {
                extensions: self.extensions.clone(),
            });
    }
}

impl MixConfigPlugin {
    /// Files whose name ends with one of `extensions` go through [`MixConfigLoader`]
    pub fn new(extensions: &[&'static str]) -> Self {
        Self {
            extensions: extensions.to_owned(),
        }
    }
}

/// Reads a [`MixConfig`] from JSON
pub struct MixConfigLoader {
    extensions: Vec<&'static str>,
}

/// Why a mix configuration file failed to load
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum MixConfigLoaderError {
    /// The asset reader failed
    #[error("Could not read the file: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not a valid mix configuration
    #[error("Could not parse mix configuration: {0}")]
    Json(#[from] serde_json::Error),
}

impl AssetLoader for MixConfigLoader {
    type Asset = MixConfig;
    type Settings = ();
    type Error = MixConfigLoaderError;

    async fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &(),
        load_context: &mut LoadContext<'_>,
    ) -> Result<Self::Asset, Self::Error> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).await?;
        let config = MixConfig::from_slice(&bytes)?;
        debug!(
            "Loaded {} mix entries from {}",
            config.mixes.len(),
            load_context.path().display()
        );
        Ok(config)
    }

    fn extensions(&self) -> &[&str] {
        &self.extensions
    }
}
