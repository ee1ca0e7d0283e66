use super::{AnimationId, CatalogId, SkeletonData};
use bevy::prelude::*;
use std::collections::HashMap;
use std::hash::{BuildHasherDefault, Hash, Hasher};
use thiserror::Error;

/// Errors raised while configuring or querying mix durations
#[non_exhaustive]
#[derive(Debug, Error, PartialEq)]
pub enum MixError {
    /// A handle or catalog that does not belong to the table's skeleton data
    #[error("Invalid argument `{param}`: {reason}")]
    InvalidArgument { param: &'static str, reason: String },
    /// A by-name request referenced an animation the skeleton data lacks
    #[error("Animation not found: {name}")]
    NotFound { param: &'static str, name: String },
}

/// Ordered `(from, to)` key. `(a, b)` and `(b, a)` are different keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationPair {
    pub from: AnimationId,
    pub to: AnimationId,
}

impl AnimationPair {
    #[inline]
    pub fn new(from: AnimationId, to: AnimationId) -> Self {
        Self { from, to }
    }

    /// Order-sensitive combination of both identity hashes.
    #[inline]
    pub(crate) fn combined_hash(&self) -> u64 {
        let h1 = self.from.identity_hash();
        (h1 << 5).wrapping_add(h1) ^ self.to.identity_hash()
    }
}

impl Hash for AnimationPair {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.combined_hash());
    }
}

const MIX_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

/// Finalizes the single word written by [`AnimationPair`]. No string or
/// content hashing takes place on the lookup path.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnimationPairHasher(u64);

impl Hasher for AnimationPairHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.0 ^ (self.0 >> 29)
    }

    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.0 = (self.0.rotate_left(5) ^ u64::from(byte)).wrapping_mul(MIX_SEED);
        }
    }

    #[inline]
    fn write_u64(&mut self, n: u64) {
        self.0 = (self.0 ^ n).wrapping_mul(MIX_SEED);
    }
}

pub type BuildAnimationPairHasher = BuildHasherDefault<AnimationPairHasher>;

/// Stores mix (crossfade) durations to apply when the playing animation
/// changes.
///
/// The table is bound to one [`SkeletonData`] by identity only. It does not
/// own the skeleton data and must not outlive it: handles of a dropped or
/// reloaded catalog are rejected as foreign.
#[derive(Debug, Clone)]
pub struct AnimationStateData {
    skeleton_data: CatalogId,
    animation_to_mix_time: HashMap<AnimationPair, f32, BuildAnimationPairHasher>,
    default_mix: f32,
}

impl AnimationStateData {
    #[inline]
    pub fn new(skeleton_data: &SkeletonData) -> Self {
        Self {
            skeleton_data: skeleton_data.id(),
            animation_to_mix_time: HashMap::default(),
            default_mix: 0.0,
        }
    }

    /// Identity of the skeleton data used to resolve animations by name
    #[inline]
    pub fn skeleton_data(&self) -> CatalogId {
        self.skeleton_data
    }

    /// The mix duration used when none was set between two animations
    #[inline]
    pub fn default_mix(&self) -> f32 {
        self.default_mix
    }

    #[inline]
    pub fn set_default_mix(&mut self, duration: f32) {
        self.default_mix = duration;
    }

    /// Sets a mix duration by animation names.
    ///
    /// Both names are resolved before the table is touched, so a typo in
    /// either name leaves it unchanged.
    pub fn set_mix_by_name(
        &mut self,
        skeleton_data: &SkeletonData,
        from_name: &str,
        to_name: &str,
        duration: f32,
    ) -> Result<(), MixError> {
        if skeleton_data.id() != self.skeleton_data {
            return Err(MixError::InvalidArgument {
                param: "skeleton_data",
                reason: format!(
                    "skeleton data {} ({}) is not the one this table was created for ({})",
                    skeleton_data.name(),
                    skeleton_data.id(),
                    self.skeleton_data
                ),
            });
        }
        let from = skeleton_data
            .find_animation(from_name)
            .ok_or_else(|| MixError::NotFound {
                param: "from_name",
                name: from_name.to_string(),
            })?;
        let to = skeleton_data
            .find_animation(to_name)
            .ok_or_else(|| MixError::NotFound {
                param: "to_name",
                name: to_name.to_string(),
            })?;

        debug!(
            "Mix {} -> {} on {} set to {}s",
            from_name,
            to_name,
            skeleton_data.name(),
            duration
        );
        self.set_mix(from, to, duration)
    }

    /// Sets the mix duration used when changing from `from` to `to`.
    /// An existing entry for the same ordered pair is replaced.
    #[inline]
    pub fn set_mix(&mut self, from: AnimationId, to: AnimationId, duration: f32) -> Result<(), MixError> {
        let key = self.pair(from, to)?;
        self.animation_to_mix_time.insert(key, duration);
        Ok(())
    }

    /// The mix duration used when changing from `from` to `to`, or the
    /// default mix when none was set for that pair.
    #[inline]
    pub fn get_mix(&self, from: AnimationId, to: AnimationId) -> Result<f32, MixError> {
        let key = self.pair(from, to)?;
        Ok(self
            .animation_to_mix_time
            .get(&key)
            .copied()
            .unwrap_or(self.default_mix))
    }

    /// Explicitly configured entries, in no particular order
    pub fn mixes(&self) -> impl Iterator<Item = (AnimationPair, f32)> + '_ {
        self.animation_to_mix_time
            .iter()
            .map(|(pair, duration)| (*pair, *duration))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.animation_to_mix_time.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.animation_to_mix_time.is_empty()
    }

    #[inline]
    pub(crate) fn check(&self, param: &'static str, id: AnimationId) -> Result<(), MixError> {
        if id.catalog() == self.skeleton_data {
            Ok(())
        } else {
            Err(MixError::InvalidArgument {
                param,
                reason: format!(
                    "animation {} does not belong to skeleton data {}",
                    id, self.skeleton_data
                ),
            })
        }
    }

    #[inline]
    fn pair(&self, from: AnimationId, to: AnimationId) -> Result<AnimationPair, MixError> {
        self.check("from", from)?;
        self.check("to", to)?;
        Ok(AnimationPair::new(from, to))
    }
}
