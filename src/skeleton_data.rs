use bevy::{asset::Asset, reflect::TypePath};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

static NEXT_CATALOG_ID: AtomicU64 = AtomicU64::new(0);

/// Identity of one [`SkeletonData`] instance.
///
/// Every catalog gets a fresh id when it is created, so a reloaded copy of the
/// same skeleton never shares ids with the copy it replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CatalogId(u64);

impl CatalogId {
    #[inline]
    fn next() -> Self {
        Self(NEXT_CATALOG_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for CatalogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Canonical handle of one animation inside one catalog.
///
/// Equality is identity: two handles are equal only when they were handed out
/// by the same catalog for the same animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationId {
    catalog: CatalogId,
    index: u32,
}

impl AnimationId {
    #[inline]
    pub fn catalog(&self) -> CatalogId {
        self.catalog
    }

    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Hash derived from identity only, never from the animation name.
    #[inline]
    pub(crate) fn identity_hash(&self) -> u64 {
        (self.catalog.0 << 32) ^ u64::from(self.index)
    }
}

impl fmt::Display for AnimationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.catalog.0, self.index)
    }
}

/// A named animation as exported by the authoring tool
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationDescriptor {
    name: String,
    duration: f32,
}

impl AnimationDescriptor {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Length of the animation in seconds
    #[inline]
    pub fn duration(&self) -> f32 {
        self.duration
    }
}

#[non_exhaustive]
#[derive(Debug, Error, PartialEq)]
pub enum SkeletonDataError {
    #[error("Animation name cannot be empty")]
    EmptyName,
    #[error("Animation already exists in skeleton data {skeleton}: {name}")]
    DuplicateAnimation { skeleton: String, name: String },
    #[error("Skeleton data cannot hold more than {} animations", u32::MAX)]
    TooManyAnimations,
}

/// Index the next animation gets when `len` animations are already stored.
#[inline]
fn next_index(len: usize) -> Result<u32, SkeletonDataError> {
    u32::try_from(len).map_err(|_| SkeletonDataError::TooManyAnimations)
}

/// Load-once catalog of the animations of one rig.
///
/// Animations are interned by name: [`SkeletonData::find_animation`] always
/// returns the same [`AnimationId`] for a given name.
#[derive(Asset, TypePath, Debug)]
pub struct SkeletonData {
    id: CatalogId,
    name: String,
    animations: Vec<AnimationDescriptor>,
    by_name: HashMap<String, u32>,
}

impl SkeletonData {
    #[inline]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CatalogId::next(),
            name: name.into(),
            animations: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> CatalogId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_animation(
        &mut self,
        name: impl Into<String>,
        duration: f32,
    ) -> Result<AnimationId, SkeletonDataError> {
        let name = name.into();
        if name.is_empty() {
            return Err(SkeletonDataError::EmptyName);
        }
        if self.by_name.contains_key(&name) {
            return Err(SkeletonDataError::DuplicateAnimation {
                skeleton: self.name.clone(),
                name,
            });
        }

        let index = next_index(self.animations.len())?;
        self.by_name.insert(name.clone(), index);
        self.animations.push(AnimationDescriptor { name, duration });
        Ok(AnimationId {
            catalog: self.id,
            index,
        })
    }

    /// Builder form of [`SkeletonData::add_animation`].
    pub fn with_animation(
        mut self,
        name: impl Into<String>,
        duration: f32,
    ) -> Result<Self, SkeletonDataError> {
        self.add_animation(name, duration)?;
        Ok(self)
    }

    #[inline]
    pub fn find_animation(&self, name: &str) -> Option<AnimationId> {
        self.by_name.get(name).map(|&index| AnimationId {
            catalog: self.id,
            index,
        })
    }

    #[inline]
    pub fn contains(&self, id: AnimationId) -> bool {
        id.catalog == self.id && (id.index as usize) < self.animations.len()
    }

    #[inline]
    pub fn animation(&self, id: AnimationId) -> Option<&AnimationDescriptor> {
        if id.catalog != self.id {
            return None;
        }
        self.animations.get(id.index as usize)
    }

    pub fn animations(&self) -> impl Iterator<Item = (AnimationId, &AnimationDescriptor)> {
        let catalog = self.id;
        self.animations
            .iter()
            .enumerate()
            .map(move |(index, descriptor)| {
                // Every stored index passed `next_index`
                let index = index as u32;
                (AnimationId { catalog, index }, descriptor)
            })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.animations.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }
}
