pub use crate::animation_state::{AnimationState, TrackEntry};
pub use crate::base::{MixBuildFailed, MixSource, advance_animation_states};
pub use crate::mix_config::{MixConfig, MixConfigLoader, MixConfigLoaderError, MixConfigPlugin, MixEntry};
pub use crate::skeleton_data::{AnimationDescriptor, AnimationId, CatalogId, SkeletonData, SkeletonDataError};
pub use crate::state_data::{
    AnimationPair, AnimationPairHasher, AnimationStateData, BuildAnimationPairHasher, MixError,
};
pub use crate::SpineMixPlugin;
