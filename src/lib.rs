mod animation_state;
mod base;
mod mix_config;
mod skeleton_data;
mod state_data;

pub mod prelude;
pub use prelude::*;

use bevy::{app::Animation, prelude::*};

pub struct SpineMixPlugin {
    extensions: Vec<&'static str>,
}

impl Default for SpineMixPlugin {
    fn default() -> Self {
        Self::new(&["mix.json"])
    }
}

impl SpineMixPlugin {
    /// Create the plugin, loading mix configurations from files with the
    /// given extensions
    pub fn new(extensions: &[&'static str]) -> Self {
        Self {
            extensions: extensions.to_owned(),
        }
    }
}

impl Plugin for SpineMixPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(MixConfigPlugin::new(&self.extensions))
            .init_asset::<SkeletonData>()
            .add_systems(Update, base::build_state_data)
            .add_systems(
                PostUpdate,
                advance_animation_states
                    .in_set(Animation)
                    .ambiguous_with_all(),
            );
    }
}
