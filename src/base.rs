use super::{AnimationState, MixConfig, SkeletonData};
use bevy::asset::{AssetEvent, AssetId};
use bevy::ecs::query::Has;
use bevy::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

/// Assets an entity's [`AnimationState`] is built from. The state is inserted
/// once both assets are loaded and rebuilt whenever either one changes.
#[derive(Component, Debug, Clone)]
pub struct MixSource {
    pub skeleton: Handle<SkeletonData>,
    pub config: Handle<MixConfig>,
}

/// Marks a [`MixSource`] whose assets could not be turned into a mix table.
/// Cleared when either asset is modified.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct MixBuildFailed;

pub fn advance_animation_states(mut states: Query<&mut AnimationState>, time: Res<Time>) {
    let delta = time.delta_secs();
    for mut state in states.iter_mut() {
        state.update(delta);
    }
}

fn modified<A: Asset>(events: &mut EventReader<AssetEvent<A>>) -> HashSet<AssetId<A>> {
    events
        .read()
        .filter_map(|event| match event {
            AssetEvent::Modified { id } => Some(*id),
            _ => None,
        })
        .collect()
}

pub(crate) fn build_state_data(
    mut commands: Commands,
    mut sources: Query<(
        Entity,
        &MixSource,
        Option<&mut AnimationState>,
        Has<MixBuildFailed>,
    )>,
    skeletons: Res<Assets<SkeletonData>>,
    configs: Res<Assets<MixConfig>>,
    mut skeleton_events: EventReader<AssetEvent<SkeletonData>>,
    mut config_events: EventReader<AssetEvent<MixConfig>>,
) {
    let modified_skeletons = modified(&mut skeleton_events);
    let modified_configs = modified(&mut config_events);

    for (entity, source, state, failed) in sources.iter_mut() {
        let stale = modified_skeletons.contains(&source.skeleton.id())
            || modified_configs.contains(&source.config.id());
        if !stale && (state.is_some() || failed) {
            continue;
        }

        let (Some(skeleton), Some(config)) =
            (skeletons.get(&source.skeleton), configs.get(&source.config))
        else {
            continue;
        };

        // Reloads always start from an empty table
        match config.build_state_data(skeleton) {
            Ok(state_data) => {
                info!(
                    "Built {} mixes (default {}s) for {} on {:?}",
                    state_data.len(),
                    state_data.default_mix(),
                    skeleton.name(),
                    entity
                );
                let state_data = Arc::new(state_data);
                if failed {
                    commands.entity(entity).remove::<MixBuildFailed>();
                }
                match state {
                    Some(mut state) => state.set_state_data(state_data),
                    None => {
                        commands
                            .entity(entity)
                            .insert(AnimationState::new(state_data));
                    }
                }
            }
            Err(err) => {
                error!(
                    "Could not build mixes for {} on {:?}: {}",
                    skeleton.name(),
                    entity,
                    err
                );
                commands.entity(entity).insert(MixBuildFailed);
            }
        }
    }
}
