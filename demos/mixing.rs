use bevy::prelude::*;
use bevy_spine_mix::prelude::{AnimationState, MixConfig, MixEntry, MixSource, SkeletonData, SpineMixPlugin};
use std::time::Duration;

/// Cycles idle -> walk -> run and logs the crossfade progress.
fn main() {
    App::new()
        .add_plugins((
            MinimalPlugins.set(bevy::app::ScheduleRunnerPlugin::run_loop(
                Duration::from_secs_f64(1.0 / 30.0),
            )),
            AssetPlugin::default(),
            bevy::log::LogPlugin::default(),
            SpineMixPlugin::default(),
        ))
        .add_systems(Startup, setup)
        .add_systems(Update, (cycle_animations, log_mixing))
        .run();
}

#[derive(Resource)]
struct Hero(Handle<SkeletonData>);

#[derive(Component)]
struct CycleTimer(Timer);

fn setup(
    mut commands: Commands,
    mut skeletons: ResMut<Assets<SkeletonData>>,
    mut configs: ResMut<Assets<MixConfig>>,
) {
    let mut hero = SkeletonData::new("hero");
    for (name, duration) in [("idle", 2.0), ("walk", 1.0), ("run", 0.6)] {
        if let Err(err) = hero.add_animation(name, duration) {
            error!("{err}");
        }
    }
    let skeleton = skeletons.add(hero);
    let config = configs.add(MixConfig {
        default_mix: 0.3,
        mixes: vec![
            MixEntry { from: "idle".into(), to: "walk".into(), duration: 0.15 },
            MixEntry { from: "walk".into(), to: "run".into(), duration: 0.25 },
        ],
    });

    commands.insert_resource(Hero(skeleton.clone()));
    commands.spawn((
        MixSource { skeleton, config },
        CycleTimer(Timer::from_seconds(1.5, TimerMode::Repeating)),
    ));
}

fn cycle_animations(
    hero: Res<Hero>,
    skeletons: Res<Assets<SkeletonData>>,
    time: Res<Time>,
    mut query: Query<(&mut AnimationState, &mut CycleTimer)>,
) {
    let Some(data) = skeletons.get(&hero.0) else {
        return;
    };
    for (mut state, mut timer) in query.iter_mut() {
        let first = state.current().is_none();
        if !first && !timer.0.tick(time.delta()).just_finished() {
            continue;
        }
        let next = match state.current().and_then(|entry| data.animation(entry.animation)) {
            Some(current) if current.name() == "idle" => "walk",
            Some(current) if current.name() == "walk" => "run",
            _ => "idle",
        };
        if let Err(err) = state.set_animation_by_name(data, next, true) {
            error!("{err}");
        }
    }
}

fn log_mixing(query: Query<&AnimationState>) {
    for state in query.iter() {
        if state.is_mixing() {
            info!(
                "alpha {:.2} of {:.2}s mix",
                state.mix_alpha(),
                state.mix_duration()
            );
        }
    }
}
