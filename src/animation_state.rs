use super::{AnimationId, AnimationStateData, MixError, SkeletonData};
use bevy::prelude::*;
use std::sync::Arc;

/// An animation playing on the track
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackEntry {
    pub animation: AnimationId,
    /// Length of the animation in seconds, copied from its descriptor
    pub duration: f32,
    /// Seconds into the animation. Wraps when looping, stops at `duration`
    /// otherwise.
    pub time: f32,
    pub looping: bool,
}

impl TrackEntry {
    #[inline]
    fn new(animation: AnimationId, duration: f32, looping: bool) -> Self {
        Self {
            animation,
            duration,
            time: 0.0,
            looping,
        }
    }

    #[inline]
    fn advance(&mut self, delta: f32) {
        let time = self.time + delta;
        self.time = if self.duration <= 0.0 {
            0.0
        } else if self.looping {
            time.rem_euclid(self.duration)
        } else {
            time.min(self.duration)
        };
    }

    /// A non-looping entry completes once it reaches its last frame
    #[inline]
    pub fn is_complete(&self) -> bool {
        !self.looping && self.time >= self.duration
    }
}

/// Single-track animation state that crossfades between animations using the mix
/// durations of an [`AnimationStateData`].
#[derive(Component, Debug, Clone)]
pub struct AnimationState {
    state_data: Arc<AnimationStateData>,
    current: Option<TrackEntry>,
    /// Entry being mixed out while `current` fades in
    mixing_from: Option<TrackEntry>,
    mix_time: f32,
    mix_duration: f32,
}

impl AnimationState {
    #[inline]
    pub fn new(state_data: Arc<AnimationStateData>) -> Self {
        Self {
            state_data,
            current: None,
            mixing_from: None,
            mix_time: 0.0,
            mix_duration: 0.0,
        }
    }

    #[inline]
    pub fn state_data(&self) -> &Arc<AnimationStateData> {
        &self.state_data
    }

    /// Swaps the mix table. Tracks are cleared when the new table belongs to
    /// another skeleton data, since their handles would be foreign to it.
    pub fn set_state_data(&mut self, state_data: Arc<AnimationStateData>) {
        if state_data.skeleton_data() != self.state_data.skeleton_data() {
            self.clear_tracks();
        }
        self.state_data = state_data;
    }

    /// Plays `animation`, mixing out of the current one for the duration the
    /// table holds for that transition.
    pub fn set_animation(
        &mut self,
        skeleton_data: &SkeletonData,
        animation: AnimationId,
        looping: bool,
    ) -> Result<(), MixError> {
        self.state_data.check("animation", animation)?;
        let descriptor = skeleton_data
            .animation(animation)
            .ok_or_else(|| MixError::InvalidArgument {
                param: "skeleton_data",
                reason: format!(
                    "skeleton data {} has no animation {}",
                    skeleton_data.name(),
                    animation
                ),
            })?;
        let mix_duration = match self.current {
            Some(previous) => Some(self.state_data.get_mix(previous.animation, animation)?),
            None => None,
        };

        let entry = TrackEntry::new(animation, descriptor.duration(), looping);
        let previous = self.current.replace(entry);
        self.mixing_from = previous;
        self.mix_time = 0.0;
        self.mix_duration = mix_duration.unwrap_or(0.0);
        if let Some(previous) = previous {
            debug!(
                "Mixing from {} to {} over {}s",
                previous.animation,
                descriptor.name(),
                self.mix_duration
            );
        }
        Ok(())
    }

    pub fn set_animation_by_name(
        &mut self,
        skeleton_data: &SkeletonData,
        name: &str,
        looping: bool,
    ) -> Result<(), MixError> {
        let animation = skeleton_data
            .find_animation(name)
            .ok_or_else(|| MixError::NotFound {
                param: "name",
                name: name.to_string(),
            })?;
        self.set_animation(skeleton_data, animation, looping)
    }

    #[inline]
    pub fn clear_tracks(&mut self) {
        self.current = None;
        self.mixing_from = None;
        self.mix_time = 0.0;
        self.mix_duration = 0.0;
    }

    pub fn update(&mut self, delta: f32) {
        if let Some(current) = self.current.as_mut() {
            current.advance(delta);
        }
        let Some(from) = self.mixing_from.as_mut() else {
            return;
        };
        from.advance(delta);
        self.mix_time += delta;

        if self.mix_time >= self.mix_duration {
            // Mix complete
            self.mixing_from = None;
        }
    }

    #[inline]
    pub fn current(&self) -> Option<&TrackEntry> {
        self.current.as_ref()
    }

    #[inline]
    pub fn mixing_from(&self) -> Option<&TrackEntry> {
        self.mixing_from.as_ref()
    }

    #[inline]
    pub fn is_mixing(&self) -> bool {
        self.mixing_from.is_some()
    }

    /// Weight of the current entry, from 0 at the start of a mix to 1 once
    /// it is complete.
    #[inline]
    pub fn mix_alpha(&self) -> f32 {
        if !self.is_mixing() || self.mix_duration <= 0.0 {
            return 1.0;
        }
        (self.mix_time / self.mix_duration).clamp(0.0, 1.0)
    }

    #[inline]
    pub fn mix_duration(&self) -> f32 {
        self.mix_duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (SkeletonData, AnimationState) {
        let mut data = SkeletonData::new("hero");
        for name in ["idle", "walk", "run"] {
            data.add_animation(name, 2.0).unwrap();
        }
        let mut mix = AnimationStateData::new(&data);
        mix.set_default_mix(0.3);
        mix.set_mix_by_name(&data, "idle", "walk", 0.2).unwrap();
        mix.set_mix_by_name(&data, "walk", "idle", -1.0).unwrap();
        (data, AnimationState::new(Arc::new(mix)))
    }

    #[test]
    fn first_animation_starts_without_mixing() {
        let (data, mut player) = setup();
        player.set_animation_by_name(&data, "idle", true).unwrap();
        assert!(!player.is_mixing());
        assert_eq!(player.mix_alpha(), 1.0);
        assert_eq!(player.current().map(|e| e.animation), data.find_animation("idle"));
    }

    #[test]
    fn transition_uses_configured_mix_and_completes() {
        let (data, mut player) = setup();
        player.set_animation_by_name(&data, "idle", true).unwrap();
        player.update(1.0);
        player.set_animation_by_name(&data, "walk", true).unwrap();

        assert!(player.is_mixing());
        assert_eq!(player.mix_duration(), 0.2);
        assert_eq!(player.mixing_from().map(|e| e.time), Some(1.0));

        player.update(0.1);
        assert!((player.mix_alpha() - 0.5).abs() < 1e-5);
        player.update(0.1);
        assert!(!player.is_mixing());
        assert_eq!(player.mix_alpha(), 1.0);
        assert!((player.current().unwrap().time - 0.2).abs() < 1e-5);
    }

    #[test]
    fn unconfigured_transition_uses_default_mix() {
        let (data, mut player) = setup();
        player.set_animation_by_name(&data, "walk", true).unwrap();
        player.set_animation_by_name(&data, "run", false).unwrap();
        assert_eq!(player.mix_duration(), 0.3);
    }

    #[test]
    fn non_positive_mix_finishes_on_next_update() {
        let (data, mut player) = setup();
        player.set_animation_by_name(&data, "walk", true).unwrap();
        player.set_animation_by_name(&data, "idle", true).unwrap();
        assert_eq!(player.mix_duration(), -1.0);
        assert_eq!(player.mix_alpha(), 1.0);
        player.update(0.0);
        assert!(!player.is_mixing());
    }

    #[test]
    fn rejects_unknown_and_foreign_animations() {
        let (data, mut player) = setup();
        let other = SkeletonData::new("other").with_animation("idle", 1.0).unwrap();

        assert!(matches!(
            player.set_animation_by_name(&data, "jump", true),
            Err(MixError::NotFound { .. })
        ));
        assert!(matches!(
            player.set_animation(&other, other.find_animation("idle").unwrap(), true),
            Err(MixError::InvalidArgument { .. })
        ));
        assert!(player.current().is_none());
    }

    #[test]
    fn switching_skeleton_data_clears_tracks() {
        let (data, mut player) = setup();
        player.set_animation_by_name(&data, "idle", true).unwrap();

        let same = Arc::new((**player.state_data()).clone());
        player.set_state_data(same);
        assert!(player.current().is_some());

        let other = SkeletonData::new("other");
        player.set_state_data(Arc::new(AnimationStateData::new(&other)));
        assert!(player.current().is_none());
    }

    #[test]
    fn non_looping_entry_stops_at_its_last_frame() {
        let (data, mut player) = setup();
        player.set_animation_by_name(&data, "idle", false).unwrap();
        player.update(10.0);

        let entry = player.current().unwrap();
        assert_eq!(entry.duration, 2.0);
        assert_eq!(entry.time, 2.0);
        assert!(entry.is_complete());
    }

    #[test]
    fn looping_entry_wraps_around() {
        let (data, mut player) = setup();
        player.set_animation_by_name(&data, "idle", true).unwrap();
        player.update(5.0);

        let entry = player.current().unwrap();
        assert_eq!(entry.time, 1.0);
        assert!(!entry.is_complete());
    }

    #[test]
    fn handle_from_mismatched_skeleton_data_is_rejected() {
        let (data, mut player) = setup();
        let other = SkeletonData::new("other");
        let idle = data.find_animation("idle").unwrap();
        assert!(matches!(
            player.set_animation(&other, idle, true),
            Err(MixError::InvalidArgument { param: "skeleton_data", .. })
        ));
        assert!(player.current().is_none());
    }
}
