//! Property-based tests for motion core invariants.
//!
//! These tests use proptest to check the bounded-overshoot guarantee and
//! the publish discipline across random configurations.

use glam::IVec2;
use proptest::prelude::*;
use sprite_motion::output::{OutputSink, SpriteRegisterFile};
use sprite_motion::sim::{self, MotionConfig, MotionState};

/// Valid configurations: margins at least 1 and a non-empty spawn region
fn config_strategy() -> impl Strategy<Value = MotionConfig> {
    (
        0usize..=30,
        1i32..=4,
        1i32..=12,
        64i32..=512,
        64i32..=512,
        0i32..=32,
        any::<u64>(),
    )
        .prop_map(|(count, speed, margin, bx, by, size, seed)| MotionConfig {
            count,
            speed,
            margin,
            bounds: IVec2::new(bx, by),
            sprite_size: size,
            seed: Some(seed),
            ..Default::default()
        })
}

#[derive(Default)]
struct Recorder {
    writes: Vec<(usize, i32, i32)>,
}

impl OutputSink for Recorder {
    fn write_slot(&mut self, index: usize, x: i32, y: i32) {
        self.writes.push((index, x, y));
    }
}

proptest! {
    /// Overshoot past either edge is bounded by one velocity step
    #[test]
    fn prop_overshoot_bounded(config in config_strategy(), steps in 0usize..400) {
        let mut state = MotionState::initialize(config.clone()).unwrap();
        let far = config.far_edge();
        let s = config.speed;

        for _ in 0..steps {
            sim::step(&mut state);
            for e in state.entities() {
                let p = e.position();
                prop_assert!(p.x >= -s && p.x <= far.x + s, "x {} outside [-{}, {}]", p.x, s, far.x + s);
                prop_assert!(p.y >= -s && p.y <= far.y + s, "y {} outside [-{}, {}]", p.y, s, far.y + s);
            }
        }
    }

    /// Reflection only flips signs; speed never changes
    #[test]
    fn prop_speed_preserved(config in config_strategy(), steps in 0usize..200) {
        let mut state = MotionState::initialize(config.clone()).unwrap();
        for _ in 0..steps {
            sim::step(&mut state);
        }
        for e in state.entities() {
            prop_assert_eq!(e.velocity().abs(), IVec2::splat(config.speed));
        }
    }

    /// Entities never sit on one spot: every step moves each axis
    #[test]
    fn prop_no_oscillation_in_place(config in config_strategy(), steps in 2usize..200) {
        let mut state = MotionState::initialize(config).unwrap();
        let mut history = Vec::new();
        for _ in 0..steps {
            history.push(state.entities().to_vec());
            sim::step(&mut state);
        }
        // Position two steps apart is only equal when bouncing back from an edge,
        // and never for three consecutive pairs
        for window in history.windows(5) {
            for i in 0..window[0].len() {
                let stuck = window[0][i].position() == window[2][i].position()
                    && window[2][i].position() == window[4][i].position();
                prop_assert!(!stuck, "entity {} oscillates in place", i);
            }
        }
    }

    /// Publishing twice without a step yields identical output
    #[test]
    fn prop_publish_idempotent(config in config_strategy(), steps in 0usize..50) {
        let mut state = MotionState::initialize(config).unwrap();
        for _ in 0..steps {
            sim::step(&mut state);
        }
        let mut first = Recorder::default();
        let mut second = Recorder::default();
        sim::publish(&state, &mut first);
        sim::publish(&state, &mut second);
        prop_assert_eq!(first.writes, second.writes);
    }

    /// Slot i always carries entity i, offset by the publish offset
    #[test]
    fn prop_slot_tracks_entity(config in config_strategy(), steps in 1usize..100) {
        let offset = config.publish_offset;
        let mut state = MotionState::initialize(config.clone()).unwrap();
        let mut regs = SpriteRegisterFile::new(config.capacity);
        for _ in 0..steps {
            let before = state.entities().to_vec();
            sim::tick(&mut state, &mut regs);
            for (i, e) in before.iter().enumerate() {
                let published = regs.slot(i).unwrap().position();
                prop_assert_eq!(published, e.position() + IVec2::splat(offset));
            }
        }
    }
}
