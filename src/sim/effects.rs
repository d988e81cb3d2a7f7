//! Timed speed modifiers picked up from items
//!
//! Each pickup adds an independent entry with its own expiry. The speed
//! multiplier is always derived from the surviving entries, never updated
//! incrementally, so repeated apply/expire cycles cannot drift.

use serde::{Deserialize, Serialize};

use crate::consts::{BOOST_FACTOR, EFFECT_DURATION, TRAP_FACTOR};

/// What a pickup does to the vehicle's top speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    Boost,
    Trap,
}

/// One active modifier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub kind: EffectKind,
    /// Simulation time (seconds) after which the effect is gone
    pub expires_at: f32,
}

/// How strong and how long effects are
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectTuning {
    pub duration: f32,
    pub boost_factor: f32,
    pub trap_factor: f32,
}

impl Default for EffectTuning {
    fn default() -> Self {
        Self {
            duration: EFFECT_DURATION,
            boost_factor: BOOST_FACTOR,
            trap_factor: TRAP_FACTOR,
        }
    }
}

/// Active effects of one vehicle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectStack {
    tuning: EffectTuning,
    effects: Vec<Effect>,
    boost_stack: u32,
    slow_stack: u32,
}

impl EffectStack {
    pub fn new(tuning: EffectTuning) -> Self {
        Self {
            tuning,
            ..Default::default()
        }
    }

    /// Add an effect lasting from `now` for the configured duration
    pub fn apply(&mut self, kind: EffectKind, now: f32) {
        match kind {
            EffectKind::Boost => self.boost_stack += 1,
            EffectKind::Trap => self.slow_stack += 1,
        }
        self.effects.push(Effect {
            kind,
            expires_at: now + self.tuning.duration,
        });
    }

    /// Drop effects whose expiry is not after `now` and recount the stacks.
    /// Returns true if anything expired.
    pub fn clear_expired(&mut self, now: f32) -> bool {
        let before = self.effects.len();
        self.effects.retain(|e| e.expires_at > now);
        self.boost_stack = self.count(EffectKind::Boost);
        self.slow_stack = self.count(EffectKind::Trap);
        self.effects.len() != before
    }

    /// Remove every effect
    pub fn clear(&mut self) {
        self.effects.clear();
        self.boost_stack = 0;
        self.slow_stack = 0;
    }

    fn count(&self, kind: EffectKind) -> u32 {
        self.effects.iter().filter(|e| e.kind == kind).count() as u32
    }

    /// Combined top-speed multiplier: boost^k * trap^j
    pub fn multiplier(&self) -> f32 {
        self.tuning.boost_factor.powi(self.boost_stack as i32)
            * self.tuning.trap_factor.powi(self.slow_stack as i32)
    }

    pub fn boost_stack(&self) -> u32 {
        self.boost_stack
    }

    pub fn slow_stack(&self) -> u32 {
        self.slow_stack
    }

    /// Active effects in pickup order
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}
