//! Combat: hitbox lifecycle, damage resolution, round bookkeeping
//!
//! Pipeline внутри тика: fighter update пишет HitboxSpawned →
//! spawn_hitboxes создаёт ActiveHitbox entity → resolve_hitboxes
//! находит пересечения и пишет FighterStruck → apply_strikes наносит
//! урон и пишет DamageDealt/FighterKo → check_round_over фиксирует
//! победителя.

use bevy::prelude::*;

pub mod damage;
pub mod hitbox;
pub mod round;

pub use damage::{apply_hit, apply_strikes, DamageDealt, FighterKo, FighterStruck, HitOutcome};
pub use hitbox::{
    hitbox_bounds, hurtbox_bounds, resolve_hitboxes, spawn_hitboxes, Aabb, ActiveHitbox,
    HitboxSpawned,
};
pub use round::{check_round_over, handle_round_reset, MatchState, RoundReset};

use crate::TickSet;

/// Combat Plugin
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<HitboxSpawned>()
            .add_event::<FighterStruck>()
            .add_event::<DamageDealt>()
            .add_event::<FighterKo>()
            .add_event::<RoundReset>()
            .add_systems(
                FixedUpdate,
                (
                    // spawn и resolve в одном тике: sync point между ними
                    // флашит Commands, hitbox виден resolver'у сразу
                    (spawn_hitboxes, resolve_hitboxes)
                        .chain()
                        .in_set(TickSet::Hitboxes),
                    apply_strikes.in_set(TickSet::Damage),
                    (check_round_over, handle_round_reset)
                        .chain()
                        .in_set(TickSet::Round),
                ),
            );
    }
}
