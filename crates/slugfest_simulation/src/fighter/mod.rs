//! Fighter module: state machine бойца + per-tick update системы
//!
//! Порядок внутри тика (контракт внешнего цикла):
//! 1. update_player_fighters — бойцы с InputState (human)
//! 2. AI decision (модуль ai)
//! 3. update_ai_fighters — бойцы без InputState
//!
//! Hitbox'ы, заспавненные атакой, уходят событиями HitboxSpawned
//! в combat resolver.

use bevy::prelude::*;

pub mod state;
pub mod update;

pub use state::{enter_state, start_attack, FighterMachine, FighterState};
pub use update::{fighter_tick, update_ai_fighters, update_player_fighters};

use crate::components::{Fighter, FighterBody, Health, Side, SpawnPoint, SpriteState};
use crate::input::clear_input_edges;
use crate::stage::StageConfig;
use crate::TickSet;

/// Fighter Plugin
///
/// Регистрирует update системы в фазах PlayerUpdate/EnemyUpdate.
/// Сброс input edges — в конце тика (фаза Round).
pub struct FighterPlugin;

impl Plugin for FighterPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (
                update_player_fighters.in_set(TickSet::PlayerUpdate),
                update_ai_fighters.in_set(TickSet::EnemyUpdate),
                clear_input_edges.in_set(TickSet::Round),
            ),
        );
    }
}

/// Габариты бойца (из оригинальной раскладки арены)
pub const FIGHTER_WIDTH: f32 = 250.0;
pub const FIGHTER_HEIGHT: f32 = 280.0;

/// Spawn helper: создаёт бойца на земле в точке x.
///
/// Компоненты: Fighter + Transform + FighterBody + FighterMachine +
/// Health + SpriteState + SpawnPoint. InputState / AiControlled
/// навешивает вызывающий.
pub fn spawn_fighter(commands: &mut Commands, side: Side, x: f32, stage: &StageConfig) -> Entity {
    let y = stage.ground_y - FIGHTER_HEIGHT;

    let mut body = FighterBody::new(FIGHTER_WIDTH, FIGHTER_HEIGHT);
    body.on_ground = true;
    // Стартовый facing — лицом к противнику
    body.facing_right = side == Side::Player;

    commands
        .spawn((
            Fighter { side },
            Transform::from_xyz(x, y, 0.0),
            body,
            FighterMachine::default(),
            Health::new(100.0),
            SpriteState::default(),
            SpawnPoint(Vec2::new(x, y)),
        ))
        .id()
}
