//! Round bookkeeping: фиксация победителя и сброс раунда
//!
//! Победитель — сторона, чей ПРОТИВНИК вошёл в KO. После фиксации
//! winner не меняется до RoundReset (одновременный double-KO отдаёт
//! победу по первому событию в очереди).

use bevy::prelude::*;

use super::damage::FighterKo;
use super::hitbox::ActiveHitbox;
use crate::components::{Fighter, FighterBody, Health, Side, SpawnPoint, SpriteState};
use crate::fighter::FighterMachine;

/// Состояние матча
#[derive(Resource, Debug, Default)]
pub struct MatchState {
    /// Сторона-победитель текущего раунда (None — бой идёт)
    pub winner: Option<Side>,
}

/// Запрос внешнего слоя на сброс раунда
#[derive(Event, Debug, Clone)]
pub struct RoundReset;

/// Система: KO → winner
pub fn check_round_over(
    mut ko_events: EventReader<FighterKo>,
    mut match_state: ResMut<MatchState>,
) {
    for ko in ko_events.read() {
        if match_state.winner.is_none() {
            let winner = ko.side.opposite();
            match_state.winner = Some(winner);
            crate::log_info(&format!("🏆 {:?} wins the round ({:?} KO)", winner, ko.side));
        }
    }
}

/// Система: round reset — бойцы на точки спавна с полным HP и чистой
/// state machine, живые hitbox'ы despawn, winner снят.
pub fn handle_round_reset(
    mut commands: Commands,
    mut reset_events: EventReader<RoundReset>,
    mut fighters: Query<(
        &Fighter,
        &SpawnPoint,
        &mut Transform,
        &mut FighterBody,
        &mut FighterMachine,
        &mut Health,
        &mut SpriteState,
    )>,
    hitboxes: Query<Entity, With<ActiveHitbox>>,
    mut match_state: ResMut<MatchState>,
) {
    if reset_events.read().next().is_none() {
        return;
    }

    for (fighter, spawn, mut transform, mut body, mut machine, mut health, mut sprite) in
        fighters.iter_mut()
    {
        transform.translation = spawn.0.extend(0.0);

        let (width, height) = (body.width, body.height);
        *body = FighterBody::new(width, height);
        body.on_ground = true;
        // Стартовый facing — лицом к противнику
        body.facing_right = fighter.side == Side::Player;

        *machine = FighterMachine::default();
        *health = Health::new(health.max);
        *sprite = SpriteState::default();
    }

    for entity in hitboxes.iter() {
        commands.entity(entity).despawn();
    }

    match_state.winner = None;
    crate::log_info("🔄 round reset");
}
