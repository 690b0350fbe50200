//! Damage resolution: удары → урон, knockback, stun, KO
//!
//! Ядро — чистая функция apply_hit, система apply_strikes лишь
//! разворачивает FighterStruck события в вызовы apply_hit.

use bevy::prelude::*;

use crate::catalog::AttackDefinition;
use crate::components::{Fighter, FighterBody, Health, Side};
use crate::fighter::{enter_state, FighterMachine, FighterState};
use crate::stage::StageConfig;

/// Hitbox пересёк hurtbox цели (пишет resolve_hitboxes, читает apply_strikes)
#[derive(Event, Debug, Clone)]
pub struct FighterStruck {
    pub target: Entity,
    pub attacker: Entity,
    /// Facing атакующего на кадре удара (направление knockback)
    pub attacker_facing_right: bool,
    pub attack: AttackDefinition,
}

/// Урон применён к цели (для HUD/звука)
#[derive(Event, Debug, Clone)]
pub struct DamageDealt {
    pub target: Entity,
    pub amount: f32,
    pub blocked: bool,
}

/// Боец вошёл в KO
#[derive(Event, Debug, Clone)]
pub struct FighterKo {
    pub entity: Entity,
    pub side: Side,
}

/// Результат одного применённого удара
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitOutcome {
    pub damage: f32,
    pub blocked: bool,
    pub ko: bool,
}

/// Применяет удар к цели. None — цель уже в KO (терминальное состояние,
/// ничего не меняется).
///
/// Блок (только на земле): урон и горизонтальный knockback режутся множителями stage,
/// вертикального knockback нет, короткий blockstun + block-flash,
/// состояние остаётся Block. Без блока: полный урон, knockback по
/// facing атакующего, hitstun. health == 0 всегда означает KO — chip
/// damage сквозь блок тоже добивает.
pub fn apply_hit(
    health: &mut Health,
    machine: &mut FighterMachine,
    body: &mut FighterBody,
    attack: &AttackDefinition,
    attacker_facing_right: bool,
    stage: &StageConfig,
) -> Option<HitOutcome> {
    if machine.state == FighterState::Ko {
        return None;
    }

    let direction = if attacker_facing_right { 1.0 } else { -1.0 };
    // Блок защищает только на земле
    let blocked = machine.state == FighterState::Block && body.on_ground;

    let damage = if blocked {
        attack.damage * stage.block_damage_reduction
    } else {
        attack.damage
    };
    health.take_damage(damage);

    if blocked {
        body.velocity.x = direction * attack.knockback_x * stage.block_knockback_reduction;
        machine.stun_timer = stage.block_stun_frames;
        machine.block_hit_timer = stage.block_hit_frames;
    } else {
        body.velocity.x = direction * attack.knockback_x;
        body.velocity.y = attack.knockback_y;
        machine.stun_timer = stage.hit_stun_frames;
        enter_state(machine, body, stage, FighterState::Hitstun);
    }

    let ko = !health.is_alive();
    if ko {
        machine.stun_timer = 0;
        enter_state(machine, body, stage, FighterState::Ko);
    }

    Some(HitOutcome { damage, blocked, ko })
}

/// Система: применяет накопленные FighterStruck к целям
pub fn apply_strikes(
    mut struck: EventReader<FighterStruck>,
    mut fighters: Query<(&Fighter, &mut Health, &mut FighterMachine, &mut FighterBody)>,
    stage: Res<StageConfig>,
    mut damage_events: EventWriter<DamageDealt>,
    mut ko_events: EventWriter<FighterKo>,
) {
    for strike in struck.read() {
        let Ok((fighter, mut health, mut machine, mut body)) = fighters.get_mut(strike.target)
        else {
            continue;
        };

        let Some(outcome) = apply_hit(
            &mut health,
            &mut machine,
            &mut body,
            &strike.attack,
            strike.attacker_facing_right,
            &stage,
        ) else {
            continue;
        };

        if outcome.blocked {
            crate::log(&format!(
                "🛡️ {:?} blocked '{}': -{} HP ({} left)",
                fighter.side, strike.attack.name, outcome.damage, health.current
            ));
        } else {
            crate::log(&format!(
                "💥 {:?} hit by '{}': -{} HP ({} left)",
                fighter.side, strike.attack.name, outcome.damage, health.current
            ));
        }

        damage_events.write(DamageDealt {
            target: strike.target,
            amount: outcome.damage,
            blocked: outcome.blocked,
        });

        if outcome.ko {
            crate::log_info(&format!("💀 {:?} is KO", fighter.side));
            ko_events.write(FighterKo {
                entity: strike.target,
                side: fighter.side,
            });
        }
    }
}
