//! AI controller: снимок мира → приоритетные правила → decision
//!
//! decide — чистая функция (тестируется без App), все вероятностные
//! draw'ы идут через переданный RNG лениво, в порядке правил — одинаковый
//! seed даёт одинаковую последовательность решений.

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::catalog::AttackCatalog;
use crate::components::{Fighter, FighterBody};
use crate::fighter::{enter_state, start_attack, FighterMachine, FighterState};
use crate::stage::StageConfig;
use crate::DeterministicRng;

/// Маркер AI-управляемого бойца + ссылка на противника
#[derive(Component, Debug, Clone, Copy)]
pub struct AiControlled {
    pub opponent: Entity,
}

/// Пресеты сложности
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
}

/// Параметры AI контроллера (компонент на управляемом бойце —
/// у каждого AI своя сложность)
#[derive(Component, Debug, Clone, Serialize, Deserialize)]
pub struct AIConfig {
    /// Дистанция (пиксели между левыми краями), которую AI держит
    pub preferred_range: f32,
    /// Шанс заблокировать входящую атаку (per decision)
    pub block_probability: f32,
    /// Шанс отступить при слишком близкой дистанции
    pub retreat_probability: f32,
    /// Шанс спонтанного прыжка
    pub jump_probability: f32,
    /// Кадры принудительного блока после решения блокировать
    pub block_duration: u32,
}

impl Default for AIConfig {
    fn default() -> Self {
        Self {
            preferred_range: 50.0,
            block_probability: 0.6,
            retreat_probability: 0.02,
            jump_probability: 0.01,
            block_duration: 20,
        }
    }
}

impl AIConfig {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        let (preferred_range, block_probability, retreat_probability, jump_probability) =
            match difficulty {
                Difficulty::Easy => (100.0, 0.3, 0.02, 0.01),
                Difficulty::Normal => (80.0, 0.5, 0.01, 0.005),
                Difficulty::Hard => (60.0, 0.7, 0.005, 0.01),
            };
        Self {
            preferred_range,
            block_probability,
            retreat_probability,
            jump_probability,
            block_duration: 20,
        }
    }
}

/// Снимок бойца для decision (иммутабельный pre-pass, без borrow конфликтов)
#[derive(Debug, Clone, Copy)]
pub struct AiView {
    pub x: f32,
    pub state: FighterState,
    pub stun_timer: u32,
    pub attack_cooldown: u32,
    pub on_ground: bool,
    pub forced_block_timer: u32,
}

/// Решение AI за тик
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiDecision {
    /// Занят (stun, атака, воздух) — ничего не делаем
    Wait,
    /// Заблокировать входящую атаку (+ forced_block_timer)
    Block,
    /// Идти к противнику
    Approach { right: bool },
    /// Атаковать (индекс в каталоге)
    Attack { index: usize },
    /// Отступить, не теряя противника из виду
    Retreat { right: bool },
    /// Спонтанный прыжок
    Jump,
    /// Держать принудительный блок
    HoldBlock,
    /// Ничего интересного — стоять
    Idle,
}

/// Приоритетные правила: первое сработавшее выигрывает.
///
/// 1. Занят (Ko / stun / атака / воздух) → Wait
/// 2. Противник замахнулся в зоне досягаемости → Block с шансом
///    block_probability (в воздухе решение сгорает — Wait)
/// 3. Далеко → Approach
/// 4. В зоне атаки и cooldown готов → случайная атака из каталога
/// 5. Слишком близко → Retreat с шансом retreat_probability
/// 6. Спонтанный Jump с шансом jump_probability
/// 7. Принудительный блок ещё тикает → HoldBlock
/// 8. Idle
pub fn decide(
    me: &AiView,
    opponent: &AiView,
    config: &AIConfig,
    attack_count: usize,
    rng: &mut impl Rng,
) -> AiDecision {
    let busy = me.state == FighterState::Ko
        || (me.state == FighterState::Hitstun && me.stun_timer > 0)
        || me.state.is_attacking()
        || me.state.is_airborne_state();
    if busy {
        return AiDecision::Wait;
    }

    let dx = opponent.x - me.x;
    let distance = dx.abs();

    // Реакция на замах противника
    let incoming = matches!(
        opponent.state,
        FighterState::AttackStartup | FighterState::AttackActive
    );
    if distance < config.preferred_range + 20.0 && incoming {
        if rng.gen::<f32>() < config.block_probability {
            if me.on_ground {
                return AiDecision::Block;
            }
            // Решение принято, но в воздухе блока нет — сгорает
            return AiDecision::Wait;
        }
    }

    if distance > config.preferred_range {
        return AiDecision::Approach { right: dx > 0.0 };
    }

    if me.attack_cooldown == 0 && attack_count > 0 {
        return AiDecision::Attack {
            index: rng.gen_range(0..attack_count),
        };
    }

    if distance < config.preferred_range * 0.5 && rng.gen::<f32>() < config.retreat_probability {
        return AiDecision::Retreat { right: dx <= 0.0 };
    }

    if distance > 20.0 && me.on_ground && rng.gen::<f32>() < config.jump_probability {
        return AiDecision::Jump;
    }

    if me.state == FighterState::Block && me.forced_block_timer > 0 {
        return AiDecision::HoldBlock;
    }

    AiDecision::Idle
}

/// Система: decision + применение для всех AI-бойцов.
///
/// Pre-pass собирает снимки ВСЕХ бойцов (AI и human), решения
/// применяются в порядке Entity ID — итерация детерминистична.
pub fn ai_decisions(
    mut fighters: Query<
        (
            Entity,
            &Transform,
            &mut FighterBody,
            &mut FighterMachine,
            Option<&AiControlled>,
            Option<&AIConfig>,
        ),
        With<Fighter>,
    >,
    stage: Res<StageConfig>,
    catalog: Res<AttackCatalog>,
    mut rng: ResMut<DeterministicRng>,
) {
    let mut views: HashMap<Entity, AiView> = HashMap::new();
    let mut controlled: Vec<(Entity, Entity, AIConfig)> = Vec::new();

    for (entity, transform, body, machine, ai, config) in fighters.iter() {
        views.insert(
            entity,
            AiView {
                x: transform.translation.x,
                state: machine.state,
                stun_timer: machine.stun_timer,
                attack_cooldown: machine.attack_cooldown,
                on_ground: body.on_ground,
                forced_block_timer: machine.forced_block_timer,
            },
        );
        if let Some(ai) = ai {
            controlled.push((entity, ai.opponent, config.cloned().unwrap_or_default()));
        }
    }

    controlled.sort_by_key(|(entity, _, _)| entity.index());

    for (entity, opponent, config) in controlled {
        let Some(me) = views.get(&entity).copied() else {
            continue;
        };
        let Some(opp) = views.get(&opponent).copied() else {
            crate::log_warning(&format!(
                "AI {:?}: opponent {:?} not found, skipping decision",
                entity, opponent
            ));
            continue;
        };

        let decision = decide(&me, &opp, &config, catalog.len(), &mut rng.rng);

        let Ok((_, _, mut body, mut machine, _, _)) = fighters.get_mut(entity) else {
            continue;
        };
        apply_decision(decision, &mut body, &mut machine, &stage, &catalog, &config);
    }
}

/// Применяет decision через те же переходы, что доступны human input'у
fn apply_decision(
    decision: AiDecision,
    body: &mut FighterBody,
    machine: &mut FighterMachine,
    stage: &StageConfig,
    catalog: &AttackCatalog,
    config: &AIConfig,
) {
    match decision {
        AiDecision::Wait | AiDecision::HoldBlock => {}

        AiDecision::Block => {
            enter_state(machine, body, stage, FighterState::Block);
            machine.forced_block_timer = config.block_duration;
        }

        // Ходьба в обе стороны разворачивает бойца по движению
        // (отступающий поворачивается спиной к противнику)
        AiDecision::Approach { right } | AiDecision::Retreat { right } => {
            body.facing_right = right;
            enter_state(machine, body, stage, FighterState::Walk);
            body.velocity.x = if right { stage.walk_speed } else { -stage.walk_speed };
        }

        // Атака не трогает facing — бьём туда, куда уже смотрим
        AiDecision::Attack { index } => {
            if let Some(name) = catalog.get(index).map(|atk| atk.name.clone()) {
                start_attack(machine, body, stage, catalog, &name);
            }
        }

        AiDecision::Jump => {
            enter_state(machine, body, stage, FighterState::JumpRise);
        }

        AiDecision::Idle => {
            enter_state(machine, body, stage, FighterState::Idle);
            body.velocity.x = 0.0;
        }
    }
}
