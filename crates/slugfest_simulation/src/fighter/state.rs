//! State machine бойца: состояния, контекст, переходы
//!
//! Состояния — закрытый enum, per-state dispatch в update.rs.
//! Ko терминален: из него нет переходов кроме внешнего round reset.

use bevy::prelude::*;

use crate::catalog::AttackCatalog;
use crate::components::FighterBody;
use crate::stage::StageConfig;

/// Состояния бойца
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum FighterState {
    #[default]
    Idle,
    Walk,
    JumpRise,
    JumpFall,
    Block,
    AttackStartup,
    AttackActive,
    AttackRecovery,
    Hitstun,
    /// Терминальное: health == 0
    Ko,
}

impl FighterState {
    /// Боец в одной из трёх фаз атаки
    pub fn is_attacking(&self) -> bool {
        matches!(
            self,
            FighterState::AttackStartup | FighterState::AttackActive | FighterState::AttackRecovery
        )
    }

    /// Боец в воздухе по state machine (jump arc)
    pub fn is_airborne_state(&self) -> bool {
        matches!(self, FighterState::JumpRise | FighterState::JumpFall)
    }
}

/// Контекст state machine бойца: состояние + все кадровые таймеры.
///
/// forced_block_timer — first-class поле (не внешняя ad-hoc мутация):
/// пока > 0, состояние Block не проверяет условия выхода. Любой
/// контроллер (AI или human) может его взвести.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct FighterMachine {
    pub state: FighterState,
    /// Кадры с момента входа в состояние (тикает только attack sub-machine)
    pub state_timer: u32,
    /// Кадры принудительного hitstun/blockstun
    pub stun_timer: u32,
    /// Кадры до возможности следующей атаки
    pub attack_cooldown: u32,
    /// Block-flash feedback таймер
    pub block_hit_timer: u32,
    /// Принудительный блок (AI взводит при решении блокировать)
    pub forced_block_timer: u32,
    /// Индекс текущей атаки в каталоге (на время одной атаки)
    pub current_attack: Option<usize>,
    /// Hitbox текущей атаки уже заспавнен
    pub hitbox_spawned: bool,
}

/// Переход в новое состояние. Идемпотентен: повторный вход — no-op,
/// таймеры не сбрасываются. Из Ko переходов нет.
///
/// Entry-эффекты:
/// - Block: сброс block-flash
/// - Idle / Ko: vx = 0
/// - JumpRise: vy = jump_velocity, отрыв от земли
/// - AttackStartup: сброс hitbox_spawned
/// Выход из Block гасит forced_block_timer.
pub fn enter_state(
    machine: &mut FighterMachine,
    body: &mut FighterBody,
    stage: &StageConfig,
    new_state: FighterState,
) {
    if machine.state == new_state {
        return;
    }
    // Ko терминален: выход только через round reset (полная замена контекста)
    if machine.state == FighterState::Ko {
        return;
    }

    let leaving_block = machine.state == FighterState::Block;
    machine.state = new_state;
    machine.state_timer = 0;

    if leaving_block {
        machine.forced_block_timer = 0;
    }

    match new_state {
        FighterState::Block => {
            machine.block_hit_timer = 0;
        }
        FighterState::Idle => {
            body.velocity.x = 0.0;
        }
        FighterState::JumpRise => {
            body.velocity.y = stage.jump_velocity;
            body.on_ground = false;
        }
        FighterState::AttackStartup => {
            machine.hitbox_spawned = false;
        }
        FighterState::Ko => {
            body.velocity.x = 0.0;
        }
        _ => {}
    }
}

/// Начало атаки по имени из каталога.
///
/// No-op (с предупреждением в лог для неизвестного имени) когда:
/// - attack_cooldown > 0
/// - имени нет в каталоге (configuration-missing, не фатально)
pub fn start_attack(
    machine: &mut FighterMachine,
    body: &mut FighterBody,
    stage: &StageConfig,
    catalog: &AttackCatalog,
    name: &str,
) {
    if machine.attack_cooldown > 0 {
        return;
    }

    let Some(index) = catalog.index_of(name) else {
        crate::log_warning(&format!("attack '{}' not found in catalog, ignoring", name));
        return;
    };

    machine.current_attack = Some(index);
    enter_state(machine, body, stage, FighterState::AttackStartup);
}

/// Маппинг state → animation key для рендера.
///
/// Block-flash таймер перекрывает всё ключом "blockHit".
pub fn anim_key(machine: &FighterMachine, catalog: &AttackCatalog) -> String {
    if machine.block_hit_timer > 0 {
        return "blockHit".to_string();
    }

    match machine.state {
        FighterState::Idle => "idle".to_string(),
        FighterState::Walk => "walk".to_string(),
        FighterState::JumpRise | FighterState::JumpFall => "jump".to_string(),
        FighterState::Block => "block".to_string(),
        FighterState::AttackStartup | FighterState::AttackActive | FighterState::AttackRecovery => {
            machine
                .current_attack
                .and_then(|i| catalog.get(i))
                .map(|atk| atk.anim_key.clone())
                .unwrap_or_else(|| "idle".to_string())
        }
        FighterState::Hitstun => "hit".to_string(),
        FighterState::Ko => "ko".to_string(),
    }
}
