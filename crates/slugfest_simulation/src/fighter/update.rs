//! Per-tick update бойца: таймеры → переходы → физика → animation key
//!
//! Ядро — чистая функция fighter_tick (тестируется без App), системы
//! лишь оборачивают её в ECS запросы. Бойцы с InputState обновляются
//! в фазе PlayerUpdate, без него — в EnemyUpdate (после AI decision).

use bevy::prelude::*;

use crate::catalog::{AttackCatalog, AttackDefinition};
use crate::combat::HitboxSpawned;
use crate::components::{Fighter, FighterBody, SpriteState};
use crate::fighter::state::{anim_key, enter_state, start_attack, FighterMachine, FighterState};
use crate::input::{InputAction, InputState};
use crate::stage::StageConfig;

/// Один кадр жизни бойца. Возвращает определение атаки, чей hitbox
/// нужно заспавнить на этом кадре (максимум один).
///
/// Порядок фаз фиксирован:
/// 1. Декремент таймеров (floor 0)
/// 2. Выход из hitstun при обнулении stun_timer
/// 3. stun_timer > 0 → принудительный Hitstun, ввод не обрабатывается
/// 4. Иначе — dispatch по состоянию
/// 5. Физика: гравитация, интеграция, ground clamp, границы арены
/// 6. Animation key в SpriteState
pub fn fighter_tick(
    transform: &mut Transform,
    body: &mut FighterBody,
    machine: &mut FighterMachine,
    sprite: &mut SpriteState,
    input: Option<&InputState>,
    stage: &StageConfig,
    catalog: &AttackCatalog,
) -> Option<AttackDefinition> {
    // Фаза 1: таймеры
    if machine.stun_timer > 0 {
        machine.stun_timer -= 1;
    }
    if machine.attack_cooldown > 0 {
        machine.attack_cooldown -= 1;
    }
    if machine.block_hit_timer > 0 {
        machine.block_hit_timer -= 1;
    }
    if machine.state == FighterState::Block && machine.forced_block_timer > 0 {
        machine.forced_block_timer -= 1;
    }

    // Фаза 2: hitstun истёк
    if machine.state == FighterState::Hitstun && machine.stun_timer == 0 {
        enter_state(machine, body, stage, FighterState::Idle);
    }

    // Фаза 3/4: оглушённый боец не действует
    let pending = if machine.stun_timer > 0 {
        enter_state(machine, body, stage, FighterState::Hitstun);
        None
    } else {
        process_state(body, machine, input, stage, catalog)
    };

    // Фаза 5: физика
    apply_physics(transform, body, machine, stage);

    // Фаза 6: observable side effect для рендера
    sprite.key = anim_key(machine, catalog);

    pending
}

/// Dispatch по текущему состоянию. Порядок проверок внутри веток —
/// tie-break: первая сработавшая выигрывает и обрывает остальные.
fn process_state(
    body: &mut FighterBody,
    machine: &mut FighterMachine,
    input: Option<&InputState>,
    stage: &StageConfig,
    catalog: &AttackCatalog,
) -> Option<AttackDefinition> {
    match machine.state {
        FighterState::Idle => {
            body.velocity.x = 0.0;
            if let Some(input) = input {
                if input.is_down(InputAction::Block) && body.on_ground {
                    enter_state(machine, body, stage, FighterState::Block);
                    return None;
                }
                if input.is_down(InputAction::MoveLeft) {
                    body.facing_right = false;
                    enter_state(machine, body, stage, FighterState::Walk);
                    return None;
                }
                if input.is_down(InputAction::MoveRight) {
                    body.facing_right = true;
                    enter_state(machine, body, stage, FighterState::Walk);
                    return None;
                }
                if input.just_pressed(InputAction::Jump) && body.on_ground {
                    enter_state(machine, body, stage, FighterState::JumpRise);
                    return None;
                }
                if input.just_pressed(InputAction::LightAttack) && machine.attack_cooldown == 0 {
                    start_attack(machine, body, stage, catalog, "lightPunch");
                    return None;
                }
            }
            None
        }

        FighterState::Walk => {
            if let Some(input) = input {
                if input.is_down(InputAction::Block) && body.on_ground {
                    enter_state(machine, body, stage, FighterState::Block);
                    body.velocity.x = 0.0;
                    return None;
                }

                if input.is_down(InputAction::MoveLeft) {
                    body.velocity.x = -stage.walk_speed;
                    body.facing_right = false;
                } else if input.is_down(InputAction::MoveRight) {
                    body.velocity.x = stage.walk_speed;
                    body.facing_right = true;
                } else {
                    enter_state(machine, body, stage, FighterState::Idle);
                    return None;
                }

                if input.just_pressed(InputAction::Jump) && body.on_ground {
                    enter_state(machine, body, stage, FighterState::JumpRise);
                    return None;
                }
                if input.just_pressed(InputAction::LightAttack) && machine.attack_cooldown == 0 {
                    start_attack(machine, body, stage, catalog, "lightPunch");
                    return None;
                }
            }
            // input = None: AI выставил vx/facing сам, продолжаем идти
            None
        }

        FighterState::JumpRise => {
            // Air attack пре-эмптит переход в падение на том же тике
            if let Some(input) = input {
                if input.just_pressed(InputAction::AirAttack) && machine.attack_cooldown == 0 {
                    start_attack(machine, body, stage, catalog, "airPunch");
                    return None;
                }
            }
            if body.velocity.y >= 0.0 {
                enter_state(machine, body, stage, FighterState::JumpFall);
            }
            None
        }

        FighterState::JumpFall => {
            if let Some(input) = input {
                if input.is_down(InputAction::MoveLeft) {
                    body.velocity.x = -stage.walk_speed;
                    body.facing_right = false;
                } else if input.is_down(InputAction::MoveRight) {
                    body.velocity.x = stage.walk_speed;
                    body.facing_right = true;
                }

                if input.just_pressed(InputAction::AirAttack) && machine.attack_cooldown == 0 {
                    start_attack(machine, body, stage, catalog, "airPunch");
                    return None;
                }
            }
            None
        }

        FighterState::Block => {
            body.velocity.x = 0.0;

            // Принудительный блок подавляет проверки выхода
            if machine.forced_block_timer > 0 {
                return None;
            }

            match input {
                Some(input) if input.is_down(InputAction::Block) => {}
                Some(input) => {
                    if input.is_down(InputAction::MoveLeft) {
                        enter_state(machine, body, stage, FighterState::Walk);
                        body.facing_right = false;
                    } else if input.is_down(InputAction::MoveRight) {
                        enter_state(machine, body, stage, FighterState::Walk);
                        body.facing_right = true;
                    } else {
                        enter_state(machine, body, stage, FighterState::Idle);
                    }
                }
                // Нет источника ввода — forced block истёк, возвращаемся в idle
                None => {
                    enter_state(machine, body, stage, FighterState::Idle);
                }
            }
            None
        }

        FighterState::AttackStartup | FighterState::AttackActive | FighterState::AttackRecovery => {
            handle_attack_state(body, machine, stage, catalog)
        }

        FighterState::Hitstun => {
            // Fallback-ветка: stun уже обнулился, фаза 2 обычно перехватывает
            if machine.stun_timer == 0 {
                enter_state(machine, body, stage, FighterState::Idle);
            }
            body.velocity.x = 0.0;
            None
        }

        FighterState::Ko => {
            // Терминальное: vx заблокирован, переходов нет
            body.velocity.x = 0.0;
            None
        }
    }
}

/// Attack sub-machine, тикает state_timer против текущего AttackDefinition.
///
/// startup → active (спавн hitbox на hit_frame, ровно один) → recovery →
/// idle + cooldown = startup+active+recovery+extra.
fn handle_attack_state(
    body: &mut FighterBody,
    machine: &mut FighterMachine,
    stage: &StageConfig,
    catalog: &AttackCatalog,
) -> Option<AttackDefinition> {
    machine.state_timer += 1;

    // Атака без определения — деградируем в idle (fallback, не фатально)
    let Some(atk) = machine.current_attack.and_then(|i| catalog.get(i)).cloned() else {
        machine.current_attack = None;
        enter_state(machine, body, stage, FighterState::Idle);
        return None;
    };

    match machine.state {
        FighterState::AttackStartup => {
            if machine.state_timer >= atk.startup {
                enter_state(machine, body, stage, FighterState::AttackActive);
            }
            None
        }

        FighterState::AttackActive => {
            let mut pending = None;
            if !machine.hitbox_spawned && machine.state_timer >= atk.hit_frame {
                machine.hitbox_spawned = true;
                pending = Some(atk.clone());
            }
            if machine.state_timer >= atk.active {
                enter_state(machine, body, stage, FighterState::AttackRecovery);
            }
            pending
        }

        FighterState::AttackRecovery => {
            if machine.state_timer >= atk.recovery {
                machine.attack_cooldown = atk.startup + atk.active + atk.recovery + atk.cooldown_extra;
                machine.current_attack = None;
                enter_state(machine, body, stage, FighterState::Idle);
            }
            None
        }

        _ => None,
    }
}

/// Гравитация, интеграция скорости, ground clamp, границы арены.
///
/// Приземление из JumpFall принудительно возвращает в Idle.
fn apply_physics(
    transform: &mut Transform,
    body: &mut FighterBody,
    machine: &mut FighterMachine,
    stage: &StageConfig,
) {
    body.velocity.y += stage.gravity;

    transform.translation.x += body.velocity.x;
    transform.translation.y += body.velocity.y;

    // Ground clamp (+y вниз: ниже ground_y — под землёй)
    if transform.translation.y + body.height >= stage.ground_y {
        transform.translation.y = stage.ground_y - body.height;
        body.velocity.y = 0.0;
        body.on_ground = true;

        if machine.state == FighterState::JumpFall {
            enter_state(machine, body, stage, FighterState::Idle);
        }
    } else {
        body.on_ground = false;
    }

    // Горизонтальные границы арены
    if transform.translation.x < 0.0 {
        transform.translation.x = 0.0;
    }
    if transform.translation.x + body.width > stage.canvas_width {
        transform.translation.x = stage.canvas_width - body.width;
    }
}

/// Система: update бойцов под управлением input capability (human)
pub fn update_player_fighters(
    mut fighters: Query<
        (
            Entity,
            &mut Transform,
            &mut FighterBody,
            &mut FighterMachine,
            &mut SpriteState,
            &InputState,
        ),
        With<Fighter>,
    >,
    stage: Res<StageConfig>,
    catalog: Res<AttackCatalog>,
    mut spawned: EventWriter<HitboxSpawned>,
) {
    for (entity, mut transform, mut body, mut machine, mut sprite, input) in fighters.iter_mut() {
        if let Some(attack) = fighter_tick(
            &mut transform,
            &mut body,
            &mut machine,
            &mut sprite,
            Some(input),
            &stage,
            &catalog,
        ) {
            spawned.write(HitboxSpawned {
                owner: entity,
                attack,
            });
        }
    }
}

/// Система: update бойцов без input capability (AI-driven, после AI decision)
pub fn update_ai_fighters(
    mut fighters: Query<
        (
            Entity,
            &mut Transform,
            &mut FighterBody,
            &mut FighterMachine,
            &mut SpriteState,
        ),
        (With<Fighter>, Without<InputState>),
    >,
    stage: Res<StageConfig>,
    catalog: Res<AttackCatalog>,
    mut spawned: EventWriter<HitboxSpawned>,
) {
    for (entity, mut transform, mut body, mut machine, mut sprite) in fighters.iter_mut() {
        if let Some(attack) = fighter_tick(
            &mut transform,
            &mut body,
            &mut machine,
            &mut sprite,
            None,
            &stage,
            &catalog,
        ) {
            spawned.write(HitboxSpawned {
                owner: entity,
                attack,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputAction;

    struct Harness {
        transform: Transform,
        body: FighterBody,
        machine: FighterMachine,
        sprite: SpriteState,
        input: InputState,
        stage: StageConfig,
        catalog: AttackCatalog,
    }

    impl Harness {
        fn grounded() -> Self {
            let stage = StageConfig::default();
            let body = FighterBody::new(250.0, 280.0);
            let mut h = Self {
                transform: Transform::from_xyz(100.0, stage.ground_y - body.height, 0.0),
                body,
                machine: FighterMachine::default(),
                sprite: SpriteState::default(),
                input: InputState::default(),
                stage,
                catalog: AttackCatalog::default(),
            };
            h.body.on_ground = true;
            h
        }

        /// Один кадр с input'ом, edge-флаги снимаются в конце (как в тике)
        fn tick(&mut self) -> Option<AttackDefinition> {
            let pending = fighter_tick(
                &mut self.transform,
                &mut self.body,
                &mut self.machine,
                &mut self.sprite,
                Some(&self.input),
                &self.stage,
                &self.catalog,
            );
            self.input.end_frame();
            pending
        }

        fn tick_no_input(&mut self) -> Option<AttackDefinition> {
            fighter_tick(
                &mut self.transform,
                &mut self.body,
                &mut self.machine,
                &mut self.sprite,
                None,
                &self.stage,
                &self.catalog,
            )
        }
    }

    #[test]
    fn test_light_punch_timeline() {
        // Сценарий: lightPunch 5/3/10, hit_frame 2, extra 5
        let mut h = Harness::grounded();
        h.input.press(InputAction::LightAttack);

        // Тик 0: just_pressed → attack_startup
        assert!(h.tick().is_none());
        assert_eq!(h.machine.state, FighterState::AttackStartup);
        h.input.release(InputAction::LightAttack);

        // Тики 1..=5: startup (на 5-м переход в active)
        for tick in 1..=5 {
            assert!(h.tick().is_none(), "tick {}", tick);
        }
        assert_eq!(h.machine.state, FighterState::AttackActive);

        // Тик 6: active, hitbox ещё нет (hit_frame = 2)
        assert!(h.tick().is_none());
        assert_eq!(h.machine.state, FighterState::AttackActive);

        // Тик 7: hitbox спавнится ровно один раз
        let spawned = h.tick();
        assert!(spawned.is_some());
        assert_eq!(spawned.unwrap().name, "lightPunch");

        // Тик 8: active истёк → recovery, второго hitbox нет
        assert!(h.tick().is_none());
        assert_eq!(h.machine.state, FighterState::AttackRecovery);

        // Тики 9..=18: recovery, на 18-м возврат в idle
        for _ in 9..=18 {
            assert!(h.tick().is_none());
        }
        // cooldown = 5+3+10+5 = 23
        assert_eq!(h.machine.state, FighterState::Idle);
        assert!(h.machine.current_attack.is_none());
        assert_eq!(h.machine.attack_cooldown, 23);
    }

    #[test]
    fn test_attack_ignored_during_cooldown() {
        let mut h = Harness::grounded();
        h.machine.attack_cooldown = 10;

        h.input.press(InputAction::LightAttack);
        h.tick();
        assert_eq!(h.machine.state, FighterState::Idle);
        // Таймер декрементировался, атака не началась
        assert_eq!(h.machine.attack_cooldown, 9);
    }

    #[test]
    fn test_walk_and_return_to_idle() {
        let mut h = Harness::grounded();

        h.input.press(InputAction::MoveRight);
        h.tick();
        assert_eq!(h.machine.state, FighterState::Walk);
        assert!(h.body.facing_right);

        h.tick();
        assert_eq!(h.body.velocity.x, h.stage.walk_speed);

        h.input.release(InputAction::MoveRight);
        h.tick();
        assert_eq!(h.machine.state, FighterState::Idle);
        assert_eq!(h.body.velocity.x, 0.0);
    }

    #[test]
    fn test_jump_arc_lands_to_idle() {
        let mut h = Harness::grounded();

        h.input.press(InputAction::Jump);
        h.tick();
        assert_eq!(h.machine.state, FighterState::JumpRise);
        assert!(h.body.velocity.y < 0.0);
        h.input.release(InputAction::Jump);

        // Поднимаемся пока vy < 0, потом падение
        let mut saw_fall = false;
        for _ in 0..120 {
            h.tick();
            if h.machine.state == FighterState::JumpFall {
                saw_fall = true;
            }
            if h.body.on_ground && h.machine.state == FighterState::Idle {
                break;
            }
        }
        assert!(saw_fall);
        assert!(h.body.on_ground);
        assert_eq!(h.machine.state, FighterState::Idle);
        assert_eq!(h.transform.translation.y, h.stage.ground_y - h.body.height);
    }

    #[test]
    fn test_air_attack_preempts_fall_transition() {
        let mut h = Harness::grounded();
        h.input.press(InputAction::Jump);
        h.tick();
        h.input.release(InputAction::Jump);
        assert_eq!(h.machine.state, FighterState::JumpRise);

        // Снижаем подъём до нуля: vy >= 0 и air attack на одном тике —
        // атака выигрывает
        h.body.velocity.y = 0.0;
        h.input.press(InputAction::AirAttack);
        h.tick();
        assert_eq!(h.machine.state, FighterState::AttackStartup);
        assert_eq!(h.machine.current_attack, h.catalog.index_of("airPunch"));
    }

    #[test]
    fn test_stun_blocks_input() {
        let mut h = Harness::grounded();
        h.machine.stun_timer = 3;
        h.machine.state = FighterState::Hitstun;

        h.input.press(InputAction::LightAttack);
        h.tick();
        // Оглушён — ввод игнорируется
        assert_eq!(h.machine.state, FighterState::Hitstun);

        // Через оставшиеся кадры — idle
        h.tick();
        h.tick();
        assert_eq!(h.machine.state, FighterState::Idle);
    }

    #[test]
    fn test_block_entry_and_exit() {
        let mut h = Harness::grounded();

        h.input.press(InputAction::Block);
        h.tick();
        assert_eq!(h.machine.state, FighterState::Block);

        h.input.release(InputAction::Block);
        h.input.press(InputAction::MoveLeft);
        h.tick();
        assert_eq!(h.machine.state, FighterState::Walk);
        assert!(!h.body.facing_right);
    }

    #[test]
    fn test_block_not_available_airborne() {
        let mut h = Harness::grounded();
        h.body.on_ground = false;
        h.transform.translation.y -= 50.0;

        h.input.press(InputAction::Block);
        h.tick();
        assert_ne!(h.machine.state, FighterState::Block);
    }

    #[test]
    fn test_forced_block_suppresses_exit_then_expires() {
        let mut h = Harness::grounded();
        h.machine.state = FighterState::Block;
        h.machine.forced_block_timer = 3;

        // Без источника ввода forced block держится пока таймер > 0
        h.tick_no_input();
        assert_eq!(h.machine.state, FighterState::Block);
        h.tick_no_input();
        assert_eq!(h.machine.state, FighterState::Block);

        // Таймер дошёл до нуля → idle
        h.tick_no_input();
        assert_eq!(h.machine.state, FighterState::Idle);
    }

    #[test]
    fn test_horizontal_world_clamp() {
        let mut h = Harness::grounded();
        h.transform.translation.x = 5.0;
        h.body.velocity.x = -20.0;
        h.machine.state = FighterState::Walk;

        h.tick_no_input();
        assert_eq!(h.transform.translation.x, 0.0);

        h.transform.translation.x = h.stage.canvas_width - h.body.width + 30.0;
        h.body.velocity.x = 20.0;
        h.tick_no_input();
        assert_eq!(
            h.transform.translation.x,
            h.stage.canvas_width - h.body.width
        );
    }

    #[test]
    fn test_ko_is_inert() {
        let mut h = Harness::grounded();
        h.machine.state = FighterState::Ko;

        h.input.press(InputAction::LightAttack);
        h.input.press(InputAction::MoveRight);
        h.tick();
        assert_eq!(h.machine.state, FighterState::Ko);
        assert_eq!(h.body.velocity.x, 0.0);
    }
}
