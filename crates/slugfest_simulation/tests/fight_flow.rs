//! Интеграционные тесты боя: полный pipeline через FixedUpdate
//! (fighter update → hitbox → damage → round) с покадровым контролем.

use bevy::prelude::*;
use slugfest_simulation::*;

/// Player (с InputState, скриптуем руками) против пассивного Enemy
/// на дистанции удара.
fn setup_scripted_duel(app: &mut App) -> (Entity, Entity) {
    let stage = app.world().resource::<StageConfig>().clone();
    let world = app.world_mut();

    let (player, enemy) = {
        let mut commands = world.commands();
        let player = spawn_fighter(&mut commands, Side::Player, 100.0, &stage);
        let enemy = spawn_fighter(&mut commands, Side::Enemy, 200.0, &stage);
        (player, enemy)
    };
    world.flush();

    world.entity_mut(player).insert(InputState::default());
    (player, enemy)
}

/// Два AI-бойца на стартовых позициях
fn setup_ai_bout(app: &mut App) -> (Entity, Entity) {
    let stage = app.world().resource::<StageConfig>().clone();
    let world = app.world_mut();

    let (player, enemy) = {
        let mut commands = world.commands();
        let player = spawn_fighter(&mut commands, Side::Player, 100.0, &stage);
        let enemy = spawn_fighter(&mut commands, Side::Enemy, 450.0, &stage);
        (player, enemy)
    };
    world.flush();

    world
        .entity_mut(player)
        .insert((AiControlled { opponent: enemy }, AIConfig::default()));
    world
        .entity_mut(enemy)
        .insert((AiControlled { opponent: player }, AIConfig::default()));
    (player, enemy)
}

fn press(app: &mut App, entity: Entity, action: InputAction) {
    app.world_mut()
        .get_mut::<InputState>(entity)
        .unwrap()
        .press(action);
}

fn health_of(app: &mut App, entity: Entity) -> f32 {
    app.world().get::<Health>(entity).unwrap().current
}

#[test]
fn test_punch_hits_exactly_once() {
    let mut app = create_headless_app(1);
    let (player, enemy) = setup_scripted_duel(&mut app);

    press(&mut app, player, InputAction::LightAttack);

    // lightPunch: startup 5, active 3, recovery 10 — прогоняем всю атаку
    // с запасом. Hitbox живёт 3 кадра поверх цели, но бьёт один раз.
    for _ in 0..25 {
        step(&mut app);
    }

    assert_eq!(health_of(&mut app, enemy), 95.0);
}

#[test]
fn test_unblocked_hit_causes_hitstun_and_knockback() {
    let mut app = create_headless_app(1);
    let (player, enemy) = setup_scripted_duel(&mut app);

    let enemy_x_before = app.world().get::<Transform>(enemy).unwrap().translation.x;

    press(&mut app, player, InputAction::LightAttack);
    // Тики 0..7: hit_frame наступает на 7-м
    for _ in 0..8 {
        step(&mut app);
    }

    assert_eq!(health_of(&mut app, enemy), 95.0);
    let machine = app.world().get::<FighterMachine>(enemy).unwrap();
    assert_eq!(machine.state, FighterState::Hitstun);
    assert!(machine.stun_timer > 0);

    // Knockback вправо (атакующий смотрит вправо)
    step(&mut app);
    let enemy_x_after = app.world().get::<Transform>(enemy).unwrap().translation.x;
    assert!(enemy_x_after > enemy_x_before);
}

#[test]
fn test_blocked_hit_chips_half_damage() {
    let mut app = create_headless_app(1);
    let (player, enemy) = setup_scripted_duel(&mut app);
    app.world_mut().entity_mut(enemy).insert(InputState::default());

    // Enemy держит блок с первого кадра
    press(&mut app, enemy, InputAction::Block);
    press(&mut app, player, InputAction::LightAttack);

    for _ in 0..8 {
        step(&mut app);
    }

    // 5 × 0.5 = 2.5 chip damage
    assert_eq!(health_of(&mut app, enemy), 97.5);
}

#[test]
fn test_ko_declares_winner() {
    let mut app = create_headless_app(1);
    let (player, enemy) = setup_scripted_duel(&mut app);

    app.world_mut().get_mut::<Health>(enemy).unwrap().current = 5.0;

    press(&mut app, player, InputAction::LightAttack);
    for _ in 0..8 {
        step(&mut app);
    }

    assert_eq!(health_of(&mut app, enemy), 0.0);
    assert_eq!(
        app.world().get::<FighterMachine>(enemy).unwrap().state,
        FighterState::Ko
    );
    assert_eq!(
        app.world().resource::<MatchState>().winner,
        Some(Side::Player)
    );
}

#[test]
fn test_ko_fighter_takes_no_further_hits() {
    let mut app = create_headless_app(1);
    let (player, enemy) = setup_scripted_duel(&mut app);

    app.world_mut().get_mut::<Health>(enemy).unwrap().current = 5.0;

    press(&mut app, player, InputAction::LightAttack);
    for _ in 0..25 {
        step(&mut app);
    }
    assert_eq!(health_of(&mut app, enemy), 0.0);

    // Вторая атака по трупу — ничего не меняет
    app.world_mut()
        .get_mut::<InputState>(player)
        .unwrap()
        .release(InputAction::LightAttack);
    step(&mut app);
    press(&mut app, player, InputAction::LightAttack);
    for _ in 0..25 {
        step(&mut app);
    }
    assert_eq!(health_of(&mut app, enemy), 0.0);
    assert_eq!(
        app.world().get::<FighterMachine>(enemy).unwrap().state,
        FighterState::Ko
    );
}

#[test]
fn test_ko_ai_fighter_stays_down() {
    let mut app = create_headless_app(3);
    let (player, enemy) = setup_scripted_duel(&mut app);

    // Enemy под AI (вероятностные правила выключены — блок не спасёт)
    let quiet = AIConfig {
        block_probability: 0.0,
        retreat_probability: 0.0,
        jump_probability: 0.0,
        ..AIConfig::default()
    };
    app.world_mut()
        .entity_mut(enemy)
        .insert((AiControlled { opponent: player }, quiet));

    app.world_mut().get_mut::<Health>(enemy).unwrap().current = 5.0;
    press(&mut app, player, InputAction::LightAttack);
    for _ in 0..8 {
        step(&mut app);
    }
    assert_eq!(
        app.world().get::<FighterMachine>(enemy).unwrap().state,
        FighterState::Ko
    );

    // AI контроллер не поднимает труп — ни одним последующим тиком
    for frame in 0..120 {
        step(&mut app);
        assert_eq!(
            app.world().get::<FighterMachine>(enemy).unwrap().state,
            FighterState::Ko,
            "frame {}",
            frame
        );
    }
    assert_eq!(health_of(&mut app, enemy), 0.0);
}

#[test]
fn test_round_reset_restores_fighters() {
    let mut app = create_headless_app(1);
    let (player, enemy) = setup_scripted_duel(&mut app);

    // Добиваем enemy
    app.world_mut().get_mut::<Health>(enemy).unwrap().current = 5.0;
    press(&mut app, player, InputAction::LightAttack);
    for _ in 0..25 {
        step(&mut app);
    }
    assert!(app.world().resource::<MatchState>().winner.is_some());

    app.world_mut().send_event(RoundReset);
    step(&mut app);

    assert!(app.world().resource::<MatchState>().winner.is_none());
    for entity in [player, enemy] {
        let spawn = app.world().get::<SpawnPoint>(entity).unwrap().0;
        let transform = app.world().get::<Transform>(entity).unwrap();
        assert_eq!(transform.translation.x, spawn.x);
        assert_eq!(transform.translation.y, spawn.y);

        assert_eq!(health_of(&mut app, entity), 100.0);
        assert_eq!(
            app.world().get::<FighterMachine>(entity).unwrap().state,
            FighterState::Idle
        );
    }

    // Живых hitbox'ов не осталось
    let world = app.world_mut();
    let mut hitboxes = world.query::<&ActiveHitbox>();
    assert_eq!(hitboxes.iter(world).count(), 0);
}

#[test]
fn test_ai_bout_health_stays_bounded() {
    let mut app = create_headless_app(42);
    let (player, enemy) = setup_ai_bout(&mut app);

    for _ in 0..600 {
        step(&mut app);

        for entity in [player, enemy] {
            let health = app.world().get::<Health>(entity).unwrap();
            assert!(health.current >= 0.0);
            assert!(health.current <= health.max);
        }

        if app.world().resource::<MatchState>().winner.is_some() {
            break;
        }
    }
}

#[test]
fn test_ai_bout_fighters_stay_in_arena() {
    let mut app = create_headless_app(7);
    let (player, enemy) = setup_ai_bout(&mut app);
    let stage = app.world().resource::<StageConfig>().clone();

    for _ in 0..600 {
        step(&mut app);

        for entity in [player, enemy] {
            let x = app.world().get::<Transform>(entity).unwrap().translation.x;
            let body = app.world().get::<FighterBody>(entity).unwrap();
            assert!(x >= 0.0);
            assert!(x + body.width <= stage.canvas_width);
        }
    }
}
