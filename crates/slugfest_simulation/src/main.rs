//! Headless AI vs AI бой — smoke run симуляции без рендера
//!
//! Два AI-бойца, фиксированный seed, покадровый прогон до KO
//! (или лимита кадров). Health раз в секунду уходит в лог.

use bevy::prelude::*;
use slugfest_simulation::*;

const MAX_FRAMES: u32 = 3600; // 60 секунд боя при 60Hz

fn main() {
    init_logger();
    log_info("🎮 SLUGFEST headless bout starting (seed 42)");

    let mut app = create_headless_app(42);

    let stage = app.world().resource::<StageConfig>().clone();
    let world = app.world_mut();

    let (player, enemy) = {
        let mut commands = world.commands();
        let player = spawn_fighter(&mut commands, Side::Player, 100.0, &stage);
        let enemy = spawn_fighter(&mut commands, Side::Enemy, 450.0, &stage);
        (player, enemy)
    };
    world.flush();

    // Оба бойца под AI: один Normal, другой Hard
    world
        .entity_mut(player)
        .insert((AiControlled { opponent: enemy }, AIConfig::for_difficulty(Difficulty::Normal)));
    world
        .entity_mut(enemy)
        .insert((AiControlled { opponent: player }, AIConfig::for_difficulty(Difficulty::Hard)));

    for frame in 1..=MAX_FRAMES {
        step(&mut app);

        if frame % 60 == 0 {
            let world = app.world_mut();
            let mut query = world.query::<(&Fighter, &Health, &FighterMachine)>();
            for (fighter, health, machine) in query.iter(world) {
                log_info(&format!(
                    "⏱️ t={}s {:?}: {:.1} HP, {:?}",
                    frame / 60,
                    fighter.side,
                    health.current,
                    machine.state
                ));
            }
        }

        if let Some(winner) = app.world().resource::<MatchState>().winner {
            log_info(&format!("🏆 bout over at frame {}: {:?} wins", frame, winner));
            return;
        }
    }

    log_warning("⏰ frame limit reached, no KO — draw");
}
