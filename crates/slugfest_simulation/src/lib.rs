//! SLUGFEST Simulation Core
//!
//! ECS-симуляция боя на Bevy 0.16 (strategic layer): два бойца, state machine,
//! hitbox/hurtbox resolution, opponent AI. Рендер/звук/меню — внешние
//! collaborators, ядро работает headless.
//!
//! Тик = один прогон FixedUpdate schedule. Все таймеры считаются в кадрах,
//! ни одна система не читает wall-clock delta, поэтому schedule можно гонять
//! вручную через [`step`] — так тесты получают точный покадровый контроль.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod catalog;
pub mod combat;
pub mod components;
pub mod fighter;
pub mod input;
pub mod stage;

// Re-export базовых типов для удобства
pub use ai::{AIConfig, AIPlugin, AiControlled, Difficulty};
pub use catalog::{AttackCatalog, AttackDefinition};
pub use combat::{
    ActiveHitbox, CombatPlugin, DamageDealt, FighterKo, FighterStruck, HitboxSpawned, MatchState,
    RoundReset,
};
pub use components::{Fighter, FighterBody, Health, HurtboxProfile, Side, SpawnPoint, SpriteState};
pub use fighter::{spawn_fighter, FighterMachine, FighterPlugin, FighterState};
pub use input::{InputAction, InputState};
pub use stage::StageConfig;

/// Фазы одного simulation tick. Порядок фиксирован и повторяет контракт
/// внешнего цикла: human update → AI decision → AI-driven update →
/// hitbox spawn/resolution → damage → round bookkeeping.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickSet {
    PlayerUpdate,
    AiDecision,
    EnemyUpdate,
    Hitboxes,
    Damage,
    Round,
}

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz — один FixedUpdate == один кадр боя
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            // Детерминистичный RNG (seed по умолчанию)
            .insert_resource(DeterministicRng::new(42))
            // Shared data tables
            .init_resource::<StageConfig>()
            .init_resource::<AttackCatalog>()
            .init_resource::<MatchState>()
            .configure_sets(
                FixedUpdate,
                (
                    TickSet::PlayerUpdate,
                    TickSet::AiDecision,
                    TickSet::EnemyUpdate,
                    TickSet::Hitboxes,
                    TickSet::Damage,
                    TickSet::Round,
                )
                    .chain(),
            )
            .add_plugins((FighterPlugin, CombatPlugin, AIPlugin));
    }
}

/// Детерминистичный RNG resource (seeded)
///
/// Все вероятностные решения AI идут через него — одинаковый seed
/// даёт идентичный бой.
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless боя
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .add_plugins(SimulationPlugin)
        .insert_resource(DeterministicRng::new(seed));

    app
}

/// Прогоняет ровно один кадр симуляции.
///
/// Внешний цикл зовёт это раз на display frame; тесты — сколько нужно.
pub fn step(app: &mut App) {
    app.world_mut().run_schedule(FixedUpdate);
}

/// Snapshot мира для сравнения детерминизма
/// (сериализуем компоненты через Debug, сортируем по Entity ID)
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}

use once_cell::sync::Lazy;
use std::sync::Mutex;

// Потокобезопасный глобальный logger (host может подменить свой printer)
static LOGGER: Lazy<Mutex<Option<Box<dyn LogPrinter>>>> = Lazy::new(|| Mutex::new(None));

pub static LOGGER_LEVEL: Lazy<Mutex<LogLevel>> = Lazy::new(|| Mutex::new(LogLevel::Debug));

pub fn set_logger(logger: Box<dyn LogPrinter>) {
    *LOGGER.lock().unwrap() = Some(logger);
}

pub fn set_log_level(level: LogLevel) {
    *LOGGER_LEVEL.lock().unwrap() = level;
}

pub fn set_logger_if_needed(logger: Box<dyn LogPrinter>) {
    if LOGGER.lock().unwrap().is_none() {
        set_logger(logger);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }
}

pub trait LogPrinter: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);
}

pub fn log(message: &str) {
    log_with_level(LogLevel::Debug, message);
}

pub fn log_info(message: &str) {
    log_with_level(LogLevel::Info, message);
}

pub fn log_warning(message: &str) {
    log_with_level(LogLevel::Warning, message);
}

pub fn log_error(message: &str) {
    log_with_level(LogLevel::Error, message);
}

pub fn log_with_level(level: LogLevel, message: &str) {
    // Лочим mutex, достаём logger, вызываем log (timestamp добавляем здесь)
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        if level >= *LOGGER_LEVEL.lock().unwrap() {
            let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
            logger.log(level, &format!("[{}] {}", timestamp, message));
        }
    }
}

struct ConsoleLogger;

impl LogPrinter for ConsoleLogger {
    fn log(&self, level: LogLevel, message: &str) {
        println!("[{}] {}", level.as_str(), message);
    }
}

pub fn init_logger() {
    set_logger_if_needed(Box::new(ConsoleLogger));
}
