//! Константы арены и боя (shared, read-only)

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Параметры арены и общие боевые константы.
///
/// Передаётся явно как resource — никакого ambient global state.
/// Единицы: пиксели, пиксели/кадр, кадры.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct StageConfig {
    pub canvas_width: f32,
    pub canvas_height: f32,
    /// Y плоскости земли (верх бойца = ground_y - height когда стоит)
    pub ground_y: f32,
    /// Гравитация (пиксели/кадр², +y вниз)
    pub gravity: f32,
    pub walk_speed: f32,
    /// Начальная скорость прыжка (отрицательная — вверх)
    pub jump_velocity: f32,
    /// Кадры hitstun после небокированного удара
    pub hit_stun_frames: u32,
    /// Множитель урона при блоке
    pub block_damage_reduction: f32,
    /// Множитель горизонтального knockback при блоке
    pub block_knockback_reduction: f32,
    /// Кадры blockstun после заблокированного удара
    pub block_stun_frames: u32,
    /// Кадры block-flash (чисто визуальный feedback)
    pub block_hit_frames: u32,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            canvas_width: 800.0,
            canvas_height: 450.0,
            ground_y: 300.0,
            gravity: 0.7,
            walk_speed: 3.5,
            jump_velocity: -12.0,
            hit_stun_frames: 20,
            block_damage_reduction: 0.5,
            block_knockback_reduction: 0.5,
            block_stun_frames: 8,
            block_hit_frames: 6,
        }
    }
}
