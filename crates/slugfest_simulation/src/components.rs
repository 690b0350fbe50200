//! Базовые ECS компоненты бойца
//!
//! Координаты canvas-style: origin в левом верхнем углу, +y вниз,
//! Transform.translation — левый верхний угол бойца (пиксели).
//! Скорости — пиксели за кадр, интеграция без delta.

use bevy::prelude::*;
use std::collections::HashMap;

/// Сторона боя. Победитель — сторона, чей противник вошёл в KO.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum Side {
    #[default]
    Player,
    Enemy,
}

impl Side {
    pub fn opposite(&self) -> Side {
        match self {
            Side::Player => Side::Enemy,
            Side::Enemy => Side::Player,
        }
    }
}

/// Маркер бойца (ровно два на матч)
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct Fighter {
    pub side: Side,
}

/// Физическое тело бойца: габариты, facing, скорость
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct FighterBody {
    /// Ширина (пиксели)
    pub width: f32,
    /// Высота (пиксели)
    pub height: f32,
    /// Смотрит вправо (hitbox/hurtbox геометрия зеркалится при false)
    pub facing_right: bool,
    /// Скорость (пиксели/кадр)
    pub velocity: Vec2,
    /// Стоит на земле (ground clamp выставляет каждый кадр)
    pub on_ground: bool,
}

impl Default for FighterBody {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl FighterBody {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            facing_right: true,
            velocity: Vec2::ZERO,
            on_ground: false,
        }
    }
}

/// Здоровье бойца
///
/// Инвариант: 0.0 ≤ current ≤ max. Дробное из-за block chip damage
/// (damage × blockDamageReduction). Лечения внутри раунда нет.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    /// Наносит урон, клампит на нуле (health не бывает отрицательным)
    pub fn take_damage(&mut self, amount: f32) {
        self.current = (self.current - amount).max(0.0);
    }
}

/// Точка спавна — для round reset
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct SpawnPoint(pub Vec2);

/// Текущий animation key — observable side effect для рендера.
///
/// Обновляется в конце каждого fighter tick из state machine
/// (block-flash таймер перекрывает на "blockHit").
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct SpriteState {
    pub key: String,
}

impl Default for SpriteState {
    fn default() -> Self {
        Self {
            key: "idle".to_string(),
        }
    }
}

/// Hurtbox override от rendering collaborator: геометрия по animation key.
///
/// Без этого компонента hurtbox = полный rect тела. Если компонент есть,
/// но текущего ключа в карте нет — resolver обязан fail closed (нет
/// коллизии), размеры не угадываем.
#[derive(Component, Debug, Clone, Default)]
pub struct HurtboxProfile {
    pub map: HashMap<String, HurtboxRect>,
}

/// Геометрия hurtbox в facing-right системе владельца
#[derive(Debug, Clone, Copy)]
pub struct HurtboxRect {
    pub offset_x: f32,
    pub offset_y: f32,
    pub width: f32,
    pub height: f32,
}

/// Данные для рендера за тик: `(animKey, x, y, w, h, facingRight)`
#[derive(Debug, Clone)]
pub struct DrawData {
    pub anim_key: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub facing_right: bool,
}

/// Draw-data accessor для rendering collaborator
pub fn draw_data(transform: &Transform, body: &FighterBody, sprite: &SpriteState) -> DrawData {
    DrawData {
        anim_key: sprite.key.clone(),
        x: transform.translation.x,
        y: transform.translation.y,
        width: body.width,
        height: body.height,
        facing_right: body.facing_right,
    }
}
