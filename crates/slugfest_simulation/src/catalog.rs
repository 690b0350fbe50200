//! Каталог атак (leaf, immutable)
//!
//! Таблица AttackDefinition, shared обоими бойцами. Боец держит только
//! индекс текущей атаки — каталог передаётся явно как resource.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Определение атаки (запись каталога, неизменяемая)
///
/// Тайминги в кадрах: startup → active → recovery. Геометрия hitbox
/// задана в facing-right системе владельца и зеркалится при запросе
/// bounds, не при спавне.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackDefinition {
    pub name: String,
    /// Кадры до активного окна
    pub startup: u32,
    /// Кадры активного окна (она же длительность hitbox)
    pub active: u32,
    /// Кадры восстановления после активного окна
    pub recovery: u32,
    /// Кадр внутри активного окна, на котором спавнится hitbox.
    /// Инвариант: hit_frame < active.
    pub hit_frame: u32,
    pub damage: f32,
    pub knockback_x: f32,
    pub knockback_y: f32,
    pub anim_key: String,
    pub offset_x: f32,
    pub offset_y: f32,
    pub width: f32,
    pub height: f32,
    /// Доп. кадры cooldown сверх startup+active+recovery
    pub cooldown_extra: u32,
}

/// Каталог атак — упорядоченный read-only список
#[derive(Resource, Debug, Clone)]
pub struct AttackCatalog {
    pub attacks: Vec<AttackDefinition>,
}

impl Default for AttackCatalog {
    fn default() -> Self {
        Self::new(vec![
            AttackDefinition {
                name: "lightPunch".to_string(),
                startup: 5,
                active: 3,
                recovery: 10,
                hit_frame: 2,
                damage: 5.0,
                knockback_x: 5.0,
                knockback_y: -3.0,
                anim_key: "lightPunch".to_string(),
                offset_x: 135.0,
                offset_y: 225.0,
                width: 30.0,
                height: 20.0,
                cooldown_extra: 5,
            },
            AttackDefinition {
                name: "airPunch".to_string(),
                startup: 4,
                active: 2,
                recovery: 12,
                hit_frame: 1,
                damage: 4.0,
                knockback_x: 4.0,
                knockback_y: -2.0,
                anim_key: "airPunch".to_string(),
                offset_x: 135.0,
                offset_y: 260.0,
                width: 30.0,
                height: 20.0,
                cooldown_extra: 5,
            },
        ])
    }
}

impl AttackCatalog {
    /// Создаёт каталог, логируя (не фатально) записи с нарушенным
    /// инвариантом hit_frame < active.
    pub fn new(attacks: Vec<AttackDefinition>) -> Self {
        for atk in &attacks {
            if atk.hit_frame >= atk.active {
                crate::log_warning(&format!(
                    "attack '{}': hit_frame {} >= active {} (hitbox никогда не заспавнится вовремя)",
                    atk.name, atk.hit_frame, atk.active
                ));
            }
        }
        Self { attacks }
    }

    pub fn len(&self) -> usize {
        self.attacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attacks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&AttackDefinition> {
        self.attacks.get(index)
    }

    /// Поиск по имени → индекс. Неизвестное имя — None (вызывающий логирует).
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.attacks.iter().position(|a| a.name == name)
    }
}
