//! Hitbox/hurtbox геометрия и lifecycle
//!
//! Геометрия атак задана в facing-right системе владельца и зеркалится
//! при ЗАПРОСЕ bounds по текущему facing — hitbox «следует» за бойцом,
//! если тот развернулся или сдвинулся после спавна.
//!
//! Каждый hitbox бьёт каждого бойца максимум один раз (struck list).

use bevy::prelude::*;

use super::damage::FighterStruck;
use crate::catalog::AttackDefinition;
use crate::components::{Fighter, FighterBody, HurtboxProfile, SpriteState};
use crate::fighter::{FighterMachine, FighterState};

/// Axis-aligned прямоугольник в canvas координатах (x,y — левый верхний угол)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Aabb {
    /// Пересечение по обеим осям. Касание ребром — не пересечение.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }
}

/// Запрос на спавн hitbox (пишется fighter update на hit_frame атаки)
#[derive(Event, Debug, Clone)]
pub struct HitboxSpawned {
    pub owner: Entity,
    pub attack: AttackDefinition,
}

/// Живой hitbox — отдельная entity, привязанная к владельцу.
///
/// Живёт active кадров атаки, коллизии проверяются каждый кадр жизни
/// (включая кадр истечения).
#[derive(Component, Debug, Clone)]
pub struct ActiveHitbox {
    pub owner: Entity,
    pub attack: AttackDefinition,
    /// Кадры с момента спавна (инкремент до проверки коллизий)
    pub age: u32,
    /// Время жизни = active кадры атаки
    pub duration: u32,
    /// Кого уже ударили (один hit на цель за жизнь hitbox'а)
    pub struck: Vec<Entity>,
}

/// Bounds hitbox'а в мировых координатах, отзеркаленные по facing владельца
pub fn hitbox_bounds(
    owner_transform: &Transform,
    owner_body: &FighterBody,
    attack: &AttackDefinition,
) -> Aabb {
    let x = if owner_body.facing_right {
        owner_transform.translation.x + attack.offset_x
    } else {
        owner_transform.translation.x + owner_body.width - attack.offset_x - attack.width
    };

    Aabb {
        x,
        y: owner_transform.translation.y + attack.offset_y,
        width: attack.width,
        height: attack.height,
    }
}

/// Bounds hurtbox'а бойца.
///
/// Без HurtboxProfile — полный rect тела. С профилем — геометрия по
/// текущему animation key; отсутствующий ключ = fail closed (None,
/// коллизии нет), размеры не угадываем.
pub fn hurtbox_bounds(
    transform: &Transform,
    body: &FighterBody,
    sprite: &SpriteState,
    profile: Option<&HurtboxProfile>,
) -> Option<Aabb> {
    let Some(profile) = profile else {
        return Some(Aabb {
            x: transform.translation.x,
            y: transform.translation.y,
            width: body.width,
            height: body.height,
        });
    };

    let Some(rect) = profile.map.get(&sprite.key) else {
        crate::log_warning(&format!(
            "hurtbox profile has no entry for anim key '{}', fail closed",
            sprite.key
        ));
        return None;
    };

    let x = if body.facing_right {
        transform.translation.x + rect.offset_x
    } else {
        transform.translation.x + body.width - rect.offset_x - rect.width
    };

    Some(Aabb {
        x,
        y: transform.translation.y + rect.offset_y,
        width: rect.width,
        height: rect.height,
    })
}

/// Система: материализует HitboxSpawned события в ActiveHitbox entities
pub fn spawn_hitboxes(mut commands: Commands, mut events: EventReader<HitboxSpawned>) {
    for event in events.read() {
        crate::log(&format!(
            "🥊 hitbox '{}' spawned by {:?}",
            event.attack.name, event.owner
        ));

        commands.spawn(ActiveHitbox {
            owner: event.owner,
            attack: event.attack.clone(),
            age: 0,
            duration: event.attack.active,
            struck: Vec::new(),
        });
    }
}

/// Система: старение hitbox'ов, проверка пересечений, despawn истёкших.
///
/// Порядок на кадре: age += 1 → коллизии → despawn при age >= duration
/// (кадр истечения ещё проверяется).
pub fn resolve_hitboxes(
    mut commands: Commands,
    mut hitboxes: Query<(Entity, &mut ActiveHitbox)>,
    fighters: Query<
        (
            Entity,
            &Transform,
            &FighterBody,
            &FighterMachine,
            &SpriteState,
            Option<&HurtboxProfile>,
        ),
        With<Fighter>,
    >,
    mut struck: EventWriter<FighterStruck>,
) {
    for (hitbox_entity, mut hitbox) in hitboxes.iter_mut() {
        hitbox.age += 1;

        // Владелец пропал — hitbox сиротеет
        let Ok((_, owner_transform, owner_body, _, _, _)) = fighters.get(hitbox.owner) else {
            crate::log_warning(&format!(
                "hitbox '{}': owner {:?} is gone, dropping",
                hitbox.attack.name, hitbox.owner
            ));
            commands.entity(hitbox_entity).despawn();
            continue;
        };

        let bounds = hitbox_bounds(owner_transform, owner_body, &hitbox.attack);

        for (target, transform, body, machine, sprite, profile) in fighters.iter() {
            if target == hitbox.owner {
                continue;
            }
            // KO терминален — труп не бьём
            if machine.state == FighterState::Ko {
                continue;
            }
            if hitbox.struck.contains(&target) {
                continue;
            }

            let Some(hurtbox) = hurtbox_bounds(transform, body, sprite, profile) else {
                continue;
            };

            if bounds.overlaps(&hurtbox) {
                hitbox.struck.push(target);
                struck.write(FighterStruck {
                    target,
                    attacker: hitbox.owner,
                    attacker_facing_right: owner_body.facing_right,
                    attack: hitbox.attack.clone(),
                });
            }
        }

        if hitbox.age >= hitbox.duration {
            commands.entity(hitbox_entity).despawn();
        }
    }
}
