//! Абстрактный input capability
//!
//! Ядро не знает про клавиатуру/тач — внешний слой транслирует физический
//! ввод в логические действия через press/release, а в конце кадра зовёт
//! end_frame (edge-triggered события живут ровно один тик).

use bevy::prelude::*;
use std::collections::HashSet;

/// Логические действия, которые опрашивает state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveLeft,
    MoveRight,
    Jump,
    LightAttack,
    AirAttack,
    Block,
}

/// Состояние ввода одного бойца.
///
/// Бойцы без этого компонента обновляются с input = None (AI-driven).
#[derive(Component, Debug, Clone, Default)]
pub struct InputState {
    down: HashSet<InputAction>,
    prev: HashSet<InputAction>,
}

impl InputState {
    pub fn is_down(&self, action: InputAction) -> bool {
        self.down.contains(&action)
    }

    /// Edge-triggered: true ровно один тик на физическое нажатие
    pub fn just_pressed(&self, action: InputAction) -> bool {
        self.down.contains(&action) && !self.prev.contains(&action)
    }

    pub fn press(&mut self, action: InputAction) {
        self.down.insert(action);
    }

    pub fn release(&mut self, action: InputAction) {
        self.down.remove(&action);
    }

    /// Снимает edge-флаги (prev := down). Зовётся системой в конце тика.
    pub fn end_frame(&mut self) {
        self.prev = self.down.clone();
    }
}

/// Система: сброс edge-флагов в конце каждого тика
pub fn clear_input_edges(mut inputs: Query<&mut InputState>) {
    for mut input in inputs.iter_mut() {
        input.end_frame();
    }
}
