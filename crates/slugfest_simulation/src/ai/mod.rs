//! Opponent AI: приоритетные правила поверх state machine бойца
//!
//! AI не имеет привилегий: он лишь переводит состояния и взводит
//! forced_block_timer — всё то же, что доступно human input'у.
//! Решения принимаются в фазе AiDecision, ДО update AI-бойцов.

use bevy::prelude::*;

pub mod controller;

pub use controller::{ai_decisions, decide, AIConfig, AiControlled, AiDecision, AiView, Difficulty};

use crate::TickSet;

/// AI Plugin
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(FixedUpdate, ai_decisions.in_set(TickSet::AiDecision));
    }
}
