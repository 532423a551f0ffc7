//! Persona module - characters, expertise and the instruction compiler.
//!
//! Turns a character (or a roster of characters), the user's profile and the
//! current wall clock into the system instruction sent to the model.

mod character;
mod expertise;
mod instructions;
mod policy;
mod runtime;
mod templates;

pub use character::{ActLike, Age, Character, UserProfile};
pub use expertise::{ExpertiseTag, GROUP_SPECIAL_INSTRUCTIONS, SPECIAL_INSTRUCTIONS};
pub use instructions::{
    behavior_line, compile_group, compile_group_for_turn, compile_group_with, compile_single,
    special_instructions, InstructionDocument,
};
pub use policy::{
    authorize_turn, PolicyRenderer, PolicyRule, PromptPolicyRenderer, SpeakerAuthorization,
    TurnSignals, ATTACHED_FILE_MARKER,
};
pub use runtime::{FiscalYear, RuntimeContext, FISCAL_YEAR_START_MONTH0};
