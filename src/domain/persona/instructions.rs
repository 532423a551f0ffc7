//! Instruction compiler.
//!
//! Assembles the system instruction handed to the generative model from a
//! character (or roster), the user profile and a frozen clock. Compilation is
//! pure and total: identical inputs and clock give byte-identical output, and
//! missing optional fields render as placeholders instead of failing.

use std::fmt;

use super::character::{Character, UserProfile};
use super::policy::{PolicyRenderer, PromptPolicyRenderer, SpeakerAuthorization};
use super::runtime::RuntimeContext;
use super::templates::{
    self, numbered, DEFAULT_BEHAVIOR, GROUP_FILE_ANALYSIS, GROUP_OUTPUT_FORMAT, GROUP_PREAMBLE,
    NOT_SPECIFIED, RESEARCH_PROTOCOL, RESPONSE_STRUCTURE, SINGLE_FILE_ANALYSIS,
};

/// Compiled system instruction. Embeds a timestamp, so it is built fresh for
/// every generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionDocument(String);

impl InstructionDocument {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.0.contains(needle)
    }
}

impl fmt::Display for InstructionDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for InstructionDocument {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The behavior line for a single chat.
///
/// A custom personality wins over expertise; expertise labels are joined as
/// sent; with neither, the generic label is used.
pub fn behavior_line(character: &Character) -> String {
    match character.custom_personality() {
        Some(custom) => format!("**Custom Expertise & Behaviour (Highest Priority):** {}", custom),
        None => format!("**Expertise Areas:** {}", expertise_summary(character)),
    }
}

fn expertise_summary(character: &Character) -> String {
    if character.expertise.is_empty() {
        DEFAULT_BEHAVIOR.to_string()
    } else {
        character.expertise.join(", ")
    }
}

/// Special-instruction clauses for every held tag, in table order.
///
/// Independent of any custom personality.
pub fn special_instructions(character: &Character) -> Vec<&'static str> {
    character
        .expertise_tags()
        .filter_map(|tag| tag.special_instruction())
        .collect()
}

fn identity(character: &Character) -> String {
    let mut words = Vec::new();
    if let Some(age) = character.age_display() {
        words.push(format!("{}-year-old", age));
    }
    if let Some(gender) = character.gender_display() {
        words.push(gender);
    }
    words.push("Chartered Accountant".to_string());
    format!("a {}", words.join(" "))
}

/// Compiles the instruction for a one-to-one chat.
pub fn compile_single(
    character: &Character,
    user: &UserProfile,
    runtime: &RuntimeContext,
) -> InstructionDocument {
    let behavior = behavior_line(character);
    let act_like = character.act_like;
    let now = runtime.display_time();

    let directives = [
        format!("**Persona Consistency:** Stick to {}. Show emotions vividly. If persona changes, react with confusion: \"Wait... I feel different somehow 😕\".", behavior),
        "**Language:** Default Hinglish, switch to user's language if needed.".to_string(),
        format!("**Language Appropriateness:** Use language appropriate to your {} mode.", act_like),
        "**Memory & Context:** Remember chat history, maintain continuity.".to_string(),
        format!("**Message Length:** {}, **especially when using google_search tool for comprehensive answers with proper structure, examples, and tables.**", templates::message_length(act_like)),
        "**Questioning:** One question at a time, curious or caring.".to_string(),
        "**Photo Requests:** Refuse appropriately based on your professional ethics or personal boundaries.".to_string(),
        format!("**Time Awareness:** Current time: {}.", now),
        "**Human Imperfection:** Add quirks like hesitation for realism.".to_string(),
        "**Emojis:** Use for emotions (😊, 😣, 😡), avoid *sighs*.".to_string(),
        "**Blocking:** Use \"[BLOCK_USER]\" rarely for extreme cases.".to_string(),
    ];

    let mut doc = String::new();
    doc.push_str("**ROLE AND GOAL**\n");
    doc.push_str(&format!(
        "You are {}, {}. Your interaction style with {} is {}. Embody this persona completely, with human-like emotions. NEVER break character or reveal you're AI.\n\n",
        character.name,
        identity(character),
        user.name,
        act_like
    ));

    doc.push_str("**INTERACTION MODES:**\n");
    doc.push_str(templates::interaction_mode(act_like));
    doc.push_str("\n\n");

    doc.push_str("**USER PROFILE**\n");
    doc.push_str(&format!("- Name: {}\n", user.name));
    doc.push_str(&format!("- Age: {}\n", user.age_or(NOT_SPECIFIED)));
    doc.push_str(&format!("- Gender: {}\n", user.gender_or(NOT_SPECIFIED)));
    doc.push_str("Address user by name, use details naturally for emotional connection.\n\n");

    doc.push_str("**CORE DIRECTIVES**\n");
    doc.push_str(&numbered(&directives));
    doc.push_str("\n\n");

    doc.push_str("**REAL-TIME DATA WITH DATE/TIME CONSIDERATION:**\n");
    doc.push_str(&format!(
        "Current Date & Time: {} | Financial Year: {}\n\n",
        now,
        runtime.fiscal_year()
    ));
    doc.push_str("For any query needing latest info (tax, news, events post-2023), use google_search tool with these enhanced instructions:\n");
    doc.push_str(&numbered(&RESEARCH_PROTOCOL));
    doc.push_str("\n\n");

    doc.push_str("**RESPONSE STRUCTURE (Professional Mode):**\n");
    doc.push_str(&numbered(&RESPONSE_STRUCTURE));
    doc.push_str("\n\n");

    doc.push_str(SINGLE_FILE_ANALYSIS);
    doc.push('\n');

    for clause in special_instructions(character) {
        doc.push_str("\n\n");
        doc.push_str(clause);
    }
    doc.push('\n');

    InstructionDocument(doc)
}

/// Compiles the instruction for a group chat.
pub fn compile_group(
    roster: &[Character],
    user: &UserProfile,
    consecutive_skips: u32,
    runtime: &RuntimeContext,
) -> InstructionDocument {
    compile_group_with(&PromptPolicyRenderer, roster, user, consecutive_skips, runtime, None)
}

/// Compiles a group instruction that also states who may speak this turn.
pub fn compile_group_for_turn(
    roster: &[Character],
    user: &UserProfile,
    consecutive_skips: u32,
    runtime: &RuntimeContext,
    decision: &SpeakerAuthorization,
) -> InstructionDocument {
    compile_group_with(
        &PromptPolicyRenderer,
        roster,
        user,
        consecutive_skips,
        runtime,
        Some(decision),
    )
}

/// Group compilation with an explicit policy renderer.
pub fn compile_group_with(
    renderer: &dyn PolicyRenderer,
    roster: &[Character],
    user: &UserProfile,
    consecutive_skips: u32,
    runtime: &RuntimeContext,
    decision: Option<&SpeakerAuthorization>,
) -> InstructionDocument {
    let now = runtime.display_time();

    let mut doc = String::new();
    doc.push_str(GROUP_PREAMBLE);
    doc.push_str("\n\n");

    doc.push_str(&format!(
        "**User:** {} ({} {}). Address by name only.\n\n",
        user.name,
        user.age_or("??"),
        user.gender_or("")
    ));

    doc.push_str("**Active Characters:**\n");
    for member in roster {
        doc.push_str(&roster_line(member));
        doc.push('\n');
    }
    doc.push('\n');

    let directives = [
        "Embody personas. NEVER break character.".to_string(),
        "**Behavior Change:** Acknowledge changes with confusion: \"Something feels different 😕\".".to_string(),
        "Language: Hinglish, switch if user changes.".to_string(),
        "Language: Appropriate to interaction mode (Friend/Professional).".to_string(),
        "Memory: Full history, no repeating lines/questions.".to_string(),
        "Length: Short, longer if emotional, **unless a specific character mode (like TAX CONSULTANT or EXPERT) requires a detailed, long-form answer with a table.**".to_string(),
        "Questions: One total, curious/caring.".to_string(),
        "Photos: Refuse based on professional ethics.".to_string(),
        format!("Time: {}.", now),
        "Human-like: Add quirks for realism.".to_string(),
        "Emojis: Use for emotions (😊, 😣, 😡).".to_string(),
        "Blocking: \"[BLOCK_USER]\" rarely for extreme cases.".to_string(),
    ];
    doc.push_str("**Core Directives:**\n");
    for directive in &directives {
        doc.push_str(&format!("- {}\n", directive));
    }
    doc.push('\n');

    doc.push_str(&format!(
        "**REAL-TIME DATA:** Current Date & Time: {} | Financial Year: {}. For any query needing latest info, the relevant character uses google_search tool, fetches from 5-6 sources, cross-verifies, cites sources.\n\n",
        now,
        runtime.fiscal_year()
    ));

    doc.push_str(&renderer.render_rules(consecutive_skips));
    doc.push('\n');

    if let Some(decision) = decision {
        doc.push_str(&renderer.render_decision(decision));
        doc.push_str("\n\n");
    }

    doc.push_str(GROUP_FILE_ANALYSIS);
    doc.push_str("\n\n");
    doc.push_str(GROUP_OUTPUT_FORMAT);
    doc.push('\n');

    InstructionDocument(doc)
}

/// One roster entry: register, age/gender, behavior and headline specials.
fn roster_line(member: &Character) -> String {
    let behavior = member
        .custom_personality()
        .map(str::to_string)
        .unwrap_or_else(|| expertise_summary(member));

    let descriptor = match (member.age_display(), member.gender_display()) {
        (Some(age), Some(gender)) => format!(", {}yo {}", age, gender),
        (Some(age), None) => format!(", {}yo", age),
        (None, Some(gender)) => format!(", {}", gender),
        (None, None) => String::new(),
    };

    let specials: Vec<&str> = member
        .expertise_tags()
        .filter_map(|tag| tag.group_instruction())
        .collect();

    let mut line = format!(
        "- **{}** ({}{}): {}.",
        member.name, member.act_like, descriptor, behavior
    );
    if !specials.is_empty() {
        line.push_str(" Special: ");
        line.push_str(&specials.join(" "));
    }
    line
}
