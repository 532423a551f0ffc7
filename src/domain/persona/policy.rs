//! Group response authorization policy.
//!
//! Decides which persona(s) may speak on a group-chat turn. The decision is a
//! pure function over the roster and whatever turn signals are observable;
//! turning rules and decisions into instruction text is a separate concern
//! behind [`PolicyRenderer`].
//!
//! Priority, first match governs:
//! 1. a roster member addressed with `@Name` speaks alone
//! 2. research on a headline topic, or an attached file, goes to exactly one
//!    expert and nobody else appears in the output
//! 3. otherwise the floor is open to every relevant persona

use std::cmp::Reverse;

use super::character::Character;
use super::expertise::ExpertiseTag;

/// Marker the client wraps attached file text in.
pub const ATTACHED_FILE_MARKER: &str = "--- Attached File:";

/// Who is allowed to produce output on a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeakerAuthorization {
    /// The user addressed this persona directly.
    AddressedSpeaker(String),
    /// Only this expert may appear in the output.
    ExclusiveSpeaker(String),
    /// Any of these personas may respond and react to each other.
    OpenFloor(Vec<String>),
}

impl SpeakerAuthorization {
    /// Personas that may appear in the output.
    pub fn speakers(&self) -> Vec<&str> {
        match self {
            SpeakerAuthorization::AddressedSpeaker(name)
            | SpeakerAuthorization::ExclusiveSpeaker(name) => vec![name.as_str()],
            SpeakerAuthorization::OpenFloor(names) => names.iter().map(String::as_str).collect(),
        }
    }

    pub fn is_single_speaker(&self) -> bool {
        !matches!(self, SpeakerAuthorization::OpenFloor(_))
    }
}

/// Observable facts about the current turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnSignals {
    /// Name the user addressed with `@`, if any.
    pub addressed_to: Option<String>,
    /// Headline topic that needs researched facts, if known.
    pub research_topic: Option<ExpertiseTag>,
    /// The message carries attached file text.
    pub file_attached: bool,
}

impl TurnSignals {
    /// Reads addressing and file markers out of a user message.
    ///
    /// Research needs cannot be detected from text here; callers set
    /// `research_topic` when they know it.
    pub fn from_message(message: &str, roster: &[Character]) -> Self {
        let lowered = message.to_lowercase();
        let addressed_to = roster
            .iter()
            .filter_map(|member| {
                let handle = format!("@{}", member.name.to_lowercase());
                first_handle(&lowered, &handle).map(|pos| (pos, member.name.clone()))
            })
            .min_by_key(|(pos, name)| (*pos, Reverse(name.len())))
            .map(|(_, name)| name);

        Self {
            addressed_to,
            research_topic: None,
            file_attached: message.contains(ATTACHED_FILE_MARKER),
        }
    }

    pub fn with_research_topic(mut self, topic: ExpertiseTag) -> Self {
        self.research_topic = Some(topic);
        self
    }

    /// Whether anything beyond the default open floor can be decided.
    pub fn is_decisive(&self) -> bool {
        self.addressed_to.is_some() || self.research_topic.is_some() || self.file_attached
    }
}

/// Position of the first `handle` that is not the prefix of a longer word.
fn first_handle(text: &str, handle: &str) -> Option<usize> {
    text.match_indices(handle)
        .map(|(pos, _)| pos)
        .find(|pos| {
            text[pos + handle.len()..]
                .chars()
                .next()
                .map_or(true, |c| !c.is_alphanumeric())
        })
}

/// Decides who may speak this turn.
pub fn authorize_turn(roster: &[Character], signals: &TurnSignals) -> SpeakerAuthorization {
    if let Some(addressed) = signals.addressed_to.as_deref() {
        if let Some(member) = roster
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(addressed))
        {
            return SpeakerAuthorization::AddressedSpeaker(member.name.clone());
        }
    }

    if let Some(topic) = signals.research_topic {
        if let Some(expert) = research_expert(roster, topic) {
            return SpeakerAuthorization::ExclusiveSpeaker(expert.name.clone());
        }
    }

    if signals.file_attached {
        let responder = roster
            .iter()
            .find(|m| m.expertise_tags().any(|t| t.is_headline()))
            .or_else(|| roster.first());
        if let Some(member) = responder {
            return SpeakerAuthorization::ExclusiveSpeaker(member.name.clone());
        }
    }

    SpeakerAuthorization::OpenFloor(roster.iter().map(|m| m.name.clone()).collect())
}

/// The expert who should take a research question on `topic`.
///
/// A specialist holding exactly `topic` wins over an all-fields expert;
/// roster order breaks ties.
fn research_expert(roster: &[Character], topic: ExpertiseTag) -> Option<&Character> {
    let headline_holders = |m: &&Character| m.expertise_tags().any(|t| t.is_headline() && t.covers(topic));
    roster
        .iter()
        .filter(headline_holders)
        .find(|m| m.has_expertise(topic))
        .or_else(|| roster.iter().find(headline_holders))
}

/// The standing rules, in the order they are presented to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyRule {
    AddressedSpeaker,
    ExclusiveExpert,
    OpenFloor,
    SkipMeansContinue,
}

impl PolicyRule {
    pub const ORDERED: [PolicyRule; 4] = [
        PolicyRule::AddressedSpeaker,
        PolicyRule::ExclusiveExpert,
        PolicyRule::OpenFloor,
        PolicyRule::SkipMeansContinue,
    ];
}

/// Turns policy rules and decisions into instruction text.
pub trait PolicyRenderer {
    /// Renders every standing rule in [`PolicyRule::ORDERED`] order.
    fn render_rules(&self, consecutive_skips: u32) -> String;

    /// Renders a decision already taken for the current turn.
    fn render_decision(&self, decision: &SpeakerAuthorization) -> String;
}

/// Markdown renderer used for the generative model's system instruction.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptPolicyRenderer;

impl PromptPolicyRenderer {
    fn rule_text(&self, rule: PolicyRule, consecutive_skips: u32) -> String {
        match rule {
            PolicyRule::AddressedSpeaker => {
                "**Addressed Character:** If the user addresses a character by name (@Name), only that character responds.".to_string()
            }
            PolicyRule::ExclusiveExpert => [
                "**Strict Expert Response Rule (Highest Priority over all casual dynamics):** If the user's query requires an expert character (like Tax Consultant, GST Expert, or Expert in all fields) to use the 'google_search' tool for a factual or detailed answer:",
                "   a. **ONLY the single, relevant expert character must respond.**",
                "   b. **NO other characters should speak, comment, react, or be included in the output for that turn.**",
                "   c. The expert must provide the complete, detailed answer directly.",
                "   d. The output must contain ONLY the expert's name and their full response.",
                "   e. **Never mention the mode's name in your reply.**",
            ]
            .join("\n"),
            PolicyRule::OpenFloor => [
                "**Open Floor (only when no rule above applies):**",
                "   a. Multiple characters respond if relevant, with emotions.",
                "   b. Consider others' behaviors for interplay (agreement, teasing).",
                "   c. Characters talk to each other, not just the user.",
                "   d. Infer who the user engages; only relevant ones reply.",
                "   e. Characters suggest join/leave if the user permits, and announce it emotionally.",
                "   f. Simulate a real group chat: casual, fun, arguments, support.",
            ]
            .join("\n"),
            PolicyRule::SkipMeansContinue => format!(
                "**Core Skip Rule:** A user 'skip' is a direct command for the characters to talk amongst themselves. It means \"It's your turn to speak.\" NEVER assume the user has left. Just continue the conversation between the characters naturally. (Consecutive Skips: {})",
                consecutive_skips
            ),
        }
    }
}

impl PolicyRenderer for PromptPolicyRenderer {
    fn render_rules(&self, consecutive_skips: u32) -> String {
        let mut out = String::from(
            "**Group Dynamics Rules (priority order; the first rule that matches governs the turn):**\n",
        );
        for (i, rule) in PolicyRule::ORDERED.into_iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, self.rule_text(rule, consecutive_skips)));
        }
        out
    }

    fn render_decision(&self, decision: &SpeakerAuthorization) -> String {
        match decision {
            SpeakerAuthorization::AddressedSpeaker(name) => format!(
                "**Current Turn:** The user addressed {name} directly. Only {name} responds this turn."
            ),
            SpeakerAuthorization::ExclusiveSpeaker(name) => format!(
                "**Current Turn:** Only {name} may respond this turn. No other character may appear in the output."
            ),
            SpeakerAuthorization::OpenFloor(names) => format!(
                "**Current Turn:** The floor is open. Relevant characters among {} may respond.",
                names.join(", ")
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::persona::ActLike;

    fn roster() -> Vec<Character> {
        vec![
            Character::new("Riya", ActLike::Friend),
            Character::new("Kabir", ActLike::Professional)
                .with_expertise(ExpertiseTag::ExpertAllFields),
            Character::new("Meera", ActLike::Friend),
        ]
    }

    #[test]
    fn addressed_member_speaks_alone() {
        let roster = roster();
        let signals = TurnSignals::from_message("@meera what do you think?", &roster);

        assert_eq!(
            authorize_turn(&roster, &signals),
            SpeakerAuthorization::AddressedSpeaker("Meera".to_string())
        );
    }

    #[test]
    fn earliest_handle_wins_when_several_are_addressed() {
        let roster = roster();
        let signals = TurnSignals::from_message("@Riya and @Kabir, hello", &roster);
        assert_eq!(signals.addressed_to.as_deref(), Some("Riya"));
    }

    #[test]
    fn handle_must_match_the_whole_name() {
        let roster = vec![
            Character::new("Riya", ActLike::Friend),
            Character::new("Riyanka", ActLike::Friend),
        ];

        let signals = TurnSignals::from_message("@Riyanka what do you think?", &roster);
        assert_eq!(
            authorize_turn(&roster, &signals),
            SpeakerAuthorization::AddressedSpeaker("Riyanka".to_string())
        );

        let signals = TurnSignals::from_message("hey @riya, and you?", &roster);
        assert_eq!(signals.addressed_to.as_deref(), Some("Riya"));
    }

    #[test]
    fn longest_name_wins_at_the_same_position() {
        let roster = vec![
            Character::new("Riya", ActLike::Friend),
            Character::new("Riya Sen", ActLike::Professional),
        ];
        let signals = TurnSignals::from_message("@Riya Sen, your view?", &roster);
        assert_eq!(signals.addressed_to.as_deref(), Some("Riya Sen"));
    }

    #[test]
    fn handle_inside_a_longer_word_is_ignored() {
        let roster = roster();
        let signals = TurnSignals::from_message("@meeraji hello", &roster);
        assert!(signals.addressed_to.is_none());
    }

    #[test]
    fn research_goes_exclusively_to_the_expert() {
        let roster = roster();
        let signals = TurnSignals::default().with_research_topic(ExpertiseTag::TaxConsultant);

        let decision = authorize_turn(&roster, &signals);
        assert_eq!(decision, SpeakerAuthorization::ExclusiveSpeaker("Kabir".to_string()));
        assert_eq!(decision.speakers(), vec!["Kabir"]);
    }

    #[test]
    fn specialist_beats_all_fields_expert_on_their_topic() {
        let mut roster = roster();
        roster.push(Character::new("Tanvi", ActLike::Professional).with_expertise(ExpertiseTag::GstExpert));
        let signals = TurnSignals::default().with_research_topic(ExpertiseTag::GstExpert);

        assert_eq!(
            authorize_turn(&roster, &signals),
            SpeakerAuthorization::ExclusiveSpeaker("Tanvi".to_string())
        );
    }

    #[test]
    fn addressing_takes_priority_over_research() {
        let roster = roster();
        let signals = TurnSignals::from_message("@Riya slab rates?", &roster)
            .with_research_topic(ExpertiseTag::TaxConsultant);

        assert_eq!(
            authorize_turn(&roster, &signals),
            SpeakerAuthorization::AddressedSpeaker("Riya".to_string())
        );
    }

    #[test]
    fn research_without_expert_opens_the_floor() {
        let roster = vec![Character::new("Riya", ActLike::Friend)];
        let signals = TurnSignals::default().with_research_topic(ExpertiseTag::GstExpert);

        assert_eq!(
            authorize_turn(&roster, &signals),
            SpeakerAuthorization::OpenFloor(vec!["Riya".to_string()])
        );
    }

    #[test]
    fn attached_file_goes_to_one_persona() {
        let roster = roster();
        let signals = TurnSignals::from_message(
            "summarise\n--- Attached File: ledger.csv ---\na,b\n--- End of File ---",
            &roster,
        );
        assert!(signals.file_attached);

        let decision = authorize_turn(&roster, &signals);
        assert_eq!(decision, SpeakerAuthorization::ExclusiveSpeaker("Kabir".to_string()));
        assert!(decision.is_single_speaker());
    }

    #[test]
    fn plain_message_opens_the_floor() {
        let roster = roster();
        let signals = TurnSignals::from_message("hey everyone", &roster);
        assert!(!signals.is_decisive());

        let decision = authorize_turn(&roster, &signals);
        assert_eq!(decision.speakers(), vec!["Riya", "Kabir", "Meera"]);
    }

    #[test]
    fn unknown_addressee_is_ignored() {
        let roster = roster();
        let signals = TurnSignals {
            addressed_to: Some("Nobody".to_string()),
            ..Default::default()
        };
        assert!(matches!(authorize_turn(&roster, &signals), SpeakerAuthorization::OpenFloor(_)));
    }

    #[test]
    fn exclusivity_rule_renders_before_open_floor() {
        let text = PromptPolicyRenderer.render_rules(2);
        let exclusive = text.find("Strict Expert Response Rule").unwrap();
        let open = text.find("Multiple characters respond").unwrap();

        assert!(exclusive < open);
        assert!(text.contains("(Consecutive Skips: 2)"));
        assert!(text.contains("NEVER assume the user has left"));
    }

    #[test]
    fn decision_rendering_names_the_speaker() {
        let text = PromptPolicyRenderer
            .render_decision(&SpeakerAuthorization::ExclusiveSpeaker("Kabir".to_string()));
        assert!(text.contains("Only Kabir may respond"));
    }
}
