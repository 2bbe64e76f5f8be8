//! Turn resolution: foul detection, scoring, target progression and what
//! becomes of each potted ball. Pure functions over the facts of one turn.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::balls::BallType;

/// Lowest penalty for any foul.
pub const MIN_PENALTY: u32 = 4;

/// The ball the player must strike first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "ball")]
pub enum Target {
    Red,
    /// Any colour, after a red has been potted.
    AnyColour,
    /// One specific colour, once the reds are gone.
    Colour(BallType),
}

impl Target {
    /// Numeric code for the UI event stream: 0 red, 1 any colour, else the colour's value.
    pub fn code(self) -> u32 {
        match self {
            Target::Red => 0,
            Target::AnyColour => 1,
            Target::Colour(ball) => ball.value(),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Red => f.write_str("RED"),
            Target::AnyColour => f.write_str("ANY COLOUR"),
            Target::Colour(ball) => write!(f, "{}", ball.name().to_uppercase()),
        }
    }
}

/// The first reason a turn was judged a foul.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Foul {
    CuePotted,
    NoBallHit,
    /// A red was required but something else was struck first.
    HitFirst { struck: BallType },
    RedFirst,
    /// A specific colour was required but another ball was struck first.
    HitInstead { struck: BallType, wanted: BallType },
    ColourPottedOnRed,
    RedPottedOnColour,
    WrongColourPotted,
}

impl fmt::Display for Foul {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Foul::CuePotted => f.write_str("Foul: Cue ball potted!"),
            Foul::NoBallHit => f.write_str("Foul: No ball hit!"),
            Foul::HitFirst { struck } => write!(f, "Foul: Hit {struck} first!"),
            Foul::RedFirst => f.write_str("Foul: Hit red first!"),
            Foul::HitInstead { struck, wanted } => write!(f, "Foul: Hit {struck} instead of {wanted}!"),
            Foul::ColourPottedOnRed => f.write_str("Foul: Potted a colour illegally!"),
            Foul::RedPottedOnColour => f.write_str("Foul: Potted a red illegally!"),
            Foul::WrongColourPotted => f.write_str("Foul: Potted the wrong colour!"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "verdict")]
pub enum Verdict {
    Legal,
    Foul { reason: Foul, penalty: u32 },
}

impl Verdict {
    pub fn is_foul(&self) -> bool {
        matches!(self, Verdict::Foul { .. })
    }
}

/// Fate of one potted ball.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// Back on the table at its spot (or the nearest free place).
    Respot,
    /// Off the table for the rest of the game.
    Remove,
    /// The cue ball: the player places it in the D.
    InHand,
}

/// Everything the resolver needs to know about a finished turn.
#[derive(Debug, Clone, Copy)]
pub struct TurnFacts<'a> {
    pub target: Target,
    pub first_hit: Option<BallType>,
    pub potted: &'a [BallType],
    /// Reds still on the table after this turn's pots.
    pub reds_remaining: usize,
    /// Colours still on the table, not counting any potted this turn.
    pub colours_on_table: &'a [BallType],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ruling {
    pub verdict: Verdict,
    pub score: u32,
    /// Points won (positive) or lost (negative) this turn.
    pub delta: i64,
    /// `None` when the table has been cleared.
    pub next_target: Option<Target>,
    /// One entry per potted ball, in pot order.
    pub dispositions: Vec<(BallType, Disposition)>,
    /// One-line account of the turn, e.g. "Potted: Red, Black."
    pub summary: String,
}

impl Ruling {
    pub fn is_game_over(&self) -> bool {
        self.next_target.is_none()
    }
}

/// Judge a finished turn.
pub fn resolve(facts: &TurnFacts<'_>, score: u32) -> Ruling {
    let verdict = judge(facts);

    let (new_score, summary) = match verdict {
        Verdict::Legal => {
            let points: u32 = facts.potted.iter().map(|b| b.value()).sum();
            let summary = if facts.potted.is_empty() {
                "No balls potted.".to_string()
            } else {
                let names: Vec<String> = facts.potted.iter().map(|b| capitalize(b.name())).collect();
                format!("Potted: {}.", names.join(", "))
            };
            (score + points, summary)
        }
        Verdict::Foul { reason, penalty } => (score.saturating_sub(penalty), reason.to_string()),
    };

    let foul = verdict.is_foul();
    let dispositions = facts
        .potted
        .iter()
        .map(|&ball| {
            let fate = match ball {
                BallType::Cue => Disposition::InHand,
                BallType::Red => Disposition::Remove,
                _ if facts.reds_remaining > 0 || foul => Disposition::Respot,
                _ => Disposition::Remove,
            };
            (ball, fate)
        })
        .collect();

    let next_target = if foul {
        Some(Target::Red)
    } else {
        next_target(facts)
    };

    Ruling {
        verdict,
        score: new_score,
        delta: i64::from(new_score) - i64::from(score),
        next_target,
        dispositions,
        summary,
    }
}

/// The lowest-valued colour in `colours`, if any.
pub fn lowest_colour(colours: &[BallType]) -> Option<BallType> {
    colours.iter().copied().filter(|b| b.is_colour()).min_by_key(|b| b.value())
}

fn judge(facts: &TurnFacts<'_>) -> Verdict {
    // Every triggered foul with its penalty, in the order checked
    let mut fouls: Vec<(Foul, u32)> = Vec::new();

    if facts.potted.contains(&BallType::Cue) {
        fouls.push((Foul::CuePotted, MIN_PENALTY));
    }

    match facts.first_hit {
        None if facts.potted.is_empty() => fouls.push((Foul::NoBallHit, MIN_PENALTY)),
        None => {}
        Some(struck) => match facts.target {
            Target::Red if struck != BallType::Red => {
                fouls.push((Foul::HitFirst { struck }, struck.value().max(MIN_PENALTY)));
            }
            Target::AnyColour if struck == BallType::Red => fouls.push((Foul::RedFirst, MIN_PENALTY)),
            Target::Colour(wanted) if struck != wanted => {
                fouls.push((Foul::HitInstead { struck, wanted }, struck.value().max(MIN_PENALTY)));
            }
            _ => {}
        },
    }

    if fouls.is_empty() {
        let potted = facts.potted;
        let potting_foul = match facts.target {
            Target::Red if potted.iter().any(|b| b.is_colour()) => Some(Foul::ColourPottedOnRed),
            Target::AnyColour if potted.contains(&BallType::Red) => Some(Foul::RedPottedOnColour),
            Target::Colour(wanted)
                if facts.reds_remaining == 0
                    && potted.iter().any(|&b| b != BallType::Cue && b != wanted) =>
            {
                Some(Foul::WrongColourPotted)
            }
            _ => None,
        };
        fouls.extend(potting_foul.map(|foul| (foul, MIN_PENALTY)));
    }

    match fouls.first() {
        Some(&(reason, _)) => Verdict::Foul {
            reason,
            penalty: fouls.iter().map(|&(_, p)| p).max().unwrap_or(MIN_PENALTY),
        },
        None => Verdict::Legal,
    }
}

fn next_target(facts: &TurnFacts<'_>) -> Option<Target> {
    let any_colour_left = lowest_colour(facts.colours_on_table);
    if facts.potted.contains(&BallType::Red) {
        // Potting the last red still earns a free colour
        return any_colour_left.map(|_| Target::AnyColour);
    }
    if facts.reds_remaining > 0 {
        return Some(Target::Red);
    }
    any_colour_left.map(Target::Colour)
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
