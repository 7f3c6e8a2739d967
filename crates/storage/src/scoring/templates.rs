//! Built-in ruleset templates and the uma/oka suggestion helpers used by the
//! rule creation form and the seeder.

use crate::models::GameMode;

#[derive(Debug, Clone, Copy)]
pub struct RuleTemplate {
    pub name: &'static str,
    pub game_mode: GameMode,
    pub starting_points: i32,
    pub base_points: i32,
    pub uma: &'static [i32],
    pub oka: i32,
    pub description: &'static str,
}

/// The commonly played rule presets seeded as global rulesets.
pub const RULE_TEMPLATES: &[RuleTemplate] = &[
    RuleTemplate {
        name: "Mリーグルール（4人麻雀）",
        game_mode: GameMode::Four,
        starting_points: 25000,
        base_points: 30000,
        uma: &[30, 10, -10, -30],
        oka: 20,
        description: "プロリーグで使用される標準ルール",
    },
    RuleTemplate {
        name: "フリー雀荘標準（4人麻雀）",
        game_mode: GameMode::Four,
        starting_points: 25000,
        base_points: 30000,
        uma: &[20, 10, -10, -20],
        oka: 20,
        description: "一般的なフリー雀荘ルール",
    },
    RuleTemplate {
        name: "競技麻雀（4人麻雀）",
        game_mode: GameMode::Four,
        starting_points: 25000,
        base_points: 30000,
        uma: &[15, 5, -5, -15],
        oka: 20,
        description: "競技麻雀でよく使われるルール",
    },
    RuleTemplate {
        name: "3人麻雀標準",
        game_mode: GameMode::Three,
        starting_points: 35000,
        base_points: 40000,
        uma: &[20, 0, -20],
        oka: 15,
        description: "3人麻雀の一般的なルール",
    },
    RuleTemplate {
        name: "3人麻雀（高レート）",
        game_mode: GameMode::Three,
        starting_points: 25000,
        base_points: 35000,
        uma: &[30, 0, -30],
        oka: 30,
        description: "高レート3人麻雀ルール",
    },
];

#[derive(Debug, Clone, Copy)]
pub struct UmaPattern {
    pub label: &'static str,
    pub uma: &'static [i32],
}

/// Well-known uma patterns offered as quick picks, by game mode.
pub fn common_uma_patterns(game_mode: GameMode) -> &'static [UmaPattern] {
    match game_mode {
        GameMode::Three => &[
            UmaPattern {
                label: "標準",
                uma: &[20, 0, -20],
            },
            UmaPattern {
                label: "高レート",
                uma: &[30, 0, -30],
            },
            UmaPattern {
                label: "低レート",
                uma: &[10, 0, -10],
            },
        ],
        GameMode::Four => &[
            UmaPattern {
                label: "Mリーグ",
                uma: &[30, 10, -10, -30],
            },
            UmaPattern {
                label: "フリー雀荘",
                uma: &[20, 10, -10, -20],
            },
            UmaPattern {
                label: "競技麻雀",
                uma: &[15, 5, -5, -15],
            },
            UmaPattern {
                label: "高レート",
                uma: &[40, 20, -20, -40],
            },
        ],
    }
}

/// Suggests an uma array from the starting/base point gap.
pub fn suggest_uma(starting_points: i32, base_points: i32, game_mode: GameMode) -> Vec<i32> {
    let point_diff = base_points - starting_points;

    match game_mode {
        GameMode::Three => match point_diff {
            5000 => vec![20, 0, -20],
            10000 => vec![30, 0, -30],
            _ => vec![20, 0, -20],
        },
        GameMode::Four => match point_diff {
            5000 => vec![30, 10, -10, -30],
            10000 => vec![40, 20, -20, -40],
            _ => vec![30, 10, -10, -30],
        },
    }
}

/// Oka implied by the starting/base gap: `(base - starting) * players / 1000`.
pub fn oka_from_points(starting_points: i32, base_points: i32, game_mode: GameMode) -> i32 {
    let point_diff = base_points - starting_points;
    let player_count = i32::from(game_mode.player_count());

    point_diff * player_count / 1000
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::floating::validate_uma_array;

    #[test]
    fn all_templates_carry_valid_uma() {
        for template in RULE_TEMPLATES {
            assert!(
                validate_uma_array(template.uma, template.game_mode).is_empty(),
                "{}",
                template.name
            );
            assert!(template.starting_points <= template.base_points);
        }
    }

    #[test]
    fn oka_matches_point_gap() {
        assert_eq!(oka_from_points(25000, 30000, GameMode::Four), 20);
        assert_eq!(oka_from_points(35000, 40000, GameMode::Three), 15);
        assert_eq!(oka_from_points(25000, 35000, GameMode::Three), 30);
        assert_eq!(oka_from_points(30000, 30000, GameMode::Four), 0);
    }

    #[test]
    fn uma_suggestion_follows_gap() {
        assert_eq!(suggest_uma(25000, 30000, GameMode::Four), vec![30, 10, -10, -30]);
        assert_eq!(suggest_uma(25000, 35000, GameMode::Four), vec![40, 20, -20, -40]);
        assert_eq!(suggest_uma(35000, 40000, GameMode::Three), vec![20, 0, -20]);
        assert_eq!(suggest_uma(25000, 35000, GameMode::Three), vec![30, 0, -30]);
    }
}
