//! Market-rate lookup and target-salary calculation used to set up a session.

use serde::Serialize;

pub const MARKET_SOURCE: &str = "Industry Research";

/// Market rate and typical range for a job title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MarketEntry {
    title: &'static str,
    market_rate: i64,
    range: [i64; 2],
}

const MARKET_TABLE: [MarketEntry; 10] = [
    entry("Software Engineer", 95_000, [75_000, 130_000]),
    entry("Marketing Manager", 75_000, [60_000, 95_000]),
    entry("Data Analyst", 70_000, [55_000, 90_000]),
    entry("Product Manager", 110_000, [90_000, 145_000]),
    entry("Sales Representative", 65_000, [45_000, 85_000]),
    entry("UX Designer", 85_000, [65_000, 110_000]),
    entry("HR Manager", 72_000, [58_000, 92_000]),
    entry("Accountant", 68_000, [52_000, 88_000]),
    entry("Project Manager", 88_000, [70_000, 115_000]),
    entry("Business Analyst", 78_000, [62_000, 98_000]),
];

const fn entry(title: &'static str, market_rate: i64, range: [i64; 2]) -> MarketEntry {
    MarketEntry {
        title,
        market_rate,
        range,
    }
}

/// Bonus fraction credited per recognized achievement.
pub const ACHIEVEMENT_BONUSES: [(&str, f64); 5] = [
    ("Exceeded performance targets", 0.05),
    ("Taken on additional responsibilities", 0.04),
    ("Gained new certifications/skills", 0.03),
    ("Led successful projects", 0.05),
    ("Mentored team members", 0.03),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketData {
    pub job_title: String,
    pub market_rate: i64,
    pub range: [i64; 2],
    pub source: &'static str,
}

/// Look up market data for `job_title`, ignoring case and surrounding whitespace.
pub fn market_data(job_title: &str) -> Option<MarketData> {
    let wanted = job_title.trim();
    MARKET_TABLE
        .iter()
        .find(|e| e.title.eq_ignore_ascii_case(wanted))
        .map(|e| MarketData {
            job_title: e.title.to_string(),
            market_rate: e.market_rate,
            range: e.range,
            source: MARKET_SOURCE,
        })
}

/// Titles the lookup table knows about.
pub fn known_titles() -> impl Iterator<Item = &'static str> {
    MARKET_TABLE.iter().map(|e| e.title)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Baseline {
    Market,
    Current,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetCalculation {
    pub market_rate: i64,
    pub bonus_percentage: f64,
    pub target_salary: i64,
    pub target_range: [i64; 2],
    pub achievements: Vec<String>,
    pub baseline_used: Baseline,
    pub base_amount: i64,
    pub bonus_amount: i64,
}

/// Sum of bonus fractions for the recognized achievements.
pub fn achievement_bonus(achievements: &[String]) -> f64 {
    achievements
        .iter()
        .filter_map(|a| {
            ACHIEVEMENT_BONUSES
                .iter()
                .find(|(name, _)| *name == a.as_str())
                .map(|(_, bonus)| *bonus)
        })
        .sum()
}

/// Target salary: the larger of market- and current-based targets after
/// applying achievement bonuses, with a ±5% range.
pub fn calculate_target(
    market_rate: i64,
    achievements: &[String],
    current_salary: i64,
) -> TargetCalculation {
    let bonus = achievement_bonus(achievements);
    let market_target = apply_bonus(market_rate, bonus);
    let current_target = apply_bonus(current_salary, bonus);

    let (target_salary, baseline_used, base_amount) = if market_target >= current_target {
        (market_target, Baseline::Market, market_rate)
    } else {
        (current_target, Baseline::Current, current_salary)
    };

    TargetCalculation {
        market_rate,
        bonus_percentage: bonus,
        target_salary,
        target_range: [
            round(target_salary as f64 * 0.95),
            round(target_salary as f64 * 1.05),
        ],
        achievements: achievements.to_vec(),
        baseline_used,
        base_amount,
        bonus_amount: round(base_amount as f64 * bonus),
    }
}

fn apply_bonus(amount: i64, bonus: f64) -> i64 {
    round(amount as f64 * (1.0 + bonus))
}

fn round(value: f64) -> i64 {
    value.round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn lookup_known_title() {
        let data = market_data("Software Engineer").expect("known");
        assert_eq!(data.market_rate, 95_000);
        assert_eq!(data.range, [75_000, 130_000]);
        assert_eq!(data.source, MARKET_SOURCE);
    }

    #[test]
    fn lookup_tolerates_case_and_whitespace() {
        let data = market_data("  ux designer ").expect("known");
        assert_eq!(data.job_title, "UX Designer");
    }

    #[test]
    fn lookup_unknown_title_is_none() {
        assert!(market_data("Astronaut").is_none());
        assert_eq!(known_titles().count(), 10);
    }

    #[test]
    fn target_uses_market_when_higher() {
        let calc = calculate_target(
            100_000,
            &owned(&["Exceeded performance targets", "Mentored team members"]),
            90_000,
        );
        assert_eq!(calc.target_salary, 108_000);
        assert_eq!(calc.baseline_used, Baseline::Market);
        assert_eq!(calc.target_range, [102_600, 113_400]);
        assert_eq!(calc.bonus_amount, 8_000);
        assert_eq!(calc.base_amount, 100_000);
    }

    #[test]
    fn target_uses_current_salary_when_above_market() {
        let calc = calculate_target(80_000, &owned(&["Led successful projects"]), 100_000);
        assert_eq!(calc.target_salary, 105_000);
        assert_eq!(calc.baseline_used, Baseline::Current);
        assert_eq!(calc.bonus_amount, 5_000);
    }

    #[test]
    fn unknown_achievements_add_nothing() {
        let calc = calculate_target(70_000, &owned(&["Won the office chili cook-off"]), 0);
        assert_eq!(calc.bonus_percentage, 0.0);
        assert_eq!(calc.target_salary, 70_000);
    }
}
