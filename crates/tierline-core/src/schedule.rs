//! # Battle Schedule
//!
//! Upcoming battles for a creator, and the 12-hour clock format used to
//! show battle times.

use crate::CreatorId;
use crate::primitives::UPCOMING_BATTLE_LIMIT;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A scheduled battle between two creators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleRecord {
    pub id: String,
    pub creator_1_id: CreatorId,
    pub creator_2_id: CreatorId,
    pub creator_1_handle: String,
    pub creator_2_handle: String,
    pub battle_date: NaiveDate,
    /// Local start time as stored, usually 24-hour `"HH:MM"`.
    #[serde(default)]
    pub battle_time: String,
}

impl BattleRecord {
    /// Handle of the other side, if `creator` takes part in this battle.
    #[must_use]
    pub fn opponent_of(&self, creator: &CreatorId) -> Option<&str> {
        if &self.creator_1_id == creator {
            Some(&self.creator_2_handle)
        } else if &self.creator_2_id == creator {
            Some(&self.creator_1_handle)
        } else {
            None
        }
    }
}

/// A battle as seen from one creator's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpcomingBattle {
    pub id: String,
    pub opponent_handle: String,
    pub battle_date: NaiveDate,
    pub battle_time: String,
    /// `battle_time` on a 12-hour clock, without AM/PM.
    pub display_time: String,
}

/// Battles of `creator` on `today` or later, soonest first.
///
/// At most `UPCOMING_BATTLE_LIMIT` entries are returned.
#[must_use]
pub fn upcoming_battles(
    battles: &[BattleRecord],
    creator: &CreatorId,
    today: NaiveDate,
) -> Vec<UpcomingBattle> {
    let mut upcoming: Vec<(&BattleRecord, &str)> = battles
        .iter()
        .filter(|b| b.battle_date >= today)
        .filter_map(|b| b.opponent_of(creator).map(|opponent| (b, opponent)))
        .collect();

    upcoming.sort_by(|(a, _), (b, _)| {
        a.battle_date
            .cmp(&b.battle_date)
            .then_with(|| minutes_of_day(&a.battle_time).cmp(&minutes_of_day(&b.battle_time)))
            .then_with(|| a.id.cmp(&b.id))
    });

    upcoming
        .into_iter()
        .take(UPCOMING_BATTLE_LIMIT)
        .map(|(b, opponent)| UpcomingBattle {
            id: b.id.clone(),
            opponent_handle: opponent.to_string(),
            battle_date: b.battle_date,
            battle_time: b.battle_time.clone(),
            display_time: to_12_hour(&b.battle_time),
        })
        .collect()
}

/// Sort key for a stored time; unparseable times sort last.
fn minutes_of_day(time: &str) -> u32 {
    let mut parts = time.trim().splitn(2, ':');
    let hours = parts.next().and_then(|h| h.trim().parse::<u32>().ok());
    let minutes = parts
        .next()
        .map_or(Some(0), |m| m.trim().get(..2).unwrap_or(m).parse::<u32>().ok());
    match (hours, minutes) {
        (Some(h), Some(m)) if h < 24 && m < 60 => h * 60 + m,
        _ => u32::MAX,
    }
}

/// Convert a 24-hour time to a 12-hour clock without AM/PM.
///
/// - `"17:00"` -> `"5:00"`, `"00:15"` -> `"12:15"`, `"9"` -> `"9:00"`
/// - `"17:00:00"` -> `"5:00"` (seconds dropped)
/// - `"5:00 PM"` -> `"5:00"` (marker stripped, digits untouched)
/// - `""` -> `""`; anything unparseable is returned unchanged
#[must_use]
pub fn to_12_hour(time: &str) -> String {
    let trimmed = time.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let upper = trimmed.to_ascii_uppercase();
    if upper.contains("AM") || upper.contains("PM") {
        return strip_meridiem(trimmed);
    }

    // Seconds, as in `"17:00:00"`, are dropped.
    let mut parts = trimmed.split(':');
    let hours = parts.next().unwrap_or(trimmed);
    let minutes = parts.next().unwrap_or("00");
    let Ok(hours) = hours.trim().parse::<u32>() else {
        return time.to_string();
    };

    let hours = match hours {
        0 => 12,
        h if h > 12 => h - 12,
        h => h,
    };
    format!("{}:{}", hours, minutes)
}

fn strip_meridiem(time: &str) -> String {
    let mut out = String::with_capacity(time.len());
    let mut rest = time;
    while !rest.is_empty() {
        let upper = rest.get(..2).map(str::to_ascii_uppercase);
        if matches!(upper.as_deref(), Some("AM" | "PM")) {
            rest = &rest[2..];
            continue;
        }
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            out.push(c);
        }
        rest = chars.as_str();
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_afternoon_hours() {
        assert_eq!(to_12_hour("17:00"), "5:00");
        assert_eq!(to_12_hour("23:45"), "11:45");
    }

    #[test]
    fn midnight_and_noon() {
        assert_eq!(to_12_hour("00:15"), "12:15");
        assert_eq!(to_12_hour("12:00"), "12:00");
    }

    #[test]
    fn database_times_drop_seconds() {
        assert_eq!(to_12_hour("17:00:00"), "5:00");
        assert_eq!(to_12_hour("00:15:30"), "12:15");
    }

    #[test]
    fn morning_drops_leading_zero() {
        assert_eq!(to_12_hour("09:30"), "9:30");
    }

    #[test]
    fn bare_hour_gets_minutes() {
        assert_eq!(to_12_hour("9"), "9:00");
    }

    #[test]
    fn strips_existing_meridiem() {
        assert_eq!(to_12_hour("5:00 PM"), "5:00");
        assert_eq!(to_12_hour("11:30am"), "11:30");
    }

    #[test]
    fn empty_and_garbage() {
        assert_eq!(to_12_hour(""), "");
        assert_eq!(to_12_hour("soon"), "soon");
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).expect("date")
    }

    fn battle(id: &str, a: &str, b: &str, day: u32, time: &str) -> BattleRecord {
        BattleRecord {
            id: id.to_string(),
            creator_1_id: CreatorId::new(a),
            creator_2_id: CreatorId::new(b),
            creator_1_handle: format!("{a}_handle"),
            creator_2_handle: format!("{b}_handle"),
            battle_date: date(day),
            battle_time: time.to_string(),
        }
    }

    #[test]
    fn upcoming_filters_and_orders() {
        let battles = vec![
            battle("past", "me", "x", 10, "18:00"),
            battle("late", "y", "me", 22, "09:00"),
            battle("today-evening", "me", "z", 20, "21:00"),
            battle("today-noon", "w", "me", 20, "12:00"),
            battle("other", "x", "y", 21, "10:00"),
        ];

        let upcoming = upcoming_battles(&battles, &CreatorId::new("me"), date(20));
        let ids: Vec<&str> = upcoming.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["today-noon", "today-evening", "late"]);
        assert_eq!(upcoming[0].opponent_handle, "w_handle");
        assert_eq!(upcoming[1].display_time, "9:00");
        assert_eq!(upcoming[2].opponent_handle, "y_handle");
    }

    #[test]
    fn upcoming_is_capped() {
        let battles: Vec<BattleRecord> = (0..15)
            .map(|i| battle(&format!("b{i:02}"), "me", "x", 21, "10:00"))
            .collect();
        let upcoming = upcoming_battles(&battles, &CreatorId::new("me"), date(20));
        assert_eq!(upcoming.len(), UPCOMING_BATTLE_LIMIT);
    }
}
