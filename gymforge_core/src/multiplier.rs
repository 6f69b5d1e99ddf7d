//! Multiplier resolver: stacks the streak multiplier with a class affinity
//! bonus for the activity being performed.
//!
//! Pure functions; the streak multiplier itself is computed by the streak
//! engine and passed in.

use crate::ClassKind;

/// Fixed affinity bonus applied when the activity tag matches the class
pub const CLASS_AFFINITY_BONUS: f64 = 1.2;

impl ClassKind {
    /// Keyword bins that trigger this class's affinity bonus
    pub fn affinity_keywords(self) -> &'static [&'static str] {
        match self {
            ClassKind::Warrior => &["strength", "power", "weights"],
            ClassKind::Ranger => &["cardio", "endurance", "running"],
            ClassKind::Tank => &["compound", "full-body", "functional"],
            ClassKind::Assassin => &["hiit", "speed", "agility"],
            ClassKind::Mage => &["balance", "flexibility", "technique"],
        }
    }
}

/// Class bonus multiplier for an activity tag (case-insensitive substring match)
pub fn class_multiplier(class: Option<ClassKind>, activity_tag: Option<&str>) -> f64 {
    let (class, tag) = match (class, activity_tag) {
        (Some(c), Some(t)) => (c, t.to_lowercase()),
        _ => return 1.0,
    };

    if class
        .affinity_keywords()
        .iter()
        .any(|kw| tag.contains(kw))
    {
        CLASS_AFFINITY_BONUS
    } else {
        1.0
    }
}

/// Total effective multiplier for an experience award
pub fn resolve(streak_multiplier: f64, class: Option<ClassKind>, activity_tag: Option<&str>) -> f64 {
    streak_multiplier * class_multiplier(class, activity_tag)
}

/// Experience awarded for a base amount under a total multiplier
pub fn award_exp(base_exp: u32, total_multiplier: f64) -> i64 {
    (base_exp as f64 * total_multiplier).floor() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_class_means_neutral_multiplier() {
        assert_eq!(class_multiplier(None, Some("strength")), 1.0);
        assert_eq!(class_multiplier(Some(ClassKind::Warrior), None), 1.0);
    }

    #[test]
    fn test_matching_tag_grants_bonus() {
        assert_eq!(
            class_multiplier(Some(ClassKind::Warrior), Some("strength")),
            CLASS_AFFINITY_BONUS
        );
        // substring and case-insensitive
        assert_eq!(
            class_multiplier(Some(ClassKind::Assassin), Some("HIIT circuit")),
            CLASS_AFFINITY_BONUS
        );
    }

    #[test]
    fn test_non_matching_tag_is_neutral() {
        assert_eq!(class_multiplier(Some(ClassKind::Mage), Some("strength")), 1.0);
    }

    #[test]
    fn test_award_floors_the_product() {
        // base 100, streak 1.5, class 1.2 -> floor(180.0) = 180
        let total = resolve(1.5, Some(ClassKind::Warrior), Some("strength"));
        assert_eq!(award_exp(100, total), 180);

        // floor of a non-integral product
        assert_eq!(award_exp(33, 1.1), 36); // 36.3 -> 36
    }

    #[test]
    fn test_total_multiplier_stacks() {
        let total = resolve(2.0, Some(ClassKind::Ranger), Some("cardio"));
        assert!((total - 2.4).abs() < 1e-9);
    }
}
