//! Age-based eligibility.

use crate::model::member::Member;
use crate::model::task::TaskTemplate;
use chrono::NaiveDate;

/// Whether `member` may take instances of `template` as of `today`.
///
/// Only the template's minimum age is checked. Members without a birth date
/// count as age 0.
pub fn is_eligible(member: &Member, template: &TaskTemplate, today: NaiveDate) -> bool {
    match template.min_age {
        Some(min_age) => member.age_on(today) >= min_age,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::is_eligible;
    use crate::model::member::Member;
    use crate::model::task::TaskTemplate;
    use crate::model::weekday::WeekdaySet;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn minimum_age_is_inclusive_and_uses_birthday() {
        let template = TaskTemplate::new(Uuid::new_v4(), "Cook", 45, Some(12), WeekdaySet::new());
        let child = Member::new("kid", Some(date(2012, 9, 1)));

        assert!(!is_eligible(&child, &template, date(2024, 8, 31)));
        assert!(is_eligible(&child, &template, date(2024, 9, 1)));
    }

    #[test]
    fn unknown_birth_date_fails_any_minimum_but_passes_without_one() {
        let member = Member::new("guest", None);
        let restricted = TaskTemplate::new(Uuid::new_v4(), "Mow", 60, Some(1), WeekdaySet::new());
        let open = TaskTemplate::new(Uuid::new_v4(), "Dust", 10, None, WeekdaySet::new());

        assert!(!is_eligible(&member, &restricted, date(2024, 1, 1)));
        assert!(is_eligible(&member, &open, date(2024, 1, 1)));
    }
}
