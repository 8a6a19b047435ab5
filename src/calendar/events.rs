//! Event derivation and categorization.

use std::collections::HashSet;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::dates::{next_anniversary, parse_date};
use crate::graph::{Couple, FamilyIndex, Person, PersonId};

/// Default width of the "upcoming" window, in days.
pub const DEFAULT_UPCOMING_WINDOW_DAYS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    Birthday,
    Anniversary,
    Remembrance,
    Custom,
}

/// A user-created event document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomEvent {
    pub id: String,
    pub title: String,
    pub date: String,
}

/// One calendar entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub kind: EventKind,
    /// Person id, couple id, or custom event id.
    pub source_id: String,
    pub title: String,
    /// The stored date.
    pub date: NaiveDate,
    /// Next anniversary on or after the reference day; `None` for remembrance.
    pub next_occurrence: Option<NaiveDate>,
    /// Birthdays: age reached this calendar year.
    pub age: Option<u32>,
    /// Anniversaries: years married this calendar year.
    pub years: Option<u32>,
    /// Remembrance: `"YYYY - YYYY"` when the birth date is known.
    pub lifespan: Option<String>,
}

/// Events split the way the calendar page shows them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategorizedEvents {
    /// Next occurrence within the window, soonest first.
    pub upcoming: Vec<CalendarEvent>,
    /// Next occurrence beyond the window, soonest first.
    pub later: Vec<CalendarEvent>,
    /// Death anniversaries, by month and day.
    pub remembrance: Vec<CalendarEvent>,
}

impl CategorizedEvents {
    pub fn len(&self) -> usize {
        self.upcoming.len() + self.later.len() + self.remembrance.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Derive every event from the snapshot, in source order.
///
/// `today` fixes the year used for ages and marriage lengths. Records with a
/// missing or unparseable date contribute nothing.
pub fn collect_events(
    persons: &[Person],
    couples: &[Couple],
    custom: &[CustomEvent],
    today: NaiveDate,
) -> Vec<CalendarEvent> {
    let index = FamilyIndex::new(persons);
    let mut events = Vec::new();

    for &person in index.persons() {
        if let Some(death) = person.death_date.as_deref() {
            let Some(died) = parse_date(death) else {
                tracing::trace!(id = %person.id, "unparseable death date");
                continue;
            };
            let lifespan = person
                .birth_date
                .as_deref()
                .and_then(parse_date)
                .map(|born| format!("{} - {}", born.year(), died.year()));
            events.push(CalendarEvent {
                kind: EventKind::Remembrance,
                source_id: person.id.to_string(),
                title: person.display_name(),
                date: died,
                next_occurrence: None,
                age: None,
                years: None,
                lifespan,
            });
        } else if let Some(born) = person.birth_date.as_deref().and_then(parse_date) {
            events.push(CalendarEvent {
                kind: EventKind::Birthday,
                source_id: person.id.to_string(),
                title: format!("{}'s Birthday", person.display_name()),
                date: born,
                next_occurrence: None,
                age: Some(whole_years(born, today)),
                years: None,
                lifespan: None,
            });
        }
    }

    let mut seen: HashSet<(PersonId, PersonId, NaiveDate)> = HashSet::new();
    for couple in couples {
        let Some(married) = couple.marriage_date.as_deref().and_then(parse_date) else {
            continue;
        };
        let (Some(husband), Some(wife)) = (
            index.get(couple.husband_id.as_str()),
            index.get(couple.wife_id.as_str()),
        ) else {
            continue;
        };
        let (a, b) = couple.sorted_members();
        if !seen.insert((a.clone(), b.clone(), married)) {
            continue;
        }
        events.push(CalendarEvent {
            kind: EventKind::Anniversary,
            source_id: couple.id.clone(),
            title: format!(
                "{} & {}'s Anniversary",
                husband.first_name.trim(),
                wife.first_name.trim()
            ),
            date: married,
            next_occurrence: None,
            age: None,
            years: Some(whole_years(married, today)),
            lifespan: None,
        });
    }

    for event in custom {
        let Some(date) = parse_date(&event.date) else {
            tracing::trace!(id = %event.id, "unparseable custom event date");
            continue;
        };
        events.push(CalendarEvent {
            kind: EventKind::Custom,
            source_id: event.id.clone(),
            title: event.title.clone(),
            date,
            next_occurrence: None,
            age: None,
            years: None,
            lifespan: None,
        });
    }

    events
}

/// Split events into upcoming, later and remembrance relative to `today`.
///
/// Every non-remembrance event recurs yearly. It is upcoming when its next
/// occurrence falls within `window_days` of `today`, both ends inclusive.
pub fn categorize_events(
    persons: &[Person],
    couples: &[Couple],
    custom: &[CustomEvent],
    today: NaiveDate,
    window_days: u32,
) -> CategorizedEvents {
    let horizon = today
        .checked_add_days(Days::new(u64::from(window_days)))
        .unwrap_or(NaiveDate::MAX);

    let mut out = CategorizedEvents::default();
    for mut event in collect_events(persons, couples, custom, today) {
        if event.kind == EventKind::Remembrance {
            out.remembrance.push(event);
            continue;
        }
        let Some(next) = next_anniversary(event.date, today) else {
            continue;
        };
        event.next_occurrence = Some(next);
        if next <= horizon {
            out.upcoming.push(event);
        } else {
            out.later.push(event);
        }
    }

    out.upcoming.sort_by_key(|e| e.next_occurrence);
    out.later.sort_by_key(|e| e.next_occurrence);
    out.remembrance.sort_by_key(|e| (e.date.month(), e.date.day()));
    out
}

fn whole_years(from: NaiveDate, to: NaiveDate) -> u32 {
    (to.year() - from.year()).max(0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn snapshot() -> (Vec<Person>, Vec<Couple>, Vec<CustomEvent>) {
        let persons = vec![
            Person::new("ada").with_name("Ada", "Lovelace").with_birth_date("1990-06-20"),
            Person::new("bob").with_name("Bob", "Byron").with_birth_date("1988-12-01"),
            Person::new("gran")
                .with_name("Grace", "Byron")
                .with_birth_date("1920-01-05")
                .with_death_date("2001-03-10"),
            Person::new("old").with_name("Olga", "").with_death_date("1999-02-01"),
            Person::new("bad").with_birth_date("not a date"),
        ];
        let couples = vec![
            Couple::new("c1", "bob", "ada").with_marriage_date("2015-07-04"),
            // Same union recorded twice with members swapped.
            Couple::new("c2", "ada", "bob").with_marriage_date("2015-07-04"),
            Couple::new("c3", "bob", "ghost").with_marriage_date("2010-01-01"),
        ];
        let custom = vec![
            CustomEvent {
                id: "e1".into(),
                title: "Reunion".into(),
                date: "2024-06-16".into(),
            },
            CustomEvent {
                id: "e2".into(),
                title: "Broken".into(),
                date: "someday".into(),
            },
        ];
        (persons, couples, custom)
    }

    #[test]
    fn test_collect_events() {
        let (persons, couples, custom) = snapshot();
        let events = collect_events(&persons, &couples, &custom, d(2024, 6, 15));

        let kinds: Vec<EventKind> = events.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::Birthday,
                EventKind::Birthday,
                EventKind::Remembrance,
                EventKind::Remembrance,
                EventKind::Anniversary,
                EventKind::Custom,
            ]
        );

        assert_eq!(events[0].title, "Ada Lovelace's Birthday");
        assert_eq!(events[0].age, Some(34));
        assert_eq!(events[2].lifespan.as_deref(), Some("1920 - 2001"));
        assert_eq!(events[3].lifespan, None);
        assert_eq!(events[4].title, "Bob & Ada's Anniversary");
        assert_eq!(events[4].years, Some(9));
    }

    #[test]
    fn test_categorize_events() {
        let (persons, couples, custom) = snapshot();
        let today = d(2024, 6, 15);
        let events = categorize_events(&persons, &couples, &custom, today, DEFAULT_UPCOMING_WINDOW_DAYS);

        let upcoming: Vec<&str> = events.upcoming.iter().map(|e| e.source_id.as_str()).collect();
        assert_eq!(upcoming, vec!["e1", "ada", "c1"]);
        assert_eq!(events.upcoming[0].next_occurrence, Some(d(2024, 6, 16)));

        let later: Vec<&str> = events.later.iter().map(|e| e.source_id.as_str()).collect();
        assert_eq!(later, vec!["bob"]);

        let remembrance: Vec<&str> = events.remembrance.iter().map(|e| e.source_id.as_str()).collect();
        assert_eq!(remembrance, vec!["old", "gran"], "sorted by month and day");
        assert!(events.remembrance.iter().all(|e| e.next_occurrence.is_none()));
    }

    #[test]
    fn test_window_is_inclusive() {
        let persons = vec![Person::new("p").with_birth_date("2000-07-15")];
        let today = d(2024, 6, 15);

        let events = categorize_events(&persons, &[], &[], today, 30);
        assert_eq!(events.upcoming.len(), 1);

        let events = categorize_events(&persons, &[], &[], today, 29);
        assert_eq!(events.later.len(), 1);
    }

    #[test]
    fn test_empty_snapshot() {
        let events = categorize_events(&[], &[], &[], d(2024, 1, 1), 30);
        assert!(events.is_empty());
    }
}
