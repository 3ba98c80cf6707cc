//! Sidebar filter state.
//!
//! Kept free of terminal types so key handling can be tested directly. The
//! panel owns the option lists (taken from the loaded dataset, "All" first) and
//! turns the current selection into a `FilterSpec`.

use chrono::NaiveDate;

use crate::domain::{ALL_SENTINEL, Choice, Dataset, DateSelection, FilterSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    From,
    To,
    Season,
    Weather,
    DayType,
}

impl FilterField {
    pub const ALL: [FilterField; 5] = [
        FilterField::From,
        FilterField::To,
        FilterField::Season,
        FilterField::Weather,
        FilterField::DayType,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FilterField::From => "From",
            FilterField::To => "To",
            FilterField::Season => "Season",
            FilterField::Weather => "Weather",
            FilterField::DayType => "Day type",
        }
    }

    fn is_date(self) -> bool {
        matches!(self, FilterField::From | FilterField::To)
    }
}

/// Result of feeding a key to the date editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// Still editing.
    Pending,
    /// Edit applied; the filter changed.
    Applied,
    Canceled,
    /// The text is not a date; editing continues.
    Invalid(String),
}

#[derive(Debug, Clone)]
pub struct FilterPanel {
    seasons: Vec<String>,
    weathers: Vec<String>,
    day_types: Vec<String>,
    season: usize,
    weather: usize,
    day_type: usize,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    selected: usize,
    editing: Option<String>,
}

impl FilterPanel {
    pub fn new(dataset: &Dataset, initial: &FilterSpec) -> Self {
        let (from, to) = match initial.dates {
            DateSelection::All => (None, None),
            DateSelection::Single(d) => (Some(d), None),
            DateSelection::Range { start, end } => (Some(start), Some(end)),
        };

        let seasons = with_all(dataset.season_labels());
        let weathers = with_all(dataset.weather_labels());
        let day_types = with_all(dataset.day_type_labels());
        Self {
            season: position(&seasons, &initial.season),
            weather: position(&weathers, &initial.weather),
            day_type: position(&day_types, &initial.day_type),
            seasons,
            weathers,
            day_types,
            from,
            to,
            selected: 0,
            editing: None,
        }
    }

    pub fn spec(&self) -> FilterSpec {
        FilterSpec {
            dates: DateSelection::from_endpoints(self.from, self.to),
            season: Choice::parse(&self.seasons[self.season]),
            weather: Choice::parse(&self.weathers[self.weather]),
            day_type: Choice::parse(&self.day_types[self.day_type]),
        }
    }

    pub fn selected(&self) -> FilterField {
        FilterField::ALL[self.selected]
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1).min(FilterField::ALL.len() - 1);
    }

    /// Step the selected categorical field; returns whether the filter changed.
    pub fn cycle(&mut self, delta: isize) -> bool {
        let (options, idx) = match self.selected() {
            FilterField::Season => (&self.seasons, &mut self.season),
            FilterField::Weather => (&self.weathers, &mut self.weather),
            FilterField::DayType => (&self.day_types, &mut self.day_type),
            FilterField::From | FilterField::To => return false,
        };
        if options.len() < 2 {
            return false;
        }
        let n = options.len() as isize;
        *idx = (*idx as isize + delta).rem_euclid(n) as usize;
        true
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn edit_buffer(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    /// Start editing the selected date field; false for categorical fields.
    pub fn begin_edit(&mut self) -> bool {
        let field = self.selected();
        if !field.is_date() {
            return false;
        }
        let current = self.date(field).map(|d| d.to_string()).unwrap_or_default();
        self.editing = Some(current);
        true
    }

    pub fn push_char(&mut self, c: char) {
        if let Some(buf) = &mut self.editing {
            if (c.is_ascii_digit() || c == '-') && buf.len() < 10 {
                buf.push(c);
            }
        }
    }

    pub fn pop_char(&mut self) {
        if let Some(buf) = &mut self.editing {
            buf.pop();
        }
    }

    pub fn cancel_edit(&mut self) -> EditOutcome {
        self.editing = None;
        EditOutcome::Canceled
    }

    /// Apply the edit buffer. An empty buffer clears the endpoint.
    pub fn commit_edit(&mut self) -> EditOutcome {
        let Some(buf) = &self.editing else {
            return EditOutcome::Canceled;
        };
        let text = buf.trim();
        let value = if text.is_empty() {
            None
        } else {
            match NaiveDate::parse_from_str(text, "%Y-%m-%d") {
                Ok(d) => Some(d),
                Err(e) => return EditOutcome::Invalid(format!("'{text}' is not a YYYY-MM-DD date: {e}")),
            }
        };
        match self.selected() {
            FilterField::From => self.from = value,
            FilterField::To => self.to = value,
            _ => {}
        }
        self.editing = None;
        EditOutcome::Applied
    }

    /// Reset every field to "no constraint".
    pub fn clear(&mut self) {
        self.season = 0;
        self.weather = 0;
        self.day_type = 0;
        self.from = None;
        self.to = None;
        self.editing = None;
    }

    /// Display value of one field.
    pub fn value(&self, field: FilterField) -> String {
        match field {
            FilterField::From | FilterField::To => {
                self.date(field).map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
            }
            FilterField::Season => self.seasons[self.season].clone(),
            FilterField::Weather => self.weathers[self.weather].clone(),
            FilterField::DayType => self.day_types[self.day_type].clone(),
        }
    }

    fn date(&self, field: FilterField) -> Option<NaiveDate> {
        match field {
            FilterField::From => self.from,
            FilterField::To => self.to,
            _ => None,
        }
    }
}

fn with_all(labels: Vec<String>) -> Vec<String> {
    let mut options = vec![ALL_SENTINEL.to_string()];
    options.extend(labels.into_iter().filter(|l| !l.eq_ignore_ascii_case(ALL_SENTINEL)));
    options
}

fn position(options: &[String], choice: &Choice) -> usize {
    match choice {
        Choice::All => 0,
        Choice::Only(v) => options.iter().position(|o| o == v).unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{dataset, record};

    fn panel() -> FilterPanel {
        let mut rows = vec![
            record("2011-01-01 08:00:00", "Winter", 1, 1),
            record("2011-07-01 08:00:00", "Summer", 1, 1),
        ];
        rows[1].weathersit_label = "Cloudy".to_string();
        FilterPanel::new(&dataset(rows), &FilterSpec::default())
    }

    #[test]
    fn starts_unconstrained() {
        assert_eq!(panel().spec(), FilterSpec::default());
    }

    #[test]
    fn cycling_wraps_through_all() {
        let mut p = panel();
        p.select_next();
        p.select_next();
        assert_eq!(p.selected(), FilterField::Season);

        assert!(p.cycle(1));
        assert_eq!(p.spec().season, Choice::Only("Summer".to_string()));
        assert!(p.cycle(1));
        assert_eq!(p.spec().season, Choice::Only("Winter".to_string()));
        assert!(p.cycle(1));
        assert_eq!(p.spec().season, Choice::All);
        assert!(p.cycle(-1));
        assert_eq!(p.spec().season, Choice::Only("Winter".to_string()));
    }

    #[test]
    fn cycling_a_date_field_does_nothing() {
        let mut p = panel();
        assert!(!p.cycle(1));
        assert_eq!(p.spec(), FilterSpec::default());
    }

    #[test]
    fn date_edit_builds_a_range() {
        let mut p = panel();
        assert!(p.begin_edit());
        for c in "2011-01-01".chars() {
            p.push_char(c);
        }
        assert_eq!(p.commit_edit(), EditOutcome::Applied);
        assert!(matches!(p.spec().dates, DateSelection::Single(_)));

        p.select_next();
        p.begin_edit();
        for c in "2011-0x3-31".chars() {
            p.push_char(c);
        }
        assert_eq!(p.edit_buffer(), Some("2011-03-31"));
        p.commit_edit();
        assert_eq!(
            p.spec().dates,
            DateSelection::Range {
                start: NaiveDate::from_ymd_opt(2011, 1, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(2011, 3, 31).unwrap(),
            }
        );
    }

    #[test]
    fn invalid_date_keeps_editing() {
        let mut p = panel();
        p.begin_edit();
        for c in "2011-13".chars() {
            p.push_char(c);
        }
        assert!(matches!(p.commit_edit(), EditOutcome::Invalid(_)));
        assert!(p.is_editing());
        assert_eq!(p.cancel_edit(), EditOutcome::Canceled);
        assert_eq!(p.spec().dates, DateSelection::All);
    }

    #[test]
    fn clear_resets_everything() {
        let mut p = panel();
        p.select_next();
        p.select_next();
        p.cycle(1);
        p.clear();
        assert_eq!(p.spec(), FilterSpec::default());
    }

    #[test]
    fn initial_spec_is_reflected() {
        let ds = dataset(vec![record("2011-01-01 08:00:00", "Winter", 1, 1)]);
        let spec = FilterSpec {
            season: Choice::parse("Winter"),
            ..FilterSpec::default()
        };
        let p = FilterPanel::new(&ds, &spec);
        assert_eq!(p.value(FilterField::Season), "Winter");
        assert_eq!(p.spec(), spec);
    }
}
