//! Narrative findings derived from a `DashboardSnapshot`.
//!
//! Every sentence is computed from the current filter's numbers; nothing is
//! canned. Sections whose inputs are missing (one weather type, a failed fit)
//! are skipped rather than guessed.

use crate::aggregate::AggregateTable;
use crate::app::pipeline::DashboardSnapshot;
use crate::domain::{Measure, TEMP_CATEGORY_ORDER};

/// Line produced for a filter that matches nothing.
pub const NO_RECORDS: &str = "No records match the current filters.";

pub fn derive_insights(snapshot: &DashboardSnapshot) -> Vec<String> {
    if snapshot.is_empty() {
        return vec![NO_RECORDS.to_string()];
    }

    let mut out = Vec::new();
    out.extend(peak_hours(snapshot));
    out.extend(contrast(&snapshot.workingday, "Day type"));
    out.extend(contrast(&snapshot.weather, "Weather"));
    out.extend(temperature_contrast(snapshot));
    out.extend(strongest_driver(snapshot));
    out.extend(trend_directions(snapshot));
    out
}

fn peak_hours(snapshot: &DashboardSnapshot) -> Option<String> {
    let casual = snapshot.hourly.max_by(Measure::Casual)?;
    let registered = snapshot.hourly.max_by(Measure::Registered)?;
    Some(format!(
        "Casual riders peak at {:02}:00 ({:.1} per hour); registered riders peak at {:02}:00 ({:.1} per hour).",
        casual.key,
        casual.value(Measure::Casual).unwrap_or_default(),
        registered.key,
        registered.value(Measure::Registered).unwrap_or_default(),
    ))
}

/// Highest vs lowest group by mean `cnt`, when there are at least two groups.
fn contrast(table: &AggregateTable<String>, what: &str) -> Option<String> {
    let best = table.max_by(Measure::Cnt)?;
    let worst = table.min_by(Measure::Cnt)?;
    if best.key == worst.key {
        return None;
    }
    let hi = best.value(Measure::Cnt)?;
    let lo = worst.value(Measure::Cnt)?;
    Some(format!(
        "{what}: '{}' averages {hi:.1} rides per hour vs {lo:.1} for '{}'{}.",
        best.key,
        worst.key,
        pct_gap(hi, lo)
    ))
}

fn temperature_contrast(snapshot: &DashboardSnapshot) -> Option<String> {
    let known: Vec<_> = snapshot
        .temperature
        .rows()
        .iter()
        .filter(|r| TEMP_CATEGORY_ORDER.contains(&r.key.as_str()))
        .collect();
    let (coldest, warmest) = (known.first()?, known.last()?);
    if coldest.key == warmest.key {
        return None;
    }
    let hot = warmest.value(Measure::Cnt)?;
    let cold = coldest.value(Measure::Cnt)?;
    let direction = if hot >= cold { "more" } else { "fewer" };
    Some(format!(
        "'{}' hours see {direction} rides than '{}' hours ({hot:.1} vs {cold:.1} per hour).",
        warmest.key, coldest.key
    ))
}

fn strongest_driver(snapshot: &DashboardSnapshot) -> Option<String> {
    let matrix = snapshot.correlation.as_ref().ok()?;
    // casual + registered = cnt, so the components always win trivially.
    let (name, r) = matrix.strongest_with("cnt", &["casual", "registered"])?;
    let sign = if r >= 0.0 { "positive" } else { "negative" };
    Some(format!("'{name}' has the strongest {sign} correlation with total rentals (r = {r:.2})."))
}

fn trend_directions(snapshot: &DashboardSnapshot) -> Vec<String> {
    snapshot
        .trends
        .iter()
        .filter_map(|t| t.fit.as_ref().ok())
        .map(|fit| {
            let direction = if fit.slope >= 0.0 { "rise" } else { "fall" };
            format!(
                "Rentals {direction} by {:.2} per unit of {} (R² {:.2}).",
                fit.slope.abs(),
                fit.x,
                fit.r_squared
            )
        })
        .collect()
}

fn pct_gap(hi: f64, lo: f64) -> String {
    if lo > 0.0 {
        format!(" (+{:.0}%)", (hi / lo - 1.0) * 100.0)
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Choice, FilterSpec};
    use crate::testing::{dataset, record, summer_dataset};

    fn varied() -> crate::domain::Dataset {
        let mut rows = vec![
            record("2011-07-04 08:00:00", "Summer", 10, 190),
            record("2011-07-04 17:00:00", "Summer", 60, 340),
            record("2011-07-09 13:00:00", "Summer", 150, 100),
            record("2011-01-10 08:00:00", "Winter", 2, 48),
        ];
        rows[0].temp_category = "Hot".to_string();
        rows[0].temp_actual = 30.0;
        rows[1].hour_of_day = 17;
        rows[1].temp_category = "Hot".to_string();
        rows[1].temp_actual = 33.0;
        rows[2].hour_of_day = 13;
        rows[2].workingday_label = "Weekend/Holiday".to_string();
        rows[2].weathersit_label = "Cloudy".to_string();
        rows[2].temp_category = "Warm".to_string();
        rows[2].temp_actual = 26.0;
        rows[3].temp_category = "Cold".to_string();
        rows[3].temp_actual = 2.0;
        rows[3].weathersit_label = "Light Rain/Snow".to_string();
        dataset(rows)
    }

    #[test]
    fn empty_view_gives_single_line() {
        let spec = FilterSpec {
            season: Choice::parse("Winter"),
            ..FilterSpec::default()
        };
        let snap = DashboardSnapshot::compute(&summer_dataset(), &spec);
        assert_eq!(derive_insights(&snap), vec![NO_RECORDS.to_string()]);
    }

    #[test]
    fn findings_follow_the_numbers() {
        let snap = DashboardSnapshot::compute(&varied(), &FilterSpec::default());
        let lines = derive_insights(&snap);
        let text = lines.join("\n");

        assert!(text.contains("Casual riders peak at 13:00"), "{text}");
        assert!(text.contains("registered riders peak at 17:00"), "{text}");
        assert!(text.contains("Weather: 'Clear' averages 300.0"), "{text}");
        assert!(text.contains("'Hot' hours see more rides than 'Cold' hours"), "{text}");
        assert!(text.contains("Rentals rise by"), "{text}");
        assert!(text.contains("correlation with total rentals"), "{text}");
    }

    #[test]
    fn single_group_tables_produce_no_contrast() {
        let snap = DashboardSnapshot::compute(&summer_dataset(), &FilterSpec::default());
        let text = derive_insights(&snap).join("\n");
        assert!(!text.contains("Weather:"));
        assert!(!text.contains("Day type:"));
    }
}
