use std::collections::BTreeMap;

use crate::model::{
    Completion, DisciplineStat, StatisticsRecord, StatisticsReport, SummaryStatistics,
    TrafficLight,
};

/// At or below this on-time percentage the light is red.
pub const RED_MAX_PERCENT: f64 = 35.0;
/// Below this on-time percentage the light is orange; from here on green.
pub const GREEN_MIN_PERCENT: f64 = 75.0;

pub fn traffic_light(on_time_percent: f64) -> TrafficLight {
    if on_time_percent <= RED_MAX_PERCENT {
        TrafficLight::Red
    } else if on_time_percent < GREEN_MIN_PERCENT {
        TrafficLight::Orange
    } else {
        TrafficLight::Green
    }
}

fn percent(count: usize, of: usize) -> f64 {
    if of == 0 {
        0.0
    } else {
        count as f64 / of as f64 * 100.0
    }
}

/// Counters, percentages and traffic light over classified records.
pub fn summarize(records: &[StatisticsRecord]) -> SummaryStatistics {
    let mut missing_dates = 0;
    let mut overdue_count = 0;
    for r in records {
        match r.completion {
            Completion::MissingDates => missing_dates += 1,
            Completion::Late => overdue_count += 1,
            Completion::OnTime => {}
        }
    }

    let valid_dates = records.len() - missing_dates;
    let on_time_count = valid_dates - overdue_count;
    let on_time_percent = percent(on_time_count, valid_dates);

    SummaryStatistics {
        total_filtered: records.len(),
        valid_dates,
        on_time_count,
        overdue_count,
        missing_dates,
        on_time_percent,
        overdue_percent: percent(overdue_count, valid_dates),
        traffic_light: traffic_light(on_time_percent),
    }
}

/// Lateness per causing discipline over `Late` records that name one.
/// Sorted by average days late, highest first; ties by discipline name.
pub fn discipline_stats(records: &[StatisticsRecord]) -> Vec<DisciplineStat> {
    let mut groups: BTreeMap<&str, (i64, usize)> = BTreeMap::new();

    for r in records.iter().filter(|r| r.completion == Completion::Late) {
        let Some(discipline) = r.discipline.as_deref() else {
            continue;
        };
        let entry = groups.entry(discipline).or_insert((0, 0));
        entry.0 += r.days_late.unwrap_or(0).max(0);
        entry.1 += 1;
    }

    let mut stats: Vec<DisciplineStat> = groups
        .into_iter()
        .map(|(discipline, (total, count))| DisciplineStat {
            discipline: discipline.to_string(),
            total_late_days: total,
            occurrences: count,
            average_late_days: total as f64 / count as f64,
        })
        .collect();

    stats.sort_by(|a, b| {
        b.average_late_days
            .total_cmp(&a.average_late_days)
            .then_with(|| a.discipline.cmp(&b.discipline))
    });
    stats
}

/// Full statistics view; recomputed from scratch on every call.
pub fn build_statistics(records: Vec<StatisticsRecord>) -> StatisticsReport {
    StatisticsReport {
        summary: summarize(&records),
        disciplines: discipline_stats(&records),
        records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(completion: Completion, days_late: Option<i64>, discipline: Option<&str>) -> StatisticsRecord {
        StatisticsRecord {
            code: "S".into(),
            title: String::new(),
            measure: String::new(),
            action_holder: String::new(),
            planned_date: None,
            done_date: None,
            completion,
            days_late,
            discipline: discipline.map(String::from),
        }
    }

    #[test]
    fn traffic_light_boundaries() {
        assert_eq!(traffic_light(0.0), TrafficLight::Red);
        assert_eq!(traffic_light(35.0), TrafficLight::Red);
        assert_eq!(traffic_light(35.0001), TrafficLight::Orange);
        assert_eq!(traffic_light(74.999), TrafficLight::Orange);
        assert_eq!(traffic_light(75.0), TrafficLight::Green);
        assert_eq!(traffic_light(100.0), TrafficLight::Green);
    }

    #[test]
    fn summary_counts_and_percentages() {
        let records = vec![
            record(Completion::OnTime, None, None),
            record(Completion::OnTime, None, None),
            record(Completion::OnTime, None, None),
            record(Completion::Late, Some(4), Some("Civiel")),
            record(Completion::MissingDates, None, None),
        ];
        let s = summarize(&records);
        assert_eq!(s.total_filtered, 5);
        assert_eq!(s.valid_dates, 4);
        assert_eq!(s.on_time_count, 3);
        assert_eq!(s.overdue_count, 1);
        assert_eq!(s.missing_dates, 1);
        assert_eq!(s.on_time_percent, 75.0);
        assert_eq!(s.overdue_percent, 25.0);
        assert_eq!(s.traffic_light, TrafficLight::Green);
    }

    #[test]
    fn no_valid_dates_means_zero_percent() {
        let records = vec![record(Completion::MissingDates, None, None)];
        let s = summarize(&records);
        assert_eq!(s.valid_dates, 0);
        assert_eq!(s.on_time_percent, 0.0);
        assert_eq!(s.overdue_percent, 0.0);
        assert_eq!(s.traffic_light, TrafficLight::Red);

        let s = summarize(&[]);
        assert_eq!(s.total_filtered, 0);
        assert_eq!(s.on_time_percent, 0.0);
    }

    #[test]
    fn disciplines_sorted_by_average() {
        let records = vec![
            record(Completion::Late, Some(2), Some("Civiel")),
            record(Completion::Late, Some(4), Some("Civiel")),
            record(Completion::Late, Some(10), Some("E&I")),
            record(Completion::Late, Some(1), None),
            record(Completion::OnTime, None, Some("Werktuigbouw")),
        ];
        let stats = discipline_stats(&records);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].discipline, "E&I");
        assert_eq!(stats[0].average_late_days, 10.0);
        assert_eq!(stats[1].discipline, "Civiel");
        assert_eq!(stats[1].total_late_days, 6);
        assert_eq!(stats[1].occurrences, 2);
        assert_eq!(stats[1].average_late_days, 3.0);
    }

    #[test]
    fn negative_lateness_is_clamped() {
        let records = vec![record(Completion::Late, Some(-3), Some("Civiel"))];
        let stats = discipline_stats(&records);
        assert_eq!(stats[0].total_late_days, 0);
        assert_eq!(stats[0].occurrences, 1);
    }

    #[test]
    fn recomputation_is_identical() {
        let records = vec![
            record(Completion::OnTime, None, None),
            record(Completion::Late, Some(7), Some("Civiel")),
            record(Completion::Late, Some(3), Some("Proces")),
            record(Completion::MissingDates, None, None),
        ];
        let first = build_statistics(records.clone());
        let second = build_statistics(records);
        assert_eq!(first, second);
        assert_eq!(
            first.summary.on_time_percent.to_bits(),
            second.summary.on_time_percent.to_bits()
        );
    }
}
