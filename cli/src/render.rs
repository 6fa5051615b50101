use attendify_core::{
    Breakdown, CollegeGuidance, Percentage, StatsSummary, SubjectBreakdown, UserProfile, UserType,
    Week,
};
use tabled::settings::object::Rows;
use tabled::settings::{Color, Modify, Style};
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct DayRow {
    #[tabled(rename = "Day")]
    day: &'static str,
    #[tabled(rename = "Present")]
    present: &'static str,
}

#[derive(Tabled)]
struct WeekRow {
    #[tabled(rename = "Week")]
    week: String,
    #[tabled(rename = "Days")]
    days: String,
    #[tabled(rename = "Attended")]
    attended: String,
    #[tabled(rename = "%")]
    percentage: String,
}

#[derive(Tabled)]
struct SubjectRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Subject")]
    name: String,
    #[tabled(rename = "Attended")]
    attended: String,
    #[tabled(rename = "Missed")]
    missed: u32,
    #[tabled(rename = "%")]
    percentage: String,
    #[tabled(rename = "Goal")]
    goal: &'static str,
}

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

const SHORT_ID_LEN: usize = 8;
const BAR_WIDTH: usize = 20;

fn print_table<T: Tabled>(rows: Vec<T>) {
    let mut table = Table::new(rows);
    table
        .with(Style::modern())
        .with(Modify::new(Rows::first()).with(Color::FG_CYAN));
    println!("{}", table);
}

fn short_id(id: &str) -> String {
    id.chars().take(SHORT_ID_LEN).collect()
}

/// Fill is capped at 100% since bonus credit can push the value past it.
fn progress_bar(percentage: Percentage) -> String {
    let filled = ((percentage.clamped() / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

fn mark(present: bool) -> &'static str {
    if present {
        "✔"
    } else {
        "·"
    }
}

pub fn print_profile(profile: &UserProfile) {
    println!("{}", profile.headline());
}

/// One week as a Monday..Saturday checklist.
pub fn print_week(week: &Week, week_count: usize) {
    println!(
        "Week {} of {} (started {})",
        week.week_number,
        week_count,
        week.start_date.format("%Y-%m-%d")
    );
    let rows: Vec<DayRow> = week
        .attendance
        .iter()
        .map(|(day, present)| DayRow {
            day: day.label(),
            present: mark(present),
        })
        .collect();
    print_table(rows);
    println!(
        "{}/{} days present ({}%)",
        week.days_present(),
        week.days_total(),
        week.percentage()
    );
}

pub fn print_summary(summary: &StatsSummary) {
    let mut rows = vec![
        MetricRow {
            metric: match summary.user_type {
                UserType::School => "Weeks tracked",
                UserType::College => "Subjects",
            },
            value: summary.tracked_items.to_string(),
        },
        MetricRow {
            metric: "Total",
            value: summary.total_units.to_string(),
        },
        MetricRow {
            metric: "Attended",
            value: summary.attended_with_bonus().to_string(),
        },
        MetricRow {
            metric: "Missed",
            value: summary.missed_units.to_string(),
        },
    ];
    if summary.user_type == UserType::College {
        rows.push(MetricRow {
            metric: "ECA credit",
            value: summary.bonus_units.to_string(),
        });
    }
    rows.push(MetricRow {
        metric: "Attendance",
        value: format!("{}% {}", summary.percentage, progress_bar(summary.percentage)),
    });
    if let (Some(goal), Some(delta)) = (summary.goal, summary.goal_delta) {
        rows.push(MetricRow {
            metric: "Goal",
            value: format!("{}% ({:+.1})", goal, delta),
        });
    }
    print_table(rows);

    match &summary.breakdown {
        Breakdown::Weeks(_) => print_history(summary),
        Breakdown::Subjects(subjects) => print_subjects(subjects),
    }
}

/// Weeks with the most recent first.
pub fn print_history(summary: &StatsSummary) {
    let rows: Vec<WeekRow> = summary
        .weeks_newest_first()
        .into_iter()
        .map(|week| WeekRow {
            week: format!("Week {}", week.week_number),
            days: week
                .present_days
                .iter()
                .map(|d| d.short())
                .collect::<Vec<_>>()
                .join(" "),
            attended: format!("{}/{}", week.days_present, week.days_total),
            percentage: week.percentage.to_string(),
        })
        .collect();

    if rows.is_empty() {
        println!("No weeks recorded.");
        return;
    }
    print_table(rows);
}

pub fn print_subjects(subjects: &[SubjectBreakdown]) {
    if subjects.is_empty() {
        println!("No subjects yet. Add one with `attendify college add`.");
        return;
    }
    let rows: Vec<SubjectRow> = subjects
        .iter()
        .map(|s| SubjectRow {
            id: short_id(s.id.as_str()),
            name: s.name.clone(),
            attended: format!("{}/{}", s.attended, s.total),
            missed: s.missed,
            percentage: s.percentage.to_string(),
            goal: if s.meets_goal { "✔" } else { "below" },
        })
        .collect();
    print_table(rows);
}

pub fn print_guidance(guidance: &CollegeGuidance) {
    println!(
        "Overall {}% against a {}% goal. {}",
        guidance.percentage,
        guidance.goal,
        guidance.standing.message()
    );

    let plan = &guidance.plan;
    let rows = vec![
        MetricRow {
            metric: "Required to meet goal",
            value: plan.required_classes.to_string(),
        },
        MetricRow {
            metric: "Counted as attended",
            value: plan.achieved_classes.to_string(),
        },
        MetricRow {
            metric: "Can skip",
            value: plan.can_skip.to_string(),
        },
        MetricRow {
            metric: "Need to attend",
            value: plan.need_to_attend.to_string(),
        },
    ];
    print_table(rows);

    let eca = &guidance.eca;
    if eca.eca_count > 0 {
        println!(
            "ECA credit: {} class(es), {}% -> {}% (+{:.1})",
            eca.eca_count, eca.base_percentage, eca.boosted_percentage, eca.improvement
        );
    }
}
