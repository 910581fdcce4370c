//! Terminal output.

use chrono::Utc;
use focusforge_core::Session;
use focusforge_session::{CompletionReport, LoggedDistraction};
use focusforge_stats::{time_ago, DashboardStats, DistractionLog, WeeklyBuckets, DAY_INITIALS};
use std::io::Write;

const BAR_WIDTH: usize = 30;

/// `[█████░░░░░]` for a 0-100 percentage.
pub fn progress_bar(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    format!("[{}{}]", "\u{2588}".repeat(filled), "\u{2591}".repeat(width - filled))
}

pub fn session_started(session: &Session) {
    println!("Session started! Stay focused and minimize distractions.");
    println!();
    println!("  Goal:      {}", session.display_goal());
    println!("  Duration:  {} minutes", session.duration);
    println!();
}

/// Redraw the countdown line in place.
pub fn tick(display: &str, remaining_seconds: u32, minutes: u32) {
    let total = minutes.saturating_mul(60).max(1);
    let percent = (total.saturating_sub(remaining_seconds)) as f64 / total as f64 * 100.0;
    print!(
        "\r  {:>6} {} {:>3.0}% complete",
        display,
        progress_bar(percent, BAR_WIDTH),
        percent
    );
    std::io::stdout().flush().ok();
}

pub fn distraction(logged: &LoggedDistraction) {
    println!(
        "\n  distraction: {} (total {})",
        logged.distraction.kind.label(),
        logged.count
    );
    if let Some(warning) = &logged.warning {
        eprintln!("  warning: {}", warning);
    }
}

pub fn completion(report: &CompletionReport) {
    println!();
    println!();
    println!("Session completed!");
    println!("{}", report.summary());
    if let (Some(xp), Some(streak)) = (report.total_xp, report.streak) {
        println!("  Total XP: {}   Streak: {} day(s)", xp, streak);
    }
    if let Some(badge) = &report.badge {
        println!("  New badge: {} {}", badge.display_icon(), badge.name);
    }
    for warning in &report.warnings {
        eprintln!("  warning: {}", warning);
    }
}

pub fn dashboard(stats: &DashboardStats) {
    let (hours, mins) = stats.totals.focus_time();

    println!("Dashboard");
    println!();
    println!("  Total Sessions:   {}", stats.totals.total_sessions);
    println!("  Focus Time:       {}h {}m", hours, mins);
    println!("  Day Streak:       {}", stats.streak);
    println!("  Total XP:         {}", stats.xp);
    println!();

    println!("Progress Goals");
    let goals = &stats.goals;
    println!(
        "  Sessions     {} {}/{}",
        progress_bar(goals.sessions.percent(), BAR_WIDTH),
        goals.sessions.current,
        goals.sessions.target
    );
    println!(
        "  Focus Time   {} {}/{} min",
        progress_bar(goals.minutes.percent(), BAR_WIDTH),
        goals.minutes.current,
        goals.minutes.target
    );
    println!(
        "  Distraction  {} {}%",
        progress_bar(f64::from(goals.distraction_control), BAR_WIDTH),
        goals.distraction_control
    );
    println!();

    println!("Sessions This Week");
    let max = stats.weekly.max().max(1);
    for (label, count) in stats.weekly.labeled() {
        let width = (count as usize * 20) / max as usize;
        println!("  {}  {:<20} {}", label, "\u{2588}".repeat(width), count);
    }
    println!();

    println!("Badges");
    if stats.badges.is_empty() {
        println!("  Complete sessions to earn badges!");
    }
    let now = Utc::now();
    for badge in &stats.badges {
        let earned = badge
            .earned_at
            .map(|at| format!(" ({})", time_ago(at, now)))
            .unwrap_or_default();
        println!("  {} {}{}", badge.display_icon(), badge.name, earned);
        println!("     {}", badge.description);
    }
}

pub fn calendar(buckets: &WeeklyBuckets) {
    println!("This Week");
    let days: Vec<String> = DAY_INITIALS.iter().map(|d| format!("{:>3}", d)).collect();
    let counts: Vec<String> = buckets.counts.iter().map(|c| format!("{:>3}", c)).collect();
    println!("  {}", days.join(""));
    println!("  {}", counts.join(""));
}

pub fn history(log: &DistractionLog) {
    println!("Session History");
    if log.sessions.is_empty() {
        println!("  No sessions yet");
    }
    for line in &log.sessions {
        println!("  {}", line.to_string().replace('\n', "\n  "));
    }
    println!();

    println!("Distraction Log");
    if log.distractions.is_empty() {
        println!("  No distractions logged");
    }
    for line in &log.distractions {
        println!("  {}", line);
    }
    if !log.distractions.is_empty() {
        let summary: Vec<String> = log
            .kind_counts()
            .into_iter()
            .filter(|(_, n)| *n > 0)
            .map(|(kind, n)| format!("{}: {}", kind.label(), n))
            .collect();
        println!();
        println!("  {}", summary.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0.0, 4), "[\u{2591}\u{2591}\u{2591}\u{2591}]");
        assert_eq!(progress_bar(50.0, 4), "[\u{2588}\u{2588}\u{2591}\u{2591}]");
        assert_eq!(progress_bar(250.0, 4), "[\u{2588}\u{2588}\u{2588}\u{2588}]");
    }
}
