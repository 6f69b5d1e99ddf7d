use chrono::{DateTime, NaiveDate, TimeZone, Utc, Weekday};
use clap::{Parser, Subcommand};
use gymforge_core::*;
use std::collections::HashSet;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser)]
#[command(name = "gymforge")]
#[command(about = "Gym membership progression and session tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Treat this date as today (YYYY-MM-DD), for backfills and testing
    #[arg(long, global = true)]
    date: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum Commands {
    /// Enroll a new member
    Enroll {
        member: String,
        /// Display name; defaults to the member id
        #[arg(long)]
        name: Option<String>,
    },

    /// Check a member in for the day
    CheckIn { member: String },

    /// Check a member out, crediting the long-visit bonus when earned
    CheckOut { member: String },

    /// Show a member's level, rank, streak and lifetime totals
    Progress { member: String },

    /// Log a standalone set outside any session
    LogSet {
        member: String,
        exercise: String,
        reps: u32,
    },

    /// Submit physical test scores (discipline=score pairs)
    Assess {
        member: String,
        /// e.g. push-ups=42 squats=65 sprint=15.2
        #[arg(required = true)]
        scores: Vec<String>,
    },

    /// List a member's unlocked achievements
    Achievements { member: String },

    /// Choose a specialization class (warrior, ranger, tank, assassin, mage)
    Class { member: String, class: String },

    /// Declare training weekdays; the rest become streak rest days
    TrainingDays {
        member: String,
        /// e.g. mon wed fri
        #[arg(required = true)]
        days: Vec<String>,
    },

    /// Workout session commands
    #[command(subcommand)]
    Session(SessionCommands),

    /// Show a member's activity history from the journal
    History { member: String },

    /// Rank members by total exp, total reps or current streak
    Leaderboard {
        /// exp, reps or streak
        metric: String,

        /// How many rows to show
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

#[derive(Subcommand)]
enum SessionCommands {
    /// Start (or resume) today's session for a plan
    Start { member: String, plan: String },

    /// Record a set within today's session
    Set {
        member: String,
        plan: String,
        exercise: String,
        set_number: u32,
        reps: u32,
        /// Load in kilograms, when applicable
        #[arg(long)]
        load: Option<f64>,
    },

    /// Show today's session progress for a plan
    Status { member: String, plan: String },

    /// Close out today's session, reporting the completion state
    Finish { member: String, plan: String },

    /// Swap an exercise for today's session only
    Substitute {
        member: String,
        plan: String,
        original: String,
        replacement: String,
    },

    /// Suggest the next load for an exercise in today's session
    Recommend {
        member: String,
        plan: String,
        exercise: String,
    },
}

fn main() -> Result<()> {
    gymforge_core::logging::init();

    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(dir) = cli.data_dir {
        config.data.data_dir = dir;
    }

    let catalog = build_default_catalog();
    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::CatalogValidation("Invalid catalog".into()));
    }

    // The whole engine runs on an explicit clock; --date pins it for backfills
    let now: DateTime<Utc> = match cli.date {
        Some(date) => {
            let at_noon = date.and_hms_opt(12, 0, 0).ok_or_else(|| {
                Error::InvalidState(format!("invalid date {}", date))
            })?;
            Utc.from_utc_datetime(&at_noon)
        }
        None => Utc::now(),
    };

    let engine = Engine::new(config).with_catalog(catalog);

    match cli.command {
        Commands::Enroll { member, name } => {
            let display = name.unwrap_or_else(|| member.clone());
            engine.enroll(&member, &display)?;
            println!("✓ Enrolled {} ({})", member, display);
        }

        Commands::CheckIn { member } => {
            let outcome = engine.check_in(&member, now)?;
            if outcome.already_checked_in {
                println!("Already checked in on {}", outcome.date);
            } else {
                println!(
                    "✓ Checked in on {} (streak {}, x{:.1})",
                    outcome.date, outcome.streak, outcome.multiplier
                );
                print_unlocked(&outcome.unlocked);
            }
        }

        Commands::CheckOut { member } => {
            let outcome = engine.check_out(&member, now)?;
            println!("✓ Checked out after {} minutes", outcome.duration_minutes);
            if outcome.bonus_exp > 0 {
                println!("★ Long visit bonus: +{} exp", outcome.bonus_exp);
            }
        }

        Commands::Progress { member } => {
            let report = engine.progress(&member)?;
            print_progress(&member, &report);
        }

        Commands::LogSet {
            member,
            exercise,
            reps,
        } => {
            let outcome = engine.log_set(&member, &exercise, reps, now)?;
            println!(
                "✓ Logged {} x{} (+{} exp)",
                exercise, reps, outcome.exp_awarded
            );
            if outcome.leveled_up {
                println!("★ Level up! Now level {}", outcome.level);
            }
            print_unlocked(&outcome.unlocked);
        }

        Commands::Assess { member, scores } => {
            let parsed = parse_scores(&scores)?;
            let outcome = engine.submit_assessment(&member, &parsed, now)?;
            println!("Assessment results:");
            for result in &outcome.assessment.results {
                println!(
                    "  {:<10} {:>8.1}  rank {} ({} pts)",
                    result.discipline.to_string(),
                    result.score,
                    result.rank,
                    result.points
                );
            }
            println!(
                "Overall: {} ({} points, was {})",
                outcome.assessment.overall, outcome.assessment.total_points, outcome.rank_before
            );
            println!("+{} exp", outcome.exp_awarded);
            print_unlocked(&outcome.unlocked);
        }

        Commands::Achievements { member } => {
            let unlocked = engine.unlocked_achievements(&member)?;
            if unlocked.is_empty() {
                println!("No achievements unlocked yet.");
            } else {
                println!("Unlocked achievements:");
                for (name, at) in unlocked {
                    println!("  ✓ {} ({})", name, at.date_naive());
                }
            }
        }

        Commands::Class { member, class } => {
            let class = ClassKind::from_str(&class)?;
            let unlocked = engine.choose_class(&member, class, now)?;
            println!("✓ Class set to {} ({})", class, class.describe());
            print_unlocked(&unlocked);
        }

        Commands::TrainingDays { member, days } => {
            let days = parse_weekdays(&days)?;
            engine.set_training_days(&member, days)?;
            println!("✓ Training days updated");
        }

        Commands::Session(cmd) => run_session_command(&engine, cmd, now)?,

        Commands::Leaderboard { metric, limit } => {
            let metric = LeaderboardMetric::from_str(&metric)?;
            let rows = engine.leaderboard(metric, limit)?;
            if rows.is_empty() {
                println!("No members enrolled yet.");
            } else {
                for (place, row) in rows.iter().enumerate() {
                    println!(
                        "{:>3}. {} ({})  {}",
                        place + 1,
                        row.display_name,
                        row.member_id,
                        row.value
                    );
                }
            }
        }

        Commands::History { member } => {
            let records = engine.history(&member)?;
            if records.is_empty() {
                println!("No activity recorded yet.");
            } else {
                for record in records {
                    println!("{}  {}", record.at.format("%Y-%m-%d %H:%M"), describe(&record.event));
                }
            }
        }
    }

    Ok(())
}

fn run_session_command(engine: &Engine, cmd: SessionCommands, now: DateTime<Utc>) -> Result<()> {
    let today = now.date_naive();
    match cmd {
        SessionCommands::Start { member, plan } => {
            match engine.start_session(&member, &plan, now)? {
                StartOutcome::New => println!("✓ Session started for plan '{}'", plan),
                StartOutcome::Resumed { recorded_sets } => {
                    println!("Resuming session ({} sets recorded)", recorded_sets.len());
                    for (exercise, set_number) in &recorded_sets {
                        println!("  ✓ {} set {}", exercise, set_number);
                    }
                }
                StartOutcome::AlreadyCompleted { total_exp } => {
                    println!("Session already completed today ({} exp earned)", total_exp)
                }
            }
        }

        SessionCommands::Set {
            member,
            plan,
            exercise,
            set_number,
            reps,
            load,
        } => {
            let outcome =
                engine.record_session_set(&member, &plan, &exercise, set_number, reps, load, now)?;
            if outcome.inserted {
                println!(
                    "✓ Set {} of {} recorded (+{} exp)",
                    set_number, exercise, outcome.exp_awarded
                );
            } else {
                println!("✓ Set {} of {} corrected", set_number, exercise);
            }
            println!(
                "  Progress: {}/{} sets ({:.0}%)",
                outcome.progress.completed_sets,
                outcome.progress.total_sets,
                outcome.progress.percentage
            );
            if outcome.session_completed {
                println!("★ Session complete!");
            }
            print_unlocked(&outcome.unlocked);
        }

        SessionCommands::Status { member, plan } => {
            let progress = engine.session_progress(&member, &plan, today)?;
            println!(
                "Progress: {}/{} sets ({:.0}%)",
                progress.completed_sets, progress.total_sets, progress.percentage
            );
        }

        SessionCommands::Finish { member, plan } => {
            let outcome = engine.complete_session(&member, &plan, now)?;
            if outcome.completed_now {
                println!("★ Session complete! ({} exp earned)", outcome.total_exp);
            } else {
                println!(
                    "Session already completed ({} exp earned)",
                    outcome.total_exp
                );
            }
        }

        SessionCommands::Substitute {
            member,
            plan,
            original,
            replacement,
        } => {
            engine.substitute_exercise(&member, &plan, &original, &replacement, now)?;
            println!("✓ Substituted {} -> {}", original, replacement);
        }

        SessionCommands::Recommend {
            member,
            plan,
            exercise,
        } => match engine.recommend_load(&member, &plan, &exercise, today)? {
            Some(suggestion) => {
                println!(
                    "Suggested load: {:.1} kg ({:?}; did {} reps, target {})",
                    suggestion.recommended,
                    suggestion.direction,
                    suggestion.performed_reps,
                    suggestion.target_reps
                );
            }
            None => println!("No loaded sets recorded yet for {}", exercise),
        },
    }
    Ok(())
}

fn print_progress(member: &str, report: &ProgressReport) {
    println!("╭─────────────────────────────────────────╮");
    println!("│  {} ({})", report.display_name, member);
    println!("╰─────────────────────────────────────────╯");
    println!();
    match report.exp_to_next {
        Some(to_next) => println!(
            "  Level {}  ({} exp, {} to next)",
            report.level, report.current_exp, to_next
        ),
        None => println!("  Level {} (max)", report.level),
    }
    println!("  Rank {}  |  Total exp {}", report.rank, report.total_exp);
    match report.class {
        Some(class) => println!("  Class: {}", class),
        None if report.can_choose_class => println!("  Class: none (ready to choose!)"),
        None => println!("  Class: none"),
    }
    println!(
        "  Streak {} (longest {}, multiplier x{:.1})",
        report.streak, report.longest_streak, report.multiplier
    );
    println!(
        "  Attendance {} days  |  Workouts {} days",
        report.attendance_days, report.workout_days
    );
    println!(
        "  Lifetime: {} sets, {} reps  |  Achievements: {}",
        report.total_sets, report.total_reps, report.achievements_unlocked
    );
}

fn print_unlocked(unlocked: &[String]) {
    for name in unlocked {
        println!("🏆 Achievement unlocked: {}", name);
    }
}

fn describe(event: &ActivityEvent) -> String {
    match event {
        ActivityEvent::CheckIn { streak } => format!("check-in (streak {})", streak),
        ActivityEvent::CheckOut {
            duration_minutes,
            bonus_exp,
        } => format!("check-out after {} min (+{} bonus)", duration_minutes, bonus_exp),
        ActivityEvent::SetLogged {
            exercise_id,
            reps,
            exp_awarded,
        } => format!("set: {} x{} (+{} exp)", exercise_id, reps, exp_awarded),
        ActivityEvent::SessionCompleted { plan_id, total_exp } => {
            format!("session '{}' completed ({} exp)", plan_id, total_exp)
        }
        ActivityEvent::AssessmentRecorded {
            total_points,
            overall,
        } => format!("assessment: {} points, rank {}", total_points, overall),
        ActivityEvent::AchievementUnlocked { name, exp_reward } => {
            format!("achievement '{}' (+{} exp)", name, exp_reward)
        }
        ActivityEvent::ClassChosen { class } => format!("class chosen: {}", class),
    }
}

/// Parse discipline=score pairs from the command line
fn parse_scores(raw: &[String]) -> Result<Vec<(Discipline, f64)>> {
    raw.iter()
        .map(|pair| {
            let (name, value) = pair.split_once('=').ok_or_else(|| {
                Error::InvalidState(format!("expected discipline=score, got '{}'", pair))
            })?;
            let discipline = Discipline::from_str(name)?;
            let score: f64 = value.parse().map_err(|_| {
                Error::InvalidState(format!("invalid score '{}' for {}", value, name))
            })?;
            Ok((discipline, score))
        })
        .collect()
}

fn parse_weekdays(raw: &[String]) -> Result<HashSet<Weekday>> {
    raw.iter()
        .map(|day| {
            Weekday::from_str(day)
                .map_err(|_| Error::InvalidState(format!("unknown weekday '{}'", day)))
        })
        .collect()
}
