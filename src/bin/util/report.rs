use colored::Colorize;
use coursescout::{CourseRecord, ScrapeOutcome};

/// Prints a one-line summary of a scrape run.
pub fn print_outcome(url: &str, outcome: &ScrapeOutcome) {
    match outcome {
        ScrapeOutcome::Complete { records, skipped } => {
            println!(
                "{} {} course(s) from {}",
                "✓ Scraped".green(),
                records.len(),
                url
            );
            if *skipped > 0 {
                println!("{} {} card(s) could not be read", "⚠ Skipped".yellow(), skipped);
            }
        }
        ScrapeOutcome::Aborted { records, error } => {
            println!(
                "{} after {} course(s): {}",
                "✗ Scrape stopped".red(),
                records.len(),
                error
            );
        }
        ScrapeOutcome::TimedOut => {
            println!("{} waiting for course cards on {}", "✗ Timed out".red(), url);
        }
        ScrapeOutcome::Failed(error) => {
            println!("{} {}", "✗ Scrape failed:".red(), error);
        }
    }
}

pub fn print_courses(courses: &[CourseRecord]) {
    for course in courses {
        println!(
            "Title: {}, Description: {}, Price: {}, Lessons: {}",
            course.title.bold(),
            course.description,
            course.price,
            course.lessons
        );
    }
}
