//! Course access CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use nbgrader_auth::AccessAuthorizer;
use nbgrader_core::config::AppConfig;
use nbgrader_core::error::AppError;
use nbgrader_core::types::{CourseId, MembershipResult, StudentId, SyncStatus};

/// Arguments for access commands
#[derive(Debug, Args)]
pub struct AccessArgs {
    /// Access subcommand
    #[command(subcommand)]
    pub command: AccessCommand,
}

/// Access subcommands
#[derive(Debug, Subcommand)]
pub enum AccessCommand {
    /// List the courses a student may access
    Courses {
        /// Student name, or "*" for the authenticated user
        student: String,
    },
    /// Check whether a student may access a course (non-zero exit if not)
    Check {
        /// Student name, or "*" for the authenticated user
        student: String,
        /// Course id
        course: String,
    },
    /// Add a student to a course roster
    Grant {
        /// Student name, or "*" for the authenticated user
        student: String,
        /// Course id
        course: String,
    },
    /// Remove a student from a course roster
    Revoke {
        /// Student name, or "*" for the authenticated user
        student: String,
        /// Course id
        course: String,
    },
}

/// Course display row for table output
#[derive(Debug, Serialize, Tabled)]
struct CourseRow {
    /// Course id
    course: String,
    /// Hub group
    group: String,
}

/// Execute access commands
pub async fn execute(
    args: &AccessArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let authorizer = AccessAuthorizer::from_config(config)?;

    match &args.command {
        AccessCommand::Courses { student } => {
            let student = StudentId::new(student.as_str());
            let courses = authorizer.student_courses(&student).await?;
            print_courses(&student, &courses, format);
        }
        AccessCommand::Check { student, course } => {
            let student = StudentId::new(student.as_str());
            let course = CourseId::new(course.as_str());
            authorizer.ensure_access(&student, &course).await?;
            output::print_success(&format!(
                "Student '{}' has access to course '{}'",
                student, course
            ));
        }
        AccessCommand::Grant { student, course } => {
            let student = StudentId::new(student.as_str());
            let course = CourseId::new(course.as_str());
            let status = authorizer.grant_access(&student, &course).await;
            report_sync("Granted", &student, &course, &status, format);
        }
        AccessCommand::Revoke { student, course } => {
            let student = StudentId::new(student.as_str());
            let course = CourseId::new(course.as_str());
            let status = authorizer.revoke_access(&student, &course).await;
            report_sync("Revoked", &student, &course, &status, format);
        }
    }

    Ok(())
}

fn print_courses(student: &StudentId, courses: &MembershipResult, format: OutputFormat) {
    if format == OutputFormat::Json {
        output::print_json(courses);
        return;
    }

    match courses.courses() {
        None => output::print_warning(&format!(
            "Course access is unrestricted for '{}'",
            student
        )),
        Some(courses) => {
            let rows: Vec<CourseRow> = courses
                .iter()
                .map(|c| CourseRow {
                    course: c.to_string(),
                    group: c.group_name(),
                })
                .collect();
            output::print_list(&rows, format);
        }
    }
}

/// A failed sync is reported but does not fail the command.
fn report_sync(
    verb: &str,
    student: &StudentId,
    course: &CourseId,
    status: &SyncStatus,
    format: OutputFormat,
) {
    if format == OutputFormat::Json {
        output::print_json(status);
        return;
    }

    match status {
        SyncStatus::Synced => output::print_success(&format!(
            "{} '{}' access to course '{}'",
            verb, student, course
        )),
        SyncStatus::NotTracked => {
            output::print_warning("Course membership is not tracked by this deployment")
        }
        SyncStatus::Failed { step, reason } => {
            output::print_warning(&format!("Hub group sync failed at {}: {}", step, reason))
        }
    }
}
