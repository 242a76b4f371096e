// UI layer: interactive menus built on `dialoguer`.
// Each action clears the screen, prompts for its fields and prints either a
// table or a one-line outcome. Errors from an action are printed and the
// menu comes back; only a failed login or quitting ends the session.

use crate::actions::{Account, ActionError, Admin, Student};
use crate::auth::{self, CredentialPrompt};
use crate::models::Role;
use crate::store::{Database, StoreError};
use crate::table::print_table;
use anyhow::Result;
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType};
use dialoguer::{Input, Password, Select};
use std::io;

const BANNER: &str = r"
  ____       _                 _   ____                        _
 / ___|  ___| |__   ___   ___ | | |  _ \ ___  ___ ___  _ __ __| |___
 \___ \ / __| '_ \ / _ \ / _ \| | | |_) / _ \/ __/ _ \| '__/ _` / __|
  ___) | (__| | | | (_) | (_) | | |  _ <  __/ (_| (_) | | | (_| \__ \
 |____/ \___|_| |_|\___/ \___/|_| |_| \_\___|\___\___/|_|  \__,_|___/
";

/// Clear the terminal and redraw the banner.
pub fn reset_screen() -> io::Result<()> {
    execute!(io::stdout(), Clear(ClearType::All), MoveTo(0, 0))?;
    println!("{BANNER}");
    Ok(())
}

fn ask(prompt: &str) -> io::Result<String> {
    let value: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;
    Ok(value.trim().to_string())
}

fn ask_secret(prompt: &str) -> io::Result<String> {
    Password::new()
        .with_prompt(prompt)
        .allow_empty_password(true)
        .interact()
}

/// Reads credentials from the terminal, hiding the password.
struct TerminalPrompt;

impl CredentialPrompt for TerminalPrompt {
    fn username(&mut self) -> io::Result<String> {
        ask("Enter your username")
    }

    fn password(&mut self) -> io::Result<String> {
        ask_secret("Enter your password")
    }

    fn reject(&mut self, message: &str) {
        println!("{message}");
    }
}

/// Log in and hand the session to the menu for the user's role. Returns
/// when the user quits or interrupts a prompt; fails when the login
/// attempts run out.
pub fn run(db: &Database) -> Result<()> {
    match session(db) {
        Err(err) if is_interrupt(&err) => {
            println!("\nGoodbye.");
            Ok(())
        }
        outcome => outcome,
    }
}

fn session(db: &Database) -> Result<()> {
    reset_screen()?;
    let account = auth::login(db, &mut TerminalPrompt)?;
    match account {
        Account::Admin(admin) => admin_menu(db, &admin),
        Account::Student(student) => student_menu(db, &student),
    }
}

/// True when any cause in the chain is an interrupted read (Ctrl-C).
fn is_interrupt(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<io::Error>()
            .map_or(false, |io_err| io_err.kind() == io::ErrorKind::Interrupted)
    })
}

enum Flow {
    Continue,
    Quit,
}

/// Message shown for a failed action, or `None` when the failure was an
/// interrupted prompt and the session should end.
fn describe(err: &anyhow::Error) -> Option<String> {
    if is_interrupt(err) {
        return None;
    }
    let message = match err.downcast_ref::<ActionError>() {
        Some(ActionError::Store(StoreError::DuplicateKey(message))) => format!("\n{message}"),
        Some(ActionError::Store(store_err)) => format!("\nAn unknown error occurred {store_err}."),
        Some(action_err) => format!("\n{action_err}"),
        None => format!("\nAn unknown error occurred {err}."),
    };
    Some(message)
}

/// Print an action failure without ending the session. An interrupted
/// prompt ends it instead.
fn report(err: anyhow::Error) -> Flow {
    match describe(&err) {
        Some(message) => {
            println!("{message}");
            Flow::Continue
        }
        None => Flow::Quit,
    }
}

fn select(prompt: &str, items: &[&str]) -> Result<usize> {
    Ok(Select::new()
        .with_prompt(prompt)
        .items(items)
        .default(0)
        .interact()?)
}

fn admin_menu(db: &Database, admin: &Admin) -> Result<()> {
    let items = [
        "Create student",
        "Create admin",
        "Create course",
        "Enroll student in course",
        "View all users",
        "View all courses",
        "View all enrollments",
        "View a student's courses",
        "View a course's students",
        "Quit",
    ];
    println!("Welcome {}!", admin.user().name);
    loop {
        let selection = select("Admin menu", &items)?;
        if selection == items.len() - 1 {
            println!("Goodbye.");
            return Ok(());
        }
        reset_screen()?;
        let outcome = match selection {
            0 => create_user(db, admin, Role::Student),
            1 => create_user(db, admin, Role::Admin),
            2 => create_course(db, admin),
            3 => enroll_student(db, admin),
            4 => admin
                .all_users(db)
                .map(|users| print_table("User", &users))
                .map_err(Into::into),
            5 => admin
                .all_courses(db)
                .map(|courses| print_table("Course", &courses))
                .map_err(Into::into),
            6 => admin
                .all_enrollments(db)
                .map(|enrollments| print_table("Enrollment", &enrollments))
                .map_err(Into::into),
            7 => view_student_courses(db, admin),
            8 => view_course_students(db, admin),
            _ => Ok(()),
        };
        if let Err(err) = outcome {
            if let Flow::Quit = report(err) {
                return Ok(());
            }
        }
    }
}

fn student_menu(db: &Database, student: &Student) -> Result<()> {
    let items = ["View my courses", "Quit"];
    println!("Welcome {}!", student.user().name);
    loop {
        let selection = select("Student menu", &items)?;
        if selection == items.len() - 1 {
            println!("Goodbye.");
            return Ok(());
        }
        reset_screen()?;
        let outcome = student
            .enrolled_courses(db)
            .map(|courses| print_table("My Course", &courses))
            .map_err(Into::into);
        if let Err(err) = outcome {
            if let Flow::Quit = report(err) {
                return Ok(());
            }
        }
    }
}

fn create_user(db: &Database, admin: &Admin, role: Role) -> Result<()> {
    let username = ask(&format!("Enter {role}'s username"))?;
    let name = ask(&format!("Enter {role}'s full name"))?;
    let password = ask_secret(&format!("Enter {role}'s password"))?;

    let user = admin.create_user(db, &name, &username, &password, role.as_str())?;
    let label = match role {
        Role::Admin => "Admin",
        Role::Student => "Student",
    };
    println!("\n{label} Created Successfully {user}.");
    Ok(())
}

fn create_course(db: &Database, admin: &Admin) -> Result<()> {
    let name = ask("Enter the course name")?;
    let description = ask("Enter the course description")?;

    let course = admin.create_course(db, &name, &description)?;
    println!("\nCourse Created Successfully {course}.");
    Ok(())
}

fn enroll_student(db: &Database, admin: &Admin) -> Result<()> {
    let username = ask("Enter username of user to enroll")?;
    let course_id = ask("Enter course id of course to enroll to")?;

    let enrollment = admin.create_enrollment(db, &username, &course_id)?;
    println!("\nEnrollment Created Successfully {enrollment}.");
    Ok(())
}

fn view_student_courses(db: &Database, admin: &Admin) -> Result<()> {
    let key = ask("Enter username or id")?;
    let (student, courses) = admin.student_courses(db, &key)?;
    print_table(&format!("{}'s Course", student.user().name), &courses);
    Ok(())
}

fn view_course_students(db: &Database, admin: &Admin) -> Result<()> {
    let course_id = ask("Enter course id")?;
    let (course, students) = admin.course_students(db, &course_id)?;
    print_table(&format!("{}'s Student", course.name), &students);
    Ok(())
}
