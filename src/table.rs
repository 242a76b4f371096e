// Plain-text report tables.

use crate::models::{format_timestamp, Course, Enrollment, User};

/// A record that can be shown as one table row.
pub trait TableRow {
    const COLUMNS: &'static [&'static str];

    fn cells(&self) -> Vec<String>;
}

impl TableRow for User {
    const COLUMNS: &'static [&'static str] =
        &["id", "username", "name", "role", "creator", "created_at"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.username.clone(),
            self.name.clone(),
            self.role.to_string(),
            self.creator.clone(),
            format_timestamp(&self.created_at),
        ]
    }
}

impl TableRow for Course {
    const COLUMNS: &'static [&'static str] = &["id", "name", "description", "creator", "created_at"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.description.clone(),
            self.creator.clone(),
            format_timestamp(&self.created_at),
        ]
    }
}

impl TableRow for Enrollment {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "user_id",
        "username",
        "course_id",
        "course_name",
        "creator",
        "created_at",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.user_id.clone(),
            self.username.clone(),
            self.course_id.clone(),
            self.course_name.clone(),
            self.creator.clone(),
            format_timestamp(&self.created_at),
        ]
    }
}

/// `created_at` -> `Created_At`
fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = true;
    for ch in name.chars() {
        if upper {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        upper = !ch.is_alphanumeric();
    }
    out
}

/// Render `rows` under a "<entity> Information Table" heading, numbered
/// from 1 in an `S/N` column.
pub fn render_table<T: TableRow>(entity: &str, rows: &[T]) -> String {
    let mut header = vec!["S/N".to_string()];
    header.extend(T::COLUMNS.iter().map(|name| title_case(name)));

    let body: Vec<Vec<String>> = rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let mut cells = vec![(index + 1).to_string()];
            cells.extend(row.cells());
            cells
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|cell| cell.chars().count()).collect();
    for cells in &body {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let border = widths
        .iter()
        .map(|width| "-".repeat(width + 2))
        .collect::<Vec<_>>()
        .join("+");
    let border = format!("+{border}+");
    let line = |cells: &[String]| {
        let padded = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!(" {:<width$} ", cell, width = width))
            .collect::<Vec<_>>()
            .join("|");
        format!("|{padded}|")
    };

    let title = format!("{entity} Information Table");
    let mut out = String::new();
    out.push('\n');
    out.push_str(&title);
    out.push('\n');
    out.push_str(&"=".repeat(title.chars().count()));
    out.push('\n');
    out.push_str(&border);
    out.push('\n');
    out.push_str(&line(&header));
    out.push('\n');
    out.push_str(&border);
    out.push('\n');
    for cells in &body {
        out.push_str(&line(cells));
        out.push('\n');
    }
    if !body.is_empty() {
        out.push_str(&border);
        out.push('\n');
    }
    out
}

pub fn print_table<T: TableRow>(entity: &str, rows: &[T]) {
    print!("{}", render_table(entity, rows));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::now;

    #[test]
    fn title_case_matches_headers() {
        assert_eq!(title_case("created_at"), "Created_At");
        assert_eq!(title_case("name"), "Name");
    }

    #[test]
    fn rows_are_numbered_and_aligned() {
        let now = now();
        let courses = vec![
            Course {
                id: "c1".into(),
                name: "Rust".into(),
                description: "systems".into(),
                creator: "super admin".into(),
                created_at: now,
                updated_at: now,
            },
            Course {
                id: "c2".into(),
                name: "Python II".into(),
                description: "scripting".into(),
                creator: "super admin".into(),
                created_at: now,
                updated_at: now,
            },
        ];

        let out = render_table("Course", &courses);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[1], "Course Information Table");
        assert_eq!(lines[2], "=".repeat("Course Information Table".len()));
        assert!(lines[4].starts_with("| S/N | Id "));
        assert!(lines[4].contains("| Created_At "));
        assert!(lines[6].starts_with("| 1   | c1 | Rust      |"));
        assert!(lines[7].starts_with("| 2   | c2 | Python II |"));
        let stamp = format_timestamp(&now);
        assert!(lines[6].contains(&format!("| {stamp} |")));
        assert!(stamp.contains('T'));
        let widths: Vec<usize> = lines[3..].iter().map(|line| line.len()).collect();
        assert!(widths.windows(2).all(|pair| pair[0] == pair[1]));
    }
}
