// Role-scoped actions.
// An authenticated user is either an `Admin` or a `Student`; each wrapper
// exposes only what that role may do against the store.

use crate::auth::hash_password;
use crate::models::{new_id, now, Course, Enrollment, InvalidRole, Role, User};
use crate::store::{Database, EnrollmentFilter, StoreError};
use thiserror::Error;

/// Errors surfaced to the person at the terminal. None of these end the
/// session.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("{0} can not be empty.")]
    EmptyField(&'static str),

    #[error(transparent)]
    InvalidRole(#[from] InvalidRole),

    #[error("Invalid user_id. No student with that id was found in the database.")]
    UnknownStudent,

    #[error("Invalid course_id. No course with that id was found in the database.")]
    UnknownCourse,

    #[error("Didn't find a student with that username or id.")]
    StudentLookup,

    #[error("Didn't find a course with that id.")]
    CourseLookup,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Reject empty free-text input, naming the field in the message.
pub fn require<'a>(label: &'static str, value: &'a str) -> Result<&'a str, ActionError> {
    if value.is_empty() {
        return Err(ActionError::EmptyField(label));
    }
    Ok(value)
}

/// An authenticated user tagged with its role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Account {
    Admin(Admin),
    Student(Student),
}

impl From<User> for Account {
    fn from(user: User) -> Self {
        match user.role {
            Role::Admin => Account::Admin(Admin(user)),
            Role::Student => Account::Student(Student(user)),
        }
    }
}

impl Account {
    pub fn user(&self) -> &User {
        match self {
            Account::Admin(admin) => &admin.0,
            Account::Student(student) => &student.0,
        }
    }

    pub fn role(&self) -> Role {
        self.user().role
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admin(User);

impl Admin {
    pub fn user(&self) -> &User {
        &self.0
    }

    pub fn all_users(&self, db: &Database) -> Result<Vec<User>, ActionError> {
        Ok(db.read_all()?)
    }

    pub fn all_courses(&self, db: &Database) -> Result<Vec<Course>, ActionError> {
        Ok(db.read_all()?)
    }

    pub fn all_enrollments(&self, db: &Database) -> Result<Vec<Enrollment>, ActionError> {
        Ok(db.read_all()?)
    }

    pub fn enrollments_by_username(
        &self,
        db: &Database,
        username: &str,
    ) -> Result<Vec<Enrollment>, ActionError> {
        Ok(db.query_enrollments(&EnrollmentFilter::username(username))?)
    }

    pub fn enrollments_by_user_id(
        &self,
        db: &Database,
        user_id: &str,
    ) -> Result<Vec<Enrollment>, ActionError> {
        Ok(db.query_enrollments(&EnrollmentFilter::user_id(user_id))?)
    }

    pub fn enrollments_by_course_id(
        &self,
        db: &Database,
        course_id: &str,
    ) -> Result<Vec<Enrollment>, ActionError> {
        Ok(db.query_enrollments(&EnrollmentFilter::course_id(course_id))?)
    }

    /// Create a user with the given role name ("student" or "admin"). The
    /// password is stored hashed.
    pub fn create_user(
        &self,
        db: &Database,
        name: &str,
        username: &str,
        password: &str,
        role: &str,
    ) -> Result<User, ActionError> {
        let role: Role = role.parse()?;
        let username = require("Username", username)?;
        let name = require("Full name", name)?;
        let password = require("Password", password)?;

        let now = now();
        let user = User {
            id: new_id(),
            name: name.to_string(),
            username: username.to_string(),
            password: hash_password(password),
            role,
            creator: self.0.name.clone(),
            created_at: now,
            updated_at: now,
        };
        db.write(&user)?;
        Ok(user)
    }

    pub fn create_course(
        &self,
        db: &Database,
        name: &str,
        description: &str,
    ) -> Result<Course, ActionError> {
        let name = require("Course name", name)?;
        let description = require("Course description", description)?;

        let now = now();
        let course = Course {
            id: new_id(),
            name: name.to_string(),
            description: description.to_string(),
            creator: self.0.name.clone(),
            created_at: now,
            updated_at: now,
        };
        db.write(&course)?;
        Ok(course)
    }

    /// Enroll the student named by `username` in the course `course_id`.
    pub fn create_enrollment(
        &self,
        db: &Database,
        username: &str,
        course_id: &str,
    ) -> Result<Enrollment, ActionError> {
        let username = require("Username", username)?;
        let course_id = require("Course id", course_id)?;

        let student = match db.read_user_by_username(username)? {
            Some(user) if user.role == Role::Student => user,
            _ => return Err(ActionError::UnknownStudent),
        };
        let course = db.read_course(course_id)?.ok_or(ActionError::UnknownCourse)?;

        let now = now();
        let enrollment = Enrollment {
            id: new_id(),
            user_id: student.id,
            username: student.username,
            course_id: course.id,
            course_name: course.name,
            creator: self.0.name.clone(),
            created_at: now,
            updated_at: now,
        };
        db.write(&enrollment)?;
        Ok(enrollment)
    }

    /// Courses of the student whose id or username is `key`.
    pub fn student_courses(
        &self,
        db: &Database,
        key: &str,
    ) -> Result<(Student, Vec<Course>), ActionError> {
        let key = require("Username or id", key)?;
        let student = match db.read_user(key)?.map(Account::from) {
            Some(Account::Student(student)) => student,
            _ => return Err(ActionError::StudentLookup),
        };
        let courses = student.enrolled_courses(db)?;
        Ok((student, courses))
    }

    /// Users enrolled in the course `course_id`, in enrollment order.
    pub fn course_students(
        &self,
        db: &Database,
        course_id: &str,
    ) -> Result<(Course, Vec<User>), ActionError> {
        let course_id = require("Course id", course_id)?;
        let course = db.read_course(course_id)?.ok_or(ActionError::CourseLookup)?;

        let mut students = Vec::new();
        for enrollment in self.enrollments_by_course_id(db, &course.id)? {
            if let Some(user) = db.read_user(&enrollment.user_id)? {
                students.push(user);
            }
        }
        Ok((course, students))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student(User);

impl Student {
    pub fn user(&self) -> &User {
        &self.0
    }

    /// Courses referenced by this student's enrollments. Enrollments whose
    /// course no longer exists are skipped.
    pub fn enrolled_courses(&self, db: &Database) -> Result<Vec<Course>, ActionError> {
        let mut courses = Vec::new();
        for enrollment in db.query_enrollments(&EnrollmentFilter::user_id(&self.0.id))? {
            if let Some(course) = db.read_course(&enrollment.course_id)? {
                courses.push(course);
            }
        }
        Ok(courses)
    }
}
