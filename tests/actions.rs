use school_records::actions::{Account, ActionError, Admin};
use school_records::auth::verify_password;
use school_records::models::{Course, Enrollment, Role};
use school_records::store::{Database, StoreError, DEFAULT_ADMIN_USERNAME};
use std::collections::HashSet;
use tempfile::{tempdir, TempDir};

fn setup() -> (TempDir, Database, Admin) {
    let dir = tempdir().expect("tempdir");
    let db = Database::open(dir.path()).expect("open");
    let user = db
        .read_user(DEFAULT_ADMIN_USERNAME)
        .expect("read")
        .expect("seeded admin");
    let admin = match Account::from(user) {
        Account::Admin(admin) => admin,
        Account::Student(_) => panic!("seeded user must be an admin"),
    };
    (dir, db, admin)
}

#[test]
fn created_user_is_hashed_and_attributed() {
    let (_dir, db, admin) = setup();
    let user = admin
        .create_user(&db, "John Doe", "cytro", "test", "student")
        .expect("create");

    assert_eq!(user.role, Role::Student);
    assert_eq!(user.creator, "super admin");
    assert_ne!(user.password, "test");
    assert!(verify_password("test", &user.password));
    assert_eq!(db.read_user("cytro").expect("read"), Some(user));
}

#[test]
fn create_user_validates_role_and_fields() {
    let (_dir, db, admin) = setup();

    let err = admin
        .create_user(&db, "John", "john", "pw", "teacher")
        .expect_err("bad role");
    assert_eq!(err.to_string(), "Invalid role. Allowed roles: student, admin");

    let err = admin
        .create_user(&db, "John", "", "pw", "student")
        .expect_err("empty username");
    assert!(matches!(err, ActionError::EmptyField("Username")));

    let err = admin
        .create_user(&db, "Other", "admin", "pw", "admin")
        .expect_err("taken username");
    assert!(matches!(err, ActionError::Store(StoreError::DuplicateKey(_))));
}

#[test]
fn enrolling_twice_fails() {
    let (_dir, db, admin) = setup();
    admin
        .create_user(&db, "Ada", "ada", "pw", "student")
        .expect("student");
    let course = admin
        .create_course(&db, "Python II", "test def")
        .expect("course");

    let enrollment = admin
        .create_enrollment(&db, "ada", &course.id)
        .expect("first enrollment");
    assert_eq!(enrollment.course_name, "Python II");
    assert_eq!(enrollment.username, "ada");

    let err = admin
        .create_enrollment(&db, "ada", &course.id)
        .expect_err("second enrollment");
    assert_eq!(err.to_string(), "user is already enrolled to that course.");
    assert_eq!(admin.all_enrollments(&db).expect("list").len(), 1);
}

#[test]
fn enrollment_requires_a_student_and_a_course() {
    let (_dir, db, admin) = setup();
    let course = admin.create_course(&db, "Rust", "systems").expect("course");
    admin
        .create_user(&db, "Ada", "ada", "pw", "student")
        .expect("student");

    let err = admin
        .create_enrollment(&db, DEFAULT_ADMIN_USERNAME, &course.id)
        .expect_err("admins cannot enroll");
    assert!(matches!(err, ActionError::UnknownStudent));

    let err = admin
        .create_enrollment(&db, "nobody", &course.id)
        .expect_err("unknown user");
    assert!(matches!(err, ActionError::UnknownStudent));

    let err = admin
        .create_enrollment(&db, "ada", "missing-course")
        .expect_err("unknown course");
    assert!(matches!(err, ActionError::UnknownCourse));
}

#[test]
fn student_courses_match_their_enrollment_rows() {
    let (_dir, db, admin) = setup();
    let ada = admin
        .create_user(&db, "Ada", "ada", "pw", "student")
        .expect("ada");
    admin
        .create_user(&db, "Bob", "bob", "pw", "student")
        .expect("bob");
    let rust = admin.create_course(&db, "Rust", "systems").expect("rust");
    let go = admin.create_course(&db, "Go", "services").expect("go");
    let sql = admin.create_course(&db, "SQL", "queries").expect("sql");

    admin.create_enrollment(&db, "ada", &rust.id).expect("enroll");
    admin.create_enrollment(&db, "ada", &sql.id).expect("enroll");
    admin.create_enrollment(&db, "bob", &go.id).expect("enroll");

    let student = match Account::from(ada.clone()) {
        Account::Student(student) => student,
        Account::Admin(_) => panic!("ada is a student"),
    };
    let courses = student.enrolled_courses(&db).expect("courses");

    let expected: HashSet<String> = admin
        .enrollments_by_user_id(&db, &ada.id)
        .expect("rows")
        .into_iter()
        .map(|row: Enrollment| row.course_id)
        .collect();
    let listed: HashSet<String> = courses.iter().map(|course: &Course| course.id.clone()).collect();
    assert_eq!(listed, expected);
    assert_eq!(listed.len(), 2);

    let (found, by_admin) = admin.student_courses(&db, "ada").expect("lookup");
    assert_eq!(found.user().id, ada.id);
    assert_eq!(by_admin, courses);
    let (_, by_id) = admin.student_courses(&db, &ada.id).expect("lookup by id");
    assert_eq!(by_id, courses);
}

#[test]
fn course_students_lists_enrolled_users() {
    let (_dir, db, admin) = setup();
    admin
        .create_user(&db, "Ada", "ada", "pw", "student")
        .expect("ada");
    admin
        .create_user(&db, "Bob", "bob", "pw", "student")
        .expect("bob");
    let rust = admin.create_course(&db, "Rust", "systems").expect("rust");
    admin.create_enrollment(&db, "bob", &rust.id).expect("enroll");
    admin.create_enrollment(&db, "ada", &rust.id).expect("enroll");

    let (course, students) = admin.course_students(&db, &rust.id).expect("lookup");
    assert_eq!(course, rust);
    let names: Vec<&str> = students.iter().map(|user| user.username.as_str()).collect();
    assert_eq!(names, vec!["bob", "ada"]);

    assert_eq!(
        admin.enrollments_by_username(&db, "ada").expect("rows").len(),
        1
    );
    assert_eq!(
        admin.enrollments_by_course_id(&db, &rust.id).expect("rows").len(),
        2
    );
}

#[test]
fn lookups_report_missing_records() {
    let (_dir, db, admin) = setup();

    let err = admin
        .student_courses(&db, DEFAULT_ADMIN_USERNAME)
        .expect_err("admin is not a student");
    assert_eq!(err.to_string(), "Didn't find a student with that username or id.");

    let err = admin
        .course_students(&db, "missing")
        .expect_err("no course");
    assert_eq!(err.to_string(), "Didn't find a course with that id.");

    let err = admin.course_students(&db, "").expect_err("empty id");
    assert_eq!(err.to_string(), "Course id can not be empty.");
}
