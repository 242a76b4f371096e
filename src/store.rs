// Flat-file record store.
// Each collection lives in its own comma-delimited file with a header row.
// Every call opens the file, scans it front to back and closes it again;
// there is no cache and no locking, so concurrent writers race.

use crate::auth::hash_password;
use crate::models::{new_id, now, Course, Enrollment, Role, User};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_ADMIN_NAME: &str = "super admin";
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin";
pub const SYSTEM_CREATOR: &str = "system";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed data in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("unknown field '{field}' for {kind} records")]
    UnknownField { kind: RecordKind, field: String },

    #[error("{0}")]
    DuplicateKey(String),
}

/// The three collections kept by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    User,
    Course,
    Enrollment,
}

impl RecordKind {
    pub const ALL: [RecordKind; 3] = [RecordKind::User, RecordKind::Course, RecordKind::Enrollment];

    pub fn file_name(&self) -> &'static str {
        match self {
            RecordKind::User => "users.csv",
            RecordKind::Course => "courses.csv",
            RecordKind::Enrollment => "enrollments.csv",
        }
    }

    /// Header row, in column order.
    pub fn field_names(&self) -> &'static [&'static str] {
        match self {
            RecordKind::User => &[
                "id", "name", "username", "password", "role", "creator", "created_at", "updated_at",
            ],
            RecordKind::Course => &[
                "id", "name", "description", "creator", "created_at", "updated_at",
            ],
            RecordKind::Enrollment => &[
                "id", "user_id", "username", "course_id", "course_name", "creator", "created_at",
                "updated_at",
            ],
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecordKind::User => "user",
            RecordKind::Course => "course",
            RecordKind::Enrollment => "enrollment",
        })
    }
}

/// A row type stored in one of the collections.
pub trait Record: Serialize + DeserializeOwned {
    const KIND: RecordKind;

    fn id(&self) -> &str;

    /// Collection-specific uniqueness rules checked before an append.
    fn ensure_unique(&self, _db: &Database) -> Result<(), StoreError> {
        Ok(())
    }
}

impl Record for User {
    const KIND: RecordKind = RecordKind::User;

    fn id(&self) -> &str {
        &self.id
    }

    fn ensure_unique(&self, db: &Database) -> Result<(), StoreError> {
        if !db.is_field_unique(RecordKind::User, "username", &self.username)? {
            return Err(StoreError::DuplicateKey("username must be unique".into()));
        }
        Ok(())
    }
}

impl Record for Course {
    const KIND: RecordKind = RecordKind::Course;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Enrollment {
    const KIND: RecordKind = RecordKind::Enrollment;

    fn id(&self) -> &str {
        &self.id
    }

    fn ensure_unique(&self, db: &Database) -> Result<(), StoreError> {
        if !db.is_enrollment_unique(&self.user_id, &self.course_id)? {
            return Err(StoreError::DuplicateKey(
                "user is already enrolled to that course.".into(),
            ));
        }
        Ok(())
    }
}

/// Matches enrollments whose user id, username or course id equals any of
/// the set fields. An empty filter matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrollmentFilter {
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub course_id: Option<String>,
}

impl EnrollmentFilter {
    pub fn user_id(id: impl Into<String>) -> Self {
        Self {
            user_id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn username(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            ..Self::default()
        }
    }

    pub fn course_id(id: impl Into<String>) -> Self {
        Self {
            course_id: Some(id.into()),
            ..Self::default()
        }
    }

    fn matches(&self, enrollment: &Enrollment) -> bool {
        let eq = |want: &Option<String>, have: &str| want.as_deref() == Some(have);
        eq(&self.user_id, &enrollment.user_id)
            || eq(&self.username, &enrollment.username)
            || eq(&self.course_id, &enrollment.course_id)
    }
}

/// Handle on a data directory. Cheap to clone; holds paths only.
#[derive(Debug, Clone)]
pub struct Database {
    folder: PathBuf,
}

impl Database {
    /// Open the store at `folder`, creating the directory and any missing
    /// collection files. A freshly created users file gets the bootstrap
    /// administrator.
    pub fn open(folder: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let folder = folder.into();
        fs::create_dir_all(&folder).map_err(|source| StoreError::Io {
            path: folder.clone(),
            source,
        })?;
        let db = Database { folder };

        for kind in RecordKind::ALL {
            let path = db.path_for(kind);
            if path.exists() {
                continue;
            }
            db.create_with_header(kind)?;
            if kind == RecordKind::User {
                db.seed_admin()?;
            }
        }

        Ok(db)
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn path_for(&self, kind: RecordKind) -> PathBuf {
        self.folder.join(kind.file_name())
    }

    fn create_with_header(&self, kind: RecordKind) -> Result<(), StoreError> {
        let path = self.path_for(kind);
        let file = File::create(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        let mut writer = csv::Writer::from_writer(file);
        writer
            .write_record(kind.field_names())
            .map_err(|source| StoreError::Csv {
                path: path.clone(),
                source,
            })?;
        writer
            .flush()
            .map_err(|source| StoreError::Io { path: path.clone(), source })?;
        info!(path = %path.display(), "created {kind} collection");
        Ok(())
    }

    fn seed_admin(&self) -> Result<(), StoreError> {
        let now = now();
        let admin = User {
            id: new_id(),
            name: DEFAULT_ADMIN_NAME.into(),
            username: DEFAULT_ADMIN_USERNAME.into(),
            password: hash_password(DEFAULT_ADMIN_PASSWORD),
            role: Role::Admin,
            creator: SYSTEM_CREATOR.into(),
            created_at: now,
            updated_at: now,
        };
        self.write(&admin)
    }

    fn reader(&self, kind: RecordKind) -> Result<csv::Reader<File>, StoreError> {
        let path = self.path_for(kind);
        let file = File::open(&path).map_err(|source| StoreError::Io { path, source })?;
        Ok(csv::Reader::from_reader(file))
    }

    fn csv_err(&self, kind: RecordKind) -> impl Fn(csv::Error) -> StoreError + '_ {
        move |source| StoreError::Csv {
            path: self.path_for(kind),
            source,
        }
    }

    /// True when no row of `kind` has `field` equal to `value`.
    pub fn is_field_unique(
        &self,
        kind: RecordKind,
        field: &str,
        value: &str,
    ) -> Result<bool, StoreError> {
        let unknown = || StoreError::UnknownField {
            kind,
            field: field.to_string(),
        };
        if !kind.field_names().iter().any(|name| *name == field) {
            return Err(unknown());
        }

        let mut reader = self.reader(kind)?;
        let headers = reader.headers().map_err(self.csv_err(kind))?;
        if headers.is_empty() {
            return Ok(true);
        }
        let column = headers
            .iter()
            .position(|name| name == field)
            .ok_or_else(unknown)?;

        for row in reader.records() {
            let row = row.map_err(self.csv_err(kind))?;
            if row.get(column) == Some(value) {
                debug!(%kind, field, "value already present");
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn is_enrollment_unique(&self, user_id: &str, course_id: &str) -> Result<bool, StoreError> {
        let found = self.read_one::<Enrollment>(|enrollment| {
            enrollment.user_id == user_id && enrollment.course_id == course_id
        })?;
        Ok(found.is_none())
    }

    pub fn read_all<T: Record>(&self) -> Result<Vec<T>, StoreError> {
        let mut reader = self.reader(T::KIND)?;
        let records = reader
            .deserialize()
            .collect::<Result<Vec<T>, _>>()
            .map_err(self.csv_err(T::KIND))?;
        debug!(kind = %T::KIND, count = records.len(), "read collection");
        Ok(records)
    }

    /// First record matching `predicate`; the scan stops at the match.
    pub fn read_one<T: Record>(
        &self,
        predicate: impl Fn(&T) -> bool,
    ) -> Result<Option<T>, StoreError> {
        let mut reader = self.reader(T::KIND)?;
        for row in reader.deserialize::<T>() {
            let record = row.map_err(self.csv_err(T::KIND))?;
            if predicate(&record) {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }

    /// Append `record` after checking id uniqueness and the collection's own
    /// uniqueness rules.
    pub fn write<T: Record>(&self, record: &T) -> Result<(), StoreError> {
        if !self.is_field_unique(T::KIND, "id", record.id())? {
            return Err(StoreError::DuplicateKey(format!(
                "{} id must be unique",
                T::KIND
            )));
        }
        record.ensure_unique(self)?;

        let path = self.path_for(T::KIND);
        let io_err = |source| StoreError::Io {
            path: path.clone(),
            source,
        };
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(io_err)?;
        let empty = file.metadata().map_err(io_err)?.len() == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if empty {
            writer
                .write_record(T::KIND.field_names())
                .map_err(self.csv_err(T::KIND))?;
        }
        writer.serialize(record).map_err(self.csv_err(T::KIND))?;
        writer.flush().map_err(io_err)?;

        info!(kind = %T::KIND, id = record.id(), "record written");
        Ok(())
    }

    /// User whose id or username equals `key`.
    pub fn read_user(&self, key: &str) -> Result<Option<User>, StoreError> {
        if key.is_empty() {
            return Ok(None);
        }
        self.read_one(|user: &User| user.id == key || user.username == key)
    }

    pub fn read_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        self.read_one(|user: &User| user.username == username)
    }

    pub fn read_course(&self, id: &str) -> Result<Option<Course>, StoreError> {
        self.read_one(|course: &Course| course.id == id)
    }

    pub fn read_enrollment(&self, id: &str) -> Result<Option<Enrollment>, StoreError> {
        self.read_one(|enrollment: &Enrollment| enrollment.id == id)
    }

    pub fn query_enrollments(&self, filter: &EnrollmentFilter) -> Result<Vec<Enrollment>, StoreError> {
        let mut reader = self.reader(RecordKind::Enrollment)?;
        let mut matched = Vec::new();
        for row in reader.deserialize::<Enrollment>() {
            let enrollment = row.map_err(self.csv_err(RecordKind::Enrollment))?;
            if filter.matches(&enrollment) {
                matched.push(enrollment);
            }
        }
        Ok(matched)
    }
}
