pub const CREATE_ADMINISTRATORS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS administrators (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT 'admin'
)
";

pub const CREATE_ADMIN_LOGINS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS admin_logins (
    token TEXT PRIMARY KEY NOT NULL,
    admin_id INTEGER NOT NULL REFERENCES administrators(id) ON DELETE CASCADE,
    login_time TIMESTAMP NOT NULL
)
";

pub const CREATE_STAFF_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS staff (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    staff_id INTEGER NOT NULL UNIQUE,
    name TEXT NOT NULL,
    designation TEXT NOT NULL,
    dob DATE NOT NULL,
    join_date DATE,
    leave_date DATE,
    guardian_name TEXT NOT NULL DEFAULT '',
    address TEXT NOT NULL DEFAULT '',
    work_duration TEXT NOT NULL,
    gender TEXT NOT NULL,
    qualification TEXT NOT NULL,
    photo_public_id TEXT,
    photo_url TEXT
)
";

pub const CREATE_STAFF_DOB_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_staff_verify ON staff(staff_id, dob)
";

pub const CREATE_STUDENTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS students (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    roll_no TEXT NOT NULL UNIQUE,
    full_name TEXT NOT NULL,
    gender TEXT NOT NULL,
    guardian_name TEXT NOT NULL,
    phone_number TEXT NOT NULL,
    dob DATE NOT NULL,
    joining_date DATE NOT NULL,
    farewell_date DATE,
    course TEXT NOT NULL,
    course_duration TEXT NOT NULL,
    address TEXT NOT NULL,
    certificate BOOLEAN NOT NULL DEFAULT 0,
    photo_public_id TEXT,
    photo_url TEXT
)
";

pub const CREATE_ACHIEVEMENTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS achievements (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    student_name TEXT NOT NULL,
    date DATE NOT NULL,
    photo_public_id TEXT NOT NULL,
    photo_url TEXT NOT NULL,
    created_at TIMESTAMP NOT NULL
)
";

pub const CREATE_ACHIEVEMENTS_DATE_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_achievements_date ON achievements(date DESC)
";

pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_ADMINISTRATORS_TABLE,
    CREATE_ADMIN_LOGINS_TABLE,
    CREATE_STAFF_TABLE,
    CREATE_STAFF_DOB_INDEX,
    CREATE_STUDENTS_TABLE,
    CREATE_ACHIEVEMENTS_TABLE,
    CREATE_ACHIEVEMENTS_DATE_INDEX,
];
