pub mod achievements;
pub mod admin_logins;
pub mod administrators;
pub mod staff;
pub mod students;
