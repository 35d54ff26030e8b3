pub mod application;
pub mod github;
pub mod personality;
pub mod profile;
pub mod resume;
pub mod schedule;
