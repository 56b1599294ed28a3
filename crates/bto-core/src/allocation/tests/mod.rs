mod common;
mod projects;
mod registration;
