//! HTML front end: Askama page templates and their handlers

pub mod handlers;
