//! EduGen - preschool lesson plan generator.
//!
//! Turns a short form into a structured lesson plan through Gemini, lets the
//! teacher refine it with free-text feedback, and exports it as Word, PDF or
//! slides.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
