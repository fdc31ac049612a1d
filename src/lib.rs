//! Dubbing preparation pipeline: audio extraction, transcription, word
//! alignment, transcript normalization, entity-protected translation, and
//! prosody markup synthesis.

pub mod audio;
pub mod cli;
pub mod config;
pub mod error;
pub mod glossary;
pub mod media;
pub mod normalize;
pub mod prosody;
pub mod segment;
pub mod subtitle;
pub mod transcribe;
pub mod translate;
pub mod workflow;
