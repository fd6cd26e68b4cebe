/// State management module
///
/// This module handles all application state, including:
/// - The collection document and its records (data.rs)
/// - Pure collection operations (collection.rs)
/// - Whole-document persistence (store.rs)
/// - The four screens and their transition table (screen.rs)

pub mod collection;
pub mod data;
pub mod screen;
pub mod store;
