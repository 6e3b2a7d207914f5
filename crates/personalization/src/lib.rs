//! Gift personalization — business rule tables and the constrained,
//! diversity-capped top-N selector.

pub mod rules;
pub mod selector;

pub use rules::{categories_for, price_window_for};
pub use selector::{SelectionCriteria, TopNSelector};
