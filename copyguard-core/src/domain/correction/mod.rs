// Réparations déterministes : troncature, puces, unités, balisage, CTA.

pub mod bullets;
pub mod corrector;
pub mod truncate;

pub use corrector::{AppliedFix, Correction, Corrector, FixStep};
