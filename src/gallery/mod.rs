//! Image gallery: records, split/grid presentation and the fullscreen viewer.

mod fullscreen;
mod store;
mod view;

pub use fullscreen::{FullscreenAction, FullscreenViewer};
pub use store::{GalleryError, GalleryImage, GalleryStore};
pub use view::{CellBatch, GalleryCell, GalleryMode, GalleryView, GridLayout};

use crate::constants::{RANDOM_SEED, SEED_MAX, SEED_MIN};

/// Seed to write into the seed input when the seed of an image is applied.
///
/// Applying the seed already in the input toggles back to random.
pub fn seed_to_apply(seed: &str, current: Option<i64>) -> i64 {
    match seed.trim().parse::<i64>() {
        Ok(seed) if (SEED_MIN..=SEED_MAX).contains(&seed) && Some(seed) != current => seed,
        _ => RANDOM_SEED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_to_apply() {
        assert_eq!(seed_to_apply("42", Some(-1)), 42);
        assert_eq!(seed_to_apply(" 42 ", None), 42);
        assert_eq!(seed_to_apply("42", Some(42)), -1);
        assert_eq!(seed_to_apply("4294967296", None), -1);
        assert_eq!(seed_to_apply("abc", Some(7)), -1);
        assert_eq!(seed_to_apply("4294967295", None), 4_294_967_295);
    }
}
