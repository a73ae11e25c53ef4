//! Ordered image records of the current gallery session.

use thiserror::Error;

/// Errors raised by gallery updates
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GalleryError {
    #[error("length mismatch: {images} images, {seeds} seeds, {tags} tags")]
    LengthMismatch {
        images: usize,
        seeds: usize,
        tags: usize,
    },

    #[error("image index {index} out of range (gallery holds {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

/// One generated image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryImage {
    pub data_uri: String,
    pub seed: String,
    pub tags: String,
    /// Strictly increasing within a session
    pub ordinal: u64,
}

/// Images of the current session, oldest first.
#[derive(Debug, Clone, Default)]
pub struct GalleryStore {
    images: Vec<GalleryImage>,
    next_ordinal: u64,
    session: u64,
}

impl GalleryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Incremented every time the gallery is cleared.
    pub fn session(&self) -> u64 {
        self.session
    }

    pub fn images(&self) -> &[GalleryImage] {
        &self.images
    }

    pub fn get(&self, index: usize) -> Result<&GalleryImage, GalleryError> {
        self.images.get(index).ok_or(GalleryError::IndexOutOfRange {
            index,
            len: self.images.len(),
        })
    }

    pub fn newest_index(&self) -> Option<usize> {
        self.images.len().checked_sub(1)
    }

    pub fn data_uris(&self) -> impl Iterator<Item = &str> {
        self.images.iter().map(|image| image.data_uri.as_str())
    }

    /// Drop every image and start a new session.
    pub fn clear(&mut self) {
        self.images.clear();
        self.session += 1;
        log::debug!("[gallery] cleared, session {}", self.session);
    }

    /// Append one image. `keep_gallery == false` clears the gallery first.
    /// Returns true if the gallery was cleared.
    pub fn append(
        &mut self,
        data_uri: impl Into<String>,
        seed: impl Into<String>,
        tags: impl Into<String>,
        keep_gallery: bool,
    ) -> bool {
        let cleared = !keep_gallery;
        if cleared {
            self.clear();
        }
        self.push(data_uri.into(), seed.into(), tags.into());
        cleared
    }

    fn push(&mut self, data_uri: String, seed: String, tags: String) {
        self.images.push(GalleryImage {
            data_uri,
            seed,
            tags,
            ordinal: self.next_ordinal,
        });
        self.next_ordinal += 1;
    }

    /// Replace the whole gallery. All three lists must have the same length;
    /// on mismatch nothing changes.
    pub fn replace_all(
        &mut self,
        images: Vec<String>,
        seeds: Vec<String>,
        tags: Vec<String>,
    ) -> Result<(), GalleryError> {
        if images.len() != seeds.len() || images.len() != tags.len() {
            return Err(GalleryError::LengthMismatch {
                images: images.len(),
                seeds: seeds.len(),
                tags: tags.len(),
            });
        }
        self.clear();
        for ((data_uri, seed), tags) in images.into_iter().zip(seeds).zip(tags) {
            self.push(data_uri, seed, tags);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_flag_clears_before_append() {
        let mut store = GalleryStore::new();
        store.append("a", "1", "x", true);
        store.append("b", "2", "y", true);
        assert!(store.append("c", "3", "z", false));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(0).unwrap().data_uri, "c");
    }

    #[test]
    fn test_keep_flag_preserves_order() {
        let mut store = GalleryStore::new();
        for (i, uri) in ["a", "b", "c"].iter().enumerate() {
            assert!(!store.append(*uri, i.to_string(), "", true));
        }
        let uris: Vec<_> = store.data_uris().collect();
        assert_eq!(uris, vec!["a", "b", "c"]);
        let ordinals: Vec<_> = store.images().iter().map(|i| i.ordinal).collect();
        assert!(ordinals.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(store.newest_index(), Some(2));
    }

    #[test]
    fn test_replace_all_rejects_mismatch() {
        let mut store = GalleryStore::new();
        store.append("a", "1", "x", true);
        let err = store
            .replace_all(
                vec!["b".into(), "c".into()],
                vec!["2".into()],
                vec!["".into(), "".into()],
            )
            .unwrap_err();
        assert_eq!(
            err,
            GalleryError::LengthMismatch {
                images: 2,
                seeds: 1,
                tags: 2
            }
        );
        assert_eq!(store.len(), 1);

        store
            .replace_all(vec!["b".into()], vec!["2".into()], vec!["t".into()])
            .unwrap();
        assert_eq!(store.get(0).unwrap().seed, "2");
        assert!(matches!(
            store.get(3),
            Err(GalleryError::IndexOutOfRange { index: 3, len: 1 })
        ));
    }
}
