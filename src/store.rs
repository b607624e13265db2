//! Observable store for a listing's ordered photo collection.

use crate::models::Photo;
use std::sync::Mutex;
use tokio::sync::watch;

/// Single source of truth for the ordered photo collection and its capacity
/// ceiling. Performs no I/O. All mutations go through [`add_photo`],
/// [`update_photo`] and [`remove_photo`]; every mutation bumps the revision
/// observed through [`subscribe`].
///
/// The store never reorders or renumbers entries on its own — insertion
/// order is display order, and `sort_order`/`is_primary` are the caller's
/// responsibility. [`apply_order`] exists for caller-directed reordering.
///
/// [`add_photo`]: PhotoStore::add_photo
/// [`update_photo`]: PhotoStore::update_photo
/// [`remove_photo`]: PhotoStore::remove_photo
/// [`apply_order`]: PhotoStore::apply_order
/// [`subscribe`]: PhotoStore::subscribe
#[derive(Debug)]
pub struct PhotoStore {
    photos: Mutex<Vec<Photo>>,
    max_photos: usize,
    revision: watch::Sender<u64>,
}

impl PhotoStore {
    /// Creates an empty store with a fixed capacity ceiling.
    pub fn new(max_photos: usize) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            photos: Mutex::new(Vec::new()),
            max_photos,
            revision,
        }
    }

    /// Appends a photo to the collection. The caller must have satisfied id
    /// uniqueness and `sort_order`/`is_primary` correctness already; the
    /// store does not recompute them.
    pub fn add_photo(&self, photo: Photo) {
        self.photos.lock().unwrap().push(photo);
        self.notify();
    }

    /// Applies `f` to the photo with the given id. Returns false, without
    /// notifying, when the id is absent.
    pub fn update_photo<F>(&self, id: &str, f: F) -> bool
    where
        F: FnOnce(&mut Photo),
    {
        let updated = {
            let mut photos = self.photos.lock().unwrap();
            match photos.iter_mut().find(|p| p.id() == id) {
                Some(photo) => {
                    f(photo);
                    true
                }
                None => false,
            }
        };
        if updated {
            self.notify();
        }
        updated
    }

    /// Removes the photo with the given id. Remaining entries keep their
    /// positions and sort orders.
    pub fn remove_photo(&self, id: &str) -> bool {
        let removed = {
            let mut photos = self.photos.lock().unwrap();
            match photos.iter().position(|p| p.id() == id) {
                Some(index) => {
                    photos.remove(index);
                    true
                }
                None => false,
            }
        };
        if removed {
            self.notify();
        }
        removed
    }

    /// Caller-directed reorder: rearranges the collection to match
    /// `ordered_ids` and rewrites each `sort_order` to its new index.
    /// Returns false, leaving the collection untouched, unless
    /// `ordered_ids` is a permutation of the current id set.
    pub fn apply_order(&self, ordered_ids: &[String]) -> bool {
        let applied = {
            let mut photos = self.photos.lock().unwrap();
            if ordered_ids.len() != photos.len() {
                return false;
            }
            let mut remaining = photos.clone();
            let mut reordered = Vec::with_capacity(remaining.len());
            for id in ordered_ids {
                match remaining.iter().position(|p| p.id() == id) {
                    Some(index) => reordered.push(remaining.swap_remove(index)),
                    None => return false,
                }
            }
            for (index, photo) in reordered.iter_mut().enumerate() {
                photo.sort_order = index as u32;
            }
            *photos = reordered;
            true
        };
        if applied {
            self.notify();
        }
        applied
    }

    /// Snapshot of the collection in display order.
    pub fn photos(&self) -> Vec<Photo> {
        self.photos.lock().unwrap().clone()
    }

    pub fn find(&self, id: &str) -> Option<Photo> {
        self.photos
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id() == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.photos.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.lock().unwrap().is_empty()
    }

    pub fn max_photos(&self) -> usize {
        self.max_photos
    }

    /// How many more photos the collection accepts.
    pub fn remaining_slots(&self) -> usize {
        self.max_photos.saturating_sub(self.len())
    }

    pub fn is_full(&self) -> bool {
        self.remaining_slots() == 0
    }

    pub fn primary_photo(&self) -> Option<Photo> {
        self.photos
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.is_primary)
            .cloned()
    }

    /// Change notifications: the watched value increases on every mutation.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn notify(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }
}
