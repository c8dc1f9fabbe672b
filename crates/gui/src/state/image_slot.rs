use shared::{DecodeStatus, ResourceId};

use crate::normalize::{ImageResource, ResourceStore};

/// Notified synchronously whenever the current image changes.
pub trait ImageObserver {
    fn image_changed(&mut self, resource: &ImageResource, store: &ResourceStore);
}

/// Holds the current image resource. Replacing it releases the old one.
#[derive(Debug, Default)]
pub struct ImageSlot {
    current: Option<ImageResource>,
}

impl ImageSlot {
    pub fn current(&self) -> Option<&ImageResource> {
        self.current.as_ref()
    }

    pub fn replace(
        &mut self,
        resource: ImageResource,
        store: &mut ResourceStore,
        observer: &mut dyn ImageObserver,
    ) {
        if let Some(old) = self.current.take() {
            if old.id != resource.id {
                store.release(old.id);
            }
        }
        let current = self.current.insert(resource);
        observer.image_changed(current, store);
    }

    /// Update the decode status of `id` if it is still current.
    pub fn set_status(&mut self, id: ResourceId, status: DecodeStatus) -> bool {
        match self.current.as_mut() {
            Some(current) if current.id == id => {
                current.status = status;
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self, store: &mut ResourceStore) {
        if let Some(old) = self.current.take() {
            store.release(old.id);
        }
    }
}
