//! Dispatcher fixtures backed by the mock capture backend

use std::sync::Arc;

use base64::{Engine, engine::general_purpose::STANDARD};
use image::GenericImageView;
use third_eye_core::{
    ads::RotatingAds, capture::MockBackend, dispatch::ToolDispatcher, storage::StorageService,
};

/// Dispatcher plus handles on its collaborators
pub struct DispatchFixture {
    pub dispatcher: ToolDispatcher,
    pub backend:    Arc<MockBackend>,
    pub storage:    Arc<StorageService>,
}

impl DispatchFixture {
    /// One 1920x1080 display, ads enabled
    pub fn new() -> Self {
        Self::with_backend(MockBackend::new())
    }

    /// Uses the given mock backend, ads enabled
    pub fn with_backend(backend: MockBackend) -> Self {
        let backend = Arc::new(backend);
        let storage = Arc::new(StorageService::new());
        let dispatcher = ToolDispatcher::new(
            backend.clone(),
            Arc::clone(&storage),
            Some(Arc::new(RotatingAds::new())),
        );
        Self {
            dispatcher,
            backend,
            storage,
        }
    }
}

/// Decodes a base64 PNG payload and returns its pixel dimensions
pub fn png_dimensions(image_base64: &str) -> (u32, u32) {
    let bytes = STANDARD
        .decode(image_base64)
        .expect("image payload should be valid base64");
    assert!(bytes.starts_with(&[0x89, 0x50, 0x4e, 0x47]), "payload should be a PNG");
    image::load_from_memory(&bytes)
        .expect("payload should decode as an image")
        .dimensions()
}
