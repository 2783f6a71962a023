//! Predefined message bundles.
//!
//! Bundles shipped in the packaged namespace under `messages/` are loaded in
//! bulk during setup. Only when that bulk pass finds nothing are the files
//! located for the kind registered one by one, so bundles are never loaded
//! twice.

use std::sync::Arc;
use tracing::{error, info};

use super::ResourceKind;
use crate::domains::backends::{BackendError, MessageStore, parse_properties};
use crate::domains::kinds::descriptor::{IdentifierPolicy, ResourceKindDescriptor};
use crate::domains::location::{LocationResolver, ResourceHandle};

/// Folder of the packaged namespace holding bundled messages.
pub const MESSAGE_DIR_NAME: &str = "messages";

/// Predefined message bundles (`.properties`).
pub struct MessageBundleKind {
    store: Arc<dyn MessageStore>,
    bundled_loaded: bool,
}

impl MessageBundleKind {
    /// Kind descriptor.
    pub const DESCRIPTOR: ResourceKindDescriptor = ResourceKindDescriptor::new(
        "msgFileLib",
        "Predefined Messages",
        "/config/msgFileLib/**/*.properties",
    )
    .with_identifier_policy(IdentifierPolicy::StripLastExtension);

    /// Create the kind, registering into `store`.
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self {
            store,
            bundled_loaded: false,
        }
    }

    fn load(&self, name: &str, handle: &ResourceHandle) -> Result<(), BackendError> {
        let text = handle.read_to_string()?;
        self.store.register_bundle(name, parse_properties(&text)?);
        Ok(())
    }
}

impl ResourceKind for MessageBundleKind {
    fn descriptor(&self) -> &ResourceKindDescriptor {
        &Self::DESCRIPTOR
    }

    fn prepare(&mut self, resolver: &LocationResolver) -> Result<(), BackendError> {
        let pattern = format!("/{MESSAGE_DIR_NAME}/**/*.properties");
        let bundles = match resolver.namespace().resolve(&pattern) {
            Ok(found) if !found.is_empty() => found.handles,
            _ => {
                info!("No {MESSAGE_DIR_NAME} folder; nothing to load");
                return Ok(());
            }
        };

        for handle in &bundles {
            let name = bundle_name(handle);
            // A broken bundle must not halt the loader.
            if let Err(e) = self.load(&name, handle) {
                error!("Error while loading message file {handle}: {e}");
            }
        }
        self.bundled_loaded = true;
        Ok(())
    }

    fn loaded_by_setup(&self) -> bool {
        self.bundled_loaded
    }

    fn register_backend(&self, identifier: &str, handle: &ResourceHandle) -> Result<(), BackendError> {
        self.load(identifier, handle)
    }

    fn unregister_backend(&self, _identifier: &str, _handle: &ResourceHandle) -> Result<(), BackendError> {
        Ok(())
    }

    fn teardown(&mut self) {
        self.store.clean();
        self.bundled_loaded = false;
    }
}

/// Bundle name of a packaged message file: its path below `messages/`
/// without the extension (`messages/en/errors.properties` -> `en/errors`).
fn bundle_name(handle: &ResourceHandle) -> String {
    let path = handle.logical_path();
    let needle = format!("/{MESSAGE_DIR_NAME}/");
    let below = match path.rfind(&needle) {
        Some(idx) => &path[idx + needle.len()..],
        None => path.rsplit('/').next().unwrap_or(&path),
    };
    match below.rfind('.') {
        Some(idx) if idx > below.rfind('/').map_or(0, |slash| slash + 1) => below[..idx].to_string(),
        _ => below.to_string(),
    }
}
