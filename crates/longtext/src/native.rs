//! The shared accelerated module
//!
//! One [`NativeContext`] per orchestrator. The first caller that needs the
//! module triggers the load on the blocking pool; everyone arriving while it
//! runs waits on the same load. A failed load is remembered as "no module"
//! and never retried.

use longtext_core::{BackendError, NativeModule};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Builds a native module on demand
pub type NativeFactory =
    Arc<dyn Fn() -> Result<Arc<dyn NativeModule>, BackendError> + Send + Sync>;

/// Where the accelerated module comes from
#[derive(Clone)]
pub enum NativeLoader {
    /// The module compiled into this build (the `accel` feature)
    Builtin,
    /// Never load anything; every primitive runs on the pure path
    Disabled,
    /// Bring your own
    Custom(NativeFactory),
}

impl NativeLoader {
    pub fn custom<F>(factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn NativeModule>, BackendError> + Send + Sync + 'static,
    {
        NativeLoader::Custom(Arc::new(factory))
    }

    fn load(&self) -> Result<Arc<dyn NativeModule>, BackendError> {
        match self {
            NativeLoader::Builtin => builtin(),
            NativeLoader::Disabled => Err(BackendError::Unavailable("disabled".into())),
            NativeLoader::Custom(factory) => factory(),
        }
    }
}

impl std::fmt::Debug for NativeLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NativeLoader::Builtin => f.write_str("Builtin"),
            NativeLoader::Disabled => f.write_str("Disabled"),
            NativeLoader::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[cfg(feature = "accel")]
fn builtin() -> Result<Arc<dyn NativeModule>, BackendError> {
    Ok(Arc::new(longtext_accel::AccelModule::load()?))
}

#[cfg(not(feature = "accel"))]
fn builtin() -> Result<Arc<dyn NativeModule>, BackendError> {
    Err(BackendError::Unavailable(
        "built without the accel feature".into(),
    ))
}

/// Lazily loaded, process-lifetime handle to the native module
pub struct NativeContext {
    loader: NativeLoader,
    module: OnceCell<Option<Arc<dyn NativeModule>>>,
}

impl NativeContext {
    pub fn new(loader: NativeLoader) -> Self {
        Self {
            loader,
            module: OnceCell::new(),
        }
    }

    /// The module, loading it first if nobody has yet
    pub async fn get(&self) -> Option<Arc<dyn NativeModule>> {
        self.module
            .get_or_init(|| async {
                if matches!(self.loader, NativeLoader::Disabled) {
                    log::debug!("Native module disabled, using pure implementation");
                    return None;
                }

                let loader = self.loader.clone();
                match tokio::task::spawn_blocking(move || loader.load()).await {
                    Ok(Ok(module)) => {
                        log::info!("Loaded native module '{}'", module.name());
                        Some(module)
                    }
                    Ok(Err(e)) => {
                        log::warn!("Native module unavailable, using pure implementation: {e}");
                        None
                    }
                    Err(e) => {
                        log::warn!("Native module loader crashed: {e}");
                        None
                    }
                }
            })
            .await
            .clone()
    }

    /// The module if the load already finished, without triggering one
    pub fn loaded(&self) -> Option<Arc<dyn NativeModule>> {
        self.module.get().cloned().flatten()
    }

    /// Whether a load has run (successfully or not)
    pub fn is_resolved(&self) -> bool {
        self.module.initialized()
    }
}
