//! Lifecycle wrapper around a boxed [`SequenceSource`].

use tracing::{debug, info, warn};
use volplay_core::{Result, SequenceHandle, VolplayError};

use crate::source::{BufferingConfig, OpenRequest, SequenceSource, SourceDescriptor, SourceSettings};

/// Owns the source and at most one open handle.
///
/// Configuration and speed set before `open` are kept and applied once the
/// handle exists. Afterwards they are forwarded only when the value actually
/// changes, so repeated calls with the same value are free.
pub struct SourceBinding {
    source: Box<dyn SequenceSource>,
    handle: Option<SequenceHandle>,
    descriptor: Option<SourceDescriptor>,
    config: BufferingConfig,
    applied_settings: Option<SourceSettings>,
    speed: f32,
    applied_speed: Option<f32>,
}

impl SourceBinding {
    pub fn new(source: Box<dyn SequenceSource>) -> Self {
        Self {
            source,
            handle: None,
            descriptor: None,
            config: BufferingConfig::default(),
            applied_settings: None,
            speed: 1.0,
            applied_speed: None,
        }
    }

    /// Open a sequence, closing any previously open one first.
    pub fn open(&mut self, request: &OpenRequest) -> Result<SequenceHandle> {
        request.source.validate()?;
        self.close();

        let handle = self.source.open(request).map_err(|err| {
            warn!("Failed to open {}: {}", request.source.location, err);
            err
        })?;
        info!("Opened {} as {}", request.source.location, handle);

        self.handle = Some(handle);
        self.descriptor = Some(request.source.clone());
        self.applied_settings = None;
        self.applied_speed = None;
        self.apply_config()?;
        self.apply_speed()?;
        Ok(handle)
    }

    /// Release the open sequence. Safe to call repeatedly.
    pub fn close(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.source.close(handle);
            info!("Closed {}", handle);
        }
        self.descriptor = None;
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// The open handle, or [`VolplayError::NotInitialized`].
    pub fn handle(&self) -> Result<SequenceHandle> {
        self.handle.ok_or(VolplayError::NotInitialized)
    }

    pub fn descriptor(&self) -> Option<&SourceDescriptor> {
        self.descriptor.as_ref()
    }

    pub fn config(&self) -> &BufferingConfig {
        &self.config
    }

    /// Store buffering knobs; forwarded now if open, otherwise on open.
    pub fn configure(&mut self, config: BufferingConfig) -> Result<()> {
        self.config = config;
        if self.handle.is_none() {
            debug!("Buffering configuration deferred until open");
            return Ok(());
        }
        self.apply_config()
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Store the effective playback rate; forwarded now if open.
    pub fn set_speed(&mut self, ratio: f32) -> Result<()> {
        if !ratio.is_finite() {
            return Err(VolplayError::InvalidParameter(format!(
                "speed ratio must be finite, got {}",
                ratio
            )));
        }
        self.speed = ratio;
        self.apply_speed()
    }

    pub fn source(&self) -> &dyn SequenceSource {
        self.source.as_ref()
    }

    pub fn source_mut(&mut self) -> &mut dyn SequenceSource {
        self.source.as_mut()
    }

    fn apply_config(&mut self) -> Result<()> {
        let (Some(handle), Some(descriptor)) = (self.handle, self.descriptor.as_ref()) else {
            return Ok(());
        };
        let settings = SourceSettings::for_source(&self.config, descriptor);
        if self.applied_settings == Some(settings) {
            return Ok(());
        }
        self.source.configure(handle, &settings)?;
        debug!(
            "Configured {}: chunks={} meshes={} http={}",
            handle,
            settings.chunk_buffer_max,
            settings.mesh_buffer_max,
            settings.http.is_some()
        );
        self.applied_settings = Some(settings);
        Ok(())
    }

    fn apply_speed(&mut self) -> Result<()> {
        let Some(handle) = self.handle else {
            return Ok(());
        };
        if self.applied_speed == Some(self.speed) {
            return Ok(());
        }
        self.source.set_speed(handle, self.speed)?;
        self.applied_speed = Some(self.speed);
        Ok(())
    }
}

impl Drop for SourceBinding {
    fn drop(&mut self) {
        self.close();
    }
}
