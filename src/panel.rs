use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::client::{DeviceClient, DeviceError};
use crate::controls::{self, ControlDescriptor, ControlError, CONTROL_TABLE};
use crate::status::{page_title, Patch, StatusDocument};

#[derive(Debug, Error)]
pub enum PanelError {
    #[error("status has not been loaded yet")]
    NotLoaded,
    #[error(transparent)]
    Control(#[from] ControlError),
    #[error(transparent)]
    Device(#[from] DeviceError),
}

/// One control attached to the panel, with the value it currently displays.
#[derive(Debug, Clone, Serialize)]
pub struct BoundControl {
    #[serde(flatten)]
    pub descriptor: &'static ControlDescriptor,
    pub value: Value,
}

/// Serializable view of the panel for the web layer.
#[derive(Debug, Clone, Serialize)]
pub struct PanelSnapshot {
    pub loaded: bool,
    pub title: String,
    pub controls: Vec<BoundControl>,
}

/// The control panel: owns the device client, the cached status document and
/// the bound controls.
///
/// Two states only: unloaded and loaded. The transition happens once, on the
/// first successful status fetch; controls are bound at that moment and never
/// recreated. Edits are optimistic and never rolled back.
pub struct ControlPanel {
    client: DeviceClient,
    doc: Option<StatusDocument>,
    controls: Vec<BoundControl>,
    title: String,
}

impl ControlPanel {
    pub fn new(client: DeviceClient) -> Self {
        Self {
            client,
            doc: None,
            controls: Vec::new(),
            title: String::new(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.doc.is_some()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn controls(&self) -> &[BoundControl] {
        &self.controls
    }

    /// Fetch the status document and merge it into the local cache.
    ///
    /// On the first successful fetch the control table is bound against the
    /// document; later calls merge in place and never rebind.
    pub async fn load(&mut self) -> Result<(), PanelError> {
        let fetched = self.client.load_status().await?;

        match &mut self.doc {
            Some(doc) => doc.merge_from(fetched),
            None => self.doc = Some(fetched),
        }

        if self.controls.is_empty() {
            self.bind_controls();
            info!("🎛️ Status loaded, {} controls bound", self.controls.len());
        }
        Ok(())
    }

    fn bind_controls(&mut self) {
        let Some(doc) = &self.doc else {
            return;
        };
        self.controls = CONTROL_TABLE
            .iter()
            .map(|descriptor| BoundControl {
                descriptor,
                value: doc.field(descriptor.scope, descriptor.name).unwrap_or(Value::Null),
            })
            .collect();
    }

    /// Apply a finished edit: validate, update the local document and the
    /// bound control, then push the one-field patch to the device.
    ///
    /// The optimistic edit stays applied even when the push fails; the error
    /// is returned so the caller can observe (or ignore) it.
    pub async fn set_control(&mut self, name: &str, value: Value) -> Result<(), PanelError> {
        let doc = self.doc.as_mut().ok_or(PanelError::NotLoaded)?;
        let descriptor = controls::descriptor(name)
            .ok_or_else(|| ControlError::Unknown(name.to_string()))?;
        controls::validate(descriptor, &value)?;

        doc.apply(descriptor.scope, name, &value);
        if let Some(control) = self
            .controls
            .iter_mut()
            .find(|control| control.descriptor.name == name)
        {
            control.value = value.clone();
        }

        debug!("✏️ Control {} set to {}", name, value);
        let patch = Patch::for_scope(descriptor.scope, name, value);
        self.client.send_patch(&patch).await?;
        Ok(())
    }

    /// Re-fetch status, then update every bound control's displayed value and
    /// the page title. Control count never changes here.
    pub async fn refresh(&mut self) -> Result<(), PanelError> {
        self.load().await?;

        let Some(doc) = &self.doc else {
            return Err(PanelError::NotLoaded);
        };
        for control in &mut self.controls {
            if let Some(value) = doc.field(control.descriptor.scope, control.descriptor.name) {
                control.value = value;
            }
        }
        self.title = page_title(doc);
        info!("🔄 Refreshed, title is now {:?}", self.title);
        Ok(())
    }

    /// Fresh cache-busted stream URL, forcing the viewer to re-request the
    /// MJPEG stream.
    pub fn reload_image(&self) -> String {
        self.client.stream_url()
    }

    /// Ask the device to shut down. One request, no payload.
    pub async fn shutdown(&self) -> Result<(), PanelError> {
        self.client.shutdown().await?;
        info!("🛑 Shutdown requested");
        Ok(())
    }

    pub fn snapshot(&self) -> PanelSnapshot {
        PanelSnapshot {
            loaded: self.is_loaded(),
            title: self.title.clone(),
            controls: self.controls.clone(),
        }
    }
}
