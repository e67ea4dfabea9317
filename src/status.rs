use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::controls::ControlScope;

/// Camera-specific fields nested under `camera` in the status document.
///
/// `framerate` and `exposure_speed` are kept as raw JSON values so the page
/// title renders them exactly as the device reported them (integer or float).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CameraStatus {
    #[serde(default)]
    pub rotation: i64,
    #[serde(default)]
    pub shutter_speed: i64,
    #[serde(default)]
    pub brightness: i64,
    #[serde(default)]
    pub contrast: i64,
    #[serde(default)]
    pub iso: i64,
    #[serde(default)]
    pub exposure_mode: String,
    #[serde(default)]
    pub meter_mode: String,
    #[serde(default)]
    pub awb_mode: String,
    #[serde(default)]
    pub framerate: Value,
    #[serde(default)]
    pub exposure_speed: Value,
    /// Camera keys this client does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The device's current state as served by `GET /status`.
///
/// The client only interprets the keys it knows about; everything else is
/// carried in `extra` untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StatusDocument {
    #[serde(default)]
    pub stream: bool,
    #[serde(default)]
    pub lapse: bool,
    #[serde(default)]
    pub interval: i64,
    #[serde(default)]
    pub camera: CameraStatus,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StatusDocument {
    /// Merge a freshly fetched document into this one in place.
    ///
    /// Known fields are overwritten, unknown keys are merged key by key
    /// (existing extras not present in `other` survive), so anything holding
    /// a reference to this document keeps observing the same object.
    pub fn merge_from(&mut self, other: StatusDocument) {
        self.stream = other.stream;
        self.lapse = other.lapse;
        self.interval = other.interval;

        self.camera.rotation = other.camera.rotation;
        self.camera.shutter_speed = other.camera.shutter_speed;
        self.camera.brightness = other.camera.brightness;
        self.camera.contrast = other.camera.contrast;
        self.camera.iso = other.camera.iso;
        self.camera.exposure_mode = other.camera.exposure_mode;
        self.camera.meter_mode = other.camera.meter_mode;
        self.camera.awb_mode = other.camera.awb_mode;
        self.camera.framerate = other.camera.framerate;
        self.camera.exposure_speed = other.camera.exposure_speed;
        for (k, v) in other.camera.extra {
            self.camera.extra.insert(k, v);
        }

        for (k, v) in other.extra {
            self.extra.insert(k, v);
        }
    }

    /// Current value of a known field, as JSON.
    pub fn field(&self, scope: ControlScope, name: &str) -> Option<Value> {
        match scope {
            ControlScope::Top => match name {
                "stream" => Some(json!(self.stream)),
                "lapse" => Some(json!(self.lapse)),
                "interval" => Some(json!(self.interval)),
                _ => None,
            },
            ControlScope::Camera => match name {
                "rotation" => Some(json!(self.camera.rotation)),
                "shutter_speed" => Some(json!(self.camera.shutter_speed)),
                "brightness" => Some(json!(self.camera.brightness)),
                "contrast" => Some(json!(self.camera.contrast)),
                "iso" => Some(json!(self.camera.iso)),
                "exposure_mode" => Some(json!(self.camera.exposure_mode)),
                "meter_mode" => Some(json!(self.camera.meter_mode)),
                "awb_mode" => Some(json!(self.camera.awb_mode)),
                _ => None,
            },
        }
    }

    /// Apply a validated edit to the local copy. Unknown names are ignored.
    pub fn apply(&mut self, scope: ControlScope, name: &str, value: &Value) {
        match scope {
            ControlScope::Top => match name {
                "stream" => {
                    if let Some(b) = value.as_bool() {
                        self.stream = b;
                    }
                }
                "lapse" => {
                    if let Some(b) = value.as_bool() {
                        self.lapse = b;
                    }
                }
                "interval" => {
                    if let Some(n) = value.as_i64() {
                        self.interval = n;
                    }
                }
                _ => {}
            },
            ControlScope::Camera => match name {
                "rotation" => {
                    if let Some(n) = value.as_i64() {
                        self.camera.rotation = n;
                    }
                }
                "shutter_speed" => {
                    if let Some(n) = value.as_i64() {
                        self.camera.shutter_speed = n;
                    }
                }
                "brightness" => {
                    if let Some(n) = value.as_i64() {
                        self.camera.brightness = n;
                    }
                }
                "contrast" => {
                    if let Some(n) = value.as_i64() {
                        self.camera.contrast = n;
                    }
                }
                "iso" => {
                    if let Some(n) = value.as_i64() {
                        self.camera.iso = n;
                    }
                }
                "exposure_mode" => {
                    if let Some(s) = value.as_str() {
                        self.camera.exposure_mode = s.to_string();
                    }
                }
                "meter_mode" => {
                    if let Some(s) = value.as_str() {
                        self.camera.meter_mode = s.to_string();
                    }
                }
                "awb_mode" => {
                    if let Some(s) = value.as_str() {
                        self.camera.awb_mode = s.to_string();
                    }
                }
                _ => {}
            },
        }
    }
}

/// Page title derived from the camera's framerate and exposure speed,
/// matching the device panel's title format.
pub fn page_title(doc: &StatusDocument) -> String {
    format!(
        "fps: {} exp: {}",
        scalar_text(&doc.camera.framerate),
        scalar_text(&doc.camera.exposure_speed)
    )
}

/// Render a JSON scalar the way a template string would (no quotes on strings).
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A minimal one-field replacement sent to the device.
///
/// Serializes to exactly one top-level key, nested one level for camera
/// fields: `{"stream":true}` or `{"camera":{"rotation":180}}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    body: Value,
}

impl Patch {
    /// Patch for a top-level field.
    pub fn top(name: &str, value: Value) -> Self {
        Self {
            body: json!({ name: value }),
        }
    }

    /// Patch for a field nested under `camera`.
    pub fn camera(name: &str, value: Value) -> Self {
        Self {
            body: json!({ "camera": { name: value } }),
        }
    }

    /// Patch for a field in the given scope.
    pub fn for_scope(scope: ControlScope, name: &str, value: Value) -> Self {
        match scope {
            ControlScope::Top => Self::top(name, value),
            ControlScope::Camera => Self::camera(name, value),
        }
    }

    pub fn body(&self) -> &Value {
        &self.body
    }
}

impl Serialize for Patch {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.body.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StatusDocument {
        serde_json::from_value(json!({
            "stream": false,
            "lapse": false,
            "interval": 30,
            "uptime": 1234,
            "camera": {
                "rotation": 0,
                "brightness": 50,
                "contrast": 0,
                "iso": 100,
                "exposure_mode": "auto",
                "meter_mode": "average",
                "awb_mode": "auto",
                "shutter_speed": 0,
                "framerate": 30,
                "exposure_speed": 33000,
                "sensor_mode": 1
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_parse_keeps_unknown_keys() {
        let doc = sample();
        assert_eq!(doc.interval, 30);
        assert_eq!(doc.camera.brightness, 50);
        assert_eq!(doc.extra.get("uptime"), Some(&json!(1234)));
        assert_eq!(doc.camera.extra.get("sensor_mode"), Some(&json!(1)));
    }

    #[test]
    fn test_merge_updates_in_place() {
        let mut doc = sample();
        let mut fresh = sample();
        fresh.stream = true;
        fresh.camera.brightness = 70;
        fresh.extra.clear();
        fresh.camera.extra.clear();

        doc.merge_from(fresh);
        assert!(doc.stream);
        assert_eq!(doc.camera.brightness, 70);
        // extras not present in the fresh document survive the merge
        assert_eq!(doc.extra.get("uptime"), Some(&json!(1234)));
        assert_eq!(doc.camera.extra.get("sensor_mode"), Some(&json!(1)));
    }

    #[test]
    fn test_camera_patch_body_is_minimal() {
        let patch = Patch::camera("rotation", json!(180));
        assert_eq!(
            serde_json::to_string(&patch).unwrap(),
            r#"{"camera":{"rotation":180}}"#
        );
    }

    #[test]
    fn test_top_level_patch_is_not_nested() {
        let patch = Patch::top("stream", json!(true));
        assert_eq!(serde_json::to_string(&patch).unwrap(), r#"{"stream":true}"#);
    }

    #[test]
    fn test_page_title_format() {
        let doc = sample();
        assert_eq!(page_title(&doc), "fps: 30 exp: 33000");
    }

    #[test]
    fn test_page_title_with_float_framerate() {
        let mut doc = sample();
        doc.camera.framerate = json!(0.5);
        assert_eq!(page_title(&doc), "fps: 0.5 exp: 33000");
    }

    #[test]
    fn test_apply_updates_known_fields_only() {
        let mut doc = sample();
        doc.apply(ControlScope::Camera, "brightness", &json!(80));
        doc.apply(ControlScope::Top, "stream", &json!(true));
        doc.apply(ControlScope::Camera, "framerate", &json!(60));
        assert_eq!(doc.camera.brightness, 80);
        assert!(doc.stream);
        // framerate is read-only, not an editable control
        assert_eq!(doc.camera.framerate, json!(30));
    }
}
