use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Where a field lives in the status document, and therefore how its
/// patch nests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlScope {
    Top,
    Camera,
}

/// UI widget type and value domain for one editable field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlKind {
    /// Boolean checkbox.
    Toggle,
    /// Numeric slider, inclusive bounds.
    Range { min: i64, max: i64, step: i64 },
    /// Dropdown over a fixed set of strings.
    Select { options: &'static [&'static str] },
    /// Dropdown over a fixed set of integers.
    IntSelect { options: &'static [i64] },
}

/// Hardcoded metadata for one control: field name, document scope, domain.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ControlDescriptor {
    pub name: &'static str,
    pub scope: ControlScope,
    pub kind: ControlKind,
}

const fn top(name: &'static str, kind: ControlKind) -> ControlDescriptor {
    ControlDescriptor {
        name,
        scope: ControlScope::Top,
        kind,
    }
}

const fn camera(name: &'static str, kind: ControlKind) -> ControlDescriptor {
    ControlDescriptor {
        name,
        scope: ControlScope::Camera,
        kind,
    }
}

/// The full control table, in display order. This is the panel's entire
/// configuration: an explicit list, never derived from document keys.
pub static CONTROL_TABLE: &[ControlDescriptor] = &[
    top("stream", ControlKind::Toggle),
    top("lapse", ControlKind::Toggle),
    top(
        "interval",
        ControlKind::Range {
            min: 1,
            max: 300,
            step: 1,
        },
    ),
    camera("rotation", ControlKind::IntSelect { options: &[0, 180] }),
    camera(
        "brightness",
        ControlKind::Range {
            min: 0,
            max: 100,
            step: 1,
        },
    ),
    camera(
        "contrast",
        ControlKind::Range {
            min: -100,
            max: 100,
            step: 1,
        },
    ),
    camera(
        "iso",
        ControlKind::IntSelect {
            options: &[100, 200, 300, 320, 400, 500, 600, 640, 800],
        },
    ),
    camera(
        "exposure_mode",
        ControlKind::Select {
            options: &[
                "off",
                "auto",
                "night",
                "sports",
                "beach",
                "backlight",
                "spotlight",
                "antishake",
            ],
        },
    ),
    camera(
        "meter_mode",
        ControlKind::Select {
            options: &["average", "spot", "backlit", "matrix"],
        },
    ),
    camera(
        "awb_mode",
        ControlKind::Select {
            options: &[
                "off",
                "auto",
                "fix",
                "sunlight",
                "cloudy",
                "shade",
                "tungsten",
                "horizon",
                "incandescent",
            ],
        },
    ),
    camera(
        "shutter_speed",
        ControlKind::Range {
            min: 0,
            max: 100_000,
            step: 1,
        },
    ),
];

static BY_NAME: Lazy<HashMap<&'static str, &'static ControlDescriptor>> = Lazy::new(|| {
    CONTROL_TABLE
        .iter()
        .map(|descriptor| (descriptor.name, descriptor))
        .collect()
});

/// Look up a control descriptor by field name.
pub fn descriptor(name: &str) -> Option<&'static ControlDescriptor> {
    BY_NAME.get(name).copied()
}

#[derive(Debug, Error, PartialEq)]
pub enum ControlError {
    #[error("unknown control: {0}")]
    Unknown(String),
    #[error("control {name} expects {expected}")]
    WrongType {
        name: &'static str,
        expected: &'static str,
    },
    #[error("control {name} out of range: {value} not in [{min}, {max}] step {step}")]
    OutOfRange {
        name: &'static str,
        value: i64,
        min: i64,
        max: i64,
        step: i64,
    },
    #[error("control {name} does not accept {value}")]
    BadChoice { name: &'static str, value: Value },
}

/// Check a proposed value against a control's domain.
pub fn validate(descriptor: &ControlDescriptor, value: &Value) -> Result<(), ControlError> {
    let name = descriptor.name;
    match descriptor.kind {
        ControlKind::Toggle => {
            if value.is_boolean() {
                Ok(())
            } else {
                Err(ControlError::WrongType {
                    name,
                    expected: "a boolean",
                })
            }
        }
        ControlKind::Range { min, max, step } => {
            let n = value.as_i64().ok_or(ControlError::WrongType {
                name,
                expected: "an integer",
            })?;
            if n < min || n > max || (n - min) % step != 0 {
                return Err(ControlError::OutOfRange {
                    name,
                    value: n,
                    min,
                    max,
                    step,
                });
            }
            Ok(())
        }
        ControlKind::Select { options } => {
            let s = value.as_str().ok_or(ControlError::WrongType {
                name,
                expected: "a string",
            })?;
            if options.contains(&s) {
                Ok(())
            } else {
                Err(ControlError::BadChoice {
                    name,
                    value: value.clone(),
                })
            }
        }
        ControlKind::IntSelect { options } => {
            let n = value.as_i64().ok_or(ControlError::WrongType {
                name,
                expected: "an integer",
            })?;
            if options.contains(&n) {
                Ok(())
            } else {
                Err(ControlError::BadChoice {
                    name,
                    value: value.clone(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_table_covers_every_field_once() {
        assert_eq!(CONTROL_TABLE.len(), 11);
        let mut names: Vec<_> = CONTROL_TABLE.iter().map(|d| d.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), CONTROL_TABLE.len());
    }

    #[test]
    fn test_lookup_by_name() {
        let d = descriptor("rotation").unwrap();
        assert_eq!(d.scope, ControlScope::Camera);
        assert_eq!(d.kind, ControlKind::IntSelect { options: &[0, 180] });
        assert!(descriptor("framerate").is_none());
    }

    #[test]
    fn test_toggle_validation() {
        let d = descriptor("stream").unwrap();
        assert!(validate(d, &json!(true)).is_ok());
        assert!(validate(d, &json!(1)).is_err());
    }

    #[test]
    fn test_range_validation() {
        let d = descriptor("contrast").unwrap();
        assert!(validate(d, &json!(-100)).is_ok());
        assert!(validate(d, &json!(0)).is_ok());
        assert!(validate(d, &json!(100)).is_ok());
        assert!(validate(d, &json!(101)).is_err());
        assert!(validate(d, &json!(-101)).is_err());
        assert!(validate(d, &json!("50")).is_err());
    }

    #[test]
    fn test_interval_range() {
        let d = descriptor("interval").unwrap();
        assert!(validate(d, &json!(1)).is_ok());
        assert!(validate(d, &json!(300)).is_ok());
        assert!(validate(d, &json!(0)).is_err());
        assert!(validate(d, &json!(301)).is_err());
    }

    #[test]
    fn test_select_validation() {
        let d = descriptor("awb_mode").unwrap();
        assert!(validate(d, &json!("tungsten")).is_ok());
        assert!(validate(d, &json!("fluorescent")).is_err());
        assert!(validate(d, &json!(2)).is_err());
    }

    #[test]
    fn test_int_select_validation() {
        let d = descriptor("iso").unwrap();
        assert!(validate(d, &json!(640)).is_ok());
        assert!(validate(d, &json!(150)).is_err());
        assert!(validate(d, &json!("640")).is_err());
    }
}
