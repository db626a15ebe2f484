use crate::ClipPlanes;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The clipping configuration of a [`Polygon`](crate::Polygon).
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClipSettings {
    /// The planes the polygon is clipped against
    #[cfg_attr(feature = "serde-serialize", serde(default))]
    pub planes: ClipPlanes,
    /// The depth of the near clipping plane along the optical axis
    #[cfg_attr(feature = "serde-serialize", serde(default = "default_near"))]
    pub near: f64,
    /// The depth of the far clipping plane along the optical axis
    #[cfg_attr(feature = "serde-serialize", serde(default = "default_far"))]
    pub far: f64,
}

impl Default for ClipSettings {
    fn default() -> Self {
        Self {
            planes: ClipPlanes::NONE,
            near: default_near(),
            far: default_far(),
        }
    }
}

impl ClipSettings {
    pub fn new(planes: ClipPlanes) -> Self {
        Self {
            planes,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn near(self, near: f64) -> Self {
        Self { near, ..self }
    }

    #[must_use]
    pub fn far(self, far: f64) -> Self {
        Self { far, ..self }
    }
}

fn default_near() -> f64 {
    0.001
}

fn default_far() -> f64 {
    100.0
}

// Clip planes are exchanged as their raw bit value.
#[cfg(feature = "serde-serialize")]
impl Serialize for ClipPlanes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.bits())
    }
}

#[cfg(feature = "serde-serialize")]
impl<'de> Deserialize<'de> for ClipPlanes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bits = u32::deserialize(deserializer)?;
        ClipPlanes::from_bits(bits).ok_or_else(|| {
            serde::de::Error::custom(format_args!("invalid clip plane bits {:#x}", bits))
        })
    }
}

#[cfg(all(test, feature = "serde-serialize"))]
mod tests {
    use super::*;

    #[test]
    fn planes_serialize_as_bits() {
        let settings = ClipSettings::new(ClipPlanes::NEAR | ClipPlanes::LEFT).far(20.0);
        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(json, r#"{"planes":5,"near":0.001,"far":20.0}"#);
        let back: ClipSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let settings: ClipSettings = serde_json::from_str(r#"{"planes":2}"#).unwrap();
        assert_eq!(settings, ClipSettings::new(ClipPlanes::FAR));
    }

    #[test]
    fn unknown_bits_are_rejected() {
        assert!(serde_json::from_str::<ClipSettings>(r#"{"planes":64}"#).is_err());
    }
}
