// footprint_node/src/serde_helpers.rs

/// Angles are written in degrees in config files and held in radians in memory.
pub mod radians_from_degrees {
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(radians: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(radians.to_degrees())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let degrees: f64 = Deserialize::deserialize(deserializer)?;
        Ok(degrees.to_radians())
    }
}
