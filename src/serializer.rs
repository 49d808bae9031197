use crate::send::BoxError;

use serde_json::Value;

/// Turns payloads into response bodies.
pub trait Serializer: Send + Sync {
    fn serialize(&self, payload: &Value) -> Result<String, BoxError>;
}

impl<F> Serializer for F
where
    F: Fn(&Value) -> Result<String, BoxError> + Send + Sync,
{
    fn serialize(&self, payload: &Value) -> Result<String, BoxError> {
        self(payload)
    }
}

/// The default serializer, which writes compact JSON.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn serialize(&self, payload: &Value) -> Result<String, BoxError> {
        serde_json::to_string(payload).map_err(Into::into)
    }
}
