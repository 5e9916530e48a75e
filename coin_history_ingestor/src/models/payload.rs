use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Currency the stored price is taken from.
pub const REFERENCE_CURRENCY: &str = "usd";

/// The upstream history document, kept as-is.
///
/// Only the price lookup is interpreted; everything else is persisted verbatim.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawPayload(Value);

impl RawPayload {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_inner(self) -> Value {
        self.0
    }

    /// Reads `market_data.current_price.<currency>` as a number.
    ///
    /// Returns `None` when any level is missing or the leaf is not numeric.
    pub fn current_price(&self, currency: &str) -> Option<f64> {
        self.0
            .get("market_data")?
            .get("current_price")?
            .get(currency)?
            .as_f64()
    }
}

impl From<Value> for RawPayload {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
