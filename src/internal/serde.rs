use crate::error::{GyaoError, GyaoErrorContext};
use crate::Result;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// The undocumented apis wrap their payload lists in an object (`{"videos": [...]}`,
/// `{"sources": [...]}`). Take the list stored in `property` out of `value` or fail if `value` is
/// no object or the property is no list.
pub(crate) fn take_list_property(
    mut value: Value,
    property: &str,
    url: &str,
) -> Result<Vec<Value>> {
    if let Some(Value::Array(items)) = value.get_mut(property) {
        return Ok(std::mem::take(items));
    }

    Err(GyaoError::Schema(
        GyaoErrorContext::new(format!(
            "Unexpected JSON schema, expected an object with list property '{}'",
            property
        ))
        .with_url(url)
        .with_value(value.to_string().as_bytes()),
    ))
}

/// Decode a single list item. Fails with [`GyaoError::Schema`] if the item isn't an object or a
/// field has the wrong type.
pub(crate) fn decode_item<T: DeserializeOwned>(item: Value, url: &str) -> Result<T> {
    if !item.is_object() {
        return Err(GyaoError::Schema(
            GyaoErrorContext::new("Unexpected item found, expected an object")
                .with_url(url)
                .with_value(item.to_string().as_bytes()),
        ));
    }

    let raw = item.to_string();
    serde_json::from_value(item).map_err(|e| {
        GyaoError::Schema(
            GyaoErrorContext::new(e.to_string())
                .with_url(url)
                .with_value(raw.as_bytes()),
        )
    })
}
