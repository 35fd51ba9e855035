//! Farm (seller) profile types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use farm_fresh_core::FarmId;

/// Stored shape of `farmers/{farmId}`. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Phone number, stored as a string or a number.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub contact: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

/// A farm as served to clients: the stored profile plus `idFarm`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Farm {
    #[serde(rename = "idFarm")]
    pub id: FarmId,
    #[serde(flatten)]
    pub record: FarmRecord,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_farm_wire_shape() {
        let record: FarmRecord = serde_json::from_value(json!({
            "storeName": "Kebun Lembang",
            "owner": "Pak Dedi",
            "contact": 81234567,
            "timeZone": "Asia/Jakarta",
            "legacyField": true
        }))
        .unwrap();
        let farm = Farm {
            id: FarmId::new("farm-1"),
            record,
        };

        let body = serde_json::to_value(&farm).unwrap();
        assert_eq!(
            body,
            json!({
                "idFarm": "farm-1",
                "storeName": "Kebun Lembang",
                "owner": "Pak Dedi",
                "contact": 81234567,
                "timeZone": "Asia/Jakarta"
            })
        );
    }
}
