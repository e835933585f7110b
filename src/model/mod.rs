use std::fmt;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod error;

/// Invoice/payment callback as posted by Xendit. Missing fields fall back to zero values and
/// unknown fields are dropped, so the stored document always has the same shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XenditWebhook {
    pub id: String,
    pub external_id: String,
    pub user_id: String,
    pub is_high: bool,
    pub payment_method: String,
    pub status: String,
    pub merchant_name: String,
    pub amount: i64,
    pub paid_amount: i64,
    pub bank_code: String,
    pub paid_at: String,
    pub payer_email: String,
    pub description: String,
    pub adjusted_received_amount: i64,
    pub fees_paid_amount: i64,
    pub updated: String,
    pub created: String,
    pub currency: String,
    pub payment_channel: String,
    pub payment_destination: String,
}

impl XenditWebhook {
    /// Decodes a callback body the lenient way senders expect: keys match fields regardless of
    /// case, a repeated key keeps its last value, and `null` (document or member) sets nothing.
    pub fn from_payload(body: &[u8]) -> Result<Self, serde_json::Error> {
        let mut de = serde_json::Deserializer::from_slice(body);
        let FoldedObject(fields) = FoldedObject::deserialize(&mut de)?;
        de.end()?;
        serde_json::from_value(Value::Object(fields))
    }
}

/// Top-level JSON object with lower-cased keys, folded in document order.
struct FoldedObject(Map<String, Value>);

impl<'de> Deserialize<'de> for FoldedObject {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FoldedObjectVisitor;

        impl<'de> Visitor<'de> for FoldedObjectVisitor {
            type Value = FoldedObject;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a JSON object or null")
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(FoldedObject(Map::new()))
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut fields = Map::new();
                while let Some((key, value)) = access.next_entry::<String, Value>()? {
                    // a null member leaves whatever an earlier key already set
                    if !value.is_null() {
                        fields.insert(key.to_lowercase(), value);
                    }
                }
                Ok(FoldedObject(fields))
            }
        }

        deserializer.deserialize_any(FoldedObjectVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_payload_fills_zero_values() -> anyhow::Result<()> {
        let wh: XenditWebhook = serde_json::from_str(
            r#"{"id":"579c8d61f23fa4ca35e52da4","amount":50000,"is_high":true,"unknown":[1,2]}"#,
        )?;
        assert_eq!(wh.id, "579c8d61f23fa4ca35e52da4");
        assert_eq!(wh.amount, 50000);
        assert!(wh.is_high);
        assert_eq!(wh.paid_at, "");
        assert_eq!(wh.fees_paid_amount, 0);
        Ok(())
    }

    #[test]
    fn wrongly_typed_field_is_rejected() {
        let res = serde_json::from_str::<XenditWebhook>(r#"{"amount":"50000"}"#);
        assert!(res.is_err());
        assert!(XenditWebhook::from_payload(br#"{"amount":"50000"}"#).is_err());
    }

    #[test]
    fn payload_keys_match_any_case() -> anyhow::Result<()> {
        let wh = XenditWebhook::from_payload(
            br#"{"ID":"inv1","Amount":5,"Paid_At":"2020-01-02T00:00:00Z","IS_HIGH":true}"#,
        )?;
        assert_eq!(wh.id, "inv1");
        assert_eq!(wh.amount, 5);
        assert_eq!(wh.paid_at, "2020-01-02T00:00:00Z");
        assert!(wh.is_high);
        Ok(())
    }

    #[test]
    fn repeated_key_keeps_last_value() -> anyhow::Result<()> {
        let wh =
            XenditWebhook::from_payload(br#"{"id":"a","ID":"b","status":"PENDING","id":"c"}"#)?;
        assert_eq!(wh.id, "c");
        assert_eq!(wh.status, "PENDING");
        Ok(())
    }

    #[test]
    fn null_means_unset() -> anyhow::Result<()> {
        assert_eq!(XenditWebhook::from_payload(b"null")?, XenditWebhook::default());
        assert_eq!(XenditWebhook::from_payload(b" null \n")?, XenditWebhook::default());
        let wh = XenditWebhook::from_payload(br#"{"id":"x","amount":null,"ID":null}"#)?;
        assert_eq!(wh.id, "x");
        assert_eq!(wh.amount, 0);
        Ok(())
    }

    #[test]
    fn non_object_payloads_are_rejected() {
        let bodies: [&[u8]; 6] = [b"", b"42", b"[]", b"\"id\"", b"{} {}", b"{not json"];
        for body in bodies {
            assert!(XenditWebhook::from_payload(body).is_err(), "{body:?}");
        }
    }
}
