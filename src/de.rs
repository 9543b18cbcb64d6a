use serde::de::{Deserialize, Deserializer, Error};

/// Accept only `true`, so that a response struct can't be deserialised from
/// an unsuccessful Slack response by accident.
pub fn only_true<'a, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'a>,
{
    bool::deserialize(deserializer).and_then(|b| {
        if b {
            Ok(b)
        } else {
            Err(Error::custom("invalid bool: false"))
        }
    })
}

#[test]
fn test_only_true() {
    #[derive(Debug, PartialEq, Eq, serde::Deserialize)]
    struct T {
        #[serde(deserialize_with = "only_true")]
        ok: bool,
    }

    assert_eq!(
        serde_json::from_str::<T>(r#"{"ok": true}"#).unwrap(),
        T { ok: true },
    );

    assert!(serde_json::from_str::<T>(r#"{"ok": false}"#).is_err());
    assert!(serde_json::from_str::<T>(r#"{"ok": "true"}"#).is_err());
}
