pub fn serialize<const N: usize, S>(t: &[u8; N], s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    s.serialize_str(&bs58::encode(t).into_string())
}

struct Visitor<const N: usize>;

impl<'de, const N: usize> serde::de::Visitor<'de> for Visitor<N> {
    type Value = [u8; N];

    fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str("base58")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        crate::bs58_decode(v).map_err(|_| serde::de::Error::custom("invalid base58"))
    }
}

pub fn deserialize<'de, const S: usize, D>(d: D) -> Result<[u8; S], D::Error>
where
    D: serde::Deserializer<'de>,
{
    d.deserialize_str(Visitor::<S>)
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Output {
        #[serde(with = "super")]
        signature: [u8; 64],
    }

    #[test]
    fn test_signature_field() {
        let output = Output {
            signature: [7; 64],
        };
        let json = serde_json::to_string(&output).unwrap();
        assert_eq!(serde_json::from_str::<Output>(&json).unwrap(), output);
        assert!(serde_json::from_str::<Output>(r#"{"signature":"abc"}"#).is_err());
    }
}
