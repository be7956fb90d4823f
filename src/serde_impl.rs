//! `serde` support: bitmaps travel as their binary encoding.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::{Bitmap, Bitmap32, Bitmap64};

macro_rules! impl_serde {
    ($($ty:ty),*) => {
        $(
            impl Serialize for $ty {
                fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    serializer.serialize_bytes(&self.to_bytes())
                }
            }

            impl<'de> Deserialize<'de> for $ty {
                fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                    let bytes = <Vec<u8>>::deserialize(deserializer)?;
                    <$ty>::from_bytes(&bytes).map_err(de::Error::custom)
                }
            }
        )*
    };
}

impl_serde!(Bitmap32, Bitmap64, Bitmap);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_roundtrip() {
        let b: Bitmap32 = [1, 2, 100_000].into();
        let json = serde_json::to_string(&b).unwrap();
        let back: Bitmap32 = serde_json::from_str(&json).unwrap();
        assert_eq!(back, b);

        let b: Bitmap64 = [1 << 40].into();
        let json = serde_json::to_string(&b).unwrap();
        assert_eq!(serde_json::from_str::<Bitmap64>(&json).unwrap(), b);
        assert!(serde_json::from_str::<Bitmap32>(&json).is_err());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(serde_json::from_str::<Bitmap>("[1, 2, 3]").is_err());
    }
}
