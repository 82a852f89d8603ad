use serde::{Deserialize, Deserializer, Serializer};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

pub fn serialize<S>(value: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	let formatted = value.format(&Rfc3339).map_err(serde::ser::Error::custom)?;

	serializer.serialize_str(&formatted)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = String::deserialize(deserializer)?;

	OffsetDateTime::parse(&raw, &Rfc3339).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
	use serde::{Deserialize, Serialize};
	use time::{OffsetDateTime, macros::datetime};

	#[derive(Debug, PartialEq, Serialize, Deserialize)]
	struct Stamp {
		#[serde(with = "super")]
		at: OffsetDateTime,
	}

	#[test]
	fn reads_back_rfc3339() {
		let stamp = Stamp { at: datetime!(2024-05-01 08:30:00 UTC) };
		let raw = serde_json::to_string(&stamp).expect("encode");

		assert_eq!(raw, r#"{"at":"2024-05-01T08:30:00Z"}"#);
		assert_eq!(serde_json::from_str::<Stamp>(&raw).expect("decode"), stamp);
	}

	#[test]
	fn rejects_non_rfc3339() {
		assert!(serde_json::from_str::<Stamp>(r#"{"at":"yesterday"}"#).is_err());
	}
}
