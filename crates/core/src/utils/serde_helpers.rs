//! Serde utility helpers for case-insensitive enum names

/// Implement `FromStr`, `Display` and case-insensitive `Deserialize` for a
/// fieldless enum from one list of names.
///
/// Usage:
/// ```ignore
/// impl_case_insensitive_names!(
///     MyEnum,
///     Variant1 => "variant1",
///     Variant2 => "variant2"
/// );
/// ```
#[macro_export]
macro_rules! impl_case_insensitive_names {
    ($enum_type:ty, $($variant:ident => $str_val:expr),+ $(,)?) => {
        impl $enum_type {
            /// All names accepted by `from_str`, in declaration order
            pub const NAMES: &'static [&'static str] = &[$($str_val),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str_val,)+
                }
            }
        }

        impl std::fmt::Display for $enum_type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_type {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $(
                        $str_val => Ok(Self::$variant),
                    )+
                    _ => Err(format!(
                        "unknown variant '{}', expected one of: {}",
                        s,
                        Self::NAMES.join(", ")
                    )),
                }
            }
        }

        impl serde::Serialize for $enum_type {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $enum_type {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum TestEnum {
        First,
        Second,
        ThirdOption,
    }

    impl_case_insensitive_names!(
        TestEnum,
        First => "first",
        Second => "second",
        ThirdOption => "thirdoption"
    );

    #[test]
    fn test_case_insensitive_deserialize() {
        let result: TestEnum = serde_json::from_str(r#""first""#).unwrap();
        assert_eq!(result, TestEnum::First);

        let result: TestEnum = serde_json::from_str(r#""FIRST""#).unwrap();
        assert_eq!(result, TestEnum::First);

        let result: TestEnum = serde_json::from_str(r#""ThirdOption""#).unwrap();
        assert_eq!(result, TestEnum::ThirdOption);

        let result: Result<TestEnum, _> = serde_json::from_str(r#""invalid""#);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown variant"));
        assert!(err.contains("expected one of: first, second, thirdoption"));
    }

    #[test]
    fn test_display_round_trips_through_from_str() {
        assert_eq!(TestEnum::Second.to_string(), "second");
        assert_eq!("SECOND".parse::<TestEnum>(), Ok(TestEnum::Second));
        assert_eq!(
            serde_json::to_string(&TestEnum::ThirdOption).unwrap(),
            r#""thirdoption""#
        );
    }
}
