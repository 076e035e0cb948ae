/// Creates enums with string values. The syntax is like specifying a enum with numeric values,
/// just with strings instead of numbers. The first listed variant is the [`Default`].
///
/// Every created enum has an additional `Custom(String)` variant. GYAO! does not version its
/// GraphQL schema, if it starts to expect a value this crate does not know about yet it can be
/// sent as `Custom` without waiting for a new release.
///
/// The generated enum implements [`std::fmt::Display`], [`Default`], [`From<&str>`] (falls back
/// to `Custom` if the string matches no variant) and [`serde::Serialize`] as well as
/// [`serde::Deserialize`] as plain strings.
macro_rules! enum_values {
    ($(#[$attribute:meta])* $v:vis enum $name:ident { $first:ident = $first_value:literal $($field:ident = $value:literal)* }) => {
        $(
            #[$attribute]
        )*
        #[derive(Clone, Debug, Eq, PartialEq)]
        $v enum $name {
            $first,
            $(
                $field,
            )*
            Custom(String)
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $name::$first => $first_value,
                    $(
                        $name::$field => $value,
                    )*
                    $name::Custom(raw) => raw.as_str()
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$first
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                match value {
                    $first_value => $name::$first,
                    $(
                        $value => $name::$field,
                    )*
                    _ => $name::Custom(value.to_string())
                }
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
                where D: serde::Deserializer<'de>
            {
                Ok(Self::from(String::deserialize(deserializer)?.as_str()))
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> where S: serde::ser::Serializer {
                serializer.serialize_str(self.as_str())
            }
        }
    };
}

pub(crate) use enum_values;
