/// Generate `ALL`, `as_str`, `from_name`, `Display`, `From<T> for String`, and
/// `TryFrom<String> for T` for a closed, fieldless enum.
///
/// Unknown strings return an error; there is no fallback variant. `ALL` lists the
/// variants in declaration order. Add `#[serde(into = "String", try_from = "String")]`
/// to the enum to get Serialize/Deserialize through these impls.
macro_rules! string_enum {
    ($name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $str,)+
                }
            }

            pub fn from_name(s: &str) -> Option<Self> {
                match s {
                    $($str => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<$name> for String {
            fn from(v: $name) -> Self {
                v.as_str().to_string()
            }
        }

        impl TryFrom<String> for $name {
            type Error = String;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                $name::from_name(&s).ok_or_else(|| format!("unknown {}: {s}", stringify!($name)))
            }
        }
    };
}
