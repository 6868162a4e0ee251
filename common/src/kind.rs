//! Macros for defining kind enums.

use derive_more::{Display, Error};

/// Macro for defining a kind enum.
///
/// The defined enum is represented by the `SCREAMING_SNAKE_CASE` name of its
/// variants everywhere: in [`Display`], [`FromStr`], [`serde`] and SQL.
///
/// # Example
///
/// ```rust
/// # use common::define_kind;
///
/// define_kind! {
///     #[doc = "Shape kind."]
///     enum Kind {
///         #[doc = "A cube"]
///         Cube,
///
///         #[doc = "A sphere"]
///         Sphere,
///     }
/// }
///
/// assert_eq!(Kind::Cube.as_str(), "CUBE");
/// ```
///
/// [`Display`]: std::fmt::Display
/// [`FromStr`]: std::str::FromStr
/// [`serde`]: https://docs.rs/serde
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_kind {
    (
        #[doc = $doc:literal]
        enum $name:ident {
            $(
                #[doc = $variant_doc:literal]
                $variant:ident
            ),* $(,)?
        }
    ) => {
        #[derive(
            Clone,
            Copy,
            Debug,
            $crate::private::strum::Display,
            $crate::private::strum::IntoStaticStr,
            Eq,
            Hash,
            PartialEq,
        )]
        #[doc = $doc]
        #[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $(
                 #[doc = $variant_doc]
                 $variant,
            )*
        }

        impl $name {
            /// All the variants of this kind.
            pub const ALL: &'static [Self] = &[$(Self::$variant),*];

            /// Returns the `SCREAMING_SNAKE_CASE` representation of this
            /// kind.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                self.into()
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::UnknownKind;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|k| k.as_str() == s)
                    .ok_or_else(|| $crate::UnknownKind {
                        kind: ::core::stringify!($name),
                        value: s.to_owned(),
                    })
            }
        }

        impl $crate::private::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: $crate::private::serde::Serializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> $crate::private::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: $crate::private::serde::Deserializer<'de>,
            {
                use $crate::private::serde::de::Error as _;

                let raw = <::std::string::String as
                    $crate::private::serde::Deserialize>::deserialize(
                        deserializer,
                    )?;
                raw.parse().map_err(D::Error::custom)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'a> $crate::private::postgres_types::FromSql<'a> for $name {
            fn from_sql(
                ty: &$crate::private::postgres_types::Type,
                raw: &'a [u8],
            ) -> Result<
                $name,
                Box<dyn ::std::error::Error
                    + ::core::marker::Sync
                    + ::core::marker::Send>,
            > {
                <&str as $crate::private::postgres_types::FromSql>::from_sql(
                    ty, raw,
                )?
                .parse()
                .map_err(Into::into)
            }

            fn accepts(ty: &$crate::private::postgres_types::Type) -> bool {
                <&str as $crate::private::postgres_types::FromSql>::accepts(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl $crate::private::postgres_types::ToSql for $name {
            $crate::private::postgres_types::to_sql_checked!();

            fn to_sql(
                &self,
                ty: &$crate::private::postgres_types::Type,
                w: &mut $crate::private::postgres_types::private::BytesMut,
            ) -> Result<
                $crate::private::postgres_types::IsNull,
                ::std::boxed::Box<
                    dyn ::std::error::Error
                        + ::core::marker::Sync
                        + ::core::marker::Send
                >,
            > {
                <&str as $crate::private::postgres_types::ToSql>::to_sql(
                    &self.as_str(),
                    ty,
                    w,
                )
            }

            fn accepts(ty: &$crate::private::postgres_types::Type) -> bool {
                <&str as $crate::private::postgres_types::ToSql>::accepts(ty)
            }
        }
    };
}

/// Error of parsing a kind enum from an unknown value.
#[derive(Clone, Debug, Display, Error)]
#[display("unknown `{kind}` value: `{value}`")]
pub struct UnknownKind {
    /// Name of the kind enum.
    pub kind: &'static str,

    /// Value failed to be parsed.
    pub value: String,
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    define_kind! {
        #[doc = "Kind of a test."]
        enum Shape {
            #[doc = "Cube."]
            Cube,

            #[doc = "Triangular prism."]
            TriangularPrism,
        }
    }

    #[test]
    fn uses_screaming_snake_case() {
        assert_eq!(Shape::Cube.as_str(), "CUBE");
        assert_eq!(Shape::TriangularPrism.to_string(), "TRIANGULAR_PRISM");
    }

    #[test]
    fn parses_known_values_only() {
        assert_eq!(
            Shape::from_str("TRIANGULAR_PRISM").unwrap(),
            Shape::TriangularPrism,
        );
        assert!(Shape::from_str("cube").is_err());
        assert_eq!(
            Shape::from_str("SPHERE").unwrap_err().to_string(),
            "unknown `Shape` value: `SPHERE`",
        );
    }
}
