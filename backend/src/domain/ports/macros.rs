//! `define_port_error!`: declares a port error enum whose variants each carry
//! a human-readable `message`.
//!
//! Every variant gets a snake_case constructor taking `impl Into<String>`,
//! and the enum gets a `message()` accessor that ignores the variant.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $display:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($display)]
                $variant { message: String },
            )+
        }

        impl $name {
            $(
                ::paste::paste! {
                    #[doc = "Build a `" $variant "` error."]
                    pub fn [<$variant:snake>](message: impl Into<String>) -> Self {
                        Self::$variant {
                            message: message.into(),
                        }
                    }
                }
            )+

            /// Adapter-supplied detail, without the variant's prefix.
            #[must_use]
            pub fn message(&self) -> &str {
                match self {
                    $(Self::$variant { message })|+ => message.as_str(),
                }
            }
        }
    };
}

pub(crate) use define_port_error;
