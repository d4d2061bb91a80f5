//! Derive macros for the fieldless config enums

mod enums;

use proc_macro::TokenStream;

/// Implement `to_str()` and `Display` for a fieldless enum.
///
/// Each variant displays as its name unless it has an `#[enum_display(name = "...")]` attribute.
#[proc_macro_derive(EnumDisplay, attributes(enum_display))]
pub fn enum_display(input: TokenStream) -> TokenStream {
    enums::enum_display(input)
}

/// Add an `ALL` const listing every variant of a fieldless enum in declaration order.
#[proc_macro_derive(EnumAll)]
pub fn enum_all(input: TokenStream) -> TokenStream {
    enums::enum_all(input)
}

/// Implement `clap::ValueEnum` using the lowercased variant names as command-line values.
///
/// Requires the `EnumAll` derive.
#[proc_macro_derive(CustomValueEnum)]
pub fn custom_value_enum(input: TokenStream) -> TokenStream {
    enums::custom_value_enum(input)
}
