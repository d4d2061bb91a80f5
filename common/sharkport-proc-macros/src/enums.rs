use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DataEnum, DeriveInput, Fields, LitStr, Variant};

fn parse_fieldless_enum<'a>(input: &'a DeriveInput, derive: &str) -> syn::Result<&'a DataEnum> {
    let type_ident = &input.ident;
    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            type_ident,
            format!("{derive} can only be applied to enums; {type_ident} is not an enum"),
        ));
    };

    if let Some(variant) = data.variants.iter().find(|v| !matches!(v.fields, Fields::Unit)) {
        return Err(syn::Error::new_spanned(
            variant,
            format!(
                "{derive} only supports fieldless variants; {type_ident}::{} has fields",
                variant.ident
            ),
        ));
    }

    Ok(data)
}

fn expand(
    input: TokenStream,
    f: impl FnOnce(&DeriveInput) -> syn::Result<TokenStream2>,
) -> TokenStream {
    let input = match syn::parse::<DeriveInput>(input) {
        Ok(input) => input,
        Err(err) => return err.to_compile_error().into(),
    };

    f(&input).unwrap_or_else(syn::Error::into_compile_error).into()
}

fn display_name(variant: &Variant) -> syn::Result<String> {
    let mut name = variant.ident.to_string();

    for attr in variant.attrs.iter().filter(|attr| attr.path().is_ident("enum_display")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                name = meta.value()?.parse::<LitStr>()?.value();
                Ok(())
            } else {
                Err(meta.error("unsupported enum_display attribute; expected `name`"))
            }
        })?;
    }

    Ok(name)
}

pub fn enum_display(input: TokenStream) -> TokenStream {
    expand(input, |input| {
        let type_ident = &input.ident;
        let data = parse_fieldless_enum(input, "EnumDisplay")?;

        let match_arms = data
            .variants
            .iter()
            .map(|variant| {
                let variant_ident = &variant.ident;
                let name = display_name(variant)?;
                Ok(quote! { Self::#variant_ident => #name })
            })
            .collect::<syn::Result<Vec<_>>>()?;

        Ok(quote! {
            impl #type_ident {
                #[must_use]
                pub const fn to_str(&self) -> &'static str {
                    match self {
                        #(#match_arms,)*
                    }
                }
            }

            impl ::std::fmt::Display for #type_ident {
                fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                    f.write_str(self.to_str())
                }
            }
        })
    })
}

pub fn enum_all(input: TokenStream) -> TokenStream {
    expand(input, |input| {
        let type_ident = &input.ident;
        let data = parse_fieldless_enum(input, "EnumAll")?;

        let variants = data.variants.iter().map(|variant| &variant.ident);
        let num_variants = data.variants.len();

        Ok(quote! {
            impl #type_ident {
                pub const ALL: [Self; #num_variants] = [#(Self::#variants,)*];
            }
        })
    })
}

pub fn custom_value_enum(input: TokenStream) -> TokenStream {
    expand(input, |input| {
        let type_ident = &input.ident;
        let data = parse_fieldless_enum(input, "CustomValueEnum")?;

        let match_arms = data.variants.iter().map(|variant| {
            let variant_ident = &variant.ident;
            let value = variant_ident.to_string().to_ascii_lowercase();
            quote! { Self::#variant_ident => #value }
        });

        Ok(quote! {
            impl ::clap::ValueEnum for #type_ident {
                fn value_variants<'a>() -> &'a [Self] {
                    &Self::ALL
                }

                fn to_possible_value(&self) -> ::std::option::Option<::clap::builder::PossibleValue> {
                    let value = match self {
                        #(#match_arms,)*
                    };
                    ::std::option::Option::Some(::clap::builder::PossibleValue::new(value))
                }
            }
        })
    })
}
