//! Derive macros used throughout the [digitnet](../digitnet) crate.
//!
//! Right now this is only the `FromForAllUnnamedVariants` derive, which saves writing a `From`
//! implementation by hand for every error type that gets wrapped inside of an error enum.

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, Ident, Type};

/// Collects the variants that wrap exactly one unnamed field together with the type of that
/// field. Every other kind of variant is skipped.
fn single_field_variants(data: &Data) -> Option<Vec<(&Ident, &Type)>> {
    let enm = match data {
        Data::Enum(enm) => enm,
        _ => return None,
    };

    Some(
        enm.variants
            .iter()
            .filter_map(|variant| match &variant.fields {
                Fields::Unnamed(fields) if fields.unnamed.len() == 1 => {
                    fields.unnamed.first().map(|field| (&variant.ident, &field.ty))
                }
                _ => None,
            })
            .collect(),
    )
}

#[proc_macro_derive(FromForAllUnnamedVariants)]
/// Derives `From<T>` for the enum it is used on, for every variant that has exactly one unnamed
/// field of type `T`.
///
/// Two such variants wrapping the same type would generate conflicting implementations, so give
/// those named fields instead.
pub fn from_for_all_unnamed_variants(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let enum_name = &input.ident;
    let (impl_generics, type_generics, where_clause) = input.generics.split_for_impl();

    let variants = match single_field_variants(&input.data) {
        Some(variants) => variants,
        None => {
            return syn::Error::new_spanned(
                enum_name,
                "the 'FromForAllUnnamedVariants' derive macro can only be used with enums",
            )
            .to_compile_error()
            .into();
        }
    };

    let names = variants.iter().map(|(name, _)| name);
    let types = variants.iter().map(|(_, ty)| ty);

    quote! {
        #(impl #impl_generics From<#types> for #enum_name #type_generics #where_clause {
            fn from(v: #types) -> Self {
                #enum_name::#names(v)
            }
        })*
    }
    .into()
}
