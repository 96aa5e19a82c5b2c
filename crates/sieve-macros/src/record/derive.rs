//! Code generation for `#[derive(Record)]`.

use std::collections::HashSet;

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{spanned::Spanned, Data, DeriveInput, Error, Fields, Result};

use super::attrs::{parse_field_attrs, FieldType};

/// Expands `#[derive(Record)]` for a struct with named fields.
pub fn record_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(Error::new(
                    input.span(),
                    "Record can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                input.span(),
                "Record can only be derived for structs",
            ))
        }
    };

    let mut constants = Vec::new();
    let mut value_arms = Vec::new();
    let mut kind_arms = Vec::new();
    let mut seen = HashSet::new();

    for field in fields {
        let ident = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new(field.span(), "expected named field"))?;

        let attr = parse_field_attrs(&field.attrs)?;
        if attr.skip {
            continue;
        }
        let Some(ty) = attr.ty else {
            continue;
        };

        let path = attr.rename.unwrap_or_else(|| ident.to_string());
        if !seen.insert(path.clone()) {
            return Err(Error::new(
                attr.span,
                format!("field path '{path}' is declared more than once"),
            ));
        }

        let const_name = format_ident!("{}", to_screaming_snake_case(&path));
        constants.push(quote! {
            /// Field path constant for building criteria.
            pub const #const_name: &'static str = #path;
        });

        let value = match ty {
            FieldType::String => quote! {
                ::sieve::Value::String(::core::convert::AsRef::<str>::as_ref(&self.#ident))
            },
            FieldType::Number => quote! {
                ::sieve::Value::Number(::sieve::Number::from(self.#ident))
            },
            FieldType::Timestamp => quote! {
                ::sieve::Value::Timestamp(::sieve::IntoTimestamp::timestamp(&self.#ident))
            },
            FieldType::Enum => quote! {
                ::sieve::Value::Enum(::sieve::Discriminant::discriminant(&self.#ident))
            },
            FieldType::Bool => quote! {
                ::sieve::Value::Bool(self.#ident)
            },
        };
        value_arms.push(quote! { #path => #value, });

        let kind = ty.kind_tokens();
        kind_arms.push(quote! { #path => ::core::option::Option::Some(#kind), });
    }

    Ok(quote! {
        impl #impl_generics #struct_name #ty_generics #where_clause {
            #(#constants)*
        }

        impl #impl_generics ::sieve::Record for #struct_name #ty_generics #where_clause {
            fn field_value(&self, path: &str) -> ::sieve::Value<'_> {
                match path {
                    #(#value_arms)*
                    _ => ::sieve::Value::None,
                }
            }

            fn field_kind(path: &str) -> ::core::option::Option<::sieve::FieldKind> {
                match path {
                    #(#kind_arms)*
                    _ => ::core::option::Option::None,
                }
            }
        }
    })
}

/// Converts a field path to SCREAMING_SNAKE_CASE.
///
/// Dots and dashes become underscores, so `address.city` yields
/// `ADDRESS_CITY`.
fn to_screaming_snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    let mut prev_lower = false;

    for c in s.chars() {
        if c.is_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.push(c);
            prev_lower = false;
        } else if matches!(c, '_' | '-' | '.') {
            out.push('_');
            prev_lower = false;
        } else {
            out.push(c.to_ascii_uppercase());
            prev_lower = c.is_alphanumeric();
        }
    }

    out
}
