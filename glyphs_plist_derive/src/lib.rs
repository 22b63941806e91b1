//! Derive macro for reading Glyphs.app plist dictionaries into structs.
//!
//! Each named field is looked up under the camelCase version of its name,
//! unless overridden with `#[plist(rename = "key")]`. A field marked `#[rest]`
//! receives every key that was not consumed by another field.

extern crate proc_macro;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Field, Fields, Lit, Meta, NestedMeta};

#[proc_macro_derive(FromPlist, attributes(rest, plist))]
pub fn derive_from_plist(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match from_plist_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn from_plist_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "FromPlist can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "FromPlist can only be derived for structs",
            ))
        }
    };

    let mut inits = Vec::new();
    let mut rest = None;
    for field in fields {
        let ident = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "unnamed field"))?;
        if field.attrs.iter().any(|attr| attr.path.is_ident("rest")) {
            if rest.is_some() {
                return Err(syn::Error::new_spanned(field, "only one #[rest] field allowed"));
            }
            rest = Some(ident);
            continue;
        }
        let key = plist_key(field)?;
        inits.push(quote! {
            #ident: crate::from_plist::FromPlistOpt::from_option_plist(dict.remove(#key), #key)?
        });
    }
    let rest_init = match rest {
        Some(ident) => quote! { #ident: dict, },
        None => quote! {},
    };

    Ok(quote! {
        impl crate::from_plist::FromPlist for #name {
            #[allow(unused_mut)]
            fn from_plist(plist: crate::plist::Plist) -> ::std::result::Result<Self, crate::Error> {
                let mut dict = plist.into_dict()?;
                ::std::result::Result::Ok(#name {
                    #(#inits,)*
                    #rest_init
                })
            }
        }
    })
}

/// The dictionary key for a field: an explicit rename, or the camelCase name.
fn plist_key(field: &Field) -> syn::Result<String> {
    if let Some(attr) = field.attrs.iter().find(|attr| attr.path.is_ident("plist")) {
        if let Meta::List(list) = attr.parse_meta()? {
            for nested in list.nested.iter() {
                if let NestedMeta::Meta(Meta::NameValue(nv)) = nested {
                    if nv.path.is_ident("rename") {
                        if let Lit::Str(s) = &nv.lit {
                            return Ok(s.value());
                        }
                    }
                }
            }
        }
        return Err(syn::Error::new_spanned(
            attr,
            "expected #[plist(rename = \"key\")]",
        ));
    }
    let ident = field
        .ident
        .as_ref()
        .ok_or_else(|| syn::Error::new_spanned(field, "unnamed field"))?;
    Ok(camel_case(&ident.to_string()))
}

fn camel_case(snake: &str) -> String {
    let mut result = String::with_capacity(snake.len());
    let mut upper = false;
    for c in snake.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            result.extend(c.to_uppercase());
            upper = false;
        } else {
            result.push(c);
        }
    }
    result
}
