//! # kotbridge-macros
//!
//! Derive macros for kotbridge.
//!
//! `#[derive(Capturable)]` implements `kotbridge::runtime::Capturable` for a
//! struct that stores its captured source in an `Option<Source>` field.
//! The field is the one named `source`, or the one marked
//! `#[capturable(source)]`.
//!
//! ```rust,ignore
//! use kotbridge::runtime::{Capturable, Source};
//!
//! #[derive(kotbridge::Capturable)]
//! struct Script {
//!     body: fn() -> i32,
//!     source: Option<Source>,
//! }
//! ```
//!
//! Crates depending on `kotbridge-runtime` directly can point the generated
//! code at it with `#[capturable(crate = "kotbridge_runtime")]`.

#![forbid(unsafe_code)]

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, LitStr, Member, Path};

/// Derives `Capturable` for a struct with an `Option<Source>` field.
#[proc_macro_derive(Capturable, attributes(capturable))]
pub fn derive_capturable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let runtime = runtime_path(input)?;
    let field = source_field(input)?;
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics #runtime::Capturable for #name #ty_generics #where_clause {
            fn source(&self) -> ::core::result::Result<&#runtime::Source, #runtime::RuntimeError> {
                self.#field
                    .as_ref()
                    .ok_or(#runtime::RuntimeError::NoSource)
            }

            fn with_source(self, source: #runtime::Source) -> Self {
                let mut this = self;
                this.#field = ::core::option::Option::Some(source);
                this
            }
        }
    })
}

/// Path of the runtime crate, `::kotbridge::runtime` unless overridden.
fn runtime_path(input: &DeriveInput) -> syn::Result<Path> {
    let mut path: Path = syn::parse_quote!(::kotbridge::runtime);
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("capturable")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("crate") {
                let value: LitStr = meta.value()?.parse()?;
                path = value.parse()?;
                Ok(())
            } else {
                Err(meta.error("expected `crate = \"...\"`"))
            }
        })?;
    }
    Ok(path)
}

fn source_field(input: &DeriveInput) -> syn::Result<Member> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Capturable can only be derived for structs",
        ));
    };

    let mut marked = None;
    for (index, field) in data.fields.iter().enumerate() {
        for attr in field.attrs.iter().filter(|a| a.path().is_ident("capturable")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("source") {
                    Ok(())
                } else {
                    Err(meta.error("expected `source`"))
                }
            })?;
            if marked.is_some() {
                return Err(syn::Error::new_spanned(
                    attr,
                    "only one field can be marked `#[capturable(source)]`",
                ));
            }
            marked = Some(match &field.ident {
                Some(ident) => Member::Named(ident.clone()),
                None => Member::Unnamed(index.into()),
            });
        }
    }
    if let Some(member) = marked {
        return Ok(member);
    }

    if let Fields::Named(fields) = &data.fields {
        if let Some(ident) = fields
            .named
            .iter()
            .filter_map(|f| f.ident.as_ref())
            .find(|ident| *ident == "source")
        {
            return Ok(Member::Named(ident.clone()));
        }
    }

    Err(syn::Error::new_spanned(
        &input.ident,
        "Capturable needs a `source: Option<Source>` field or a field marked `#[capturable(source)]`",
    ))
}
