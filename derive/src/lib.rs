extern crate proc_macro;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{
    parse_macro_input, parse_quote, Attribute, Data, DeriveInput, Fields, Index, WherePredicate,
};

/// Attributes parsed from `#[value(...)]` annotations
///
/// * `skip` - Leave the field out of the produced value
/// * `rename` - Map key (or enum string) to use instead of the Rust name
#[derive(Debug, Clone, Default)]
struct ValueAttributes {
    skip: bool,
    rename: Option<String>,
}

/// Extract and parse `#[value(...)]` attributes
///
/// Multiple attributes can be combined: `#[value(rename = "id", skip)]`
fn get_value_attributes(attrs: &[Attribute]) -> syn::Result<ValueAttributes> {
    let mut parsed = ValueAttributes::default();
    for attr in attrs {
        if !attr.path().is_ident("value") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                parsed.skip = true;
                Ok(())
            } else if meta.path.is_ident("rename") {
                let lit: syn::LitStr = meta.value()?.parse()?;
                parsed.rename = Some(lit.value());
                Ok(())
            } else {
                Err(meta.error("unknown value attribute, expected `skip` or `rename`"))
            }
        })?;
    }
    Ok(parsed)
}

/// Derive macro implementing `From<T> for result_channel::Value`
///
/// - Named structs become a `Map` keyed by field name, in declaration order
/// - Tuple structs become a `List`
/// - Unit structs become `Null`
/// - Enums without fields become a `String` holding the variant name
///
/// Every included field type must implement `Into<Value>`.
///
/// # Examples
///
/// ```ignore
/// #[derive(IntoValue)]
/// struct Reply {
///     #[value(rename = "statusCode")]
///     status_code: i32,
///     #[value(skip)]
///     cache_key: String,
/// }
/// ```
#[proc_macro_derive(IntoValue, attributes(value))]
pub fn derive_into_value(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_into_value(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_into_value(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let mut bounds: Vec<WherePredicate> = Vec::new();

    let body = match &input.data {
        Data::Struct(s) => match &s.fields {
            Fields::Named(fields) => {
                let mut inserts = Vec::new();
                for f in &fields.named {
                    let attrs = get_value_attributes(&f.attrs)?;
                    if attrs.skip {
                        continue;
                    }
                    let Some(ident) = &f.ident else {
                        continue;
                    };
                    let key = attrs.rename.unwrap_or_else(|| ident.unraw().to_string());
                    let ty = &f.ty;
                    bounds.push(parse_quote!(#ty: ::core::convert::Into<::result_channel::Value>));
                    inserts.push(quote! {
                        map.insert(
                            ::result_channel::Value::from(#key),
                            ::core::convert::Into::into(value.#ident),
                        );
                    });
                }
                let count = inserts.len();
                quote! {
                    #[allow(unused_mut)]
                    let mut map = ::result_channel::ValueMap::with_capacity(#count);
                    #(#inserts)*
                    ::result_channel::Value::Map(map)
                }
            }
            Fields::Unnamed(fields) => {
                let mut items = Vec::new();
                for (i, f) in fields.unnamed.iter().enumerate() {
                    if get_value_attributes(&f.attrs)?.skip {
                        continue;
                    }
                    let index = Index::from(i);
                    let ty = &f.ty;
                    bounds.push(parse_quote!(#ty: ::core::convert::Into<::result_channel::Value>));
                    items.push(quote! { ::core::convert::Into::into(value.#index) });
                }
                quote! {
                    ::result_channel::Value::List(::std::vec![#(#items),*])
                }
            }
            Fields::Unit => quote! {
                let _ = value;
                ::result_channel::Value::Null
            },
        },
        Data::Enum(e) => {
            let mut arms = Vec::new();
            for v in &e.variants {
                if !matches!(v.fields, Fields::Unit) {
                    return Err(syn::Error::new_spanned(
                        v,
                        "IntoValue can only be derived for enums whose variants have no fields",
                    ));
                }
                let attrs = get_value_attributes(&v.attrs)?;
                let variant = &v.ident;
                let key = attrs
                    .rename
                    .unwrap_or_else(|| variant.unraw().to_string());
                arms.push(quote! {
                    #name::#variant => ::result_channel::Value::from(#key),
                });
            }
            quote! {
                match value {
                    #(#arms)*
                }
            }
        }
        Data::Union(u) => {
            return Err(syn::Error::new_spanned(
                u.union_token,
                "IntoValue cannot be derived for unions",
            ))
        }
    };

    let mut generics = input.generics.clone();
    if !generics.params.is_empty() {
        generics.make_where_clause().predicates.extend(bounds);
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::core::convert::From<#name #ty_generics> for ::result_channel::Value #where_clause {
            fn from(value: #name #ty_generics) -> Self {
                #body
            }
        }
    })
}
