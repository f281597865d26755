//! Entity derive macro implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, Result};

/// Field-level `#[orm(...)]` content, flattened to the runtime annotation form.
struct FieldTag {
    pairs: Vec<String>,
}

impl syn::parse::Parse for FieldTag {
    fn parse(input: syn::parse::ParseStream) -> Result<Self> {
        let mut pairs = Vec::new();

        // Raw form: #[orm("column=name,...")]
        if input.peek(syn::LitStr) {
            let raw: syn::LitStr = input.parse()?;
            if !input.is_empty() {
                return Err(input.error("unexpected tokens after raw orm annotation"));
            }
            return Ok(FieldTag {
                pairs: vec![raw.value()],
            });
        }

        // Key/value form: #[orm(column = "name", ...)]
        while !input.is_empty() {
            let key = syn::Ident::parse_any(input)?;
            let _: syn::Token![=] = input.parse()?;
            let value: syn::LitStr = input.parse()?;
            pairs.push(format!("{}={}", key.unraw(), value.value()));

            if input.peek(syn::Token![,]) {
                let _: syn::Token![,] = input.parse()?;
            } else {
                break;
            }
        }
        if !input.is_empty() {
            return Err(input.error("expected `key = \"value\"` pairs"));
        }

        Ok(FieldTag { pairs })
    }
}

/// Collect every `#[orm(...)]` on a field into one annotation string.
fn field_tag(field: &syn::Field) -> Result<String> {
    let mut pairs = Vec::new();
    for attr in &field.attrs {
        if attr.path().is_ident("orm") {
            let parsed: FieldTag = attr.parse_args()?;
            pairs.extend(parsed.pairs);
        }
    }
    Ok(pairs.join(","))
}

/// Extract the table name from a struct-level `#[orm(table = "...")]` attribute.
fn table_name(input: &DeriveInput) -> Result<Option<String>> {
    for attr in &input.attrs {
        if attr.path().is_ident("orm") {
            let nested = attr.parse_args::<syn::MetaNameValue>()?;
            if !nested.path.is_ident("table") {
                return Err(syn::Error::new_spanned(
                    &nested.path,
                    "unknown struct attribute, expected `table`",
                ));
            }
            if let syn::Expr::Lit(syn::ExprLit {
                lit: syn::Lit::Str(lit),
                ..
            }) = &nested.value
            {
                return Ok(Some(lit.value()));
            }
            return Err(syn::Error::new_spanned(
                &nested.value,
                "table name must be a string literal",
            ));
        }
    }
    Ok(None)
}

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let type_name = name.unraw().to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let data = match &input.data {
        Data::Struct(data) => data,
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Entity can only be derived for structs",
            ));
        }
    };

    let no_fields = syn::punctuated::Punctuated::<syn::Field, syn::Token![,]>::new();
    let (shape, fields) = match &data.fields {
        Fields::Named(fields) => (quote!(Named), &fields.named),
        // Other shapes still describe themselves; the registry rejects them.
        Fields::Unnamed(_) => (quote!(Tuple), &no_fields),
        Fields::Unit => (quote!(Unit), &no_fields),
    };

    let descriptors = fields
        .iter()
        .map(|field| {
            let ident = field
                .ident
                .as_ref()
                .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
            let ty = &field.ty;
            let field_name = ident.unraw().to_string();
            let tag = field_tag(field)?;

            Ok(quote! {
                ::sqlweave::FieldDescriptor {
                    name: #field_name,
                    tag: #tag,
                    field_type: <#ty as ::sqlweave::SqlType>::FIELD_TYPE,
                    offset: ::core::mem::offset_of!(Self, #ident),
                    get: |record: &Self| ::sqlweave::SqlType::to_value(&record.#ident),
                    set: |record: &mut Self, value: ::sqlweave::Value| {
                        record.#ident = <#ty as ::sqlweave::SqlType>::from_value(value)?;
                        ::core::result::Result::Ok(())
                    },
                    check: <#ty as ::sqlweave::SqlType>::check,
                }
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let table_fn = table_name(&input)?.map(|table| {
        quote! {
            fn table_name() -> &'static str {
                #table
            }
        }
    });

    Ok(quote! {
        impl #impl_generics ::sqlweave::Entity for #name #ty_generics #where_clause {
            fn describe() -> ::sqlweave::EntityDescriptor<Self> {
                ::sqlweave::EntityDescriptor {
                    type_name: #type_name,
                    shape: ::sqlweave::RecordShape::#shape,
                    fields: ::std::vec![#(#descriptors),*],
                }
            }

            #table_fn
        }
    })
}
