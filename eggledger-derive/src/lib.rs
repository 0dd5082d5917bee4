use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, Lit, Meta, Type};

/// Derive macro that describes the backup fields a record struct reads.
///
/// For each field, extracts:
/// - Field name (respects #[serde(rename = "...")])
/// - Required (false for Option<T> or #[serde(default)])
/// - Description (from doc comments)
///
/// Generates a `record_schema() -> &'static [SchemaField]` method. `SchemaField`
/// must be in scope where the derive is used.
#[proc_macro_derive(RecordSchema, attributes(serde))]
pub fn derive_record_schema(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => panic!("RecordSchema only supports structs with named fields"),
        },
        _ => panic!("RecordSchema only supports structs"),
    };

    let field_entries = fields.iter().map(|field| {
        let field_name = field.ident.as_ref().unwrap().to_string();
        let serde_args = serde_arguments(&field.attrs);

        let json_name = string_values(&serde_args, "rename")
            .into_iter()
            .next()
            .unwrap_or(field_name);
        let required = !is_option_type(&field.ty) && !has_default(&serde_args);
        let description = get_doc_comment(&field.attrs);

        quote! {
            SchemaField {
                name: #json_name,
                required: #required,
                description: #description,
            }
        }
    });

    let expanded = quote! {
        impl #name {
            pub fn record_schema() -> &'static [SchemaField] {
                static SCHEMA: &[SchemaField] = &[
                    #(#field_entries),*
                ];
                SCHEMA
            }
        }
    };

    TokenStream::from(expanded)
}

/// Token text of every #[serde(...)] attribute on a field.
fn serde_arguments(attrs: &[syn::Attribute]) -> Vec<String> {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("serde"))
        .filter_map(|attr| match &attr.meta {
            Meta::List(meta_list) => Some(meta_list.tokens.to_string()),
            _ => None,
        })
        .collect()
}

/// Collect the quoted values of `key = "..."` pairs.
fn string_values(serde_args: &[String], key: &str) -> Vec<String> {
    let mut values = Vec::new();
    for tokens in serde_args {
        for part in tokens.split(',') {
            let part = part.trim();
            let Some((lhs, rhs)) = part.split_once('=') else {
                continue;
            };
            if lhs.trim() != key {
                continue;
            }
            let rhs = rhs.trim();
            if let Some(stripped) = rhs.strip_prefix('"') {
                if let Some(end_quote) = stripped.find('"') {
                    values.push(stripped[..end_quote].to_string());
                }
            }
        }
    }
    values
}

fn has_default(serde_args: &[String]) -> bool {
    serde_args.iter().any(|tokens| {
        tokens
            .split(',')
            .any(|part| part.trim() == "default" || part.trim().starts_with("default ="))
    })
}

fn get_doc_comment(attrs: &[syn::Attribute]) -> String {
    attrs
        .iter()
        .filter_map(|attr| {
            if !attr.path().is_ident("doc") {
                return None;
            }
            if let Meta::NameValue(meta) = &attr.meta {
                if let syn::Expr::Lit(expr_lit) = &meta.value {
                    if let Lit::Str(lit_str) = &expr_lit.lit {
                        return Some(lit_str.value().trim().to_string());
                    }
                }
            }
            None
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_option_type(ty: &Type) -> bool {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            return segment.ident == "Option";
        }
    }
    false
}
