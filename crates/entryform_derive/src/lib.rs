use proc_macro::TokenStream;
use proc_macro2::{Ident, Span, TokenStream as TokenStream2};
use proc_macro_crate::{FoundCrate, crate_name};
use quote::quote;
use syn::{Data, DeriveInput, Fields, GenericArgument, LitStr, PathArguments, Type, parse_macro_input};

/// Derives `FormModel` for a struct with named fields.
///
/// Each field reads the form field of the same name (or `#[form(key = "...")]`).
/// `Option<T>` fields are extracted as optional; every other field must be
/// bound to a required controller.
#[proc_macro_derive(FormModel, attributes(form))]
pub fn derive_form_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    if !input.generics.params.is_empty() {
        return syn::Error::new_spanned(
            input.ident,
            "FormModel derive currently supports only non-generic structs",
        )
        .to_compile_error()
        .into();
    }

    let model_ident = input.ident;

    let named_fields = match input.data {
        Data::Struct(data) => match data.fields {
            Fields::Named(fields) => fields.named,
            _ => {
                return syn::Error::new(
                    Span::call_site(),
                    "FormModel derive requires a struct with named fields",
                )
                .to_compile_error()
                .into();
            }
        },
        _ => {
            return syn::Error::new(
                Span::call_site(),
                "FormModel derive is only supported on structs",
            )
            .to_compile_error()
            .into();
        }
    };

    let entryform = entryform_path();
    let mut extractors = Vec::new();
    let mut patch_entries = Vec::new();

    for field in named_fields {
        let Some(field_ident) = field.ident else {
            continue;
        };
        let key = match field_key(&field.attrs) {
            Ok(Some(key)) => key,
            Ok(None) => field_ident.to_string(),
            Err(error) => return error.to_compile_error().into(),
        };

        if is_option(&field.ty) {
            extractors.push(quote! {
                #field_ident: form.optional_value(#key)?
            });
            patch_entries.push(quote! {
                patch.insert_optional(#key, self.#field_ident);
            });
        } else {
            extractors.push(quote! {
                #field_ident: form.required_value(#key)?
            });
            patch_entries.push(quote! {
                patch.insert(#key, self.#field_ident);
            });
        }
    }

    quote! {
        impl #entryform::form::FormModel for #model_ident {
            fn from_form(
                form: &#entryform::form::Form,
            ) -> #entryform::form::FormResult<Self> {
                Ok(Self {
                    #(#extractors,)*
                })
            }

            fn into_patch(self) -> #entryform::form::FormPatch {
                let mut patch = #entryform::form::FormPatch::new();
                #(#patch_entries)*
                patch
            }
        }
    }
    .into()
}

fn field_key(attrs: &[syn::Attribute]) -> syn::Result<Option<String>> {
    let mut key = None;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("form")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("key") {
                let value: LitStr = meta.value()?.parse()?;
                key = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unsupported form attribute, expected `key = \"...\"`"))
            }
        })?;
    }
    Ok(key)
}

fn is_option(ty: &Type) -> bool {
    let Type::Path(path) = ty else {
        return false;
    };
    if path.qself.is_some() {
        return false;
    }
    let Some(segment) = path.path.segments.last() else {
        return false;
    };
    if segment.ident != "Option" {
        return false;
    }
    match &segment.arguments {
        PathArguments::AngleBracketed(args) => {
            args.args.len() == 1 && matches!(args.args.first(), Some(GenericArgument::Type(_)))
        }
        _ => false,
    }
}

fn entryform_path() -> TokenStream2 {
    match crate_name("entryform") {
        Ok(FoundCrate::Name(name)) => {
            let ident = Ident::new(&name, Span::call_site());
            quote!(::#ident)
        }
        Ok(FoundCrate::Itself) => quote!(crate),
        Err(_) => quote!(::entryform),
    }
}
