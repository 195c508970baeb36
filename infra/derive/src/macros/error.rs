use fxhash::FxHashSet;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Attribute, Data, DeriveInput, Fields, Ident, LitStr, Type, Variant};

/// How a variant is reported over the API.
enum ApiMapping {
    /// `#[api(code = "...", kind = ...)]`
    Code { code: LitStr, kind: Ident },
    /// `#[api(transparent)]`: code and kind come from the `source` field.
    Transparent,
}

struct VariantMeta<'a> {
    ident: &'a Ident,
    source_ty: Option<&'a Type>,
    source_field: Option<&'a Ident>,
    has_context: bool,
    cfg_attrs: Vec<Attribute>,
    api: Option<ApiMapping>,
}

pub fn expand_derive(mut input: DeriveInput) -> TokenStream {
    let name = input.ident.clone();
    let trait_name = format_ident!("{}Ext", name);

    let Data::Enum(data) = &mut input.data else {
        return quote! { compile_error!("remit_error can only be derived for enums"); };
    };

    let mut api_mappings = Vec::with_capacity(data.variants.len());
    for variant in &mut data.variants {
        match take_api_attr(variant) {
            Ok(mapping) => api_mappings.push(mapping),
            Err(err) => return err,
        }
    }

    let Data::Enum(data) = &input.data else {
        return quote! { compile_error!("remit_error can only be derived for enums"); };
    };
    let mut variants = Vec::with_capacity(data.variants.len());
    for (variant, api) in data.variants.iter().zip(api_mappings) {
        match parse_variant(variant, api) {
            Ok(meta) => variants.push(meta),
            Err(err) => return err,
        }
    }
    if let Some(err) = variants_error(&variants) {
        return err;
    }

    let derived_traits = derived_trait_names(&input.attrs);
    let mut derive_tokens = Vec::new();
    if !derived_traits.contains("Debug") {
        derive_tokens.push(quote! { Debug });
    }
    if !derived_traits.contains("Error") {
        derive_tokens.push(quote! { ::thiserror::Error });
    }
    let extra_derives = if derive_tokens.is_empty() {
        quote! {}
    } else {
        quote! { #[derive(#(#derive_tokens),*)] }
    };

    let context_impl = generate_context_trait(&name, &trait_name, &variants);
    let from_impls = variants.iter().filter_map(|v| generate_from_impl(&name, &trait_name, v));
    let internal_impls = generate_internal_impls(&name, &variants);
    let code_impl = generate_error_code_impl(&name, &variants);

    quote! {
        #[allow(non_shorthand_field_patterns)]
        #extra_derives
        #input

        #context_impl
        #(#from_impls)*
        #internal_impls
        #code_impl

        #[allow(dead_code)]
        fn format_context(context: &Option<std::borrow::Cow<'static, str>>) -> std::borrow::Cow<'static, str> {
            context.as_ref().map_or(std::borrow::Cow::Borrowed(""), |c| std::borrow::Cow::Owned(format!(" ({c})")))
        }
    }
}

/// Removes the `#[api(...)]` helper attribute so `thiserror` never sees it.
fn take_api_attr(variant: &mut Variant) -> Result<Option<ApiMapping>, TokenStream> {
    let Some(position) = variant.attrs.iter().position(|attr| attr.path().is_ident("api")) else {
        return Ok(None);
    };
    let attr = variant.attrs.remove(position);

    let mut code = None;
    let mut kind = None;
    let mut transparent = false;

    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("code") {
            code = Some(meta.value()?.parse::<LitStr>()?);
            return Ok(());
        }
        if meta.path.is_ident("kind") {
            kind = Some(meta.value()?.parse::<Ident>()?);
            return Ok(());
        }
        if meta.path.is_ident("transparent") {
            transparent = true;
            return Ok(());
        }
        Err(meta.error("expected `code = \"...\"`, `kind = ...` or `transparent`"))
    })
    .map_err(|err| err.to_compile_error())?;

    match (code, kind, transparent) {
        (None, None, true) => Ok(Some(ApiMapping::Transparent)),
        (Some(code), Some(kind), false) => Ok(Some(ApiMapping::Code { code, kind })),
        _ => Err(syn::Error::new_spanned(
            &attr,
            "api attribute takes either `code` and `kind` together, or `transparent` alone",
        )
        .to_compile_error()),
    }
}

fn parse_variant(v: &Variant, api: Option<ApiMapping>) -> Result<VariantMeta<'_>, TokenStream> {
    let Fields::Named(fields) = &v.fields else {
        return Err(syn::Error::new_spanned(
            v,
            "remit_error requires named fields for source/context handling",
        )
        .to_compile_error());
    };

    let context_field = find_context_field(fields)?;
    let source_field = find_source_field(fields);
    let cfg_attrs = v.attrs.iter().filter(|attr| attr.path().is_ident("cfg")).cloned().collect();

    if matches!(api, Some(ApiMapping::Transparent)) && source_field.is_none() {
        return Err(syn::Error::new_spanned(
            &v.ident,
            "api(transparent) requires a `source` field",
        )
        .to_compile_error());
    }

    Ok(VariantMeta {
        ident: &v.ident,
        source_ty: source_field.map(|field| &field.ty),
        source_field: source_field.and_then(|field| field.ident.as_ref()),
        has_context: context_field.is_some(),
        cfg_attrs,
        api,
    })
}

fn find_context_field(fields: &syn::FieldsNamed) -> Result<Option<&syn::Field>, TokenStream> {
    let Some(field) = fields
        .named
        .iter()
        .find(|field| field.ident.as_ref().is_some_and(|ident| ident == "context"))
    else {
        return Ok(None);
    };

    if is_context_type(&field.ty) {
        Ok(Some(field))
    } else {
        Err(syn::Error::new_spanned(&field.ty, "context field must be Option<Cow<'static, str>>")
            .to_compile_error())
    }
}

fn find_source_field(fields: &syn::FieldsNamed) -> Option<&syn::Field> {
    fields.named.iter().find(|field| {
        let is_source_name = field.ident.as_ref().is_some_and(|ident| ident == "source");
        is_source_name || field_has_attr(field, "source") || field_has_attr(field, "from")
    })
}

fn generate_context_trait(
    name: &Ident,
    trait_name: &Ident,
    variants: &[VariantMeta<'_>],
) -> TokenStream {
    let context_variants = variants.iter().filter(|v| v.has_context).map(|v| {
        let cfg_attrs = &v.cfg_attrs;
        let ident = v.ident;
        quote! { #(#cfg_attrs)* #name::#ident { context: c, .. } => *c = Some(context.into()), }
    });

    quote! {
        /// Attaches a human readable context to a failed result.
        pub trait #trait_name<T> {
            fn context(self, context: impl Into<std::borrow::Cow<'static, str>>) -> std::result::Result<T, #name>;
        }

        #[automatically_derived]
        impl<T> #trait_name<T> for std::result::Result<T, #name> {
            #[inline]
            #[allow(unreachable_patterns)]
            fn context(self, context: impl Into<std::borrow::Cow<'static, str>>) -> Self {
                self.map_err(|mut e| {
                    match &mut e {
                        #( #context_variants )*
                        _ => {}
                    }
                    e
                })
            }
        }
    }
}

fn generate_from_impl(
    name: &Ident,
    trait_name: &Ident,
    v: &VariantMeta<'_>,
) -> Option<TokenStream> {
    if v.ident == "Internal" {
        return None;
    }
    let source_ty = v.source_ty?;
    let source_field = v.source_field?;
    let v_ident = v.ident;
    let cfg_attrs = &v.cfg_attrs;

    Some(quote! {
        #(#cfg_attrs)*
        #[automatically_derived]
        impl From<#source_ty> for #name {
            #[inline]
            fn from(#source_field: #source_ty) -> Self { Self::#v_ident { #source_field, context: None } }
        }

        #(#cfg_attrs)*
        impl<T> #trait_name<T> for std::result::Result<T, #source_ty> {
            #[inline]
            fn context(self, context: impl Into<std::borrow::Cow<'static, str>>) -> std::result::Result<T, #name> {
                self.map_err(|#source_field| #name::#v_ident { #source_field, context: Some(context.into()) })
            }
        }
    })
}

fn generate_internal_impls(name: &Ident, variants: &[VariantMeta<'_>]) -> TokenStream {
    let Some(internal) = variants.iter().find(|v| v.ident == "Internal") else {
        return quote!();
    };
    let cfg_attrs = &internal.cfg_attrs;

    quote! {
        #(#cfg_attrs)*
        impl From<&'static str> for #name {
            #[inline]
            fn from(s: &'static str) -> Self { Self::Internal { message: std::borrow::Cow::Borrowed(s), context: None } }
        }
        #(#cfg_attrs)*
        impl From<String> for #name {
            #[inline]
            fn from(s: String) -> Self { Self::Internal { message: std::borrow::Cow::Owned(s), context: None } }
        }
    }
}

/// Emits `remit_kernel::error::ErrorCode` when at least one variant carries `#[api(...)]`.
/// Variants without a mapping are reported as internal errors.
fn generate_error_code_impl(name: &Ident, variants: &[VariantMeta<'_>]) -> TokenStream {
    if variants.iter().all(|v| v.api.is_none()) {
        return quote!();
    }

    let mut code_arms = Vec::new();
    let mut kind_arms = Vec::new();
    for v in variants {
        let ident = v.ident;
        let cfg_attrs = &v.cfg_attrs;
        match &v.api {
            Some(ApiMapping::Code { code, kind }) => {
                code_arms.push(quote! { #(#cfg_attrs)* Self::#ident { .. } => #code, });
                kind_arms.push(quote! {
                    #(#cfg_attrs)* Self::#ident { .. } => ::remit_kernel::error::ErrorKind::#kind,
                });
            }
            Some(ApiMapping::Transparent) => {
                let Some(field) = v.source_field else { continue };
                code_arms.push(quote! {
                    #(#cfg_attrs)* Self::#ident { #field, .. } => ::remit_kernel::error::ErrorCode::code(#field),
                });
                kind_arms.push(quote! {
                    #(#cfg_attrs)* Self::#ident { #field, .. } => ::remit_kernel::error::ErrorCode::kind(#field),
                });
            }
            None => {}
        }
    }

    quote! {
        #[automatically_derived]
        impl ::remit_kernel::error::ErrorCode for #name {
            #[allow(unreachable_patterns)]
            fn code(&self) -> &'static str {
                match self {
                    #( #code_arms )*
                    _ => ::remit_kernel::error::INTERNAL_ERROR,
                }
            }

            #[allow(unreachable_patterns)]
            fn kind(&self) -> ::remit_kernel::error::ErrorKind {
                match self {
                    #( #kind_arms )*
                    _ => ::remit_kernel::error::ErrorKind::Internal,
                }
            }
        }
    }
}

fn field_has_attr(field: &syn::Field, name: &str) -> bool {
    field.attrs.iter().any(|attr| attr.path().is_ident(name))
}

fn derived_trait_names(attrs: &[Attribute]) -> FxHashSet<String> {
    let mut traits = FxHashSet::default();

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("derive")) {
        let _ = attr.parse_nested_meta(|meta| {
            if let Some(ident) = meta.path.segments.last() {
                traits.insert(ident.ident.to_string());
            }
            Ok(())
        });
    }

    traits
}

fn variants_error(variants: &[VariantMeta<'_>]) -> Option<TokenStream> {
    variants.iter().find(|v| v.source_ty.is_some() && !v.has_context).map(|v| {
        syn::Error::new_spanned(
            v.ident,
            "remit_error requires `context: Option<Cow<'static, str>>` for variants with a source",
        )
        .to_compile_error()
    })
}

fn is_context_type(ty: &Type) -> bool {
    let Some(inner) = single_generic(ty, "Option") else {
        return false;
    };
    let Type::Path(inner_path) = inner else {
        return false;
    };
    let Some(cow) = inner_path.path.segments.last() else {
        return false;
    };
    if cow.ident != "Cow" {
        return false;
    }
    let syn::PathArguments::AngleBracketed(cow_args) = &cow.arguments else {
        return false;
    };
    let mut args = cow_args.args.iter();
    let Some(syn::GenericArgument::Lifetime(lt)) = args.next() else {
        return false;
    };
    let Some(syn::GenericArgument::Type(Type::Path(str_path))) = args.next() else {
        return false;
    };
    lt.ident == "static" && str_path.path.segments.last().is_some_and(|seg| seg.ident == "str")
}

fn single_generic<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        syn::GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}
