use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Fields, ItemStruct};

pub fn expand_slice(input: ItemStruct) -> TokenStream {
    if matches!(input.fields, Fields::Unnamed(_)) {
        return syn::Error::new_spanned(&input.ident, "remit_slice requires named fields")
            .to_compile_error();
    }

    let wrapper_ident = &input.ident;
    let vis = &input.vis;
    let fields = &input.fields;
    let attrs = &input.attrs;
    let generics = &input.generics;
    if !generics.params.is_empty() {
        return syn::Error::new_spanned(generics, "remit_slice does not support generics")
            .to_compile_error();
    }

    let inner_ident = format_ident!("{wrapper_ident}Inner");
    let inner_doc = format!("Shared state behind [`{wrapper_ident}`].");
    let inner_body = match fields {
        Fields::Unit => quote! { {} },
        other => quote! { #other },
    };

    quote! {
        #[doc = #inner_doc]
        #[derive(Debug, Clone)]
        #vis struct #inner_ident #inner_body

        #(#attrs)*
        #[derive(Debug, Clone)]
        #vis struct #wrapper_ident {
            inner: std::sync::Arc<#inner_ident>,
        }

        impl #wrapper_ident {
            pub fn new(inner: #inner_ident) -> Self {
                Self { inner: std::sync::Arc::new(inner) }
            }

            /// Wraps the slice for registration in the API state.
            #[must_use]
            pub fn into_initialized(self) -> ::remit_kernel::domain::registry::InitializedSlice {
                ::remit_kernel::domain::registry::InitializedSlice::new(self)
            }
        }

        impl From<#inner_ident> for #wrapper_ident {
            fn from(inner: #inner_ident) -> Self {
                Self::new(inner)
            }
        }

        impl std::ops::Deref for #wrapper_ident {
            type Target = #inner_ident;

            fn deref(&self) -> &Self::Target {
                &self.inner
            }
        }

        impl ::remit_kernel::domain::registry::FeatureSlice for #wrapper_ident {
            fn as_any(&self) -> &dyn std::any::Any {
                self
            }
        }
    }
}
