//! Procedural macros for pcf-tester

use darling::{FromDeriveInput, FromVariant};
use proc_macro::TokenStream;
use proc_macro2::Ident;
use quote::{format_ident, quote};
use std::collections::BTreeMap;
use syn::{parse_macro_input, DeriveInput};

/// Container-level attributes for #[derive(Action)]
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(action), supports(enum_any))]
struct ActionOpts {
    ident: syn::Ident,
    data: darling::ast::Data<ActionVariant, ()>,

    /// Case applied to variant names: "camelCase" or "snake_case"
    #[darling(default)]
    rename_all: Option<String>,
}

/// Variant-level attributes
#[derive(Debug, FromVariant)]
#[darling(attributes(action))]
struct ActionVariant {
    ident: syn::Ident,
    fields: darling::ast::Fields<()>,

    /// Explicit name, wins over `rename_all`
    #[darling(default)]
    rename: Option<String>,

    /// Category this variant belongs to
    #[darling(default)]
    category: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum RenameRule {
    Camel,
    Snake,
}

impl RenameRule {
    fn parse(rule: &str) -> Option<Self> {
        match rule {
            "camelCase" => Some(Self::Camel),
            "snake_case" => Some(Self::Snake),
            _ => None,
        }
    }

    fn apply(self, variant: &str) -> String {
        match self {
            Self::Camel => to_camel_case(variant),
            Self::Snake => to_snake_case(variant),
        }
    }
}

/// Convert PascalCase to snake_case
fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, ch) in s.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else {
            result.push(ch);
        }
    }
    result
}

/// Convert PascalCase to camelCase
fn to_camel_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
    }
}

/// Convert snake_case to PascalCase
fn to_pascal_case(s: &str) -> String {
    s.split('_')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            }
        })
        .collect()
}

fn is_valid_category(cat: &str) -> bool {
    !cat.is_empty()
        && cat
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && !cat.starts_with(|c: char| c.is_ascii_digit())
}

/// Derive macro for the Action trait
///
/// Generates a `name()` method returning the variant name as a static string.
/// The name is what shows up in tracing output and in the event log, so it
/// can be adjusted:
///
/// - `#[action(rename_all = "camelCase")]` on the enum renames every variant
/// - `#[action(rename = "...")]` on a variant sets its name outright
///
/// When any variant carries `#[action(category = "...")]`, also generates:
/// - `category() -> Option<&'static str>`
/// - `{Name}Category` enum with all categories plus `Uncategorized`
/// - `category_enum() -> {Name}Category`
/// - `is_{category}()` predicates
/// - an `ActionCategory` impl
///
/// # Example
/// ```ignore
/// #[derive(Action, Clone, Debug)]
/// #[action(rename_all = "camelCase")]
/// enum Msg {
///     #[action(category = "lifecycle")]
///     UpdateView,
///     #[action(rename = "Command")]
///     Command(String),
///     Tick,
/// }
///
/// assert_eq!(Msg::UpdateView.name(), "updateView");
/// assert_eq!(Msg::Command("add".into()).name(), "Command");
/// assert!(Msg::UpdateView.is_lifecycle());
/// assert_eq!(Msg::Tick.category(), None);
/// ```
#[proc_macro_derive(Action, attributes(action))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let opts = match ActionOpts::from_derive_input(&input) {
        Ok(opts) => opts,
        Err(e) => return e.write_errors().into(),
    };

    let name = &opts.ident;

    let variants = match &opts.data {
        darling::ast::Data::Enum(variants) => variants,
        _ => {
            return syn::Error::new_spanned(&input, "Action can only be derived for enums")
                .to_compile_error()
                .into();
        }
    };

    let rule = match opts.rename_all.as_deref() {
        None => None,
        Some(raw) => match RenameRule::parse(raw) {
            Some(rule) => Some(rule),
            None => {
                return syn::Error::new_spanned(
                    &input.ident,
                    format!("unsupported rename_all rule {raw:?}, expected \"camelCase\" or \"snake_case\""),
                )
                .to_compile_error()
                .into();
            }
        },
    };

    for v in variants.iter() {
        if let Some(cat) = &v.category {
            if !is_valid_category(cat) {
                return syn::Error::new_spanned(
                    &v.ident,
                    format!("category {cat:?} must be a snake_case identifier"),
                )
                .to_compile_error()
                .into();
            }
        }
    }

    let name_arms = variants.iter().map(|v| {
        let variant_name = &v.ident;
        let variant_str = match (&v.rename, rule) {
            (Some(explicit), _) => explicit.clone(),
            (None, Some(rule)) => rule.apply(&variant_name.to_string()),
            (None, None) => variant_name.to_string(),
        };

        match &v.fields.style {
            darling::ast::Style::Unit => quote! {
                #name::#variant_name => #variant_str
            },
            darling::ast::Style::Tuple => quote! {
                #name::#variant_name(..) => #variant_str
            },
            darling::ast::Style::Struct => quote! {
                #name::#variant_name { .. } => #variant_str
            },
        }
    });

    let mut expanded = quote! {
        impl ::pcf_tester::Action for #name {
            fn name(&self) -> &'static str {
                match self {
                    #(#name_arms),*
                }
            }
        }
    };

    let mut categories: BTreeMap<String, Vec<&Ident>> = BTreeMap::new();
    for v in variants.iter() {
        if let Some(category) = &v.category {
            categories.entry(category.clone()).or_default().push(&v.ident);
        }
    }

    if !categories.is_empty() {
        let category_enum_name = format_ident!("{}Category", name);
        let category_variants: Vec<_> = categories
            .keys()
            .map(|c| format_ident!("{}", to_pascal_case(c)))
            .collect();
        let category_variant_names: Vec<_> = categories.keys().cloned().collect();

        let category_arms: Vec<_> = variants
            .iter()
            .map(|v| {
                let variant = &v.ident;
                let cat_expr = match &v.category {
                    Some(c) => quote! { ::core::option::Option::Some(#c) },
                    None => quote! { ::core::option::Option::None },
                };
                quote! { #name::#variant { .. } => #cat_expr }
            })
            .collect();

        let category_enum_arms: Vec<_> = variants
            .iter()
            .map(|v| {
                let variant = &v.ident;
                let cat_variant = match &v.category {
                    Some(c) => format_ident!("{}", to_pascal_case(c)),
                    None => format_ident!("Uncategorized"),
                };
                quote! { #name::#variant { .. } => #category_enum_name::#cat_variant }
            })
            .collect();

        let predicates: Vec<_> = categories
            .iter()
            .map(|(cat, members)| {
                let predicate_name = format_ident!("is_{}", cat);
                let patterns: Vec<_> = members
                    .iter()
                    .map(|v| quote! { #name::#v { .. } })
                    .collect();
                let doc = format!(
                    "Returns true if this action belongs to the `{}` category.",
                    cat
                );

                quote! {
                    #[doc = #doc]
                    pub fn #predicate_name(&self) -> bool {
                        matches!(self, #(#patterns)|*)
                    }
                }
            })
            .collect();

        let category_enum_doc = format!(
            "Action categories for [`{}`].\n\n\
             Use [`{}::category_enum()`] to get the category of an action.",
            name, name
        );

        expanded = quote! {
            #expanded

            #[doc = #category_enum_doc]
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
            pub enum #category_enum_name {
                #(#category_variants,)*
                /// Actions that don't belong to any specific category.
                Uncategorized,
            }

            impl #category_enum_name {
                /// Get all category values
                pub fn all() -> &'static [Self] {
                    &[#(Self::#category_variants,)* Self::Uncategorized]
                }

                /// Get category name as string
                pub fn name(&self) -> &'static str {
                    match self {
                        #(Self::#category_variants => #category_variant_names,)*
                        Self::Uncategorized => "uncategorized",
                    }
                }
            }

            impl #name {
                /// Get the action's category (if categorized)
                pub fn category(&self) -> ::core::option::Option<&'static str> {
                    match self {
                        #(#category_arms,)*
                    }
                }

                /// Get the category as an enum value
                pub fn category_enum(&self) -> #category_enum_name {
                    match self {
                        #(#category_enum_arms,)*
                    }
                }

                #(#predicates)*
            }

            impl ::pcf_tester::ActionCategory for #name {
                fn category(&self) -> ::core::option::Option<&'static str> {
                    #name::category(self)
                }
            }
        };
    }

    TokenStream::from(expanded)
}
