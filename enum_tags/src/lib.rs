use proc_macro::TokenStream;
use quote::quote;

mod kw {
    syn::custom_keyword!(public);
    syn::custom_keyword!(private);
    syn::custom_keyword!(repr);
}

/// Parsed `public|private, repr(T)`.
struct EnumTagsArgs {
    visibility: syn::Visibility,
    repr_type: syn::Type,
}

impl syn::parse::Parse for EnumTagsArgs {
    fn parse(input: syn::parse::ParseStream) -> syn::Result<Self> {
        let lookahead = input.lookahead1();
        let visibility = if lookahead.peek(kw::public) {
            let keyword = input.parse::<kw::public>()?;
            syn::Visibility::Public(syn::token::Pub { span: keyword.span })
        } else if lookahead.peek(kw::private) {
            input.parse::<kw::private>()?;
            syn::Visibility::Inherited
        } else {
            return Err(lookahead.error());
        };

        input.parse::<syn::Token![,]>()?;
        input.parse::<kw::repr>()?;

        let content;
        syn::parenthesized!(content in input);
        let repr_type = content.parse()?;
        if !input.is_empty() {
            return Err(input.error("expected nothing after `repr(..)`"));
        }

        Ok(Self {
            visibility,
            repr_type,
        })
    }
}

/// Name of the per-variant helper attribute, e.g. `#[tag(0x13)]`.
const TAG_ATTRIBUTE: &str = "tag";

fn parse_int_literal(literal: &syn::LitInt) -> syn::Result<u64> {
    literal.base10_parse::<u64>()
}

/// Removes every `#[tag(..)]` from `variant` and returns the value of the
/// single one present, if any.
fn take_tag_attribute(variant: &mut syn::Variant) -> syn::Result<Option<u64>> {
    let mut found = None;
    let mut errors = vec![];

    variant.attrs.retain(|attribute| {
        if !attribute.path().is_ident(TAG_ATTRIBUTE) {
            return true;
        }
        let parsed = attribute.parse_args::<syn::LitInt>().and_then(|lit| {
            if found.is_some() {
                Err(syn::Error::new_spanned(
                    attribute,
                    "Only one `#[tag(..)]` is allowed per variant",
                ))
            } else {
                parse_int_literal(&lit)
            }
        });
        match parsed {
            Ok(value) => found = Some(value),
            Err(error) => errors.push(error),
        }
        false
    });

    let mut errors = errors.into_iter();
    match errors.next() {
        Some(mut first) => {
            errors.for_each(|error| first.combine(error));
            Err(first)
        }
        None => Ok(found),
    }
}

/// Tag value for one variant: the `#[tag(..)]` attribute wins, then a literal
/// discriminant, then one past the previous variant's tag.
fn resolve_tag(variant: &mut syn::Variant, next: u64) -> syn::Result<u64> {
    if let Some(tag) = take_tag_attribute(variant)? {
        return Ok(tag);
    }

    match &variant.discriminant {
        Some((_, syn::Expr::Lit(syn::ExprLit {
            lit: syn::Lit::Int(int_literal),
            ..
        }))) => parse_int_literal(int_literal),
        Some((_, other)) => Err(syn::Error::new_spanned(
            other,
            "Only literal discriminants are allowed",
        )),
        None => Ok(next),
    }
}

fn impl_enum_tags(
    enum_visibility: syn::Visibility,
    enum_name: &syn::Ident,
    repr_type: syn::Type,
    variants: impl Iterator<Item = (syn::Ident, syn::Fields, u64)>,
) -> proc_macro2::TokenStream {
    let mut tag_idents = vec![];
    let mut match_cases = vec![];

    for (variant_name, fields, tag) in variants {
        let tag_ident = quote::format_ident!(
            "{}_TAG",
            variant_name.to_string().to_ascii_uppercase()
        );
        let tag_literal = proc_macro2::Literal::u64_unsuffixed(tag);

        tag_idents.push(quote! {
            #[doc = concat!("`#[enum_tags]`-generated tag for the variant `Self::", stringify!(#variant_name), "`.")]
            #enum_visibility const #tag_ident: #repr_type = #tag_literal;
        });

        match fields {
            syn::Fields::Named(_) => {
                match_cases.push(quote! {
                    Self::#variant_name { .. } => Self::#tag_ident
                });
            }
            syn::Fields::Unnamed(_) => {
                match_cases.push(quote! {
                    Self::#variant_name(..) => Self::#tag_ident
                });
            }
            syn::Fields::Unit => {
                match_cases.push(quote! {
                    Self::#variant_name => Self::#tag_ident
                });
            }
        }
    }

    quote! {
        impl #enum_name {
            #(#tag_idents)*

            #[doc = "`#[enum_tags]`-generated getter for this variant's tag."]
            #enum_visibility const fn tag(&self) -> #repr_type {
                match self {
                    #(#match_cases),*
                }
            }
        }
    }
}

/// Constructs an `impl` for the given `enum` with a constant holding the tag
/// value of each variant, plus a `tag()` getter.
///
/// Usage examples:
///
/// * `#[enum_tags(public, repr(u8))]`
/// * `#[enum_tags(private, repr(u32))]`
///
/// A variant's tag comes from a `#[tag(0x13)]` helper attribute when present,
/// which lets enums whose variants carry data pin the tags of an external
/// format. Otherwise a literal discriminant is used, and otherwise the tag is
/// one past the previous variant's. The helper attributes are stripped from
/// the emitted `enum`.
///
/// Note that the `repr` type can be any integer type the tag literals fit in;
/// it is not the same as the type for which you may `#[repr(...)]` the `enum`.
#[proc_macro_attribute]
pub fn enum_tags(args: TokenStream, input: TokenStream) -> TokenStream {
    let args = syn::parse_macro_input!(args as EnumTagsArgs);

    let mut input_item = syn::parse_macro_input!(input as syn::DeriveInput);

    let data_enum = match &mut input_item.data {
        syn::Data::Enum(data_enum) => data_enum,
        syn::Data::Struct(syn::DataStruct {
            struct_token: syn::token::Struct { span },
            ..
        })
        | syn::Data::Union(syn::DataUnion {
            union_token: syn::token::Union { span },
            ..
        }) => {
            return syn::Error::new(*span, "Item must be an `enum`")
                .into_compile_error()
                .into();
        }
    };

    let mut resolved = vec![];
    let mut next = 0;
    for variant in data_enum.variants.iter_mut() {
        match resolve_tag(variant, next) {
            Ok(tag) => {
                resolved.push((
                    variant.ident.clone(),
                    variant.fields.clone(),
                    tag,
                ));
                next = tag + 1;
            }
            Err(error) => return error.into_compile_error().into(),
        }
    }

    let tags_impl = impl_enum_tags(
        args.visibility,
        &input_item.ident,
        args.repr_type,
        resolved.into_iter(),
    );

    quote! {
        #input_item

        #tags_impl
    }
    .into()
}
