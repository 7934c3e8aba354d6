use heck::{ToKebabCase, ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};
use std::borrow::Cow;

/// Values a template can reference.
///
/// `slug`, `schema` and `exampleModel` are the core fields. The `slug*`
/// variants are case conversions of the slug for templates that need a type
/// name or a file name next to the route name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderContext {
    slug: String,
    schema: String,
    example_model: String,
}

impl RenderContext {
    /// Every field name [`RenderContext::get`] answers for.
    pub const FIELDS: &'static [&'static str] = &[
        "slug",
        "schema",
        "exampleModel",
        "slugPascal",
        "slugCamel",
        "slugSnake",
        "slugKebab",
    ];

    #[must_use]
    pub fn new(
        slug: impl Into<String>,
        schema: impl Into<String>,
        example_model: impl Into<String>,
    ) -> Self {
        Self {
            slug: slug.into(),
            schema: schema.into(),
            example_model: example_model.into(),
        }
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<Cow<'_, str>> {
        let value: Cow<'_, str> = match field {
            "slug" => Cow::Borrowed(&self.slug),
            "schema" => Cow::Borrowed(&self.schema),
            "exampleModel" => Cow::Borrowed(&self.example_model),
            "slugPascal" => Cow::Owned(self.slug.to_upper_camel_case()),
            "slugCamel" => Cow::Owned(self.slug.to_lower_camel_case()),
            "slugSnake" => Cow::Owned(self.slug.to_snake_case()),
            "slugKebab" => Cow::Owned(self.slug.to_kebab_case()),
            _ => return None,
        };
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_fields_are_returned_verbatim() {
        let context = RenderContext::new("userProfile", "{ \"type\": \"object\" }", "{}");
        assert_eq!(context.get("slug").as_deref(), Some("userProfile"));
        assert_eq!(
            context.get("schema").as_deref(),
            Some("{ \"type\": \"object\" }")
        );
        assert_eq!(context.get("exampleModel").as_deref(), Some("{}"));
    }

    #[test]
    fn slug_case_variants() {
        let context = RenderContext::new("user_profile", "{}", "{}");
        assert_eq!(context.get("slugPascal").as_deref(), Some("UserProfile"));
        assert_eq!(context.get("slugCamel").as_deref(), Some("userProfile"));
        assert_eq!(context.get("slugSnake").as_deref(), Some("user_profile"));
        assert_eq!(context.get("slugKebab").as_deref(), Some("user-profile"));
    }

    #[test]
    fn every_listed_field_resolves() {
        let context = RenderContext::new("a", "b", "c");
        for field in RenderContext::FIELDS {
            assert!(context.get(field).is_some(), "{field}");
        }
        assert_eq!(context.get("model"), None);
    }
}
