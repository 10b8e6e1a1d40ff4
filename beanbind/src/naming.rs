//! Default XML names for types and properties.
//!
//! A property keeps its name in XML unless it is written in snake case, in
//! which case it is joined into lowerCamelCase. Root elements take the type's
//! simple name with its first letter lowered:
//!
//! - `struct Item` registered as `"Item"` → `<item>`
//! - property `display_name` → `displayName`
//! - property `childURL` → `childURL`
//! - accessor `getWrappedTags` → property `wrappedTags` → `<wrappedTags>`

use std::borrow::Cow;

use heck::{ToKebabCase, ToLowerCamelCase, ToShoutySnakeCase, ToSnakeCase, ToUpperCamelCase};

/// A type-wide naming convention for default element and attribute names.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaseRule {
    Lower,
    Upper,
    UpperCamel,
    LowerCamel,
    Snake,
    ShoutySnake,
    Kebab,
    ShoutyKebab,
}

impl CaseRule {
    /// Look a rule up by its serde spelling (`camelCase`, `kebab-case`, ...).
    pub fn from_name(rule: &str) -> Option<Self> {
        Some(match rule {
            "lowercase" => CaseRule::Lower,
            "UPPERCASE" => CaseRule::Upper,
            "PascalCase" | "UpperCamelCase" => CaseRule::UpperCamel,
            "camelCase" | "lowerCamelCase" => CaseRule::LowerCamel,
            "snake_case" => CaseRule::Snake,
            "SCREAMING_SNAKE_CASE" | "UPPER_SNAKE_CASE" => CaseRule::ShoutySnake,
            "kebab-case" => CaseRule::Kebab,
            "SCREAMING-KEBAB-CASE" | "UPPER-KEBAB-CASE" => CaseRule::ShoutyKebab,
            _ => return None,
        })
    }

    pub fn apply(self, name: &str) -> String {
        match self {
            CaseRule::Lower => name.to_lowercase(),
            CaseRule::Upper => name.to_uppercase(),
            CaseRule::UpperCamel => name.to_upper_camel_case(),
            CaseRule::LowerCamel => name.to_lower_camel_case(),
            CaseRule::Snake => name.to_snake_case(),
            CaseRule::ShoutySnake => name.to_shouty_snake_case(),
            CaseRule::Kebab => name.to_kebab_case(),
            CaseRule::ShoutyKebab => name.to_kebab_case().to_uppercase(),
        }
    }
}

/// The name a property answers to when nothing else is declared.
pub fn default_xml_name(property: &str) -> Cow<'_, str> {
    let name = if property.contains('_') {
        Cow::Owned(property.to_lower_camel_case())
    } else {
        Cow::Borrowed(property)
    };
    // XML names cannot start with a digit.
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        Cow::Owned(format!("_{name}"))
    } else {
        name
    }
}

/// The XML name of a property: the explicit name if one was declared,
/// otherwise the type's case rule, otherwise [`default_xml_name`].
pub fn xml_name(property: &str, explicit: Option<&str>, rule: Option<CaseRule>) -> String {
    match (explicit, rule) {
        (Some(name), _) => name.to_owned(),
        (None, Some(rule)) => rule.apply(property),
        (None, None) => default_xml_name(property).into_owned(),
    }
}

/// Lower-case the first character, leaving the rest alone.
pub fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The property an accessor method name refers to.
///
/// `getName`, `setName` and `isName` all map to `name`; the snake-case forms
/// `get_name`, `set_name` and `is_name` do too. Anything else is not an
/// accessor and yields `None`.
pub fn accessor_property(method: &str) -> Option<String> {
    for prefix in ["get", "set", "is"] {
        let Some(rest) = method.strip_prefix(prefix) else {
            continue;
        };
        if let Some(snake) = rest.strip_prefix('_') {
            if !snake.is_empty() {
                return Some(snake.to_owned());
            }
        } else if rest.starts_with(|c: char| c.is_uppercase()) {
            return Some(decapitalize(rest));
        }
    }
    None
}

/// Default root element name for a type's simple name.
pub fn root_element_name(type_name: &str) -> String {
    decapitalize(type_name)
}
