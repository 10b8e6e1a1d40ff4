//! Attribute bindings: default and custom names, inherited attributes across
//! access modes, and the fallback for unmapped attributes.

use beanbind::{AccessMode, Bean, BindingContext, Shape, UnmarshalError, ValueError};
use beanbind_node::{Element, parse};
use facet_testhelpers::test;

#[derive(Debug, Default)]
struct Grandparent {
    valid: bool,
    comment: String,
    ignore: bool,
    runnable: bool,
}

impl Bean for Grandparent {
    fn shape() -> Shape {
        Shape::builder::<Self>("Grandparent")
            .access(AccessMode::Property)
            .getter("isValid", |g| &mut g.valid)
            .attribute()
            .setter("setDescription", |g, text: String| g.comment = text)
            .attribute()
            .setter("setIgnore", |g, ignore: bool| g.ignore = ignore)
            .attribute_named("skip")
            .getter("isRunnable", |g| &mut g.runnable)
            .attribute_named("executable")
            .build()
    }
}

#[derive(Debug, Default)]
struct Parent {
    base: Grandparent,
    length: i64,
}

impl Bean for Parent {
    fn shape() -> Shape {
        Shape::builder::<Self>("Parent")
            .extends(|p| &mut p.base)
            .field("length", |p| &mut p.length)
            .attribute_named("duration")
            .build()
    }
}

#[derive(Debug, Default)]
struct Sample {
    parent: Parent,
    name: String,
    count: i32,
    label: Option<String>,
    notes: String,
}

impl Bean for Sample {
    fn shape() -> Shape {
        Shape::builder::<Self>("Sample")
            .extends(|s| &mut s.parent)
            .default_constructor()
            .field("name", |s| &mut s.name)
            .attribute()
            .field("count", |s| &mut s.count)
            .attribute_named("howMany")
            .field("label", |s| &mut s.label)
            .attribute()
            .field("notes", |s| &mut s.notes)
            .build()
    }
}

fn context() -> BindingContext {
    BindingContext::builder().root::<Sample>().build().unwrap()
}

fn doc(xml: &str) -> Element {
    parse(xml).unwrap()
}

// ============================================================================
// Names
// ============================================================================

#[test]
fn field_attributes_with_default_and_custom_names() {
    let sample: Sample = context()
        .unmarshal_as(&doc(r#"<sample name="first" howMany="3"/>"#))
        .unwrap();
    assert_eq!(sample.name, "first");
    assert_eq!(sample.count, 3);
    assert_eq!(sample.label, None);
}

#[test]
fn optional_attribute_is_filled_when_present() {
    let sample: Sample = context()
        .unmarshal_as(&doc(r#"<sample label="tagged"/>"#))
        .unwrap();
    assert_eq!(sample.label.as_deref(), Some("tagged"));
}

#[test]
fn prefixed_root_matches_by_local_name() {
    let sample: Sample = context()
        .unmarshal_as(&doc(r#"<x:sample xmlns:x="urn:sample" name="n"/>"#))
        .unwrap();
    assert_eq!(sample.name, "n");
}

#[test]
fn table_maps_attribute_names_to_properties() {
    let context = context();
    let table = context.table_of::<Sample>().unwrap();
    assert_eq!(table.attribute_property("name"), Some("name"));
    assert_eq!(table.attribute_property("howMany"), Some("count"));
    assert_eq!(table.attribute_property("duration"), Some("length"));
    assert_eq!(table.attribute_property("valid"), Some("valid"));
    assert_eq!(table.attribute_property("description"), Some("description"));
    assert_eq!(table.attribute_property("skip"), Some("ignore"));
    assert_eq!(table.attribute_property("executable"), Some("runnable"));
    assert_eq!(table.attribute_property("count"), None);
    assert!(table.class().has_property("notes"));
}

// ============================================================================
// Inheritance
// ============================================================================

#[test]
fn inherited_attributes_across_access_modes() {
    let sample: Sample = context()
        .unmarshal_as(&doc(
            r#"<sample name="child" duration="20" valid="true" description="from setter" skip="true" executable="true"/>"#,
        ))
        .unwrap();
    assert_eq!(sample.name, "child");
    assert_eq!(sample.parent.length, 20);
    let base = &sample.parent.base;
    assert!(base.valid);
    assert_eq!(base.comment, "from setter");
    assert!(base.ignore);
    assert!(base.runnable);
}

// ============================================================================
// Unmapped and invalid attributes
// ============================================================================

#[test]
fn unmapped_attribute_falls_back_to_property_name() {
    let sample: Sample = context()
        .unmarshal_as(&doc(r#"<sample notes="kept"/>"#))
        .unwrap();
    assert_eq!(sample.notes, "kept");
}

#[test]
fn namespace_declarations_are_not_properties() {
    let sample: Sample = context()
        .unmarshal_as(&doc(
            r#"<sample xmlns="urn:default" xmlns:extra="urn:extra" name="ns"/>"#,
        ))
        .unwrap();
    assert_eq!(sample.name, "ns");
}

#[test]
fn unknown_attribute_is_reported() {
    let err = context()
        .unmarshal(&doc(r#"<sample bogus="1"/>"#))
        .unwrap_err();
    assert!(matches!(
        err,
        UnmarshalError::UnknownProperty { bean: "Sample", ref property } if property == "bogus"
    ));
}

#[test]
fn unparsable_attribute_value_is_reported() {
    let err = context()
        .unmarshal(&doc(r#"<sample howMany="lots"/>"#))
        .unwrap_err();
    let UnmarshalError::Property {
        property, source, ..
    } = err
    else {
        panic!("expected a property error");
    };
    assert_eq!(property, "count");
    assert!(matches!(source, ValueError::Parse { ty: "i32", .. }));
}

// ============================================================================
// Casing rules
// ============================================================================

#[test]
fn rename_all_applies_to_default_names_only() {
    #[derive(Debug, Default)]
    struct Settings {
        max_size: u32,
        min_size: u32,
    }

    impl Bean for Settings {
        fn shape() -> Shape {
            Shape::builder::<Self>("Settings")
                .rename_all("kebab-case")
                .default_constructor()
                .field("max_size", |s| &mut s.max_size)
                .attribute()
                .field("min_size", |s| &mut s.min_size)
                .attribute_named("floor")
                .build()
        }
    }

    let context = BindingContext::builder().root::<Settings>().build().unwrap();
    let settings: Settings = context
        .unmarshal_as(&doc(r#"<settings max-size="10" floor="2"/>"#))
        .unwrap();
    assert_eq!(settings.max_size, 10);
    assert_eq!(settings.min_size, 2);
}

#[test]
fn default_attribute_names_are_lower_camel_case() {
    #[derive(Debug, Default)]
    struct Account {
        display_name: String,
    }

    impl Bean for Account {
        fn shape() -> Shape {
            Shape::builder::<Self>("Account")
                .default_constructor()
                .field("display_name", |a| &mut a.display_name)
                .attribute()
                .build()
        }
    }

    let context = BindingContext::builder().root::<Account>().build().unwrap();
    let account: Account = context
        .unmarshal_as(&doc(r#"<account displayName="Ada"/>"#))
        .unwrap();
    assert_eq!(account.display_name, "Ada");
}
