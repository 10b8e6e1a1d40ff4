use std::any::type_name;
use std::collections::HashMap;

use beanbind::{AdapterError, Bean, BindingContext, Shape, Subtype, UnmarshalError, XmlAdapter};
use beanbind_definition::{BeanDefinition, BeanFactory, Definition, PlaceholderError};
use beanbind_node::parse;
use facet_testhelpers::test;
use indoc::indoc;

#[derive(Default)]
struct SecondsAdapter;

impl XmlAdapter for SecondsAdapter {
    type Value = String;
    type Bound = u64;

    fn unmarshal(&self, text: String) -> Result<u64, AdapterError> {
        let digits = text
            .strip_suffix('s')
            .ok_or_else(|| format!("{text:?} is not a duration in seconds"))?;
        Ok(digits.parse()?)
    }
}

#[derive(Debug, Default, PartialEq)]
struct Listener {
    port: u16,
    tls: bool,
}

impl Bean for Listener {
    fn shape() -> Shape {
        Shape::builder::<Self>("Listener")
            .default_constructor()
            .field("port", |l| &mut l.port)
            .attribute()
            .field("tls", |l| &mut l.tls)
            .attribute()
            .build()
    }
}

#[derive(Debug, Default)]
struct Filter {
    order: i32,
}

impl Bean for Filter {
    fn shape() -> Shape {
        Shape::builder::<Self>("Filter")
            .field("order", |f| &mut f.order)
            .attribute()
            .build()
    }
}

#[derive(Debug, Default)]
struct RateLimit {
    filter: Filter,
    per_second: u32,
}

impl Bean for RateLimit {
    fn shape() -> Shape {
        Shape::builder::<Self>("RateLimit")
            .extends(|r| &mut r.filter)
            .default_constructor()
            .field("perSecond", |r| &mut r.per_second)
            .attribute()
            .build()
    }
}

#[derive(Debug, Default)]
struct Server {
    host: String,
    timeout: u64,
    listeners: Vec<Listener>,
    aliases: Vec<String>,
    filters: Vec<Subtype<Filter>>,
}

impl Bean for Server {
    fn shape() -> Shape {
        Shape::builder::<Self>("Server")
            .default_constructor()
            .field("host", |s| &mut s.host)
            .attribute()
            .field("timeout", |s| &mut s.timeout)
            .attribute()
            .adapter::<SecondsAdapter>()
            .field("listeners", |s| &mut s.listeners)
            .element_named("listener")
            .field("aliases", |s| &mut s.aliases)
            .wrapped()
            .element_named("alias")
            .field("filters", |s| &mut s.filters)
            .element_ref()
            .build()
    }
}

fn context() -> BindingContext {
    BindingContext::builder()
        .root::<Server>()
        .root::<RateLimit>()
        .build()
        .unwrap()
}

const SERVER: &str = indoc! {r#"
    <server host="${host:localhost}" timeout="${timeout}">
        <listener port="80"/>
        <aliases><alias>www</alias><alias>${alias}</alias></aliases>
        <rateLimit order="1" perSecond="50"/>
        <listener port="443" tls="true"/>
    </server>
"#};

fn properties() -> HashMap<String, String> {
    HashMap::from([
        ("timeout".to_owned(), "30s".to_owned()),
        ("alias".to_owned(), "api".to_owned()),
    ])
}

#[test]
fn definitions_record_the_walk_without_running_it() {
    let context = context();
    let definition = beanbind_definition::unmarshal(&context, &parse(SERVER).unwrap()).unwrap();

    assert_eq!(definition.bean_type, type_name::<Server>());
    assert_eq!(definition.simple_name(), "Server");
    let names: Vec<_> = definition.properties.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["host", "timeout", "listeners", "aliases", "filters"]);

    assert_eq!(definition.property("host").and_then(Definition::as_text), Some("${host:localhost}"));
    assert_eq!(
        definition.property("timeout"),
        Some(&Definition::Adapted {
            adapter: type_name::<SecondsAdapter>().to_owned(),
            argument: Box::new(Definition::text("${timeout}")),
        })
    );

    let listeners = definition.property("listeners").and_then(Definition::as_list).unwrap();
    assert_eq!(listeners.len(), 2);
    let second = listeners[1].as_bean().unwrap();
    assert_eq!(second.bean_type, type_name::<Listener>());
    assert_eq!(second.property("tls").and_then(Definition::as_text), Some("true"));

    let aliases = definition.property("aliases").and_then(Definition::as_list).unwrap();
    assert_eq!(aliases, [Definition::text("www"), Definition::text("${alias}")]);

    let filters = definition.property("filters").and_then(Definition::as_list).unwrap();
    assert_eq!(filters[0].as_bean().unwrap().simple_name(), "RateLimit");
}

#[test]
fn resolved_definitions_realize_into_objects() {
    let context = context();
    let mut definition =
        beanbind_definition::unmarshal(&context, &parse(SERVER).unwrap()).unwrap();
    definition.resolve_placeholders(&properties()).unwrap();

    let server: Server = BeanFactory::new(&context).realize_as(&definition).unwrap();
    assert_eq!(server.host, "localhost");
    assert_eq!(server.timeout, 30);
    assert_eq!(
        server.listeners,
        [Listener { port: 80, tls: false }, Listener { port: 443, tls: true }]
    );
    assert_eq!(server.aliases, ["www", "api"]);
    let limit = server.filters[0].downcast_ref::<RateLimit>().unwrap();
    assert_eq!((limit.filter.order, limit.per_second), (1, 50));
}

#[test]
fn realizing_matches_direct_unmarshalling() {
    let context = context();
    let xml = r#"<server host="h" timeout="5s"><listener port="1"/><aliases><alias>a</alias></aliases></server>"#;
    let element = parse(xml).unwrap();

    let direct: Server = context.unmarshal_as(&element).unwrap();
    let definition = beanbind_definition::unmarshal(&context, &element).unwrap();
    let factory = BeanFactory::new(&context);
    let first: Server = factory.realize_as(&definition).unwrap();
    let second: Server = factory.realize_as(&definition).unwrap();

    for realized in [&first, &second] {
        assert_eq!(realized.host, direct.host);
        assert_eq!(realized.timeout, direct.timeout);
        assert_eq!(realized.listeners, direct.listeners);
        assert_eq!(realized.aliases, direct.aliases);
    }
}

#[test]
fn adapter_errors_surface_when_realized() {
    let context = context();
    let definition = beanbind_definition::unmarshal(
        &context,
        &parse(r#"<server timeout="forever"/>"#).unwrap(),
    )
    .unwrap();
    let err = BeanFactory::new(&context).realize_bean(&definition).unwrap_err();
    assert!(matches!(err, UnmarshalError::Adapter { .. }));
}

#[test]
fn unresolved_placeholders_are_reported() {
    let context = context();
    let mut definition =
        beanbind_definition::unmarshal(&context, &parse(SERVER).unwrap()).unwrap();
    let err = definition.resolve_placeholders(&HashMap::new()).unwrap_err();
    assert_eq!(err, PlaceholderError::Unresolved { key: "timeout".into() });
}

#[test]
fn unknown_properties_fail_during_the_walk() {
    let err = beanbind_definition::unmarshal(&context(), &parse(r#"<server port="1"/>"#).unwrap())
        .unwrap_err();
    assert!(matches!(
        err,
        UnmarshalError::UnknownProperty { bean: "Server", ref property } if property == "port"
    ));
}

#[test]
fn unknown_classes_and_adapters_fail_to_realize() {
    let context = context();
    let factory = BeanFactory::new(&context);

    let err = factory
        .realize_bean(&BeanDefinition::new("nowhere::Ghost"))
        .unwrap_err();
    assert!(matches!(err, UnmarshalError::UnknownType { ref name } if name == "nowhere::Ghost"));

    let adapted = Definition::Adapted {
        adapter: "nowhere::Adapter".into(),
        argument: Box::new(Definition::text("x")),
    };
    assert!(matches!(
        factory.realize(&adapted),
        Err(UnmarshalError::UnknownType { .. })
    ));

    let err = factory
        .realize_as::<Listener>(&BeanDefinition::new(type_name::<Server>()))
        .unwrap_err();
    assert!(matches!(err, UnmarshalError::TypeMismatch { .. }));
}

#[test]
fn hand_written_definitions_realize_too() {
    let context = context();
    let definition = BeanDefinition::new(type_name::<Listener>())
        .with_property("port", Definition::text("8080"))
        .with_property("tls", Definition::text("true"));
    let listener: Listener = BeanFactory::new(&context).realize_as(&definition).unwrap();
    assert_eq!(listener, Listener { port: 8080, tls: true });
}

#[cfg(feature = "serde")]
#[test]
fn definitions_serialize_as_json() {
    let definition = BeanDefinition::new("app::Listener")
        .with_property("port", Definition::text("80"))
        .with_property(
            "timeout",
            Definition::Adapted {
                adapter: "app::Seconds".into(),
                argument: Box::new(Definition::text("5s")),
            },
        );
    let json = serde_json::to_value(&definition).unwrap();
    assert_eq!(json["bean_type"], "app::Listener");
    assert_eq!(json["properties"][0]["value"]["text"], "80");
    assert_eq!(json["properties"][1]["value"]["adapted"]["adapter"], "app::Seconds");

    let back: BeanDefinition = serde_json::from_value(json).unwrap();
    assert_eq!(back, definition);
}
