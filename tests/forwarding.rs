use std::{collections::BTreeMap, sync::Arc};
use tracing_test::traced_test;
use weft::{Container, Lifetime::*, Provider, ResolveErrorKind, Tag};

trait Greeter: Send + Sync {
    fn greet(&self) -> String;
}

struct English;

impl Greeter for English {
    fn greet(&self) -> String {
        "hello".to_owned()
    }
}

struct Localized(String);

impl Greeter for Localized {
    fn greet(&self) -> String {
        self.0.clone()
    }
}

#[test]
#[traced_test]
fn test_forwarding_shares_lifetime() {
    let container = Container::new();
    let _ = container
        .register(None, Shared, |_| Ok(English))
        .implements::<dyn Greeter>(|english| english);

    let english = container.resolve::<English>(None).unwrap();
    let greeter_1 = container.resolve::<dyn Greeter>(None).unwrap();
    let greeter_2 = container.resolve::<dyn Greeter>(None).unwrap();

    assert_eq!(greeter_1.greet(), "hello");
    assert!(Arc::ptr_eq(&greeter_1, &greeter_2));
    assert!(std::ptr::addr_eq(Arc::as_ptr(&english), Arc::as_ptr(&greeter_1)));
}

#[test]
#[traced_test]
fn test_forwarding_with_tag_and_arguments() {
    let container = Container::new();
    let _ = container
        .register_with(Some(Tag::from("fr")), Unshared, |_, (name,): (String,)| {
            Ok(Localized(format!("bonjour {name}")))
        })
        .implements::<dyn Greeter>(|localized| localized);

    let greeter = container
        .resolve_with::<dyn Greeter, _>(Some(Tag::from("fr")), ("Ada".to_owned(),))
        .unwrap();
    assert_eq!(greeter.greet(), "bonjour Ada");

    assert!(container.contains::<dyn Greeter, (String,)>(Some(Tag::from("fr"))));
    assert!(matches!(
        container.resolve::<dyn Greeter>(Some(Tag::from("fr"))),
        Err(ResolveErrorKind::DefinitionNotFound { .. })
    ));
}

#[test]
#[traced_test]
fn test_forwarding_follows_replacement() {
    let container = Container::new();
    let _ = container
        .register(None, Unshared, |_| Ok(Localized("hi".to_owned())))
        .implements::<dyn Greeter>(|localized| localized);
    let _ = container.register(None, Unshared, |_| Ok(Localized("hey".to_owned())));

    let greeter = container.resolve::<dyn Greeter>(None).unwrap();
    assert_eq!(greeter.greet(), "hey");
}

struct Person {
    name: &'static str,
}

struct PeopleFixture {
    people: BTreeMap<u32, &'static str>,
}

impl Provider<u32, Person> for PeopleFixture {
    fn ids(&self) -> Vec<u32> {
        self.people.keys().copied().collect()
    }

    fn fetch(&self, id: &u32) -> Option<Person> {
        self.people.get(id).map(|name| Person { name })
    }
}

struct Directory {
    people: Arc<dyn Provider<u32, Person>>,
}

#[test]
#[traced_test]
fn test_provider_capability() {
    let container = Container::new();
    let _ = container
        .register(None, Shared, |_| {
            Ok(PeopleFixture {
                people: BTreeMap::from([(1, "Luke"), (4, "Leia")]),
            })
        })
        .implements::<dyn Provider<u32, Person>>(|fixture| fixture);
    let _ = container.register(None, Unshared, |resolver| {
        Ok(Directory {
            people: resolver.resolve(None)?,
        })
    });

    let directory = container.resolve::<Directory>(None).unwrap();
    assert_eq!(directory.people.ids(), [1, 4]);
    assert_eq!(directory.people.fetch(&4).unwrap().name, "Leia");
    assert!(directory.people.fetch(&2).is_none());
}
