//! Integration tests for deep copy


use dynamapper_core::{
    ContainerFactory, ContainerKind, ContainerValue, CopyPolicy, Instance, MapperConfig,
    MapperError, TransformEngine, TypeHandle, Value,
};
use pretty_assertions::assert_eq;
use test_support::*;

#[test]
fn test_deep_copy_of_course() {
    let engine = school_engine();
    let student = create_student();
    let course = create_course(&[student]);

    let copy = engine.copy(&course).unwrap();

    assert!(copy.deep_eq(&course));
    assert!(!copy.ptr_eq(&course));
    assert_eq!(field(&copy, "title").as_text(), Some("Computer Science"));
    assert!(field(&copy, "title").ptr_eq(&field(&course, "title")));
}

#[test]
fn test_containers_are_rebuilt_by_advertised_name() {
    let engine = school_engine();
    let course = create_course(&[create_student(), create_student()]);
    let copy = engine.copy(&course).unwrap();

    let kinds: Vec<(String, ContainerKind, usize)> = ["students", "nightlyStudents", "studentWorkers"]
        .iter()
        .map(|name| {
            let value = field(&copy, name);
            let container = value.as_container().unwrap().borrow();
            (
                container.advertised_name().to_string(),
                container.kind(),
                container.len(),
            )
        })
        .collect();

    assert_eq!(
        kinds,
        vec![
            ("ArrayList".to_string(), ContainerKind::ArrayList, 2),
            ("LinkedList".to_string(), ContainerKind::LinkedList, 2),
            ("HashSet".to_string(), ContainerKind::HashSet, 2),
        ]
    );
}

#[test]
fn test_shared_references_stay_shared() {
    let engine = school_engine();
    let student = create_student();
    let course = create_course(&[student]);
    let copy = engine.copy(&course).unwrap();

    let in_list = field(&copy, "students").as_container().unwrap().borrow().elements()[0].clone();
    let in_set = field(&copy, "studentWorkers").as_container().unwrap().borrow().elements()[0].clone();
    let original = field(&course, "students").as_container().unwrap().borrow().elements()[0].clone();

    assert!(in_list.ptr_eq(&in_set));
    assert!(!in_list.ptr_eq(&original));
}

#[test]
fn test_copy_is_idempotent() {
    let engine = school_engine();
    let student = Value::Object(create_student());

    let once = engine.copy(&student).unwrap();
    let twice = engine.copy(&once).unwrap();

    assert!(twice.deep_eq(&once));
    assert!(!once.ptr_eq(&student));
    assert!(!twice.ptr_eq(&student));
    assert!(!twice.ptr_eq(&once));
}

#[test]
fn test_arrays_keep_component_and_length() {
    let engine = school_engine();
    let student = Value::Object(create_student());
    let copy = engine.copy(&student).unwrap();

    let original = field(&student, "subjects");
    let copied = field(&copy, "subjects");
    assert!(!copied.ptr_eq(&original));

    let copied = copied.as_array().unwrap().borrow();
    assert_eq!(copied.component(), &TypeHandle::object("Subject"));
    assert_eq!(copied.len(), 3);
    assert_eq!(field(&copied.items()[1], "shortDescription").as_text(), Some("PHYS1"));
}

#[test]
fn test_self_parent_points_at_clone() {
    let engine = school_engine();
    let person = create_person();
    person.borrow_mut().set("parent", Value::Object(person.clone()));

    let copy = engine.copy(&Value::Object(person)).unwrap();
    assert!(field(&copy, "parent").ptr_eq(&copy));
}

#[test]
fn test_unknown_container_name() {
    let engine = school_engine();
    let mut tree = ContainerValue::advertised_as("TreeSet", ContainerKind::HashSet).unwrap();
    tree.push(Value::from(3)).unwrap();
    let value = Value::container(tree);

    let err = engine.copy(&value).unwrap_err();
    assert!(matches!(err, MapperError::Instantiation { ref type_name, .. } if type_name == "TreeSet"));

    let mut factory = ContainerFactory::standard();
    factory.register("TreeSet", ContainerKind::HashSet);
    let engine = school_engine().with_container_factory(factory);
    let copy = engine.copy(&value).unwrap();
    assert_eq!(copy.as_container().unwrap().borrow().len(), 1);
}

#[test]
fn test_best_effort_policy_yields_null() {
    let engine = TransformEngine::bootstrap(
        school_registry(),
        MapperConfig::default().with_copy_policy(CopyPolicy::BestEffort),
    )
    .unwrap();

    let unknown = Value::object(Instance::new("Spaceship"));
    assert!(engine.copy(&unknown).unwrap().is_null());
    assert_eq!(engine.copy_policy(), CopyPolicy::BestEffort);
}

#[test]
fn test_leaves_are_returned_as_is() {
    let engine = school_engine();
    for leaf in [Value::from(5), Value::from(true), Value::from('x'), Value::from(1.5)] {
        let copy = engine.copy(&leaf).unwrap();
        assert!(copy.ptr_eq(&leaf));
    }
}
