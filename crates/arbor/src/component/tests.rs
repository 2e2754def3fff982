use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use arbor_core::{Object, ObjectId, Subscription};
use parking_lot::Mutex;

use super::*;
use crate::converter::ParseConverter;
use crate::error::{StructuralError, ValidationError};
use crate::event::{InputEvent, PropertyChangeEvent, StructureChange, property};
use crate::model::{ListSelectModel, SelectionMode, ValueModel};
use crate::validator::{RangeValidator, RequiredValidator};

// =============================================================================
// Helpers
// =============================================================================

/// A leaf that records the input it handles.
struct Probe {
    base: ComponentBase,
    log: Arc<Mutex<Vec<ObjectId>>>,
    consumes: bool,
}

impl Object for Probe {
    fn object_id(&self) -> ObjectId {
        self.base.id()
    }
}

impl Component for Probe {
    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn handle_input(&self, event: &mut InputEvent) {
        self.log.lock().push(self.base.id());
        if self.consumes {
            event.consume();
        }
    }
}

fn probe(log: &Arc<Mutex<Vec<ObjectId>>>, consumes: bool) -> Arc<Probe> {
    install(Probe {
        base: ComponentBase::new::<Probe>(),
        log: log.clone(),
        consumes,
    })
}

fn required_field() -> Arc<ValueControl<String>> {
    let model = ValueModel::<String>::new(None).with_validator(Arc::new(RequiredValidator));
    ValueControl::new(Arc::new(model))
}

fn record_properties(base: &ComponentBase) -> (Arc<Mutex<Vec<PropertyChangeEvent>>>, Subscription) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let subscription = base.property_changed.subscribe(move |event| {
        sink.lock().push(event.clone());
    });
    (events, subscription)
}

fn count_valid_events(base: &ComponentBase) -> (Arc<AtomicUsize>, Subscription) {
    let count = Arc::new(AtomicUsize::new(0));
    let counter = count.clone();
    let subscription = base.property_changed.subscribe(move |event| {
        if event.is(property::VALID) {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });
    (count, subscription)
}

// =============================================================================
// Validity
// =============================================================================

#[test]
fn test_listener_observes_post_change_validity() {
    let field = required_field();
    field.set_value(Some("x".into())).unwrap();
    assert!(field.is_valid());

    let observed = Arc::new(Mutex::new(Vec::new()));
    let sink = observed.clone();
    let weak = Arc::downgrade(&field);
    let _sub = field.base().property_changed.subscribe(move |event| {
        if event.is(property::VALUE)
            && let Some(field) = weak.upgrade()
        {
            sink.lock().push(field.is_valid());
        }
    });

    field.model().clear_value();
    field.set_value(Some("y".into())).unwrap();
    assert_eq!(*observed.lock(), vec![false, true]);
}

#[test]
fn test_validity_is_aggregated_from_shown_children() {
    let form = Panel::new();
    let name = required_field();
    let nickname = required_field();
    form.add_child(name.clone()).unwrap();
    form.add_child(nickname.clone()).unwrap();
    assert!(!form.is_valid());

    name.set_value(Some("Ada".into())).unwrap();
    assert!(!form.is_valid());

    nickname.base().set_visible(false);
    assert!(form.is_valid());

    // Validity changes of a hidden child leave the composite alone.
    nickname.set_value(Some("A".into())).unwrap();
    nickname.model().clear_value();
    assert!(form.is_valid());

    nickname.base().set_visible(true);
    assert!(!form.is_valid());

    nickname.base().set_displayed(false);
    assert!(form.is_valid());
}

#[test]
fn test_validity_propagates_through_levels() {
    let root = Panel::new();
    let section = Panel::new();
    let field = required_field();
    root.add_child(section.clone()).unwrap();
    section.add_child(field.clone()).unwrap();
    assert!(!root.is_valid());

    let (root_valid, _sub) = count_valid_events(root.base());
    field.set_value(Some("ok".into())).unwrap();
    assert!(section.is_valid());
    assert!(root.is_valid());
    assert_eq!(root_valid.load(Ordering::SeqCst), 1);
}

#[test]
fn test_valid_event_fires_only_on_change() {
    let field = required_field();
    let (events, _sub) = record_properties(field.base());

    // The first computation establishes the value silently.
    assert!(!field.is_valid());
    assert!(events.lock().iter().all(|e| !e.is(property::VALID)));

    field.set_value(Some("a".into())).unwrap();
    field.set_value(Some("b".into())).unwrap();
    let valid_events: Vec<_> = events
        .lock()
        .iter()
        .filter(|e| e.is(property::VALID))
        .cloned()
        .collect();
    assert_eq!(valid_events.len(), 1);
    assert_eq!(valid_events[0].old_value::<bool>(), Some(&false));
    assert_eq!(valid_events[0].new_value::<bool>(), Some(&true));
}

#[test]
fn test_validator_change_updates_validity() {
    let model = Arc::new(ValueModel::<i32>::new(Some(50)));
    let field = ValueControl::new(model.clone());
    assert!(field.is_valid());

    model.set_validator(Some(Arc::new(RangeValidator::<i32>::new(0, 10))));
    assert!(!field.is_valid());

    model.set_validator(None);
    assert!(field.is_valid());
}

#[test]
fn test_pending_literal_decides_validity() {
    let field = ValueControl::with_converter(
        Arc::new(ValueModel::<i32>::new(Some(1))),
        Arc::new(ParseConverter::new()),
    );
    assert!(field.is_valid());

    field.set_literal(Some("twelve".into()));
    assert!(!field.is_valid());
    assert_eq!(field.value(), Some(1));

    field.set_literal(Some("12".into()));
    assert!(field.is_valid());
    assert!(field.validate());
    assert_eq!(field.value(), Some(12));
}

fn numeric_field(initial: i32) -> Arc<ValueControl<i32>> {
    let model = ValueModel::<i32>::new(Some(initial))
        .with_validator(Arc::new(RangeValidator::<i32>::new(0, 10)));
    ValueControl::with_converter(Arc::new(model), Arc::new(ParseConverter::new()))
}

#[test]
fn test_set_value_drops_literal_before_listeners_run() {
    let field = numeric_field(1);
    field.set_literal(Some("abc".into()));
    assert!(!field.is_valid());

    let observed = Arc::new(Mutex::new(Vec::new()));
    let sink = observed.clone();
    let weak = Arc::downgrade(&field);
    let _sub = field.base().property_changed.subscribe(move |event| {
        if event.is(property::VALUE)
            && let Some(field) = weak.upgrade()
        {
            sink.lock().push(field.is_valid());
        }
    });

    field.set_value(Some(5)).unwrap();
    assert_eq!(*observed.lock(), vec![true]);
    assert!(field.is_valid());
    assert_eq!(field.is_valid(), field.determine_valid());
}

#[test]
fn test_set_value_to_current_value_drops_literal() {
    let field = numeric_field(5);
    field.set_literal(Some("abc".into()));
    assert!(!field.is_valid());

    field.set_value(Some(5)).unwrap();
    assert!(field.is_valid());
    assert_eq!(field.is_valid(), field.determine_valid());
    assert_eq!(field.literal().as_deref(), Some("5"));
}

#[test]
fn test_rejected_set_value_keeps_literal() {
    let field = numeric_field(5);
    field.set_literal(Some("7".into()));

    assert!(field.set_value(Some(99)).is_err());
    assert_eq!(field.literal().as_deref(), Some("7"));
    assert_eq!(field.value(), Some(5));
    assert!(field.is_valid());
}

// =============================================================================
// Validate and reset
// =============================================================================

#[test]
fn test_validate_attaches_and_clears_error_notification() {
    let form = Panel::new();
    let field = required_field();
    form.add_child(field.clone()).unwrap();

    assert!(!form.validate());
    let notification = field.base().notification().unwrap();
    assert!(notification.is_error());
    assert_eq!(notification.message(), "a value is required");

    field.set_value(Some("Ada".into())).unwrap();
    assert!(form.validate());
    assert_eq!(field.base().notification(), None);
}

#[test]
fn test_validate_keeps_informational_notification() {
    let field = required_field();
    field.set_value(Some("Ada".into())).unwrap();
    field.base().set_notification(Some(Notification::info("saved")));

    assert!(field.validate());
    assert_eq!(field.base().notification(), Some(Notification::info("saved")));
}

#[test]
fn test_validate_skips_hidden_children() {
    let form = Panel::new();
    let hidden = required_field();
    hidden.base().set_visible(false);
    form.add_child(hidden.clone()).unwrap();

    assert!(form.validate());
    assert_eq!(hidden.base().notification(), None);
}

#[test]
fn test_reset_restores_defaults_and_clears_notifications() {
    let form = Panel::new();
    let count = ValueControl::with_converter(
        Arc::new(ValueModel::<u32>::new(Some(3))),
        Arc::new(ParseConverter::new()),
    );
    let choice = ListControl::new(Arc::new(ListSelectModel::with_values(vec!["a", "b"])));
    form.add_child(count.clone()).unwrap();
    form.add_child(choice.clone()).unwrap();

    count.set_literal(Some("-1".into()));
    assert!(!form.validate());
    choice.set_selected_indices(&[1]).unwrap();

    form.reset();
    assert_eq!(count.value(), Some(3));
    assert_eq!(count.literal(), Some("3".into()));
    assert!(choice.selected_indices().is_empty());
    assert_eq!(count.base().notification(), None);
    assert!(form.is_valid());
}

// =============================================================================
// Event repetition
// =============================================================================

#[test]
fn test_model_events_are_repeated_with_original_target() {
    let model = Arc::new(ValueModel::<i32>::new(None));
    let field = ValueControl::new(model.clone());
    let (events, _sub) = record_properties(field.base());

    model.set_value(Some(4)).unwrap();

    let events = events.lock();
    let value = events.iter().find(|e| e.is(property::VALUE)).unwrap();
    assert_eq!(value.source(), field.object_id());
    assert_eq!(value.target(), model.object_id());
    assert_eq!(value.new_value::<Option<i32>>(), Some(&Some(4)));
}

#[test]
fn test_component_veto_rejects_model_change() {
    let model = Arc::new(ValueModel::<i32>::new(Some(1)));
    let field = ValueControl::new(model.clone());
    let target = Arc::new(Mutex::new(None));
    let seen = target.clone();
    let _veto = field.base().vetoable_change.subscribe(move |event: &PropertyChangeEvent| {
        *seen.lock() = Some(event.target());
        match event.new_value::<Option<i32>>() {
            Some(Some(v)) if *v < 0 => Err(ValidationError::new("negative")),
            _ => Ok(()),
        }
    });

    assert!(model.set_value(Some(-5)).is_err());
    assert_eq!(model.value(), Some(1));
    assert_eq!(*target.lock(), Some(model.object_id()));

    model.set_value(Some(5)).unwrap();
    assert_eq!(field.value(), Some(5));
}

#[test]
fn test_notification_target_survives_three_levels() {
    let root = Panel::new();
    let middle = Panel::new();
    let leaf_parent = Panel::new();
    let grandchild = required_field();
    root.add_child(middle.clone()).unwrap();
    middle.add_child(leaf_parent.clone()).unwrap();
    leaf_parent.add_child(grandchild.clone()).unwrap();

    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = received.clone();
    let _sub = root.base().notified.subscribe(move |event| {
        sink.lock().push((event.source(), event.target()));
    });

    grandchild
        .base()
        .set_notification(Some(Notification::warn("check spelling")));

    assert_eq!(
        *received.lock(),
        vec![(root.object_id(), grandchild.object_id())]
    );
}

#[test]
fn test_structure_events_are_repeated_upwards() {
    let root = Panel::new();
    let section = Panel::new();
    root.add_child(section.clone()).unwrap();

    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = received.clone();
    let _sub = root.base().structure_changed.subscribe(move |event| {
        sink.lock().push(*event);
    });

    let leaf = required_field();
    section.add_child(leaf.clone()).unwrap();
    section.remove_child(leaf.object_id()).unwrap();

    let received = received.lock();
    assert_eq!(received.len(), 2);
    assert_eq!(received[0].change(), StructureChange::ChildAdded);
    assert_eq!(received[0].source(), root.object_id());
    assert_eq!(received[0].composite(), section.object_id());
    assert_eq!(received[0].target(), leaf.object_id());
    assert_eq!(received[1].change(), StructureChange::ChildRemoved);
}

// =============================================================================
// Structure
// =============================================================================

#[test]
fn test_attach_rejects_second_parent() {
    let first = Panel::new();
    let second = Panel::new();
    let field = required_field();
    first.add_child(field.clone()).unwrap();

    let err = second.add_child(field.clone()).unwrap_err();
    assert_eq!(
        err,
        StructuralError::AlreadyParented {
            child: field.object_id(),
            parent: first.object_id(),
        }
    );
    assert_eq!(second.children().len(), 0);
}

#[test]
fn test_concurrent_attach_has_one_winner() {
    use std::sync::Barrier;

    for _ in 0..200 {
        let first = Panel::new();
        let second = Panel::new();
        let field = required_field();
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = [first.clone(), second.clone()]
            .into_iter()
            .map(|owner| {
                let field: Arc<dyn Component> = field.clone();
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    barrier.wait();
                    owner.add_child(field).is_ok()
                })
            })
            .collect();
        let wins: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(wins.iter().filter(|&&won| won).count(), 1);
        assert_eq!(first.children().len() + second.children().len(), 1);
        let winner = if wins[0] { first.object_id() } else { second.object_id() };
        assert_eq!(field.base().parent_id(), Some(winner));
    }
}

#[test]
fn test_failed_attach_leaves_child_unparented() {
    let root = Panel::new();
    let section = Panel::new();
    root.add_child(section.clone()).unwrap();

    let err = section.add_child(root.clone()).unwrap_err();
    assert!(matches!(err, StructuralError::CircularParentage { .. }));
    assert_eq!(root.base().parent_id(), None);

    let field = required_field();
    let err = root.insert_child(5, field.clone()).unwrap_err();
    assert!(matches!(err, StructuralError::IndexOutOfBounds { .. }));
    assert_eq!(field.base().parent_id(), None);

    let other = Panel::new();
    other.add_child(field.clone()).unwrap();
    assert_eq!(field.base().parent_id(), Some(other.object_id()));
}

#[test]
fn test_reattach_installs_listeners_once() {
    let first = Panel::new();
    let second = Panel::new();
    let field = required_field();
    let field_id = field.object_id();

    assert_eq!(field.base().property_changed.connection_count(), 0);
    first.add_child(field.clone()).unwrap();
    assert_eq!(field.base().property_changed.connection_count(), 3);
    assert_eq!(field.base().notified.connection_count(), 1);
    assert_eq!(field.base().structure_changed.connection_count(), 1);

    let detached = first.remove_child(field_id).unwrap();
    assert_eq!(detached.object_id(), field_id);
    assert!(field.parent().is_none());
    assert!(!first.composite().unwrap().is_listening_to(field_id));
    assert_eq!(field.base().property_changed.connection_count(), 0);
    assert_eq!(field.base().notified.connection_count(), 0);
    assert_eq!(field.base().structure_changed.connection_count(), 0);

    second.add_child(field.clone()).unwrap();
    assert_eq!(field.base().property_changed.connection_count(), 3);
    assert_eq!(field.base().notified.connection_count(), 1);
    assert!(!second.is_valid());

    let (first_valid, _a) = count_valid_events(first.base());
    let (second_valid, _b) = count_valid_events(second.base());
    field.set_value(Some("x".into())).unwrap();
    assert_eq!(second_valid.load(Ordering::SeqCst), 1);
    assert_eq!(first_valid.load(Ordering::SeqCst), 0);
}

#[test]
fn test_detach_restores_validity() {
    let form = Panel::new();
    let field = required_field();
    form.add_child(field.clone()).unwrap();
    assert!(!form.is_valid());

    form.remove_child(field.object_id()).unwrap();
    assert!(form.is_valid());
}

#[test]
fn test_structural_errors() {
    let root = Panel::new();
    let child = Panel::new();
    let leaf = required_field();
    root.add_child(child.clone()).unwrap();

    assert!(matches!(
        child.add_child(root.clone()),
        Err(StructuralError::CircularParentage { .. })
    ));
    assert!(matches!(
        root.add_child(root.clone()),
        Err(StructuralError::CircularParentage { .. })
    ));
    assert!(matches!(
        leaf.add_child(Panel::new()),
        Err(StructuralError::NotComposite { .. })
    ));
    assert!(matches!(
        root.insert_child(5, leaf.clone()),
        Err(StructuralError::IndexOutOfBounds { index: 5, len: 1 })
    ));
    assert!(matches!(
        root.remove_child(leaf.object_id()),
        Err(StructuralError::NotChild { .. })
    ));
}

#[test]
fn test_insert_child_keeps_order() {
    let root = Panel::new();
    let a = Panel::named("a");
    let b = Panel::named("b");
    let c = Panel::named("c");
    root.add_child(a.clone()).unwrap();
    root.add_child(c.clone()).unwrap();
    root.insert_child(1, b.clone()).unwrap();

    let names: Vec<String> = root.children().iter().map(|c| c.base().name()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    assert_eq!(root.composite().unwrap().index_of(c.object_id()), Some(2));
}

#[test]
fn test_children_snapshot_is_stable() {
    let root = Panel::new();
    root.add_child(Panel::new()).unwrap();
    let snapshot = root.children();
    root.add_child(Panel::new()).unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(root.children().len(), 2);
}

#[test]
fn test_listener_may_mutate_same_composite() {
    let root = Panel::new();
    let weak = Arc::downgrade(&root);
    let added = Arc::new(AtomicUsize::new(0));
    let counter = added.clone();
    let _sub = root.base().structure_changed.subscribe(move |event| {
        if event.change() == StructureChange::ChildAdded
            && counter.fetch_add(1, Ordering::SeqCst) == 0
            && let Some(root) = weak.upgrade()
        {
            root.add_child(Panel::new()).unwrap();
        }
    });

    root.add_child(Panel::new()).unwrap();
    assert_eq!(root.children().len(), 2);
}

// =============================================================================
// Input dispatch
// =============================================================================

#[test]
fn test_focus_takes_precedence_over_target() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let scope = Panel::focus_scope();
    let first = probe(&log, true);
    let second = probe(&log, true);
    scope.add_child(first.clone()).unwrap();
    scope.add_child(second.clone()).unwrap();

    let focused: Arc<dyn Component> = second.clone();
    assert!(scope.focus_group().unwrap().set_focus(&focused));

    let mut key = InputEvent::key("Enter").with_target(first.object_id());
    scope.dispatch_input(&mut key);
    assert!(key.is_consumed());
    assert_eq!(*log.lock(), vec![second.object_id()]);
}

#[test]
fn test_targeted_input_reaches_descendant() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let root = Panel::new();
    let section = Panel::new();
    let first = probe(&log, true);
    let deep = probe(&log, true);
    root.add_child(first.clone()).unwrap();
    root.add_child(section.clone()).unwrap();
    section.add_child(deep.clone()).unwrap();

    let mut click = InputEvent::click().with_target(deep.object_id());
    root.dispatch_input(&mut click);
    assert!(click.is_consumed());
    assert_eq!(*log.lock(), vec![deep.object_id()]);
}

#[test]
fn test_broadcast_stops_at_first_consumer() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let root = Panel::new();
    let passive = probe(&log, false);
    let active = probe(&log, true);
    let never = probe(&log, true);
    root.add_child(passive.clone()).unwrap();
    root.add_child(active.clone()).unwrap();
    root.add_child(never.clone()).unwrap();

    let mut command = InputEvent::command("refresh");
    root.dispatch_input(&mut command);
    assert!(command.is_consumed());
    assert_eq!(*log.lock(), vec![passive.object_id(), active.object_id()]);
}

#[test]
fn test_focus_scoped_input_without_focus_is_not_broadcast() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let scope = Panel::focus_scope();
    let leaf = probe(&log, false);
    scope.add_child(leaf.clone()).unwrap();

    // No focus: the key goes nowhere inside the scope.
    let mut key = InputEvent::key("a");
    scope.dispatch_input(&mut key);
    assert!(!key.is_consumed());
    assert!(log.lock().is_empty());
}

#[test]
fn test_focus_from_nested_component_uses_enclosing_scope() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let scope = Panel::focus_scope();
    let section = Panel::new();
    let leaf = probe(&log, true);
    scope.add_child(section.clone()).unwrap();
    section.add_child(leaf.clone()).unwrap();

    let focused: Arc<dyn Component> = leaf.clone();
    scope.focus_group().unwrap().set_focus(&focused);

    let mut key = InputEvent::key("Tab");
    section.dispatch_input(&mut key);
    assert_eq!(*log.lock(), vec![leaf.object_id()]);
}

// =============================================================================
// Focus
// =============================================================================

#[test]
fn test_focus_traversal_skips_disabled_and_wraps() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let scope = Panel::focus_scope();
    let a = probe(&log, false);
    let b = probe(&log, false);
    let c = probe(&log, false);
    for leaf in [&a, &b, &c] {
        scope.add_child(leaf.clone()).unwrap();
    }
    b.base().set_enabled(false);

    let group = scope.focus_group().unwrap();
    assert!(group.focus_next(scope.as_ref()));
    assert_eq!(group.focused_id(), Some(a.object_id()));
    group.focus_next(scope.as_ref());
    assert_eq!(group.focused_id(), Some(c.object_id()));
    group.focus_next(scope.as_ref());
    assert_eq!(group.focused_id(), Some(a.object_id()));
    group.focus_previous(scope.as_ref());
    assert_eq!(group.focused_id(), Some(c.object_id()));

    let disabled: Arc<dyn Component> = b.clone();
    assert!(!group.set_focus(&disabled));

    group.clear_focus();
    assert!(group.focused().is_none());
}

// =============================================================================
// Enableable
// =============================================================================

#[test]
fn test_shared_enableable_delegate() {
    let delegate = Arc::new(Enableable::new(true));
    let save = Panel::new();
    let export = Panel::new();
    save.base().set_enableable(Some(delegate.clone()));
    export.base().set_enableable(Some(delegate.clone()));

    let (events, _sub) = record_properties(save.base());
    delegate.set_enabled(false);
    assert!(!save.base().is_enabled());
    assert!(!export.base().is_enabled());

    let events = events.lock();
    let enabled = events.iter().find(|e| e.is(property::ENABLED)).unwrap();
    assert_eq!(enabled.source(), save.object_id());
    assert_eq!(enabled.target(), delegate.object_id());

    drop(events);
    export.base().set_enabled(true);
    assert!(save.base().is_enabled());
}

#[test]
fn test_removing_delegate_restores_own_flag() {
    let delegate = Arc::new(Enableable::new(false));
    let panel = Panel::new();
    panel.base().set_enableable(Some(delegate.clone()));
    assert!(!panel.base().is_enabled());
    assert_eq!(delegate.property_changed.connection_count(), 1);

    panel.base().set_enableable(None);
    assert!(panel.base().is_enabled());
    assert_eq!(delegate.property_changed.connection_count(), 0);
}

// =============================================================================
// Boolean select panel
// =============================================================================

#[test]
fn test_boolean_panel_mirrors_single_selection() {
    let model = Arc::new(ListSelectModel::with_values(vec!["red", "green", "blue"]));
    let panel = BooleanSelectPanel::new(model.clone());
    assert_eq!(panel.control_count(), 3);
    assert_eq!(panel.children().len(), 3);
    assert_eq!(panel.control(0).unwrap().value(), Some(false));

    panel.control(1).unwrap().set_value(Some(true)).unwrap();
    assert_eq!(model.selected_indices(), vec![1]);

    panel.control(2).unwrap().set_value(Some(true)).unwrap();
    assert_eq!(model.selected_indices(), vec![2]);
    assert_eq!(panel.control(1).unwrap().value(), Some(false));

    model.set_selected_indices(&[0]).unwrap();
    assert_eq!(panel.control(0).unwrap().value(), Some(true));
    assert_eq!(panel.control(2).unwrap().value(), Some(false));

    panel.control(0).unwrap().set_value(Some(false)).unwrap();
    assert!(!model.has_selection());
}

#[test]
fn test_boolean_panel_multi_selection() {
    let model = Arc::new(
        ListSelectModel::with_values(vec![1, 2, 3]).with_policy(SelectionMode::Multi.policy()),
    );
    let panel = BooleanSelectPanel::new(model.clone());

    panel.control(0).unwrap().set_value(Some(true)).unwrap();
    panel.control(2).unwrap().set_value(Some(true)).unwrap();
    assert_eq!(model.selected_indices(), vec![0, 2]);
    assert_eq!(model.selected_values(), vec![1, 3]);
}

#[test]
fn test_boolean_panel_follows_list_changes() {
    let model = Arc::new(ListSelectModel::with_values(vec!["a", "b"]));
    let panel = BooleanSelectPanel::new(model.clone());

    model.set_index_enabled(1, false).unwrap();
    assert!(!panel.control(1).unwrap().base().is_enabled());

    model.push("c");
    assert_eq!(panel.control_count(), 3);
    assert_eq!(panel.children().len(), 3);
    assert_eq!(panel.control(2).unwrap().base().name(), "option2");
    assert!(!panel.control(1).unwrap().base().is_enabled());
}

#[test]
fn test_boolean_panel_refused_check_is_reverted() {
    let model = Arc::new(
        ListSelectModel::with_values(vec!["a", "b"]).with_policy(SelectionMode::None.policy()),
    );
    let panel = BooleanSelectPanel::new(model.clone());

    panel.control(0).unwrap().set_value(Some(true)).unwrap();
    assert!(!model.has_selection());
    assert_eq!(panel.control(0).unwrap().value(), Some(false));
}

// =============================================================================
// Debug output
// =============================================================================

#[test]
fn test_tree_debug_reports_state() {
    let root = Panel::named("form");
    let field = required_field();
    field.base().set_name("email");
    root.add_child(field.clone()).unwrap();
    field.base().set_enabled(false);

    let options = TreeFormatOptions {
        style: TreeStyle::Ascii,
        show_state: true,
        ..TreeFormatOptions::minimal()
    };
    let text = ComponentTreeDebug::with_options(options).format(root.as_ref());
    assert!(text.starts_with("form"));
    assert!(text.contains("email invalid disabled"));
}
