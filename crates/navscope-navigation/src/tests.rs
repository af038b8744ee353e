#[cfg(test)]
mod tests {
    use crate::*;
    use navscope_core::{Scope, StoreError, ViewModel};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const NESTED: &str = "nestedMetaDataKey";

    #[derive(Clone, Debug, PartialEq)]
    enum Routes {
        Landing,
        Detail,
        SecondList,
        SecondListDetail,
    }

    struct SharedVm {
        instance: usize,
        cleared: Arc<AtomicUsize>,
    }

    impl ViewModel for SharedVm {
        fn on_cleared(&self) -> Result<(), StoreError> {
            self.cleared.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct Fixture {
        host: NavHost<Routes, Result<Option<Arc<SharedVm>>, NavError>>,
        cleared: Arc<AtomicUsize>,
        shared: Rc<SharedStoreDecorator>,
        entry_stores: Rc<EntryStoreDecorator>,
    }

    fn fixture(scope: &Scope, policy: RemovalPolicy) -> Fixture {
        let cleared = Arc::new(AtomicUsize::new(0));
        let created = Arc::new(AtomicUsize::new(0));
        let shared = Rc::new(SharedStoreDecorator::new(
            scope,
            SharedStoreConfig::default(),
            policy.clone(),
        ));
        let entry_stores = Rc::new(EntryStoreDecorator::new(scope, policy));

        let decorators: Vec<Rc<dyn EntryDecorator<Routes>>> = vec![
            Rc::new(SavedStateDecorator),
            entry_stores.clone(),
            shared.clone(),
        ];

        let c = cleared.clone();
        let host = NavHost::new(scope, NavBackStack::new(Routes::Landing), decorators, move |key| {
            let metadata = match key {
                Routes::SecondList | Routes::SecondListDetail => {
                    Metadata::new().with(NESTED, "second-screen")
                }
                _ => Metadata::new(),
            };
            let cleared = c.clone();
            let created = created.clone();
            entry(metadata, move |scope: &EntryScope<Routes>| -> Result<Option<Arc<SharedVm>>, NavError> {
                let Ok(owner) = scope.shared_owner() else {
                    return Ok(None);
                };
                let vm = owner.view_model("shared", |_| SharedVm {
                    instance: created.fetch_add(1, Ordering::SeqCst),
                    cleared: cleared.clone(),
                })?;
                Ok(Some(vm))
            })
        });

        Fixture {
            host,
            cleared,
            shared,
            entry_stores,
        }
    }

    fn render(f: &Fixture) -> Option<Arc<SharedVm>> {
        f.host.render().unwrap().unwrap().unwrap()
    }

    #[test]
    fn nested_graph_shares_view_model_until_last_pop() {
        let scope = Scope::new();
        let f = fixture(&scope, RemovalPolicy::always());
        let nav = f.host.navigator();

        assert!(render(&f).is_none());

        nav.push(Routes::SecondList);
        let list_vm = render(&f).unwrap();
        nav.push(Routes::SecondListDetail);
        let detail_vm = render(&f).unwrap();
        assert!(Arc::ptr_eq(&list_vm, &detail_vm));
        assert_eq!(f.shared.registry().member_count(&"second-screen".to_string()), 2);

        nav.pop();
        assert_eq!(f.cleared.load(Ordering::SeqCst), 0);
        assert!(Arc::ptr_eq(&render(&f).unwrap(), &list_vm));

        nav.pop();
        assert_eq!(f.cleared.load(Ordering::SeqCst), 1);
        assert_eq!(f.shared.registry().group_count(), 0);

        nav.push(Routes::SecondList);
        let fresh = render(&f).unwrap();
        assert!(!Arc::ptr_eq(&fresh, &list_vm));
        assert_eq!(fresh.instance, 1);
    }

    #[test]
    fn repeated_render_does_not_rebuild_store() {
        let scope = Scope::new();
        let f = fixture(&scope, RemovalPolicy::always());
        f.host.navigator().push(Routes::SecondList);

        let first = render(&f).unwrap();
        let second = render(&f).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(f.shared.registry().member_count(&"second-screen".to_string()), 1);
    }

    #[test]
    fn entries_without_group_have_no_shared_owner() {
        let scope = Scope::new();
        let f = fixture(&scope, RemovalPolicy::always());
        f.host.navigator().push(Routes::Detail);
        assert!(render(&f).is_none());
        assert_eq!(f.shared.registry().group_count(), 0);

        let decorators: Vec<Rc<dyn EntryDecorator<Routes>>> = vec![
            Rc::new(SavedStateDecorator),
            Rc::new(SharedStoreDecorator::new(
                &scope,
                SharedStoreConfig::default(),
                RemovalPolicy::always(),
            )),
        ];
        let host = NavHost::new(&scope, NavBackStack::new(Routes::Detail), decorators, |_| {
            entry(Metadata::new(), |s: &EntryScope<Routes>| s.shared_owner().map(|_| ()))
        });
        let err = host.render().unwrap().unwrap().unwrap_err();
        assert!(matches!(err, NavError::MissingSharedOwner));
    }

    #[test]
    fn each_entry_gets_its_own_store() {
        let scope = Scope::new();
        let f = fixture(&scope, RemovalPolicy::always());
        let nav = f.host.navigator();
        let first = nav.push(Routes::Detail);
        f.host.render().unwrap();
        let second = nav.push(Routes::Detail);
        f.host.render().unwrap();

        let registry = f.entry_stores.registry();
        let a = registry.store_for(&first).unwrap();
        let b = registry.store_for(&second).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));

        nav.pop();
        assert!(registry.store_for(&second).is_none());
        assert!(registry.store_for(&first).is_some());
    }

    #[test]
    fn removal_policy_keeps_store_through_transient_pops() {
        let scope = Scope::new();
        let recreating = Rc::new(Cell::new(false));
        let r = recreating.clone();
        let f = fixture(&scope, RemovalPolicy::from_fn(move || !r.get()));
        let nav = f.host.navigator();

        nav.push(Routes::SecondList);
        let vm = render(&f).unwrap();

        recreating.set(true);
        nav.pop();
        assert_eq!(f.cleared.load(Ordering::SeqCst), 0);
        assert!(f.shared.registry().store_for(&"second-screen".to_string()).is_some());

        recreating.set(false);
        scope.dispose();
        assert_eq!(f.cleared.load(Ordering::SeqCst), 1);
        assert!(f.shared.registry().is_torn_down());
        drop(vm);
    }

    #[test]
    fn pops_after_host_scope_ends_are_ignored() {
        let scope = Scope::new();
        let f = fixture(&scope, RemovalPolicy::always());
        let nav = f.host.navigator();
        nav.push(Routes::SecondList);
        render(&f);

        scope.dispose();
        assert_eq!(f.cleared.load(Ordering::SeqCst), 1);
        nav.pop();
        assert_eq!(f.cleared.load(Ordering::SeqCst), 1);
        assert!(matches!(
            f.host.render().map(|_| ()).unwrap_err(),
            NavError::Registry(_)
        ));
    }

    #[test]
    fn store_decorators_require_saved_state_first() {
        let scope = Scope::new();
        let shared: Rc<dyn EntryDecorator<Routes>> = Rc::new(SharedStoreDecorator::new(
            &scope,
            SharedStoreConfig::default(),
            RemovalPolicy::always(),
        ));
        let host = NavHost::new(
            &scope,
            NavBackStack::new(Routes::SecondList),
            vec![shared],
            |_| entry(Metadata::new().with(NESTED, "g"), |_: &EntryScope<Routes>| ()),
        );

        let err = host.render().unwrap_err();
        assert!(matches!(
            err,
            NavError::MissingSavedState {
                decorator: "SharedStoreDecorator"
            }
        ));
    }

    #[test]
    fn custom_metadata_key_selects_group() {
        let scope = Scope::new();
        let shared = Rc::new(SharedStoreDecorator::new(
            &scope,
            SharedStoreConfig::with_metadata_key("checkout"),
            RemovalPolicy::always(),
        ));
        let decorators: Vec<Rc<dyn EntryDecorator<Routes>>> =
            vec![Rc::new(SavedStateDecorator), shared.clone()];
        let host = NavHost::new(&scope, NavBackStack::new(Routes::Landing), decorators, |_| {
            entry(
                Metadata::new().with("checkout", "cart").with(NESTED, "ignored"),
                |s: &EntryScope<Routes>| s.shared_owner().map(|o| o.group().to_string()),
            )
        });

        assert_eq!(host.render().unwrap().unwrap().unwrap(), "cart");
        assert_eq!(shared.registry().group_count(), 1);
    }

    #[derive(Clone, Debug, PartialEq)]
    enum Route {
        Home,
        List,
        Detail(u32),
    }

    fn navigator(stack: &NavBackStack<Route>) -> Navigator<Route> {
        Navigator {
            stack: stack.clone(),
        }
    }

    #[test]
    fn pop_keeps_last_entry() {
        let stack = NavBackStack::new(Route::Home);
        let nav = navigator(&stack);
        assert!(!nav.pop());
        nav.push(Route::List);
        assert!(nav.pop());
        assert_eq!(stack.keys(), vec![Route::Home]);
        assert_eq!(stack.size(), 1);
    }

    #[test]
    fn pop_disposes_entry_scope_and_notifies_listeners() {
        let stack = NavBackStack::new(Route::Home);
        let nav = navigator(&stack);
        let popped = Rc::new(RefCell::new(Vec::new()));
        let p = popped.clone();
        let sub = stack.on_pop(move |id| p.borrow_mut().push(id));

        let id = nav.push(Route::List);
        let scope = stack.top().unwrap().scope;
        nav.pop();
        assert!(scope.is_disposed());
        assert_eq!(*popped.borrow(), vec![id]);

        sub.run();
        nav.push(Route::List);
        nav.pop();
        assert_eq!(popped.borrow().len(), 1);
    }

    #[test]
    fn pop_to_and_replace_issue_pops() {
        let stack = NavBackStack::new(Route::Home);
        let nav = navigator(&stack);
        let popped = Rc::new(RefCell::new(0));
        let p = popped.clone();
        let _sub = stack.on_pop(move |_| *p.borrow_mut() += 1);

        nav.push(Route::List);
        nav.push(Route::Detail(1));
        nav.push(Route::Detail(2));
        nav.pop_to(|k| *k == Route::List, false);
        assert_eq!(stack.keys(), vec![Route::Home, Route::List]);
        assert_eq!(*popped.borrow(), 2);

        let before = stack.top().unwrap().id;
        nav.replace(Route::Detail(3));
        assert_ne!(stack.top().unwrap().id, before);
        assert_eq!(*popped.borrow(), 3);

        nav.clear_and_push(Route::Home);
        assert_eq!(stack.keys(), vec![Route::Home]);
        assert_eq!(*popped.borrow(), 5);
    }

    #[test]
    fn saved_state_remembers_and_hands_off_results() {
        let saved = SavedState::default();
        let a = saved.remember("count", || 1);
        *a.borrow_mut() += 1;
        assert_eq!(*saved.remember("count", || 0).borrow(), 2);
        assert!(saved.contains("count"));

        saved.set_result("picked", 7u32);
        assert_eq!(saved.take_result::<u32>("picked"), Some(7));
        assert_eq!(saved.take_result::<u32>("picked"), None);
    }

    #[test]
    fn metadata_merge_prefers_later_values() {
        let m = Metadata::new()
            .with("scene", "list")
            .merge(Metadata::new().with("scene", "detail").with("group", "g"));
        assert_eq!(m.get("scene"), Some("detail"));
        assert_eq!(m.get("group"), Some("g"));
        assert_eq!(m.get("missing"), None);
    }
}
