//! Walks the list-detail route graph and logs which view model each screen sees.
//!
//! Run with `RUST_LOG=info`, or `RUST_LOG=debug` to also see the store registry at work.

use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use navscope_core::prelude::*;
use navscope_navigation::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Routes {
    LandingScreen,
    DetailScreen,
    SecondListScreen,
    SecondListDetailScreen,
    ExternalScreen,
}

const NESTED_METADATA_KEY: &str = "nestedMetaDataKey";
const SECOND_SCREEN_GROUP: &str = "SecondScreenNestedGraphViewModel";
const SCENE_KEY: &str = "scene";

static NEXT_VM: AtomicUsize = AtomicUsize::new(1);

struct TestViewModel {
    id: usize,
}

impl TestViewModel {
    fn new() -> Self {
        Self {
            id: NEXT_VM.fetch_add(1, Ordering::Relaxed),
        }
    }
}

impl ViewModel for TestViewModel {
    fn on_cleared(&self) -> Result<(), StoreError> {
        log::info!("TestViewModel#{} cleared", self.id);
        Ok(())
    }
}

fn list_pane(scene: &str) -> Metadata {
    Metadata::new().with(SCENE_KEY, format!("list:{scene}"))
}

fn detail_pane(scene: &str) -> Metadata {
    Metadata::new().with(SCENE_KEY, format!("detail:{scene}"))
}

fn nested_graph() -> Metadata {
    Metadata::new().with(NESTED_METADATA_KEY, SECOND_SCREEN_GROUP)
}

fn shared_view_model(scope: &EntryScope<Routes>) -> Result<String, NavError> {
    let vm: Arc<TestViewModel> = scope
        .shared_owner()?
        .view_model("TestViewModel", |_| TestViewModel::new())?;
    log::info!("[SHARED VIEW MODEL] {:?} -> TestViewModel#{}", scope.key(), vm.id);
    Ok(format!("TestViewModel#{}", vm.id))
}

fn provider(key: &Routes) -> EntryContent<Routes, Result<String, NavError>> {
    match key {
        Routes::LandingScreen => entry(list_pane("General"), |_| {
            Ok("Welcome to Landing Page".to_string())
        }),
        Routes::DetailScreen => entry(detail_pane("General"), |_| {
            Ok("Welcome to first list detail screen".to_string())
        }),
        Routes::SecondListScreen => entry(
            list_pane("Second List Screen").merge(nested_graph()),
            |s| shared_view_model(s).map(|vm| format!("Welcome to request status ({vm})")),
        ),
        Routes::SecondListDetailScreen => entry(
            detail_pane("Second List Screen").merge(nested_graph()),
            |s| shared_view_model(s).map(|vm| format!("Second List Item Detail ({vm})")),
        ),
        Routes::ExternalScreen => entry(list_pane("External Screen"), |_| {
            Ok("Welcome to External Screen".to_string())
        }),
    }
}

fn show(host: &NavHost<Routes, Result<String, NavError>>) -> anyhow::Result<()> {
    if let Some(screen) = host.render()? {
        log::info!("{:?} => {}", host.stack().keys(), screen?);
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let activity = Scope::new();
    let decorators: Vec<Rc<dyn EntryDecorator<Routes>>> = vec![
        Rc::new(SavedStateDecorator),
        Rc::new(EntryStoreDecorator::new(&activity, RemovalPolicy::always())),
        Rc::new(SharedStoreDecorator::new(
            &activity,
            SharedStoreConfig::with_metadata_key(NESTED_METADATA_KEY),
            RemovalPolicy::always(),
        )),
    ];
    let host = NavHost::new(
        &activity,
        NavBackStack::new(Routes::LandingScreen),
        decorators,
        provider,
    );
    let nav = host.navigator();

    show(&host)?;
    nav.push(Routes::DetailScreen);
    show(&host)?;
    nav.pop();

    nav.push(Routes::SecondListScreen);
    show(&host)?;
    nav.push(Routes::SecondListDetailScreen);
    show(&host)?;
    nav.pop();
    show(&host)?;
    nav.pop();
    show(&host)?;

    nav.push(Routes::SecondListScreen);
    show(&host)?;
    nav.push(Routes::ExternalScreen);
    show(&host)?;

    activity.dispose();
    Ok(())
}
