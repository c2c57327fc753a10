//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p docbatch-api`.

#![allow(dead_code)]

pub mod fixtures;
pub mod renderer;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum_test::TestServer;
use docbatch_api::setup::routes;
use docbatch_api::state::AppState;
use docbatch_core::{Config, ConverterServiceConfig};
use docbatch_processing::{
    BatchPipeline, DocumentValidator, OfficeMarkupConverter, StrategySelector,
};
use tempfile::TempDir;

use renderer::{FakeRendererFactory, RenderCounters};

/// Test application: server, shared state and the directories it owns.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub workspace_root: TempDir,
    pub _bin_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Entries left under the workspace root (workspaces that were not reaped).
    pub fn residue(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.workspace_root.path())
            .map(|entries| entries.filter_map(|e| e.ok()).map(|e| e.path()).collect())
            .unwrap_or_default()
    }
}

fn test_config(workspace_root: &Path, native_path: &Path) -> ConverterServiceConfig {
    let mut config = ConverterServiceConfig::with_defaults(workspace_root.to_path_buf());
    config.native_converter_path = native_path.to_string_lossy().to_string();
    config.detect_timeout_secs = 5;
    config.conversion_timeout_secs = 10;
    config.max_files_per_batch = 5;
    config.max_document_size_bytes = 1024 * 1024;
    config.max_concurrent_batches = 2;
    config
}

fn build(
    config: Config,
    pipeline: Arc<BatchPipeline>,
    workspace_root: TempDir,
    bin_dir: TempDir,
) -> TestApp {
    let state = Arc::new(AppState::with_pipeline(config.clone(), pipeline));
    let app = routes::setup_routes(&config, state.clone()).expect("Failed to build router");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        state,
        workspace_root,
        _bin_dir: bin_dir,
    }
}

/// App whose native converter is the fake shell script, so batches take the native strategy.
#[cfg(unix)]
pub fn setup_native_app() -> TestApp {
    setup_native_app_with(|_| {})
}

#[cfg(unix)]
pub fn setup_native_app_with(customize: impl FnOnce(&mut ConverterServiceConfig)) -> TestApp {
    let workspace_root = tempfile::tempdir().expect("Failed to create workspace root");
    let bin_dir = tempfile::tempdir().expect("Failed to create bin directory");
    let script = fixtures::install_fake_converter(bin_dir.path());

    let mut inner = test_config(workspace_root.path(), &script);
    customize(&mut inner);
    let config = Config(Box::new(inner));
    let pipeline = Arc::new(BatchPipeline::from_config(&config));

    build(config, pipeline, workspace_root, bin_dir)
}

/// App with no native converter; PDF batches go through the headless strategy backed by an
/// in-process renderer.
pub fn setup_render_app(counters: Arc<RenderCounters>) -> TestApp {
    let workspace_root = tempfile::tempdir().expect("Failed to create workspace root");
    let bin_dir = tempfile::tempdir().expect("Failed to create bin directory");
    let missing = bin_dir.path().join("no-such-converter");

    let config = Config(Box::new(test_config(workspace_root.path(), &missing)));
    let selector = StrategySelector::new(
        config.native_converter_path(),
        config.detect_timeout(),
        Arc::new(OfficeMarkupConverter),
        Arc::new(FakeRendererFactory(counters)),
    );
    let pipeline = Arc::new(BatchPipeline::new(
        DocumentValidator::from_config(&config),
        selector,
        config.workspace_root().to_path_buf(),
        Duration::from_secs(10),
    ));

    build(config, pipeline, workspace_root, bin_dir)
}
