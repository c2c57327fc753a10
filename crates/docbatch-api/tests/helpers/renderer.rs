//! In-process stand-in for the headless browser.

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use docbatch_processing::{PageRenderer, RendererFactory};

#[derive(Default)]
pub struct RenderCounters {
    pub sessions: AtomicUsize,
    pub pages: AtomicUsize,
    pub closed: AtomicUsize,
    pub html: Mutex<Vec<String>>,
}

impl RenderCounters {
    pub fn sessions(&self) -> usize {
        self.sessions.load(Ordering::SeqCst)
    }

    pub fn pages(&self) -> usize {
        self.pages.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

pub struct FakeRenderer(Arc<RenderCounters>);

#[async_trait]
impl PageRenderer for FakeRenderer {
    async fn render_pdf(&self, html: &str) -> anyhow::Result<Vec<u8>> {
        self.0.pages.fetch_add(1, Ordering::SeqCst);
        self.0.html.lock().unwrap().push(html.to_string());
        if html.contains("BOOM") {
            anyhow::bail!("page crashed");
        }
        Ok(b"%PDF-1.7 rendered".to_vec())
    }

    async fn close(&self) {
        self.0.closed.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct FakeRendererFactory(pub Arc<RenderCounters>);

impl RendererFactory for FakeRendererFactory {
    fn session(&self, _scratch_dir: &Path) -> Box<dyn PageRenderer> {
        self.0.sessions.fetch_add(1, Ordering::SeqCst);
        Box::new(FakeRenderer(self.0.clone()))
    }
}
