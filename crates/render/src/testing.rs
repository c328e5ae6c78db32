//! A scripted, process-free browser for tests.
//!
//! [`StubLauncher`] hands out [`StubPage`]s that answer every [`Probe`] the
//! renderer sends according to a per-slide [`SlideBehavior`], and keeps
//! counters so tests can check that no browser outlives its job.

use crate::driver::{BrowserLauncher, Clip, PdfRequest, RenderPage, SessionOptions};
use crate::error::DriverError;
use crate::fallback::is_fallback_url;
use crate::probe::Probe;
use crate::target::slide_index_of;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// What the stub does when a given slide is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlideBehavior {
    #[default]
    Ready,
    /// `count` chart surfaces; `sized: false` never reports dimensions.
    Charts { count: usize, sized: bool },
    /// `count` responsive containers whose chart surfaces only mount after
    /// the third sizing check.
    ChartsMounting { count: usize },
    /// The root container never gets children.
    NeverReady,
    /// `navigate` never completes.
    NavigationHangs,
    /// `navigate` returns an error.
    NavigationFails,
    /// The slide renders but every capture call fails.
    CaptureFails,
    /// Never ready, and the fallback capture fails as well.
    FallbackFails,
    /// The browser dies when this slide is loaded.
    Crash,
    /// The browser dies while the renderer waits for content.
    CrashWhileWaiting,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CaptureKind {
    Pdf(PdfRequest),
    Screenshot(Clip),
}

/// One successful capture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StubCapture {
    /// Slide loaded (or, for a fallback page, last attempted).
    pub slide_index: Option<usize>,
    pub fallback: bool,
    pub kind: CaptureKind,
}

/// Counters shared by a launcher and every page it created.
#[derive(Debug, Default)]
pub struct StubStats {
    launch_attempts: AtomicUsize,
    launches: AtomicUsize,
    live: AtomicUsize,
    closes: AtomicUsize,
    navigations: AtomicUsize,
    styles_applied: AtomicUsize,
    chart_waits: AtomicUsize,
    captures: Mutex<Vec<StubCapture>>,
}

impl StubStats {
    /// Calls to `launch`, successful or not.
    pub fn launch_attempts(&self) -> usize {
        self.launch_attempts.load(Ordering::SeqCst)
    }

    /// Browsers actually started.
    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    /// Browsers started and not yet terminated.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Explicit `close` calls that terminated a browser.
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn navigations(&self) -> usize {
        self.navigations.load(Ordering::SeqCst)
    }

    pub fn styles_applied(&self) -> usize {
        self.styles_applied.load(Ordering::SeqCst)
    }

    /// Chart sizing checks answered.
    pub fn chart_waits(&self) -> usize {
        self.chart_waits.load(Ordering::SeqCst)
    }

    pub fn captures(&self) -> Vec<StubCapture> {
        lock(&self.captures).clone()
    }
}

/// Sizing checks a `ChartsMounting` slide answers before its surfaces exist.
const MOUNT_AFTER_CHECKS: usize = 3;

type CaptureFn = dyn Fn(&StubCapture) -> Vec<u8> + Send + Sync;

#[derive(Clone)]
pub struct StubLauncher {
    behaviors: HashMap<usize, SlideBehavior>,
    fail_launch: bool,
    stats: Arc<StubStats>,
    pdf: Arc<CaptureFn>,
    png: Arc<CaptureFn>,
}

impl Default for StubLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl StubLauncher {
    pub fn new() -> Self {
        Self {
            behaviors: HashMap::new(),
            fail_launch: false,
            stats: Arc::new(StubStats::default()),
            pdf: Arc::new(|capture: &StubCapture| {
                format!("%PDF-stub slide={:?} fallback={}", capture.slide_index, capture.fallback)
                    .into_bytes()
            }),
            png: Arc::new(|capture: &StubCapture| {
                let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
                bytes.extend_from_slice(
                    format!("slide={:?} fallback={}", capture.slide_index, capture.fallback).as_bytes(),
                );
                bytes
            }),
        }
    }

    /// Scripts the slide at zero-based `index`. Unscripted slides are `Ready`.
    pub fn slide(mut self, index: usize, behavior: SlideBehavior) -> Self {
        self.behaviors.insert(index, behavior);
        self
    }

    /// Every launch fails as if the browser executable were missing.
    pub fn failing_launch(mut self) -> Self {
        self.fail_launch = true;
        self
    }

    /// Replaces the bytes returned by `print_pdf`.
    pub fn with_pdf<F>(mut self, f: F) -> Self
    where
        F: Fn(&StubCapture) -> Vec<u8> + Send + Sync + 'static,
    {
        self.pdf = Arc::new(f);
        self
    }

    /// Replaces the bytes returned by `screenshot`.
    pub fn with_png<F>(mut self, f: F) -> Self
    where
        F: Fn(&StubCapture) -> Vec<u8> + Send + Sync + 'static,
    {
        self.png = Arc::new(f);
        self
    }

    pub fn stats(&self) -> Arc<StubStats> {
        Arc::clone(&self.stats)
    }
}

#[async_trait]
impl BrowserLauncher for StubLauncher {
    async fn launch(&self, _options: &SessionOptions) -> Result<Box<dyn RenderPage>, DriverError> {
        self.stats.launch_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_launch {
            return Err(DriverError::Launch("stub: browser executable not found".to_string()));
        }
        self.stats.launches.fetch_add(1, Ordering::SeqCst);
        self.stats.live.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(StubPage {
            script: self.clone(),
            state: Mutex::new(PageState::default()),
            terminated: AtomicBool::new(false),
        }))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Location {
    #[default]
    Blank,
    Slide(usize),
    Fallback,
}

#[derive(Debug, Default)]
struct PageState {
    location: Location,
    last_slide: Option<usize>,
    crashed: bool,
    sizing_checks: usize,
}

pub struct StubPage {
    script: StubLauncher,
    state: Mutex<PageState>,
    terminated: AtomicBool,
}

impl StubPage {
    fn behavior_of(&self, index: Option<usize>) -> SlideBehavior {
        index
            .and_then(|i| self.script.behaviors.get(&i).copied())
            .unwrap_or_default()
    }

    /// Location and the behaviour that applies to it.
    fn current(&self) -> Result<(Location, Option<usize>, SlideBehavior), DriverError> {
        if self.terminated.load(Ordering::SeqCst) {
            return Err(DriverError::SessionLost("stub: browser closed".to_string()));
        }
        let state = lock(&self.state);
        if state.crashed {
            return Err(DriverError::SessionLost("stub: browser crashed".to_string()));
        }
        Ok((state.location, state.last_slide, self.behavior_of(state.last_slide)))
    }

    fn capture(&self, kind: CaptureKind) -> Result<Vec<u8>, DriverError> {
        let (location, last_slide, behavior) = self.current()?;
        let fallback = location == Location::Fallback;
        let fails = match behavior {
            SlideBehavior::CaptureFails => !fallback,
            SlideBehavior::FallbackFails => true,
            _ => false,
        };
        if fails || location == Location::Blank {
            return Err(DriverError::Capture("stub: capture failed".to_string()));
        }

        let capture = StubCapture { slide_index: last_slide, fallback, kind };
        let bytes = match kind {
            CaptureKind::Pdf(_) => (self.script.pdf)(&capture),
            CaptureKind::Screenshot(_) => (self.script.png)(&capture),
        };
        lock(&self.script.stats.captures).push(capture);
        Ok(bytes)
    }

    fn terminate(&self) -> bool {
        let first = !self.terminated.swap(true, Ordering::SeqCst);
        if first {
            self.script.stats.live.fetch_sub(1, Ordering::SeqCst);
        }
        first
    }
}

#[async_trait]
impl RenderPage for StubPage {
    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        self.current()?;
        self.script.stats.navigations.fetch_add(1, Ordering::SeqCst);

        if is_fallback_url(url) {
            lock(&self.state).location = Location::Fallback;
            return Ok(());
        }

        let index = slide_index_of(url);
        let behavior = self.behavior_of(index);
        {
            let mut state = lock(&self.state);
            state.last_slide = index;
            state.location = Location::Blank;
            state.sizing_checks = 0;
            if behavior == SlideBehavior::Crash {
                state.crashed = true;
            }
        }

        match behavior {
            SlideBehavior::Crash => Err(DriverError::SessionLost("stub: browser crashed".to_string())),
            SlideBehavior::NavigationFails => {
                Err(DriverError::Navigation("stub: net::ERR_CONNECTION_REFUSED".to_string()))
            }
            SlideBehavior::NavigationHangs => std::future::pending().await,
            _ => {
                lock(&self.state).location = match index {
                    Some(i) => Location::Slide(i),
                    None => Location::Blank,
                };
                Ok(())
            }
        }
    }

    async fn evaluate(&self, probe: &Probe<'_>) -> Result<Value, DriverError> {
        let (location, _, behavior) = self.current()?;
        let on_slide = matches!(location, Location::Slide(_));
        let mounted = lock(&self.state).sizing_checks >= MOUNT_AFTER_CHECKS;
        let (charts, containers) = match behavior {
            SlideBehavior::Charts { count, .. } if on_slide => (count, count),
            SlideBehavior::ChartsMounting { count } if on_slide => (if mounted { count } else { 0 }, count),
            _ => (0, 0),
        };

        if behavior == SlideBehavior::CrashWhileWaiting
            && on_slide
            && matches!(probe, Probe::ContentReady { .. })
        {
            lock(&self.state).crashed = true;
            return Err(DriverError::SessionLost("stub: browser crashed".to_string()));
        }

        let value = match probe {
            Probe::DocumentState => json!({ "ready": location != Location::Blank, "resources": 3 }),
            Probe::ContentReady { .. } => match behavior {
                _ if location == Location::Fallback => json!(true),
                SlideBehavior::NeverReady | SlideBehavior::FallbackFails => json!(false),
                _ => json!(on_slide),
            },
            Probe::ChartCount { .. } => json!(charts.max(containers)),
            Probe::ChartsSized { .. } => {
                self.script.stats.chart_waits.fetch_add(1, Ordering::SeqCst);
                match behavior {
                    SlideBehavior::Charts { sized, .. } => json!(sized),
                    SlideBehavior::ChartsMounting { .. } => {
                        let mut state = lock(&self.state);
                        state.sizing_checks += 1;
                        json!(state.sizing_checks > MOUNT_AFTER_CHECKS)
                    }
                    _ => json!(true),
                }
            }
            Probe::ApplyExportStyle(_) => {
                self.script.stats.styles_applied.fetch_add(1, Ordering::SeqCst);
                json!(on_slide)
            }
            Probe::ChartBounds { index, .. } => {
                if *index < charts {
                    json!({ "x": 100.0 * *index as f64, "y": 50.0, "width": 400.0, "height": 300.0 })
                } else {
                    Value::Null
                }
            }
        };
        Ok(value)
    }

    async fn print_pdf(&self, request: &PdfRequest) -> Result<Vec<u8>, DriverError> {
        self.capture(CaptureKind::Pdf(*request))
    }

    async fn screenshot(&self, clip: &Clip) -> Result<Vec<u8>, DriverError> {
        self.capture(CaptureKind::Screenshot(*clip))
    }

    async fn close(&self) -> Result<(), DriverError> {
        if self.terminate() {
            self.script.stats.closes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

impl Drop for StubPage {
    fn drop(&mut self) {
        self.terminate();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
