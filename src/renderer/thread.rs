// src/renderer/thread.rs

//! The dedicated thread that turns paint requests into frames.
//!
//! Requests are coalesced: any number of [`RenderThread::notify_paint`]
//! calls made while a frame is being painted result in exactly one more
//! frame. Disabling the thread lets the frame in flight finish and then
//! joins it.

use anyhow::{Context, Result};
use log::*;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

/// What a single call to [`FramePainter::paint_frame`] accomplished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Painted,
    /// No engines were attached.
    NothingToDo,
    /// Painting is suspended until the error state is reset.
    Suspended,
    /// The painter was torn down; the thread should exit.
    Stop,
}

/// The work a [`RenderThread`] performs for every paint request.
pub trait FramePainter: Send + Sync + 'static {
    /// Blocks until the engines are ready for another frame (throttling).
    fn wait_until_can_render(&self);
    fn paint_frame(&self) -> Result<FrameOutcome>;
}

/// An auto-reset event: `notify` sets it, `wait` blocks until it is set and
/// clears it again.
#[derive(Debug, Default)]
pub struct PaintSignal {
    pending: Mutex<bool>,
    wake: Condvar,
}

impl PaintSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        *pending = true;
        self.wake.notify_one();
    }

    pub fn wait(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        while !*pending {
            pending = self.wake.wait(pending).unwrap_or_else(PoisonError::into_inner);
        }
        *pending = false;
    }

    /// Drops a pending request.
    pub fn reset(&self) {
        *self.pending.lock().unwrap_or_else(PoisonError::into_inner) = false;
    }

    pub fn is_pending(&self) -> bool {
        *self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Owns the render thread's lifecycle.
pub struct RenderThread {
    painter: Arc<dyn FramePainter>,
    signal: Arc<PaintSignal>,
    running: Arc<AtomicBool>,
    handle: Mutex<Option<JoinHandle<()>>>,
    name: String,
}

impl RenderThread {
    /// `signal` must be the one the painter notifies when it needs a frame,
    /// e.g. [`super::Renderer::signal`].
    pub fn new(painter: Arc<dyn FramePainter>, signal: Arc<PaintSignal>, name: impl Into<String>) -> Self {
        Self {
            painter,
            signal,
            running: Arc::new(AtomicBool::new(false)),
            handle: Mutex::new(None),
            name: name.into(),
        }
    }

    /// Requests a frame. Before [`Self::enable_painting`] (or after disabling)
    /// the request stays pending and is served once painting is enabled.
    pub fn notify_paint(&self) {
        self.signal.notify();
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Starts the thread if it is not already running.
    pub fn enable_painting(&self) -> Result<()> {
        let mut handle = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = handle.take() {
            if !existing.is_finished() {
                *handle = Some(existing);
                return Ok(());
            }
            // The painter stopped on its own; reap it before respawning.
            if existing.join().is_err() {
                warn!("RenderThread: Previous thread panicked");
            }
        }

        self.running.store(true, Ordering::Release);
        let painter = Arc::clone(&self.painter);
        let signal = Arc::clone(&self.signal);
        let running = Arc::clone(&self.running);
        let spawned = thread::Builder::new()
            .name(self.name.clone())
            .spawn(move || render_loop(painter, signal, running))
            .context("Failed to spawn render thread");

        match spawned {
            Ok(h) => {
                *handle = Some(h);
                Ok(())
            }
            Err(e) => {
                self.running.store(false, Ordering::Release);
                Err(e)
            }
        }
    }

    /// Lets the frame in flight complete, then stops and joins the thread.
    /// Safe to call repeatedly.
    ///
    /// The handle stays locked until the thread is joined, so a concurrent
    /// [`Self::enable_painting`] starts a fresh thread only afterwards.
    pub fn wait_for_paint_completion_and_disable(&self) {
        let mut guard = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(handle) = guard.take() else {
            return;
        };
        self.running.store(false, Ordering::Release);
        if !handle.is_finished() {
            self.signal.notify();
        }
        if handle.join().is_err() {
            error!("RenderThread: Thread panicked during shutdown");
        }
        // A wake that raced with a stopping painter must not paint a frame
        // after the next enable.
        self.signal.reset();
        drop(guard);
        debug!("RenderThread: Disabled");
    }
}

impl Drop for RenderThread {
    fn drop(&mut self) {
        self.wait_for_paint_completion_and_disable();
    }
}

fn render_loop(painter: Arc<dyn FramePainter>, signal: Arc<PaintSignal>, running: Arc<AtomicBool>) {
    info!("RenderThread: Thread started");
    loop {
        painter.wait_until_can_render();
        signal.wait();
        if !running.load(Ordering::Acquire) {
            break;
        }

        match panic::catch_unwind(AssertUnwindSafe(|| painter.paint_frame())) {
            Ok(Ok(FrameOutcome::Stop)) => {
                info!("RenderThread: Painter requested stop");
                break;
            }
            Ok(Ok(outcome)) => trace!("RenderThread: Frame outcome {:?}", outcome),
            Ok(Err(e)) => error!("RenderThread: Frame failed: {:#}", e),
            Err(_) => error!("RenderThread: Frame panicked"),
        }
    }
    running.store(false, Ordering::Release);
    info!("RenderThread: Thread stopped");
}
